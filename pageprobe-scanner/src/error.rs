use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Script evaluation failed: {0}")]
    Script(String),

    #[error("Selector not found: {0}")]
    SelectorNotFound(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Unsupported by renderer: {0}")]
    Unsupported(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Result sink error: {0}")]
    Sink(String),
}

impl From<chromiumoxide::error::CdpError> for ScanError {
    fn from(e: chromiumoxide::error::CdpError) -> Self {
        ScanError::Browser(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
