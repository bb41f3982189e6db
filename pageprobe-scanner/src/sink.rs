use crate::error::{Result, ScanError};
use crate::result::{HeadingReport, ImageValidationResult};
use std::path::PathBuf;
use std::sync::Mutex;

/// Everything the crawler reports while it runs
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlEvent {
    /// Status 2xx and no error signal
    PageSucceeded { url: String },
    /// Loaded, but a non-2xx status or an error signal
    PageFailed {
        url: String,
        status_code: u16,
        is_error_page: bool,
    },
    /// Processing threw before the page could be classified
    ProcessingFailed { url: String, message: String },
    /// Written for every classified page
    PageCompleted { url: String },
    Headings { url: String, report: HeadingReport },
    OgImage {
        page_url: String,
        result: ImageValidationResult,
    },
}

/// Destination for crawl events and screenshot artifacts
pub trait ResultSink: Send + Sync {
    fn record(&self, event: &CrawlEvent) -> Result<()>;

    /// Store a full-page capture of `page_url`, returning where it landed
    fn save_screenshot(&self, page_url: &str, image: &[u8]) -> Result<PathBuf>;
}

/// Keeps events in memory. Handy for embedding the crawler and in tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<CrawlEvent>>,
    screenshots: Mutex<Vec<(String, usize)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CrawlEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// `(page url, byte length)` for every stored capture
    pub fn screenshots(&self) -> Vec<(String, usize)> {
        self.screenshots.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl ResultSink for MemorySink {
    fn record(&self, event: &CrawlEvent) -> Result<()> {
        self.events
            .lock()
            .map_err(|e| ScanError::Sink(e.to_string()))?
            .push(event.clone());
        Ok(())
    }

    fn save_screenshot(&self, page_url: &str, image: &[u8]) -> Result<PathBuf> {
        let mut shots = self
            .screenshots
            .lock()
            .map_err(|e| ScanError::Sink(e.to_string()))?;
        shots.push((page_url.to_string(), image.len()));
        Ok(PathBuf::from(format!("memory://{}", shots.len())))
    }
}
