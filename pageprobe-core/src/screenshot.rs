use pageprobe_scanner::ScanError;
use pageprobe_scanner::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Appended when the URL path ends in `/`, so `/` itself becomes `home`
const INDEX_SEGMENT: &str = "home";

/// Relative directory mirroring the path of `url`.
///
/// Every char other than ASCII alphanumerics, `/` and `-` becomes `_`, which
/// also keeps `.` and `..` segments out of the result.
pub fn mirrored_path(url: &str) -> Result<PathBuf> {
    let parsed = Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;

    let clean: String = parsed
        .path()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '/' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut path: PathBuf = clean.split('/').filter(|s| !s.is_empty()).collect();
    if clean.ends_with('/') {
        path.push(INDEX_SEGMENT);
    }
    Ok(path)
}

/// Create (if needed) and return the screenshot directory for `url` under `root`
pub fn screenshot_dir(url: &str, root: &Path) -> Result<PathBuf> {
    let dir = root.join(mirrored_path(url)?);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}
