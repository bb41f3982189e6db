//! Append-only result logs for one crawl run.
//!
//! A run writes under `<log-root>/<timestamp>/`:
//!
//! ```text
//! success.txt  error.txt  complete.txt
//! tags/success.txt  tags/error.txt
//! og_images/success.txt  og_images/error.txt
//! screenshots/<mirrored url path>/index-<timestamp>.webp
//! ```
//!
//! Run-level failures and completion go to `<log-root>/error/error.txt` and
//! `<log-root>/complete/complete.txt`, outside any run directory.

use crate::error::{CoreError, Result};
use crate::screenshot::screenshot_dir;
use chrono::Local;
use pageprobe_scanner::result::{HeadingLevel, HeadingReport, ImageValidationResult};
use pageprobe_scanner::{CrawlEvent, ResultSink};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const SUCCESS_LOG: &str = "success.txt";
pub const ERROR_LOG: &str = "error.txt";
pub const COMPLETE_LOG: &str = "complete.txt";

pub const TAGS_DIR: &str = "tags";
pub const OG_IMAGES_DIR: &str = "og_images";
pub const SCREENSHOTS_DIR: &str = "screenshots";

pub const RESERVED_ERROR_DIR: &str = "error";
pub const RESERVED_COMPLETE_DIR: &str = "complete";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%Hh-%Mm-%Ss";
const SCREENSHOT_NAME: &str = "index";
const SCREENSHOT_EXTENSION: &str = "webp";

/// Current local time as `YYYY-MM-DD-HHh-MMm-SSs`
pub fn formatted_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

pub fn generate_filename(name: &str, extension: &str) -> String {
    format!("{}-{}.{}", name, formatted_timestamp(), extension)
}

/// Append `message` as one line of `dir/filename`, creating both if needed
pub fn log_result(dir: &Path, filename: &str, message: &str) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(filename))?;
    writeln!(file, "{}", message.replace('\n', " "))
}

pub fn heading_line(url: &str, report: &HeadingReport) -> String {
    let levels: Vec<String> = HeadingLevel::ALL
        .iter()
        .map(|level| {
            let state = if report.is_present(*level) { "found" } else { "not found" };
            format!("\"{}\" {}", level.tag(), state)
        })
        .collect();
    format!("{} - {}", url, levels.join(", "))
}

pub fn og_image_line(page_url: &str, result: &ImageValidationResult) -> String {
    let or_null = |v: Option<u32>| v.map_or_else(|| "null".to_string(), |v| v.to_string());
    let reason = result
        .reason
        .as_deref()
        .map(|r| format!(" - {}", r))
        .unwrap_or_default();
    format!(
        "{} - {} - {}x{}px r: {}{}",
        page_url,
        result.url.as_deref().unwrap_or("null"),
        or_null(result.width),
        or_null(result.height),
        result.ratio,
        reason
    )
}

pub fn page_error_line(url: &str, status_code: u16, is_error_page: bool) -> String {
    if is_error_page {
        format!("{} - (Page inaccessible | Status {})", url, status_code)
    } else {
        format!("{} - (Status {})", url, status_code)
    }
}

pub fn processing_error_line(url: &str, message: &str) -> String {
    format!("{} - {}", url, message)
}

/// The log directory of one run
#[derive(Debug, Clone)]
pub struct RunLog {
    dir: PathBuf,
    timestamp: String,
}

impl RunLog {
    /// Create `<log_root>/<now>/` and its sub-directories
    pub fn create(log_root: &Path) -> Result<Self> {
        Self::create_at(log_root, &formatted_timestamp())
    }

    pub fn create_at(log_root: &Path, timestamp: &str) -> Result<Self> {
        let dir = log_root.join(timestamp);
        for sub in [SCREENSHOTS_DIR, OG_IMAGES_DIR, TAGS_DIR] {
            let path = dir.join(sub);
            fs::create_dir_all(&path).map_err(|e| CoreError::io(path, e))?;
        }
        debug!("Run log directory: {}", dir.display());

        Ok(Self {
            dir,
            timestamp: timestamp.to_string(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn screenshots_dir(&self) -> PathBuf {
        self.dir.join(SCREENSHOTS_DIR)
    }

    fn append(&self, subdir: Option<&str>, filename: &str, message: &str) -> io::Result<()> {
        match subdir {
            Some(sub) => log_result(&self.dir.join(sub), filename, message),
            None => log_result(&self.dir, filename, message),
        }
    }
}

impl ResultSink for RunLog {
    fn record(&self, event: &CrawlEvent) -> pageprobe_scanner::error::Result<()> {
        match event {
            CrawlEvent::PageSucceeded { url } => self.append(None, SUCCESS_LOG, url)?,
            CrawlEvent::PageFailed {
                url,
                status_code,
                is_error_page,
            } => self.append(
                None,
                ERROR_LOG,
                &page_error_line(url, *status_code, *is_error_page),
            )?,
            CrawlEvent::ProcessingFailed { url, message } => {
                self.append(None, ERROR_LOG, &processing_error_line(url, message))?
            }
            CrawlEvent::PageCompleted { url } => self.append(None, COMPLETE_LOG, url)?,
            CrawlEvent::Headings { url, report } => {
                let file = if report.passes() { SUCCESS_LOG } else { ERROR_LOG };
                self.append(Some(TAGS_DIR), file, &heading_line(url, report))?
            }
            CrawlEvent::OgImage { page_url, result } => {
                let file = if result.valid { SUCCESS_LOG } else { ERROR_LOG };
                self.append(Some(OG_IMAGES_DIR), file, &og_image_line(page_url, result))?
            }
        }
        Ok(())
    }

    fn save_screenshot(&self, page_url: &str, image: &[u8]) -> pageprobe_scanner::error::Result<PathBuf> {
        let dir = screenshot_dir(page_url, &self.screenshots_dir())?;
        let path = dir.join(generate_filename(SCREENSHOT_NAME, SCREENSHOT_EXTENSION));
        fs::write(&path, image)?;
        Ok(path)
    }
}

/// Record a failure that stopped the whole run
pub fn log_fatal_error(log_root: &Path, message: &str) -> io::Result<()> {
    log_result(
        &log_root.join(RESERVED_ERROR_DIR),
        ERROR_LOG,
        &format!("Failed to run the crawl: {}", message),
    )
}

/// Record the end of a run, successful or not
pub fn log_run_finished(log_root: &Path, timestamp: &str) -> io::Result<()> {
    log_result(
        &log_root.join(RESERVED_COMPLETE_DIR),
        COMPLETE_LOG,
        &format!("Finished at {}", timestamp),
    )
}
