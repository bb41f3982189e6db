use serde::{Deserialize, Serialize};
use std::fmt;

/// Final verdict for one visited page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageClassification {
    Success,
    Error,
}

/// What the processor learned about one page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageOutcome {
    pub url: String,
    pub status_code: u16,
    pub is_error_page: bool,
    pub classification: PageClassification,
    /// Normalized, in first-seen order. Empty unless the page succeeded.
    pub discovered_links: Vec<String>,
}

impl PageOutcome {
    pub fn is_success(&self) -> bool {
        self.classification == PageClassification::Success
    }
}

/// Classify a page by HTTP status and error signal
pub fn classify(status_code: u16, is_error_page: bool) -> PageClassification {
    if (200..300).contains(&status_code) && !is_error_page {
        PageClassification::Success
    } else {
        PageClassification::Error
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
    H5,
}

impl HeadingLevel {
    pub const ALL: [HeadingLevel; 5] = [
        HeadingLevel::H1,
        HeadingLevel::H2,
        HeadingLevel::H3,
        HeadingLevel::H4,
        HeadingLevel::H5,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            HeadingLevel::H1 => "h1",
            HeadingLevel::H2 => "h2",
            HeadingLevel::H3 => "h3",
            HeadingLevel::H4 => "h4",
            HeadingLevel::H5 => "h5",
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Presence of h1..h5 on a page, in level order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingReport {
    found: Vec<(HeadingLevel, bool)>,
}

impl HeadingReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, level: HeadingLevel, present: bool) {
        match self.found.iter_mut().find(|(l, _)| *l == level) {
            Some(entry) => entry.1 = present,
            None => {
                self.found.push((level, present));
                self.found.sort_by_key(|(l, _)| *l as u8);
            }
        }
    }

    pub fn is_present(&self, level: HeadingLevel) -> bool {
        self.found
            .iter()
            .find(|(l, _)| *l == level)
            .map(|(_, present)| *present)
            .unwrap_or(false)
    }

    pub fn levels(&self) -> impl Iterator<Item = (HeadingLevel, bool)> + '_ {
        self.found.iter().copied()
    }

    /// A page passes the heading check when it carries a non-empty h1
    pub fn passes(&self) -> bool {
        self.is_present(HeadingLevel::H1)
    }
}

/// Natural pixel size of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageValidationResult {
    pub url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub ratio: f64,
    pub valid: bool,
    pub reason: Option<String>,
}

impl ImageValidationResult {
    pub fn missing() -> Self {
        Self {
            url: None,
            width: None,
            height: None,
            ratio: 0.0,
            valid: false,
            reason: Some(crate::image::REASON_NO_IMAGE.to_string()),
        }
    }
}

/// Per-run counters reported by the crawler
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub pages_visited: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errored: usize,
    pub passes: usize,
    pub links_discovered: usize,
}
