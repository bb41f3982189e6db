//! Crawl engine for pageprobe.
//!
//! A [`Crawler`] seeds a [`Frontier`], hands each URL to a [`PageProcessor`]
//! that drives a [`Renderer`], and keeps going wave by wave until no
//! unvisited links remain.

pub mod browser;
pub mod crawler;
pub mod error;
pub mod frontier;
pub mod image;
pub mod inspector;
pub mod links;
pub mod processor;
pub mod render;
pub mod result;
pub mod sink;

pub use browser::{BrowserSettings, ChromiumRenderer};
pub use crawler::{Crawler, ProgressCallback};
pub use error::ScanError;
pub use frontier::Frontier;
pub use inspector::ErrorSignal;
pub use processor::{EnabledChecks, PageProcessor, PageSelectors, ProcessorConfig};
pub use render::{PageSession, Renderer};
pub use result::{CrawlSummary, ImageValidationResult, PageOutcome};
pub use sink::{CrawlEvent, MemorySink, ResultSink};
