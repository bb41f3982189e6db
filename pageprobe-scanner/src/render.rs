//! The rendering capability the crawler drives.
//!
//! A [`Renderer`] hands out isolated [`PageSession`]s. Every operation is an
//! await point; the crawler never runs two of them concurrently.

use crate::error::Result;
use crate::result::ImageDimensions;
use async_trait::async_trait;

/// Scroll position of the document, in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub viewport_height: f64,
    pub scroll_height: f64,
}

impl ScrollMetrics {
    pub fn at_bottom(&self) -> bool {
        self.scroll_top + self.viewport_height >= self.scroll_height
    }
}

/// Opens page contexts
#[async_trait]
pub trait Renderer: Send + Sync {
    type Session: PageSession;

    /// Open a fresh, isolated page context
    async fn open_page(&self) -> Result<Self::Session>;
}

/// One open page context
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Navigate and wait for the DOM to be parsed. Returns the HTTP status,
    /// or 0 when the renderer could not determine one.
    async fn goto(&self, url: &str) -> Result<u16>;

    /// Number of elements matching `selector`
    async fn count(&self, selector: &str) -> Result<usize>;

    /// Click the first element matching `selector`
    async fn click(&self, selector: &str) -> Result<()>;

    /// Text content of the first element matching `selector`
    async fn first_text(&self, selector: &str) -> Result<Option<String>>;

    /// Attribute value of the first element matching `selector`
    async fn first_attribute(&self, selector: &str, attribute: &str) -> Result<Option<String>>;

    /// Resolved `href`s of every anchor matching `selector`, in document order
    async fn anchor_hrefs(&self, selector: &str) -> Result<Vec<String>>;

    /// Visible text of the document body
    async fn body_text(&self) -> Result<String>;

    async fn scroll_metrics(&self) -> Result<ScrollMetrics>;

    async fn scroll_by(&self, distance: u32) -> Result<()>;

    /// Full-page raster capture
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// Natural size of the first `<img>` in the document
    async fn first_image_size(&self) -> Result<Option<ImageDimensions>>;

    async fn close(&self) -> Result<()>;
}
