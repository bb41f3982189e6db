//! og:image validation rules.
//!
//! Checks run in a fixed order and the first failure decides the reason:
//! minimum dimensions, pixel-area ceiling, aspect ratio, resolution tier.

use crate::error::Result;
use crate::render::{PageSession, Renderer};
use crate::result::{ImageDimensions, ImageValidationResult};
use async_trait::async_trait;
use tracing::{debug, warn};

pub const OG_IMAGE_SELECTOR: &str = r#"meta[property="og:image"]"#;

pub const MIN_SIDE: u32 = 200;
/// Ceiling on `width * height`, not on encoded bytes
pub const MAX_PIXEL_AREA: u64 = 8 * 1024 * 1024;
pub const TARGET_RATIO: f64 = 1.9;
pub const RATIO_TOLERANCE: f64 = 0.2;
pub const HIGH_RESOLUTION: (u32, u32) = (1200, 630);
pub const STANDARD_RESOLUTION: (u32, u32) = (600, 315);

pub const REASON_NO_IMAGE: &str = "No OG image found";
pub const REASON_LOAD_FAILED: &str = "Failed to load image";
pub const REASON_TOO_SMALL: &str = "Dimensions below minimum size (200x200)";
pub const REASON_TOO_LARGE: &str = "Size exceeds maximum allowed (8 MB)";
pub const REASON_BAD_RATIO: &str = "Invalid aspect ratio";
pub const REASON_LOW_RESOLUTION: &str = "Resolution below minimum standards";

/// Fetches the natural size of an image
#[async_trait]
pub trait ImageLoader: Send + Sync {
    /// `Ok(None)` when the image loaded but exposed no intrinsic size
    async fn load_dimensions(&self, url: &str) -> Result<Option<ImageDimensions>>;
}

/// Loads images in a second, short-lived page context of `renderer`
pub struct RendererImageLoader<'a, R: Renderer> {
    renderer: &'a R,
}

impl<'a, R: Renderer> RendererImageLoader<'a, R> {
    pub fn new(renderer: &'a R) -> Self {
        Self { renderer }
    }
}

#[async_trait]
impl<'a, R: Renderer> ImageLoader for RendererImageLoader<'a, R> {
    async fn load_dimensions(&self, url: &str) -> Result<Option<ImageDimensions>> {
        let session = self.renderer.open_page().await?;
        let dimensions = match session.goto(url).await {
            Ok(_) => session.first_image_size().await,
            Err(e) => Err(e),
        };
        if let Err(e) = session.close().await {
            warn!("Failed to close image page for {}: {}", url, e);
        }
        dimensions
    }
}

/// Validate the og:image declared by a page
pub async fn validate_og_image<L>(meta_url: Option<&str>, loader: &L) -> ImageValidationResult
where
    L: ImageLoader + ?Sized,
{
    let Some(url) = meta_url.map(str::trim).filter(|u| !u.is_empty()) else {
        return ImageValidationResult::missing();
    };

    let dimensions = match loader.load_dimensions(url).await {
        Ok(dimensions) => dimensions,
        Err(e) => {
            debug!("Loading og:image {} failed: {}", url, e);
            None
        }
    };

    validate_dimensions(url, dimensions)
}

/// Apply the image rules to already-known dimensions
pub fn validate_dimensions(url: &str, dimensions: Option<ImageDimensions>) -> ImageValidationResult {
    let Some(ImageDimensions { width, height }) =
        dimensions.filter(|d| d.width > 0 && d.height > 0)
    else {
        return ImageValidationResult {
            url: Some(url.to_string()),
            width: None,
            height: None,
            ratio: 0.0,
            valid: false,
            reason: Some(REASON_LOAD_FAILED.to_string()),
        };
    };

    let ratio = width as f64 / height as f64;
    let reason = failure_reason(width, height, ratio);

    ImageValidationResult {
        url: Some(url.to_string()),
        width: Some(width),
        height: Some(height),
        ratio,
        valid: reason.is_none(),
        reason: reason.map(str::to_string),
    }
}

fn failure_reason(width: u32, height: u32, ratio: f64) -> Option<&'static str> {
    if width < MIN_SIDE || height < MIN_SIDE {
        return Some(REASON_TOO_SMALL);
    }
    if width as u64 * height as u64 > MAX_PIXEL_AREA {
        return Some(REASON_TOO_LARGE);
    }
    if (ratio - TARGET_RATIO).abs() >= RATIO_TOLERANCE {
        return Some(REASON_BAD_RATIO);
    }
    let meets = |(w, h): (u32, u32)| width >= w && height >= h;
    if !meets(HIGH_RESOLUTION) && !meets(STANDARD_RESOLUTION) {
        return Some(REASON_LOW_RESOLUTION);
    }
    None
}
