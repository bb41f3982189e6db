// Minimal renderer answering the queries the processor makes, keyed by URL.

#![allow(dead_code)]

use async_trait::async_trait;
use pageprobe_scanner::error::{Result, ScanError};
use pageprobe_scanner::image::OG_IMAGE_SELECTOR;
use pageprobe_scanner::render::{PageSession, Renderer, ScrollMetrics};
use pageprobe_scanner::result::ImageDimensions;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct SitePage {
    pub status: u16,
    pub text: String,
    pub h1: Option<String>,
    pub og_image: Option<String>,
    pub links: Vec<String>,
}

impl SitePage {
    pub fn ok(text: &str) -> Self {
        Self {
            status: 200,
            text: text.to_string(),
            ..Self::default()
        }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn h1(mut self, heading: &str) -> Self {
        self.h1 = Some(heading.to_string());
        self
    }

    pub fn og_image(mut self, url: &str) -> Self {
        self.og_image = Some(url.to_string());
        self
    }

    pub fn links(mut self, links: &[&str]) -> Self {
        self.links = links.iter().map(|l| l.to_string()).collect();
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticSite {
    pages: HashMap<String, SitePage>,
    images: HashMap<String, ImageDimensions>,
    down: Vec<String>,
}

impl StaticSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, page: SitePage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn image(mut self, url: &str, width: u32, height: u32) -> Self {
        self.images.insert(url.to_string(), ImageDimensions { width, height });
        self
    }

    pub fn down(mut self, url: &str) -> Self {
        self.down.push(url.to_string());
        self
    }
}

#[async_trait]
impl Renderer for StaticSite {
    type Session = StaticPage;

    async fn open_page(&self) -> Result<StaticPage> {
        Ok(StaticPage {
            site: Arc::new(self.clone()),
            current: Mutex::new((None, None)),
        })
    }
}

pub struct StaticPage {
    site: Arc<StaticSite>,
    current: Mutex<(Option<SitePage>, Option<ImageDimensions>)>,
}

impl StaticPage {
    fn page(&self) -> Option<SitePage> {
        self.current.lock().unwrap().0.clone()
    }
}

#[async_trait]
impl PageSession for StaticPage {
    async fn goto(&self, url: &str) -> Result<u16> {
        if self.site.down.iter().any(|d| d == url) {
            return Err(ScanError::Navigation(format!("{}: net::ERR_CONNECTION_REFUSED", url)));
        }
        let mut current = self.current.lock().unwrap();
        if let Some(dimensions) = self.site.images.get(url) {
            *current = (Some(SitePage::ok("")), Some(*dimensions));
            return Ok(200);
        }
        let page = self
            .site
            .pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| SitePage::ok("Not found").status(404));
        let status = page.status;
        *current = (Some(page), None);
        Ok(status)
    }

    async fn count(&self, _selector: &str) -> Result<usize> {
        Ok(0)
    }

    async fn click(&self, selector: &str) -> Result<()> {
        Err(ScanError::SelectorNotFound(selector.to_string()))
    }

    async fn first_text(&self, selector: &str) -> Result<Option<String>> {
        Ok(match selector {
            "h1" => self.page().and_then(|p| p.h1),
            _ => None,
        })
    }

    async fn first_attribute(&self, selector: &str, attribute: &str) -> Result<Option<String>> {
        if selector == OG_IMAGE_SELECTOR && attribute == "content" {
            return Ok(self.page().and_then(|p| p.og_image));
        }
        Ok(None)
    }

    async fn anchor_hrefs(&self, _selector: &str) -> Result<Vec<String>> {
        Ok(self.page().map(|p| p.links).unwrap_or_default())
    }

    async fn body_text(&self) -> Result<String> {
        Ok(self.page().map(|p| p.text).unwrap_or_default())
    }

    async fn scroll_metrics(&self) -> Result<ScrollMetrics> {
        Ok(ScrollMetrics {
            scroll_top: 0.0,
            viewport_height: 800.0,
            scroll_height: 800.0,
        })
    }

    async fn scroll_by(&self, _distance: u32) -> Result<()> {
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(b"RIFF....WEBP".to_vec())
    }

    async fn first_image_size(&self) -> Result<Option<ImageDimensions>> {
        Ok(self.current.lock().unwrap().1)
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
