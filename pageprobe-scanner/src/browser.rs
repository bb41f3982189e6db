//! Headless Chromium implementation of the rendering capability.

use crate::error::{Result, ScanError};
use crate::render::{PageSession, Renderer, ScrollMetrics};
use crate::result::ImageDimensions;
use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{EventResponseReceived, ResourceType};
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, EventDomContentEventFired, FrameId,
};
use chromiumoxide::listeners::EventStream;
use chromiumoxide::page::ScreenshotParams;
use futures::{FutureExt, StreamExt};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Launch settings for the browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserSettings {
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub screenshot_quality: i64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 800,
            screenshot_quality: 70,
        }
    }
}

pub struct ChromiumRenderer {
    browser: Browser,
    handler: JoinHandle<()>,
    settings: BrowserSettings,
}

impl ChromiumRenderer {
    pub async fn launch(settings: BrowserSettings) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .window_size(settings.viewport_width, settings.viewport_height);
        if !settings.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(ScanError::Browser)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScanError::Browser(format!("failed to launch Chromium: {}", e)))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler event error: {}", e);
                }
            }
        });

        info!("Chromium launched (headless: {})", settings.headless);
        Ok(Self {
            browser,
            handler,
            settings,
        })
    }

    pub async fn shutdown(mut self) -> Result<()> {
        self.browser.close().await?;
        if let Err(e) = self.browser.wait().await {
            debug!("Browser process did not exit cleanly: {}", e);
        }
        self.handler.abort();
        info!("Chromium closed");
        Ok(())
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    type Session = ChromiumPage;

    async fn open_page(&self) -> Result<ChromiumPage> {
        let page = self.browser.new_page("about:blank").await?;
        Ok(ChromiumPage {
            page,
            screenshot_quality: self.settings.screenshot_quality,
        })
    }
}

pub struct ChromiumPage {
    page: Page,
    screenshot_quality: i64,
}

/// Wraps a JS body so it always returns a JSON string. Plain `null` results
/// carry no value over CDP, strings always do.
fn json_script(body: &str) -> String {
    format!("JSON.stringify((() => {{ {} }})())", body)
}

fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// A usable HTTP status, `None` for 0 or anything out of range
fn http_status(raw: i64) -> Option<u16> {
    u16::try_from(raw).ok().filter(|status| *status > 0)
}

/// Prefer the status CDP reported for the document, then navigation timing, then 0
fn resolve_status(document: Option<u16>, timing: Option<u16>) -> u16 {
    document.or(timing).unwrap_or(0)
}

/// Status of the first main-frame document response already buffered in `responses`
fn buffered_document_status(
    responses: &mut EventStream<EventResponseReceived>,
    main_frame: Option<&FrameId>,
) -> Option<u16> {
    while let Some(Some(event)) = responses.next().now_or_never() {
        let is_main_frame = main_frame.is_none() || event.frame_id.as_ref() == main_frame;
        if event.r#type == ResourceType::Document && is_main_frame {
            return http_status(event.response.status);
        }
    }
    None
}

impl ChromiumPage {
    async fn eval<T: DeserializeOwned>(&self, body: &str) -> Result<T> {
        let result = self
            .page
            .evaluate(json_script(body))
            .await
            .map_err(|e| ScanError::Script(e.to_string()))?;
        let json: String = result
            .into_value()
            .map_err(|e| ScanError::Script(e.to_string()))?;
        serde_json::from_str(&json).map_err(|e| ScanError::Script(e.to_string()))
    }
}

#[derive(Deserialize)]
struct RawScrollMetrics {
    scroll_top: f64,
    viewport_height: f64,
    scroll_height: f64,
}

#[async_trait]
impl PageSession for ChromiumPage {
    /// Resolves once the DOM content is loaded. `Page::goto` alone would also
    /// wait for every subresource.
    async fn goto(&self, url: &str) -> Result<u16> {
        let mut dom_ready = self
            .page
            .event_listener::<EventDomContentEventFired>()
            .await?;
        let mut responses = self.page.event_listener::<EventResponseReceived>().await?;
        let main_frame = self.page.mainframe().await?;

        tokio::select! {
            navigation = self.page.goto(url) => {
                navigation.map_err(|e| ScanError::Navigation(format!("{}: {}", url, e)))?;
            }
            _ = dom_ready.next() => {
                debug!("DOM content loaded: {}", url);
            }
        }

        let document = buffered_document_status(&mut responses, main_frame.as_ref());
        let timing: Option<u16> = if document.is_some() {
            None
        } else {
            self.eval(
                "const nav = performance.getEntriesByType('navigation')[0]; \
                 return nav && nav.responseStatus ? nav.responseStatus : null;",
            )
            .await?
        };
        Ok(resolve_status(document, timing))
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        self.eval(&format!(
            "return document.querySelectorAll({}).length;",
            js_string(selector)
        ))
        .await
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| ScanError::SelectorNotFound(selector.to_string()))?;
        element.click().await?;
        Ok(())
    }

    async fn first_text(&self, selector: &str) -> Result<Option<String>> {
        self.eval(&format!(
            "const el = document.querySelector({}); return el ? el.textContent : null;",
            js_string(selector)
        ))
        .await
    }

    async fn first_attribute(&self, selector: &str, attribute: &str) -> Result<Option<String>> {
        self.eval(&format!(
            "const el = document.querySelector({}); return el ? el.getAttribute({}) : null;",
            js_string(selector),
            js_string(attribute)
        ))
        .await
    }

    async fn anchor_hrefs(&self, selector: &str) -> Result<Vec<String>> {
        self.eval(&format!(
            "return Array.from(document.querySelectorAll({}))
                .map(a => a.href)
                .filter(h => typeof h === 'string' && h.length > 0);",
            js_string(selector)
        ))
        .await
    }

    async fn body_text(&self) -> Result<String> {
        self.eval("return document.body ? document.body.innerText || '' : '';")
            .await
    }

    async fn scroll_metrics(&self) -> Result<ScrollMetrics> {
        let raw: RawScrollMetrics = self
            .eval(
                "const el = document.scrollingElement || document.documentElement; \
                 return { scroll_top: el.scrollTop, viewport_height: window.innerHeight, \
                          scroll_height: el.scrollHeight };",
            )
            .await?;
        Ok(ScrollMetrics {
            scroll_top: raw.scroll_top,
            viewport_height: raw.viewport_height,
            scroll_height: raw.scroll_height,
        })
    }

    async fn scroll_by(&self, distance: u32) -> Result<()> {
        let _: bool = self
            .eval(&format!("window.scrollBy(0, {}); return true;", distance))
            .await?;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Webp)
            .quality(self.screenshot_quality)
            .full_page(true)
            .build();
        Ok(self.page.screenshot(params).await?)
    }

    async fn first_image_size(&self) -> Result<Option<ImageDimensions>> {
        self.eval(
            "const img = document.querySelector('img'); \
             return img ? { width: img.naturalWidth, height: img.naturalHeight } : null;",
        )
        .await
    }

    async fn close(&self) -> Result<()> {
        self.page.clone().close().await?;
        Ok(())
    }
}
