use crate::error::Result;
use crate::image::{OG_IMAGE_SELECTOR, RendererImageLoader, validate_og_image};
use crate::inspector::{
    self, DEFAULT_COOKIE_SELECTOR, DEFAULT_FOLLOW_SELECTOR, DEFAULT_MORE_SELECTOR, ErrorSignal,
    PaginationSettings, ScrollSettings,
};
use crate::links::normalize_url;
use crate::render::{PageSession, Renderer};
use crate::result::{PageClassification, PageOutcome, classify};
use crate::sink::{CrawlEvent, ResultSink};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Optional checks run on every page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnabledChecks {
    pub headings: bool,
    pub og_image: bool,
    pub screenshots: bool,
}

/// CSS selectors for the page features the processor interacts with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelectors {
    /// Anchors eligible for traversal
    pub follow: String,
    /// "Load more" control
    pub more: String,
    /// Cookie consent accept button
    pub cookie_accept: String,
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self {
            follow: DEFAULT_FOLLOW_SELECTOR.to_string(),
            more: DEFAULT_MORE_SELECTOR.to_string(),
            cookie_accept: DEFAULT_COOKIE_SELECTOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorConfig {
    pub checks: EnabledChecks,
    pub selectors: PageSelectors,
    pub error_signal: ErrorSignal,
    pub cookie_timeout: Duration,
    pub max_expansions: usize,
    pub pagination_delay: Duration,
    pub scroll: ScrollSettings,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            checks: EnabledChecks::default(),
            selectors: PageSelectors::default(),
            error_signal: ErrorSignal::default(),
            cookie_timeout: Duration::from_secs(5),
            max_expansions: 20,
            pagination_delay: Duration::from_millis(850),
            scroll: ScrollSettings::default(),
        }
    }
}

/// Visits one page at a time and reports what it found.
///
/// The processor never touches the frontier: it reads the visited set it is
/// handed and returns the links it discovered.
pub struct PageProcessor<R: Renderer> {
    renderer: R,
    config: ProcessorConfig,
}

impl<R: Renderer> PageProcessor<R> {
    pub fn new(renderer: R, config: ProcessorConfig) -> Self {
        Self { renderer, config }
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Process `url` in a fresh page context, closed on every exit path
    pub async fn process(
        &self,
        url: &str,
        visited: &HashSet<String>,
        sink: &dyn ResultSink,
    ) -> Result<PageOutcome> {
        let session = self.renderer.open_page().await?;
        let outcome = self.visit(&session, url, visited, sink).await;
        if let Err(e) = session.close().await {
            warn!("Failed to close page for {}: {}", url, e);
        }
        outcome
    }

    async fn visit(
        &self,
        page: &R::Session,
        url: &str,
        visited: &HashSet<String>,
        sink: &dyn ResultSink,
    ) -> Result<PageOutcome> {
        let checks = self.config.checks;
        let selectors = &self.config.selectors;

        debug!("Navigating to {}", url);
        let status_code = page.goto(url).await?;

        inspector::accept_cookies(page, &selectors.cookie_accept, self.config.cookie_timeout).await;

        if checks.screenshots {
            inspector::scroll_to_bottom(page, self.config.scroll).await?;
            let image = page.screenshot().await?;
            let path = sink.save_screenshot(url, &image)?;
            info!("Screenshot: {} -> {}", url, path.display());
        }

        if checks.headings {
            let report = inspector::heading_presence(page).await?;
            sink.record(&CrawlEvent::Headings {
                url: url.to_string(),
                report,
            })?;
        }

        if checks.og_image {
            let meta = page.first_attribute(OG_IMAGE_SELECTOR, "content").await?;
            let loader = RendererImageLoader::new(&self.renderer);
            let result = validate_og_image(meta.as_deref(), &loader).await;
            sink.record(&CrawlEvent::OgImage {
                page_url: url.to_string(),
                result,
            })?;
        }

        let expansion = inspector::expand_pagination(
            page,
            &PaginationSettings {
                trigger_selector: &selectors.more,
                follow_selector: &selectors.follow,
                max_expansions: self.config.max_expansions,
                delay: self.config.pagination_delay,
            },
        )
        .await;
        debug!(
            "Pagination on {}: {} activations, stopped: {:?}",
            url, expansion.activations, expansion.stop
        );

        let is_error_page = inspector::has_error_signal(page, &self.config.error_signal).await?;
        let classification = classify(status_code, is_error_page);

        let mut discovered_links = Vec::new();
        match classification {
            PageClassification::Success => {
                sink.record(&CrawlEvent::PageSucceeded {
                    url: url.to_string(),
                })?;
                info!("Page reachable: {}", url);

                discovered_links = inspector::extract_links(page, &selectors.follow, visited)
                    .await?
                    .iter()
                    .map(|href| normalize_url(href))
                    .collect();
            }
            PageClassification::Error => {
                sink.record(&CrawlEvent::PageFailed {
                    url: url.to_string(),
                    status_code,
                    is_error_page,
                })?;
                warn!("Error on {}: status {}, error page: {}", url, status_code, is_error_page);
            }
        }

        sink.record(&CrawlEvent::PageCompleted {
            url: url.to_string(),
        })?;

        Ok(PageOutcome {
            url: url.to_string(),
            status_code,
            is_error_page,
            classification,
            discovered_links,
        })
    }
}
