// In-memory site used by the integration tests.
//
// Pages are plain HTML parsed with scraper on every query, so selectors behave
// the way they do in a real document. Clicking a `.load-more` button reveals
// the next content batch; clicking the consent button removes the banner.

#![allow(dead_code)]

use async_trait::async_trait;
use pageprobe_scanner::error::{Result, ScanError};
use pageprobe_scanner::links::normalize_url;
use pageprobe_scanner::render::{PageSession, Renderer, ScrollMetrics};
use pageprobe_scanner::result::ImageDimensions;
use scraper::{ElementRef, Html, Selector};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;

pub const VIEWPORT_HEIGHT: f64 = 800.0;

const COOKIE_BANNER: &str =
    r#"<div id="consent"><button id="onetrust-accept-btn-handler">Accept</button></div>"#;
const MORE_BUTTON: &str = r#"<a href="/feed-page-2"><button class="load-more">More</button></a>"#;

#[derive(Debug, Clone)]
pub struct FakePage {
    status: u16,
    head: String,
    batches: Vec<String>,
    scroll_height: f64,
    cookie_banner: bool,
}

impl FakePage {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            head: String::new(),
            batches: vec![String::new()],
            scroll_height: VIEWPORT_HEIGHT,
            cookie_banner: false,
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn head(mut self, html: &str) -> Self {
        self.head.push_str(html);
        self
    }

    pub fn og_image(self, url: &str) -> Self {
        self.head(&format!(r#"<meta property="og:image" content="{}">"#, url))
    }

    pub fn body(mut self, html: &str) -> Self {
        self.batches[0].push_str(html);
        self
    }

    /// Content revealed by the next "load more" click
    pub fn more(mut self, html: &str) -> Self {
        self.batches.push(html.to_string());
        self
    }

    pub fn tall(mut self, scroll_height: f64) -> Self {
        self.scroll_height = scroll_height;
        self
    }

    pub fn with_cookie_banner(mut self) -> Self {
        self.cookie_banner = true;
        self
    }
}

/// Anchors matching the default follow selector
pub fn follow_links(hrefs: &[&str]) -> String {
    hrefs
        .iter()
        .map(|href| format!(r#"<a rel="follow" href="{}">link</a>"#, href))
        .collect()
}

#[derive(Debug, Default)]
pub struct SiteStats {
    opened: AtomicUsize,
    closed: AtomicUsize,
    more_clicks: AtomicUsize,
    navigations: Mutex<Vec<String>>,
}

impl SiteStats {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn more_clicks(&self) -> usize {
        self.more_clicks.load(Ordering::SeqCst)
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }
}

#[derive(Debug, Clone, Default)]
struct SiteData {
    pages: HashMap<String, FakePage>,
    images: HashMap<String, ImageDimensions>,
    unreachable: HashSet<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeSite {
    data: Arc<SiteData>,
    stats: Arc<SiteStats>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, page: FakePage) -> Self {
        Arc::make_mut(&mut self.data)
            .pages
            .insert(normalize_url(url), page);
        self
    }

    pub fn image(mut self, url: &str, width: u32, height: u32) -> Self {
        Arc::make_mut(&mut self.data)
            .images
            .insert(url.to_string(), ImageDimensions { width, height });
        self
    }

    pub fn unreachable(mut self, url: &str) -> Self {
        Arc::make_mut(&mut self.data)
            .unreachable
            .insert(normalize_url(url));
        self
    }

    pub fn stats(&self) -> Arc<SiteStats> {
        self.stats.clone()
    }
}

#[async_trait]
impl Renderer for FakeSite {
    type Session = FakeSession;

    async fn open_page(&self) -> Result<FakeSession> {
        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        Ok(FakeSession {
            data: self.data.clone(),
            stats: self.stats.clone(),
            state: Mutex::new(SessionState::default()),
        })
    }
}

#[derive(Debug, Default)]
struct SessionState {
    url: Option<String>,
    page: Option<FakePage>,
    image: Option<ImageDimensions>,
    revealed: usize,
    cookies_accepted: bool,
    scroll_top: f64,
}

pub struct FakeSession {
    data: Arc<SiteData>,
    stats: Arc<SiteStats>,
    state: Mutex<SessionState>,
}

impl FakeSession {
    fn document(&self) -> String {
        let state = self.state.lock().unwrap();
        let Some(page) = &state.page else {
            return "<html><head></head><body></body></html>".to_string();
        };

        let mut body = String::new();
        if page.cookie_banner && !state.cookies_accepted {
            body.push_str(COOKIE_BANNER);
        }
        for batch in page.batches.iter().take(state.revealed + 1) {
            body.push_str(batch);
        }
        if state.revealed + 1 < page.batches.len() {
            body.push_str(MORE_BUTTON);
        }
        format!("<html><head>{}</head><body>{}</body></html>", page.head, body)
    }

    fn query<T>(&self, selector: &str, f: impl Fn(ElementRef<'_>) -> T) -> Result<Vec<T>> {
        let parsed = Selector::parse(selector)
            .map_err(|e| ScanError::Script(format!("{}: {:?}", selector, e)))?;
        let html = Html::parse_document(&self.document());
        Ok(html.select(&parsed).map(f).collect())
    }

    fn resolve(&self, href: &str) -> String {
        let state = self.state.lock().unwrap();
        state
            .url
            .as_deref()
            .and_then(|base| Url::parse(base).ok())
            .and_then(|base| base.join(href).ok())
            .map(|u| u.to_string())
            .unwrap_or_else(|| href.to_string())
    }
}

#[async_trait]
impl PageSession for FakeSession {
    async fn goto(&self, url: &str) -> Result<u16> {
        self.stats.navigations.lock().unwrap().push(url.to_string());
        let key = normalize_url(url);
        if self.data.unreachable.contains(&key) {
            return Err(ScanError::Navigation(format!("{}: net::ERR_NAME_NOT_RESOLVED", url)));
        }

        let mut state = self.state.lock().unwrap();
        *state = SessionState {
            url: Some(url.to_string()),
            ..SessionState::default()
        };

        if let Some(dimensions) = self.data.images.get(url) {
            state.image = Some(*dimensions);
            state.page = Some(FakePage::ok().body("<img>"));
            return Ok(200);
        }

        let page = self
            .data
            .pages
            .get(&key)
            .cloned()
            .unwrap_or_else(|| FakePage::new(404).body("<h1>Not found</h1>"));
        let status = page.status;
        state.page = Some(page);
        Ok(status)
    }

    async fn count(&self, selector: &str) -> Result<usize> {
        Ok(self.query(selector, |_| ())?.len())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let targets = self.query(selector, |el| {
            let value = el.value();
            (
                value.classes().any(|c| c == "load-more"),
                value.id() == Some("onetrust-accept-btn-handler"),
            )
        })?;
        let Some((load_more, consent)) = targets.first().copied() else {
            return Err(ScanError::SelectorNotFound(selector.to_string()));
        };

        let mut state = self.state.lock().unwrap();
        if load_more {
            state.revealed += 1;
            self.stats.more_clicks.fetch_add(1, Ordering::SeqCst);
        }
        if consent {
            state.cookies_accepted = true;
        }
        Ok(())
    }

    async fn first_text(&self, selector: &str) -> Result<Option<String>> {
        Ok(self
            .query(selector, |el| el.text().collect::<String>())?
            .into_iter()
            .next())
    }

    async fn first_attribute(&self, selector: &str, attribute: &str) -> Result<Option<String>> {
        Ok(self
            .query(selector, |el| el.value().attr(attribute).map(str::to_string))?
            .into_iter()
            .next()
            .flatten())
    }

    async fn anchor_hrefs(&self, selector: &str) -> Result<Vec<String>> {
        let hrefs = self.query(selector, |el| el.value().attr("href").map(str::to_string))?;
        Ok(hrefs
            .into_iter()
            .flatten()
            .map(|href| self.resolve(&href))
            .collect())
    }

    async fn body_text(&self) -> Result<String> {
        Ok(self
            .query("body", |el| el.text().collect::<Vec<_>>().join(" "))?
            .join(" "))
    }

    async fn scroll_metrics(&self) -> Result<ScrollMetrics> {
        let state = self.state.lock().unwrap();
        Ok(ScrollMetrics {
            scroll_top: state.scroll_top,
            viewport_height: VIEWPORT_HEIGHT,
            scroll_height: state
                .page
                .as_ref()
                .map_or(VIEWPORT_HEIGHT, |p| p.scroll_height),
        })
    }

    async fn scroll_by(&self, distance: u32) -> Result<()> {
        self.state.lock().unwrap().scroll_top += distance as f64;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        let state = self.state.lock().unwrap();
        Ok(format!("webp:{}", state.url.as_deref().unwrap_or_default()).into_bytes())
    }

    async fn first_image_size(&self) -> Result<Option<ImageDimensions>> {
        Ok(self.state.lock().unwrap().image)
    }

    async fn close(&self) -> Result<()> {
        self.stats.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
