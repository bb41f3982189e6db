//! Read-only inspection and best-effort interaction with a rendered page.

use crate::error::{Result, ScanError};
use crate::links::normalize_url;
use crate::render::PageSession;
use crate::result::{HeadingLevel, HeadingReport};
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

pub const DEFAULT_FOLLOW_SELECTOR: &str = r#"a[rel="follow"]"#;
pub const DEFAULT_MORE_SELECTOR: &str = r#"a[href*="/feed-page-"] button"#;
pub const DEFAULT_COOKIE_SELECTOR: &str = "#onetrust-accept-btn-handler";

const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Textual heuristic for pages that rendered a failure state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSignal {
    /// Matched case-insensitively against the visible body text
    pub pattern: String,
    /// Treat a page with no visible text as an error page
    pub empty_is_error: bool,
}

impl ErrorSignal {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            empty_is_error: true,
        }
    }

    pub fn with_empty_is_error(mut self, empty_is_error: bool) -> Self {
        self.empty_is_error = empty_is_error;
        self
    }

    pub fn matches(&self, visible_text: &str) -> bool {
        let text = visible_text.to_lowercase();
        if text.trim().is_empty() {
            return self.empty_is_error;
        }
        let pattern = self.pattern.to_lowercase();
        !pattern.is_empty() && text.contains(&pattern)
    }
}

impl Default for ErrorSignal {
    fn default() -> Self {
        Self::new("error")
    }
}

/// First element of each level h1..h5 checked independently
pub async fn heading_presence<S: PageSession + ?Sized>(page: &S) -> Result<HeadingReport> {
    let mut report = HeadingReport::new();
    for level in HeadingLevel::ALL {
        let text = page.first_text(level.tag()).await?;
        let present = text.is_some_and(|t| !t.is_empty());
        report.set(level, present);
    }
    Ok(report)
}

pub async fn has_error_signal<S: PageSession + ?Sized>(page: &S, signal: &ErrorSignal) -> Result<bool> {
    let text = page.body_text().await?;
    Ok(signal.matches(&text))
}

/// Raw hrefs of follow-marked anchors not yet visited, first-seen order, no repeats
pub async fn extract_links<S: PageSession + ?Sized>(
    page: &S,
    follow_selector: &str,
    already_visited: &HashSet<String>,
) -> Result<Vec<String>> {
    let hrefs = page.anchor_hrefs(follow_selector).await?;
    let mut collected = HashSet::new();
    let mut links = Vec::new();

    for href in hrefs {
        let key = normalize_url(&href);
        if already_visited.contains(&key) {
            continue;
        }
        if collected.insert(key) {
            links.push(href);
        }
    }

    Ok(links)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieConsent {
    Accepted,
    NotPresent,
    /// The button showed up but clicking it failed
    Failed(String),
}

/// Wait up to `timeout` for the consent button and click it. Never fails.
pub async fn accept_cookies<S: PageSession + ?Sized>(
    page: &S,
    selector: &str,
    timeout: Duration,
) -> CookieConsent {
    if let Err(e) = wait_for_selector(page, selector, timeout).await {
        debug!("Cookie banner not found: {}", e);
        return CookieConsent::NotPresent;
    }

    match page.click(selector).await {
        Ok(()) => {
            info!("Cookies accepted");
            CookieConsent::Accepted
        }
        Err(e) => {
            debug!("Cookie banner click failed: {}", e);
            CookieConsent::Failed(e.to_string())
        }
    }
}

/// Poll until `selector` matches at least one element
pub async fn wait_for_selector<S: PageSession + ?Sized>(
    page: &S,
    selector: &str,
    timeout: Duration,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    loop {
        if page.count(selector).await? > 0 {
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(ScanError::Timeout(format!(
                "waiting {}ms for {}",
                timeout.as_millis(),
                selector
            )));
        }
        sleep(SELECTOR_POLL_INTERVAL).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSettings {
    pub step: u32,
    pub delay: Duration,
    pub max_steps: usize,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            step: 300,
            delay: Duration::from_millis(25),
            max_steps: 2000,
        }
    }
}

/// Scroll in fixed steps until the viewport reaches the end of the content.
/// Returns the number of steps taken.
pub async fn scroll_to_bottom<S: PageSession + ?Sized>(page: &S, settings: ScrollSettings) -> Result<usize> {
    let mut steps = 0;
    while steps < settings.max_steps && !page.scroll_metrics().await?.at_bottom() {
        page.scroll_by(settings.step).await?;
        steps += 1;
        sleep(settings.delay).await;
    }
    if steps == settings.max_steps {
        warn!("Stopped scrolling after {} steps", steps);
    }
    Ok(steps)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpansionStop {
    /// The "load more" control is not on the page (any more)
    NoTrigger,
    /// The last activation revealed nothing new
    NoNewLinks,
    LimitReached,
    /// A DOM query or click failed; expansion stops quietly
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionOutcome {
    pub activations: usize,
    pub links_seen: usize,
    pub stop: ExpansionStop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaginationSettings<'a> {
    pub trigger_selector: &'a str,
    pub follow_selector: &'a str,
    pub max_expansions: usize,
    pub delay: Duration,
}

/// Click "load more" while each click keeps surfacing new follow links.
///
/// Seen links are tracked per call, never across pages.
pub async fn expand_pagination<S: PageSession + ?Sized>(
    page: &S,
    settings: &PaginationSettings<'_>,
) -> ExpansionOutcome {
    let mut seen: HashSet<String> = HashSet::new();
    let mut activations = 0;

    let stop = loop {
        if activations >= settings.max_expansions {
            break ExpansionStop::LimitReached;
        }

        match page.count(settings.trigger_selector).await {
            Ok(0) => {
                debug!("\"Load more\" control not found");
                break ExpansionStop::NoTrigger;
            }
            Ok(_) => {}
            Err(e) => break ExpansionStop::Failed(e.to_string()),
        }

        let hrefs = match page.anchor_hrefs(settings.follow_selector).await {
            Ok(hrefs) => hrefs,
            Err(e) => break ExpansionStop::Failed(e.to_string()),
        };
        let mut fresh: Vec<String> = Vec::new();
        for href in hrefs {
            let key = normalize_url(&href);
            if !seen.contains(&key) && !fresh.contains(&key) {
                fresh.push(key);
            }
        }
        if fresh.is_empty() {
            break ExpansionStop::NoNewLinks;
        }

        if let Err(e) = page.click(settings.trigger_selector).await {
            warn!("Clicking \"load more\" failed: {}", e);
            break ExpansionStop::Failed(e.to_string());
        }
        activations += 1;
        debug!(
            "\"Load more\" activation {} ({} new links before click)",
            activations,
            fresh.len()
        );
        seen.extend(fresh);

        sleep(settings.delay).await;
    };

    ExpansionOutcome {
        activations,
        links_seen: seen.len(),
        stop,
    }
}
