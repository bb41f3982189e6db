use crate::frontier::Frontier;
use crate::processor::{PageProcessor, ProcessorConfig};
use crate::render::Renderer;
use crate::result::{CrawlSummary, PageOutcome};
use crate::sink::{CrawlEvent, ResultSink};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Called before each page visit with `(position, total known, url)`
pub type ProgressCallback = Arc<dyn Fn(usize, usize, &str) + Send + Sync>;

/// Drives the traversal: seeds first, then wave after wave of discovered links
/// until a pass visits nothing new.
pub struct Crawler<R: Renderer> {
    processor: PageProcessor<R>,
    sink: Arc<dyn ResultSink>,
    frontier: Frontier,
    summary: CrawlSummary,
    progress_callback: Option<ProgressCallback>,
}

impl<R: Renderer> Crawler<R> {
    pub fn new(renderer: R, sink: Arc<dyn ResultSink>) -> Self {
        Self::with_config(renderer, sink, ProcessorConfig::default())
    }

    pub fn with_config(renderer: R, sink: Arc<dyn ResultSink>, config: ProcessorConfig) -> Self {
        Self {
            processor: PageProcessor::new(renderer, config),
            sink,
            frontier: Frontier::new(),
            summary: CrawlSummary::default(),
            progress_callback: None,
        }
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub async fn crawl<S: AsRef<str>>(&mut self, seeds: &[S]) -> CrawlSummary {
        let seeds = self.frontier.seed(seeds.iter().map(|s| s.as_ref()));
        info!("Starting crawl from {} seed(s)", seeds.len());

        for seed in &seeds {
            self.visit(seed).await;
        }

        loop {
            let batch = self.frontier.next_batch();
            if batch.is_empty() {
                break;
            }
            self.summary.passes += 1;
            debug!("Pass {}: {} pending links", self.summary.passes, batch.len());

            for link in batch {
                if !self.frontier.mark_visited(&link) {
                    continue;
                }
                self.visit(&link).await;
            }
        }

        self.summary.links_discovered = self.frontier.discovered_count();
        info!(
            "Crawl complete. Visited {} pages in {} passes",
            self.summary.pages_visited, self.summary.passes
        );
        self.summary.clone()
    }

    async fn visit(&mut self, url: &str) {
        self.summary.pages_visited += 1;
        if let Some(ref callback) = self.progress_callback {
            let total = self.frontier.discovered_count().max(self.frontier.visited_count());
            callback(self.summary.pages_visited, total, url);
        }

        let result = self
            .processor
            .process(url, self.frontier.visited(), self.sink.as_ref())
            .await;

        match result {
            Ok(outcome) => self.absorb(outcome),
            Err(e) => {
                self.summary.errored += 1;
                error!("Page unreachable: {} - {}", url, e);
                let event = CrawlEvent::ProcessingFailed {
                    url: url.to_string(),
                    message: e.to_string(),
                };
                if let Err(sink_error) = self.sink.record(&event) {
                    warn!("Could not record failure for {}: {}", url, sink_error);
                }
            }
        }
    }

    fn absorb(&mut self, outcome: PageOutcome) {
        if !outcome.is_success() {
            self.summary.failed += 1;
            return;
        }
        self.summary.succeeded += 1;

        let added = self.frontier.record_discovered(&outcome.discovered_links);
        if added > 0 {
            info!(
                "Found {} unique follow links on {}, {} total",
                added,
                outcome.url,
                self.frontier.discovered_count()
            );
        }
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn summary(&self) -> &CrawlSummary {
        &self.summary
    }

    pub fn into_renderer(self) -> R {
        self.processor.into_renderer()
    }
}
