use crate::error::{CoreError, Result};
use crate::logs::RunLog;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use pageprobe_scanner::render::Renderer;
use pageprobe_scanner::{
    BrowserSettings, ChromiumRenderer, CrawlSummary, Crawler, EnabledChecks, ErrorSignal,
    PageSelectors, ProcessorConfig, ProgressCallback, ResultSink,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Options for configuring a crawl run
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub urls: Vec<String>,
    /// Parent of the timestamped run directory
    pub log_root: PathBuf,
    pub checks: EnabledChecks,
    pub selectors: PageSelectors,
    pub error_signal: ErrorSignal,
    pub headless: bool,
    pub show_progress_bars: bool,
}

impl CrawlOptions {
    pub fn processor_config(&self) -> ProcessorConfig {
        ProcessorConfig {
            checks: self.checks,
            selectors: self.selectors.clone(),
            error_signal: self.error_signal.clone(),
            ..ProcessorConfig::default()
        }
    }
}

/// What a finished run leaves behind
#[derive(Debug, Clone)]
pub struct CrawlRun {
    pub summary: CrawlSummary,
    pub log_dir: PathBuf,
    pub started_at: String,
}

/// Launch Chromium, crawl every seed into a fresh run log, and shut down.
pub async fn execute_crawl(options: CrawlOptions) -> Result<CrawlRun> {
    if options.urls.is_empty() {
        return Err(CoreError::NoSeeds);
    }

    let run_log = Arc::new(RunLog::create(&options.log_root)?);
    info!("Logging run to {}", run_log.dir().display());

    let renderer = ChromiumRenderer::launch(BrowserSettings {
        headless: options.headless,
        ..BrowserSettings::default()
    })
    .await?;

    let (summary, renderer) = crawl_with(renderer, run_log.clone(), &options).await;

    if let Err(e) = renderer.shutdown().await {
        warn!("Browser did not shut down cleanly: {}", e);
    }

    Ok(CrawlRun {
        summary,
        log_dir: run_log.dir().to_path_buf(),
        started_at: run_log.timestamp().to_string(),
    })
}

/// Spinner line for the link being visited
pub fn progress_message(position: usize, total: usize, url: &str) -> String {
    format!("Visiting link {} of {}: {}", position, total, url)
}

/// Crawl with any renderer and sink. Returns the renderer for shutdown.
pub async fn crawl_with<R: Renderer>(
    renderer: R,
    sink: Arc<dyn ResultSink>,
    options: &CrawlOptions,
) -> (CrawlSummary, R) {
    // Set up a spinner for overall progress (only if enabled)
    let progress_bar = if options.show_progress_bars {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let pb_clone = progress_bar.clone();
    let internal_progress_callback: ProgressCallback =
        Arc::new(move |position: usize, total: usize, url: &str| {
            let message = progress_message(position, total, url);
            debug!("{}", message);
            if let Some(ref pb) = pb_clone {
                pb.set_message(message);
                pb.tick();
            }
        });

    let mut crawler = Crawler::with_config(renderer, sink, options.processor_config())
        .with_progress_callback(internal_progress_callback);

    let summary = crawler.crawl(&options.urls).await;

    if let Some(ref pb) = progress_bar {
        pb.finish_with_message(format!(
            "Crawl complete! {} pages visited",
            summary.pages_visited
        ));
    }

    (summary, crawler.into_renderer())
}

/// Generate the end-of-run report
pub fn generate_crawl_report(run: &CrawlRun) -> String {
    let summary = &run.summary;
    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str("# Summary:\n");
    report.push_str(&format!("  Started at: {}\n", run.started_at));
    report.push_str(&format!("  Pages visited: {}\n", summary.pages_visited));
    report.push_str(&format!(
        "  Reachable: {}\n",
        summary.succeeded.to_string().green()
    ));
    report.push_str(&format!(
        "  Error pages: {}\n",
        summary.failed.to_string().yellow()
    ));
    report.push_str(&format!(
        "  Unreachable: {}\n",
        summary.errored.to_string().red()
    ));
    report.push_str(&format!("  Passes: {}\n", summary.passes));
    report.push_str(&format!("  Links discovered: {}\n", summary.links_discovered));
    report.push_str(&format!("  Logs: {}\n", run.log_dir.display()));
    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    report
}
