use anyhow::Context;
use clap::ArgMatches;
use colored::Colorize;
use pageprobe_core::logs::formatted_timestamp;
use pageprobe_scanner::{EnabledChecks, ErrorSignal, PageSelectors};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::commands::DEFAULT_LOG_DIR;

// Helper functions for crawl handler

/// Collect seed URLs from the `--url` argument and/or a hosts file
pub fn load_urls_from_source(
    url: Option<&Url>,
    hosts_file: Option<&PathBuf>,
) -> Result<Vec<String>, String> {
    let mut urls = Vec::new();
    if let Some(url) = url {
        urls.push(url.as_str().to_string());
    }
    if let Some(hosts_file_path) = hosts_file {
        urls.extend(load_urls_from_file(hosts_file_path)?);
    }

    if urls.is_empty() {
        return Err("Either --url or --hosts-file must be provided".to_string());
    }
    Ok(urls)
}

/// Load and parse URLs from a file
pub fn load_urls_from_file(path: &PathBuf) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read hosts file {}: {}", path.display(), e))?;

    let urls: Vec<String> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| parse_url_line(line.trim()))
        .collect();

    if urls.is_empty() {
        return Err(format!("No valid URLs found in {}", path.display()));
    }

    Ok(urls)
}

/// Parse a single line as a URL, trying to add http:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    // Try to parse as-is
    if let Ok(url) = Url::parse(line)
        && url.has_host()
    {
        return Some(line.to_string());
    }

    // Try adding http://
    let with_scheme = format!("http://{}", line);
    if Url::parse(&with_scheme).is_ok() {
        return Some(with_scheme);
    }

    eprintln!("{}  Skipping invalid URL '{}'", "⚠".yellow(), line);
    None
}

/// `--log-dir` with `~` expanded
pub fn log_root_from_args(args: &ArgMatches) -> PathBuf {
    let raw = args
        .get_one::<String>("log-dir")
        .map(String::as_str)
        .unwrap_or(DEFAULT_LOG_DIR);
    PathBuf::from(shellexpand::tilde(raw).as_ref())
}

pub fn crawl_options_from_args(args: &ArgMatches, quiet: bool) -> Result<CrawlOptions, String> {
    let urls = load_urls_from_source(
        args.get_one::<Url>("url"),
        args.get_one::<PathBuf>("hosts-file"),
    )?;

    let selector = |name: &str, default: &str| {
        args.get_one::<String>(name)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    };
    let defaults = PageSelectors::default();

    Ok(CrawlOptions {
        urls,
        log_root: log_root_from_args(args),
        checks: EnabledChecks {
            headings: args.get_flag("validate-heading-tags"),
            og_image: args.get_flag("validate-og-images"),
            screenshots: args.get_flag("take-screenshots"),
        },
        selectors: PageSelectors {
            follow: selector("follow-selector", &defaults.follow),
            more: selector("more-selector", &defaults.more),
            cookie_accept: selector("cookie-selector", &defaults.cookie_accept),
        },
        error_signal: ErrorSignal::new(selector("error-pattern", "error"))
            .with_empty_is_error(!args.get_flag("allow-empty-body")),
        headless: !args.get_flag("headful"),
        show_progress_bars: !quiet,
    })
}

// Re-export crawl types and functions from pageprobe-core
pub use pageprobe_core::crawl::{
    CrawlOptions, CrawlRun, execute_crawl, generate_crawl_report,
};

fn on_off(enabled: bool) -> colored::ColoredString {
    if enabled { "on".green() } else { "off".dimmed() }
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_run_configuration(options: &CrawlOptions, log_root: &Path) {
    print_divider();
    println!(
        "{} Started at {}",
        "→".blue(),
        formatted_timestamp().bright_white()
    );
    println!("{} Crawling {} seed URL(s)", "→".blue(), options.urls.len());
    println!("  Heading tags: {}", on_off(options.checks.headings));
    println!("  og:image:     {}", on_off(options.checks.og_image));
    println!("  Screenshots:  {}", on_off(options.checks.screenshots));
    println!("  Logs:         {}", log_root.display());
    print_divider();
    println!();
}

pub async fn handle_crawl(sub_matches: &ArgMatches, quiet: bool) -> anyhow::Result<CrawlRun> {
    let options = crawl_options_from_args(sub_matches, quiet).map_err(anyhow::Error::msg)?;

    if !quiet {
        print_run_configuration(&options, &options.log_root);
    }

    let run = execute_crawl(options)
        .await
        .context("Crawl failed")?;

    if !quiet {
        println!("\n{} Crawl complete!\n", "✓".green().bold());
        print!("{}", generate_crawl_report(&run));
    }

    Ok(run)
}
