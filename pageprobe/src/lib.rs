pub mod commands;
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    crawl_options_from_args, load_urls_from_file, load_urls_from_source, log_root_from_args,
    parse_url_line,
};

// Re-export crawl functionality from pageprobe-core
pub use pageprobe_core::crawl::{
    CrawlOptions, CrawlRun, execute_crawl, generate_crawl_report,
};
