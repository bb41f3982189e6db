use clap::{ArgAction, ArgGroup, arg, command};
use pageprobe_scanner::inspector::{
    DEFAULT_COOKIE_SELECTOR, DEFAULT_FOLLOW_SELECTOR, DEFAULT_MORE_SELECTOR,
};
use url::Url;

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub const DEFAULT_LOG_DIR: &str = "./logs";

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("pageprobe")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("pageprobe")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-q --"quiet" "Suppress banner and non-essential output")
                .required(false)
                .global(true),
        )
        .subcommand_required(false)
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl a site in a headless browser, following rel=\"follow\" links, and log \
                reachability, heading and og:image results.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("A seed URL to start crawling from")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(-H --"hosts-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of seed URLs")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .group(
                    ArgGroup::new("seeds")
                        .args(["url", "hosts-file"])
                        .required(true)
                        .multiple(true),
                )
                .arg(
                    arg!(-o --"log-dir" <PATH>)
                        .required(false)
                        .help("Directory that receives one timestamped folder per run")
                        .default_value(DEFAULT_LOG_DIR),
                )
                .arg(
                    arg!(--"validate-og-images")
                        .required(false)
                        .help("Validate the og:image of every page")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"validate-heading-tags")
                        .required(false)
                        .help("Record which of h1..h5 each page carries")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"take-screenshots")
                        .required(false)
                        .help("Save a full-page WebP screenshot of every page")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"error-pattern" <TEXT>)
                        .required(false)
                        .help("Case-insensitive text that marks a page as an error page")
                        .default_value("error"),
                )
                .arg(
                    arg!(--"allow-empty-body")
                        .required(false)
                        .help("Do not treat pages without visible text as error pages")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    arg!(--"follow-selector" <SELECTOR>)
                        .required(false)
                        .help("CSS selector of the anchors to follow")
                        .default_value(DEFAULT_FOLLOW_SELECTOR),
                )
                .arg(
                    arg!(--"more-selector" <SELECTOR>)
                        .required(false)
                        .help("CSS selector of the \"load more\" control")
                        .default_value(DEFAULT_MORE_SELECTOR),
                )
                .arg(
                    arg!(--"cookie-selector" <SELECTOR>)
                        .required(false)
                        .help("CSS selector of the cookie consent accept button")
                        .default_value(DEFAULT_COOKIE_SELECTOR),
                )
                .arg(
                    arg!(--"headful")
                        .required(false)
                        .help("Show the browser window instead of running headless")
                        .action(ArgAction::SetTrue),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_is_well_formed() {
        command_argument_builder().debug_assert();
    }

    #[test]
    fn test_crawl_requires_a_seed() {
        let result = command_argument_builder().try_get_matches_from(["pageprobe", "crawl"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_crawl_accepts_url_and_hosts_file_together() {
        let matches = command_argument_builder()
            .try_get_matches_from([
                "pageprobe",
                "crawl",
                "-u",
                "https://example.com",
                "-H",
                "hosts.txt",
            ])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "crawl");
        assert!(sub.get_one::<Url>("url").is_some());
        assert_eq!(sub.get_one::<String>("log-dir").unwrap(), DEFAULT_LOG_DIR);
    }

    #[test]
    fn test_quiet_after_subcommand() {
        let matches = command_argument_builder()
            .try_get_matches_from(["pageprobe", "crawl", "-u", "https://example.com", "-q"])
            .unwrap();
        assert!(matches.get_flag("quiet"));
    }
}
