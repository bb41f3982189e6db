use colored::Colorize;
use pageprobe::commands::command_argument_builder;
use pageprobe::handlers::{handle_crawl, log_root_from_args};
use pageprobe_core::logs::{formatted_timestamp, log_fatal_error, log_run_finished};
use pageprobe_core::print_banner;
use std::process::ExitCode;
use tracing::Level;

#[tokio::main]
async fn main() -> ExitCode {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    match chosen_command.subcommand() {
        Some(("crawl", primary_command)) => {
            tracing_subscriber::fmt()
                .with_max_level(if quiet { Level::WARN } else { Level::INFO })
                .init();

            let log_root = log_root_from_args(primary_command);
            let code = match handle_crawl(primary_command, quiet).await {
                Ok(_) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("{} {:#}", "✗".red().bold(), e);
                    if let Err(log_err) = log_fatal_error(&log_root, &format!("{:#}", e)) {
                        eprintln!("✗ Could not write error log: {}", log_err);
                    }
                    ExitCode::FAILURE
                }
            };

            let finished = formatted_timestamp();
            if let Err(log_err) = log_run_finished(&log_root, &finished) {
                eprintln!("✗ Could not write completion log: {}", log_err);
            }
            if !quiet {
                println!("Finished at {}", finished);
            }
            code
        }
        // No subcommand provided, just show the banner
        _ => ExitCode::SUCCESS,
    }
}
