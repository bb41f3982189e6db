//! Run orchestration for pageprobe: result logs, screenshot storage and the
//! crawl entry point used by the binary.

pub mod crawl;
pub mod error;
pub mod logs;
pub mod screenshot;

pub use error::CoreError;

use colored::Colorize;

const BANNER: &str = r#"
                                              __
    ____  ____ _____ ____  ____  _________  / /_  ___
   / __ \/ __ `/ __ `/ _ \/ __ \/ ___/ __ \/ __ \/ _ \
  / /_/ / /_/ / /_/ /  __/ /_/ / /  / /_/ / /_/ /  __/
 / .___/\__,_/\__, /\___/ .___/_/   \____/_.___/\___/
/_/          /____/    /_/
"#;

pub fn print_banner() {
    println!("{}", BANNER.bright_cyan().bold());
    println!(
        "  {} {}\n",
        "headings, og:image and error pages, crawled".bright_white(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
}
