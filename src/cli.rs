//! Command-line interface definitions for topshot_scrape.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every option has a default, so running with no arguments reproduces the
//! fully interactive flow.

use crate::browser::LaunchOptions;
use crate::loader::LoaderConfig;
use crate::prompt::PageCount;
use crate::scrapers::topshot::ScrapeSettings;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Command-line arguments for topshot_scrape.
///
/// # Examples
///
/// ```sh
/// # Interactive: pick the page count and the name at the prompts
/// topshot_scrape
///
/// # Unattended
/// topshot_scrape --headless --pages 10 --name "LeBron James" -o ./exports
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Marketplace search page to scrape
    #[arg(long, env = "TOPSHOT_URL", default_value = "https://www.nbatopshot.com/search?")]
    pub url: Url,

    /// Number of data pages to load; skips the menu
    #[arg(long, env = "TOPSHOT_PAGES", value_enum)]
    pub pages: Option<PageCount>,

    /// Player or team to export; skips the name prompt when it matches
    #[arg(long)]
    pub name: Option<String>,

    /// Directory the CSV file is written to
    #[arg(short, long, env = "TOPSHOT_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Run Chrome without a visible window
    #[arg(long, env = "TOPSHOT_HEADLESS")]
    pub headless: bool,

    /// Seconds to let the page settle after navigation
    #[arg(long, default_value_t = 20)]
    pub settle_secs: u64,

    /// Seconds to wait for the "Load more" button to appear
    #[arg(long, default_value_t = 20)]
    pub control_timeout_secs: u64,

    /// Milliseconds to pause after each scroll
    #[arg(long, default_value_t = 2000)]
    pub scroll_pause_ms: u64,
}

impl Cli {
    /// Scheme and host of `url`, e.g. `https://www.nbatopshot.com`.
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    pub fn scrape_settings(&self) -> ScrapeSettings {
        ScrapeSettings {
            launch: LaunchOptions {
                url: self.url.to_string(),
                headless: self.headless,
            },
            loader: LoaderConfig {
                control_timeout: Duration::from_secs(self.control_timeout_secs),
                scroll_pause: Duration::from_millis(self.scroll_pause_ms),
                ..LoaderConfig::default()
            },
            settle: Duration::from_secs(self.settle_secs),
            origin: self.origin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["topshot_scrape"]);

        assert_eq!(cli.url.as_str(), "https://www.nbatopshot.com/search?");
        assert_eq!(cli.pages, None);
        assert_eq!(cli.output_dir, PathBuf::from("."));
        assert!(!cli.headless);
        assert_eq!(cli.origin(), "https://www.nbatopshot.com");
    }

    #[test]
    fn test_cli_pages_thirty_maps_to_twenty_five() {
        let cli = Cli::parse_from(["topshot_scrape", "--pages", "30"]);
        assert_eq!(cli.pages.map(PageCount::attempts), Some(25));
    }

    #[test]
    fn test_cli_rejects_unlisted_pages() {
        assert!(Cli::try_parse_from(["topshot_scrape", "--pages", "25"]).is_err());
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "topshot_scrape",
            "-o",
            "/tmp/exports",
            "--name",
            "Ja Morant",
            "--headless",
        ]);

        assert_eq!(cli.output_dir, PathBuf::from("/tmp/exports"));
        assert_eq!(cli.name.as_deref(), Some("Ja Morant"));
        assert!(cli.headless);
    }

    #[test]
    fn test_scrape_settings_timings() {
        let cli = Cli::parse_from([
            "topshot_scrape",
            "--settle-secs",
            "0",
            "--control-timeout-secs",
            "5",
            "--scroll-pause-ms",
            "250",
        ]);
        let settings = cli.scrape_settings();

        assert_eq!(settings.settle, Duration::ZERO);
        assert_eq!(settings.loader.control_timeout, Duration::from_secs(5));
        assert_eq!(settings.loader.scroll_pause, Duration::from_millis(250));
        assert_eq!(settings.loader.poll_interval, LoaderConfig::default().poll_interval);
        assert_eq!(settings.origin, "https://www.nbatopshot.com");
    }
}
