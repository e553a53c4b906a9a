//! # topshot_scrape
//!
//! Scrapes listing cards from the NBA Top Shot marketplace search page,
//! lets the operator pick a player or team from the names found, and saves
//! that player's listings to a dated CSV file.
//!
//! ## Usage
//!
//! ```sh
//! topshot_scrape                      # fully interactive
//! topshot_scrape --pages 20 -o ./out  # preselect the page count
//! ```
//!
//! ## Architecture
//!
//! The application is a strictly sequential pipeline:
//! 1. **Loading**: Drive Chrome to press "Load more" up to N times
//! 2. **Extraction**: Parse the final page snapshot into records
//! 3. **Selection**: Prompt for a name among those collected
//! 4. **Output**: Write the matching records to `topshot_data_MMDDYYYY.csv`

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod browser;
mod cli;
mod error;
mod loader;
mod models;
mod outputs;
mod prompt;
mod scrapers;
mod utils;

use cli::Cli;
use outputs::csv::export;
use prompt::{format_names, prompt_name, prompt_pages, resolve};
use scrapers::topshot::scrape_listings;
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("topshot_scrape starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // Early check: fail before spending minutes in the browser
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Page count ----
    let pages = match args.pages {
        Some(pages) => pages,
        None => prompt_pages().inspect_err(|e| error!(error = %e, "No page count selected"))?,
    };
    info!(label = pages.label(), attempts = pages.attempts(), "Page count selected");

    // ---- Load and extract ----
    let settings = args.scrape_settings();
    let store = match scrape_listings(&settings, pages.attempts()).await {
        Ok(store) => store,
        Err(incomplete) => {
            error!(
                error = %incomplete,
                captured = incomplete.partial.len(),
                "Scrape did not complete; continuing with partial data"
            );
            println!("{incomplete}");
            incomplete.partial
        }
    };
    info!(count = store.len(), "Records collected");

    // ---- Selection ----
    let names = store.distinct_names();
    if names.is_empty() {
        warn!("No names collected; nothing to export");
        println!("No players or teams were collected, so there is nothing to export.");
        return Ok(());
    }
    println!("Here are the players we collected: {}", format_names(&names));

    let preselected = match args.name.as_deref().map(|n| resolve(n, &names)) {
        Some(Ok(name)) => Some(name.to_string()),
        Some(Err(e)) => {
            println!("{e}. Pick one from the list instead.");
            None
        }
        None => None,
    };
    let target = match preselected {
        Some(name) => name,
        None => prompt_name(&names).inspect_err(|e| error!(error = %e, "No name selected"))?,
    };

    debug!(first = ?store.find(&target), "First listing for selection");
    let selected = store.filter_by_name(&target);
    println!("Here are the data about {target}:");
    for record in &selected {
        println!("  {}", serde_json::to_string(record)?);
    }

    // ---- Output ----
    let summary = export(&selected, &args.output_dir, Local::now().date_naive()).await?;
    println!(
        "{} items of data have been saved, and the file path is: {}",
        summary.rows,
        summary.path.display()
    );

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        rows = summary.rows,
        "Execution complete"
    );

    Ok(())
}
