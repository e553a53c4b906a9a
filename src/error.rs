//! Error types for each stage of the scrape pipeline.
//!
//! Field absence during extraction is not an error and has no variant here;
//! see [`crate::models::Record`].

use crate::models::RecordStore;
use chromiumoxide::error::CdpError;
use std::time::Duration;
use thiserror::Error;

/// Failures talking to the browser.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("invalid browser configuration: {0}")]
    Config(String),

    #[error("devtools command failed: {0}")]
    Cdp(#[from] CdpError),

    #[error("unexpected script result: {0}")]
    Script(String),
}

/// Failures during the incremental load phase.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The "Load more" control never showed up. Treated as a setup failure.
    #[error("`Load more` control did not appear within {0:?}")]
    ControlNotFound(Duration),

    #[error(transparent)]
    Browser(#[from] BrowserError),
}

/// The load phase failed; `partial` holds whatever could still be extracted.
#[derive(Debug, Error)]
#[error("scrape incomplete ({} records captured): {cause}", .partial.len())]
pub struct ScrapeIncomplete {
    pub partial: RecordStore,
    #[source]
    pub cause: LoadError,
}

/// Failures resolving a user-entered name.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("`{0}` is not one of the collected names")]
    InvalidName(String),

    #[error("selection aborted")]
    Aborted,

    #[error("terminal unavailable: {0}")]
    Terminal(String),
}

/// Failures writing the CSV export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize record: {0}")]
    Csv(#[from] csv::Error),
}
