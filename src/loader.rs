//! Incremental loading of an infinitely-scrolling page.
//!
//! The search page only renders a first batch of listings. More appear after
//! scrolling to the bottom and pressing "Load more". [`load_more`] repeats
//! that up to a caller-chosen number of times and stops early once the page
//! height stops growing. That stop rule is a heuristic; it does not prove
//! every listing has loaded.

use crate::browser::PageDriver;
use crate::error::LoadError;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, instrument};

/// Timing knobs for the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Upper bound on waiting for the control to appear.
    pub control_timeout: Duration,
    /// How often presence is re-checked while waiting.
    pub poll_interval: Duration,
    /// Pause after each scroll so async content can render.
    pub scroll_pause: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            control_timeout: Duration::from_secs(20),
            poll_interval: Duration::from_millis(500),
            scroll_pause: Duration::from_secs(2),
        }
    }
}

/// What a load run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub iterations: u32,
    pub clicks: u32,
    pub final_height: u64,
    /// Height stopped changing before `attempts` ran out.
    pub stopped_early: bool,
}

/// Poll until the control is present, or fail with [`LoadError::ControlNotFound`].
#[instrument(level = "info", skip_all, fields(timeout = ?cfg.control_timeout))]
pub async fn wait_for_control<D: PageDriver>(
    driver: &mut D,
    cfg: &LoaderConfig,
) -> Result<(), LoadError> {
    let deadline = Instant::now() + cfg.control_timeout;
    loop {
        if driver.load_more_present().await? {
            debug!("Load more control present");
            return Ok(());
        }
        if Instant::now() >= deadline {
            return Err(LoadError::ControlNotFound(cfg.control_timeout));
        }
        sleep(cfg.poll_interval).await;
    }
}

/// Scroll and click "Load more" up to `attempts` times.
///
/// A control that is not visible on a given pass is skipped, not treated as
/// failure. Any driver error aborts the run.
#[instrument(level = "info", skip_all, fields(attempts = attempts))]
pub async fn load_more<D: PageDriver>(
    driver: &mut D,
    attempts: u32,
    cfg: &LoaderConfig,
) -> Result<LoadReport, LoadError> {
    let mut total_height = driver.scroll_height().await?;
    wait_for_control(driver, cfg).await?;

    let mut report = LoadReport {
        iterations: 0,
        clicks: 0,
        final_height: total_height,
        stopped_early: false,
    };

    for _ in 0..attempts {
        report.iterations += 1;
        driver.scroll_to_bottom().await?;
        sleep(cfg.scroll_pause).await;

        if driver.load_more_visible().await? {
            driver.click_load_more().await?;
            report.clicks += 1;
        } else {
            debug!(iteration = report.iterations, "Load more not visible; skipping click");
        }

        let new_height = driver.scroll_height().await?;
        report.final_height = new_height;
        if new_height == total_height {
            report.stopped_early = report.iterations < attempts;
            debug!(height = new_height, "Page height unchanged; stopping");
            break;
        }
        total_height = new_height;
    }

    info!(
        iterations = report.iterations,
        clicks = report.clicks,
        final_height = report.final_height,
        stopped_early = report.stopped_early,
        "Incremental load finished"
    );
    Ok(report)
}
