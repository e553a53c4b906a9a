//! NBA Top Shot marketplace scraper.
//!
//! The search page at `https://www.nbatopshot.com/search?` renders listing
//! cards client-side and appends more on each "Load more" press. Scraping is
//! split so the browser is released before any parsing happens:
//!
//! 1. [`scrape_listings`] opens a [`ChromeSession`] and hands it to
//!    [`scrape_with`], which calls [`capture`]
//! 2. The session is closed whatever the outcome
//! 3. [`Snapshot::into_records`] runs [`extract_records`] on the captured HTML
//!
//! # Selectors
//!
//! Card markup uses generated class names, so any upstream redesign makes
//! fields silently come back as `None` rather than failing.

use crate::browser::{ChromeSession, LaunchOptions, PageDriver};
use crate::error::{BrowserError, LoadError, ScrapeIncomplete};
use crate::loader::{LoadReport, LoaderConfig, load_more};
use crate::models::{Record, RecordStore};
use crate::utils::truncate_for_log;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

static BLOCK: Lazy<Selector> = Lazy::new(|| selector(".css-1850lbl > div"));
static LINK: Lazy<Selector> = Lazy::new(|| selector(".chakra-linkbox__overlay"));
static COMMON: Lazy<Selector> = Lazy::new(|| selector(".css-1kgpxnt"));
static NAME: Lazy<Selector> = Lazy::new(|| selector(".chakra-heading"));
static LOWEST_ASK: Lazy<Selector> = Lazy::new(|| selector(".css-1hwxzsy"));
static AVG_SALE: Lazy<Selector> = Lazy::new(|| selector(".css-zv2k34"));
static HOOK_SHOT: Lazy<Selector> = Lazy::new(|| selector(".css-17udwdn"));

/// Everything [`scrape_listings`] needs besides the attempt count.
#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    pub launch: LaunchOptions,
    pub loader: LoaderConfig,
    /// Idle time after navigation before looking for the control.
    pub settle: Duration,
    /// Scheme + host prefixed onto relative listing hrefs.
    pub origin: String,
}

/// Parse one markup snapshot into records, in document order.
#[instrument(level = "info", skip_all, fields(bytes = html.len()))]
pub fn extract_records(html: &str, origin: &str) -> RecordStore {
    let document = Html::parse_document(html);
    let store: RecordStore = document
        .select(&BLOCK)
        .map(|block| extract_record(block, origin))
        .collect();
    info!(count = store.len(), "Extracted listing records");
    store
}

fn extract_record(block: ElementRef<'_>, origin: &str) -> Record {
    let link = block
        .select(&LINK)
        .next()
        .map(|a| format!("{}{}", origin, a.value().attr("href").unwrap_or_default()));

    Record {
        link,
        common: text_of(block, &COMMON),
        name: text_of(block, &NAME),
        lowest_ask: text_of(block, &LOWEST_ASK),
        avg_sale: text_of(block, &AVG_SALE),
        hook_shot: text_of(block, &HOOK_SHOT),
    }
}

/// Concatenated text of the first match, or `None` if there is no match or it is empty.
fn text_of(block: ElementRef<'_>, sel: &Selector) -> Option<String> {
    let text = block.select(sel).next()?.text().collect::<String>();
    (!text.is_empty()).then_some(text)
}

/// Markup captured at the end of the load phase, plus any failure on the way.
#[derive(Debug)]
pub struct Snapshot {
    pub html: Option<String>,
    pub report: Option<LoadReport>,
    pub failure: Option<LoadError>,
}

impl Snapshot {
    fn failed(cause: LoadError) -> Self {
        Self {
            html: None,
            report: None,
            failure: Some(cause),
        }
    }

    /// Extract records; a recorded failure turns into [`ScrapeIncomplete`] carrying them.
    pub fn into_records(self, origin: &str) -> Result<RecordStore, ScrapeIncomplete> {
        let records = self
            .html
            .as_deref()
            .map(|html| extract_records(html, origin))
            .unwrap_or_default();
        match self.failure {
            None => Ok(records),
            Some(cause) => Err(ScrapeIncomplete {
                partial: records,
                cause,
            }),
        }
    }
}

/// Run the loader against `driver` and take a snapshot even if loading failed.
#[instrument(level = "info", skip_all, fields(attempts = attempts))]
pub async fn capture<D: PageDriver>(
    driver: &mut D,
    attempts: u32,
    loader: &LoaderConfig,
) -> Snapshot {
    let loaded = load_more(driver, attempts, loader).await;
    let source = driver.page_source().await;

    match (loaded, source) {
        (Ok(report), Ok(html)) => {
            debug!(preview = %truncate_for_log(&html, 200), "Captured page snapshot");
            Snapshot {
                html: Some(html),
                report: Some(report),
                failure: None,
            }
        }
        (Ok(report), Err(e)) => Snapshot {
            html: None,
            report: Some(report),
            failure: Some(e.into()),
        },
        (Err(cause), Ok(html)) => {
            warn!(error = %cause, "Load phase failed; keeping partial snapshot");
            Snapshot {
                html: Some(html),
                report: None,
                failure: Some(cause),
            }
        }
        (Err(cause), Err(e)) => {
            warn!(error = %cause, snapshot_error = %e, "Load phase failed and no snapshot available");
            Snapshot::failed(cause)
        }
    }
}

/// Open the browser, load `attempts` batches, snapshot, close, then extract.
///
/// Any failure while the browser is up ends in [`ScrapeIncomplete`]. Its
/// `partial` records come from a snapshot taken at the moment of failure, so
/// they can be non-empty even when the "Load more" control never appeared:
/// the first rendered batch of listings is still extracted.
#[instrument(level = "info", skip_all, fields(url = %settings.launch.url, attempts = attempts))]
pub async fn scrape_listings(
    settings: &ScrapeSettings,
    attempts: u32,
) -> Result<RecordStore, ScrapeIncomplete> {
    let opened = ChromeSession::open(&settings.launch).await;
    scrape_with(opened, settings, attempts).await
}

/// Drive an already-opened page through load and snapshot, release it, then extract.
///
/// The driver is closed on every path where it was opened, and always before
/// extraction starts.
pub async fn scrape_with<D: PageDriver>(
    opened: Result<D, BrowserError>,
    settings: &ScrapeSettings,
    attempts: u32,
) -> Result<RecordStore, ScrapeIncomplete> {
    let snapshot = match opened {
        Ok(mut driver) => {
            debug!(settle = ?settings.settle, "Waiting for page to settle");
            sleep(settings.settle).await;
            let snapshot = capture(&mut driver, attempts, &settings.loader).await;
            driver.close().await;
            snapshot
        }
        Err(e) => Snapshot::failed(e.into()),
    };

    if let Some(report) = &snapshot.report {
        debug!(?report, "Load report");
    }
    snapshot.into_records(&settings.origin)
}
