//! Live browser control through the Chrome DevTools Protocol.
//!
//! The incremental loader never talks to `chromiumoxide` directly. It drives
//! a [`PageDriver`], which [`ChromeSession`] implements for a real browser
//! and tests implement with an in-memory fake.
//!
//! # Lifecycle
//!
//! A [`ChromeSession`] owns the browser process, the single page it opened,
//! and the task pumping CDP events. [`PageDriver::close`] must be called
//! on every exit path; if a panic unwinds first, chromiumoxide's `Drop`
//! kills the child process.

use crate::error::BrowserError;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// XPath of the button that reveals the next batch of listings.
pub const LOAD_MORE_XPATH: &str = "//button[text()='Load more']";

/// The operations the incremental loader needs from a live page.
pub trait PageDriver {
    /// Whether the "Load more" control is currently in the DOM.
    async fn load_more_present(&mut self) -> Result<bool, BrowserError>;

    /// Whether the control is rendered and visible right now.
    async fn load_more_visible(&mut self) -> Result<bool, BrowserError>;

    async fn click_load_more(&mut self) -> Result<(), BrowserError>;

    async fn scroll_to_bottom(&mut self) -> Result<(), BrowserError>;

    /// Total scrollable height of the document body.
    async fn scroll_height(&mut self) -> Result<u64, BrowserError>;

    /// Serialized markup of the page as currently rendered.
    async fn page_source(&mut self) -> Result<String, BrowserError>;

    /// Release the page and everything behind it. Failures are logged, not returned.
    async fn close(self)
    where
        Self: Sized;
}

/// Settings used to launch the browser.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub url: String,
    pub headless: bool,
}

/// A launched Chrome process with one page open on the target URL.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl std::fmt::Debug for ChromeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromeSession").finish_non_exhaustive()
    }
}

impl ChromeSession {
    /// Launch Chrome and navigate a fresh page to `opts.url`.
    ///
    /// If navigation fails the browser is closed before the error is returned.
    #[instrument(level = "info", skip_all, fields(url = %opts.url, headless = opts.headless))]
    pub async fn open(opts: &LaunchOptions) -> Result<Self, BrowserError> {
        let mut builder = BrowserConfig::builder();
        if !opts.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(BrowserError::Config)?;

        let (mut browser, mut events) = Browser::launch(config).await?;
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "CDP handler event error");
                }
            }
        });

        let page = match browser.new_page(opts.url.as_str()).await {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "Failed to open page; shutting browser down");
                if let Err(close_err) = browser.close().await {
                    warn!(error = %close_err, "Browser close failed");
                }
                if let Err(wait_err) = browser.wait().await {
                    warn!(error = %wait_err, "Waiting for browser process failed");
                }
                handler.abort();
                return Err(e.into());
            }
        };
        info!("Browser session opened");

        Ok(Self {
            browser,
            page,
            handler,
        })
    }

    async fn eval<T: DeserializeOwned>(&self, script: &str) -> Result<T, BrowserError> {
        let result = self.page.evaluate(script).await?;
        result
            .into_value::<T>()
            .map_err(|e| BrowserError::Script(e.to_string()))
    }
}

/// Locate the control via XPath inside the page.
fn control_lookup_js() -> String {
    format!(
        "document.evaluate(\"{LOAD_MORE_XPATH}\", document, null, \
         XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue"
    )
}

impl PageDriver for ChromeSession {
    async fn load_more_present(&mut self) -> Result<bool, BrowserError> {
        self.eval(&format!("(() => {} !== null)()", control_lookup_js()))
            .await
    }

    async fn load_more_visible(&mut self) -> Result<bool, BrowserError> {
        let script = format!(
            "(() => {{ const el = {}; if (!el) return false; \
             const style = window.getComputedStyle(el); \
             return style.visibility !== 'hidden' && style.display !== 'none' \
             && el.getClientRects().length > 0; }})()",
            control_lookup_js()
        );
        self.eval(&script).await
    }

    async fn click_load_more(&mut self) -> Result<(), BrowserError> {
        let button = self.page.find_xpath(LOAD_MORE_XPATH).await?;
        button.click().await?;
        Ok(())
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), BrowserError> {
        self.page
            .evaluate("window.scrollTo(0, document.body.scrollHeight);")
            .await?;
        Ok(())
    }

    async fn scroll_height(&mut self) -> Result<u64, BrowserError> {
        self.eval("document.body.scrollHeight").await
    }

    async fn page_source(&mut self) -> Result<String, BrowserError> {
        Ok(self.page.content().await?)
    }

    #[instrument(level = "info", skip_all)]
    async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "Browser close command failed");
        }
        if let Err(e) = self.browser.wait().await {
            warn!(error = %e, "Waiting for browser process failed");
        }
        if let Err(e) = self.handler.await {
            debug!(error = %e, "CDP handler task ended abnormally");
        }
        info!("Browser session closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_lookup_embeds_xpath() {
        let js = control_lookup_js();
        assert!(js.contains("//button[text()='Load more']"));
        assert!(js.starts_with("document.evaluate("));
    }
}
