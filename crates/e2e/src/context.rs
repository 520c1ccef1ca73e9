//! Browser context: the driver handle plus the wait discipline every page uses

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use hrm_common::WaitConfig;
use tracing::{debug, info};

use crate::driver::{Driver, Locator, WaitState};
use crate::error::E2eResult;

/// Options list rendered by every dropdown in the application
pub(crate) const SELECT_OPTION: &str = ".oxd-select-option";

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// One isolated browser context with bounded-wait primitives.
///
/// Every primitive issues exactly one driver call per logical action; the
/// wait window passed with it is the only retry mechanism.
pub struct BrowserContext {
    driver: Box<dyn Driver>,
    waits: WaitConfig,
    screenshot_dir: PathBuf,
    closed: AtomicBool,
}

impl BrowserContext {
    pub fn new(driver: Box<dyn Driver>, waits: WaitConfig, screenshot_dir: PathBuf) -> Self {
        Self {
            driver,
            waits,
            screenshot_dir,
            closed: AtomicBool::new(false),
        }
    }

    pub fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    pub fn waits(&self) -> &WaitConfig {
        &self.waits
    }

    /// Navigate and wait for the network to settle
    pub async fn goto(&self, path: &str) -> E2eResult<()> {
        debug!("goto {}", path);
        self.driver.goto(path, self.waits.navigation()).await?;
        self.settle().await
    }

    pub async fn settle(&self) -> E2eResult<()> {
        self.driver.wait_for_network_idle(self.waits.navigation()).await
    }

    pub async fn click(&self, locator: &Locator) -> E2eResult<()> {
        self.driver.click(locator, self.waits.default_wait()).await
    }

    pub async fn fill(&self, locator: &Locator, value: &str) -> E2eResult<()> {
        self.driver.fill(locator, value, self.waits.default_wait()).await
    }

    /// Open a dropdown and pick the option with the given label
    pub async fn select_option(&self, dropdown: &Locator, option: &str) -> E2eResult<()> {
        self.click(dropdown).await?;
        self.click(&Locator::css(SELECT_OPTION).with_text(option).first()).await
    }

    pub async fn expect_visible(&self, locator: &Locator) -> E2eResult<()> {
        self.driver
            .wait_for(locator, WaitState::Visible, self.waits.assertion())
            .await
    }

    /// Assert the element is visible and contains `text`
    pub async fn expect_text(&self, locator: &Locator, text: &str) -> E2eResult<()> {
        self.expect_visible(&locator.clone().with_text(text)).await
    }

    /// Probe for optional UI. Absence inside the short optional window is
    /// `false`; any other failure still propagates.
    pub async fn try_optional(&self, locator: &Locator) -> E2eResult<bool> {
        match self
            .driver
            .wait_for(locator, WaitState::Visible, self.waits.optional())
            .await
        {
            Ok(()) => Ok(true),
            Err(e) if e.is_absence() => {
                debug!("optional element absent: {}", locator);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Click an optional element if it shows up
    pub async fn click_if_present(&self, locator: &Locator) -> E2eResult<bool> {
        if self.try_optional(locator).await? {
            self.click(locator).await?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Count rows once the first one appears; no rows inside the assertion
    /// window counts as zero
    pub async fn count_when_present(&self, rows: &Locator) -> E2eResult<usize> {
        let first = rows.clone().first();
        match self
            .driver
            .wait_for(&first, WaitState::Visible, self.waits.assertion())
            .await
        {
            Ok(()) => self.driver.count(rows).await,
            Err(e) if e.is_absence() => Ok(0),
            Err(e) => Err(e),
        }
    }

    /// Wait until any of `candidates` is present; returns its index, or `None`
    /// when the window closes first
    pub async fn wait_for_any(&self, candidates: &[Locator], timeout: Duration) -> E2eResult<Option<usize>> {
        let deadline = Instant::now() + timeout;
        loop {
            for (i, candidate) in candidates.iter().enumerate() {
                if self.driver.count(candidate).await? > 0 {
                    return Ok(Some(i));
                }
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Trimmed text of an element
    pub async fn text(&self, locator: &Locator) -> E2eResult<String> {
        let text = self
            .driver
            .text_content(locator, self.waits.assertion())
            .await?;
        Ok(text.trim().to_string())
    }

    pub async fn current_url(&self) -> E2eResult<String> {
        self.driver.current_url().await
    }

    /// Full-page screenshot saved as `<screenshot_dir>/<name>.png`
    pub async fn screenshot(&self, name: &str) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.screenshot_dir)?;
        let path = self.screenshot_dir.join(format!("{}.png", name));
        self.driver.screenshot(&path, true).await?;
        debug!("screenshot saved: {}", path.display());
        Ok(path)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Dispose the context; repeated calls are no-ops
    pub async fn close(&self) -> E2eResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        info!("Disposing browser context");
        self.driver.close().await
    }
}

impl std::fmt::Debug for BrowserContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserContext")
            .field("screenshot_dir", &self.screenshot_dir)
            .field("closed", &self.is_closed())
            .finish()
    }
}
