//! [`Driver`] over the simulated application

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::backend::Backend;
use super::browser::Browser;
use super::dom::{Act, Node};
use super::render::render;
use super::SimOptions;
use crate::driver::{Driver, Locator, WaitState};
use crate::error::{E2eError, E2eResult};

const CLOSED: &str = "Target page, context or browser has been closed";

/// One isolated browser context. The element tree only changes on actions,
/// so waits resolve against the current render without sleeping.
pub struct SimDriver {
    backend: Arc<Mutex<Backend>>,
    browser: Mutex<Browser>,
    options: Arc<SimOptions>,
    open_contexts: Arc<AtomicUsize>,
    closed: AtomicBool,
}

impl SimDriver {
    pub(crate) fn new(
        backend: Arc<Mutex<Backend>>,
        options: Arc<SimOptions>,
        open_contexts: Arc<AtomicUsize>,
    ) -> Self {
        open_contexts.fetch_add(1, Ordering::SeqCst);
        Self {
            backend,
            browser: Mutex::new(Browser::new()),
            options,
            open_contexts,
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> E2eResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(E2eError::Playwright(CLOSED.to_string()));
        }
        Ok(())
    }

    fn snapshot(&self) -> E2eResult<Node> {
        self.ensure_open()?;
        let browser = self.browser.lock();
        let backend = self.backend.lock();
        Ok(render(&browser, &backend))
    }

    /// Behaviour of the first match, or `ElementNotFound`
    fn target(&self, locator: &Locator, timeout: Duration) -> E2eResult<Act> {
        let root = self.snapshot()?;
        root.resolve(locator)
            .first()
            .map(|n| n.act.clone())
            .ok_or_else(|| not_found(locator, timeout))
    }

    fn release(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.open_contexts.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

fn not_found(locator: &Locator, timeout: Duration) -> E2eError {
    E2eError::ElementNotFound {
        locator: locator.to_string(),
        waited_ms: timeout.as_millis() as u64,
    }
}

#[async_trait]
impl Driver for SimDriver {
    async fn goto(&self, path: &str, _timeout: Duration) -> E2eResult<()> {
        self.ensure_open()?;
        let mut browser = self.browser.lock();
        let mut backend = self.backend.lock();
        browser.navigate(path, &mut backend);
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str, timeout: Duration) -> E2eResult<()> {
        let act = self.target(locator, timeout)?;
        self.browser.lock().fill(&act, value)
    }

    async fn click(&self, locator: &Locator, timeout: Duration) -> E2eResult<()> {
        let act = self.target(locator, timeout)?;
        debug!("sim click {}", locator);
        let mut browser = self.browser.lock();
        let mut backend = self.backend.lock();
        browser.click(&act, &mut backend, &self.options);
        Ok(())
    }

    async fn wait_for(&self, locator: &Locator, state: WaitState, timeout: Duration) -> E2eResult<()> {
        let present = !self.snapshot()?.resolve(locator).is_empty();
        match state {
            WaitState::Visible | WaitState::Attached if present => Ok(()),
            WaitState::Visible | WaitState::Attached => Err(not_found(locator, timeout)),
            WaitState::Hidden | WaitState::Detached if !present => Ok(()),
            WaitState::Hidden => Err(E2eError::Timeout(format!("{} to be hidden", locator))),
            WaitState::Detached => Err(E2eError::Timeout(format!("{} to be detached", locator))),
        }
    }

    async fn wait_for_network_idle(&self, _timeout: Duration) -> E2eResult<()> {
        self.ensure_open()
    }

    async fn count(&self, locator: &Locator) -> E2eResult<usize> {
        Ok(self.snapshot()?.resolve(locator).len())
    }

    async fn text_content(&self, locator: &Locator, timeout: Duration) -> E2eResult<String> {
        let root = self.snapshot()?;
        root.resolve(locator)
            .first()
            .map(|n| n.text_content())
            .ok_or_else(|| not_found(locator, timeout))
    }

    async fn set_input_files(&self, locator: &Locator, file: &Path, timeout: Duration) -> E2eResult<()> {
        let act = self.target(locator, timeout)?;
        self.browser.lock().set_input_files(&act, file)
    }

    async fn current_url(&self) -> E2eResult<String> {
        self.ensure_open()?;
        let path = self.browser.lock().view.path();
        Ok(format!("{}{}", self.options.base_url.trim_end_matches('/'), path))
    }

    /// Writes an outline of the rendered tree instead of pixels
    async fn screenshot(&self, path: &Path, _full_page: bool) -> E2eResult<()> {
        let root = self.snapshot()?;
        let mut outline = String::new();
        root.outline(0, &mut outline);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, outline)?;
        Ok(())
    }

    async fn close(&self) -> E2eResult<()> {
        self.release();
        Ok(())
    }
}

impl Drop for SimDriver {
    fn drop(&mut self) {
        self.release();
    }
}
