//! Page-automation driver seam
//!
//! Pages never talk to a browser directly. They issue single, retry-free
//! primitive calls through [`Driver`]; the Playwright bridge and the simulated
//! application are the two implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::E2eResult;

/// Element query: a CSS selector, optionally narrowed by contained text and
/// position, optionally scoped inside a parent match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<Locator>>,
    pub selector: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            parent: None,
            selector: selector.into(),
            has_text: None,
            index: None,
        }
    }

    /// Keep only matches whose text contains `text`
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.has_text = Some(text.into());
        self
    }

    pub fn nth(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn first(self) -> Self {
        self.nth(0)
    }

    /// Query `selector` inside every match of `self`
    pub fn child(&self, selector: impl Into<String>) -> Self {
        Self {
            parent: Some(Box::new(self.clone())),
            selector: selector.into(),
            has_text: None,
            index: None,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = &self.parent {
            write!(f, "{} >> ", parent)?;
        }
        write!(f, "{}", self.selector)?;
        if let Some(text) = &self.has_text {
            write!(f, " [has-text=\"{}\"]", text)?;
        }
        if let Some(index) = self.index {
            write!(f, " [nth={}]", index)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

/// Primitive browser actions over one isolated browser context.
///
/// Locator-based calls fail with `ElementNotFound` when nothing matches within
/// `timeout`; navigation and load-state calls fail with `Timeout`.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Navigate to an application path (relative to the base URL)
    async fn goto(&self, path: &str, timeout: Duration) -> E2eResult<()>;

    /// Replace the value of an input
    async fn fill(&self, locator: &Locator, value: &str, timeout: Duration) -> E2eResult<()>;

    async fn click(&self, locator: &Locator, timeout: Duration) -> E2eResult<()>;

    async fn wait_for(&self, locator: &Locator, state: WaitState, timeout: Duration) -> E2eResult<()>;

    /// Wait until the network has been idle
    async fn wait_for_network_idle(&self, timeout: Duration) -> E2eResult<()>;

    /// Number of current matches, without waiting
    async fn count(&self, locator: &Locator) -> E2eResult<usize>;

    async fn text_content(&self, locator: &Locator, timeout: Duration) -> E2eResult<String>;

    async fn set_input_files(&self, locator: &Locator, file: &Path, timeout: Duration) -> E2eResult<()>;

    async fn current_url(&self) -> E2eResult<String>;

    async fn screenshot(&self, path: &Path, full_page: bool) -> E2eResult<()>;

    /// Dispose the browser context. Further calls fail.
    async fn close(&self) -> E2eResult<()>;
}

/// Opens fresh, isolated browser contexts, one per session
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn new_context(&self) -> E2eResult<Box<dyn Driver>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_display() {
        let row = Locator::css(".oxd-table-body .oxd-table-row").nth(2);
        let cell = row.child(".oxd-table-cell").nth(5);
        assert_eq!(
            cell.to_string(),
            ".oxd-table-body .oxd-table-row [nth=2] >> .oxd-table-cell [nth=5]"
        );

        let button = Locator::css("button").with_text("Save").first();
        assert_eq!(button.to_string(), "button [has-text=\"Save\"] [nth=0]");
    }

    #[test]
    fn test_locator_serializes_without_empty_fields() {
        let json = serde_json::to_value(Locator::css("h6")).unwrap();
        assert_eq!(json, serde_json::json!({ "selector": "h6" }));
    }
}
