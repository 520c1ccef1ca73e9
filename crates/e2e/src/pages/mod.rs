//! Page abstractions
//!
//! One type per application screen. Each borrows a [`BrowserContext`] and turns
//! business intents into primitive driver calls. The closed set of screens is
//! [`PageKind`]; what they share (ready marker, open, screenshot) is [`Screen`].

use async_trait::async_trait;
use std::path::PathBuf;

use crate::context::BrowserContext;
use crate::driver::Locator;
use crate::error::E2eResult;

pub mod admin;
pub mod dashboard;
pub mod employee;
pub mod leave;
pub mod login;

pub use admin::AdminPage;
pub use dashboard::DashboardPage;
pub use employee::EmployeePage;
pub use leave::LeavePage;
pub use login::{LoginOutcome, LoginPage};

/// Screen headings carry the ready markers
pub(crate) const HEADING: &str = "h6";

/// Rows of every result table
pub(crate) const TABLE: &str = ".oxd-table";
pub(crate) const TABLE_ROWS: &str = ".oxd-table-body .oxd-table-row";
pub(crate) const TABLE_CELL: &str = ".oxd-table-cell";

pub(crate) const SELECT_INPUT: &str = ".oxd-select-text-input";
pub(crate) const AUTOCOMPLETE_INPUT: &str = r#"input[placeholder*="Type for hints"]"#;
pub(crate) const SUBMIT_BUTTON: &str = r#"button[type="submit"]"#;
pub(crate) const PLAIN_BUTTON: &str = r#"button[type="button"]"#;

pub(crate) fn heading(text: &str) -> Locator {
    Locator::css(HEADING).with_text(text).first()
}

pub(crate) fn submit_button(label: &str) -> Locator {
    Locator::css(SUBMIT_BUTTON).with_text(label).first()
}

pub(crate) fn plain_button(label: &str) -> Locator {
    Locator::css(PLAIN_BUTTON).with_text(label).first()
}

/// The application's screens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    Login,
    Dashboard,
    Employee,
    Leave,
    Admin,
}

impl PageKind {
    pub const ALL: [PageKind; 5] = [
        PageKind::Login,
        PageKind::Dashboard,
        PageKind::Employee,
        PageKind::Leave,
        PageKind::Admin,
    ];

    /// Application path the screen is opened from
    pub fn path(&self) -> &'static str {
        match self {
            PageKind::Login => "/web/index.php/auth/login",
            PageKind::Dashboard => "/web/index.php/dashboard/index",
            PageKind::Employee => "/web/index.php/pim/viewEmployeeList",
            PageKind::Leave => "/web/index.php/leave/viewLeaveModule",
            PageKind::Admin => "/web/index.php/admin/viewAdminModule",
        }
    }

    /// Distinguishing heading shown once the screen has loaded
    pub fn marker_text(&self) -> &'static str {
        match self {
            PageKind::Login => "Login",
            PageKind::Dashboard => "Dashboard",
            PageKind::Employee => "Employee Information",
            PageKind::Leave => "Leave",
            PageKind::Admin => "Admin",
        }
    }

    pub fn ready_marker(&self) -> Locator {
        match self {
            PageKind::Login => Locator::css(login::TITLE).with_text("Login").first(),
            other => heading(other.marker_text()),
        }
    }

    /// Prefix for screenshots taken from this screen
    pub fn slug(&self) -> &'static str {
        match self {
            PageKind::Login => "login",
            PageKind::Dashboard => "dashboard",
            PageKind::Employee => "employee",
            PageKind::Leave => "leave",
            PageKind::Admin => "admin",
        }
    }
}

/// Capabilities every page shares
#[async_trait]
pub trait Screen: Sync {
    const KIND: PageKind;

    fn context(&self) -> &BrowserContext;

    /// Marker present and network settled
    async fn wait_ready(&self) -> E2eResult<()> {
        let ctx = self.context();
        ctx.expect_visible(&Self::KIND.ready_marker()).await?;
        ctx.settle().await
    }

    /// Navigate to the screen's own path and wait until it is ready
    async fn open(&self) -> E2eResult<()> {
        self.context().goto(Self::KIND.path()).await?;
        self.wait_ready().await
    }

    async fn take_screenshot(&self, name: &str) -> E2eResult<PathBuf> {
        self.context()
            .screenshot(&format!("{}-{}", Self::KIND.slug(), name))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_paths_are_distinct() {
        let mut paths: Vec<_> = PageKind::ALL.iter().map(|k| k.path()).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), PageKind::ALL.len());
    }

    #[test]
    fn test_ready_markers() {
        assert_eq!(PageKind::Login.ready_marker().selector, login::TITLE);
        let marker = PageKind::Employee.ready_marker();
        assert_eq!(marker.selector, HEADING);
        assert_eq!(marker.has_text.as_deref(), Some("Employee Information"));
    }
}
