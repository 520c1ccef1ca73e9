//! In-process simulated HRM application
//!
//! Serves the same element contract the pages rely on (selectors, headings,
//! tables, dialogs) without a browser. State lives at two levels:
//!
//! ```text
//!   SimApp ──── Arc<Mutex<Backend>> ────┐   accounts, employees, leave
//!     │                                 │   records shared by all contexts
//!     ├── new_context() → SimDriver ────┤
//!     │                    └ Browser    │   screen, form values, open
//!     └── new_context() → SimDriver ────┘   dropdown/dialog per context
//! ```
//!
//! Decisions on leave requests can be made to propagate lazily: the owner's
//! next `approval_propagation` reads still report Pending Approval.

use async_trait::async_trait;
use chrono::NaiveDate;
use hrm_common::{HarnessConfig, LeaveStatus};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::info;

use crate::driver::{BrowserLauncher, Driver};
use crate::error::E2eResult;

mod backend;
mod browser;
mod dom;
mod driver;
mod render;
mod view;

pub use driver::SimDriver;

use backend::Backend;

/// Behaviour knobs of the simulated application
#[derive(Debug, Clone)]
pub struct SimOptions {
    /// Reported as the origin of every URL
    pub base_url: String,
    /// Owner reads that still show Pending Approval after a decision
    pub approval_propagation: u32,
    /// Approve/reject open a confirmation dialog (reject with a comment field)
    pub review_dialog: bool,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            base_url: "http://hrm.sim".to_string(),
            approval_propagation: 0,
            review_dialog: false,
        }
    }
}

/// Simulated application; hands out isolated browser contexts
pub struct SimApp {
    backend: Arc<Mutex<Backend>>,
    options: Arc<SimOptions>,
    open_contexts: Arc<AtomicUsize>,
}

impl SimApp {
    /// Application seeded with an account per configured role
    pub fn new(config: &HarnessConfig) -> Self {
        let options = SimOptions {
            base_url: config.base_url.clone(),
            ..SimOptions::default()
        };
        Self::with_options(config, options)
    }

    pub fn with_options(config: &HarnessConfig, options: SimOptions) -> Self {
        info!(
            "Starting simulated HRM application (propagation: {} reads)",
            options.approval_propagation
        );
        Self {
            backend: Arc::new(Mutex::new(Backend::seeded(config.roles.iter()))),
            options: Arc::new(options),
            open_contexts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Browser contexts opened and not yet disposed
    pub fn open_contexts(&self) -> usize {
        self.open_contexts.load(Ordering::SeqCst)
    }

    pub fn employee_count(&self) -> usize {
        self.backend.lock().employees.len()
    }

    pub fn has_account(&self, username: &str) -> bool {
        self.backend.lock().account(username).is_some()
    }

    /// Status of `owner`'s request starting on `from`, as stored
    pub fn leave_status(&self, owner: &str, from: NaiveDate) -> Option<LeaveStatus> {
        self.backend
            .lock()
            .leaves
            .iter()
            .find(|l| l.owner == owner && l.from == from)
            .map(|l| l.status)
    }

    /// Change a request's status behind the application's back
    pub fn set_leave_status(&self, owner: &str, from: NaiveDate, status: LeaveStatus) -> bool {
        let mut backend = self.backend.lock();
        match backend
            .leaves
            .iter_mut()
            .find(|l| l.owner == owner && l.from == from)
        {
            Some(record) => {
                record.status = status;
                record.stale_reads = 0;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl BrowserLauncher for SimApp {
    async fn new_context(&self) -> E2eResult<Box<dyn Driver>> {
        Ok(Box::new(SimDriver::new(
            Arc::clone(&self.backend),
            Arc::clone(&self.options),
            Arc::clone(&self.open_contexts),
        )))
    }
}
