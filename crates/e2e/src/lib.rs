//! HRM acceptance harness
//!
//! This crate drives the OrangeHRM web application through a real browser and
//! checks multi-role business workflows end to end:
//! - Hands out authenticated sessions per role on isolated browser contexts
//! - Wraps each screen in a page type with bounded waits
//! - Tracks leave requests through submission, review and confirmation
//! - Runs tagged scenarios in parallel and writes a JSON results file
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Acceptance Runner (Rust)                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                  │
//! │    ├── run(scenarios) -> TestSuiteResult                    │
//! │    └── write_results() -> test-results.json                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Scenario (ordered steps)  ──  ScenarioCtx                  │
//! │    ├── RoleFixtures::acquire(role) -> Session               │
//! │    ├── LeaveLifecycle: submit → approve|reject → confirm    │
//! │    └── pages: Login, Dashboard, Employee, Leave, Admin      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  BrowserContext (bounded waits)                              │
//! │    └── dyn Driver                                           │
//! │          ├── PlaywrightDriver (node bridge, JSON lines)     │
//! │          └── SimDriver (in-process application)             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod context;
pub mod driver;
pub mod error;
pub mod fixtures;
pub mod lifecycle;
pub mod pages;
pub mod playwright;
pub mod preflight;
pub mod runner;
pub mod scenario;
pub mod sim;

pub use context::BrowserContext;
pub use error::{E2eError, E2eResult};
pub use fixtures::{RoleFixtures, Session};
pub use lifecycle::{LeaveLifecycle, LeaveState, TrackedLeave};
pub use runner::{DriverKind, TestRunner, TestSuiteResult};
pub use scenario::{Scenario, ScenarioCtx, Tag};
pub use sim::{SimApp, SimOptions};
