//! Scenario orchestration
//!
//! A scenario is a named, tagged, strictly ordered list of steps sharing one
//! [`ScenarioCtx`]. The first failing step aborts the rest of its scenario;
//! teardown runs regardless.

use futures::future::BoxFuture;
use hrm_common::{Credential, Employee, Role, TestDataGenerator};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::fixtures::{RoleFixtures, Session};
use crate::lifecycle::{LeaveLifecycle, TrackedLeave};

/// Reporting tags; every scenario carries at least one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    Smoke,
    Auth,
    Rbac,
    Employee,
    Leave,
    Admin,
    Lifecycle,
    Regression,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Smoke => "smoke",
            Tag::Auth => "auth",
            Tag::Rbac => "rbac",
            Tag::Employee => "employee",
            Tag::Leave => "leave",
            Tag::Admin => "admin",
            Tag::Lifecycle => "lifecycle",
            Tag::Regression => "regression",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tag {
    type Err = E2eError;

    fn from_str(s: &str) -> E2eResult<Self> {
        match s.trim().trim_start_matches('@').to_ascii_lowercase().as_str() {
            "smoke" => Ok(Tag::Smoke),
            "auth" => Ok(Tag::Auth),
            "rbac" => Ok(Tag::Rbac),
            "employee" => Ok(Tag::Employee),
            "leave" => Ok(Tag::Leave),
            "admin" => Ok(Tag::Admin),
            "lifecycle" => Ok(Tag::Lifecycle),
            "regression" => Ok(Tag::Regression),
            other => Err(E2eError::ValidationFailed(format!("unknown tag '{}'", other))),
        }
    }
}

/// Values steps hand to later steps
#[derive(Debug, Default)]
pub struct Scratch {
    pub employee: Option<Employee>,
    pub login: Option<Credential>,
    pub leave: Option<TrackedLeave>,
    pub baseline: Option<usize>,
}

/// State shared by the steps of one scenario
pub struct ScenarioCtx {
    scenario: String,
    fixtures: RoleFixtures,
    session: Option<Session>,
    screenshots: Vec<PathBuf>,
    pub data: TestDataGenerator,
    pub lifecycle: LeaveLifecycle,
    pub scratch: Scratch,
}

impl ScenarioCtx {
    pub fn new(scenario: impl Into<String>, fixtures: RoleFixtures) -> Self {
        let lifecycle = LeaveLifecycle::new(fixtures.config().consistency.clone());
        Self {
            scenario: scenario.into(),
            fixtures,
            session: None,
            screenshots: Vec::new(),
            data: TestDataGenerator::new(),
            lifecycle,
            scratch: Scratch::default(),
        }
    }

    pub fn fixtures(&self) -> &RoleFixtures {
        &self.fixtures
    }

    /// Active actor; steps that need one fail without it
    pub fn session(&self) -> E2eResult<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| E2eError::unexpected("active session", "none"))
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Hand the scenario over to `role`: the current actor logs out first
    pub async fn switch_to(&mut self, role: Role) -> E2eResult<()> {
        self.release().await?;
        info!("[{}] acting as {}", self.scenario, role);
        self.session = Some(self.fixtures.acquire(role).await?);
        Ok(())
    }

    /// Same as [`switch_to`](Self::switch_to) for a runtime credential
    pub async fn switch_to_credential(&mut self, credential: Credential) -> E2eResult<()> {
        self.release().await?;
        info!("[{}] acting as {}", self.scenario, credential.identity());
        self.session = Some(self.fixtures.acquire_as(credential).await?);
        Ok(())
    }

    /// Log the current actor out, if any
    pub async fn release(&mut self) -> E2eResult<()> {
        match self.session.take() {
            Some(session) => session.logout().await,
            None => Ok(()),
        }
    }

    /// Screenshot named `<scenario>-<label>` from the active session
    pub async fn screenshot(&mut self, label: &str) -> E2eResult<PathBuf> {
        let name = format!("{}-{}", slug(&self.scenario), slug(label));
        let path = self.session()?.ctx().screenshot(&name).await?;
        self.screenshots.push(path.clone());
        Ok(path)
    }
}

/// Lower-case, dash-separated form of a display name
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    out.trim_end_matches('-').to_string()
}

type StepFn = Box<dyn for<'a> FnOnce(&'a mut ScenarioCtx) -> BoxFuture<'a, E2eResult<()>> + Send>;

pub struct Step {
    name: String,
    run: StepFn,
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step").field("name", &self.name).finish()
    }
}

/// Step name reported for a scenario refused before its first step
pub const UNTAGGED_STEP: &str = "check category tags";

#[derive(Debug)]
pub struct Scenario {
    name: String,
    tags: Vec<Tag>,
    steps: Vec<Step>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, tags: &[Tag]) -> Self {
        Self {
            name: name.into(),
            tags: tags.to_vec(),
            steps: Vec::new(),
        }
    }

    pub fn step<F>(mut self, name: impl Into<String>, run: F) -> Self
    where
        F: for<'a> FnOnce(&'a mut ScenarioCtx) -> BoxFuture<'a, E2eResult<()>> + Send + 'static,
    {
        self.steps.push(Step {
            name: name.into(),
            run: Box::new(run),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    /// Execute the steps in order; always returns a report
    pub async fn run(self, fixtures: RoleFixtures) -> ScenarioReport {
        let start = Instant::now();
        info!("▶ {}", self.name);

        let mut ctx = ScenarioCtx::new(self.name.clone(), fixtures);
        let mut steps = Vec::with_capacity(self.steps.len());
        let mut failure = None;

        // results are reported per category; an untagged scenario never runs
        let runnable = if self.tags.is_empty() {
            let e = E2eError::ValidationFailed(format!("scenario '{}' has no category tag", self.name));
            error!("[{}] {}", self.name, e);
            failure = Some(StepFailure {
                index: 0,
                step: UNTAGGED_STEP.to_string(),
                error: e.to_string(),
            });
            Vec::new()
        } else {
            self.steps
        };

        for (index, step) in runnable.into_iter().enumerate() {
            debug!("[{}] step {}: {}", self.name, index + 1, step.name);
            let step_start = Instant::now();
            let result = (step.run)(&mut ctx).await;
            let duration_ms = step_start.elapsed().as_millis() as u64;

            match result {
                Ok(()) => steps.push(StepReport {
                    name: step.name,
                    duration_ms,
                    passed: true,
                    error: None,
                }),
                Err(e) => {
                    error!("[{}] step {} '{}' failed: {}", self.name, index + 1, step.name, e);
                    steps.push(StepReport {
                        name: step.name.clone(),
                        duration_ms,
                        passed: false,
                        error: Some(e.to_string()),
                    });
                    failure = Some(StepFailure {
                        index,
                        step: step.name,
                        error: e.to_string(),
                    });
                    break;
                }
            }
        }

        // teardown
        if failure.is_some() && ctx.has_session() {
            if let Err(e) = ctx.screenshot("failure").await {
                warn!("[{}] failure screenshot not captured: {}", self.name, e);
            }
        }
        if let Err(e) = ctx.release().await {
            warn!("[{}] teardown: {}", self.name, e);
        }

        let report = ScenarioReport {
            name: self.name,
            tags: self.tags,
            passed: failure.is_none(),
            failure,
            steps,
            screenshots: ctx.screenshots,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        if report.passed {
            info!("✓ {} ({} ms)", report.name, report.duration_ms);
        } else {
            error!("✗ {} ({} ms)", report.name, report.duration_ms);
        }
        report
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub name: String,
    pub duration_ms: u64,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The step that aborted a scenario
#[derive(Debug, Clone, Serialize)]
pub struct StepFailure {
    /// Zero-based position in the scenario
    pub index: usize,
    pub step: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub tags: Vec<Tag>,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<StepFailure>,
    pub steps: Vec<StepReport>,
    #[serde(skip)]
    pub screenshots: Vec<PathBuf>,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        assert_eq!(slug("Leave approval lifecycle"), "leave-approval-lifecycle");
        assert_eq!(slug("ESS -> Manager (handoff)"), "ess-manager-handoff");
        assert_eq!(slug("failure"), "failure");
    }

    #[test]
    fn test_tag_parse() {
        assert_eq!("@smoke".parse::<Tag>().unwrap(), Tag::Smoke);
        assert_eq!("RBAC".parse::<Tag>().unwrap(), Tag::Rbac);
        assert!("nightly".parse::<Tag>().is_err());
    }

    #[test]
    fn test_builder_keeps_order() {
        let scenario = Scenario::new("ordered", &[Tag::Smoke])
            .step("first", |_ctx| Box::pin(async { Ok::<(), E2eError>(()) }))
            .step("second", |_ctx| Box::pin(async { Ok::<(), E2eError>(()) }));
        assert_eq!(scenario.step_names(), vec!["first", "second"]);
        assert!(scenario.has_tag(Tag::Smoke));
        assert!(!scenario.has_tag(Tag::Leave));
    }
}
