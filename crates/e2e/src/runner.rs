//! Test runner: runs scenarios in parallel and writes the results file

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use hrm_common::HarnessConfig;

use crate::driver::BrowserLauncher;
use crate::error::{E2eError, E2eResult};
use crate::fixtures::RoleFixtures;
use crate::playwright::{PlaywrightConfig, PlaywrightLauncher};
use crate::preflight;
use crate::scenario::{Scenario, ScenarioReport, StepFailure, StepReport, Tag};
use crate::sim::SimApp;

/// Which browser backend drives the pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DriverKind {
    Playwright,
    #[default]
    Sim,
}

impl FromStr for DriverKind {
    type Err = E2eError;

    fn from_str(s: &str) -> E2eResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "playwright" => Ok(DriverKind::Playwright),
            "sim" => Ok(DriverKind::Sim),
            other => Err(E2eError::Config(hrm_common::Error::InvalidConfig(format!(
                "unknown driver '{}'",
                other
            )))),
        }
    }
}

/// Screenshot file with its content digest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub path: PathBuf,
    pub sha256: String,
}

impl Artifact {
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let bytes = std::fs::read(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            sha256: hex::encode(Sha256::digest(&bytes)),
        })
    }
}

/// Result of running a single scenario
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub name: String,
    pub tags: Vec<Tag>,
    pub success: bool,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<StepFailure>,
    pub steps: Vec<StepReport>,
    pub artifacts: Vec<Artifact>,
}

impl TestResult {
    fn from_report(report: ScenarioReport) -> Self {
        let artifacts = report
            .screenshots
            .iter()
            .filter_map(|path| match Artifact::from_file(path) {
                Ok(artifact) => Some(artifact),
                Err(e) => {
                    warn!("Skipping artifact {}: {}", path.display(), e);
                    None
                }
            })
            .collect();
        Self {
            name: report.name,
            tags: report.tags,
            success: report.passed,
            duration_ms: report.duration_ms,
            failed_step: report.failure,
            steps: report.steps,
            artifacts,
        }
    }
}

/// Result of running all selected scenarios
#[derive(Debug, Clone, Serialize)]
pub struct TestSuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

impl TestSuiteResult {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Main acceptance runner
pub struct TestRunner {
    fixtures: RoleFixtures,
    workers: usize,
    output_dir: PathBuf,
}

impl TestRunner {
    pub fn new(config: Arc<HarnessConfig>, launcher: Arc<dyn BrowserLauncher>) -> Self {
        let workers = config.workers.max(1);
        let output_dir = config.artifacts_dir.clone();
        Self {
            fixtures: RoleFixtures::new(config, launcher),
            workers,
            output_dir,
        }
    }

    /// Runner against the configured application through Playwright; waits
    /// for the application to answer first
    pub async fn playwright(config: Arc<HarnessConfig>) -> E2eResult<Self> {
        let launcher = PlaywrightLauncher::new(PlaywrightConfig::from_harness(&config)?)?;
        preflight::wait_until_reachable(&config).await?;
        Ok(Self::new(config, Arc::new(launcher)))
    }

    /// Runner against a fresh in-process application
    pub fn sim(config: Arc<HarnessConfig>) -> Self {
        let app = SimApp::new(&config);
        Self::new(config, Arc::new(app))
    }

    pub async fn with_driver(kind: DriverKind, config: Arc<HarnessConfig>) -> E2eResult<Self> {
        match kind {
            DriverKind::Playwright => Self::playwright(config).await,
            DriverKind::Sim => Ok(Self::sim(config)),
        }
    }

    pub fn fixtures(&self) -> &RoleFixtures {
        &self.fixtures
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn set_output_dir(&mut self, dir: PathBuf) {
        self.output_dir = dir;
    }

    /// Run scenarios, up to `workers` at a time. Results keep the input order.
    pub async fn run(&self, scenarios: Vec<Scenario>) -> TestSuiteResult {
        let start = Instant::now();
        let total = scenarios.len();
        info!("Running {} scenario(s) with {} worker(s)...", total, self.workers);

        let mut reports: Vec<(usize, ScenarioReport)> = stream::iter(scenarios.into_iter().enumerate())
            .map(|(i, scenario)| {
                let fixtures = self.fixtures.clone();
                async move { (i, scenario.run(fixtures).await) }
            })
            .buffer_unordered(self.workers)
            .collect()
            .await;
        reports.sort_by_key(|(i, _)| *i);

        let results: Vec<TestResult> = reports
            .into_iter()
            .map(|(_, report)| TestResult::from_report(report))
            .collect();
        let passed = results.iter().filter(|r| r.success).count();
        let failed = total - passed;
        let duration_ms = start.elapsed().as_millis() as u64;

        for result in results.iter().filter(|r| !r.success) {
            if let Some(failure) = &result.failed_step {
                error!(
                    "✗ {} - step {} '{}': {}",
                    result.name,
                    failure.index + 1,
                    failure.step,
                    failure.error
                );
            }
        }
        info!(
            "Test Results: {} passed, {} failed ({} ms)",
            passed, failed, duration_ms
        );

        TestSuiteResult {
            total,
            passed,
            failed,
            duration_ms,
            results,
        }
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_kind_parse() {
        assert_eq!("sim".parse::<DriverKind>().unwrap(), DriverKind::Sim);
        assert_eq!("Playwright".parse::<DriverKind>().unwrap(), DriverKind::Playwright);
        assert!("selenium".parse::<DriverKind>().is_err());
    }

    #[test]
    fn test_artifact_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        std::fs::write(&path, b"abc").unwrap();

        let artifact = Artifact::from_file(&path).unwrap();
        assert_eq!(
            artifact.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
