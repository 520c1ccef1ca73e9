//! Shared setup for tests against the simulated application

#![allow(dead_code)]

use std::sync::Arc;
use tempfile::TempDir;

use hrm_common::{ConsistencyConfig, HarnessConfig, WaitConfig};
use hrm_e2e::{RoleFixtures, SimApp, SimOptions};

/// Config with short waits and artifacts under a temp dir
pub fn config(artifacts: &TempDir) -> HarnessConfig {
    HarnessConfig {
        artifacts_dir: artifacts.path().to_path_buf(),
        waits: WaitConfig {
            default_ms: 200,
            navigation_ms: 200,
            assertion_ms: 200,
            optional_ms: 50,
        },
        consistency: ConsistencyConfig {
            attempts: 3,
            interval_ms: 10,
        },
        ..HarnessConfig::default()
    }
}

pub struct Harness {
    pub app: Arc<SimApp>,
    pub fixtures: RoleFixtures,
    pub config: Arc<HarnessConfig>,
    _artifacts: TempDir,
}

pub fn harness() -> Harness {
    harness_with(SimOptions::default())
}

pub fn harness_with(options: SimOptions) -> Harness {
    let artifacts = tempfile::tempdir().unwrap();
    let config = Arc::new(config(&artifacts));
    let app = Arc::new(SimApp::with_options(&config, options));
    let fixtures = RoleFixtures::new(config.clone(), app.clone());
    Harness {
        app,
        fixtures,
        config,
        _artifacts: artifacts,
    }
}
