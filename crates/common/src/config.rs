//! Harness configuration
//!
//! Loaded once per run and shared read-only (`Arc<HarnessConfig>`) with every
//! component that needs it. Nothing reads credentials from ambient state.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::{Credential, Role};

/// Environment variable overriding `base_url`
pub const BASE_URL_ENV: &str = "HRM_E2E_BASE_URL";

/// Top-level harness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Root URL of the application under test
    pub base_url: String,

    /// Browser engine: chromium, firefox or webkit
    pub browser: String,

    /// Run the browser without a window
    pub headless: bool,

    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Scenarios executed concurrently, each in its own browser contexts
    pub workers: usize,

    /// Screenshots and results land here
    pub artifacts_dir: PathBuf,

    /// Bounded wait windows per operation class
    pub waits: WaitConfig,

    /// Re-poll window for eventually consistent status reads
    pub consistency: ConsistencyConfig,

    /// How long the preflight check waits for the application to answer
    pub preflight_timeout_ms: u64,

    /// Credentials per role
    pub roles: RoleTable,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "https://opensource-demo.orangehrmlive.com".to_string(),
            browser: "chromium".to_string(),
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            workers: 1,
            artifacts_dir: PathBuf::from("test-results"),
            waits: WaitConfig::default(),
            consistency: ConsistencyConfig::default(),
            preflight_timeout_ms: 30_000,
            roles: RoleTable::default(),
        }
    }
}

/// Wait windows, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitConfig {
    pub default_ms: u64,
    pub navigation_ms: u64,
    pub assertion_ms: u64,
    /// Short probe for optional UI (confirmation dialogs, tabs)
    pub optional_ms: u64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            default_ms: 5_000,
            navigation_ms: 10_000,
            assertion_ms: 5_000,
            optional_ms: 3_000,
        }
    }
}

impl WaitConfig {
    pub fn default_wait(&self) -> Duration {
        Duration::from_millis(self.default_ms)
    }

    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn assertion(&self) -> Duration {
        Duration::from_millis(self.assertion_ms)
    }

    pub fn optional(&self) -> Duration {
        Duration::from_millis(self.optional_ms)
    }
}

/// Tolerance window for reading a status right after a decision.
///
/// A read is retried at most `attempts` times, `interval_ms` apart, so the
/// application gets `attempts * interval_ms` to propagate the decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsistencyConfig {
    pub attempts: u32,
    pub interval_ms: u64,
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            interval_ms: 2_000,
        }
    }
}

impl ConsistencyConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn window(&self) -> Duration {
        self.interval() * self.attempts
    }
}

/// Static credential per role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleTable {
    pub admin: Credential,
    pub ess: Credential,
    pub manager: Credential,
}

impl Default for RoleTable {
    fn default() -> Self {
        Self {
            admin: Credential::new("Admin", "admin123", Role::Admin).with_display_name("OrangeHRM Admin"),
            ess: Credential::new("ess.user", "Ess@12345", Role::Ess).with_display_name("ESS User"),
            manager: Credential::new("manager.user", "Manager@12345", Role::Manager)
                .with_display_name("Manager User"),
        }
    }
}

impl RoleTable {
    pub fn credential(&self, role: Role) -> &Credential {
        match role {
            Role::Admin => &self.admin,
            Role::Ess => &self.ess,
            Role::Manager => &self.manager,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Credential> {
        [&self.admin, &self.ess, &self.manager].into_iter()
    }
}

impl HarnessConfig {
    /// Load configuration from file, falling back to defaults when it is absent
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            info!("Loaded harness config from {}", path.display());
            config
        } else {
            debug!("No config at {}, using defaults", path.display());
            Self::default()
        };

        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.is_empty() {
                config.base_url = url;
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::InvalidConfig("base_url must not be empty".to_string()));
        }
        if self.workers == 0 {
            return Err(Error::InvalidConfig("workers must be at least 1".to_string()));
        }
        if self.consistency.attempts == 0 {
            return Err(Error::InvalidConfig("consistency.attempts must be at least 1".to_string()));
        }
        for role in Role::ALL {
            let cred = self.roles.credential(role);
            if cred.role() != role {
                return Err(Error::InvalidConfig(format!(
                    "roles.{} carries role tag {}",
                    role.as_str().to_ascii_lowercase(),
                    cred.role()
                )));
            }
        }
        for (i, a) in Role::ALL.iter().enumerate() {
            for b in &Role::ALL[i + 1..] {
                if self.roles.credential(*a).identity() == self.roles.credential(*b).identity() {
                    return Err(Error::InvalidConfig(format!(
                        "roles {} and {} share identity {}",
                        a,
                        b,
                        self.roles.credential(*a).identity()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Join an application path onto the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    pub fn screenshot_dir(&self) -> PathBuf {
        self.artifacts_dir.join("screenshots")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = HarnessConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.waits.navigation(), Duration::from_secs(10));
        assert_eq!(config.consistency.window(), Duration::from_secs(6));
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = HarnessConfig::from_toml(
            r#"
base_url = "http://127.0.0.1:8080/"
workers = 4

[waits]
optional_ms = 1500

[roles.admin]
identity = "root"
secret = "s3cret"
role = "Admin"

[roles.ess]
identity = "jdoe"
secret = "pw"
role = "ESS"

[roles.manager]
identity = "boss"
secret = "pw"
role = "Manager"
display_name = "The Boss"
"#,
        )
        .unwrap();

        assert_eq!(config.workers, 4);
        assert_eq!(config.waits.optional_ms, 1500);
        assert_eq!(config.waits.navigation_ms, 10_000);
        assert_eq!(config.roles.credential(Role::Ess).identity(), "jdoe");
        assert_eq!(config.roles.manager.display_name(), Some("The Boss"));
        assert_eq!(config.url("/web/index.php/auth/login"), "http://127.0.0.1:8080/web/index.php/auth/login");
    }

    #[test]
    fn test_mismatched_role_tag_is_rejected() {
        let mut config = HarnessConfig::default();
        config.roles.manager = Credential::new("x", "y", Role::Ess);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_shared_identity_is_rejected() {
        let mut config = HarnessConfig::default();
        config.roles.manager = Credential::new("ess.user", "y", Role::Manager);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = HarnessConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.workers, 1);
    }
}
