//! Reachability check for the application under test

use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{info, warn};

use hrm_common::HarnessConfig;

use crate::error::{E2eError, E2eResult};
use crate::pages::PageKind;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Wait until the login screen answers over HTTP.
///
/// Any status below 500 counts: the application is up even when it redirects
/// or refuses the anonymous request.
pub async fn wait_until_reachable(config: &HarnessConfig) -> E2eResult<()> {
    let url = config.url(PageKind::Login.path());
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    let deadline = Duration::from_millis(config.preflight_timeout_ms);
    let start = Instant::now();
    let mut attempts = 0;

    loop {
        attempts += 1;

        match client.get(&url).send().await {
            Ok(resp) if !resp.status().is_server_error() => {
                info!("{} answered {} after {} attempt(s)", url, resp.status(), attempts);
                return Ok(());
            }
            Ok(resp) => {
                warn!("Preflight returned {}", resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for {} ...", config.base_url);
                }
                // refused connections are expected while the application starts
                if !e.is_connect() {
                    warn!("Preflight error: {}", e);
                }
            }
        }

        if start.elapsed() >= deadline {
            return Err(E2eError::AppUnreachable { url, attempts });
        }
        sleep(POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_app_reports_attempts() {
        // nothing listens on the discard port
        let config = HarnessConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            preflight_timeout_ms: 0,
            ..HarnessConfig::default()
        };
        match wait_until_reachable(&config).await {
            Err(E2eError::AppUnreachable { url, attempts }) => {
                assert!(url.ends_with("/web/index.php/auth/login"));
                assert_eq!(attempts, 1);
            }
            other => panic!("expected AppUnreachable, got {:?}", other),
        }
    }
}
