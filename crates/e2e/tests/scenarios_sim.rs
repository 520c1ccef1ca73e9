mod support;

use hrm_common::Role;
use hrm_e2e::scenario::UNTAGGED_STEP;
use hrm_e2e::{catalog, E2eError, Scenario, Tag, TestRunner};
use std::sync::Arc;

/// The whole built-in catalog passes against the simulated application.
#[tokio::test]
async fn builtin_catalog_passes_on_sim() {
    let h = support::harness();
    let runner = TestRunner::new(h.config.clone(), h.app.clone());

    let results = runner.run(catalog::builtin()).await;
    for result in &results.results {
        assert!(result.success, "{} failed: {:?}", result.name, result.failed_step);
    }
    assert_eq!(results.total, catalog::builtin().len());
    assert!(results.success());
    assert_eq!(h.app.open_contexts(), 0);
}

#[tokio::test]
async fn parallel_workers_keep_order_and_isolation() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = support::config(&dir);
    config.workers = 4;
    let config = Arc::new(config);
    let runner = TestRunner::sim(config);

    let scenarios = catalog::select(Some(Tag::Lifecycle), None);
    let names: Vec<String> = scenarios.iter().map(|s| s.name().to_string()).collect();
    let results = runner.run(scenarios).await;

    let ran: Vec<String> = results.results.iter().map(|r| r.name.clone()).collect();
    assert_eq!(ran, names);
    assert_eq!(results.failed, 0);
}

/// A failing step stops its scenario, captures a screenshot and still
/// releases the session.
#[tokio::test]
async fn failing_step_is_reported_with_screenshot() {
    let h = support::harness();
    let runner = TestRunner::new(h.config.clone(), h.app.clone());

    let scenario = Scenario::new("Broken flow", &[Tag::Regression])
        .step("sign in as Admin", |ctx| Box::pin(ctx.switch_to(Role::Admin)))
        .step("fail", |_ctx| {
            Box::pin(async { Err::<(), E2eError>(E2eError::ValidationFailed("deliberate".to_string())) })
        })
        .step("never runs", |_ctx| Box::pin(async { Ok::<(), E2eError>(()) }));

    let results = runner.run(vec![scenario]).await;
    assert_eq!(results.failed, 1);

    let result = &results.results[0];
    assert!(!result.success);
    let failure = result.failed_step.as_ref().unwrap();
    assert_eq!(failure.index, 1);
    assert_eq!(failure.step, "fail");
    assert_eq!(result.steps.len(), 2);

    assert_eq!(result.artifacts.len(), 1);
    let artifact = &result.artifacts[0];
    assert!(artifact.path.ends_with("broken-flow-failure.png"));
    assert_eq!(artifact.sha256.len(), 64);
    assert_eq!(h.app.open_contexts(), 0);

    let path = runner.write_results(&results).unwrap();
    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(json["failed"], 1);
    assert_eq!(json["results"][0]["failed_step"]["step"], "fail");
}

#[tokio::test]
async fn untagged_scenario_is_refused_before_its_first_step() {
    let h = support::harness();
    let runner = TestRunner::new(h.config.clone(), h.app.clone());

    let scenario = Scenario::new("Untagged", &[])
        .step("sign in as Admin", |ctx| Box::pin(ctx.switch_to(Role::Admin)));
    let results = runner.run(vec![scenario]).await;

    assert_eq!(results.failed, 1);
    let result = &results.results[0];
    assert!(!result.success);
    assert!(result.steps.is_empty());
    let failure = result.failed_step.as_ref().unwrap();
    assert_eq!(failure.index, 0);
    assert_eq!(failure.step, UNTAGGED_STEP);
    assert!(failure.error.contains("no category tag"));
    assert_eq!(h.app.open_contexts(), 0);
}

/// Every granted module is reachable by URL, every denied one is refused.
#[tokio::test]
async fn role_access_matrix_opens_granted_modules() {
    let h = support::harness();
    let runner = TestRunner::new(h.config.clone(), h.app.clone());

    let results = runner.run(catalog::select(None, Some("Role access matrix"))).await;
    assert_eq!(results.total, 1);
    let result = &results.results[0];
    assert!(result.success, "{:?}", result.failed_step);
    assert_eq!(result.steps.len(), Role::ALL.len());
}
