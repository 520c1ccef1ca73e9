mod support;

use hrm_common::{Credential, Role};
use hrm_e2e::pages::DashboardPage;
use hrm_e2e::E2eError;

/// Every role signs in on its own context, and logging out disposes it.
#[tokio::test]
async fn sessions_are_isolated_and_disposed() {
    let h = support::harness();

    let mut sessions = Vec::new();
    for role in Role::ALL {
        let session = h.fixtures.acquire(role).await.unwrap();
        assert_eq!(session.role(), role);
        sessions.push(session);
    }
    assert_eq!(h.app.open_contexts(), Role::ALL.len());

    // each context shows its own user
    let admin_name = DashboardPage::new(sessions[0].ctx())
        .current_user_name()
        .await
        .unwrap();
    let ess_name = DashboardPage::new(sessions[1].ctx())
        .current_user_name()
        .await
        .unwrap();
    assert_eq!(admin_name, "OrangeHRM Admin");
    assert_eq!(ess_name, "ESS User");

    for session in sessions {
        session.logout().await.unwrap();
    }
    assert_eq!(h.app.open_contexts(), 0);
}

#[tokio::test]
async fn wrong_password_fails_authentication() {
    let h = support::harness();
    let wrong = Credential::new("Admin", "nope", Role::Admin);

    match h.fixtures.acquire_as(wrong).await {
        Err(E2eError::AuthenticationFailed { role, reason }) => {
            assert_eq!(role, Role::Admin);
            assert!(reason.contains("Invalid credentials"));
        }
        other => panic!("expected AuthenticationFailed, got {:?}", other),
    }
    assert_eq!(h.app.open_contexts(), 0);
}

#[tokio::test]
async fn unknown_account_fails_authentication() {
    let h = support::harness();
    let ghost = Credential::new("ghost.user", "Ghost@123", Role::Ess);

    let err = h.fixtures.acquire_as(ghost).await.unwrap_err();
    assert!(matches!(err, E2eError::AuthenticationFailed { role: Role::Ess, .. }));
}

#[tokio::test]
async fn with_session_releases_after_failure() {
    let h = support::harness();

    let result: Result<(), E2eError> = h
        .fixtures
        .with_session(Role::Manager, |session| {
            Box::pin(async move {
                assert_eq!(session.role(), Role::Manager);
                Err::<(), E2eError>(E2eError::ValidationFailed("body failed".to_string()))
            })
        })
        .await;

    assert!(matches!(result, Err(E2eError::ValidationFailed(_))));
    assert_eq!(h.app.open_contexts(), 0);
}

#[tokio::test]
async fn closed_context_refuses_calls() {
    let h = support::harness();
    let ctx = h.fixtures.anonymous().await.unwrap();
    ctx.close().await.unwrap();
    assert!(ctx.is_closed());
    // second close is a no-op
    ctx.close().await.unwrap();

    let err = ctx.goto("/web/index.php/auth/login").await.unwrap_err();
    assert!(matches!(err, E2eError::Playwright(_)));
    assert_eq!(h.app.open_contexts(), 0);
}
