mod support;

use hrm_common::{LeaveStatus, Role, TestDataGenerator};
use hrm_e2e::lifecycle::{Observation, ReviewOutcome, Settlement};
use hrm_e2e::{E2eError, LeaveLifecycle, LeaveState, SimOptions, TrackedLeave};

fn lifecycle(h: &support::Harness) -> LeaveLifecycle {
    LeaveLifecycle::new(h.config.consistency.clone())
}

/// ESS submits, Manager approves, ESS reads the decision back.
#[tokio::test]
async fn approval_settles_for_the_owner() {
    let h = support::harness();
    let lifecycle = lifecycle(&h);
    let request = TestDataGenerator::new().generate_leave_request(14, 2);
    let from = request.from;

    let ess = h.fixtures.acquire(Role::Ess).await.unwrap();
    let mut tracked = lifecycle.submit(&ess, request).await.unwrap();
    assert_eq!(tracked.state(), LeaveState::PendingApproval);
    assert_eq!(tracked.owner(), "ess.user");

    let manager = h.fixtures.acquire(Role::Manager).await.unwrap();
    let outcome = lifecycle.approve(&manager, &mut tracked).await.unwrap();
    assert_eq!(outcome, ReviewOutcome::Decided(LeaveState::Approved));
    assert_eq!(tracked.state(), LeaveState::Approved);
    assert_eq!(h.app.leave_status("ess.user", from), Some(LeaveStatus::Approved));

    let settlement = lifecycle.confirm(&ess, &tracked).await.unwrap();
    assert_eq!(settlement, Settlement::Settled);

    manager.logout().await.unwrap();
    ess.logout().await.unwrap();
}

#[tokio::test]
async fn rejection_through_review_dialog() {
    let h = support::harness_with(SimOptions {
        review_dialog: true,
        ..SimOptions::default()
    });
    let lifecycle = lifecycle(&h);
    let request = TestDataGenerator::new().generate_leave_request(30, 0);
    let from = request.from;

    let ess = h.fixtures.acquire(Role::Ess).await.unwrap();
    let mut tracked = lifecycle.submit(&ess, request).await.unwrap();

    let manager = h.fixtures.acquire(Role::Manager).await.unwrap();
    let outcome = lifecycle
        .reject(&manager, &mut tracked, Some("Team offsite that week"))
        .await
        .unwrap();
    assert_eq!(outcome, ReviewOutcome::Decided(LeaveState::Rejected));
    assert_eq!(h.app.leave_status("ess.user", from), Some(LeaveStatus::Rejected));

    assert_eq!(lifecycle.confirm(&ess, &tracked).await.unwrap(), Settlement::Settled);
    manager.logout().await.unwrap();
    ess.logout().await.unwrap();
}

/// A decision that reaches the owner within the window settles; one that
/// does not is reported as propagating rather than failing.
#[tokio::test]
async fn lagging_owner_view_is_tolerated() {
    for (propagation, expected) in [(2, Settlement::Settled), (100, Settlement::Propagating)] {
        let h = support::harness_with(SimOptions {
            approval_propagation: propagation,
            ..SimOptions::default()
        });
        let lifecycle = lifecycle(&h);
        let request = TestDataGenerator::new().generate_leave_request(20, 1);

        let ess = h.fixtures.acquire(Role::Ess).await.unwrap();
        let mut tracked = lifecycle.submit(&ess, request).await.unwrap();
        let manager = h.fixtures.acquire(Role::Manager).await.unwrap();
        lifecycle.approve(&manager, &mut tracked).await.unwrap();

        let settlement = lifecycle.confirm(&ess, &tracked).await.unwrap();
        assert_eq!(settlement, expected, "propagation {}", propagation);

        manager.logout().await.unwrap();
        ess.logout().await.unwrap();
    }
}

#[tokio::test]
async fn unexpected_terminal_status_fails_confirmation() {
    let h = support::harness();
    let lifecycle = lifecycle(&h);
    let request = TestDataGenerator::new().generate_leave_request(40, 1);
    let from = request.from;

    let ess = h.fixtures.acquire(Role::Ess).await.unwrap();
    let mut tracked = lifecycle.submit(&ess, request).await.unwrap();
    let manager = h.fixtures.acquire(Role::Manager).await.unwrap();
    lifecycle.approve(&manager, &mut tracked).await.unwrap();

    assert!(h.app.set_leave_status("ess.user", from, LeaveStatus::Cancelled));
    let err = lifecycle.confirm(&ess, &tracked).await.unwrap_err();
    assert!(matches!(err, E2eError::UnexpectedState { .. }), "got {:?}", err);

    manager.logout().await.unwrap();
    ess.logout().await.unwrap();
}

#[tokio::test]
async fn already_decided_request_leaves_nothing_to_review() {
    let h = support::harness();
    let lifecycle = lifecycle(&h);
    let request = TestDataGenerator::new().generate_leave_request(60, 0);
    let from = request.from;

    let ess = h.fixtures.acquire(Role::Ess).await.unwrap();
    let mut tracked = lifecycle.submit(&ess, request).await.unwrap();
    h.app.set_leave_status("ess.user", from, LeaveStatus::Approved);

    let manager = h.fixtures.acquire(Role::Manager).await.unwrap();
    let outcome = lifecycle.approve(&manager, &mut tracked).await.unwrap();
    assert_eq!(outcome, ReviewOutcome::NothingToReview);
    assert_eq!(tracked.state(), LeaveState::PendingApproval);

    manager.logout().await.unwrap();
    ess.logout().await.unwrap();
}

#[tokio::test]
async fn only_managers_review() {
    let h = support::harness();
    let lifecycle = lifecycle(&h);
    let request = TestDataGenerator::new().generate_leave_request(70, 0);

    let ess = h.fixtures.acquire(Role::Ess).await.unwrap();
    let mut tracked = lifecycle.submit(&ess, request).await.unwrap();

    let admin = h.fixtures.acquire(Role::Admin).await.unwrap();
    let err = lifecycle.approve(&admin, &mut tracked).await.unwrap_err();
    assert!(matches!(err, E2eError::ValidationFailed(_)));
    assert_eq!(tracked.state(), LeaveState::PendingApproval);

    admin.logout().await.unwrap();
    ess.logout().await.unwrap();
}

#[tokio::test]
async fn draft_and_decided_requests_refuse_invalid_steps() {
    let h = support::harness();
    let lifecycle = lifecycle(&h);
    let ess = h.fixtures.acquire(Role::Ess).await.unwrap();

    let draft = TrackedLeave::draft(TestDataGenerator::new().generate_leave_request(80, 0), "ess.user");
    let err = lifecycle.confirm(&ess, &draft).await.unwrap_err();
    assert!(matches!(err, E2eError::ValidationFailed(_)));

    let request = TestDataGenerator::new().generate_leave_request(90, 0);
    let mut tracked = lifecycle.submit(&ess, request).await.unwrap();
    let manager = h.fixtures.acquire(Role::Manager).await.unwrap();
    lifecycle.approve(&manager, &mut tracked).await.unwrap();

    // a decided request cannot be decided again
    let err = lifecycle
        .reject(&manager, &mut tracked, None)
        .await
        .unwrap_err();
    assert!(matches!(err, E2eError::ValidationFailed(_)));
    assert_eq!(tracked.state(), LeaveState::Approved);

    manager.logout().await.unwrap();
    ess.logout().await.unwrap();
}

/// A neighbouring request ending on the tracked start date is not mistaken
/// for the tracked one.
#[tokio::test]
async fn observation_matches_the_whole_period() {
    let h = support::harness();
    let lifecycle = lifecycle(&h);
    let data = TestDataGenerator::new();
    let earlier = data.generate_leave_request(12, 2);
    let tracked_request = data.generate_leave_request(14, 2);
    assert_eq!(earlier.to, tracked_request.from);
    let earlier_from = earlier.from;

    let ess = h.fixtures.acquire(Role::Ess).await.unwrap();
    lifecycle.submit(&ess, earlier).await.unwrap();
    let tracked = lifecycle.submit(&ess, tracked_request).await.unwrap();
    assert!(h.app.set_leave_status("ess.user", earlier_from, LeaveStatus::Approved));

    let observed = lifecycle.observe(&ess, &tracked).await.unwrap();
    assert_eq!(observed, Observation::Status(LeaveStatus::PendingApproval));

    ess.logout().await.unwrap();
}
