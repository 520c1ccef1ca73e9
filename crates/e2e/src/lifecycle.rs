//! Leave request lifecycle verification
//!
//! ```text
//!   Draft ──submit──▶ PendingApproval ──approve──▶ Approved
//!                            │
//!                            └────────reject────▶ Rejected
//! ```
//!
//! Decisions are read back from the owner's My Leave list, which may lag
//! behind the reviewer. A read-back that still shows Pending Approval inside
//! the consistency window is tolerated; anything else off the expected path
//! fails the verification.

use hrm_common::{ConsistencyConfig, LeaveRequest, LeaveStatus, Role};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::fixtures::Session;
use crate::pages::leave::leave_period;
use crate::pages::LeavePage;

/// Position of a tracked request in the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveState {
    Draft,
    PendingApproval,
    Approved,
    Rejected,
}

impl LeaveState {
    pub fn can_transition_to(&self, next: LeaveState) -> bool {
        matches!(
            (self, next),
            (LeaveState::Draft, LeaveState::PendingApproval)
                | (LeaveState::PendingApproval, LeaveState::Approved)
                | (LeaveState::PendingApproval, LeaveState::Rejected)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LeaveState::Approved | LeaveState::Rejected)
    }

    /// The state a status cell corresponds to; cancelled leave has none
    pub fn from_status(status: LeaveStatus) -> Option<Self> {
        match status {
            LeaveStatus::PendingApproval => Some(LeaveState::PendingApproval),
            LeaveStatus::Approved => Some(LeaveState::Approved),
            LeaveStatus::Rejected => Some(LeaveState::Rejected),
            LeaveStatus::Cancelled => None,
        }
    }
}

impl fmt::Display for LeaveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LeaveState::Draft => "Draft",
            LeaveState::PendingApproval => "Pending Approval",
            LeaveState::Approved => "Approved",
            LeaveState::Rejected => "Rejected",
        };
        f.write_str(label)
    }
}

/// What a read of the owner's list returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    Status(LeaveStatus),
    NotFound,
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observation::Status(status) => write!(f, "{}", status),
            Observation::NotFound => f.write_str("Not Found"),
        }
    }
}

/// How a read-back inside the consistency window ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The owner sees the tracked state
    Settled,
    /// The owner still sees Pending Approval after the whole window
    Propagating,
}

/// Result of a review attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    Decided(LeaveState),
    /// No pending request matched the reviewer's filter
    NothingToReview,
}

/// A request submitted during a scenario, with the state the harness expects
#[derive(Debug, Clone)]
pub struct TrackedLeave {
    request: LeaveRequest,
    owner: String,
    state: LeaveState,
}

impl TrackedLeave {
    pub fn draft(request: LeaveRequest, owner: impl Into<String>) -> Self {
        Self {
            request,
            owner: owner.into(),
            state: LeaveState::Draft,
        }
    }

    pub fn request(&self) -> &LeaveRequest {
        &self.request
    }

    /// Login identity of the submitter
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn state(&self) -> LeaveState {
        self.state
    }

    fn advance(&mut self, next: LeaveState) -> E2eResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(E2eError::ValidationFailed(format!(
                "leave {}..{} cannot move from {} to {}",
                self.request.from_date(),
                self.request.to_date(),
                self.state,
                next
            )));
        }
        debug!("leave {}: {} -> {}", self.request.from_date(), self.state, next);
        self.state = next;
        Ok(())
    }

    /// Check the next transition without taking it
    fn permits(&self, next: LeaveState) -> E2eResult<()> {
        self.clone().advance(next)
    }
}

/// Judge one read-back against the tracked state.
///
/// `Ok(Some(..))` ends the read-back, `Ok(None)` means "still propagating, read
/// again".
fn judge(expected: LeaveState, observed: Observation) -> E2eResult<Option<Settlement>> {
    let state = match observed {
        Observation::Status(status) => LeaveState::from_status(status),
        Observation::NotFound => None,
    };
    match state {
        Some(s) if s == expected => Ok(Some(Settlement::Settled)),
        Some(LeaveState::PendingApproval) if expected.is_terminal() => Ok(None),
        _ => Err(E2eError::unexpected(
            format!("leave expected {}", expected),
            observed,
        )),
    }
}

/// Drives and verifies leave requests through their lifecycle
#[derive(Debug, Clone)]
pub struct LeaveLifecycle {
    consistency: ConsistencyConfig,
}

impl LeaveLifecycle {
    pub fn new(consistency: ConsistencyConfig) -> Self {
        Self { consistency }
    }

    /// Apply for leave as `owner` and confirm it is listed as pending
    pub async fn submit(&self, owner: &Session, request: LeaveRequest) -> E2eResult<TrackedLeave> {
        request.validate()?;
        let mut tracked = TrackedLeave::draft(request, owner.credential().identity());
        tracked.permits(LeaveState::PendingApproval)?;

        let page = LeavePage::new(owner.ctx());
        page.navigate_to_apply_leave().await?;
        page.apply_leave(tracked.request()).await?;

        match self.observe(owner, &tracked).await? {
            Observation::Status(LeaveStatus::PendingApproval) => {}
            other => {
                return Err(E2eError::unexpected(
                    format!("submitted leave {}", tracked.request().from_date()),
                    other,
                ))
            }
        }
        tracked.advance(LeaveState::PendingApproval)?;
        info!(
            "Leave {}..{} submitted by {}",
            tracked.request().from_date(),
            tracked.request().to_date(),
            tracked.owner()
        );
        Ok(tracked)
    }

    /// Approve the tracked request from the reviewer's Leave List
    pub async fn approve(&self, reviewer: &Session, tracked: &mut TrackedLeave) -> E2eResult<ReviewOutcome> {
        self.review(reviewer, tracked, LeaveState::Approved, None).await
    }

    /// Reject the tracked request; `comment` is entered when the application
    /// asks for one
    pub async fn reject(
        &self,
        reviewer: &Session,
        tracked: &mut TrackedLeave,
        comment: Option<&str>,
    ) -> E2eResult<ReviewOutcome> {
        self.review(reviewer, tracked, LeaveState::Rejected, comment).await
    }

    async fn review(
        &self,
        reviewer: &Session,
        tracked: &mut TrackedLeave,
        decision: LeaveState,
        comment: Option<&str>,
    ) -> E2eResult<ReviewOutcome> {
        if reviewer.role() != Role::Manager {
            return Err(E2eError::ValidationFailed(format!(
                "leave decisions are made by a Manager, not {}",
                reviewer.role()
            )));
        }
        tracked.permits(decision)?;

        let request = tracked.request().clone();
        let page = LeavePage::new(reviewer.ctx());
        page.navigate_to_leave_list().await?;
        page.search_by_status_and_dates(LeaveStatus::PendingApproval, request.from, request.to)
            .await?;

        if page.leave_request_count().await? == 0 {
            info!(
                "No pending request between {} and {} for {}",
                request.from_date(),
                request.to_date(),
                reviewer.credential().identity()
            );
            return Ok(ReviewOutcome::NothingToReview);
        }

        match decision {
            LeaveState::Approved => page.approve_first_leave_request().await?,
            _ => page.reject_first_leave_request(comment).await?,
        }
        tracked.advance(decision)?;
        info!("Leave {} {} by {}", request.from_date(), decision, reviewer.credential().identity());
        Ok(ReviewOutcome::Decided(decision))
    }

    /// Read the tracked request's status from the owner's My Leave list
    pub async fn observe(&self, owner: &Session, tracked: &TrackedLeave) -> E2eResult<Observation> {
        let request = tracked.request();
        let page = LeavePage::new(owner.ctx());
        page.navigate_to_my_leave().await?;
        page.filter_by_date_range(request.from, request.to).await?;

        match page.find_leave_row(request.from, request.to).await? {
            Some(row) => {
                let status = page.leave_status(row).await?;
                debug!("observed leave {}: {}", leave_period(request.from, request.to), status);
                Ok(Observation::Status(status))
            }
            None => Ok(Observation::NotFound),
        }
    }

    /// Re-read the owner's view until it shows the tracked state or the
    /// consistency window closes
    pub async fn confirm(&self, owner: &Session, tracked: &TrackedLeave) -> E2eResult<Settlement> {
        let expected = tracked.state();
        if expected == LeaveState::Draft {
            return Err(E2eError::ValidationFailed(
                "a draft request has nothing to confirm".to_string(),
            ));
        }

        let attempts = self.consistency.attempts.max(1);
        for attempt in 1..=attempts {
            let observed = self.observe(owner, tracked).await?;
            if let Some(settlement) = judge(expected, observed)? {
                return Ok(settlement);
            }
            debug!(
                "leave {} still {} (read {}/{})",
                tracked.request().from_date(),
                observed,
                attempt,
                attempts
            );
            if attempt < attempts {
                tokio::time::sleep(self.consistency.interval()).await;
            }
        }

        warn!(
            "Leave {} still shows Pending Approval after {} ms; treating as propagating",
            tracked.request().from_date(),
            self.consistency.window().as_millis()
        );
        Ok(Settlement::Propagating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hrm_common::LeaveType;

    fn request() -> LeaveRequest {
        let from = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 12, 3).unwrap();
        LeaveRequest::new(LeaveType::Vacation, from, to)
    }

    #[test]
    fn test_transitions() {
        use LeaveState::*;
        assert!(Draft.can_transition_to(PendingApproval));
        assert!(PendingApproval.can_transition_to(Approved));
        assert!(PendingApproval.can_transition_to(Rejected));
        assert!(!Draft.can_transition_to(Approved));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(PendingApproval));
    }

    #[test]
    fn test_review_requires_pending() {
        let mut tracked = TrackedLeave::draft(request(), "ess.user");
        assert!(matches!(
            tracked.permits(LeaveState::Approved),
            Err(E2eError::ValidationFailed(_))
        ));
        tracked.advance(LeaveState::PendingApproval).unwrap();
        tracked.advance(LeaveState::Rejected).unwrap();
        assert!(tracked.advance(LeaveState::Approved).is_err());
        assert_eq!(tracked.state(), LeaveState::Rejected);
    }

    #[test]
    fn test_judge_after_approve() {
        let approved = Observation::Status(LeaveStatus::Approved);
        let pending = Observation::Status(LeaveStatus::PendingApproval);
        let rejected = Observation::Status(LeaveStatus::Rejected);

        assert_eq!(judge(LeaveState::Approved, approved).unwrap(), Some(Settlement::Settled));
        assert_eq!(judge(LeaveState::Approved, pending).unwrap(), None);
        assert!(matches!(
            judge(LeaveState::Approved, rejected),
            Err(E2eError::UnexpectedState { .. })
        ));
        assert!(judge(LeaveState::Approved, Observation::NotFound).is_err());
    }

    #[test]
    fn test_judge_never_reviewed_request() {
        let pending = Observation::Status(LeaveStatus::PendingApproval);
        assert_eq!(
            judge(LeaveState::PendingApproval, pending).unwrap(),
            Some(Settlement::Settled)
        );
        let approved = Observation::Status(LeaveStatus::Approved);
        assert!(judge(LeaveState::PendingApproval, approved).is_err());
        let cancelled = Observation::Status(LeaveStatus::Cancelled);
        assert!(judge(LeaveState::PendingApproval, cancelled).is_err());
    }
}
