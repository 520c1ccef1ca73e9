//! Leave module: apply, My Leave and the approver's Leave List

use chrono::NaiveDate;
use hrm_common::{LeaveRequest, LeaveStatus, LeaveType, DATE_FORMAT};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use super::{
    heading, plain_button, submit_button, PageKind, Screen, AUTOCOMPLETE_INPUT, SELECT_INPUT,
    TABLE, TABLE_CELL, TABLE_ROWS,
};
use crate::context::BrowserContext;
use crate::driver::Locator;
use crate::error::{E2eError, E2eResult};

pub(crate) const APPLY_LEAVE_PATH: &str = "/web/index.php/leave/applyLeave";
pub(crate) const MY_LEAVE_PATH: &str = "/web/index.php/leave/viewMyLeaveList";
pub(crate) const LEAVE_LIST_PATH: &str = "/web/index.php/leave/viewLeaveList";

pub(crate) const DATE_INPUT: &str = r#"input[placeholder="yyyy-mm-dd"]"#;
pub(crate) const COMMENT: &str = r#"textarea[placeholder*="Type comment here"]"#;
pub(crate) const APPROVE_ICON: &str = "button .oxd-icon.bi-check2";
pub(crate) const REJECT_ICON: &str = "button .oxd-icon.bi-x";
pub(crate) const DIALOG: &str = ".oxd-dialog-container";
pub(crate) const DIALOG_COMMENT: &str = ".oxd-dialog-container textarea";
pub(crate) const DIALOG_CONFIRM: &str = "button";
pub(crate) const CALENDAR: &str = ".oxd-calendar";

/// Column of the period ("2026-10-20 to 2026-10-22") in both leave tables
pub(crate) const DATE_COLUMN: usize = 0;
/// Column of the status text in both leave tables
pub(crate) const STATUS_COLUMN: usize = 5;

/// Period as the leave tables print it; single days show one date
pub fn leave_period(from: NaiveDate, to: NaiveDate) -> String {
    let start = from.format(DATE_FORMAT).to_string();
    if from == to {
        start
    } else {
        format!("{} to {}", start, to.format(DATE_FORMAT))
    }
}

static STATUS_CELL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)\s*\(\s*\d+(?:\.\d+)?\s*\)\s*$").unwrap());

/// Status cells read like "Pending Approval (3.00)"; drop the day count
pub fn parse_status_cell(raw: &str) -> E2eResult<LeaveStatus> {
    let raw = raw.trim();
    let label = STATUS_CELL
        .captures(raw)
        .and_then(|c| c.get(1))
        .map_or(raw, |m| m.as_str());
    label
        .parse()
        .map_err(|_| E2eError::unexpected("leave status cell", raw))
}

pub struct LeavePage<'a> {
    ctx: &'a BrowserContext,
}

impl<'a> Screen for LeavePage<'a> {
    const KIND: PageKind = PageKind::Leave;

    fn context(&self) -> &BrowserContext {
        self.ctx
    }
}

impl<'a> LeavePage<'a> {
    pub fn new(ctx: &'a BrowserContext) -> Self {
        Self { ctx }
    }

    async fn open_at(&self, path: &str, title: &str) -> E2eResult<()> {
        self.ctx.goto(path).await?;
        self.ctx.expect_visible(&heading(title)).await
    }

    pub async fn navigate_to_leave_module(&self) -> E2eResult<()> {
        self.open().await
    }

    pub async fn navigate_to_apply_leave(&self) -> E2eResult<()> {
        self.open_at(APPLY_LEAVE_PATH, "Apply Leave").await
    }

    pub async fn navigate_to_my_leave(&self) -> E2eResult<()> {
        self.open_at(MY_LEAVE_PATH, "My Leave").await
    }

    pub async fn navigate_to_leave_list(&self) -> E2eResult<()> {
        self.open_at(LEAVE_LIST_PATH, "Leave List").await
    }

    /// Fill and submit the apply form. Validation runs before any browser
    /// interaction.
    pub async fn apply_leave(&self, request: &LeaveRequest) -> E2eResult<()> {
        request.validate()?;
        info!(
            "Applying for {} {}..{}",
            request.leave_type,
            request.from_date(),
            request.to_date()
        );

        self.ctx
            .select_option(&Locator::css(SELECT_INPUT).nth(0), request.leave_type.label())
            .await?;
        self.ctx
            .fill(&Locator::css(DATE_INPUT).nth(0), &request.from_date())
            .await?;
        self.ctx
            .fill(&Locator::css(DATE_INPUT).nth(1), &request.to_date())
            .await?;
        if let Some(partial) = request.partial_days {
            self.ctx
                .select_option(&Locator::css(SELECT_INPUT).nth(1), partial.label())
                .await?;
        }
        if let Some(comment) = &request.comment {
            self.ctx.fill(&Locator::css(COMMENT), comment).await?;
        }
        self.ctx.click(&submit_button("Apply")).await?;
        self.ctx.settle().await
    }

    pub async fn leave_request_count(&self) -> E2eResult<usize> {
        self.ctx.count_when_present(&Locator::css(TABLE_ROWS)).await
    }

    fn cell(row: usize, column: usize) -> Locator {
        Locator::css(TABLE_ROWS).nth(row).child(TABLE_CELL).nth(column)
    }

    fn status_cell(row: usize) -> Locator {
        Self::cell(row, STATUS_COLUMN)
    }

    /// Row whose period is exactly `from`..`to`
    pub async fn find_leave_row(&self, from: NaiveDate, to: NaiveDate) -> E2eResult<Option<usize>> {
        let period = leave_period(from, to);
        let rows = self.leave_request_count().await?;
        for row in 0..rows {
            if self.ctx.text(&Self::cell(row, DATE_COLUMN)).await? == period {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }

    /// Raw status text of a row
    pub async fn leave_status_text(&self, row: usize) -> E2eResult<String> {
        self.ctx.text(&Self::status_cell(row)).await
    }

    pub async fn leave_status(&self, row: usize) -> E2eResult<LeaveStatus> {
        let raw = self.leave_status_text(row).await?;
        let status = parse_status_cell(&raw)?;
        debug!("row {} status: {}", row, status);
        Ok(status)
    }

    /// Approve the first row of the current list
    pub async fn approve_first_leave_request(&self) -> E2eResult<()> {
        self.ctx.click(&Locator::css(APPROVE_ICON).first()).await?;
        self.confirm_dialog(None).await?;
        self.ctx.settle().await
    }

    /// Reject the first row; the comment is entered only when the review
    /// dialog offers a field for it
    pub async fn reject_first_leave_request(&self, comment: Option<&str>) -> E2eResult<()> {
        self.ctx.click(&Locator::css(REJECT_ICON).first()).await?;
        self.confirm_dialog(comment).await?;
        self.ctx.settle().await
    }

    async fn confirm_dialog(&self, comment: Option<&str>) -> E2eResult<()> {
        if !self.ctx.try_optional(&Locator::css(DIALOG)).await? {
            return Ok(());
        }
        if let Some(comment) = comment {
            let field = Locator::css(DIALOG_COMMENT);
            if self.ctx.try_optional(&field).await? {
                self.ctx.fill(&field, comment).await?;
            }
        }
        let ok = Locator::css(DIALOG_CONFIRM).with_text("Ok").first();
        self.ctx.click_if_present(&ok).await?;
        Ok(())
    }

    async fn search(&self) -> E2eResult<()> {
        self.ctx.click(&submit_button("Search")).await?;
        self.ctx.settle().await
    }

    pub async fn search_by_employee(&self, name: &str) -> E2eResult<()> {
        self.ctx.fill(&Locator::css(AUTOCOMPLETE_INPUT), name).await?;
        self.search().await
    }

    pub async fn filter_by_leave_type(&self, leave_type: LeaveType) -> E2eResult<()> {
        self.ctx
            .select_option(&Locator::css(SELECT_INPUT).nth(0), leave_type.label())
            .await?;
        self.search().await
    }

    pub async fn filter_by_status(&self, status: LeaveStatus) -> E2eResult<()> {
        self.ctx
            .select_option(&Locator::css(SELECT_INPUT).nth(1), status.label())
            .await?;
        self.search().await
    }

    async fn fill_date_range(&self, from: NaiveDate, to: NaiveDate) -> E2eResult<()> {
        self.ctx
            .fill(&Locator::css(DATE_INPUT).nth(0), &from.format(DATE_FORMAT).to_string())
            .await?;
        self.ctx
            .fill(&Locator::css(DATE_INPUT).nth(1), &to.format(DATE_FORMAT).to_string())
            .await
    }

    pub async fn filter_by_date_range(&self, from: NaiveDate, to: NaiveDate) -> E2eResult<()> {
        self.fill_date_range(from, to).await?;
        self.search().await
    }

    /// Status and date range applied with a single search
    pub async fn search_by_status_and_dates(
        &self,
        status: LeaveStatus,
        from: NaiveDate,
        to: NaiveDate,
    ) -> E2eResult<()> {
        self.fill_date_range(from, to).await?;
        self.ctx
            .select_option(&Locator::css(SELECT_INPUT).nth(1), status.label())
            .await?;
        self.search().await
    }

    pub async fn reset_filters(&self) -> E2eResult<()> {
        self.ctx.click(&plain_button("Reset")).await?;
        self.ctx.settle().await
    }

    pub async fn verify_apply_leave_page(&self) -> E2eResult<()> {
        self.ctx.expect_visible(&heading("Apply Leave")).await?;
        self.ctx.expect_visible(&Locator::css(SELECT_INPUT).nth(0)).await?;
        self.ctx.expect_visible(&Locator::css(DATE_INPUT).nth(0)).await?;
        self.ctx.expect_visible(&submit_button("Apply")).await
    }

    pub async fn verify_my_leave_page(&self) -> E2eResult<()> {
        self.ctx.expect_visible(&heading("My Leave")).await?;
        self.ctx.expect_visible(&Locator::css(TABLE)).await
    }

    pub async fn verify_leave_list_page(&self) -> E2eResult<()> {
        self.ctx.expect_visible(&heading("Leave List")).await?;
        self.ctx.expect_visible(&Locator::css(TABLE)).await
    }

    pub async fn leave_calendar_displayed(&self) -> E2eResult<bool> {
        self.ctx.try_optional(&Locator::css(CALENDAR)).await
    }

    /// Whether any listed row mentions either end of the date range
    pub async fn leave_request_exists(&self, from: NaiveDate, to: NaiveDate) -> E2eResult<bool> {
        Ok(self.find_leave_row(from, to).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_cell() {
        assert_eq!(
            parse_status_cell("Pending Approval (3.00)").unwrap(),
            LeaveStatus::PendingApproval
        );
        assert_eq!(parse_status_cell(" Scheduled (1.00) ").unwrap(), LeaveStatus::Approved);
        assert_eq!(parse_status_cell("Rejected").unwrap(), LeaveStatus::Rejected);
        assert!(matches!(
            parse_status_cell("Unknown (2.00)"),
            Err(E2eError::UnexpectedState { .. })
        ));
    }

    #[test]
    fn test_leave_period() {
        let from = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 10, 22).unwrap();
        assert_eq!(leave_period(from, to), "2026-10-20 to 2026-10-22");
        assert_eq!(leave_period(from, from), "2026-10-20");
    }

    #[test]
    fn test_status_cells_reuse_one_pattern() {
        let cells = ["Cancelled (2)", "Taken (0.50)", "Pending Approval", "Rejected ( 1.00 )"];
        let parsed: Vec<LeaveStatus> = cells.iter().map(|c| parse_status_cell(c).unwrap()).collect();
        assert_eq!(
            parsed,
            vec![
                LeaveStatus::Cancelled,
                LeaveStatus::Approved,
                LeaveStatus::PendingApproval,
                LeaveStatus::Rejected
            ]
        );
        assert!(std::ptr::eq(&*STATUS_CELL, &*STATUS_CELL));
    }
}
