//! Built-in acceptance scenarios
//!
//! Leave scenarios use disjoint date windows so they can run side by side
//! against the same ESS account without one reviewing the other's request.

use hrm_common::{Credential, LeaveStatus, LeaveType, Module, Role, SystemUser, UserStatus};
use tracing::{info, warn};

use crate::context::BrowserContext;
use crate::error::{E2eError, E2eResult};
use crate::lifecycle::{ReviewOutcome, Settlement, TrackedLeave};
use crate::pages::{AdminPage, DashboardPage, EmployeePage, LeavePage, LoginPage};
use crate::scenario::{Scenario, ScenarioCtx, Tag};

/// Every scenario the runner knows about
pub fn builtin() -> Vec<Scenario> {
    vec![
        admin_login(),
        login_error_flows(),
        ess_access_control(),
        role_access_matrix(),
        employee_crud(),
        employee_job_details(),
        employee_search_reset(),
        leave_round_trip(),
        leave_approval(),
        leave_rejection(),
        leave_list_filters(),
        full_employee_lifecycle(),
        admin_user_search(),
        admin_user_management(),
        admin_configuration(),
    ]
}

/// Scenarios matching `tag` and/or `name`; no filter selects all
pub fn select(tag: Option<Tag>, name: Option<&str>) -> Vec<Scenario> {
    builtin()
        .into_iter()
        .filter(|s| tag.map_or(true, |t| s.has_tag(t)))
        .filter(|s| name.map_or(true, |n| s.name().eq_ignore_ascii_case(n)))
        .collect()
}

fn expect_count(what: &str, expected: usize, actual: usize) -> E2eResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(E2eError::unexpected(format!("{} (expected {})", what, expected), actual))
    }
}

fn expect(condition: bool, what: &str, observed: impl ToString) -> E2eResult<()> {
    if condition {
        Ok(())
    } else {
        Err(E2eError::unexpected(what, observed))
    }
}

fn tracked_leave(ctx: &mut ScenarioCtx) -> E2eResult<TrackedLeave> {
    ctx.scratch
        .leave
        .take()
        .ok_or_else(|| E2eError::unexpected("tracked leave request", "none"))
}

fn admin_login() -> Scenario {
    Scenario::new("Admin login reaches dashboard", &[Tag::Smoke, Tag::Auth])
        .step("sign in as Admin", |ctx| Box::pin(ctx.switch_to(Role::Admin)))
        .step("dashboard loaded", |ctx| Box::pin(dashboard_loaded(ctx)))
}

async fn dashboard_loaded(ctx: &mut ScenarioCtx) -> E2eResult<()> {
    let session = ctx.session()?;
    let dashboard = DashboardPage::new(session.ctx());
    dashboard.verify_dashboard_loaded().await?;
    let widgets = dashboard.verify_dashboard_widgets().await?;
    info!("dashboard shows {} widget(s)", widgets);

    let user = dashboard.current_user_name().await?;
    expect(!user.is_empty(), "signed-in user name", "empty")?;
    ctx.screenshot("dashboard").await?;
    Ok(())
}

fn login_error_flows() -> Scenario {
    Scenario::new("Login rejects invalid credentials", &[Tag::Auth])
        .step("invalid credentials show an error", |ctx| Box::pin(invalid_login(ctx)))
        .step("wrong password fails authentication", |ctx| Box::pin(rejected_acquire(ctx)))
}

async fn invalid_login(ctx: &mut ScenarioCtx) -> E2eResult<()> {
    let anonymous = ctx.fixtures().anonymous().await?;
    let result = invalid_login_on(&anonymous).await;
    let closed = anonymous.close().await;
    result.and(closed)
}

async fn invalid_login_on(ctx: &BrowserContext) -> E2eResult<()> {
    let login = LoginPage::new(ctx);
    login.navigate().await?;
    login.verify_login_page_elements().await?;
    let message = login
        .login_with_invalid_credentials("invalid.user", "not-the-password")
        .await?;
    expect(message.contains("Invalid credentials"), "login error message", &message)?;

    login.navigate().await?;
    login.click_forgot_password().await
}

async fn rejected_acquire(ctx: &mut ScenarioCtx) -> E2eResult<()> {
    let admin = ctx.fixtures().config().roles.credential(Role::Admin).clone();
    let wrong = Credential::new(admin.identity(), "not-the-password", Role::Admin);
    match ctx.fixtures().acquire_as(wrong).await {
        Err(E2eError::AuthenticationFailed { .. }) => Ok(()),
        Err(e) => Err(e),
        Ok(session) => {
            session.close().await?;
            Err(E2eError::unexpected("login with a wrong password", "dashboard"))
        }
    }
}

fn ess_access_control() -> Scenario {
    Scenario::new("ESS cannot reach Admin", &[Tag::Rbac, Tag::Smoke])
        .step("sign in as ESS", |ctx| Box::pin(ctx.switch_to(Role::Ess)))
        .step("Admin menu hidden", |ctx| Box::pin(admin_menu_hidden(ctx)))
        .step("Admin URL refused", |ctx| Box::pin(admin_url_refused(ctx)))
}

async fn admin_menu_hidden(ctx: &mut ScenarioCtx) -> E2eResult<()> {
    let dashboard = DashboardPage::new(ctx.session()?.ctx());
    let visible = dashboard.admin_tab_visible().await?;
    expect(!visible, "Admin menu for ESS", "visible")
}

async fn admin_url_refused(ctx: &mut ScenarioCtx) -> E2eResult<()> {
    let dashboard = DashboardPage::new(ctx.session()?.ctx());
    let reached = dashboard.attempt_direct_access(Module::Admin).await?;
    expect(!reached, "Admin screen for ESS", "rendered")
}

fn role_access_matrix() -> Scenario {
    let mut scenario = Scenario::new("Role access matrix", &[Tag::Rbac]);
    for role in Role::ALL {
        scenario = scenario.step(format!("{} module access", role), move |ctx| {
            Box::pin(role_access(ctx, role))
        });
    }
    scenario
}

async fn role_access(ctx: &mut ScenarioCtx, role: Role) -> E2eResult<()> {
    ctx.switch_to(role).await?;
    let dashboard = DashboardPage::new(ctx.session()?.ctx());
    let capabilities = role.capabilities();

    for module in Module::ALL {
        let visible = dashboard.module_visible(module).await?;
        if capabilities.grants(module) {
            expect(visible, &format!("{} menu for {}", module, role), "hidden")?;
        }
        if capabilities.denies(module) {
            expect(!visible, &format!("{} menu for {}", module, role), "visible")?;
        }
    }
    for module in capabilities.granted.iter().copied() {
        let reached = dashboard.attempt_direct_access(module).await?;
        expect(reached, &format!("{} screen for {}", module, role), "not rendered")?;
    }
    for module in capabilities.denied.iter().copied() {
        let reached = dashboard.attempt_direct_access(module).await?;
        expect(!reached, &format!("{} screen for {}", module, role), "rendered")?;
    }
    Ok(())
}

fn employee_crud() -> Scenario {
    Scenario::new("Employee create, find and delete", &[Tag::Employee, Tag::Smoke])
        .step("sign in as Admin", |ctx| Box::pin(ctx.switch_to(Role::Admin)))
        .step("create employee", |ctx| Box::pin(create_plain_employee(ctx)))
        .step("find employee by name", |ctx| Box::pin(find_employee(ctx, 1)))
        .step("delete employee", |ctx| Box::pin(delete_employee(ctx)))
        .step("employee no longer listed", |ctx| Box::pin(find_employee(ctx, 0)))
}

async fn create_plain_employee(ctx: &mut ScenarioCtx) -> E2eResult<()> {
    let mut employee = ctx.data.generate_employee();
    employee.employee_id = None;

    let page = EmployeePage::new(ctx.session()?.ctx());
    page.create_employee(&employee).await?;
    ctx.scratch.employee = Some(employee);
    Ok(())
}

async fn find_employee(ctx: &mut ScenarioCtx, expected: usize) -> E2eResult<()> {
    let name = ctx
        .scratch
        .employee
        .as_ref()
        .map(|e| e.full_name())
        .ok_or_else(|| E2eError::unexpected("created employee", "none"))?;

    let page = EmployeePage::new(ctx.session()?.ctx());
    page.navigate().await?;
    page.search_by_name(&name).await?;
    let count = page.employee_count().await?;
    expect_count(&format!("employees named {}", name), expected, count)
}

async fn delete_employee(ctx: &mut ScenarioCtx) -> E2eResult<()> {
    let page = EmployeePage::new(ctx.session()?.ctx());
    let confirmed = page.delete_first_employee().await?;
    info!("employee deleted (confirmation shown: {})", confirmed);
    Ok(())
}

fn employee_job_details() -> Scenario {
    Scenario::new("Employee job details", &[Tag::Employee])
        .step("sign in as Admin", |ctx| Box::pin(ctx.switch_to(Role::Admin)))
        .step("create employee with job details", |ctx| Box::pin(create_staffed_employee(ctx)))
        .step("find employee by id", |ctx| Box::pin(find_employee_by_id(ctx)))
}

async fn create_staffed_employee(ctx: &mut ScenarioCtx) -> E2eResult<()> {
    let mut employee = ctx.data.generate_employee();
    employee.middle_name = Some("Q".to_string());
    employee.job_title = Some("QA Engineer".to_string());
    employee.department = Some("Engineering".to_string());
    employee.location = Some("Head Office".to_string());

    let page = EmployeePage::new(ctx.session()?.ctx());
    let emp_number = page.create_employee(&employee).await?;
    info!("{} created as #{:?}", employee.full_name(), emp_number);
    ctx.screenshot("job-details").await?;
    ctx.scratch.employee = Some(employee);
    Ok(())
}

async fn find_employee_by_id(ctx: &mut ScenarioCtx) -> E2eResult<()> {
    let id = ctx
        .scratch
        .employee
        .as_ref()
        .and_then(|e| e.employee_id.clone())
        .ok_or_else(|| E2eError::unexpected("employee id", "none"))?;

    let page = EmployeePage::new(ctx.session()?.ctx());
    page.navigate().await?;
    page.search_by_id(&id).await?;
    let count = page.employee_count().await?;
    expect_count(&format!("employees with id {}", id), 1, count)
}

fn employee_search_reset() -> Scenario {
    Scenario::new("Employee search reset restores the list", &[Tag::Employee, Tag::Regression])
        .step("sign in as Admin", |ctx| Box::pin(ctx.switch_to(Role::Admin)))
        .step("record unfiltered count", |ctx| Box::pin(employee_baseline(ctx)))
        .step("search and reset", |ctx| Box::pin(search_then_reset(ctx)))
}

async fn employee_baseline(ctx: &mut ScenarioCtx) -> E2eResult<()> {
    let page = EmployeePage::new(ctx.session()?.ctx());
    page.navigate().await?;
    page.verify_list_page().await?;
    let count = page.employee_count().await?;
    ctx.scratch.baseline = Some(count);
    Ok(())
}

async fn search_then_reset(ctx: &mut ScenarioCtx) -> E2eResult<()> {
    let baseline = ctx
        .scratch
        .baseline
        .ok_or_else(|| E2eError::unexpected("baseline count", "none"))?;
    let nobody = ctx.data.unique_label("Nobody");

    let page = EmployeePage::new(ctx.session()?.ctx());
    page.search_by_name(&nobody).await?;
    let filtered = page.employee_count().await?;
    expect_count("employees matching an unknown name", 0, filtered)?;
    page.reset_search().await?;

    // parallel scenarios hire and remove employees meanwhile
    let after = page.employee_count().await?;
    expect(after >= filtered, "employees after reset", after)?;
    if after != baseline {
        warn!("employee list moved from {} to {} during the search", baseline, after);
    }
    Ok(())
}

fn leave_round_trip() -> Scenario {
    Scenario::new("Leave request round trip", &[Tag::Leave, Tag::Smoke])
        .step("sign in as ESS", |ctx| Box::pin(ctx.switch_to(Role::Ess)))
        .step("apply for leave", |ctx| Box::pin(submit_leave(ctx, 21, 1)))
        .step("request listed by date range", |ctx| Box::pin(leave_listed(ctx)))
}

async fn submit_leave(ctx: &mut ScenarioCtx, offset_days: u32, duration_days: u32) -> E2eResult<()> {
    let request = ctx.data.generate_leave_request(offset_days, duration_days);
    let tracked = ctx.lifecycle.submit(ctx.session()?, request).await?;
    ctx.scratch.leave = Some(tracked);
    Ok(())
}

async fn leave_listed(ctx: &mut ScenarioCtx) -> E2eResult<()> {
    let (from, to) = match &ctx.scratch.leave {
        Some(tracked) => (tracked.request().from, tracked.request().to),
        None => return Err(E2eError::unexpected("tracked leave request", "none")),
    };
    let page = LeavePage::new(ctx.session()?.ctx());
    page.navigate_to_my_leave().await?;
    page.filter_by_date_range(from, to).await?;
    let rows = page.leave_request_count().await?;
    expect(rows >= 1, "leave rows in the submitted range", rows)?;
    expect(page.leave_request_exists(from, to).await?, "submitted leave listed", "absent")
}

fn leave_approval() -> Scenario {
    Scenario::new("Leave approval lifecycle", &[Tag::Leave, Tag::Lifecycle])
        .step("sign in as ESS", |ctx| Box::pin(ctx.switch_to(Role::Ess)))
        .step("apply for leave", |ctx| Box::pin(submit_leave(ctx, 7, 3)))
        .step("hand over to Manager", |ctx| Box::pin(ctx.switch_to(Role::Manager)))
        .step("approve request", |ctx| Box::pin(review_leave(ctx, true)))
        .step("hand back to ESS", |ctx| Box::pin(ctx.switch_to(Role::Ess)))
        .step("status read back", |ctx| Box::pin(confirm_leave(ctx)))
}

fn leave_rejection() -> Scenario {
    Scenario::new("Leave rejection lifecycle", &[Tag::Leave, Tag::Lifecycle])
        .step("sign in as ESS", |ctx| Box::pin(ctx.switch_to(Role::Ess)))
        .step("apply for leave", |ctx| Box::pin(submit_leave(ctx, 35, 0)))
        .step("hand over to Manager", |ctx| Box::pin(ctx.switch_to(Role::Manager)))
        .step("reject request", |ctx| Box::pin(review_leave(ctx, false)))
        .step("hand back to ESS", |ctx| Box::pin(ctx.switch_to(Role::Ess)))
        .step("status read back", |ctx| Box::pin(confirm_leave(ctx)))
}

async fn review_leave(ctx: &mut ScenarioCtx, approve: bool) -> E2eResult<()> {
    let mut tracked = tracked_leave(ctx)?;
    let reviewer = ctx.session()?;
    let outcome = if approve {
        ctx.lifecycle.approve(reviewer, &mut tracked).await?
    } else {
        ctx.lifecycle
            .reject(reviewer, &mut tracked, Some("Rejected during acceptance run"))
            .await?
    };
    if outcome == ReviewOutcome::NothingToReview {
        info!("nothing to review; request stays {}", tracked.state());
    }
    ctx.scratch.leave = Some(tracked);
    Ok(())
}

async fn confirm_leave(ctx: &mut ScenarioCtx) -> E2eResult<()> {
    let tracked = ctx
        .scratch
        .leave
        .as_ref()
        .ok_or_else(|| E2eError::unexpected("tracked leave request", "none"))?;
    let settlement = ctx.lifecycle.confirm(ctx.session()?, tracked).await?;
    if settlement == Settlement::Propagating {
        info!("decision on {} not yet visible to the owner", tracked.request().from_date());
    }
    Ok(())
}

fn leave_list_filters() -> Scenario {
    Scenario::new("Leave screens and filters", &[Tag::Leave, Tag::Regression])
        .step("sign in as ESS", |ctx| Box::pin(ctx.switch_to(Role::Ess)))
        .step("apply and My Leave screens", |ctx| Box::pin(ess_leave_screens(ctx)))
        .step("hand over to Manager", |ctx| Box::pin(ctx.switch_to(Role::Manager)))
        .step("filter and reset Leave List", |ctx| Box::pin(filter_leave_list(ctx)))
}

async fn ess_leave_screens(ctx: &mut ScenarioCtx) -> E2eResult<()> {
    let page = LeavePage::new(ctx.session()?.ctx());
    page.navigate_to_apply_leave().await?;
    page.verify_apply_leave_page().await?;
    let calendar = page.leave_calendar_displayed().await?;
    info!("leave calendar displayed: {}", calendar);
    page.navigate_to_my_leave().await?;
    page.verify_my_leave_page().await
}

async fn filter_leave_list(ctx: &mut ScenarioCtx) -> E2eResult<()> {
    let page = LeavePage::new(ctx.session()?.ctx());
    page.navigate_to_leave_list().await?;
    page.verify_leave_list_page().await?;
    let baseline = page.leave_request_count().await?;

    page.filter_by_status(LeaveStatus::PendingApproval).await?;
    let pending = page.leave_request_count().await?;
    for row in 0..pending {
        let status = page.leave_status(row).await?;
        expect(status == LeaveStatus::PendingApproval, "filtered row status", status)?;
    }
    page.filter_by_leave_type(LeaveType::Vacation).await?;
    page.reset_filters().await?;
    let after = page.leave_request_count().await?;
    expect(after >= pending, "leave rows after reset", after)?;
    info!("{} leave row(s) before filtering, {} after reset", baseline, after);
    Ok(())
}

fn full_employee_lifecycle() -> Scenario {
    Scenario::new("New employee leave lifecycle", &[Tag::Lifecycle, Tag::Employee, Tag::Leave])
        .step("sign in as Admin", |ctx| Box::pin(ctx.switch_to(Role::Admin)))
        .step("create employee with login", |ctx| Box::pin(create_employee_with_login(ctx)))
        .step("sign in as the new employee", |ctx| Box::pin(switch_to_new_employee(ctx)))
        .step("apply for leave", |ctx| Box::pin(submit_leave(ctx, 49, 2)))
        .step("hand over to Manager", |ctx| Box::pin(ctx.switch_to(Role::Manager)))
        .step("approve request", |ctx| Box::pin(review_leave(ctx, true)))
        .step("hand back to the new employee", |ctx| Box::pin(switch_to_new_employee(ctx)))
        .step("status read back", |ctx| Box::pin(confirm_leave(ctx)))
}

async fn create_employee_with_login(ctx: &mut ScenarioCtx) -> E2eResult<()> {
    let mut employee = ctx.data.generate_employee();
    let login = ctx.data.generate_credentials(&employee);
    employee.login = Some(login.clone());

    let page = EmployeePage::new(ctx.session()?.ctx());
    page.create_employee(&employee).await?;
    ctx.scratch.employee = Some(employee);
    ctx.scratch.login = Some(login);
    Ok(())
}

async fn switch_to_new_employee(ctx: &mut ScenarioCtx) -> E2eResult<()> {
    let login = ctx
        .scratch
        .login
        .clone()
        .ok_or_else(|| E2eError::unexpected("generated login", "none"))?;
    ctx.switch_to_credential(login).await
}

fn admin_user_search() -> Scenario {
    Scenario::new("Admin user search", &[Tag::Admin])
        .step("sign in as Admin", |ctx| Box::pin(ctx.switch_to(Role::Admin)))
        .step("search users", |ctx| Box::pin(search_users(ctx)))
}

async fn search_users(ctx: &mut ScenarioCtx) -> E2eResult<()> {
    let username = ctx.session()?.credential().identity().to_string();
    let page = AdminPage::new(ctx.session()?.ctx());
    page.navigate().await?;
    page.verify_admin_page().await?;
    page.verify_users_page().await?;
    let baseline = page.user_count().await?;

    expect(page.user_exists(&username).await?, "signed-in admin listed", "absent")?;
    page.reset_search().await?;

    page.search_user_by_role(Role::Admin).await?;
    let admins = page.user_count().await?;
    expect(admins >= 1, "users with the Admin role", admins)?;
    page.reset_search().await?;

    page.search_user_by_status(UserStatus::Enabled).await?;
    let enabled = page.user_count().await?;
    expect(enabled >= 1, "enabled users", enabled)?;
    page.reset_search().await?;

    // other scenarios may add users meanwhile
    let after = page.user_count().await?;
    expect(after >= admins.max(enabled), "users after reset", after)?;
    info!("{} user(s) before search, {} after reset", baseline, after);
    Ok(())
}

fn admin_user_management() -> Scenario {
    Scenario::new("Admin user management", &[Tag::Admin, Tag::Regression])
        .step("sign in as Admin", |ctx| Box::pin(ctx.switch_to(Role::Admin)))
        .step("create employee", |ctx| Box::pin(create_plain_employee(ctx)))
        .step("create system user", |ctx| Box::pin(create_system_user(ctx)))
        .step("edit and delete user", |ctx| Box::pin(edit_and_delete_user(ctx)))
}

async fn create_system_user(ctx: &mut ScenarioCtx) -> E2eResult<()> {
    let employee = ctx
        .scratch
        .employee
        .clone()
        .ok_or_else(|| E2eError::unexpected("created employee", "none"))?;
    let login = ctx.data.generate_credentials(&employee);
    let user = SystemUser {
        role: Role::Ess,
        employee_name: employee.full_name(),
        status: UserStatus::Enabled,
        username: login.identity().to_string(),
        password: login.secret().to_string(),
    };

    let page = AdminPage::new(ctx.session()?.ctx());
    page.navigate_to_users().await?;
    page.create_user(&user).await?;
    ctx.scratch.login = Some(login);
    Ok(())
}

async fn edit_and_delete_user(ctx: &mut ScenarioCtx) -> E2eResult<()> {
    let username = ctx
        .scratch
        .login
        .as_ref()
        .map(|c| c.identity().to_string())
        .ok_or_else(|| E2eError::unexpected("created user", "none"))?;

    let page = AdminPage::new(ctx.session()?.ctx());
    page.search_user_by_username(&username).await?;
    expect_count(&format!("users named {}", username), 1, page.user_count().await?)?;
    page.edit_first_user().await?;

    page.navigate_to_users().await?;
    page.search_user_by_username(&username).await?;
    page.delete_first_user().await?;
    page.search_user_by_username(&username).await?;
    expect_count(&format!("users named {} after delete", username), 0, page.user_count().await?)
}

fn admin_configuration() -> Scenario {
    Scenario::new("Admin job titles and locations", &[Tag::Admin])
        .step("sign in as Admin", |ctx| Box::pin(ctx.switch_to(Role::Admin)))
        .step("add job title", |ctx| Box::pin(add_job_title(ctx)))
        .step("add location", |ctx| Box::pin(add_location(ctx)))
}

async fn add_job_title(ctx: &mut ScenarioCtx) -> E2eResult<()> {
    let title = ctx.data.unique_label("QA Lead");
    let page = AdminPage::new(ctx.session()?.ctx());
    page.add_job_title(&title, Some("Owns acceptance coverage")).await
}

async fn add_location(ctx: &mut ScenarioCtx) -> E2eResult<()> {
    let name = ctx.data.unique_label("Branch");
    let page = AdminPage::new(ctx.session()?.ctx());
    page.add_location(&name, "Germany").await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::RoleFixtures;
    use crate::sim::SimApp;
    use hrm_common::HarnessConfig;
    use std::collections::HashSet;
    use std::sync::Arc;

    async fn hire_from_another_session(ctx: &mut ScenarioCtx) -> E2eResult<()> {
        let mut employee = ctx.data.generate_employee();
        employee.employee_id = None;
        let other = ctx.fixtures().acquire(Role::Admin).await?;
        EmployeePage::new(other.ctx()).create_employee(&employee).await?;
        other.logout().await
    }

    #[tokio::test]
    async fn test_search_reset_tolerates_concurrent_hires() {
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(HarnessConfig {
            artifacts_dir: dir.path().to_path_buf(),
            ..HarnessConfig::default()
        });
        let app = Arc::new(SimApp::new(&config));
        let fixtures = RoleFixtures::new(config.clone(), app.clone());

        let scenario = Scenario::new("Search reset while hiring", &[Tag::Employee])
            .step("sign in as Admin", |ctx| Box::pin(ctx.switch_to(Role::Admin)))
            .step("record unfiltered count", |ctx| Box::pin(employee_baseline(ctx)))
            .step("hire elsewhere", |ctx| Box::pin(hire_from_another_session(ctx)))
            .step("search and reset", |ctx| Box::pin(search_then_reset(ctx)));

        let before = app.employee_count();
        let report = scenario.run(fixtures).await;
        assert!(report.passed, "{:?}", report.failure);
        assert_eq!(app.employee_count(), before + 1);
        assert_eq!(app.open_contexts(), 0);
    }

    #[test]
    fn test_names_unique_and_tagged() {
        let scenarios = builtin();
        let mut names = HashSet::new();
        for scenario in &scenarios {
            assert!(names.insert(scenario.name().to_string()), "duplicate {}", scenario.name());
            assert!(!scenario.tags().is_empty(), "{} has no tag", scenario.name());
            assert!(!scenario.step_names().is_empty());
        }
    }

    #[test]
    fn test_select_filters() {
        let leave = select(Some(Tag::Leave), None);
        assert!(!leave.is_empty());
        assert!(leave.iter().all(|s| s.has_tag(Tag::Leave)));

        let one = select(None, Some("leave approval lifecycle"));
        assert_eq!(one.len(), 1);
        assert!(select(Some(Tag::Auth), Some("Leave approval lifecycle")).is_empty());
    }

    #[test]
    fn test_matrix_covers_every_role() {
        let matrix = role_access_matrix();
        assert_eq!(matrix.step_names().len(), Role::ALL.len());
    }
}
