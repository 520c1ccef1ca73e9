mod support;

use chrono::{Duration, Local};
use hrm_common::{LeaveRequest, LeaveStatus, LeaveType, Module, Role, SystemUser, TestDataGenerator, UserStatus};
use hrm_e2e::pages::{AdminPage, DashboardPage, EmployeePage, LeavePage, LoginPage, Screen};
use hrm_e2e::E2eError;
use test_case::test_case;

#[tokio::test]
async fn login_page_shows_error_for_bad_credentials() {
    let h = support::harness();
    let ctx = h.fixtures.anonymous().await.unwrap();
    let login = LoginPage::new(&ctx);

    login.navigate().await.unwrap();
    login.verify_login_page_elements().await.unwrap();
    let message = login
        .login_with_invalid_credentials("nobody", "wrong")
        .await
        .unwrap();
    assert_eq!(message, "Invalid credentials");

    login.navigate().await.unwrap();
    login.click_forgot_password().await.unwrap();
    ctx.close().await.unwrap();
}

#[test_case(Role::Admin, Module::Admin, true ; "admin reaches admin")]
#[test_case(Role::Ess, Module::Admin, false ; "ess refused admin")]
#[test_case(Role::Ess, Module::PersonalInfo, true ; "ess reaches own details")]
#[test_case(Role::Manager, Module::Leave, true ; "manager reaches leave")]
#[test_case(Role::Manager, Module::PersonalInfo, true ; "manager reaches own details")]
#[test_case(Role::Admin, Module::Leave, true ; "admin reaches leave")]
#[test_case(Role::Admin, Module::PersonalInfo, true ; "admin reaches own details")]
#[tokio::test]
async fn direct_module_access(role: Role, module: Module, reachable: bool) {
    let h = support::harness();
    let session = h.fixtures.acquire(role).await.unwrap();
    let dashboard = DashboardPage::new(session.ctx());

    assert_eq!(dashboard.module_visible(module).await.unwrap(), reachable);
    assert_eq!(dashboard.attempt_direct_access(module).await.unwrap(), reachable);
    session.logout().await.unwrap();
}

#[tokio::test]
async fn employee_with_photo_and_job_details() {
    let h = support::harness();
    let session = h.fixtures.acquire(Role::Admin).await.unwrap();
    let before = h.app.employee_count();

    let dir = tempfile::tempdir().unwrap();
    let photo = dir.path().join("avatar.png");
    std::fs::write(&photo, b"\x89PNG\r\n").unwrap();

    let mut employee = TestDataGenerator::new().generate_employee();
    employee.photo = Some(photo);
    employee.job_title = Some("Software Engineer".to_string());
    employee.location = Some("Head Office".to_string());

    let page = EmployeePage::new(session.ctx());
    let emp_number = page.create_employee(&employee).await.unwrap();
    assert!(emp_number.is_some());
    assert_eq!(h.app.employee_count(), before + 1);

    page.navigate().await.unwrap();
    assert!(page.employee_exists(&employee.full_name()).await.unwrap());
    session.logout().await.unwrap();
}

#[tokio::test]
async fn missing_photo_file_fails_upload() {
    let h = support::harness();
    let session = h.fixtures.acquire(Role::Admin).await.unwrap();

    let mut employee = TestDataGenerator::new().generate_employee();
    employee.photo = Some("/nonexistent/avatar.png".into());

    let page = EmployeePage::new(session.ctx());
    let err = page.create_employee(&employee).await.unwrap_err();
    assert!(matches!(err, E2eError::Playwright(_)));
    session.logout().await.unwrap();
}

#[tokio::test]
async fn invalid_employee_is_refused_before_the_browser() {
    let h = support::harness();
    let session = h.fixtures.acquire(Role::Admin).await.unwrap();
    let before = h.app.employee_count();

    let mut employee = TestDataGenerator::new().generate_employee();
    employee.employee_id = Some("12-ab".to_string());

    let err = EmployeePage::new(session.ctx())
        .create_employee(&employee)
        .await
        .unwrap_err();
    assert!(matches!(err, E2eError::ValidationFailed(_)));
    assert_eq!(h.app.employee_count(), before);
    session.logout().await.unwrap();
}

#[tokio::test]
async fn leave_apply_and_filter() {
    let h = support::harness();
    let session = h.fixtures.acquire(Role::Ess).await.unwrap();
    let page = LeavePage::new(session.ctx());

    let from = Local::now().date_naive() + Duration::days(10);
    let to = from + Duration::days(2);
    let request = LeaveRequest::new(LeaveType::Sick, from, to).with_comment("Dentist");

    page.navigate_to_apply_leave().await.unwrap();
    page.verify_apply_leave_page().await.unwrap();
    page.apply_leave(&request).await.unwrap();
    assert_eq!(
        h.app.leave_status("ess.user", from),
        Some(LeaveStatus::PendingApproval)
    );

    page.navigate_to_my_leave().await.unwrap();
    page.filter_by_date_range(from, to).await.unwrap();
    assert_eq!(page.leave_request_count().await.unwrap(), 1);
    assert_eq!(page.leave_status(0).await.unwrap(), LeaveStatus::PendingApproval);
    assert!(page.leave_request_exists(from, to).await.unwrap());

    page.filter_by_leave_type(LeaveType::Vacation).await.unwrap();
    assert_eq!(page.leave_request_count().await.unwrap(), 0);
    session.logout().await.unwrap();
}

#[tokio::test]
async fn inverted_leave_range_is_refused() {
    let h = support::harness();
    let session = h.fixtures.acquire(Role::Ess).await.unwrap();
    let page = LeavePage::new(session.ctx());

    let from = Local::now().date_naive() + Duration::days(5);
    let request = LeaveRequest::new(LeaveType::Vacation, from, from - Duration::days(1));

    page.navigate_to_apply_leave().await.unwrap();
    let err = page.apply_leave(&request).await.unwrap_err();
    assert!(matches!(err, E2eError::ValidationFailed(_)));
    assert_eq!(h.app.leave_status("ess.user", from), None);
    session.logout().await.unwrap();
}

#[tokio::test]
async fn admin_manages_system_users() {
    let h = support::harness();
    let session = h.fixtures.acquire(Role::Admin).await.unwrap();
    let page = AdminPage::new(session.ctx());

    page.navigate().await.unwrap();
    page.verify_admin_page().await.unwrap();
    assert!(page.user_exists("Admin").await.unwrap());

    let user = SystemUser {
        role: Role::Ess,
        employee_name: "Linda Anderson".to_string(),
        status: UserStatus::Enabled,
        username: "linda.a".to_string(),
        password: "Linda@1234".to_string(),
    };
    page.create_user(&user).await.unwrap();
    assert!(h.app.has_account("linda.a"));

    page.search_user_by_username("linda.a").await.unwrap();
    assert!(page.delete_first_user().await.unwrap());
    assert!(!h.app.has_account("linda.a"));

    let manager = SystemUser {
        role: Role::Manager,
        ..user
    };
    let err = page.create_user(&manager).await.unwrap_err();
    assert!(matches!(err, E2eError::ValidationFailed(_)));
    session.logout().await.unwrap();
}

#[tokio::test]
async fn screen_trait_opens_and_screenshots() {
    let h = support::harness();
    let session = h.fixtures.acquire(Role::Admin).await.unwrap();
    let page = EmployeePage::new(session.ctx());

    page.open().await.unwrap();
    page.verify_list_page().await.unwrap();
    let shot = page.take_screenshot("list").await.unwrap();
    assert!(shot.ends_with("employee-list.png"));
    assert!(shot.exists());
    session.logout().await.unwrap();
}
