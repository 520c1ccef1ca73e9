//! Element tree of the current screen

use hrm_common::{LeaveStatus, LeaveType, PartialDays, Role, UserStatus};

use super::backend::{Backend, COUNTRIES, DEPARTMENTS};
use super::browser::{Browser, Dialog, Row};
use super::dom::{Act, Node, Press};
use super::view::{View, MY_DETAILS_PATH, PIM_MODULE_PATH};
use crate::context::SELECT_OPTION;
use crate::pages::{
    admin, dashboard, employee, leave, login, PageKind, AUTOCOMPLETE_INPUT, HEADING, PLAIN_BUTTON,
    SELECT_INPUT, SUBMIT_BUTTON, TABLE, TABLE_CELL, TABLE_ROWS,
};

const PLACEHOLDER: &str = "-- Select --";

fn heading(text: &str) -> Node {
    Node::new(&[HEADING]).text(text)
}

fn submit(label: &str, press: Press) -> Node {
    Node::new(&[SUBMIT_BUTTON, "button"]).text(label).press(press)
}

fn plain(label: &str, press: Press) -> Node {
    Node::new(&[PLAIN_BUTTON, "button"]).text(label).press(press)
}

fn text_input(selectors: &[&'static str], field: &'static str) -> Node {
    let mut all = selectors.to_vec();
    all.extend([admin::TEXT_INPUT, "input"]);
    Node::new(&all).act(Act::Input(field))
}

fn field_error(browser: &Browser) -> Option<Node> {
    browser
        .field_error
        .as_ref()
        .map(|e| Node::new(&[".oxd-input-field-error-message"]).text(e.clone()))
}

/// Dropdown plus its options list while open
fn select(browser: &Browser, field: &'static str, options: Vec<String>) -> Vec<Node> {
    let current = browser
        .form
        .get(field)
        .cloned()
        .unwrap_or_else(|| PLACEHOLDER.to_string());
    let mut nodes = vec![Node::new(&[SELECT_INPUT]).text(current).act(Act::Dropdown(field))];
    if browser.open_dropdown == Some(field) {
        nodes.push(
            Node::new(&[".oxd-select-dropdown"]).children(
                options
                    .into_iter()
                    .map(|o| Node::new(&[SELECT_OPTION]).text(o.clone()).act(Act::Choose(field, o))),
            ),
        );
    }
    nodes
}

fn labels<I, T>(items: I, label: fn(&T) -> &'static str) -> Vec<String>
where
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(|i| label(&i).to_string()).collect()
}

fn table(rows: &[Row]) -> Node {
    let body = Node::new(&[".oxd-table-body"]).children(rows.iter().map(|row| {
        let actions = Node::new(&[TABLE_CELL]).children(row.actions.iter().map(|(icon, press)| {
            Node::new(&["button"]).child(Node::new(&[*icon]).press(press.clone()))
        }));
        Node::new(&[TABLE_ROWS, ".oxd-table-row"])
            .children(row.cells.iter().map(|c| Node::new(&[TABLE_CELL]).text(c.clone())))
            .child(actions)
    }));
    let mut node = Node::new(&[TABLE]).child(body);
    if rows.is_empty() {
        node = node.child(Node::new(&["span"]).text("No Records Found"));
    }
    node
}

fn side_panel(role: Role) -> Node {
    let mut tabs = Vec::new();
    if role == Role::Admin {
        tabs.push(
            Node::new(&[dashboard::ADMIN_TAB])
                .text("Admin")
                .press(Press::Goto(PageKind::Admin.path())),
        );
        tabs.push(
            Node::new(&[dashboard::PIM_TAB])
                .text("PIM")
                .press(Press::Goto(PIM_MODULE_PATH)),
        );
    }
    tabs.push(
        Node::new(&[dashboard::LEAVE_TAB])
            .text("Leave")
            .press(Press::Goto(PageKind::Leave.path())),
    );
    tabs.push(
        Node::new(&[dashboard::MY_INFO_TAB])
            .text("My Info")
            .press(Press::Goto(MY_DETAILS_PATH)),
    );
    tabs.push(
        Node::new(&[".oxd-main-menu-item"])
            .text("Dashboard")
            .press(Press::Goto(PageKind::Dashboard.path())),
    );

    Node::new(&[dashboard::SIDE_MENU])
        .child(Node::new(&[admin::TEXT_INPUT, "input"]).act(Act::Input("menu_search")))
        .children(tabs)
}

fn top_bar(browser: &Browser, display_name: &str) -> Node {
    let mut header = Node::new(&[".oxd-topbar-header"]);
    if let Some(crumb) = browser.view.breadcrumb() {
        header = header.child(
            Node::new(&[".oxd-topbar-header-breadcrumb"])
                .child(Node::new(&[HEADING, ".oxd-topbar-header-breadcrumb h6"]).text(crumb)),
        );
    }
    header = header.child(
        Node::new(&[dashboard::USER_DROPDOWN])
            .press(Press::UserMenu)
            .child(Node::new(&[dashboard::USER_NAME]).text(display_name)),
    );
    if browser.user_menu {
        header = header.child(
            Node::new(&[".oxd-dropdown-menu"])
                .child(Node::new(&["a"]).text("About"))
                .child(
                    Node::new(&[dashboard::LOGOUT_LINK])
                        .text("Logout")
                        .press(Press::Logout),
                ),
        );
    }
    header
}

fn admin_nav(browser: &Browser) -> Node {
    const MENUS: [(&str, &[&str]); 4] = [
        ("User Management", &["Users"]),
        ("Job", &["Job Titles", "Pay Grades", "Employment Status"]),
        ("Organization", &["General Information", "Locations", "Structure"]),
        ("Qualifications", &["Skills", "Education"]),
    ];
    let mut nav = Node::new(&[".oxd-topbar-body-nav"]);
    for (menu, links) in MENUS {
        nav = nav.child(
            Node::new(&[admin::TOPBAR_MENU])
                .text(menu)
                .press(Press::TopMenu(menu)),
        );
        if browser.top_menu == Some(menu) {
            nav = nav.child(Node::new(&[".oxd-dropdown-menu"]).children(links.iter().map(|link| {
                let target = match *link {
                    "Users" => Some(PageKind::Admin.path()),
                    "Job Titles" => Some("/web/index.php/admin/viewJobTitleList"),
                    "Locations" => Some("/web/index.php/admin/viewLocations"),
                    _ => None,
                };
                let node = Node::new(&[admin::TOPBAR_LINK]).text(*link);
                match target {
                    Some(path) => node.press(Press::Goto(path)),
                    None => node,
                }
            })));
        }
    }
    nav
}

fn login_screen(browser: &Browser) -> Vec<Node> {
    let mut nodes = vec![Node::new(&[login::TITLE, "h5"]).text("Login")];
    if let Some(alert) = &browser.alert {
        nodes.push(Node::new(&[".oxd-alert"]).child(Node::new(&[login::ERROR_MESSAGE]).text(alert.clone())));
    }
    nodes.push(Node::new(&[login::USERNAME, "input"]).act(Act::Input("username")));
    nodes.push(Node::new(&[login::PASSWORD, "input"]).act(Act::Input("password")));
    nodes.extend(field_error(browser));
    nodes.push(
        Node::new(&[login::SUBMIT, "button"])
            .text("Login")
            .press(Press::Login),
    );
    nodes.push(
        Node::new(&[login::FORGOT_PASSWORD])
            .text("Forgot your password?")
            .press(Press::ForgotPassword),
    );
    vec![Node::new(&[".orangehrm-login-container"]).children(nodes)]
}

fn employee_tabs() -> Node {
    let tabs = [
        "Personal Details",
        "Contact Details",
        "Emergency Contacts",
        "Dependents",
        "Immigration",
        "Job",
        "Salary",
        "Report-to",
    ];
    Node::new(&[".orangehrm-tabs"]).children(tabs.into_iter().map(|t| {
        let tab = Node::new(&[employee::JOB_TAB, ".orangehrm-tabs-item"]).text(t);
        if t == "Job" {
            tab.press(Press::JobTab)
        } else {
            tab
        }
    }))
}

fn leave_filters(browser: &Browser, with_employee: bool) -> Vec<Node> {
    let mut nodes = vec![
        text_input(&[leave::DATE_INPUT], "filter_from"),
        text_input(&[leave::DATE_INPUT], "filter_to"),
    ];
    nodes.extend(select(browser, "filter_type", labels(LeaveType::ALL, LeaveType::label)));
    nodes.extend(select(
        browser,
        "filter_status",
        labels(
            [
                LeaveStatus::Rejected,
                LeaveStatus::Cancelled,
                LeaveStatus::PendingApproval,
                LeaveStatus::Approved,
            ],
            LeaveStatus::label,
        ),
    ));
    if with_employee {
        nodes.push(text_input(&[AUTOCOMPLETE_INPUT], "filter_employee"));
    }
    nodes.push(plain("Reset", Press::Reset));
    nodes.push(submit("Search", Press::Search));
    nodes
}

fn content(browser: &Browser, backend: &Backend) -> Vec<Node> {
    match &browser.view {
        View::Login => login_screen(browser),
        View::ResetPassword => vec![
            heading("Reset Password"),
            Node::new(&[login::USERNAME, "input"]).act(Act::Input("username")),
            plain("Cancel", Press::Cancel),
            submit("Reset Password", Press::Search),
        ],
        View::Dashboard => ["Time at Work", "My Actions", "Quick Launch", "Employees on Leave Today"]
            .into_iter()
            .map(|w| {
                Node::new(&[dashboard::WIDGET]).child(Node::new(&["p"]).text(w))
            })
            .collect(),
        View::EmployeeList => vec![
            heading("Employee Information"),
            text_input(&[AUTOCOMPLETE_INPUT], "emp_name"),
            text_input(&[AUTOCOMPLETE_INPUT], "emp_id"),
            plain("Reset", Press::Reset),
            submit("Search", Press::Search),
            plain("Add", Press::Add),
            table(&browser.rows),
        ],
        View::AddEmployee => {
            let mut form = vec![
                Node::new(&[employee::PHOTO_INPUT, "input"]).act(Act::File),
                text_input(&[employee::FIRST_NAME], "first"),
                text_input(&[employee::MIDDLE_NAME], "middle"),
                text_input(&[employee::LAST_NAME], "last"),
                text_input(&[employee::EMPLOYEE_ID], "employee_id"),
                Node::new(&[employee::CREATE_LOGIN_SWITCH]).press(Press::CreateLogin),
            ];
            if browser.create_login {
                form.push(text_input(&[employee::LOGIN_USERNAME], "login_username"));
                form.push(text_input(&[employee::LOGIN_PASSWORD], "login_password"));
                form.push(text_input(&[employee::LOGIN_PASSWORD], "login_confirm"));
            }
            form.extend(field_error(browser));
            form.push(plain("Cancel", Press::Cancel));
            form.push(submit("Save", Press::Save));
            vec![
                heading("Add Employee"),
                Node::new(&[".orangehrm-employee-form"]).children(form),
            ]
        }
        View::PersonalDetails(n) => {
            let name = backend.employee(*n).map(|e| e.full_name()).unwrap_or_default();
            let mut nodes = vec![
                Node::new(&[".orangehrm-edit-employee-name"]).text(name),
                employee_tabs(),
                heading("Personal Details"),
                text_input(&[employee::FIRST_NAME], "first"),
                text_input(&[employee::MIDDLE_NAME], "middle"),
                text_input(&[employee::LAST_NAME], "last"),
            ];
            if backend.employee(*n).map_or(false, |e| e.has_photo) {
                nodes.push(Node::new(&[".employee-image"]));
            }
            nodes.push(submit("Save", Press::Save));
            nodes
        }
        View::JobDetails(_) => {
            let mut nodes = vec![employee_tabs(), heading("Job Details")];
            let titles = backend.job_titles.iter().map(|(t, _)| t.clone()).collect();
            nodes.extend(select(browser, "job_title", titles));
            let departments = DEPARTMENTS.iter().map(|d| d.to_string()).collect();
            nodes.extend(select(browser, "department", departments));
            let locations = backend.locations.iter().map(|l| l.name.clone()).collect();
            nodes.extend(select(browser, "location", locations));
            nodes.push(submit("Save", Press::Save));
            nodes
        }
        View::ApplyLeave => {
            let mut nodes = vec![heading("Apply Leave")];
            nodes.extend(select(browser, "leave_type", labels(LeaveType::ALL, LeaveType::label)));
            nodes.push(Node::new(&[".orangehrm-leave-balance"]).text("12.00 Day(s)"));
            nodes.push(text_input(&[leave::DATE_INPUT], "from"));
            nodes.push(text_input(&[leave::DATE_INPUT], "to"));
            if browser.calendar {
                nodes.push(Node::new(&[leave::CALENDAR]));
            }
            if browser.form.contains_key("from") && browser.form.contains_key("to") {
                nodes.extend(select(browser, "partial", labels(PartialDays::ALL, PartialDays::label)));
            }
            nodes.push(Node::new(&[leave::COMMENT, "textarea"]).act(Act::Input("comment")));
            nodes.extend(field_error(browser));
            nodes.push(submit("Apply", Press::Apply));
            nodes
        }
        View::MyLeave => {
            let mut nodes = vec![heading("My Leave")];
            nodes.extend(leave_filters(browser, false));
            nodes.push(table(&browser.rows));
            nodes
        }
        View::LeaveList => {
            let mut nodes = vec![heading("Leave List")];
            nodes.extend(leave_filters(browser, true));
            nodes.push(table(&browser.rows));
            nodes
        }
        View::SystemUsers => {
            let mut nodes = vec![heading("System Users"), text_input(&[], "search_username")];
            nodes.extend(select(browser, "search_role", vec!["Admin".into(), "ESS".into()]));
            nodes.push(text_input(&[AUTOCOMPLETE_INPUT], "search_employee"));
            nodes.extend(select(browser, "search_status", user_statuses()));
            nodes.push(plain("Reset", Press::Reset));
            nodes.push(submit("Search", Press::Search));
            nodes.push(plain("Add", Press::Add));
            nodes.push(table(&browser.rows));
            nodes
        }
        View::AddUser | View::EditUser(_) => {
            let editing = matches!(browser.view, View::EditUser(_));
            let mut nodes = vec![heading(if editing { "Edit User" } else { "Add User" })];
            nodes.extend(select(browser, "user_role", vec!["Admin".into(), "ESS".into()]));
            if !editing {
                nodes.push(text_input(&[AUTOCOMPLETE_INPUT], "user_employee"));
                nodes.extend(autocomplete(browser, backend));
            }
            nodes.extend(select(browser, "user_status", user_statuses()));
            if !editing {
                nodes.push(text_input(&[admin::USERNAME_INPUT], "user_username"));
                nodes.push(text_input(&[admin::PASSWORD_INPUT], "user_password"));
                nodes.push(text_input(&[admin::PASSWORD_INPUT], "user_confirm"));
            }
            nodes.extend(field_error(browser));
            nodes.push(plain("Cancel", Press::Cancel));
            nodes.push(submit("Save", Press::Save));
            nodes
        }
        View::JobTitles => vec![heading("Job Titles"), plain("Add", Press::Add), table(&browser.rows)],
        View::AddJobTitle => {
            let mut nodes = vec![
                heading("Add Job Title"),
                text_input(&[], "title"),
                Node::new(&[admin::DESCRIPTION]).act(Act::Input("description")),
            ];
            nodes.extend(field_error(browser));
            nodes.push(plain("Cancel", Press::Cancel));
            nodes.push(submit("Save", Press::Save));
            nodes
        }
        View::Locations => vec![heading("Locations"), plain("Add", Press::Add), table(&browser.rows)],
        View::AddLocation => {
            let mut nodes = vec![
                heading("Add Location"),
                text_input(&[], "location_name"),
                text_input(&[], "city"),
            ];
            nodes.extend(select(
                browser,
                "country",
                COUNTRIES.iter().map(|c| c.to_string()).collect(),
            ));
            nodes.extend(field_error(browser));
            nodes.push(plain("Cancel", Press::Cancel));
            nodes.push(submit("Save", Press::Save));
            nodes
        }
        View::Forbidden => vec![Node::new(&[".orangehrm-error-message"]).text("Credential Required")],
        View::NotFound => vec![Node::new(&["p"]).text("Page Not Found")],
    }
}

fn user_statuses() -> Vec<String> {
    labels([UserStatus::Enabled, UserStatus::Disabled], UserStatus::label)
}

/// Suggestions for the employee name typed into the add-user form
fn autocomplete(browser: &Browser, backend: &Backend) -> Option<Node> {
    let typed = browser.form.get("user_employee")?.trim().to_lowercase();
    if typed.is_empty() {
        return None;
    }
    let matches: Vec<String> = backend
        .employees
        .iter()
        .filter(|e| e.matches_name(&typed))
        .map(|e| e.full_name())
        .collect();
    if matches.iter().any(|m| m.to_lowercase() == typed) {
        return None;
    }
    Some(Node::new(&[".oxd-autocomplete-dropdown"]).children(matches.into_iter().map(|name| {
        Node::new(&[admin::AUTOCOMPLETE_OPTION])
            .text(name.clone())
            .act(Act::Choose("user_employee", name))
    })))
}

fn dialog(dialog: &Dialog) -> Node {
    match dialog {
        Dialog::ConfirmDelete(_) => Node::new(&[leave::DIALOG])
            .child(Node::new(&["p"]).text("Are you Sure?"))
            .child(plain("No, Cancel", Press::CancelDelete))
            .child(
                Node::new(&[employee::CONFIRM_DELETE])
                    .text("Yes, Delete")
                    .press(Press::ConfirmDelete),
            ),
        Dialog::Review { approve, .. } => {
            let mut node = Node::new(&[leave::DIALOG]).child(Node::new(&["p"]).text(if *approve {
                "Approve leave request"
            } else {
                "Reject leave request"
            }));
            if !approve {
                node = node.child(
                    Node::new(&[leave::DIALOG_COMMENT, "textarea"]).act(Act::Input("dialog_comment")),
                );
            }
            node.child(
                Node::new(&[leave::DIALOG_CONFIRM])
                    .text("Ok")
                    .press(Press::DialogOk),
            )
        }
    }
}

/// Full tree of what the browser currently shows
pub(crate) fn render(browser: &Browser, backend: &Backend) -> Node {
    let mut root = Node::new(&[]);
    if let Some(account) = browser.account(backend) {
        if !matches!(browser.view, View::Login | View::ResetPassword) {
            root = root
                .child(side_panel(account.role))
                .child(top_bar(browser, &account.display_name));
            if browser.view.in_admin_module() {
                root = root.child(admin_nav(browser));
            }
        }
    }
    root = root.children(content(browser, backend));
    if let Some(d) = &browser.dialog {
        root = root.child(dialog(d));
    }
    if let Some(toast) = &browser.toast {
        root = root.child(Node::new(&[".oxd-toast"]).text(toast.clone()));
    }
    root
}
