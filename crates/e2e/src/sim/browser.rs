//! Per-context browser state and what user interactions do to it

use chrono::NaiveDate;
use hrm_common::{LeaveStatus, LeaveType, Role, UserStatus, DATE_FORMAT};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use super::backend::{status_cell, Account, Backend, LeaveRecord, Location};
use super::dom::{Act, Press, Target};
use super::view::{route, View, LOGOUT_PATH};
use super::SimOptions;
use crate::error::{E2eError, E2eResult};
use crate::pages::{admin, employee, leave};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Dialog {
    ConfirmDelete(Target),
    Review { leave: u64, approve: bool },
}

/// One table row as loaded; the last cell holds the row actions
#[derive(Debug, Clone)]
pub(crate) struct Row {
    pub cells: Vec<String>,
    pub actions: Vec<(&'static str, Press)>,
}

#[derive(Debug)]
pub(crate) struct Browser {
    pub view: View,
    pub user: Option<String>,
    pub form: HashMap<&'static str, String>,
    pub open_dropdown: Option<&'static str>,
    pub top_menu: Option<&'static str>,
    pub user_menu: bool,
    pub dialog: Option<Dialog>,
    pub alert: Option<String>,
    pub field_error: Option<String>,
    pub toast: Option<String>,
    pub create_login: bool,
    pub photo: bool,
    pub calendar: bool,
    pub rows: Vec<Row>,
}

impl Browser {
    pub fn new() -> Self {
        Self {
            view: View::Login,
            user: None,
            form: HashMap::new(),
            open_dropdown: None,
            top_menu: None,
            user_menu: false,
            dialog: None,
            alert: None,
            field_error: None,
            toast: None,
            create_login: false,
            photo: false,
            calendar: false,
            rows: Vec::new(),
        }
    }

    pub fn account<'b>(&self, backend: &'b Backend) -> Option<&'b Account> {
        self.user.as_deref().and_then(|u| backend.account(u))
    }

    fn value(&self, field: &str) -> Option<&str> {
        self.form
            .get(field)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn date(&self, field: &str) -> Option<NaiveDate> {
        self.value(field)
            .and_then(|v| NaiveDate::parse_from_str(v, DATE_FORMAT).ok())
    }

    pub fn navigate(&mut self, path: &str, backend: &mut Backend) {
        if path.starts_with(LOGOUT_PATH) {
            self.user = None;
            self.enter(View::Login, backend);
            return;
        }
        let signed_in = self.account(backend).map(|a| (a.role, a.emp_number));
        let view = route(path, signed_in);
        self.enter(view, backend);
    }

    /// Load a screen from scratch
    pub fn enter(&mut self, view: View, backend: &mut Backend) {
        debug!("sim: entering {:?}", view);
        self.view = view;
        self.form.clear();
        self.open_dropdown = None;
        self.top_menu = None;
        self.user_menu = false;
        self.dialog = None;
        self.alert = None;
        self.field_error = None;
        self.toast = None;
        self.create_login = false;
        self.photo = false;
        self.calendar = false;

        if let View::JobDetails(n) = self.view {
            if let Some(emp) = backend.employee(n) {
                for (field, value) in [
                    ("job_title", emp.job_title.clone()),
                    ("department", emp.department.clone()),
                    ("location", emp.location.clone()),
                ] {
                    if let Some(value) = value {
                        self.form.insert(field, value);
                    }
                }
            }
        }
        self.load_rows(backend);
    }

    pub fn fill(&mut self, act: &Act, value: &str) -> E2eResult<()> {
        match act {
            Act::Input(field) => {
                if matches!(*field, "from" | "to" | "filter_from" | "filter_to") {
                    self.calendar = true;
                }
                self.form.insert(*field, value.to_string());
                Ok(())
            }
            _ => Err(E2eError::Playwright(
                "Element is not an <input>, <textarea> or [contenteditable] element".to_string(),
            )),
        }
    }

    pub fn set_input_files(&mut self, act: &Act, file: &Path) -> E2eResult<()> {
        if *act != Act::File {
            return Err(E2eError::Playwright("Node is not an HTMLInputElement".to_string()));
        }
        if !file.exists() {
            return Err(E2eError::Playwright(format!(
                "ENOENT: no such file or directory, stat '{}'",
                file.display()
            )));
        }
        self.photo = true;
        Ok(())
    }

    pub fn click(&mut self, act: &Act, backend: &mut Backend, options: &SimOptions) {
        match act {
            Act::None | Act::File => {}
            Act::Input(field) => {
                if matches!(*field, "from" | "to" | "filter_from" | "filter_to") {
                    self.calendar = true;
                }
            }
            Act::Dropdown(field) => {
                self.open_dropdown = if self.open_dropdown == Some(*field) {
                    None
                } else {
                    Some(*field)
                };
            }
            Act::Choose(field, value) => {
                self.form.insert(*field, value.clone());
                self.open_dropdown = None;
            }
            Act::Press(press) => self.press(press.clone(), backend, options),
        }
    }

    fn press(&mut self, press: Press, backend: &mut Backend, options: &SimOptions) {
        match press {
            Press::Login => self.login(backend),
            Press::ForgotPassword => self.enter(View::ResetPassword, backend),
            Press::UserMenu => self.user_menu = !self.user_menu,
            Press::Logout => {
                self.user = None;
                self.enter(View::Login, backend);
            }
            Press::Goto(path) => self.navigate(path, backend),
            Press::TopMenu(label) => {
                self.top_menu = if self.top_menu == Some(label) { None } else { Some(label) };
            }
            Press::Search => self.load_rows(backend),
            Press::Reset => {
                self.form.clear();
                self.load_rows(backend);
            }
            Press::Add => {
                let next = match self.view {
                    View::EmployeeList => Some(View::AddEmployee),
                    View::SystemUsers => Some(View::AddUser),
                    View::JobTitles => Some(View::AddJobTitle),
                    View::Locations => Some(View::AddLocation),
                    _ => None,
                };
                if let Some(next) = next {
                    self.enter(next, backend);
                }
            }
            Press::Cancel => {
                let back = match self.view {
                    View::AddEmployee => View::EmployeeList,
                    View::AddUser | View::EditUser(_) => View::SystemUsers,
                    View::AddJobTitle => View::JobTitles,
                    View::AddLocation => View::Locations,
                    _ => View::Login,
                };
                self.enter(back, backend);
            }
            Press::Save => self.save(backend),
            Press::Apply => self.apply_leave(backend),
            Press::CreateLogin => self.create_login = !self.create_login,
            Press::JobTab => {
                if let View::PersonalDetails(n) | View::JobDetails(n) = self.view {
                    self.enter(View::JobDetails(n), backend);
                }
            }
            Press::Edit(Target::Employee(n)) => self.enter(View::PersonalDetails(n), backend),
            Press::Edit(Target::User(u)) => self.enter(View::EditUser(u), backend),
            Press::Delete(target) => self.dialog = Some(Dialog::ConfirmDelete(target)),
            Press::ConfirmDelete => {
                if let Some(Dialog::ConfirmDelete(target)) = self.dialog.take() {
                    self.delete(target, backend);
                    self.load_rows(backend);
                }
            }
            Press::CancelDelete => self.dialog = None,
            Press::Approve(id) => self.review(id, true, backend, options),
            Press::Reject(id) => self.review(id, false, backend, options),
            Press::DialogOk => {
                if let Some(Dialog::Review { leave, approve }) = self.dialog.take() {
                    self.decide(leave, approve, backend, options);
                }
            }
        }
    }

    fn login(&mut self, backend: &mut Backend) {
        let username = self.value("username").map(str::to_string);
        let password = self.value("password").map(str::to_string);
        let (Some(username), Some(password)) = (username, password) else {
            self.alert = None;
            self.field_error = Some("Required".to_string());
            return;
        };
        match backend.authenticate(&username, &password).map(|a| a.username.clone()) {
            Some(username) => {
                self.user = Some(username);
                self.enter(View::Dashboard, backend);
            }
            None => {
                self.field_error = None;
                self.alert = Some("Invalid credentials".to_string());
            }
        }
    }

    fn delete(&mut self, target: Target, backend: &mut Backend) {
        match target {
            Target::Employee(n) => backend.remove_employee(n),
            Target::User(username) => {
                if self.user.as_deref() == Some(username.as_str()) {
                    self.toast = Some("Cannot be deleted".to_string());
                } else {
                    backend.accounts.retain(|a| a.username != username);
                }
            }
        }
    }

    fn review(&mut self, id: u64, approve: bool, backend: &mut Backend, options: &SimOptions) {
        if options.review_dialog {
            self.dialog = Some(Dialog::Review { leave: id, approve });
        } else {
            self.decide(id, approve, backend, options);
        }
    }

    fn decide(&mut self, id: u64, approve: bool, backend: &mut Backend, options: &SimOptions) {
        if let Some(record) = backend.leave_mut(id) {
            if record.status == LeaveStatus::PendingApproval {
                record.status = if approve {
                    LeaveStatus::Approved
                } else {
                    LeaveStatus::Rejected
                };
                record.stale_reads = options.approval_propagation;
                debug!("sim: leave {} -> {}", id, record.status);
            }
        }
        self.toast = Some("Successfully Updated".to_string());
        self.load_rows(backend);
    }

    fn apply_leave(&mut self, backend: &mut Backend) {
        let Some(account) = self.account(backend).cloned() else {
            return;
        };
        let leave_type = self.value("leave_type").and_then(|v| v.parse::<LeaveType>().ok());
        let (Some(leave_type), Some(from), Some(to)) = (leave_type, self.date("from"), self.date("to")) else {
            self.field_error = Some("Required".to_string());
            return;
        };
        if from > to {
            self.field_error = Some("To date should be after from date".to_string());
            return;
        }

        backend.add_leave(LeaveRecord {
            id: 0,
            owner: account.username.clone(),
            owner_name: account.display_name.clone(),
            leave_type,
            from,
            to,
            partial_days: self.value("partial").map(str::to_string),
            comment: self.value("comment").map(str::to_string),
            status: LeaveStatus::PendingApproval,
            stale_reads: 0,
        });
        self.enter(View::ApplyLeave, backend);
        self.toast = Some("Successfully Submitted".to_string());
    }

    fn save(&mut self, backend: &mut Backend) {
        match self.view.clone() {
            View::AddEmployee => self.save_employee(backend),
            View::PersonalDetails(n) => {
                let first = self.value("first").map(str::to_string);
                let last = self.value("last").map(str::to_string);
                if let Some(emp) = backend.employee_mut(n) {
                    if let Some(first) = first {
                        emp.first_name = first;
                    }
                    if let Some(last) = last {
                        emp.last_name = last;
                    }
                }
                self.toast = Some("Successfully Updated".to_string());
            }
            View::JobDetails(n) => {
                let job_title = self.value("job_title").map(str::to_string);
                let department = self.value("department").map(str::to_string);
                let location = self.value("location").map(str::to_string);
                if let Some(emp) = backend.employee_mut(n) {
                    emp.job_title = job_title;
                    emp.department = department;
                    emp.location = location;
                }
                self.toast = Some("Successfully Updated".to_string());
            }
            View::AddUser => self.save_user(backend),
            View::EditUser(username) => {
                let role = self.value("user_role").and_then(parse_user_role);
                let status = self.value("user_status").and_then(parse_user_status);
                if let Some(account) = backend.accounts.iter_mut().find(|a| a.username == username) {
                    if let Some(role) = role {
                        account.role = role;
                    }
                    if let Some(status) = status {
                        account.status = status;
                    }
                }
                self.enter(View::SystemUsers, backend);
            }
            View::AddJobTitle => {
                let Some(title) = self.value("title").map(str::to_string) else {
                    self.field_error = Some("Required".to_string());
                    return;
                };
                if backend.job_titles.iter().any(|(t, _)| *t == title) {
                    self.field_error = Some("Already exists".to_string());
                    return;
                }
                let description = self.value("description").map(str::to_string);
                backend.job_titles.push((title, description));
                self.enter(View::JobTitles, backend);
            }
            View::AddLocation => {
                let name = self.value("location_name").map(str::to_string);
                let country = self.value("country").map(str::to_string);
                let (Some(name), Some(country)) = (name, country) else {
                    self.field_error = Some("Required".to_string());
                    return;
                };
                let location = Location {
                    name,
                    city: self.value("city").unwrap_or_default().to_string(),
                    country,
                };
                backend.locations.push(location);
                self.enter(View::Locations, backend);
            }
            _ => {}
        }
    }

    fn save_employee(&mut self, backend: &mut Backend) {
        let first = self.value("first").map(str::to_string);
        let last = self.value("last").map(str::to_string);
        let (Some(first), Some(last)) = (first, last) else {
            self.field_error = Some("Required".to_string());
            return;
        };
        let middle = self.value("middle").map(str::to_string);
        let employee_id = self.value("employee_id").map(str::to_string);
        if let Some(id) = &employee_id {
            if backend.employee_id_taken(id) {
                self.field_error = Some("Employee Id already exists".to_string());
                return;
            }
        }

        let login = if self.create_login {
            let username = self.value("login_username").map(str::to_string);
            let password = self.value("login_password").map(str::to_string);
            let confirm = self.value("login_confirm").map(str::to_string);
            match (username, password) {
                (Some(u), Some(p)) if Some(&p) == confirm.as_ref() && backend.account(&u).is_none() => {
                    Some((u, p))
                }
                _ => {
                    self.field_error = Some("Invalid login details".to_string());
                    return;
                }
            }
        } else {
            None
        };

        let emp_number = backend.add_employee(&first, middle, &last, employee_id);
        if let Some(emp) = backend.employee_mut(emp_number) {
            emp.has_photo = self.photo;
        }
        if let Some((username, password)) = login {
            backend.accounts.push(Account {
                username,
                password,
                role: Role::Ess,
                display_name: format!("{} {}", first, last),
                emp_number: Some(emp_number),
                status: UserStatus::Enabled,
            });
        }
        self.enter(View::PersonalDetails(emp_number), backend);
        self.toast = Some("Successfully Saved".to_string());
    }

    fn save_user(&mut self, backend: &mut Backend) {
        let role = self.value("user_role").and_then(parse_user_role);
        let status = self.value("user_status").and_then(parse_user_status);
        let employee = self.value("user_employee").and_then(|name| {
            backend
                .employees
                .iter()
                .find(|e| e.full_name().eq_ignore_ascii_case(name))
                .map(|e| (e.emp_number, e.full_name()))
        });
        let username = self.value("user_username").map(str::to_string);
        let password = self.value("user_password").map(str::to_string);
        let confirm = self.value("user_confirm").map(str::to_string);

        let (Some(role), Some(status), Some((emp_number, display_name)), Some(username), Some(password)) =
            (role, status, employee, username, password)
        else {
            self.field_error = Some("Invalid".to_string());
            return;
        };
        if Some(&password) != confirm.as_ref() {
            self.field_error = Some("Passwords do not match".to_string());
            return;
        }
        if backend.account(&username).is_some() {
            self.field_error = Some("Already exists".to_string());
            return;
        }

        backend.accounts.push(Account {
            username,
            password,
            role,
            display_name,
            emp_number: Some(emp_number),
            status,
        });
        self.enter(View::SystemUsers, backend);
        self.toast = Some("Successfully Saved".to_string());
    }

    /// Re-read the current screen's table from the backend
    pub fn load_rows(&mut self, backend: &mut Backend) {
        self.rows = match self.view {
            View::EmployeeList => self.employee_rows(backend),
            View::MyLeave => self.my_leave_rows(backend),
            View::LeaveList => self.leave_list_rows(backend),
            View::SystemUsers => self.user_rows(backend),
            View::JobTitles => backend
                .job_titles
                .iter()
                .map(|(title, description)| Row {
                    cells: vec![title.clone(), description.clone().unwrap_or_default()],
                    actions: Vec::new(),
                })
                .collect(),
            View::Locations => backend
                .locations
                .iter()
                .map(|l| Row {
                    cells: vec![l.name.clone(), l.city.clone(), l.country.clone()],
                    actions: Vec::new(),
                })
                .collect(),
            _ => Vec::new(),
        };
    }

    fn employee_rows(&self, backend: &Backend) -> Vec<Row> {
        let name = self.value("emp_name").unwrap_or_default();
        let id = self.value("emp_id").unwrap_or_default();
        backend
            .employees
            .iter()
            .filter(|e| e.matches_name(name) && e.employee_id.contains(id))
            .map(|e| Row {
                cells: vec![
                    e.employee_id.clone(),
                    match &e.middle_name {
                        Some(m) => format!("{} {}", e.first_name, m),
                        None => e.first_name.clone(),
                    },
                    e.last_name.clone(),
                    e.job_title.clone().unwrap_or_default(),
                    "Full-Time Permanent".to_string(),
                    e.department.clone().unwrap_or_default(),
                    String::new(),
                ],
                actions: vec![
                    (employee::EDIT_ICON, Press::Edit(Target::Employee(e.emp_number))),
                    (employee::DELETE_ICON, Press::Delete(Target::Employee(e.emp_number))),
                ],
            })
            .collect()
    }

    fn leave_filters(&self) -> (Option<LeaveType>, Option<LeaveStatus>, Option<NaiveDate>, Option<NaiveDate>) {
        (
            self.value("filter_type").and_then(|v| v.parse().ok()),
            self.value("filter_status").and_then(|v| v.parse().ok()),
            self.date("filter_from"),
            self.date("filter_to"),
        )
    }

    fn leave_row(record: &LeaveRecord, shown: LeaveStatus, actions: bool) -> Row {
        let actions = if actions && shown == LeaveStatus::PendingApproval {
            vec![
                (leave::APPROVE_ICON, Press::Approve(record.id)),
                (leave::REJECT_ICON, Press::Reject(record.id)),
            ]
        } else {
            Vec::new()
        };
        Row {
            cells: vec![
                record.date_label(),
                record.owner_name.clone(),
                record.leave_type.label().to_string(),
                "12.00".to_string(),
                format!("{}.00", record.days()),
                status_cell(shown, record.days()),
                record.comment.clone().unwrap_or_default(),
            ],
            actions,
        }
    }

    /// The owner's own list; decisions still propagating read as pending
    fn my_leave_rows(&self, backend: &mut Backend) -> Vec<Row> {
        let Some(user) = self.user.clone() else {
            return Vec::new();
        };
        let (leave_type, status, from, to) = self.leave_filters();
        let mut rows = Vec::new();
        let mut leaves: Vec<&mut LeaveRecord> = backend
            .leaves
            .iter_mut()
            .filter(|l| l.owner == user)
            .filter(|l| leave_type.map_or(true, |t| l.leave_type == t) && l.overlaps(from, to))
            .collect();
        leaves.sort_by_key(|l| (l.from, l.id));
        for record in leaves {
            let shown = if record.stale_reads > 0 {
                record.stale_reads -= 1;
                LeaveStatus::PendingApproval
            } else {
                record.status
            };
            if status.map_or(true, |s| s == shown) {
                rows.push(Self::leave_row(record, shown, false));
            }
        }
        rows
    }

    /// Everyone's requests for admins; other people's for managers
    fn leave_list_rows(&self, backend: &Backend) -> Vec<Row> {
        let Some(account) = self.account(backend) else {
            return Vec::new();
        };
        let (leave_type, status, from, to) = self.leave_filters();
        let employee = self.value("filter_employee").map(str::to_lowercase);
        let mut leaves: Vec<&LeaveRecord> = backend
            .leaves
            .iter()
            .filter(|l| account.role == Role::Admin || l.owner != account.username)
            .filter(|l| leave_type.map_or(true, |t| l.leave_type == t))
            .filter(|l| status.map_or(true, |s| l.status == s))
            .filter(|l| l.overlaps(from, to))
            .filter(|l| {
                employee
                    .as_deref()
                    .map_or(true, |e| l.owner_name.to_lowercase().contains(e))
            })
            .collect();
        leaves.sort_by_key(|l| (l.from, l.id));
        leaves
            .into_iter()
            .map(|l| Self::leave_row(l, l.status, true))
            .collect()
    }

    fn user_rows(&self, backend: &Backend) -> Vec<Row> {
        let username = self.value("search_username").map(str::to_lowercase);
        let role = self.value("search_role");
        let employee = self.value("search_employee").map(str::to_lowercase);
        let status = self.value("search_status").and_then(parse_user_status);
        backend
            .accounts
            .iter()
            .filter(|a| username.as_deref().map_or(true, |u| a.username.to_lowercase() == u))
            .filter(|a| role.map_or(true, |r| a.user_role_label().eq_ignore_ascii_case(r)))
            .filter(|a| {
                employee
                    .as_deref()
                    .map_or(true, |e| a.display_name.to_lowercase().contains(e))
            })
            .filter(|a| status.map_or(true, |s| a.status == s))
            .map(|a| Row {
                cells: vec![
                    a.username.clone(),
                    a.user_role_label().to_string(),
                    a.display_name.clone(),
                    a.status.label().to_string(),
                ],
                actions: vec![
                    (admin::EDIT_ICON, Press::Edit(Target::User(a.username.clone()))),
                    (admin::DELETE_ICON, Press::Delete(Target::User(a.username.clone()))),
                ],
            })
            .collect()
    }
}

fn parse_user_role(label: &str) -> Option<Role> {
    match label {
        "Admin" => Some(Role::Admin),
        "ESS" => Some(Role::Ess),
        _ => None,
    }
}

fn parse_user_status(label: &str) -> Option<UserStatus> {
    match label {
        "Enabled" => Some(UserStatus::Enabled),
        "Disabled" => Some(UserStatus::Disabled),
        _ => None,
    }
}
