//! Screens of the simulated application and the routes leading to them

use hrm_common::Role;

use crate::pages::{employee, leave, PageKind};

pub(crate) const LOGOUT_PATH: &str = "/web/index.php/auth/logout";
pub(crate) const RESET_PASSWORD_PATH: &str = "/web/index.php/auth/requestPasswordResetCode";
pub(crate) const PIM_MODULE_PATH: &str = "/web/index.php/pim/viewPimModule";
pub(crate) const MY_DETAILS_PATH: &str = "/web/index.php/pim/viewMyDetails";
const SYSTEM_USERS_PATH: &str = "/web/index.php/admin/viewSystemUsers";
const ADD_USER_PATH: &str = "/web/index.php/admin/saveSystemUser";
const JOB_TITLES_PATH: &str = "/web/index.php/admin/viewJobTitleList";
const ADD_JOB_TITLE_PATH: &str = "/web/index.php/admin/saveJobTitle";
const LOCATIONS_PATH: &str = "/web/index.php/admin/viewLocations";
const ADD_LOCATION_PATH: &str = "/web/index.php/admin/saveLocation";
const PERSONAL_DETAILS_PREFIX: &str = "/web/index.php/pim/viewPersonalDetails/empNumber/";
const JOB_DETAILS_PREFIX: &str = "/web/index.php/pim/viewJobDetails/empNumber/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum View {
    Login,
    ResetPassword,
    Dashboard,
    EmployeeList,
    AddEmployee,
    PersonalDetails(u64),
    JobDetails(u64),
    ApplyLeave,
    MyLeave,
    LeaveList,
    SystemUsers,
    AddUser,
    EditUser(String),
    JobTitles,
    AddJobTitle,
    Locations,
    AddLocation,
    Forbidden,
    NotFound,
}

impl View {
    pub fn path(&self) -> String {
        match self {
            View::Login => PageKind::Login.path().to_string(),
            View::ResetPassword => RESET_PASSWORD_PATH.to_string(),
            View::Dashboard => PageKind::Dashboard.path().to_string(),
            View::EmployeeList => PageKind::Employee.path().to_string(),
            View::AddEmployee => employee::ADD_EMPLOYEE_PATH.to_string(),
            View::PersonalDetails(n) => format!("{}{}", PERSONAL_DETAILS_PREFIX, n),
            View::JobDetails(n) => format!("{}{}", JOB_DETAILS_PREFIX, n),
            View::ApplyLeave => leave::APPLY_LEAVE_PATH.to_string(),
            View::MyLeave => leave::MY_LEAVE_PATH.to_string(),
            View::LeaveList => leave::LEAVE_LIST_PATH.to_string(),
            View::SystemUsers => SYSTEM_USERS_PATH.to_string(),
            View::AddUser => ADD_USER_PATH.to_string(),
            View::EditUser(_) => ADD_USER_PATH.to_string(),
            View::JobTitles => JOB_TITLES_PATH.to_string(),
            View::AddJobTitle => ADD_JOB_TITLE_PATH.to_string(),
            View::Locations => LOCATIONS_PATH.to_string(),
            View::AddLocation => ADD_LOCATION_PATH.to_string(),
            View::Forbidden | View::NotFound => "/web/index.php/core/noAccess".to_string(),
        }
    }

    /// Module name shown in the top bar
    pub fn breadcrumb(&self) -> Option<&'static str> {
        match self {
            View::Dashboard => Some("Dashboard"),
            View::EmployeeList | View::AddEmployee | View::PersonalDetails(_) | View::JobDetails(_) => {
                Some("PIM")
            }
            View::ApplyLeave | View::MyLeave | View::LeaveList => Some("Leave"),
            View::SystemUsers
            | View::AddUser
            | View::EditUser(_)
            | View::JobTitles
            | View::AddJobTitle
            | View::Locations
            | View::AddLocation => Some("Admin"),
            View::Login | View::ResetPassword | View::Forbidden | View::NotFound => None,
        }
    }

    /// Screens of the Admin module carry its top navigation
    pub fn in_admin_module(&self) -> bool {
        self.breadcrumb() == Some("Admin")
    }

    fn permitted(&self, role: Role, own_emp: Option<u64>) -> bool {
        match self {
            View::EmployeeList
            | View::AddEmployee
            | View::SystemUsers
            | View::AddUser
            | View::EditUser(_)
            | View::JobTitles
            | View::AddJobTitle
            | View::Locations
            | View::AddLocation => role == Role::Admin,
            View::PersonalDetails(n) | View::JobDetails(n) => role == Role::Admin || own_emp == Some(*n),
            View::LeaveList => matches!(role, Role::Admin | Role::Manager),
            _ => true,
        }
    }
}

/// Resolve a path for the signed-in role; anonymous visitors land on the
/// login screen
pub(crate) fn route(path: &str, signed_in: Option<(Role, Option<u64>)>) -> View {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let path = path.trim_end_matches('/');

    let Some((role, own_emp)) = signed_in else {
        return match path {
            RESET_PASSWORD_PATH => View::ResetPassword,
            _ => View::Login,
        };
    };

    let view = match path {
        "" | "/web/index.php" => View::Dashboard,
        p if p == PageKind::Login.path() || p == PageKind::Dashboard.path() => View::Dashboard,
        RESET_PASSWORD_PATH => View::ResetPassword,
        PIM_MODULE_PATH => View::EmployeeList,
        p if p == PageKind::Employee.path() => View::EmployeeList,
        employee::ADD_EMPLOYEE_PATH => View::AddEmployee,
        MY_DETAILS_PATH => match own_emp {
            Some(n) => View::PersonalDetails(n),
            None => View::NotFound,
        },
        p if p == PageKind::Leave.path() => match role {
            Role::Ess => View::MyLeave,
            Role::Admin | Role::Manager => View::LeaveList,
        },
        leave::APPLY_LEAVE_PATH => View::ApplyLeave,
        leave::MY_LEAVE_PATH => View::MyLeave,
        leave::LEAVE_LIST_PATH => View::LeaveList,
        SYSTEM_USERS_PATH => View::SystemUsers,
        p if p == PageKind::Admin.path() => View::SystemUsers,
        ADD_USER_PATH => View::AddUser,
        JOB_TITLES_PATH => View::JobTitles,
        ADD_JOB_TITLE_PATH => View::AddJobTitle,
        LOCATIONS_PATH => View::Locations,
        ADD_LOCATION_PATH => View::AddLocation,
        other => {
            if let Some(n) = other.strip_prefix(PERSONAL_DETAILS_PREFIX).and_then(|n| n.parse().ok()) {
                View::PersonalDetails(n)
            } else if let Some(n) = other.strip_prefix(JOB_DETAILS_PREFIX).and_then(|n| n.parse().ok()) {
                View::JobDetails(n)
            } else {
                View::NotFound
            }
        }
    };

    if view.permitted(role, own_emp) {
        view
    } else {
        View::Forbidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_visitors_see_login() {
        assert_eq!(route(PageKind::Admin.path(), None), View::Login);
        assert_eq!(route(RESET_PASSWORD_PATH, None), View::ResetPassword);
    }

    #[test]
    fn test_admin_module_is_forbidden_for_ess() {
        assert_eq!(route(PageKind::Admin.path(), Some((Role::Ess, Some(4)))), View::Forbidden);
        assert_eq!(route(PageKind::Admin.path(), Some((Role::Admin, None))), View::SystemUsers);
    }

    #[test]
    fn test_leave_module_lands_per_role() {
        assert_eq!(route(PageKind::Leave.path(), Some((Role::Ess, None))), View::MyLeave);
        assert_eq!(route(PageKind::Leave.path(), Some((Role::Manager, None))), View::LeaveList);
        assert_eq!(route(leave::LEAVE_LIST_PATH, Some((Role::Ess, None))), View::Forbidden);
    }

    #[test]
    fn test_details_routes() {
        let path = View::PersonalDetails(7).path();
        assert_eq!(route(&path, Some((Role::Admin, None))), View::PersonalDetails(7));
        assert_eq!(route(&path, Some((Role::Ess, Some(3)))), View::Forbidden);
        assert_eq!(route(MY_DETAILS_PATH, Some((Role::Ess, Some(3)))), View::PersonalDetails(3));
    }
}
