//! Core domain types for the HRM harness

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Calendar format the application expects in date inputs and renders in tables
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Application role a credential authenticates as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Admin", alias = "admin")]
    Admin,
    #[serde(rename = "ESS", alias = "ess")]
    Ess,
    #[serde(rename = "Manager", alias = "manager")]
    Manager,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Ess, Role::Manager];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Ess => "ESS",
            Role::Manager => "Manager",
        }
    }

    /// Capability set for this role
    pub fn capabilities(&self) -> RoleCapabilities {
        RoleCapabilities::for_role(*self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "ess" => Ok(Role::Ess),
            "manager" => Ok(Role::Manager),
            _ => Err(Error::UnknownVariant { kind: "role", value: s.to_string() }),
        }
    }
}

/// Navigable application module used for access-control assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    Admin,
    Leave,
    PersonalInfo,
}

impl Module {
    pub const ALL: [Module; 3] = [Module::Admin, Module::Leave, Module::PersonalInfo];

    pub fn label(&self) -> &'static str {
        match self {
            Module::Admin => "Admin",
            Module::Leave => "Leave",
            Module::PersonalInfo => "My Info",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which modules a role must see and which it must never see.
///
/// Modules in neither set are not asserted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleCapabilities {
    pub role: Role,
    pub granted: BTreeSet<Module>,
    pub denied: BTreeSet<Module>,
}

impl RoleCapabilities {
    pub fn for_role(role: Role) -> Self {
        let (granted, denied): (&[Module], &[Module]) = match role {
            Role::Admin => (&[Module::Admin, Module::Leave, Module::PersonalInfo], &[]),
            Role::Manager => (&[Module::Leave, Module::PersonalInfo], &[]),
            Role::Ess => (&[Module::PersonalInfo], &[Module::Admin]),
        };
        Self {
            role,
            granted: granted.iter().copied().collect(),
            denied: denied.iter().copied().collect(),
        }
    }

    pub fn grants(&self, module: Module) -> bool {
        self.granted.contains(&module)
    }

    pub fn denies(&self, module: Module) -> bool {
        self.denied.contains(&module)
    }
}

/// Login credential issued to a scenario actor
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    identity: String,
    secret: String,
    role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
}

impl Credential {
    pub fn new(identity: impl Into<String>, secret: impl Into<String>, role: Role) -> Self {
        Self {
            identity: identity.into(),
            secret: secret.into(),
            role,
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .field("role", &self.role)
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// Employee record as entered through the PIM screens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    /// Digits only; the application assigns one when absent
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub photo: Option<PathBuf>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub login: Option<Credential>,
}

impl Employee {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            middle_name: None,
            last_name: last_name.into(),
            employee_id: None,
            photo: None,
            job_title: None,
            department: None,
            location: None,
            login: None,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn validate(&self) -> Result<()> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(Error::InvalidEmployee("first and last name are required".to_string()));
        }
        if let Some(id) = &self.employee_id {
            if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
                return Err(Error::InvalidEmployee(format!("employee id must be numeric, got '{}'", id)));
            }
        }
        Ok(())
    }
}

/// Leave types configured in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    Vacation,
    Sick,
    Personal,
    Bereavement,
}

impl LeaveType {
    pub const ALL: [LeaveType; 4] = [
        LeaveType::Vacation,
        LeaveType::Sick,
        LeaveType::Personal,
        LeaveType::Bereavement,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            LeaveType::Vacation => "Vacation Leave",
            LeaveType::Sick => "Sick Leave",
            LeaveType::Personal => "Personal Leave",
            LeaveType::Bereavement => "Bereavement Leave",
        }
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LeaveType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        LeaveType::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownVariant { kind: "leave type", value: s.to_string() })
    }
}

/// Partial-day qualifier on a multi-day request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialDays {
    AllDays,
    StartDayOnly,
    EndDayOnly,
    StartAndEndDay,
}

impl PartialDays {
    pub const ALL: [PartialDays; 4] = [
        PartialDays::AllDays,
        PartialDays::StartDayOnly,
        PartialDays::EndDayOnly,
        PartialDays::StartAndEndDay,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PartialDays::AllDays => "All Days",
            PartialDays::StartDayOnly => "Start Day Only",
            PartialDays::EndDayOnly => "End Day Only",
            PartialDays::StartAndEndDay => "Start and End Day",
        }
    }
}

/// A leave application as an ESS actor fills it in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub leave_type: LeaveType,
    pub from: NaiveDate,
    pub to: NaiveDate,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub partial_days: Option<PartialDays>,
}

impl LeaveRequest {
    pub fn new(leave_type: LeaveType, from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            leave_type,
            from,
            to,
            comment: None,
            partial_days: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_partial_days(mut self, partial: PartialDays) -> Self {
        self.partial_days = Some(partial);
        self
    }

    pub fn from_date(&self) -> String {
        self.from.format(DATE_FORMAT).to_string()
    }

    pub fn to_date(&self) -> String {
        self.to.format(DATE_FORMAT).to_string()
    }

    /// Inclusive number of calendar days covered
    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    pub fn validate(&self) -> Result<()> {
        if self.from > self.to {
            return Err(Error::InvalidDateRange {
                from: self.from_date(),
                to: self.to_date(),
            });
        }
        Ok(())
    }
}

/// Status text shown in the leave tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    PendingApproval,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    pub fn label(&self) -> &'static str {
        match self {
            LeaveStatus::PendingApproval => "Pending Approval",
            LeaveStatus::Approved => "Approved",
            LeaveStatus::Rejected => "Rejected",
            LeaveStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for LeaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LeaveStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending approval" => Ok(LeaveStatus::PendingApproval),
            // approved leave is listed as scheduled until taken
            "approved" | "scheduled" | "taken" => Ok(LeaveStatus::Approved),
            "rejected" => Ok(LeaveStatus::Rejected),
            "cancelled" => Ok(LeaveStatus::Cancelled),
            _ => Err(Error::UnknownVariant { kind: "leave status", value: s.to_string() }),
        }
    }
}

/// Enabled/disabled flag on system user accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Enabled,
    Disabled,
}

impl UserStatus {
    pub fn label(&self) -> &'static str {
        match self {
            UserStatus::Enabled => "Enabled",
            UserStatus::Disabled => "Disabled",
        }
    }
}

/// System user account as created from the Admin module.
///
/// The application only knows the Admin and ESS user roles; supervisors get
/// their Manager powers from the reporting structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemUser {
    pub role: Role,
    pub employee_name: String,
    pub status: UserStatus,
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_and_display() {
        assert_eq!("ess".parse::<Role>().unwrap(), Role::Ess);
        assert_eq!("Manager".parse::<Role>().unwrap(), Role::Manager);
        assert_eq!(Role::Ess.to_string(), "ESS");
        assert!("supervisor".parse::<Role>().is_err());
    }

    #[test]
    fn test_capabilities_table() {
        let ess = Role::Ess.capabilities();
        assert!(ess.denies(Module::Admin));
        assert!(!ess.grants(Module::Leave));

        let manager = Role::Manager.capabilities();
        assert!(manager.grants(Module::Leave));

        let admin = Role::Admin.capabilities();
        assert!(admin.grants(Module::Admin) && admin.grants(Module::Leave));
        assert!(admin.denied.is_empty());
    }

    #[test]
    fn test_credential_debug_redacts_secret() {
        let cred = Credential::new("Admin", "admin123", Role::Admin);
        let rendered = format!("{:?}", cred);
        assert!(rendered.contains("Admin"));
        assert!(!rendered.contains("admin123"));
    }

    #[test]
    fn test_employee_validation() {
        assert!(Employee::new("Test", "Employee").validate().is_ok());
        assert!(Employee::new("", "Employee").validate().is_err());

        let mut emp = Employee::new("Test", "Employee");
        emp.employee_id = Some("12a".to_string());
        assert!(emp.validate().is_err());
        emp.employee_id = Some("0042".to_string());
        assert!(emp.validate().is_ok());
    }

    #[test]
    fn test_leave_request_date_order() {
        let d = |s: &str| NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap();
        let ok = LeaveRequest::new(LeaveType::Sick, d("2024-12-01"), d("2024-12-03"));
        assert!(ok.validate().is_ok());
        assert_eq!(ok.days(), 3);
        assert_eq!(ok.from_date(), "2024-12-01");

        let single = LeaveRequest::new(LeaveType::Personal, d("2024-12-05"), d("2024-12-05"));
        assert!(single.validate().is_ok());

        let reversed = LeaveRequest::new(LeaveType::Sick, d("2024-12-03"), d("2024-12-01"));
        assert!(matches!(reversed.validate(), Err(Error::InvalidDateRange { .. })));
    }

    #[test]
    fn test_leave_status_labels() {
        assert_eq!("Pending Approval".parse::<LeaveStatus>().unwrap(), LeaveStatus::PendingApproval);
        assert_eq!("Scheduled".parse::<LeaveStatus>().unwrap(), LeaveStatus::Approved);
        assert_eq!(" rejected ".parse::<LeaveStatus>().unwrap(), LeaveStatus::Rejected);
        assert!("Unknown".parse::<LeaveStatus>().is_err());
        assert_eq!("vacation leave".parse::<LeaveType>().unwrap(), LeaveType::Vacation);
    }
}
