//! Server-side records shared by every browser context of a simulated app

use chrono::NaiveDate;
use hrm_common::{Credential, LeaveStatus, LeaveType, Role, UserStatus, DATE_FORMAT};

#[derive(Debug, Clone)]
pub(crate) struct Account {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub display_name: String,
    pub emp_number: Option<u64>,
    pub status: UserStatus,
}

impl Account {
    /// Role as listed in the users table; supervisors are plain ESS accounts
    pub fn user_role_label(&self) -> &'static str {
        match self.role {
            Role::Admin => "Admin",
            Role::Ess | Role::Manager => "ESS",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct EmployeeRecord {
    pub emp_number: u64,
    pub employee_id: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub location: Option<String>,
    pub has_photo: bool,
}

impl EmployeeRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn matches_name(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        let with_middle = match &self.middle_name {
            Some(m) => format!("{} {} {}", self.first_name, m, self.last_name),
            None => self.full_name(),
        };
        self.full_name().to_lowercase().contains(&query)
            || with_middle.to_lowercase().contains(&query)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct LeaveRecord {
    pub id: u64,
    pub owner: String,
    pub owner_name: String,
    pub leave_type: LeaveType,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub partial_days: Option<String>,
    pub comment: Option<String>,
    pub status: LeaveStatus,
    /// Owner reads that still report Pending Approval after a decision
    pub stale_reads: u32,
}

impl LeaveRecord {
    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    pub fn overlaps(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
        from.map_or(true, |f| self.to >= f) && to.map_or(true, |t| self.from <= t)
    }

    pub fn date_label(&self) -> String {
        let from = self.from.format(DATE_FORMAT).to_string();
        if self.from == self.to {
            from
        } else {
            format!("{} to {}", from, self.to.format(DATE_FORMAT))
        }
    }
}

/// Status text as the leave tables print it
pub(crate) fn status_cell(status: LeaveStatus, days: i64) -> String {
    let label = match status {
        LeaveStatus::Approved => "Scheduled",
        other => other.label(),
    };
    format!("{} ({}.00)", label, days)
}

#[derive(Debug, Clone)]
pub(crate) struct Location {
    pub name: String,
    pub city: String,
    pub country: String,
}

pub(crate) const DEPARTMENTS: &[&str] = &[
    "Administration",
    "Engineering",
    "Finance",
    "Human Resources",
    "Sales & Marketing",
];

pub(crate) const COUNTRIES: &[&str] = &[
    "Canada",
    "Germany",
    "India",
    "Sri Lanka",
    "United Kingdom",
    "United States",
];

#[derive(Debug, Default)]
pub(crate) struct Backend {
    pub accounts: Vec<Account>,
    pub employees: Vec<EmployeeRecord>,
    pub leaves: Vec<LeaveRecord>,
    pub job_titles: Vec<(String, Option<String>)>,
    pub locations: Vec<Location>,
    next_emp_number: u64,
    next_leave_id: u64,
}

impl Backend {
    /// Seeded with one account and employee per configured role plus a few
    /// colleagues so unfiltered lists are never trivially small
    pub fn seeded<'a>(roles: impl IntoIterator<Item = &'a Credential>) -> Self {
        let mut backend = Self {
            next_emp_number: 1,
            next_leave_id: 1,
            job_titles: vec![
                ("QA Engineer".to_string(), None),
                ("Software Engineer".to_string(), None),
                ("HR Manager".to_string(), Some("People operations".to_string())),
            ],
            locations: vec![Location {
                name: "Head Office".to_string(),
                city: "Austin".to_string(),
                country: "United States".to_string(),
            }],
            ..Self::default()
        };

        for (first, last) in [("Linda", "Anderson"), ("Paul", "Collings"), ("Rebecca", "Harmony")] {
            backend.add_employee(first, None, last, None);
        }

        for cred in roles {
            let display = cred
                .display_name()
                .map(str::to_string)
                .unwrap_or_else(|| cred.identity().to_string());
            let (first, last) = match display.split_once(' ') {
                Some((f, l)) => (f.to_string(), l.to_string()),
                None => (display.clone(), "User".to_string()),
            };
            let emp_number = backend.add_employee(&first, None, &last, None);
            backend.accounts.push(Account {
                username: cred.identity().to_string(),
                password: cred.secret().to_string(),
                role: cred.role(),
                display_name: display,
                emp_number: Some(emp_number),
                status: UserStatus::Enabled,
            });
        }
        backend
    }

    pub fn add_employee(
        &mut self,
        first: &str,
        middle: Option<String>,
        last: &str,
        employee_id: Option<String>,
    ) -> u64 {
        let emp_number = self.next_emp_number;
        self.next_emp_number += 1;
        self.employees.push(EmployeeRecord {
            emp_number,
            employee_id: employee_id.unwrap_or_else(|| format!("{:04}", emp_number)),
            first_name: first.to_string(),
            middle_name: middle,
            last_name: last.to_string(),
            job_title: None,
            department: None,
            location: None,
            has_photo: false,
        });
        emp_number
    }

    pub fn employee(&self, emp_number: u64) -> Option<&EmployeeRecord> {
        self.employees.iter().find(|e| e.emp_number == emp_number)
    }

    pub fn employee_mut(&mut self, emp_number: u64) -> Option<&mut EmployeeRecord> {
        self.employees.iter_mut().find(|e| e.emp_number == emp_number)
    }

    pub fn employee_id_taken(&self, employee_id: &str) -> bool {
        self.employees.iter().any(|e| e.employee_id == employee_id)
    }

    pub fn remove_employee(&mut self, emp_number: u64) {
        self.employees.retain(|e| e.emp_number != emp_number);
        self.accounts.retain(|a| a.emp_number != Some(emp_number));
    }

    pub fn account(&self, username: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.username == username)
    }

    /// Enabled account with matching password
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&Account> {
        self.account(username)
            .filter(|a| a.password == password && a.status == UserStatus::Enabled)
    }

    pub fn add_leave(&mut self, mut record: LeaveRecord) -> u64 {
        record.id = self.next_leave_id;
        self.next_leave_id += 1;
        let id = record.id;
        self.leaves.push(record);
        id
    }

    pub fn leave_mut(&mut self, id: u64) -> Option<&mut LeaveRecord> {
        self.leaves.iter_mut().find(|l| l.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_cell_format() {
        assert_eq!(status_cell(LeaveStatus::PendingApproval, 4), "Pending Approval (4.00)");
        assert_eq!(status_cell(LeaveStatus::Approved, 1), "Scheduled (1.00)");
    }

    #[test]
    fn test_seeded_accounts_authenticate() {
        let admin = Credential::new("Admin", "admin123", Role::Admin);
        let backend = Backend::seeded([&admin]);
        assert!(backend.authenticate("Admin", "admin123").is_some());
        assert!(backend.authenticate("Admin", "wrong").is_none());
        assert_eq!(backend.employees.len(), 4);
    }
}
