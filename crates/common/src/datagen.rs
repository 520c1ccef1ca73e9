//! Synthetic test data
//!
//! Produces structurally valid employees and leave requests. Names combine a
//! random pick from a small pool with a per-run counter and a random suffix,
//! so two calls within one run never share first + last name.

use chrono::{Duration, Local, NaiveDate};
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::{Credential, Employee, LeaveRequest, LeaveType, Role};

const FIRST_NAMES: &[&str] = &[
    "Ava", "Liam", "Maya", "Noah", "Iris", "Owen", "Zara", "Elias", "Nina", "Theo",
];

const LAST_NAMES: &[&str] = &[
    "Hart", "Quinn", "Moreau", "Silva", "Okafor", "Lindqvist", "Tanaka", "Novak", "Reyes", "Brennan",
];

const LEAVE_COMMENTS: &[&str] = &[
    "Family trip planned",
    "Medical appointment",
    "Personal errands",
    "Annual vacation",
];

/// Shared by every generator in the process, so parallel scenarios never
/// draw the same sequence number
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generator for employees and leave requests
#[derive(Debug, Clone)]
pub struct TestDataGenerator {
    today: NaiveDate,
}

impl Default for TestDataGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TestDataGenerator {
    pub fn new() -> Self {
        Self::with_today(Local::now().date_naive())
    }

    /// Pin "today" so date ranges are deterministic
    pub fn with_today(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    fn next_sequence(&self) -> u64 {
        SEQUENCE.fetch_add(1, Ordering::Relaxed)
    }

    fn unique_tag(&self) -> String {
        let suffix: u32 = rand::thread_rng().gen_range(1000..10000);
        format!("{}{}", self.next_sequence(), suffix)
    }

    /// `prefix` plus a token no other call in this run returns
    pub fn unique_label(&self, prefix: &str) -> String {
        format!("{} {}", prefix, self.unique_tag())
    }

    /// Employee with mandatory names populated and distinct per call
    pub fn generate_employee(&self) -> Employee {
        let mut rng = rand::thread_rng();
        let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("Test");
        let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("Employee");
        let seq = self.next_sequence();
        let suffix: u32 = rng.gen_range(1000..10000);

        let mut employee = Employee::new(first, format!("{}{}{}", last, seq, suffix));
        // sequence in the low digits keeps ids unique within a run
        employee.employee_id = Some(format!("{:02}{:04}", rng.gen_range(10..100), seq % 10_000));
        employee
    }

    /// Login credentials for an employee created with the create-login toggle
    pub fn generate_credentials(&self, employee: &Employee) -> Credential {
        let tag = self.unique_tag();
        let username = format!(
            "{}.{}{}",
            employee.first_name.to_ascii_lowercase(),
            employee.last_name.chars().take(4).collect::<String>().to_ascii_lowercase(),
            tag
        );
        Credential::new(username, format!("Test@{}x", tag), Role::Ess).with_display_name(employee.full_name())
    }

    /// Leave request starting `start_offset_days` from today and ending
    /// `duration_days` after that
    pub fn generate_leave_request(&self, start_offset_days: u32, duration_days: u32) -> LeaveRequest {
        let mut rng = rand::thread_rng();
        let from = self.today + Duration::days(i64::from(start_offset_days));
        let to = from + Duration::days(i64::from(duration_days));
        let leave_type = LeaveType::ALL.choose(&mut rng).copied().unwrap_or(LeaveType::Vacation);

        let mut request = LeaveRequest::new(leave_type, from, to);
        if rng.gen_bool(0.5) {
            if let Some(comment) = LEAVE_COMMENTS.choose(&mut rng) {
                request = request.with_comment(*comment);
            }
        }
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn pinned() -> TestDataGenerator {
        TestDataGenerator::with_today(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap())
    }

    #[test]
    fn test_employees_are_valid_and_distinct() {
        let gen = pinned();
        let mut names = HashSet::new();
        let mut ids = HashSet::new();
        for _ in 0..200 {
            let emp = gen.generate_employee();
            assert!(emp.validate().is_ok());
            assert!(names.insert(emp.full_name()), "duplicate name {}", emp.full_name());
            assert!(ids.insert(emp.employee_id.clone().unwrap()));
        }
    }

    #[test]
    fn test_leave_request_dates_derive_from_offsets() {
        let gen = pinned();
        let req = gen.generate_leave_request(7, 3);
        assert_eq!(req.from_date(), "2026-10-23");
        assert_eq!(req.to_date(), "2026-10-26");
        assert!(req.validate().is_ok());

        let same_day = gen.generate_leave_request(0, 0);
        assert_eq!(same_day.from, same_day.to);
    }

    #[test]
    fn test_generated_credentials_are_ess() {
        let gen = pinned();
        let emp = gen.generate_employee();
        let a = gen.generate_credentials(&emp);
        let b = gen.generate_credentials(&emp);
        assert_eq!(a.role(), Role::Ess);
        assert_ne!(a.identity(), b.identity());
        assert_eq!(a.display_name(), Some(emp.full_name().as_str()));
    }

    #[test]
    fn test_unique_labels() {
        let gen = pinned();
        let a = gen.unique_label("QA Lead");
        assert!(a.starts_with("QA Lead "));
        assert_ne!(a, gen.unique_label("QA Lead"));
    }
}
