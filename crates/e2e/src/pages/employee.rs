//! PIM: employee list, add-employee form and job details

use hrm_common::{Credential, Employee};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{debug, info};

use super::{
    heading, plain_button, submit_button, PageKind, Screen, AUTOCOMPLETE_INPUT, SELECT_INPUT,
    TABLE, TABLE_ROWS,
};
use crate::context::BrowserContext;
use crate::driver::Locator;
use crate::error::E2eResult;

pub(crate) const ADD_EMPLOYEE_PATH: &str = "/web/index.php/pim/addEmployee";

pub(crate) const FIRST_NAME: &str = r#"input[name="firstName"]"#;
pub(crate) const MIDDLE_NAME: &str = r#"input[name="middleName"]"#;
pub(crate) const LAST_NAME: &str = r#"input[name="lastName"]"#;
pub(crate) const EMPLOYEE_ID: &str = ".orangehrm-employee-form .oxd-grid-2 input.oxd-input";
pub(crate) const PHOTO_INPUT: &str = r#"input[type="file"]"#;
pub(crate) const CREATE_LOGIN_SWITCH: &str = ".oxd-switch-input";
pub(crate) const LOGIN_USERNAME: &str = r#"input[autocomplete="off"]"#;
pub(crate) const LOGIN_PASSWORD: &str = r#"input[type="password"]"#;
pub(crate) const EDIT_ICON: &str = "button .oxd-icon.bi-pencil-fill";
pub(crate) const DELETE_ICON: &str = "button .oxd-icon.bi-trash";
pub(crate) const CONFIRM_DELETE: &str = "button";
pub(crate) const JOB_TAB: &str = "a";

static EMP_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"/empNumber/(\d+)").unwrap());

/// System-assigned employee number from a details-page URL
pub fn parse_emp_number(url: &str) -> Option<u64> {
    EMP_NUMBER
        .captures(url)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub struct EmployeePage<'a> {
    ctx: &'a BrowserContext,
}

impl<'a> Screen for EmployeePage<'a> {
    const KIND: PageKind = PageKind::Employee;

    fn context(&self) -> &BrowserContext {
        self.ctx
    }
}

impl<'a> EmployeePage<'a> {
    pub fn new(ctx: &'a BrowserContext) -> Self {
        Self { ctx }
    }

    pub async fn navigate(&self) -> E2eResult<()> {
        self.open().await
    }

    pub async fn click_add_employee(&self) -> E2eResult<()> {
        self.ctx.click(&plain_button("Add")).await?;
        self.ctx.settle().await?;
        self.ctx.expect_visible(&heading("Add Employee")).await
    }

    pub async fn fill_basic_info(&self, employee: &Employee) -> E2eResult<()> {
        self.ctx.fill(&Locator::css(FIRST_NAME), &employee.first_name).await?;
        if let Some(middle) = &employee.middle_name {
            self.ctx.fill(&Locator::css(MIDDLE_NAME), middle).await?;
        }
        self.ctx.fill(&Locator::css(LAST_NAME), &employee.last_name).await?;
        if let Some(id) = &employee.employee_id {
            self.ctx.fill(&Locator::css(EMPLOYEE_ID).first(), id).await?;
        }
        Ok(())
    }

    pub async fn upload_photo(&self, photo: &Path) -> E2eResult<()> {
        self.ctx
            .driver()
            .set_input_files(&Locator::css(PHOTO_INPUT), photo, self.ctx.waits().default_wait())
            .await
    }

    pub async fn enable_create_login(&self) -> E2eResult<()> {
        self.ctx.click(&Locator::css(CREATE_LOGIN_SWITCH)).await
    }

    pub async fn fill_login_credentials(&self, credentials: &Credential) -> E2eResult<()> {
        self.ctx
            .fill(&Locator::css(LOGIN_USERNAME).nth(0), credentials.identity())
            .await?;
        self.ctx
            .fill(&Locator::css(LOGIN_PASSWORD).nth(0), credentials.secret())
            .await?;
        self.ctx
            .fill(&Locator::css(LOGIN_PASSWORD).nth(1), credentials.secret())
            .await
    }

    /// Save the add-employee form and wait for the details screen. Returns the
    /// employee number the application assigned, when the URL carries one.
    pub async fn save_employee(&self) -> E2eResult<Option<u64>> {
        self.ctx.click(&submit_button("Save")).await?;
        self.ctx.settle().await?;
        self.ctx.expect_visible(&heading("Personal Details")).await?;
        let url = self.ctx.current_url().await?;
        Ok(parse_emp_number(&url))
    }

    /// Full creation flow; optional fields that are absent are skipped
    pub async fn create_employee(&self, employee: &Employee) -> E2eResult<Option<u64>> {
        employee.validate()?;
        info!("Creating employee {}", employee.full_name());

        self.navigate().await?;
        self.click_add_employee().await?;
        self.fill_basic_info(employee).await?;
        if let Some(photo) = &employee.photo {
            self.upload_photo(photo).await?;
        }
        if let Some(login) = &employee.login {
            self.enable_create_login().await?;
            self.fill_login_credentials(login).await?;
        }
        let emp_number = self.save_employee().await?;

        let has_job = employee.job_title.is_some()
            || employee.department.is_some()
            || employee.location.is_some();
        if has_job {
            self.open_job_tab().await?;
            if let Some(title) = &employee.job_title {
                self.select_job_title(title).await?;
            }
            if let Some(department) = &employee.department {
                self.select_department(department).await?;
            }
            if let Some(location) = &employee.location {
                self.select_location(location).await?;
            }
            self.save_job_details().await?;
        }

        debug!("employee {} saved as #{:?}", employee.full_name(), emp_number);
        Ok(emp_number)
    }

    async fn search(&self) -> E2eResult<()> {
        self.ctx.click(&submit_button("Search")).await?;
        self.ctx.settle().await
    }

    pub async fn search_by_name(&self, name: &str) -> E2eResult<()> {
        self.ctx
            .fill(&Locator::css(AUTOCOMPLETE_INPUT).nth(0), name)
            .await?;
        self.search().await
    }

    pub async fn search_by_id(&self, employee_id: &str) -> E2eResult<()> {
        self.ctx
            .fill(&Locator::css(AUTOCOMPLETE_INPUT).nth(1), employee_id)
            .await?;
        self.search().await
    }

    pub async fn employee_count(&self) -> E2eResult<usize> {
        self.ctx.count_when_present(&Locator::css(TABLE_ROWS)).await
    }

    pub async fn edit_first_employee(&self) -> E2eResult<()> {
        self.ctx.click(&Locator::css(EDIT_ICON).first()).await?;
        self.ctx.settle().await?;
        self.ctx.expect_visible(&heading("Personal Details")).await
    }

    /// Delete the first row. Returns whether a confirmation dialog was shown.
    pub async fn delete_first_employee(&self) -> E2eResult<bool> {
        self.ctx.click(&Locator::css(DELETE_ICON).first()).await?;
        let confirm = Locator::css(CONFIRM_DELETE).with_text("Yes, Delete").first();
        let confirmed = self.ctx.click_if_present(&confirm).await?;
        self.ctx.settle().await?;
        Ok(confirmed)
    }

    pub async fn open_job_tab(&self) -> E2eResult<()> {
        self.ctx
            .click(&Locator::css(JOB_TAB).with_text("Job").first())
            .await?;
        self.ctx.settle().await?;
        self.ctx.expect_visible(&heading("Job Details")).await
    }

    pub async fn select_job_title(&self, title: &str) -> E2eResult<()> {
        self.ctx
            .select_option(&Locator::css(SELECT_INPUT).nth(0), title)
            .await
    }

    pub async fn select_department(&self, department: &str) -> E2eResult<()> {
        self.ctx
            .select_option(&Locator::css(SELECT_INPUT).nth(1), department)
            .await
    }

    pub async fn select_location(&self, location: &str) -> E2eResult<()> {
        self.ctx
            .select_option(&Locator::css(SELECT_INPUT).nth(2), location)
            .await
    }

    pub async fn save_job_details(&self) -> E2eResult<()> {
        self.ctx.click(&submit_button("Save")).await?;
        self.ctx.settle().await
    }

    pub async fn verify_list_page(&self) -> E2eResult<()> {
        self.wait_ready().await?;
        self.ctx.expect_visible(&plain_button("Add")).await?;
        self.ctx.expect_visible(&submit_button("Search")).await?;
        self.ctx.expect_visible(&Locator::css(TABLE)).await
    }

    pub async fn verify_add_page(&self) -> E2eResult<()> {
        self.ctx.expect_visible(&heading("Add Employee")).await?;
        self.ctx.expect_visible(&Locator::css(FIRST_NAME)).await?;
        self.ctx.expect_visible(&Locator::css(LAST_NAME)).await?;
        self.ctx.expect_visible(&submit_button("Save")).await
    }

    pub async fn employee_exists(&self, name: &str) -> E2eResult<bool> {
        self.search_by_name(name).await?;
        Ok(self.employee_count().await? > 0)
    }

    pub async fn reset_search(&self) -> E2eResult<()> {
        self.ctx.click(&plain_button("Reset")).await?;
        self.ctx.settle().await
    }

    /// Open the add form directly by URL
    pub async fn open_add_form(&self) -> E2eResult<()> {
        self.ctx.goto(ADD_EMPLOYEE_PATH).await?;
        self.ctx.expect_visible(&heading("Add Employee")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_emp_number() {
        assert_eq!(
            parse_emp_number("https://hr.example/web/index.php/pim/viewPersonalDetails/empNumber/42"),
            Some(42)
        );
        assert_eq!(parse_emp_number("https://hr.example/web/index.php/pim/addEmployee"), None);
    }
}
