//! Admin module: system users, job titles and locations

use hrm_common::{Role, SystemUser, UserStatus};
use tracing::info;

use super::{
    heading, plain_button, submit_button, PageKind, Screen, AUTOCOMPLETE_INPUT, SELECT_INPUT,
    TABLE, TABLE_ROWS,
};
use crate::context::BrowserContext;
use crate::driver::Locator;
use crate::error::{E2eError, E2eResult};

pub(crate) const TOPBAR_MENU: &str = ".oxd-topbar-body-nav-tab-item";
pub(crate) const TOPBAR_LINK: &str = ".oxd-topbar-body-nav-tab-link";
pub(crate) const TEXT_INPUT: &str = "input.oxd-input";
pub(crate) const USERNAME_INPUT: &str = r#"input[autocomplete="off"]"#;
pub(crate) const PASSWORD_INPUT: &str = r#"input[type="password"]"#;
pub(crate) const DESCRIPTION: &str = "textarea";
pub(crate) const AUTOCOMPLETE_OPTION: &str = ".oxd-autocomplete-option";
pub(crate) const EDIT_ICON: &str = "button .oxd-icon.bi-pencil-fill";
pub(crate) const DELETE_ICON: &str = "button .oxd-icon.bi-trash";
pub(crate) const CONFIRM_DELETE: &str = "button";

/// Label of a role in the user-role dropdown; the application only knows
/// Admin and ESS accounts
fn user_role_label(role: Role) -> E2eResult<&'static str> {
    match role {
        Role::Admin => Ok("Admin"),
        Role::Ess => Ok("ESS"),
        Role::Manager => Err(E2eError::ValidationFailed(
            "system users are Admin or ESS; managers come from the reporting structure".to_string(),
        )),
    }
}

pub struct AdminPage<'a> {
    ctx: &'a BrowserContext,
}

impl<'a> Screen for AdminPage<'a> {
    const KIND: PageKind = PageKind::Admin;

    fn context(&self) -> &BrowserContext {
        self.ctx
    }
}

impl<'a> AdminPage<'a> {
    pub fn new(ctx: &'a BrowserContext) -> Self {
        Self { ctx }
    }

    pub async fn navigate(&self) -> E2eResult<()> {
        self.open().await
    }

    /// Follow a top-bar link; the top bar only exists inside the Admin module
    async fn open_menu(&self, menu: &str, link: &str, title: &str) -> E2eResult<()> {
        let menu = Locator::css(TOPBAR_MENU).with_text(menu).first();
        if !self.ctx.try_optional(&menu).await? {
            self.navigate().await?;
        }
        self.ctx.click(&menu).await?;
        self.ctx
            .click(&Locator::css(TOPBAR_LINK).with_text(link).first())
            .await?;
        self.ctx.settle().await?;
        self.ctx.expect_visible(&heading(title)).await
    }

    pub async fn navigate_to_users(&self) -> E2eResult<()> {
        self.open_menu("User Management", "Users", "System Users").await
    }

    pub async fn navigate_to_job_titles(&self) -> E2eResult<()> {
        self.open_menu("Job", "Job Titles", "Job Titles").await
    }

    pub async fn navigate_to_locations(&self) -> E2eResult<()> {
        self.open_menu("Organization", "Locations", "Locations").await
    }

    async fn click_add(&self, title: &str) -> E2eResult<()> {
        self.ctx.click(&plain_button("Add")).await?;
        self.ctx.settle().await?;
        self.ctx.expect_visible(&heading(title)).await
    }

    pub async fn click_add_user(&self) -> E2eResult<()> {
        self.click_add("Add User").await
    }

    pub async fn create_user(&self, user: &SystemUser) -> E2eResult<()> {
        let role = user_role_label(user.role)?;
        info!("Creating {} user {}", role, user.username);

        self.click_add_user().await?;
        self.ctx
            .select_option(&Locator::css(SELECT_INPUT).nth(0), role)
            .await?;
        self.ctx
            .fill(&Locator::css(AUTOCOMPLETE_INPUT), &user.employee_name)
            .await?;
        self.ctx
            .click_if_present(&Locator::css(AUTOCOMPLETE_OPTION).first())
            .await?;
        self.ctx
            .select_option(&Locator::css(SELECT_INPUT).nth(1), user.status.label())
            .await?;
        self.ctx
            .fill(&Locator::css(USERNAME_INPUT).nth(0), &user.username)
            .await?;
        self.ctx
            .fill(&Locator::css(PASSWORD_INPUT).nth(0), &user.password)
            .await?;
        self.ctx
            .fill(&Locator::css(PASSWORD_INPUT).nth(1), &user.password)
            .await?;
        self.ctx.click(&submit_button("Save")).await?;
        self.ctx.settle().await?;
        self.ctx.expect_visible(&heading("System Users")).await
    }

    async fn search(&self) -> E2eResult<()> {
        self.ctx.click(&submit_button("Search")).await?;
        self.ctx.settle().await
    }

    pub async fn search_user_by_username(&self, username: &str) -> E2eResult<()> {
        self.ctx
            .fill(&Locator::css(TEXT_INPUT).nth(1), username)
            .await?;
        self.search().await
    }

    pub async fn search_user_by_role(&self, role: Role) -> E2eResult<()> {
        let label = user_role_label(role)?;
        self.ctx
            .select_option(&Locator::css(SELECT_INPUT).nth(0), label)
            .await?;
        self.search().await
    }

    pub async fn search_user_by_status(&self, status: UserStatus) -> E2eResult<()> {
        self.ctx
            .select_option(&Locator::css(SELECT_INPUT).nth(1), status.label())
            .await?;
        self.search().await
    }

    pub async fn user_count(&self) -> E2eResult<usize> {
        self.ctx.count_when_present(&Locator::css(TABLE_ROWS)).await
    }

    pub async fn edit_first_user(&self) -> E2eResult<()> {
        self.ctx.click(&Locator::css(EDIT_ICON).first()).await?;
        self.ctx.settle().await?;
        self.ctx.expect_visible(&heading("Edit User")).await
    }

    /// Delete the first listed user. Returns whether a confirmation was shown.
    pub async fn delete_first_user(&self) -> E2eResult<bool> {
        self.ctx.click(&Locator::css(DELETE_ICON).first()).await?;
        let confirm = Locator::css(CONFIRM_DELETE).with_text("Yes, Delete").first();
        let confirmed = self.ctx.click_if_present(&confirm).await?;
        self.ctx.settle().await?;
        Ok(confirmed)
    }

    pub async fn add_job_title(&self, title: &str, description: Option<&str>) -> E2eResult<()> {
        self.navigate_to_job_titles().await?;
        self.click_add("Add Job Title").await?;
        self.ctx.fill(&Locator::css(TEXT_INPUT).nth(1), title).await?;
        if let Some(description) = description {
            self.ctx
                .fill(&Locator::css(DESCRIPTION).first(), description)
                .await?;
        }
        self.ctx.click(&submit_button("Save")).await?;
        self.ctx.settle().await?;
        self.ctx.expect_visible(&heading("Job Titles")).await
    }

    pub async fn add_location(&self, name: &str, country: &str) -> E2eResult<()> {
        self.navigate_to_locations().await?;
        self.click_add("Add Location").await?;
        self.ctx.fill(&Locator::css(TEXT_INPUT).nth(1), name).await?;
        self.ctx
            .select_option(&Locator::css(SELECT_INPUT).nth(0), country)
            .await?;
        self.ctx.click(&submit_button("Save")).await?;
        self.ctx.settle().await?;
        self.ctx.expect_visible(&heading("Locations")).await
    }

    pub async fn reset_search(&self) -> E2eResult<()> {
        self.ctx.click(&plain_button("Reset")).await?;
        self.ctx.settle().await
    }

    pub async fn verify_admin_page(&self) -> E2eResult<()> {
        self.wait_ready().await?;
        self.ctx.expect_visible(&Locator::css(TABLE)).await
    }

    pub async fn verify_users_page(&self) -> E2eResult<()> {
        self.ctx.expect_visible(&heading("System Users")).await?;
        self.ctx.expect_visible(&plain_button("Add")).await?;
        self.ctx.expect_visible(&submit_button("Search")).await
    }

    pub async fn verify_add_user_page(&self) -> E2eResult<()> {
        self.ctx.expect_visible(&heading("Add User")).await?;
        self.ctx.expect_visible(&Locator::css(SELECT_INPUT).nth(0)).await?;
        self.ctx.expect_visible(&Locator::css(PASSWORD_INPUT).nth(0)).await
    }

    pub async fn user_exists(&self, username: &str) -> E2eResult<bool> {
        self.search_user_by_username(username).await?;
        Ok(self.user_count().await? > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_labels() {
        assert_eq!(user_role_label(Role::Admin).unwrap(), "Admin");
        assert_eq!(user_role_label(Role::Ess).unwrap(), "ESS");
        assert!(matches!(
            user_role_label(Role::Manager),
            Err(E2eError::ValidationFailed(_))
        ));
    }
}
