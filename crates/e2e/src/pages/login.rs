//! Login screen

use hrm_common::Credential;
use tracing::{debug, info};

use super::{PageKind, Screen};
use crate::context::BrowserContext;
use crate::driver::Locator;
use crate::error::E2eResult;

pub(crate) const USERNAME: &str = r#"input[name="username"]"#;
pub(crate) const PASSWORD: &str = r#"input[name="password"]"#;
pub(crate) const SUBMIT: &str = r#"button[type="submit"]"#;
pub(crate) const TITLE: &str = "h5.oxd-text--h5";
pub(crate) const ERROR_MESSAGE: &str = ".oxd-alert-content-text";
pub(crate) const FORGOT_PASSWORD: &str = ".orangehrm-login-forgot-header";

/// What the application showed after submitting credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Dashboard,
    Rejected(String),
    /// Neither the dashboard nor an error appeared in the navigation window
    NoResponse,
}

pub struct LoginPage<'a> {
    ctx: &'a BrowserContext,
}

impl<'a> Screen for LoginPage<'a> {
    const KIND: PageKind = PageKind::Login;

    fn context(&self) -> &BrowserContext {
        self.ctx
    }
}

impl<'a> LoginPage<'a> {
    pub fn new(ctx: &'a BrowserContext) -> Self {
        Self { ctx }
    }

    pub async fn navigate(&self) -> E2eResult<()> {
        self.open().await
    }

    async fn submit(&self, username: &str, password: &str) -> E2eResult<()> {
        self.ctx.fill(&Locator::css(USERNAME), username).await?;
        self.ctx.fill(&Locator::css(PASSWORD), password).await?;
        self.ctx.click(&Locator::css(SUBMIT)).await
    }

    /// Submit `credentials` and report whether the dashboard or the error
    /// message shows up first
    pub async fn login(&self, credentials: &Credential) -> E2eResult<LoginOutcome> {
        debug!("Logging in as {} ({})", credentials.identity(), credentials.role());
        self.submit(credentials.identity(), credentials.secret()).await?;
        self.ctx.settle().await?;

        let candidates = [PageKind::Dashboard.ready_marker(), Locator::css(ERROR_MESSAGE)];
        let outcome = match self
            .ctx
            .wait_for_any(&candidates, self.ctx.waits().navigation())
            .await?
        {
            Some(0) => LoginOutcome::Dashboard,
            Some(_) => LoginOutcome::Rejected(self.error_message().await?),
            None => LoginOutcome::NoResponse,
        };
        info!("Login as {}: {:?}", credentials.identity(), outcome);
        Ok(outcome)
    }

    /// Submit credentials expected to fail and return the error shown
    pub async fn login_with_invalid_credentials(&self, username: &str, password: &str) -> E2eResult<String> {
        self.submit(username, password).await?;
        self.ctx.expect_visible(&Locator::css(ERROR_MESSAGE)).await?;
        self.error_message().await
    }

    pub async fn error_message(&self) -> E2eResult<String> {
        self.ctx.text(&Locator::css(ERROR_MESSAGE)).await
    }

    pub async fn click_forgot_password(&self) -> E2eResult<()> {
        self.ctx.click(&Locator::css(FORGOT_PASSWORD)).await?;
        self.ctx.settle().await?;
        self.ctx.expect_text(&Locator::css(super::HEADING), "Reset Password").await
    }

    pub async fn verify_login_page_elements(&self) -> E2eResult<()> {
        self.ctx.expect_text(&Locator::css(TITLE), "Login").await?;
        self.ctx.expect_visible(&Locator::css(USERNAME)).await?;
        self.ctx.expect_visible(&Locator::css(PASSWORD)).await?;
        self.ctx.expect_visible(&Locator::css(SUBMIT)).await
    }
}
