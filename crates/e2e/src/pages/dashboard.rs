//! Dashboard and main navigation

use hrm_common::Module;
use tracing::{debug, info};

use super::{heading, PageKind, Screen};
use crate::context::BrowserContext;
use crate::driver::Locator;
use crate::error::E2eResult;

pub(crate) const USER_DROPDOWN: &str = ".oxd-userdropdown-tab";
pub(crate) const USER_NAME: &str = ".oxd-userdropdown-name";
pub(crate) const LOGOUT_LINK: &str = r#"a[href="/web/index.php/auth/logout"]"#;
pub(crate) const SIDE_MENU: &str = ".oxd-sidepanel";
pub(crate) const WIDGET: &str = ".orangehrm-dashboard-widget";

pub(crate) const ADMIN_TAB: &str = r#"a[href="/web/index.php/admin/viewAdminModule"]"#;
pub(crate) const PIM_TAB: &str = r#"a[href="/web/index.php/pim/viewPimModule"]"#;
pub(crate) const LEAVE_TAB: &str = r#"a[href="/web/index.php/leave/viewLeaveModule"]"#;
pub(crate) const MY_INFO_TAB: &str = r#"a[href="/web/index.php/pim/viewMyDetails"]"#;

/// Widget sections probed on the dashboard; none of them is mandatory
pub const DASHBOARD_SECTIONS: [&str; 5] = [
    "Time at Work",
    "My Actions",
    "Quick Launch",
    "Buzz Latest Posts",
    "Employees on Leave Today",
];

/// Navigation tab for a module
pub fn module_tab(module: Module) -> Locator {
    let selector = match module {
        Module::Admin => ADMIN_TAB,
        Module::Leave => LEAVE_TAB,
        Module::PersonalInfo => MY_INFO_TAB,
    };
    Locator::css(selector)
}

/// Heading shown once a module's landing screen has loaded
pub fn module_marker(module: Module) -> Locator {
    match module {
        Module::Admin => PageKind::Admin.ready_marker(),
        Module::Leave => PageKind::Leave.ready_marker(),
        Module::PersonalInfo => heading("Personal Details"),
    }
}

/// Direct URL of a module's landing screen
pub fn module_path(module: Module) -> &'static str {
    match module {
        Module::Admin => PageKind::Admin.path(),
        Module::Leave => PageKind::Leave.path(),
        Module::PersonalInfo => "/web/index.php/pim/viewMyDetails",
    }
}

pub struct DashboardPage<'a> {
    ctx: &'a BrowserContext,
}

impl<'a> Screen for DashboardPage<'a> {
    const KIND: PageKind = PageKind::Dashboard;

    fn context(&self) -> &BrowserContext {
        self.ctx
    }
}

impl<'a> DashboardPage<'a> {
    pub fn new(ctx: &'a BrowserContext) -> Self {
        Self { ctx }
    }

    pub async fn verify_dashboard_loaded(&self) -> E2eResult<()> {
        self.wait_ready().await?;
        self.ctx.expect_visible(&Locator::css(SIDE_MENU)).await
    }

    /// Count the widget sections present
    pub async fn verify_dashboard_widgets(&self) -> E2eResult<usize> {
        let mut found = 0;
        for section in DASHBOARD_SECTIONS {
            let widget = Locator::css(WIDGET).with_text(section).first();
            if self.ctx.try_optional(&widget).await? {
                found += 1;
            }
        }
        info!("Dashboard widgets found: {}/{}", found, DASHBOARD_SECTIONS.len());
        Ok(found)
    }

    async fn navigate_via(&self, tab: &Locator, ready: &Locator) -> E2eResult<()> {
        self.ctx.click(tab).await?;
        self.ctx.settle().await?;
        self.ctx.expect_visible(ready).await
    }

    pub async fn navigate_to_admin(&self) -> E2eResult<()> {
        self.navigate_via(&Locator::css(ADMIN_TAB), &PageKind::Admin.ready_marker())
            .await
    }

    pub async fn navigate_to_pim(&self) -> E2eResult<()> {
        self.navigate_via(&Locator::css(PIM_TAB), &PageKind::Employee.ready_marker())
            .await
    }

    pub async fn navigate_to_leave(&self) -> E2eResult<()> {
        self.navigate_via(&Locator::css(LEAVE_TAB), &PageKind::Leave.ready_marker())
            .await
    }

    pub async fn navigate_to_my_info(&self) -> E2eResult<()> {
        self.navigate_via(&Locator::css(MY_INFO_TAB), &heading("Personal Details"))
            .await
    }

    /// Open the user menu and log out; waits for the login screen
    pub async fn logout(&self) -> E2eResult<()> {
        self.ctx.click(&Locator::css(USER_DROPDOWN)).await?;
        self.ctx.click(&Locator::css(LOGOUT_LINK)).await?;
        self.ctx.settle().await?;
        self.ctx.expect_visible(&PageKind::Login.ready_marker()).await
    }

    pub async fn module_visible(&self, module: Module) -> E2eResult<bool> {
        let visible = self.ctx.try_optional(&module_tab(module)).await?;
        debug!("module {} visible: {}", module, visible);
        Ok(visible)
    }

    pub async fn admin_tab_visible(&self) -> E2eResult<bool> {
        self.module_visible(Module::Admin).await
    }

    pub async fn leave_tab_visible(&self) -> E2eResult<bool> {
        self.module_visible(Module::Leave).await
    }

    /// Open a module by URL, bypassing the menu, and report whether its
    /// landing screen rendered
    pub async fn attempt_direct_access(&self, module: Module) -> E2eResult<bool> {
        self.ctx.goto(module_path(module)).await?;
        self.ctx.try_optional(&module_marker(module)).await
    }

    pub async fn current_user_name(&self) -> E2eResult<String> {
        self.ctx.text(&Locator::css(USER_NAME)).await
    }
}
