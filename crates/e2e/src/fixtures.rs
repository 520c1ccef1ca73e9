//! Role fixtures: authenticated sessions on fresh browser contexts
//!
//! Sessions are never pooled. Every acquisition opens its own context and logs
//! in, so scenarios running side by side share nothing but the application.

use futures::future::BoxFuture;
use hrm_common::{Credential, HarnessConfig, Role};
use std::sync::Arc;
use tracing::{info, warn};

use crate::context::BrowserContext;
use crate::driver::BrowserLauncher;
use crate::error::{E2eError, E2eResult};
use crate::pages::{DashboardPage, LoginOutcome, LoginPage};

/// An authenticated actor and the browser context it owns
#[derive(Debug)]
pub struct Session {
    ctx: BrowserContext,
    credential: Credential,
}

impl Session {
    pub fn ctx(&self) -> &BrowserContext {
        &self.ctx
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn role(&self) -> Role {
        self.credential.role()
    }

    /// Log out through the user menu, then dispose the context. The context
    /// is disposed even when logging out fails.
    pub async fn logout(self) -> E2eResult<()> {
        info!("Logging out {} ({})", self.credential.identity(), self.role());
        let logged_out = DashboardPage::new(&self.ctx).logout().await;
        let closed = self.ctx.close().await;
        logged_out.and(closed)
    }

    /// Dispose the context without logging out
    pub async fn close(self) -> E2eResult<()> {
        self.ctx.close().await
    }
}

/// Hands out authenticated sessions per role
#[derive(Clone)]
pub struct RoleFixtures {
    config: Arc<HarnessConfig>,
    launcher: Arc<dyn BrowserLauncher>,
}

impl RoleFixtures {
    pub fn new(config: Arc<HarnessConfig>, launcher: Arc<dyn BrowserLauncher>) -> Self {
        Self { config, launcher }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Fresh session for one of the configured roles
    pub async fn acquire(&self, role: Role) -> E2eResult<Session> {
        let credential = self.config.roles.credential(role).clone();
        self.acquire_as(credential).await
    }

    /// Fresh session for a credential issued at runtime
    pub async fn acquire_as(&self, credential: Credential) -> E2eResult<Session> {
        let ctx = self.anonymous().await?;

        match sign_in(&ctx, &credential).await {
            Ok(()) => {
                info!("Session ready for {} ({})", credential.identity(), credential.role());
                Ok(Session { ctx, credential })
            }
            Err(e) => {
                if let Err(close_err) = ctx.close().await {
                    warn!("Failed to dispose context after login failure: {}", close_err);
                }
                Err(e)
            }
        }
    }

    /// Fresh context nobody has signed in to; the caller closes it
    pub async fn anonymous(&self) -> E2eResult<BrowserContext> {
        let driver = self.launcher.new_context().await?;
        Ok(BrowserContext::new(
            driver,
            self.config.waits.clone(),
            self.config.screenshot_dir(),
        ))
    }

    /// Run `body` with a session for `role`; the session is released whatever
    /// the body returns
    pub async fn with_session<T, F>(&self, role: Role, body: F) -> E2eResult<T>
    where
        T: Send,
        F: for<'s> FnOnce(&'s Session) -> BoxFuture<'s, E2eResult<T>> + Send,
    {
        let session = self.acquire(role).await?;
        let result = body(&session).await;
        if let Err(e) = session.logout().await {
            warn!("Releasing {} session failed: {}", role, e);
        }
        result
    }
}

async fn sign_in(ctx: &BrowserContext, credential: &Credential) -> E2eResult<()> {
    let login = LoginPage::new(ctx);
    login.navigate().await?;
    match login.login(credential).await? {
        LoginOutcome::Dashboard => Ok(()),
        LoginOutcome::Rejected(message) => Err(E2eError::AuthenticationFailed {
            role: credential.role(),
            reason: message,
        }),
        LoginOutcome::NoResponse => Err(E2eError::AuthenticationFailed {
            role: credential.role(),
            reason: format!(
                "dashboard did not appear within {} ms",
                ctx.waits().navigation_ms
            ),
        }),
    }
}
