use std::sync::Arc;

use app_core::config::Config;
use app_core::error::AppError;
use async_trait::async_trait;
use chrono::Utc;

use crate::domain::inout::prelude::*;
use crate::outbound::repository::ProfileRepository;
use crate::outbound::session::SessionRepository;

const DEFAULT_HOME_ROUTE: &str = "/";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionUseCase: Send + Sync {
    /// Whether the session identified by `jti` has not been signed out.
    async fn is_active(&self, jti: &str) -> Result<bool, AppError>;
    async fn logout(&self, input: LogoutInput) -> Result<LogoutOutput, AppError>;
    /// Ends the session; the profile row is removed only when
    /// `profile.delete_removes_row` is enabled.
    async fn delete_account(&self, input: DeleteAccountInput) -> Result<DeleteAccountOutput, AppError>;
}

#[derive(Clone)]
pub struct SessionService {
    config: Arc<Config>,
    sessions: Arc<dyn SessionRepository>,
    repo: Arc<dyn ProfileRepository>,
}

impl SessionService {
    pub fn new(config: Arc<Config>, sessions: Arc<dyn SessionRepository>, repo: Arc<dyn ProfileRepository>) -> Self {
        Self { config, sessions, repo }
    }

    fn home_route(&self) -> String {
        self.config.get_or("routes.home", DEFAULT_HOME_ROUTE.to_string())
    }

    /// Keeps the token on the denylist until it would have expired anyway.
    async fn revoke(&self, jti: &str, exp: usize) -> Result<(), AppError> {
        let ttl_secs = remaining_ttl(exp, Utc::now().timestamp());
        if ttl_secs == 0 {
            return Ok(());
        }

        self.sessions.revoke_token(jti, ttl_secs).await
    }
}

fn remaining_ttl(exp: usize, now: i64) -> u64 {
    (exp as u64).saturating_sub(now.max(0) as u64)
}

#[async_trait]
impl SessionUseCase for SessionService {
    async fn is_active(&self, jti: &str) -> Result<bool, AppError> {
        Ok(!self.sessions.is_revoked(jti).await?)
    }

    async fn logout(&self, input: LogoutInput) -> Result<LogoutOutput, AppError> {
        self.revoke(&input.jti, input.exp).await?;

        tracing::info!("User signed out: {}", input.user_id);

        Ok(LogoutOutput { redirect_to: self.home_route() })
    }

    async fn delete_account(&self, input: DeleteAccountInput) -> Result<DeleteAccountOutput, AppError> {
        let profile_removed = if self.config.get_or("profile.delete_removes_row", false) {
            self.repo.delete_profile(input.user_id).await?
        } else {
            false
        };

        self.revoke(&input.jti, input.exp).await?;

        tracing::info!(profile_removed, "Account deletion requested by user: {}", input.user_id);

        Ok(DeleteAccountOutput { profile_removed, redirect_to: self.home_route() })
    }
}
