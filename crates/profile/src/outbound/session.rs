use app_core::error::AppError;
use async_trait::async_trait;
use bb8_redis::redis::AsyncCommands;
use bb8_redis::{RedisConnectionManager, bb8};

const REVOKED_KEY_PREFIX: &str = "session:revoked";

fn revoked_key(jti: &str) -> String {
    format!("{REVOKED_KEY_PREFIX}:{jti}")
}

/// Denylist of ended sessions, keyed by the token's `jti`.
///
/// An access token stays cryptographically valid until it expires, so
/// signing out records its id here until that moment.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Marks a token as revoked for `ttl_secs` seconds.
    ///
    /// # Returns
    ///
    /// * `Ok(())` on success.
    /// * `Err(AppError)` if storing fails.
    async fn revoke_token(&self, jti: &str, ttl_secs: u64) -> Result<(), AppError>;

    /// Checks whether a token has been revoked.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` if the token was revoked and has not expired yet.
    /// * `Ok(false)` otherwise.
    /// * `Err(AppError)` if the check fails.
    async fn is_revoked(&self, jti: &str) -> Result<bool, AppError>;
}

/// Redis-backed implementation of [`SessionRepository`].
pub struct SessionRedis {
    pool: bb8::Pool<RedisConnectionManager>,
}

impl SessionRedis {
    pub fn new(pool: bb8::Pool<RedisConnectionManager>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for SessionRedis {
    async fn revoke_token(&self, jti: &str, ttl_secs: u64) -> Result<(), AppError> {
        let mut conn = self.pool.get().await?;
        let _: () = conn.set_ex(revoked_key(jti), true, ttl_secs).await?;
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, AppError> {
        let mut conn = self.pool.get().await?;
        let exists: bool = conn.exists(revoked_key(jti)).await?;
        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::*;

    use super::*;

    #[test]
    fn test_revoked_key() {
        assert_eq!(revoked_key("abc-123"), "session:revoked:abc-123");
    }

    #[tokio::test]
    async fn test_revoke_token_mock() {
        let mut mock = MockSessionRepository::new();
        mock.expect_revoke_token().with(eq("jti-1"), eq(60)).times(1).returning(|_, _| Ok(()));

        assert!(mock.revoke_token("jti-1", 60).await.is_ok());
    }

    #[tokio::test]
    async fn test_is_revoked_mock_error() {
        let mut mock = MockSessionRepository::new();
        mock.expect_is_revoked().with(eq("jti-1")).times(1).returning(|_| Err(AppError::Internal));

        assert!(mock.is_revoked("jti-1").await.is_err());
    }
}
