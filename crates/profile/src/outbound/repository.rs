use app_core::error::AppError;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entity::profile::{NewProfile, Profile, ProfileUpdatePayload};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Finds the profile row of a user.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Profile))` if the row exists.
    /// * `Ok(None)` if the user has no row yet.
    /// * `Err(AppError)` for any other database failure.
    async fn find_profile_by_id(&self, id: Uuid) -> Result<Option<Profile>, AppError>;

    /// Inserts the row for a user unless one already exists, then returns
    /// whichever row is stored.
    ///
    /// Concurrent first visits race on the primary key; the loser's insert
    /// is a no-op, so a user never ends up with two rows.
    async fn create_profile(&self, profile: NewProfile) -> Result<Profile, AppError>;

    /// Applies the edit action's changes and returns the updated row.
    ///
    /// # Returns
    ///
    /// * `Err(AppError::NotFound)` if the row disappeared.
    async fn update_profile(&self, payload: ProfileUpdatePayload) -> Result<Profile, AppError>;

    /// Removes the row. Returns whether a row was deleted.
    async fn delete_profile(&self, id: Uuid) -> Result<bool, AppError>;
}
