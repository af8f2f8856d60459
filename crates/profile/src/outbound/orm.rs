use std::sync::Arc;

use app_core::error::AppError;
use app_core::time::utc_to_fixed_offset;
use app_orm::prelude::Profiles;
use app_orm::profiles;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr, EntityTrait};
use uuid::Uuid;

use super::repository::ProfileRepository;
use crate::domain::entity::profile::{DEFAULT_PLAN, DEFAULT_PROVIDER, NewProfile, Profile, ProfileUpdatePayload};

const PROFILE_NOT_FOUND_MSG: &str = "Profile not found";

/// SeaORM-backed access to the `profiles` table.
pub struct ProfileORM {
    db: Arc<DatabaseConnection>,
}

impl ProfileORM {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn to_profile(&self, model: profiles::Model) -> Profile {
        let non_empty = |value: Option<String>, default: &str| {
            value.filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string())
        };

        Profile {
            id: model.id,
            email: model.email,
            full_name: model.full_name,
            avatar_url: model.avatar_url,
            tokens: Profile::effective_tokens(model.credits, model.tokens),
            subscription_plan: non_empty(model.subscription_plan, DEFAULT_PLAN),
            provider: non_empty(model.provider, DEFAULT_PROVIDER),
            created_at: model.created_at.into(),
        }
    }
}

#[async_trait]
impl ProfileRepository for ProfileORM {
    async fn find_profile_by_id(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        let model = Profiles::find_by_id(id).one(self.db.as_ref()).await?;

        Ok(model.map(|m| self.to_profile(m)))
    }

    async fn create_profile(&self, profile: NewProfile) -> Result<Profile, AppError> {
        let id = profile.id;
        let active_model = profiles::ActiveModel {
            id: ActiveValue::Set(id),
            email: ActiveValue::Set(profile.email),
            full_name: ActiveValue::Set(Some(profile.full_name)),
            avatar_url: ActiveValue::Set(Some(profile.avatar_url)),
            credits: ActiveValue::Set(Some(profile.credits)),
            subscription_plan: ActiveValue::Set(Some(profile.subscription_plan)),
            provider: ActiveValue::Set(Some(profile.provider)),
            created_at: ActiveValue::Set(utc_to_fixed_offset(&Utc::now())),
            ..Default::default()
        };

        let inserted = Profiles::insert(active_model)
            .on_conflict(OnConflict::column(profiles::Column::Id).do_nothing().to_owned())
            .exec_without_returning(self.db.as_ref())
            .await?;

        if inserted == 0 {
            tracing::info!(user_id = %id, "Profile row was created concurrently, reusing it");
        }

        self.find_profile_by_id(id).await?.ok_or_else(|| {
            tracing::error!(user_id = %id, "Profile row missing right after insert");
            AppError::Internal
        })
    }

    async fn update_profile(&self, payload: ProfileUpdatePayload) -> Result<Profile, AppError> {
        let mut active_model = profiles::ActiveModel { id: ActiveValue::Unchanged(payload.id), ..Default::default() };

        if let Some(full_name) = payload.full_name {
            active_model.full_name = ActiveValue::Set(Some(full_name));
        }
        if let Some(avatar_url) = payload.avatar_url {
            active_model.avatar_url = ActiveValue::Set(Some(avatar_url));
        }

        match active_model.update(self.db.as_ref()).await {
            Ok(model) => Ok(self.to_profile(model)),
            Err(DbErr::RecordNotUpdated) => Err(AppError::NotFound(PROFILE_NOT_FOUND_MSG.to_string())),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_profile(&self, id: Uuid) -> Result<bool, AppError> {
        let result = Profiles::delete_by_id(id).exec(self.db.as_ref()).await?;

        Ok(result.rows_affected > 0)
    }
}
