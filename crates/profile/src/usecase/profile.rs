use std::path::Path;
use std::sync::Arc;

use app_core::config::Config;
use app_core::error::AppError;
use app_core::storage::StorageService;
use async_trait::async_trait;
use uuid::Uuid;
use validator::Validate;

use crate::domain::entity::profile::{NewProfile, Profile, ProfileUpdatePayload};
use crate::domain::inout::prelude::*;
use crate::outbound::repository::ProfileRepository;

const PROFILE_NOT_FOUND_MSG: &str = "Profile not found";
const PROFILE_SETUP_FAILED_MSG: &str = "Your profile could not be set up";
const DEFAULT_DASHBOARD_ROUTE: &str = "/dashboard";

// File upload constants
const AVATAR_DIR: &str = "avatars";
const MAX_AVATAR_SIZE: usize = 5 * 1024 * 1024; // 5MB
const DEFAULT_AVATAR_EXT: &str = "jpg";
const ALLOWED_AVATAR_TYPES: &[&str] = &["image/jpeg", "image/png", "image/jpg", "image/webp", "image/gif"];

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileUseCase: Send + Sync {
    /// Returns the caller's profile row, creating it with defaults on the
    /// first visit.
    async fn resolve_profile(&self, input: ResolveProfileInput) -> Result<ResolveProfileOutput, AppError>;
    async fn update_profile(&self, input: UpdateProfileInput) -> Result<UpdateProfileOutput, AppError>;
    async fn upload_avatar(&self, input: UploadAvatarInput) -> Result<UploadAvatarOutput, AppError>;
}

#[derive(Clone)]
pub struct ProfileService {
    config: Arc<Config>,
    storage: Arc<dyn StorageService>,
    repo: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    pub fn new(config: Arc<Config>, storage: Arc<dyn StorageService>, repo: Arc<dyn ProfileRepository>) -> Self {
        Self { config, storage, repo }
    }

    async fn get_profile_by_id(&self, user_id: Uuid) -> Result<Profile, AppError> {
        self.repo
            .find_profile_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(PROFILE_NOT_FOUND_MSG.to_string()))
    }

    /// Checks size and type, then builds a collision-free object key.
    fn validate_avatar_file(&self, user_id: Uuid, avatar: &AvatarFile) -> Result<(String, String), AppError> {
        if avatar.data.is_empty() {
            return Err(AppError::ValidationStr("No file provided".to_string()));
        }

        if avatar.data.len() > MAX_AVATAR_SIZE {
            return Err(AppError::ValidationStr("Avatar file too large (max 5MB)".to_string()));
        }

        let content_type = mime_guess::from_path(&avatar.file_name).first_or_octet_stream().to_string();

        if !ALLOWED_AVATAR_TYPES.contains(&content_type.as_str()) {
            return Err(AppError::ValidationStr(
                "Invalid avatar format. Only JPEG, JPG, PNG, WebP, and GIF are allowed".to_string(),
            ));
        }

        let file_extension = Path::new(&avatar.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| DEFAULT_AVATAR_EXT.to_string());

        let secure_filename = format!("{}/{}/{}.{}", AVATAR_DIR, user_id, Uuid::new_v4(), file_extension);

        Ok((secure_filename, content_type))
    }

    async fn store_avatar(&self, user_id: Uuid, avatar: AvatarFile) -> Result<String, AppError> {
        let (secure_filename, content_type) = self.validate_avatar_file(user_id, &avatar)?;

        Ok(self.storage.upload_file(&secure_filename, avatar.data, &content_type).await?)
    }
}

#[async_trait]
impl ProfileUseCase for ProfileService {
    async fn resolve_profile(&self, input: ResolveProfileInput) -> Result<ResolveProfileOutput, AppError> {
        let user_id = input.user.id;

        if let Some(profile) = self.repo.find_profile_by_id(user_id).await? {
            return Ok(ResolveProfileOutput { profile, created: false });
        }

        // A failed insert sends the client to the dashboard.
        let profile = match self.repo.create_profile(NewProfile::for_session(&input.user)).await {
            Ok(profile) => profile,
            Err(err) => {
                tracing::error!(%user_id, error = ?err, "Failed to create profile");
                return Err(AppError::InternalRedirect {
                    message: PROFILE_SETUP_FAILED_MSG.to_string(),
                    redirect_to: self.config.get_or("routes.dashboard", DEFAULT_DASHBOARD_ROUTE.to_string()),
                });
            },
        };

        tracing::info!("Profile created on first visit for user: {}", user_id);

        Ok(ResolveProfileOutput { profile, created: true })
    }

    async fn update_profile(&self, input: UpdateProfileInput) -> Result<UpdateProfileOutput, AppError> {
        input.validate()?;

        let profile = self.get_profile_by_id(input.user_id).await?;

        let avatar_url = match input.avatar {
            Some(avatar) => Some(self.store_avatar(profile.id, avatar).await?),
            None => None,
        };

        let profile = self
            .repo
            .update_profile(ProfileUpdatePayload {
                id: profile.id,
                full_name: Some(input.full_name.trim().to_string()),
                avatar_url,
            })
            .await?;

        tracing::info!("Profile updated successfully for user: {}", input.user_id);

        Ok(UpdateProfileOutput { profile })
    }

    async fn upload_avatar(&self, input: UploadAvatarInput) -> Result<UploadAvatarOutput, AppError> {
        let url = self.store_avatar(input.user_id, input.avatar).await?;

        tracing::info!("Avatar uploaded for user: {}", input.user_id);

        Ok(UploadAvatarOutput { url })
    }
}
