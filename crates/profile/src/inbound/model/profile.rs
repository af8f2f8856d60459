use app_core::error::AppError;
use axum::extract::Multipart;
use serde::Serialize;

use crate::domain::entity::profile::Profile;
use crate::domain::inout::prelude::AvatarFile;
use crate::domain::view::ProfileView;

const FIELD_FULL_NAME: &str = "full_name";
const FIELD_AVATAR: &str = "avatar";
const FIELD_FILE: &str = "file";
const FIELD_USER_ID: &str = "userId";

/// Reads a file part. Browsers send an empty, unnamed part when no file
/// was picked; that counts as no file.
async fn read_file(field: axum::extract::multipart::Field<'_>, fallback_name: &str) -> Result<Option<AvatarFile>, AppError> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let data = field.bytes().await?.to_vec();

    if file_name.is_empty() && data.is_empty() {
        return Ok(None);
    }

    let file_name = if file_name.is_empty() { fallback_name.to_string() } else { file_name };
    Ok(Some(AvatarFile { file_name, data }))
}

// ╔════════════════════════════╗
// ║    Profile                 ║
// ╚════════════════════════════╝

#[derive(Serialize)]
pub struct ProfileViewResponse {
    pub display_name: String,
    pub avatar_url: String,
    pub uid: String,
    pub tokens_label: String,
    pub token_percentage: f64,
    pub quota_label: String,
    pub plan_label: String,
    pub is_premium: bool,
    pub joined_label: String,
    pub provider_label: String,
}

impl From<ProfileView> for ProfileViewResponse {
    fn from(view: ProfileView) -> Self {
        Self {
            display_name: view.display_name,
            avatar_url: view.avatar_url,
            uid: view.uid,
            tokens_label: view.tokens_label,
            token_percentage: view.token_percentage,
            quota_label: view.quota_label,
            plan_label: view.plan_label,
            is_premium: view.is_premium,
            joined_label: view.joined_label,
            provider_label: view.provider_label,
        }
    }
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub tokens: i64,
    pub subscription_plan: String,
    pub provider: String,
    pub created_at: String,
    pub view: ProfileViewResponse,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        let view = ProfileView::from(&profile).into();

        Self {
            id: profile.id.to_string(),
            email: profile.email,
            full_name: profile.full_name,
            avatar_url: profile.avatar_url,
            tokens: profile.tokens,
            subscription_plan: profile.subscription_plan,
            provider: profile.provider,
            created_at: profile.created_at.to_rfc3339(),
            view,
        }
    }
}

// ╔════════════════════════════╗
// ║    Update Profile          ║
// ╚════════════════════════════╝

pub struct UpdateProfileRequest {
    pub full_name: String,
    pub avatar: Option<AvatarFile>,
}

impl UpdateProfileRequest {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut full_name = String::new();
        let mut avatar = None;

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                FIELD_FULL_NAME => {
                    full_name = field.text().await?;
                },
                FIELD_AVATAR => {
                    avatar = read_file(field, FIELD_AVATAR).await?;
                },
                _ => (),
            }
        }

        Ok(Self { full_name, avatar })
    }
}

// ╔════════════════════════════╗
// ║    Upload Avatar           ║
// ╚════════════════════════════╝

pub struct UploadAvatarRequest {
    pub file: Option<AvatarFile>,
    pub user_id: Option<String>,
}

impl UploadAvatarRequest {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut file = None;
        let mut user_id = None;

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                FIELD_FILE => {
                    file = read_file(field, FIELD_FILE).await?;
                },
                FIELD_USER_ID => {
                    user_id = Some(field.text().await?);
                },
                _ => (),
            }
        }

        Ok(Self { file, user_id })
    }
}

#[derive(Serialize)]
pub struct UploadAvatarResponse {
    pub url: String,
}
