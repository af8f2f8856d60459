use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::super::entity::profile::{Profile, SessionUser};

pub const INVALID_NAME_MSG: &str = "Please enter a valid name.";

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some(INVALID_NAME_MSG.into());
        return Err(err);
    }
    Ok(())
}

/// An uploaded image as received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarFile {
    pub file_name: String,
    pub data: Vec<u8>,
}

// ╔════════════════════════════╗
// ║      Resolve Profile       ║
// ╚════════════════════════════╝

#[derive(Debug)]
pub struct ResolveProfileInput {
    pub user: SessionUser,
}

#[derive(Debug)]
pub struct ResolveProfileOutput {
    pub profile: Profile,
    pub created: bool,
}

// ╔════════════════════════════╗
// ║      Update Profile        ║
// ╚════════════════════════════╝

#[derive(Debug, Validate)]
pub struct UpdateProfileInput {
    pub user_id: Uuid,

    #[validate(custom(function = "not_blank"))]
    pub full_name: String,

    pub avatar: Option<AvatarFile>,
}

#[derive(Debug)]
pub struct UpdateProfileOutput {
    pub profile: Profile,
}

// ╔════════════════════════════╗
// ║       Upload Avatar        ║
// ╚════════════════════════════╝

#[derive(Debug)]
pub struct UploadAvatarInput {
    pub user_id: Uuid,
    pub avatar: AvatarFile,
}

#[derive(Debug)]
pub struct UploadAvatarOutput {
    pub url: String,
}
