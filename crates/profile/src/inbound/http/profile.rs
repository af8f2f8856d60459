use app_core::error::AppError;
use app_core::extractors::AppMultipart;
use app_core::jwt::Claims;
use app_core::response::Response;
use axum::debug_handler;
use axum::extract::State;
use axum::response::IntoResponse;
use uuid::Uuid;

use crate::domain::entity::profile::SessionUser;
use crate::domain::inout::prelude::*;
use crate::inbound::model::prelude::*;
use crate::inbound::state::ProfileState;

const PROFILE_CREATED_MSG: &str = "Profile created";
const PROFILE_UPDATED_MSG: &str = "Profile updated successfully";
const UPLOAD_FORBIDDEN_MSG: &str = "Cannot upload a picture for another user";

#[debug_handler]
pub async fn get_profile(State(state): State<ProfileState>, claims: Claims) -> impl IntoResponse {
    state
        .profile
        .resolve_profile(ResolveProfileInput { user: SessionUser::from(claims) })
        .await
        .map(|output| {
            let response = ProfileResponse::from(output.profile);
            if output.created { Response::with_message(response, PROFILE_CREATED_MSG) } else { Response::from(response) }
        })
}

#[debug_handler]
pub async fn update_profile(
    State(state): State<ProfileState>,
    claims: Claims,
    AppMultipart(multipart): AppMultipart,
) -> Result<Response<ProfileResponse>, AppError> {
    let req = UpdateProfileRequest::from_multipart(multipart).await?;

    state
        .profile
        .update_profile(UpdateProfileInput { user_id: claims.sub, full_name: req.full_name, avatar: req.avatar })
        .await
        .map(|output| Response::with_message(ProfileResponse::from(output.profile), PROFILE_UPDATED_MSG))
}

#[debug_handler]
pub async fn upload_profile_picture(
    State(state): State<ProfileState>,
    claims: Claims,
    AppMultipart(multipart): AppMultipart,
) -> Result<Response<UploadAvatarResponse>, AppError> {
    let req = UploadAvatarRequest::from_multipart(multipart).await?;

    let avatar = req.file.ok_or_else(|| AppError::ValidationStr("No file provided".to_string()))?;
    let user_id = req
        .user_id
        .ok_or_else(|| AppError::ValidationStr("Missing userId".to_string()))?
        .parse::<Uuid>()
        .map_err(|_| AppError::RequestFormat("userId must be a UUID".to_string()))?;

    if user_id != claims.sub {
        tracing::warn!(session_user = %claims.sub, requested_user = %user_id, "Rejected upload for another user");
        return Err(AppError::Forbidden(UPLOAD_FORBIDDEN_MSG.to_string()));
    }

    state
        .profile
        .upload_avatar(UploadAvatarInput { user_id, avatar })
        .await
        .map(|output| UploadAvatarResponse { url: output.url })
        .map(Response::from)
}
