use app_core::error::AppError;
use app_core::jwt::Claims;
use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::inbound::state::ProfileState;

/// Rejects tokens whose session was ended by sign-out. Must run after
/// `app_core::middleware::auth`, which puts the [`Claims`] in place.
pub async fn require_active_session(
    State(state): State<ProfileState>,
    claims: Claims,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if !state.session.is_active(&claims.jti).await? {
        tracing::warn!(user_id = %claims.sub, "Request with a signed-out session");
        return Err(AppError::SessionRequired {
            message: "Session has ended".to_string(),
            redirect_to: state.login_route(),
        });
    }

    Ok(next.run(req).await)
}
