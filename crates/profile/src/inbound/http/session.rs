use app_core::jwt::Claims;
use app_core::response::Response;
use axum::debug_handler;
use axum::extract::State;
use axum::response::IntoResponse;

use crate::domain::inout::prelude::*;
use crate::inbound::model::prelude::*;
use crate::inbound::state::ProfileState;

#[debug_handler]
pub async fn logout(State(state): State<ProfileState>, claims: Claims) -> impl IntoResponse {
    state
        .session
        .logout(LogoutInput { user_id: claims.sub, jti: claims.jti, exp: claims.exp })
        .await
        .map(|output| LogoutResponse { redirect_to: output.redirect_to })
        .map(|res| Response::with_message(res, "Signed out"))
}

#[debug_handler]
pub async fn delete_account(State(state): State<ProfileState>, claims: Claims) -> impl IntoResponse {
    state
        .session
        .delete_account(DeleteAccountInput { user_id: claims.sub, jti: claims.jti, exp: claims.exp })
        .await
        .map(|output| DeleteAccountResponse { profile_removed: output.profile_removed, redirect_to: output.redirect_to })
        .map(|res| Response::with_message(res, "Account deletion processed"))
}
