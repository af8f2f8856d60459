use std::sync::Arc;

use app_core::jwt::TokenManager;
use app_core::middleware::{AuthLayerState, auth};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Router, middleware};

use crate::inbound::guard::require_active_session;
use crate::inbound::http::preference::*;
use crate::inbound::http::profile::*;
use crate::inbound::http::session::*;
use crate::inbound::state::ProfileState;

/// Room for a 5 MiB avatar plus the rest of the multipart form.
const MULTIPART_BODY_LIMIT: usize = 6 * 1024 * 1024;

pub fn create_router(state: ProfileState, tm: Arc<dyn TokenManager>) -> Router {
    let auth_state = AuthLayerState { token: tm, login_route: state.login_route() };

    let protected_routes = Router::new()
        // profile scope
        .route("/me", get(get_profile).patch(update_profile).delete(delete_account))
        .route("/upload/profile-picture", post(upload_profile_picture))
        // session scope
        .route("/auth/logout", post(logout))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_active_session))
        .route_layer(middleware::from_fn_with_state(auth_state, auth))
        .layer(DefaultBodyLimit::max(MULTIPART_BODY_LIMIT));

    let public_routes = Router::new()
        // preference scope
        .route("/preferences/theme", get(get_theme).put(put_theme));

    Router::new().merge(public_routes).merge(protected_routes).with_state(state)
}
