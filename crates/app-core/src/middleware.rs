//! Request-level middleware: bearer-token authentication and access logs.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Request, StatusCode, header};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;

use super::error::AppError;
use super::jwt::{Claims, TokenManager};

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");
const BEARER_PREFIX: &str = "Bearer ";

/// Correlation id of the current request, available to handlers as an
/// extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required.".to_string()))
    }
}

/// Everything the bearer-token middleware needs: the validator and the
/// route an unauthenticated client should be sent to.
#[derive(Clone)]
pub struct AuthLayerState {
    pub token: Arc<dyn TokenManager>,
    pub login_route: String,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
        .filter(|token| !token.is_empty())
}

/// Validates the bearer token and stores its [`Claims`] in the request
/// extensions. Failures become [`AppError::SessionRequired`].
pub async fn auth(State(state): State<AuthLayerState>, mut req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let claims = match bearer_token(req.headers()) {
        Some(token) => state.token.validate_access_token(token).map_err(|err| err.to_string()),
        None => Err("Missing or invalid authorization header".to_string()),
    }
    .map_err(|message| AppError::SessionRequired { message, redirect_to: state.login_route.clone() })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Logs every request inside a span carrying its correlation id, which is
/// taken from `x-request-id` or generated, and echoed on the response.
pub async fn request_response_logger(mut req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    let started = Instant::now();
    let request_id = req
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        uri = %req.uri(),
        version = ?req.version(),
    );
    req.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = async move {
        tracing::info!("Incoming request");
        next.run(req).await
    }
    .instrument(span.clone())
    .await;

    let status = response.status();
    let duration_ms = started.elapsed().as_millis();
    span.in_scope(|| match status {
        s if s.is_server_error() => tracing::error!(%status, duration_ms, "Request failed"),
        s if s.is_client_error() => tracing::warn!(%status, duration_ms, "Request rejected"),
        _ => tracing::info!(%status, duration_ms, "Request completed"),
    });

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    Ok(response)
}
