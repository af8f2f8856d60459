use app_core::error::AppError;
use app_core::extractors::AppJson;
use app_core::response::Response;
use axum::debug_handler;
use axum::http::HeaderMap;
use tower_cookies::cookie::{SameSite, time};
use tower_cookies::{Cookie, Cookies};

use crate::domain::entity::theme::Theme;
use crate::inbound::model::prelude::*;

const COOKIE_THEME: &str = "theme";
const HEADER_PREFERS_COLOR_SCHEME: &str = "sec-ch-prefers-color-scheme";

fn prefers_dark(headers: &HeaderMap) -> bool {
    headers
        .get(HEADER_PREFERS_COLOR_SCHEME)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim().trim_matches('"').eq_ignore_ascii_case("dark"))
}

fn theme_response(theme: Theme, headers: &HeaderMap) -> ThemeResponse {
    ThemeResponse { theme: theme.to_string(), active: theme.resolve(prefers_dark(headers)).to_string() }
}

#[debug_handler]
pub async fn get_theme(headers: HeaderMap, cookies: Cookies) -> Response<ThemeResponse> {
    let theme = cookies.get(COOKIE_THEME).and_then(|c| c.value().parse::<Theme>().ok()).unwrap_or_default();

    Response::from(theme_response(theme, &headers))
}

#[debug_handler]
pub async fn put_theme(
    headers: HeaderMap,
    cookies: Cookies,
    AppJson(req): AppJson<ThemeRequest>,
) -> Result<Response<ThemeResponse>, AppError> {
    let theme = req
        .theme
        .parse::<Theme>()
        .map_err(|err| AppError::ValidationStr(format!("Unknown theme: {}", err.0)))?;

    let cookie = Cookie::build((COOKIE_THEME, theme.as_str()))
        .path("/")
        .max_age(time::Duration::days(365))
        .same_site(SameSite::Lax)
        .build();
    cookies.add(cookie);

    Ok(Response::with_message(theme_response(theme, &headers), "Theme saved"))
}
