use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::json;
use tracing::warn;

use crate::app_state::AppState;
use crate::errors::AuthError;
use crate::services::auth_service::Claims;
use crate::utils::api_response::ApiResponse;

pub const SESSION_COOKIE: &str = "session";

/// Bearer header first, then the session cookie.
fn extract_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.to_string())
        .or_else(|| jar.get(SESSION_COOKIE).map(|c| c.value().to_string()))
}

fn authenticate(state: &AppState, headers: &HeaderMap, jar: &CookieJar) -> Result<Claims, AuthError> {
    let token = extract_token(headers, jar)
        .ok_or_else(|| AuthError::unauthorized("Missing session token"))?;
    state.auth.verify(&token)
}

/// Browser-session cookie carrying a freshly issued token; the JWT `exp`
/// bounds its lifetime.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Matches `session_cookie` so `CookieJar::remove` clears it.
pub fn session_cookie_removal() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

/// **JWT Middleware** for the JSON API; rejects with a 401 envelope.
pub async fn jwt_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let claims = authenticate(&state, req.headers(), &jar).map_err(|e| {
        warn!(path = %req.uri().path(), "Rejected API request: {}", e);
        ApiResponse::<()>::error(
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            Some(json!({ "error": e.message })),
        )
        .into_response()
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// **Session Middleware** for dashboard pages; redirects to the login page.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let claims = authenticate(&state, req.headers(), &jar).map_err(|e| {
        warn!(path = %req.uri().path(), "Redirecting to login: {}", e);
        Redirect::to("/login").into_response()
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
