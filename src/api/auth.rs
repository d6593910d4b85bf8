use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::db::models::user::UserInfo;
use crate::middleware::auth::{session_cookie, session_cookie_removal};
use crate::services::auth_service::{Claims, Session};
use crate::utils::api_response::ApiResponse;

/// Email/password pair used by both sign-up and sign-in.
#[derive(Serialize, Debug, Deserialize, ToSchema)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Handles account creation.
///
/// # Returns
/// * `201 Created` - Account created and signed in; the session cookie is set.
/// * `400 Bad Request` - Invalid email or a password shorter than 6 characters.
/// * `409 Conflict` - The email is already registered.
/// * `500 Internal Server Error` - Hashing or database failure.
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "Authentication",
    request_body = Credentials,
    responses(
        (status = 201, description = "Account created", body = Session),
        (status = 400, description = "Invalid email or weak password"),
        (status = 409, description = "Email already registered"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<Credentials>,
) -> Result<(CookieJar, ApiResponse<Session>), ApiResponse<()>> {
    let session = state.auth.sign_up(&payload.email, &payload.password).await?;
    let jar = jar.add(session_cookie(session.token.clone()));
    Ok((
        jar,
        ApiResponse::success(StatusCode::CREATED, "Account created", session),
    ))
}

/// Handles sign-in.
///
/// # Returns
/// * `200 OK` - Returns the session token and sets the session cookie.
/// * `401 Unauthorized` - Unknown email or wrong password.
/// * `500 Internal Server Error` - Database or token generation failure.
#[utoipa::path(
    post,
    path = "/auth/signin",
    tag = "Authentication",
    request_body = Credentials,
    responses(
        (status = 200, description = "Successful sign-in", body = Session),
        (status = 401, description = "Invalid email or password"),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<Credentials>,
) -> Result<(CookieJar, ApiResponse<Session>), ApiResponse<()>> {
    let session = state.auth.sign_in(&payload.email, &payload.password).await?;
    let jar = jar.add(session_cookie(session.token.clone()));
    Ok((
        jar,
        ApiResponse::success(StatusCode::OK, "Signed in", session),
    ))
}

/// Revokes the presented token and clears the session cookie.
#[utoipa::path(
    post,
    path = "/auth/signout",
    tag = "Authentication",
    responses(
        (status = 200, description = "Signed out; data is the account email", body = String),
        (status = 401, description = "Missing or invalid token")
    ),
    security(
        ("bearerAuth" = [])
    )
)]
pub async fn signout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
) -> (CookieJar, ApiResponse<String>) {
    state.auth.sign_out(&claims);
    (
        jar.remove(session_cookie_removal()),
        ApiResponse::success(StatusCode::OK, "Signed out", claims.email),
    )
}

/// Public authentication routes.
///
/// - `POST /auth/signup` → Create an account and sign in.
/// - `POST /auth/signin` → Authenticate and receive a JWT.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/signin", post(signin))
}

/// Authentication routes that need a valid token.
pub fn secure_auth_routes() -> Router<AppState> {
    Router::new().route("/auth/signout", post(signout))
}

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::openapi::Components;
use utoipa::Modify;
use utoipa::OpenApi;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.clone().unwrap_or(Components::default());
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
        openapi.components = Some(components);
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(signup, signin, signout),
    components(schemas(Credentials, Session, UserInfo)),
    tags(
        (name = "Authentication", description = "Email/password session endpoints")
    ),
    modifiers(&SecurityAddon)
)]
pub struct AuthDoc;
