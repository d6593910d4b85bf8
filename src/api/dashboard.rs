use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Extension, Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use crate::api::auth::Credentials;
use crate::app_state::AppState;
use crate::db::models::requests::NewServiceRequest;
use crate::db::queries::requests::xlsx_attachment;
use crate::errors::RepositoryError;
use crate::middleware::auth::{session_cookie, session_cookie_removal};
use crate::services::auth_service::Claims;
use crate::utils::api_response::ApiResponse;
use crate::utils::auth_errors::auth_error_message;
use crate::views::{DashboardPage, FormState, LoginPage};

fn html(status: StatusCode, rendered: Result<String, tera::Error>) -> Response {
    match rendered {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => {
            error!(error = ?e, "Template rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Html("Internal Server Error".to_string()))
                .into_response()
        }
    }
}

async fn index() -> Redirect {
    Redirect::to("/dashboard")
}

async fn login_page(State(state): State<AppState>) -> Response {
    html(StatusCode::OK, state.templates.render_login(&LoginPage::default()))
}

/// Form sign-in. Failures re-render the page with the classified message.
async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(credentials): Form<Credentials>,
) -> Response {
    match state.auth.sign_in(&credentials.email, &credentials.password).await {
        Ok(session) => (jar.add(session_cookie(session.token)), Redirect::to("/dashboard"))
            .into_response(),
        Err(e) => {
            let page = LoginPage {
                signed_in: false,
                email: credentials.email,
                error: Some(auth_error_message(&e)),
            };
            html(e.status(), state.templates.render_login(&page))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    form: Option<String>,
}

async fn dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let snapshot = state.list_view.refresh().await;
    let form = FormState {
        open: query.form.as_deref() == Some("open"),
        ..Default::default()
    };
    let page = DashboardPage::build(&state.list_view, &snapshot, claims.email, form);
    html(StatusCode::OK, state.templates.render_dashboard(&page))
}

/// Creation form. Success closes the form and reloads; a failure keeps the
/// form open with the entered values.
async fn submit_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Form(values): Form<NewServiceRequest>,
) -> Response {
    let err = match state.list_view.submit(&values).await {
        Ok(()) => return Redirect::to("/dashboard").into_response(),
        Err(e) => e,
    };

    let (status, message) = match &err {
        RepositoryError::Validation(v) => (StatusCode::UNPROCESSABLE_ENTITY, v.to_string()),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Could not save the request. Please try again.".to_string(),
        ),
    };
    let snapshot = state.list_view.snapshot().await;
    let form = FormState {
        open: true,
        values,
        error: Some(message),
    };
    let page = DashboardPage::build(&state.list_view, &snapshot, claims.email, form);
    html(status, state.templates.render_dashboard(&page))
}

/// "Complete" button. Every outcome lands back on the list; failures are
/// already logged by the list view.
async fn complete(State(state): State<AppState>, Path(request_id): Path<Uuid>) -> Redirect {
    let _ = state.list_view.mark_completed(request_id).await;
    Redirect::to("/dashboard")
}

async fn export(State(state): State<AppState>) -> Response {
    match state.list_view.export().await {
        Ok(bytes) => xlsx_attachment(bytes),
        Err(e) => {
            error!(error = %e, "Error exporting requests");
            ApiResponse::<()>::from(e).into_response()
        }
    }
}

async fn logout(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    state.auth.sign_out(&claims);
    (jar.remove(session_cookie_removal()), Redirect::to("/login"))
}

/// Pages reachable without a session.
pub fn public_page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/login", get(login_page).post(login_submit))
}

/// Pages behind the session cookie.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/dashboard/requests", post(submit_request))
        .route("/dashboard/requests/{request_id}/complete", post(complete))
        .route("/dashboard/export", get(export))
        .route("/logout", post(logout))
}
