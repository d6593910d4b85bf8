use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::app_state::AppState;
use crate::db::queries::requests::*;

pub fn request_routes() -> Router<AppState> {
    Router::new()
        .route("/requests", post(create_request))
        .route("/requests", get(list_requests))
        .route("/requests/export", get(export_requests))
        .route("/requests/{request_id}", get(get_request))
        .route("/requests/{request_id}/status", patch(update_status))
        .route("/requests/{request_id}/complete", post(complete_request))
}
