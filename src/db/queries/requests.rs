use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::models::requests::{NewServiceRequest, ServiceRequest, ServiceStatus, StatusUpdate};
use crate::services::export::{EXPORT_FILE_NAME, XLSX_CONTENT_TYPE};
use crate::services::list_view::TransitionOutcome;
use crate::utils::api_response::ApiResponse;

#[utoipa::path(
    get,
    path = "/requests",
    responses(
        (status = 200, description = "All service requests, newest first", body = Vec<ServiceRequest>),
        (status = 500, description = "Failed to retrieve requests")
    ),
    tag = "Requests",
    security(("bearerAuth" = []))
)]
pub async fn list_requests(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<ServiceRequest>>, ApiResponse<()>> {
    let snapshot = state.list_view.refresh().await;
    if snapshot.stale {
        return Err(ApiResponse::<()>::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to retrieve requests",
            Some(json!({ "refreshed_at": snapshot.refreshed_at })),
        ));
    }
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Service requests retrieved",
        snapshot.requests,
    ))
}

#[utoipa::path(
    post,
    path = "/requests",
    request_body = NewServiceRequest,
    responses(
        (status = 201, description = "Service request created"),
        (status = 422, description = "A required field is missing or the date is invalid"),
        (status = 500, description = "Failed to insert service request")
    ),
    tag = "Requests",
    security(("bearerAuth" = []))
)]
pub async fn create_request(
    State(state): State<AppState>,
    Json(payload): Json<NewServiceRequest>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    state.list_view.submit(&payload).await?;
    Ok(ApiResponse::success(StatusCode::CREATED, "Service request created", ()))
}

#[utoipa::path(
    get,
    path = "/requests/{request_id}",
    params(
        ("request_id" = Uuid, Path, description = "Service request ID")
    ),
    responses(
        (status = 200, description = "Service request retrieved", body = ServiceRequest),
        (status = 404, description = "Service request not found")
    ),
    tag = "Requests",
    security(("bearerAuth" = []))
)]
pub async fn get_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> Result<ApiResponse<ServiceRequest>, ApiResponse<()>> {
    let request = state.requests.get(request_id).await.map_err(|e| {
        error!(request_id = %request_id, error = %e, "Error fetching request");
        ApiResponse::<()>::from(e)
    })?;
    Ok(ApiResponse::success(StatusCode::OK, "Service request retrieved", request))
}

fn outcome_response(outcome: TransitionOutcome) -> ApiResponse<serde_json::Value> {
    match outcome {
        TransitionOutcome::Applied => ApiResponse::success(
            StatusCode::OK,
            "Status updated",
            json!({ "applied": true }),
        ),
        TransitionOutcome::NotOffered => ApiResponse::success(
            StatusCode::OK,
            "Request is not pending; nothing to complete",
            json!({ "applied": false }),
        ),
        TransitionOutcome::AlreadyInFlight => ApiResponse::success(
            StatusCode::ACCEPTED,
            "A status update for this request is already running",
            json!({ "applied": false }),
        ),
    }
}

#[utoipa::path(
    patch,
    path = "/requests/{request_id}/status",
    params(
        ("request_id" = Uuid, Path, description = "Service request ID")
    ),
    request_body = StatusUpdate,
    responses(
        (status = 200, description = "Status written"),
        (status = 202, description = "Another update for this request is in flight"),
        (status = 404, description = "Service request not found"),
        (status = 409, description = "Transition rejected by the strict policy"),
        (status = 500, description = "Failed to update status")
    ),
    tag = "Requests",
    security(("bearerAuth" = []))
)]
pub async fn update_status(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    Json(update): Json<StatusUpdate>,
) -> Result<ApiResponse<serde_json::Value>, ApiResponse<()>> {
    let outcome = state.list_view.transition(request_id, update.status).await?;
    Ok(outcome_response(outcome))
}

#[utoipa::path(
    post,
    path = "/requests/{request_id}/complete",
    params(
        ("request_id" = Uuid, Path, description = "Service request ID")
    ),
    responses(
        (status = 200, description = "Marked completed, or not pending in the displayed list"),
        (status = 202, description = "Another update for this request is in flight"),
        (status = 500, description = "Failed to update status")
    ),
    tag = "Requests",
    security(("bearerAuth" = []))
)]
pub async fn complete_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> Result<ApiResponse<serde_json::Value>, ApiResponse<()>> {
    let outcome = state.list_view.mark_completed(request_id).await?;
    Ok(outcome_response(outcome))
}

/// Workbook of the displayed collection as an attachment.
pub fn xlsx_attachment(bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/requests/export",
    responses(
        (status = 200, description = "service-requests.xlsx built from the last listed collection",
         content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 500, description = "Failed to build export")
    ),
    tag = "Requests",
    security(("bearerAuth" = []))
)]
pub async fn export_requests(State(state): State<AppState>) -> Result<Response, ApiResponse<()>> {
    let bytes = state.list_view.export().await.map_err(|e| {
        error!(error = %e, "Error exporting requests");
        ApiResponse::<()>::from(e)
    })?;
    Ok(xlsx_attachment(bytes))
}

use utoipa::OpenApi;
#[derive(OpenApi)]
#[openapi(
    paths(
        list_requests,
        create_request,
        get_request,
        update_status,
        complete_request,
        export_requests
    ),
    components(schemas(ServiceRequest, NewServiceRequest, ServiceStatus, StatusUpdate)),
    tags(
        (name = "Requests", description = "Endpoints for managing service requests")
    )
)]
pub struct RequestDoc;
