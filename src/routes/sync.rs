use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::warn;

use crate::{
    dto::sync_dto::{
        format_last_sync, SyncOutcomeResponse, SyncStatusResponse, TestAndSyncResponse,
        TestConnectionResponse,
    },
    error::{Error, Result},
    models::options::ApiOverrides,
    AppState,
};

fn failure(err: Error, fallback: &str) -> Response {
    let status = err.status_code();
    let message = if err.is_fatal_to_sync() {
        err.to_string()
    } else {
        fallback.to_string()
    };
    warn!(error = %err, %status, "Sync request failed");
    (
        status,
        Json(SyncOutcomeResponse {
            success: false,
            message,
        }),
    )
        .into_response()
}

/// Optional JSON body; an empty body means "use the saved options".
fn overrides_from(body: Option<Json<ApiOverrides>>) -> ApiOverrides {
    body.map(|Json(o)| o).unwrap_or_default()
}

#[utoipa::path(
    get,
    path = "/api/sync/status",
    responses(
        (status = 200, description = "Current sync status", body = SyncStatusResponse)
    )
)]
#[axum::debug_handler]
pub async fn get_status(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let status = state.sync_service.status().await?;
    Ok(Json(SyncStatusResponse::from(status)))
}

#[utoipa::path(
    post,
    path = "/api/sync",
    responses(
        (status = 200, description = "Sync completed", body = SyncOutcomeResponse),
        (status = 400, description = "API credentials not configured"),
        (status = 409, description = "A sync is already running"),
        (status = 502, description = "Upstream fetch or parse failed")
    )
)]
#[axum::debug_handler]
pub async fn sync_now(State(state): State<AppState>) -> Response {
    match state.sync_service.sync().await {
        Ok(_) => Json(SyncOutcomeResponse {
            success: true,
            message: "Sync completed successfully!".to_string(),
        })
        .into_response(),
        Err(e) => failure(e, "Sync failed. Please check your API configuration."),
    }
}

#[utoipa::path(
    post,
    path = "/api/sync/test",
    request_body = ApiOverrides,
    responses(
        (status = 200, description = "API reachable", body = TestConnectionResponse),
        (status = 400, description = "API credentials not configured"),
        (status = 502, description = "API connection failed")
    )
)]
#[axum::debug_handler]
pub async fn test_connection(
    State(state): State<AppState>,
    body: Option<Json<ApiOverrides>>,
) -> Response {
    let overrides = overrides_from(body);
    match state.sync_service.test_connection(&overrides).await {
        Ok(count) => Json(TestConnectionResponse {
            success: true,
            message: format!("API connection successful! Found {} vacancies.", count),
            vacancy_count: count,
        })
        .into_response(),
        Err(e) => failure(e, "API connection failed."),
    }
}

#[utoipa::path(
    post,
    path = "/api/sync/test-and-sync",
    request_body = ApiOverrides,
    responses(
        (status = 200, description = "Tested and synced", body = TestAndSyncResponse),
        (status = 400, description = "API credentials not configured"),
        (status = 409, description = "A sync is already running"),
        (status = 502, description = "API test or sync failed")
    )
)]
#[axum::debug_handler]
pub async fn test_and_sync(
    State(state): State<AppState>,
    body: Option<Json<ApiOverrides>>,
) -> Response {
    let overrides = overrides_from(body);
    match state.sync_service.test_and_sync(overrides).await {
        Ok(report) => (
            StatusCode::OK,
            Json(TestAndSyncResponse {
                success: true,
                message: report.message,
                upstream_count: report.upstream_count,
                total_vacancies: report.total_vacancies,
                last_sync: format_last_sync(report.last_sync),
            }),
        )
            .into_response(),
        Err(e) => failure(e, "API test successful but sync failed."),
    }
}
