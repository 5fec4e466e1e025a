use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::{
    dto::settings_dto::{DisplaySettingsPayload, SaveApiSettingsPayload, SettingsResponse},
    error::Result,
    AppState,
};

#[utoipa::path(
    get,
    path = "/api/settings",
    responses(
        (status = 200, description = "Current options, key masked", body = SettingsResponse)
    )
)]
#[axum::debug_handler]
pub async fn get_settings(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let options = state.settings_service.get().await?;
    Ok(Json(SettingsResponse::from(options)))
}

#[utoipa::path(
    put,
    path = "/api/settings/api",
    request_body = SaveApiSettingsPayload,
    responses(
        (status = 200, description = "API settings saved", body = SettingsResponse),
        (status = 400, description = "Missing or invalid API settings")
    )
)]
#[axum::debug_handler]
pub async fn save_api_settings(
    State(state): State<AppState>,
    Json(payload): Json<SaveApiSettingsPayload>,
) -> Result<impl IntoResponse> {
    let options = state.settings_service.save_api_settings(payload).await?;
    Ok(Json(SettingsResponse::from(options)))
}

#[utoipa::path(
    put,
    path = "/api/settings/display",
    request_body = DisplaySettingsPayload,
    responses(
        (status = 200, description = "Display settings saved", body = SettingsResponse),
        (status = 400, description = "Invalid display settings")
    )
)]
#[axum::debug_handler]
pub async fn update_display_settings(
    State(state): State<AppState>,
    Json(payload): Json<DisplaySettingsPayload>,
) -> Result<impl IntoResponse> {
    let options = state.settings_service.update_display_settings(payload).await?;
    Ok(Json(SettingsResponse::from(options)))
}
