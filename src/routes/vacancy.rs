use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use crate::{error::Result, AppState};

#[utoipa::path(
    get,
    path = "/api/vacancies",
    responses(
        (status = 200, description = "Published vacancies shaped by the display settings", body = VacancyListingResponse)
    )
)]
#[axum::debug_handler]
pub async fn list_vacancies(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let listing = state.vacancy_service.list_for_display().await?;
    Ok(Json(listing))
}
