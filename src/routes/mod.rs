pub mod health;
pub mod settings;
pub mod sync;
pub mod vacancy;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/sync", post(sync::sync_now))
        .route("/api/sync/status", get(sync::get_status))
        .route("/api/sync/test", post(sync::test_connection))
        .route("/api/sync/test-and-sync", post(sync::test_and_sync))
        .route("/api/settings", get(settings::get_settings))
        .route("/api/settings/api", put(settings::save_api_settings))
        .route("/api/settings/display", put(settings::update_display_settings))
        .route("/api/vacancies", get(vacancy::list_vacancies))
        .with_state(state)
}
