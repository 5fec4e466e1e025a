pub mod apprenticeship_api;
pub mod settings_service;
pub mod snapshot_cache;
pub mod sync_service;
pub mod vacancy_service;
