pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod scheduler;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::database::{OptionsStore, VacancyRepository};
use crate::services::{
    apprenticeship_api::VacancyFeed, settings_service::SettingsService,
    snapshot_cache::SnapshotCache, sync_service::SyncService, vacancy_service::VacancyService,
};

#[derive(Clone)]
pub struct AppState {
    pub sync_service: SyncService,
    pub settings_service: SettingsService,
    pub vacancy_service: VacancyService,
}

impl AppState {
    pub fn new(
        vacancies: Arc<dyn VacancyRepository>,
        options: Arc<dyn OptionsStore>,
        feed: Arc<dyn VacancyFeed>,
        cache: SnapshotCache,
    ) -> Self {
        let sync_service = SyncService::new(vacancies.clone(), options.clone(), feed, cache);
        let settings_service = SettingsService::new(options.clone());
        let vacancy_service = VacancyService::new(vacancies, options);

        Self {
            sync_service,
            settings_service,
            vacancy_service,
        }
    }
}
