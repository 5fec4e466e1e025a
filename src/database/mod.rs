//! Storage seams for the sync engine.
//!
//! The engine only talks to [`VacancyRepository`] and [`OptionsStore`]; the
//! postgres implementations back the running service and the in-memory ones
//! back local development and tests.

pub mod memory;
pub mod options_repository;
pub mod pool;
pub mod vacancy_repository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::Config;
use crate::error::Result;
use crate::models::options::PluginOptions;
use crate::models::vacancy::{Vacancy, VacancyFields};

#[async_trait]
pub trait VacancyRepository: Send + Sync {
    /// `(reference, id)` for every record that carries a reference, whatever
    /// its status, ordered by reference.
    async fn list_references(&self) -> Result<Vec<(String, Uuid)>>;

    async fn create(&self, fields: VacancyFields) -> Result<Vacancy>;

    /// Fails with `Error::NotFound` when no record has this id.
    async fn update(&self, id: Uuid, fields: VacancyFields) -> Result<Vacancy>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    async fn count_by_status(&self, status: &str) -> Result<i64>;

    /// Newest published records first, by posted date then creation time.
    async fn list_published(&self, limit: i64) -> Result<Vec<Vacancy>>;
}

#[async_trait]
pub trait OptionsStore: Send + Sync {
    async fn load_options(&self) -> Result<Option<PluginOptions>>;

    async fn save_options(&self, options: &PluginOptions) -> Result<()>;

    async fn last_sync(&self) -> Result<Option<DateTime<Utc>>>;

    async fn set_last_sync(&self, at: DateTime<Utc>) -> Result<()>;
}

/// Writes the default options blob, plus any credentials supplied through
/// the environment, when nothing has been stored yet.
pub async fn seed_options(store: &dyn OptionsStore, config: &Config) -> Result<PluginOptions> {
    if let Some(existing) = store.load_options().await? {
        return Ok(existing);
    }

    let mut options = PluginOptions::default();
    if let Some(base_url) = &config.seed_api_base_url {
        options.api_base_url = base_url.clone();
    }
    if let Some(key) = &config.seed_api_subscription_key {
        options.api_subscription_key = key.clone();
    }
    if let Some(ukprn) = &config.seed_api_ukprn {
        options.api_ukprn = ukprn.clone();
    }

    store.save_options(&options).await?;
    tracing::info!(
        configured = options.is_configured(),
        "Seeded plugin options with defaults"
    );
    Ok(options)
}
