//! Process-local stores for `STORAGE_BACKEND=memory` and tests.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{OptionsStore, VacancyRepository};
use crate::error::{Error, Result};
use crate::models::options::PluginOptions;
use crate::models::vacancy::{Vacancy, VacancyFields, STATUS_PUBLISHED};

#[derive(Default)]
pub struct InMemoryVacancyRepository {
    rows: RwLock<BTreeMap<Uuid, Vacancy>>,
    rejected_references: RwLock<HashSet<String>>,
}

impl InMemoryVacancyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every create or update carrying `reference` fail with a
    /// persistence error.
    pub async fn reject_reference(&self, reference: impl Into<String>) {
        self.rejected_references.write().await.insert(reference.into());
    }

    pub async fn insert(&self, vacancy: Vacancy) {
        self.rows.write().await.insert(vacancy.id, vacancy);
    }

    pub async fn all(&self) -> Vec<Vacancy> {
        self.rows.read().await.values().cloned().collect()
    }

    pub async fn find_by_reference(&self, reference: &str) -> Option<Vacancy> {
        self.rows
            .read()
            .await
            .values()
            .find(|v| v.reference.as_deref() == Some(reference))
            .cloned()
    }

    async fn check_rejected(&self, fields: &VacancyFields) -> Result<()> {
        if let Some(reference) = &fields.reference {
            if self.rejected_references.read().await.contains(reference) {
                return Err(Error::Persistence(format!(
                    "write rejected for reference {}",
                    reference
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl VacancyRepository for InMemoryVacancyRepository {
    async fn list_references(&self) -> Result<Vec<(String, Uuid)>> {
        let mut refs: Vec<(String, Uuid)> = self
            .rows
            .read()
            .await
            .values()
            .filter_map(|v| {
                v.reference
                    .as_ref()
                    .filter(|r| !r.is_empty())
                    .map(|r| (r.clone(), v.id))
            })
            .collect();
        refs.sort();
        Ok(refs)
    }

    async fn create(&self, fields: VacancyFields) -> Result<Vacancy> {
        self.check_rejected(&fields).await?;

        let mut rows = self.rows.write().await;
        if let Some(reference) = &fields.reference {
            if rows.values().any(|v| v.reference.as_ref() == Some(reference)) {
                return Err(Error::Persistence(format!(
                    "duplicate reference {}",
                    reference
                )));
            }
        }

        let vacancy = Vacancy::from_fields(Uuid::new_v4(), fields, Utc::now());
        rows.insert(vacancy.id, vacancy.clone());
        Ok(vacancy)
    }

    async fn update(&self, id: Uuid, fields: VacancyFields) -> Result<Vacancy> {
        self.check_rejected(&fields).await?;

        let mut rows = self.rows.write().await;
        let vacancy = rows
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Vacancy {} not found", id)))?;
        vacancy.apply(fields, Utc::now());
        Ok(vacancy.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }

    async fn count_by_status(&self, status: &str) -> Result<i64> {
        let count = self
            .rows
            .read()
            .await
            .values()
            .filter(|v| v.status == status)
            .count();
        Ok(count as i64)
    }

    async fn list_published(&self, limit: i64) -> Result<Vec<Vacancy>> {
        let limit: usize = if limit <= 0 { 10 } else { limit.min(100) as usize };
        let mut items: Vec<Vacancy> = self
            .rows
            .read()
            .await
            .values()
            .filter(|v| v.status == STATUS_PUBLISHED)
            .cloned()
            .collect();

        items.sort_by(|a, b| {
            let by_posted = match (&a.posted_date, &b.posted_date) {
                (Some(x), Some(y)) => y.cmp(x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            by_posted.then_with(|| b.created_at.cmp(&a.created_at))
        });
        items.truncate(limit);
        Ok(items)
    }
}

#[derive(Default)]
pub struct InMemoryOptionsStore {
    options: RwLock<Option<PluginOptions>>,
    last_sync: RwLock<Option<DateTime<Utc>>>,
}

impl InMemoryOptionsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: PluginOptions) -> Self {
        Self {
            options: RwLock::new(Some(options)),
            last_sync: RwLock::new(None),
        }
    }
}

#[async_trait]
impl OptionsStore for InMemoryOptionsStore {
    async fn load_options(&self) -> Result<Option<PluginOptions>> {
        Ok(self.options.read().await.clone())
    }

    async fn save_options(&self, options: &PluginOptions) -> Result<()> {
        *self.options.write().await = Some(options.clone());
        Ok(())
    }

    async fn last_sync(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(*self.last_sync.read().await)
    }

    async fn set_last_sync(&self, at: DateTime<Utc>) -> Result<()> {
        *self.last_sync.write().await = Some(at);
        Ok(())
    }
}
