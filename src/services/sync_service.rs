use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::database::{OptionsStore, VacancyRepository};
use crate::dto::api_dto::ApiVacancy;
use crate::error::{Error, Result};
use crate::models::options::{ApiOverrides, PluginOptions, SyncStatus};
use crate::models::vacancy::{VacancyFields, STATUS_PUBLISHED};
use crate::services::apprenticeship_api::VacancyFeed;
use crate::services::snapshot_cache::{ReferenceSnapshot, SnapshotCache};

/// Per-pass counters, logged at the end of every sync.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SyncReport {
    pub fetched: usize,
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestAndSyncReport {
    pub message: String,
    pub upstream_count: usize,
    pub total_vacancies: i64,
    pub last_sync: Option<DateTime<Utc>>,
}

/// Decodes listing entries one by one. Entries that are not vacancy objects
/// are logged and counted as skipped.
fn decode_entries(entries: Vec<JsonValue>, report: &mut SyncReport) -> Vec<ApiVacancy> {
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match ApiVacancy::from_value(entry) {
            Ok(vacancy) => Some(vacancy),
            Err(e) => {
                warn!(index, error = %e, "Skipping undecodable vacancy entry");
                report.skipped += 1;
                None
            }
        })
        .collect()
}

/// Mirrors the upstream vacancy feed into the local repository.
#[derive(Clone)]
pub struct SyncService {
    vacancies: Arc<dyn VacancyRepository>,
    options: Arc<dyn OptionsStore>,
    feed: Arc<dyn VacancyFeed>,
    cache: SnapshotCache,
    pending_overrides: Arc<Mutex<Option<ApiOverrides>>>,
    running: Arc<tokio::sync::Mutex<()>>,
}

impl SyncService {
    pub fn new(
        vacancies: Arc<dyn VacancyRepository>,
        options: Arc<dyn OptionsStore>,
        feed: Arc<dyn VacancyFeed>,
        cache: SnapshotCache,
    ) -> Self {
        Self {
            vacancies,
            options,
            feed,
            cache,
            pending_overrides: Arc::new(Mutex::new(None)),
            running: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Applies `overrides` to the next sync pass only. Nothing is persisted.
    pub fn override_config(&self, overrides: ApiOverrides) {
        let mut pending = self
            .pending_overrides
            .lock()
            .unwrap_or_else(|p| p.into_inner());
        let merged = match pending.take() {
            Some(existing) => existing.layered_with(overrides),
            None => overrides,
        };
        *pending = Some(merged);
    }

    fn take_overrides(&self) -> Option<ApiOverrides> {
        self.pending_overrides
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take()
    }

    pub async fn current_options(&self) -> Result<PluginOptions> {
        Ok(self.options.load_options().await?.unwrap_or_default())
    }

    async fn resolve_options(&self, overrides: Option<&ApiOverrides>) -> Result<PluginOptions> {
        let saved = self.current_options().await?;
        let options = match overrides {
            Some(overrides) => saved.merged_with(overrides),
            None => saved,
        };
        if !options.has_credentials() {
            return Err(Error::Config("API credentials not configured.".to_string()));
        }
        Ok(options)
    }

    /// Runs one complete fetch, reconcile and persist pass.
    pub async fn sync(&self) -> Result<SyncReport> {
        self.run_pass(None).await
    }

    #[instrument(skip_all)]
    async fn run_pass(&self, explicit_overrides: Option<ApiOverrides>) -> Result<SyncReport> {
        let _guard = self.running.try_lock().map_err(|_| {
            warn!("Sync requested while another pass is running");
            Error::SyncInProgress
        })?;

        let overrides = explicit_overrides.or_else(|| self.take_overrides());
        let options = self.resolve_options(overrides.as_ref()).await.map_err(|e| {
            warn!(error = %e, "Sync aborted before fetching");
            e
        })?;

        let snapshot = self.reference_snapshot().await?;
        debug!(existing = snapshot.len(), "Loaded reference snapshot");

        let page = self.feed.fetch_page(&options.api_settings()).await.map_err(|e| {
            error!(error = %e, "Vacancy fetch failed, leaving stored vacancies untouched");
            e
        })?;
        let entries = page.vacancies.ok_or_else(|| {
            error!("Vacancy response has no vacancies array");
            Error::Parse("API response does not contain expected data".to_string())
        })?;

        let mut report = SyncReport {
            fetched: entries.len(),
            ..Default::default()
        };
        let vacancies = decode_entries(entries, &mut report);
        let (mut remaining, mut current, seen) =
            self.reconcile(snapshot, vacancies, &mut report).await;
        self.delete_stale(&mut remaining, &seen, &mut current, &mut report)
            .await;

        // Cache follows the repository before anything below can return early.
        if report.failed == 0 {
            self.cache.put(current);
        } else {
            self.cache.invalidate();
        }

        let finished_at = Utc::now();
        self.options.set_last_sync(finished_at).await?;

        info!(
            upstream_total = ?page.total,
            fetched = report.fetched,
            created = report.created,
            updated = report.updated,
            deleted = report.deleted,
            skipped = report.skipped,
            failed = report.failed,
            "Vacancy sync completed"
        );
        Ok(report)
    }

    async fn reference_snapshot(&self) -> Result<ReferenceSnapshot> {
        if let Some(cached) = self.cache.get() {
            return Ok(cached);
        }
        let snapshot: ReferenceSnapshot = self
            .vacancies
            .list_references()
            .await?
            .into_iter()
            .collect();
        self.cache.put(snapshot.clone());
        Ok(snapshot)
    }

    /// Upserts every referenced vacancy. Returns the snapshot entries that
    /// were not matched, the post-pass mapping and the references seen.
    async fn reconcile(
        &self,
        mut remaining: ReferenceSnapshot,
        vacancies: Vec<ApiVacancy>,
        report: &mut SyncReport,
    ) -> (ReferenceSnapshot, ReferenceSnapshot, HashSet<String>) {
        let mut current = ReferenceSnapshot::new();
        let mut seen = HashSet::new();

        for item in vacancies {
            let Some(reference) = item.reference().map(str::to_string) else {
                debug!(title = ?item.title, "Skipping vacancy without a reference");
                report.skipped += 1;
                continue;
            };
            seen.insert(reference.clone());

            let fields = VacancyFields::from(item);
            // A reference repeated within one page updates the record created
            // for its first occurrence.
            let existing = current
                .get(&reference)
                .copied()
                .or_else(|| remaining.remove(&reference));

            match existing {
                Some(id) => match self.vacancies.update(id, fields.clone()).await {
                    Ok(vacancy) => {
                        report.updated += 1;
                        current.insert(reference, vacancy.id);
                    }
                    Err(Error::NotFound(_)) => {
                        debug!(%reference, %id, "Snapshot entry vanished, recreating vacancy");
                        self.create_one(reference, fields, &mut current, report).await;
                    }
                    Err(e) => {
                        warn!(%reference, %id, error = %e, "Failed to update vacancy, skipping");
                        report.failed += 1;
                        current.insert(reference, id);
                    }
                },
                None => self.create_one(reference, fields, &mut current, report).await,
            }
        }

        (remaining, current, seen)
    }

    async fn create_one(
        &self,
        reference: String,
        fields: VacancyFields,
        current: &mut ReferenceSnapshot,
        report: &mut SyncReport,
    ) {
        match self.vacancies.create(fields).await {
            Ok(vacancy) => {
                report.created += 1;
                current.insert(reference, vacancy.id);
            }
            Err(e) => {
                warn!(%reference, error = %e, "Failed to create vacancy, skipping");
                report.failed += 1;
            }
        }
    }

    async fn delete_stale(
        &self,
        remaining: &mut ReferenceSnapshot,
        seen: &HashSet<String>,
        current: &mut ReferenceSnapshot,
        report: &mut SyncReport,
    ) {
        if remaining.is_empty() {
            return;
        }

        let stale: Vec<(String, Uuid)> = std::mem::take(remaining)
            .into_iter()
            .filter(|(reference, _)| !seen.contains(reference))
            .collect();

        for (reference, id) in stale {
            match self.vacancies.delete(id).await {
                Ok(true) => {
                    debug!(%reference, %id, "Deleted stale vacancy");
                    report.deleted += 1;
                }
                Ok(false) => debug!(%reference, %id, "Stale vacancy already gone"),
                Err(e) => {
                    warn!(%reference, %id, error = %e, "Failed to delete stale vacancy");
                    report.failed += 1;
                    current.insert(reference, id);
                }
            }
        }
    }

    /// Checks the credentials against the API without touching stored
    /// vacancies. Returns how many vacancies the first page holds.
    #[instrument(skip_all)]
    pub async fn test_connection(&self, overrides: &ApiOverrides) -> Result<usize> {
        let options = self.resolve_options(Some(overrides)).await?;
        let page = self.feed.fetch_page(&options.api_settings()).await?;
        let count = page
            .vacancies
            .map(|v| v.len())
            .ok_or_else(|| {
                Error::Parse("API response does not contain expected data".to_string())
            })?;
        info!(count, "API connection test succeeded");
        Ok(count)
    }

    /// Tests possibly-unsaved credentials, then syncs with them once.
    pub async fn test_and_sync(&self, overrides: ApiOverrides) -> Result<TestAndSyncReport> {
        let upstream_count = self.test_connection(&overrides).await?;
        self.run_pass(Some(overrides)).await?;
        let status = self.status().await?;

        Ok(TestAndSyncReport {
            message: format!(
                "Success! Found {} vacancies from API. Total vacancies in database: {}",
                upstream_count, status.total_vacancies
            ),
            upstream_count,
            total_vacancies: status.total_vacancies,
            last_sync: status.last_sync,
        })
    }

    pub async fn status(&self) -> Result<SyncStatus> {
        let options = self.current_options().await?;
        Ok(SyncStatus {
            last_sync: self.options.last_sync().await?,
            total_vacancies: self.vacancies.count_by_status(STATUS_PUBLISHED).await?,
            is_configured: options.is_configured(),
        })
    }
}
