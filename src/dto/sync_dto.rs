use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::options::SyncStatus;

/// Outcome reported to whoever triggered a sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncOutcomeResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestConnectionResponse {
    pub success: bool,
    pub message: String,
    pub vacancy_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestAndSyncResponse {
    pub success: bool,
    pub message: String,
    pub upstream_count: usize,
    pub total_vacancies: i64,
    /// `YYYY-MM-DD HH:MM:SS` in UTC, or "Never".
    pub last_sync: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncStatusResponse {
    pub last_sync: Option<DateTime<Utc>>,
    pub total_vacancies: i64,
    pub is_configured: bool,
}

impl From<SyncStatus> for SyncStatusResponse {
    fn from(value: SyncStatus) -> Self {
        Self {
            last_sync: value.last_sync,
            total_vacancies: value.total_vacancies,
            is_configured: value.is_configured,
        }
    }
}

pub fn format_last_sync(last_sync: Option<DateTime<Utc>>) -> String {
    last_sync
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "Never".to_string())
}
