use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use super::OptionsStore;
use crate::error::Result;
use crate::models::options::PluginOptions;

const OPTIONS_KEY: &str = "plugin_options";
const LAST_SYNC_KEY: &str = "last_sync";

/// Key-value option rows, one JSON value per name.
#[derive(Clone)]
pub struct PgOptionsStore {
    pool: PgPool,
}

impl PgOptionsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn get(&self, name: &str) -> Result<Option<JsonValue>> {
        let value = sqlx::query_scalar::<_, JsonValue>(
            "SELECT value FROM plugin_options WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(value)
    }

    async fn set(&self, name: &str, value: JsonValue) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO plugin_options (name, value)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(name)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl OptionsStore for PgOptionsStore {
    async fn load_options(&self) -> Result<Option<PluginOptions>> {
        match self.get(OPTIONS_KEY).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn save_options(&self, options: &PluginOptions) -> Result<()> {
        self.set(OPTIONS_KEY, serde_json::to_value(options)?).await
    }

    async fn last_sync(&self) -> Result<Option<DateTime<Utc>>> {
        match self.get(LAST_SYNC_KEY).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn set_last_sync(&self, at: DateTime<Utc>) -> Result<()> {
        self.set(LAST_SYNC_KEY, serde_json::to_value(at)?).await
    }
}
