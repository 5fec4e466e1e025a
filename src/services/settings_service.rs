use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::database::OptionsStore;
use crate::dto::settings_dto::{DisplaySettingsPayload, SaveApiSettingsPayload};
use crate::error::{Error, Result};
use crate::models::options::PluginOptions;

#[derive(Clone)]
pub struct SettingsService {
    options: Arc<dyn OptionsStore>,
}

impl SettingsService {
    pub fn new(options: Arc<dyn OptionsStore>) -> Self {
        Self { options }
    }

    pub async fn get(&self) -> Result<PluginOptions> {
        Ok(self.options.load_options().await?.unwrap_or_default())
    }

    /// Persists API credentials, typically after a successful test and sync.
    /// Display preferences are left as stored.
    pub async fn save_api_settings(&self, payload: SaveApiSettingsPayload) -> Result<PluginOptions> {
        let base_url = payload.api_base_url.trim();
        let key = payload.api_subscription_key.trim();
        if base_url.is_empty() || key.is_empty() {
            return Err(Error::BadRequest("Missing API settings.".to_string()));
        }
        payload.validate()?;

        let mut options = self.get().await?;
        options.api_base_url = base_url.to_string();
        options.api_subscription_key = key.to_string();
        options.api_ukprn = payload
            .api_ukprn
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        self.options.save_options(&options).await?;
        info!(ukprn = %options.api_ukprn, "API settings saved");
        Ok(options)
    }

    pub async fn update_display_settings(
        &self,
        payload: DisplaySettingsPayload,
    ) -> Result<PluginOptions> {
        payload.validate()?;

        let mut options = self.get().await?;
        options.display_count = payload.display_count;
        options.show_employer = payload.show_employer;
        options.show_location = payload.show_location;
        options.show_closing_date = payload.show_closing_date;
        options.show_apply_button = payload.show_apply_button;
        options.validate()?;

        self.options.save_options(&options).await?;
        info!(display_count = options.display_count, "Display settings saved");
        Ok(options)
    }
}
