use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::options::PluginOptions;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaveApiSettingsPayload {
    #[validate(url)]
    pub api_base_url: String,
    #[validate(length(min = 1))]
    pub api_subscription_key: String,
    #[serde(default)]
    pub api_ukprn: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DisplaySettingsPayload {
    #[validate(range(min = 1, max = 100))]
    pub display_count: u32,
    #[serde(default)]
    pub show_employer: bool,
    #[serde(default)]
    pub show_location: bool,
    #[serde(default)]
    pub show_closing_date: bool,
    #[serde(default)]
    pub show_apply_button: bool,
}

/// Options as shown to an operator; the subscription key is masked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub api_base_url: String,
    pub api_subscription_key: String,
    pub api_ukprn: String,
    pub display_count: u32,
    pub show_employer: bool,
    pub show_location: bool,
    pub show_closing_date: bool,
    pub show_apply_button: bool,
    pub is_configured: bool,
}

impl From<PluginOptions> for SettingsResponse {
    fn from(value: PluginOptions) -> Self {
        Self {
            api_subscription_key: value.masked_subscription_key(),
            is_configured: value.is_configured(),
            api_base_url: value.api_base_url,
            api_ukprn: value.api_ukprn,
            display_count: value.display_count,
            show_employer: value.show_employer,
            show_location: value.show_location,
            show_closing_date: value.show_closing_date,
            show_apply_button: value.show_apply_button,
        }
    }
}
