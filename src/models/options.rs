use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_API_BASE_URL: &str = "https://api.apprenticeships.education.gov.uk/vacancies";

/// The persisted options blob: API credentials plus display preferences.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(default)]
pub struct PluginOptions {
    pub api_base_url: String,
    pub api_subscription_key: String,
    pub api_ukprn: String,
    #[validate(range(min = 1, max = 100))]
    pub display_count: u32,
    pub show_employer: bool,
    pub show_location: bool,
    pub show_closing_date: bool,
    pub show_apply_button: bool,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_subscription_key: String::new(),
            api_ukprn: String::new(),
            display_count: 10,
            show_employer: true,
            show_location: true,
            show_closing_date: true,
            show_apply_button: true,
        }
    }
}

impl PluginOptions {
    pub fn is_configured(&self) -> bool {
        !self.api_subscription_key.trim().is_empty()
    }

    pub fn has_credentials(&self) -> bool {
        self.is_configured() && !self.api_base_url.trim().is_empty()
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.api_base_url.trim().trim_end_matches('/').to_string(),
            subscription_key: self.api_subscription_key.trim().to_string(),
            ukprn: Some(self.api_ukprn.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        }
    }

    /// Copies every non-empty override on top of these options.
    pub fn merged_with(&self, overrides: &ApiOverrides) -> Self {
        let mut merged = self.clone();
        if let Some(base_url) = non_empty(&overrides.api_base_url) {
            merged.api_base_url = base_url;
        }
        if let Some(key) = non_empty(&overrides.api_subscription_key) {
            merged.api_subscription_key = key;
        }
        if let Some(ukprn) = non_empty(&overrides.api_ukprn) {
            merged.api_ukprn = ukprn;
        }
        merged
    }

    /// Subscription key with everything but the last four characters hidden.
    pub fn masked_subscription_key(&self) -> String {
        let key = self.api_subscription_key.trim();
        let visible = key.chars().count().saturating_sub(4);
        key.chars()
            .enumerate()
            .map(|(idx, c)| if idx < visible { '*' } else { c })
            .collect()
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// What the feed client needs to issue one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub base_url: String,
    pub subscription_key: String,
    pub ukprn: Option<String>,
}

/// Unsaved credentials supplied by an operator for a one-off test or sync.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiOverrides {
    pub api_base_url: Option<String>,
    pub api_subscription_key: Option<String>,
    pub api_ukprn: Option<String>,
}

impl ApiOverrides {
    /// Layers `newer` on top of these overrides; blank values in `newer`
    /// keep what is already here.
    pub fn layered_with(self, newer: ApiOverrides) -> Self {
        Self {
            api_base_url: non_empty(&newer.api_base_url).or(self.api_base_url),
            api_subscription_key: non_empty(&newer.api_subscription_key)
                .or(self.api_subscription_key),
            api_ukprn: non_empty(&newer.api_ukprn).or(self.api_ukprn),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncStatus {
    pub last_sync: Option<DateTime<Utc>>,
    pub total_vacancies: i64,
    pub is_configured: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_plugin_activation_values() {
        let options = PluginOptions::default();
        assert_eq!(options.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(options.display_count, 10);
        assert!(options.show_employer && options.show_apply_button);
        assert!(!options.is_configured());
    }

    #[test]
    fn blank_overrides_do_not_replace_saved_values() {
        let saved = PluginOptions {
            api_subscription_key: "saved-key".into(),
            api_ukprn: "10000001".into(),
            ..Default::default()
        };
        let merged = saved.merged_with(&ApiOverrides {
            api_base_url: Some("  ".into()),
            api_subscription_key: Some("fresh-key".into()),
            api_ukprn: None,
        });

        assert_eq!(merged.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(merged.api_subscription_key, "fresh-key");
        assert_eq!(merged.api_ukprn, "10000001");
    }

    #[test]
    fn layered_overrides_keep_earlier_values_for_blanks() {
        let earlier = ApiOverrides {
            api_base_url: Some("https://first.test".into()),
            api_subscription_key: Some("first-key".into()),
            api_ukprn: None,
        };
        let layered = earlier.layered_with(ApiOverrides {
            api_base_url: Some(" ".into()),
            api_subscription_key: Some("second-key".into()),
            api_ukprn: Some("10000001".into()),
        });

        assert_eq!(layered.api_base_url.as_deref(), Some("https://first.test"));
        assert_eq!(layered.api_subscription_key.as_deref(), Some("second-key"));
        assert_eq!(layered.api_ukprn.as_deref(), Some("10000001"));
    }

    #[test]
    fn api_settings_drop_trailing_slash_and_empty_ukprn() {
        let options = PluginOptions {
            api_base_url: "https://example.test/vacancies/".into(),
            api_subscription_key: " key ".into(),
            ..Default::default()
        };
        let settings = options.api_settings();
        assert_eq!(settings.base_url, "https://example.test/vacancies");
        assert_eq!(settings.subscription_key, "key");
        assert_eq!(settings.ukprn, None);
    }

    #[test]
    fn masks_all_but_last_four() {
        let options = PluginOptions {
            api_subscription_key: "abcdef123456".into(),
            ..Default::default()
        };
        assert_eq!(options.masked_subscription_key(), "********3456");
    }

    #[test]
    fn missing_blob_fields_fall_back_to_defaults() {
        let options: PluginOptions =
            serde_json::from_str(r#"{"api_subscription_key":"k","display_count":5}"#).unwrap();
        assert_eq!(options.display_count, 5);
        assert_eq!(options.api_base_url, DEFAULT_API_BASE_URL);
        assert!(options.show_location);
    }
}
