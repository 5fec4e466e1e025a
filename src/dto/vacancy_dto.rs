use serde::{Deserialize, Serialize};

use crate::models::options::PluginOptions;
use crate::models::vacancy::Vacancy;
use crate::utils::time::format_display_date;

/// One entry of the public listing, already filtered by the display flags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VacancyListItem {
    pub title: String,
    pub vacancy_url: Option<String>,
    pub short_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VacancyListingResponse {
    pub items: Vec<VacancyListItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl VacancyListItem {
    pub fn project(value: Vacancy, display: &PluginOptions) -> Self {
        let employer_name = value
            .employer_name
            .filter(|e| display.show_employer && !e.is_empty());
        let postcode = value
            .postcode
            .filter(|p| display.show_location && !p.is_empty());
        let closing_date = value
            .closing_date
            .filter(|_| display.show_closing_date)
            .map(|d| format_display_date(&d));
        let apply_url = value
            .vacancy_url
            .clone()
            .filter(|_| display.show_apply_button);

        Self {
            title: value.title.unwrap_or_default(),
            vacancy_url: value.vacancy_url,
            short_description: value.short_description.filter(|d| !d.is_empty()),
            employer_name,
            postcode,
            closing_date,
            apply_url,
        }
    }
}
