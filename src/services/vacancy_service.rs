use std::sync::Arc;

use crate::database::{OptionsStore, VacancyRepository};
use crate::dto::vacancy_dto::{VacancyListItem, VacancyListingResponse};
use crate::error::Result;

/// Read side of the mirrored vacancies, shaped by the display preferences.
#[derive(Clone)]
pub struct VacancyService {
    vacancies: Arc<dyn VacancyRepository>,
    options: Arc<dyn OptionsStore>,
}

impl VacancyService {
    pub const EMPTY_MESSAGE: &'static str = "No vacancies found at the moment.";

    pub fn new(vacancies: Arc<dyn VacancyRepository>, options: Arc<dyn OptionsStore>) -> Self {
        Self { vacancies, options }
    }

    pub async fn list_for_display(&self) -> Result<VacancyListingResponse> {
        let display = self.options.load_options().await?.unwrap_or_default();
        let limit = i64::from(display.display_count.max(1));
        let items: Vec<VacancyListItem> = self
            .vacancies
            .list_published(limit)
            .await?
            .into_iter()
            .map(|v| VacancyListItem::project(v, &display))
            .collect();

        let message = items.is_empty().then(|| Self::EMPTY_MESSAGE.to_string());
        Ok(VacancyListingResponse { items, message })
    }
}
