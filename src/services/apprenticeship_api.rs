use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::{info, instrument, warn};
use url::Url;

use crate::dto::api_dto::VacancyPage;
use crate::error::{Error, Result};
use crate::models::options::ApiSettings;

/// Source of upstream vacancy listings.
#[async_trait]
pub trait VacancyFeed: Send + Sync {
    /// Fetches the first page of vacancies visible to the subscription.
    async fn fetch_page(&self, settings: &ApiSettings) -> Result<VacancyPage>;
}

/// Client for the Display Advert API (`{base_url}/vacancy`).
#[derive(Clone)]
pub struct ApprenticeshipApiClient {
    client: Client,
}

impl ApprenticeshipApiClient {
    pub const PAGE_NUMBER: u32 = 1;
    pub const PAGE_SIZE: u32 = 50;
    pub const SORT: &'static str = "AgeDesc";
    pub const API_VERSION: &'static str = "1";
    pub const SUBSCRIPTION_KEY_HEADER: &'static str = "Ocp-Apim-Subscription-Key";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

/// `{base_url}/vacancy` with the fixed paging, sort and subscription filter,
/// plus `Ukprn` when a provider filter is configured.
pub fn vacancy_request_url(settings: &ApiSettings) -> Result<Url> {
    let base = settings.base_url.trim_end_matches('/');
    let mut url = Url::parse(&format!("{}/vacancy", base))
        .map_err(|e| Error::Config(format!("Invalid API base URL '{}': {}", base, e)))?;

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("PageNumber", &ApprenticeshipApiClient::PAGE_NUMBER.to_string())
            .append_pair("PageSize", &ApprenticeshipApiClient::PAGE_SIZE.to_string())
            .append_pair("Sort", ApprenticeshipApiClient::SORT)
            .append_pair("FilterBySubscription", "true");
        if let Some(ukprn) = &settings.ukprn {
            query.append_pair("Ukprn", ukprn);
        }
    }

    Ok(url)
}

#[async_trait]
impl VacancyFeed for ApprenticeshipApiClient {
    #[instrument(skip(self, settings), fields(base_url = %settings.base_url, ukprn = ?settings.ukprn))]
    async fn fetch_page(&self, settings: &ApiSettings) -> Result<VacancyPage> {
        let url = vacancy_request_url(settings)?;
        info!("Fetching vacancies from upstream API");

        let response = self
            .client
            .get(url)
            .header("X-Version", Self::API_VERSION)
            .header(Self::SUBSCRIPTION_KEY_HEADER, &settings.subscription_key)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Error::Fetch(format!("Request to vacancy API failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Fetch(format!("Failed to read vacancy API response: {}", e)))?;

        if !status.is_success() {
            warn!(%status, "Vacancy API returned an error status");
            return Err(Error::Fetch(format!(
                "Vacancy API returned status {}",
                status
            )));
        }

        let page = serde_json::from_str::<VacancyPage>(&body).map_err(|e| {
            warn!(error = %e, "Vacancy API returned an unparseable body");
            Error::Parse(format!("Invalid API response format: {}", e))
        })?;
        info!(
            entries = ?page.vacancies.as_ref().map(Vec::len),
            total = ?page.total,
            "Vacancy API responded"
        );
        Ok(page)
    }
}
