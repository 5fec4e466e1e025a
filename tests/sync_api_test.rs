use std::sync::Arc;

use apprenticeship_connect::{
    database::{
        memory::{InMemoryOptionsStore, InMemoryVacancyRepository},
        OptionsStore, VacancyRepository,
    },
    dto::api_dto::VacancyPage,
    error::{Error, Result},
    models::{
        options::{ApiSettings, PluginOptions},
        vacancy::VacancyFields,
    },
    routes,
    services::{apprenticeship_api::VacancyFeed, snapshot_cache::SnapshotCache},
    AppState,
};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use mockall::mock;
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;

mock! {
    pub Feed {}

    #[async_trait]
    impl VacancyFeed for Feed {
        async fn fetch_page(&self, settings: &ApiSettings) -> Result<VacancyPage>;
    }
}

struct TestApp {
    router: Router,
    repo: Arc<InMemoryVacancyRepository>,
    options: Arc<InMemoryOptionsStore>,
}

fn app(feed: MockFeed, options: PluginOptions) -> TestApp {
    let repo = Arc::new(InMemoryVacancyRepository::new());
    let store = Arc::new(InMemoryOptionsStore::with_options(options));
    let state = AppState::new(
        repo.clone(),
        store.clone(),
        Arc::new(feed),
        SnapshotCache::disabled(),
    );
    TestApp {
        router: routes::router(state),
        repo,
        options: store,
    }
}

fn configured() -> PluginOptions {
    PluginOptions {
        api_subscription_key: "secret-key-1234".to_string(),
        ..Default::default()
    }
}

fn listing() -> VacancyPage {
    serde_json::from_value(json!({
        "vacancies": [
            {
                "vacancyReference": "VAC1",
                "title": "Plumber",
                "employerName": "Acme",
                "closingDate": "2025-02-28T00:00:00Z",
                "postedDate": "2025-01-10T00:00:00Z",
                "vacancyUrl": "https://example.test/VAC1",
                "address": { "postcode": "M1 1AA" }
            },
            {
                "vacancyReference": "VAC2",
                "title": "Electrician",
                "postedDate": "2025-01-05T00:00:00Z"
            }
        ]
    }))
    .unwrap()
}

async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app(MockFeed::new(), configured());

    let (status, body) = send(&app.router, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn sync_then_status_and_listing() {
    let mut feed = MockFeed::new();
    feed.expect_fetch_page()
        .times(1)
        .returning(|_| Ok(listing()));
    let app = app(feed, configured());

    let (status, body) = send(&app.router, "GET", "/api/sync/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_vacancies"], 0);
    assert!(body["last_sync"].is_null());
    assert_eq!(body["is_configured"], true);

    let (status, body) = send(&app.router, "POST", "/api/sync", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Sync completed successfully!");

    let (_, body) = send(&app.router, "GET", "/api/sync/status", None).await;
    assert_eq!(body["total_vacancies"], 2);
    assert!(body["last_sync"].is_string());

    let (status, body) = send(&app.router, "GET", "/api/vacancies", None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["title"], "Plumber");
    assert_eq!(items[0]["employer_name"], "Acme");
    assert_eq!(items[0]["postcode"], "M1 1AA");
    assert_eq!(items[0]["closing_date"], "February 28, 2025");
    assert_eq!(items[0]["apply_url"], "https://example.test/VAC1");
    assert_eq!(items[1]["title"], "Electrician");
    assert!(body.get("message").is_none());
}

#[tokio::test]
async fn sync_without_credentials_is_rejected() {
    let mut feed = MockFeed::new();
    feed.expect_fetch_page().never();
    let app = app(feed, PluginOptions::default());

    let (status, body) = send(&app.router, "POST", "/api/sync", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("API credentials not configured."));
    assert!(app.options.last_sync().await.unwrap().is_none());
}

#[tokio::test]
async fn upstream_failure_maps_to_bad_gateway() {
    let mut feed = MockFeed::new();
    feed.expect_fetch_page()
        .times(1)
        .returning(|_| Err(Error::Fetch("Vacancy API returned status 401 Unauthorized".to_string())));
    let app = app(feed, configured());
    app.repo
        .create(VacancyFields {
            reference: Some("KEEP".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let (status, body) = send(&app.router, "POST", "/api/sync", None).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert_eq!(app.repo.all().await.len(), 1);
}

#[tokio::test]
async fn test_connection_reports_count_with_unsaved_key() {
    let mut feed = MockFeed::new();
    feed.expect_fetch_page()
        .withf(|settings| settings.subscription_key == "unsaved")
        .times(1)
        .returning(|_| Ok(listing()));
    let app = app(feed, PluginOptions::default());

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/sync/test",
        Some(json!({ "api_subscription_key": "unsaved" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["vacancy_count"], 2);
    assert_eq!(body["message"], "API connection successful! Found 2 vacancies.");
    assert!(app.repo.all().await.is_empty());
}

#[tokio::test]
async fn test_and_sync_reports_totals() {
    let mut feed = MockFeed::new();
    feed.expect_fetch_page()
        .times(2)
        .returning(|_| Ok(listing()));
    let app = app(feed, configured());

    let (status, body) = send(&app.router, "POST", "/api/sync/test-and-sync", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(
        body["message"],
        "Success! Found 2 vacancies from API. Total vacancies in database: 2"
    );
    assert_ne!(body["last_sync"], "Never");
}

#[tokio::test]
async fn empty_listing_carries_message() {
    let app = app(MockFeed::new(), configured());

    let (status, body) = send(&app.router, "GET", "/api/vacancies", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["items"].as_array().unwrap().is_empty());
    assert_eq!(body["message"], "No vacancies found at the moment.");
}

#[tokio::test]
async fn saving_api_settings_persists_and_masks_key() {
    let app = app(MockFeed::new(), PluginOptions::default());

    let (status, body) = send(
        &app.router,
        "PUT",
        "/api/settings/api",
        Some(json!({
            "api_base_url": "https://api.example.test/vacancies/",
            "api_subscription_key": "abcdef123456",
            "api_ukprn": "10012345"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["api_subscription_key"], "********3456");
    assert_eq!(body["is_configured"], true);

    let saved = app.options.load_options().await.unwrap().unwrap();
    assert_eq!(saved.api_subscription_key, "abcdef123456");
    assert_eq!(saved.api_ukprn, "10012345");

    let (status, body) = send(
        &app.router,
        "PUT",
        "/api/settings/api",
        Some(json!({ "api_base_url": "https://api.example.test", "api_subscription_key": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Missing API settings."));
}

#[tokio::test]
async fn display_settings_shape_the_listing() {
    let mut feed = MockFeed::new();
    feed.expect_fetch_page()
        .times(1)
        .returning(|_| Ok(listing()));
    let app = app(feed, configured());
    send(&app.router, "POST", "/api/sync", None).await;

    let (status, body) = send(
        &app.router,
        "PUT",
        "/api/settings/display",
        Some(json!({
            "display_count": 1,
            "show_employer": false,
            "show_location": true,
            "show_closing_date": false,
            "show_apply_button": false
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_count"], 1);

    let (_, body) = send(&app.router, "GET", "/api/vacancies", None).await;
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Plumber");
    assert!(items[0].get("employer_name").is_none());
    assert!(items[0].get("closing_date").is_none());
    assert!(items[0].get("apply_url").is_none());
    assert_eq!(items[0]["postcode"], "M1 1AA");

    let (status, _) = send(
        &app.router,
        "PUT",
        "/api/settings/display",
        Some(json!({ "display_count": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
