use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use apprenticeship_connect::{
    config::{Config, StorageBackend},
    database::{
        memory::{InMemoryOptionsStore, InMemoryVacancyRepository},
        options_repository::PgOptionsStore,
        pool::{create_pool, run_migrations},
        seed_options,
        vacancy_repository::PgVacancyRepository,
        OptionsStore, VacancyRepository,
    },
    routes, scheduler,
    services::{apprenticeship_api::ApprenticeshipApiClient, snapshot_cache::SnapshotCache},
    AppState,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let config = Config::from_env()?;

    let (vacancies, options): (Arc<dyn VacancyRepository>, Arc<dyn OptionsStore>) =
        match config.storage_backend {
            StorageBackend::Postgres => {
                let database_url = config.database_url.as_deref().unwrap_or_default();
                let pool = create_pool(database_url).await?;
                run_migrations(&pool).await?;
                info!("Using postgres storage");
                (
                    Arc::new(PgVacancyRepository::new(pool.clone())) as Arc<dyn VacancyRepository>,
                    Arc::new(PgOptionsStore::new(pool)) as Arc<dyn OptionsStore>,
                )
            }
            StorageBackend::Memory => {
                warn!("Using in-memory storage; vacancies are lost on restart");
                (
                    Arc::new(InMemoryVacancyRepository::new()) as Arc<dyn VacancyRepository>,
                    Arc::new(InMemoryOptionsStore::new()) as Arc<dyn OptionsStore>,
                )
            }
        };

    seed_options(options.as_ref(), &config).await?;

    let feed = Arc::new(ApprenticeshipApiClient::new(
        ApprenticeshipApiClient::DEFAULT_TIMEOUT,
    )?);
    let cache = SnapshotCache::new(Duration::from_secs(config.snapshot_cache_ttl_secs));
    let app_state = AppState::new(vacancies, options, feed, cache);

    let _scheduler =
        scheduler::start_scheduler(&config.sync_cron, app_state.sync_service.clone()).await?;

    if config.sync_on_startup {
        let sync_service = app_state.sync_service.clone();
        tokio::spawn(async move {
            info!("Running startup vacancy sync");
            if let Err(e) = sync_service.sync().await {
                error!(error = %e, "Startup vacancy sync failed");
            }
        });
    }

    let app = routes::router(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
