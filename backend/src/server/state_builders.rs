//! Builders wiring stores, the review service and HTTP state.

use std::sync::Arc;

use mockable::DefaultClock;
use tracing::info;

use pr_reviewer::domain::ports::{RandomSource, ReviewCommand, ReviewQuery, ReviewStore};
use pr_reviewer::domain::{ReviewService, ReviewerSelector};
use pr_reviewer::inbound::http::health::HealthState;
use pr_reviewer::inbound::http::state::HttpState;
use pr_reviewer::outbound::memory::InMemoryReviewStore;
use pr_reviewer::outbound::persistence::{
    DbPool, DieselReviewStore, MigrationError, PoolError, run_pending_migrations,
};
use pr_reviewer::outbound::random::{SeededRandomSource, ThreadRandomSource};

use super::config::{ServerSettings, SettingsError};

/// Failures raised while assembling application state.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Migrations(#[from] MigrationError),
}

impl From<StartupError> for std::io::Error {
    fn from(value: StartupError) -> Self {
        std::io::Error::other(value.to_string())
    }
}

/// Handler and probe state ready to be shared with the server.
pub struct AppState {
    pub http: HttpState,
    pub health: HealthState,
}

fn random_source(settings: &ServerSettings) -> Arc<dyn RandomSource> {
    match settings.random_seed {
        Some(seed) => Arc::new(SeededRandomSource::new(seed)),
        None => Arc::new(ThreadRandomSource),
    }
}

fn wire<S>(store: Arc<S>, selector: ReviewerSelector) -> AppState
where
    S: ReviewStore + 'static,
{
    let service = Arc::new(ReviewService::new(
        store.clone(),
        selector,
        Arc::new(DefaultClock),
    ));
    let commands: Arc<dyn ReviewCommand> = service.clone();
    let queries: Arc<dyn ReviewQuery> = service;
    AppState {
        http: HttpState::new(commands, queries),
        health: HealthState::with_store(store),
    }
}

/// Build application state from settings.
///
/// Uses PostgreSQL when a database URL is configured, otherwise an in-memory
/// store that lives as long as the process.
pub async fn build_app_state(settings: &ServerSettings) -> Result<AppState, StartupError> {
    let selector = ReviewerSelector::new(random_source(settings), settings.max_reviewers()?);
    info!(
        max_reviewers = selector.max_reviewers(),
        seeded = settings.random_seed.is_some(),
        "reviewer selection configured"
    );
    match settings.pool_config() {
        Some(config) => {
            if settings.run_migrations {
                run_pending_migrations(config.database_url()).await?;
            }
            let pool = DbPool::new(config).await?;
            info!(store = "postgres", "review store configured");
            Ok(wire(Arc::new(DieselReviewStore::new(pool)), selector))
        }
        None => {
            info!(store = "memory", "review store configured");
            Ok(wire(Arc::new(InMemoryReviewStore::new()), selector))
        }
    }
}
