//! HTTP server initialization and runtime setup.
//!
//! Handles the persistence backend, suggestion provider, session sweeper and
//! Axum server lifecycle.

use crate::application::services::{ConversationService, Gateway};
use crate::application::session_store::SessionStore;
use crate::config::Config;
use crate::domain::repositories::SuggestionProvider;
use crate::infrastructure::memory::InMemoryStore;
use crate::infrastructure::persistence::{
    PgCampaignRepository, PgLandingPageRepository, PgTagRepository, PgTrackingLinkRepository,
};
use crate::infrastructure::suggestions::{HttpSuggestionProvider, NullSuggestionProvider};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Longest pause between idle-session sweeps.
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations (or the in-memory backend)
/// - Suggestion provider (HTTP, or NullSuggestionProvider fallback)
/// - Background idle-session sweeper
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let (gateway, db) = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
                .idle_timeout(Duration::from_secs(config.db_idle_timeout))
                .max_lifetime(Duration::from_secs(config.db_max_lifetime))
                .connect(database_url)
                .await?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Migrations applied");

            let pool = Arc::new(pool);
            (postgres_gateway(pool.clone()), Some(pool))
        }
        None => {
            tracing::warn!("No database configured, using in-memory persistence");
            (memory_gateway(Arc::new(InMemoryStore::new())), None)
        }
    };

    let suggestions: Arc<dyn SuggestionProvider> = match &config.suggestions_url {
        Some(url) => match HttpSuggestionProvider::new(url, config.suggestions_timeout()) {
            Ok(provider) => {
                tracing::info!("Suggestions enabled ({})", url);
                Arc::new(provider)
            }
            Err(e) => {
                tracing::warn!("Invalid suggestion service: {}. Suggestions disabled.", e);
                Arc::new(NullSuggestionProvider::new())
            }
        },
        None => {
            tracing::info!("Suggestions disabled (NullSuggestionProvider)");
            Arc::new(NullSuggestionProvider::new())
        }
    };

    let store = Arc::new(SessionStore::new());
    let conversation_service = Arc::new(ConversationService::new(
        store.clone(),
        gateway,
        suggestions.clone(),
        config.flow_settings(),
    ));

    tokio::spawn(run_session_sweeper(store, config.session_idle_timeout()));
    tracing::info!("Session sweeper started");

    let state = AppState::new(conversation_service, suggestions, db);
    let app = app_router(state, config.behind_proxy);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

/// Repositories backed by PostgreSQL.
pub fn postgres_gateway(pool: Arc<PgPool>) -> Gateway {
    Gateway {
        campaigns: Arc::new(PgCampaignRepository::new(pool.clone())),
        landing_pages: Arc::new(PgLandingPageRepository::new(pool.clone())),
        tags: Arc::new(PgTagRepository::new(pool.clone())),
        links: Arc::new(PgTrackingLinkRepository::new(pool)),
    }
}

/// Repositories backed by a single in-memory store.
pub fn memory_gateway(store: Arc<InMemoryStore>) -> Gateway {
    Gateway {
        campaigns: store.clone(),
        landing_pages: store.clone(),
        tags: store.clone(),
        links: store,
    }
}

/// Periodically evicts sessions idle for longer than `idle_timeout`.
pub async fn run_session_sweeper(store: Arc<SessionStore>, idle_timeout: Duration) {
    let period = (idle_timeout / 4).clamp(Duration::from_secs(1), MAX_SWEEP_INTERVAL);
    let max_idle = chrono::Duration::from_std(idle_timeout).unwrap_or(chrono::Duration::hours(1));

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let evicted = store.purge_idle(max_idle).await;
        if evicted > 0 {
            tracing::info!(evicted, "Evicted idle sessions");
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
