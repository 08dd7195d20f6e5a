use std::sync::Arc;
use std::time::Duration;

use advisor_core::dataset::DatasetCache;
use advisor_core::session::SessionStore;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod error;
mod routes;

const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = advisor_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let source = advisor_core::dataset::source_from_settings(&settings)?;
    let datasets = Arc::new(DatasetCache::new(source));

    // Warm the cache; a failure here leaves the API up in degraded mode and
    // dataset-backed routes keep retrying on demand.
    if let Err(e) = datasets.get().await {
        sentry_anyhow::capture_anyhow(&anyhow::Error::new(e.clone()));
        tracing::error!(error = %e, source = datasets.source_name(), "dataset load failed; starting API in degraded mode");
    }

    let sessions = Arc::new(SessionStore::new(settings.session_ttl));
    tokio::spawn(evict_idle_sessions(Arc::clone(&sessions)));

    let state = routes::AppState { datasets, sessions };
    let app = routes::router(state).layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn evict_idle_sessions(sessions: Arc<SessionStore>) {
    let mut ticker = tokio::time::interval(EVICTION_INTERVAL);
    loop {
        ticker.tick().await;
        let evicted = sessions.evict_idle(chrono::Utc::now());
        if evicted > 0 {
            tracing::debug!(evicted, live = sessions.len(), "evicted idle sessions");
        }
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &advisor_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
