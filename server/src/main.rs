use std::net::SocketAddr;
use std::sync::Arc;

use coffee_shop::auth::{KeySetSource, RemoteKeySet, TokenVerifier};
use coffee_shop::config::ServerConfig;
use coffee_shop::storage::DrinkStore;
use coffee_shop::{AppState, router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coffee_shop=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment variables
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Loaded configuration: auth_domain={}, audience={}, database_url={}, listen_port={}",
        config.auth_domain,
        config.api_audience,
        config.database_url,
        config.listen_port
    );

    let store = match DrinkStore::connect(&config.database_url).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open database: {e}");
            std::process::exit(1);
        }
    };

    // Resetting drops every drink, so it only happens when explicitly asked for.
    let bootstrap = if config.reset_database {
        store.reset().await.map(|seed| {
            tracing::warn!("Database reset; seeded drink id={}", seed.id);
        })
    } else {
        store.migrate().await
    };
    if let Err(e) = bootstrap {
        tracing::error!("Failed to prepare drinks table: {e}");
        std::process::exit(1);
    }

    let key_set: Arc<dyn KeySetSource> = match RemoteKeySet::new(config.jwks_url()) {
        Ok(source) => Arc::new(source),
        Err(e) => {
            tracing::error!("Failed to create key set client: {e}");
            std::process::exit(1);
        }
    };
    let verifier = TokenVerifier::new(
        key_set,
        &config.api_audience,
        &config.issuer(),
        config.jwks_cache_ttl,
    )
    .with_min_refresh_interval(config.jwks_min_refresh_interval);

    let app = router(AppState::new(store.clone(), Arc::new(verifier)));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.listen_port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind: {e}");
            std::process::exit(1);
        });

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Server error: {e}");
            std::process::exit(1);
        });

    store.close().await;
}

/// Resolve once the process receives Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        // Without a signal handler, run until killed.
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
