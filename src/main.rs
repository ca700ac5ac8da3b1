//! Usage analytics service
//!
//! Records client usage events (page views, version selections, install
//! outcomes) into a key-value store and serves aggregated dashboard
//! statistics computed from them on every request.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::info;

use api::{router, AppState};
use kv_store::{build_store, StoreConfig};
use telemetry::init_tracing_from_env;
use worker::{WorkerConfig, WorkerScheduler};

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    /// Value of `Access-Control-Allow-Origin` on every response
    #[serde(default = "default_allowed_origin")]
    allowed_origin: String,

    /// Plaintext body returned for unknown routes
    #[serde(default = "default_banner")]
    banner: String,

    #[serde(default)]
    store: StoreConfig,

    #[serde(default)]
    worker: WorkerConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8787
}

fn default_allowed_origin() -> String {
    "https://lochnessfpv.github.io".to_string()
}

fn default_banner() -> String {
    "RX5808-Div Analytics API".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origin: default_allowed_origin(),
            banner: default_banner(),
            store: StoreConfig::default(),
            worker: WorkerConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    info!("Starting usage analytics service v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config()?;

    info!(
        backend = ?config.store.backend,
        allowed_origin = %config.allowed_origin,
        read_concurrency = config.store.read_concurrency,
        timeout_secs = config.store.timeout_secs,
        "Loaded configuration"
    );

    let store = build_store(&config.store).context("Failed to create key-value store")?;

    // Start background workers
    let worker_scheduler = Arc::new(WorkerScheduler::new(config.worker.clone(), store.clone()));
    let worker_handles = worker_scheduler.start();

    let state = AppState::new(store, &config.allowed_origin, config.banner.as_str())
        .context("Invalid HTTP configuration")?
        .with_read_concurrency(config.store.read_concurrency);

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down...");

    for handle in worker_handles {
        handle.abort();
    }

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("ANALYTICS")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // The config crate's nested parsing doesn't work reliably with underscored field names
    let var = |name: &str| std::env::var(format!("ANALYTICS_{name}")).ok();

    if let Some(origin) = var("ALLOWED_ORIGIN") {
        config.allowed_origin = origin;
    }
    if let Some(backend) = var("STORE_BACKEND") {
        config.store.backend = backend.parse()?;
    }
    if let Some(account_id) = var("STORE_ACCOUNT_ID") {
        config.store.account_id = Some(account_id);
    }
    if let Some(namespace_id) = var("STORE_NAMESPACE_ID") {
        config.store.namespace_id = Some(namespace_id);
    }
    if let Some(api_token) = var("STORE_API_TOKEN") {
        config.store.api_token = Some(api_token);
    }
    if let Some(url) = var("STORE_API_BASE_URL") {
        config.store.api_base_url = url;
    }
    if let Some(secs) = var("STORE_TIMEOUT_SECS") {
        config.store.timeout_secs = secs.parse().context("ANALYTICS_STORE_TIMEOUT_SECS")?;
    }
    if let Some(n) = var("STORE_READ_CONCURRENCY") {
        config.store.read_concurrency = n.parse().context("ANALYTICS_STORE_READ_CONCURRENCY")?;
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
