//! The profile-hub server: wires configuration, pools and the profile
//! module into one Axum application.

use std::sync::Arc;
use std::time::Duration;

use app_core::config::Config;
use app_core::jwt::{JwtConfig, JwtService, TokenManager};
use app_core::middleware::request_response_logger;
use app_core::storage::StorageService;
use app_core::storage::local::LocalStorageService;
use axum::http::StatusCode;
use axum::{Json, Router, middleware, routing};
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::Pool;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::json;
use tokio::signal;
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::decompression::RequestDecompressionLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

type BoxError = Box<dyn std::error::Error>;

const CONFIG_FILE: &str = "config/config.yaml";
const ENV_PREFIX: &str = "PROFILE_HUB";

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run().await {
        tracing::error!("Application failed to start: {err}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(fmt::format::FmtSpan::CLOSE),
        )
        .init();
}

async fn run() -> Result<(), BoxError> {
    let config = Arc::new(
        Config::builder(CONFIG_FILE)
            .env_prefix(ENV_PREFIX)
            .watch_interval(Duration::from_secs(5))
            .watch()
            .build()?,
    );

    let db = Arc::new(connect_database(&config).await?);
    let rds = Pool::builder()
        .max_size(config.get::<u32>("redis.max_connections")?)
        .build(RedisConnectionManager::new(config.get::<String>("redis.url")?)?)
        .await?;

    // Sessions are issued by the auth service; this process only verifies them.
    let token: Arc<dyn TokenManager> = Arc::new(JwtService::new(JwtConfig {
        access_secret: config.get("jwt.access_secret")?,
        issuer: config.get("jwt.issuer")?,
        audience: config.get("jwt.audience")?,
    }));

    let upload_dir = config.get::<String>("storage.local.base_path")?;
    let upload_mount = config.get_or("storage.local.mount_path", "/uploads".to_string());
    let storage: Arc<dyn StorageService> =
        Arc::new(LocalStorageService::new(upload_dir.clone(), config.get("storage.local.base_url")?));

    let profile_state = profile::new(profile::Dependency { db, rds, config: config.clone(), storage });

    let app = Router::new()
        .merge(profile::create_router(profile_state, token))
        .nest_service(&upload_mount, ServeDir::new(upload_dir))
        .route("/", routing::get(|| async { Json(json!({"message": "profile-hub is running"})) }))
        .fallback(|| async { (StatusCode::NOT_FOUND, Json(json!({"message": "Endpoint not found"}))) })
        .method_not_allowed_fallback(|| async {
            (StatusCode::METHOD_NOT_ALLOWED, Json(json!({"message": "Method not allowed"})))
        })
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_response_logger))
                .layer(CookieManagerLayer::new())
                .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
                .layer(RequestDecompressionLayer::new())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(config.get("server.timeout_secs")?))),
        );

    let listener = tokio::net::TcpListener::bind(config.get::<String>("server.address")?).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn connect_database(config: &Config) -> Result<DatabaseConnection, BoxError> {
    let mut opt = ConnectOptions::new(config.get::<String>("database.url")?);
    opt.min_connections(config.get("database.min_connections")?)
        .max_connections(config.get("database.max_connections")?)
        .connect_timeout(Duration::from_secs(config.get("database.connect_timeout_secs")?))
        .acquire_timeout(Duration::from_secs(config.get("database.acquire_timeout_secs")?))
        .idle_timeout(Duration::from_secs(config.get("database.idle_timeout_secs")?))
        .max_lifetime(Duration::from_secs(config.get("database.max_lifetime_secs")?))
        .sqlx_logging(config.get("database.sqlx_logging")?)
        .sqlx_logging_level(log::LevelFilter::Debug);

    Ok(Database::connect(opt).await?)
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT, shutting down gracefully"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down gracefully"),
    }
}
