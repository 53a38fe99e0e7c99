//! Tweeter authentication service
//!
//! Serves the auth REST API. Reads configuration from a TOML file
//! (~/.config/tweeter/config.toml or `$TWEETER_CONFIG`).

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use tweeter::auth::PasswordHasher;
use tweeter::config::{LogFormat, LoggingConfig, StorageBackend};
use tweeter::domain::UserStore;
use tweeter::shared::shutdown_signal;
use tweeter::{
    create_api_router, default_config_path, init_database, AppConfig, AuthService,
    InMemoryUserStore, SeaOrmUserStore,
};

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match logging.format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = default_config_path();
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_tracing(&cfg.logging);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            init_tracing(&LoggingConfig::default());
            error!("Failed to load config: {}", e);
            return Err(e.into());
        }
    };

    info!("Starting Tweeter service...");

    if app_cfg.security.uses_default_secret() {
        warn!("Using the built-in secret key; set SECRET_KEY before exposing this service");
    }

    // ── User store ─────────────────────────────────────────────
    let mut db = None;
    let users: Arc<dyn UserStore> = match app_cfg.database.backend {
        StorageBackend::Sql => {
            let conn = match init_database(&app_cfg.database.connection_config()).await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("Failed to connect to database: {}", e);
                    return Err(e.into());
                }
            };
            db = Some(conn.clone());
            Arc::new(SeaOrmUserStore::new(conn))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory user store; users are lost on restart");
            Arc::new(InMemoryUserStore::new())
        }
    };

    // ── Services ───────────────────────────────────────────────
    let jwt_config = app_cfg.security.jwt_config();
    info!(
        access_ttl_minutes = app_cfg.security.access_token_ttl_minutes,
        refresh_ttl_minutes = app_cfg.security.refresh_token_ttl_minutes,
        "JWT configured"
    );
    let service = Arc::new(AuthService::new(
        users,
        &jwt_config,
        PasswordHasher::new(app_cfg.security.bcrypt_cost),
    ));

    // ── HTTP server ────────────────────────────────────────────
    let api_router = create_api_router(service);
    let api_addr = app_cfg.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("REST API server listening on http://{}", api_addr);

    axum::serve(listener, api_router)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("REST API server received shutdown signal");
        })
        .await?;

    if let Some(db) = db {
        if let Err(e) = db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("Database connection closed");
        }
    }

    info!("Tweeter service shutdown complete");
    Ok(())
}
