//! Chef marketplace authentication server.
//!
//! Serves the auth API over a PostgreSQL credential store, or over an
//! in-memory store for local development.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use chef_market::{
    auth::{AuthManager, CredentialStore, MemoryCredentialStore, PasswordHasher, TokenIssuer},
    db::{Database, PgCredentialStore},
};
use cm_server::{api, config::ServerConfig, logging, metrics};
use pico_args::Arguments;

const HELP: &str = "\
Run the chef marketplace authentication server

USAGE:
  cm_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:3001]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  --in-memory              Keep users in memory instead of PostgreSQL
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  SECRET                   Session token signing secret (required)
  PASSWORD_PEPPER          Password hashing pepper (required)
  TOKEN_TTL                Session lifetime, e.g. 3600, 12h, 1d  [default: 1d]
  COOKIE_SECURE            Mark the session cookie Secure  [default: false]
  CORS_ALLOWED_ORIGIN      Browser origin allowed to send credentials
  METRICS_BIND             Prometheus exporter address
  (See .env file for all configuration options)
";

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        in_memory: pargs.contains("--in-memory"),
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url, args.in_memory)?;
    tracing::info!(bind = %config.bind, "Starting chef marketplace server");

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(|e| anyhow::anyhow!(e))?;
        tracing::info!(%addr, "Prometheus exporter listening");
    }

    let database = match &config.database {
        Some(db_config) => {
            let db = Database::new(db_config)
                .await
                .context("Failed to connect to database")?;
            db.ensure_schema()
                .await
                .context("Failed to create database schema")?;
            tracing::info!("Database connected successfully");
            Some(db)
        }
        None => None,
    };

    let hasher = PasswordHasher::new(config.security.password_pepper.clone());
    let store: Arc<dyn CredentialStore> = match &database {
        Some(db) => Arc::new(PgCredentialStore::new(db.pool().clone(), hasher)),
        None => {
            tracing::warn!("Using in-memory credential store, users are lost on restart");
            Arc::new(MemoryCredentialStore::new(hasher))
        }
    };

    let issuer = TokenIssuer::new(&config.security.jwt_secret, config.security.token_ttl);
    let state = api::AppState {
        auth_manager: Arc::new(AuthManager::new(store, issuer)),
        cookie: config.cookie.clone(),
    };

    let app = api::create_router(state, config.cors_allowed_origin.as_deref());

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    tracing::info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Shutting down server...");
    if let Some(db) = database {
        db.close().await;
    }

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
