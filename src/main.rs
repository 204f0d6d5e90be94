//! authgate - account registration and login service

use authgate::{api, auth, core, db};

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (handles CLI args, env vars, and config file)
    let config = match core::config::Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Print error to stderr since logging isn't initialized yet
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let _logger = match core::Logger::init(&config.logging) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return Err(e);
        }
    };

    info!("Starting authgate v{}", authgate::VERSION);
    info!(
        host = %config.server.host,
        port = config.server.port,
        environment = ?config.server.environment,
        "Server configuration"
    );
    info!(path = ?config.database.path, "Database configuration");

    info!("Initializing database...");
    let db = Arc::new(
        db::DatabaseManager::new(
            &config.database.path,
            config.database.connection_pool_size,
            std::time::Duration::from_millis(config.database.busy_timeout),
        )
        .context("failed to open user database")?,
    );

    let users = Arc::new(db::UserRepository::new(db));
    let user_count = users.count().await?;
    info!(users = user_count, "Database initialized successfully");

    let issuer = auth::TokenIssuer::new(
        &config.security.jwt_secret,
        chrono::Duration::days(config.security.session_ttl_days),
    )?;
    let hasher = Arc::new(auth::BcryptHasher::new(config.security.bcrypt_cost));
    info!(
        session_ttl_days = issuer.ttl().num_days(),
        bcrypt_cost = hasher.cost(),
        secure_cookie = config.is_production(),
        "Auth configuration"
    );
    let auth_service = auth::AuthService::new(users, hasher, issuer)
        .await
        .context("failed to initialize auth service")?;

    let state = api::AppState {
        auth: Arc::new(auth_service),
        session_cookie: auth::SessionCookie::new(
            config.is_production(),
            config.security.session_ttl_seconds(),
        ),
    };

    info!("Initializing HTTP server...");
    let server_url = format!("http://{}:{}", config.server.host, config.server.port);
    let server = api::ApiServer::new(&config, state);

    info!(url = %server_url, "Server ready - starting to serve requests");

    server.serve().await?;

    Ok(())
}
