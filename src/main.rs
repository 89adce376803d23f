use std::sync::Arc;

use refuel::config::Configuration;
use refuel::crypto::PasswordManager;
use refuel::token::TokenManager;
use refuel::user::{
    DEFAULT_CREDENTIALS, DEFAULT_DATABASE_NAME, DEFAULT_POOL_SIZE,
    PgUserStore, UserService,
};
use refuel::{AppState, app};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // read configuration file. let it in memory.
    let config = Configuration::default().read()?;

    let store = match config.postgres {
        Some(ref postgres) => {
            PgUserStore::connect(
                &postgres.address,
                &postgres
                    .username
                    .clone()
                    .unwrap_or(DEFAULT_CREDENTIALS.into()),
                &postgres
                    .password
                    .clone()
                    .unwrap_or(DEFAULT_CREDENTIALS.into()),
                &postgres
                    .database
                    .clone()
                    .unwrap_or(DEFAULT_DATABASE_NAME.into()),
                postgres.pool_size.unwrap_or(DEFAULT_POOL_SIZE),
            )
            .await?
        },
        None => {
            tracing::error!("missing `postgres` entry on `config.yaml` file");
            std::process::exit(0);
        },
    };

    // execute migrations scripts on start.
    sqlx::migrate!().run(store.pool()).await?;

    // handle jwt.
    let secret = config
        .token
        .as_ref()
        .and_then(|t| t.secret.clone())
        .or_else(|| std::env::var("JWT_SECRET").ok());
    let Some(secret) = secret else {
        tracing::warn!(
            "missing `token.secret` on `config.yaml` and `JWT_SECRET` \
             environment variable"
        );
        std::process::exit(0);
    };
    let mut token = TokenManager::new(&config.url, &secret);
    if let Some(audience) =
        config.token.as_ref().and_then(|t| t.audience.as_ref())
    {
        token.audience(audience);
    }

    let pwd = Arc::new(PasswordManager::new(config.argon2.clone())?);
    let users = UserService::new(Arc::new(store), pwd);

    let port = config.port;
    let state = AppState {
        config,
        users,
        token,
    };

    let listener =
        tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!(%port, "server started");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "cannot listen for shutdown signal");
    }
}
