mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use sedp_api::AppStateInner;
use sedp_api::auth::PasswordAuthenticator;
use sedp_api::notify::WebhookNotifier;
use sedp_core::{Notifier, SystemClock, TracingNotifier};
use sedp_db::Database;

use crate::config::{AdminPassword, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sedp=debug,tower_http=debug".into()),
        )
        .init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {e:#}");
            std::process::exit(1);
        }
    };

    // Init database
    let db = Database::open(&config.db_path)?;

    let notifier: Arc<dyn Notifier> = match &config.notify_webhook {
        Some(url) => {
            info!("Sending decision notifications to {}", url);
            Arc::new(WebhookNotifier::new(url.clone())?)
        }
        None => {
            info!("SEDP_NOTIFY_WEBHOOK not set, notifications are logged only");
            Arc::new(TracingNotifier)
        }
    };

    let authenticator = match config.admin_password {
        AdminPassword::Hash(hash) => PasswordAuthenticator::new(&config.admin_username, hash)?,
        AdminPassword::Plain(password) => {
            PasswordAuthenticator::from_plaintext(&config.admin_username, &password)?
        }
    };

    let state = AppStateInner::new(
        Arc::new(db),
        Arc::new(SystemClock),
        notifier,
        Arc::new(authenticator),
        config.jwt_secret,
    );
    let app = sedp_api::router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("SEDP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    tracing::warn!("Failed to install SIGTERM handler: {}", e);
                    ctrl_c.await.ok();
                    info!("Received Ctrl+C, shutting down...");
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
