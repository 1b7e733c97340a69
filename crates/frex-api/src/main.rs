//! # frex-server — Binary Entry Point
//!
//! Starts the Axum HTTP server for the FREX delivery platform API.
//! Binds to a configurable port (default 3333). The token signing secret is
//! required and comes from the environment; startup fails without it.

use anyhow::Context;

use frex_api::{app, AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("configuration")?;
    let port = config.port;
    let state = AppState::in_memory(&config);

    // Seed the bootstrap administrator so a fresh deployment can log in.
    if let Some(admin) = &config.bootstrap_admin {
        state
            .auth
            .register_web_user(frex_auth::NewWebUser {
                name: admin.name.clone(),
                email: admin.email.clone(),
                password: admin.password.clone(),
                role: frex_core::Role::Admin,
            })
            .context("bootstrap admin")?;
        tracing::info!(email = %admin.email, "bootstrap administrator created");
    }

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("FREX API listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind listener")?;
    axum::serve(listener, app(state))
        .await
        .context("server error")?;

    Ok(())
}
