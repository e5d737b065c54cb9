//! # BeHonest Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;

use web_server::config::AppConfig;
use web_server::configure_app;
use web_server::state::AppState;
use web_server::telemetry::init_telemetry;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    init_telemetry(&config.telemetry);

    tracing::info!("Starting BeHonest on {}:{}", config.host, config.port);

    let state = AppState::new(&config).await;

    #[cfg(feature = "scheduler")]
    let scheduler = start_scheduler(&config, &state).await;

    let app_state = state.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .configure(configure_app(app_state.clone()))
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?
    .run()
    .await
    .context("server terminated with an error")?;

    #[cfg(feature = "scheduler")]
    stop_scheduler(scheduler).await;

    tracing::info!("Server stopped");
    Ok(())
}

#[cfg(feature = "scheduler")]
async fn start_scheduler(
    config: &AppConfig,
    state: &AppState,
) -> Option<web_server::background::Scheduler> {
    if !config.scheduler_enabled {
        tracing::info!("Scheduler disabled");
        return None;
    }

    match web_server::background::start(state).await {
        Ok(scheduler) => Some(scheduler),
        Err(e) => {
            tracing::error!(error = %e, "Failed to start scheduler");
            None
        }
    }
}

#[cfg(feature = "scheduler")]
async fn stop_scheduler(scheduler: Option<web_server::background::Scheduler>) {
    if let Some(mut scheduler) = scheduler {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!(error = %e, "Scheduler did not shut down cleanly");
        }
    }
}
