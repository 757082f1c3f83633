// crates/server/src/main.rs
//! Task caching server binary.
//!
//! Reads configuration from the environment, then serves the task API until
//! Ctrl-C. All task state lives in memory and is gone on exit.

use anyhow::Result;
use task_caching_server::{create_app, AppState, Config};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn,task_caching_server=info,task_caching_jobs=info,tower_http=info";

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .compact()
        .init();

    let config = Config::from_env();
    let state = AppState::new(config.report_delay);
    let app = create_app(state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    eprintln!("\n  task-caching v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("  \u{2192} http://{}\n", addr);
    tracing::info!(
        %addr,
        report_delay_ms = config.report_delay.as_millis() as u64,
        "Task caching server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
