use anyhow::Context;
use dotenvy::dotenv;

use caseflow::logging::init_tracing;
use caseflow::metrics::{init_metrics, metrics_app};
use caseflow::router::init_router;
use caseflow::state::init_app_state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    init_tracing().context("Failed to initialize logging")?;

    let state = init_app_state().await?;

    let run_migrations = std::env::var("RUN_MIGRATIONS")
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false);
    if run_migrations {
        caseflow_db::run_migrations(&state.db)
            .await
            .context("Failed to run migrations")?;
        tracing::info!("Migrations applied");
    }

    let bind_address = state.server_config.bind_address();
    let mut app = init_router(state);

    if let Some(handle) = init_metrics().context("Failed to install metrics recorder")? {
        app = app.merge(metrics_app(handle));
    }

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("🚀 Server running on http://{}", bind_address);
    tracing::info!("📚 Swagger UI available at http://{}/swagger-ui", bind_address);
    tracing::info!("📖 Scalar UI available at http://{}/scalar", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutting down");
}
