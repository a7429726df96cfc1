pub mod api;
pub mod config;
pub mod errors;
pub mod executor;
pub mod metrics_defs;
pub mod posts;
pub mod query;
pub mod upstream;

#[cfg(test)]
mod testutils;

use crate::errors::AggregatorError;
use crate::executor::Executor;
use crate::upstream::HttpPostSource;
use shared::admin_service::AdminService;
use shared::http::run_http_service;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Serves the `/api` endpoints and the admin listener until either fails.
pub async fn run(config: config::Config) -> Result<(), AggregatorError> {
    shared::metrics_defs::describe_all(metrics_defs::ALL_METRICS);

    let source = Arc::new(HttpPostSource::new(&config.upstream));
    let executor = Executor::new(source, config.upstream.execution_mode);
    let app = api::router(executor);

    tracing::info!(
        upstream = %config.upstream.url,
        mode = ?config.upstream.execution_mode,
        "Starting aggregator"
    );

    let api_task = async {
        let listener = TcpListener::bind(config.listener.addr()).await?;
        tracing::info!(addr = %config.listener.addr(), "Serving api");
        axum::serve(listener, app).await
    };
    let admin_task = run_http_service(
        &config.admin_listener.host,
        config.admin_listener.port,
        AdminService::new(|| true),
    );

    tokio::try_join!(api_task, admin_task)?;
    Ok(())
}
