//! Warden admission HTTP service entry point.
//!
//! # Purpose
//! Wires configuration, the seeded caches and the HTTP router, then serves
//! until shutdown.
use admission::app::{build_router, build_state};
use admission::config::AdmissionConfig;
use admission::observability;
use std::future::Future;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AdmissionConfig::from_env_or_yaml()?;
    run_with_shutdown(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: AdmissionConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let metrics_handle = observability::init_observability("warden-admission");
    let state = build_state(&config, metrics_handle)?;
    let in_flight = state.shutdown.clone();
    let app = build_router(state);

    let addr = config.bind_addr;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "admission service listening");
    tokio::pin!(shutdown);
    tokio::select! {
        result = axum::serve(listener, app.into_make_service()) => {
            result?;
        }
        _ = &mut shutdown => {}
    }
    in_flight.cancel();
    tracing::info!("admission service stopped");
    Ok(())
}
