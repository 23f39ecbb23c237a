//! Observability wiring for the admission service.
//!
//! # Purpose
//! Installs the tracing subscriber and the Prometheus metrics recorder, and
//! names the decision counter every validator outcome is recorded under.
//!
//! # Notes
//! Initialization is guarded by `OnceLock` to keep startup idempotent in tests.
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const DECISIONS_TOTAL: &str = "warden_admission_decisions_total";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
static OBS_INIT: OnceLock<()> = OnceLock::new();

pub fn init_observability(service_name: &str) -> PrometheusHandle {
    OBS_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer();
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init();
        tracing::debug!(service = %service_name, "tracing initialized");
    });

    install_metrics_recorder()
}

/// Count one admission decision.
pub fn record_decision(kind: &'static str, outcome: &'static str) {
    metrics::counter!(DECISIONS_TOTAL, "kind" => kind, "outcome" => outcome).increment(1);
}

fn install_metrics_recorder() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let recorder = PrometheusBuilder::new().build_recorder();
            let handle = recorder.handle();
            if metrics::set_global_recorder(recorder).is_err() {
                tracing::warn!("a global metrics recorder is already installed");
            }
            handle
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn install_metrics_recorder_is_cached() {
        let handle1 = install_metrics_recorder();
        let handle2 = install_metrics_recorder();
        let _ = (handle1.render(), handle2.render());
    }

    #[tokio::test(flavor = "multi_thread")]
    #[serial]
    async fn init_observability_is_idempotent() {
        let handle1 = init_observability("admission-test");
        let handle2 = init_observability("admission-test");
        let _ = (handle1.render(), handle2.render());
    }

    #[test]
    #[serial]
    fn decisions_are_rendered() {
        let handle = init_observability("admission-test");
        record_decision("templatebindings", "denied");
        let rendered = handle.render();
        assert!(rendered.contains(DECISIONS_TOTAL), "{rendered}");
        assert!(rendered.contains("outcome=\"denied\""), "{rendered}");
    }
}
