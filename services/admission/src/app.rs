//! Admission HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures middleware, and defines the shared
//! application state injected into handlers.
//!
//! # Notes
//! This module centralizes route composition to keep `main` small and testable.
use crate::api;
use crate::config::AdmissionConfig;
use crate::snapshot::Snapshot;
use anyhow::Context;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use warden_rbac::EscalationChecker;
use warden_rbac::memory::{BindingRuleResolver, MemoryTemplateStore, RuleOracle};

#[derive(Clone)]
pub struct AppState {
    pub templates: Arc<MemoryTemplateStore>,
    pub bindings: Arc<BindingRuleResolver>,
    pub checker: EscalationChecker,
    pub capability_timeout: Duration,
    /// Cancelled on shutdown; every review runs under a child of it.
    pub shutdown: CancellationToken,
    pub metrics: PrometheusHandle,
}

impl AppState {
    /// Seed the in-memory capabilities from a snapshot.
    pub fn from_snapshot(
        snapshot: Snapshot,
        config: &AdmissionConfig,
        metrics: PrometheusHandle,
    ) -> Self {
        let templates = Arc::new(MemoryTemplateStore::from_templates(snapshot.templates));
        let bindings = Arc::new(
            BindingRuleResolver::new(templates.clone()).with_bindings(snapshot.bindings),
        );
        let checker = if config.oracle_enabled {
            EscalationChecker::with_oracle(Arc::new(RuleOracle::new(bindings.clone())))
        } else {
            EscalationChecker::new()
        };
        Self {
            templates,
            bindings,
            checker,
            capability_timeout: config.capability_timeout,
            shutdown: CancellationToken::new(),
            metrics,
        }
    }
}

/// Load the configured snapshot (if any) and assemble the state.
pub fn build_state(config: &AdmissionConfig, metrics: PrometheusHandle) -> anyhow::Result<AppState> {
    let snapshot = match &config.snapshot_path {
        Some(path) => Snapshot::load(path).context("load admission snapshot")?,
        None => Snapshot::default(),
    };
    tracing::info!(
        templates = snapshot.templates.len(),
        bindings = snapshot.bindings.len(),
        oracle = config.oracle_enabled,
        "admission caches seeded"
    );
    Ok(AppState::from_snapshot(snapshot, config, metrics))
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            )
        });

    Router::new()
        .route(
            "/v1/system/health",
            axum::routing::get(api::system::system_health),
        )
        .route("/metrics", axum::routing::get(api::system::metrics))
        .route(
            "/v1/admission/:kind",
            axum::routing::post(api::admission::review),
        )
        .layer(trace_layer)
        .with_state(state)
}
