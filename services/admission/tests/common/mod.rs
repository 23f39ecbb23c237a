#![allow(dead_code)]

use admission::app::{AppState, build_router};
use admission::config::AdmissionConfig;
use admission::observability;
use admission::snapshot::Snapshot;

pub const FIXTURE: &str = r#"
templates:
  - name: viewer
    rules:
      - verbs: [get, list]
        apiGroups: [""]
        resources: [pods]
  - name: editor
    inherits: [viewer]
    rules:
      - verbs: [update]
        apiGroups: [""]
        resources: [pods]
  - name: admin
    builtin: true
    rules:
      - verbs: ["*"]
        apiGroups: ["*"]
        resources: ["*"]
  - name: team-viewer
    context: project
    rules:
      - verbs: [get, list]
        apiGroups: [""]
        resources: [pods]
  - name: locked-viewer
    locked: true
    rules:
      - verbs: [get]
        apiGroups: [""]
        resources: [pods]
  - name: pod-star
    rules:
      - verbs: [get]
        apiGroups: [""]
        resources: ["pods/*"]
  - name: admin-binder
    rules:
      - verbs: [bind]
        apiGroups: [management.warden.io]
        resources: [permissiontemplates]
        resourceNames: [admin]
bindings:
  - name: alice-editor
    subject: { kind: user, name: alice }
    template: editor
  - name: root-admin
    subject: { kind: group, name: platform-admins }
    template: admin
  - name: bob-binder
    subject: { kind: user, name: bob }
    template: admin-binder
  - name: erin-pod-star
    subject: { kind: user, name: erin }
    template: pod-star
  - name: carol-viewer
    subject: { kind: user, name: carol }
    template: viewer
    namespace: team-a
  - name: dave-viewer
    subject: { kind: user, name: dave }
    template: viewer
  - name: dave-stale
    subject: { kind: user, name: dave }
    template: deleted-template
"#;

pub fn state_with(config: &AdmissionConfig) -> AppState {
    let snapshot = Snapshot::from_yaml_str(FIXTURE).expect("fixture");
    AppState::from_snapshot(
        snapshot,
        config,
        observability::init_observability("admission-test"),
    )
}

pub fn app() -> axum::routing::RouterIntoService<axum::body::Body, ()> {
    build_router(state_with(&AdmissionConfig::default())).into_service()
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}
