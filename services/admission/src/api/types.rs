//! Wire types for the admission HTTP API.
use serde::{Deserialize, Serialize};
use warden_rbac::Subject;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

/// One write the platform asks the service to admit or reject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionReview {
    pub uid: String,
    pub operation: Operation,
    pub user: Subject,
    #[serde(default)]
    pub namespace: Option<String>,
    /// The object as it would be stored. Absent on some deletes.
    #[serde(default)]
    pub object: Option<serde_json::Value>,
    /// The stored object being replaced or deleted.
    #[serde(default)]
    pub old_object: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionResponse {
    pub uid: String,
    pub allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub code: u16,
}

impl AdmissionResponse {
    pub fn allow(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            allowed: true,
            message: None,
            code: 200,
        }
    }

    pub fn deny(uid: impl Into<String>, code: u16, message: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            allowed: false,
            message: Some(message.into()),
            code,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}
