//! Per-kind admission validators.
//!
//! # Purpose
//! Decode the object under review, run the template guards, compute the rules
//! the write would grant and hand them to the escalation checker.
//!
//! # Key invariants
//! - Guards run before any escalation computation.
//! - A validator never mutates the caches it reads.
//! - Every failure maps to exactly one response code (see
//!   [`AdmissionError::code`]).
pub mod bindings;
pub mod templates;

use crate::api::types::AdmissionReview;
use crate::app::AppState;
use serde::de::DeserializeOwned;
use thiserror::Error;
use warden_rbac::{RbacError, RequestContext};

/// API group the bypass verbs are checked against.
pub const MANAGEMENT_GROUP: &str = "management.warden.io";
pub const TEMPLATES_RESOURCE: &str = "permissiontemplates";

/// Object kinds the service admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewKind {
    TemplateBindings,
    PermissionTemplates,
}

impl ReviewKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "templatebindings" => Some(Self::TemplateBindings),
            "permissiontemplates" => Some(Self::PermissionTemplates),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TemplateBindings => "templatebindings",
            Self::PermissionTemplates => "permissiontemplates",
        }
    }

    pub async fn validate(
        &self,
        state: &AppState,
        ctx: &RequestContext,
        review: &AdmissionReview,
    ) -> Result<(), AdmissionError> {
        match self {
            Self::TemplateBindings => bindings::validate(state, ctx, review).await,
            Self::PermissionTemplates => templates::validate(state, ctx, review).await,
        }
    }
}

#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Rbac(#[from] RbacError),
}

impl AdmissionError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }

    /// HTTP-style status reported in the admission response.
    pub fn code(&self) -> u16 {
        match self {
            Self::Invalid(_) => 400,
            Self::Rbac(err) if err.is_policy_rejection() => 403,
            Self::Rbac(RbacError::NotFound { .. } | RbacError::ContextMismatch { .. }) => 400,
            Self::Rbac(RbacError::Cancelled | RbacError::DeadlineExceeded) => 504,
            Self::Rbac(_) => 500,
        }
    }

    /// Label for the decision counter.
    pub fn outcome(&self) -> &'static str {
        match self.code() {
            400 => "invalid",
            403 => "denied",
            504 => "timeout",
            _ => "error",
        }
    }
}

/// Decode one of the review's object fields into a typed object.
pub(crate) fn decode<T: DeserializeOwned>(
    value: Option<&serde_json::Value>,
    field: &str,
) -> Result<T, AdmissionError> {
    let value = value.ok_or_else(|| AdmissionError::invalid(format!("{field} is required")))?;
    serde_json::from_value(value.clone())
        .map_err(|err| AdmissionError::invalid(format!("decode {field}: {err}")))
}
