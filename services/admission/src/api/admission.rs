//! Admission review handler.
//!
//! # Purpose and responsibility
//! Accepts one [`AdmissionReview`] for a known object kind, runs the matching
//! validator under a fresh [`RequestContext`], and answers with an
//! [`AdmissionResponse`].
//!
//! # Key invariants and assumptions
//! - A decision, allow or deny, is always HTTP 200; the verdict is in the body.
//! - Unknown kinds and malformed envelopes are HTTP errors, not denials.
//! - Every decision is logged and counted exactly once.
use crate::api::error::{ApiError, api_not_found, api_validation_error};
use crate::api::types::{AdmissionResponse, AdmissionReview};
use crate::app::AppState;
use crate::observability;
use crate::validate::ReviewKind;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use warden_rbac::RequestContext;

pub(crate) async fn review(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    payload: Result<Json<AdmissionReview>, JsonRejection>,
) -> Result<Json<AdmissionResponse>, ApiError> {
    let kind = ReviewKind::parse(&kind)
        .ok_or_else(|| api_not_found(&format!("unknown admission kind {kind:?}")))?;
    let Json(review) = payload.map_err(|err| api_validation_error(&err.body_text()))?;

    let ctx = RequestContext::with_timeout(state.capability_timeout)
        .with_cancellation(state.shutdown.child_token());
    let outcome = kind.validate(&state, &ctx, &review).await;

    let response = match outcome {
        Ok(()) => {
            tracing::info!(
                uid = %review.uid,
                kind = kind.as_str(),
                operation = ?review.operation,
                user = %review.user.username,
                "admission allowed"
            );
            observability::record_decision(kind.as_str(), "allowed");
            AdmissionResponse::allow(&review.uid)
        }
        Err(err) => {
            let code = err.code();
            if code >= 500 {
                tracing::error!(
                    uid = %review.uid,
                    kind = kind.as_str(),
                    code,
                    error = %err,
                    "admission failed"
                );
            } else {
                tracing::warn!(
                    uid = %review.uid,
                    kind = kind.as_str(),
                    operation = ?review.operation,
                    user = %review.user.username,
                    code,
                    error = %err,
                    "admission rejected"
                );
            }
            observability::record_decision(kind.as_str(), err.outcome());
            AdmissionResponse::deny(&review.uid, code, err.to_string())
        }
    };
    Ok(Json(response))
}
