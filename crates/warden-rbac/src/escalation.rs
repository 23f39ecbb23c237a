//! Privilege-escalation checks.
//!
//! # Purpose
//! Decides whether a requester may grant a set of candidate rules: they must
//! already hold every one of them, or be authorized for the bypass verb on the
//! exact object being written.
//!
//! # How it fits
//! Per-kind validators compute the candidate rules (for instance by resolving
//! the template a binding references) and call
//! [`EscalationChecker::confirm_no_escalation`]. The checker asks the host's
//! [`RuleResolver`] what the requester holds, runs the covering engine, and
//! falls back to the [`AuthorizationOracle`] when something is uncovered.
//!
//! # Key invariants
//! - Incomplete rule resolution never grants access on coverage alone; every
//!   candidate is treated as uncovered until the oracle says otherwise.
//! - No retries and no state between calls; one checker can serve many
//!   concurrent requests.
//! - Capability errors propagate unchanged.
//!
//! # Security considerations
//! - The bypass query names one object and one verb. Never widen it to a
//!   collection or wildcard name.
use crate::capability::{AuthorizationOracle, ResourceAttributes, RuleResolver, Scope};
use crate::covers::uncovered_rules;
use crate::{Decision, PolicyRule, RbacResult, RequestContext, Subject};
use std::sync::Arc;

/// What a validator asks the checker.
#[derive(Debug, Clone)]
pub struct EscalationRequest<'a> {
    pub subject: &'a Subject,
    pub candidate_rules: &'a [PolicyRule],
    pub scope: Scope,
    /// Object and bypass verb to ask the oracle about when coverage fails.
    pub bypass: Option<ResourceAttributes>,
}

impl<'a> EscalationRequest<'a> {
    pub fn new(subject: &'a Subject, candidate_rules: &'a [PolicyRule], scope: Scope) -> Self {
        Self {
            subject,
            candidate_rules,
            scope,
            bypass: None,
        }
    }

    pub fn with_bypass(mut self, attributes: ResourceAttributes) -> Self {
        self.bypass = Some(attributes);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationVerdict {
    pub allowed: bool,
    /// Empty when allowed by coverage; may be non-empty when `bypassed`.
    pub uncovered: Vec<PolicyRule>,
    pub resolution_complete: bool,
    pub bypassed: bool,
    pub incomplete_reason: Option<String>,
}

impl EscalationVerdict {
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            uncovered: Vec::new(),
            resolution_complete: true,
            bypassed: false,
            incomplete_reason: None,
        }
    }

    pub fn denied(
        uncovered: Vec<PolicyRule>,
        resolution_complete: bool,
        incomplete_reason: Option<String>,
    ) -> Self {
        Self {
            allowed: false,
            uncovered,
            resolution_complete,
            bypassed: false,
            incomplete_reason,
        }
    }
}

#[derive(Clone, Default)]
pub struct EscalationChecker {
    oracle: Option<Arc<dyn AuthorizationOracle>>,
}

impl std::fmt::Debug for EscalationChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscalationChecker")
            .field("oracle", &self.oracle.is_some())
            .finish()
    }
}

impl EscalationChecker {
    /// Checker without a bypass path: anything uncovered is denied.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_oracle(oracle: Arc<dyn AuthorizationOracle>) -> Self {
        Self {
            oracle: Some(oracle),
        }
    }

    pub fn has_oracle(&self) -> bool {
        self.oracle.is_some()
    }

    /// Decide whether `request.subject` may grant `request.candidate_rules`.
    ///
    /// # Errors
    /// - Rule resolution and oracle failures, unchanged.
    /// - [`RbacError::Cancelled`](crate::RbacError::Cancelled) or
    ///   [`RbacError::DeadlineExceeded`](crate::RbacError::DeadlineExceeded)
    ///   when `ctx` ends first.
    pub async fn confirm_no_escalation(
        &self,
        ctx: &RequestContext,
        request: &EscalationRequest<'_>,
        resolver: &dyn RuleResolver,
    ) -> RbacResult<EscalationVerdict> {
        if request.candidate_rules.is_empty() {
            return Ok(EscalationVerdict::allowed());
        }

        // Step 1: ask the host what the requester already holds.
        let resolution = ctx
            .run(resolver.rules_for(ctx, request.subject, &request.scope))
            .await?;

        // Step 2/3: fail closed on partial information, otherwise compare.
        let uncovered = if resolution.complete {
            uncovered_rules(&resolution.rules, request.candidate_rules)
        } else {
            request.candidate_rules.to_vec()
        };

        if uncovered.is_empty() {
            return Ok(EscalationVerdict::allowed());
        }

        tracing::debug!(
            user = %request.subject.username,
            scope = %request.scope,
            uncovered = uncovered.len(),
            complete = resolution.complete,
            "candidate rules not covered by held rules"
        );

        // Step 4: a narrowly scoped bypass may still authorize the request.
        if let (Some(oracle), Some(attributes)) = (&self.oracle, &request.bypass) {
            let decision = ctx
                .run(oracle.check(ctx, request.subject, attributes))
                .await?;
            if decision.allowed {
                tracing::debug!(
                    user = %request.subject.username,
                    bypass = %attributes,
                    "escalation authorized by bypass verb"
                );
                return Ok(EscalationVerdict {
                    allowed: true,
                    uncovered,
                    resolution_complete: resolution.complete,
                    bypassed: true,
                    incomplete_reason: resolution.incomplete_reason,
                });
            }
            tracing::debug!(
                user = %request.subject.username,
                bypass = %attributes,
                reason = %decision.reason,
                "bypass verb not granted"
            );
        }

        Ok(EscalationVerdict::denied(
            uncovered,
            resolution.complete,
            resolution.incomplete_reason,
        ))
    }

    /// Like [`confirm_no_escalation`](Self::confirm_no_escalation), but a
    /// denial becomes [`RbacError::EscalationDenied`](crate::RbacError::EscalationDenied).
    pub async fn ensure_no_escalation(
        &self,
        ctx: &RequestContext,
        request: &EscalationRequest<'_>,
        resolver: &dyn RuleResolver,
    ) -> RbacResult<()> {
        let verdict = self.confirm_no_escalation(ctx, request, resolver).await?;
        Decision::from_verdict(request.subject, &verdict).into_result()
    }
}
