//! Permission template admission.
//!
//! Creating or widening a template must not let its author describe
//! permissions they do not hold themselves; the bypass verb is `escalate` on
//! the template being written. Builtin templates are protected by the guards
//! before any of that runs.
use super::{AdmissionError, MANAGEMENT_GROUP, TEMPLATES_RESOURCE, decode};
use crate::api::types::{AdmissionReview, Operation};
use crate::app::AppState;
use warden_rbac::{
    EscalationRequest, PermissionTemplate, PolicyRule, RbacError, RequestContext,
    ResourceAttributes, Scope, TemplateResolver, ensure_builtin_update_allowed, ensure_deletable,
};

pub const ESCALATE_VERB: &str = "escalate";

pub async fn validate(
    state: &AppState,
    ctx: &RequestContext,
    review: &AdmissionReview,
) -> Result<(), AdmissionError> {
    match review.operation {
        Operation::Create => {
            let template: PermissionTemplate = decode(review.object.as_ref(), "object")?;
            validate_shape(&template)?;
            ensure_builtin_update_allowed(None, &template)?;
            check_escalation(state, ctx, review, &template).await
        }
        Operation::Update => {
            let template: PermissionTemplate = decode(review.object.as_ref(), "object")?;
            let old: PermissionTemplate = decode(review.old_object.as_ref(), "old_object")?;
            validate_shape(&template)?;
            if old.name != template.name {
                return Err(AdmissionError::invalid(format!(
                    "template name is immutable ({:?} -> {:?})",
                    old.name, template.name
                )));
            }
            ensure_builtin_update_allowed(Some(&old), &template)?;
            if old.rules == template.rules && old.inherits == template.inherits {
                return Ok(());
            }
            check_escalation(state, ctx, review, &template).await
        }
        Operation::Delete => {
            let template: PermissionTemplate = decode(
                review.old_object.as_ref().or(review.object.as_ref()),
                "old_object",
            )?;
            match ensure_deletable(state.templates.as_ref(), &template.name) {
                // Nothing left to protect.
                Err(RbacError::NotFound { .. }) => Ok(()),
                other => other.map_err(AdmissionError::from),
            }
        }
    }
}

/// Reject rules that could never match anything.
fn validate_shape(template: &PermissionTemplate) -> Result<(), AdmissionError> {
    if template.name.is_empty() {
        return Err(AdmissionError::invalid("template name is required"));
    }
    for (idx, rule) in template.rules.iter().enumerate() {
        validate_rule(rule).map_err(|reason| {
            AdmissionError::invalid(format!(
                "template {:?} rule {idx}: {reason}",
                template.name
            ))
        })?;
    }
    Ok(())
}

fn validate_rule(rule: &PolicyRule) -> Result<(), &'static str> {
    if rule.verbs.is_empty() {
        return Err("verbs must not be empty");
    }
    if rule.resources.is_empty() && rule.non_resource_urls.is_empty() {
        return Err("rule needs resources or nonResourceURLs");
    }
    if !rule.resources.is_empty() && !rule.non_resource_urls.is_empty() {
        return Err("rule cannot mix resources and nonResourceURLs");
    }
    if rule.is_non_resource_rule() && !rule.resource_names.is_empty() {
        return Err("resourceNames only apply to resources");
    }
    Ok(())
}

async fn check_escalation(
    state: &AppState,
    ctx: &RequestContext,
    review: &AdmissionReview,
    template: &PermissionTemplate,
) -> Result<(), AdmissionError> {
    let candidates = TemplateResolver::new(state.templates.as_ref())
        .resolve_template(template)?
        .into_rules();
    let bypass = ResourceAttributes::new(
        ESCALATE_VERB,
        MANAGEMENT_GROUP,
        TEMPLATES_RESOURCE,
        template.name.as_str(),
    );
    let request =
        EscalationRequest::new(&review.user, &candidates, Scope::Cluster).with_bypass(bypass);
    state
        .checker
        .ensure_no_escalation(ctx, &request, state.bindings.as_ref())
        .await?;
    Ok(())
}
