//! Template binding admission.
//!
//! A new binding grants every rule reachable from its template, so the
//! requester must already hold all of them in the binding's scope, or hold the
//! `bind` verb on that one template.
use super::{AdmissionError, MANAGEMENT_GROUP, TEMPLATES_RESOURCE, decode};
use crate::api::types::{AdmissionReview, Operation};
use crate::app::AppState;
use warden_rbac::memory::TemplateBinding;
use warden_rbac::{
    EscalationRequest, RequestContext, ResourceAttributes, Scope, TemplateResolver,
    ensure_bindable, ensure_context_matches,
};

pub const BIND_VERB: &str = "bind";

pub async fn validate(
    state: &AppState,
    ctx: &RequestContext,
    review: &AdmissionReview,
) -> Result<(), AdmissionError> {
    match review.operation {
        Operation::Create => {
            let binding: TemplateBinding = decode(review.object.as_ref(), "object")?;
            validate_create(state, ctx, review, &binding).await
        }
        Operation::Update => {
            let binding: TemplateBinding = decode(review.object.as_ref(), "object")?;
            let old: TemplateBinding = decode(review.old_object.as_ref(), "old_object")?;
            validate_update(&old, &binding)
        }
        // Removing a grant never escalates.
        Operation::Delete => Ok(()),
    }
}

async fn validate_create(
    state: &AppState,
    ctx: &RequestContext,
    review: &AdmissionReview,
    binding: &TemplateBinding,
) -> Result<(), AdmissionError> {
    if binding.template.is_empty() {
        return Err(AdmissionError::invalid("binding template is required"));
    }

    let template = ensure_bindable(state.templates.as_ref(), &binding.template)?;
    let namespace = binding
        .namespace
        .as_deref()
        .or(review.namespace.as_deref());
    let scope = Scope::from_namespace(namespace);
    ensure_context_matches(&template, &scope)?;

    let candidates = TemplateResolver::new(state.templates.as_ref())
        .resolve_template(&template)?
        .into_rules();
    let mut bypass = ResourceAttributes::new(
        BIND_VERB,
        MANAGEMENT_GROUP,
        TEMPLATES_RESOURCE,
        template.name.as_str(),
    );
    if let Some(namespace) = scope.namespace() {
        bypass = bypass.in_namespace(namespace);
    }

    let request = EscalationRequest::new(&review.user, &candidates, scope).with_bypass(bypass);
    state
        .checker
        .ensure_no_escalation(ctx, &request, state.bindings.as_ref())
        .await?;
    tracing::debug!(
        binding = %binding.name,
        template = %template.name,
        rules = candidates.len(),
        "binding grants no new permissions"
    );
    Ok(())
}

fn validate_update(old: &TemplateBinding, new: &TemplateBinding) -> Result<(), AdmissionError> {
    if old.template != new.template || old.subject != new.subject || old.namespace != new.namespace
    {
        return Err(AdmissionError::invalid(format!(
            "binding {:?}: template, subject and namespace are immutable",
            new.name
        )));
    }
    Ok(())
}
