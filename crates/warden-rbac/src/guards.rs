//! Template guards that run before any escalation computation.
//!
//! These checks consult only the template store. Validators call them first so
//! a locked or builtin template is rejected no matter what the requester holds.
use crate::{PermissionTemplate, RbacError, RbacResult, Scope, TemplateContext, TemplateLookup};

/// Reject new references to a locked template. Returns the template so the
/// caller can resolve it without a second lookup.
pub fn ensure_bindable(lookup: &dyn TemplateLookup, name: &str) -> RbacResult<PermissionTemplate> {
    let template = lookup.get(name)?;
    if template.locked {
        tracing::debug!(template = %name, "rejecting reference to locked template");
        return Err(RbacError::TemplateLocked(template.name));
    }
    Ok(template)
}

/// Project templates are bound inside a namespace, cluster templates
/// cluster-wide.
pub fn ensure_context_matches(template: &PermissionTemplate, scope: &Scope) -> RbacResult<()> {
    if template.context == TemplateContext::for_scope(scope) {
        return Ok(());
    }
    Err(RbacError::ContextMismatch {
        name: template.name.clone(),
        context: template.context,
        scope: scope.to_string(),
    })
}

/// A builtin template may only have its `locked` flag toggled, and nobody may
/// set or clear the `builtin` flag itself.
///
/// `old` is `None` on create.
pub fn ensure_builtin_update_allowed(
    old: Option<&PermissionTemplate>,
    new: &PermissionTemplate,
) -> RbacResult<()> {
    let Some(old) = old else {
        if new.builtin {
            return Err(RbacError::BuiltinFlag(new.name.clone()));
        }
        return Ok(());
    };
    if old.builtin != new.builtin {
        return Err(RbacError::BuiltinFlag(new.name.clone()));
    }
    if !old.builtin {
        return Ok(());
    }
    let mut unlocked_old = old.clone();
    unlocked_old.locked = new.locked;
    if unlocked_old != *new {
        return Err(RbacError::BuiltinImmutable(new.name.clone()));
    }
    Ok(())
}

/// Builtin templates and templates other templates still inherit from cannot
/// be deleted. A template that is already gone is reported as not found.
pub fn ensure_deletable(lookup: &dyn TemplateLookup, name: &str) -> RbacResult<()> {
    let template = lookup.get(name)?;
    if template.builtin {
        return Err(RbacError::BuiltinUndeletable(template.name));
    }
    let mut by: Vec<String> = lookup
        .list()?
        .into_iter()
        .filter(|other| other.name != name && other.inherits_from(name))
        .map(|other| other.name)
        .collect();
    if !by.is_empty() {
        by.sort();
        return Err(RbacError::InUse {
            name: template.name,
            by,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryTemplateStore;
    use crate::{PolicyRule, TemplateResolver, covers_all};

    fn admin() -> PermissionTemplate {
        PermissionTemplate::new("admin")
            .with_rules(vec![PolicyRule::wildcard()])
            .builtin(true)
    }

    #[test]
    fn unlocked_template_is_bindable() {
        let store = MemoryTemplateStore::from_templates([PermissionTemplate::new("viewer")]);
        let template = ensure_bindable(&store, "viewer").expect("bindable");
        assert_eq!(template.name, "viewer");
    }

    #[test]
    fn locked_template_rejected_even_when_covered() {
        let store = MemoryTemplateStore::from_templates([PermissionTemplate::new("viewer")
            .with_rules(vec![PolicyRule::new().verbs(["get"]).api_groups([""]).resources(["pods"])])
            .locked(true)]);
        let held = vec![PolicyRule::wildcard()];
        let candidates = TemplateResolver::new(&store)
            .resolve_rules("viewer")
            .expect("resolve");
        assert!(covers_all(&held, candidates.rules()));

        let err = ensure_bindable(&store, "viewer").expect_err("locked");
        assert!(matches!(err, RbacError::TemplateLocked(ref name) if name == "viewer"));
        assert!(err.is_policy_rejection());
    }

    #[test]
    fn missing_template_is_not_bindable() {
        let err = ensure_bindable(&MemoryTemplateStore::new(), "ghost").expect_err("missing");
        assert!(err.is_not_found());
    }

    #[test]
    fn context_must_match_binding_scope() {
        let cluster = PermissionTemplate::new("viewer");
        let project = PermissionTemplate::new("team-viewer").with_context(TemplateContext::Project);
        let team_a = Scope::from_namespace(Some("team-a"));

        ensure_context_matches(&cluster, &Scope::Cluster).expect("cluster");
        ensure_context_matches(&project, &team_a).expect("project");

        let err = ensure_context_matches(&cluster, &team_a).expect_err("cluster in namespace");
        assert!(matches!(
            err,
            RbacError::ContextMismatch { ref name, context: TemplateContext::Cluster, .. }
                if name == "viewer"
        ));
        assert!(!err.is_policy_rejection());
        assert!(ensure_context_matches(&project, &Scope::Cluster).is_err());
    }

    #[test]
    fn builtin_may_toggle_locked_only() {
        let old = admin();
        ensure_builtin_update_allowed(Some(&old), &admin().locked(true)).expect("lock toggle");

        let widened = admin().inheriting(["other"]);
        let err = ensure_builtin_update_allowed(Some(&old), &widened).expect_err("changed");
        assert!(matches!(err, RbacError::BuiltinImmutable(_)));

        let mut renamed = admin();
        renamed.display_name = "Administrator".to_string();
        assert!(ensure_builtin_update_allowed(Some(&old), &renamed).is_err());
    }

    #[test]
    fn builtin_flag_cannot_change() {
        let custom = PermissionTemplate::new("custom");
        let err = ensure_builtin_update_allowed(Some(&custom), &custom.clone().builtin(true))
            .expect_err("set");
        assert!(matches!(err, RbacError::BuiltinFlag(_)));

        let err = ensure_builtin_update_allowed(Some(&admin()), &admin().builtin(false))
            .expect_err("clear");
        assert!(matches!(err, RbacError::BuiltinFlag(_)));

        let err = ensure_builtin_update_allowed(None, &admin()).expect_err("create builtin");
        assert!(matches!(err, RbacError::BuiltinFlag(_)));
    }

    #[test]
    fn regular_templates_update_freely() {
        let old = PermissionTemplate::new("custom");
        let new = old
            .clone()
            .with_rules(vec![PolicyRule::new().verbs(["get"])]);
        ensure_builtin_update_allowed(Some(&old), &new).expect("update");
        ensure_builtin_update_allowed(None, &new).expect("create");
    }

    #[test]
    fn delete_guard() {
        let store = MemoryTemplateStore::from_templates([
            admin(),
            PermissionTemplate::new("base"),
            PermissionTemplate::new("child-b").inheriting(["base"]),
            PermissionTemplate::new("child-a").inheriting(["base"]),
            PermissionTemplate::new("loner").inheriting(["loner"]),
        ]);

        let err = ensure_deletable(&store, "admin").expect_err("builtin");
        assert!(matches!(err, RbacError::BuiltinUndeletable(_)));

        match ensure_deletable(&store, "base").expect_err("in use") {
            RbacError::InUse { name, by } => {
                assert_eq!(name, "base");
                assert_eq!(by, vec!["child-a".to_string(), "child-b".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }

        // A self-reference does not keep a template alive.
        ensure_deletable(&store, "loner").expect("self reference");
        ensure_deletable(&store, "child-a").expect("leaf");
        assert!(ensure_deletable(&store, "ghost").expect_err("missing").is_not_found());
    }
}
