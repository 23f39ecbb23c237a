//! Permission templates and the template lookup capability.
//!
//! # Purpose
//! A [`PermissionTemplate`] is a named, shareable bundle of rules that may
//! inherit the rules of other templates by name.
//!
//! # How it fits
//! The host platform owns template storage and keeps a cache of it fresh. This
//! crate only reads templates through [`TemplateLookup`], one point-in-time
//! snapshot per call.
//!
//! # Key invariants
//! - Inheritance references may form cycles, including self-references.
//! - `locked` templates cannot be referenced by new bindings.
//! - `builtin` templates are platform-provided and mostly immutable.
use crate::{PolicyRule, RbacResult, Scope};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a template may be bound: `Cluster` templates by cluster-wide
/// bindings, `Project` templates by bindings inside one namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateContext {
    #[default]
    Cluster,
    Project,
}

impl TemplateContext {
    /// The context a binding in `scope` must reference.
    pub fn for_scope(scope: &Scope) -> Self {
        match scope {
            Scope::Cluster => TemplateContext::Cluster,
            Scope::Namespace(_) => TemplateContext::Project,
        }
    }
}

impl fmt::Display for TemplateContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateContext::Cluster => f.write_str("cluster"),
            TemplateContext::Project => f.write_str("project"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionTemplate {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub context: TemplateContext,
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
    #[serde(default)]
    pub inherits: Vec<String>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub builtin: bool,
}

impl PermissionTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_rules(mut self, rules: Vec<PolicyRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn inheriting<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inherits = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn builtin(mut self, builtin: bool) -> Self {
        self.builtin = builtin;
        self
    }

    pub fn with_context(mut self, context: TemplateContext) -> Self {
        self.context = context;
        self
    }

    pub fn inherits_from(&self, name: &str) -> bool {
        self.inherits.iter().any(|parent| parent == name)
    }
}

/// Read-only access to the platform's template cache.
///
/// Implementations return [`RbacError::NotFound`](crate::RbacError::NotFound)
/// for a missing name and never mutate the templates they serve.
pub trait TemplateLookup: Send + Sync {
    fn get(&self, name: &str) -> RbacResult<PermissionTemplate>;

    fn list(&self) -> RbacResult<Vec<PermissionTemplate>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let template = PermissionTemplate::new("project-member")
            .with_rules(vec![PolicyRule::new().verbs(["get"])])
            .inheriting(["project-viewer"])
            .locked(true)
            .with_context(TemplateContext::Project);
        assert_eq!(template.name, "project-member");
        assert_eq!(template.rules.len(), 1);
        assert!(template.inherits_from("project-viewer"));
        assert!(!template.inherits_from("cluster-owner"));
        assert!(template.locked);
        assert!(!template.builtin);
        assert_eq!(template.context, TemplateContext::Project);
    }

    #[test]
    fn context_follows_binding_scope() {
        assert_eq!(
            TemplateContext::for_scope(&Scope::Cluster),
            TemplateContext::Cluster
        );
        assert_eq!(
            TemplateContext::for_scope(&Scope::from_namespace(Some("team-a"))),
            TemplateContext::Project
        );
        assert_eq!(TemplateContext::Project.to_string(), "project");
    }

    #[test]
    fn deserializes_minimal_template() {
        let template: PermissionTemplate =
            serde_json::from_value(serde_json::json!({ "name": "empty" })).expect("template");
        assert_eq!(template, PermissionTemplate::new("empty"));
    }
}
