//! In-memory capability implementations.
//!
//! # Purpose
//! Snapshot-backed implementations of [`TemplateLookup`], [`RuleResolver`] and
//! [`AuthorizationOracle`]. They exist for:
//! - tests of the checker and of validators built on it
//! - the admission service, seeded from a YAML snapshot at startup
//!
//! # Consistency
//! - Each store is guarded by a `parking_lot::RwLock` so the host can replace
//!   the snapshot while requests are in flight. A single call reads under one
//!   guard, never across an `.await`.
//! - Nothing here is durable.
//!
//! # Resolution semantics
//! A cluster binding grants its template in every scope; a namespaced binding
//! grants it only in that namespace. A binding whose template cannot be
//! resolved is skipped and the resolution is marked incomplete, which the
//! checker treats as a denial.
use crate::capability::{
    AuthorizationOracle, OracleDecision, ResourceAttributes, RuleResolution, RuleResolver, Scope,
};
use crate::covers::covers;
use crate::{
    PermissionTemplate, RbacError, RbacResult, RequestContext, Subject, TemplateLookup,
    TemplateResolver,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    templates: RwLock<HashMap<String, PermissionTemplate>>,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_templates<I>(templates: I) -> Self
    where
        I: IntoIterator<Item = PermissionTemplate>,
    {
        let store = Self::new();
        store.replace(templates);
        store
    }

    /// Insert or overwrite one template; returns the previous value.
    pub fn insert(&self, template: PermissionTemplate) -> Option<PermissionTemplate> {
        self.templates
            .write()
            .insert(template.name.clone(), template)
    }

    pub fn remove(&self, name: &str) -> Option<PermissionTemplate> {
        self.templates.write().remove(name)
    }

    /// Swap the whole snapshot at once.
    pub fn replace<I>(&self, templates: I)
    where
        I: IntoIterator<Item = PermissionTemplate>,
    {
        let next: HashMap<String, PermissionTemplate> = templates
            .into_iter()
            .map(|template| (template.name.clone(), template))
            .collect();
        *self.templates.write() = next;
    }

    pub fn len(&self) -> usize {
        self.templates.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.read().is_empty()
    }
}

impl TemplateLookup for MemoryTemplateStore {
    fn get(&self, name: &str) -> RbacResult<PermissionTemplate> {
        self.templates
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| RbacError::template_not_found(name))
    }

    fn list(&self) -> RbacResult<Vec<PermissionTemplate>> {
        let mut templates: Vec<PermissionTemplate> =
            self.templates.read().values().cloned().collect();
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(templates)
    }
}

/// Who a binding grants its template to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum BindingSubject {
    User(String),
    Group(String),
}

impl BindingSubject {
    pub fn matches(&self, subject: &Subject) -> bool {
        match self {
            BindingSubject::User(username) => subject.username == *username,
            BindingSubject::Group(group) => subject.in_group(group),
        }
    }
}

/// Grants one template to one user or group, cluster-wide or in a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateBinding {
    pub name: String,
    pub subject: BindingSubject,
    pub template: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

impl TemplateBinding {
    pub fn applies_to(&self, subject: &Subject, scope: &Scope) -> bool {
        if !self.subject.matches(subject) {
            return false;
        }
        match self.namespace.as_deref() {
            None | Some("") => true,
            Some(namespace) => scope.namespace() == Some(namespace),
        }
    }
}

/// Resolves held rules by walking a snapshot of template bindings.
pub struct BindingRuleResolver {
    templates: Arc<dyn TemplateLookup>,
    bindings: RwLock<Vec<TemplateBinding>>,
}

impl std::fmt::Debug for BindingRuleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingRuleResolver")
            .field("bindings", &self.bindings.read().len())
            .finish()
    }
}

impl BindingRuleResolver {
    pub fn new(templates: Arc<dyn TemplateLookup>) -> Self {
        Self {
            templates,
            bindings: RwLock::new(Vec::new()),
        }
    }

    pub fn with_bindings(self, bindings: Vec<TemplateBinding>) -> Self {
        *self.bindings.write() = bindings;
        self
    }

    pub fn add_binding(&self, binding: TemplateBinding) {
        self.bindings.write().push(binding);
    }

    pub fn remove_binding(&self, name: &str) -> Option<TemplateBinding> {
        let mut bindings = self.bindings.write();
        let idx = bindings.iter().position(|binding| binding.name == name)?;
        Some(bindings.remove(idx))
    }

    pub fn replace_bindings(&self, bindings: Vec<TemplateBinding>) {
        *self.bindings.write() = bindings;
    }

    pub fn bindings(&self) -> Vec<TemplateBinding> {
        self.bindings.read().clone()
    }

    /// Synchronous core of [`RuleResolver::rules_for`].
    pub fn resolve(&self, subject: &Subject, scope: &Scope) -> RbacResult<RuleResolution> {
        let applicable: Vec<TemplateBinding> = self
            .bindings
            .read()
            .iter()
            .filter(|binding| binding.applies_to(subject, scope))
            .cloned()
            .collect();

        let resolver = TemplateResolver::new(self.templates.as_ref());
        let mut rules = Vec::new();
        let mut failures = Vec::new();
        for binding in &applicable {
            match resolver.resolve_rules(&binding.template) {
                Ok(resolved) => rules.extend(resolved.into_rules()),
                Err(err) if err.is_not_found() => {
                    tracing::warn!(
                        binding = %binding.name,
                        template = %binding.template,
                        error = %err,
                        "skipping binding with unresolvable template"
                    );
                    failures.push(format!("binding {:?}: {err}", binding.name));
                }
                Err(err) => return Err(err),
            }
        }

        if failures.is_empty() {
            Ok(RuleResolution::complete(rules))
        } else {
            Ok(RuleResolution::incomplete(rules, failures.join("; ")))
        }
    }
}

#[async_trait]
impl RuleResolver for BindingRuleResolver {
    async fn rules_for(
        &self,
        ctx: &RequestContext,
        subject: &Subject,
        scope: &Scope,
    ) -> RbacResult<RuleResolution> {
        if ctx.is_cancelled() {
            return Err(RbacError::Cancelled);
        }
        self.resolve(subject, scope)
    }
}

/// Answers bypass queries from the same bindings the checker resolves against:
/// the subject is authorized when some held rule covers the one atomic request.
pub struct RuleOracle {
    resolver: Arc<dyn RuleResolver>,
}

impl RuleOracle {
    pub fn new(resolver: Arc<dyn RuleResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl AuthorizationOracle for RuleOracle {
    async fn check(
        &self,
        ctx: &RequestContext,
        subject: &Subject,
        attributes: &ResourceAttributes,
    ) -> RbacResult<OracleDecision> {
        let held = self
            .resolver
            .rules_for(ctx, subject, &attributes.scope())
            .await?;
        if covers(&held.rules, &attributes.as_rule()) {
            return Ok(OracleDecision::allow(format!(
                "{attributes} granted by bound templates"
            )));
        }
        Ok(OracleDecision::deny(format!("{attributes} not granted")))
    }
}
