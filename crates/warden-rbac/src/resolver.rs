//! Template inheritance flattening.
//!
//! # Purpose
//! Walks a template's `inherits` graph and returns every rule declared on any
//! reachable template as one [`ResolvedRuleSet`].
//!
//! # How it fits
//! Validators resolve the template a binding references to learn what the
//! binding would grant. The in-memory rule resolver uses the same walk to
//! compute what a subject already holds.
//!
//! # Key invariants
//! - Breadth-first over an explicit queue with a visited set; no recursion.
//! - Each template name is looked up at most once per call, so cyclic and
//!   self-referencing graphs terminate.
//! - Rules are returned as declared; only templates are de-duplicated.
//!
//! # Examples
//! ```rust
//! use warden_rbac::memory::MemoryTemplateStore;
//! use warden_rbac::{PermissionTemplate, PolicyRule, TemplateResolver};
//!
//! let store = MemoryTemplateStore::from_templates([
//!     PermissionTemplate::new("a")
//!         .with_rules(vec![PolicyRule::new().verbs(["get"])])
//!         .inheriting(["b"]),
//!     PermissionTemplate::new("b")
//!         .with_rules(vec![PolicyRule::new().verbs(["list"])])
//!         .inheriting(["a"]),
//! ]);
//! let resolved = TemplateResolver::new(&store).resolve_rules("a").unwrap();
//! assert_eq!(resolved.len(), 2);
//! ```
use crate::{PermissionTemplate, PolicyRule, RbacResult, TemplateLookup};
use std::collections::{HashSet, VecDeque};

/// Flattened rules reachable from one or more templates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedRuleSet {
    rules: Vec<PolicyRule>,
    templates: Vec<String>,
}

impl ResolvedRuleSet {
    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }

    pub fn into_rules(self) -> Vec<PolicyRule> {
        self.rules
    }

    /// Names of the templates visited, in visit order.
    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Set comparison of the collected rules, ignoring order and duplicates.
    pub fn same_rules(&self, other: &ResolvedRuleSet) -> bool {
        let left: HashSet<&PolicyRule> = self.rules.iter().collect();
        let right: HashSet<&PolicyRule> = other.rules.iter().collect();
        left == right
    }
}

pub struct TemplateResolver<'a> {
    lookup: &'a dyn TemplateLookup,
}

impl<'a> TemplateResolver<'a> {
    pub fn new(lookup: &'a dyn TemplateLookup) -> Self {
        Self { lookup }
    }

    /// Resolve every rule reachable from `name`.
    ///
    /// # Errors
    /// - [`RbacError::NotFound`](crate::RbacError::NotFound) naming the first
    ///   template that could not be found, including `name` itself.
    /// - Any backend error from the lookup, unchanged.
    pub fn resolve_rules(&self, name: &str) -> RbacResult<ResolvedRuleSet> {
        self.resolve_many([name])
    }

    /// Resolve the union of rules reachable from several roots.
    pub fn resolve_many<I, S>(&self, roots: I) -> RbacResult<ResolvedRuleSet>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut walk = Walk::default();
        for root in roots {
            walk.enqueue(root.as_ref());
        }
        self.drain(walk)
    }

    /// Resolve a template object that may not be stored yet, such as one being
    /// admitted. Its own rules are included and its own name counts as visited,
    /// so a self-reference never hits the store.
    pub fn resolve_template(&self, template: &PermissionTemplate) -> RbacResult<ResolvedRuleSet> {
        let mut walk = Walk::default();
        walk.visit(template);
        self.drain(walk)
    }

    fn drain(&self, mut walk: Walk) -> RbacResult<ResolvedRuleSet> {
        while let Some(name) = walk.queue.pop_front() {
            let template = self.lookup.get(&name)?;
            walk.visit(&template);
        }
        tracing::trace!(
            templates = walk.resolved.templates.len(),
            rules = walk.resolved.rules.len(),
            "resolved template rules"
        );
        Ok(walk.resolved)
    }
}

#[derive(Default)]
struct Walk {
    seen: HashSet<String>,
    queue: VecDeque<String>,
    resolved: ResolvedRuleSet,
}

impl Walk {
    /// Queue `name` unless it was already queued or visited.
    fn enqueue(&mut self, name: &str) {
        if self.seen.insert(name.to_string()) {
            self.queue.push_back(name.to_string());
        }
    }

    fn visit(&mut self, template: &PermissionTemplate) {
        self.seen.insert(template.name.clone());
        self.resolved.templates.push(template.name.clone());
        self.resolved.rules.extend(template.rules.iter().cloned());
        for parent in &template.inherits {
            self.enqueue(parent);
        }
    }
}
