//! Capabilities the host platform supplies to the checker.
//!
//! # Purpose
//! Defines the two asynchronous seams of the escalation checker:
//! [`RuleResolver`] (what does this subject already hold in a scope?) and
//! [`AuthorizationOracle`] (may this subject perform one verb on one object?).
//!
//! # How it fits
//! Binding storage and built-in role semantics belong to the host. The checker
//! only sees these traits, so tests and the admission service can plug in the
//! snapshot implementations from [`crate::memory`].
//!
//! # Key invariants
//! - One round trip per call; implementations do not retry.
//! - Implementations honor the [`RequestContext`] they are handed.
use crate::{PolicyRule, RbacResult, RequestContext, Subject};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where permissions are resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Cluster,
    Namespace(String),
}

impl Scope {
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Scope::Cluster => None,
            Scope::Namespace(namespace) => Some(namespace.as_str()),
        }
    }

    pub fn from_namespace(namespace: Option<&str>) -> Self {
        match namespace {
            Some(namespace) if !namespace.is_empty() => Scope::Namespace(namespace.to_string()),
            _ => Scope::Cluster,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Cluster => f.write_str("cluster"),
            Scope::Namespace(namespace) => write!(f, "namespace/{namespace}"),
        }
    }
}

/// One concrete object and the verb asked about it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceAttributes {
    pub verb: String,
    pub group: String,
    pub resource: String,
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

impl ResourceAttributes {
    pub fn new(
        verb: impl Into<String>,
        group: impl Into<String>,
        resource: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            verb: verb.into(),
            group: group.into(),
            resource: resource.into(),
            name: name.into(),
            namespace: None,
        }
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn scope(&self) -> Scope {
        Scope::from_namespace(self.namespace.as_deref())
    }

    /// The narrowest rule that would permit exactly this request.
    pub fn as_rule(&self) -> PolicyRule {
        PolicyRule::new()
            .verbs([self.verb.as_str()])
            .api_groups([self.group.as_str()])
            .resources([self.resource.as_str()])
            .resource_names([self.name.as_str()])
    }
}

impl fmt::Display for ResourceAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let group = if self.group.is_empty() {
            "core"
        } else {
            self.group.as_str()
        };
        write!(f, "{} {}/{}", self.verb, group, self.resource)?;
        if let Some(namespace) = &self.namespace {
            write!(f, " {namespace}/{}", self.name)
        } else {
            write!(f, " {}", self.name)
        }
    }
}

/// Rules a subject holds in one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleResolution {
    pub rules: Vec<PolicyRule>,
    /// False when some grant could not be evaluated; `rules` is then partial.
    pub complete: bool,
    pub incomplete_reason: Option<String>,
}

impl RuleResolution {
    pub fn complete(rules: Vec<PolicyRule>) -> Self {
        Self {
            rules,
            complete: true,
            incomplete_reason: None,
        }
    }

    pub fn incomplete(rules: Vec<PolicyRule>, reason: impl Into<String>) -> Self {
        Self {
            rules,
            complete: false,
            incomplete_reason: Some(reason.into()),
        }
    }
}

#[async_trait]
pub trait RuleResolver: Send + Sync {
    async fn rules_for(
        &self,
        ctx: &RequestContext,
        subject: &Subject,
        scope: &Scope,
    ) -> RbacResult<RuleResolution>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleDecision {
    pub allowed: bool,
    pub reason: String,
}

impl OracleDecision {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
        }
    }
}

#[async_trait]
pub trait AuthorizationOracle: Send + Sync {
    async fn check(
        &self,
        ctx: &RequestContext,
        subject: &Subject,
        attributes: &ResourceAttributes,
    ) -> RbacResult<OracleDecision>;
}
