//! Permission templates and privilege-escalation prevention for Warden.
//!
//! # Purpose
//! Decides whether a requester may grant a set of permissions: a binding to a
//! template, or a template's own rules. The requester must already hold every
//! rule being granted, or be authorized for a bypass verb on the exact object.
//!
//! # How it fits
//! The admission service decodes objects and calls into this crate. Template
//! storage, binding enumeration and authorization are host capabilities
//! ([`TemplateLookup`], [`RuleResolver`], [`AuthorizationOracle`]);
//! [`memory`] has snapshot implementations of all three.
//!
//! # Key invariants
//! - Template inheritance may be cyclic; resolution visits each name once.
//! - Coverage is decided by one held rule per candidate, never a combination.
//! - Incomplete permission resolution fails closed.
//! - Locked templates are rejected before any escalation computation.
//!
//! # Examples
//! ```rust
//! use warden_rbac::{PolicyRule, covers};
//!
//! let held = vec![PolicyRule::new().verbs(["get", "list"]).api_groups([""]).resources(["pods"])];
//! let candidate = PolicyRule::new().verbs(["get"]).api_groups([""]).resources(["pods"]);
//! assert!(covers(&held, &candidate));
//! ```
//!
//! # Common pitfalls
//! - An empty `resource_names` on a candidate asks for every name; only an
//!   unrestricted held rule covers it.
//! - Passing no bypass target to the checker disables the bypass path even when
//!   an oracle is configured.

mod capability;
mod context;
mod covers;
mod decision;
mod errors;
mod escalation;
mod guards;
pub mod memory;
mod resolver;
mod rule;
mod subject;
mod template;

pub use capability::{
    AuthorizationOracle, OracleDecision, ResourceAttributes, RuleResolution, RuleResolver, Scope,
};
pub use context::RequestContext;
pub use covers::{covers, covers_all, rule_covers, uncovered_rules};
pub use decision::{Decision, EscalationDenied};
pub use errors::{RbacError, RbacResult};
pub use escalation::{EscalationChecker, EscalationRequest, EscalationVerdict};
pub use guards::{
    ensure_bindable, ensure_builtin_update_allowed, ensure_context_matches, ensure_deletable,
};
pub use resolver::{ResolvedRuleSet, TemplateResolver};
pub use rule::{PolicyRule, WILDCARD};
pub use subject::Subject;
pub use template::{PermissionTemplate, TemplateContext, TemplateLookup};
