//! Verdict formatting.
//!
//! # Purpose
//! Turns an [`EscalationVerdict`] into a typed [`Decision`]. Denials carry an
//! [`EscalationDenied`] that lists every uncovered rule, so the requester can
//! see exactly which permission they lack.
//!
//! # Key invariants
//! - Pure: no I/O, no logging, no clock.
//! - The message is stable: requester first, then one rule per line in the
//!   order the checker reported them.
//!
//! # Examples
//! ```rust
//! use warden_rbac::{Decision, EscalationVerdict, PolicyRule, Subject};
//!
//! let subject = Subject::new("alice").with_groups(["devs"]);
//! let verdict = EscalationVerdict::denied(
//!     vec![PolicyRule::new().verbs(["delete"]).api_groups([""]).resources(["pods"])],
//!     true,
//!     None,
//! );
//! let decision = Decision::from_verdict(&subject, &verdict);
//! assert!(!decision.is_allowed());
//! ```
use crate::{EscalationVerdict, PolicyRule, RbacError, RbacResult, Subject};
use std::fmt;

/// A refused escalation, with everything needed to explain it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationDenied {
    pub username: String,
    pub groups: Vec<String>,
    pub uncovered: Vec<PolicyRule>,
    pub incomplete_reason: Option<String>,
}

impl fmt::Display for EscalationDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "user {:?} (groups [{}]) is attempting to grant permissions they do not hold",
            self.username,
            self.groups.join(", ")
        )?;
        if self.uncovered.is_empty() {
            f.write_str(":")?;
        } else {
            f.write_str(", uncovered rules:")?;
        }
        for rule in &self.uncovered {
            write!(f, "\n  {rule}")?;
        }
        if let Some(reason) = &self.incomplete_reason {
            write!(f, "\npermission resolution incomplete: {reason}")?;
        }
        Ok(())
    }
}

impl std::error::Error for EscalationDenied {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied(EscalationDenied),
}

impl Decision {
    pub fn from_verdict(subject: &Subject, verdict: &EscalationVerdict) -> Self {
        if verdict.allowed {
            return Decision::Allowed;
        }
        Decision::Denied(EscalationDenied {
            username: subject.username.clone(),
            // BTreeSet iteration keeps the group list sorted.
            groups: subject.groups.iter().cloned().collect(),
            uncovered: verdict.uncovered.clone(),
            incomplete_reason: verdict.incomplete_reason.clone(),
        })
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }

    pub fn into_result(self) -> RbacResult<()> {
        match self {
            Decision::Allowed => Ok(()),
            Decision::Denied(denied) => Err(RbacError::EscalationDenied(denied)),
        }
    }
}
