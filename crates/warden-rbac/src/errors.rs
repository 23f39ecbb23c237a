use crate::TemplateContext;
use crate::decision::EscalationDenied;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RbacError {
    #[error("{kind} {name:?} not found")]
    NotFound { kind: &'static str, name: String },
    #[error(transparent)]
    EscalationDenied(#[from] EscalationDenied),
    #[error("template {0:?} is locked and cannot be referenced by new bindings")]
    TemplateLocked(String),
    #[error("template {name:?} is a {context} template and cannot be bound at {scope} scope")]
    ContextMismatch {
        name: String,
        context: TemplateContext,
        scope: String,
    },
    #[error("builtin template {0:?} may only have its locked flag changed")]
    BuiltinImmutable(String),
    #[error("builtin flag cannot be set or cleared on template {0:?}")]
    BuiltinFlag(String),
    #[error("builtin template {0:?} cannot be deleted")]
    BuiltinUndeletable(String),
    #[error("template {name:?} is still inherited by {by:?}")]
    InUse { name: String, by: Vec<String> },
    #[error("request cancelled")]
    Cancelled,
    #[error("request deadline exceeded")]
    DeadlineExceeded,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl RbacError {
    pub fn template_not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            kind: "template",
            name: name.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True for rejections produced by guards or the escalation checker, as
    /// opposed to lookups and infrastructure failures.
    pub fn is_policy_rejection(&self) -> bool {
        matches!(
            self,
            Self::EscalationDenied(_)
                | Self::TemplateLocked(_)
                | Self::BuiltinImmutable(_)
                | Self::BuiltinFlag(_)
                | Self::BuiltinUndeletable(_)
                | Self::InUse { .. }
        )
    }
}

pub type RbacResult<T> = Result<T, RbacError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_variants() {
        let errors = vec![
            RbacError::template_not_found("viewer"),
            RbacError::TemplateLocked("viewer".to_string()),
            RbacError::BuiltinImmutable("admin".to_string()),
            RbacError::ContextMismatch {
                name: "viewer".to_string(),
                context: TemplateContext::Cluster,
                scope: "namespace/team-a".to_string(),
            },
            RbacError::BuiltinFlag("custom".to_string()),
            RbacError::BuiltinUndeletable("admin".to_string()),
            RbacError::InUse {
                name: "base".to_string(),
                by: vec!["child".to_string()],
            },
            RbacError::Cancelled,
            RbacError::DeadlineExceeded,
            RbacError::Backend(anyhow::anyhow!("cache unavailable")),
        ];

        for error in errors {
            let rendered = error.to_string();
            assert!(!rendered.is_empty());
        }
    }

    #[test]
    fn not_found_names_the_missing_template() {
        let err = RbacError::template_not_found("ghost");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "template \"ghost\" not found");
        assert!(!err.is_policy_rejection());
    }

    #[test]
    fn guard_errors_are_policy_rejections() {
        assert!(RbacError::TemplateLocked("t".to_string()).is_policy_rejection());
        assert!(!RbacError::Cancelled.is_policy_rejection());
    }
}
