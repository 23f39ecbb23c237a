//! Policy rule primitives.
//!
//! # Purpose
//! Defines the RBAC-style [`PolicyRule`]: five independent dimensions (verbs,
//! API groups, resources, resource names, non-resource URLs) that together
//! describe what a grant permits.
//!
//! # How it fits
//! Templates declare rules, the resolver flattens them, and the covering
//! engine compares them. Denial messages render rules with `Display`.
//!
//! # Key invariants
//! - `*` in any dimension matches every value of that dimension.
//! - An empty `resource_names` set means "every name".
//! - Rendering is stable: values keep their declared order.
//!
//! # Examples
//! ```rust
//! use warden_rbac::PolicyRule;
//!
//! let rule = PolicyRule::new()
//!     .verbs(["get", "list"])
//!     .api_groups([""])
//!     .resources(["pods"]);
//! assert_eq!(
//!     rule.to_string(),
//!     r#"verbs=[get, list] apiGroups=[""] resources=[pods]"#
//! );
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;

/// Matches any value in the dimension it appears in.
pub const WILDCARD: &str = "*";

/// One permission grant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRule {
    #[serde(default)]
    pub verbs: Vec<String>,
    #[serde(default)]
    pub api_groups: Vec<String>,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub resource_names: Vec<String>,
    #[serde(default, rename = "nonResourceURLs")]
    pub non_resource_urls: Vec<String>,
}

impl PolicyRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbs<I, S>(mut self, verbs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.verbs = verbs.into_iter().map(Into::into).collect();
        self
    }

    pub fn api_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.api_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn resources<I, S>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resources = resources.into_iter().map(Into::into).collect();
        self
    }

    pub fn resource_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resource_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn non_resource_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.non_resource_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Rule granting every verb on every resource in every group.
    pub fn wildcard() -> Self {
        Self::new()
            .verbs([WILDCARD])
            .api_groups([WILDCARD])
            .resources([WILDCARD])
    }

    /// True when the rule grants every name of every resource in every group.
    pub fn grants_all_resources(&self) -> bool {
        let all = |values: &[String]| values.iter().any(|value| value == WILDCARD);
        all(&self.api_groups)
            && all(&self.resources)
            && (self.resource_names.is_empty() || all(&self.resource_names))
    }

    pub fn is_non_resource_rule(&self) -> bool {
        self.resources.is_empty() && !self.non_resource_urls.is_empty()
    }
}

fn write_dimension(f: &mut fmt::Formatter<'_>, label: &str, values: &[String]) -> fmt::Result {
    write!(f, "{label}=[")?;
    for (idx, value) in values.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        // The core API group is the empty string; quote it so it stays visible.
        if value.is_empty() {
            f.write_str("\"\"")?;
        } else {
            f.write_str(value)?;
        }
    }
    f.write_str("]")
}

impl fmt::Display for PolicyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_dimension(f, "verbs", &self.verbs)?;
        let optional = [
            ("apiGroups", &self.api_groups),
            ("resources", &self.resources),
            ("resourceNames", &self.resource_names),
            ("nonResourceURLs", &self.non_resource_urls),
        ];
        for (label, values) in optional {
            if !values.is_empty() {
                f.write_str(" ")?;
                write_dimension(f, label, values)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_omits_empty_dimensions() {
        let rule = PolicyRule::new()
            .verbs(["delete"])
            .api_groups(["apps"])
            .resources(["deployments"])
            .resource_names(["web"]);
        assert_eq!(
            rule.to_string(),
            "verbs=[delete] apiGroups=[apps] resources=[deployments] resourceNames=[web]"
        );
    }

    #[test]
    fn display_renders_non_resource_rules() {
        let rule = PolicyRule::new()
            .verbs(["get"])
            .non_resource_urls(["/healthz", "/metrics/*"]);
        assert!(rule.is_non_resource_rule());
        assert_eq!(
            rule.to_string(),
            "verbs=[get] nonResourceURLs=[/healthz, /metrics/*]"
        );
    }

    #[test]
    fn grants_all_resources_requires_unrestricted_groups_resources_and_names() {
        assert!(PolicyRule::wildcard().grants_all_resources());
        assert!(PolicyRule::wildcard().resource_names(["*"]).grants_all_resources());
        assert!(!PolicyRule::wildcard().resource_names(["web"]).grants_all_resources());
        assert!(
            !PolicyRule::new()
                .verbs(["*"])
                .api_groups([""])
                .resources(["*"])
                .grants_all_resources()
        );
        assert!(
            !PolicyRule::new()
                .verbs(["*"])
                .non_resource_urls(["*"])
                .grants_all_resources()
        );
    }

    #[test]
    fn display_keeps_empty_verbs_visible() {
        assert_eq!(PolicyRule::new().to_string(), "verbs=[]");
    }

    #[test]
    fn deserializes_kubernetes_style_field_names() {
        let rule: PolicyRule = serde_json::from_value(serde_json::json!({
            "verbs": ["get"],
            "apiGroups": [""],
            "resources": ["pods"],
            "resourceNames": ["api-0"],
            "nonResourceURLs": []
        }))
        .expect("rule");
        assert_eq!(rule.api_groups, vec![String::new()]);
        assert_eq!(rule.resource_names, vec!["api-0".to_string()]);
        assert!(!rule.is_non_resource_rule());
    }
}
