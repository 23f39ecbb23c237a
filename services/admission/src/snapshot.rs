//! Startup snapshot of templates and bindings.
//!
//! The caches the validators read are normally kept fresh by the platform's
//! watch machinery. For standalone deployments and tests the service seeds
//! them once from a YAML document:
//!
//! ```yaml
//! templates:
//!   - name: viewer
//!     rules:
//!       - verbs: [get, list]
//!         apiGroups: [""]
//!         resources: [pods]
//! bindings:
//!   - name: alice-viewer
//!     subject: { kind: user, name: alice }
//!     template: viewer
//! ```
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use warden_rbac::PermissionTemplate;
use warden_rbac::memory::TemplateBinding;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub templates: Vec<PermissionTemplate>,
    #[serde(default)]
    pub bindings: Vec<TemplateBinding>,
}

impl Snapshot {
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let snapshot: Snapshot =
            serde_yaml::from_str(contents).with_context(|| "parse snapshot yaml")?;
        snapshot.check_unique_names()?;
        Ok(snapshot)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("read snapshot: {}", path.display()))?;
        Self::from_yaml_str(&contents)
    }

    fn check_unique_names(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for template in &self.templates {
            if !seen.insert(template.name.as_str()) {
                anyhow::bail!("duplicate template {:?} in snapshot", template.name);
            }
        }
        seen.clear();
        for binding in &self.bindings {
            if !seen.insert(binding.name.as_str()) {
                anyhow::bail!("duplicate binding {:?} in snapshot", binding.name);
            }
        }
        Ok(())
    }
}
