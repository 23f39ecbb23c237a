//! Admission service configuration.
//!
//! Values come from environment variables first; a YAML file named by
//! `WARDEN_ADMISSION_CONFIG` may then override any of them.
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8443";
pub const DEFAULT_CAPABILITY_TIMEOUT_MS: u64 = 2000;

#[derive(Debug, Clone)]
pub struct AdmissionConfig {
    pub bind_addr: SocketAddr,
    /// Deadline for every capability call made while deciding one review.
    pub capability_timeout: Duration,
    /// YAML snapshot of templates and bindings used to seed the caches.
    pub snapshot_path: Option<PathBuf>,
    pub oracle_enabled: bool,
}

#[derive(Debug, Deserialize)]
struct AdmissionConfigOverride {
    bind_addr: Option<String>,
    capability_timeout_ms: Option<u64>,
    snapshot: Option<PathBuf>,
    oracle_enabled: Option<bool>,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8443)),
            capability_timeout: Duration::from_millis(DEFAULT_CAPABILITY_TIMEOUT_MS),
            snapshot_path: None,
            oracle_enabled: true,
        }
    }
}

impl AdmissionConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("WARDEN_ADMISSION_BIND")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .with_context(|| "parse WARDEN_ADMISSION_BIND")?;
        let timeout_ms = match std::env::var("WARDEN_CAPABILITY_TIMEOUT_MS") {
            Ok(value) => value
                .parse::<u64>()
                .with_context(|| "parse WARDEN_CAPABILITY_TIMEOUT_MS")?,
            Err(_) => DEFAULT_CAPABILITY_TIMEOUT_MS,
        };
        let snapshot_path = std::env::var("WARDEN_SNAPSHOT")
            .ok()
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        let oracle_enabled = match std::env::var("WARDEN_ORACLE_ENABLED") {
            Ok(value) => parse_bool(&value).with_context(|| "parse WARDEN_ORACLE_ENABLED")?,
            Err(_) => true,
        };
        Ok(Self {
            bind_addr,
            capability_timeout: Duration::from_millis(timeout_ms),
            snapshot_path,
            oracle_enabled,
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("WARDEN_ADMISSION_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read WARDEN_ADMISSION_CONFIG: {path}"))?;
            config.apply_yaml(&contents)?;
        }
        Ok(config)
    }

    fn apply_yaml(&mut self, contents: &str) -> Result<()> {
        let override_cfg: AdmissionConfigOverride =
            serde_yaml::from_str(contents).with_context(|| "parse admission config yaml")?;
        if let Some(value) = override_cfg.bind_addr {
            self.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
        }
        if let Some(value) = override_cfg.capability_timeout_ms {
            self.capability_timeout = Duration::from_millis(value);
        }
        if let Some(value) = override_cfg.snapshot {
            self.snapshot_path = Some(value);
        }
        if let Some(value) = override_cfg.oracle_enabled {
            self.oracle_enabled = value;
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got {other:?}"),
    }
}
