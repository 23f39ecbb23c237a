//! Warden admission service library crate.
//!
//! # Purpose
//! Exposes the HTTP surface, per-kind validators, configuration and startup
//! snapshot loading for use by the binary and tests.
//!
//! # Notes
//! The privilege-escalation logic itself lives in `warden-rbac`; this crate
//! only decodes objects, picks candidate rules and reports decisions.
pub mod api;
pub mod app;
pub mod config;
pub mod observability;
pub mod snapshot;
pub mod validate;
