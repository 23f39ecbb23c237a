//! Admission HTTP API module.
//!
//! # Purpose
//! Route handlers for admission reviews and system endpoints, plus the shared
//! request/response and error types.
pub mod admission;
pub mod error;
pub mod system;
pub mod types;
