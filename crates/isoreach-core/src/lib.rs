//! Isoreach Core - Domain models, configuration, and error types
//!
//! This crate contains the core domain types shared by the isoreach pipeline:
//! facilities, time thresholds, per-threshold results, and the layered
//! run configuration.

pub mod config;
pub mod error;
pub mod models;

pub use error::{IsoreachError, Result};
