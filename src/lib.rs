//! Helio Sync - Multi-vendor solar plant telemetry and alert sync service
//!
//! This library exposes the core modules for testing and reuse.

pub mod common;
pub mod config;
pub mod entity;
pub mod error;
pub mod routes;
pub mod sync;
pub mod vendor;
