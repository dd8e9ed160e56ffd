//! Taskflow library
//!
//! Multi-tenant project, sprint and task backend. This module exports the
//! core components for testing and integration.

pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod logging;
pub mod ownership;
pub mod policy;
pub mod types;
