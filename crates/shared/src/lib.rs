//! Shared types, errors, and configuration for Finsync.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for change-log entries and expenses
//! - Money formatting with decimal precision
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, LoggingConfig, ReplayConfig, SyncConfig};
pub use error::{AppError, AppResult};
