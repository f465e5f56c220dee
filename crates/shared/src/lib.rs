//! Shared types, errors, and configuration for Bursar.
//!
//! This crate provides common types used across all other crates:
//! - ISO currency codes
//! - Typed document names and IDs for type-safe references
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AccountingConfig, AppConfig, CacheConfig};
pub use error::{AppError, AppResult};
