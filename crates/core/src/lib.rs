//! Core accounting logic for Bursar.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `fiscal` - Fiscal year resolution and the per-organization cache
//! - `accounts` - Chart of accounts: nested-set tree, naming, templates
//! - `ledger` - Balance aggregation and outstanding-document counting
//! - `hooks` - Document events, permission predicates, scheduled jobs
//! - `organization` - Organization settings used by the other modules

pub mod accounts;
pub mod fiscal;
pub mod hooks;
pub mod ledger;
pub mod organization;

pub use organization::Organization;
