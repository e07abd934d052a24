//! Core business logic for Finsync.
//!
//! This crate contains pure business logic with ZERO I/O dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Income, expense and month records, periods and validation
//! - `grouping` - Insertion-ordered fold-by-key
//! - `investment` - Consolidation of investment transactions by name
//! - `sync` - Change log, aggregation, subscriber fan-out and CSV export

pub mod grouping;
pub mod investment;
pub mod ledger;
pub mod sync;
