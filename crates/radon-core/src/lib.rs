#![forbid(unsafe_code)]
//! radon-core: pure data for the Radon markup layer.
//!
//! - identifiers (`OperatorCode`, `CacheRef`)
//! - the compact request form (`Mir`)
//! - type tags and the filter/reducer enumerations
//! - the operator catalog, read-only after construction
//!
//! No I/O here beyond loading a catalog file named by config.

pub mod catalog;
pub mod config;
pub mod error;
pub mod hash;
pub mod id;
pub mod mir;
pub mod prelude;
pub mod types;
