//! Shared types and calculations for the Coffee Roast Tracker
//!
//! This crate holds the models and the pure roast/blend calculations used by
//! the command line tracker and, via WASM, by the browser form.

pub mod allocation;
pub mod metrics;
pub mod models;
pub mod time;
pub mod types;
pub mod validation;

pub use allocation::*;
pub use metrics::*;
pub use models::*;
pub use time::*;
pub use types::*;
pub use validation::*;
