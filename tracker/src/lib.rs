//! Coffee Roast Tracker
//!
//! Local roast log: roast sessions with derived timing metrics, a bean list,
//! blend recipes with batch allocation, and CSV spreadsheet exchange. Data
//! lives in a SQLite-backed key-value store on the user's machine.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod services;
pub mod sheets;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use storage::KeyValueStore;
