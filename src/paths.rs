//! Project path functions - single source of truth for all file paths.
//!
//! ## Environment Variables
//!
//! - `DATA_DIR`: Override the base data directory (default: "data")
//!
//! Individual files can still be overridden through config.toml or their
//! own variables (see config.rs).

use std::env;
use std::sync::OnceLock;

/// Lazily initialized data directory from DATA_DIR env var
static DATA_DIR_VALUE: OnceLock<String> = OnceLock::new();

/// Get the base data directory (from DATA_DIR env var or default "data")
pub fn data_dir() -> &'static str {
    DATA_DIR_VALUE.get_or_init(|| env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// SQLite file holding the study state blob
pub fn storage_path() -> String {
    format!("{}/progress.db", data_dir())
}

/// Generated word list consumed at startup
pub fn catalog_path() -> String {
    format!("{}/words.json", data_dir())
}
