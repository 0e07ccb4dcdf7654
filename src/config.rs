//! Application configuration constants.
//!
//! File locations are resolved with priority: config.toml > environment
//! (including `.env`) > defaults under the data directory.

use serde::Deserialize;
use std::path::PathBuf;

use crate::paths;

// ==================== File Configuration ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct AppConfig {
    storage: Option<PathSection>,
    catalog: Option<PathSection>,
}

#[derive(Debug, Deserialize)]
struct PathSection {
    path: Option<String>,
}

/// Name of the optional config file in the working directory
pub const CONFIG_FILE: &str = "config.toml";

fn read_config_file() -> AppConfig {
    let Ok(contents) = std::fs::read_to_string(CONFIG_FILE) else {
        return AppConfig::default();
    };
    match toml::from_str::<AppConfig>(&contents) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring malformed {}: {}", CONFIG_FILE, e);
            AppConfig::default()
        }
    }
}

fn resolve_path(what: &str, from_file: Option<String>, env_var: &str, default: String) -> PathBuf {
    // Priority 1: config.toml
    if let Some(path) = from_file {
        tracing::info!("Using {} from {}: {}", what, CONFIG_FILE, path);
        return PathBuf::from(path);
    }

    // Priority 2: environment / .env
    if let Ok(path) = std::env::var(env_var) {
        tracing::info!("Using {} from {} env: {}", what, env_var, path);
        return PathBuf::from(path);
    }

    let default = PathBuf::from(default);
    tracing::info!("Using default {} path: {}", what, default.display());
    default
}

/// Where the study state database lives
pub fn load_storage_path() -> PathBuf {
    let _ = dotenvy::dotenv();
    let from_file = read_config_file().storage.and_then(|s| s.path);
    resolve_path("state store", from_file, "CET4_STORAGE_PATH", paths::storage_path())
}

/// Where the word catalog asset lives
pub fn load_catalog_path() -> PathBuf {
    let _ = dotenvy::dotenv();
    let from_file = read_config_file().catalog.and_then(|s| s.path);
    resolve_path("catalog", from_file, "CET4_CATALOG_PATH", paths::catalog_path())
}

// ==================== Storage Configuration ====================

/// Key under which the whole study state blob is stored
pub const STORAGE_KEY: &str = "cet4-flashcard-state";

// ==================== Catalog Configuration ====================

/// Words per group; also the jump distance for up/down navigation
pub const GROUP_SIZE: usize = 50;

/// Maximum search results shown
pub const SEARCH_LIMIT: usize = 20;

// ==================== Statistics Configuration ====================

/// Number of entries in the "hardest words" list
pub const HARDEST_WORDS_LIMIT: usize = 10;

/// Days of history shown in the progress chart
pub const HISTORY_DAYS: usize = 14;

// ==================== Speech Configuration ====================

/// Normal playback rate
pub const TTS_NORMAL_RATE: f32 = 1.0;

/// Slow playback rate for single words
pub const TTS_SLOW_RATE: f32 = 0.7;

/// Slowed-down rates offered for example sentences
pub const SENTENCE_RATES: [f32; 3] = [0.3, 0.5, 0.7];

pub const TTS_MIN_RATE: f32 = 0.1;
pub const TTS_MAX_RATE: f32 = 2.0;
