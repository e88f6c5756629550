// ⚙️ Engine configuration
//
// Every field has a default, so an empty JSON object (or no file at all)
// yields the standard dashboard behaviour.

use crate::bucketing::TrailingWindow;
use crate::calendar::WeekStart;
use crate::taxonomy::AUTHOR_LIMIT;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming a JSON config file
pub const CONFIG_ENV: &str = "READING_STATS_CONFIG";

/// Environment variable naming the SQLite store
pub const DB_ENV: &str = "READING_STATS_DB";

pub const DEFAULT_DB_PATH: &str = "reading.db";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Authors kept in each author ranking
    pub author_limit: usize,

    /// Categories a display shows; rankings themselves are never cut
    pub category_display_limit: usize,

    pub default_window: TrailingWindow,

    pub week_start: WeekStart,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            author_limit: AUTHOR_LIMIT,
            category_display_limit: 8,
            default_window: TrailingWindow::SixMonths,
            week_start: WeekStart::Sunday,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: EngineConfig =
            serde_json::from_str(&raw).with_context(|| format!("Invalid config file {:?}", path))?;
        Ok(config)
    }

    /// Config from `READING_STATS_CONFIG` if set, defaults otherwise
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => {
                log::info!("Loading engine config from {}", path);
                Self::load(Path::new(&path))
            }
            _ => Ok(Self::default()),
        }
    }
}

/// Store path from `READING_STATS_DB`, falling back to `reading.db`
pub fn db_path_from_env() -> String {
    std::env::var(DB_ENV)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
}

// ============================================================================
// TESTS
// ============================================================================
