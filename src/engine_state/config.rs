//! # Engine Configuration
//!
//! Start-up settings for the streaming engine. Every value is fixed once the
//! engine is built; nothing here can be changed at runtime.
//!
//! Configuration is read from JSON. Missing fields take their defaults, so an
//! empty object `{}` is a valid configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Blocks along each edge of a section.
    pub section_size: usize,
    /// Steady-state radius, in columns, of the load and keep areas.
    pub render_distance: u32,
    /// Load radius used by the first scheduler pass.
    pub initial_load_distance: u32,
    /// Extra columns added to the keep area around the load area.
    pub keep_margin: u32,
    /// Maximum number of vertical sections in a column.
    pub max_sections_per_column: usize,
    /// Generation workers used per load-area row.
    pub worker_count: usize,
    /// How long the background loop sleeps after a pass with nothing to do.
    pub scan_interval_ms: u64,
    /// Seed for terrain noise and per-column random generators.
    pub world_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            section_size: 16,
            render_distance: 8,
            initial_load_distance: 1,
            keep_margin: 0,
            max_sections_per_column: 16,
            worker_count: 4,
            scan_interval_ms: 16,
            world_seed: 0,
        }
    }
}

/// Largest half-width a load or keep area may have.
pub const MAX_AREA_HALF_WIDTH: u32 = i32::MAX as u32 / 4;

impl EngineConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.section_size < 2 {
            return Err(ConfigError::Invalid {
                field: "section_size",
                reason: format!("must be at least 2, got {}", self.section_size),
            });
        }
        if self.max_sections_per_column == 0 {
            return Err(ConfigError::Invalid {
                field: "max_sections_per_column",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.worker_count == 0 {
            return Err(ConfigError::Invalid {
                field: "worker_count",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.render_distance > MAX_AREA_HALF_WIDTH {
            return Err(ConfigError::Invalid {
                field: "render_distance",
                reason: format!("{} is too large", self.render_distance),
            });
        }
        match self.render_distance.checked_add(self.keep_margin) {
            Some(keep) if keep <= MAX_AREA_HALF_WIDTH => Ok(()),
            _ => Err(ConfigError::Invalid {
                field: "keep_margin",
                reason: format!(
                    "render_distance + keep_margin must not exceed {}, got {} + {}",
                    MAX_AREA_HALF_WIDTH, self.render_distance, self.keep_margin
                ),
            }),
        }
    }

    /// The first load radius, never above the render distance.
    pub fn starting_load_distance(&self) -> u32 {
        self.initial_load_distance.min(self.render_distance)
    }

    /// Half-width of the keep area.
    pub fn keep_distance(&self) -> u32 {
        self.render_distance.saturating_add(self.keep_margin)
    }
}
