//! # Match Configuration
//!
//! Per-match constants, fixed when the [`GameMaster`](crate::game_master::GameMaster)
//! is built.
//!
//! ```rust
//! use rc_core::config::MatchConfig;
//!
//! let config = MatchConfig::default();
//! let quick = MatchConfig::quick();
//! assert!(quick.tick_limit < config.tick_limit);
//! ```
//!
//! ## Environment Variables
//!
//! - `RC_MATCH_PROFILE`: preset for [`MatchConfig::from_env_or_default`]
//!   (`quick`, `default`)

mod drive_config;
mod field_config;
mod thresholds_config;

pub use drive_config::DriveConfig;
pub use field_config::FieldConfig;
pub use thresholds_config::ThresholdsConfig;

use std::env;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What the game master writes for a team that missed the tick deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTeamPolicy {
    /// Keep the team's previous commands.
    #[default]
    ReusePrevious,
    /// Stop every robot of the team.
    ZeroCommand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub number_of_robots: usize,
    pub number_of_teams: usize,
    pub tick_limit: u64,
    /// Barrier deadline per tick (ms)
    pub tick_timeout_ms: u64,
    pub missing_team_policy: MissingTeamPolicy,
    pub thresholds: ThresholdsConfig,
    pub drive: DriveConfig,
    pub field: FieldConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            number_of_robots: 5,
            number_of_teams: 2,
            tick_limit: 30_000,
            tick_timeout_ms: 50,
            missing_team_policy: MissingTeamPolicy::ReusePrevious,
            thresholds: ThresholdsConfig::default(),
            drive: DriveConfig::default(),
            field: FieldConfig::default(),
        }
    }
}

impl MatchConfig {
    /// Short match with looser thresholds.
    pub fn quick() -> Self {
        Self {
            tick_limit: 2_000,
            tick_timeout_ms: 20,
            thresholds: ThresholdsConfig::quick(),
            ..Self::default()
        }
    }

    pub fn tick_timeout(&self) -> Duration {
        Duration::from_millis(self.tick_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.number_of_robots == 0 {
            return Err(ConfigError::Invalid("number_of_robots must be at least 1".into()));
        }
        if !(1..=2).contains(&self.number_of_teams) {
            return Err(ConfigError::Invalid(format!(
                "number_of_teams must be 1 or 2, got {}",
                self.number_of_teams
            )));
        }
        if self.tick_limit == 0 {
            return Err(ConfigError::Invalid("tick_limit must be at least 1".into()));
        }
        self.thresholds.validate().map_err(ConfigError::Invalid)?;
        self.drive.validate().map_err(ConfigError::Invalid)?;
        self.field.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }

    /// Parse and validate. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Preset selected by `RC_MATCH_PROFILE`, default otherwise.
    pub fn from_env_or_default() -> Self {
        Self::from_profile(&env::var("RC_MATCH_PROFILE").unwrap_or_default())
    }

    pub fn from_profile(profile: &str) -> Self {
        match profile.to_lowercase().as_str() {
            "quick" => Self::quick(),
            _ => Self::default(),
        }
    }
}
