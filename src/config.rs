use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tile::GemType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub rows: usize,
    pub cols: usize,
    pub gem_types: u8,
    /// Draws per cell during initial fill before the last draw is accepted as-is.
    pub spawn_retries: u32,
    /// Passes after which a cascade stops looking for new runs.
    pub max_cascade_passes: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            rows: 8,
            cols: 8,
            gem_types: 6,
            spawn_retries: 10,
            max_cascade_passes: 64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    pub base_match_3: u32,
    pub base_match_4: u32,
    pub base_match_5: u32,
    pub per_extra_tile: u32,
    pub combo_step: f64,
    pub max_combo_multiplier: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            base_match_3: 100,
            base_match_4: 200,
            base_match_5: 300,
            per_extra_tile: 100,
            combo_step: 0.5,
            max_combo_multiplier: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    pub duration_secs: u32,
    pub warning_secs: u32,
    pub almost_done_secs: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            duration_secs: 120,
            warning_secs: 30,
            almost_done_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub board: BoardConfig,
    pub score: ScoreConfig,
    pub timer: TimerConfig,
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON config; missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `MATCH3_*` variables, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        env_override("MATCH3_ROWS", &mut config.board.rows)?;
        env_override("MATCH3_COLS", &mut config.board.cols)?;
        env_override("MATCH3_GEM_TYPES", &mut config.board.gem_types)?;
        env_override("MATCH3_SPAWN_RETRIES", &mut config.board.spawn_retries)?;
        env_override("MATCH3_MAX_CASCADE_PASSES", &mut config.board.max_cascade_passes)?;
        env_override("MATCH3_COMBO_STEP", &mut config.score.combo_step)?;
        env_override("MATCH3_MAX_COMBO", &mut config.score.max_combo_multiplier)?;
        env_override("MATCH3_ROUND_SECS", &mut config.timer.duration_secs)?;
        env_override("MATCH3_WARNING_SECS", &mut config.timer.warning_secs)?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.board.validate()?;

        let score = &self.score;
        if !(score.combo_step > 0.0) || !(score.max_combo_multiplier >= 1.0) {
            return Err(ConfigError::Combo {
                step: score.combo_step,
                cap: score.max_combo_multiplier,
            });
        }

        if self.timer.duration_secs == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        Ok(())
    }
}

impl BoardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 || (self.rows < 3 && self.cols < 3) {
            return Err(ConfigError::BoardTooSmall {
                rows: self.rows,
                cols: self.cols,
            });
        }
        let max = GemType::ALL.len() as u8;
        if self.gem_types < 3 || self.gem_types > max {
            return Err(ConfigError::GemTypes {
                got: self.gem_types,
                max,
            });
        }
        if self.spawn_retries == 0 {
            return Err(ConfigError::NoSpawnRetries);
        }
        if self.max_cascade_passes == 0 {
            return Err(ConfigError::NoCascadePasses);
        }
        Ok(())
    }
}

fn env_override<T: FromStr>(key: &str, slot: &mut T) -> Result<(), ConfigError> {
    if let Ok(value) = std::env::var(key) {
        *slot = value.trim().parse().map_err(|_| ConfigError::Env {
            key: key.to_string(),
            value,
        })?;
    }
    Ok(())
}
