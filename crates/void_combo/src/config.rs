//! Combo configuration
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables: `VOID_COMBO_WINDOW_MS`, `VOID_COMBO_MAX_RANK`
//! 2. Config file (`.toml` or `.json`)
//! 3. Built-in defaults
//!
//! # Example Config File
//!
//! ```toml
//! combo_window_ms = 800
//! max_rank = 3
//! animation_names = ["attack_1", "attack_2", "attack_3"]
//!
//! [damage_multipliers]
//! 0 = 1.0
//! 1 = 1.0
//! 2 = 1.3
//! 3 = 1.6
//! ```

use crate::error::{ComboError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default combo window in milliseconds
pub const DEFAULT_COMBO_WINDOW_MS: u64 = 800;

/// Default highest combo rank
pub const DEFAULT_MAX_RANK: u32 = 3;

/// Environment variable overriding the combo window
pub const ENV_COMBO_WINDOW_MS: &str = "VOID_COMBO_WINDOW_MS";

/// Environment variable overriding the max rank
pub const ENV_MAX_RANK: &str = "VOID_COMBO_MAX_RANK";

/// Combo engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboConfig {
    /// Max gap between hits before the chain resets
    pub combo_window_ms: u64,
    /// Highest attainable rank before wrapping back to 1
    pub max_rank: u32,
    /// Damage multiplier per rank (missing ranks resolve to 1.0)
    #[serde(with = "rank_keys")]
    pub damage_multipliers: BTreeMap<u32, f32>,
    /// Animation per rank, starting at rank 1
    pub animation_names: Vec<String>,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            combo_window_ms: DEFAULT_COMBO_WINDOW_MS,
            max_rank: DEFAULT_MAX_RANK,
            damage_multipliers: BTreeMap::from([(0, 1.0), (1, 1.0), (2, 1.3), (3, 1.6)]),
            animation_names: vec![
                "attack_1".to_string(),
                "attack_2".to_string(),
                "attack_3".to_string(),
            ],
        }
    }
}

impl ComboConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the combo window
    pub fn with_combo_window_ms(mut self, window_ms: u64) -> Self {
        self.combo_window_ms = window_ms;
        self
    }

    /// Set the max rank
    pub fn with_max_rank(mut self, max_rank: u32) -> Self {
        self.max_rank = max_rank;
        self
    }

    /// Set the damage multiplier for a rank
    pub fn with_multiplier(mut self, rank: u32, multiplier: f32) -> Self {
        self.damage_multipliers.insert(rank, multiplier);
        self
    }

    /// Replace the animation table
    pub fn with_animation_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.animation_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Check the configuration can produce a valid engine
    pub fn validate(&self) -> Result<()> {
        if self.max_rank < 1 {
            return Err(ComboError::InvalidMaxRank(self.max_rank));
        }
        if self.combo_window_ms == 0 {
            return Err(ComboError::InvalidComboWindow(self.combo_window_ms));
        }
        if self.animation_names.is_empty() {
            return Err(ComboError::EmptyAnimationTable);
        }
        for (&rank, &value) in &self.damage_multipliers {
            if !value.is_finite() || value <= 0.0 {
                return Err(ComboError::InvalidMultiplier { rank, value });
            }
        }
        Ok(())
    }

    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Parse a JSON document
    pub fn from_json_str(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Load and validate a config file, picking the format from its extension
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content)?,
            Some("json") => Self::from_json_str(&content)?,
            other => {
                return Err(ComboError::UnsupportedFormat(
                    other.unwrap_or_default().to_string(),
                ))
            }
        };

        config.validate()?;
        log::info!("Loaded combo config from {}", path.display());
        Ok(config)
    }

    /// Apply `VOID_COMBO_*` environment overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup
    ///
    /// Values that fail to parse are logged and ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_COMBO_WINDOW_MS) {
            match raw.trim().parse() {
                Ok(window) => {
                    self.combo_window_ms = window;
                    log::info!("Combo window from env: {}ms", window);
                }
                Err(_) => log::warn!("Ignoring {}={:?}: not an integer", ENV_COMBO_WINDOW_MS, raw),
            }
        }

        if let Some(raw) = lookup(ENV_MAX_RANK) {
            match raw.trim().parse() {
                Ok(rank) => {
                    self.max_rank = rank;
                    log::info!("Combo max rank from env: {}", rank);
                }
                Err(_) => log::warn!("Ignoring {}={:?}: not an integer", ENV_MAX_RANK, raw),
            }
        }
    }
}

/// TOML and JSON tables only have string keys, so ranks go through strings
mod rank_keys {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S>(map: &BTreeMap<u32, f32>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        map.iter()
            .map(|(rank, value)| (rank.to_string(), *value))
            .collect::<BTreeMap<String, f32>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<u32, f32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        BTreeMap::<String, f32>::deserialize(deserializer)?
            .into_iter()
            .map(|(key, value)| {
                key.trim()
                    .parse::<u32>()
                    .map(|rank| (rank, value))
                    .map_err(|_| D::Error::custom(format!("invalid rank key: {}", key)))
            })
            .collect()
    }
}
