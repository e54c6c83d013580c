//! Error types for the combo system

use thiserror::Error;

/// Combo system errors
///
/// Every variant is a construction-time failure. Once an engine exists, all of
/// its operations are total.
#[derive(Debug, Error)]
pub enum ComboError {
    /// Max rank must be at least 1
    #[error("Invalid max rank: {0} (must be at least 1)")]
    InvalidMaxRank(u32),

    /// Combo window must be positive
    #[error("Invalid combo window: {0}ms (must be greater than zero)")]
    InvalidComboWindow(u64),

    /// Animation table has no entries
    #[error("Animation table is empty")]
    EmptyAnimationTable,

    /// Damage multiplier is zero, negative, or not finite
    #[error("Invalid damage multiplier for rank {rank}: {value}")]
    InvalidMultiplier { rank: u32, value: f32 },

    /// Config file extension not recognized
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// Failed to read a config file
    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML config
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Failed to parse JSON config
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for combo operations
pub type Result<T> = std::result::Result<T, ComboError>;
