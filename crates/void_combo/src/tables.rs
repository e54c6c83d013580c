//! Per-rank lookup tables

use crate::config::ComboConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Multiplier used for any rank without an entry
pub const DEFAULT_MULTIPLIER: f32 = 1.0;

/// Damage multiplier per combo rank
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DamageMultiplierTable {
    entries: BTreeMap<u32, f32>,
}

impl DamageMultiplierTable {
    /// Create a table from rank/multiplier pairs
    pub fn new(entries: impl IntoIterator<Item = (u32, f32)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Build the table from a config
    pub fn from_config(config: &ComboConfig) -> Self {
        Self::new(config.damage_multipliers.iter().map(|(&rank, &value)| (rank, value)))
    }

    /// Multiplier for a rank, 1.0 if the rank has no entry
    pub fn get(&self, rank: u32) -> f32 {
        self.entries.get(&rank).copied().unwrap_or(DEFAULT_MULTIPLIER)
    }

    /// Number of explicit entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no rank has an explicit entry
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Animation identifiers, one per rank starting at rank 1
///
/// Never empty; construction goes through a validated [`ComboConfig`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationTable {
    names: Vec<String>,
}

impl AnimationTable {
    /// Build the table from a validated config
    pub(crate) fn from_config(config: &ComboConfig) -> Self {
        Self {
            names: config.animation_names.clone(),
        }
    }

    /// Animation for a rank
    ///
    /// Rank 0 and rank 1 both map to the first entry; ranks past the end
    /// of the table stay on the last entry.
    pub fn for_rank(&self, rank: u32) -> &str {
        let index = (rank.saturating_sub(1) as usize).min(self.names.len() - 1);
        &self.names[index]
    }

    /// All animation names in rank order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.names.len()
    }
}
