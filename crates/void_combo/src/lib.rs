//! Void Combo - Attack Combo Timing
//!
//! This crate decides whether consecutive attack hits chain into an
//! escalating combo or start over, and exposes the resulting damage
//! multiplier and attack animation for the Void Engine.
//!
//! # Features
//!
//! - Configurable combo window, max rank, multiplier and animation tables
//! - Late hits restart the chain at rank 1, hits past max rank wrap to 1
//! - Injected time source for deterministic simulation and tests
//! - Any number of change/reset listeners, isolated from each other
//! - Lock-protected shared handle for multi-threaded games
//!
//! # Example
//!
//! ```ignore
//! use void_combo::prelude::*;
//!
//! let mut combo = ComboEngine::new(ComboConfig::default())?;
//! combo.on_reset(|previous| log::info!("Combo dropped at rank {}", previous));
//!
//! // When the player lands an attack
//! combo.register_hit();
//! let damage = base_damage * combo.damage_multiplier();
//! play_animation(combo.attack_animation());
//!
//! // Once per tick
//! combo.update(delta_time);
//! ```

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod listener;
pub mod shared;
pub mod state;
pub mod tables;

pub mod prelude {
    pub use crate::clock::{Clock, ManualClock, MonotonicClock};
    pub use crate::config::ComboConfig;
    pub use crate::engine::{ComboEngine, ComboSnapshot};
    pub use crate::error::ComboError;
    pub use crate::listener::SubscriberId;
    pub use crate::shared::SharedComboEngine;
    pub use crate::state::{ComboEvent, ComboPhase};
    pub use crate::tables::{AnimationTable, DamageMultiplierTable};
}

pub use prelude::*;
