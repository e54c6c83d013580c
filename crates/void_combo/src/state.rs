//! Combo state and transitions
//!
//! Transitions are plain functions of the current state, the current time
//! and the timing rules. Each returns the events it produced; delivering
//! them to listeners is the caller's job, and always happens after the new
//! state is committed.

use serde::{Deserialize, Serialize};

/// Observable combo phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComboPhase {
    /// No active chain (rank 0)
    #[default]
    Idle,
    /// Active chain at the given rank (1..=max_rank)
    Comboing(u32),
}

/// Events emitted by combo transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComboEvent {
    /// A hit moved the chain to a new rank
    Changed {
        rank: u32,
        previous: u32,
    },
    /// The chain returned to idle
    Reset {
        previous: u32,
    },
}

/// Timing rules a state is evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ComboRules {
    /// Max gap between hits before the chain resets
    pub(crate) window_ms: u64,
    /// Highest rank before wrapping to 1
    pub(crate) max_rank: u32,
}

/// Mutable combo state
///
/// Invariants: `rank <= max_rank`, and `rank > 0` implies `last_hit_ms`
/// is set. Only the engines in this crate can move it out of idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ComboState {
    rank: u32,
    last_hit_ms: Option<u64>,
}

impl ComboState {
    /// Fresh idle state with no recorded hit
    pub fn new() -> Self {
        Self::default()
    }

    /// Current rank
    pub fn rank(&self) -> u32 {
        self.rank
    }

    /// Time of the most recent hit, `None` if there never was one
    ///
    /// Survives resets; use [`ComboState::is_active`] to judge activity.
    pub fn last_hit_ms(&self) -> Option<u64> {
        self.last_hit_ms
    }

    /// Check if a chain is active
    pub fn is_active(&self) -> bool {
        self.rank > 0
    }

    /// Current phase
    pub fn phase(&self) -> ComboPhase {
        match self.rank {
            0 => ComboPhase::Idle,
            rank => ComboPhase::Comboing(rank),
        }
    }

    /// Time since the last hit, `None` if there never was one
    ///
    /// A clock reading earlier than the last hit counts as zero elapsed.
    pub fn elapsed_ms(&self, now_ms: u64) -> Option<u64> {
        self.last_hit_ms.map(|last| now_ms.saturating_sub(last))
    }

    /// Check if an active chain has outlived its window
    pub(crate) fn is_expired(&self, now_ms: u64, rules: &ComboRules) -> bool {
        self.is_active()
            && self
                .elapsed_ms(now_ms)
                .map_or(true, |elapsed| elapsed > rules.window_ms)
    }

    /// Time left before an active chain expires
    pub(crate) fn time_remaining_ms(&self, now_ms: u64, rules: &ComboRules) -> Option<u64> {
        if !self.is_active() {
            return None;
        }
        self.elapsed_ms(now_ms)
            .map(|elapsed| rules.window_ms.saturating_sub(elapsed))
    }

    /// Register a hit at `now_ms`
    ///
    /// A late hit resets the stale chain first and then starts a new one at
    /// rank 1. A hit past `max_rank` wraps to 1. Returns the new rank (never
    /// 0) and the emitted events in order.
    pub(crate) fn register_hit(&mut self, now_ms: u64, rules: &ComboRules) -> (u32, Vec<ComboEvent>) {
        let mut events = Vec::with_capacity(2);

        if self.is_expired(now_ms, rules) {
            log::debug!(
                "Combo window expired at rank {} ({}ms late hit)",
                self.rank,
                self.elapsed_ms(now_ms).unwrap_or_default()
            );
            events.extend(self.reset());
        }

        let previous = self.rank;
        let rank = match previous.checked_add(1).filter(|r| *r <= rules.max_rank) {
            Some(rank) => rank,
            None => {
                log::debug!("Combo wrapped past max rank {}", rules.max_rank);
                1
            }
        };

        self.rank = rank;
        self.last_hit_ms = Some(now_ms);
        log::debug!("Combo hit: rank {} -> {}", previous, rank);

        events.push(ComboEvent::Changed { rank, previous });
        (rank, events)
    }

    /// Reset the chain if it has outlived its window
    pub(crate) fn expire(&mut self, now_ms: u64, rules: &ComboRules) -> Option<ComboEvent> {
        if self.is_expired(now_ms, rules) {
            log::debug!("Combo timed out at rank {}", self.rank);
            self.reset()
        } else {
            None
        }
    }

    /// Return to idle
    ///
    /// No-op with no event when already idle. Keeps the last hit time.
    pub(crate) fn reset(&mut self) -> Option<ComboEvent> {
        if self.rank == 0 {
            return None;
        }

        let previous = self.rank;
        self.rank = 0;
        log::debug!("Combo reset from rank {}", previous);
        Some(ComboEvent::Reset { previous })
    }
}
