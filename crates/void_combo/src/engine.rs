//! Combo engine

use crate::clock::{Clock, MonotonicClock};
use crate::config::ComboConfig;
use crate::error::Result;
use crate::listener::{ListenerRegistry, SubscriberId};
use crate::state::{ComboEvent, ComboPhase, ComboRules, ComboState};
use crate::tables::{AnimationTable, DamageMultiplierTable};
use serde::Serialize;

/// Point-in-time view of a combo, for HUDs and debug overlays
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComboSnapshot {
    pub rank: u32,
    pub phase: ComboPhase,
    pub damage_multiplier: f32,
    pub animation: String,
    pub last_hit_ms: Option<u64>,
    pub time_remaining_ms: Option<u64>,
}

/// Tracks attack hits for one actor and decides whether they chain
///
/// Driven by the game: [`ComboEngine::register_hit`] on every landed
/// attack, [`ComboEngine::update`] once per tick. Everything else is a
/// read-only query.
pub struct ComboEngine {
    config: ComboConfig,
    rules: ComboRules,
    state: ComboState,
    multipliers: DamageMultiplierTable,
    animations: AnimationTable,
    clock: Box<dyn Clock>,
    listeners: ListenerRegistry,
}

impl ComboEngine {
    /// Create an engine on the real monotonic clock
    pub fn new(config: ComboConfig) -> Result<Self> {
        Self::with_clock(config, MonotonicClock::new())
    }

    /// Create an engine on an injected clock
    pub fn with_clock(config: ComboConfig, clock: impl Clock + 'static) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            rules: ComboRules {
                window_ms: config.combo_window_ms,
                max_rank: config.max_rank,
            },
            state: ComboState::new(),
            multipliers: DamageMultiplierTable::from_config(&config),
            animations: AnimationTable::from_config(&config),
            clock: Box::new(clock),
            listeners: ListenerRegistry::new(),
            config,
        })
    }

    /// Register a landed attack, returns the new rank (1..=max_rank)
    pub fn register_hit(&mut self) -> u32 {
        let now = self.clock.now_ms();
        let (rank, events) = self.state.register_hit(now, &self.rules);
        self.listeners.dispatch(&events);
        rank
    }

    /// Per-tick timeout check
    ///
    /// `delta_time` is only the tick signal; expiry is judged on the clock.
    pub fn update(&mut self, _delta_time: f32) {
        let now = self.clock.now_ms();
        if let Some(event) = self.state.expire(now, &self.rules) {
            self.listeners.dispatch(&[event]);
        }
    }

    /// End the current chain
    ///
    /// Does nothing (and notifies no one) when already idle.
    pub fn reset(&mut self) {
        if let Some(event) = self.state.reset() {
            self.listeners.dispatch(&[event]);
        }
    }

    /// Current rank, 0 when idle
    pub fn current_rank(&self) -> u32 {
        self.state.rank()
    }

    /// Current phase
    pub fn phase(&self) -> ComboPhase {
        self.state.phase()
    }

    /// Check if a chain is active
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Damage multiplier for the current rank
    pub fn damage_multiplier(&self) -> f32 {
        self.multipliers.get(self.state.rank())
    }

    /// Animation for the current rank
    pub fn attack_animation(&self) -> &str {
        self.animations.for_rank(self.state.rank())
    }

    /// Whether the actor may attack right now
    ///
    /// Always true: there is no attack cooldown. A cooldown gate belongs
    /// here and nowhere else in the state machine.
    pub fn can_attack(&self) -> bool {
        true
    }

    /// Time of the most recent hit, kept across resets
    pub fn last_hit_ms(&self) -> Option<u64> {
        self.state.last_hit_ms()
    }

    /// Time left in the current window, `None` when idle
    pub fn time_remaining_ms(&self) -> Option<u64> {
        self.state.time_remaining_ms(self.clock.now_ms(), &self.rules)
    }

    /// Capture the current combo
    pub fn snapshot(&self) -> ComboSnapshot {
        ComboSnapshot {
            rank: self.current_rank(),
            phase: self.phase(),
            damage_multiplier: self.damage_multiplier(),
            animation: self.attack_animation().to_string(),
            last_hit_ms: self.last_hit_ms(),
            time_remaining_ms: self.time_remaining_ms(),
        }
    }

    /// Configuration the engine was built with
    pub fn config(&self) -> &ComboConfig {
        &self.config
    }

    /// Subscribe to rank changes
    pub fn on_change<F>(&mut self, handler: F) -> SubscriberId
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        self.listeners.on_change(handler)
    }

    /// Subscribe to resets
    pub fn on_reset<F>(&mut self, handler: F) -> SubscriberId
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        self.listeners.on_reset(handler)
    }

    /// Subscribe to every combo event
    pub fn on_event<F>(&mut self, handler: F) -> SubscriberId
    where
        F: Fn(&ComboEvent) + Send + Sync + 'static,
    {
        self.listeners.on_event(handler)
    }

    /// Remove a listener
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Total listener failures caught so far
    pub fn listener_failures(&self) -> u64 {
        self.listeners.failures()
    }
}

impl std::fmt::Debug for ComboEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComboEngine")
            .field("state", &self.state)
            .field("rules", &self.rules)
            .field("listeners", &self.listeners)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::ComboError;

    fn engine() -> (ComboEngine, ManualClock) {
        let clock = ManualClock::new(0);
        let engine = ComboEngine::with_clock(ComboConfig::default(), clock.clone()).unwrap();
        (engine, clock)
    }

    #[test]
    fn test_rejects_invalid_config() {
        let result = ComboEngine::new(ComboConfig::new().with_max_rank(0));
        assert!(matches!(result, Err(ComboError::InvalidMaxRank(0))));
    }

    #[test]
    fn test_fresh_engine() {
        let (engine, _) = engine();
        assert_eq!(engine.current_rank(), 0);
        assert_eq!(engine.phase(), ComboPhase::Idle);
        assert_eq!(engine.damage_multiplier(), 1.0);
        assert_eq!(engine.attack_animation(), "attack_1");
        assert!(engine.can_attack());
        assert_eq!(engine.last_hit_ms(), None);
        assert_eq!(engine.time_remaining_ms(), None);
    }

    #[test]
    fn test_update_inside_window_keeps_chain() {
        let (mut engine, clock) = engine();
        engine.register_hit();

        clock.set(800);
        engine.update(0.8);
        assert_eq!(engine.current_rank(), 1);
        assert_eq!(engine.time_remaining_ms(), Some(0));
    }

    #[test]
    fn test_reset_keeps_timestamp() {
        let (mut engine, clock) = engine();
        clock.set(250);
        engine.register_hit();
        engine.reset();

        assert!(!engine.is_active());
        assert_eq!(engine.last_hit_ms(), Some(250));
    }

    #[test]
    fn test_snapshot() {
        let (mut engine, clock) = engine();
        engine.register_hit();
        clock.set(300);
        engine.register_hit();

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.rank, 2);
        assert_eq!(snapshot.phase, ComboPhase::Comboing(2));
        assert_eq!(snapshot.damage_multiplier, 1.3);
        assert_eq!(snapshot.animation, "attack_2");
        assert_eq!(snapshot.last_hit_ms, Some(300));
        assert_eq!(snapshot.time_remaining_ms, Some(800));

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["rank"], 2);
        assert_eq!(json["animation"], "attack_2");
    }

    #[test]
    fn test_listener_failure_does_not_corrupt_state() {
        let (mut engine, clock) = engine();
        engine.on_change(|_| panic!("hud crashed"));
        engine.on_reset(|_| panic!("audio crashed"));

        assert_eq!(engine.register_hit(), 1);
        clock.set(100);
        assert_eq!(engine.register_hit(), 2);
        assert_eq!(engine.last_hit_ms(), Some(100));

        engine.reset();
        assert_eq!(engine.current_rank(), 0);
        assert_eq!(engine.listener_failures(), 3);
    }
}
