//! Thread-safe combo engine handle
//!
//! For games that register hits from an input thread and tick from a
//! separate update thread. The whole combo state sits behind one lock, so
//! a late hit's reset-then-advance is a single atomic transition. Listeners
//! run after the state lock is released and may call back into the engine.
//!
//! Notifications are delivered in commit order: a transition takes the
//! dispatch guard before the state lock and holds it until its listeners
//! have run. The guard is reentrant, so a listener calling back into the
//! engine on the same thread does not deadlock. A listener that blocks on
//! another thread's transition does.

use crate::clock::{Clock, MonotonicClock};
use crate::config::ComboConfig;
use crate::engine::ComboSnapshot;
use crate::error::Result;
use crate::listener::{ListenerRegistry, SubscriberId};
use crate::state::{ComboEvent, ComboPhase, ComboRules, ComboState};
use crate::tables::{AnimationTable, DamageMultiplierTable};
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use std::sync::Arc;

struct Inner {
    config: ComboConfig,
    rules: ComboRules,
    multipliers: DamageMultiplierTable,
    animations: AnimationTable,
    clock: Box<dyn Clock>,
    state: Mutex<ComboState>,
    listeners: RwLock<ListenerRegistry>,
    dispatch: ReentrantMutex<()>,
}

/// Cloneable, lock-protected combo engine
#[derive(Clone)]
pub struct SharedComboEngine {
    inner: Arc<Inner>,
}

impl SharedComboEngine {
    /// Create a shared engine on the real monotonic clock
    pub fn new(config: ComboConfig) -> Result<Self> {
        Self::with_clock(config, MonotonicClock::new())
    }

    /// Create a shared engine on an injected clock
    pub fn with_clock(config: ComboConfig, clock: impl Clock + 'static) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            inner: Arc::new(Inner {
                rules: ComboRules {
                    window_ms: config.combo_window_ms,
                    max_rank: config.max_rank,
                },
                multipliers: DamageMultiplierTable::from_config(&config),
                animations: AnimationTable::from_config(&config),
                clock: Box::new(clock),
                state: Mutex::new(ComboState::new()),
                listeners: RwLock::new(ListenerRegistry::new()),
                dispatch: ReentrantMutex::new(()),
                config,
            }),
        })
    }

    fn notify(&self, events: &[ComboEvent]) {
        if events.is_empty() {
            return;
        }
        let listeners = self.inner.listeners.read().clone();
        listeners.dispatch(events);
    }

    /// Register a landed attack, returns the new rank (1..=max_rank)
    pub fn register_hit(&self) -> u32 {
        let _dispatch = self.inner.dispatch.lock();
        let (rank, events) = {
            let mut state = self.inner.state.lock();
            let now = self.inner.clock.now_ms();
            state.register_hit(now, &self.inner.rules)
        };
        self.notify(&events);
        rank
    }

    /// Per-tick timeout check
    pub fn update(&self, _delta_time: f32) {
        let _dispatch = self.inner.dispatch.lock();
        let event = {
            let mut state = self.inner.state.lock();
            let now = self.inner.clock.now_ms();
            state.expire(now, &self.inner.rules)
        };
        if let Some(event) = event {
            self.notify(&[event]);
        }
    }

    /// End the current chain
    pub fn reset(&self) {
        let _dispatch = self.inner.dispatch.lock();
        let event = self.inner.state.lock().reset();
        if let Some(event) = event {
            self.notify(&[event]);
        }
    }

    /// Current rank, 0 when idle
    pub fn current_rank(&self) -> u32 {
        self.inner.state.lock().rank()
    }

    /// Current phase
    pub fn phase(&self) -> ComboPhase {
        self.inner.state.lock().phase()
    }

    /// Check if a chain is active
    pub fn is_active(&self) -> bool {
        self.inner.state.lock().is_active()
    }

    /// Time of the most recent hit, kept across resets
    pub fn last_hit_ms(&self) -> Option<u64> {
        self.inner.state.lock().last_hit_ms()
    }

    /// Time left in the current window, `None` when idle
    pub fn time_remaining_ms(&self) -> Option<u64> {
        let state = self.inner.state.lock();
        state.time_remaining_ms(self.inner.clock.now_ms(), &self.inner.rules)
    }

    /// Damage multiplier for the current rank
    pub fn damage_multiplier(&self) -> f32 {
        self.inner.multipliers.get(self.current_rank())
    }

    /// Animation for the current rank
    pub fn attack_animation(&self) -> String {
        self.inner.animations.for_rank(self.current_rank()).to_string()
    }

    /// Whether the actor may attack right now (always true)
    pub fn can_attack(&self) -> bool {
        true
    }

    /// Capture the current combo under one lock
    pub fn snapshot(&self) -> ComboSnapshot {
        let state = *self.inner.state.lock();
        let rank = state.rank();

        ComboSnapshot {
            rank,
            phase: state.phase(),
            damage_multiplier: self.inner.multipliers.get(rank),
            animation: self.inner.animations.for_rank(rank).to_string(),
            last_hit_ms: state.last_hit_ms(),
            time_remaining_ms: state.time_remaining_ms(self.inner.clock.now_ms(), &self.inner.rules),
        }
    }

    /// Configuration the engine was built with
    pub fn config(&self) -> &ComboConfig {
        &self.inner.config
    }

    /// Subscribe to rank changes
    pub fn on_change<F>(&self, handler: F) -> SubscriberId
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        self.inner.listeners.write().on_change(handler)
    }

    /// Subscribe to resets
    pub fn on_reset<F>(&self, handler: F) -> SubscriberId
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        self.inner.listeners.write().on_reset(handler)
    }

    /// Subscribe to every combo event
    pub fn on_event<F>(&self, handler: F) -> SubscriberId
    where
        F: Fn(&ComboEvent) + Send + Sync + 'static,
    {
        self.inner.listeners.write().on_event(handler)
    }

    /// Remove a listener
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.inner.listeners.write().unsubscribe(id)
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.read().len()
    }

    /// Total listener failures caught so far
    pub fn listener_failures(&self) -> u64 {
        self.inner.listeners.read().failures()
    }
}

impl std::fmt::Debug for SharedComboEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedComboEngine")
            .field("state", &*self.inner.state.lock())
            .field("rules", &self.inner.rules)
            .finish()
    }
}
