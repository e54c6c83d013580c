//! Combo timing tests
//!
//! Scenarios run on the default config: 800ms window, max rank 3,
//! multipliers {0: 1.0, 1: 1.0, 2: 1.3, 3: 1.6}.

use approx::assert_relative_eq;
use parking_lot::Mutex;
use std::sync::Arc;
use void_combo::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Note {
    Changed(u32),
    Reset(u32),
}

fn setup(config: ComboConfig) -> (ComboEngine, ManualClock, Arc<Mutex<Vec<Note>>>) {
    let clock = ManualClock::new(0);
    let mut engine = ComboEngine::with_clock(config, clock.clone()).unwrap();
    let notes = Arc::new(Mutex::new(Vec::new()));

    let n = notes.clone();
    engine.on_change(move |rank| n.lock().push(Note::Changed(rank)));
    let n = notes.clone();
    engine.on_reset(move |previous| n.lock().push(Note::Reset(previous)));

    (engine, clock, notes)
}

fn hit_at(engine: &mut ComboEngine, clock: &ManualClock, t: u64) -> u32 {
    clock.set(t);
    engine.register_hit()
}

#[test]
fn scenario_escalating_chain() {
    let (mut engine, clock, _) = setup(ComboConfig::default());

    assert_eq!(hit_at(&mut engine, &clock, 0), 1);
    assert_relative_eq!(engine.damage_multiplier(), 1.0);

    assert_eq!(hit_at(&mut engine, &clock, 400), 2);
    assert_relative_eq!(engine.damage_multiplier(), 1.3);

    assert_eq!(hit_at(&mut engine, &clock, 700), 3);
    assert_relative_eq!(engine.damage_multiplier(), 1.6);
}

#[test]
fn scenario_late_hit_starts_fresh_chain() {
    let (mut engine, clock, notes) = setup(ComboConfig::default());
    for t in [0, 400, 700] {
        hit_at(&mut engine, &clock, t);
    }
    notes.lock().clear();

    assert_eq!(hit_at(&mut engine, &clock, 2000), 1);
    assert_relative_eq!(engine.damage_multiplier(), 1.0);
    assert_eq!(*notes.lock(), vec![Note::Reset(3), Note::Changed(1)]);
}

#[test]
fn scenario_update_times_out_chain() {
    let (mut engine, clock, notes) = setup(ComboConfig::default());
    hit_at(&mut engine, &clock, 0);

    clock.set(901);
    engine.update(0.9);

    assert_eq!(engine.current_rank(), 0);
    assert_eq!(engine.phase(), ComboPhase::Idle);
    assert_eq!(*notes.lock(), vec![Note::Changed(1), Note::Reset(1)]);
}

#[test]
fn scenario_animation_selection() {
    let (mut engine, clock, _) = setup(ComboConfig::default());
    assert_eq!(engine.attack_animation(), "attack_1");

    hit_at(&mut engine, &clock, 0);
    assert_eq!(engine.attack_animation(), "attack_1");

    hit_at(&mut engine, &clock, 100);
    assert_eq!(engine.attack_animation(), "attack_2");

    hit_at(&mut engine, &clock, 200);
    assert_eq!(engine.attack_animation(), "attack_3");

    hit_at(&mut engine, &clock, 300);
    assert_eq!(engine.current_rank(), 1);
    assert_eq!(engine.attack_animation(), "attack_1");
}

#[test]
fn scenario_reset_on_fresh_engine_is_silent() {
    let (mut engine, _, notes) = setup(ComboConfig::default());
    engine.reset();

    assert_eq!(engine.current_rank(), 0);
    assert!(notes.lock().is_empty());
}

#[test]
fn rank_stays_in_bounds_for_any_call_sequence() {
    let max_rank = 4;
    let config = ComboConfig::new()
        .with_max_rank(max_rank)
        .with_combo_window_ms(250);
    let (mut engine, clock, _) = setup(config);

    // Deterministic pseudo-random walk over hits, ticks, resets and gaps
    let mut seed: u64 = 0x5eed;
    let mut now = 0;
    for _ in 0..2000 {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        now += (seed >> 33) % 400;
        clock.set(now);

        match (seed >> 20) % 5 {
            0 | 1 | 2 => {
                let rank = engine.register_hit();
                assert!((1..=max_rank).contains(&rank));
            }
            3 => engine.update(0.016),
            _ => engine.reset(),
        }

        let rank = engine.current_rank();
        assert!(rank <= max_rank);
        if rank > 0 {
            assert!(engine.last_hit_ms().is_some());
        }
    }
}

#[test]
fn timely_hits_advance_and_late_hits_restart() {
    let (mut engine, clock, _) = setup(ComboConfig::default());

    hit_at(&mut engine, &clock, 1000);
    // Gap exactly equal to the window still chains
    assert_eq!(hit_at(&mut engine, &clock, 1800), 2);
    assert_eq!(hit_at(&mut engine, &clock, 2601), 1);
}

#[test]
fn wrap_from_max_rank() {
    let config = ComboConfig::new().with_max_rank(2);
    let (mut engine, clock, _) = setup(config);

    hit_at(&mut engine, &clock, 0);
    assert_eq!(hit_at(&mut engine, &clock, 10), 2);
    assert_eq!(hit_at(&mut engine, &clock, 20), 1);
}

#[test]
fn double_reset_notifies_once() {
    let (mut engine, clock, notes) = setup(ComboConfig::default());
    hit_at(&mut engine, &clock, 0);
    hit_at(&mut engine, &clock, 100);

    engine.reset();
    engine.reset();

    let resets = notes
        .lock()
        .iter()
        .filter(|note| matches!(note, Note::Reset(_)))
        .count();
    assert_eq!(resets, 1);
}

#[test]
fn timeout_matches_explicit_reset() {
    let (mut timed, timed_clock, timed_notes) = setup(ComboConfig::default());
    let (mut manual, manual_clock, manual_notes) = setup(ComboConfig::default());

    for t in [0, 300] {
        hit_at(&mut timed, &timed_clock, t);
        hit_at(&mut manual, &manual_clock, t);
    }

    timed_clock.set(5000);
    timed.update(4.7);
    manual.reset();

    assert_eq!(timed.phase(), manual.phase());
    assert_eq!(timed.current_rank(), manual.current_rank());
    assert_eq!(*timed_notes.lock(), *manual_notes.lock());
}

#[test]
fn missing_multiplier_ranks_default_to_one() {
    let config = ComboConfig {
        max_rank: 5,
        damage_multipliers: [(3, 2.0)].into_iter().collect(),
        ..ComboConfig::default()
    };
    let (mut engine, clock, _) = setup(config);

    assert_relative_eq!(engine.damage_multiplier(), 1.0);
    for (i, expected) in [1.0f32, 1.0, 2.0, 1.0, 1.0].into_iter().enumerate() {
        hit_at(&mut engine, &clock, i as u64 * 100);
        assert_relative_eq!(engine.damage_multiplier(), expected);
        assert!(engine.damage_multiplier() >= 1.0);
    }
}

#[test]
fn unsubscribed_listener_is_not_called() {
    let clock = ManualClock::new(0);
    let mut engine = ComboEngine::with_clock(ComboConfig::default(), clock).unwrap();
    let calls = Arc::new(Mutex::new(0));

    let c = calls.clone();
    let id = engine.on_event(move |_| *c.lock() += 1);
    engine.register_hit();
    assert!(engine.unsubscribe(id));
    engine.register_hit();

    assert_eq!(*calls.lock(), 1);
    assert_eq!(engine.listener_count(), 0);
}
