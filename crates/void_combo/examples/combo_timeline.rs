//! Combo timeline demonstration
//!
//! This example shows:
//! - Loading a combo config (optional path argument, `.toml` or `.json`)
//! - Environment overrides (`VOID_COMBO_WINDOW_MS`, `VOID_COMBO_MAX_RANK`)
//! - Driving the engine from a fixed-step loop with a manual clock
//! - Change and reset listeners
//!
//! Run with: cargo run -p void_combo --example combo_timeline [config.toml]

use void_combo::prelude::*;

/// Milliseconds per simulated frame (60 Hz)
const FRAME_MS: u64 = 16;

/// Frames at which the player lands an attack
const HIT_FRAMES: &[u64] = &[0, 25, 43, 60, 78, 150, 170, 260];

const TOTAL_FRAMES: u64 = 320;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => match ComboConfig::load_from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => ComboConfig::default(),
    };
    config.apply_env_overrides();

    let clock = ManualClock::new(0);
    let mut combo = match ComboEngine::with_clock(config, clock.clone()) {
        Ok(combo) => combo,
        Err(e) => {
            log::error!("Invalid combo config: {}", e);
            std::process::exit(1);
        }
    };

    combo.on_change(|rank| log::info!("Combo rank {}", rank));
    combo.on_reset(|previous| log::info!("Combo dropped (was rank {})", previous));

    println!("Combo Timeline Demo");
    println!("===================\n");
    println!(
        "window: {}ms, max rank: {}\n",
        combo.config().combo_window_ms,
        combo.config().max_rank
    );

    let base_damage = 10.0_f32;
    for frame in 0..TOTAL_FRAMES {
        clock.set(frame * FRAME_MS);

        if HIT_FRAMES.contains(&frame) && combo.can_attack() {
            combo.register_hit();
            println!(
                "t={:>5}ms  rank {}  {:<10} damage {:.1}",
                frame * FRAME_MS,
                combo.current_rank(),
                combo.attack_animation(),
                base_damage * combo.damage_multiplier()
            );
        }

        combo.update(FRAME_MS as f32 / 1000.0);
    }

    match serde_json::to_string_pretty(&combo.snapshot()) {
        Ok(json) => println!("\nFinal state:\n{}", json),
        Err(e) => log::error!("Failed to serialize snapshot: {}", e),
    }
}
