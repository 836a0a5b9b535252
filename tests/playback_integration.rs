//! End-to-end playback tests driving the engine over virtual time.

use std::sync::Arc;
use std::time::Duration;

use dactyl::config::EngineConfig;
use dactyl::resource::{ClipData, MemoryClipSource};
use dactyl::translate::{translate, Symbol};
use dactyl::{Engine, SubmitOutcome};

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

/// Engine with every letter resolved to a 0.5s clip and no idle clip
fn ready_engine() -> Engine {
    engine_with(MemoryClipSource::uniform(ms(500)), false)
}

fn engine_with(source: MemoryClipSource, idle: bool) -> Engine {
    let mut config = EngineConfig::default();
    if !idle {
        config.idle_clip = None;
    }
    let mut engine = Engine::new(Arc::new(source), config);
    assert!(engine.wait_ready(Duration::from_secs(5)), "warm-up timed out");
    engine
}

/// Step until idle, returning every distinct current-symbol update
/// (letters in order, with the final clear represented implicitly)
/// and the number of ticks taken.
fn run_to_idle(engine: &mut Engine, step: Duration) -> (Vec<char>, usize) {
    let mut updates = Vec::new();
    for tick in 0..20_000 {
        if let Some(c) = engine.current_symbol() {
            if updates.last() != Some(&c) {
                updates.push(c);
            }
        }
        if !engine.is_playing() {
            return (updates, tick);
        }
        engine.update(step);
    }
    panic!("playback never returned to idle");
}

#[test]
fn translate_example_from_mixed_text() {
    let symbols = translate("Привет, мир!");
    let expected = vec![
        Symbol::Letter('п'),
        Symbol::Letter('р'),
        Symbol::Letter('и'),
        Symbol::Letter('в'),
        Symbol::Letter('е'),
        Symbol::Letter('т'),
        Symbol::Pause,
        Symbol::Letter('м'),
        Symbol::Letter('и'),
        Symbol::Letter('р'),
    ];
    assert_eq!(symbols, expected);
}

#[test]
fn scenario_privet_mir_at_normal_speed() {
    let mut engine = ready_engine();
    assert_eq!(engine.submit("привет мир", 1.0), SubmitOutcome::Started);

    let mut was_playing_throughout = true;
    let mut updates = Vec::new();
    for _ in 0..20_000 {
        if let Some(c) = engine.current_symbol() {
            if updates.last() != Some(&c) {
                updates.push(c);
            }
        }
        if !engine.is_playing() {
            break;
        }
        was_playing_throughout &= engine.is_playing();
        engine.update(ms(10));
    }

    // 9 letter advancements, the pause holds 'т' without an update
    assert_eq!(updates, vec!['п', 'р', 'и', 'в', 'е', 'т', 'м', 'и', 'р']);
    assert!(was_playing_throughout);
    assert!(!engine.is_playing());
    assert_eq!(engine.current_symbol(), None);
}

#[test]
fn submit_while_playing_is_a_noop() {
    let mut engine = ready_engine();
    engine.submit("мир", 1.0);
    engine.update(ms(50));
    let before = engine.current_symbol();

    assert_eq!(engine.submit("да", 1.0), SubmitOutcome::AlreadyPlaying);
    assert_eq!(engine.current_symbol(), before);

    // The original session still runs to completion
    let (updates, _) = run_to_idle(&mut engine, ms(10));
    assert_eq!(updates, vec!['м', 'и', 'р']);
}

#[test]
fn submit_before_ready_is_rejected() {
    let source = MemoryClipSource::uniform(ms(500)).with_latency(ms(200));
    let mut engine = Engine::new(
        Arc::new(source),
        EngineConfig {
            idle_clip: None,
            ..EngineConfig::default()
        },
    );
    assert!(!engine.is_ready());
    assert_eq!(engine.submit("мир", 1.0), SubmitOutcome::NotReady);
    assert!(!engine.is_playing());
}

#[test]
fn playback_time_decreases_with_speed() {
    let mut ticks = Vec::new();
    for speed in [0.5, 1.0, 2.0] {
        let mut engine = ready_engine();
        assert_eq!(engine.submit("привет", speed), SubmitOutcome::Started);
        let (_, n) = run_to_idle(&mut engine, ms(10));
        ticks.push(n);
    }
    assert!(ticks[0] > ticks[1], "0.5x should be slower than 1x");
    assert!(ticks[1] > ticks[2], "1x should be slower than 2x");
}

#[test]
fn redundant_set_speed_is_invariant() {
    let mut plain = ready_engine();
    plain.submit("привет", 1.0);
    let (updates_plain, ticks_plain) = run_to_idle(&mut plain, ms(10));

    let mut noisy = ready_engine();
    noisy.submit("привет", 1.0);
    let mut updates = Vec::new();
    let mut ticks = 0;
    for tick in 0..20_000 {
        noisy.set_speed(1.0);
        if let Some(c) = noisy.current_symbol() {
            if updates.last() != Some(&c) {
                updates.push(c);
            }
        }
        if !noisy.is_playing() {
            ticks = tick;
            break;
        }
        noisy.update(ms(10));
    }

    assert_eq!(updates, updates_plain);
    assert_eq!(ticks, ticks_plain);
}

#[test]
fn cancel_clears_state_immediately() {
    let mut engine = ready_engine();
    engine.submit("привет мир", 1.0);
    engine.update(ms(50));
    assert!(engine.is_playing());

    engine.cancel();
    assert!(!engine.is_playing());
    assert_eq!(engine.current_symbol(), None);

    // The orphaned hold timer must not resurrect playback
    for _ in 0..100 {
        engine.update(ms(50));
    }
    assert!(!engine.is_playing());
    assert_eq!(engine.current_symbol(), None);
}

#[test]
fn cancel_from_idle_is_a_noop() {
    let mut engine = ready_engine();
    engine.cancel();
    engine.cancel();
    assert!(!engine.is_playing());
    assert_eq!(engine.current_symbol(), None);
}

#[test]
fn all_unavailable_sequence_completes() {
    // Empty source: every letter soft-fails to Unavailable
    let mut engine = engine_with(MemoryClipSource::new(), false);
    assert_eq!(engine.available_clips(), 0);
    assert_eq!(engine.submit("привет мир", 1.0), SubmitOutcome::Started);
    let (updates, _) = run_to_idle(&mut engine, ms(10));
    // Degraded playback still publishes every letter and finishes
    assert_eq!(updates, vec!['п', 'р', 'и', 'в', 'е', 'т', 'м', 'и', 'р']);
}

#[test]
fn unavailable_letters_fall_back_to_idle_clip() {
    let mut source = MemoryClipSource::new();
    source.insert("idle", ClipData::new(Duration::from_secs(2)));
    let mut engine = engine_with(source, true);
    // Idle resolution may trail the letters; let it land
    for _ in 0..5000 {
        if engine.has_idle() {
            break;
        }
        engine.update(ms(1));
        std::thread::sleep(ms(1));
    }
    assert!(engine.has_idle(), "idle clip never resolved");
    assert_eq!(engine.submit("да", 1.0), SubmitOutcome::Started);
    let (updates, _) = run_to_idle(&mut engine, ms(10));
    assert_eq!(updates, vec!['д', 'а']);
}

#[test]
fn repeated_submission_is_deterministic() {
    let mut engine = ready_engine();

    engine.submit("привет мир", 1.0);
    let (first, first_ticks) = run_to_idle(&mut engine, ms(10));

    // Same engine, same library, same text: identical observable run
    assert_eq!(engine.submit("привет мир", 1.0), SubmitOutcome::Started);
    let (second, second_ticks) = run_to_idle(&mut engine, ms(10));

    assert_eq!(first, second);
    assert_eq!(first_ticks, second_ticks);
}

#[test]
fn speed_change_mid_session_keeps_session() {
    let mut engine = ready_engine();
    engine.submit("привет", 1.0);
    engine.update(ms(50));
    let symbol = engine.current_symbol();

    engine.set_speed(2.0);
    assert!(engine.is_playing());
    assert_eq!(engine.current_symbol(), symbol);

    let (updates, _) = run_to_idle(&mut engine, ms(10));
    assert_eq!(updates, vec!['п', 'р', 'и', 'в', 'е', 'т']);
}

#[test]
fn extreme_speed_is_clamped_and_survives_update() {
    let mut engine = ready_engine();
    assert_eq!(engine.submit("мир", 1.0), SubmitOutcome::Started);
    engine.update(ms(16));

    // Absurd multipliers clamp instead of overflowing clip advancement
    engine.set_speed(1.0e25);
    engine.update(ms(16));
    assert!(engine.is_playing());

    engine.set_speed(f32::INFINITY);
    engine.update(ms(16));

    let (updates, _) = run_to_idle(&mut engine, ms(10));
    assert_eq!(updates, vec!['м', 'и', 'р']);
}

#[test]
fn bone_snapshot_readable_any_time() {
    let mut engine = ready_engine();
    let rest = engine.bone_transforms();
    assert!(!rest.is_empty());
    assert!(rest.iter().all(|b| b.world_position.is_some()));

    engine.submit("мир", 1.0);
    engine.update(ms(100));
    assert_eq!(engine.bone_transforms().len(), rest.len());
}
