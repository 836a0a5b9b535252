//! Shared playback speed controller
//!
//! One scalar read by both the sequencer (hold scaling) and the mixer
//! coordinator (clip rate). Cloning the controller clones the handle,
//! not the value; all clones observe the same speed.

use portable_atomic::AtomicF32;
use std::sync::Arc;
use std::time::Duration;

/// Lowest accepted speed; requests below this are clamped, never zero
pub const MIN_SPEED: f32 = 0.01;

/// Highest accepted speed. Unbounded rates overflow the duration
/// arithmetic in hold scaling and clip advancement.
pub const MAX_SPEED: f32 = 100.0;

/// Cloneable handle to the shared speed scalar
#[derive(Debug, Clone)]
pub struct SpeedController {
    value: Arc<AtomicF32>,
}

impl Default for SpeedController {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl SpeedController {
    pub fn new(speed: f32) -> Self {
        Self {
            value: Arc::new(AtomicF32::new(clamp(speed))),
        }
    }

    /// Current speed multiplier, always >= MIN_SPEED
    pub fn get(&self) -> f32 {
        self.value.load(portable_atomic::Ordering::Relaxed)
    }

    /// Set the speed, clamping out-of-range and NaN input
    pub fn set(&self, speed: f32) {
        self.value
            .store(clamp(speed), portable_atomic::Ordering::Relaxed);
    }

    /// Scale a duration by the current speed (higher speed = shorter)
    pub fn scale(&self, duration: Duration) -> Duration {
        Duration::from_secs_f32(duration.as_secs_f32() / self.get())
    }
}

/// Clamp a requested multiplier into `[MIN_SPEED, MAX_SPEED]`;
/// NaN and non-positive input collapse to `MIN_SPEED`.
pub(crate) fn clamp(speed: f32) -> f32 {
    if !speed.is_finite() || speed <= MIN_SPEED {
        MIN_SPEED
    } else {
        speed.min(MAX_SPEED)
    }
}
