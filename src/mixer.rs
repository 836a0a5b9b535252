//! Two-context mixer coordinator
//!
//! Owns the `base` (idle/ambient, looping) and `gesture` (one-shot,
//! clamped at the final pose) animation contexts and the crossfade
//! between them. Exactly one context is authoritative at steady state;
//! during a fade both weights may be non-zero but they converge. Only
//! the sequencer requests transitions; nothing else mutates weights.

use std::sync::Arc;
use std::time::Duration;

use crate::skeleton::BonePose;
use crate::speed;

/// Identifies one of the two animation contexts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextId {
    Base,
    Gesture,
}

/// Shareable reference to a playable clip
#[derive(Debug, Clone)]
pub struct ClipHandle {
    /// Opaque resource id, for diagnostics
    pub name: String,
    pub duration: Duration,
    /// Held pose applied while the clip is active
    pub pose: Arc<Vec<BonePose>>,
}

impl ClipHandle {
    pub fn new(name: String, duration: Duration, pose: Vec<BonePose>) -> Self {
        Self {
            name,
            duration,
            pose: Arc::new(pose),
        }
    }
}

/// A clip playing inside one context
#[derive(Debug, Clone)]
struct ClipInstance {
    handle: ClipHandle,
    position: Duration,
}

#[derive(Debug, Default)]
struct Context {
    clip: Option<ClipInstance>,
    weight: f32,
}

#[derive(Debug)]
struct Fade {
    target: ContextId,
    elapsed: Duration,
    total: Duration,
    from_base: f32,
    from_gesture: f32,
}

/// The mixer coordinator; all times advance via [`MixerCoordinator::update`]
pub struct MixerCoordinator {
    base: Context,
    gesture: Context,
    fade: Option<Fade>,
    /// Playback rate for the gesture context only
    rate: f32,
}

impl Default for MixerCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl MixerCoordinator {
    /// Starts with the base context authoritative and no clips loaded
    pub fn new() -> Self {
        Self {
            base: Context {
                clip: None,
                weight: 1.0,
            },
            gesture: Context::default(),
            fade: None,
            rate: 1.0,
        }
    }

    /// Begin a crossfade toward `target`, optionally starting a clip
    /// from position zero in that context. A new request supersedes an
    /// in-progress fade from the current weights, never snapping.
    pub fn crossfade_to(&mut self, target: ContextId, clip: Option<ClipHandle>, fade: Duration) {
        if let Some(handle) = clip {
            let instance = ClipInstance {
                handle,
                position: Duration::ZERO,
            };
            match target {
                ContextId::Base => self.base.clip = Some(instance),
                ContextId::Gesture => self.gesture.clip = Some(instance),
            }
        }

        if fade.is_zero() {
            self.snap_to(target);
            return;
        }
        self.fade = Some(Fade {
            target,
            elapsed: Duration::ZERO,
            total: fade,
            from_base: self.base.weight,
            from_gesture: self.gesture.weight,
        });
    }

    fn snap_to(&mut self, target: ContextId) {
        self.fade = None;
        match target {
            ContextId::Base => {
                self.base.weight = 1.0;
                self.gesture.weight = 0.0;
            }
            ContextId::Gesture => {
                self.base.weight = 0.0;
                self.gesture.weight = 1.0;
            }
        }
    }

    /// Live playback-rate change for whatever clip occupies the
    /// gesture context; does not reset its position.
    pub fn set_rate(&mut self, multiplier: f32) {
        self.rate = speed::clamp(multiplier);
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Advance fades and clip positions by `delta` of wall time
    pub fn update(&mut self, delta: Duration) {
        if let Some(fade) = &mut self.fade {
            fade.elapsed += delta;
            let t = (fade.elapsed.as_secs_f32() / fade.total.as_secs_f32()).min(1.0);
            let (base_to, gesture_to) = match fade.target {
                ContextId::Base => (1.0, 0.0),
                ContextId::Gesture => (0.0, 1.0),
            };
            self.base.weight = fade.from_base + (base_to - fade.from_base) * t;
            self.gesture.weight = fade.from_gesture + (gesture_to - fade.from_gesture) * t;
            if t >= 1.0 {
                self.fade = None;
            }
        }

        // Base idle loops; gesture clips clamp at their final pose
        if let Some(clip) = &mut self.base.clip {
            if !clip.handle.duration.is_zero() {
                let mut pos = clip.position + delta;
                while pos >= clip.handle.duration {
                    pos -= clip.handle.duration;
                }
                clip.position = pos;
            }
        }
        if let Some(clip) = &mut self.gesture.clip {
            // A delta large enough to overflow the scaled duration
            // lands at the clamp anyway
            let scaled = Duration::try_from_secs_f32(delta.as_secs_f32() * self.rate)
                .unwrap_or(clip.handle.duration);
            clip.position = clip.position.saturating_add(scaled).min(clip.handle.duration);
        }
    }

    /// The context holding full weight, if not mid-fade
    pub fn authoritative(&self) -> Option<ContextId> {
        if self.base.weight >= 1.0 && self.gesture.weight <= 0.0 {
            Some(ContextId::Base)
        } else if self.gesture.weight >= 1.0 && self.base.weight <= 0.0 {
            Some(ContextId::Gesture)
        } else {
            None
        }
    }

    /// Current (base, gesture) blend weights
    pub fn blend(&self) -> (f32, f32) {
        (self.base.weight, self.gesture.weight)
    }

    pub fn gesture_clip(&self) -> Option<&ClipHandle> {
        self.gesture.clip.as_ref().map(|c| &c.handle)
    }

    pub fn base_clip(&self) -> Option<&ClipHandle> {
        self.base.clip.as_ref().map(|c| &c.handle)
    }

    /// Playback position of the gesture clip (clamped at its end)
    pub fn gesture_position(&self) -> Option<Duration> {
        self.gesture.clip.as_ref().map(|c| c.position)
    }

    /// Playback position of the looping base clip
    pub fn base_position(&self) -> Option<Duration> {
        self.base.clip.as_ref().map(|c| c.position)
    }

    /// True once the gesture clip has been clamped at its final pose
    pub fn gesture_finished(&self) -> bool {
        self.gesture
            .clip
            .as_ref()
            .map(|c| c.position >= c.handle.duration)
            .unwrap_or(false)
    }
}
