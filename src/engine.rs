//! Engine facade
//!
//! Owns every playback component and serializes all external requests
//! (submit, cancel, set-speed) onto one timeline. The host drives the
//! engine by calling [`Engine::update`] with elapsed wall time; each
//! update ingests finished clip resolutions, fires due timers, steps
//! the mixer and re-poses the bone rig.

use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::config::EngineConfig;
use crate::mixer::{ContextId, MixerCoordinator};
use crate::playback::{Scheduler, Sequencer, SubmitOutcome};
use crate::resource::{resolver, ClipCache, ClipLibrary, ClipSource};
use crate::skeleton::{BoneTransform, Skeleton};
use crate::speed::SpeedController;

pub struct Engine {
    config: EngineConfig,
    library: ClipLibrary,
    sequencer: Sequencer,
    scheduler: Scheduler,
    mixer: MixerCoordinator,
    speed: SpeedController,
    skeleton: Skeleton,
    /// Whether the looping idle clip has been handed to the base
    /// context yet (it lands whenever its resolution completes)
    base_started: bool,
}

impl Engine {
    /// Create the engine and eagerly start the alphabet warm-up.
    pub fn new(source: Arc<dyn ClipSource>, config: EngineConfig) -> Self {
        let cache = Arc::new(ClipCache::new(config.cache_entries));
        let completions = resolver::spawn_warmup(source, cache, config.resolver());
        let library = ClipLibrary::new(completions, config.idle_clip.is_some());
        let speed = SpeedController::default();
        let sequencer = Sequencer::new(config.clone(), speed.clone());
        Self {
            config,
            library,
            sequencer,
            scheduler: Scheduler::new(),
            mixer: MixerCoordinator::new(),
            speed,
            skeleton: Skeleton::default(),
            base_started: false,
        }
    }

    /// True once every alphabet letter has been resolved
    pub fn is_ready(&self) -> bool {
        self.library.is_ready()
    }

    /// Block until the warm-up completes or `timeout` elapses
    pub fn wait_ready(&mut self, timeout: Duration) -> bool {
        let ready = self.library.wait_ready(timeout);
        self.adopt_idle();
        ready
    }

    /// Letters that resolved with a playable clip
    pub fn available_clips(&self) -> usize {
        self.library.available_count()
    }

    /// Whether the base idle clip has resolved and been adopted
    pub fn has_idle(&self) -> bool {
        self.base_started
    }

    /// Request playback; rejections are synchronous and silent
    pub fn submit(&mut self, text: &str, speed: f32) -> SubmitOutcome {
        self.sequencer.submit(
            text,
            speed,
            &self.library,
            &mut self.mixer,
            &mut self.scheduler,
        )
    }

    /// Halt playback; idempotent
    pub fn cancel(&mut self) {
        self.sequencer.cancel(&mut self.mixer, &mut self.scheduler);
    }

    /// Live speed change; affects remaining holds and the active
    /// clip's rate, never restarts the session
    pub fn set_speed(&mut self, speed: f32) {
        self.sequencer.set_speed(speed, &mut self.mixer);
    }

    pub fn speed(&self) -> f32 {
        self.speed.get()
    }

    pub fn is_playing(&self) -> bool {
        self.sequencer.is_playing()
    }

    /// Letter currently being performed, for the observing UI
    pub fn current_symbol(&self) -> Option<char> {
        self.sequencer.current_symbol()
    }

    /// Snapshot of the rig for bone-inspection panels
    pub fn bone_transforms(&self) -> Vec<BoneTransform> {
        self.skeleton.snapshot(true)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Advance the engine timeline by `delta` of wall time.
    pub fn update(&mut self, delta: Duration) {
        self.library.pump();
        self.adopt_idle();

        for handle in self.scheduler.advance(delta) {
            self.sequencer.on_timer(
                handle,
                &self.library,
                &mut self.mixer,
                &mut self.scheduler,
            );
        }

        self.mixer.update(delta);
        self.pose_skeleton();
    }

    /// Hand the idle clip to the base context once it has resolved
    fn adopt_idle(&mut self) {
        if self.base_started {
            return;
        }
        if let Some(idle) = self.library.idle_handle() {
            debug!("idle clip '{}' adopted by base context", idle.name);
            let idle = idle.clone();
            self.sequencer.set_idle(Some(idle.clone()));
            self.mixer
                .crossfade_to(ContextId::Base, Some(idle), self.config.fade_in);
            self.base_started = true;
        }
    }

    fn pose_skeleton(&mut self) {
        let (_, gesture_weight) = self.mixer.blend();
        match self.mixer.gesture_clip() {
            Some(clip) if !clip.pose.is_empty() => {
                let pose = Arc::clone(&clip.pose);
                self.skeleton.apply_blend(&pose, gesture_weight);
            }
            _ => self.skeleton.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::source::{ClipData, MemoryClipSource};
    use crate::skeleton::BonePose;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn ready_engine(source: MemoryClipSource, config: EngineConfig) -> Engine {
        let mut engine = Engine::new(Arc::new(source), config);
        assert!(engine.wait_ready(Duration::from_secs(5)));
        engine
    }

    #[test]
    fn test_submit_and_observe() {
        let mut engine = ready_engine(
            MemoryClipSource::uniform(ms(500)),
            EngineConfig {
                idle_clip: None,
                ..EngineConfig::default()
            },
        );
        assert_eq!(engine.submit("да", 1.0), SubmitOutcome::Started);
        assert!(engine.is_playing());
        assert_eq!(engine.current_symbol(), Some('д'));
    }

    #[test]
    fn test_skeleton_follows_gesture_pose() {
        let mut source = MemoryClipSource::uniform(ms(500));
        let posed = ClipData::new(ms(500)).with_pose(vec![BonePose {
            bone: "Hand.R".to_string(),
            position: [-0.3, 0.1, 0.0],
            rotation: [0.0, 0.0, 0.0, 1.0],
        }]);
        source.insert("d_m", posed);
        let mut engine = ready_engine(
            source,
            EngineConfig {
                idle_clip: None,
                ..EngineConfig::default()
            },
        );

        engine.submit("м", 1.0);
        // Let the 300ms fade finish so the gesture owns full weight
        engine.update(ms(150));
        engine.update(ms(150));
        let bones = engine.bone_transforms();
        let hand = bones.iter().find(|b| b.name == "Hand.R").unwrap();
        assert_eq!(hand.position, [-0.3, 0.1, 0.0]);
        assert!(hand.world_position.is_some());
    }

    #[test]
    fn test_bone_snapshot_always_present() {
        let engine = Engine::new(
            Arc::new(MemoryClipSource::new()),
            EngineConfig::default(),
        );
        // Readable even before the library is ready
        assert!(!engine.bone_transforms().is_empty());
    }

    #[test]
    fn test_idle_adopted_into_base_context() {
        let mut source = MemoryClipSource::uniform(ms(500));
        source.insert("idle", ClipData::new(Duration::from_secs(2)));
        let mut engine = ready_engine(source, EngineConfig::default());
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while engine.mixer.base_clip().is_none() && std::time::Instant::now() < deadline {
            engine.update(ms(1));
            std::thread::sleep(ms(1));
        }
        assert_eq!(engine.mixer.base_clip().unwrap().name, "idle");
    }

    #[test]
    fn test_set_speed_reflected() {
        let mut engine = ready_engine(
            MemoryClipSource::uniform(ms(500)),
            EngineConfig {
                idle_clip: None,
                ..EngineConfig::default()
            },
        );
        engine.set_speed(1.5);
        assert_eq!(engine.speed(), 1.5);
    }
}
