//! Playback sequencer
//!
//! The state machine that walks a symbol queue: `Idle -> Playing ->
//! Finishing -> Idle`, with cancellation reachable from `Playing` and
//! `Finishing`. Each advancement schedules exactly one timer through
//! the scheduler; timer expiry drives the next advancement. Hold
//! timers sample the speed at scheduling time — a mid-hold speed
//! change adjusts the mixer's clip rate immediately but does not
//! rescale the timer already counting down, bounding the
//! inconsistency to one symbol.

use std::time::Duration;

use log::{debug, warn};

use super::scheduler::{Scheduler, TimerHandle};
use super::session::PlaybackSession;
use crate::config::EngineConfig;
use crate::mixer::{ClipHandle, ContextId, MixerCoordinator};
use crate::resource::ClipLibrary;
use crate::speed::SpeedController;
use crate::translate::{self, Symbol};

/// Sequencer lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequencerState {
    #[default]
    Idle,
    Playing,
    Finishing,
}

/// Synchronous result of a submit request; rejections are ordinary
/// values, never errors (busy and not-ready submissions are logged
/// and leave any existing session untouched).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A session was created and playback began
    Started,
    /// Rejected: a session is already in progress
    AlreadyPlaying,
    /// Rejected: the clip library has not finished warming up
    NotReady,
    /// The text contained no supported symbols; nothing was played
    NothingToPlay,
}

pub struct Sequencer {
    state: SequencerState,
    session: Option<PlaybackSession>,
    /// The single timer this sequencer is waiting on, if any
    pending: Option<TimerHandle>,
    current_symbol: Option<char>,
    idle: Option<ClipHandle>,
    speed: SpeedController,
    config: EngineConfig,
}

impl Sequencer {
    pub fn new(config: EngineConfig, speed: SpeedController) -> Self {
        Self {
            state: SequencerState::default(),
            session: None,
            pending: None,
            current_symbol: None,
            idle: None,
            speed,
            config,
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state != SequencerState::Idle
    }

    /// Letter most recently advanced to, for the observing UI
    pub fn current_symbol(&self) -> Option<char> {
        self.current_symbol
    }

    /// Idle clip used for finish/cancel fades and the fallback policy
    pub fn set_idle(&mut self, idle: Option<ClipHandle>) {
        self.idle = idle;
    }

    /// Start playback of `text` at `speed`. Valid only from `Idle`
    /// with a ready library; both rejections are silent (logged).
    pub fn submit(
        &mut self,
        text: &str,
        speed: f32,
        library: &ClipLibrary,
        mixer: &mut MixerCoordinator,
        scheduler: &mut Scheduler,
    ) -> SubmitOutcome {
        if self.state != SequencerState::Idle {
            warn!("submit rejected: playback already in progress");
            return SubmitOutcome::AlreadyPlaying;
        }
        if !library.is_ready() {
            warn!("submit rejected: clip library not ready");
            return SubmitOutcome::NotReady;
        }

        let queue = translate::translate(text);
        if queue.is_empty() {
            debug!("nothing to play: no supported symbols in {:?}", text);
            return SubmitOutcome::NothingToPlay;
        }

        self.speed.set(speed);
        mixer.set_rate(self.speed.get());
        debug!("starting playback: {} symbols at {}x", queue.len(), self.speed.get());
        self.session = Some(PlaybackSession::new(queue));
        self.state = SequencerState::Playing;
        self.step(library, mixer, scheduler);
        SubmitOutcome::Started
    }

    /// Timer expiry entry point. Stale handles (superseded or fired
    /// after a cancel was accepted) are ignored and touch nothing.
    pub fn on_timer(
        &mut self,
        handle: TimerHandle,
        library: &ClipLibrary,
        mixer: &mut MixerCoordinator,
        scheduler: &mut Scheduler,
    ) {
        if self.pending != Some(handle) {
            debug!("ignoring stale timer {:?}", handle);
            return;
        }
        self.pending = None;
        match self.state {
            SequencerState::Playing => self.step(library, mixer, scheduler),
            SequencerState::Finishing => {
                self.state = SequencerState::Idle;
                debug!("playback finished");
            }
            SequencerState::Idle => {}
        }
    }

    /// Halt playback immediately. Idempotent; a no-op from `Idle`.
    pub fn cancel(&mut self, mixer: &mut MixerCoordinator, scheduler: &mut Scheduler) {
        if self.state == SequencerState::Idle {
            return;
        }
        if let Some(handle) = self.pending.take() {
            scheduler.cancel(handle);
        }
        self.session = None;
        self.current_symbol = None;
        self.state = SequencerState::Idle;
        mixer.crossfade_to(ContextId::Base, self.idle.clone(), self.config.fade_out);
        debug!("playback cancelled");
    }

    /// Live speed change; never restarts the session. The mixer rate
    /// follows immediately, the in-flight hold timer does not.
    pub fn set_speed(&mut self, speed: f32, mixer: &mut MixerCoordinator) {
        self.speed.set(speed);
        mixer.set_rate(self.speed.get());
    }

    /// Advance through the symbol at the cursor and schedule the next
    /// wake-up.
    fn step(
        &mut self,
        library: &ClipLibrary,
        mixer: &mut MixerCoordinator,
        scheduler: &mut Scheduler,
    ) {
        let Some(session) = self.session.as_mut() else {
            // Session vanished under a live timer; treat as finished
            self.state = SequencerState::Idle;
            return;
        };

        let Some(symbol) = session.current() else {
            self.begin_finish(mixer, scheduler);
            return;
        };
        session.advance();

        let hold = match symbol {
            Symbol::Pause => {
                // The current gesture clip keeps displaying; pauses
                // only consume time
                debug!("pause");
                self.speed.scale(self.config.base_pause.max(self.config.min_pause))
            }
            Symbol::Letter(letter) => {
                self.current_symbol = Some(letter);
                match library.get(letter) {
                    Some(desc) if desc.is_available() => {
                        debug!("playing '{}' ({})", letter, desc.resource_id);
                        mixer.crossfade_to(
                            ContextId::Gesture,
                            Some(desc.handle()),
                            self.config.fade_in,
                        );
                        let body = desc.duration.saturating_sub(self.config.fade_in);
                        self.speed.scale(body).max(self.config.min_hold)
                    }
                    _ => self.hold_unavailable(letter, mixer),
                }
            }
        };

        self.pending = Some(scheduler.schedule(hold));
    }

    /// Fallback policy for a letter without a playable clip: show the
    /// idle animation as a placeholder, or just consume time. Silent
    /// degradation; diagnostics only.
    fn hold_unavailable(&mut self, letter: char, mixer: &mut MixerCoordinator) -> Duration {
        match &self.idle {
            Some(idle) => {
                debug!("no clip for '{}', idling as placeholder", letter);
                mixer.crossfade_to(ContextId::Base, Some(idle.clone()), self.config.fade_in);
                self.speed.scale(self.config.fallback_hold)
            }
            None => {
                debug!("no clip for '{}' and no idle clip, skipping", letter);
                self.speed.scale(self.config.skip_hold)
            }
        }
    }

    fn begin_finish(&mut self, mixer: &mut MixerCoordinator, scheduler: &mut Scheduler) {
        self.session = None;
        self.current_symbol = None;
        self.state = SequencerState::Finishing;
        mixer.crossfade_to(ContextId::Base, self.idle.clone(), self.config.fade_out);
        self.pending = Some(scheduler.schedule(self.config.fade_out));
    }
}
