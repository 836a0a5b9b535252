//! Timer-driven playback: scheduler, session and the sequencer

pub mod scheduler;
pub mod sequencer;
pub mod session;

pub use scheduler::{Scheduler, TimerHandle};
pub use sequencer::{Sequencer, SequencerState, SubmitOutcome};
pub use session::PlaybackSession;
