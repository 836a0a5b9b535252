//! dactyl - fingerspelling gesture playback engine
//!
//! Turns arbitrary input text into a timed sequence of per-letter
//! gesture clips, resolved from asynchronously warmed-up resources,
//! sequenced and crossfaded against a looping idle animation, with a
//! live-adjustable playback speed and clean cancellation.

pub mod alphabet;
pub mod cli;
pub mod config;
pub mod engine;
pub mod mixer;
pub mod playback;
pub mod resource;
pub mod skeleton;
pub mod speed;
pub mod translate;

pub use config::EngineConfig;
pub use engine::Engine;
pub use playback::SubmitOutcome;
pub use translate::{translate, Symbol};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "dactyl";
