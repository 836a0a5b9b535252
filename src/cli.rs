//! Command-line interface for the demo driver

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::config::EngineConfig;

/// Fingerspelling gesture playback engine
#[derive(Parser, Debug)]
#[command(name = "dactyl")]
#[command(version)]
#[command(about = "Plays a fingerspelling gesture sequence for the given text", long_about = None)]
pub struct Cli {
    /// Text to fingerspell (unsupported characters are dropped)
    pub text: String,

    /// Directory containing `d_<letter>.clip` manifests
    #[arg(short, long, value_name = "DIR")]
    pub clips: PathBuf,

    /// Playback speed multiplier (0.5 - 2.0 in the original selector)
    #[arg(short, long, default_value_t = 1.0)]
    pub speed: f32,

    /// Print the bone transform snapshot after playback
    #[arg(long)]
    pub bones: bool,

    /// Do not resolve or run the base idle animation
    #[arg(long)]
    pub no_idle: bool,

    /// Warm-up timeout in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 5000)]
    pub warmup_timeout: u64,
}

impl Cli {
    /// Validate arguments that clap cannot check on its own
    pub fn validate(&self) -> Result<()> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            bail!("speed must be a positive number, got {}", self.speed);
        }
        if !self.clips.is_dir() {
            bail!("clip directory {:?} does not exist", self.clips);
        }
        Ok(())
    }

    /// Engine configuration derived from the arguments
    pub fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default();
        if self.no_idle {
            config.idle_clip = None;
        }
        config
    }
}
