//! Engine configuration
//!
//! Timing constants default to the values the playback feel was tuned
//! around: 0.3 s fade into a gesture, 0.5 s fade back to idle, 0.5 s
//! pauses, and short floors that guarantee forward progress even for
//! degenerate clips.

use std::time::Duration;

use crate::resource::ResolverConfig;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Crossfade into a gesture clip (also the fade overlap subtracted
    /// from a clip's hold time)
    pub fade_in: Duration,
    /// Crossfade back to the base context on finish/cancel
    pub fade_out: Duration,
    /// Hold for a pause symbol, before speed scaling
    pub base_pause: Duration,
    /// Lower bound for pause holds
    pub min_pause: Duration,
    /// Floor for a letter's hold after speed scaling
    pub min_hold: Duration,
    /// Hold for an unavailable letter shown via the base idle clip
    pub fallback_hold: Duration,
    /// Hold for an unavailable letter when no idle clip exists
    pub skip_hold: Duration,
    /// Duration recorded on Unavailable descriptors
    pub unavailable_duration: Duration,
    /// Resolver worker threads (caps in-flight resolutions)
    pub resolver_workers: usize,
    /// Clip payload cache capacity, in entries
    pub cache_entries: usize,
    /// Resource id of the base idle animation, `None` to disable
    pub idle_clip: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fade_in: Duration::from_millis(300),
            fade_out: Duration::from_millis(500),
            base_pause: Duration::from_millis(500),
            min_pause: Duration::from_millis(300),
            min_hold: Duration::from_millis(100),
            fallback_hold: Duration::from_millis(500),
            skip_hold: Duration::from_millis(300),
            unavailable_duration: Duration::from_millis(500),
            resolver_workers: 4,
            cache_entries: 64,
            idle_clip: Some("idle".to_string()),
        }
    }
}

impl EngineConfig {
    /// The slice of the configuration the warm-up needs
    pub fn resolver(&self) -> ResolverConfig {
        ResolverConfig {
            workers: self.resolver_workers,
            unavailable_duration: self.unavailable_duration,
            idle_clip: self.idle_clip.clone(),
        }
    }
}
