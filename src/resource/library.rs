//! Clip library
//!
//! Symbol -> descriptor map populated incrementally by the warm-up.
//! Entries are write-once: once a letter's availability is determined
//! it never changes within a running process (no retry/refresh).
//! The library is "ready" exactly when every alphabet letter has an
//! entry; the sequencer refuses to start sessions before that.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel::{Receiver, RecvTimeoutError};
use log::info;

use super::resolver::Completion;
use crate::alphabet;
use crate::mixer::ClipHandle;
use crate::skeleton::BonePose;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable,
}

/// Resolved per-letter clip metadata; immutable once created
#[derive(Debug, Clone)]
pub struct ClipDescriptor {
    pub symbol: char,
    pub resource_id: String,
    pub duration: Duration,
    pub availability: Availability,
    pub pose: Arc<Vec<BonePose>>,
}

impl ClipDescriptor {
    pub fn available(
        symbol: char,
        resource_id: String,
        duration: Duration,
        pose: Vec<BonePose>,
    ) -> Self {
        Self {
            symbol,
            resource_id,
            duration,
            availability: Availability::Available,
            pose: Arc::new(pose),
        }
    }

    pub fn unavailable(symbol: char, resource_id: String, duration: Duration) -> Self {
        Self {
            symbol,
            resource_id,
            duration,
            availability: Availability::Unavailable,
            pose: Arc::new(Vec::new()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.availability == Availability::Available
    }

    /// Mixer handle for this clip
    pub fn handle(&self) -> ClipHandle {
        ClipHandle {
            name: self.resource_id.clone(),
            duration: self.duration,
            pose: Arc::clone(&self.pose),
        }
    }
}

#[derive(Debug, Clone, Default)]
enum IdleState {
    /// A resolution is still in flight
    Pending,
    /// No idle clip configured, or it failed to resolve
    #[default]
    Missing,
    Ready(ClipHandle),
}

/// Incrementally-populated symbol -> descriptor map
pub struct ClipLibrary {
    entries: HashMap<char, ClipDescriptor>,
    idle: IdleState,
    completions: Receiver<Completion>,
    announced: bool,
}

impl ClipLibrary {
    pub(crate) fn new(completions: Receiver<Completion>, expects_idle: bool) -> Self {
        Self {
            entries: HashMap::new(),
            idle: if expects_idle {
                IdleState::Pending
            } else {
                IdleState::Missing
            },
            completions,
            announced: false,
        }
    }

    /// Ingest buffered completions without blocking
    pub fn pump(&mut self) {
        while let Ok(completion) = self.completions.try_recv() {
            self.ingest(completion);
        }
        self.announce_if_ready();
    }

    /// Block until ready or the timeout elapses; returns readiness
    pub fn wait_ready(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.is_ready() {
            let remaining = match deadline.checked_duration_since(Instant::now()) {
                Some(d) if !d.is_zero() => d,
                _ => break,
            };
            match self.completions.recv_timeout(remaining) {
                Ok(completion) => self.ingest(completion),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.announce_if_ready();
        self.is_ready()
    }

    fn ingest(&mut self, completion: Completion) {
        match completion {
            // Write-once: a duplicate completion never overwrites
            Completion::Letter(desc) => {
                self.entries.entry(desc.symbol).or_insert(desc);
            }
            Completion::Idle(Some(handle)) => self.idle = IdleState::Ready(handle),
            Completion::Idle(None) => self.idle = IdleState::Missing,
        }
    }

    fn announce_if_ready(&mut self) {
        if !self.announced && self.is_ready() {
            self.announced = true;
            info!(
                "clip library ready: {}/{} letters available",
                self.available_count(),
                alphabet::len()
            );
        }
    }

    /// True once every alphabet letter has a descriptor
    pub fn is_ready(&self) -> bool {
        self.entries.len() >= alphabet::len()
    }

    pub fn get(&self, letter: char) -> Option<&ClipDescriptor> {
        self.entries.get(&letter)
    }

    /// Idle clip handle once its resolution has landed
    pub fn idle_handle(&self) -> Option<&ClipHandle> {
        match &self.idle {
            IdleState::Ready(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn available_count(&self) -> usize {
        self.entries.values().filter(|d| d.is_available()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::cache::ClipCache;
    use crate::resource::resolver::{spawn_warmup, ResolverConfig};
    use crate::resource::source::{ClipData, MemoryClipSource};

    fn library_for(source: MemoryClipSource, idle: Option<&str>) -> ClipLibrary {
        let expects_idle = idle.is_some();
        let rx = spawn_warmup(
            Arc::new(source),
            Arc::new(ClipCache::new(64)),
            ResolverConfig {
                workers: 4,
                unavailable_duration: Duration::from_millis(500),
                idle_clip: idle.map(String::from),
            },
        );
        ClipLibrary::new(rx, expects_idle)
    }

    #[test]
    fn test_ready_after_full_warmup() {
        let mut lib = library_for(MemoryClipSource::uniform(Duration::from_millis(500)), None);
        assert!(!lib.is_ready());
        assert!(lib.wait_ready(Duration::from_secs(5)));
        assert_eq!(lib.available_count(), alphabet::len());
        assert!(lib.idle_handle().is_none());
    }

    #[test]
    fn test_partial_library_still_ready() {
        // Everything missing resolves Unavailable; readiness is about
        // determination, not success
        let mut lib = library_for(MemoryClipSource::new(), None);
        assert!(lib.wait_ready(Duration::from_secs(5)));
        assert_eq!(lib.available_count(), 0);
        let desc = lib.get('а').unwrap();
        assert!(!desc.is_available());
        assert_eq!(desc.duration, Duration::from_millis(500));
    }

    #[test]
    fn test_idle_resolution() {
        let mut source = MemoryClipSource::uniform(Duration::from_millis(500));
        source.insert("idle", ClipData::new(Duration::from_secs(2)));
        let mut lib = library_for(source, Some("idle"));
        assert!(lib.wait_ready(Duration::from_secs(5)));
        // The idle completion may land after the last letter
        let deadline = Instant::now() + Duration::from_secs(5);
        while lib.idle_handle().is_none() && Instant::now() < deadline {
            lib.pump();
            std::thread::sleep(Duration::from_millis(1));
        }
        let idle = lib.idle_handle().expect("idle clip resolved");
        assert_eq!(idle.duration, Duration::from_secs(2));
    }

    #[test]
    fn test_wait_ready_times_out() {
        let source =
            MemoryClipSource::uniform(Duration::from_millis(500)).with_latency(Duration::from_millis(50));
        let mut lib = library_for(source, None);
        assert!(!lib.wait_ready(Duration::from_millis(1)));
    }
}
