//! Concurrent clip warm-up
//!
//! At engine startup every alphabet letter (plus the optional idle
//! clip) is resolved eagerly by a small pool of worker threads. Each
//! resolution soft-fails: a missing or malformed resource yields an
//! `Unavailable` descriptor with a fallback duration instead of an
//! error, so the engine stays usable with a partial library.
//!
//! Completions arrive over a channel in no particular order; the
//! [`super::library::ClipLibrary`] ingests them and derives readiness.

use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};
use log::{debug, warn};

use super::cache::ClipCache;
use super::library::{Availability, ClipDescriptor};
use super::source::ClipSource;
use crate::alphabet;
use crate::mixer::ClipHandle;

/// One finished resolution, letter or idle
pub(crate) enum Completion {
    Letter(ClipDescriptor),
    /// `None` when no idle clip was configured or it failed to resolve
    Idle(Option<ClipHandle>),
}

enum Job {
    Letter(char),
    Idle(String),
}

/// Resolver tuning knobs, a slice of [`crate::config::EngineConfig`]
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Worker threads; caps in-flight resolutions
    pub workers: usize,
    /// Duration recorded on Unavailable descriptors
    pub unavailable_duration: Duration,
    /// Resource id of the idle clip, if any
    pub idle_clip: Option<String>,
}

/// Spawn the warm-up and return the completion channel.
///
/// Workers exit once the job queue drains; nothing needs joining. The
/// receiver yields exactly one `Completion::Letter` per alphabet
/// letter, plus one `Completion::Idle` if an idle clip is configured.
pub(crate) fn spawn_warmup(
    source: Arc<dyn ClipSource>,
    cache: Arc<ClipCache>,
    config: ResolverConfig,
) -> Receiver<Completion> {
    let (job_tx, job_rx) = channel::unbounded::<Job>();
    let (done_tx, done_rx) = channel::unbounded::<Completion>();

    for letter in alphabet::letters() {
        // Seeding an unbounded channel cannot fail while job_rx lives
        let _ = job_tx.send(Job::Letter(letter));
    }
    if let Some(id) = &config.idle_clip {
        let _ = job_tx.send(Job::Idle(id.clone()));
    }
    drop(job_tx);

    let workers = config.workers.max(1);
    for n in 0..workers {
        let jobs = job_rx.clone();
        let done = done_tx.clone();
        let source = Arc::clone(&source);
        let cache = Arc::clone(&cache);
        let config = config.clone();
        let builder = std::thread::Builder::new().name(format!("clip-resolver-{}", n));
        let spawned = builder.spawn(move || {
            while let Ok(job) = jobs.recv() {
                let completion = resolve(&job, source.as_ref(), &cache, &config);
                if done.send(completion).is_err() {
                    break;
                }
            }
        });
        if let Err(e) = spawned {
            // Remaining jobs are picked up by the other workers
            warn!("failed to spawn resolver worker: {}", e);
        }
    }

    done_rx
}

fn resolve(
    job: &Job,
    source: &dyn ClipSource,
    cache: &ClipCache,
    config: &ResolverConfig,
) -> Completion {
    match job {
        Job::Letter(letter) => Completion::Letter(resolve_letter(*letter, source, cache, config)),
        Job::Idle(id) => match cache.get_or_fetch(id, source) {
            Ok(data) => Completion::Idle(Some(ClipHandle::new(
                id.clone(),
                data.duration,
                data.pose.clone(),
            ))),
            Err(e) => {
                warn!("idle clip '{}' unavailable: {}", id, e);
                Completion::Idle(None)
            }
        },
    }
}

fn resolve_letter(
    letter: char,
    source: &dyn ClipSource,
    cache: &ClipCache,
    config: &ResolverConfig,
) -> ClipDescriptor {
    // Every seeded letter is in the alphabet; fall back defensively
    let name = alphabet::clip_name(letter).unwrap_or("none");
    let resource_id = format!("d_{}", name);

    match cache.get_or_fetch(&resource_id, source) {
        Ok(data) => {
            debug!("resolved '{}' ({}): {:?}", letter, resource_id, data.duration);
            ClipDescriptor::available(letter, resource_id, data.duration, data.pose.clone())
        }
        Err(e) => {
            warn!("clip for '{}' ({}) unavailable: {}", letter, resource_id, e);
            ClipDescriptor::unavailable(letter, resource_id, config.unavailable_duration)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::source::{ClipData, DirectoryClipSource, MemoryClipSource};
    use std::io::Write;

    fn collect(rx: Receiver<Completion>) -> (Vec<ClipDescriptor>, Vec<Option<ClipHandle>>) {
        let mut letters = Vec::new();
        let mut idles = Vec::new();
        while let Ok(c) = rx.recv_timeout(Duration::from_secs(5)) {
            match c {
                Completion::Letter(d) => letters.push(d),
                Completion::Idle(h) => idles.push(h),
            }
        }
        (letters, idles)
    }

    #[test]
    fn test_warmup_resolves_full_alphabet() {
        let source = Arc::new(MemoryClipSource::uniform(Duration::from_millis(500)));
        let cache = Arc::new(ClipCache::new(64));
        let rx = spawn_warmup(
            source,
            cache,
            ResolverConfig {
                workers: 4,
                unavailable_duration: Duration::from_millis(500),
                idle_clip: None,
            },
        );
        let (letters, idles) = collect(rx);
        assert_eq!(letters.len(), alphabet::len());
        assert!(idles.is_empty());
        assert!(letters
            .iter()
            .all(|d| d.availability == Availability::Available));
    }

    #[test]
    fn test_warmup_soft_fails_missing_clips() {
        let mut source = MemoryClipSource::new();
        source.insert("d_a", ClipData::new(Duration::from_millis(700)));
        let rx = spawn_warmup(
            Arc::new(source),
            Arc::new(ClipCache::new(64)),
            ResolverConfig {
                workers: 2,
                unavailable_duration: Duration::from_millis(500),
                idle_clip: Some("idle".to_string()),
            },
        );
        let (letters, idles) = collect(rx);
        assert_eq!(letters.len(), alphabet::len());
        let a = letters.iter().find(|d| d.symbol == 'а').unwrap();
        assert_eq!(a.availability, Availability::Available);
        assert_eq!(a.duration, Duration::from_millis(700));
        let b = letters.iter().find(|d| d.symbol == 'б').unwrap();
        assert_eq!(b.availability, Availability::Unavailable);
        assert_eq!(b.duration, Duration::from_millis(500));
        // Idle missing resolves to None, not an error
        assert_eq!(idles.len(), 1);
        assert!(idles[0].is_none());
    }

    #[test]
    fn test_warmup_soft_fails_corrupt_clip_file() {
        // A clip file with a nonsense duration must degrade to
        // Unavailable like a missing one, never stall the warm-up
        let dir = tempfile::tempdir().unwrap();
        let mut f = std::fs::File::create(dir.path().join("d_a.clip")).unwrap();
        f.write_all(b"duration = 1e30\n").unwrap();
        let rx = spawn_warmup(
            Arc::new(DirectoryClipSource::new(dir.path())),
            Arc::new(ClipCache::new(64)),
            ResolverConfig {
                workers: 4,
                unavailable_duration: Duration::from_millis(500),
                idle_clip: None,
            },
        );
        let (letters, _) = collect(rx);
        assert_eq!(letters.len(), alphabet::len());
        let a = letters.iter().find(|d| d.symbol == 'а').unwrap();
        assert_eq!(a.availability, Availability::Unavailable);
    }
}
