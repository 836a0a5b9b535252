//! Clip sources
//!
//! The asset-loading seam of the engine: a [`ClipSource`] resolves an
//! opaque resource id to clip metadata. The engine never interprets
//! asset geometry; a clip resource is just a duration plus an optional
//! held pose. Sources are called concurrently by resolver workers.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use super::manifest::ClipManifest;
use crate::skeleton::BonePose;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("clip resource not found: {0}")]
    NotFound(String),
    #[error("malformed clip resource {0}: {1}")]
    Malformed(String, String),
    #[error("I/O error reading {0}")]
    Io(String, #[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SourceError>;

/// Resolved clip metadata
#[derive(Debug, Clone, Default)]
pub struct ClipData {
    pub duration: Duration,
    pub pose: Vec<BonePose>,
}

impl ClipData {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            pose: Vec::new(),
        }
    }

    pub fn with_pose(mut self, pose: Vec<BonePose>) -> Self {
        self.pose = pose;
        self
    }
}

/// Asset-loading seam; implementations may block at the I/O boundary
pub trait ClipSource: Send + Sync {
    fn fetch(&self, resource_id: &str) -> Result<ClipData>;
}

/// Loads `<resource_id>.clip` manifest files from a base directory
#[derive(Debug)]
pub struct DirectoryClipSource {
    base: PathBuf,
}

impl DirectoryClipSource {
    pub fn new<P: AsRef<Path>>(base: P) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
        }
    }
}

impl ClipSource for DirectoryClipSource {
    fn fetch(&self, resource_id: &str) -> Result<ClipData> {
        // Resource ids are flat names; reject anything path-like
        if resource_id.is_empty()
            || resource_id.contains(['/', '\\'])
            || resource_id.contains("..")
        {
            return Err(SourceError::Malformed(
                resource_id.to_string(),
                "invalid resource id".to_string(),
            ));
        }

        let path = self.base.join(format!("{}.clip", resource_id));
        let content = std::fs::read_to_string(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                SourceError::NotFound(resource_id.to_string())
            } else {
                SourceError::Io(resource_id.to_string(), e)
            }
        })?;

        let manifest = ClipManifest::from_str(&content)
            .map_err(|e| SourceError::Malformed(resource_id.to_string(), e.to_string()))?;
        let secs = manifest
            .duration_seconds()
            .map_err(|e| SourceError::Malformed(resource_id.to_string(), e.to_string()))?;
        let pose = manifest
            .poses()
            .map_err(|e| SourceError::Malformed(resource_id.to_string(), e.to_string()))?;

        Ok(ClipData::new(Duration::from_secs_f32(secs)).with_pose(pose))
    }
}

/// In-memory source for tests and embedding; optionally simulates
/// fetch latency so resolution order can be perturbed.
#[derive(Debug, Default)]
pub struct MemoryClipSource {
    clips: HashMap<String, ClipData>,
    latency: Option<Duration>,
}

impl MemoryClipSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source where every alphabet letter resolves with one duration
    pub fn uniform(duration: Duration) -> Self {
        let mut source = Self::new();
        for letter in crate::alphabet::letters() {
            // Safe: every alphabet letter has a clip name
            if let Some(name) = crate::alphabet::clip_name(letter) {
                source.insert(format!("d_{}", name), ClipData::new(duration));
            }
        }
        source
    }

    pub fn insert(&mut self, resource_id: impl Into<String>, data: ClipData) -> &mut Self {
        self.clips.insert(resource_id.into(), data);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }
}

impl ClipSource for MemoryClipSource {
    fn fetch(&self, resource_id: &str) -> Result<ClipData> {
        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }
        self.clips
            .get(resource_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(resource_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_clip(dir: &Path, name: &str, content: &str) {
        let mut f = std::fs::File::create(dir.join(format!("{}.clip", name))).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_directory_source_fetch() {
        let dir = tempfile::tempdir().unwrap();
        write_clip(dir.path(), "d_a", "duration = 0.62\n");
        let source = DirectoryClipSource::new(dir.path());
        let data = source.fetch("d_a").unwrap();
        assert_eq!(data.duration, Duration::from_secs_f32(0.62));
        assert!(data.pose.is_empty());
    }

    #[test]
    fn test_directory_source_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectoryClipSource::new(dir.path());
        assert!(matches!(
            source.fetch("d_zzz"),
            Err(SourceError::NotFound(_))
        ));
    }

    #[test]
    fn test_directory_source_malformed() {
        let dir = tempfile::tempdir().unwrap();
        write_clip(dir.path(), "d_bad", "duration = nope\n");
        let source = DirectoryClipSource::new(dir.path());
        assert!(matches!(
            source.fetch("d_bad"),
            Err(SourceError::Malformed(..))
        ));
    }

    #[test]
    fn test_directory_source_rejects_absurd_duration() {
        let dir = tempfile::tempdir().unwrap();
        write_clip(dir.path(), "d_a", "duration = 1e30\n");
        let source = DirectoryClipSource::new(dir.path());
        assert!(matches!(
            source.fetch("d_a"),
            Err(SourceError::Malformed(..))
        ));
    }

    #[test]
    fn test_directory_source_rejects_paths() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectoryClipSource::new(dir.path());
        for id in ["../etc/passwd", "a/b", "a\\b", ""] {
            assert!(matches!(source.fetch(id), Err(SourceError::Malformed(..))));
        }
    }

    #[test]
    fn test_memory_source() {
        let mut source = MemoryClipSource::new();
        source.insert("d_a", ClipData::new(Duration::from_millis(500)));
        assert!(source.fetch("d_a").is_ok());
        assert!(matches!(source.fetch("d_b"), Err(SourceError::NotFound(_))));
    }

    #[test]
    fn test_uniform_source_covers_alphabet() {
        let source = MemoryClipSource::uniform(Duration::from_millis(500));
        for letter in crate::alphabet::letters() {
            let id = format!("d_{}", crate::alphabet::clip_name(letter).unwrap());
            assert!(source.fetch(&id).is_ok(), "missing {}", id);
        }
    }
}
