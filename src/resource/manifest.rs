//! Clip manifest parsing
//!
//! A clip resource is a small `key = value` text file describing the
//! resolved metadata of one gesture clip:
//!
//! ```text
//! # fingerspelled "a"
//! duration = 0.62
//! bone.Hand.R = -0.3 0.1 0.0  0.0 0.0 0.0 1.0
//! ```
//!
//! `duration` (seconds, > 0) is mandatory. `bone.<Name>` lines are
//! optional held-pose entries: three position components followed by a
//! quaternion (x y z w). Lines starting with `#` and blank lines are
//! ignored.

use std::collections::HashMap;
use thiserror::Error;

use crate::skeleton::BonePose;

#[derive(Debug, Error, PartialEq)]
pub enum ManifestError {
    #[error("line {0}: missing '=' separator")]
    MissingSeparator(usize),
    #[error("line {0}: empty key")]
    EmptyKey(usize),
    #[error("missing 'duration' entry")]
    MissingDuration,
    #[error("invalid duration '{0}'")]
    InvalidDuration(String),
    #[error("invalid pose for bone '{0}': expected 7 numbers")]
    InvalidPose(String),
}

pub type Result<T> = std::result::Result<T, ManifestError>;

/// Longest accepted clip duration in seconds. Real gesture clips run
/// well under a minute; anything past this is a corrupt file.
pub const MAX_DURATION_SECONDS: f32 = 600.0;

/// Parsed key/value view of one clip file
#[derive(Debug, Default)]
pub struct ClipManifest {
    entries: HashMap<String, String>,
}

impl ClipManifest {
    /// Parse manifest text. Later duplicate keys win.
    pub fn from_str(content: &str) -> Result<Self> {
        let mut entries = HashMap::new();
        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or(ManifestError::MissingSeparator(idx + 1))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ManifestError::EmptyKey(idx + 1));
            }
            entries.insert(key.to_string(), value.trim().to_string());
        }
        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clip duration in seconds; must be present, finite, positive
    /// and no longer than [`MAX_DURATION_SECONDS`]
    pub fn duration_seconds(&self) -> Result<f32> {
        let raw = self.get("duration").ok_or(ManifestError::MissingDuration)?;
        let secs: f32 = raw
            .parse()
            .map_err(|_| ManifestError::InvalidDuration(raw.to_string()))?;
        if !secs.is_finite() || secs <= 0.0 || secs > MAX_DURATION_SECONDS {
            return Err(ManifestError::InvalidDuration(raw.to_string()));
        }
        Ok(secs)
    }

    /// Held-pose entries from `bone.<Name>` keys (possibly empty)
    pub fn poses(&self) -> Result<Vec<BonePose>> {
        let mut poses = Vec::new();
        for (key, value) in &self.entries {
            let Some(bone) = key.strip_prefix("bone.") else {
                continue;
            };
            let nums: Vec<f32> = value
                .split_whitespace()
                .map(str::parse)
                .collect::<std::result::Result<_, _>>()
                .map_err(|_| ManifestError::InvalidPose(bone.to_string()))?;
            if nums.len() != 7 {
                return Err(ManifestError::InvalidPose(bone.to_string()));
            }
            poses.push(BonePose {
                bone: bone.to_string(),
                position: [nums[0], nums[1], nums[2]],
                rotation: [nums[3], nums[4], nums[5], nums[6]],
            });
        }
        // Deterministic order regardless of map iteration
        poses.sort_by(|a, b| a.bone.cmp(&b.bone));
        Ok(poses)
    }
}
