//! Clip and Group — the core input units (spec §3).

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Opaque clip identifier, as provided by the caller's inventory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipId(pub String);

impl ClipId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ClipId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ClipId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Opaque group identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A unit of input video. Immutable once registered for a job; durations are
/// authoritative and the core never re-probes the file (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: ClipId,
    pub path: PathBuf,
    /// Duration in seconds. Must be positive and finite.
    pub duration: f64,
    pub original_name: Option<String>,
    pub group_id: Option<GroupId>,
}

impl Clip {
    pub fn new(id: impl Into<ClipId>, path: impl Into<PathBuf>, duration: f64) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            duration,
            original_name: None,
            group_id: None,
        }
    }

    pub fn with_group(mut self, group_id: impl Into<GroupId>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    /// True when the duration is a positive finite number of seconds.
    pub fn has_valid_duration(&self) -> bool {
        self.duration.is_finite() && self.duration > 0.0
    }
}

/// An ordered bucket of clips. Groups are disjoint over clip membership;
/// `order` induces the strict total ordering used by "strict" group mixing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub order: i64,
    pub clips: Vec<Clip>,
}

impl Group {
    pub fn new(id: impl Into<GroupId>, name: impl Into<String>, order: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            order,
            clips: Vec::new(),
        }
    }

    pub fn with_clips(mut self, clips: Vec<Clip>) -> Self {
        self.clips = clips;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_duration_validation() {
        let clip = Clip::new("a", "a.mp4", 10.0);
        assert!(clip.has_valid_duration());

        let bad = Clip::new("b", "b.mp4", 0.0);
        assert!(!bad.has_valid_duration());

        let nan = Clip::new("c", "c.mp4", f64::NAN);
        assert!(!nan.has_valid_duration());
    }

    #[test]
    fn group_orders_clips_disjointly() {
        let g = Group::new("g1", "Intro", 0).with_clips(vec![Clip::new("a", "a.mp4", 5.0)]);
        assert_eq!(g.clips.len(), 1);
        assert!(!g.is_empty());
    }
}
