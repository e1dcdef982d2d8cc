//! Source motion clips: dense ordered pose sequences.

use crate::ident::ClipId;
use crate::pose::{Pose, RootTransform};

/// One source motion sequence.
///
/// Clips are loaded by an external provider (file parsing is not this
/// crate's concern) and consumed read-only by the distance metric and the
/// graph builder.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Clip {
    id: ClipId,
    frames: Vec<Pose>,
}

impl Clip {
    /// Creates a clip from its id and frame sequence.
    pub fn new(id: ClipId, frames: Vec<Pose>) -> Self {
        Self { id, frames }
    }

    /// The clip's identifier.
    pub fn id(&self) -> ClipId {
        self.id
    }

    /// Number of frames in the clip.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the clip has no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The pose at `frame`, when in range.
    pub fn pose(&self, frame: usize) -> Option<&Pose> {
        self.frames.get(frame)
    }

    /// The root placement at `frame`, when in range.
    pub fn root(&self, frame: usize) -> Option<RootTransform> {
        self.frames.get(frame).map(|p| p.root)
    }
}
