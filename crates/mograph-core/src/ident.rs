//! Identifiers for clips and motion-graph nodes.

use std::fmt;

/// Identifier of a source motion clip.
///
/// Clip ids come from the provider that loaded the clips (for file-backed
/// pipelines this is typically the numeric part of the file name) and key
/// the graph's clip table.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClipId(pub u32);

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a motion-graph node.
///
/// A node is either a raw clip frame (`Sequential`) or a synthesized
/// blended in-between frame bridging two clips (`Transition`).
///
/// The derived total order is the one the node table relies on:
/// transition flag first (sequential sorts before transition), then
/// `clip`, `frame`, `clip2`, `frame2`, `alpha`. Equality compares every
/// field. Both are stable, making `NodeId` usable as a map/set key with
/// deterministic iteration order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeId {
    /// A raw frame of a clip: `(clip, frame index)`.
    Sequential {
        /// Containing clip.
        clip: ClipId,
        /// Frame index within the clip.
        frame: u32,
    },
    /// A synthesized blend frame between two clip windows.
    Transition {
        /// Clip the transition departs from.
        clip: ClipId,
        /// Frame index in the departing clip.
        frame: u32,
        /// Clip the transition lands in.
        clip2: ClipId,
        /// Frame index in the landing clip.
        frame2: u32,
        /// 1-based blend step within the transition window.
        alpha: u32,
    },
}

impl NodeId {
    /// Shorthand for a sequential node id.
    pub const fn sequential(clip: ClipId, frame: u32) -> Self {
        Self::Sequential { clip, frame }
    }

    /// Shorthand for a transition node id.
    pub const fn transition(clip: ClipId, frame: u32, clip2: ClipId, frame2: u32, alpha: u32) -> Self {
        Self::Transition {
            clip,
            frame,
            clip2,
            frame2,
            alpha,
        }
    }

    /// Whether this id names a synthesized transition frame.
    pub const fn is_transition(&self) -> bool {
        matches!(self, Self::Transition { .. })
    }

    /// The primary (departing) clip of the node.
    pub const fn clip(&self) -> ClipId {
        match self {
            Self::Sequential { clip, .. } | Self::Transition { clip, .. } => *clip,
        }
    }

    /// The primary (departing) frame index of the node.
    pub const fn frame(&self) -> u32 {
        match self {
            Self::Sequential { frame, .. } | Self::Transition { frame, .. } => *frame,
        }
    }

    /// The id one step further along the same run.
    ///
    /// For a sequential node this is the next frame of the clip; for a
    /// transition node it advances both source indices and the blend step,
    /// i.e. the next link of the synthesized chain.
    pub fn advanced(&self) -> Self {
        match *self {
            Self::Sequential { clip, frame } => Self::Sequential {
                clip,
                frame: frame + 1,
            },
            Self::Transition {
                clip,
                frame,
                clip2,
                frame2,
                alpha,
            } => Self::Transition {
                clip,
                frame: frame + 1,
                clip2,
                frame2: frame2 + 1,
                alpha: alpha + 1,
            },
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential { clip, frame } => write!(f, "({clip},{frame})"),
            Self::Transition {
                clip,
                frame,
                clip2,
                frame2,
                alpha,
            } => write!(f, "({clip},{frame})({clip2},{frame2}){alpha}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_sorts_before_transition() {
        let seq = NodeId::sequential(ClipId(9), 99);
        let trans = NodeId::transition(ClipId(0), 0, ClipId(0), 5, 1);
        assert!(seq < trans);
    }

    #[test]
    fn order_is_lexicographic_in_field_order() {
        let a = NodeId::sequential(ClipId(1), 10);
        let b = NodeId::sequential(ClipId(1), 11);
        let c = NodeId::sequential(ClipId(2), 0);
        assert!(a < b && b < c);

        let t1 = NodeId::transition(ClipId(1), 10, ClipId(2), 3, 1);
        let t2 = NodeId::transition(ClipId(1), 10, ClipId(2), 3, 2);
        let t3 = NodeId::transition(ClipId(1), 10, ClipId(3), 0, 1);
        assert!(t1 < t2 && t2 < t3);
    }

    #[test]
    fn display_matches_dump_format() {
        let seq = NodeId::sequential(ClipId(1), 20);
        assert_eq!(seq.to_string(), "(1,20)");
        let trans = NodeId::transition(ClipId(1), 21, ClipId(2), 6, 1);
        assert_eq!(trans.to_string(), "(1,21)(2,6)1");
    }
}
