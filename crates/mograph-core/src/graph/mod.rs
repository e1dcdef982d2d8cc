//! The motion graph: clip frames plus synthesized transitions, pruned to
//! the subgraph a path search can walk safely.
//!
//! Construction order matters and is fixed: node-table init, transition
//! edges, sequential edges, pruning to the largest strongly-connected
//! component, direct-edge densification, transition-frame synthesis, and
//! finally arclength/position annotation. Pruning only deletes edges and
//! flags; pose/arclength data is computed afterwards and never rewritten.

mod build;
mod prune;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use thiserror::Error;

use crate::clip::Clip;
use crate::ident::{ClipId, NodeId};
use crate::pose::{Pose, RootTransform};

/// An undirected transition candidate: two (clip, frame) window starts.
pub type CandidatePair = ((ClipId, usize), (ClipId, usize));

/// Floor applied to per-frame arclength increments.
///
/// Near-zero root motion still counts as this much walked distance, so a
/// character idling in place keeps making (slow) progress along the path.
/// This is a policy knob affecting path-completion timing, not a numeric
/// precision workaround.
pub const SMALL_INCREMENT: f32 = 0.01;

/// Error raised while building or querying a motion graph.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// After pruning no start/end node survived: the graph has no entry
    /// point and cannot be walked.
    #[error("graph has no entry node after pruning")]
    NoEntryNode,
    /// A synthesized transition frame references the same (clip, frame)
    /// on both sides, which means a degenerate edge slipped through.
    #[error("degenerate transition node {0}")]
    DegenerateTransition(NodeId),
    /// A transition node with a blend step of zero; such nodes are never
    /// synthesized and indicate a hand-built id.
    #[error("invalid blend step on transition node {0}")]
    InvalidAlpha(NodeId),
    /// Arclength decreased between two supposedly forward-adjacent nodes;
    /// the graph's annotation invariant is broken.
    #[error("negative arclength delta from {from} to {to}")]
    NegativeArclength {
        /// Node the step departs from.
        from: NodeId,
        /// Node the step arrives at.
        to: NodeId,
    },
    /// A query named a node the graph does not contain.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    /// A frame-delta query was asked about two nodes that are neither
    /// in-clip successors nor transition endpoints.
    #[error("{from} and {to} are not frame-adjacent")]
    NotAdjacent {
        /// Node the step departs from.
        from: NodeId,
        /// Node the step arrives at.
        to: NodeId,
    },
    /// An edge-delta query was asked about a node that is not a start/end
    /// node of the graph.
    #[error("{0} is not a start/end node")]
    NotGraphNode(NodeId),
    /// A node referenced a clip missing from the clip table.
    #[error("clip {0} not loaded")]
    MissingClip(ClipId),
    /// A clip-absolute placement was requested for a synthesized node,
    /// which has no counterpart in any source clip.
    #[error("{0} is not a clip frame")]
    NotSequential(NodeId),
}

/// Everything the graph tracks about one node.
#[derive(Debug, Clone, Default)]
pub struct NodeRecord {
    pub(crate) is_start: bool,
    pub(crate) is_end: bool,
    pub(crate) edges: BTreeSet<NodeId>,
    pub(crate) direct_edges: BTreeSet<NodeId>,
    pub(crate) seq_edge: Option<NodeId>,
    pub(crate) pose: Pose,
    pub(crate) arclen: f32,
    pub(crate) true_pos: crate::math::Vec3,
}

impl NodeRecord {
    /// Whether the node starts a transition.
    pub fn is_start_node(&self) -> bool {
        self.is_start
    }

    /// Whether the node ends a transition.
    pub fn is_end_node(&self) -> bool {
        self.is_end
    }

    /// Graph edges: the coarse next-macro-move candidates used by search.
    pub fn edges(&self) -> &BTreeSet<NodeId> {
        &self.edges
    }

    /// Direct edges: the dense next-frame links used for playback.
    pub fn direct_edges(&self) -> &BTreeSet<NodeId> {
        &self.direct_edges
    }

    /// The in-clip next start/end node, when one survived pruning.
    pub fn seq_edge(&self) -> Option<NodeId> {
        self.seq_edge
    }

    /// The node's cached pose, expressed relative to its predecessor.
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Cumulative walk distance from the start of the containing run.
    pub fn arclen(&self) -> f32 {
        self.arclen
    }

    /// Cumulative root displacement from the start of the containing run.
    pub fn true_pos(&self) -> crate::math::Vec3 {
        self.true_pos
    }
}

/// Directed graph over all clip frames plus synthesized transitions.
///
/// Built once, then read-only. Node and clip tables are ordered maps so
/// every traversal of the graph is deterministic.
#[derive(Debug, Clone)]
pub struct MotionGraph {
    pub(crate) window: usize,
    pub(crate) clips: BTreeMap<ClipId, Clip>,
    pub(crate) nodes: BTreeMap<NodeId, NodeRecord>,
}

impl MotionGraph {
    /// The transition window size the graph was built with.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Looks up a loaded clip.
    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.clips.get(&id)
    }

    /// Number of nodes in the table (sequential plus transition).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Looks up a node record.
    pub fn node(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(&id)
    }

    /// The node record for `id`, or [`GraphError::UnknownNode`].
    pub(crate) fn record(&self, id: NodeId) -> Result<&NodeRecord, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::UnknownNode(id))
    }

    /// Whether `id` is a start/end node (participates in a transition).
    pub fn is_node(&self, id: NodeId) -> bool {
        self.nodes
            .get(&id)
            .is_some_and(|r| r.is_start || r.is_end)
    }

    /// Whether `id` is a start/end node with no surviving sequential edge.
    pub fn is_terminal(&self, id: NodeId) -> bool {
        self.nodes
            .get(&id)
            .is_some_and(|r| (r.is_start || r.is_end) && r.seq_edge.is_none())
    }

    /// The first start/end node in table order; the canonical walk origin.
    pub fn first_node(&self) -> Result<NodeId, GraphError> {
        self.nodes
            .iter()
            .find(|(_, r)| r.is_start || r.is_end)
            .map(|(id, _)| *id)
            .ok_or(GraphError::NoEntryNode)
    }

    /// The cached pose of `id`.
    pub fn pose(&self, id: NodeId) -> Result<&Pose, GraphError> {
        Ok(&self.record(id)?.pose)
    }

    /// The clip-absolute root placement of a sequential node.
    ///
    /// Unlike the cached pose (which is relative to its predecessor) this
    /// reads the original clip, so it carries the true world height.
    pub fn real_root(&self, id: NodeId) -> Result<RootTransform, GraphError> {
        if id.is_transition() {
            return Err(GraphError::NotSequential(id));
        }
        let clip = self
            .clips
            .get(&id.clip())
            .ok_or(GraphError::MissingClip(id.clip()))?;
        clip.root(id.frame() as usize)
            .ok_or(GraphError::UnknownNode(id))
    }

    /// Signed arclength walked when stepping from `curr` to `next`.
    ///
    /// `next` must be the immediate in-clip successor of `curr`, or one of
    /// the two must be a transition node. The delta is guaranteed
    /// non-negative; a negative value means the graph's annotation is
    /// broken and is reported as [`GraphError::NegativeArclength`].
    pub fn dframe_arclength(&self, curr: NodeId, next: NodeId) -> Result<f32, GraphError> {
        let adjacent = curr.clip() == next.clip() && curr.frame() + 1 == next.frame();
        if !(adjacent || curr.is_transition() || next.is_transition()) {
            return Err(GraphError::NotAdjacent {
                from: curr,
                to: next,
            });
        }

        let next_rec = self.record(next)?;
        let arclen = match (curr, next) {
            (NodeId::Sequential { .. }, NodeId::Sequential { .. })
            | (NodeId::Transition { .. }, NodeId::Transition { .. }) => {
                next_rec.arclen - self.record(curr)?.arclen
            }
            (NodeId::Sequential { .. }, NodeId::Transition { .. }) => {
                // First step off the clip: the transition chain restarts
                // its own accumulation.
                next_rec.arclen
            }
            (
                NodeId::Transition { clip2, frame2, .. },
                NodeId::Sequential { .. },
            ) => {
                // Landing back on a clip: progress is measured against the
                // landing frame the final blend step was built from.
                let landing = NodeId::sequential(clip2, frame2);
                next_rec.arclen - self.record(landing)?.arclen
            }
        };

        if arclen < 0.0 {
            return Err(GraphError::NegativeArclength {
                from: curr,
                to: next,
            });
        }
        Ok(arclen)
    }

    /// Arclength walked along the edge from `curr` to `next`.
    ///
    /// Both must be start/end nodes. Along `curr`'s sequential edge this
    /// is the metadata delta; any other edge restarts accumulation, so
    /// the plain accumulated value of `next` is the delta of a fresh walk.
    pub fn dedge_arclength(&self, curr: NodeId, next: NodeId) -> Result<f32, GraphError> {
        let (curr_rec, next_rec) = self.edge_records(curr, next)?;
        let arclen = if curr_rec.seq_edge == Some(next) {
            next_rec.arclen - curr_rec.arclen
        } else {
            next_rec.arclen
        };
        if arclen < 0.0 {
            return Err(GraphError::NegativeArclength {
                from: curr,
                to: next,
            });
        }
        Ok(arclen)
    }

    /// Root displacement along the edge from `curr` to `next`.
    ///
    /// Mirrors [`MotionGraph::dedge_arclength`] but in world units.
    pub fn dedge_position(
        &self,
        curr: NodeId,
        next: NodeId,
    ) -> Result<crate::math::Vec3, GraphError> {
        let (curr_rec, next_rec) = self.edge_records(curr, next)?;
        if curr_rec.seq_edge == Some(next) {
            Ok(next_rec.true_pos.sub(&curr_rec.true_pos))
        } else {
            Ok(next_rec.true_pos)
        }
    }

    fn edge_records(
        &self,
        curr: NodeId,
        next: NodeId,
    ) -> Result<(&NodeRecord, &NodeRecord), GraphError> {
        if !self.is_node(curr) {
            return Err(GraphError::NotGraphNode(curr));
        }
        if !self.is_node(next) {
            return Err(GraphError::NotGraphNode(next));
        }
        Ok((self.record(curr)?, self.record(next)?))
    }

    /// Textual dump of every start/end node and its outgoing graph edges.
    pub fn describe(&self) -> String {
        let mut output = String::new();
        for (id, record) in &self.nodes {
            if !(record.is_start || record.is_end) {
                continue;
            }
            let _ = write!(output, "{id} --> ");
            for edge in &record.edges {
                let _ = write!(output, "{edge} ");
            }
            output.push('\n');
        }
        output
    }
}
