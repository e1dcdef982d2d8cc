//! Motion-graph construction: edges, transition synthesis, annotation.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::clip::Clip;
use crate::ident::{ClipId, NodeId};
use crate::pose::Pose;

use super::{CandidatePair, GraphError, MotionGraph, NodeRecord, SMALL_INCREMENT};

impl MotionGraph {
    /// Builds the full graph from clips and transition candidates.
    ///
    /// `candidates` are treated as undirected: each contributes both
    /// directed edges, with the *to*-side frame offset by `window` so a
    /// transition spans a full window rather than an instant cut.
    ///
    /// Returns [`GraphError::NoEntryNode`] when pruning leaves no
    /// start/end node at all, and [`GraphError::DegenerateTransition`]
    /// when an edge would synthesize a frame blending a pose with itself.
    pub fn build(
        clips: Vec<Clip>,
        candidates: &[CandidatePair],
        window: usize,
    ) -> Result<Self, GraphError> {
        let mut graph = Self {
            window,
            clips: clips.into_iter().map(|c| (c.id(), c)).collect(),
            nodes: BTreeMap::new(),
        };

        graph.init_node_table();
        graph.add_transition_edges(candidates);
        graph.add_sequential_edges();
        graph.prune();
        if graph.first_node().is_err() {
            return Err(GraphError::NoEntryNode);
        }
        graph.add_direct_edges();
        graph.synthesize_transitions()?;
        graph.annotate()?;

        info!(
            nodes = graph.nodes.len(),
            candidates = candidates.len(),
            window,
            "motion graph built"
        );
        Ok(graph)
    }

    /// One empty record per (clip, frame) across all clips.
    fn init_node_table(&mut self) {
        for (&clip_id, clip) in &self.clips {
            for frame in 0..clip.len() as u32 {
                self.nodes
                    .insert(NodeId::sequential(clip_id, frame), NodeRecord::default());
            }
        }
    }

    /// Adds both directed edges of every undirected candidate pair.
    fn add_transition_edges(&mut self, candidates: &[CandidatePair]) {
        for &(a, b) in candidates {
            for (from, to) in [(a, b), (b, a)] {
                let from_id = NodeId::sequential(from.0, from.1 as u32);
                if from == to {
                    // A window matched against itself is not a transition.
                    continue;
                }
                // A transition lands a full window past its match point.
                let to_id = NodeId::sequential(to.0, (to.1 + self.window) as u32);

                if !self.nodes.contains_key(&from_id) || !self.nodes.contains_key(&to_id) {
                    warn!(%from_id, %to_id, "candidate window runs past clip end, skipped");
                    continue;
                }

                if let Some(record) = self.nodes.get_mut(&from_id) {
                    record.is_start = true;
                    record.edges.insert(to_id);
                }
                if let Some(record) = self.nodes.get_mut(&to_id) {
                    record.is_end = true;
                }
            }
        }
    }

    /// Connects consecutive marked nodes of each clip and records the
    /// link as the earlier node's sequential edge.
    fn add_sequential_edges(&mut self) {
        let marked: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, r)| r.is_start || r.is_end)
            .map(|(id, _)| *id)
            .collect();

        let mut prev: BTreeMap<ClipId, NodeId> = BTreeMap::new();
        for id in marked {
            if let Some(&prev_id) = prev.get(&id.clip()) {
                if let Some(record) = self.nodes.get_mut(&prev_id) {
                    record.edges.insert(id);
                    record.seq_edge = Some(id);
                }
            }
            prev.insert(id.clip(), id);
        }
    }

    /// Gives every non-terminal node a dense edge to its next frame.
    fn add_direct_edges(&mut self) {
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        for id in ids {
            if self.is_terminal(id) {
                continue;
            }
            let next = id.advanced();
            if self.nodes.contains_key(&next) {
                if let Some(record) = self.nodes.get_mut(&id) {
                    record.direct_edges.insert(next);
                }
            }
        }
    }

    /// Synthesizes the `window - 1` blended frames bridging every
    /// retained non-sequential edge, chained by direct edges.
    fn synthesize_transitions(&mut self) -> Result<(), GraphError> {
        let sources: Vec<(NodeId, Vec<NodeId>)> = self
            .nodes
            .iter()
            .filter(|(_, r)| r.is_start || r.is_end)
            .map(|(id, r)| (*id, r.edges.iter().copied().collect()))
            .collect();

        for (id, edges) in sources {
            let seq_edge = self.nodes.get(&id).and_then(|r| r.seq_edge);
            for next in edges {
                if seq_edge == Some(next) {
                    continue;
                }
                let mut prev = id;
                for step in 1..self.window as u32 {
                    let frame = id.frame() + step;
                    let frame2 = next.frame() + step - self.window as u32;
                    let t_id =
                        NodeId::transition(id.clip(), frame, next.clip(), frame2, step);
                    if id.clip() == next.clip() && frame == frame2 {
                        return Err(GraphError::DegenerateTransition(t_id));
                    }

                    self.nodes.insert(t_id, NodeRecord::default());
                    if let Some(record) = self.nodes.get_mut(&prev) {
                        record.direct_edges.insert(t_id);
                    }
                    prev = t_id;
                }
                if let Some(record) = self.nodes.get_mut(&prev) {
                    record.direct_edges.insert(next);
                }
            }
        }
        Ok(())
    }

    /// Fills in cached poses, arclength, and true position, in table
    /// order (all sequential nodes first, then transitions).
    fn annotate(&mut self) -> Result<(), GraphError> {
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        let mut prev_seq: Option<NodeId> = None;

        for id in ids {
            match id {
                NodeId::Sequential { clip, frame } => {
                    let source = self
                        .clips
                        .get(&clip)
                        .ok_or(GraphError::MissingClip(clip))?;
                    let mut pose = source
                        .pose(frame as usize)
                        .ok_or(GraphError::UnknownNode(id))?
                        .clone();

                    if let Some(prev_id) = prev_seq.filter(|p| p.clip() == clip) {
                        // Express the frame relative to its predecessor and
                        // accumulate planar walk distance plus raw
                        // displacement.
                        let reference = source
                            .root(prev_id.frame() as usize)
                            .ok_or(GraphError::UnknownNode(prev_id))?;
                        pose = pose.normalized_against(&reference);

                        let prev_rec = self.record(prev_id)?;
                        let step = pose.root.translation.planar().length();
                        let arclen = prev_rec.arclen + step.max(SMALL_INCREMENT);
                        let true_pos = prev_rec.true_pos.add(&pose.root.translation);
                        if let Some(record) = self.nodes.get_mut(&id) {
                            record.arclen = arclen;
                            record.true_pos = true_pos;
                        }
                    }

                    if let Some(record) = self.nodes.get_mut(&id) {
                        record.pose = pose;
                    }
                    prev_seq = Some(id);
                }
                NodeId::Transition {
                    clip,
                    frame,
                    clip2,
                    frame2,
                    alpha,
                } => {
                    let pose = self.blend(id)?;
                    let step = pose.root.translation.planar().length();

                    match alpha {
                        0 => return Err(GraphError::InvalidAlpha(id)),
                        1 => {
                            // First blend step: the chain restarts its own
                            // accumulation.
                            if let Some(record) = self.nodes.get_mut(&id) {
                                record.arclen = step.max(SMALL_INCREMENT);
                                record.true_pos = pose.root.translation;
                            }
                        }
                        _ => {
                            let prev_id = NodeId::transition(
                                clip,
                                frame - 1,
                                clip2,
                                frame2 - 1,
                                alpha - 1,
                            );
                            let prev_rec = self.record(prev_id)?;
                            let arclen = prev_rec.arclen + step.max(SMALL_INCREMENT);
                            let true_pos = prev_rec.true_pos.add(&pose.root.translation);
                            if let Some(record) = self.nodes.get_mut(&id) {
                                record.arclen = arclen;
                                record.true_pos = true_pos;
                            }
                        }
                    }

                    if let Some(record) = self.nodes.get_mut(&id) {
                        record.pose = pose;
                    }
                }
            }
        }
        Ok(())
    }

    /// Blended pose for a synthesized transition node.
    ///
    /// The weight eases from the source pose toward the landing pose with
    /// C¹ continuity over the window: `w = 2((k+1)/W)³ − 3((k+1)/W)² + 1`.
    /// Root translation is blended linearly, rotations spherically with
    /// mix ratio `1 − w` toward the landing pose. Joints present on only
    /// one side are skipped.
    fn blend(&self, id: NodeId) -> Result<Pose, GraphError> {
        let NodeId::Transition {
            clip,
            frame,
            clip2,
            frame2,
            alpha,
        } = id
        else {
            return Err(GraphError::InvalidAlpha(id));
        };

        let from = self.record(NodeId::sequential(clip, frame))?.pose.clone();
        let to = self.record(NodeId::sequential(clip2, frame2))?.pose.clone();

        let t = (alpha as f32 + 1.0) / self.window as f32;
        let weight = 2.0 * t.powi(3) - 3.0 * t.powi(2) + 1.0;

        let mut output = Pose::default();
        output.root.translation = from
            .root
            .translation
            .scale(weight)
            .add(&to.root.translation.scale(1.0 - weight));
        output.root.rotation = from.root.rotation.slerp(&to.root.rotation, 1.0 - weight);

        for (joint, &rotation) in &from.joints {
            // Some joints are never rotated by one of the clips; skip
            // rather than blend against a fabricated identity.
            let Some(&other) = to.joints.get(joint) else {
                continue;
            };
            output
                .joints
                .insert(joint.clone(), rotation.slerp(&other, 1.0 - weight));
        }

        Ok(output)
    }
}
