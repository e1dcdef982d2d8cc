//! Motion generators: strategies for walking the graph frame by frame.
//!
//! Each generator owns its full playback state (current node, chained
//! world transform, committed path), so independent walks over the same
//! graph can run side by side. All strategies share one contract:
//! `reset`, `set_path`, `next_frame`.

use tracing::info;

use crate::graph::{GraphError, MotionGraph};
use crate::ident::NodeId;
use crate::math::{Prng, Vec3};
use crate::path::Pathline;
use crate::pose::{Pose, RootTransform};
use crate::search::{PathSearch, SearchError, SearchParams};

/// One frame of synthesized motion, in world space.
#[derive(Debug, Clone)]
pub struct GeneratedFrame {
    /// The node this frame came from.
    pub node: NodeId,
    /// The pose, un-normalized into world space.
    pub pose: Pose,
    /// Whether the walk just wrapped around its accepted sequence.
    pub completed: bool,
    /// Whether the frame is a synthesized transition frame.
    pub transition: bool,
}

/// A strategy for producing a continuous stream of poses from the graph.
pub trait MotionGenerator {
    /// Returns the walk to the graph's first node, dropping any path.
    fn reset(&mut self) -> Result<(), SearchError>;

    /// Sets the target path the generator should follow.
    ///
    /// Strategies that ignore paths accept and discard it.
    fn set_path(&mut self, pathline: Pathline) -> Result<(), SearchError>;

    /// Produces the next world-space frame of the walk.
    fn next_frame(&mut self) -> Result<GeneratedFrame, SearchError>;
}

/// Rest position of a graph walk: its first node, with the cached pose's
/// planar placement but the clip's true height.
fn rest_state(graph: &MotionGraph) -> Result<(NodeId, RootTransform), GraphError> {
    let node = graph.first_node()?;
    let pose = graph.pose(node)?;
    let real = graph.real_root(node)?;
    let translation = Vec3::new(
        pose.root.translation.x(),
        real.translation.y(),
        pose.root.translation.z(),
    );
    Ok((node, RootTransform::new(translation, pose.root.rotation)))
}

/// Path-following generator backed by the branch-and-bound search.
#[derive(Debug)]
pub struct PathWalker<'g> {
    graph: &'g MotionGraph,
    params: SearchParams,
    session: Option<PathSearch<'g>>,
    cursor: usize,
    node: NodeId,
    world: RootTransform,
    transition_frames: usize,
}

impl<'g> PathWalker<'g> {
    /// Creates a walker at the graph's first node with default search
    /// parameters.
    pub fn new(graph: &'g MotionGraph) -> Result<Self, GraphError> {
        Self::with_params(graph, SearchParams::default())
    }

    /// Creates a walker with explicit search parameters.
    pub fn with_params(graph: &'g MotionGraph, params: SearchParams) -> Result<Self, GraphError> {
        let (node, world) = rest_state(graph)?;
        Ok(Self {
            graph,
            params,
            session: None,
            cursor: 0,
            node,
            world,
            transition_frames: 0,
        })
    }

    /// The search session, for callers driving it incrementally.
    pub fn search(&mut self) -> Option<&mut PathSearch<'g>> {
        self.session.as_mut()
    }

    /// Synthesized transition frames played since the last reset.
    pub fn transition_frames(&self) -> usize {
        self.transition_frames
    }
}

impl MotionGenerator for PathWalker<'_> {
    fn reset(&mut self) -> Result<(), SearchError> {
        let (node, world) = rest_state(self.graph)?;
        self.node = node;
        self.world = world;
        self.session = None;
        self.cursor = 0;
        self.transition_frames = 0;
        Ok(())
    }

    /// Searches the graph for a node sequence tracking `pathline`.
    ///
    /// Runs the session to completion before returning; callers that need
    /// to interleave other work can instead create the session, poll
    /// [`PathWalker::search`], and call [`PathSearch::advance`] themselves.
    fn set_path(&mut self, pathline: Pathline) -> Result<(), SearchError> {
        let mut session =
            PathSearch::new(self.graph, self.node, self.world, pathline, self.params)?;
        let committed = session.run()?;
        info!(
            frames = committed.len(),
            cost = session.cost(),
            truncated = session.is_truncated(),
            "path search finished"
        );
        self.cursor = 0;
        self.session = Some(session);
        Ok(())
    }

    fn next_frame(&mut self) -> Result<GeneratedFrame, SearchError> {
        let Some(session) = &self.session else {
            // No path set: hold the current frame.
            let pose = self.graph.pose(self.node)?.clone();
            return Ok(GeneratedFrame {
                node: self.node,
                pose,
                completed: false,
                transition: false,
            });
        };

        let mut completed = false;
        if self.cursor >= session.committed().len() {
            // Sequence exhausted: loop back to the graph's first node.
            let (node, world) = rest_state(self.graph)?;
            self.node = node;
            self.world = world;
            self.cursor = 0;
            completed = true;
            info!(
                transition_frames = self.transition_frames,
                "accepted path exhausted, looping"
            );
        }

        let node = self.session.as_ref().map_or(self.node, |s| {
            s.committed()[self.cursor]
        });
        let pose = self.graph.pose(node)?.unnormalized_against(&self.world);
        self.world = pose.root;
        self.node = node;
        self.cursor += 1;

        let transition = node.is_transition();
        if transition {
            self.transition_frames += 1;
        }

        Ok(GeneratedFrame {
            node,
            pose,
            completed,
            transition,
        })
    }
}

/// Generator that wanders the graph by picking random direct edges.
#[derive(Debug)]
pub struct RandomWalker<'g> {
    graph: &'g MotionGraph,
    rng: Prng,
    node: NodeId,
    world: RootTransform,
}

impl<'g> RandomWalker<'g> {
    /// Creates a seeded random walker at the graph's first node.
    pub fn new(graph: &'g MotionGraph, seed: u64) -> Result<Self, GraphError> {
        let (node, world) = rest_state(graph)?;
        Ok(Self {
            graph,
            rng: Prng::from_seed(seed),
            node,
            world,
        })
    }
}

impl MotionGenerator for RandomWalker<'_> {
    fn reset(&mut self) -> Result<(), SearchError> {
        let (node, world) = rest_state(self.graph)?;
        self.node = node;
        self.world = world;
        Ok(())
    }

    fn set_path(&mut self, _pathline: Pathline) -> Result<(), SearchError> {
        // Random walks ignore paths.
        Ok(())
    }

    fn next_frame(&mut self) -> Result<GeneratedFrame, SearchError> {
        let record = self
            .graph
            .node(self.node)
            .ok_or(GraphError::UnknownNode(self.node))?;
        let choices: Vec<NodeId> = record.direct_edges().iter().copied().collect();
        let next = *choices
            .get(self.rng.next_index(choices.len().max(1)))
            .ok_or(SearchError::DeadEnd(self.node))?;

        let pose = self.graph.pose(next)?.unnormalized_against(&self.world);
        self.world = pose.root;
        self.node = next;

        Ok(GeneratedFrame {
            node: next,
            pose,
            transition: next.is_transition(),
            completed: false,
        })
    }
}
