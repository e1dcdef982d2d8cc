//! Path-constrained branch-and-bound search over the motion graph.
//!
//! The search is a sliding-window branch and bound: each iteration
//! explores the graph to a fixed lookahead depth from the current
//! frontier, keeps the cheapest complete branch, and commits only its
//! first `keep` nodes before searching again. Optimality is traded for a
//! bounded per-iteration cost.
//!
//! [`PathSearch`] is an explicit, externally-owned session: callers can
//! drive it one iteration at a time via [`PathSearch::advance`] (and stop
//! between iterations), or run it to completion with [`PathSearch::run`].

use thiserror::Error;
use tracing::warn;

use crate::graph::{GraphError, MotionGraph};
use crate::ident::NodeId;
use crate::math::Vec3;
use crate::path::Pathline;
use crate::pose::RootTransform;

/// Tunable constants of the path search.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchParams {
    /// Lookahead budget per iteration, in frames (~2 s of animation).
    pub lookahead: usize,
    /// Nodes committed per iteration before re-searching (~1 s).
    pub keep: usize,
    /// Completion distance to the path's final point, in world units.
    ///
    /// Empirically chosen together with the 90% arclength rule; treat as
    /// policy, not a correctness constant.
    pub margin: f32,
    /// Hard cutoff on total committed nodes; `None` disables the valve.
    pub max_path_len: Option<usize>,
}

impl SearchParams {
    /// Parameters scaled to an animation frame rate.
    pub fn for_fps(fps: usize) -> Self {
        let lookahead = fps * 2;
        Self {
            lookahead,
            keep: lookahead / 2,
            margin: 3.0,
            max_path_len: Some(fps * 60 * 10),
        }
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        Self::for_fps(120)
    }
}

/// Error raised during path search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// A path cost evaluated to NaN; the walk state is corrupt.
    #[error("path cost is NaN")]
    NanCost,
    /// An iteration found no complete branch to commit.
    #[error("search found no complete branch")]
    NoBranch,
    /// A non-branching node had no direct edge to follow.
    #[error("node {0} has no outgoing direct edge")]
    DeadEnd(NodeId),
    /// The graph reported an inconsistency while walking.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Progress report of one [`PathSearch::advance`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchProgress {
    /// Nodes appended by this iteration (at most `keep`).
    pub appended: usize,
    /// Total committed nodes so far.
    pub committed: usize,
    /// Whether the committed path now satisfies the completion predicate.
    pub complete: bool,
    /// Whether the `max_path_len` safety valve fired.
    pub truncated: bool,
}

/// One frame of the search tree.
#[derive(Debug, Clone)]
struct State {
    node: NodeId,
    transform: RootTransform,
    arclen: f32,
    cost: f32,
    depth: usize,
    index: usize,
    next: Vec<NodeId>,
}

/// A resumable path-constrained search over a motion graph.
#[derive(Debug)]
pub struct PathSearch<'g> {
    graph: &'g MotionGraph,
    pathline: Pathline,
    params: SearchParams,
    stack: Vec<State>,
    committed: Vec<NodeId>,
    complete: bool,
    truncated: bool,
}

impl<'g> PathSearch<'g> {
    /// Starts a search session from `start` (with its current world
    /// placement) toward `pathline`.
    pub fn new(
        graph: &'g MotionGraph,
        start: NodeId,
        start_transform: RootTransform,
        pathline: Pathline,
        params: SearchParams,
    ) -> Result<Self, SearchError> {
        let mut session = Self {
            graph,
            pathline,
            params,
            stack: Vec::new(),
            committed: Vec::new(),
            complete: false,
            truncated: false,
        };

        let next = session.sorted_next(start, &start_transform, 0.0)?;
        let state = State {
            node: start,
            transform: start_transform,
            arclen: 0.0,
            cost: 0.0,
            depth: params.lookahead,
            index: 0,
            next,
        };
        session.complete = session.branch_complete(&state);
        session.stack.push(state);
        session.committed.push(start);
        Ok(session)
    }

    /// Nodes accepted so far (the first entry is the start node).
    pub fn committed(&self) -> &[NodeId] {
        &self.committed
    }

    /// Accumulated squared path cost at the frontier.
    pub fn cost(&self) -> f32 {
        self.stack.last().map_or(0.0, |s| s.cost)
    }

    /// Whether the committed path satisfies the completion predicate.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Whether the safety valve cut the search short.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Runs one branch-and-bound iteration and commits at most `keep`
    /// nodes. Idempotent once the search is complete or truncated.
    pub fn advance(&mut self) -> Result<SearchProgress, SearchError> {
        if self.complete || self.truncated {
            return Ok(self.progress(0));
        }
        if let Some(limit) = self.params.max_path_len {
            if self.committed.len() > limit {
                warn!(
                    committed = self.committed.len(),
                    limit, "maximum path length reached, truncating search"
                );
                self.truncated = true;
                return Ok(self.progress(0));
            }
        }

        let (best_stack, best_nodes) = self.iterate()?;

        // Commit the first `keep` nodes of the winning branch; skip index
        // zero, which is the frontier state we started from.
        let mut appended = 0usize;
        for i in 1..=self.params.keep {
            if i >= best_nodes.len() {
                break;
            }
            self.stack.push(best_stack[i].clone());
            self.committed.push(best_nodes[i]);
            appended += 1;
        }

        self.complete = self.stack.last().is_some_and(|s| self.branch_complete(s));
        Ok(self.progress(appended))
    }

    /// Drives [`PathSearch::advance`] until completion or truncation and
    /// returns the committed node sequence.
    pub fn run(&mut self) -> Result<&[NodeId], SearchError> {
        loop {
            let progress = self.advance()?;
            if progress.complete || progress.truncated {
                return Ok(&self.committed);
            }
        }
    }

    fn progress(&self, appended: usize) -> SearchProgress {
        SearchProgress {
            appended,
            committed: self.committed.len(),
            complete: self.complete,
            truncated: self.truncated,
        }
    }

    /// One bounded depth-first branch-and-bound pass from the frontier.
    ///
    /// Returns the cheapest complete branch (stack and node sequence).
    fn iterate(&self) -> Result<(Vec<State>, Vec<NodeId>), SearchError> {
        let last = self.stack.last().ok_or(SearchError::NoBranch)?;

        let mut lower_bound = f32::INFINITY;
        let mut best: Option<(Vec<State>, Vec<NodeId>)> = None;

        let mut curr_stack: Vec<State> = Vec::with_capacity(self.params.lookahead + 1);
        let mut curr_nodes: Vec<NodeId> = Vec::with_capacity(self.params.lookahead + 1);

        // Fresh depth budget, retained candidate ranking.
        curr_stack.push(State {
            node: last.node,
            transform: last.transform,
            arclen: last.arclen,
            cost: last.cost,
            depth: self.params.lookahead,
            index: 0,
            next: last.next.clone(),
        });
        curr_nodes.push(last.node);

        loop {
            let Some(curr) = curr_stack.last() else { break };

            if curr.cost >= lower_bound || curr.index >= curr.next.len() {
                // Bounded out or out of candidates: backtrack.
                curr_stack.pop();
                curr_nodes.pop();
                continue;
            }

            let first_evaluation = curr.index == 0;
            let branch_done = curr.depth == 0 || self.branch_complete(curr);
            if first_evaluation && branch_done {
                if curr.cost < lower_bound {
                    lower_bound = curr.cost;
                    best = Some((curr_stack.clone(), curr_nodes.clone()));
                }
                curr_stack.pop();
                curr_nodes.pop();
                continue;
            }

            let Some(state) = curr_stack.last_mut() else { break };
            let next_id = state.next[state.index];
            state.index += 1;
            let parent = (
                state.node,
                state.transform,
                state.arclen,
                state.cost,
                state.depth,
            );

            let next_state = self.next_state(parent, next_id)?;
            curr_stack.push(next_state);
            curr_nodes.push(next_id);
        }

        best.ok_or(SearchError::NoBranch)
    }

    /// Builds the child state reached by stepping onto `next_id`.
    fn next_state(
        &self,
        (node, transform, arclen, cost, depth): (NodeId, RootTransform, f32, f32, usize),
        next_id: NodeId,
    ) -> Result<State, SearchError> {
        let record = self.graph.record(next_id)?;

        // Chain the node's cached (predecessor-relative) pose onto the
        // accumulated world transform.
        let world = record.pose().root.unnormalized_against(&transform);

        let next_arclen = arclen + self.graph.dframe_arclength(node, next_id)?;
        let step = self.path_cost(&transform.translation, arclen)?;
        let next_cost = cost + step * step;
        if next_cost.is_nan() {
            return Err(SearchError::NanCost);
        }

        let next = self.sorted_next(next_id, &world, next_arclen)?;
        Ok(State {
            node: next_id,
            transform: world,
            arclen: next_arclen,
            cost: next_cost,
            depth: depth.saturating_sub(1),
            index: 0,
            next,
        })
    }

    /// Distance from the walker's position to where the path says a
    /// walker with this much arclength should stand.
    fn path_cost(&self, position: &Vec3, arclen: f32) -> Result<f32, SearchError> {
        let target = self.pathline.target_position(arclen);
        let distance = position.planar().distance(&target);
        if distance.is_nan() {
            return Err(SearchError::NanCost);
        }
        Ok(distance)
    }

    /// The ranked list of concrete next nodes out of `node`.
    ///
    /// At a start/end node the candidates are its graph edges, ranked
    /// ascending by predicted distance to the path after taking the edge;
    /// the sequential edge maps to the plain next frame and every other
    /// edge is rewritten as a 1-step transition request consumed by
    /// direct-edge chaining. Everywhere else the single direct edge is
    /// the only candidate.
    fn sorted_next(
        &self,
        node: NodeId,
        transform: &RootTransform,
        arclen: f32,
    ) -> Result<Vec<NodeId>, SearchError> {
        let record = self.graph.record(node)?;
        let mut edges: Vec<NodeId> = record.edges().iter().copied().collect();

        if edges.is_empty() {
            let next = record
                .direct_edges()
                .iter()
                .next()
                .copied()
                .ok_or(SearchError::DeadEnd(node))?;
            return Ok(vec![next]);
        }

        if edges.len() > 1 {
            let mut scored = Vec::with_capacity(edges.len());
            for edge in edges {
                let d_arclen = self.graph.dedge_arclength(node, edge)?;
                let d_pos = self.graph.dedge_position(node, edge)?;
                let target = self.pathline.target_position(arclen + d_arclen);
                let predicted = transform.translation.add(&d_pos);
                scored.push((predicted.planar().distance(&target), edge));
            }
            scored.sort_by(|a, b| a.0.total_cmp(&b.0));
            edges = scored.into_iter().map(|(_, edge)| edge).collect();
        }

        let window = self.graph.window() as u32;
        Ok(edges
            .into_iter()
            .map(|target| {
                if record.seq_edge() == Some(target) {
                    node.advanced()
                } else {
                    NodeId::transition(
                        node.clip(),
                        node.frame() + 1,
                        target.clip(),
                        target.frame() + 1 - window,
                        1,
                    )
                }
            })
            .collect())
    }

    /// Completion predicate: close to the path's last point *and* most of
    /// the path's length covered.
    ///
    /// Both conditions are required so a path that loops back near its
    /// start cannot be declared complete early. Arclength is measured in
    /// path-point units (`arclen / radius`) so the 90% rule is
    /// independent of the sampling radius.
    fn branch_complete(&self, state: &State) -> bool {
        let close = state
            .transform
            .translation
            .planar()
            .distance(&self.pathline.last())
            < self.params.margin;
        let covered =
            state.arclen / self.pathline.radius() >= 0.9 * self.pathline.point_count() as f32;
        close && covered
    }
}
