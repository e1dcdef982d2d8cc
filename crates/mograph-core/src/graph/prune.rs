//! Strongly-connected-component pruning.
//!
//! Search correctness requires that any reachable start/end node can
//! reach a path-completion state; an unpruned graph could dead-end in a
//! clip fragment with no exits. Pruning keeps only the largest strongly
//! connected component of the start/end subgraph and strips every edge
//! that leaves it.

use std::collections::BTreeMap;

use tracing::info;

use crate::ident::NodeId;

use super::MotionGraph;

const UNVISITED: usize = usize::MAX;

impl MotionGraph {
    /// Prunes the graph to its largest strongly connected component.
    ///
    /// Only deletes edges and start/end flags: pose and arclength data
    /// are computed after pruning and are never touched here. A node left
    /// with no outgoing graph edges loses its start/end flags entirely.
    pub(crate) fn prune(&mut self) {
        let vertices: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, r)| r.is_start || r.is_end)
            .map(|(id, _)| *id)
            .collect();
        if vertices.is_empty() {
            return;
        }

        let slot_of: BTreeMap<NodeId, usize> = vertices
            .iter()
            .enumerate()
            .map(|(slot, id)| (*id, slot))
            .collect();

        // Adjacency restricted to the start/end subgraph; plain interior
        // frames never participate in connectivity decisions.
        let adjacency: Vec<Vec<usize>> = vertices
            .iter()
            .map(|id| {
                self.nodes[id]
                    .edges
                    .iter()
                    .filter_map(|edge| slot_of.get(edge).copied())
                    .collect()
            })
            .collect();

        let components = tarjan_components(&adjacency);

        // Keep the largest component (earliest wins ties, matching the
        // deterministic vertex order).
        let component_count = components.iter().max().map_or(0, |&c| c + 1);
        let mut sizes = vec![0usize; component_count];
        for &c in &components {
            sizes[c] += 1;
        }
        let largest = sizes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
            .map_or(0, |(c, _)| c);

        let in_largest = |id: &NodeId| -> bool {
            slot_of
                .get(id)
                .is_some_and(|&slot| components[slot] == largest)
        };

        // Remove every edge not internal to the kept component, clearing
        // the sequential edge when it was one of them.
        let mut removed = 0usize;
        for (slot, id) in vertices.iter().enumerate() {
            let keep_source = components[slot] == largest;
            let doomed: Vec<NodeId> = self.nodes[id]
                .edges
                .iter()
                .filter(|edge| !keep_source || !in_largest(edge))
                .copied()
                .collect();
            if doomed.is_empty() {
                continue;
            }
            removed += doomed.len();
            if let Some(record) = self.nodes.get_mut(id) {
                for edge in doomed {
                    record.edges.remove(&edge);
                    if record.seq_edge == Some(edge) {
                        record.seq_edge = None;
                    }
                }
            }
        }

        // A node with no edges left is no longer a start/end node.
        for id in &vertices {
            if let Some(record) = self.nodes.get_mut(id) {
                if record.edges.is_empty() {
                    record.is_start = false;
                    record.is_end = false;
                }
            }
        }

        info!(
            vertices = vertices.len(),
            components = component_count,
            kept = sizes[largest],
            removed_edges = removed,
            "pruned to largest strongly connected component"
        );
    }
}

/// Tarjan's strongly-connected-components algorithm, iterative form.
///
/// Uses an explicit work stack of `(vertex, next-edge)` frames instead of
/// recursion so component discovery is bounded by heap, not call stack,
/// even for graphs of thousands of frames. Returns a component index per
/// vertex.
fn tarjan_components(adjacency: &[Vec<usize>]) -> Vec<usize> {
    let n = adjacency.len();
    let mut index = vec![UNVISITED; n];
    let mut lowlink = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut component = vec![UNVISITED; n];
    let mut next_index = 0usize;
    let mut next_component = 0usize;

    for root in 0..n {
        if index[root] != UNVISITED {
            continue;
        }

        let mut work: Vec<(usize, usize)> = vec![(root, 0)];
        while let Some(&(v, edge)) = work.last() {
            if edge == 0 {
                index[v] = next_index;
                lowlink[v] = next_index;
                next_index += 1;
                stack.push(v);
                on_stack[v] = true;
            }

            if let Some(&w) = adjacency[v].get(edge) {
                if let Some(frame) = work.last_mut() {
                    frame.1 += 1;
                }
                if index[w] == UNVISITED {
                    work.push((w, 0));
                } else if on_stack[w] {
                    lowlink[v] = lowlink[v].min(index[w]);
                }
            } else {
                work.pop();
                if let Some(&(parent, _)) = work.last() {
                    lowlink[parent] = lowlink[parent].min(lowlink[v]);
                }
                if lowlink[v] == index[v] {
                    while let Some(w) = stack.pop() {
                        on_stack[w] = false;
                        component[w] = next_component;
                        if w == v {
                            break;
                        }
                    }
                    next_component += 1;
                }
            }
        }
    }

    component
}
