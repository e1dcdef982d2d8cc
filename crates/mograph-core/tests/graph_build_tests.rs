#![allow(missing_docs)]
use mograph_core::{ClipId, GraphError, MotionGraph, NodeId, SMALL_INCREMENT};

mod common;
use common::{straight_walk, two_clip_graph, STRIDE, WINDOW};

const A: ClipId = ClipId(0);
const B: ClipId = ClipId(1);

#[test]
fn build_without_candidates_has_no_entry() {
    let clip = straight_walk(0, 16, STRIDE);
    let result = MotionGraph::build(vec![clip], &[], WINDOW);
    assert!(matches!(result, Err(GraphError::NoEntryNode)));
}

#[test]
fn prune_keeps_only_the_cycle() {
    let graph = two_clip_graph();

    // (A,6) -> (A,8) -> (B,6) -> (A,6) survives.
    for (id, expected_edge) in [
        (NodeId::sequential(A, 6), NodeId::sequential(A, 8)),
        (NodeId::sequential(A, 8), NodeId::sequential(B, 6)),
        (NodeId::sequential(B, 6), NodeId::sequential(A, 6)),
    ] {
        let record = graph.node(id).unwrap();
        assert!(record.is_start_node() || record.is_end_node());
        let edges: Vec<NodeId> = record.edges().iter().copied().collect();
        assert_eq!(edges, vec![expected_edge], "edges out of {id}");
    }

    // Marked nodes outside the component are demoted to plain frames.
    for id in [
        NodeId::sequential(A, 2),
        NodeId::sequential(A, 12),
        NodeId::sequential(B, 2),
        NodeId::sequential(B, 10),
    ] {
        let record = graph.node(id).unwrap();
        assert!(!record.is_start_node() && !record.is_end_node(), "{id}");
        assert!(record.edges().is_empty(), "{id}");
    }
}

#[test]
fn first_node_is_the_smallest_marked_node() {
    let graph = two_clip_graph();
    assert_eq!(graph.first_node().unwrap(), NodeId::sequential(A, 6));
}

#[test]
fn transitions_are_synthesized_per_retained_edge() {
    let graph = two_clip_graph();

    // window - 1 blended frames per non-sequential edge, two such edges.
    assert_eq!(graph.node_count(), 32 + 2 * (WINDOW - 1));

    // The (A,8) -> (B,6) bridge: (A,9|B,3)@1 .. (A,11|B,5)@3, chained by
    // direct edges and closed onto the landing frame.
    let mut prev = NodeId::sequential(A, 8);
    for alpha in 1..WINDOW as u32 {
        let t = NodeId::transition(A, 8 + alpha, B, 2 + alpha, alpha);
        assert!(graph.is_node(t), "missing {t}");
        assert!(graph.node(prev).unwrap().direct_edges().contains(&t));
        prev = t;
    }
    assert!(graph
        .node(prev)
        .unwrap()
        .direct_edges()
        .contains(&NodeId::sequential(B, 6)));
}

#[test]
fn sequential_arclength_is_monotonic() {
    let graph = two_clip_graph();
    let mut last = -1.0f32;
    for frame in 0..16 {
        let arclen = graph.node(NodeId::sequential(A, frame)).unwrap().arclen();
        assert!(arclen > last, "frame {frame}: {arclen} <= {last}");
        // Every frame advances by at least the degenerate-pose floor.
        if frame > 0 {
            assert!(arclen - last >= SMALL_INCREMENT - 1e-6);
        }
        last = arclen;
    }
}

#[test]
fn sequential_poses_are_predecessor_relative() {
    let graph = two_clip_graph();
    // A straight walk reduced to frame-over-frame deltas: one stride
    // forward per frame, regardless of absolute clip position.
    for frame in 1..16 {
        let pose = graph.pose(NodeId::sequential(A, frame)).unwrap();
        assert!((pose.root.translation.x() - STRIDE).abs() <= 1e-4);
        assert!(pose.root.translation.z().abs() <= 1e-4);
    }
}

#[test]
fn transition_pose_blends_the_stride() {
    let graph = two_clip_graph();
    // Both clips stride identically, so every blend of their deltas must
    // also stride forward by the same amount.
    for alpha in 1..WINDOW as u32 {
        let t = NodeId::transition(A, 8 + alpha, B, 2 + alpha, alpha);
        let pose = graph.pose(t).unwrap();
        assert!((pose.root.translation.x() - STRIDE).abs() <= 1e-4);
    }
}

#[test]
fn frame_arclength_matches_the_stride() {
    let graph = two_clip_graph();
    let d = graph
        .dframe_arclength(NodeId::sequential(A, 6), NodeId::sequential(A, 7))
        .unwrap();
    assert!((d - STRIDE).abs() <= 1e-4);

    // Stepping onto and off a transition chain keeps the same pace.
    let onto = graph
        .dframe_arclength(
            NodeId::sequential(A, 8),
            NodeId::transition(A, 9, B, 3, 1),
        )
        .unwrap();
    assert!((onto - STRIDE).abs() <= 1e-4);

    let off = graph
        .dframe_arclength(
            NodeId::transition(A, 11, B, 5, 3),
            NodeId::sequential(B, 6),
        )
        .unwrap();
    assert!((off - STRIDE).abs() <= 1e-4);
}

#[test]
fn frame_arclength_rejects_non_adjacent_frames() {
    let graph = two_clip_graph();
    let a6 = NodeId::sequential(A, 6);
    let a9 = NodeId::sequential(A, 9);
    assert_eq!(
        graph.dframe_arclength(a6, a9),
        Err(GraphError::NotAdjacent { from: a6, to: a9 })
    );
}

#[test]
fn edge_queries_reject_unmarked_nodes() {
    let graph = two_clip_graph();
    let a5 = NodeId::sequential(A, 5);
    let a6 = NodeId::sequential(A, 6);
    let a7 = NodeId::sequential(A, 7);

    // Plain frames never carry edge metadata, whichever side they are on.
    assert_eq!(
        graph.dedge_arclength(a5, a6),
        Err(GraphError::NotGraphNode(a5))
    );
    assert_eq!(
        graph.dedge_position(a6, a7),
        Err(GraphError::NotGraphNode(a7))
    );

    // Two surviving start/end nodes answer normally.
    assert!(graph.dedge_arclength(a6, NodeId::sequential(A, 8)).is_ok());
}

#[test]
fn backwards_transition_steps_report_negative_arclength() {
    let graph = two_clip_graph();
    // Walking a transition chain against its direct edges reverses the
    // accumulation, which the annotation invariant forbids.
    let early = NodeId::transition(A, 10, B, 4, 2);
    let late = NodeId::transition(A, 11, B, 5, 3);
    assert!(graph.dframe_arclength(early, late).is_ok());
    assert_eq!(
        graph.dframe_arclength(late, early),
        Err(GraphError::NegativeArclength {
            from: late,
            to: early
        })
    );
}

#[test]
fn real_root_rejects_transition_nodes() {
    let graph = two_clip_graph();
    let t = NodeId::transition(A, 9, B, 3, 1);
    assert!(matches!(
        graph.real_root(t),
        Err(GraphError::NotSequential(_))
    ));
}

#[test]
fn terminal_nodes_leave_through_transitions_only() {
    let graph = two_clip_graph();

    // (B,6) lost its sequential edge to pruning: playback can only leave
    // it through its synthesized transition chain.
    let b6 = NodeId::sequential(B, 6);
    assert!(graph.is_terminal(b6));
    let edges: Vec<NodeId> = graph.node(b6).unwrap().direct_edges().iter().copied().collect();
    assert_eq!(edges, vec![NodeId::transition(B, 7, A, 3, 1)]);

    // (A,6) kept its sequential edge and plays straight through.
    let a6 = NodeId::sequential(A, 6);
    assert!(!graph.is_terminal(a6));
    assert!(graph
        .node(a6)
        .unwrap()
        .direct_edges()
        .contains(&NodeId::sequential(A, 7)));

    // A clip's final frame simply has no successor.
    let last = NodeId::sequential(A, 15);
    assert!(graph.node(last).unwrap().direct_edges().is_empty());
}
