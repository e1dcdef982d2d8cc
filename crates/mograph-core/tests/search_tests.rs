#![allow(missing_docs)]
use mograph_core::math::Vec3;
use mograph_core::{NodeId, PathSearch, Pathline, SearchParams};

mod common;
use common::{single_clip_graph, two_clip_graph};

fn forward_path(points: usize, spacing: f32) -> Pathline {
    let raw: Vec<Vec3> = (0..points)
        .map(|i| Vec3::new(spacing * i as f32, 0.0, 0.0))
        .collect();
    Pathline::new(raw, spacing).unwrap()
}

fn small_params() -> SearchParams {
    SearchParams::for_fps(8)
}

#[test]
fn straight_path_completes() {
    let graph = two_clip_graph();
    let start = graph.first_node().unwrap();
    let world = graph.pose(start).unwrap().root;

    let mut search = PathSearch::new(
        &graph,
        start,
        world,
        forward_path(8, 0.5),
        small_params(),
    )
    .unwrap();

    let committed = search.run().unwrap().to_vec();
    assert!(search.is_complete());
    assert!(!search.is_truncated());
    assert_eq!(committed[0], start);
    // Both clips stride 0.1 per frame, so covering 90% of a 4-unit path
    // takes at least 36 frames.
    assert!(committed.len() >= 36, "only {} frames", committed.len());
}

#[test]
fn lifted_path_completes_like_a_flat_one() {
    // Path input drawn at some height is projected onto the ground, so
    // the walker can actually close the distance to its final point.
    let graph = two_clip_graph();
    let start = graph.first_node().unwrap();
    let world = graph.pose(start).unwrap().root;

    let raw: Vec<Vec3> = (0..8)
        .map(|i| Vec3::new(0.5 * i as f32, 10.0, 0.0))
        .collect();
    let lifted = Pathline::new(raw, 0.5).unwrap();

    let mut search = PathSearch::new(&graph, start, world, lifted, small_params()).unwrap();
    let committed = search.run().unwrap().to_vec();
    assert!(search.is_complete());
    assert!(!search.is_truncated());

    let mut flat =
        PathSearch::new(&graph, start, world, forward_path(8, 0.5), small_params()).unwrap();
    assert_eq!(flat.run().unwrap(), committed.as_slice());
}

#[test]
fn short_straight_path_stays_sequential() {
    // A path short enough to finish inside the clip's long sequential
    // run never needs a blended frame.
    let graph = single_clip_graph();
    let start = graph.first_node().unwrap();
    let world = graph.pose(start).unwrap().root;

    let mut search = PathSearch::new(
        &graph,
        start,
        world,
        forward_path(2, 0.5),
        small_params(),
    )
    .unwrap();

    let committed = search.run().unwrap().to_vec();
    assert!(search.is_complete());
    assert!(committed.iter().all(|id| !id.is_transition()));
}

#[test]
fn committed_nodes_are_playable() {
    // Every committed step must be a direct edge of its predecessor, or
    // the walk cannot be turned into frames.
    let graph = two_clip_graph();
    let start = graph.first_node().unwrap();
    let world = graph.pose(start).unwrap().root;

    let mut search = PathSearch::new(
        &graph,
        start,
        world,
        forward_path(8, 0.5),
        small_params(),
    )
    .unwrap();
    let committed = search.run().unwrap().to_vec();

    for pair in committed.windows(2) {
        let record = graph.node(pair[0]).expect("committed node exists");
        assert!(
            record.direct_edges().contains(&pair[1]),
            "{} does not play into {}",
            pair[0],
            pair[1]
        );
    }
    // The straight path forces the search around the graph's only cycle,
    // which passes through blended transition frames.
    assert!(committed.iter().any(|id| id.is_transition()));
}

#[test]
fn advance_commits_at_most_keep_nodes() {
    let graph = two_clip_graph();
    let start = graph.first_node().unwrap();
    let world = graph.pose(start).unwrap().root;
    let params = small_params();

    let mut search =
        PathSearch::new(&graph, start, world, forward_path(8, 0.5), params).unwrap();

    let mut total = 1usize;
    loop {
        let progress = search.advance().unwrap();
        assert!(progress.appended <= params.keep);
        total += progress.appended;
        assert_eq!(progress.committed, total);
        if progress.complete || progress.truncated {
            break;
        }
        assert!(progress.appended > 0, "no progress and not finished");
    }
    assert_eq!(search.committed().len(), total);
}

#[test]
fn advance_is_idempotent_after_completion() {
    let graph = two_clip_graph();
    let start = graph.first_node().unwrap();
    let world = graph.pose(start).unwrap().root;

    let mut search = PathSearch::new(
        &graph,
        start,
        world,
        forward_path(8, 0.5),
        small_params(),
    )
    .unwrap();
    search.run().unwrap();
    let len = search.committed().len();

    let progress = search.advance().unwrap();
    assert_eq!(progress.appended, 0);
    assert_eq!(search.committed().len(), len);
}

#[test]
fn unreachable_path_trips_the_safety_valve() {
    // Both clips only ever walk +x; a path heading -x can never be
    // completed and must be cut off by the length valve.
    let graph = two_clip_graph();
    let start = graph.first_node().unwrap();
    let world = graph.pose(start).unwrap().root;

    let raw: Vec<Vec3> = (0..8)
        .map(|i| Vec3::new(-0.5 * i as f32, 0.0, 0.0))
        .collect();
    let away = Pathline::new(raw, 0.5).unwrap();

    let mut params = small_params();
    params.max_path_len = Some(40);
    let mut search = PathSearch::new(&graph, start, world, away, params).unwrap();

    search.run().unwrap();
    assert!(search.is_truncated());
    assert!(!search.is_complete());
    assert!(search.committed().len() <= 40 + params.keep + 1);
}

#[test]
fn search_is_deterministic() {
    let graph = two_clip_graph();
    let start = graph.first_node().unwrap();
    let world = graph.pose(start).unwrap().root;

    let run = || -> Vec<NodeId> {
        let mut search = PathSearch::new(
            &graph,
            start,
            world,
            forward_path(8, 0.5),
            small_params(),
        )
        .unwrap();
        search.run().unwrap().to_vec()
    };
    assert_eq!(run(), run());
}
