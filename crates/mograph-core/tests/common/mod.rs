#![allow(dead_code)]

use mograph_core::math::{Quat, Vec3};
use mograph_core::{CandidatePair, Clip, ClipId, MotionGraph, Pose, Skeleton};

const JOINTS: [(&str, [f32; 3]); 4] = [
    ("spine", [0.0, 0.5, 0.0]),
    ("head", [0.0, 0.9, 0.0]),
    ("foot_l", [-0.15, -0.8, 0.0]),
    ("foot_r", [0.15, -0.8, 0.0]),
];

/// Minimal rigid skeleton: four offsets hung off the root, each rotated
/// by its joint before the root transform is applied.
pub struct StickFigure {
    names: Vec<String>,
}

impl StickFigure {
    pub fn new() -> Self {
        Self {
            names: JOINTS.iter().map(|(name, _)| (*name).to_string()).collect(),
        }
    }
}

impl Skeleton for StickFigure {
    fn joint_names(&self) -> &[String] {
        &self.names
    }

    fn joint_positions(&self, pose: &Pose) -> Vec<Vec3> {
        JOINTS
            .iter()
            .map(|(name, offset)| {
                let local = pose.joint(name).rotate(&Vec3::from(*offset));
                pose.root
                    .translation
                    .add(&pose.root.rotation.rotate(&local))
            })
            .collect()
    }
}

/// A clip marching along +x at `stride` per frame, with a small spine
/// swing so consecutive windows are not byte-identical.
pub fn straight_walk(id: u32, frames: usize, stride: f32) -> Clip {
    let poses = (0..frames)
        .map(|i| {
            let mut pose = Pose::default();
            pose.root.translation = Vec3::new(stride * i as f32, 1.0, 0.0);
            let swing = 0.05 * (i as f32 * 0.4).sin();
            pose.joints.insert(
                "spine".to_string(),
                Quat::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), swing),
            );
            pose
        })
        .collect();
    Clip::new(ClipId(id), poses)
}

pub const WINDOW: usize = 4;
pub const STRIDE: f32 = 0.1;

/// One long walk with a single far-ahead candidate, leaving a long run
/// of plain sequential playback inside the cycle (A,6) -> (A,40) -> (A,6).
pub fn single_clip_graph() -> MotionGraph {
    let a = straight_walk(0, 64, STRIDE);
    let candidates: [CandidatePair; 1] = [((ClipId(0), 2), (ClipId(0), 40))];
    MotionGraph::build(vec![a], &candidates, WINDOW).expect("graph builds")
}

/// Two 16-frame walks wired so the marked subgraph has exactly one
/// nontrivial strongly connected component: (A,6) -> (A,8) -> (B,6) -> (A,6).
pub fn two_clip_graph() -> MotionGraph {
    let a = straight_walk(0, 16, STRIDE);
    let b = straight_walk(1, 16, STRIDE);
    let candidates: [CandidatePair; 3] = [
        ((ClipId(0), 2), (ClipId(1), 2)),
        ((ClipId(0), 8), (ClipId(1), 2)),
        ((ClipId(1), 6), (ClipId(0), 2)),
    ];
    MotionGraph::build(vec![a, b], &candidates, WINDOW).expect("graph builds")
}
