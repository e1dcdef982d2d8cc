//! mograph-core: motion-graph synthesis from captured animation clips.
//!
//! The pipeline turns a set of mocap clips into a navigable graph and a
//! pose stream: a windowed point-cloud distance over every clip pair,
//! local minima of that field as transition candidates, graph
//! construction with blended transition frames and arclength
//! annotation, and a branch-and-bound search that walks the graph along
//! a target ground path.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,
    clippy::redundant_pub_crate
)]

pub mod math;

mod clip;
mod distance;
mod generator;
mod graph;
mod ident;
mod local_min;
mod path;
mod pose;
mod search;
mod skeleton;

// Re-exports for stable public API
pub use clip::Clip;
pub use distance::{distance_matrix, DistanceMatrix};
pub use generator::{GeneratedFrame, MotionGenerator, PathWalker, RandomWalker};
pub use graph::{CandidatePair, GraphError, MotionGraph, NodeRecord, SMALL_INCREMENT};
pub use ident::{ClipId, NodeId};
pub use local_min::{transition_candidates, CandidateError};
pub use path::Pathline;
pub use pose::{Pose, RootTransform};
pub use search::{PathSearch, SearchError, SearchParams, SearchProgress};
pub use skeleton::Skeleton;
