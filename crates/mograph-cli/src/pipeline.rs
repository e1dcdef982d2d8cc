//! The offline pipeline: distance matrices (cached), candidate
//! extraction, graph construction, and walks.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use mograph_core::math::Vec3;
use mograph_core::{
    distance_matrix, transition_candidates, CandidateError, CandidatePair, Clip, ClipId,
    DistanceMatrix, MotionGenerator, MotionGraph, PathWalker, Pathline, RandomWalker,
    SearchParams, Skeleton,
};

use crate::model::Dataset;

/// Knobs shared by every subcommand that needs a graph.
#[derive(Debug, Clone)]
pub struct GraphSettings {
    pub window: usize,
    pub step: usize,
    pub threshold: Option<f32>,
    pub cache_dir: Option<PathBuf>,
}

/// One output frame of a walk.
#[derive(Debug, Serialize)]
pub struct FrameOut {
    pub node: String,
    pub position: [f32; 3],
    pub transition: bool,
}

fn cache_path(dir: &Path, a: ClipId, b: ClipId, window: usize, step: usize) -> PathBuf {
    dir.join(format!("{a}_{b}_w{window}_s{step}.dist"))
}

/// Parses a cached matrix: `rows cols` followed by `rows * cols`
/// whitespace-separated floats.
fn load_matrix(path: &Path, window: usize, step: usize) -> Result<DistanceMatrix> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading distance cache {}", path.display()))?;
    let mut tokens = text.split_whitespace();

    let mut dim = || -> Result<usize> {
        tokens
            .next()
            .context("distance cache is missing a dimension")?
            .parse()
            .context("bad dimension in distance cache")
    };
    let rows = dim()?;
    let cols = dim()?;

    let data: Vec<f32> = tokens
        .map(|t| t.parse().context("bad value in distance cache"))
        .collect::<Result<_>>()?;
    DistanceMatrix::from_raw(rows, cols, window, step, data)
        .with_context(|| format!("distance cache {} has wrong cell count", path.display()))
}

fn store_matrix(path: &Path, matrix: &DistanceMatrix) -> Result<()> {
    let mut text = format!("{} {}\n", matrix.rows(), matrix.cols());
    for row in 0..matrix.rows() {
        for col in 0..matrix.cols() {
            text.push_str(&format!("{} ", matrix.get(row, col)));
        }
        text.push('\n');
    }
    fs::write(path, text).with_context(|| format!("writing distance cache {}", path.display()))
}

fn pair_matrix(
    skeleton: &dyn Skeleton,
    a: &Clip,
    b: &Clip,
    settings: &GraphSettings,
) -> Result<DistanceMatrix> {
    if let Some(dir) = &settings.cache_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating cache dir {}", dir.display()))?;
        let path = cache_path(dir, a.id(), b.id(), settings.window, settings.step);
        if path.exists() {
            info!(cache = %path.display(), "reusing cached distance matrix");
            return load_matrix(&path, settings.window, settings.step);
        }
        let matrix = distance_matrix(skeleton, a, b, settings.window, settings.step);
        store_matrix(&path, &matrix)?;
        return Ok(matrix);
    }
    Ok(distance_matrix(skeleton, a, b, settings.window, settings.step))
}

/// Runs the full offline pipeline and returns the finished graph.
pub fn build_graph(dataset: &Dataset, settings: &GraphSettings) -> Result<MotionGraph> {
    let rig = dataset.rig();
    let mut clips = dataset.clips();
    clips.sort_by_key(Clip::id);
    for clip in &clips {
        if clip.len() < settings.window {
            bail!(
                "clip {} is shorter ({} frames) than the window ({})",
                clip.id(),
                clip.len(),
                settings.window
            );
        }
    }

    let mut candidates: Vec<CandidatePair> = Vec::new();
    for (i, a) in clips.iter().enumerate() {
        for b in &clips[i..] {
            let matrix = pair_matrix(&rig, a, b, settings)?;
            match transition_candidates(&matrix, settings.threshold) {
                Ok(found) => {
                    info!(
                        a = %a.id(),
                        b = %b.id(),
                        count = found.len(),
                        "transition candidates"
                    );
                    candidates
                        .extend(found.into_iter().map(|(r, c)| ((a.id(), r), (b.id(), c))));
                }
                Err(CandidateError::NoCandidates) => {
                    warn!(a = %a.id(), b = %b.id(), "clip pair yielded no candidates");
                }
            }
        }
    }

    MotionGraph::build(clips, &candidates, settings.window)
        .context("building the motion graph")
}

/// Loads a path file: a JSON array of `[x, y, z]` ground points.
pub fn load_path(path: &Path, spacing: f32) -> Result<Pathline> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading path {}", path.display()))?;
    let raw: Vec<[f32; 3]> =
        serde_json::from_str(&text).with_context(|| format!("parsing path {}", path.display()))?;
    let points: Vec<Vec3> = raw.into_iter().map(Vec3::from).collect();
    Pathline::resampled(&points, spacing)
        .context("path needs at least two points and a positive spacing")
}

/// Searches the graph along `pathline` and plays the result back once.
pub fn walk(graph: &MotionGraph, pathline: &Pathline, fps: usize) -> Result<Vec<FrameOut>> {
    let mut walker = PathWalker::with_params(graph, SearchParams::for_fps(fps))?;
    let origin = walker.next_frame()?.pose.root.translation;
    walker.set_path(pathline.translated_to(origin))?;
    let path_error = walker.search().map_or(0.0, |s| s.cost());

    let mut frames = Vec::new();
    loop {
        let frame = walker.next_frame()?;
        if frame.completed {
            break;
        }
        frames.push(FrameOut {
            node: frame.node.to_string(),
            position: frame.pose.root.translation.to_array(),
            transition: frame.transition,
        });
    }
    info!(
        frames = frames.len(),
        blended = walker.transition_frames(),
        path_error,
        "walk finished"
    );
    Ok(frames)
}

/// Wanders the graph for `count` frames with a seeded generator.
pub fn random_walk(graph: &MotionGraph, seed: u64, count: usize) -> Result<Vec<FrameOut>> {
    let mut walker = RandomWalker::new(graph, seed)?;
    let mut frames = Vec::with_capacity(count);
    for _ in 0..count {
        let frame = walker.next_frame()?;
        frames.push(FrameOut {
            node: frame.node.to_string(),
            position: frame.pose.root.translation.to_array(),
            transition: frame.transition,
        });
    }
    Ok(frames)
}
