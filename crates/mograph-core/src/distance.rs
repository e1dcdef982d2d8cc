//! Pairwise point-cloud distance between fixed-length clip windows.
//!
//! This is the expensive part of graph construction: every `window`-frame
//! window of one clip is compared against every window of another. The
//! computation is pure, so callers may cache the resulting matrix keyed by
//! (clip pair, window size, step size) and skip recomputation entirely.

use tracing::debug;

use crate::clip::Clip;
use crate::pose::Pose;
use crate::skeleton::Skeleton;

/// Dissimilarity matrix between all windows of two clips.
///
/// Row `i` corresponds to the window starting at frame `i * step` of the
/// first clip, column `j` to the window starting at frame `j * step` of
/// the second. Storage is row-major, which is also the layout of the
/// persisted cache artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    rows: usize,
    cols: usize,
    window: usize,
    step: usize,
    data: Vec<f32>,
}

impl DistanceMatrix {
    /// Builds a matrix from raw row-major data (used by cache loading).
    ///
    /// Returns `None` when `data` does not hold exactly `rows * cols`
    /// values.
    pub fn from_raw(rows: usize, cols: usize, window: usize, step: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == rows * cols).then_some(Self {
            rows,
            cols,
            window,
            step,
            data,
        })
    }

    /// Number of rows (windows of the first clip).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (windows of the second clip).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Window size the matrix was computed with.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Step size the matrix was computed with.
    pub fn step(&self) -> usize {
        self.step
    }

    /// The cell at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        debug_assert!(row < self.rows && col < self.cols);
        self.data[row * self.cols + col]
    }

    /// Row-major view of the cells.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }
}

/// Computes the window dissimilarity matrix between two clips.
///
/// Each window's frames are normalized relative to the window's first
/// frame (root-fixed, yaw-fixed), sampled into a joint point cloud, and
/// compared index-aligned: the dissimilarity is the sum of squared
/// per-point Euclidean distances. Windows are strided by `step` for
/// cheaper coarse scans.
///
/// Clips shorter than `window` produce an empty matrix.
pub fn distance_matrix(
    skeleton: &dyn Skeleton,
    a: &Clip,
    b: &Clip,
    window: usize,
    step: usize,
) -> DistanceMatrix {
    debug_assert!(window > 0 && step > 0);

    let starts = |len: usize| -> Vec<usize> {
        if len < window {
            return Vec::new();
        }
        (0..=len - window).step_by(step).collect()
    };

    let row_starts = starts(a.len());
    let col_starts = starts(b.len());

    let col_clouds: Vec<Vec<f32>> = col_starts
        .iter()
        .map(|&start| window_cloud(skeleton, b, start, window))
        .collect();

    let mut data = Vec::with_capacity(row_starts.len() * col_starts.len());
    for (done, &row_start) in row_starts.iter().enumerate() {
        let row_cloud = window_cloud(skeleton, a, row_start, window);
        for col_cloud in &col_clouds {
            data.push(cloud_distance(&row_cloud, col_cloud));
        }
        debug!(
            clip_a = a.id().0,
            clip_b = b.id().0,
            row = done + 1,
            rows = row_starts.len(),
            "distance scan"
        );
    }

    DistanceMatrix {
        rows: row_starts.len(),
        cols: col_starts.len(),
        window,
        step,
        data,
    }
}

/// Samples the joint point cloud of the `window` frames starting at
/// `start`, each normalized against the window's first frame.
fn window_cloud(skeleton: &dyn Skeleton, clip: &Clip, start: usize, window: usize) -> Vec<f32> {
    let reference = clip
        .root(start)
        .unwrap_or_default();

    let mut cloud = Vec::with_capacity(window * skeleton.joint_names().len() * 3);
    for frame in start..start + window {
        let normalized: Pose = match clip.pose(frame) {
            Some(pose) => pose.normalized_against(&reference),
            None => break,
        };
        for point in skeleton.joint_positions(&normalized) {
            cloud.extend_from_slice(&point.to_array());
        }
    }
    cloud
}

fn cloud_distance(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "point clouds must be index-aligned");
    a.iter()
        .zip(b)
        .map(|(&p, &q)| {
            let d = p - q;
            d * d
        })
        .sum()
}
