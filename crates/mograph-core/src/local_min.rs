//! Transition-candidate extraction from a distance matrix.

use thiserror::Error;
use tracing::info;

use crate::distance::DistanceMatrix;

/// Error produced when a distance matrix yields no transition candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CandidateError {
    /// No cell passed the local-minimum + threshold filter; the threshold
    /// is probably too aggressive for this clip pair.
    #[error("no transition candidates found; threshold may be too small")]
    NoCandidates,
}

/// Finds the transition candidates of a distance matrix.
///
/// A cell qualifies when it is a strict local minimum — its value is less
/// than every in-bounds cell of its up-to-8 grid neighbours — and either
/// below `threshold` (`None` disables the bound) or exactly zero. Zero
/// cells are always accepted regardless of the minimum test: a
/// zero-distance window pair is a perfect transition no matter what
/// surrounds it.
///
/// Returned indices are scaled back to true frame indices by the matrix's
/// step size.
pub fn transition_candidates(
    matrix: &DistanceMatrix,
    threshold: Option<f32>,
) -> Result<Vec<(usize, usize)>, CandidateError> {
    const NEIGHBOURS: [(isize, isize); 8] = [
        (1, 0),
        (1, 1),
        (0, 1),
        (-1, 1),
        (-1, 0),
        (-1, -1),
        (0, -1),
        (1, -1),
    ];

    let rows = matrix.rows();
    let cols = matrix.cols();
    let step = matrix.step();

    let mut candidates = Vec::new();
    let mut minima = Vec::new();

    for i in 0..rows {
        for j in 0..cols {
            let value = matrix.get(i, j);

            let is_minimum = NEIGHBOURS.iter().all(|&(di, dj)| {
                let ni = i as isize + di;
                let nj = j as isize + dj;
                if ni < 0 || ni >= rows as isize || nj < 0 || nj >= cols as isize {
                    // Matrix-edge cells compare only in-bounds neighbours.
                    return true;
                }
                value < matrix.get(ni as usize, nj as usize)
            });

            let below_threshold = threshold.is_none_or(|t| value <= t);
            if (is_minimum && below_threshold) || value == 0.0 {
                candidates.push((i * step, j * step));
            }
            if is_minimum {
                minima.push(value);
            }
        }
    }

    if candidates.is_empty() {
        return Err(CandidateError::NoCandidates);
    }

    // Percentile diagnostics over the local-minimum values: the operator
    // tunes the threshold against these.
    minima.sort_by(f32::total_cmp);
    for percentile in [0.2, 0.4, 0.6, 0.8, 0.99] {
        let index = ((minima.len() as f32) * percentile).floor() as usize;
        if let Some(value) = minima.get(index) {
            info!(percentile, value, "local-minimum percentile");
        }
    }

    Ok(candidates)
}
