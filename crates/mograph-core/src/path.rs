//! Target paths: evenly resampled ground-plane polylines.

use crate::math::{clamp, Vec3};

/// A polyline on the ground plane, sampled at a fixed segment length.
///
/// The segment length (`radius`) is the unit the search uses to convert
/// walked arclength into an index along the path, so paths must be
/// resampled — hand-drawn input has wildly uneven point spacing.
///
/// Only the x/z components of the input matter: every stored point has
/// its `y` zeroed, so path costs measure ground-plane distance even when
/// the input was drawn at some height.
#[derive(Debug, Clone, PartialEq)]
pub struct Pathline {
    points: Vec<Vec3>,
    radius: f32,
}

impl Pathline {
    /// Creates a pathline from points already spaced `radius` apart.
    ///
    /// Points are projected onto the ground plane. Returns `None` for
    /// fewer than two points: a path with no extent cannot be followed.
    pub fn new(points: Vec<Vec3>, radius: f32) -> Option<Self> {
        if points.len() < 2 || radius <= 0.0 {
            return None;
        }
        let points = points.iter().map(Vec3::planar).collect();
        Some(Self { points, radius })
    }

    /// Resamples a raw polyline at `segment` spacing and builds a pathline.
    pub fn resampled(raw: &[Vec3], segment: f32) -> Option<Self> {
        if raw.len() < 2 || segment <= 0.0 {
            return None;
        }
        // Project before resampling so the spacing is measured on the
        // ground plane, not along a lifted polyline.
        let flat: Vec<Vec3> = raw.iter().map(Vec3::planar).collect();
        Self::new(resample(&flat, segment), segment)
    }

    /// The sampled points.
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Number of sampled points.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// The fixed spacing between consecutive points.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// The final point of the path.
    pub fn last(&self) -> Vec3 {
        self.points[self.points.len() - 1]
    }

    /// Copy of the path translated so it starts under `origin`.
    ///
    /// Only the ground-plane components of `origin` are used; the path
    /// stays on the ground even when the origin is a root at hip height.
    pub fn translated_to(&self, origin: Vec3) -> Self {
        let shift = origin.planar().sub(&self.points[0]);
        Self {
            points: self.points.iter().map(|p| p.add(&shift)).collect(),
            radius: self.radius,
        }
    }

    /// Where a walker that has covered `arclen` ought to stand.
    ///
    /// Linear interpolation along the polyline at `arclen / radius`,
    /// clamped to the final point once the path is fully covered.
    pub fn target_position(&self, arclen: f32) -> Vec3 {
        let indexf = clamp(arclen / self.radius, 0.0, (self.points.len() - 1) as f32);
        let index = indexf.floor() as usize;
        let remainder = indexf - indexf.floor();

        if index + 1 < self.points.len() {
            self.points[index].lerp(&self.points[index + 1], remainder)
        } else {
            self.last()
        }
    }
}

/// Walks `raw` emitting points exactly `segment` apart.
///
/// The cursor advances along each input segment, splitting long segments
/// and carrying leftover distance across short ones, so the output
/// spacing is uniform regardless of input density.
fn resample(raw: &[Vec3], segment: f32) -> Vec<Vec3> {
    let mut out = vec![raw[0]];
    let mut remaining = segment;
    let mut cursor = raw[0];
    let mut start = raw[0];
    let mut end = raw[1];
    let mut index = 0usize;

    loop {
        if cursor.distance(&end) >= remaining {
            let direction = end.sub(&start).normalize();
            cursor = cursor.add(&direction.scale(remaining));
            out.push(cursor);
            remaining = segment;
        } else {
            remaining -= cursor.distance(&end);
            index += 1;
            if index + 1 >= raw.len() {
                break;
            }
            cursor = raw[index];
            start = raw[index];
            end = raw[index + 1];
        }
    }

    out
}
