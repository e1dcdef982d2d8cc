use crate::math::EPSILON;

/// Deterministic 3D vector used throughout the engine.
///
/// * Components encode world-space units; `y` is the up axis, so the
///   ground plane the path lives on is spanned by `x`/`z`.
/// * Arithmetic uses `f32` so results round like every other part of the
///   pipeline.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    data: [f32; 3],
}

impl Vec3 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Creates a vector from components.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { data: [x, y, z] }
    }

    /// Returns the components as an array.
    pub fn to_array(self) -> [f32; 3] {
        self.data
    }

    /// The `x` component.
    pub fn x(&self) -> f32 {
        self.data[0]
    }

    /// The `y` component (up axis).
    pub fn y(&self) -> f32 {
        self.data[1]
    }

    /// The `z` component.
    pub fn z(&self) -> f32 {
        self.data[2]
    }

    /// Adds two vectors.
    pub fn add(&self, other: &Self) -> Self {
        Self::new(
            self.x() + other.x(),
            self.y() + other.y(),
            self.z() + other.z(),
        )
    }

    /// Subtracts another vector.
    pub fn sub(&self, other: &Self) -> Self {
        Self::new(
            self.x() - other.x(),
            self.y() - other.y(),
            self.z() - other.z(),
        )
    }

    /// Scales the vector by a scalar.
    pub fn scale(&self, scalar: f32) -> Self {
        Self::new(self.x() * scalar, self.y() * scalar, self.z() * scalar)
    }

    /// Dot product with another vector.
    pub fn dot(&self, other: &Self) -> f32 {
        self.x() * other.x() + self.y() * other.y() + self.z() * other.z()
    }

    /// Vector length (magnitude).
    pub fn length(&self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Squared magnitude of the vector.
    pub fn length_squared(&self) -> f32 {
        self.dot(self)
    }

    /// Euclidean distance to another vector.
    pub fn distance(&self, other: &Self) -> f32 {
        self.sub(other).length()
    }

    /// Copy of this vector projected onto the ground plane (`y` zeroed).
    pub fn planar(&self) -> Self {
        Self::new(self.x(), 0.0, self.z())
    }

    /// Distance between the ground-plane projections of two vectors.
    pub fn planar_distance(&self, other: &Self) -> f32 {
        self.planar().distance(&other.planar())
    }

    /// Normalises the vector, returning the zero vector if length ≤ `EPSILON`.
    ///
    /// `EPSILON` is a degeneracy threshold (not numeric precision): vectors
    /// with length ≤ `EPSILON` are considered degenerate and normalized to
    /// zero so downstream callers can detect them deterministically.
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len <= EPSILON {
            return Self::ZERO;
        }
        self.scale(1.0 / len)
    }

    /// Component-wise linear interpolation toward `other` by `t`.
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        self.add(&other.sub(self).scale(t))
    }
}

/// Converts a 3-element array into a `Vec3` interpreted as `(x, y, z)`.
impl From<[f32; 3]> for Vec3 {
    fn from(data: [f32; 3]) -> Self {
        Self { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planar_zeroes_only_y() {
        let v = Vec3::new(3.0, 7.0, -4.0);
        assert_eq!(v.planar().to_array(), [3.0, 0.0, -4.0]);
    }

    #[test]
    fn planar_distance_ignores_height() {
        let a = Vec3::new(0.0, 10.0, 0.0);
        let b = Vec3::new(3.0, -2.0, 4.0);
        assert!((a.planar_distance(&b) - 5.0).abs() <= EPSILON);
    }

    #[test]
    fn normalize_degenerate_is_zero() {
        assert_eq!(Vec3::new(0.0, 0.0, 0.0).normalize(), Vec3::ZERO);
    }

    #[test]
    fn lerp_endpoints() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(-1.0, 0.0, 5.0);
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
    }
}
