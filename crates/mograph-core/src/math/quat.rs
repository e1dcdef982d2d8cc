use crate::math::{Vec3, EPSILON};

/// Quaternion stored as `(x, y, z, w)` with deterministic float32 rounding.
///
/// * All angles are expressed in radians.
/// * Pose joints and root orientations are expected to stay unit length;
///   [`Quat::normalize`] re-establishes that after long blend chains.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quat {
    data: [f32; 4],
}

impl Quat {
    /// Creates a quaternion from components.
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { data: [x, y, z, w] }
    }

    /// Returns the identity quaternion.
    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Returns the quaternion as an array.
    pub fn to_array(self) -> [f32; 4] {
        self.data
    }

    fn component(&self, idx: usize) -> f32 {
        self.data[idx]
    }

    /// Constructs a quaternion from a rotation axis and angle in radians.
    ///
    /// Returns the identity quaternion when the axis length is ≤ `EPSILON`
    /// to avoid undefined orientations.
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let len_sq = axis.length_squared();
        if len_sq <= EPSILON * EPSILON {
            return Self::identity();
        }
        let len = len_sq.sqrt();
        let norm_axis = axis.scale(1.0 / len);
        let half = angle * 0.5;
        let (sin_half, cos_half) = half.sin_cos();
        let scaled = norm_axis.scale(sin_half);
        Self::new(scaled.x(), scaled.y(), scaled.z(), cos_half)
    }

    /// Hamilton product of two quaternions (`self * other`).
    ///
    /// Operand order matters: quaternion multiplication is non-commutative.
    /// When both operands are unit quaternions the result represents the
    /// composed rotation and remains unit length up to floating-point error.
    pub fn multiply(&self, other: &Self) -> Self {
        let ax = self.component(0);
        let ay = self.component(1);
        let az = self.component(2);
        let aw = self.component(3);

        let bx = other.component(0);
        let by = other.component(1);
        let bz = other.component(2);
        let bw = other.component(3);

        Self::new(
            aw * bx + ax * bw + ay * bz - az * by,
            aw * by - ax * bz + ay * bw + az * bx,
            aw * bz + ax * by - ay * bx + az * bw,
            aw * bw - ax * bx - ay * by - az * bz,
        )
    }

    /// Normalises the quaternion; returns identity when norm is ~0.
    pub fn normalize(&self) -> Self {
        let len = self.dot(self).sqrt();
        if len <= EPSILON {
            return Self::identity();
        }
        let inv = 1.0 / len;
        Self::new(
            self.component(0) * inv,
            self.component(1) * inv,
            self.component(2) * inv,
            self.component(3) * inv,
        )
    }

    /// Conjugate of the quaternion; the inverse for unit quaternions.
    pub fn conjugate(&self) -> Self {
        Self::new(
            -self.component(0),
            -self.component(1),
            -self.component(2),
            self.component(3),
        )
    }

    /// Four-component dot product.
    pub fn dot(&self, other: &Self) -> f32 {
        self.component(0) * other.component(0)
            + self.component(1) * other.component(1)
            + self.component(2) * other.component(2)
            + self.component(3) * other.component(3)
    }

    /// Rotates a vector by this quaternion (assumed unit length).
    pub fn rotate(&self, v: &Vec3) -> Vec3 {
        let qv = Vec3::new(self.component(0), self.component(1), self.component(2));
        let w = self.component(3);
        let t = cross(&qv, v).scale(2.0);
        v.add(&t.scale(w)).add(&cross(&qv, &t))
    }

    /// Keeps only the rotation about the vertical axis.
    ///
    /// Zeroes the `x`/`z` vector parts and re-normalises, which projects
    /// the rotation onto pure yaw. Used when a pose is expressed relative
    /// to a reference whose pitch/roll must not leak into the new frame.
    pub fn yaw_component(&self) -> Self {
        Self::new(0.0, self.component(1), 0.0, self.component(3)).normalize()
    }

    /// Spherical interpolation toward `other` by `t` along the shorter arc.
    ///
    /// Falls back to normalised linear interpolation when the quaternions
    /// are nearly parallel, where the spherical formula loses precision.
    pub fn slerp(&self, other: &Self, t: f32) -> Self {
        let mut cos_theta = self.dot(other);
        let mut end = *other;

        if cos_theta < 0.0 {
            cos_theta = -cos_theta;
            end = Self::new(
                -other.component(0),
                -other.component(1),
                -other.component(2),
                -other.component(3),
            );
        }

        if cos_theta > 1.0 - EPSILON {
            return Self::new(
                super::lerp(self.component(0), end.component(0), t),
                super::lerp(self.component(1), end.component(1), t),
                super::lerp(self.component(2), end.component(2), t),
                super::lerp(self.component(3), end.component(3), t),
            )
            .normalize();
        }

        let theta = cos_theta.acos();
        let sin_theta = theta.sin();
        let wa = ((1.0 - t) * theta).sin() / sin_theta;
        let wb = (t * theta).sin() / sin_theta;
        Self::new(
            wa * self.component(0) + wb * end.component(0),
            wa * self.component(1) + wb * end.component(1),
            wa * self.component(2) + wb * end.component(2),
            wa * self.component(3) + wb * end.component(3),
        )
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::identity()
    }
}

fn cross(a: &Vec3, b: &Vec3) -> Vec3 {
    Vec3::new(
        a.y() * b.z() - a.z() * b.y(),
        a.z() * b.x() - a.x() * b.z(),
        a.x() * b.y() - a.y() * b.x(),
    )
}
