//! Per-frame skeleton pose representation and rigid-transform
//! normalization.
//!
//! A pose can be expressed either in its clip's absolute coordinate frame
//! or relative to an arbitrary reference position + yaw. Normalization and
//! un-normalization are exact algebraic inverses (up to float tolerance),
//! which is what lets the graph splice a clip frame into the frame of
//! reference of whatever precedes it and later convert the cached pose
//! back into world space during playback.

use std::collections::BTreeMap;

use crate::math::{Quat, Vec3};

/// Rigid placement of a skeleton root: translation plus orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RootTransform {
    /// World-space position of the root.
    pub translation: Vec3,
    /// World-space orientation of the root.
    pub rotation: Quat,
}

impl RootTransform {
    /// Creates a root transform from components.
    pub const fn new(translation: Vec3, rotation: Quat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Expresses this transform relative to `reference`.
    ///
    /// Only the yaw of the reference orientation participates: pitch and
    /// roll are stripped (and the quaternion re-normalised) so a tilted
    /// reference frame cannot tip the normalized pose off the ground
    /// plane.
    pub fn normalized_against(&self, reference: &Self) -> Self {
        let inv_yaw = reference.rotation.yaw_component().conjugate();
        Self {
            translation: inv_yaw.rotate(&self.translation.sub(&reference.translation)),
            rotation: inv_yaw.multiply(&self.rotation),
        }
    }

    /// Exact inverse of [`RootTransform::normalized_against`].
    pub fn unnormalized_against(&self, reference: &Self) -> Self {
        let yaw = reference.rotation.yaw_component();
        Self {
            translation: yaw.rotate(&self.translation).add(&reference.translation),
            rotation: yaw.multiply(&self.rotation),
        }
    }
}

/// One frame of a motion clip.
///
/// Joint orientations are local rotations keyed by joint name; a joint
/// present in the skeleton but absent from the map is treated as the
/// identity rotation. Poses are value types — copied, never aliased —
/// because normalization mutates a private copy.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    /// Root placement of the frame.
    pub root: RootTransform,
    /// Local joint orientations keyed by joint name.
    pub joints: BTreeMap<String, Quat>,
}

impl Pose {
    /// Local orientation of `joint`, identity when the clip never rotates it.
    pub fn joint(&self, joint: &str) -> Quat {
        self.joints.get(joint).copied().unwrap_or_default()
    }

    /// Copy of this pose expressed relative to `reference`.
    pub fn normalized_against(&self, reference: &RootTransform) -> Self {
        Self {
            root: self.root.normalized_against(reference),
            joints: self.joints.clone(),
        }
    }

    /// Copy of this pose re-expressed in the space `reference` lives in.
    pub fn unnormalized_against(&self, reference: &RootTransform) -> Self {
        Self {
            root: self.root.unnormalized_against(reference),
            joints: self.joints.clone(),
        }
    }
}
