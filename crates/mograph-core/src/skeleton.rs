//! Seam between the graph engine and the skeleton provider.

use crate::math::Vec3;
use crate::pose::Pose;

/// Global joint sampling supplied by the skeleton/clip provider.
///
/// The engine never walks a bone hierarchy itself: the distance metric
/// only needs, for a (possibly normalized) pose, the world-space position
/// of every joint. Implementations traverse whatever hierarchy format
/// they parsed and must return positions in a stable joint order so two
/// samplings of the same skeleton are index-aligned.
pub trait Skeleton {
    /// Names of the skeleton's joints, in sampling order.
    fn joint_names(&self) -> &[String];

    /// World-space position of every joint for `pose`, in
    /// [`Skeleton::joint_names`] order.
    fn joint_positions(&self, pose: &Pose) -> Vec<Vec3>;
}
