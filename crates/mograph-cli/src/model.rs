//! On-disk dataset format: a rigid skeleton plus a set of clips, as JSON.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::Deserialize;

use mograph_core::math::{Quat, Vec3};
use mograph_core::{Clip, ClipId, Pose, Skeleton};

/// Root of a dataset file.
#[derive(Debug, Deserialize)]
pub struct Dataset {
    pub skeleton: SkeletonSpec,
    pub clips: Vec<ClipSpec>,
}

#[derive(Debug, Deserialize)]
pub struct SkeletonSpec {
    pub joints: Vec<JointSpec>,
}

/// One joint: a named rigid offset hung off the root.
#[derive(Debug, Deserialize)]
pub struct JointSpec {
    pub name: String,
    pub offset: [f32; 3],
}

#[derive(Debug, Deserialize)]
pub struct ClipSpec {
    pub id: u32,
    pub frames: Vec<FrameSpec>,
}

/// One captured frame: root placement plus per-joint rotations `(x, y, z, w)`.
#[derive(Debug, Deserialize)]
pub struct FrameSpec {
    pub translation: [f32; 3],
    pub rotation: [f32; 4],
    #[serde(default)]
    pub joints: BTreeMap<String, [f32; 4]>,
}

impl Dataset {
    /// Loads and validates a dataset file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading dataset {}", path.display()))?;
        let dataset: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing dataset {}", path.display()))?;

        ensure!(
            !dataset.skeleton.joints.is_empty(),
            "dataset has no skeleton joints"
        );
        ensure!(!dataset.clips.is_empty(), "dataset has no clips");
        for clip in &dataset.clips {
            ensure!(
                !clip.frames.is_empty(),
                "clip {} has no frames",
                clip.id
            );
        }
        let mut ids: Vec<u32> = dataset.clips.iter().map(|c| c.id).collect();
        ids.sort_unstable();
        ids.dedup();
        ensure!(
            ids.len() == dataset.clips.len(),
            "dataset contains duplicate clip ids"
        );
        Ok(dataset)
    }

    /// The skeleton the dataset's clips animate.
    pub fn rig(&self) -> Rig {
        Rig {
            names: self
                .skeleton
                .joints
                .iter()
                .map(|j| j.name.clone())
                .collect(),
            offsets: self
                .skeleton
                .joints
                .iter()
                .map(|j| Vec3::from(j.offset))
                .collect(),
        }
    }

    /// Converts the raw clip records into engine clips.
    pub fn clips(&self) -> Vec<Clip> {
        self.clips
            .iter()
            .map(|spec| {
                let frames = spec
                    .frames
                    .iter()
                    .map(|frame| {
                        let mut pose = Pose::default();
                        pose.root.translation = Vec3::from(frame.translation);
                        let [x, y, z, w] = frame.rotation;
                        pose.root.rotation = Quat::new(x, y, z, w).normalize();
                        for (name, &[jx, jy, jz, jw]) in &frame.joints {
                            pose.joints
                                .insert(name.clone(), Quat::new(jx, jy, jz, jw).normalize());
                        }
                        pose
                    })
                    .collect();
                Clip::new(ClipId(spec.id), frames)
            })
            .collect()
    }
}

/// Skeleton driven by a dataset: per-joint rigid offsets rotated by the
/// joint, then placed by the root.
#[derive(Debug)]
pub struct Rig {
    names: Vec<String>,
    offsets: Vec<Vec3>,
}

impl Skeleton for Rig {
    fn joint_names(&self) -> &[String] {
        &self.names
    }

    fn joint_positions(&self, pose: &Pose) -> Vec<Vec3> {
        self.names
            .iter()
            .zip(&self.offsets)
            .map(|(name, offset)| {
                let local = pose.joint(name).rotate(offset);
                pose.root
                    .translation
                    .add(&pose.root.rotation.rotate(&local))
            })
            .collect()
    }
}
