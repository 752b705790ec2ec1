//! Per-frame local bone transforms supplied by an animation driver

use glam::Mat4;

use crate::error::{MdMeshError, Result};
use crate::skeleton::SkeletonModel;

/// Local transform of every bone relative to its parent, by bone index
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    locals: Vec<Mat4>,
}

impl AnimationState {
    /// Create a state with every bone at identity
    pub fn new(bone_count: usize) -> Self {
        Self {
            locals: vec![Mat4::IDENTITY; bone_count],
        }
    }

    /// Create a state sized for a skeleton
    pub fn for_skeleton(skeleton: &SkeletonModel) -> Self {
        Self::new(skeleton.bone_count())
    }

    /// Number of bones
    pub fn bone_count(&self) -> usize {
        self.locals.len()
    }

    /// Local transform of a bone
    pub fn local(&self, bone: usize) -> Option<&Mat4> {
        self.locals.get(bone)
    }

    /// Replace the local transform of a bone
    pub fn set_local(&mut self, bone: usize, transform: Mat4) -> Result<()> {
        let bone_count = self.locals.len();
        let slot = self
            .locals
            .get_mut(bone)
            .ok_or(MdMeshError::BoneOutOfRange { bone, bone_count })?;
        *slot = transform;
        Ok(())
    }

    /// Set a bone's local transform conjugated by its bind offset
    ///
    /// Stores `inverse(offset) * transform * offset`. With an offset that
    /// moves the joint to the origin, a rotation given here turns the bone
    /// about its own joint instead of the model origin.
    pub fn set_local_about_bind(
        &mut self,
        bone: usize,
        transform: Mat4,
        skeleton: &SkeletonModel,
    ) -> Result<()> {
        let (offset, inverse) = skeleton
            .bind_offset(bone)
            .zip(skeleton.inverse_bind(bone))
            .ok_or(MdMeshError::BoneOutOfRange {
                bone,
                bone_count: skeleton.bone_count(),
            })?;
        self.set_local(bone, *inverse * transform * *offset)
    }

    /// Put every bone back at identity
    pub fn reset(&mut self) {
        self.locals.fill(Mat4::IDENTITY);
    }

    /// All local transforms, by bone index
    pub fn as_slice(&self) -> &[Mat4] {
        &self.locals
    }
}
