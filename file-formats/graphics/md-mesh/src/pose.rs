//! Skeleton pose evaluation
//!
//! Local bone transforms are composed along the hierarchy into world-space
//! bone matrices, then combined with the inverse bind offsets to produce the
//! skin matrices a vertex shader blends.
//!
//! # Example
//!
//! ```rust
//! use glam::{Mat4, Vec3};
//! use md_mesh::chunks::{Bone, Node};
//! use md_mesh::{AnimationState, PoseEvaluator, SkeletonModel};
//!
//! let bones = vec![
//!     Bone::new("root", Mat4::IDENTITY, 0),
//!     Bone::new("tip", Mat4::IDENTITY, 0),
//! ];
//! let nodes = vec![Node::new(0, None, "root"), Node::new(1, Some(0), "tip")];
//! let skeleton = SkeletonModel::build(&bones, &nodes)?;
//!
//! let mut state = AnimationState::for_skeleton(&skeleton);
//! state.set_local(0, Mat4::from_translation(Vec3::Y))?;
//!
//! let mut evaluator = PoseEvaluator::new(&skeleton);
//! let skin = evaluator.update(&skeleton, &state);
//! assert_eq!(skin[1], Mat4::from_translation(Vec3::Y));
//! # Ok::<(), md_mesh::MdMeshError>(())
//! ```

use glam::Mat4;

use crate::animation::AnimationState;
use crate::skeleton::SkeletonModel;

/// Compose local transforms into world-space bone matrices
///
/// `world` is indexed by bone index. Every entry is reset to identity first,
/// then nodes are visited in order, so each parent's world matrix is final
/// before any child reads it. Missing local matrices count as identity and
/// bones no node references stay at identity.
///
/// # Panics
///
/// Panics if `world.len()` differs from `skeleton.bone_count()`.
pub fn evaluate_world_pose(skeleton: &SkeletonModel, locals: &[Mat4], world: &mut [Mat4]) {
    assert_eq!(
        world.len(),
        skeleton.bone_count(),
        "world pose buffer must hold one matrix per bone"
    );
    world.fill(Mat4::IDENTITY);

    for (position, node) in skeleton.nodes().iter().enumerate() {
        let bone = node.bone_index as usize;
        let local = locals.get(bone).copied().unwrap_or(Mat4::IDENTITY);

        world[bone] = match skeleton.parent_bone(position) {
            Some(parent) => world[parent] * local,
            None => local,
        };
    }
}

/// Combine world poses with inverse bind offsets
///
/// `skin[b] = world[b] * inverse(bind_offset[b])` for every bone.
///
/// # Panics
///
/// Panics if `world` or `skin` does not hold exactly
/// `skeleton.bone_count()` matrices.
pub fn compute_skin_matrices(skeleton: &SkeletonModel, world: &[Mat4], skin: &mut [Mat4]) {
    let bone_count = skeleton.bone_count();
    assert_eq!(world.len(), bone_count, "world pose buffer must hold one matrix per bone");
    assert_eq!(skin.len(), bone_count, "skin buffer must hold one matrix per bone");

    for ((out, pose), inverse_bind) in skin
        .iter_mut()
        .zip(world)
        .zip(skeleton.inverse_bind_matrices())
    {
        *out = *pose * *inverse_bind;
    }
}

/// Reusable per-frame pose evaluation buffers
///
/// Buffers are sized once from the skeleton and overwritten on every call,
/// so evaluating a frame does not allocate.
#[derive(Debug, Clone)]
pub struct PoseEvaluator {
    world: Vec<Mat4>,
    skin: Vec<Mat4>,
}

impl PoseEvaluator {
    /// Create buffers for a skeleton, initialised to identity
    pub fn new(skeleton: &SkeletonModel) -> Self {
        let bone_count = skeleton.bone_count();
        Self {
            world: vec![Mat4::IDENTITY; bone_count],
            skin: vec![Mat4::IDENTITY; bone_count],
        }
    }

    fn fit(&mut self, bone_count: usize) {
        if self.world.len() != bone_count {
            self.world.resize(bone_count, Mat4::IDENTITY);
            self.skin.resize(bone_count, Mat4::IDENTITY);
        }
    }

    /// Compute world poses from local matrices indexed by bone
    pub fn evaluate(&mut self, skeleton: &SkeletonModel, locals: &[Mat4]) -> &[Mat4] {
        self.fit(skeleton.bone_count());
        evaluate_world_pose(skeleton, locals, &mut self.world);
        &self.world
    }

    /// Recompute skin matrices from the last evaluated world poses
    pub fn compute_skin(&mut self, skeleton: &SkeletonModel) -> &[Mat4] {
        self.fit(skeleton.bone_count());
        compute_skin_matrices(skeleton, &self.world, &mut self.skin);
        &self.skin
    }

    /// Evaluate a frame: world poses, then skin matrices
    pub fn update(&mut self, skeleton: &SkeletonModel, state: &AnimationState) -> &[Mat4] {
        self.evaluate(skeleton, state.as_slice());
        self.compute_skin(skeleton)
    }

    /// World poses from the last evaluation, by bone index
    pub fn world_pose(&self) -> &[Mat4] {
        &self.world
    }

    /// Skin matrices from the last evaluation, by bone index
    pub fn skin_matrices(&self) -> &[Mat4] {
        &self.skin
    }
}
