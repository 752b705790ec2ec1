//! Loader, skeleton validator and pose evaluator for MD skinned-mesh files.
//!
//! An MD file is a little-endian binary container holding a skinned mesh:
//! vertices with up to four bone influences, 16-bit triangle indices, bones
//! with bind offset matrices, and a flat list of skeleton nodes ordered so
//! that every parent precedes its children.
//!
//! Loading happens in three steps:
//!
//! 1. [`MeshAsset::load`] decodes and bounds-checks the buffer.
//! 2. [`SkeletonModel::build`] validates the node hierarchy.
//! 3. [`PoseEvaluator::update`] turns per-bone local transforms into world
//!    poses and skin matrices, once per frame.
//!
//! [`SkinnedMesh::load`] runs the first two steps and audits the result.
//!
//! # Example
//!
//! ```rust,no_run
//! use glam::{Mat4, Vec3};
//! use md_mesh::{LoadOptions, SkinnedMesh};
//!
//! let mesh = SkinnedMesh::load_from_file("character.md", &LoadOptions::default())?;
//! for warning in &mesh.report().weights {
//!     eprintln!("vertex {} weights sum to {}", warning.vertex, warning.sum);
//! }
//!
//! let mut state = mesh.animation_state();
//! state.set_local(0, Mat4::from_translation(Vec3::Y))?;
//!
//! let mut evaluator = mesh.pose_evaluator();
//! let mut skin_buffer = mesh.skin_matrix_buffer();
//! skin_buffer.refresh(evaluator.update(mesh.skeleton(), &state));
//! // skin_buffer.as_bytes() is ready for a uniform buffer
//! # Ok::<(), md_mesh::MdMeshError>(())
//! ```

pub mod animation;
pub mod chunks;
pub mod common;
pub mod diagnostics;
pub mod error;
pub mod gpu;
pub mod header;
pub mod mesh;
pub mod pose;
pub mod reader;
pub mod skeleton;
pub mod skinned;

// Re-export common types
pub use animation::AnimationState;
pub use diagnostics::{DiagnosticReport, DiagnosticsOptions, WeightWarning};
pub use error::{HierarchyViolation, MdMeshError, Result, Section};
pub use gpu::{BufferOffset, BufferUploader, GpuMeshHandles, SkinMatrixBuffer};
pub use header::{MD_MESH_MAGIC, MdMeshHeader};
pub use mesh::{MeshAsset, ReaderOptions};
pub use pose::PoseEvaluator;
pub use skeleton::SkeletonModel;
pub use skinned::{LoadOptions, SkinnedMesh};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_loaded_types_are_shareable() {
        assert_send_sync::<MeshAsset>();
        assert_send_sync::<SkeletonModel>();
        assert_send_sync::<SkinnedMesh>();
    }
}
