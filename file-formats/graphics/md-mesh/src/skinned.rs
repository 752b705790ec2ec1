//! A loaded mesh together with its validated skeleton

use log::info;
use std::path::Path;

use crate::animation::AnimationState;
use crate::diagnostics::{DiagnosticReport, DiagnosticsOptions, audit};
use crate::error::{MdMeshError, Result};
use crate::gpu::{BufferUploader, GpuMeshHandles, SkinMatrixBuffer, upload_mesh};
use crate::mesh::{MeshAsset, ReaderOptions};
use crate::pose::PoseEvaluator;
use crate::skeleton::SkeletonModel;

/// Options for [`SkinnedMesh::load`]
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Buffer reading strictness
    pub reader: ReaderOptions,
    /// Audit thresholds
    pub diagnostics: DiagnosticsOptions,
}

/// An asset, its skeleton and the findings of its audit
#[derive(Debug, Clone)]
pub struct SkinnedMesh {
    asset: MeshAsset,
    skeleton: SkeletonModel,
    report: DiagnosticReport,
}

impl SkinnedMesh {
    /// Read a buffer, validate the hierarchy and audit the result
    ///
    /// Format and hierarchy errors fail the load. Audit findings do not;
    /// they are available from [`SkinnedMesh::report`].
    pub fn load(bytes: &[u8], options: &LoadOptions) -> Result<Self> {
        let asset = MeshAsset::load_with_options(bytes, &options.reader)?;
        Self::from_asset(asset, &options.diagnostics)
    }

    /// Load from a file on disk
    pub fn load_from_file<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::load(&bytes, options)
    }

    /// Build the skeleton for an already loaded asset
    pub fn from_asset(asset: MeshAsset, options: &DiagnosticsOptions) -> Result<Self> {
        let skeleton = SkeletonModel::build(asset.bones(), asset.nodes())?;
        let report = audit(&asset, options);
        if !report.is_clean() {
            info!("Mesh loaded with {} diagnostic findings", report.issue_count());
        }
        Ok(Self {
            asset,
            skeleton,
            report,
        })
    }

    /// The decoded asset
    pub fn asset(&self) -> &MeshAsset {
        &self.asset
    }

    /// The validated skeleton
    pub fn skeleton(&self) -> &SkeletonModel {
        &self.skeleton
    }

    /// Audit findings from load time
    pub fn report(&self) -> &DiagnosticReport {
        &self.report
    }

    /// Fresh animation state with every bone at identity
    pub fn animation_state(&self) -> AnimationState {
        AnimationState::for_skeleton(&self.skeleton)
    }

    /// Pose evaluator sized for this skeleton
    pub fn pose_evaluator(&self) -> PoseEvaluator {
        PoseEvaluator::new(&self.skeleton)
    }

    /// Skin matrix buffer sized for this skeleton
    pub fn skin_matrix_buffer(&self) -> SkinMatrixBuffer {
        SkinMatrixBuffer::new(self.skeleton.bone_count())
    }

    /// Send geometry to a rendering backend
    pub fn upload<U: BufferUploader>(&self, uploader: &mut U) -> std::result::Result<GpuMeshHandles, U::Error> {
        upload_mesh(uploader, self.asset.vertices(), self.asset.indices())
    }

    /// Take the asset back, dropping the skeleton
    pub fn into_asset(self) -> MeshAsset {
        self.asset
    }
}

impl TryFrom<MeshAsset> for SkinnedMesh {
    type Error = MdMeshError;

    fn try_from(asset: MeshAsset) -> Result<Self> {
        Self::from_asset(asset, &DiagnosticsOptions::default())
    }
}
