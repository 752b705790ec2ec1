//! Non-fatal audits of loaded assets and evaluated poses
//!
//! Nothing here fails a load. Every anomaly is logged at warn level and
//! collected into a [`DiagnosticReport`] for the caller to inspect.

use glam::Mat4;
use log::{debug, warn};

use crate::chunks::Vertex;
use crate::mesh::MeshAsset;

/// Thresholds used by the audits
#[derive(Debug, Clone)]
pub struct DiagnosticsOptions {
    /// Largest accepted distance between a vertex's weight sum and 1.0
    pub weight_tolerance: f32,
    /// Determinants with a smaller magnitude count as degenerate
    pub determinant_epsilon: f32,
}

impl Default for DiagnosticsOptions {
    fn default() -> Self {
        Self {
            weight_tolerance: 1e-3,
            determinant_epsilon: 1e-6,
        }
    }
}

/// A vertex whose bone weights do not sum to one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightWarning {
    /// Vertex index
    pub vertex: usize,
    /// Sum of its four weights
    pub sum: f32,
}

/// An index entry pointing past the vertex array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexWarning {
    /// Position in the index list
    pub position: usize,
    /// The out-of-range vertex index
    pub index: u16,
}

/// A weighted bone reference that names a non-existent bone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneReferenceWarning {
    /// Vertex index
    pub vertex: usize,
    /// Influence slot (0..4)
    pub slot: usize,
    /// Referenced bone index
    pub bone: u32,
    /// Weight carried by the reference
    pub weight: f32,
}

/// A bone whose matrix has a near-zero determinant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegenerateMatrix {
    /// Bone index
    pub bone: usize,
    /// Matrix determinant
    pub determinant: f32,
}

/// Everything an audit found
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagnosticReport {
    /// Vertices with off-unit weight sums
    pub weights: Vec<WeightWarning>,
    /// Triangle indices outside the vertex array
    pub indices: Vec<IndexWarning>,
    /// Indices left over after the last whole triangle
    pub dangling_indices: usize,
    /// Weighted references to missing bones
    pub bone_references: Vec<BoneReferenceWarning>,
    /// `(node_count, bone_count)` when they differ
    pub count_mismatch: Option<(usize, usize)>,
    /// Bones with singular bind offset matrices
    pub degenerate_bind_offsets: Vec<DegenerateMatrix>,
}

impl DiagnosticReport {
    /// Check if the audit found nothing
    pub fn is_clean(&self) -> bool {
        self.weights.is_empty()
            && self.indices.is_empty()
            && self.dangling_indices == 0
            && self.bone_references.is_empty()
            && self.count_mismatch.is_none()
            && self.degenerate_bind_offsets.is_empty()
    }

    /// Total number of individual findings
    pub fn issue_count(&self) -> usize {
        self.weights.len()
            + self.indices.len()
            + usize::from(self.dangling_indices > 0)
            + self.bone_references.len()
            + usize::from(self.count_mismatch.is_some())
            + self.degenerate_bind_offsets.len()
    }
}

/// Sum of a vertex's four bone weights
pub fn weight_sum(vertex: &Vertex) -> f32 {
    vertex.bone_weights.iter().sum()
}

/// Vertices whose weight sum is further than `tolerance` from 1.0
pub fn check_weights(vertices: &[Vertex], tolerance: f32) -> Vec<WeightWarning> {
    vertices
        .iter()
        .enumerate()
        .filter_map(|(vertex, v)| {
            let sum = weight_sum(v);
            ((sum - 1.0).abs() > tolerance).then_some(WeightWarning { vertex, sum })
        })
        .collect()
}

/// Bones whose matrix determinant magnitude is below `epsilon`
pub fn degenerate_matrices(matrices: &[Mat4], epsilon: f32) -> Vec<DegenerateMatrix> {
    matrices
        .iter()
        .enumerate()
        .filter_map(|(bone, matrix)| {
            let determinant = matrix.determinant();
            let degenerate = determinant.is_nan() || determinant.abs() < epsilon;
            degenerate.then_some(DegenerateMatrix { bone, determinant })
        })
        .collect()
}

/// Audit an asset, logging each finding
pub fn audit(asset: &MeshAsset, options: &DiagnosticsOptions) -> DiagnosticReport {
    let vertex_count = asset.vertices().len();
    let bone_count = asset.bones().len();
    let mut report = DiagnosticReport {
        weights: check_weights(asset.vertices(), options.weight_tolerance),
        ..Default::default()
    };

    for warning in &report.weights {
        warn!("Vertex {} weight sum: {}", warning.vertex, warning.sum);
    }

    for (position, &index) in asset.indices().iter().enumerate() {
        if usize::from(index) >= vertex_count {
            warn!(
                "Index {} at position {} exceeds vertex count {}",
                index, position, vertex_count
            );
            report.indices.push(IndexWarning { position, index });
        }
    }

    report.dangling_indices = asset.indices().len() % 3;
    if report.dangling_indices > 0 {
        warn!(
            "Index count {} is not a whole number of triangles",
            asset.indices().len()
        );
    }

    for (vertex, v) in asset.vertices().iter().enumerate() {
        for (slot, (&bone, &weight)) in v.bone_indices.iter().zip(&v.bone_weights).enumerate() {
            if weight != 0.0 && bone as usize >= bone_count {
                warn!(
                    "Vertex {} slot {} references bone {} of {} with weight {}",
                    vertex, slot, bone, bone_count, weight
                );
                report.bone_references.push(BoneReferenceWarning {
                    vertex,
                    slot,
                    bone,
                    weight,
                });
            }
        }
    }

    let node_count = asset.nodes().len();
    if node_count != bone_count {
        warn!("Node count {} differs from bone count {}", node_count, bone_count);
        report.count_mismatch = Some((node_count, bone_count));
    }

    let offsets: Vec<Mat4> = asset.bones().iter().map(|bone| bone.offset_matrix).collect();
    report.degenerate_bind_offsets = degenerate_matrices(&offsets, options.determinant_epsilon);
    for degenerate in &report.degenerate_bind_offsets {
        warn!(
            "Bone {} bind offset is singular (det = {})",
            degenerate.bone, degenerate.determinant
        );
    }

    debug!("Diagnostics found {} issues", report.issue_count());
    report
}
