//! Hand-off of mesh data and skin matrices to a rendering backend
//!
//! The crate does not talk to a GPU API itself. A backend implements
//! [`BufferUploader`] and receives plain byte slices in the layouts
//! described by [`Vertex::ATTRIBUTES`], 16-bit indices and row-major
//! `[f32; 16]` skin matrices.

use glam::Mat4;

use crate::chunks::Vertex;
use crate::common::mat4_to_row_major;

/// Opaque location of uploaded data, as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BufferOffset(pub u64);

/// Buffer locations of an uploaded mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuMeshHandles {
    /// Where the vertex data landed
    pub vertices: BufferOffset,
    /// Where the index data landed
    pub indices: BufferOffset,
    /// Number of indices to draw
    pub index_count: u32,
}

/// A backend that accepts vertex and index data
pub trait BufferUploader {
    /// Backend-specific failure
    type Error;

    /// Upload tightly packed [`Vertex`] records
    fn upload_vertices(&mut self, bytes: &[u8], stride: usize) -> Result<BufferOffset, Self::Error>;

    /// Upload little-endian 16-bit triangle indices
    fn upload_indices(&mut self, bytes: &[u8]) -> Result<BufferOffset, Self::Error>;
}

/// View vertices as bytes in their GPU layout
pub fn vertex_bytes(vertices: &[Vertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

/// View indices as bytes
///
/// The byte order is the host's, which matches the little-endian file
/// order on every target a GPU backend is likely to run on.
pub fn index_bytes(indices: &[u16]) -> &[u8] {
    bytemuck::cast_slice(indices)
}

/// Upload vertices and indices through a backend
pub fn upload_mesh<U: BufferUploader>(
    uploader: &mut U,
    vertices: &[Vertex],
    indices: &[u16],
) -> Result<GpuMeshHandles, U::Error> {
    let vertex_offset = uploader.upload_vertices(vertex_bytes(vertices), Vertex::SIZE)?;
    let index_offset = uploader.upload_indices(index_bytes(indices))?;
    Ok(GpuMeshHandles {
        vertices: vertex_offset,
        indices: index_offset,
        index_count: indices.len() as u32,
    })
}

/// Skin matrices packed for a uniform or storage buffer
#[derive(Debug, Clone, PartialEq)]
pub struct SkinMatrixBuffer {
    data: Vec<[f32; 16]>,
}

impl SkinMatrixBuffer {
    /// Create a buffer of identity matrices
    pub fn new(bone_count: usize) -> Self {
        Self {
            data: vec![mat4_to_row_major(&Mat4::IDENTITY); bone_count],
        }
    }

    /// Number of matrices
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer holds no matrices
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Overwrite the packed matrices in place
    ///
    /// The buffer is resized only when the matrix count changes.
    pub fn refresh(&mut self, matrices: &[Mat4]) {
        if self.data.len() != matrices.len() {
            self.data.resize(matrices.len(), [0.0; 16]);
        }
        for (packed, matrix) in self.data.iter_mut().zip(matrices) {
            *packed = mat4_to_row_major(matrix);
        }
    }

    /// Row-major matrices, by bone index
    pub fn as_slice(&self) -> &[[f32; 16]] {
        &self.data
    }

    /// Raw bytes ready for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}
