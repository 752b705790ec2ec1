use bytemuck::{Pod, Zeroable};
use std::io::Write;

use crate::error::Result;
use crate::reader::{ByteReader, read_f32_array, read_u32_array};

/// Number of bones that can influence a single vertex
pub const MAX_BONE_INFLUENCES: usize = 4;

/// A skinned vertex as stored in the file and uploaded to the GPU
///
/// The in-memory layout matches the 68-byte file record, so a vertex slice
/// can be handed to a buffer uploader without repacking.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vertex {
    /// Position in model space
    pub position: [f32; 3],
    /// Normal vector
    pub normal: [f32; 3],
    /// Vertex color
    pub color: [f32; 3],
    /// Indices into the bone array
    pub bone_indices: [u32; MAX_BONE_INFLUENCES],
    /// Influence of each referenced bone
    pub bone_weights: [f32; MAX_BONE_INFLUENCES],
}

/// Component format of a vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeFormat {
    /// Three 32-bit floats
    Float32x3,
    /// One 32-bit unsigned integer
    Uint32,
    /// One 32-bit float
    Float32,
}

/// Where a shader input lives inside a [`Vertex`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader input location
    pub location: u32,
    /// Component format
    pub format: AttributeFormat,
    /// Byte offset from the start of the vertex
    pub offset: u32,
}

const fn attribute(location: u32, format: AttributeFormat, offset: usize) -> VertexAttribute {
    VertexAttribute {
        location,
        format,
        offset: offset as u32,
    }
}

const VEC3: usize = 12;
const SCALAR: usize = 4;
const BONE_INDICES_OFFSET: usize = 3 * VEC3;
const BONE_WEIGHTS_OFFSET: usize = BONE_INDICES_OFFSET + MAX_BONE_INFLUENCES * SCALAR;

impl Vertex {
    /// Size of a vertex record in bytes
    pub const SIZE: usize = 68;

    /// Vertex input layout used by the skinning pipeline.
    ///
    /// Bone indices and weights are bound one scalar per location.
    pub const ATTRIBUTES: [VertexAttribute; 11] = [
        attribute(0, AttributeFormat::Float32x3, 0),
        attribute(1, AttributeFormat::Float32x3, VEC3),
        attribute(2, AttributeFormat::Float32x3, 2 * VEC3),
        attribute(3, AttributeFormat::Uint32, BONE_INDICES_OFFSET),
        attribute(4, AttributeFormat::Uint32, BONE_INDICES_OFFSET + SCALAR),
        attribute(5, AttributeFormat::Uint32, BONE_INDICES_OFFSET + 2 * SCALAR),
        attribute(6, AttributeFormat::Uint32, BONE_INDICES_OFFSET + 3 * SCALAR),
        attribute(7, AttributeFormat::Float32, BONE_WEIGHTS_OFFSET),
        attribute(8, AttributeFormat::Float32, BONE_WEIGHTS_OFFSET + SCALAR),
        attribute(9, AttributeFormat::Float32, BONE_WEIGHTS_OFFSET + 2 * SCALAR),
        attribute(10, AttributeFormat::Float32, BONE_WEIGHTS_OFFSET + 3 * SCALAR),
    ];

    /// Parse a vertex record
    pub fn parse(reader: &mut impl ByteReader) -> Result<Self> {
        Ok(Self {
            position: read_f32_array(reader)?,
            normal: read_f32_array(reader)?,
            color: read_f32_array(reader)?,
            bone_indices: read_u32_array(reader)?,
            bone_weights: read_f32_array(reader)?,
        })
    }

    /// Write a vertex record
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let floats = self.position.iter().chain(&self.normal).chain(&self.color);
        for value in floats {
            writer.write_all(&value.to_le_bytes())?;
        }
        for index in &self.bone_indices {
            writer.write_all(&index.to_le_bytes())?;
        }
        for weight in &self.bone_weights {
            writer.write_all(&weight.to_le_bytes())?;
        }
        Ok(())
    }

    /// Bones with a non-zero weight, as `(bone index, weight)` pairs
    pub fn influences(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.bone_indices
            .iter()
            .zip(&self.bone_weights)
            .filter(|(_, weight)| **weight != 0.0)
            .map(|(index, weight)| (*index, *weight))
    }
}
