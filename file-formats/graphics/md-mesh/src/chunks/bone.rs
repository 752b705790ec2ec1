use glam::Mat4;
use std::io::Write;

use crate::common::{FixedName, MAX_NAME_LENGTH, mat4_to_row_major, read_row_major_mat4};
use crate::error::Result;
use crate::reader::ByteReader;

/// A bone and its bind pose
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bone {
    /// Bone name
    pub name: FixedName,
    /// Bind-pose offset matrix; skin matrices multiply by its inverse
    pub offset_matrix: Mat4,
    /// Number of vertices this bone influences (metadata only)
    pub weight_count: u32,
}

impl Bone {
    /// Size of a bone record in bytes
    pub const SIZE: usize = MAX_NAME_LENGTH + 16 * 4 + 4;

    /// Create a bone
    pub fn new(name: impl Into<FixedName>, offset_matrix: Mat4, weight_count: u32) -> Self {
        Self {
            name: name.into(),
            offset_matrix,
            weight_count,
        }
    }

    /// Parse a bone record
    pub fn parse(reader: &mut impl ByteReader) -> Result<Self> {
        Ok(Self {
            name: FixedName::parse(reader)?,
            offset_matrix: read_row_major_mat4(reader)?,
            weight_count: reader.read_u32_le()?,
        })
    }

    /// Write a bone record
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.name.to_raw())?;
        for value in mat4_to_row_major(&self.offset_matrix) {
            writer.write_all(&value.to_le_bytes())?;
        }
        writer.write_all(&self.weight_count.to_le_bytes())?;
        Ok(())
    }
}
