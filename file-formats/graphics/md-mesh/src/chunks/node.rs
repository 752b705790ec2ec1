use std::io::Write;

use crate::common::{FixedName, MAX_NAME_LENGTH};
use crate::error::Result;
use crate::reader::ByteReader;

/// Raw parent index marking a root node
pub const NO_PARENT: i32 = -1;

/// A skeleton hierarchy entry linking a bone to its parent
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    /// Bone driven by this node
    pub bone_index: u32,
    /// Position of the parent node, or [`NO_PARENT`]
    pub parent_index: i32,
    /// Node name
    pub name: FixedName,
}

impl Node {
    /// Size of a node record in bytes
    pub const SIZE: usize = 4 + 4 + MAX_NAME_LENGTH;

    /// Create a node
    pub fn new(bone_index: u32, parent: Option<usize>, name: impl Into<FixedName>) -> Self {
        Self {
            bone_index,
            parent_index: parent.map_or(NO_PARENT, |p| p as i32),
            name: name.into(),
        }
    }

    /// Parent node position, `None` for roots
    ///
    /// Every negative raw value maps to `None` here; skeleton construction
    /// only accepts [`NO_PARENT`] itself.
    pub fn parent(&self) -> Option<usize> {
        usize::try_from(self.parent_index).ok()
    }

    /// Check if this node has no parent
    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    /// Parse a node record
    pub fn parse(reader: &mut impl ByteReader) -> Result<Self> {
        Ok(Self {
            bone_index: reader.read_u32_le()?,
            parent_index: reader.read_i32_le()?,
            name: FixedName::parse(reader)?,
        })
    }

    /// Write a node record
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.bone_index.to_le_bytes())?;
        writer.write_all(&self.parent_index.to_le_bytes())?;
        writer.write_all(&self.name.to_raw())?;
        Ok(())
    }
}
