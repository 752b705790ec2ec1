//! MD mesh file header and section layout

use log::debug;
use std::io::Write;

use crate::chunks::{bone::Bone, node::Node, vertex::Vertex};
use crate::error::{MdMeshError, Result, Section};
use crate::reader::{ByteReader, Cursor};

/// Magic number stored in the first four bytes of every MD mesh file
pub const MD_MESH_MAGIC: u32 = 0xAABB_CCDD;

/// Byte size of an index record
pub const INDEX_SIZE: usize = 2;

/// The fixed header at the start of an MD mesh file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MdMeshHeader {
    /// Magic number, always [`MD_MESH_MAGIC`] once parsed
    pub magic: u32,
    /// Number of vertex records
    pub vertex_count: u32,
    /// Number of 16-bit index records
    pub index_count: u32,
    /// Number of bone records
    pub bone_count: u32,
    /// Number of skeleton node records
    pub node_count: u32,
}

/// Byte range of one section within the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpan {
    /// Which section this is
    pub section: Section,
    /// Offset from the start of the file
    pub offset: usize,
    /// Length in bytes
    pub len: usize,
}

impl SectionSpan {
    /// Offset one past the last byte of the section
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    fn after(section: Section, offset: usize, count: u32, record_size: usize) -> Result<Self> {
        let overflow = MdMeshError::TruncatedInput {
            section,
            offset,
            needed: usize::MAX,
            available: 0,
        };
        let len = (count as usize)
            .checked_mul(record_size)
            .filter(|len| offset.checked_add(*len).is_some())
            .ok_or(overflow)?;
        Ok(Self {
            section,
            offset,
            len,
        })
    }
}

/// Offsets and lengths of all sections following the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionLayout {
    /// Vertex records
    pub vertices: SectionSpan,
    /// Index records
    pub indices: SectionSpan,
    /// Bone records
    pub bones: SectionSpan,
    /// Node records
    pub nodes: SectionSpan,
}

impl SectionLayout {
    /// Sections in file order
    pub fn spans(&self) -> [SectionSpan; 4] {
        [self.vertices, self.indices, self.bones, self.nodes]
    }

    /// Total file size implied by the header counts
    pub fn total_len(&self) -> usize {
        self.nodes.end()
    }

    /// Check that every section fits in a buffer of `available` bytes
    pub fn check_fits(&self, available: usize) -> Result<()> {
        for span in self.spans() {
            if span.end() > available {
                return Err(MdMeshError::TruncatedInput {
                    section: span.section,
                    offset: span.offset,
                    needed: span.len,
                    available: available.saturating_sub(span.offset),
                });
            }
        }
        Ok(())
    }
}

impl MdMeshHeader {
    /// Header size in bytes
    pub const SIZE: usize = 20;

    /// Create a header for the given record counts
    pub fn new(vertex_count: u32, index_count: u32, bone_count: u32, node_count: u32) -> Self {
        Self {
            magic: MD_MESH_MAGIC,
            vertex_count,
            index_count,
            bone_count,
            node_count,
        }
    }

    /// Parse the header, validating the magic number
    pub fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        cursor.enter(Section::Header);
        let magic = cursor.read_u32_le()?;
        if magic != MD_MESH_MAGIC {
            return Err(MdMeshError::InvalidMagic {
                expected: MD_MESH_MAGIC,
                found: magic,
            });
        }

        let header = Self {
            magic,
            vertex_count: cursor.read_u32_le()?,
            index_count: cursor.read_u32_le()?,
            bone_count: cursor.read_u32_le()?,
            node_count: cursor.read_u32_le()?,
        };

        debug!(
            "MD mesh header: {} vertices, {} indices, {} bones, {} nodes",
            header.vertex_count, header.index_count, header.bone_count, header.node_count
        );

        Ok(header)
    }

    /// Write the header
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.magic.to_le_bytes())?;
        writer.write_all(&self.vertex_count.to_le_bytes())?;
        writer.write_all(&self.index_count.to_le_bytes())?;
        writer.write_all(&self.bone_count.to_le_bytes())?;
        writer.write_all(&self.node_count.to_le_bytes())?;
        Ok(())
    }

    /// Compute where each section lives in the file
    ///
    /// Fails with a truncation error if a declared count is too large to be
    /// addressed at all.
    pub fn layout(&self) -> Result<SectionLayout> {
        let vertices = SectionSpan::after(
            Section::Vertices,
            Self::SIZE,
            self.vertex_count,
            Vertex::SIZE,
        )?;
        let indices =
            SectionSpan::after(Section::Indices, vertices.end(), self.index_count, INDEX_SIZE)?;
        let bones = SectionSpan::after(Section::Bones, indices.end(), self.bone_count, Bone::SIZE)?;
        let nodes = SectionSpan::after(Section::Nodes, bones.end(), self.node_count, Node::SIZE)?;

        Ok(SectionLayout {
            vertices,
            indices,
            bones,
            nodes,
        })
    }
}
