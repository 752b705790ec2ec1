//! The MD mesh asset and its reader
//!
//! [`MeshAsset::load`] turns a byte buffer into an immutable asset. The
//! header counts are checked against the buffer length for every section
//! before any record storage is allocated, so a failed load leaves nothing
//! behind.
//!
//! # Example
//!
//! ```rust,no_run
//! use md_mesh::MeshAsset;
//!
//! let asset = MeshAsset::load_from_file("assets/models/lego_figure.md")?;
//! println!("{} vertices, {} bones", asset.vertices().len(), asset.bones().len());
//! # Ok::<(), md_mesh::MdMeshError>(())
//! ```

use log::{debug, info, warn};
use std::io::Write;
use std::path::Path;

use crate::chunks::{Bone, Node, Vertex};
use crate::error::{MdMeshError, Result, Section};
use crate::header::MdMeshHeader;
use crate::reader::{ByteReader, Cursor};

/// Options controlling how strictly a buffer is read
#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// Accept bytes after the node section instead of failing
    pub allow_trailing_data: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            allow_trailing_data: true,
        }
    }
}

/// A loaded skinned mesh: geometry, bones and skeleton nodes
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshAsset {
    vertices: Vec<Vertex>,
    indices: Vec<u16>,
    bones: Vec<Bone>,
    nodes: Vec<Node>,
}

impl MeshAsset {
    /// Assemble an asset from already decoded records
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u16>, bones: Vec<Bone>, nodes: Vec<Node>) -> Self {
        Self {
            vertices,
            indices,
            bones,
            nodes,
        }
    }

    /// Parse an asset from a byte buffer with default options
    pub fn load(bytes: &[u8]) -> Result<Self> {
        Self::load_with_options(bytes, &ReaderOptions::default())
    }

    /// Parse an asset from a byte buffer
    pub fn load_with_options(bytes: &[u8], options: &ReaderOptions) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        let header = MdMeshHeader::parse(&mut cursor)?;

        let layout = header.layout()?;
        layout.check_fits(bytes.len())?;
        debug!("MD mesh section layout: {:?}", layout);

        cursor.enter(Section::Vertices);
        let vertices = read_records(&mut cursor, header.vertex_count, Vertex::parse)?;

        cursor.enter(Section::Indices);
        let indices = read_records(&mut cursor, header.index_count, |r| r.read_u16_le())?;

        cursor.enter(Section::Bones);
        let bones = read_records(&mut cursor, header.bone_count, Bone::parse)?;

        cursor.enter(Section::Nodes);
        let nodes = read_records(&mut cursor, header.node_count, Node::parse)?;

        let extra = cursor.remaining();
        if extra > 0 {
            if !options.allow_trailing_data {
                return Err(MdMeshError::TrailingData { extra });
            }
            warn!("Ignoring {} trailing bytes after node section", extra);
        }

        info!(
            "Loaded MD mesh: {} vertices, {} indices, {} bones, {} nodes",
            vertices.len(),
            indices.len(),
            bones.len(),
            nodes.len()
        );

        Ok(Self {
            vertices,
            indices,
            bones,
            nodes,
        })
    }

    /// Read and parse an asset file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Reading MD mesh file {}", path.display());
        let bytes = std::fs::read(path)?;
        Self::load(&bytes)
    }

    /// Header describing this asset's record counts
    ///
    /// Fails with [`MdMeshError::TooManyRecords`] when a section holds more
    /// records than a 32-bit count can describe.
    pub fn header(&self) -> Result<MdMeshHeader> {
        Ok(MdMeshHeader::new(
            record_count(Section::Vertices, self.vertices.len())?,
            record_count(Section::Indices, self.indices.len())?,
            record_count(Section::Bones, self.bones.len())?,
            record_count(Section::Nodes, self.nodes.len())?,
        ))
    }

    /// Write the asset in the MD mesh binary format
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.header()?.write(writer)?;
        for vertex in &self.vertices {
            vertex.write(writer)?;
        }
        for index in &self.indices {
            writer.write_all(&index.to_le_bytes())?;
        }
        for bone in &self.bones {
            bone.write(writer)?;
        }
        for node in &self.nodes {
            node.write(writer)?;
        }
        Ok(())
    }

    /// Serialize the asset into a new buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(self.header()?.layout()?.total_len());
        self.write(&mut bytes)?;
        Ok(bytes)
    }

    /// Vertex records
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Triangle-list indices
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Bones with their bind offsets
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// Skeleton nodes in file order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of whole triangles described by the index list
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

fn record_count(section: Section, count: usize) -> Result<u32> {
    u32::try_from(count).map_err(|_| MdMeshError::TooManyRecords { section, count })
}

fn read_records<'a, T, F>(cursor: &mut Cursor<'a>, count: u32, mut parse: F) -> Result<Vec<T>>
where
    F: FnMut(&mut Cursor<'a>) -> Result<T>,
{
    let mut records = Vec::with_capacity(count as usize);
    for _ in 0..count {
        records.push(parse(cursor)?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::MD_MESH_MAGIC;
    use glam::{Mat4, Vec3};

    fn small_asset() -> MeshAsset {
        let vertex = |x: f32, bone: u32| Vertex {
            position: [x, 0.0, 0.0],
            normal: [0.0, 0.0, 1.0],
            color: [1.0, 1.0, 1.0],
            bone_indices: [bone, 0, 0, 0],
            bone_weights: [1.0, 0.0, 0.0, 0.0],
        };
        MeshAsset::new(
            vec![vertex(0.0, 0), vertex(1.0, 1), vertex(2.0, 1)],
            vec![0, 1, 2],
            vec![
                Bone::new("root", Mat4::IDENTITY, 1),
                Bone::new("tip", Mat4::from_translation(Vec3::new(-1.0, 0.0, 0.0)), 2),
            ],
            vec![Node::new(0, None, "root"), Node::new(1, Some(0), "tip")],
        )
    }

    #[test]
    fn test_load_written_asset() {
        let asset = small_asset();
        let bytes = asset.to_bytes().unwrap();
        assert_eq!(bytes.len(), asset.header().unwrap().layout().unwrap().total_len());

        let loaded = MeshAsset::load(&bytes).unwrap();
        assert_eq!(loaded, asset);
        assert_eq!(loaded.triangle_count(), 1);
    }

    #[test]
    fn test_empty_asset() {
        let bytes = MeshAsset::default().to_bytes().unwrap();
        assert_eq!(bytes.len(), MdMeshHeader::SIZE);
        let loaded = MeshAsset::load(&bytes).unwrap();
        assert!(loaded.vertices().is_empty());
        assert!(loaded.nodes().is_empty());
    }

    #[test]
    fn test_truncated_node_section() {
        let bytes = small_asset().to_bytes().unwrap();
        let err = MeshAsset::load(&bytes[..bytes.len() - 1]).unwrap_err();
        match err {
            MdMeshError::TruncatedInput { section, .. } => assert_eq!(section, Section::Nodes),
            other => panic!("expected truncation, got {other:?}"),
        }
    }

    #[test]
    fn test_trailing_data() {
        let mut bytes = small_asset().to_bytes().unwrap();
        bytes.extend_from_slice(&[0, 0, 0]);

        assert!(MeshAsset::load(&bytes).is_ok());

        let strict = ReaderOptions {
            allow_trailing_data: false,
        };
        let err = MeshAsset::load_with_options(&bytes, &strict).unwrap_err();
        assert!(matches!(err, MdMeshError::TrailingData { extra: 3 }));
        assert!(err.is_format_error());
    }

    #[test]
    fn test_huge_counts_fail_before_allocating() {
        let mut bytes = Vec::new();
        MdMeshHeader {
            magic: MD_MESH_MAGIC,
            vertex_count: u32::MAX,
            index_count: u32::MAX,
            bone_count: u32::MAX,
            node_count: u32::MAX,
        }
        .write(&mut bytes)
        .unwrap();

        let err = MeshAsset::load(&bytes).unwrap_err();
        assert!(err.is_truncation());
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = MeshAsset::load_from_file("/definitely/not/here.md").unwrap_err();
        assert!(matches!(err, MdMeshError::Io(_)));
    }

    #[test]
    fn test_record_counts_beyond_u32_are_rejected() {
        assert_eq!(record_count(Section::Nodes, 7).unwrap(), 7);
        assert_eq!(
            record_count(Section::Indices, u32::MAX as usize).unwrap(),
            u32::MAX
        );

        let too_many = u32::MAX as usize + 1;
        let err = record_count(Section::Indices, too_many).unwrap_err();
        assert!(matches!(
            err,
            MdMeshError::TooManyRecords {
                section: Section::Indices,
                count
            } if count == too_many
        ));
    }
}
