//! Error handling for MD mesh loading and skeleton validation

use std::fmt;
use std::io;
use thiserror::Error;

/// The file section a read was positioned in when it ran out of bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Fixed 20-byte header
    Header,
    /// Vertex records
    Vertices,
    /// 16-bit index records
    Indices,
    /// Bone records
    Bones,
    /// Skeleton node records
    Nodes,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Header => "header",
            Section::Vertices => "vertices",
            Section::Indices => "indices",
            Section::Bones => "bones",
            Section::Nodes => "nodes",
        };
        f.write_str(name)
    }
}

/// Why a node was rejected while building a skeleton
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyViolation {
    /// The parent reference is not an earlier node position
    ParentNotEarlier {
        /// Raw parent index stored in the node
        parent: i32,
    },
    /// The node refers to a bone that does not exist
    BoneOutOfRange {
        /// Bone index stored in the node
        bone: u32,
        /// Number of bones in the asset
        bone_count: usize,
    },
    /// Another node already drives this bone
    DuplicateBone {
        /// Bone index stored in the node
        bone: u32,
        /// Position of the node that claimed the bone first
        first_node: usize,
    },
}

impl fmt::Display for HierarchyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HierarchyViolation::ParentNotEarlier { parent } => {
                write!(f, "parent index {parent} does not precede the node")
            }
            HierarchyViolation::BoneOutOfRange { bone, bone_count } => {
                write!(f, "bone index {bone} out of range (bone count {bone_count})")
            }
            HierarchyViolation::DuplicateBone { bone, first_node } => {
                write!(f, "bone {bone} already driven by node {first_node}")
            }
        }
    }
}

/// Errors that can occur when loading MD mesh files
#[derive(Debug, Error)]
pub enum MdMeshError {
    /// I/O error while reading an asset from disk
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid magic value in the file header
    #[error("Invalid magic value: expected {expected:#010X}, found {found:#010X}")]
    InvalidMagic {
        /// The expected magic value
        expected: u32,
        /// The magic value found at offset 0
        found: u32,
    },

    /// The buffer ends before a section's declared contents
    #[error(
        "Truncated input in {section} section at offset {offset}: need {needed} bytes, {available} available"
    )]
    TruncatedInput {
        /// Section being read
        section: Section,
        /// Byte offset where the section starts
        offset: usize,
        /// Bytes required by the declared record count
        needed: usize,
        /// Bytes left in the buffer from `offset`
        available: usize,
    },

    /// Bytes remain after the node section and the reader rejects them
    #[error("Unexpected {extra} trailing bytes after node section")]
    TrailingData {
        /// Number of unread bytes
        extra: usize,
    },

    /// An in-memory asset holds more records than a header count can describe
    #[error("Too many records in {section} section: {count} exceeds u32::MAX")]
    TooManyRecords {
        /// Section holding the records
        section: Section,
        /// Number of records
        count: usize,
    },

    /// The node sequence violates the parent-before-child hierarchy rules
    #[error("Invalid hierarchy at node {node}: {reason}")]
    InvalidHierarchy {
        /// Position of the offending node
        node: usize,
        /// What was wrong with it
        reason: HierarchyViolation,
    },

    /// A per-bone operation named a bone the skeleton does not have
    #[error("Bone index {bone} out of range (bone count {bone_count})")]
    BoneOutOfRange {
        /// Requested bone index
        bone: usize,
        /// Number of bones available
        bone_count: usize,
    },
}

impl MdMeshError {
    /// True for errors caused by a malformed file header or layout
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            MdMeshError::InvalidMagic { .. } | MdMeshError::TrailingData { .. }
        )
    }

    /// True when the buffer was shorter than its declared contents
    pub fn is_truncation(&self) -> bool {
        matches!(self, MdMeshError::TruncatedInput { .. })
    }

    /// True for skeleton hierarchy violations
    pub fn is_hierarchy_error(&self) -> bool {
        matches!(self, MdMeshError::InvalidHierarchy { .. })
    }
}

/// Result type for MD mesh operations
pub type Result<T> = std::result::Result<T, MdMeshError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = MdMeshError::InvalidMagic {
            expected: 0xAABB_CCDD,
            found: 0,
        };
        assert_eq!(
            format!("{}", error),
            "Invalid magic value: expected 0xAABBCCDD, found 0x00000000"
        );

        let error = MdMeshError::InvalidHierarchy {
            node: 2,
            reason: HierarchyViolation::ParentNotEarlier { parent: 5 },
        };
        assert_eq!(
            format!("{}", error),
            "Invalid hierarchy at node 2: parent index 5 does not precede the node"
        );
    }

    #[test]
    fn test_error_taxonomy() {
        let magic = MdMeshError::InvalidMagic {
            expected: 1,
            found: 2,
        };
        assert!(magic.is_format_error());
        assert!(!magic.is_truncation());

        let truncated = MdMeshError::TruncatedInput {
            section: Section::Vertices,
            offset: 20,
            needed: 680,
            available: 0,
        };
        assert!(truncated.is_truncation());
        assert!(!truncated.is_hierarchy_error());
        assert!(format!("{truncated}").contains("vertices"));
    }
}
