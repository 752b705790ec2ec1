//! Shared types for MD mesh records

use glam::Mat4;
use memchr::memchr;
use std::borrow::Cow;
use std::fmt;

use crate::error::Result;
use crate::reader::{ByteReader, read_f32_array};

/// Size of the fixed name buffer in bone and node records
pub const MAX_NAME_LENGTH: usize = 64;

/// A bone or node name decoded from a fixed 64-byte buffer
///
/// The stored name ends at the first NUL byte. A buffer with no NUL keeps
/// all 64 bytes. Bytes are kept as read, so names that are not valid UTF-8
/// survive a load/write cycle unchanged.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct FixedName {
    bytes: Vec<u8>,
}

impl FixedName {
    /// Build a name from a string, truncating it to fit the 64-byte buffer
    pub fn new(name: &str) -> Self {
        let name = match name.find('\0') {
            Some(end) => &name[..end],
            None => name,
        };
        let mut end = name.len().min(MAX_NAME_LENGTH);
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        Self {
            bytes: name.as_bytes()[..end].to_vec(),
        }
    }

    /// Decode a fixed name buffer
    pub fn from_raw(raw: &[u8; MAX_NAME_LENGTH]) -> Self {
        let end = memchr(0, raw).unwrap_or(MAX_NAME_LENGTH);
        Self {
            bytes: raw[..end].to_vec(),
        }
    }

    /// Read a 64-byte name buffer from a reader
    pub fn parse(reader: &mut impl ByteReader) -> Result<Self> {
        let raw = reader.read_array::<MAX_NAME_LENGTH>()?;
        Ok(Self::from_raw(&raw))
    }

    /// Encode into a NUL-padded buffer
    pub fn to_raw(&self) -> [u8; MAX_NAME_LENGTH] {
        let mut raw = [0u8; MAX_NAME_LENGTH];
        raw[..self.bytes.len()].copy_from_slice(&self.bytes);
        raw
    }

    /// The name bytes, without terminator or padding
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The name as text, replacing invalid UTF-8 sequences
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    /// Length of the name in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the name is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<&str> for FixedName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Debug for FixedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string_lossy())
    }
}

impl fmt::Display for FixedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for FixedName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_lossy())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for FixedName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::new(&name))
    }
}

/// Read a row-major 4x4 float matrix
pub fn read_row_major_mat4(reader: &mut impl ByteReader) -> Result<Mat4> {
    let rows = read_f32_array::<16>(reader)?;
    Ok(Mat4::from_cols_array(&rows).transpose())
}

/// Flatten a matrix into row-major order
pub fn mat4_to_row_major(matrix: &Mat4) -> [f32; 16] {
    matrix.transpose().to_cols_array()
}
