//! Bounds-checked little-endian byte reading
//!
//! Every read goes through [`Cursor`], which checks the remaining length
//! before touching the slice and reports the section it was reading when it
//! runs out of bytes.

use crate::error::{MdMeshError, Result, Section};

/// Trait for reading binary data from a byte slice
pub trait ByteReader {
    /// Read a single unsigned 16-bit integer in little-endian format
    fn read_u16_le(&mut self) -> Result<u16>;

    /// Read a single unsigned 32-bit integer in little-endian format
    fn read_u32_le(&mut self) -> Result<u32>;

    /// Read a single signed 32-bit integer in little-endian format
    fn read_i32_le(&mut self) -> Result<i32>;

    /// Read a single 32-bit float in little-endian format
    fn read_f32_le(&mut self) -> Result<f32>;

    /// Read exactly `N` bytes
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]>;
}

/// A cursor for reading binary data from a byte slice
pub struct Cursor<'a> {
    data: &'a [u8],
    position: usize,
    section: Section,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the beginning of the data
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            section: Section::Header,
        }
    }

    /// Current byte offset from the start of the buffer
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes left after the current position
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Section reported in truncation errors from now on
    pub fn enter(&mut self, section: Section) {
        self.section = section;
    }

    /// Fail unless at least `needed` bytes remain
    pub fn ensure(&self, needed: usize) -> Result<()> {
        if needed > self.remaining() {
            return Err(MdMeshError::TruncatedInput {
                section: self.section,
                offset: self.position,
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let bytes = &self.data[self.position..self.position + n];
        self.position += n;
        Ok(bytes)
    }
}

impl ByteReader for Cursor<'_> {
    fn read_u16_le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    fn read_u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    fn read_i32_le(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    fn read_f32_le(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }
}

/// Read `N` consecutive little-endian floats
pub fn read_f32_array<const N: usize>(reader: &mut impl ByteReader) -> Result<[f32; N]> {
    let mut values = [0.0f32; N];
    for value in &mut values {
        *value = reader.read_f32_le()?;
    }
    Ok(values)
}

/// Read `N` consecutive little-endian u32 values
pub fn read_u32_array<const N: usize>(reader: &mut impl ByteReader) -> Result<[u32; N]> {
    let mut values = [0u32; N];
    for value in &mut values {
        *value = reader.read_u32_le()?;
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_little_endian() {
        let data = [0x34, 0x12, 0xDD, 0xCC, 0xBB, 0xAA, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_u16_le().unwrap(), 0x1234);
        assert_eq!(cursor.read_u32_le().unwrap(), 0xAABB_CCDD);
        assert_eq!(cursor.read_i32_le().unwrap(), -1);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_short_read_reports_section() {
        let data = [0u8; 3];
        let mut cursor = Cursor::new(&data);
        cursor.enter(Section::Bones);
        match cursor.read_u32_le() {
            Err(MdMeshError::TruncatedInput {
                section,
                offset,
                needed,
                available,
            }) => {
                assert_eq!(section, Section::Bones);
                assert_eq!(offset, 0);
                assert_eq!(needed, 4);
                assert_eq!(available, 3);
            }
            other => panic!("expected truncation, got {other:?}"),
        }
        // A failed read does not advance the cursor
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_float_arrays() {
        let mut data = Vec::new();
        for v in [1.0f32, -2.5, 3.25] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let mut cursor = Cursor::new(&data);
        assert_eq!(read_f32_array::<3>(&mut cursor).unwrap(), [1.0, -2.5, 3.25]);
    }
}
