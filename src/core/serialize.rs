// Serialization helpers for the genesis layouts
//
// Script lengths are either a raw byte (devtools layout, refuses anything over
// 255) or a CompactSize integer as the node writes them.

use crate::error::{GenesisError, Result};

/// Encoding of the length in front of a script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthPrefix {
    /// One raw byte
    Byte,
    /// CompactSize: 1, 3, 5 or 9 bytes
    CompactSize,
}

impl LengthPrefix {
    /// Write `data` preceded by its length
    pub fn write(self, buf: &mut Vec<u8>, data: &[u8], what: &str) -> Result<()> {
        match self {
            LengthPrefix::Byte => write_u8_prefixed(buf, data, what),
            LengthPrefix::CompactSize => {
                write_varint(buf, data.len() as u64);
                buf.extend_from_slice(data);
                Ok(())
            }
        }
    }
}

/// Write bytes with a single-byte length prefix
pub fn write_u8_prefixed(buf: &mut Vec<u8>, data: &[u8], what: &str) -> Result<()> {
    let len = u8::try_from(data.len()).map_err(|_| {
        GenesisError::invalid(format!("{} is {} bytes, limit is 255", what, data.len()))
    })?;
    buf.push(len);
    buf.extend_from_slice(data);
    Ok(())
}

/// Write a variable-length integer (CompactSize)
pub fn write_varint(buf: &mut Vec<u8>, value: u64) {
    match value {
        0..=0xfc => buf.push(value as u8),
        0xfd..=0xffff => {
            buf.push(0xfd);
            buf.extend_from_slice(&(value as u16).to_le_bytes());
        }
        0x10000..=0xffffffff => {
            buf.push(0xfe);
            buf.extend_from_slice(&(value as u32).to_le_bytes());
        }
        _ => {
            buf.push(0xff);
            buf.extend_from_slice(&value.to_le_bytes());
        }
    }
}

/// Cursor over a byte slice with little-endian readers
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Read exactly `len` bytes
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(GenesisError::invalid(format!(
                "Unexpected end of data at offset {}: need {} bytes, have {}",
                self.pos,
                len,
                self.remaining()
            )));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32_le(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Read bytes with a single-byte length prefix
    pub fn read_u8_prefixed(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u8()? as usize;
        self.take(len)
    }

    /// Read a CompactSize integer, rejecting non-minimal encodings
    pub fn read_varint(&mut self) -> Result<u64> {
        let (value, min) = match self.read_u8()? {
            0xfd => (u64::from(u16::from_le_bytes(self.read_array()?)), 0xfd),
            0xfe => (u64::from(self.read_u32_le()?), 0x10000),
            0xff => (self.read_u64_le()?, 0x1_0000_0000),
            byte => return Ok(u64::from(byte)),
        };
        if value < min {
            return Err(GenesisError::invalid(format!(
                "Non-canonical CompactSize {} at offset {}",
                value, self.pos
            )));
        }
        Ok(value)
    }

    /// Read bytes preceded by a length in the given encoding
    pub fn read_prefixed(&mut self, prefix: LengthPrefix) -> Result<&'a [u8]> {
        match prefix {
            LengthPrefix::Byte => self.read_u8_prefixed(),
            LengthPrefix::CompactSize => {
                let len = usize::try_from(self.read_varint()?)
                    .map_err(|_| GenesisError::invalid("Length does not fit in memory"))?;
                self.take(len)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u8_prefixed_roundtrip() {
        let mut buf = Vec::new();
        write_u8_prefixed(&mut buf, b"hello world", "test").unwrap();
        assert_eq!(buf[0], 11);

        let mut reader = Reader::new(&buf);
        assert_eq!(reader.read_u8_prefixed().unwrap(), b"hello world");
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_u8_prefixed_limit() {
        let mut buf = Vec::new();
        assert!(write_u8_prefixed(&mut buf, &[0u8; 255], "max").is_ok());

        let err = write_u8_prefixed(&mut buf, &[0u8; 256], "message").unwrap_err();
        assert!(matches!(err, GenesisError::InvalidParameter(_)));
    }

    #[test]
    fn test_varint_boundaries() {
        let mut buf = Vec::new();
        write_varint(&mut buf, 252);
        assert_eq!(buf, vec![0xfc]);

        let mut buf = Vec::new();
        write_varint(&mut buf, 253);
        assert_eq!(buf, vec![0xfd, 0xfd, 0x00]);

        let mut buf = Vec::new();
        write_varint(&mut buf, 0x10000);
        assert_eq!(buf, vec![0xfe, 0x00, 0x00, 0x01, 0x00]);

        for value in [0u64, 252, 253, 0xffff, 0x10000, u64::MAX] {
            let mut buf = Vec::new();
            write_varint(&mut buf, value);
            assert_eq!(Reader::new(&buf).read_varint().unwrap(), value);
        }
    }

    #[test]
    fn test_varint_non_canonical_rejected() {
        assert!(Reader::new(&[0xfd, 0x10, 0x00]).read_varint().is_err());
        assert!(Reader::new(&[0xfe, 0xff, 0x00, 0x00, 0x00]).read_varint().is_err());
    }

    #[test]
    fn test_length_prefix_encodings() {
        let data = [0xaa; 253];

        let mut byte = Vec::new();
        LengthPrefix::Byte.write(&mut byte, &data, "script").unwrap();
        assert_eq!(byte[0], 0xfd);
        assert_eq!(byte.len(), 254);

        let mut compact = Vec::new();
        LengthPrefix::CompactSize.write(&mut compact, &data, "script").unwrap();
        assert_eq!(&compact[..3], &[0xfd, 0xfd, 0x00]);
        assert_eq!(compact.len(), 256);

        let mut reader = Reader::new(&compact);
        assert_eq!(reader.read_prefixed(LengthPrefix::CompactSize).unwrap(), &data[..]);
        assert_eq!(reader.remaining(), 0);

        // A raw byte has no room for 256
        let mut buf = Vec::new();
        assert!(LengthPrefix::Byte.write(&mut buf, &[0u8; 256], "script").is_err());
        assert!(LengthPrefix::CompactSize.write(&mut buf, &[0u8; 256], "script").is_ok());
    }

    #[test]
    fn test_reader_little_endian() {
        let data = [0xff, 0xff, 0x00, 0x1d, 0x01];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read_u32_le().unwrap(), 0x1d00ffff);
        assert_eq!(reader.read_u8().unwrap(), 1);
        assert_eq!(reader.position(), 5);
    }

    #[test]
    fn test_reader_short_input() {
        let mut reader = Reader::new(&[1, 2, 3]);
        assert!(reader.read_u32_le().is_err());
    }
}
