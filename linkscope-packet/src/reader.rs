//! Bounds-checked cursor over untrusted bytes
//!
//! Every read checks the remaining length first and fails with
//! [`Error::Malformed`] instead of slicing out of range.

use linkscope_core::{Error, MacAddr, Result};

/// Forward-only reader over a byte slice
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Unread bytes, without consuming them
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Consume exactly `n` bytes
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(Error::malformed(format!(
                "need {} bytes at offset {}, only {} left",
                n,
                self.pos,
                self.remaining()
            )));
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_mac(&mut self) -> Result<MacAddr> {
        Ok(MacAddr::new(self.read_array()?))
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// Split off a sub-reader over the next `n` bytes
    pub fn sub_reader(&mut self, n: usize) -> Result<ByteReader<'a>> {
        Ok(ByteReader::new(self.read_bytes(n)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_reads() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.read_u8().unwrap(), 0x01);
        assert_eq!(reader.read_u16().unwrap(), 0x0203);
        assert_eq!(reader.read_u32().unwrap(), 0x0405_0607);
        assert_eq!(reader.position(), 7);
        assert_eq!(reader.remaining(), 1);
        assert_eq!(reader.rest(), &[0x08]);
    }

    #[test]
    fn test_short_reads_fail_without_consuming() {
        let data = [0xAA, 0xBB, 0xCC];
        let mut reader = ByteReader::new(&data);

        assert!(reader.read_u32().unwrap_err().is_malformed());
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.read_u16().unwrap(), 0xAABB);
        assert!(reader.read_u16().is_err());
        assert!(reader.skip(2).is_err());
        assert_eq!(reader.read_u8().unwrap(), 0xCC);
        assert!(reader.is_empty());
        assert!(reader.read_u8().is_err());
        assert_eq!(reader.read_bytes(0).unwrap(), &[] as &[u8]);
    }

    #[test]
    fn test_read_mac_and_sub_reader() {
        let data = [0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x09, 0x08];
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.read_mac().unwrap().to_string(), "00:11:22:33:44:55");

        let mut sub = reader.sub_reader(1).unwrap();
        assert_eq!(sub.read_u8().unwrap(), 0x09);
        assert!(sub.read_u8().is_err());
        assert_eq!(reader.read_u8().unwrap(), 0x08);
        assert!(reader.sub_reader(1).is_err());
    }
}
