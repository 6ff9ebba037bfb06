use crate::error::{Error, Result};
use byteorder::{ReadBytesExt, LE};
use std::io::Cursor;

/// Binary reader with position tracking and little-endian support.
///
/// Wraps a borrowed slice rather than copying it; every read advances
/// `position()` and fails with [`Error::OutOfBounds`] instead of panicking
/// or silently truncating.
pub struct ByteReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(data),
        }
    }

    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    /// Seek to an absolute position. Used constantly to jump between the
    /// object-data region and the names/objects tables named by `OffsetInfo`.
    pub fn set_position(&mut self, pos: usize) -> Result<()> {
        if pos > self.size() {
            return Err(Error::OutOfBounds {
                position: pos,
                requested: 0,
                available: self.size(),
            });
        }
        self.cursor.set_position(pos as u64);
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.cursor.get_ref().len()
    }

    pub fn remaining(&self) -> usize {
        self.size() - self.position()
    }

    fn require(&self, count: usize) -> Result<()> {
        if count > self.remaining() {
            return Err(Error::OutOfBounds {
                position: self.position(),
                requested: count,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        self.require(count)?;
        let start = self.position();
        let slice = &self.cursor.get_ref()[start..start + count];
        self.cursor.set_position((start + count) as u64);
        Ok(slice)
    }

    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        self.require(count)?;
        let start = self.position();
        Ok(&self.cursor.get_ref()[start..start + count])
    }

    pub fn peek_u32(&self) -> Result<u32> {
        let bytes = self.peek_bytes(4)?;
        Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
    }

    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.require(count)?;
        self.cursor.set_position((self.position() + count) as u64);
        Ok(())
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.require(1)?;
        Ok(self.cursor.read_i8()?)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.require(1)?;
        Ok(self.cursor.read_u8()?)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.require(2)?;
        Ok(self.cursor.read_i16::<LE>()?)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.require(2)?;
        Ok(self.cursor.read_u16::<LE>()?)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.require(4)?;
        Ok(self.cursor.read_i32::<LE>()?)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.require(4)?;
        Ok(self.cursor.read_u32::<LE>()?)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.require(8)?;
        Ok(self.cursor.read_i64::<LE>()?)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        self.require(8)?;
        Ok(self.cursor.read_u64::<LE>()?)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        self.require(4)?;
        Ok(self.cursor.read_f32::<LE>()?)
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        self.require(8)?;
        Ok(self.cursor.read_f64::<LE>()?)
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_primitives() {
        let data = [0x01, 0x02, 0x03, 0x04, 0xFF];
        let mut r = ByteReader::new(&data);
        assert_eq!(r.read_u16().unwrap(), 0x0201);
        assert_eq!(r.read_u16().unwrap(), 0x0403);
        assert_eq!(r.read_u8().unwrap(), 0xFF);
    }

    #[test]
    fn out_of_bounds_read_fails() {
        let data = [0u8; 2];
        let mut r = ByteReader::new(&data);
        assert!(matches!(r.read_u32(), Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn seek_then_read_round_trips() {
        let data = [0xAA, 0xBB, 0xCC, 0xDD];
        let mut r = ByteReader::new(&data);
        r.set_position(2).unwrap();
        assert_eq!(r.read_u8().unwrap(), 0xCC);
        r.set_position(0).unwrap();
        assert_eq!(r.read_u8().unwrap(), 0xAA);
    }
}
