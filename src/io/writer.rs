use byteorder::{WriteBytesExt, LE};
use std::io::{Cursor, Write};

/// Binary writer with seekable backpatching.
///
/// Backed by `Cursor<Vec<u8>>`: writing at an earlier position overwrites
/// the bytes already there without truncating anything written after it,
/// which is exactly what the two-pass `OffsetInfo`/`PersistenceContainer`
/// writers in spec layer L5 need.
#[derive(Default)]
pub struct ByteWriter {
    cursor: Cursor<Vec<u8>>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    pub fn set_position(&mut self, pos: usize) {
        self.cursor.set_position(pos as u64);
    }

    /// Current total length of the buffer, independent of the write cursor.
    pub fn size(&self) -> usize {
        self.cursor.get_ref().len()
    }

    pub fn finalize(self) -> Vec<u8> {
        self.cursor.into_inner()
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.cursor.write_all(data).expect("in-memory write");
    }

    pub fn write_zeros(&mut self, count: usize) {
        self.write_bytes(&vec![0u8; count]);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.cursor.write_i8(value).expect("in-memory write");
    }

    pub fn write_u8(&mut self, value: u8) {
        self.cursor.write_u8(value).expect("in-memory write");
    }

    pub fn write_i16(&mut self, value: i16) {
        self.cursor.write_i16::<LE>(value).expect("in-memory write");
    }

    pub fn write_u16(&mut self, value: u16) {
        self.cursor.write_u16::<LE>(value).expect("in-memory write");
    }

    pub fn write_i32(&mut self, value: i32) {
        self.cursor.write_i32::<LE>(value).expect("in-memory write");
    }

    pub fn write_u32(&mut self, value: u32) {
        self.cursor.write_u32::<LE>(value).expect("in-memory write");
    }

    pub fn write_i64(&mut self, value: i64) {
        self.cursor.write_i64::<LE>(value).expect("in-memory write");
    }

    pub fn write_u64(&mut self, value: u64) {
        self.cursor.write_u64::<LE>(value).expect("in-memory write");
    }

    pub fn write_f32(&mut self, value: f32) {
        self.cursor.write_f32::<LE>(value).expect("in-memory write");
    }

    pub fn write_f64(&mut self, value: f64) {
        self.cursor.write_f64::<LE>(value).expect("in-memory write");
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backpatch_does_not_truncate_tail() {
        let mut w = ByteWriter::new();
        w.write_u32(0); // placeholder
        w.write_u32(0xDEADBEEF);
        w.set_position(0);
        w.write_u32(0x11223344);
        let bytes = w.finalize();
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[0..4], &0x11223344u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &0xDEADBEEFu32.to_le_bytes());
    }

    #[test]
    fn writes_little_endian() {
        let mut w = ByteWriter::new();
        w.write_u16(0x0201);
        assert_eq!(w.finalize(), vec![0x01, 0x02]);
    }
}
