//! Fixed-size memory structures: GUIDs, vectors, transforms, and the
//! document-level header/offset records built from them.

use crate::error::Result;
use crate::io::{ByteReader, ByteWriter};
use crate::names::{read_fstring, write_fstring};

/// 20-byte record giving the absolute positions of the names and objects
/// tables within a `SaveData`, plus a version tag. Written last, pointed at
/// first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetInfo {
    pub names: i64,
    pub version: u32,
    pub objects: i64,
}

impl OffsetInfo {
    pub const SIZE: usize = 20;

    pub fn read(reader: &mut ByteReader) -> Result<Self> {
        Ok(Self {
            names: reader.read_i64()?,
            version: reader.read_u32()?,
            objects: reader.read_i64()?,
        })
    }

    pub fn write(&self, writer: &mut ByteWriter) {
        writer.write_i64(self.names);
        writer.write_u32(self.version);
        writer.write_i64(self.objects);
    }
}

/// 16-byte header at the start of a decompressed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub crc32: u32,
    pub decompressed_size: i32,
    pub version: i32,
    pub build_number: i32,
}

impl FileHeader {
    pub const SIZE: usize = 16;

    pub fn read(reader: &mut ByteReader) -> Result<Self> {
        Ok(Self {
            crc32: reader.read_u32()?,
            decompressed_size: reader.read_i32()?,
            version: reader.read_i32()?,
            build_number: reader.read_i32()?,
        })
    }

    pub fn write(&self, writer: &mut ByteWriter) {
        writer.write_u32(self.crc32);
        writer.write_i32(self.decompressed_size);
        writer.write_i32(self.version);
        writer.write_i32(self.build_number);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FGuid {
    pub a: u32,
    pub b: u32,
    pub c: u32,
    pub d: u32,
}

impl FGuid {
    pub const SIZE: usize = 16;

    pub fn read(reader: &mut ByteReader) -> Result<Self> {
        Ok(Self {
            a: reader.read_u32()?,
            b: reader.read_u32()?,
            c: reader.read_u32()?,
            d: reader.read_u32()?,
        })
    }

    pub fn write(&self, writer: &mut ByteWriter) {
        writer.write_u32(self.a);
        writer.write_u32(self.b);
        writer.write_u32(self.c);
        writer.write_u32(self.d);
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackageVersion {
    pub ue_version: i32,
    pub ue_licensee_version: i32,
}

impl PackageVersion {
    pub const SIZE: usize = 8;

    pub fn read(reader: &mut ByteReader) -> Result<Self> {
        Ok(Self {
            ue_version: reader.read_i32()?,
            ue_licensee_version: reader.read_i32()?,
        })
    }

    pub fn write(&self, writer: &mut ByteWriter) {
        writer.write_i32(self.ue_version);
        writer.write_i32(self.ue_licensee_version);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FTopLevelAssetPath {
    pub package_name: Option<String>,
    pub asset_name: Option<String>,
}

impl FTopLevelAssetPath {
    pub fn read(reader: &mut ByteReader) -> Result<Self> {
        Ok(Self {
            package_name: read_fstring(reader)?,
            asset_name: read_fstring(reader)?,
        })
    }

    pub fn write(&self, writer: &mut ByteWriter) {
        write_fstring(writer, self.package_name.as_deref());
        write_fstring(writer, self.asset_name.as_deref());
    }

    pub fn path(&self) -> Option<&str> {
        self.package_name.as_deref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl FVector {
    pub const SIZE: usize = 24;

    pub fn read(reader: &mut ByteReader) -> Result<Self> {
        Ok(Self {
            x: reader.read_f64()?,
            y: reader.read_f64()?,
            z: reader.read_f64()?,
        })
    }

    pub fn write(&self, writer: &mut ByteWriter) {
        writer.write_f64(self.x);
        writer.write_f64(self.y);
        writer.write_f64(self.z);
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0 }
    }

    pub fn one() -> Self {
        Self { x: 1.0, y: 1.0, z: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FQuaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl FQuaternion {
    pub const SIZE: usize = 32;

    pub fn read(reader: &mut ByteReader) -> Result<Self> {
        Ok(Self {
            x: reader.read_f64()?,
            y: reader.read_f64()?,
            z: reader.read_f64()?,
            w: reader.read_f64()?,
        })
    }

    pub fn write(&self, writer: &mut ByteWriter) {
        writer.write_f64(self.x);
        writer.write_f64(self.y);
        writer.write_f64(self.z);
        writer.write_f64(self.w);
    }

    pub fn identity() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FRotator {
    pub pitch: f64,
    pub roll: f64,
    pub yaw: f64,
}

impl FRotator {
    pub const SIZE: usize = 24;

    pub fn read(reader: &mut ByteReader) -> Result<Self> {
        Ok(Self {
            pitch: reader.read_f64()?,
            roll: reader.read_f64()?,
            yaw: reader.read_f64()?,
        })
    }

    pub fn write(&self, writer: &mut ByteWriter) {
        writer.write_f64(self.pitch);
        writer.write_f64(self.roll);
        writer.write_f64(self.yaw);
    }
}

/// Rotation + position + scale, 88 bytes total. Not named in spec.md's
/// glossary but required to build `FTransform` (see SPEC_FULL.md §3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FTransform {
    pub rotation: FQuaternion,
    pub position: FVector,
    pub scale: FVector,
}

impl FTransform {
    pub const SIZE: usize = 88;

    pub fn read(reader: &mut ByteReader) -> Result<Self> {
        Ok(Self {
            rotation: FQuaternion::read(reader)?,
            position: FVector::read(reader)?,
            scale: FVector::read(reader)?,
        })
    }

    pub fn write(&self, writer: &mut ByteWriter) {
        self.rotation.write(writer);
        self.position.write(writer);
        self.scale.write(writer);
    }

    pub fn identity() -> Self {
        Self {
            rotation: FQuaternion::identity(),
            position: FVector::zero(),
            scale: FVector::one(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_info_round_trips() {
        let oi = OffsetInfo { names: 1234, version: 2, objects: 56 };
        let mut w = ByteWriter::new();
        oi.write(&mut w);
        let bytes = w.finalize();
        let mut r = ByteReader::new(&bytes);
        assert_eq!(OffsetInfo::read(&mut r).unwrap(), oi);
    }

    #[test]
    fn transform_identity_round_trips() {
        let t = FTransform::identity();
        let mut w = ByteWriter::new();
        t.write(&mut w);
        let bytes = w.finalize();
        assert_eq!(bytes.len(), FTransform::SIZE);
        let mut r = ByteReader::new(&bytes);
        assert_eq!(FTransform::read(&mut r).unwrap(), t);
    }
}
