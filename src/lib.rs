//! Codec for the chunked/zlib envelope and engine-reflection property
//! system used by Remnant 2-style save files.
//!
//! [`SaveFile`] is the entry point: [`SaveFile::load`]/[`SaveFile::save`]
//! round-trip a file on disk, the `*_compressed`/`*_decompressed` pairs
//! operate on in-memory buffers at each envelope stage, and the
//! `persistence_blob*`/`replace_*` helpers reach into the nested document
//! that profile saves carry.

pub mod container;
pub mod document;
pub mod envelope;
pub mod error;
pub mod io;
pub mod memory;
pub mod names;
pub mod properties;

use document::SaveData;
use error::Result;
use io::{ByteReader, ByteWriter};
use memory::FileHeader;
use properties::{PropertyValue, StructPayload};
use std::fs;
use std::path::Path;

/// A fully parsed save file: the 16-byte file header plus the top-level
/// `SaveData` document that follows it (spec.md §3, §6).
#[derive(Debug, Clone, PartialEq)]
pub struct SaveFile {
    pub file_header: FileHeader,
    pub save_data: SaveData,
}

impl SaveFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let compressed = fs::read(path)?;
        Self::from_compressed(&compressed)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let compressed = self.to_compressed()?;
        fs::write(path, compressed)?;
        Ok(())
    }

    pub fn from_compressed(bytes: &[u8]) -> Result<Self> {
        let decompressed = envelope::decompress(bytes)?;
        Self::from_decompressed(&decompressed)
    }

    pub fn to_compressed(&self) -> Result<Vec<u8>> {
        envelope::compress(&self.to_decompressed()?)
    }

    /// Parse a decompressed document: the 16-byte `FileHeader`, then the
    /// top-level `SaveData` (both optional headers present, per
    /// `editor/model/save_file.py`'s `SaveData.read` defaults).
    pub fn from_decompressed(bytes: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(bytes);
        let file_header = FileHeader::read(&mut reader)?;
        let save_data = SaveData::read(&mut reader, true, true, 0, None)?;
        Ok(Self {
            file_header,
            save_data,
        })
    }

    /// Serialize back to a decompressed document, patching `decompressed_size`
    /// and `crc32` after the fact the way the reference producer does
    /// (envelope §2 overlap invariant).
    pub fn to_decompressed(&self) -> Result<Vec<u8>> {
        let mut writer = ByteWriter::new();
        FileHeader {
            crc32: 0,
            decompressed_size: 0,
            version: self.file_header.version,
            build_number: self.file_header.build_number,
        }
        .write(&mut writer);
        self.save_data.write(&mut writer, true, true, 0);

        let mut data = writer.finalize();
        let size = data.len() as i32;
        data[4..8].copy_from_slice(&size.to_le_bytes());
        envelope::update_crc32(&mut data);
        Ok(data)
    }

    pub fn names_table(&self) -> &[String] {
        &self.save_data.names_table
    }

    pub fn replace_name(&mut self, old: &str, new: &str) -> bool {
        match self.save_data.names_table.iter().position(|n| n == old) {
            Some(index) => {
                self.save_data.names_table[index] = new.to_string();
                true
            }
            None => false,
        }
    }

    /// Find the `PersistenceBlob` struct property nested somewhere in the
    /// top-level document's objects, profile-variant only
    /// (`editor/model/save_file.py`'s `get_persistence_blob`).
    pub fn persistence_blob(&self) -> Option<&SaveData> {
        find_persistence_blob(&self.save_data).and_then(|blob| match blob {
            properties::PersistenceBlob::Profile(save_data) => Some(save_data.as_ref()),
            properties::PersistenceBlob::World(_) => None,
        })
    }

    pub fn persistence_blob_mut(&mut self) -> Option<&mut SaveData> {
        find_persistence_blob_mut(&mut self.save_data).and_then(|blob| match blob {
            properties::PersistenceBlob::Profile(save_data) => Some(save_data.as_mut()),
            properties::PersistenceBlob::World(_) => None,
        })
    }

    pub fn persistence_blob_inner_names_table(&self) -> Option<&[String]> {
        self.persistence_blob().map(|inner| inner.names_table.as_slice())
    }

    pub fn replace_inner_name(&mut self, old: &str, new: &str) -> bool {
        let Some(inner) = self.persistence_blob_mut() else {
            return false;
        };
        match inner.names_table.iter().position(|n| n == old) {
            Some(index) => {
                inner.names_table[index] = new.to_string();
                true
            }
            None => false,
        }
    }
}

fn find_persistence_blob(save_data: &SaveData) -> Option<&properties::PersistenceBlob> {
    for object in &save_data.objects {
        let Some(properties) = &object.properties else {
            continue;
        };
        for property in &properties.properties {
            if let PropertyValue::Struct(struct_value) = &property.value {
                if let StructPayload::PersistenceBlob(blob) = &struct_value.payload {
                    return Some(blob);
                }
            }
        }
    }
    None
}

fn find_persistence_blob_mut(save_data: &mut SaveData) -> Option<&mut properties::PersistenceBlob> {
    for object in &mut save_data.objects {
        let Some(properties) = &mut object.properties else {
            continue;
        };
        for property in &mut properties.properties {
            if let PropertyValue::Struct(struct_value) = &mut property.value {
                if let StructPayload::PersistenceBlob(blob) = &mut struct_value.payload {
                    return Some(blob);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::UObject;
    use crate::properties::PropertyBag;

    fn empty_save_file() -> SaveFile {
        SaveFile {
            file_header: FileHeader {
                crc32: 0,
                decompressed_size: 0,
                version: 1,
                build_number: 100,
            },
            save_data: SaveData {
                package_version: Some(memory::PackageVersion {
                    ue_version: 5,
                    ue_licensee_version: 0,
                }),
                save_game_class_path: None,
                version: 1,
                objects: vec![UObject {
                    was_loaded: 1,
                    object_path: Some("/Game/Foo.Foo_C".to_string()),
                    loaded_data: None,
                    object_index: 0,
                    properties: Some(PropertyBag::default()),
                    extra_properties_data: None,
                    is_actor: 0,
                    components: None,
                }],
                names_table: vec!["None".to_string()],
            },
        }
    }

    #[test]
    fn decompressed_round_trip_preserves_document() {
        let save_file = empty_save_file();
        let bytes = save_file.to_decompressed().unwrap();
        let round_tripped = SaveFile::from_decompressed(&bytes).unwrap();

        assert_eq!(round_tripped.save_data.objects.len(), 1);
        assert_eq!(round_tripped.file_header.version, 1);
        assert_eq!(round_tripped.file_header.build_number, 100);
    }

    #[test]
    fn compressed_round_trip_preserves_document() {
        let save_file = empty_save_file();
        let compressed = save_file.to_compressed().unwrap();
        let round_tripped = SaveFile::from_compressed(&compressed).unwrap();

        assert_eq!(round_tripped.names_table(), save_file.names_table());
    }

    #[test]
    fn save_then_load_round_trips_through_a_real_file() {
        let save_file = empty_save_file();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.sav");

        save_file.save(&path).unwrap();
        let loaded = SaveFile::load(&path).unwrap();

        assert_eq!(loaded.save_data, save_file.save_data);
        assert_eq!(loaded.file_header.version, save_file.file_header.version);
        assert_eq!(
            loaded.file_header.build_number,
            save_file.file_header.build_number
        );
    }

    #[test]
    fn replace_name_updates_table_entry() {
        let mut save_file = empty_save_file();
        assert!(save_file.replace_name("None", "Renamed"));
        assert_eq!(save_file.names_table(), &["Renamed".to_string()]);
        assert!(!save_file.replace_name("DoesNotExist", "Whatever"));
    }

    #[test]
    fn persistence_blob_absent_without_a_struct_property() {
        let save_file = empty_save_file();
        assert!(save_file.persistence_blob().is_none());
        assert!(save_file.persistence_blob_inner_names_table().is_none());
    }
}
