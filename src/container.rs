//! `PersistenceContainer`: the actor index, dynamic-data table, and
//! destroyed-id list nested inside a world save's `PersistenceBlob`
//! (spec layer L5).
//!
//! Grounded on `editor/model/persistence.py`'s `PersistenceContainer`/
//! `Actor`, including the two-pass backpatched writer that measures each
//! actor's serialized size via a throwaway buffer before emitting the
//! index table.

use crate::document::SaveData;
use crate::error::Result;
use crate::io::{ByteReader, ByteWriter};
use crate::memory::FTransform;
use crate::names::read_fstring;
use crate::names::write_fstring;

/// `unique_id -> (offset, size)` entry in the container's actor index,
/// addressed in the container's local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FInfo {
    pub unique_id: u64,
    pub offset: i32,
    pub size: i32,
}

impl FInfo {
    fn read(reader: &mut ByteReader) -> Result<Self> {
        Ok(Self {
            unique_id: reader.read_u64()?,
            offset: reader.read_i32()?,
            size: reader.read_i32()?,
        })
    }

    fn write(&self, writer: &mut ByteWriter) {
        writer.write_u64(self.unique_id);
        writer.write_i32(self.offset);
        writer.write_i32(self.size);
    }
}

/// Per-actor transform and class path, matched back to an [`Actor`] by
/// `unique_id` after the main index table is read.
#[derive(Debug, Clone, PartialEq)]
pub struct ActorDynamicData {
    pub unique_id: u64,
    pub transform: FTransform,
    pub class_path: Option<String>,
}

impl ActorDynamicData {
    fn read(reader: &mut ByteReader) -> Result<Self> {
        Ok(Self {
            unique_id: reader.read_u64()?,
            transform: FTransform::read(reader)?,
            class_path: read_fstring(reader)?,
        })
    }

    fn write(&self, writer: &mut ByteWriter) {
        writer.write_u64(self.unique_id);
        self.transform.write(writer);
        write_fstring(writer, self.class_path.as_deref());
    }
}

/// An actor entry: an optional transform, the actor's own nested
/// `SaveData` archive (no package version, no top-level asset path per
/// spec.md §3), and — once matched — its dynamic data.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub has_transform: u32,
    pub transform: Option<FTransform>,
    pub archive: SaveData,
    pub dynamic_data: Option<ActorDynamicData>,
}

impl Actor {
    fn read(reader: &mut ByteReader, container_offset: i64) -> Result<Self> {
        let has_transform = reader.read_u32()?;
        let transform = if has_transform != 0 {
            Some(FTransform::read(reader)?)
        } else {
            None
        };

        let archive = SaveData::read(reader, false, false, container_offset, None)?;

        Ok(Self {
            has_transform,
            transform,
            archive,
            dynamic_data: None,
        })
    }

    /// Writes everything but `dynamic_data`, which lives in the container's
    /// separate dynamic-data section.
    fn write_non_dynamic(&self, writer: &mut ByteWriter, container_offset: i64) {
        writer.write_u32(self.has_transform);
        if self.has_transform != 0 {
            if let Some(transform) = &self.transform {
                transform.write(writer);
            }
        }
        self.archive.write(writer, false, false, container_offset);
    }
}

/// An indexed collection of actors, plus a destroyed-id list (spec.md §3).
#[derive(Debug, Clone, PartialEq)]
pub struct PersistenceContainer {
    pub version: u32,
    pub destroyed: Vec<u64>,
    pub actors: Vec<(u64, Actor)>,
}

impl PersistenceContainer {
    pub fn read(reader: &mut ByteReader, container_offset: i64) -> Result<Self> {
        let version = reader.read_u32()?;
        let index_offset = reader.read_i32()?;
        let dynamic_offset = reader.read_i32()?;

        reader.set_position(index_offset as usize)?;
        let info_count = reader.read_u32()?;
        let mut actor_info = Vec::with_capacity(info_count as usize);
        for _ in 0..info_count {
            actor_info.push(FInfo::read(reader)?);
        }

        let destroyed_count = reader.read_u32()?;
        let mut destroyed = Vec::with_capacity(destroyed_count as usize);
        for _ in 0..destroyed_count {
            destroyed.push(reader.read_u64()?);
        }

        let mut actors = Vec::with_capacity(actor_info.len());
        for info in &actor_info {
            reader.set_position(info.offset as usize)?;
            let actor_bytes = reader.read_bytes(info.size.max(0) as usize)?;
            let mut actor_reader = ByteReader::new(actor_bytes);
            let actor = Actor::read(&mut actor_reader, info.offset as i64 + container_offset)?;
            actors.push((info.unique_id, actor));
        }

        reader.set_position(dynamic_offset as usize)?;
        let dynamic_count = reader.read_u32()?;
        for _ in 0..dynamic_count {
            let dynamic_data = ActorDynamicData::read(reader)?;
            if let Some((_, actor)) = actors.iter_mut().find(|(id, _)| *id == dynamic_data.unique_id) {
                actor.dynamic_data = Some(dynamic_data);
            }
        }

        Ok(Self {
            version,
            destroyed,
            actors,
        })
    }

    /// Two-pass write: each actor is first serialized into a throwaway
    /// buffer to measure its exact size, then appended to the main stream
    /// so the index table's `FInfo.size` is known up front (spec.md §4.5).
    pub fn write(&self, writer: &mut ByteWriter) {
        writer.write_u32(self.version);

        let patch_offset = writer.position();
        writer.write_i32(0); // index_offset placeholder
        writer.write_i32(0); // dynamic_offset placeholder

        let mut actor_info = Vec::with_capacity(self.actors.len());
        for (unique_id, actor) in &self.actors {
            let mut actor_writer = ByteWriter::new();
            actor.write_non_dynamic(&mut actor_writer, writer.position() as i64);
            let actor_bytes = actor_writer.finalize();

            actor_info.push(FInfo {
                unique_id: *unique_id,
                offset: writer.position() as i32,
                size: actor_bytes.len() as i32,
            });
            writer.write_bytes(&actor_bytes);
        }

        let dynamic_offset = writer.position();
        let dynamic_count = self.actors.iter().filter(|(_, a)| a.dynamic_data.is_some()).count();
        writer.write_u32(dynamic_count as u32);
        for (_, actor) in &self.actors {
            if let Some(dynamic_data) = &actor.dynamic_data {
                dynamic_data.write(writer);
            }
        }

        let index_offset = writer.position();
        writer.write_u32(actor_info.len() as u32);
        for info in &actor_info {
            info.write(writer);
        }

        writer.write_u32(self.destroyed.len() as u32);
        for id in &self.destroyed {
            writer.write_u64(*id);
        }

        let end_position = writer.position();
        writer.set_position(patch_offset);
        writer.write_i32(index_offset as i32);
        writer.write_i32(dynamic_offset as i32);
        writer.set_position(end_position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::UObject;
    use crate::properties::PropertyBag;

    fn empty_archive() -> SaveData {
        SaveData {
            package_version: None,
            save_game_class_path: None,
            version: 0,
            objects: vec![UObject {
                was_loaded: 0,
                object_path: None,
                loaded_data: Some(crate::document::UObjectLoadedData {
                    name: crate::names::FName::new("Root"),
                    outer_id: 0,
                }),
                object_index: 0,
                properties: Some(PropertyBag::default()),
                extra_properties_data: None,
                is_actor: 0,
                components: None,
            }],
            names_table: vec!["None".to_string(), "Root".to_string()],
        }
    }

    fn sample_container() -> PersistenceContainer {
        PersistenceContainer {
            version: 3,
            destroyed: vec![111, 222],
            actors: vec![
                (
                    1,
                    Actor {
                        has_transform: 1,
                        transform: Some(FTransform::identity()),
                        archive: empty_archive(),
                        dynamic_data: Some(ActorDynamicData {
                            unique_id: 1,
                            transform: FTransform::identity(),
                            class_path: Some("/Game/Actors/Foo.Foo_C".to_string()),
                        }),
                    },
                ),
                (
                    2,
                    Actor {
                        has_transform: 0,
                        transform: None,
                        archive: empty_archive(),
                        dynamic_data: None,
                    },
                ),
            ],
        }
    }

    #[test]
    fn container_offsets_are_recoverable() {
        let container = sample_container();
        let mut w = ByteWriter::new();
        container.write(&mut w);
        let bytes = w.finalize();

        let mut r = ByteReader::new(&bytes);
        let round_tripped = PersistenceContainer::read(&mut r, 0).unwrap();

        assert_eq!(round_tripped.version, 3);
        assert_eq!(round_tripped.destroyed, vec![111, 222]);
        assert_eq!(round_tripped.actors.len(), 2);
        assert_eq!(round_tripped.actors[0].0, 1);
        assert!(round_tripped.actors[0].1.dynamic_data.is_some());
        assert!(round_tripped.actors[1].1.dynamic_data.is_none());
    }

    #[test]
    fn each_info_offset_parses_a_valid_actor() {
        let container = sample_container();
        let mut w = ByteWriter::new();
        container.write(&mut w);
        let bytes = w.finalize();

        let mut r = ByteReader::new(&bytes);
        r.set_position(4).unwrap(); // skip version
        let index_offset = r.read_i32().unwrap();
        let dynamic_offset = r.read_i32().unwrap();
        assert!(index_offset > 0);
        assert!(dynamic_offset > 0);

        r.set_position(index_offset as usize).unwrap();
        let count = r.read_u32().unwrap();
        assert_eq!(count, 2);
        for _ in 0..count {
            let info = FInfo::read(&mut r).unwrap();
            let mut probe = ByteReader::new(&bytes);
            probe.set_position(info.offset as usize).unwrap();
            let actor_bytes = probe.read_bytes(info.size as usize).unwrap();
            let mut actor_reader = ByteReader::new(actor_bytes);
            Actor::read(&mut actor_reader, 0).unwrap();
        }
    }
}
