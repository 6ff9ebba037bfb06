//! The save document proper (spec layer L5): `SaveData`, its object table,
//! and the components/variables nested inside each actor object.
//!
//! Grounded on `editor/model/save_data.py` and `editor/model/uobject.py`,
//! which this module follows near line-for-line in the two-pass
//! backpatched write and the header/data split on read.

use crate::error::{Error, Result};
use crate::io::{ByteReader, ByteWriter};
use crate::memory::{FTopLevelAssetPath, OffsetInfo, PackageVersion};
use crate::names::{read_fstring, write_fstring, Context, FName};
use crate::properties::PropertyBag;

/// The class path identifying the "profile" `PersistenceBlob` variant
/// (spec.md §4.4, §9). No literal value for this appears anywhere in the
/// retrieved reference material; exposed as an overridable constant rather
/// than baked silently into the dispatch so callers targeting a different
/// profile asset naming convention aren't stuck forking the crate. See
/// DESIGN.md for the Open Question this resolves.
pub const PROFILE_CLASS_PATH: &str = "/Game/Character/_Core/Blueprints/BP_ProfileSaveGame.BP_ProfileSaveGame_C";

/// The four variable kinds `Variable` can carry (distinct from the full
/// property-kind enum: this is a compact sub-language used only inside
/// `Variables` components).
#[derive(Debug, Clone, PartialEq)]
pub enum VariableValue {
    None,
    Bool(u32),
    Int(u32),
    Float(f32),
    Name(FName),
}

const VAR_TYPE_NAMES: [&str; 5] = [
    "None",
    "BoolProperty",
    "IntProperty",
    "FloatProperty",
    "NameProperty",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: FName,
    pub value: VariableValue,
}

impl Variable {
    fn read(reader: &mut ByteReader, ctx: &mut Context) -> Result<Self> {
        let name = FName::read(reader, &ctx.names)?;
        if name.is_none() {
            return Err(Error::InvalidName("unexpected None in Variable".into()));
        }

        let enum_val = reader.read_u8()?;
        let type_name = VAR_TYPE_NAMES.get(enum_val as usize).copied().unwrap_or_else(|| {
            log::warn!("unknown variable type enum {enum_val}");
            "None"
        });

        let value = match type_name {
            "BoolProperty" => VariableValue::Bool(reader.read_u32()?),
            "IntProperty" => VariableValue::Int(reader.read_u32()?),
            "FloatProperty" => VariableValue::Float(reader.read_f32()?),
            "NameProperty" => VariableValue::Name(FName::read(reader, &ctx.names)?),
            _ => VariableValue::None,
        };

        Ok(Self { name, value })
    }

    fn write(&self, writer: &mut ByteWriter, ctx: &mut Context) {
        self.name.write(writer, ctx);
        let (enum_val, _) = VAR_TYPE_NAMES
            .iter()
            .enumerate()
            .find(|(_, n)| **n == self.variant_name())
            .unwrap_or((0, &"None"));
        writer.write_u8(enum_val as u8);
        match &self.value {
            VariableValue::None => {}
            VariableValue::Bool(v) | VariableValue::Int(v) => writer.write_u32(*v),
            VariableValue::Float(v) => writer.write_f32(*v),
            VariableValue::Name(v) => v.write(writer, ctx),
        }
    }

    fn variant_name(&self) -> &'static str {
        match self.value {
            VariableValue::None => "None",
            VariableValue::Bool(_) => "BoolProperty",
            VariableValue::Int(_) => "IntProperty",
            VariableValue::Float(_) => "FloatProperty",
            VariableValue::Name(_) => "NameProperty",
        }
    }
}

/// A `Variables` component payload: a flat table of [`Variable`]s under a
/// single named collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Variables {
    pub name: FName,
    pub unknown: u64,
    pub items: Vec<Variable>,
}

impl Variables {
    fn read(reader: &mut ByteReader, ctx: &mut Context) -> Result<Self> {
        let name = FName::read(reader, &ctx.names)?;
        let unknown = reader.read_u64()?;
        let count = reader.read_i32()?;
        let mut items = Vec::with_capacity(count.max(0) as usize);
        for _ in 0..count.max(0) {
            items.push(Variable::read(reader, ctx)?);
        }
        Ok(Self { name, unknown, items })
    }

    fn write(&self, writer: &mut ByteWriter, ctx: &mut Context) {
        self.name.write(writer, ctx);
        writer.write_u64(self.unknown);
        writer.write_i32(self.items.len() as i32);
        for item in &self.items {
            item.write(writer, ctx);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.items.iter().find(|v| v.name.name == name)
    }
}

/// Component keys that route to a [`Variables`] payload instead of a
/// [`PropertyBag`] (spec.md §3, §9's ambiguous-spelling note).
const VARIABLES_COMPONENT_KEYS: [&str; 6] = [
    "GlobalVariables",
    "Variables",
    "Variable",
    "PersistenceKeys",
    "PersistanceKeys1",
    "PersistenceKeys1",
];

#[derive(Debug, Clone, PartialEq)]
pub enum ComponentPayload {
    Variables(Variables),
    Properties(PropertyBag),
}

/// One actor component: a length-framed payload plus any trailing bytes the
/// frame declared but the payload didn't consume (expected to be zero).
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub key: String,
    pub payload: ComponentPayload,
    pub extra_data: Option<Vec<u8>>,
}

impl Component {
    fn read(reader: &mut ByteReader, ctx: &mut Context) -> Result<Self> {
        let key = read_fstring(reader)?
            .ok_or_else(|| Error::InvalidName("null component key".into()))?;
        let length = reader.read_i32()?;
        let start = reader.position();

        let payload = if VARIABLES_COMPONENT_KEYS.contains(&key.as_str()) {
            ComponentPayload::Variables(Variables::read(reader, ctx)?)
        } else {
            ComponentPayload::Properties(PropertyBag::read(reader, ctx)?)
        };

        let end_of_frame = start + length.max(0) as usize;
        let extra_data = if reader.position() < end_of_frame {
            let bytes = reader.read_bytes(end_of_frame - reader.position())?;
            if bytes.iter().any(|&b| b != 0) {
                log::warn!("non-zero extra data in component {key}");
            }
            Some(bytes.to_vec())
        } else if reader.position() > end_of_frame {
            return Err(Error::SizeMismatch(format!(
                "component {key} read past its declared length"
            )));
        } else {
            None
        };

        Ok(Self {
            key,
            payload,
            extra_data,
        })
    }

    fn write(&self, writer: &mut ByteWriter, ctx: &mut Context) {
        write_fstring(writer, Some(&self.key));
        let length_pos = writer.position();
        writer.write_i32(0);
        let start = writer.position();

        match &self.payload {
            ComponentPayload::Variables(v) => v.write(writer, ctx),
            ComponentPayload::Properties(p) => p.write(writer, ctx),
        }
        if let Some(extra) = &self.extra_data {
            writer.write_bytes(extra);
        }

        let end = writer.position();
        writer.set_position(length_pos);
        writer.write_i32((end - start) as i32);
        writer.set_position(end);
    }
}

/// One serialized engine object: header fields (path or loaded-data) plus a
/// data body (properties, actor flag, components).
#[derive(Debug, Clone, PartialEq)]
pub struct UObject {
    pub was_loaded: u8,
    pub object_path: Option<String>,
    pub loaded_data: Option<UObjectLoadedData>,
    pub object_index: i32,
    pub properties: Option<PropertyBag>,
    pub extra_properties_data: Option<Vec<u8>>,
    pub is_actor: u8,
    pub components: Option<Vec<Component>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UObjectLoadedData {
    pub name: FName,
    pub outer_id: u32,
}

impl UObjectLoadedData {
    fn read(reader: &mut ByteReader, names: &[String]) -> Result<Self> {
        Ok(Self {
            name: FName::read(reader, names)?,
            outer_id: reader.read_u32()?,
        })
    }

    fn write(&self, writer: &mut ByteWriter, ctx: &mut Context) {
        self.name.write(writer, ctx);
        writer.write_u32(self.outer_id);
    }
}

impl UObject {
    /// Header-only read: `was_loaded`, then either the object's path (elided
    /// for object 0 when `was_loaded != 0` and the document carries a
    /// top-level asset path — spec.md §3) or `loaded_data`.
    fn read_header(
        reader: &mut ByteReader,
        ctx: &Context,
        index: usize,
        class_path: Option<&str>,
    ) -> Result<Self> {
        let was_loaded = reader.read_u8()?;

        let object_path = if was_loaded != 0 && index == 0 && class_path.is_some() {
            class_path.map(str::to_string)
        } else {
            read_fstring(reader)?
        };

        let loaded_data = if was_loaded == 0 {
            Some(UObjectLoadedData::read(reader, &ctx.names)?)
        } else {
            None
        };

        Ok(Self {
            was_loaded,
            object_path,
            loaded_data,
            object_index: 0,
            properties: None,
            extra_properties_data: None,
            is_actor: 0,
            components: None,
        })
    }

    fn write_header(&self, writer: &mut ByteWriter, ctx: &mut Context, has_class_path: bool) {
        writer.write_u8(self.was_loaded);

        if self.was_loaded == 0 || self.object_index != 0 || !has_class_path {
            write_fstring(writer, self.object_path.as_deref());
        }

        if self.was_loaded == 0 {
            if let Some(loaded_data) = &self.loaded_data {
                loaded_data.write(writer, ctx);
            }
        }
    }

    fn read_data(&mut self, reader: &mut ByteReader, ctx: &mut Context) -> Result<()> {
        self.object_index = reader.read_i32()?;

        let length = reader.read_u32()?;
        let start = reader.position();
        if length > 0 {
            self.properties = Some(PropertyBag::read(reader, ctx)?);

            let end_of_frame = start + length as usize;
            if reader.position() < end_of_frame {
                let bytes = reader.read_bytes(end_of_frame - reader.position())?;
                if bytes.iter().any(|&b| b != 0) {
                    log::debug!("non-zero extra properties data at object {}", self.object_index);
                }
                self.extra_properties_data = Some(bytes.to_vec());
            } else if reader.position() > end_of_frame {
                return Err(Error::SizeMismatch(format!(
                    "object {} properties read past declared length",
                    self.object_index
                )));
            }
        }

        self.is_actor = reader.read_u8()?;
        if self.is_actor != 0 {
            let count = reader.read_u32()?;
            let mut components = Vec::with_capacity(count as usize);
            for _ in 0..count {
                components.push(Component::read(reader, ctx)?);
            }
            self.components = Some(components);
        }

        Ok(())
    }

    fn write_data(&self, writer: &mut ByteWriter, ctx: &mut Context) {
        writer.write_i32(self.object_index);

        let length_pos = writer.position();
        writer.write_u32(0);
        if let Some(properties) = &self.properties {
            let start = writer.position();
            properties.write(writer, ctx);
            if let Some(extra) = &self.extra_properties_data {
                writer.write_bytes(extra);
            }
            let end = writer.position();
            writer.set_position(length_pos);
            writer.write_u32((end - start) as u32);
            writer.set_position(end);
        }

        writer.write_u8(self.is_actor);
        if self.is_actor != 0 {
            if let Some(components) = &self.components {
                writer.write_u32(components.len() as u32);
                for component in components {
                    component.write(writer, ctx);
                }
            }
        }
    }
}

/// A fully parsed save document: optional engine/package headers, the names
/// table, and the object graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveData {
    pub package_version: Option<PackageVersion>,
    pub save_game_class_path: Option<FTopLevelAssetPath>,
    pub version: u32,
    pub objects: Vec<UObject>,
    pub names_table: Vec<String>,
}

impl SaveData {
    /// Implements the multi-seek read algorithm of spec.md §4.5: the
    /// `OffsetInfo` names where the names and object-header tables live;
    /// object *data* immediately follows `OffsetInfo` in the stream and is
    /// read only after both tables are known.
    pub fn read(
        reader: &mut ByteReader,
        has_package_version: bool,
        has_top_level_asset_path: bool,
        container_offset: i64,
        class_path_override: Option<&str>,
    ) -> Result<Self> {
        let package_version = if has_package_version {
            Some(PackageVersion::read(reader)?)
        } else {
            None
        };

        let save_game_class_path = if has_top_level_asset_path {
            Some(FTopLevelAssetPath::read(reader)?)
        } else {
            None
        };

        let offset_info = OffsetInfo::read(reader)?;
        let version = offset_info.version;

        let objects_data_start = reader.position();
        let mut max_position = objects_data_start;

        reader.set_position(offset_info.names as usize)?;
        let names_count = reader.read_i32()?;
        let mut names_table = Vec::with_capacity(names_count.max(0) as usize);
        for _ in 0..names_count.max(0) {
            let name = read_fstring(reader)?
                .ok_or_else(|| Error::InvalidName("null entry in names table".into()))?;
            names_table.push(name);
        }
        max_position = max_position.max(reader.position());

        let class_path = save_game_class_path
            .as_ref()
            .and_then(|p| p.path().map(str::to_string))
            .or_else(|| class_path_override.map(str::to_string));

        let mut ctx = Context::new(names_table.clone(), class_path.clone(), container_offset);

        reader.set_position(offset_info.objects as usize)?;
        let object_count = reader.read_i32()?;
        let mut objects = Vec::with_capacity(object_count.max(0) as usize);
        for i in 0..object_count.max(0) as usize {
            objects.push(UObject::read_header(reader, &ctx, i, class_path.as_deref())?);
        }
        max_position = max_position.max(reader.position());

        reader.set_position(objects_data_start)?;
        for object in &mut objects {
            object.read_data(reader, &mut ctx)?;
        }
        max_position = max_position.max(reader.position());

        reader.set_position(max_position)?;

        Ok(Self {
            package_version,
            save_game_class_path,
            version,
            objects,
            names_table: ctx.names,
        })
    }

    /// Implements the three-pass backpatched write of spec.md §4.5: object
    /// data, then the objects table, then the names table, then patch
    /// `OffsetInfo` with the real offsets. `container_offset` is threaded
    /// into the context purely for nested-container diagnostics; it does
    /// not affect the bytes written.
    pub fn write(
        &self,
        writer: &mut ByteWriter,
        has_package_version: bool,
        has_top_level_asset_path: bool,
        container_offset: i64,
    ) {
        if has_package_version {
            if let Some(package_version) = &self.package_version {
                package_version.write(writer);
            }
        }
        if has_top_level_asset_path {
            if let Some(class_path) = &self.save_game_class_path {
                class_path.write(writer);
            }
        }

        let offset_position = writer.position();
        OffsetInfo {
            names: 0,
            version: self.version,
            objects: 0,
        }
        .write(writer);

        let class_path = self
            .save_game_class_path
            .as_ref()
            .and_then(|p| p.path().map(str::to_string));
        let has_class_path = class_path.is_some();
        let mut ctx = Context::new(self.names_table.clone(), class_path, container_offset);

        for object in &self.objects {
            object.write_data(writer, &mut ctx);
        }

        let objects_offset = writer.position();
        writer.write_i32(self.objects.len() as i32);
        for object in &self.objects {
            object.write_header(writer, &mut ctx, has_class_path);
        }

        let names_offset = writer.position();
        writer.write_i32(ctx.names.len() as i32);
        for name in &ctx.names {
            write_fstring(writer, Some(name));
        }

        let end_position = writer.position();
        writer.set_position(offset_position);
        OffsetInfo {
            names: names_offset as i64,
            version: self.version,
            objects: objects_offset as i64,
        }
        .write(writer);
        writer.set_position(end_position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> SaveData {
        SaveData {
            package_version: None,
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
        }
    }

    #[test]
    fn save_data_round_trips() {
        let doc = sample_document();
        let mut w = ByteWriter::new();
        doc.write(&mut w, false, false, 0);
        let bytes = w.finalize();

        let mut r = ByteReader::new(&bytes);
        let read_back = SaveData::read(&mut r, false, false, 0, None).unwrap();
        assert_eq!(read_back.objects.len(), 1);
        assert_eq!(read_back.objects[0].object_path.as_deref(), Some("/Game/Foo.Foo_C"));
        assert_eq!(read_back.version, 1);
    }

    #[test]
    fn two_decode_encode_cycles_are_a_fixed_point() {
        let doc = sample_document();
        let mut w1 = ByteWriter::new();
        doc.write(&mut w1, false, false, 0);
        let bytes1 = w1.finalize();

        let mut r1 = ByteReader::new(&bytes1);
        let round1 = SaveData::read(&mut r1, false, false, 0, None).unwrap();
        let mut w2 = ByteWriter::new();
        round1.write(&mut w2, false, false, 0);
        let bytes2 = w2.finalize();

        let mut r2 = ByteReader::new(&bytes2);
        let round2 = SaveData::read(&mut r2, false, false, 0, None).unwrap();
        let mut w3 = ByteWriter::new();
        round2.write(&mut w3, false, false, 0);
        let bytes3 = w3.finalize();

        assert_eq!(bytes2, bytes3);
    }
}
