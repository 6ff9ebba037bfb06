//! Property value payloads: the typed union every [`super::Property`]
//! dispatches on, plus the reduced "raw" shape used for array and map
//! elements (spec.md §4.2-§4.4).

use crate::container::PersistenceContainer;
use crate::document::{self, SaveData};
use crate::error::{Error, Result};
use crate::io::{ByteReader, ByteWriter};
use crate::memory::FGuid;
use crate::names::{read_fstring, write_fstring, Context, FName};

use super::PropertyBag;

/// A fully-typed property value, as it appears directly under a
/// [`super::Property`] (never inside a raw array/map element — see
/// [`RawValue`] for that reduced shape).
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Int8(i8),
    Int16(i16),
    Int(i32),
    Int64(i64),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Str(Option<String>),
    Name(FName),
    SoftClass(Option<String>),
    SoftObject(Option<String>),
    Object(i32),
    Struct(StructValue),
    Array(ArrayValue),
    Map(MapValue),
    Byte(ByteValue),
    Enum(EnumValue),
    Text(TextValue),
    /// Unrecognized property kind, preserved byte-for-byte so unknown
    /// content survives a read/write round trip untouched.
    Unknown(Vec<u8>),
}

/// `StructProperty`'s wrapper: the struct's own type name and GUID around
/// the dispatched payload.
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    pub type_name: FName,
    pub guid: FGuid,
    pub unknown: u8,
    pub payload: StructPayload,
}

/// The struct kinds with their own concrete wire layout, dispatched on
/// `type_name.name`. Anything else falls back to `Bag`, a nested property
/// bag (the general case for gameplay structs).
#[derive(Debug, Clone, PartialEq)]
pub enum StructPayload {
    Guid(FGuid),
    Vector(crate::memory::FVector),
    Rotator(crate::memory::FRotator),
    /// .NET `TimeSpan`: signed tick count.
    Timespan(i64),
    /// .NET `DateTime`: signed tick count (kind bits not modeled).
    DateTime(i64),
    SoftClassPath(SoftObjectPathValue),
    SoftObjectPath(SoftObjectPathValue),
    /// Nested save document, keyed off the enclosing document's class path
    /// (spec.md §4.4, §9): the profile variant holds another `SaveData`,
    /// everything else holds a `PersistenceContainer`.
    PersistenceBlob(PersistenceBlob),
    Bag(PropertyBag),
}

/// `FSoftObjectPath`/`FSoftClassPath`: an asset path plus an optional
/// sub-object path string.
#[derive(Debug, Clone, PartialEq)]
pub struct SoftObjectPathValue {
    pub asset_path_name: FName,
    pub sub_path_string: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PersistenceBlob {
    Profile(Box<SaveData>),
    World(Box<PersistenceContainer>),
}

/// `ArrayProperty`'s payload: either a homogeneous run of raw elements, or
/// the specialized array-of-structs layout (spec.md §4.4).
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayValue {
    Elements {
        element_type: FName,
        reserved: u8,
        items: Vec<RawValue>,
    },
    Structs(ArrayStructValue),
}

/// The array-of-structs wire variant: a full header (name/type indices,
/// payload size, a redundant index, the element struct's type and GUID)
/// precedes the bare struct payloads. `reserved` is the outer
/// `ArrayProperty`'s own header byte, preserved as read.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayStructValue {
    pub reserved: u8,
    pub name_index: u16,
    pub type_index: u16,
    pub index: u32,
    pub element_type: FName,
    pub guid: FGuid,
    pub unknown: u8,
    pub items: Vec<StructPayload>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapValue {
    pub key_type: FName,
    pub value_type: FName,
    pub unknown: [u8; 5],
    pub entries: Vec<(RawValue, RawValue)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ByteValue {
    pub enum_name: FName,
    pub unknown: u8,
    pub value: ByteOrEnum,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ByteOrEnum {
    Byte(u8),
    Name(FName),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub enum_type: FName,
    pub unknown: u8,
    pub value: FName,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextValue {
    pub flags: u32,
    pub history_type: i8,
    pub body: TextBody,
}

/// `FText`'s history payload, dispatched on `history_type`: `0` is a plain
/// localized string (namespace/key/source); `-1` or `255` is `{flag:u32,
/// value:FString?}` with the string present iff `flag != 0`; anything else
/// is preserved as opaque bytes (spec.md §4.4).
#[derive(Debug, Clone, PartialEq)]
pub enum TextBody {
    Base {
        namespace: Option<String>,
        key: Option<String>,
        source: Option<String>,
    },
    Flagged {
        flag: u32,
        value: Option<String>,
    },
    Other(Vec<u8>),
}

/// The reduced element shape used inside raw-mode array/map slots: no
/// `no_raw` byte, no per-element framing. A raw `StructProperty` element is
/// just an `FGuid` (spec.md §4.4). `ByteProperty`/`EnumProperty` carry the
/// same framing raw or not (neither has a `no_raw` byte at the property
/// level either), so their raw element is just their ordinary value;
/// `SoftClassProperty`/`SoftObjectProperty`'s raw element is the bare
/// `FString` underneath their scalar payload. `ArrayProperty`/`MapProperty`
/// nested as an element recurse into the same value shape as their
/// top-level property body.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Int8(i8),
    Int16(i16),
    Int(i32),
    Int64(i64),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float(f32),
    Double(f64),
    Bool(bool),
    Str(Option<String>),
    Name(FName),
    Object(i32),
    Struct(FGuid),
    Byte(ByteValue),
    Enum(EnumValue),
    Array(Box<ArrayValue>),
    Map(Box<MapValue>),
    Bytes(Vec<u8>),
}

pub(super) fn size_delta(type_name: &str) -> i64 {
    match type_name {
        "StructProperty" => -19,
        "ArrayProperty" => -3,
        _ => 0,
    }
}

pub(super) fn read_value(
    reader: &mut ByteReader,
    ctx: &mut Context,
    type_name: &str,
    size: u32,
) -> Result<(PropertyValue, u8)> {
    let mut no_raw = 0u8;
    let value = match type_name {
        "Int8Property" => {
            no_raw = reader.read_u8()?;
            PropertyValue::Int8(reader.read_i8()?)
        }
        "Int16Property" => {
            no_raw = reader.read_u8()?;
            PropertyValue::Int16(reader.read_i16()?)
        }
        "IntProperty" => {
            no_raw = reader.read_u8()?;
            PropertyValue::Int(reader.read_i32()?)
        }
        "Int64Property" => {
            no_raw = reader.read_u8()?;
            PropertyValue::Int64(reader.read_i64()?)
        }
        "UInt16Property" => {
            no_raw = reader.read_u8()?;
            PropertyValue::UInt16(reader.read_u16()?)
        }
        "UInt32Property" => {
            no_raw = reader.read_u8()?;
            PropertyValue::UInt32(reader.read_u32()?)
        }
        "UInt64Property" => {
            no_raw = reader.read_u8()?;
            PropertyValue::UInt64(reader.read_u64()?)
        }
        "FloatProperty" => {
            no_raw = reader.read_u8()?;
            PropertyValue::Float(reader.read_f32()?)
        }
        "DoubleProperty" => {
            no_raw = reader.read_u8()?;
            PropertyValue::Double(reader.read_f64()?)
        }
        "BoolProperty" => {
            let value = reader.read_bool()?;
            no_raw = reader.read_u8()?;
            PropertyValue::Bool(value)
        }
        "StrProperty" => {
            no_raw = reader.read_u8()?;
            PropertyValue::Str(read_fstring(reader)?)
        }
        "NameProperty" => {
            no_raw = reader.read_u8()?;
            PropertyValue::Name(FName::read(reader, &ctx.names)?)
        }
        "SoftClassProperty" => {
            no_raw = reader.read_u8()?;
            PropertyValue::SoftClass(read_fstring(reader)?)
        }
        "SoftObjectProperty" => {
            no_raw = reader.read_u8()?;
            PropertyValue::SoftObject(read_fstring(reader)?)
        }
        "ObjectProperty" => {
            no_raw = reader.read_u8()?;
            PropertyValue::Object(reader.read_i32()?)
        }
        "StructProperty" => PropertyValue::Struct(read_struct_value(reader, ctx)?),
        "ArrayProperty" => PropertyValue::Array(read_array_value(reader, ctx)?),
        "MapProperty" => PropertyValue::Map(read_map_value(reader, ctx)?),
        "ByteProperty" => PropertyValue::Byte(read_byte_value(reader, ctx)?),
        "EnumProperty" => PropertyValue::Enum(read_enum_value(reader, ctx)?),
        "TextProperty" => PropertyValue::Text(read_text_value(reader, size)?),
        other => {
            log::debug!("passing through unknown property kind {other}");
            PropertyValue::Unknown(reader.read_bytes(size as usize)?.to_vec())
        }
    };
    Ok((value, no_raw))
}

pub(super) fn write_value(
    writer: &mut ByteWriter,
    ctx: &mut Context,
    type_name: &str,
    no_raw: u8,
    value: &PropertyValue,
) {
    match (type_name, value) {
        ("Int8Property", PropertyValue::Int8(v)) => {
            writer.write_u8(no_raw);
            writer.write_i8(*v);
        }
        ("Int16Property", PropertyValue::Int16(v)) => {
            writer.write_u8(no_raw);
            writer.write_i16(*v);
        }
        ("IntProperty", PropertyValue::Int(v)) => {
            writer.write_u8(no_raw);
            writer.write_i32(*v);
        }
        ("Int64Property", PropertyValue::Int64(v)) => {
            writer.write_u8(no_raw);
            writer.write_i64(*v);
        }
        ("UInt16Property", PropertyValue::UInt16(v)) => {
            writer.write_u8(no_raw);
            writer.write_u16(*v);
        }
        ("UInt32Property", PropertyValue::UInt32(v)) => {
            writer.write_u8(no_raw);
            writer.write_u32(*v);
        }
        ("UInt64Property", PropertyValue::UInt64(v)) => {
            writer.write_u8(no_raw);
            writer.write_u64(*v);
        }
        ("FloatProperty", PropertyValue::Float(v)) => {
            writer.write_u8(no_raw);
            writer.write_f32(*v);
        }
        ("DoubleProperty", PropertyValue::Double(v)) => {
            writer.write_u8(no_raw);
            writer.write_f64(*v);
        }
        ("BoolProperty", PropertyValue::Bool(v)) => {
            writer.write_bool(*v);
            writer.write_u8(no_raw);
        }
        ("StrProperty", PropertyValue::Str(v)) => {
            writer.write_u8(no_raw);
            write_fstring(writer, v.as_deref());
        }
        ("NameProperty", PropertyValue::Name(v)) => {
            writer.write_u8(no_raw);
            v.write(writer, ctx);
        }
        ("SoftClassProperty", PropertyValue::SoftClass(v)) => {
            writer.write_u8(no_raw);
            write_fstring(writer, v.as_deref());
        }
        ("SoftObjectProperty", PropertyValue::SoftObject(v)) => {
            writer.write_u8(no_raw);
            write_fstring(writer, v.as_deref());
        }
        ("ObjectProperty", PropertyValue::Object(v)) => {
            writer.write_u8(no_raw);
            writer.write_i32(*v);
        }
        ("StructProperty", PropertyValue::Struct(v)) => write_struct_value(writer, ctx, v),
        ("ArrayProperty", PropertyValue::Array(v)) => write_array_value(writer, ctx, v),
        ("MapProperty", PropertyValue::Map(v)) => write_map_value(writer, ctx, v),
        ("ByteProperty", PropertyValue::Byte(v)) => write_byte_value(writer, ctx, v),
        ("EnumProperty", PropertyValue::Enum(v)) => write_enum_value(writer, ctx, v),
        ("TextProperty", PropertyValue::Text(v)) => write_text_value(writer, v),
        (_, PropertyValue::Unknown(bytes)) => writer.write_bytes(bytes),
        (kind, _) => {
            // Constructed out of band with a mismatched value; nothing sane
            // to write. This only happens to hand-built `Property`s, never
            // to ones that came from `read`.
            log::warn!("property value does not match its declared kind {kind}");
        }
    }
}

fn read_struct_value(reader: &mut ByteReader, ctx: &mut Context) -> Result<StructValue> {
    let type_name = FName::read(reader, &ctx.names)?;
    let guid = FGuid::read(reader)?;
    let unknown = reader.read_u8()?;
    let payload = read_struct_payload(reader, ctx, &type_name.name)?;
    Ok(StructValue {
        type_name,
        guid,
        unknown,
        payload,
    })
}

fn write_struct_value(writer: &mut ByteWriter, ctx: &mut Context, value: &StructValue) {
    value.type_name.write(writer, ctx);
    value.guid.write(writer);
    writer.write_u8(value.unknown);
    write_struct_payload(writer, ctx, &value.payload);
}

fn read_struct_payload(
    reader: &mut ByteReader,
    ctx: &mut Context,
    type_name: &str,
) -> Result<StructPayload> {
    Ok(match type_name {
        "Guid" => StructPayload::Guid(FGuid::read(reader)?),
        "Vector" => StructPayload::Vector(crate::memory::FVector::read(reader)?),
        "Rotator" => StructPayload::Rotator(crate::memory::FRotator::read(reader)?),
        "Timespan" => StructPayload::Timespan(reader.read_i64()?),
        "DateTime" => StructPayload::DateTime(reader.read_i64()?),
        "SoftClassPath" => StructPayload::SoftClassPath(read_soft_object_path(reader, ctx)?),
        "SoftObjectPath" => StructPayload::SoftObjectPath(read_soft_object_path(reader, ctx)?),
        "PersistenceBlob" => StructPayload::PersistenceBlob(read_persistence_blob(reader, ctx)?),
        _ => StructPayload::Bag(PropertyBag::read(reader, ctx)?),
    })
}

fn write_struct_payload(writer: &mut ByteWriter, ctx: &mut Context, payload: &StructPayload) {
    match payload {
        StructPayload::Guid(g) => g.write(writer),
        StructPayload::Vector(v) => v.write(writer),
        StructPayload::Rotator(r) => r.write(writer),
        StructPayload::Timespan(t) => writer.write_i64(*t),
        StructPayload::DateTime(t) => writer.write_i64(*t),
        StructPayload::SoftClassPath(p) => write_soft_object_path(writer, ctx, p),
        StructPayload::SoftObjectPath(p) => write_soft_object_path(writer, ctx, p),
        StructPayload::PersistenceBlob(blob) => write_persistence_blob(writer, ctx, blob),
        StructPayload::Bag(bag) => bag.write(writer, ctx),
    }
}

fn read_soft_object_path(reader: &mut ByteReader, ctx: &mut Context) -> Result<SoftObjectPathValue> {
    Ok(SoftObjectPathValue {
        asset_path_name: FName::read(reader, &ctx.names)?,
        sub_path_string: read_fstring(reader)?,
    })
}

fn write_soft_object_path(writer: &mut ByteWriter, ctx: &mut Context, value: &SoftObjectPathValue) {
    value.asset_path_name.write(writer, ctx);
    write_fstring(writer, value.sub_path_string.as_deref());
}

/// Size-prefixed nested document. The blob is parsed through its own
/// `ByteReader` over exactly `size` bytes, so every offset inside it is
/// blob-relative (spec.md §4.4, mirroring `editor/model/profile_save.py`'s
/// `blob_reader = Reader(blob_data)`).
fn read_persistence_blob(reader: &mut ByteReader, ctx: &mut Context) -> Result<PersistenceBlob> {
    let size = reader.read_i32()?;
    let blob_start = reader.position();
    let bytes = reader.read_bytes(size.max(0) as usize)?;
    let mut inner = ByteReader::new(bytes);
    let container_offset = ctx.container_offset + blob_start as i64;

    if ctx.class_path.as_deref() == Some(document::PROFILE_CLASS_PATH) {
        let save_data = SaveData::read(&mut inner, true, false, container_offset, None)?;
        Ok(PersistenceBlob::Profile(Box::new(save_data)))
    } else {
        let container = PersistenceContainer::read(&mut inner, container_offset)?;
        Ok(PersistenceBlob::World(Box::new(container)))
    }
}

/// Serializes the nested document into its own buffer — exactly the way
/// `editor/model/persistence.py`'s `PersistenceContainer.write` serializes
/// each actor into a throwaway `Writer()` — so its internal `OffsetInfo`/
/// index-table offsets come out 0-based rather than relative to this
/// property's already-advanced outer `writer`. Mirrors `read_persistence_blob`,
/// which parses the same span through a fresh, 0-based `ByteReader`.
fn write_persistence_blob(writer: &mut ByteWriter, ctx: &mut Context, blob: &PersistenceBlob) {
    let size_pos = writer.position();
    writer.write_i32(0);
    let start = writer.position();
    let container_offset = ctx.container_offset + start as i64;

    let mut blob_writer = ByteWriter::new();
    match blob {
        PersistenceBlob::Profile(save_data) => {
            save_data.write(&mut blob_writer, true, false, container_offset);
        }
        PersistenceBlob::World(container) => {
            container.write(&mut blob_writer);
        }
    }
    let blob_bytes = blob_writer.finalize();
    writer.write_bytes(&blob_bytes);

    let end = writer.position();
    writer.set_position(size_pos);
    writer.write_i32((end - start) as i32);
    writer.set_position(end);
}

fn read_array_value(reader: &mut ByteReader, ctx: &mut Context) -> Result<ArrayValue> {
    let element_type = FName::read(reader, &ctx.names)?;
    let reserved = reader.read_u8()?;
    let count = reader.read_i32()?;

    if element_type.name == "StructProperty" {
        let name_index = reader.read_u16()?;
        let type_index = reader.read_u16()?;
        let _elements_total_size = reader.read_u32()?;
        let index = reader.read_u32()?;
        let struct_type = FName::read(reader, &ctx.names)?;
        let guid = FGuid::read(reader)?;
        let unknown = reader.read_u8()?;
        let mut items = Vec::with_capacity(count.max(0) as usize);
        for _ in 0..count.max(0) {
            items.push(read_struct_payload(reader, ctx, &struct_type.name)?);
        }
        Ok(ArrayValue::Structs(ArrayStructValue {
            reserved,
            name_index,
            type_index,
            index,
            element_type: struct_type,
            guid,
            unknown,
            items,
        }))
    } else {
        let mut items = Vec::with_capacity(count.max(0) as usize);
        for _ in 0..count.max(0) {
            items.push(read_raw_value(reader, ctx, &element_type.name)?);
        }
        Ok(ArrayValue::Elements {
            element_type,
            reserved,
            items,
        })
    }
}

fn write_array_value(writer: &mut ByteWriter, ctx: &mut Context, value: &ArrayValue) {
    match value {
        ArrayValue::Elements {
            element_type,
            reserved,
            items,
        } => {
            element_type.write(writer, ctx);
            writer.write_u8(*reserved);
            writer.write_i32(items.len() as i32);
            for item in items {
                write_raw_value(writer, ctx, item);
            }
        }
        ArrayValue::Structs(array) => {
            let struct_property = FName::new("StructProperty");
            struct_property.write(writer, ctx);
            writer.write_u8(array.reserved);
            writer.write_i32(array.items.len() as i32);

            writer.write_u16(array.name_index);
            writer.write_u16(array.type_index);
            let size_pos = writer.position();
            writer.write_u32(0);
            writer.write_u32(array.index);
            array.element_type.write(writer, ctx);
            array.guid.write(writer);
            writer.write_u8(array.unknown);
            let start = writer.position();
            for item in &array.items {
                write_struct_payload(writer, ctx, item);
            }
            let end = writer.position();
            writer.set_position(size_pos);
            writer.write_u32((end - start) as u32);
            writer.set_position(end);
        }
    }
}

fn read_map_value(reader: &mut ByteReader, ctx: &mut Context) -> Result<MapValue> {
    let key_type = FName::read(reader, &ctx.names)?;
    let value_type = FName::read(reader, &ctx.names)?;
    let mut unknown = [0u8; 5];
    for slot in &mut unknown {
        *slot = reader.read_u8()?;
    }
    let count = reader.read_i32()?;
    let mut entries = Vec::with_capacity(count.max(0) as usize);
    for _ in 0..count.max(0) {
        let key = read_raw_value(reader, ctx, &key_type.name)?;
        let value = read_raw_value(reader, ctx, &value_type.name)?;
        entries.push((key, value));
    }
    Ok(MapValue {
        key_type,
        value_type,
        unknown,
        entries,
    })
}

fn write_map_value(writer: &mut ByteWriter, ctx: &mut Context, value: &MapValue) {
    value.key_type.write(writer, ctx);
    value.value_type.write(writer, ctx);
    for byte in value.unknown {
        writer.write_u8(byte);
    }
    writer.write_i32(value.entries.len() as i32);
    for (key, val) in &value.entries {
        write_raw_value(writer, ctx, key);
        write_raw_value(writer, ctx, val);
    }
}

fn read_byte_value(reader: &mut ByteReader, ctx: &mut Context) -> Result<ByteValue> {
    let enum_name = FName::read(reader, &ctx.names)?;
    let unknown = reader.read_u8()?;
    let value = if enum_name.is_none() {
        ByteOrEnum::Byte(reader.read_u8()?)
    } else {
        ByteOrEnum::Name(FName::read(reader, &ctx.names)?)
    };
    Ok(ByteValue {
        enum_name,
        unknown,
        value,
    })
}

fn write_byte_value(writer: &mut ByteWriter, ctx: &mut Context, value: &ByteValue) {
    value.enum_name.write(writer, ctx);
    writer.write_u8(value.unknown);
    match &value.value {
        ByteOrEnum::Byte(b) => writer.write_u8(*b),
        ByteOrEnum::Name(n) => n.write(writer, ctx),
    }
}

fn read_enum_value(reader: &mut ByteReader, ctx: &mut Context) -> Result<EnumValue> {
    Ok(EnumValue {
        enum_type: FName::read(reader, &ctx.names)?,
        unknown: reader.read_u8()?,
        value: FName::read(reader, &ctx.names)?,
    })
}

fn write_enum_value(writer: &mut ByteWriter, ctx: &mut Context, value: &EnumValue) {
    value.enum_type.write(writer, ctx);
    writer.write_u8(value.unknown);
    value.value.write(writer, ctx);
}

fn read_text_value(reader: &mut ByteReader, size: u32) -> Result<TextValue> {
    let flags = reader.read_u32()?;
    let history_type = reader.read_i8()?;
    let body = match history_type {
        0 => TextBody::Base {
            namespace: read_fstring(reader)?,
            key: read_fstring(reader)?,
            source: read_fstring(reader)?,
        },
        -1 | 255 => {
            let flag = reader.read_u32()?;
            let value = if flag != 0 { read_fstring(reader)? } else { None };
            TextBody::Flagged { flag, value }
        }
        other => {
            log::warn!("unknown TextProperty history_type {other}");
            let remaining = (size as i64 - 5).max(0) as usize;
            TextBody::Other(reader.read_bytes(remaining)?.to_vec())
        }
    };
    Ok(TextValue {
        flags,
        history_type,
        body,
    })
}

fn write_text_value(writer: &mut ByteWriter, value: &TextValue) {
    writer.write_u32(value.flags);
    writer.write_i8(value.history_type);
    match &value.body {
        TextBody::Base {
            namespace,
            key,
            source,
        } => {
            write_fstring(writer, namespace.as_deref());
            write_fstring(writer, key.as_deref());
            write_fstring(writer, source.as_deref());
        }
        TextBody::Flagged { flag, value } => {
            writer.write_u32(*flag);
            if *flag != 0 {
                write_fstring(writer, value.as_deref());
            }
        }
        TextBody::Other(bytes) => writer.write_bytes(bytes),
    }
}

fn read_raw_value(reader: &mut ByteReader, ctx: &mut Context, type_name: &str) -> Result<RawValue> {
    Ok(match type_name {
        "Int8Property" => RawValue::Int8(reader.read_i8()?),
        "Int16Property" => RawValue::Int16(reader.read_i16()?),
        "IntProperty" => RawValue::Int(reader.read_i32()?),
        "Int64Property" => RawValue::Int64(reader.read_i64()?),
        "UInt16Property" => RawValue::UInt16(reader.read_u16()?),
        "UInt32Property" => RawValue::UInt32(reader.read_u32()?),
        "UInt64Property" => RawValue::UInt64(reader.read_u64()?),
        "FloatProperty" => RawValue::Float(reader.read_f32()?),
        "DoubleProperty" => RawValue::Double(reader.read_f64()?),
        "BoolProperty" => RawValue::Bool(reader.read_bool()?),
        "StrProperty" => RawValue::Str(read_fstring(reader)?),
        "NameProperty" => RawValue::Name(FName::read(reader, &ctx.names)?),
        "SoftClassProperty" | "SoftObjectProperty" => RawValue::Str(read_fstring(reader)?),
        "ObjectProperty" => RawValue::Object(reader.read_i32()?),
        "StructProperty" => RawValue::Struct(FGuid::read(reader)?),
        "ByteProperty" => RawValue::Byte(read_byte_value(reader, ctx)?),
        "EnumProperty" => RawValue::Enum(read_enum_value(reader, ctx)?),
        "ArrayProperty" => RawValue::Array(Box::new(read_array_value(reader, ctx)?)),
        "MapProperty" => RawValue::Map(Box::new(read_map_value(reader, ctx)?)),
        other => {
            return Err(Error::UnknownPropertyKind(other.to_string()));
        }
    })
}

fn write_raw_value(writer: &mut ByteWriter, ctx: &mut Context, value: &RawValue) {
    match value {
        RawValue::Int8(v) => writer.write_i8(*v),
        RawValue::Int16(v) => writer.write_i16(*v),
        RawValue::Int(v) => writer.write_i32(*v),
        RawValue::Int64(v) => writer.write_i64(*v),
        RawValue::UInt16(v) => writer.write_u16(*v),
        RawValue::UInt32(v) => writer.write_u32(*v),
        RawValue::UInt64(v) => writer.write_u64(*v),
        RawValue::Float(v) => writer.write_f32(*v),
        RawValue::Double(v) => writer.write_f64(*v),
        RawValue::Bool(v) => writer.write_bool(*v),
        RawValue::Str(v) => write_fstring(writer, v.as_deref()),
        RawValue::Name(v) => v.write(writer, ctx),
        RawValue::Object(v) => writer.write_i32(*v),
        RawValue::Struct(guid) => guid.write(writer),
        RawValue::Byte(v) => write_byte_value(writer, ctx, v),
        RawValue::Enum(v) => write_enum_value(writer, ctx, v),
        RawValue::Array(v) => write_array_value(writer, ctx, v),
        RawValue::Map(v) => write_map_value(writer, ctx, v),
        RawValue::Bytes(bytes) => writer.write_bytes(bytes),
    }
}
