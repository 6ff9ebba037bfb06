//! Engine string/name encoding (spec layer L3): `FString`, `FName`, and the
//! per-document names table context shared by the property and document
//! layers.

use crate::error::{Error, Result};
use crate::io::{ByteReader, ByteWriter};
use indexmap::IndexMap;

const NAME_HAS_NUMBER_MASK: u16 = 0x8000;
const NAME_INDEX_MASK: u16 = 0x7FFF;

/// Read an Unreal `FString`.
///
/// `length == 0` means absent; `length > 0` is `length` strict-ASCII bytes
/// (a byte `>= 0x80` is an error, matching the reference decoder's
/// `.decode('ascii')`) including a trailing NUL; `length < 0` is `-length`
/// UTF-16LE code units including a trailing NUL code unit.
pub fn read_fstring(reader: &mut ByteReader) -> Result<Option<String>> {
    let length = reader.read_i32()?;
    if length == 0 {
        return Ok(None);
    }

    if length < 0 {
        let char_count = (-length) as usize;
        if char_count == 0 {
            return Err(Error::InvalidName("negative FString length of zero".into()));
        }
        let bytes = reader.read_bytes((char_count - 1) * 2)?;
        let null_term = reader.read_u16()?;
        if null_term != 0 {
            return Err(Error::InvalidName(
                "missing UTF-16 null terminator in FString".into(),
            ));
        }
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]))
            .collect();
        let value = String::from_utf16(&units)
            .map_err(|e| Error::InvalidName(format!("invalid UTF-16 FString: {e}")))?;
        Ok(Some(value))
    } else {
        let byte_count = length as usize;
        let bytes = reader.read_bytes(byte_count - 1)?;
        let null_term = reader.read_u8()?;
        if null_term != 0 {
            return Err(Error::InvalidName(
                "missing ASCII null terminator in FString".into(),
            ));
        }
        if bytes.iter().any(|&b| b >= 0x80) {
            return Err(Error::InvalidName(
                "non-ASCII byte in ASCII-encoded FString".into(),
            ));
        }
        let value = bytes
            .iter()
            .map(|&b| b as char)
            .collect::<String>();
        Ok(Some(value))
    }
}

/// Write an Unreal `FString`, choosing ASCII or UTF-16LE encoding based on
/// content (spec.md §4.3): ASCII when every character is `<= 0x7F`,
/// otherwise UTF-16LE with the sign-encoded length the reference producer
/// requires.
pub fn write_fstring(writer: &mut ByteWriter, value: Option<&str>) {
    let Some(value) = value else {
        writer.write_i32(0);
        return;
    };

    if value.chars().all(|c| (c as u32) <= 0x7F) {
        let byte_count = value.len() + 1;
        writer.write_i32(byte_count as i32);
        writer.write_bytes(value.as_bytes());
        writer.write_u8(0);
    } else {
        let char_count = value.encode_utf16().count() + 1;
        writer.write_i32(-2 * (char_count as i32));
        for unit in value.encode_utf16() {
            writer.write_u16(unit);
        }
        writer.write_u16(0);
    }
}

/// An interned-name reference: an index into the enclosing document's names
/// table, plus an optional instance number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FName {
    pub name: String,
    pub index: u16,
    pub number: Option<i32>,
}

impl FName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: 0,
            number: None,
        }
    }

    pub fn is_none(&self) -> bool {
        self.name == "None" && self.number.is_none()
    }

    /// Textual identity: `name` alone, or `name_number` when an instance
    /// number is present.
    pub fn display(&self) -> String {
        match self.number {
            Some(n) => format!("{}_{}", self.name, n),
            None => self.name.clone(),
        }
    }

    pub fn read(reader: &mut ByteReader, names: &[String]) -> Result<Self> {
        let raw_index = reader.read_u16()?;
        let has_number = raw_index & NAME_HAS_NUMBER_MASK != 0;
        let index = raw_index & NAME_INDEX_MASK;

        let name = names.get(index as usize).ok_or_else(|| {
            Error::InvalidName(format!(
                "FName index {index} out of range (table has {} entries)",
                names.len()
            ))
        })?;

        let number = if has_number {
            Some(reader.read_i32()?)
        } else {
            None
        };

        Ok(Self {
            name: name.clone(),
            index,
            number,
        })
    }

    /// Write this `FName`, reusing its original table slot when that slot
    /// still carries the same text (spec.md §3/§4.3 invariant), otherwise
    /// interning it via `ctx.get_or_add_name`.
    pub fn write(&self, writer: &mut ByteWriter, ctx: &mut Context) {
        let index = if (self.index as usize) < ctx.names.len()
            && ctx.names[self.index as usize] == self.name
        {
            self.index
        } else {
            ctx.get_or_add_name(&self.name)
        };

        let mut raw_index = index;
        if self.number.is_some() {
            raw_index |= NAME_HAS_NUMBER_MASK;
        }
        writer.write_u16(raw_index);
        if let Some(number) = self.number {
            writer.write_i32(number);
        }
    }
}

/// Shared state threaded through a single `SaveData` read or write pass:
/// the names table, the enclosing document's class path (used to pick the
/// `PersistenceBlob` variant and to elide object 0's path), and the
/// container-relative offset used by nested `Actor` archives.
pub struct Context {
    pub names: Vec<String>,
    cache: IndexMap<String, u16>,
    pub class_path: Option<String>,
    pub container_offset: i64,
}

impl Context {
    pub fn new(names: Vec<String>, class_path: Option<String>, container_offset: i64) -> Self {
        let cache = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i as u16))
            .collect();
        Self {
            names,
            cache,
            class_path,
            container_offset,
        }
    }

    /// Look up `name`, interning a new table slot if it isn't present yet.
    /// Append-only: this is the only way the names table grows during
    /// write, which keeps growth order deterministic (spec.md §5).
    pub fn get_or_add_name(&mut self, name: &str) -> u16 {
        if let Some(&index) = self.cache.get(name) {
            return index;
        }
        let index = self.names.len() as u16;
        self.names.push(name.to_string());
        self.cache.insert(name.to_string(), index);
        index
    }

    /// Replace a names-table entry in place, updating every `FName` that
    /// references it simultaneously (they're indices, not copies).
    pub fn replace(&mut self, old: &str, new: &str) -> bool {
        let Some(index) = self.names.iter().position(|n| n == old) else {
            return false;
        };
        self.names[index] = new.to_string();
        self.cache.remove(old);
        self.cache.insert(new.to_string(), index as u16);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip_fstring(value: Option<&str>) -> Option<String> {
        let mut w = ByteWriter::new();
        write_fstring(&mut w, value);
        let bytes = w.finalize();
        let mut r = ByteReader::new(&bytes);
        read_fstring(&mut r).unwrap()
    }

    #[test]
    fn fstring_none_round_trips() {
        assert_eq!(round_trip_fstring(None), None);
    }

    #[test]
    fn fstring_ascii_round_trips() {
        assert_eq!(round_trip_fstring(Some("Hello")), Some("Hello".to_string()));
    }

    #[test]
    fn fstring_unicode_round_trips() {
        assert_eq!(round_trip_fstring(Some("Héllo")), Some("Héllo".to_string()));
    }

    #[test]
    fn fstring_hello_byte_layout() {
        let mut w = ByteWriter::new();
        write_fstring(&mut w, Some("Hello"));
        let bytes = w.finalize();
        assert_eq!(&bytes[0..4], &[0x06, 0x00, 0x00, 0x00]);
        assert_eq!(&bytes[4..], b"Hello\0");
    }

    #[test]
    fn fstring_none_byte_layout() {
        let mut w = ByteWriter::new();
        write_fstring(&mut w, None);
        assert_eq!(w.finalize(), vec![0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn fstring_unicode_byte_layout() {
        let mut w = ByteWriter::new();
        write_fstring(&mut w, Some("Héllo"));
        let bytes = w.finalize();
        // -2 * 6 chars (incl. null) = -12 = 0xFFFFFFF4
        assert_eq!(&bytes[0..4], &0xFFFF_FFF4u32.to_le_bytes());
    }

    #[test]
    fn utf16_length_law_examples() {
        for (s, expected) in [("á", -4i32), ("áé", -6), ("Tëst", -10)] {
            let mut w = ByteWriter::new();
            write_fstring(&mut w, Some(s));
            let bytes = w.finalize();
            let length = i32::from_le_bytes(bytes[0..4].try_into().unwrap());
            assert_eq!(length, expected, "length mismatch for {s:?}");
        }
    }

    #[test]
    fn fname_round_trips_through_index() {
        let names = vec!["None".to_string(), "HealthRegen".to_string()];
        let mut w = ByteWriter::new();
        w.write_u16(1);
        let bytes = w.finalize();
        let mut r = ByteReader::new(&bytes);
        let fname = FName::read(&mut r, &names).unwrap();
        assert_eq!(fname.name, "HealthRegen");
        assert_eq!(fname.index, 1);
        assert!(fname.number.is_none());
    }

    #[test]
    fn fname_with_instance_number() {
        let names = vec!["Actor".to_string()];
        let mut w = ByteWriter::new();
        w.write_u16(0 | NAME_HAS_NUMBER_MASK);
        w.write_i32(7);
        let bytes = w.finalize();
        let mut r = ByteReader::new(&bytes);
        let fname = FName::read(&mut r, &names).unwrap();
        assert_eq!(fname.display(), "Actor_7");
    }

    #[test]
    fn context_reuses_matching_original_index() {
        let mut ctx = Context::new(vec!["Foo".to_string(), "Bar".to_string()], None, 0);
        let fname = FName {
            name: "Bar".to_string(),
            index: 1,
            number: None,
        };
        let mut w = ByteWriter::new();
        fname.write(&mut w, &mut ctx);
        assert_eq!(ctx.names.len(), 2, "should not have grown the table");
        let bytes = w.finalize();
        assert_eq!(u16::from_le_bytes([bytes[0], bytes[1]]), 1);
    }

    #[test]
    fn context_interns_renamed_fname() {
        let mut ctx = Context::new(vec!["Foo".to_string()], None, 0);
        let fname = FName {
            name: "Renamed".to_string(),
            index: 0, // stale index: slot 0 now carries "Foo", not "Renamed"
            number: None,
        };
        let mut w = ByteWriter::new();
        fname.write(&mut w, &mut ctx);
        assert_eq!(ctx.names, vec!["Foo".to_string(), "Renamed".to_string()]);
    }

    #[test]
    fn replace_updates_every_reference_by_index() {
        let mut ctx = Context::new(
            vec!["HealthRegen".to_string(), "Other".to_string()],
            None,
            0,
        );
        assert!(ctx.replace("HealthRegen", "HealthRegenSkillCooldown"));
        assert_eq!(ctx.names[0], "HealthRegenSkillCooldown");
        assert!(!ctx.names.contains(&"HealthRegen".to_string()));
    }
}
