//! A snapshot-backed [`Host`] implementation.
//!
//! `ProcessImage` holds a frozen picture of an inspected process: its type
//! table, mapped memory and named variables. It answers every host query
//! the printers make, which lets the whole formatting pipeline run without a
//! live debugger (offline inspection, tests).

pub mod snapshot;

use std::collections::HashMap;
use std::path::Path;

use crate::error::{HostError, Result};
use crate::host::{normalize_type_name, Host};
use crate::version::{self, Version};

pub use snapshot::{FieldDecl, LibraryInfo, SegmentDecl, Snapshot, TypeDecl, VariableDecl};

/// Maximum typedef chain length followed before giving up.
const MAX_TYPEDEF_DEPTH: usize = 16;

/// Nesting depth after which `default_text` elides structure contents.
const MAX_DEFAULT_TEXT_DEPTH: usize = 4;

/// Built-in scalar types: (name, size, signed).
const BUILTIN_INTS: &[(&str, u8, bool)] = &[
    ("char", 1, true),
    ("signed char", 1, true),
    ("unsigned char", 1, false),
    ("short", 2, true),
    ("unsigned short", 2, false),
    ("int", 4, true),
    ("unsigned int", 4, false),
    ("long", 8, true),
    ("unsigned long", 8, false),
    ("long long", 8, true),
    ("unsigned long long", 8, false),
];

/// Built-in aliases: (name, target).
const BUILTIN_TYPEDEFS: &[(&str, &str)] = &[
    ("unitex::unichar", "unsigned short"),
    ("unichar", "unitex::unichar"),
];

/// A type handle issued by a [`ProcessImage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageType {
    name: String,
}

impl ImageType {
    /// The normalized type name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Where a value's bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// In the image's memory at this address.
    Memory(u64),
    /// Detached bytes, not backed by image memory.
    Immediate(Vec<u8>),
}

/// A value handle issued by a [`ProcessImage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageValue {
    ty: String,
    location: Location,
}

impl ImageValue {
    /// A value of type `ty` stored at `address`.
    pub fn at(ty: impl Into<String>, address: u64) -> Self {
        ImageValue {
            ty: ty.into(),
            location: Location::Memory(address),
        }
    }

    /// A value of type `ty` holding `bytes` (little-endian).
    pub fn immediate(ty: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        ImageValue {
            ty: ty.into(),
            location: Location::Immediate(bytes.into()),
        }
    }

    /// Declared type name.
    pub fn type_name(&self) -> &str {
        &self.ty
    }

    /// Storage location.
    pub fn location(&self) -> &Location {
        &self.location
    }
}

#[derive(Debug, Clone)]
enum TypeDef {
    Int { size: u8, signed: bool },
    Pointer { target: String },
    Struct { size: u64, fields: Vec<FieldDecl> },
    Typedef { target: String },
}

#[derive(Debug, Clone)]
struct Segment {
    start: u64,
    bytes: Vec<u8>,
    uninitialized: bool,
}

impl Segment {
    fn end(&self) -> u64 {
        self.start + self.bytes.len() as u64
    }

    fn overlaps(&self, start: u64, len: u64) -> bool {
        start < self.end() && self.start < start.saturating_add(len)
    }
}

/// A frozen process image answering host queries.
#[derive(Debug, Clone)]
pub struct ProcessImage {
    version: Option<String>,
    pointer_size: u8,
    types: HashMap<String, TypeDef>,
    segments: Vec<Segment>,
    variables: Vec<VariableDecl>,
}

impl ProcessImage {
    /// Load a snapshot file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| HostError::SnapshotIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse a snapshot from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let snapshot: Snapshot = toml::from_str(content)?;
        Self::from_snapshot(snapshot)
    }

    /// Build an image from a parsed snapshot, validating its tables.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        let pointer_size = snapshot.library.pointer_size;
        if pointer_size != 4 && pointer_size != 8 {
            return Err(HostError::InvalidSnapshot {
                detail: format!("pointer_size must be 4 or 8, got {pointer_size}"),
            });
        }

        let mut types = HashMap::new();
        for &(name, size, signed) in BUILTIN_INTS {
            types.insert(name.to_string(), TypeDef::Int { size, signed });
        }
        for &(name, target) in BUILTIN_TYPEDEFS {
            types.insert(
                name.to_string(),
                TypeDef::Typedef {
                    target: target.to_string(),
                },
            );
        }

        for decl in snapshot.types {
            let name = normalize_type_name(decl.name());
            if name.ends_with('*') {
                return Err(HostError::InvalidSnapshot {
                    detail: format!("pointer types are implicit and cannot be declared: '{name}'"),
                });
            }
            let def = match decl {
                TypeDecl::Struct { size, fields, .. } => {
                    if let Some(field) = fields.iter().find(|f| f.offset >= size) {
                        return Err(HostError::InvalidSnapshot {
                            detail: format!(
                                "field '{}' of '{name}' lies outside the structure",
                                field.name
                            ),
                        });
                    }
                    TypeDef::Struct { size, fields }
                }
                TypeDecl::Int { size, signed, .. } => {
                    if !matches!(size, 1 | 2 | 4 | 8) {
                        return Err(HostError::InvalidSnapshot {
                            detail: format!("integer type '{name}' has unsupported size {size}"),
                        });
                    }
                    TypeDef::Int { size, signed }
                }
                TypeDecl::Typedef { target, .. } => TypeDef::Typedef {
                    target: normalize_type_name(&target),
                },
            };
            types.insert(name, def);
        }

        let mut segments: Vec<Segment> = Vec::with_capacity(snapshot.memory.len());
        for decl in &snapshot.memory {
            let bytes = decl.bytes()?;
            let segment = Segment {
                start: decl.address,
                bytes,
                uninitialized: decl.uninitialized,
            };
            if segment.bytes.is_empty() {
                continue;
            }
            if let Some(existing) = segments
                .iter()
                .find(|s| s.overlaps(segment.start, segment.bytes.len() as u64))
            {
                return Err(HostError::InvalidSnapshot {
                    detail: format!(
                        "segment at {:#x} overlaps segment at {:#x}",
                        segment.start, existing.start
                    ),
                });
            }
            segments.push(segment);
        }
        segments.sort_by_key(|s| s.start);

        let image = ProcessImage {
            version: snapshot.library.version,
            pointer_size,
            types,
            segments,
            variables: snapshot.variables,
        };

        // Every declared name must resolve, including through typedef chains.
        for name in image.types.keys() {
            image.size_of(name)?;
        }
        for var in &image.variables {
            image.size_of(&var.ty)?;
        }

        log::debug!(
            "loaded process image: {} types, {} segments, {} variables",
            image.types.len(),
            image.segments.len(),
            image.variables.len()
        );
        Ok(image)
    }

    /// Names of all variables, in declaration order.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.name.as_str())
    }

    /// Look up a variable by name.
    pub fn variable(&self, name: &str) -> Result<ImageValue> {
        self.variables
            .iter()
            .find(|v| v.name == name)
            .map(|v| ImageValue::at(v.ty.clone(), v.address))
            .ok_or_else(|| HostError::UnknownSymbol {
                name: name.to_string(),
            })
    }

    /// Evaluate a simple access path: optional leading `*` dereferences,
    /// a variable name, then `.field` members, e.g. `*str.data_`.
    ///
    /// Dereferences bind loosest, as in C.
    pub fn evaluate(&self, expr: &str) -> Result<ImageValue> {
        let expr = expr.trim();
        let derefs = expr.chars().take_while(|&c| c == '*').count();
        let path = expr[derefs..].trim();
        let mut parts = path.split('.');
        let root = parts.next().unwrap_or_default().trim();
        let mut value = self.variable(root)?;
        for member in parts {
            value = self.field(&value, member.trim())?;
        }
        for _ in 0..derefs {
            value = self.dereference(&value)?;
        }
        Ok(value)
    }

    fn resolve(&self, name: &str) -> Result<TypeDef> {
        let normalized = normalize_type_name(name);
        if let Some(target) = normalized.strip_suffix('*') {
            return Ok(TypeDef::Pointer {
                target: target.trim_end().to_string(),
            });
        }
        self.types
            .get(&normalized)
            .cloned()
            .ok_or(HostError::TypeNotFound { name: normalized })
    }

    /// Resolve a type, following typedefs to the underlying definition.
    fn strip_typedefs(&self, name: &str) -> Result<TypeDef> {
        let mut def = self.resolve(name)?;
        for _ in 0..MAX_TYPEDEF_DEPTH {
            match def {
                TypeDef::Typedef { target } => def = self.resolve(&target)?,
                other => return Ok(other),
            }
        }
        Err(HostError::InvalidSnapshot {
            detail: format!("typedef chain for '{name}' is too deep or cyclic"),
        })
    }

    fn size_of(&self, name: &str) -> Result<u64> {
        Ok(match self.strip_typedefs(name)? {
            TypeDef::Int { size, .. } => u64::from(size),
            TypeDef::Pointer { .. } => u64::from(self.pointer_size),
            TypeDef::Struct { size, .. } => size,
            TypeDef::Typedef { .. } => unreachable!("typedefs are stripped"),
        })
    }

    /// Read `len` bytes starting at `address`. Reads may span adjacent
    /// segments but never unmapped gaps.
    fn read_memory(&self, address: u64, len: usize) -> Result<Vec<u8>> {
        let fault = || HostError::MemoryRead {
            address,
            length: len,
        };
        // Grows one segment at a time; `len` may be far past the mapping.
        let mut out = Vec::new();
        let mut cursor = address;
        while out.len() < len {
            let segment = self
                .segments
                .iter()
                .find(|s| s.start <= cursor && cursor < s.end())
                .ok_or_else(fault)?;
            let offset = (cursor - segment.start) as usize;
            let take = (len - out.len()).min(segment.bytes.len() - offset);
            out.extend_from_slice(&segment.bytes[offset..offset + take]);
            cursor = cursor.checked_add(take as u64).ok_or_else(fault)?;
            if take == 0 {
                break;
            }
        }
        Ok(out)
    }

    fn is_uninitialized(&self, address: u64, len: u64) -> bool {
        self.segments
            .iter()
            .any(|s| s.uninitialized && s.overlaps(address, len))
    }

    fn value_bytes(&self, value: &ImageValue) -> Result<Vec<u8>> {
        let size = self.size_of(&value.ty)? as usize;
        match &value.location {
            Location::Memory(address) => self.read_memory(*address, size),
            Location::Immediate(bytes) => {
                bytes
                    .get(..size)
                    .map(<[u8]>::to_vec)
                    .ok_or_else(|| HostError::InvalidSnapshot {
                        detail: format!(
                            "immediate value of type '{}' holds {} bytes, needs {size}",
                            value.ty,
                            bytes.len()
                        ),
                    })
            }
        }
    }

    fn symbol_at(&self, address: u64) -> Option<&str> {
        self.variables
            .iter()
            .find(|v| v.address == address)
            .map(|v| v.name.as_str())
    }

    fn render(&self, value: &ImageValue, depth: usize) -> Result<String> {
        match self.strip_typedefs(&value.ty)? {
            TypeDef::Int { .. } => Ok(self.as_integer(value)?.to_string()),
            TypeDef::Pointer { .. } => self.format_address(value),
            TypeDef::Struct { fields, .. } => {
                if depth >= MAX_DEFAULT_TEXT_DEPTH {
                    return Ok("{...}".to_string());
                }
                let members: Vec<String> = fields
                    .iter()
                    .map(|f| {
                        let text = self
                            .field(value, &f.name)
                            .and_then(|member| self.render(&member, depth + 1))
                            .unwrap_or_else(|e| format!("<error: {e}>"));
                        format!("{} = {}", f.name, text)
                    })
                    .collect();
                Ok(format!("{{{}}}", members.join(", ")))
            }
            TypeDef::Typedef { .. } => unreachable!("typedefs are stripped"),
        }
    }
}

impl Host for ProcessImage {
    type Value = ImageValue;
    type Type = ImageType;

    fn lookup_type(&self, name: &str) -> Result<ImageType> {
        self.resolve(name)?;
        Ok(ImageType {
            name: normalize_type_name(name),
        })
    }

    fn pointer_type(&self, ty: &ImageType) -> ImageType {
        ImageType {
            name: format!("{} *", ty.name),
        }
    }

    fn type_name(&self, value: &ImageValue) -> Option<String> {
        Some(value.ty.clone())
    }

    fn cast(&self, value: &ImageValue, ty: &ImageType) -> Result<ImageValue> {
        let cast_failed = || HostError::CastFailed {
            from: value.ty.clone(),
            to: ty.name.clone(),
        };
        let from = self.strip_typedefs(&value.ty)?;
        let to = self.strip_typedefs(&ty.name)?;
        let same_shape = match (&from, &to) {
            (TypeDef::Pointer { .. }, TypeDef::Pointer { .. }) => true,
            (TypeDef::Pointer { .. }, _) | (_, TypeDef::Pointer { .. }) => false,
            _ => self.size_of(&value.ty)? == self.size_of(&ty.name)?,
        };
        if !same_shape {
            return Err(cast_failed());
        }

        if let Location::Memory(address) = value.location {
            let size = self.size_of(&ty.name)?;
            if self.is_uninitialized(address, size) {
                return Err(cast_failed());
            }
            self.read_memory(address, size as usize)?;
        }

        Ok(ImageValue {
            ty: ty.name.clone(),
            location: value.location.clone(),
        })
    }

    fn dereference(&self, pointer: &ImageValue) -> Result<ImageValue> {
        let target = match self.strip_typedefs(&pointer.ty)? {
            TypeDef::Pointer { target } => target,
            _ => {
                return Err(HostError::NotAPointer {
                    type_name: pointer.ty.clone(),
                })
            }
        };
        let address = self.pointer_address(pointer)?;
        if address == 0 {
            return Err(HostError::NullPointer {
                type_name: pointer.ty.clone(),
            });
        }
        let size = self.size_of(&target)?;
        self.read_memory(address, size as usize)?;
        Ok(ImageValue::at(target, address))
    }

    fn field(&self, value: &ImageValue, name: &str) -> Result<ImageValue> {
        let no_such_field = || HostError::NoSuchField {
            type_name: value.ty.clone(),
            field: name.to_string(),
        };
        let fields = match self.strip_typedefs(&value.ty)? {
            TypeDef::Struct { fields, .. } => fields,
            _ => return Err(no_such_field()),
        };
        let field = fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(no_such_field)?;

        let location = match &value.location {
            Location::Memory(address) => Location::Memory(address + field.offset),
            Location::Immediate(bytes) => {
                let start = field.offset as usize;
                let end = start + self.size_of(&field.ty)? as usize;
                let slice = bytes.get(start..end).ok_or_else(|| HostError::InvalidSnapshot {
                    detail: format!("immediate '{}' too short for field '{name}'", value.ty),
                })?;
                Location::Immediate(slice.to_vec())
            }
        };
        Ok(ImageValue {
            ty: field.ty.clone(),
            location,
        })
    }

    fn as_integer(&self, value: &ImageValue) -> Result<i64> {
        let (size, signed) = match self.strip_typedefs(&value.ty)? {
            TypeDef::Int { size, signed } => (size, signed),
            _ => {
                return Err(HostError::NotAnInteger {
                    type_name: value.ty.clone(),
                })
            }
        };
        let bytes = self.value_bytes(value)?;
        Ok(decode_le(&bytes, size, signed))
    }

    fn pointer_address(&self, pointer: &ImageValue) -> Result<u64> {
        match self.strip_typedefs(&pointer.ty)? {
            TypeDef::Pointer { .. } => {}
            _ => {
                return Err(HostError::NotAPointer {
                    type_name: pointer.ty.clone(),
                })
            }
        }
        let bytes = self.value_bytes(pointer)?;
        Ok(decode_le(&bytes, self.pointer_size, false) as u64)
    }

    fn read_code_units(&self, pointer: &ImageValue, count: usize) -> Result<Vec<u32>> {
        let target = match self.strip_typedefs(&pointer.ty)? {
            TypeDef::Pointer { target } => target,
            _ => {
                return Err(HostError::NotAPointer {
                    type_name: pointer.ty.clone(),
                })
            }
        };
        let unit = match self.strip_typedefs(&target)? {
            TypeDef::Int { size, .. } if size <= 4 => size,
            _ => {
                return Err(HostError::NotAnInteger {
                    type_name: target,
                })
            }
        };
        let address = self.pointer_address(pointer)?;
        if address == 0 {
            return Err(HostError::NullPointer {
                type_name: pointer.ty.clone(),
            });
        }
        let len = count
            .checked_mul(usize::from(unit))
            .ok_or(HostError::MemoryRead {
                address,
                length: usize::MAX,
            })?;
        let bytes = self.read_memory(address, len)?;
        Ok(bytes
            .chunks(usize::from(unit))
            .map(|chunk| decode_le(chunk, unit, false) as u32)
            .collect())
    }

    fn format_address(&self, pointer: &ImageValue) -> Result<String> {
        let address = self.pointer_address(pointer)?;
        Ok(match self.symbol_at(address) {
            Some(symbol) if address != 0 => format!("{address:#x} <{symbol}>"),
            _ => format!("{address:#x}"),
        })
    }

    fn default_text(&self, value: &ImageValue) -> Result<String> {
        self.render(value, 0)
    }

    fn detected_library_version(&self) -> Result<Version> {
        match &self.version {
            Some(v) => version::parse_library_version(v),
            None => Err(HostError::VersionUnavailable {
                detail: "snapshot does not record a library version".to_string(),
            }),
        }
    }
}

fn decode_le(bytes: &[u8], size: u8, signed: bool) -> i64 {
    let size = usize::from(size).min(bytes.len()).min(8);
    let mut raw = [0u8; 8];
    raw[..size].copy_from_slice(&bytes[..size]);
    let unsigned = u64::from_le_bytes(raw);
    if signed && size < 8 {
        let shift = 64 - 8 * size as u32;
        ((unsigned << shift) as i64) >> shift
    } else {
        unsigned as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IMAGE: &str = r#"
        [library]
        version = "3.3.0-beta"

        [[types]]
        kind = "struct"
        name = "unitex::Ustring"
        size = 16
        fields = [
          { name = "str", type = "unitex::unichar *", offset = 0 },
          { name = "size", type = "int", offset = 8 },
          { name = "len", type = "int", offset = 12 },
        ]

        [[memory]]
        address = 0x1000
        utf16 = "hello"

        [[memory]]
        address = 0x2000
        hex = "00 10 00 00 00 00 00 00  08 00 00 00  05 00 00 00"

        [[memory]]
        address = 0x3000
        size = 16
        fill = 0xcd
        uninitialized = true

        [[memory]]
        address = 0x4000
        hex = "fe ff ff ff"

        [[variables]]
        name = "greeting"
        type = "unitex::Ustring"
        address = 0x2000

        [[variables]]
        name = "pending"
        type = "unitex::Ustring"
        address = 0x3000

        [[variables]]
        name = "delta"
        type = "int"
        address = 0x4000
    "#;

    fn image() -> ProcessImage {
        ProcessImage::from_toml_str(IMAGE).unwrap()
    }

    #[test]
    fn field_access_and_integers() {
        let img = image();
        let s = img.variable("greeting").unwrap();
        let len = img.field(&s, "len").unwrap();
        let size = img.field(&s, "size").unwrap();
        assert_eq!(img.as_integer(&len).unwrap(), 5);
        assert_eq!(img.as_integer(&size).unwrap(), 8);
        assert_eq!(img.as_integer(&img.variable("delta").unwrap()).unwrap(), -2);
    }

    #[test]
    fn missing_field_is_reported() {
        let img = image();
        let s = img.variable("greeting").unwrap();
        assert!(matches!(
            img.field(&s, "data_"),
            Err(HostError::NoSuchField { .. })
        ));
    }

    #[test]
    fn read_code_units_through_pointer() {
        let img = image();
        let s = img.variable("greeting").unwrap();
        let ptr = img.field(&s, "str").unwrap();
        assert_eq!(img.pointer_address(&ptr).unwrap(), 0x1000);
        let units = img.read_code_units(&ptr, 5).unwrap();
        let text: String = units
            .iter()
            .map(|&u| char::from_u32(u).unwrap())
            .collect();
        assert_eq!(text, "hello");
    }

    #[test]
    fn reading_past_mapping_fails() {
        let img = image();
        let s = img.variable("greeting").unwrap();
        let ptr = img.field(&s, "str").unwrap();
        assert!(matches!(
            img.read_code_units(&ptr, 6),
            Err(HostError::MemoryRead { .. })
        ));
    }

    #[test]
    fn huge_read_past_mapping_fails() {
        let img = image();
        let s = img.variable("greeting").unwrap();
        let ptr = img.field(&s, "str").unwrap();
        assert!(matches!(
            img.read_code_units(&ptr, i32::MAX as usize),
            Err(HostError::MemoryRead { .. })
        ));
        assert!(matches!(
            img.read_code_units(&ptr, usize::MAX),
            Err(HostError::MemoryRead { .. })
        ));
    }

    #[test]
    fn cast_over_uninitialized_storage_fails() {
        let img = image();
        let unichar_ptr = img.pointer_type(&img.lookup_type("unitex::unichar").unwrap());
        let pending = img.variable("pending").unwrap();
        let buffer = img.field(&pending, "str").unwrap();
        assert!(matches!(
            img.cast(&buffer, &unichar_ptr),
            Err(HostError::CastFailed { .. })
        ));

        let greeting = img.variable("greeting").unwrap();
        let buffer = img.field(&greeting, "str").unwrap();
        assert!(img.cast(&buffer, &unichar_ptr).is_ok());
    }

    #[test]
    fn cast_between_pointer_and_integer_fails() {
        let img = image();
        let int_ty = img.lookup_type("int").unwrap();
        let greeting = img.variable("greeting").unwrap();
        let buffer = img.field(&greeting, "str").unwrap();
        assert!(matches!(
            img.cast(&buffer, &int_ty),
            Err(HostError::CastFailed { .. })
        ));
    }

    #[test]
    fn dereference_null_and_unmapped() {
        let img = image();
        let null = ImageValue::immediate("unitex::Ustring *", 0u64.to_le_bytes());
        assert!(matches!(
            img.dereference(&null),
            Err(HostError::NullPointer { .. })
        ));
        let wild = ImageValue::immediate("unitex::Ustring *", 0xdead_0000u64.to_le_bytes());
        assert!(matches!(
            img.dereference(&wild),
            Err(HostError::MemoryRead { .. })
        ));
        let good = ImageValue::immediate("unitex::Ustring *", 0x2000u64.to_le_bytes());
        assert_eq!(img.dereference(&good).unwrap(), img.variable("greeting").unwrap());
    }

    #[test]
    fn format_address_names_symbols() {
        let img = image();
        let to_var = ImageValue::immediate("int *", 0x4000u64.to_le_bytes());
        assert_eq!(img.format_address(&to_var).unwrap(), "0x4000 <delta>");
        let anon = ImageValue::immediate("int *", 0x1000u64.to_le_bytes());
        assert_eq!(img.format_address(&anon).unwrap(), "0x1000");
    }

    #[test]
    fn default_text_renders_structs() {
        let img = image();
        let s = img.variable("greeting").unwrap();
        assert_eq!(
            img.default_text(&s).unwrap(),
            "{str = 0x1000, size = 8, len = 5}"
        );
    }

    #[test]
    fn evaluate_paths() {
        let img = image();
        let len = img.evaluate("greeting.len").unwrap();
        assert_eq!(img.as_integer(&len).unwrap(), 5);
        let first = img.evaluate("*greeting.str").unwrap();
        assert_eq!(img.as_integer(&first).unwrap(), 'h' as i64);
        assert!(matches!(
            img.evaluate("nothing"),
            Err(HostError::UnknownSymbol { .. })
        ));
    }

    #[test]
    fn library_version_is_normalized() {
        assert_eq!(
            image().detected_library_version().unwrap(),
            Version::new(3, 3, 0)
        );
        let unversioned = ProcessImage::from_toml_str("").unwrap();
        assert!(matches!(
            unversioned.detected_library_version(),
            Err(HostError::VersionUnavailable { .. })
        ));
    }

    #[test]
    fn rejects_overlapping_segments() {
        let doc = r#"
            [[memory]]
            address = 0x10
            size = 8

            [[memory]]
            address = 0x14
            size = 8
        "#;
        assert!(matches!(
            ProcessImage::from_toml_str(doc),
            Err(HostError::InvalidSnapshot { .. })
        ));
    }

    #[test]
    fn unknown_field_type_surfaces_on_access() {
        let doc = r#"
            [[types]]
            kind = "struct"
            name = "broken"
            size = 4
            fields = [{ name = "x", type = "mystery", offset = 0 }]

            [[variables]]
            name = "b"
            type = "broken"
            address = 0
        "#;
        let img = ProcessImage::from_toml_str(doc).unwrap();
        let b = img.variable("b").unwrap();
        let x = img.field(&b, "x").unwrap();
        assert!(matches!(
            img.as_integer(&x),
            Err(HostError::TypeNotFound { .. })
        ));
    }

    #[test]
    fn rejects_cyclic_typedefs() {
        let doc = r#"
            [[types]]
            kind = "typedef"
            name = "a"
            target = "b"

            [[types]]
            kind = "typedef"
            name = "b"
            target = "a"
        "#;
        assert!(ProcessImage::from_toml_str(doc).is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("core.toml");
        std::fs::write(&path, IMAGE).unwrap();
        let img = ProcessImage::load(&path).unwrap();
        assert_eq!(img.variable_names().collect::<Vec<_>>(), ["greeting", "pending", "delta"]);

        let missing = ProcessImage::load(&dir.path().join("absent.toml"));
        assert!(matches!(missing, Err(HostError::SnapshotIo { .. })));
    }
}
