//! On-disk snapshot format for [`ProcessImage`](super::ProcessImage).
//!
//! A snapshot is a TOML document describing the types, memory and named
//! variables of an inspected process:
//!
//! ```toml
//! [library]
//! version = "3.3.0"
//!
//! [[types]]
//! kind = "struct"
//! name = "unitex::Ustring"
//! size = 16
//! fields = [
//!   { name = "str", type = "unitex::unichar *", offset = 0 },
//!   { name = "size", type = "int", offset = 8 },
//!   { name = "len", type = "int", offset = 12 },
//! ]
//!
//! [[memory]]
//! address = 0x1000
//! utf16 = "hello"
//!
//! [[variables]]
//! name = "s"
//! type = "unitex::Ustring"
//! address = 0x2000
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{HostError, Result};

/// The top-level snapshot document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Information about the inspected library.
    #[serde(default)]
    pub library: LibraryInfo,
    /// User-declared types, in addition to the built-in scalars.
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    /// Mapped memory segments.
    #[serde(default)]
    pub memory: Vec<SegmentDecl>,
    /// Named variables (also used as address symbols).
    #[serde(default)]
    pub variables: Vec<VariableDecl>,
}

/// The `[library]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryInfo {
    /// Version string as reported by the library, e.g. "3.3.0-beta".
    #[serde(default)]
    pub version: Option<String>,
    /// Size of a pointer in bytes (4 or 8).
    #[serde(default = "default_pointer_size")]
    pub pointer_size: u8,
}

impl Default for LibraryInfo {
    fn default() -> Self {
        LibraryInfo {
            version: None,
            pointer_size: default_pointer_size(),
        }
    }
}

fn default_pointer_size() -> u8 {
    8
}

/// A type declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeDecl {
    /// A structure with explicitly laid-out fields.
    Struct {
        name: String,
        size: u64,
        #[serde(default)]
        fields: Vec<FieldDecl>,
    },
    /// A fixed-width integer.
    Int {
        name: String,
        size: u8,
        #[serde(default)]
        signed: bool,
    },
    /// An alias for another type.
    Typedef { name: String, target: String },
}

impl TypeDecl {
    /// The declared name.
    pub fn name(&self) -> &str {
        match self {
            TypeDecl::Struct { name, .. }
            | TypeDecl::Int { name, .. }
            | TypeDecl::Typedef { name, .. } => name,
        }
    }
}

/// A structure member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Member name.
    pub name: String,
    /// Member type name.
    #[serde(rename = "type")]
    pub ty: String,
    /// Byte offset from the start of the structure.
    pub offset: u64,
}

/// A mapped memory segment. Exactly one of `hex`, `utf16` or `size` gives
/// the contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentDecl {
    /// Start address.
    pub address: u64,
    /// Raw bytes as hex pairs, whitespace allowed.
    #[serde(default)]
    pub hex: Option<String>,
    /// Text stored as little-endian 16-bit code units.
    #[serde(default)]
    pub utf16: Option<String>,
    /// Segment length when filled with a constant byte.
    #[serde(default)]
    pub size: Option<u64>,
    /// Fill byte used with `size`.
    #[serde(default)]
    pub fill: u8,
    /// Storage that is mapped but not yet constructed.
    #[serde(default)]
    pub uninitialized: bool,
}

/// Largest segment a `size` declaration may map.
pub const MAX_SEGMENT_SIZE: u64 = 1 << 24;

impl SegmentDecl {
    /// Decode the segment contents.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        match (&self.hex, &self.utf16, self.size) {
            (Some(hex), None, None) => parse_hex(hex).ok_or_else(|| HostError::InvalidSnapshot {
                detail: format!("segment at {:#x}: malformed hex bytes", self.address),
            }),
            (None, Some(text), None) => Ok(text
                .encode_utf16()
                .flat_map(|unit| unit.to_le_bytes())
                .collect()),
            (None, None, Some(size)) if size > MAX_SEGMENT_SIZE => Err(HostError::InvalidSnapshot {
                detail: format!(
                    "segment at {:#x}: size {size} exceeds the {MAX_SEGMENT_SIZE} byte limit",
                    self.address
                ),
            }),
            (None, None, Some(size)) => Ok(vec![self.fill; size as usize]),
            _ => Err(HostError::InvalidSnapshot {
                detail: format!(
                    "segment at {:#x} must set exactly one of `hex`, `utf16` or `size`",
                    self.address
                ),
            }),
        }
    }
}

/// A named variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableDecl {
    /// Variable name.
    pub name: String,
    /// Declared type name.
    #[serde(rename = "type")]
    pub ty: String,
    /// Address of the variable's storage.
    pub address: u64,
}

fn parse_hex(s: &str) -> Option<Vec<u8>> {
    let digits: Vec<u8> = s.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return None;
    }
    digits
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).ok()?;
            u8::from_str_radix(pair, 16).ok()
        })
        .collect()
}
