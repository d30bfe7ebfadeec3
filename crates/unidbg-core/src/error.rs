//! Host error types.

use std::path::PathBuf;

/// Errors raised by a debugger host while inspecting a process.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The type is not present in the loaded image.
    #[error("no type named '{name}' in the current image")]
    TypeNotFound { name: String },

    /// The value's storage cannot be viewed as the requested type.
    #[error("cannot cast value of type '{from}' to '{to}'")]
    CastFailed { from: String, to: String },

    /// Memory at the given address is not readable.
    #[error("cannot access memory at address {address:#x} ({length} bytes)")]
    MemoryRead { address: u64, length: usize },

    /// Attempted to dereference the null address.
    #[error("attempt to dereference a null pointer of type '{type_name}'")]
    NullPointer { type_name: String },

    /// Member access on a value that has no such member.
    #[error("type '{type_name}' has no field named '{field}'")]
    NoSuchField { type_name: String, field: String },

    /// A pointer operation was applied to a non-pointer value.
    #[error("value of type '{type_name}' is not a pointer")]
    NotAPointer { type_name: String },

    /// An integer read was applied to a non-integer value.
    #[error("value of type '{type_name}' is not an integer")]
    NotAnInteger { type_name: String },

    /// No variable with this name exists in the image.
    #[error("no symbol \"{name}\" in current context")]
    UnknownSymbol { name: String },

    /// The inspected library did not report a usable version.
    #[error("library version unavailable: {detail}")]
    VersionUnavailable { detail: String },

    /// A process snapshot is structurally invalid.
    #[error("invalid process snapshot: {detail}")]
    InvalidSnapshot { detail: String },

    /// Snapshot file could not be read.
    #[error("cannot read snapshot {path}: {source}")]
    SnapshotIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias for host operations.
pub type Result<T> = std::result::Result<T, HostError>;
