//! The debugger host capability trait.
//!
//! A `Host` is whatever debugger (or offline snapshot) owns the inspected
//! process. Formatters only ever see values through it, so a debugger
//! integration and the in-memory [`ProcessImage`](crate::ProcessImage) are
//! interchangeable.

use std::fmt::Debug;

use crate::error::Result;
use crate::version::Version;

/// Introspection and memory-reading capabilities of a debugger host.
///
/// Every operation may fail. Failures are scoped to the value being
/// inspected; implementations must never abort the session.
pub trait Host {
    /// A handle to a value in the inspected process. Cloning a handle never
    /// copies the underlying memory.
    type Value: Clone + Debug;

    /// A handle to a type known to the host.
    type Type: Clone + Debug;

    /// Resolve a type by its fully-qualified name.
    fn lookup_type(&self, name: &str) -> Result<Self::Type>;

    /// The type "pointer to `ty`".
    fn pointer_type(&self, ty: &Self::Type) -> Self::Type;

    /// The declared type name of a value, if the host knows it.
    fn type_name(&self, value: &Self::Value) -> Option<String>;

    /// Reinterpret a value as another type.
    ///
    /// Fails with [`HostError::CastFailed`](crate::HostError::CastFailed)
    /// when the storage cannot be viewed as `ty`.
    fn cast(&self, value: &Self::Value, ty: &Self::Type) -> Result<Self::Value>;

    /// Read the pointee of a typed pointer.
    fn dereference(&self, pointer: &Self::Value) -> Result<Self::Value>;

    /// Structured member access.
    fn field(&self, value: &Self::Value, name: &str) -> Result<Self::Value>;

    /// Read an integer-typed value.
    fn as_integer(&self, value: &Self::Value) -> Result<i64>;

    /// Read the address held by a pointer-typed value.
    fn pointer_address(&self, pointer: &Self::Value) -> Result<u64>;

    /// Read `count` consecutive pointee-sized code units starting at the
    /// address held by `pointer`.
    fn read_code_units(&self, pointer: &Self::Value, count: usize) -> Result<Vec<u32>>;

    /// Format a pointer the way the host natively prints addresses.
    fn format_address(&self, pointer: &Self::Value) -> Result<String>;

    /// The host's generic textual representation of a value.
    fn default_text(&self, value: &Self::Value) -> Result<String>;

    /// Version of the native library loaded in the inspected process.
    fn detected_library_version(&self) -> Result<Version>;
}

/// Canonical spelling of a type name: single spaces, no cv-qualifiers,
/// pointers written as `T *`.
pub fn normalize_type_name(name: &str) -> String {
    let collapsed = name.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut rest = collapsed.as_str();
    loop {
        if let Some(stripped) = rest
            .strip_prefix("const ")
            .or_else(|| rest.strip_prefix("volatile "))
        {
            rest = stripped;
        } else {
            break;
        }
    }
    let rest = rest.strip_suffix(" const").unwrap_or(rest).trim_end();
    match rest.strip_suffix('*') {
        Some(base) => format!("{} *", normalize_type_name(base)),
        None => rest.to_string(),
    }
}
