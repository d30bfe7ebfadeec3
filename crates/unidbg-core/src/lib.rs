//! Host-side foundations for the Unitex debugger pretty-printers.
//!
//! The printers never touch the inspected process directly. Everything they
//! need (type lookup, casts, member access, memory reads, address formatting)
//! goes through the [`Host`] trait, which a debugger integration implements.
//!
//! ## Modules
//!
//! - [`host`]: The capability trait consumed by formatters
//! - [`version`]: Library version parsing and inclusive version ranges
//! - [`image`]: [`ProcessImage`], a snapshot-backed host for tests and offline inspection
//! - [`error`]: Host error taxonomy

pub mod error;
pub mod host;
pub mod image;
pub mod version;

// Re-exports for convenience.
pub use error::{HostError, Result};
pub use host::{normalize_type_name, Host};
pub use image::{ImageValue, ProcessImage};
pub use version::{parse_library_version, Version, VersionRange};
