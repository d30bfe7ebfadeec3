//! Pretty-printers for the Unitex native library.
//!
//! Unitex keeps text in `unitex::Ustring`, a growable buffer of 16-bit code
//! units (`unitex::unichar`), and wraps it in `unitex::UnitexString` for
//! C++ callers. This crate decodes those records through a debugger
//! [`Host`](unidbg_core::Host) and registers the printers with a
//! [`FormatterRegistry`](unidbg_registry::FormatterRegistry).
//!
//! ## Modules
//!
//! - [`ustring`]: Buffer decoder with its closed set of outcomes
//! - [`unichar`]: Single code unit decoding and escaping
//! - [`unitex_string`]: Wrapper printer delegating to the backing buffer
//! - [`printers`]: Catalog builder registering every Unitex printer

pub mod printers;
pub mod unichar;
pub mod unitex_string;
pub mod ustring;

// Re-exports for convenience.
pub use printers::{register_unitex_printers, supported_versions, CATEGORY};
pub use unichar::{decode_scalar_char, escape_code_unit, UnicharPrinter};
pub use unitex_string::UnitexStringPrinter;
pub use ustring::{decode, decode_address, DecodeLimits, Decoded, UstringPrinter};
