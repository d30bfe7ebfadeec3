//! Formatter registry for debugger pretty-printers.
//!
//! Formatters are registered once, at extension load, as descriptors tagged
//! with a type-name pattern and the range of library versions they support.
//! For each value the debugger is about to display, the registry picks the
//! best-matching descriptor for the detected library version and builds a
//! short-lived formatter around the value.
//!
//! # Architecture
//!
//! - **Descriptors**: the immutable name, category, exact or regex pattern,
//!   version range and constructor of one formatter
//! - **Registry**: the catalog, with resolution and enable/disable toggles
//! - **Session**: a host plus a registry, with the library version detected
//!   once and a generic fallback for values no formatter claims

pub mod descriptor;
pub mod error;
pub mod formatter;
pub mod registry;
pub mod session;

// Re-exports for convenience.
pub use descriptor::{Constructor, FormatterDescriptor, MatchKind};
pub use error::{FormatError, RegistryError, Result};
pub use formatter::{Formatter, RenderContext, Rendered, TrivialFormatter, Visualizer};
pub use registry::{CatalogEntry, DescriptorId, FormatterRegistry, PrinterSelector};
pub use session::Session;
