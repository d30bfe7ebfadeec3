//! `unidbg version`: show the library version the printers are gated on.

use anyhow::Result;
use unidbg_core::{Host, ProcessImage};
use unidbg_registry::Session;
use unidbg_unitex::supported_versions;

/// Describe the session's library version and whether the printers apply.
pub fn describe(session: &Session<ProcessImage>) -> String {
    let supported = supported_versions();
    match session.version() {
        Some(v) if supported.contains(v) => format!("Unitex {v} (printers active)"),
        Some(v) => format!("Unitex {v} (printers inactive, they support {supported})"),
        None => match session.host().detected_library_version() {
            Err(e) => format!("Unitex version unknown: {e}"),
            Ok(v) => format!("Unitex {v}"),
        },
    }
}

/// Print the version description.
pub fn run(session: &Session<ProcessImage>) -> Result<()> {
    println!("{}", describe(session));
    Ok(())
}
