//! CLI command implementations.

pub mod info;
pub mod print;
pub mod version;

use std::path::Path;

use anyhow::{Context, Result};
use unidbg_core::ProcessImage;
use unidbg_registry::{FormatterRegistry, PrinterSelector, Session};
use unidbg_unitex::register_unitex_printers;

use crate::config::Config;

/// Printer toggles from the command line, applied after the configuration.
#[derive(Debug, Clone, Default)]
pub struct Toggles {
    pub enable: Vec<String>,
    pub disable: Vec<String>,
}

/// Load a snapshot and attach a session with the Unitex printers.
pub fn open_session(snapshot: &Path, config: &Config, toggles: &Toggles) -> Result<Session<ProcessImage>> {
    let image = ProcessImage::load(snapshot)
        .with_context(|| format!("loading snapshot {}", snapshot.display()))?;

    let mut registry = FormatterRegistry::new();
    let failures = register_unitex_printers(&mut registry, config.limits());
    if !failures.is_empty() {
        log::warn!("{} printer(s) failed to register", failures.len());
    }

    let disabled = config.printers.disabled.iter().chain(&toggles.disable);
    for selector in disabled {
        let selector = PrinterSelector::parse(selector)?;
        registry.set_enabled(&selector, false);
    }
    for selector in &toggles.enable {
        let selector = PrinterSelector::parse(selector)?;
        registry.set_enabled(&selector, true);
    }

    let mut session = Session::attach(image, registry);
    if let Some(version) = config.version_override()? {
        session = session.with_version(version);
    }
    Ok(session)
}
