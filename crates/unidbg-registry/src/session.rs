//! A debugging session: one host, one registry, one detected library version.

use unidbg_core::{Host, Version};

use crate::error::{FormatError, Result};
use crate::formatter::{Formatter, RenderContext, Rendered, Visualizer};
use crate::registry::FormatterRegistry;

/// How many times formatters may hand a value back before rendering gives up.
pub const MAX_DELEGATION_DEPTH: usize = 8;

/// Binds a registry to a host for the lifetime of a debugging session.
///
/// The library version is detected once, on attach. If the host cannot
/// report it, no version-gated formatter applies and every value falls back
/// to the host's default rendering.
pub struct Session<H: Host> {
    host: H,
    registry: FormatterRegistry<H>,
    version: Option<Version>,
}

impl<H: Host> Session<H> {
    /// Attach a registry to a host and detect the library version.
    pub fn attach(host: H, registry: FormatterRegistry<H>) -> Self {
        let version = match host.detected_library_version() {
            Ok(version) => {
                log::debug!("detected library version {version}");
                Some(version)
            }
            Err(e) => {
                log::warn!("{e}; formatters are disabled for this session");
                None
            }
        };
        Session {
            host,
            registry,
            version,
        }
    }

    /// Replace the detected version, e.g. from user configuration.
    pub fn with_version(mut self, version: Version) -> Self {
        log::debug!("library version overridden to {version}");
        self.version = Some(version);
        self
    }

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The registry.
    pub fn registry(&self) -> &FormatterRegistry<H> {
        &self.registry
    }

    /// Mutable access to the registry, for enable/disable toggles.
    pub fn registry_mut(&mut self) -> &mut FormatterRegistry<H> {
        &mut self.registry
    }

    /// The library version formatters are gated on, if known.
    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    /// Find and build the formatter for a value, if any applies.
    pub fn lookup(&self, value: &H::Value) -> Result<Option<Box<dyn Formatter<H>>>> {
        let Some(version) = &self.version else {
            return Ok(None);
        };
        let Some(type_name) = self.host.type_name(value) else {
            return Ok(None);
        };
        match self.registry.resolve(&type_name, version) {
            Some(id) => self
                .registry
                .instantiate(id, &self.host, value.clone())
                .map(Some),
            None => Ok(None),
        }
    }

    /// Render a value to display text.
    ///
    /// Uses the matching formatter when there is one, and the host's default
    /// representation otherwise. Errors are scoped to this value.
    pub fn render(&self, value: &H::Value) -> Result<String> {
        self.render_at_depth(value, 0)
    }

    fn render_at_depth(&self, value: &H::Value, depth: usize) -> Result<String> {
        if depth > MAX_DELEGATION_DEPTH {
            return Err(FormatError::DelegationDepth {
                limit: MAX_DELEGATION_DEPTH,
            });
        }
        let Some(formatter) = self.lookup(value)? else {
            return Ok(self.host.default_text(value)?);
        };
        let cx = RenderContext::new(&self.host, self);
        match formatter.to_display(&cx)? {
            Rendered::Text(text) => Ok(text),
            Rendered::Value(inner) => self.render_at_depth(&inner, depth + 1),
        }
    }
}

impl<H: Host> Visualizer<H> for Session<H> {
    fn find(&self, _host: &H, value: &H::Value) -> Result<Option<Box<dyn Formatter<H>>>> {
        self.lookup(value)
    }
}
