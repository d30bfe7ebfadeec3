//! Formatter descriptors: the registered, immutable configuration of one
//! formatter.

use std::fmt;

use unidbg_core::{Host, VersionRange};

use crate::error::Result;
use crate::formatter::Formatter;

/// How a descriptor's type pattern is compared against an observed type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// The normalized type name must equal the pattern.
    Exact,
    /// The normalized type name must match the whole regular expression.
    Regex,
}

impl MatchKind {
    /// Display name for this match kind.
    pub fn name(&self) -> &'static str {
        match self {
            MatchKind::Exact => "exact",
            MatchKind::Regex => "regex",
        }
    }
}

/// Builds a formatter instance around a raw value.
pub type Constructor<H> =
    Box<dyn Fn(&H, <H as Host>::Value) -> Result<Box<dyn Formatter<H>>>>;

/// The registered configuration for one formatter.
pub struct FormatterDescriptor<H: Host> {
    /// Category used for enable/disable toggles, e.g. `unitex`.
    pub category: String,
    /// Identifying name for diagnostics and toggles.
    pub name: String,
    /// How `type_pattern` is compared.
    pub match_kind: MatchKind,
    /// Type name or regular expression.
    pub type_pattern: String,
    /// Library versions this formatter supports (inclusive).
    pub versions: VersionRange,
    constructor: Constructor<H>,
}

impl<H: Host> FormatterDescriptor<H> {
    /// Create a descriptor. Validation happens at registration.
    pub fn new<F>(
        category: impl Into<String>,
        name: impl Into<String>,
        match_kind: MatchKind,
        type_pattern: impl Into<String>,
        versions: VersionRange,
        constructor: F,
    ) -> Self
    where
        F: Fn(&H, H::Value) -> Result<Box<dyn Formatter<H>>> + 'static,
    {
        FormatterDescriptor {
            category: category.into(),
            name: name.into(),
            match_kind,
            type_pattern: type_pattern.into(),
            versions,
            constructor: Box::new(constructor),
        }
    }

    /// Create a descriptor matching one exact type name.
    pub fn exact<F>(
        category: impl Into<String>,
        name: impl Into<String>,
        type_name: impl Into<String>,
        versions: VersionRange,
        constructor: F,
    ) -> Self
    where
        F: Fn(&H, H::Value) -> Result<Box<dyn Formatter<H>>> + 'static,
    {
        Self::new(category, name, MatchKind::Exact, type_name, versions, constructor)
    }

    /// Create a descriptor matching type names against a regular expression.
    pub fn regex<F>(
        category: impl Into<String>,
        name: impl Into<String>,
        pattern: impl Into<String>,
        versions: VersionRange,
        constructor: F,
    ) -> Self
    where
        F: Fn(&H, H::Value) -> Result<Box<dyn Formatter<H>>> + 'static,
    {
        Self::new(category, name, MatchKind::Regex, pattern, versions, constructor)
    }

    /// `category;name`, the form used by selectors and diagnostics.
    pub fn qualified_name(&self) -> String {
        format!("{};{}", self.category, self.name)
    }

    /// Run the constructor for `value`.
    pub fn construct(&self, host: &H, value: H::Value) -> Result<Box<dyn Formatter<H>>> {
        (self.constructor)(host, value)
    }
}

impl<H: Host> fmt::Debug for FormatterDescriptor<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatterDescriptor")
            .field("category", &self.category)
            .field("name", &self.name)
            .field("match_kind", &self.match_kind)
            .field("type_pattern", &self.type_pattern)
            .field("versions", &self.versions)
            .finish_non_exhaustive()
    }
}
