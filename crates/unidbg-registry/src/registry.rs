//! The formatter catalog.
//!
//! Descriptors are validated and compiled once on registration. Resolution
//! filters the catalog by the detected library version and the enable
//! toggles, prefers exact matches over regex matches, and breaks remaining
//! ties by registration order.

use std::fmt;

use regex::Regex;
use unidbg_core::{normalize_type_name, Host, Version, VersionRange};

use crate::descriptor::{FormatterDescriptor, MatchKind};
use crate::error::{FormatError, RegistryError, Result};
use crate::formatter::{Formatter, TrivialFormatter};

/// Handle to a registered descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptorId(usize);

impl DescriptorId {
    /// Position in registration order.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
enum CompiledPattern {
    Exact(String),
    Regex(Regex),
}

impl CompiledPattern {
    fn matches(&self, type_name: &str) -> bool {
        match self {
            CompiledPattern::Exact(name) => name == type_name,
            CompiledPattern::Regex(re) => re.is_match(type_name),
        }
    }
}

struct Entry<H: Host> {
    descriptor: FormatterDescriptor<H>,
    pattern: CompiledPattern,
    enabled: bool,
}

/// A read-only view of one catalog entry, for listings.
#[derive(Debug, Clone)]
pub struct CatalogEntry<'a> {
    /// Handle of the descriptor.
    pub id: DescriptorId,
    /// Category name.
    pub category: &'a str,
    /// Descriptor name.
    pub name: &'a str,
    /// Match kind.
    pub match_kind: MatchKind,
    /// Pattern as registered.
    pub pattern: &'a str,
    /// Supported library versions.
    pub versions: &'a VersionRange,
    /// Whether the descriptor takes part in resolution.
    pub enabled: bool,
}

/// Selects descriptors for enable/disable: `category` or `category;name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrinterSelector {
    /// Category to select.
    pub category: String,
    /// Optional descriptor name within the category.
    pub name: Option<String>,
}

impl PrinterSelector {
    /// Parse a selector string.
    pub fn parse(s: &str) -> std::result::Result<Self, RegistryError> {
        let invalid = || RegistryError::InvalidSelector {
            selector: s.to_string(),
        };
        let mut parts = s.trim().splitn(2, ';');
        let category = parts.next().map(str::trim).unwrap_or_default();
        if category.is_empty() {
            return Err(invalid());
        }
        let name = match parts.next().map(str::trim) {
            None => None,
            Some("") => return Err(invalid()),
            Some(name) => Some(name.to_string()),
        };
        Ok(PrinterSelector {
            category: category.to_string(),
            name,
        })
    }

    /// Whether a descriptor falls under this selector.
    pub fn selects<H: Host>(&self, descriptor: &FormatterDescriptor<H>) -> bool {
        descriptor.category == self.category
            && self.name.as_deref().map_or(true, |n| n == descriptor.name)
    }
}

impl fmt::Display for PrinterSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{};{}", self.category, name),
            None => write!(f, "{}", self.category),
        }
    }
}

/// The catalog of registered formatters.
pub struct FormatterRegistry<H: Host> {
    entries: Vec<Entry<H>>,
}

impl<H: Host> Default for FormatterRegistry<H> {
    fn default() -> Self {
        FormatterRegistry {
            entries: Vec::new(),
        }
    }
}

impl<H: Host> FormatterRegistry<H> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor to the catalog.
    ///
    /// Rejects empty patterns, inverted version ranges and regexes that do
    /// not compile; a rejected descriptor is not added.
    pub fn register(
        &mut self,
        descriptor: FormatterDescriptor<H>,
    ) -> std::result::Result<DescriptorId, RegistryError> {
        if descriptor.type_pattern.trim().is_empty() {
            return Err(RegistryError::EmptyPattern {
                name: descriptor.qualified_name(),
            });
        }
        if !descriptor.versions.is_valid() {
            return Err(RegistryError::InvertedVersionRange {
                name: descriptor.qualified_name(),
                min: descriptor.versions.min.clone(),
                max: descriptor.versions.max.clone(),
            });
        }

        let pattern = match descriptor.match_kind {
            MatchKind::Exact => CompiledPattern::Exact(normalize_type_name(&descriptor.type_pattern)),
            MatchKind::Regex => {
                // Patterns must match the whole type name.
                let anchored = format!("^(?:{})$", descriptor.type_pattern);
                let re = Regex::new(&anchored).map_err(|source| RegistryError::InvalidRegex {
                    name: descriptor.qualified_name(),
                    source,
                })?;
                CompiledPattern::Regex(re)
            }
        };

        let id = DescriptorId(self.entries.len());
        log::debug!(
            "registered formatter {} ({} '{}', versions {})",
            descriptor.qualified_name(),
            descriptor.match_kind.name(),
            descriptor.type_pattern,
            descriptor.versions
        );
        self.entries.push(Entry {
            descriptor,
            pattern,
            enabled: true,
        });
        Ok(id)
    }

    /// Register a type that is rendered with the host's default
    /// representation, for any library version.
    pub fn register_trivial(
        &mut self,
        category: &str,
        type_name: &str,
    ) -> std::result::Result<DescriptorId, RegistryError>
    where
        H: 'static,
    {
        self.register(FormatterDescriptor::exact(
            category,
            type_name,
            type_name,
            VersionRange::any(),
            |_host: &H, value: H::Value| {
                Ok(Box::new(TrivialFormatter::<H>::new(value)) as Box<dyn Formatter<H>>)
            },
        ))
    }

    /// Find the best descriptor for a type name under a library version.
    ///
    /// Only enabled descriptors whose range contains `version` take part.
    /// Exact matches win over regex matches; ties go to the earliest
    /// registration.
    pub fn resolve(&self, type_name: &str, version: &Version) -> Option<DescriptorId> {
        let observed = normalize_type_name(type_name);
        let matching: Vec<(usize, &Entry<H>)> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.enabled && e.descriptor.versions.contains(version))
            .filter(|(_, e)| e.pattern.matches(&observed))
            .collect();

        let found = matching
            .iter()
            .find(|(_, e)| matches!(e.pattern, CompiledPattern::Exact(_)))
            .or_else(|| matching.first())
            .map(|&(i, _)| DescriptorId(i));

        match found {
            Some(id) => log::trace!(
                "'{observed}' @ {version} -> {}",
                self.entries[id.0].descriptor.qualified_name()
            ),
            None => log::trace!("'{observed}' @ {version} -> no formatter"),
        }
        found
    }

    /// Look up a descriptor by handle.
    pub fn descriptor(&self, id: DescriptorId) -> Option<&FormatterDescriptor<H>> {
        self.entries.get(id.0).map(|e| &e.descriptor)
    }

    /// Build a formatter instance for `value` with the descriptor's
    /// constructor. Construction errors are returned, never swallowed.
    pub fn instantiate(
        &self,
        id: DescriptorId,
        host: &H,
        value: H::Value,
    ) -> Result<Box<dyn Formatter<H>>> {
        let descriptor = self
            .descriptor(id)
            .ok_or(FormatError::Registry(RegistryError::UnknownDescriptor(id.0)))?;
        descriptor.construct(host, value)
    }

    /// Enable or disable every descriptor the selector covers. Returns the
    /// number of descriptors selected.
    pub fn set_enabled(&mut self, selector: &PrinterSelector, enabled: bool) -> usize {
        let mut count = 0;
        for entry in &mut self.entries {
            if selector.selects(&entry.descriptor) {
                entry.enabled = enabled;
                count += 1;
            }
        }
        if count == 0 {
            log::warn!("no formatter matches selector '{selector}'");
        } else {
            log::debug!(
                "{} {count} formatter(s) for '{selector}'",
                if enabled { "enabled" } else { "disabled" }
            );
        }
        count
    }

    /// Whether a descriptor currently takes part in resolution.
    pub fn is_enabled(&self, id: DescriptorId) -> bool {
        self.entries.get(id.0).is_some_and(|e| e.enabled)
    }

    /// Number of registered descriptors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All descriptors in registration order.
    pub fn catalog(&self) -> impl Iterator<Item = CatalogEntry<'_>> {
        self.entries.iter().enumerate().map(|(i, e)| CatalogEntry {
            id: DescriptorId(i),
            category: &e.descriptor.category,
            name: &e.descriptor.name,
            match_kind: e.descriptor.match_kind,
            pattern: &e.descriptor.type_pattern,
            versions: &e.descriptor.versions,
            enabled: e.enabled,
        })
    }
}
