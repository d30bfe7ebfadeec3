//! Registration of the Unitex printers.

use std::fmt;

use unidbg_core::{Host, VersionRange};
use unidbg_registry::{
    FormatError, Formatter, FormatterDescriptor, FormatterRegistry, RegistryError, Result,
};

use crate::unichar::UnicharPrinter;
use crate::unitex_string::UnitexStringPrinter;
use crate::ustring::{DecodeLimits, UstringPrinter};

/// Category shared by every Unitex printer, for enable/disable toggles.
pub const CATEGORY: &str = "unitex";

/// Container types that are cataloged but rendered by the host. The lists
/// are declared at global scope in older builds.
const TRIVIAL_TYPES: &[&str] = &[
    "list_ustring",
    "list_int",
    "unitex::list_ustring",
    "unitex::list_int",
];

/// Library versions whose `Ustring` layout the printers understand.
pub fn supported_versions() -> VersionRange {
    VersionRange::from_triples((3, 1, 0), (3, 99, 99))
}

/// Register every Unitex printer.
///
/// A descriptor that fails to register is logged and skipped; the rest are
/// still registered. Returns the failures.
pub fn register_unitex_printers<H: Host + 'static>(
    registry: &mut FormatterRegistry<H>,
    limits: DecodeLimits,
) -> Vec<RegistryError> {
    let ustring = move |host: &H, value: H::Value| -> Result<Box<dyn Formatter<H>>> {
        Ok(Box::new(UstringPrinter::new(host, value, limits)?))
    };

    let unichar = |host: &H, value: H::Value| -> Result<Box<dyn Formatter<H>>> {
        Ok(Box::new(UnicharPrinter::new(host, value)?))
    };

    let descriptors = vec![
        FormatterDescriptor::exact(
            CATEGORY,
            UstringPrinter::<H>::NAME,
            "unitex::Ustring",
            supported_versions(),
            ustring,
        ),
        // Builds that predate the `unitex` namespace.
        FormatterDescriptor::regex(
            CATEGORY,
            "Ustring-unscoped",
            r"(?:struct\s+)?Ustring",
            supported_versions(),
            ustring,
        ),
        FormatterDescriptor::exact(
            CATEGORY,
            UnicharPrinter::<H>::NAME,
            "unitex::unichar",
            supported_versions(),
            unichar,
        ),
        FormatterDescriptor::exact(
            CATEGORY,
            "unichar-unscoped",
            "unichar",
            supported_versions(),
            unichar,
        ),
        FormatterDescriptor::exact(
            CATEGORY,
            UnitexStringPrinter::<H>::NAME,
            "unitex::UnitexString",
            supported_versions(),
            |host: &H, value: H::Value| {
                Ok(Box::new(UnitexStringPrinter::new(host, value)?) as Box<dyn Formatter<H>>)
            },
        ),
    ];

    let mut failures = Vec::new();
    for descriptor in descriptors {
        if let Err(e) = registry.register(descriptor) {
            log::warn!("skipping printer: {e}");
            failures.push(e);
        }
    }
    for type_name in TRIVIAL_TYPES {
        if let Err(e) = registry.register_trivial(CATEGORY, type_name) {
            log::warn!("skipping printer: {e}");
            failures.push(e);
        }
    }
    log::debug!(
        "registered {} unitex printers for versions {}",
        registry.catalog().filter(|e| e.category == CATEGORY).count(),
        supported_versions()
    );
    failures
}

/// Build the error reported when a printer is handed a value of the wrong
/// shape.
pub(crate) fn incompatible<H: Host>(
    host: &H,
    value: &H::Value,
    formatter: &str,
    detail: impl fmt::Display,
) -> FormatError {
    FormatError::IncompatibleValue {
        formatter: formatter.to_string(),
        type_name: host
            .type_name(value)
            .unwrap_or_else(|| "<unknown>".to_string()),
        detail: detail.to_string(),
    }
}
