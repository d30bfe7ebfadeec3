//! Buffer decoder for `unitex::Ustring`.
//!
//! The record is `{ unichar* str; int size; int len; }`, where `size` is the
//! allocated capacity in code units. Records are read wherever they sit in
//! the inspected process, possibly half constructed, so decoding checks the
//! buffer in a fixed order: castable, then non-null, then non-empty. Only a
//! record that passes every check has its contents read.

use std::fmt;

use unidbg_core::{Host, HostError};
use unidbg_registry::{Formatter, RenderContext, Rendered, Result};

use crate::printers::incompatible;
use crate::unichar::escape_code_unit;

/// Spellings of the code unit type, namespaced builds first.
pub const CODE_UNIT_TYPES: &[&str] = &["unitex::unichar", "unichar"];

/// Rendered for a record whose buffer is not yet a valid pointer.
pub const UNINITIALIZED: &str = "<uninitialized>";
/// Rendered for a record whose buffer is the null pointer.
pub const NIL: &str = "<null>";
/// Rendered for a record holding no code units.
pub const EMPTY: &str = "<empty>";

/// Default number of code units read from a buffer.
pub const DEFAULT_MAX_CODE_UNITS: usize = 200;

/// Bounds on how much of a buffer is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Code units read before the text is cut off with `...`.
    pub max_code_units: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        DecodeLimits {
            max_code_units: DEFAULT_MAX_CODE_UNITS,
        }
    }
}

/// Outcome of decoding one record.
#[derive(Debug)]
pub enum Decoded {
    /// The buffer field cannot be viewed as a pointer to code units.
    Uninitialized,
    /// The buffer is the null pointer.
    Nil,
    /// The record holds zero code units.
    Empty,
    /// The record holds text.
    Populated {
        /// Buffer address as the host formats it.
        address: String,
        /// Escaped text of the code units read.
        text: String,
        /// Length recorded in the record.
        length: usize,
        /// Capacity recorded in the record.
        capacity: i64,
        /// Whether fewer than `length` code units were read.
        truncated: bool,
    },
    /// The inspected process's memory could not be read.
    ReadFailure(HostError),
}

impl fmt::Display for Decoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decoded::Uninitialized => f.write_str(UNINITIALIZED),
            Decoded::Nil => f.write_str(NIL),
            Decoded::Empty => f.write_str(EMPTY),
            Decoded::Populated {
                address,
                text,
                length,
                capacity,
                truncated,
            } => {
                let ellipsis = if *truncated { "..." } else { "" };
                write!(
                    f,
                    "{address} \"{text}\"{ellipsis} len:{length},capacity:{capacity}"
                )
            }
            Decoded::ReadFailure(e) => write!(f, "<error: {e}>"),
        }
    }
}

/// Decode a `Ustring` record.
pub fn decode<H: Host>(host: &H, record: &H::Value, limits: &DecodeLimits) -> Decoded {
    match try_decode(host, record, limits) {
        Ok(decoded) => decoded,
        Err(e) => {
            log::debug!("cannot read string record {record:?}: {e}");
            Decoded::ReadFailure(e)
        }
    }
}

fn try_decode<H: Host>(
    host: &H,
    record: &H::Value,
    limits: &DecodeLimits,
) -> std::result::Result<Decoded, HostError> {
    let unit_pointer = host.pointer_type(&code_unit_type(host)?);
    let buffer = match host.cast(&host.field(record, "str")?, &unit_pointer) {
        Ok(buffer) => buffer,
        Err(HostError::CastFailed { .. }) => return Ok(Decoded::Uninitialized),
        Err(e) => return Err(e),
    };
    if host.pointer_address(&buffer)? == 0 {
        return Ok(Decoded::Nil);
    }

    let len = host.as_integer(&host.field(record, "len")?)?;
    if len == 0 {
        return Ok(Decoded::Empty);
    }
    // A negative length only shows up in torn records.
    let Ok(length) = usize::try_from(len) else {
        return Ok(Decoded::Uninitialized);
    };
    let capacity = host.as_integer(&host.field(record, "size")?)?;

    let count = length.min(limits.max_code_units);
    let text: String = host
        .read_code_units(&buffer, count)?
        .into_iter()
        .map(|unit| escape_code_unit(unit, '"'))
        .collect();

    Ok(Decoded::Populated {
        address: decode_address(host, &buffer)?,
        text,
        length,
        capacity,
        truncated: count < length,
    })
}

fn code_unit_type<H: Host>(host: &H) -> std::result::Result<H::Type, HostError> {
    for name in CODE_UNIT_TYPES {
        match host.lookup_type(name) {
            Ok(ty) => return Ok(ty),
            Err(HostError::TypeNotFound { .. }) => continue,
            Err(e) => return Err(e),
        }
    }
    Err(HostError::TypeNotFound {
        name: CODE_UNIT_TYPES.join(" or "),
    })
}

/// Format a pointer with the host's native address formatting.
pub fn decode_address<H: Host>(
    host: &H,
    pointer: &H::Value,
) -> std::result::Result<String, HostError> {
    host.format_address(pointer)
}

/// Printer for `unitex::Ustring` records.
pub struct UstringPrinter<H: Host> {
    value: H::Value,
    limits: DecodeLimits,
}

impl<H: Host> UstringPrinter<H> {
    pub const NAME: &'static str = "Ustring";

    /// Wrap a record, checking it has the `str`, `size` and `len` members.
    pub fn new(host: &H, value: H::Value, limits: DecodeLimits) -> Result<Self> {
        for member in ["str", "size", "len"] {
            host.field(&value, member)
                .map_err(|e| incompatible(host, &value, Self::NAME, e))?;
        }
        Ok(UstringPrinter { value, limits })
    }
}

impl<H: Host> Formatter<H> for UstringPrinter<H> {
    fn to_display(&self, cx: &RenderContext<'_, H>) -> Result<Rendered<H::Value>> {
        match decode(cx.host, &self.value, &self.limits) {
            Decoded::ReadFailure(e) => Err(e.into()),
            decoded => Ok(Rendered::Text(decoded.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use unidbg_core::ProcessImage;
    use unidbg_registry::FormatError;

    use super::*;
    use crate::fixtures;

    fn decode_var(image: &ProcessImage, name: &str) -> Decoded {
        let record = image.variable(name).unwrap();
        decode(image, &record, &DecodeLimits::default())
    }

    #[test]
    fn uninitialized_buffer() {
        let image = fixtures::image();
        assert!(matches!(decode_var(&image, "pending"), Decoded::Uninitialized));
        assert_eq!(decode_var(&image, "pending").to_string(), "<uninitialized>");
    }

    #[test]
    fn null_buffer_wins_over_zero_length() {
        let image = fixtures::image();
        assert!(matches!(decode_var(&image, "nil_empty"), Decoded::Nil));
        assert!(matches!(decode_var(&image, "nil_len"), Decoded::Nil));
    }

    #[test]
    fn zero_length_is_empty() {
        let image = fixtures::image();
        let decoded = decode_var(&image, "empty");
        assert!(matches!(decoded, Decoded::Empty));
        assert_eq!(decoded.to_string(), "<empty>");
    }

    #[test]
    fn sentinels_are_distinct() {
        assert_ne!(UNINITIALIZED, NIL);
        assert_ne!(NIL, EMPTY);
        assert_ne!(UNINITIALIZED, EMPTY);
    }

    #[test]
    fn populated_record() {
        let image = fixtures::image();
        let decoded = decode_var(&image, "greeting");
        match &decoded {
            Decoded::Populated {
                length,
                capacity,
                truncated,
                ..
            } => {
                assert_eq!(*length, 5);
                assert_eq!(*capacity, 8);
                assert!(!truncated);
            }
            other => panic!("expected populated, got {other:?}"),
        }
        assert_eq!(decoded.to_string(), "0x1000 \"hello\" len:5,capacity:8");
    }

    #[test]
    fn negative_length_is_uninitialized() {
        let image = fixtures::image();
        assert!(matches!(decode_var(&image, "torn"), Decoded::Uninitialized));
    }

    #[test]
    fn unreadable_buffer_is_a_read_failure() {
        let image = fixtures::image();
        assert!(matches!(
            decode_var(&image, "wild"),
            Decoded::ReadFailure(HostError::MemoryRead { .. })
        ));
    }

    #[test]
    fn long_text_is_cut_off() {
        let image = fixtures::image();
        let record = image.variable("greeting").unwrap();
        let decoded = decode(&image, &record, &DecodeLimits { max_code_units: 3 });
        assert_eq!(decoded.to_string(), "0x1000 \"hel\"... len:5,capacity:8");
    }

    #[test]
    fn quotes_and_control_characters_are_escaped() {
        let image = fixtures::image();
        assert_eq!(
            decode_var(&image, "quoted").to_string(),
            "0x1200 \"a\\\"b\\n\" len:4,capacity:4"
        );
    }

    #[test]
    fn unscoped_build_decodes() {
        let host = fixtures::Unscoped(fixtures::image());
        let record = host.0.variable("unscoped").unwrap();
        assert!(host.lookup_type("unitex::unichar").is_err());
        assert_eq!(
            decode(&host, &record, &DecodeLimits::default()).to_string(),
            "0x1000 \"hello\" len:5,capacity:8"
        );
    }

    #[test]
    fn decode_address_uses_host_formatting() {
        let image = fixtures::image();
        let text = image.variable("text").unwrap();
        let data = image.field(&text, "data_").unwrap();
        assert_eq!(decode_address(&image, &data).unwrap(), "0x2000 <greeting>");
    }

    #[test]
    fn printer_renders_outcomes() {
        let image = fixtures::image();
        let cx = RenderContext::without_visualizers(&image);
        for (name, expected) in [
            ("greeting", "0x1000 \"hello\" len:5,capacity:8"),
            ("pending", "<uninitialized>"),
            ("nil_empty", "<null>"),
            ("empty", "<empty>"),
        ] {
            let record = image.variable(name).unwrap();
            let printer = UstringPrinter::new(&image, record, DecodeLimits::default()).unwrap();
            assert_eq!(
                printer.to_display(&cx).unwrap(),
                Rendered::Text(expected.to_string()),
                "{name}"
            );
        }
    }

    #[test]
    fn printer_surfaces_read_failures() {
        let image = fixtures::image();
        let record = image.variable("wild").unwrap();
        let printer = UstringPrinter::new(&image, record, DecodeLimits::default()).unwrap();
        let cx = RenderContext::without_visualizers(&image);
        assert!(matches!(
            printer.to_display(&cx),
            Err(FormatError::Host(HostError::MemoryRead { .. }))
        ));
    }

    #[test]
    fn printer_rejects_other_shapes() {
        let image = fixtures::image();
        let wrapper = image.variable("text").unwrap();
        assert!(matches!(
            UstringPrinter::new(&image, wrapper, DecodeLimits::default()),
            Err(FormatError::IncompatibleValue { .. })
        ));
    }
}
