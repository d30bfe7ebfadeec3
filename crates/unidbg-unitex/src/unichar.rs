//! Single code unit decoding for `unitex::unichar`.

use unidbg_core::Host;
use unidbg_registry::{Formatter, RenderContext, Rendered, Result};

use crate::printers::incompatible;

/// Map one raw code unit to its display character.
///
/// Code units that are not Unicode scalar values on their own (surrogate
/// halves, out-of-range integers) map to U+FFFD.
pub fn decode_scalar_char(unit: u32) -> char {
    char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Render one code unit for display inside `quote`-delimited text.
pub fn escape_code_unit(unit: u32, quote: char) -> String {
    match char::from_u32(unit) {
        Some('\\') => "\\\\".to_string(),
        Some(c) if c == quote => format!("\\{c}"),
        Some('\n') => "\\n".to_string(),
        Some('\r') => "\\r".to_string(),
        Some('\t') => "\\t".to_string(),
        Some('\0') => "\\0".to_string(),
        Some(c) if !c.is_control() => c.to_string(),
        _ => format!("\\u{{{unit:04x}}}"),
    }
}

/// Printer for a scalar `unitex::unichar`: `97 'a'`.
pub struct UnicharPrinter<H: Host> {
    value: H::Value,
}

impl<H: Host> UnicharPrinter<H> {
    pub const NAME: &'static str = "unichar";

    pub fn new(host: &H, value: H::Value) -> Result<Self> {
        host.as_integer(&value)
            .map_err(|e| incompatible(host, &value, Self::NAME, e))?;
        Ok(UnicharPrinter { value })
    }
}

impl<H: Host> Formatter<H> for UnicharPrinter<H> {
    fn to_display(&self, cx: &RenderContext<'_, H>) -> Result<Rendered<H::Value>> {
        let raw = cx.host.as_integer(&self.value)?;
        let unit = u32::try_from(raw).map_err(|_| {
            incompatible(cx.host, &self.value, Self::NAME, format!("{raw} is not a code unit"))
        })?;
        Ok(Rendered::Text(format!("{raw} '{}'", escape_code_unit(unit, '\''))))
    }
}

#[cfg(test)]
mod tests {
    use unidbg_core::{ImageValue, ProcessImage};
    use unidbg_registry::FormatError;

    use super::*;
    use crate::fixtures;

    fn render(image: &ProcessImage, value: ImageValue) -> Result<String> {
        let printer = UnicharPrinter::new(image, value)?;
        let cx = RenderContext::without_visualizers(image);
        Ok(printer.to_display(&cx)?.as_text().unwrap_or_default().to_string())
    }

    #[test]
    fn scalar_decode() {
        assert_eq!(decode_scalar_char(97), 'a');
        assert_eq!(decode_scalar_char(0xe9), 'é');
        assert_eq!(decode_scalar_char(0xd800), char::REPLACEMENT_CHARACTER);
    }

    #[test]
    fn renders_code_and_character() {
        let image = fixtures::image();
        let letter = image.variable("letter").unwrap();
        assert_eq!(render(&image, letter).unwrap(), "97 'a'");
    }

    #[test]
    fn renders_control_characters_escaped() {
        let image = fixtures::image();
        let newline = image.variable("newline").unwrap();
        assert_eq!(render(&image, newline).unwrap(), "10 '\\n'");
    }

    #[test]
    fn escapes_depend_on_quote() {
        assert_eq!(escape_code_unit('\'' as u32, '\''), "\\'");
        assert_eq!(escape_code_unit('\'' as u32, '"'), "'");
        assert_eq!(escape_code_unit('"' as u32, '"'), "\\\"");
        assert_eq!(escape_code_unit('\\' as u32, '"'), "\\\\");
        assert_eq!(escape_code_unit(0, '"'), "\\0");
        assert_eq!(escape_code_unit(0x1b, '"'), "\\u{001b}");
        assert_eq!(escape_code_unit(0xdc00, '"'), "\\u{dc00}");
        assert_eq!(escape_code_unit(0x4e2d, '"'), "中");
    }

    #[test]
    fn rejects_non_integer_values() {
        let image = fixtures::image();
        let record = image.variable("greeting").unwrap();
        assert!(matches!(
            render(&image, record),
            Err(FormatError::IncompatibleValue { .. })
        ));
    }
}
