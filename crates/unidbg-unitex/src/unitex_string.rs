//! Printer for `unitex::UnitexString`, which only holds a pointer to its
//! backing `Ustring`.

use unidbg_core::Host;
use unidbg_registry::{Formatter, RenderContext, Rendered, Result};

use crate::printers::incompatible;
use crate::ustring::NIL;

/// Delegates to whatever formatter renders the backing record.
///
/// The lookup goes through the injected visualizer, so the text is exactly
/// what the backing record would show on its own.
pub struct UnitexStringPrinter<H: Host> {
    data: H::Value,
}

impl<H: Host> UnitexStringPrinter<H> {
    pub const NAME: &'static str = "UnitexString";

    pub fn new(host: &H, value: H::Value) -> Result<Self> {
        let data = host
            .field(&value, "data_")
            .map_err(|e| incompatible(host, &value, Self::NAME, e))?;
        Ok(UnitexStringPrinter { data })
    }
}

impl<H: Host> Formatter<H> for UnitexStringPrinter<H> {
    fn to_display(&self, cx: &RenderContext<'_, H>) -> Result<Rendered<H::Value>> {
        if cx.host.pointer_address(&self.data)? == 0 {
            return Ok(Rendered::Text(NIL.to_string()));
        }
        let backing = cx.host.dereference(&self.data)?;
        match cx.visualizer.find(cx.host, &backing)? {
            Some(formatter) => formatter.to_display(cx),
            None => Ok(Rendered::Value(backing)),
        }
    }
}
