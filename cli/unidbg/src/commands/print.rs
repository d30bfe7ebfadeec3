//! `unidbg print`: render variables through the printers.

use anyhow::{bail, Result};
use unidbg_core::ProcessImage;
use unidbg_registry::Session;

/// Render one expression as `expr = text`. Failures are shown in place of
/// the value so the remaining expressions still print.
pub fn render_line(session: &Session<ProcessImage>, expr: &str) -> String {
    let text = session
        .host()
        .evaluate(expr)
        .map_err(anyhow::Error::from)
        .and_then(|value| Ok(session.render(&value)?))
        .unwrap_or_else(|e| format!("<error: {e}>"));
    format!("{expr} = {text}")
}

/// Expressions to print: the given ones, or every variable with `all`.
pub fn select(session: &Session<ProcessImage>, exprs: &[String], all: bool) -> Result<Vec<String>> {
    if all {
        return Ok(session.host().variable_names().map(str::to_string).collect());
    }
    if exprs.is_empty() {
        bail!("nothing to print (name variables or pass --all)");
    }
    Ok(exprs.to_vec())
}

/// Print the selected expressions.
pub fn run(session: &Session<ProcessImage>, exprs: &[String], all: bool) -> Result<()> {
    for expr in select(session, exprs, all)? {
        println!("{}", render_line(session, &expr));
    }
    Ok(())
}
