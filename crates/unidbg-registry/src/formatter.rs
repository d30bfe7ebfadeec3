//! Formatter trait, render output, and the visualizer capability.

use unidbg_core::Host;

use crate::error::Result;

/// What a formatter produced for a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered<V> {
    /// Final display text.
    Text(String),
    /// A value to hand back to the host's generic display path.
    Value(V),
}

impl<V> Rendered<V> {
    /// The text, if this is a final rendering.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Rendered::Text(text) => Some(text),
            Rendered::Value(_) => None,
        }
    }
}

/// A per-value formatter instance.
///
/// Instances are built by a descriptor's constructor for one value, asked
/// once for their display, then dropped.
pub trait Formatter<H: Host> {
    /// Produce the display for the wrapped value.
    fn to_display(&self, cx: &RenderContext<'_, H>) -> Result<Rendered<H::Value>>;
}

/// Finds the formatter that applies to a value's exact runtime type.
pub trait Visualizer<H: Host> {
    /// Return a formatter for `value`, or `None` when no formatter claims it.
    fn find(&self, host: &H, value: &H::Value) -> Result<Option<Box<dyn Formatter<H>>>>;
}

/// A visualizer that never finds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVisualizers;

impl<H: Host> Visualizer<H> for NoVisualizers {
    fn find(&self, _host: &H, _value: &H::Value) -> Result<Option<Box<dyn Formatter<H>>>> {
        Ok(None)
    }
}

/// Context passed to formatters for rendering.
pub struct RenderContext<'a, H: Host> {
    /// The debugger host owning the inspected process.
    pub host: &'a H,
    /// Lookup used by formatters that delegate to another value's formatter.
    pub visualizer: &'a dyn Visualizer<H>,
}

impl<'a, H: Host> RenderContext<'a, H> {
    /// Create a render context.
    pub fn new(host: &'a H, visualizer: &'a dyn Visualizer<H>) -> Self {
        RenderContext { host, visualizer }
    }

    /// A context whose visualizer never finds a formatter.
    pub fn without_visualizers(host: &'a H) -> Self {
        RenderContext {
            host,
            visualizer: &NoVisualizers,
        }
    }
}

/// Renders a value with the host's default representation.
///
/// Used for types that are cataloged (so they can be listed and toggled)
/// but need no custom decoding.
#[derive(Debug, Clone)]
pub struct TrivialFormatter<H: Host> {
    value: H::Value,
}

impl<H: Host> TrivialFormatter<H> {
    /// Wrap a value.
    pub fn new(value: H::Value) -> Self {
        TrivialFormatter { value }
    }
}

impl<H: Host> Formatter<H> for TrivialFormatter<H> {
    fn to_display(&self, cx: &RenderContext<'_, H>) -> Result<Rendered<H::Value>> {
        Ok(Rendered::Text(cx.host.default_text(&self.value)?))
    }
}
