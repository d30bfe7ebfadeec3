//! Registry and formatting error types.

use unidbg_core::HostError;

/// Errors raised while registering descriptors or selecting them.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The descriptor has an empty type pattern.
    #[error("formatter '{name}' has an empty type pattern")]
    EmptyPattern { name: String },

    /// The descriptor's version range has `min > max`.
    #[error("formatter '{name}' has an inverted version range {min} > {max}")]
    InvertedVersionRange {
        name: String,
        min: semver::Version,
        max: semver::Version,
    },

    /// The descriptor's regex pattern does not compile.
    #[error("formatter '{name}' has an invalid pattern: {source}")]
    InvalidRegex {
        name: String,
        #[source]
        source: regex::Error,
    },

    /// A descriptor handle that this registry never issued.
    #[error("unknown formatter handle #{0}")]
    UnknownDescriptor(usize),

    /// A selector string that cannot be parsed.
    #[error("invalid printer selector '{selector}': expected `category` or `category;name`")]
    InvalidSelector { selector: String },
}

/// Errors raised while building or running a formatter for one value.
///
/// These are always scoped to a single value: the caller renders a
/// placeholder for it and carries on.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// The host failed to inspect the value (unreadable memory, missing type).
    #[error(transparent)]
    Host(#[from] HostError),

    /// The value does not have the shape the formatter expects.
    #[error("formatter '{formatter}' cannot handle a value of type '{type_name}': {detail}")]
    IncompatibleValue {
        formatter: String,
        type_name: String,
        detail: String,
    },

    /// Formatters kept handing values back to each other.
    #[error("formatter delegation exceeded {limit} levels")]
    DelegationDepth { limit: usize },

    /// The handle passed to `instantiate` is not valid.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Result type alias for formatting operations.
pub type Result<T> = std::result::Result<T, FormatError>;
