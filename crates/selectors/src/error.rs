//! Error taxonomy for selector compilation and querying.
//!
//! All errors are raised synchronously from the call that triggered them,
//! at compile/validation time rather than mid-match. Under a non-verbose
//! engine configuration the public entry points convert them into neutral
//! return values instead (see `Engine::configure`).

use core::fmt;

/// Errors surfaced by the selector engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A public entry point was called without any selector text.
    MissingArgument,
    /// The selector text, or an inner selector list of `:is`/`:not`/`:has`,
    /// failed grammar validation. Carries the offending substring.
    InvalidSelector {
        /// The unconsumed or malformed part of the selector.
        selector: String,
    },
    /// A pseudo-class name matched neither a built-in production nor a
    /// registered custom selector.
    UnknownPseudoClass {
        /// The unrecognized pseudo-class name.
        name: String,
    },
    /// A token segment matched none of the grammar productions.
    UnknownToken {
        /// The unrecognized token text.
        token: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingArgument => {
                write!(formatter, "missing selector argument")
            }
            Self::InvalidSelector { selector } => {
                write!(formatter, "invalid selector: {selector:?}")
            }
            Self::UnknownPseudoClass { name } => {
                write!(formatter, "unknown pseudo-class: :{name}")
            }
            Self::UnknownToken { token } => {
                write!(formatter, "unknown selector token: {token:?}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Convenience alias used across the crate.
pub type Result<T> = core::result::Result<T, Error>;
