//! Helpers for parser function and tag implementations.
//!
//! A parser function receives its arguments as a flat list where some entries
//! are positional and some are `key=value` pairs, and where the keys a user
//! types are localised spellings of fixed keywords (“magic words”). This
//! crate turns that list into something a parser function can consume:
//!
//! * [`MagicWordArray`] maps localised synonyms back to canonical ids.
//! * [`split`] separates the key of a raw argument from its value.
//! * [`classify`] partitions the arguments into recognised named arguments,
//!   leftover arguments, and duplicates.
//! * [`ParserHelper`] ties these to a magic word [`Catalog`] and provides the
//!   common checks (`if`, `ifnot`, `case`, `debug`, `separator`).
//! * [`compat`] hides host parser capabilities whose access changed between
//!   host versions.
//!
//! The host’s template expander is consumed through the [`Frame`] trait.

pub use args::{Arg, MagicArgs, Part, Value, classify, split};
pub use catalog::{BuiltinCatalog, Catalog, JsonCatalog, ids};
pub use frame::{Frame, Verbatim};
pub use helper::{FunctionOutput, MarkerType, ParserHelper, TagOutput};
pub use magic::{MagicWord, MagicWordArray, MagicWords};
pub use separator::decode_separator;

mod args;
mod catalog;
pub mod compat;
mod frame;
mod helper;
mod magic;
mod php;
mod separator;

/// A parser helper error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A magic word catalog entry was malformed.
    #[error("invalid catalog entry '{id}' for language '{language}': {reason}")]
    CatalogEntry {
        /// The language of the entry.
        language: String,
        /// The magic word id of the entry.
        id: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// The host frame failed to expand an argument.
    #[error(transparent)]
    Expand(Box<dyn std::error::Error + Send + Sync + 'static>),

    /// Reading a catalog file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A catalog file was not valid JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The selected host strategy needs a capability the host parser does
    /// not provide.
    #[error("host parser does not provide '{capability}' required by {strategy}")]
    MissingCapability {
        /// The name of the strategy.
        strategy: &'static str,
        /// The missing capability.
        capability: &'static str,
    },

    /// The host version string could not be parsed.
    #[error("invalid host version '{0}': {1}")]
    Version(String, #[source] semver::Error),

    /// The host version is older than any supported version.
    #[error("host version {0} is too old")]
    UnsupportedVersion(String),
}

/// The standard result type used by all fallible functions.
pub type Result<T = (), E = Error> = core::result::Result<T, E>;
