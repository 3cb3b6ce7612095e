//! Host parser capabilities whose access changed between host versions.
//!
//! A host adapter implements [`HostParser`] with whatever its host version
//! actually provides, and [`select`] picks the [`VersionHelper`] strategy
//! which knows which of those capabilities to use.

use super::{Error, Result};
use core::{fmt, str::FromStr};

/// A host platform version number like `1.35.2`.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct HostVersion(semver::Version);

impl HostVersion {
    /// Returns true if this version is at least `major.minor`.
    ///
    /// Pre-release builds of a version count as that version, so
    /// `1.35.0-wmf.3` is at least `1.35`.
    pub fn at_least(&self, major: u64, minor: u64) -> bool {
        (self.0.major, self.0.minor) >= (major, minor)
    }
}

impl fmt::Display for HostVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for HostVersion {
    type Err = Error;

    /// Parses a host version. Missing minor and patch numbers are treated as
    /// zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let version = s.trim();
        let (core, extra) = version
            .find(['-', '+'])
            .map_or((version, ""), |at| version.split_at(at));

        let padded = match core.matches('.').count() {
            0 => format!("{core}.0.0{extra}"),
            1 => format!("{core}.0{extra}"),
            _ => version.to_string(),
        };

        semver::Version::parse(&padded)
            .map(Self)
            .map_err(|err| Error::Version(s.to_string(), err))
    }
}

/// The parser capabilities a host adapter may provide.
///
/// Every capability is optional. A host adapter only implements the ones its
/// host version has.
pub trait HostParser {
    /// The host’s strip state type.
    type StripState;

    /// Reads the strip state from a publicly accessible field.
    fn strip_state_field(&self) -> Option<&Self::StripState> {
        None
    }

    /// Reads the strip state using a getter.
    fn strip_state(&self) -> Option<&Self::StripState> {
        None
    }

    /// Replaces link placeholders in `text` using a public method.
    fn replace_link_holders_text(&mut self, _text: &str) -> Option<String> {
        None
    }

    /// Replaces link placeholders in `text` using a method the host does not
    /// normally expose.
    fn replace_link_holders_text_private(&mut self, _text: &str) -> Option<String> {
        None
    }
}

/// Version-specific access to host parser capabilities.
pub trait VersionHelper<P: HostParser> {
    /// The name of the strategy, for diagnostics.
    fn name(&self) -> &'static str;

    /// Gets the parser’s strip state.
    fn strip_state<'p>(&self, parser: &'p P) -> Result<&'p P::StripState>;

    /// Replaces link placeholders in `text` with the final links.
    fn replace_link_holders_text(&self, parser: &mut P, text: &str) -> Result<String>;
}

/// The strategy for hosts from 1.28 up to 1.35.
#[derive(Clone, Copy, Debug, Default)]
pub struct Legacy;

impl Legacy {
    /// The name of the strategy.
    const NAME: &'static str = "legacy";
}

impl<P: HostParser> VersionHelper<P> for Legacy {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn strip_state<'p>(&self, parser: &'p P) -> Result<&'p P::StripState> {
        parser
            .strip_state_field()
            .ok_or_else(|| missing(Self::NAME, "strip state field"))
    }

    fn replace_link_holders_text(&self, parser: &mut P, text: &str) -> Result<String> {
        parser
            .replace_link_holders_text(text)
            .ok_or_else(|| missing(Self::NAME, "public link holder replacement"))
    }
}

/// The strategy for hosts from 1.35.
#[derive(Clone, Copy, Debug, Default)]
pub struct Modern;

impl Modern {
    /// The name of the strategy.
    const NAME: &'static str = "modern";
}

impl<P: HostParser> VersionHelper<P> for Modern {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn strip_state<'p>(&self, parser: &'p P) -> Result<&'p P::StripState> {
        parser
            .strip_state()
            .ok_or_else(|| missing(Self::NAME, "strip state getter"))
    }

    fn replace_link_holders_text(&self, parser: &mut P, text: &str) -> Result<String> {
        parser
            .replace_link_holders_text_private(text)
            .ok_or_else(|| missing(Self::NAME, "private link holder replacement"))
    }
}

/// Selects the strategy for the given host version.
///
/// This should be called once at start-up and the result kept for the life
/// of the process.
pub fn select<P: HostParser>(version: &HostVersion) -> Result<Box<dyn VersionHelper<P>>> {
    let helper: Box<dyn VersionHelper<P>> = if version.at_least(1, 35) {
        Box::new(Modern)
    } else if version.at_least(1, 28) {
        Box::new(Legacy)
    } else {
        return Err(Error::UnsupportedVersion(version.to_string()));
    };

    log::debug!("Using {} host strategy for {version}", helper.name());
    Ok(helper)
}

/// Creates a missing capability error for the given strategy.
fn missing(strategy: &'static str, capability: &'static str) -> Error {
    Error::MissingCapability {
        strategy,
        capability,
    }
}
