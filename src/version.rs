// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parsed version values.
//!
//! A [`Version`] is either the distinguished [`Version::NO_VSN`] sentinel,
//! reserved for the synthetic run-list package, or a real semantic version.
//! Parsing of the textual form is delegated to the `semver` crate, which
//! plays the role of the semver-parser collaborator: this module only adds
//! the `NO_VSN` sentinel and the total order over the two.

use std::fmt;

use thiserror::Error;

/// A package version: either a real semantic version, or the `NO_VSN`
/// sentinel used for the synthetic run-list package.
///
/// `NO_VSN` sorts before every real version.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Version {
    /// The synthetic sentinel version, reserved for the run-list package.
    NoVsn,
    /// A real, parsed semantic version.
    Real(semver::Version),
}

/// A version failed to parse as semver.
#[derive(Debug, Error)]
#[error("invalid version {raw:?}: {source}")]
pub struct ParseVersionError {
    raw: String,
    #[source]
    source: semver::Error,
}

impl Version {
    /// The synthetic sentinel version `{0,0,0}` reserved for the run-list package.
    pub const NO_VSN: Version = Version::NoVsn;

    /// Construct a real version from its numeric components.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version::Real(semver::Version::new(major, minor, patch))
    }

    /// Parse a real version from its textual form.
    pub fn parse(raw: &str) -> Result<Self, ParseVersionError> {
        semver::Version::parse(raw)
            .map(Version::Real)
            .map_err(|source| ParseVersionError {
                raw: raw.to_string(),
                source,
            })
    }

    /// `true` for the `NO_VSN` sentinel.
    pub fn is_no_vsn(&self) -> bool {
        matches!(self, Version::NoVsn)
    }

    fn as_real(&self) -> Option<&semver::Version> {
        match self {
            Version::NoVsn => None,
            Version::Real(v) => Some(v),
        }
    }

    /// Compute the exclusive upper bound for a pessimistic (`~>`) constraint
    /// rooted at this version, given how many components the caller specified.
    ///
    /// See [`VersionPrecision`] for the exact convention.
    pub(crate) fn pessimistic_upper_bound(&self, precision: VersionPrecision) -> Version {
        let v = match self.as_real() {
            Some(v) => v,
            None => return self.clone(),
        };
        let bumped = match precision {
            VersionPrecision::Minor => semver::Version::new(v.major + 1, 0, 0),
            VersionPrecision::Patch => semver::Version::new(v.major, v.minor + 1, 0),
        };
        Version::Real(bumped)
    }
}

/// How many leading components a pessimistic (`~>`) constraint's version
/// literal specified. Determines which component the upper bound bumps.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VersionPrecision {
    /// The caller wrote `major.minor`; the upper bound bumps `major`.
    Minor,
    /// The caller wrote `major.minor.patch`; the upper bound bumps `minor`.
    Patch,
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::NoVsn => write!(f, "(no version)"),
            Version::Real(v) => write!(f, "{v}"),
        }
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering::*;
        match (self, other) {
            (Version::NoVsn, Version::NoVsn) => Equal,
            (Version::NoVsn, Version::Real(_)) => Less,
            (Version::Real(_), Version::NoVsn) => Greater,
            (Version::Real(a), Version::Real(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Types that can be converted into a canonical [`Version`], the raw-version
/// half of the raw-vs-canonical boundary: a byte-string/textual form parsed
/// through [`Version::parse`], or an already-parsed value passed straight through.
pub trait IntoVersion {
    /// Canonicalize into a [`Version`], parsing textual forms through semver.
    fn into_version(self) -> Result<Version, ParseVersionError>;
}

impl IntoVersion for Version {
    fn into_version(self) -> Result<Version, ParseVersionError> {
        Ok(self)
    }
}

impl IntoVersion for &Version {
    fn into_version(self) -> Result<Version, ParseVersionError> {
        Ok(self.clone())
    }
}

impl IntoVersion for &str {
    fn into_version(self) -> Result<Version, ParseVersionError> {
        Version::parse(self)
    }
}

impl IntoVersion for String {
    fn into_version(self) -> Result<Version, ParseVersionError> {
        Version::parse(&self)
    }
}

impl IntoVersion for (u64, u64, u64) {
    fn into_version(self) -> Result<Version, ParseVersionError> {
        Ok(Version::new(self.0, self.1, self.2))
    }
}
