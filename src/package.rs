// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Package identifiers.
//!
//! Package names are compared and hashed by their canonical byte-string
//! form. Callers may hand in anything cheaply convertible to that form —
//! a `&str`, an owned `String`, or raw bytes — and it is coerced once at
//! the graph boundary, per the normalization rule in the data model.

use std::fmt;

/// A package name, canonicalized to its byte-string form.
///
/// Two `PackageName`s are equal iff their canonical bytes are equal;
/// comparison is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackageName(Box<[u8]>);

impl PackageName {
    /// Borrow the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Render as UTF-8, lossily if the name is not valid UTF-8 (the common case is that it is).
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for PackageName {
    fn from(s: &str) -> Self {
        PackageName(s.as_bytes().into())
    }
}

impl From<String> for PackageName {
    fn from(s: String) -> Self {
        PackageName(s.into_bytes().into_boxed_slice())
    }
}

impl From<&String> for PackageName {
    fn from(s: &String) -> Self {
        PackageName::from(s.as_str())
    }
}

impl From<Vec<u8>> for PackageName {
    fn from(b: Vec<u8>) -> Self {
        PackageName(b.into_boxed_slice())
    }
}

impl From<&[u8]> for PackageName {
    fn from(b: &[u8]) -> Self {
        PackageName(b.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_regardless_of_source_type() {
        let from_str: PackageName = "app1".into();
        let from_string: PackageName = String::from("app1").into();
        let from_bytes: PackageName = b"app1".to_vec().into();
        assert_eq!(from_str, from_string);
        assert_eq!(from_str, from_bytes);
    }

    #[test]
    fn case_sensitive() {
        let lower: PackageName = "App1".into();
        let upper: PackageName = "app1".into();
        assert_ne!(lower, upper);
    }
}
