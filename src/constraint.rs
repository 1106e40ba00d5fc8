// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Constraints: predicates over a (package, version) pair.
//!
//! A [`Constraint`] always names the package it restricts, matching the
//! data model's "a predicate over (package name, version)". Its predicate
//! half is one of the shapes in the table below; [`Constraint::to_ranges`]
//! compiles that predicate down to a [`version_ranges::Ranges<Version>`],
//! which both the dependency-graph reachability walk and the version
//! manager's id-range computation consume.
//!
//! | Shape | Meaning |
//! |---|---|
//! | `Pkg` | any version of `Pkg` |
//! | `(Pkg, V)` | exactly `V` |
//! | `(Pkg, V, op)` | predicate over `V` |
//! | `(Pkg, V1, V2, between)` | closed interval `[V1, V2]` |

use std::fmt;

use version_ranges::Ranges;

use crate::package::PackageName;
use crate::version::{IntoVersion, ParseVersionError, Version, VersionPrecision};

/// A comparison operator usable in a [`Constraint`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CmpOp {
    /// `=`
    Eq,
    /// `>=`
    Ge,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `<`
    Lt,
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpOp::Eq => "=",
            CmpOp::Ge => ">=",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Lt => "<",
        };
        write!(f, "{s}")
    }
}

/// The predicate half of a [`Constraint`], independent of the package it targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
enum Predicate {
    Any,
    Exact(Version),
    Cmp(Version, CmpOp),
    Pessimistic(Version, VersionPrecision),
    Between(Version, Version),
}

/// A predicate over `(package name, version)`: one of unconstrained, equal,
/// a comparison operator (`=`, `>=`, `<=`, `>`, `<`), the pessimistic
/// operator `~>`, or a closed interval.
///
/// Two constraints are equal (for deduplication in [`crate::graph::DepGraph`])
/// iff their canonical form — package name plus predicate — is equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constraint {
    package: PackageName,
    predicate: Predicate,
}

impl Constraint {
    /// The package this constraint restricts.
    pub fn package(&self) -> &PackageName {
        &self.package
    }

    /// Unconstrained: any version of `package` satisfies.
    pub fn any(package: impl Into<PackageName>) -> Self {
        Constraint {
            package: package.into(),
            predicate: Predicate::Any,
        }
    }

    /// Exactly `version`.
    pub fn exact(
        package: impl Into<PackageName>,
        version: impl IntoVersion,
    ) -> Result<Self, ParseVersionError> {
        Ok(Constraint {
            package: package.into(),
            predicate: Predicate::Exact(version.into_version()?),
        })
    }

    /// `version op`, e.g. `>= 1.2.0`.
    pub fn cmp(
        package: impl Into<PackageName>,
        version: impl IntoVersion,
        op: CmpOp,
    ) -> Result<Self, ParseVersionError> {
        Ok(Constraint {
            package: package.into(),
            predicate: Predicate::Cmp(version.into_version()?, op),
        })
    }

    /// The pessimistic (`~>`) operator: allows the last explicit component of
    /// `version` to float upward. See [`VersionPrecision`] for the exact bound.
    pub fn pessimistic(
        package: impl Into<PackageName>,
        version: impl IntoVersion,
        precision: VersionPrecision,
    ) -> Result<Self, ParseVersionError> {
        Ok(Constraint {
            package: package.into(),
            predicate: Predicate::Pessimistic(version.into_version()?, precision),
        })
    }

    /// The closed interval `[lo, hi]`.
    pub fn between(
        package: impl Into<PackageName>,
        lo: impl IntoVersion,
        hi: impl IntoVersion,
    ) -> Result<Self, ParseVersionError> {
        Ok(Constraint {
            package: package.into(),
            predicate: Predicate::Between(lo.into_version()?, hi.into_version()?),
        })
    }

    /// Compile this constraint's predicate to the set of versions it admits.
    pub fn to_ranges(&self) -> Ranges<Version> {
        match &self.predicate {
            Predicate::Any => Ranges::full(),
            Predicate::Exact(v) => Ranges::singleton(v.clone()),
            Predicate::Cmp(v, CmpOp::Eq) => Ranges::singleton(v.clone()),
            Predicate::Cmp(v, CmpOp::Ge) => Ranges::higher_than(v.clone()),
            Predicate::Cmp(v, CmpOp::Le) => Ranges::lower_than(v.clone()),
            Predicate::Cmp(v, CmpOp::Gt) => Ranges::strictly_higher_than(v.clone()),
            Predicate::Cmp(v, CmpOp::Lt) => Ranges::strictly_lower_than(v.clone()),
            Predicate::Pessimistic(v, precision) => {
                Ranges::between(v.clone(), v.pessimistic_upper_bound(*precision))
            }
            Predicate::Between(lo, hi) => {
                // Closed interval: version-ranges' `between` is half-open, so there is no
                // version strictly between `hi` and its successor to use as the exclusive
                // bound. Build it from the intersection of the two open constraints instead.
                Ranges::higher_than(lo.clone()).intersection(&Ranges::lower_than(hi.clone()))
            }
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.predicate {
            Predicate::Any => write!(f, "{}", self.package),
            Predicate::Exact(v) => write!(f, "{} = {v}", self.package),
            Predicate::Cmp(v, op) => write!(f, "{} {op} {v}", self.package),
            Predicate::Pessimistic(v, _) => write!(f, "{} ~> {v}", self.package),
            Predicate::Between(lo, hi) => write!(f, "{} {lo}..{hi}", self.package),
        }
    }
}
