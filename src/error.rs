// SPDX-License-Identifier: MPL-2.0

//! Handling depflat errors.

use thiserror::Error;

use crate::Coordinates;

/// Errors that may occur while flattening a dependency graph or marking
/// dependencies in a data map.
///
/// All of them are invariant violations of whoever built the inputs, never
/// user-facing dependency conflicts. Those are reported as
/// [SyncIssue](crate::SyncIssue)s by the [DependencyChecker](crate::DependencyChecker).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A node references an address that is missing from the graph's dependency map.
    #[error("dependency node references unknown address {address}")]
    MissingDependency {
        /// Display form of the unresolved address.
        address: String,
    },

    /// The atom sub-graph has more than one atom without atom dependencies.
    #[error("found more than one base atom: {first} and {second}")]
    MultipleBaseAtoms {
        /// The first base atom found.
        first: Coordinates,
        /// Another base atom, distinct from the first.
        second: Coordinates,
    },

    /// A mutation was attempted on the read-only empty data map.
    #[error(
        "cannot mark {dependency} as skipped or provided: \
         the dependency graph has no provided or package scope"
    )]
    ReadOnlyDataMap {
        /// The dependency that was about to be marked.
        dependency: Coordinates,
    },
}
