// SPDX-License-Identifier: MPL-2.0

//! Dependency graph flattening and classpath conflict checking.
//!
//! A build resolves, for every variant, a compile and a package classpath into
//! graphs of [DependencyNode]s referring to shared, immutable [Dependency] values.
//! This crate turns such a graph into a deterministic priority-ordered flat list,
//! keeps the mutable skipped/provided bookkeeping in a side table shared between
//! the graphs of a variant, and cross-checks the classpaths of a variant
//! (and of a test variant against the variant it tests).
//!
//! The first declared direct dependency has the highest priority. A dependency
//! reachable through several paths is listed once, after all of its dependents:
//!
//! ```txt
//! A -> {B, C}, B -> {D}, C -> {D}    flattens to    [A, B, C, D]
//! ```
//!
//! ## API
//!
//! ```
//! # use std::sync::Arc;
//! # use depflat::{
//! #     Coordinates, Dependency, DependencyChecker, DependencyGraph, DependencyNode, GraphError,
//! #     Map, MutableDependencyDataMap, NodeType, VariantContext, VariantType,
//! # };
//! #
//! # fn try_main() -> Result<(), GraphError> {
//! let mut dependencies = Map::default();
//! for (address, artifact) in [("a", "a"), ("b", "b")] {
//!     let coordinates = Coordinates::new("com.example", artifact, "1.0");
//!     let dependency = Dependency::java_library(coordinates, format!("{artifact}.jar"));
//!     dependencies.insert(address, Arc::new(dependency));
//! }
//! let roots = vec![DependencyNode::new(
//!     "a",
//!     NodeType::JavaLibrary,
//!     vec![DependencyNode::leaf("b", NodeType::JavaLibrary)],
//! )];
//!
//! let data_map = MutableDependencyDataMap::new();
//! let compile = DependencyGraph::new(dependencies.clone(), roots.clone(), data_map.clone());
//! let package = DependencyGraph::new(dependencies, roots, data_map);
//!
//! let compile = compile.flatten_container()?.filter_skipped_libraries();
//! let package = package.flatten_container()?.filter_skipped_libraries();
//!
//! let mut checker =
//!     DependencyChecker::new(VariantContext::new("app", "debug", VariantType::Application));
//! checker.validate(&compile, &package, None)?;
//! assert!(checker.sync_issues().is_empty());
//! #     Ok(())
//! # }
//! # fn main() {
//! #     try_main().unwrap();
//! # }
//! ```
//!
//! Where the roots and the dependency map come from the resolver of the build,
//! [DependencyGraph::flatten_container] (or [DependencyGraph::flatten_for_test]
//! for test variants) produces a [FlatDependencyContainer],
//! [FlatDependencyContainer::filter_skipped_libraries] the long-lived
//! [DependencyContainer] view, and the [DependencyChecker] records the
//! [SyncIssue]s found in the classpaths of the variant.
//!
//! ## Errors
//!
//! Dependency conflicts are reported as [SyncIssue]s, never as errors.
//! A [GraphError] means the inputs broke an invariant: a node with an unknown
//! address, several base atoms, or a mutation of the read-only
//! [empty](MutableDependencyDataMap::empty) data map.

mod checker;
mod config;
mod container;
mod data_map;
mod dependency;
mod error;
mod flat;
mod graph;
mod node;
mod sync_issue;
mod type_aliases;

pub use checker::{
    tested_version_map, version_map, DependencyChecker, TestedVersionMap, VersionMap,
    APP_TEST_CONFLICT_URL,
};
pub use config::{
    ExclusionRules, VariantContext, VariantType, INTERNAL_CONFLICT_ARTIFACTS, LEGACY_API_LEVELS,
    UNKNOWN_API_LEVEL,
};
pub use container::DependencyContainer;
pub use data_map::{DependencyData, MutableDependencyDataMap};
pub use dependency::{
    Address, Coordinates, Dependency, DependencyKind, LOCAL_JAR_GROUP, LOCAL_JAR_VERSION,
};
pub use error::GraphError;
pub use flat::FlatDependencyContainer;
pub use graph::{DependencyGraph, NodeFilter};
pub use node::{DependencyNode, NodeType};
pub use sync_issue::{IssueType, Severity, SyncIssue};
pub use type_aliases::{FnvIndexMap, FnvIndexSet, Map, Set};
