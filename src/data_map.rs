// SPDX-License-Identifier: MPL-2.0

//! Mutable per-dependency flags, kept apart from the immutable [Dependency] values
//! so that one dependency can be shared by many graphs.

use std::sync::{Arc, LazyLock};

use log::debug;
use parking_lot::Mutex;

use crate::{Coordinates, Dependency, GraphError, Map};

/// Flags recorded for a single dependency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DependencyData {
    /// Excluded from the packaged output of the classpath.
    pub skipped: bool,
    /// Available at compile time but not packaged.
    pub provided: bool,
}

static EMPTY: LazyLock<Arc<MutableDependencyDataMap>> = LazyLock::new(|| {
    Arc::new(MutableDependencyDataMap {
        read_only: true,
        data: Mutex::new(Map::default()),
    })
});

/// Side table of [DependencyData] keyed by dependency coordinates.
///
/// A map is usually shared between the compile and the package graph of a variant,
/// so a dependency skipped from one graph is seen as skipped from the other.
/// All operations take an internal lock and may be called from several threads.
///
/// The [empty](MutableDependencyDataMap::empty) instance is read-only: queries
/// return `false` and mutations fail with [GraphError::ReadOnlyDataMap].
#[derive(Debug)]
pub struct MutableDependencyDataMap {
    read_only: bool,
    data: Mutex<Map<Coordinates, DependencyData>>,
}

impl Default for MutableDependencyDataMap {
    fn default() -> Self {
        Self {
            read_only: false,
            data: Mutex::new(Map::default()),
        }
    }
}

impl MutableDependencyDataMap {
    /// A new writable map.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The shared read-only instance, for graphs that have no provided or package scope.
    pub fn empty() -> Arc<Self> {
        Arc::clone(&EMPTY)
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Marks the dependency as skipped.
    pub fn skip(&self, dependency: &Dependency) -> Result<(), GraphError> {
        self.update(dependency, |data| data.skipped = true)?;
        debug!("skip {dependency}");
        Ok(())
    }

    pub fn is_skipped(&self, dependency: &Dependency) -> bool {
        self.get(dependency).skipped
    }

    /// Marks the dependency as provided.
    pub fn set_provided(&self, dependency: &Dependency) -> Result<(), GraphError> {
        self.update(dependency, |data| data.provided = true)?;
        debug!("provided {dependency}");
        Ok(())
    }

    pub fn is_provided(&self, dependency: &Dependency) -> bool {
        self.get(dependency).provided
    }

    /// A copy of the flags currently recorded for the dependency.
    pub fn get(&self, dependency: &Dependency) -> DependencyData {
        self.data
            .lock()
            .get(dependency.coordinates())
            .copied()
            .unwrap_or_default()
    }

    fn update(
        &self,
        dependency: &Dependency,
        f: impl FnOnce(&mut DependencyData),
    ) -> Result<(), GraphError> {
        if self.read_only {
            return Err(GraphError::ReadOnlyDataMap {
                dependency: dependency.coordinates().clone(),
            });
        }
        let mut data = self.data.lock();
        f(data.entry(dependency.coordinates().clone()).or_default());
        Ok(())
    }
}
