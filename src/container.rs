// SPDX-License-Identifier: MPL-2.0

//! The resolved view of a classpath.

use std::sync::{Arc, LazyLock, OnceLock};

use crate::{Dependency, MutableDependencyDataMap};

static EMPTY: LazyLock<DependencyContainer> = LazyLock::new(|| {
    DependencyContainer::new(Vec::new(), Vec::new(), None, MutableDependencyDataMap::empty())
});

/// Flattened dependencies of a classpath, with typed views.
///
/// The backing lists keep the priority order established by flattening.
/// Every typed view is a filter of one of them, computed on first access and
/// cached, so it keeps that order too.
#[derive(Debug, Clone)]
pub struct DependencyContainer {
    all: Vec<Arc<Dependency>>,
    direct: Vec<Arc<Dependency>>,
    base_atom: Option<Arc<Dependency>>,
    data_map: Arc<MutableDependencyDataMap>,
    slices: Slices,
}

#[derive(Debug, Clone, Default)]
struct Slices {
    all_android: OnceLock<Vec<Arc<Dependency>>>,
    all_java: OnceLock<Vec<Arc<Dependency>>>,
    all_atom: OnceLock<Vec<Arc<Dependency>>>,
    all_packaged: OnceLock<Vec<Arc<Dependency>>>,
    direct_android: OnceLock<Vec<Arc<Dependency>>>,
    direct_java: OnceLock<Vec<Arc<Dependency>>>,
    direct_local_java: OnceLock<Vec<Arc<Dependency>>>,
    direct_atom: OnceLock<Vec<Arc<Dependency>>>,
}

fn memoize<'a>(
    cell: &'a OnceLock<Vec<Arc<Dependency>>>,
    source: &[Arc<Dependency>],
    keep: fn(&Dependency) -> bool,
) -> &'a [Arc<Dependency>] {
    cell.get_or_init(|| source.iter().filter(|d| keep(d)).cloned().collect())
}

impl DependencyContainer {
    pub fn new(
        all: Vec<Arc<Dependency>>,
        direct: Vec<Arc<Dependency>>,
        base_atom: Option<Arc<Dependency>>,
        data_map: Arc<MutableDependencyDataMap>,
    ) -> Self {
        Self {
            all,
            direct,
            base_atom,
            data_map,
            slices: Slices::default(),
        }
    }

    /// The process-wide container with no dependencies.
    pub fn empty() -> &'static DependencyContainer {
        &EMPTY
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty() && self.direct.is_empty()
    }

    /// The data map shared with the graph this container was flattened from.
    pub fn data_map(&self) -> &Arc<MutableDependencyDataMap> {
        &self.data_map
    }

    pub fn is_skipped(&self, dependency: &Dependency) -> bool {
        self.data_map.is_skipped(dependency)
    }

    pub fn is_provided(&self, dependency: &Dependency) -> bool {
        self.data_map.is_provided(dependency)
    }

    /// All transitive dependencies, highest priority first.
    pub fn all_dependencies(&self) -> &[Arc<Dependency>] {
        &self.all
    }

    /// The direct dependencies, in declaration order.
    pub fn direct_dependencies(&self) -> &[Arc<Dependency>] {
        &self.direct
    }

    /// The atom without atom dependencies, if the graph has atoms.
    pub fn base_atom(&self) -> Option<&Arc<Dependency>> {
        self.base_atom.as_ref()
    }

    pub fn all_android_dependencies(&self) -> &[Arc<Dependency>] {
        memoize(&self.slices.all_android, &self.all, Dependency::is_android_library)
    }

    pub fn all_java_dependencies(&self) -> &[Arc<Dependency>] {
        memoize(&self.slices.all_java, &self.all, Dependency::is_java_library)
    }

    pub fn all_atom_dependencies(&self) -> &[Arc<Dependency>] {
        memoize(&self.slices.all_atom, &self.all, Dependency::is_atom)
    }

    /// All dependencies that take part in standard packaging, i.e. everything
    /// except atoms.
    pub fn all_packaged_dependencies(&self) -> &[Arc<Dependency>] {
        memoize(&self.slices.all_packaged, &self.all, |d| !d.is_atom())
    }

    pub fn direct_android_dependencies(&self) -> &[Arc<Dependency>] {
        memoize(&self.slices.direct_android, &self.direct, Dependency::is_android_library)
    }

    pub fn direct_java_dependencies(&self) -> &[Arc<Dependency>] {
        memoize(&self.slices.direct_java, &self.direct, Dependency::is_java_library)
    }

    /// Direct jars that are local files of the project.
    pub fn direct_local_java_dependencies(&self) -> &[Arc<Dependency>] {
        memoize(&self.slices.direct_local_java, &self.direct, Dependency::is_local_jar)
    }

    pub fn direct_atom_dependencies(&self) -> &[Arc<Dependency>] {
        memoize(&self.slices.direct_atom, &self.direct, Dependency::is_atom)
    }
}

/// Content equality: the backing lists and the base atom.
impl PartialEq for DependencyContainer {
    fn eq(&self, other: &Self) -> bool {
        self.all == other.all && self.direct == other.direct && self.base_atom == other.base_atom
    }
}

impl Eq for DependencyContainer {}
