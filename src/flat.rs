// SPDX-License-Identifier: MPL-2.0

use std::sync::Arc;

use log::debug;

use crate::{Dependency, DependencyContainer, MutableDependencyDataMap};

/// Result of flattening a graph, before skipped dependencies are removed.
///
/// Both lists are deduplicated and in priority order, highest first.
#[derive(Debug, Clone)]
pub struct FlatDependencyContainer {
    all: Vec<Arc<Dependency>>,
    direct: Vec<Arc<Dependency>>,
    base_atom: Option<Arc<Dependency>>,
    data_map: Arc<MutableDependencyDataMap>,
}

impl FlatDependencyContainer {
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
        }
    }

    pub fn all_dependencies(&self) -> &[Arc<Dependency>] {
        &self.all
    }

    pub fn direct_dependencies(&self) -> &[Arc<Dependency>] {
        &self.direct
    }

    pub fn base_atom(&self) -> Option<&Arc<Dependency>> {
        self.base_atom.as_ref()
    }

    pub fn data_map(&self) -> &Arc<MutableDependencyDataMap> {
        &self.data_map
    }

    /// Builds the resolved view, leaving out every dependency the data map
    /// currently reports as skipped.
    ///
    /// The result is a snapshot: skipping a dependency later does not change it.
    /// The data map itself is shared, not copied.
    pub fn filter_skipped_libraries(&self) -> DependencyContainer {
        let keep = |deps: &[Arc<Dependency>]| -> Vec<Arc<Dependency>> {
            deps.iter()
                .filter(|d| {
                    let skipped = self.data_map.is_skipped(d);
                    if skipped {
                        debug!("filtering out skipped {d}");
                    }
                    !skipped
                })
                .cloned()
                .collect()
        };
        DependencyContainer::new(
            keep(&self.all),
            keep(&self.direct),
            self.base_atom.clone(),
            Arc::clone(&self.data_map),
        )
    }
}
