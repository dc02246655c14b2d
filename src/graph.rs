// SPDX-License-Identifier: MPL-2.0

//! Dependency graphs of a single classpath and their flattening.
//!
//! Flattening walks the roots of a graph in reverse declaration order and
//! inserts every dependency after its own children into an insertion-ordered
//! set, then reverses the collected sequence. A dependency reachable from
//! several places is therefore kept once, after everything that depends on it,
//! and the first declared root gets the highest priority.
//!
//! For roots `[A, B, C]` where both `B` and `C` depend on `D`, the result is
//! `[A, B, C, D]`.

use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info};

use crate::{
    Address, Dependency, DependencyContainer, DependencyNode, FlatDependencyContainer,
    FnvIndexSet, GraphError, Map, MutableDependencyDataMap, NodeType, Set,
};

/// Predicate applied to the root nodes of a graph during flattening.
pub type NodeFilter<'a, A> = &'a dyn Fn(&DependencyNode<A>) -> bool;

/// The resolved dependency graph of one classpath of one variant.
#[derive(Debug, Clone)]
pub struct DependencyGraph<A: Address> {
    dependency_map: Map<A, Arc<Dependency>>,
    roots: Vec<DependencyNode<A>>,
    data_map: Arc<MutableDependencyDataMap>,
}

impl<A: Address> DependencyGraph<A> {
    /// Every address reachable from `roots` must be a key of `dependency_map`.
    /// This is checked when the graph is flattened, including the sub-graphs
    /// that the flattening leaves out.
    pub fn new(
        dependency_map: Map<A, Arc<Dependency>>,
        roots: Vec<DependencyNode<A>>,
        data_map: Arc<MutableDependencyDataMap>,
    ) -> Self {
        Self {
            dependency_map,
            roots,
            data_map,
        }
    }

    /// A graph of local jar files without any children.
    ///
    /// Such graphs have no provided or package distinction, so they share the
    /// read-only [empty](MutableDependencyDataMap::empty) data map.
    pub fn from_local_jars<I: IntoIterator<Item = (A, PathBuf)>>(jars: I) -> Self {
        let mut dependency_map = Map::default();
        let mut roots = Vec::new();
        for (address, file) in jars {
            dependency_map.insert(address.clone(), Arc::new(Dependency::local_jar(file)));
            roots.push(DependencyNode::leaf(address, NodeType::JavaLibrary));
        }
        Self::new(dependency_map, roots, MutableDependencyDataMap::empty())
    }

    /// The direct dependencies of the classpath, in declaration order.
    pub fn roots(&self) -> &[DependencyNode<A>] {
        &self.roots
    }

    pub fn dependency_map(&self) -> &Map<A, Arc<Dependency>> {
        &self.dependency_map
    }

    pub fn data_map(&self) -> &Arc<MutableDependencyDataMap> {
        &self.data_map
    }

    /// The dependency a node refers to.
    pub fn dependency(&self, node: &DependencyNode<A>) -> Result<&Arc<Dependency>, GraphError> {
        self.dependency_map
            .get(node.address())
            .ok_or_else(|| GraphError::MissingDependency {
                address: node.address().to_string(),
            })
    }

    /// Flattens the graph into a deduplicated, priority-ordered list.
    ///
    /// The optional `filter` is only applied to the root nodes: a rejected root
    /// is left out together with its sub-graph, but the children of accepted
    /// roots are never filtered.
    pub fn flatten(
        &self,
        filter: Option<NodeFilter<'_, A>>,
    ) -> Result<Vec<Arc<Dependency>>, GraphError> {
        let mut flat = FnvIndexSet::default();
        self.flatten_nodes(&self.roots, filter, &Set::default(), &mut flat)?;
        info!(
            "flattened {} root(s) into {} dependencies",
            self.roots.len(),
            flat.len()
        );
        Ok(flat.into_iter().rev().collect())
    }

    /// Flattens the graph of a classpath that is not tested against another variant.
    ///
    /// Same as [flatten_for_test](Self::flatten_for_test) with neither a tested
    /// library nor tested dependencies.
    pub fn flatten_container(&self) -> Result<FlatDependencyContainer, GraphError> {
        self.flatten_for_test(None, None)
    }

    /// Flattens the graph of a test variant.
    ///
    /// `tested_library` is the library under test, if any. It is placed first
    /// unless the graph already contains it. The direct local jars of
    /// `tested_dependencies` are dropped from this graph wherever they appear,
    /// since packaging the tested library already repackages them.
    ///
    /// For `test -> {espresso, guava}` testing `aar`, the flattened list is
    /// `[aar, espresso, guava]`.
    pub fn flatten_for_test(
        &self,
        tested_library: Option<&Arc<Dependency>>,
        tested_dependencies: Option<&DependencyContainer>,
    ) -> Result<FlatDependencyContainer, GraphError> {
        let excluded: Set<&Dependency> = tested_dependencies
            .map(|c| {
                c.direct_local_java_dependencies()
                    .iter()
                    .map(|d| d.as_ref())
                    .collect()
            })
            .unwrap_or_default();

        let mut all = FnvIndexSet::default();
        self.flatten_nodes(&self.roots, None, &excluded, &mut all)?;

        if let Some(library) = tested_library {
            if all.insert(Arc::clone(library)) {
                debug!("adding tested library {library}");
            }
        }

        let mut direct = FnvIndexSet::default();
        for node in self.roots.iter().rev() {
            let dependency = self.dependency(node)?;
            if is_excluded(node, dependency, &excluded) {
                continue;
            }
            direct.insert(Arc::clone(dependency));
        }

        let base_atom = self.base_atom()?;

        info!(
            "flattened test graph: {} dependencies, {} direct, {} local jar(s) excluded",
            all.len(),
            direct.len(),
            excluded.len()
        );

        Ok(FlatDependencyContainer::new(
            all.into_iter().rev().collect(),
            direct.into_iter().rev().collect(),
            base_atom,
            Arc::clone(&self.data_map),
        ))
    }

    /// The atom at the bottom of the atom chains of this graph.
    ///
    /// Starting from the direct atoms, follows atom children down to atoms that
    /// have no atom children. All chains must end on the same atom.
    pub fn base_atom(&self) -> Result<Option<Arc<Dependency>>, GraphError> {
        let mut bases = FnvIndexSet::default();
        self.collect_base_atoms(&self.roots, &mut bases)?;
        let mut bases = bases.into_iter();
        match (bases.next(), bases.next()) {
            (Some(first), Some(second)) => Err(GraphError::MultipleBaseAtoms {
                first: first.coordinates().clone(),
                second: second.coordinates().clone(),
            }),
            (first, _) => Ok(first),
        }
    }

    fn flatten_nodes(
        &self,
        nodes: &[DependencyNode<A>],
        filter: Option<NodeFilter<'_, A>>,
        excluded: &Set<&Dependency>,
        flat: &mut FnvIndexSet<Arc<Dependency>>,
    ) -> Result<(), GraphError> {
        for node in nodes.iter().rev() {
            if let Some(filter) = filter {
                if !filter(node) {
                    self.check_addresses(std::slice::from_ref(node))?;
                    continue;
                }
            }
            let dependency = self.dependency(node)?;
            if is_excluded(node, dependency, excluded) {
                debug!("excluding local jar {dependency} already packaged by the tested library");
                self.check_addresses(node.children())?;
                continue;
            }
            self.flatten_nodes(node.children(), None, excluded, flat)?;
            flat.insert(Arc::clone(dependency));
        }
        Ok(())
    }

    /// Resolves every address of sub-graphs left out of a flattening.
    fn check_addresses(&self, nodes: &[DependencyNode<A>]) -> Result<(), GraphError> {
        for node in nodes {
            self.dependency(node)?;
            self.check_addresses(node.children())?;
        }
        Ok(())
    }

    fn collect_base_atoms(
        &self,
        nodes: &[DependencyNode<A>],
        bases: &mut FnvIndexSet<Arc<Dependency>>,
    ) -> Result<(), GraphError> {
        for node in nodes.iter().filter(|n| n.node_type() == NodeType::Atom) {
            let has_atom_children = node
                .children()
                .iter()
                .any(|c| c.node_type() == NodeType::Atom);
            if has_atom_children {
                self.collect_base_atoms(node.children(), bases)?;
            } else {
                bases.insert(Arc::clone(self.dependency(node)?));
            }
        }
        Ok(())
    }
}

fn is_excluded<A: Address>(
    node: &DependencyNode<A>,
    dependency: &Dependency,
    excluded: &Set<&Dependency>,
) -> bool {
    node.node_type() == NodeType::JavaLibrary && excluded.contains(dependency)
}
