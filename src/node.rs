// SPDX-License-Identifier: MPL-2.0

//! Positions in a dependency graph.

use crate::{Address, DependencyKind};

/// The subtype of the dependency a node refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeType {
    AndroidLibrary,
    JavaLibrary,
    Atom,
}

impl From<DependencyKind> for NodeType {
    fn from(kind: DependencyKind) -> Self {
        match kind {
            DependencyKind::AndroidLibrary => Self::AndroidLibrary,
            DependencyKind::JavaLibrary { .. } => Self::JavaLibrary,
            DependencyKind::Atom => Self::Atom,
        }
    }
}

/// A node of a dependency graph.
///
/// The same dependency may be referenced by several nodes of one graph.
/// Children are local to the graph the node belongs to: the same library
/// can have different children in the compile and in the package graph.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DependencyNode<A: Address> {
    address: A,
    node_type: NodeType,
    #[cfg_attr(feature = "serde", serde(default = "Vec::new"))]
    children: Vec<DependencyNode<A>>,
}

impl<A: Address> DependencyNode<A> {
    pub fn new(address: A, node_type: NodeType, children: Vec<DependencyNode<A>>) -> Self {
        Self {
            address,
            node_type,
            children,
        }
    }

    /// A node without children.
    pub fn leaf(address: A, node_type: NodeType) -> Self {
        Self::new(address, node_type, Vec::new())
    }

    pub fn address(&self) -> &A {
        &self.address
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Direct dependencies of this node, in declaration order.
    pub fn children(&self) -> &[DependencyNode<A>] {
        &self.children
    }
}
