//! A container: one named namespace with its own tree and mutation lock.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::tree::NamespaceTree;
use crate::types::{ContainerSummary, NodeId, Properties};

/// Everything guarded by the container's lock. The tree and the container's
/// own properties mutate together: any structural change to the subtree also
/// touches the container.
#[derive(Debug)]
pub(crate) struct ContainerState {
    pub tree: NamespaceTree,
    pub properties: Properties,
}

/// A top-level namespace, analogous to a bucket. Identity and name are fixed
/// at creation; the tree and properties live behind a per-container `RwLock`
/// so a multi-segment mutation appears atomic to readers of the same
/// container while other containers proceed in parallel.
#[derive(Debug)]
pub struct Container {
    id: NodeId,
    name: String,
    state: RwLock<ContainerState>,
}

impl Container {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            state: RwLock::new(ContainerState {
                tree: NamespaceTree::new(),
                properties: Properties::new(),
            }),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn summary(&self) -> ContainerSummary {
        let state = self.read();
        ContainerSummary {
            id: self.id,
            name: self.name.clone(),
            properties: state.properties.clone(),
        }
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, ContainerState> {
        self.state.read().unwrap()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, ContainerState> {
        self.state.write().unwrap()
    }
}
