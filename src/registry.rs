//! Container registry: the name-keyed map owning every container.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::container::Container;
use crate::error::{StoreError, StoreResult};
use crate::types::ContainerSummary;

/// Sole owner of all containers. The registry lock only covers the key set;
/// each container carries its own lock for subtree mutations, so operations
/// on different containers never serialize against each other.
#[derive(Debug, Clone, Default)]
pub struct ContainerRegistry {
    containers: Arc<RwLock<HashMap<String, Arc<Container>>>>,
}

impl ContainerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, name: &str) -> StoreResult<ContainerSummary> {
        let mut containers = self.containers.write().unwrap();
        if containers.contains_key(name) {
            return Err(StoreError::AlreadyExists(name.to_string()));
        }
        let container = Arc::new(Container::new(name));
        let summary = container.summary();
        containers.insert(name.to_string(), container);
        debug!(container = name, "created container");
        Ok(summary)
    }

    pub fn get(&self, name: &str) -> StoreResult<Arc<Container>> {
        let containers = self.containers.read().unwrap();
        containers
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    /// Remove a container, dropping its entire subtree.
    pub fn remove(&self, name: &str) -> StoreResult<()> {
        let mut containers = self.containers.write().unwrap();
        if containers.remove(name).is_none() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        debug!(container = name, "deleted container");
        Ok(())
    }

    /// All containers, in no particular order.
    pub fn list(&self) -> Vec<Arc<Container>> {
        let containers = self.containers.read().unwrap();
        containers.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_then_get() {
        let registry = ContainerRegistry::new();
        let summary = registry.create("mydata").unwrap();
        assert_eq!(summary.name, "mydata");

        let container = registry.get("mydata").unwrap();
        assert_eq!(container.id(), summary.id);
    }

    #[test]
    fn duplicate_name_rejected() {
        let registry = ContainerRegistry::new();
        registry.create("dup").unwrap();
        assert!(matches!(
            registry.create("dup"),
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[test]
    fn get_and_remove_missing() {
        let registry = ContainerRegistry::new();
        assert!(matches!(registry.get("nope"), Err(StoreError::NotFound(_))));
        assert!(matches!(
            registry.remove("nope"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn remove_drops_container() {
        let registry = ContainerRegistry::new();
        registry.create("gone").unwrap();
        registry.remove("gone").unwrap();
        assert!(matches!(registry.get("gone"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn list_returns_every_container() {
        let registry = ContainerRegistry::new();
        registry.create("a").unwrap();
        registry.create("b").unwrap();

        let mut names: Vec<_> = registry
            .list()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);
    }
}
