//! In-memory storage engine: the `StorageBackend` implementation backing the
//! emulator.
//!
//! Every operation resolves the container through the registry, then takes
//! that container's own lock for the duration of the mutation, so ancestor
//! materialization and the final write land atomically as far as concurrent
//! readers of the same container can observe. Locks are never held across an
//! await point.

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::debug;

use crate::backend::StorageBackend;
use crate::container::ContainerState;
use crate::error::{StoreError, StoreResult};
use crate::node::{DirectoryNode, FileNode, Node};
use crate::registry::ContainerRegistry;
use crate::tree::{Entry, split_segments};
use crate::types::{
    ContainerSummary, DEFAULT_CONTENT_TYPE, DirEntry, DirectoryListing, DirectorySummary,
    FileDownload, FileSummary,
};

/// The in-memory store. Cheap to clone; clones share the same registry.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    registry: ContainerRegistry,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &ContainerRegistry {
        &self.registry
    }
}

fn file_summary(file: &FileNode) -> FileSummary {
    FileSummary {
        id: file.id,
        name: file.name.clone(),
        path: file.path.clone(),
        content_type: file.content_type.clone(),
        size: file.size(),
        metadata: file.metadata.clone(),
        properties: file.properties.clone(),
    }
}

fn file_download(file: &FileNode) -> FileDownload {
    FileDownload {
        content: file.content.clone(),
        content_type: file.content_type.clone(),
        size: file.size(),
        properties: file.properties.clone(),
    }
}

fn dir_entries(children: &IndexMap<String, Node>) -> Vec<DirEntry> {
    children
        .iter()
        .map(|(name, node)| DirEntry {
            name: name.clone(),
            is_directory: node.is_directory(),
        })
        .collect()
}

/// Write a brand-new file node at the path given by `segments` (non-empty),
/// touching the container. Used by both create and the create half of
/// update.
fn write_fresh_file(
    state: &mut ContainerState,
    segments: &[&str],
    content: Vec<u8>,
    content_type: Option<&str>,
) -> StoreResult<FileSummary> {
    let full = segments.join("/");
    let name = segments[segments.len() - 1];
    let parent = segments[..segments.len() - 1].join("/");
    let content_type = content_type.unwrap_or(DEFAULT_CONTENT_TYPE);

    let file = FileNode::new(name, &full, &parent, content, content_type);
    let summary = file_summary(&file);
    state.tree.upsert(&full, Node::File(file))?;
    state.properties.touch();
    Ok(summary)
}

#[async_trait::async_trait]
impl StorageBackend for MemoryStore {
    async fn list_containers(&self) -> StoreResult<Vec<ContainerSummary>> {
        Ok(self
            .registry
            .list()
            .iter()
            .map(|container| container.summary())
            .collect())
    }

    async fn create_container(&self, name: &str) -> StoreResult<ContainerSummary> {
        self.registry.create(name)
    }

    async fn delete_container(&self, name: &str) -> StoreResult<()> {
        self.registry.remove(name)
    }

    async fn create_file(
        &self,
        container: &str,
        path: &str,
        content: Vec<u8>,
        content_type: Option<&str>,
    ) -> StoreResult<FileSummary> {
        let container_ref = self.registry.get(container)?;
        let mut guard = container_ref.write();
        let state = &mut *guard;

        let segments = split_segments(path)?;
        if segments.is_empty() {
            // The root is a directory; a file can never sit at "".
            return Err(StoreError::expected_file(path));
        }
        let summary = write_fresh_file(state, &segments, content, content_type)?;
        debug!(container, path = %summary.path, size = summary.size, "created file");
        Ok(summary)
    }

    async fn update_file(
        &self,
        container: &str,
        path: &str,
        content: Vec<u8>,
        content_type: Option<&str>,
    ) -> StoreResult<FileSummary> {
        let container_ref = self.registry.get(container)?;
        let mut guard = container_ref.write();
        let state = &mut *guard;

        let segments = split_segments(path)?;
        if segments.is_empty() {
            return Err(StoreError::expected_file(path));
        }
        let full = segments.join("/");

        match state.tree.resolve_mut(&full)? {
            Some(Node::Directory(_)) => Err(StoreError::expected_file(full)),
            Some(Node::File(file)) => {
                let content_type = content_type.unwrap_or(DEFAULT_CONTENT_TYPE);
                file.update_content(content, content_type);
                let summary = file_summary(file);
                state.properties.touch();
                debug!(container, path = %full, size = summary.size, "updated file");
                Ok(summary)
            }
            None => {
                let summary = write_fresh_file(state, &segments, content, content_type)?;
                debug!(container, path = %full, size = summary.size, "created file");
                Ok(summary)
            }
        }
    }

    async fn get_file(&self, container: &str, path: &str) -> StoreResult<FileDownload> {
        let container_ref = self.registry.get(container)?;
        let guard = container_ref.read();

        let segments = split_segments(path)?;
        let full = segments.join("/");
        match guard.tree.resolve(&full)? {
            None => Err(StoreError::NotFound(format!("{container}/{full}"))),
            Some(Entry::Root(_)) | Some(Entry::Node(Node::Directory(_))) => {
                Err(StoreError::expected_file(full))
            }
            Some(Entry::Node(Node::File(file))) => Ok(file_download(file)),
        }
    }

    async fn delete_file(&self, container: &str, path: &str) -> StoreResult<()> {
        let container_ref = self.registry.get(container)?;
        let mut guard = container_ref.write();
        let state = &mut *guard;

        let segments = split_segments(path)?;
        let full = segments.join("/");
        match state.tree.resolve(&full)? {
            None => return Err(StoreError::NotFound(format!("{container}/{full}"))),
            Some(Entry::Root(_)) | Some(Entry::Node(Node::Directory(_))) => {
                return Err(StoreError::expected_file(full));
            }
            Some(Entry::Node(Node::File(_))) => {}
        }
        state.tree.remove(&full)?;
        state.properties.touch();
        debug!(container, path = %full, "deleted file");
        Ok(())
    }

    async fn patch_file_metadata(
        &self,
        container: &str,
        path: &str,
        patch: HashMap<String, String>,
    ) -> StoreResult<FileSummary> {
        let container_ref = self.registry.get(container)?;
        let mut guard = container_ref.write();
        let state = &mut *guard;

        let segments = split_segments(path)?;
        if segments.is_empty() {
            return Err(StoreError::expected_file(path));
        }
        let full = segments.join("/");

        match state.tree.resolve_mut(&full)? {
            None => Err(StoreError::NotFound(format!("{container}/{full}"))),
            Some(Node::Directory(_)) => Err(StoreError::expected_file(full)),
            Some(Node::File(file)) => {
                file.metadata.extend(patch);
                file.properties.touch();
                debug!(container, path = %full, "patched file metadata");
                Ok(file_summary(file))
            }
        }
    }

    async fn create_directory(
        &self,
        container: &str,
        path: &str,
    ) -> StoreResult<DirectorySummary> {
        let container_ref = self.registry.get(container)?;
        let mut guard = container_ref.write();
        let state = &mut *guard;

        let segments = split_segments(path)?;
        let Some((name, ancestors)) = segments.split_last() else {
            // The root always exists; creating it is a no-op success.
            return Ok(DirectorySummary {
                path: String::new(),
                is_directory: true,
            });
        };
        let full = segments.join("/");
        let parent = ancestors.join("/");

        let dir = DirectoryNode::new(*name, &full, &parent);
        state.tree.upsert(&full, Node::Directory(dir))?;
        state.properties.touch();
        debug!(container, path = %full, "created directory");
        Ok(DirectorySummary {
            path: full,
            is_directory: true,
        })
    }

    async fn list_directory(&self, container: &str, path: &str) -> StoreResult<DirectoryListing> {
        let container_ref = self.registry.get(container)?;
        let guard = container_ref.read();

        let segments = split_segments(path)?;
        let full = segments.join("/");
        let children = guard.tree.list_children(&full)?;
        Ok(DirectoryListing {
            entries: dir_entries(children),
            path: full,
        })
    }

    async fn delete_directory(&self, container: &str, path: &str) -> StoreResult<()> {
        let container_ref = self.registry.get(container)?;
        let mut guard = container_ref.write();
        let state = &mut *guard;

        let segments = split_segments(path)?;
        let full = segments.join("/");
        let child_count = match state.tree.resolve(&full)? {
            None => return Err(StoreError::NotFound(format!("{container}/{full}"))),
            Some(Entry::Node(Node::File(_))) => {
                return Err(StoreError::expected_directory(full));
            }
            Some(Entry::Root(root)) => {
                if !root.is_empty() {
                    return Err(StoreError::DirectoryNotEmpty(full));
                }
                // The root itself is never removed.
                return Ok(());
            }
            Some(Entry::Node(Node::Directory(dir))) => dir.child_count(),
        };
        if child_count > 0 {
            return Err(StoreError::DirectoryNotEmpty(full));
        }
        state.tree.remove(&full)?;
        state.properties.touch();
        debug!(container, path = %full, "deleted directory");
        Ok(())
    }
}
