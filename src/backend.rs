use std::collections::HashMap;

use crate::error::StoreResult;
use crate::types::{
    ContainerSummary, DirectoryListing, DirectorySummary, FileDownload, FileSummary,
};

/// The contract a protocol-translation layer consumes. Every operation is a
/// complete request: resolve the container, act on its tree, return a typed
/// result. Implementations must make multi-segment mutations atomic to
/// concurrent readers of the same container.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    async fn list_containers(&self) -> StoreResult<Vec<ContainerSummary>>;

    async fn create_container(&self, name: &str) -> StoreResult<ContainerSummary>;

    async fn delete_container(&self, name: &str) -> StoreResult<()>;

    /// Write a fresh file at `path`, materializing missing ancestor
    /// directories and unconditionally replacing whatever was at the exact
    /// path. `None` content type defaults to a generic binary type.
    async fn create_file(
        &self,
        container: &str,
        path: &str,
        content: Vec<u8>,
        content_type: Option<&str>,
    ) -> StoreResult<FileSummary>;

    /// Upsert: create when absent, otherwise replace content and content
    /// type in place, preserving the file's identity and creation time.
    async fn update_file(
        &self,
        container: &str,
        path: &str,
        content: Vec<u8>,
        content_type: Option<&str>,
    ) -> StoreResult<FileSummary>;

    async fn get_file(&self, container: &str, path: &str) -> StoreResult<FileDownload>;

    async fn delete_file(&self, container: &str, path: &str) -> StoreResult<()>;

    /// Merge user metadata pairs into an existing file, overwriting
    /// colliding keys.
    async fn patch_file_metadata(
        &self,
        container: &str,
        path: &str,
        patch: HashMap<String, String>,
    ) -> StoreResult<FileSummary>;

    /// Write an empty directory at `path`, unconditionally replacing a prior
    /// file or directory there.
    async fn create_directory(&self, container: &str, path: &str)
    -> StoreResult<DirectorySummary>;

    /// List a directory's children; the empty path (or `"/"`) lists the
    /// container root.
    async fn list_directory(&self, container: &str, path: &str) -> StoreResult<DirectoryListing>;

    /// Delete an empty directory. Never recursive.
    async fn delete_directory(&self, container: &str, path: &str) -> StoreResult<()>;
}
