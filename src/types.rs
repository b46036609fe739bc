//! Shared value types: node tags, identity tokens, metadata blocks, and the
//! summary/listing/download shapes handed to the protocol layer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::SystemTime;
use uuid::Uuid;

/// Content type assumed when an upload does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Runtime tag distinguishing the two node variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    File,
    Directory,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::File => f.write_str("file"),
            NodeKind::Directory => f.write_str("directory"),
        }
    }
}

/// Identity token assigned at creation and stable for the entity's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque version token regenerated on every mutation of the entity it tags.
/// External consumers use it for optimistic concurrency; internally it is
/// never compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Etag(Uuid);

impl Etag {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Etag {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Etag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Metadata block shared by files, directories, and containers. Timestamps
/// serialize as epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(with = "serde_millis")]
    pub created: SystemTime,
    #[serde(with = "serde_millis")]
    pub modified: SystemTime,
    pub etag: Etag,
}

impl Properties {
    pub fn new() -> Self {
        let now = SystemTime::now();
        Self {
            created: now,
            modified: now,
            etag: Etag::new(),
        }
    }

    /// Bump the modified timestamp and regenerate the etag. The creation
    /// timestamp is immutable after construction.
    pub fn touch(&mut self) {
        self.modified = SystemTime::now();
        self.etag = Etag::new();
    }
}

impl Default for Properties {
    fn default() -> Self {
        Self::new()
    }
}

/// Container as reported by list/create container operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSummary {
    pub id: NodeId,
    pub name: String,
    pub properties: Properties,
}

/// File as reported by upload, metadata-patch, and stat-style operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    pub id: NodeId,
    pub name: String,
    pub path: String,
    pub content_type: String,
    pub size: u64,
    pub metadata: HashMap<String, String>,
    pub properties: Properties,
}

/// Result of a directory-create operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySummary {
    pub path: String,
    pub is_directory: bool,
}

/// One entry of a directory listing, tagged with its variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub is_directory: bool,
}

/// A directory listing: the listed path plus its children in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryListing {
    pub path: String,
    pub entries: Vec<DirEntry>,
}

/// Everything a download needs: the exact bytes plus the headers a protocol
/// layer would attach (content type, size, etag, timestamps).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDownload {
    pub content: Vec<u8>,
    pub content_type: String,
    pub size: u64,
    pub properties: Properties,
}
