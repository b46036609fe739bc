//! Node model: one tree entry, either a file or a directory.

use indexmap::IndexMap;
use std::collections::HashMap;

use crate::types::{NodeId, NodeKind, Properties};

/// A file entry: whole-object content plus its declared content type.
#[derive(Debug, Clone)]
pub struct FileNode {
    pub id: NodeId,
    pub name: String,
    pub path: String,
    pub parent_path: String,
    pub content: Vec<u8>,
    pub content_type: String,
    /// User-defined key/value pairs merged by metadata patches.
    pub metadata: HashMap<String, String>,
    pub properties: Properties,
}

impl FileNode {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        parent_path: impl Into<String>,
        content: Vec<u8>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            path: path.into(),
            parent_path: parent_path.into(),
            content,
            content_type: content_type.into(),
            metadata: HashMap::new(),
            properties: Properties::new(),
        }
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// Replace content and content type in place, keeping identity, creation
    /// time, and user metadata.
    pub fn update_content(&mut self, content: Vec<u8>, content_type: impl Into<String>) {
        self.content = content;
        self.content_type = content_type.into();
        self.properties.touch();
    }
}

/// A directory entry: an insertion-ordered map of child name to node.
#[derive(Debug, Clone)]
pub struct DirectoryNode {
    pub id: NodeId,
    pub name: String,
    pub path: String,
    pub parent_path: String,
    pub children: IndexMap<String, Node>,
    pub properties: Properties,
}

impl DirectoryNode {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<String>,
        parent_path: impl Into<String>,
    ) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            path: path.into(),
            parent_path: parent_path.into(),
            children: IndexMap::new(),
            properties: Properties::new(),
        }
    }

    /// The container-root directory (path `""`).
    pub fn root() -> Self {
        Self::new("", "", "")
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// Internal tree node. All type checks dispatch on this tag, never on
/// structural shape.
#[derive(Debug, Clone)]
pub enum Node {
    File(FileNode),
    Directory(DirectoryNode),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::File(_) => NodeKind::File,
            Node::Directory(_) => NodeKind::Directory,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Node::Directory(_))
    }

    pub fn name(&self) -> &str {
        match self {
            Node::File(f) => &f.name,
            Node::Directory(d) => &d.name,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Node::File(f) => &f.path,
            Node::Directory(d) => &d.path,
        }
    }

    pub fn properties(&self) -> &Properties {
        match self {
            Node::File(f) => &f.properties,
            Node::Directory(d) => &d.properties,
        }
    }

    /// Bump the modified timestamp and regenerate the etag.
    pub fn touch(&mut self) {
        match self {
            Node::File(f) => f.properties.touch(),
            Node::Directory(d) => d.properties.touch(),
        }
    }

    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            Node::File(f) => Some(f),
            Node::Directory(_) => None,
        }
    }

    pub fn as_file_mut(&mut self) -> Option<&mut FileNode> {
        match self {
            Node::File(f) => Some(f),
            Node::Directory(_) => None,
        }
    }

    pub fn as_directory(&self) -> Option<&DirectoryNode> {
        match self {
            Node::Directory(d) => Some(d),
            Node::File(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_dispatches_on_tag() {
        let file = Node::File(FileNode::new("f", "f", "", Vec::new(), "text/plain"));
        let dir = Node::Directory(DirectoryNode::new("d", "d", ""));

        assert_eq!(file.kind(), NodeKind::File);
        assert_eq!(dir.kind(), NodeKind::Directory);
        assert!(!file.is_directory());
        assert!(dir.is_directory());
    }

    #[test]
    fn touch_preserves_identity_and_creation_time() {
        let mut node = Node::File(FileNode::new("f", "f", "", b"x".to_vec(), "text/plain"));
        let id = node.as_file().unwrap().id;
        let created = node.properties().created;
        let etag = node.properties().etag;

        node.touch();

        assert_eq!(node.as_file().unwrap().id, id);
        assert_eq!(node.properties().created, created);
        assert_ne!(node.properties().etag, etag);
    }

    #[test]
    fn update_content_recomputes_size() {
        let mut file = FileNode::new("f", "f", "", b"hello".to_vec(), "text/plain");
        assert_eq!(file.size(), 5);

        file.update_content(b"hello, world".to_vec(), "text/rtf");
        assert_eq!(file.size(), 12);
        assert_eq!(file.content_type, "text/rtf");
    }
}
