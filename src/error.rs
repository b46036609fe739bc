use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::NodeKind;

/// Typed failures the storage engine can return. All of these are expected
/// outcomes of normal operation and map one-to-one onto protocol statuses;
/// none is process-fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("container already exists: {0}")]
    AlreadyExists(String),

    #[error("type mismatch at '{path}': expected a {expected}")]
    TypeMismatch { path: String, expected: NodeKind },

    #[error("directory not empty: {0}")]
    DirectoryNotEmpty(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl StoreError {
    pub(crate) fn expected_file(path: impl Into<String>) -> Self {
        StoreError::TypeMismatch {
            path: path.into(),
            expected: NodeKind::File,
        }
    }

    pub(crate) fn expected_directory(path: impl Into<String>) -> Self {
        StoreError::TypeMismatch {
            path: path.into(),
            expected: NodeKind::Directory,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
