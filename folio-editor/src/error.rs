//! Errors returned to the caller.
//!
//! Only contract violations are returned. Storage failures are logged and
//! reported through the notifier instead.

use folio_core::{BlockId, BlockKind, ModelError};

use crate::controller::SessionState;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    #[error("Document is not ready (state: {0})")]
    NotReady(SessionState),

    #[error("Document has already been loaded")]
    AlreadyLoaded,

    #[error("Unsupported block type: {0}")]
    UnsupportedBlockType(String),

    #[error("Block index {index} out of bounds (length {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Block {id} is a {existing} block and cannot become {requested}")]
    KindMismatch {
        id: BlockId,
        existing: BlockKind,
        requested: BlockKind,
    },
}

impl From<ModelError> for EditorError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::UnsupportedBlockType(tag) => EditorError::UnsupportedBlockType(tag),
        }
    }
}
