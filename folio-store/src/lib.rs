//! # folio-store — Durable block persistence
//!
//! The store is an unordered keyed collection of blocks. Document order is
//! owned by the editor; the store only keeps an explicit `position` per
//! record so that [`BlockStore::get_all`] can hand blocks back in the order
//! they were last written with [`BlockStore::replace_all`].
//!
//! ```text
//! ┌────────────────────┐   Arc<dyn BlockStore>   ┌──────────────────┐
//! │ DocumentController │ ──────────────────────► │ RocksBlockStore  │
//! │ (folio-editor)     │                         │ CF "blocks"      │
//! └────────────────────┘                         │ key = block id   │
//!                                                │ value = JSON     │
//!                                                └──────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`rocks`] — RocksDB-backed store (one column family, atomic batches)
//! - [`memory`] — in-process store with identical semantics
//! - [`record`] — persisted record format and ordering

pub mod error;
pub mod memory;
pub mod record;
pub mod rocks;

use async_trait::async_trait;
use folio_core::{Block, BlockId};

pub use error::StoreError;
pub use memory::MemoryBlockStore;
pub use rocks::{RocksBlockStore, StoreConfig};

/// Asynchronous keyed persistence for blocks.
///
/// Every operation opens the store implicitly if [`initialize`] has not run
/// yet. Implementations make no ordering promise between concurrent calls;
/// callers that need ordering serialize their calls.
///
/// [`initialize`]: BlockStore::initialize
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Open or create the underlying storage. Idempotent.
    async fn initialize(&self) -> Result<(), StoreError>;

    /// All persisted blocks, in last-written document order.
    async fn get_all(&self) -> Result<Vec<Block>, StoreError>;

    /// Atomically clear the collection and insert `blocks` in order.
    async fn replace_all(&self, blocks: &[Block]) -> Result<(), StoreError>;

    /// Insert or overwrite the record at `block.id()`.
    async fn upsert(&self, block: &Block) -> Result<(), StoreError>;

    /// Remove the record at `id`. Absent ids are not an error.
    async fn delete(&self, id: BlockId) -> Result<(), StoreError>;

    /// Release the underlying storage. A later call re-opens it.
    async fn close(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
