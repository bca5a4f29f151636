//! In-process block store.
//!
//! Same semantics as [`RocksBlockStore`](crate::RocksBlockStore) (explicit
//! positions, idempotent initialize, absent deletes are fine) without
//! touching the disk. Records outlive `close`; only the open flag resets.

use async_trait::async_trait;
use folio_core::{Block, BlockId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::record::{self, StoredBlock};
use crate::{BlockStore, StoreError};

#[derive(Default)]
pub struct MemoryBlockStore {
    records: RwLock<HashMap<BlockId, StoredBlock>>,
    open: AtomicBool,
}

impl MemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `blocks` in order.
    pub fn with_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        let records = blocks
            .into_iter()
            .enumerate()
            .map(|(position, block)| {
                (block.id(), StoredBlock { block, position: position as u64 })
            })
            .collect();
        Self {
            records: RwLock::new(records),
            open: AtomicBool::new(false),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn contains(&self, id: BlockId) -> bool {
        self.records.read().await.contains_key(&id)
    }

    fn ensure_open(&self) {
        if !self.open.swap(true, Ordering::SeqCst) {
            log::debug!("Opened in-memory block store");
        }
    }
}

#[async_trait]
impl BlockStore for MemoryBlockStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        self.ensure_open();
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Block>, StoreError> {
        self.ensure_open();
        let records = self.records.read().await.values().cloned().collect();
        Ok(record::into_document_order(records))
    }

    async fn replace_all(&self, blocks: &[Block]) -> Result<(), StoreError> {
        self.ensure_open();
        let mut records = self.records.write().await;
        records.clear();
        for (position, block) in blocks.iter().enumerate() {
            records.insert(
                block.id(),
                StoredBlock {
                    block: block.clone(),
                    position: position as u64,
                },
            );
        }
        Ok(())
    }

    async fn upsert(&self, block: &Block) -> Result<(), StoreError> {
        self.ensure_open();
        let mut records = self.records.write().await;
        let position = match records.get(&block.id()) {
            Some(existing) => existing.position,
            None => record::next_position(records.values().map(|r| &r.position)),
        };
        records.insert(
            block.id(),
            StoredBlock {
                block: block.clone(),
                position,
            },
        );
        Ok(())
    }

    async fn delete(&self, id: BlockId) -> Result<(), StoreError> {
        self.ensure_open();
        self.records.write().await.remove(&id);
        Ok(())
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.open.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::BlockKind;

    #[tokio::test]
    async fn test_with_blocks_keeps_order() {
        let blocks: Vec<Block> = BlockKind::ALL.iter().map(|k| Block::new(*k)).collect();
        let store = MemoryBlockStore::with_blocks(blocks.clone());

        assert!(!store.is_open());
        assert_eq!(store.get_all().await.unwrap(), blocks);
        assert!(store.is_open());
    }

    #[tokio::test]
    async fn test_upsert_appends_new_ids() {
        let store = MemoryBlockStore::new();
        let a = Block::new(BlockKind::Text);
        let b = Block::new(BlockKind::Image);

        store.upsert(&a).await.unwrap();
        store.upsert(&b).await.unwrap();
        store.upsert(&a).await.unwrap();

        assert_eq!(store.get_all().await.unwrap(), vec![a, b]);
    }

    #[tokio::test]
    async fn test_close_keeps_records() {
        let store = MemoryBlockStore::new();
        let a = Block::new(BlockKind::Checklist);
        store.replace_all(std::slice::from_ref(&a)).await.unwrap();

        store.close().await.unwrap();
        assert!(!store.is_open());
        assert!(store.contains(a.id()).await);

        store.delete(a.id()).await.unwrap();
        assert!(store.is_empty().await);
        assert_eq!(store.len().await, 0);
    }
}
