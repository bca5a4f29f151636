//! Block store integration tests.
//!
//! Verifies, against both store implementations:
//! - replace_all / get_all roundtrip (as a set and in order)
//! - upsert and delete semantics
//! - records survive close + reopen of the RocksDB store
//! - concurrent implicit initialization is benign

use folio_core::{Block, BlockKind, ChecklistBlock, ImageBlock, TextBlock, TextStyle};
use folio_store::{BlockStore, MemoryBlockStore, RocksBlockStore, StoreConfig};

use std::collections::HashSet;
use std::sync::Arc;
use tempfile::tempdir;

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn sample_document() -> Vec<Block> {
    let mut heading = TextBlock::new();
    heading.set_content("Groceries");
    heading.set_style(TextStyle::H1);

    let mut list = ChecklistBlock::new();
    let milk = list.add_item("milk");
    list.add_item("bread");
    list.toggle_item(milk);

    let mut photo = ImageBlock::new();
    photo.set_source("file:///tmp/receipt.jpg", 640, 480);

    vec![heading.into(), list.into(), photo.into(), Block::new(BlockKind::Text)]
}

fn ids(blocks: &[Block]) -> HashSet<uuid::Uuid> {
    blocks.iter().map(Block::id).collect()
}

async fn check_roundtrip(store: &dyn BlockStore) {
    let document = sample_document();
    store.replace_all(&document).await.unwrap();

    let loaded = store.get_all().await.unwrap();
    assert_eq!(ids(&loaded), ids(&document));
    assert_eq!(loaded, document);

    // An empty replace clears everything
    store.replace_all(&[]).await.unwrap();
    assert!(store.get_all().await.unwrap().is_empty());
}

async fn check_delete(store: &dyn BlockStore) {
    let document = sample_document();
    store.replace_all(&document).await.unwrap();

    let removed = document[1].id();
    store.delete(removed).await.unwrap();

    let loaded = store.get_all().await.unwrap();
    assert_eq!(loaded.len(), document.len() - 1);
    assert!(loaded.iter().all(|b| b.id() != removed));
}

// ─── Roundtrip ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_memory_roundtrip() {
    check_roundtrip(&MemoryBlockStore::new()).await;
    check_delete(&MemoryBlockStore::new()).await;
}

#[tokio::test]
async fn test_rocks_roundtrip() {
    let dir = tempdir().unwrap();
    let store = RocksBlockStore::new(StoreConfig::for_testing(dir.path().join("db")));
    check_roundtrip(&store).await;
    check_delete(&store).await;
}

// ─── Durability ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_records_survive_reopen() {
    let dir = tempdir().unwrap();
    let config = StoreConfig::for_testing(dir.path().join("db"));
    let document = sample_document();

    {
        let store = RocksBlockStore::open(config.clone()).await.unwrap();
        store.replace_all(&document).await.unwrap();
        store.close().await.unwrap();
    }

    let store = RocksBlockStore::new(config);
    assert_eq!(store.get_all().await.unwrap(), document);
}

#[tokio::test]
async fn test_reopen_after_close_same_instance() {
    let dir = tempdir().unwrap();
    let store = RocksBlockStore::new(StoreConfig::for_testing(dir.path().join("db")));

    let block = Block::new(BlockKind::Image);
    store.upsert(&block).await.unwrap();
    store.close().await.unwrap();

    // The next operation opens the database again
    assert_eq!(store.get_all().await.unwrap(), vec![block]);
    assert!(store.is_open().await);
}

// ─── Concurrency ─────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_initialize() {
    let dir = tempdir().unwrap();
    let store = Arc::new(RocksBlockStore::new(StoreConfig::for_testing(
        dir.path().join("db"),
    )));

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.initialize().await })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }
    assert!(store.is_open().await);
}

#[tokio::test]
async fn test_upsert_overwrites_fields() {
    let store = MemoryBlockStore::new();
    let mut text = TextBlock::new();
    store.upsert(&text.clone().into()).await.unwrap();

    text.set_content("hello");
    store.upsert(&text.clone().into()).await.unwrap();

    let loaded = store.get_all().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].as_text().unwrap().content, "hello");
}
