//! RocksDB-backed block store.
//!
//! Column families:
//! - `blocks` — one record per block, keyed by the hyphenated block id,
//!   value is the JSON record from [`crate::record`]
//!
//! RocksDB calls block the calling thread, so every operation runs on
//! `tokio::task::spawn_blocking` against a shared `Arc` handle. The handle
//! is opened lazily by the first operation (or by `initialize`) and released
//! by `close`.

use async_trait::async_trait;
use folio_core::{Block, BlockId};
use rocksdb::{
    BlockBasedOptions, Cache, ColumnFamily, ColumnFamilyDescriptor, DBCompressionType,
    DBWithThreadMode, IteratorMode, Options, SingleThreaded, WriteBatch, WriteOptions,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::record::{self, StoredBlock};
use crate::{BlockStore, StoreError};

/// The single record collection.
const CF_BLOCKS: &str = "blocks";

type Db = DBWithThreadMode<SingleThreaded>;

/// Store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Database directory path
    pub path: PathBuf,
    /// Block cache size in bytes (default: 32MB)
    pub block_cache_size: usize,
    /// Bloom filter bits per key (default: 10)
    pub bloom_filter_bits: i32,
    /// Enable fsync on every write (default: true)
    pub sync_writes: bool,
    /// Max open files for RocksDB (default: 256)
    pub max_open_files: i32,
    /// Write buffer size for the blocks column family (default: 8MB)
    pub write_buffer_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("folio_data/notes"),
            block_cache_size: 32 * 1024 * 1024,
            bloom_filter_bits: 10,
            sync_writes: true,
            max_open_files: 256,
            write_buffer_size: 8 * 1024 * 1024,
        }
    }
}

impl StoreConfig {
    /// Create config for testing (small caches, no fsync).
    pub fn for_testing(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 1024 * 1024,
            bloom_filter_bits: 10,
            sync_writes: false,
            max_open_files: 64,
            write_buffer_size: 1024 * 1024,
        }
    }
}

/// RocksDB-backed [`BlockStore`].
pub struct RocksBlockStore {
    config: StoreConfig,
    /// `None` until opened, and again after `close`
    db: RwLock<Option<Arc<Db>>>,
}

impl RocksBlockStore {
    /// Create an unopened store. Nothing touches the disk until the first
    /// operation or an explicit `initialize`.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            db: RwLock::new(None),
        }
    }

    /// Create and open the store in one step.
    pub async fn open(config: StoreConfig) -> Result<Self, StoreError> {
        let store = Self::new(config);
        store.initialize().await?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub async fn is_open(&self) -> bool {
        self.db.read().await.is_some()
    }

    /// Shared handle to the open database, opening it if needed.
    async fn handle(&self) -> Result<Arc<Db>, StoreError> {
        if let Some(db) = self.db.read().await.as_ref() {
            return Ok(Arc::clone(db));
        }

        let mut slot = self.db.write().await;
        // Another caller may have opened it while we waited for the lock
        if let Some(db) = slot.as_ref() {
            return Ok(Arc::clone(db));
        }

        let config = self.config.clone();
        let db = blocking(move || Self::open_db(&config), StoreError::unavailable).await?;
        log::info!("Opened block store at {}", self.config.path.display());

        let db = Arc::new(db);
        *slot = Some(Arc::clone(&db));
        Ok(db)
    }

    fn open_db(config: &StoreConfig) -> Result<Db, StoreError> {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);
        db_opts.set_max_open_files(config.max_open_files);
        db_opts.set_keep_log_file_num(5);

        let cf = ColumnFamilyDescriptor::new(CF_BLOCKS, Self::cf_options(config));
        Db::open_cf_descriptors(&db_opts, &config.path, vec![cf]).map_err(StoreError::unavailable)
    }

    /// Options for the blocks column family.
    fn cf_options(config: &StoreConfig) -> Options {
        let mut opts = Options::default();

        let mut block_opts = BlockBasedOptions::default();
        let cache = Cache::new_lru_cache(config.block_cache_size);
        block_opts.set_block_cache(&cache);
        block_opts.set_bloom_filter(config.bloom_filter_bits as f64, false);
        opts.set_block_based_table_factory(&block_opts);

        opts.set_compression_type(DBCompressionType::Lz4);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_max_write_buffer_number(2);
        opts
    }

    fn write_options(&self) -> WriteOptions {
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        write_opts
    }
}

#[async_trait]
impl BlockStore for RocksBlockStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        self.handle().await.map(|_| ())
    }

    async fn get_all(&self) -> Result<Vec<Block>, StoreError> {
        let db = self.handle().await?;

        blocking(
            move || {
                let cf = blocks_cf(&db)?;
                let records = scan(&db, cf, StoreError::read)?;
                Ok(record::into_document_order(records))
            },
            StoreError::read,
        )
        .await
    }

    async fn replace_all(&self, blocks: &[Block]) -> Result<(), StoreError> {
        let entries = blocks
            .iter()
            .enumerate()
            .map(|(position, block)| {
                Ok((record::key(block.id()), record::encode(block, position as u64)?))
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        let db = self.handle().await?;
        let write_opts = self.write_options();
        let count = entries.len();

        blocking(
            move || {
                let cf = blocks_cf(&db)?;

                // Clear + insert as one atomic batch
                let mut batch = WriteBatch::default();
                for item in db.iterator_cf(cf, IteratorMode::Start) {
                    let (key, _) = item.map_err(StoreError::write)?;
                    batch.delete_cf(cf, &key);
                }
                for (key, value) in &entries {
                    batch.put_cf(cf, key.as_bytes(), value);
                }

                db.write_opt(batch, &write_opts).map_err(StoreError::write)
            },
            StoreError::write,
        )
        .await?;

        log::debug!("Replaced block collection with {count} blocks");
        Ok(())
    }

    async fn upsert(&self, block: &Block) -> Result<(), StoreError> {
        let key = record::key(block.id());
        let block = block.clone();
        let db = self.handle().await?;
        let write_opts = self.write_options();

        blocking(
            move || {
                let cf = blocks_cf(&db)?;

                // Keep an existing record's position; new ids go to the end
                let existing = match db.get_cf(cf, key.as_bytes()).map_err(StoreError::write)? {
                    Some(bytes) => match record::decode(key.as_bytes(), &bytes) {
                        Ok(stored) => Some(stored.position),
                        Err(e) => {
                            log::warn!("Overwriting unreadable record, appending at the end: {e}");
                            None
                        }
                    },
                    None => None,
                };
                let position = match existing {
                    Some(position) => position,
                    None => {
                        let records = scan(&db, cf, StoreError::write)?;
                        record::next_position(records.iter().map(|r| &r.position))
                    }
                };

                let value = record::encode(&block, position)?;
                db.put_cf_opt(cf, key.as_bytes(), value, &write_opts)
                    .map_err(StoreError::write)
            },
            StoreError::write,
        )
        .await
    }

    async fn delete(&self, id: BlockId) -> Result<(), StoreError> {
        let key = record::key(id);
        let db = self.handle().await?;
        let write_opts = self.write_options();

        blocking(
            move || {
                let cf = blocks_cf(&db)?;
                db.delete_cf_opt(cf, key.as_bytes(), &write_opts)
                    .map_err(StoreError::write)
            },
            StoreError::write,
        )
        .await
    }

    async fn close(&self) -> Result<(), StoreError> {
        let db = match self.db.write().await.take() {
            Some(db) => db,
            None => return Ok(()),
        };

        blocking(
            move || {
                let cf = blocks_cf(&db)?;
                db.flush_cf(cf).map_err(StoreError::write)
            },
            StoreError::write,
        )
        .await?;

        log::info!("Closed block store at {}", self.config.path.display());
        Ok(())
    }
}

// ─── Helpers ──────────────────────────────────────────────────────────

/// Get the blocks column family handle.
fn blocks_cf(db: &Db) -> Result<&ColumnFamily, StoreError> {
    db.cf_handle(CF_BLOCKS)
        .ok_or_else(|| StoreError::Unavailable(format!("Column family '{CF_BLOCKS}' not found")))
}

/// Decode every record in the column family.
///
/// Undecodable records are logged and skipped so one bad value cannot hide
/// the rest of the document. They stay on disk until overwritten or cleared
/// by `replace_all`.
fn scan(
    db: &Db,
    cf: &ColumnFamily,
    on_error: fn(rocksdb::Error) -> StoreError,
) -> Result<Vec<StoredBlock>, StoreError> {
    let mut records = Vec::new();
    for item in db.iterator_cf(cf, IteratorMode::Start) {
        let (key, value) = item.map_err(on_error)?;
        match record::decode(&key, &value) {
            Ok(stored) => records.push(stored),
            Err(e) => log::warn!("Skipping unreadable record: {e}"),
        }
    }
    Ok(records)
}

/// Run a blocking RocksDB call off the async executor.
async fn blocking<T, F>(f: F, on_join: fn(tokio::task::JoinError) -> StoreError) -> Result<T, StoreError>
where
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(on_join)?
}
