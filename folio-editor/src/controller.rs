//! Document controller — the single owner of a session's block sequence.
//!
//! ```text
//!  Uninitialized ──load()──▸ Loading ──▸ Ready
//! ```
//!
//! Every mutation follows one commit policy (see [`CommitPolicy`]) so that,
//! whichever it is, a failed persistence leaves memory as it was before the
//! mutation. Mutations are serialized by an internal lock; reads never wait
//! for a store call in flight.

use folio_core::{Block, BlockId, BlockKind};
use folio_store::{BlockStore, StoreError};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::notify::{Notification, Notifier};
use crate::EditorError;

/// Session lifecycle. `Ready` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Loading,
    Ready,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Loading => "loading",
            SessionState::Ready => "ready",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

impl MoveDirection {
    pub fn opposite(self) -> Self {
        match self {
            MoveDirection::Up => MoveDirection::Down,
            MoveDirection::Down => MoveDirection::Up,
        }
    }

    /// Index of the neighbour to swap with, or `None` at the edges.
    pub fn target(self, index: usize, len: usize) -> Option<usize> {
        if index >= len {
            return None;
        }
        match self {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => Some(index + 1).filter(|&i| i < len),
        }
    }
}

/// Order in which memory and store are updated by a mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommitPolicy {
    /// Persist, then commit to memory once the store accepts the change.
    #[default]
    PersistFirst,
    /// Commit to memory, persist, and restore the previous sequence if the
    /// store rejects the change.
    Optimistic,
}

#[derive(Debug, Clone)]
pub struct EditorConfig {
    pub commit_policy: CommitPolicy,
    /// Emit a notification for every successful save (default: true)
    pub notify_success: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            commit_policy: CommitPolicy::PersistFirst,
            notify_success: true,
        }
    }
}

/// Result of an operation that reached the store (or decided not to).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Persisted and visible in memory
    Committed,
    /// Nothing to do; neither memory nor store touched
    Unchanged,
    /// The store failed; memory holds the pre-mutation sequence
    Failed,
}

/// The store call a mutation needs.
enum Persist {
    ReplaceAll,
    Upsert(Block),
    Delete(BlockId),
}

pub struct DocumentController {
    store: Arc<dyn BlockStore>,
    notifier: Arc<dyn Notifier>,
    config: EditorConfig,
    state: RwLock<SessionState>,
    blocks: RwLock<Vec<Block>>,
    /// Held for the whole of a mutation, store call included
    mutation: Mutex<()>,
}

impl DocumentController {
    pub fn new(store: Arc<dyn BlockStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_config(store, notifier, EditorConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn BlockStore>,
        notifier: Arc<dyn Notifier>,
        config: EditorConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            config,
            state: RwLock::new(SessionState::Uninitialized),
            blocks: RwLock::new(Vec::new()),
            mutation: Mutex::new(()),
        }
    }

    // ---------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------

    pub async fn state(&self) -> SessionState {
        *self.state.read().await
    }

    pub async fn is_loading(&self) -> bool {
        self.state().await != SessionState::Ready
    }

    /// Snapshot of the document in order.
    pub async fn blocks(&self) -> Vec<Block> {
        self.blocks.read().await.clone()
    }

    pub async fn block(&self, id: BlockId) -> Option<Block> {
        self.blocks.read().await.iter().find(|b| b.id() == id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.blocks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blocks.read().await.is_empty()
    }

    /// Whether the reorder action at `index` is enabled.
    pub async fn can_move(&self, index: usize, direction: MoveDirection) -> bool {
        direction.target(index, self.len().await).is_some()
    }

    // ---------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------

    /// Read the whole document from the store.
    ///
    /// A store failure still ends in `Ready`, with an empty document and a
    /// load-error notification.
    pub async fn load(&self) -> Result<Outcome, EditorError> {
        let _guard = self.mutation.lock().await;
        {
            let mut state = self.state.write().await;
            if *state != SessionState::Uninitialized {
                return Err(EditorError::AlreadyLoaded);
            }
            *state = SessionState::Loading;
        }

        let outcome = match self.store.get_all().await {
            Ok(blocks) => {
                log::info!("Loaded document with {} blocks", blocks.len());
                *self.blocks.write().await = blocks;
                Outcome::Committed
            }
            Err(e) => {
                log::error!("Error loading blocks: {e}");
                self.blocks.write().await.clear();
                self.notifier.notify(Notification::load_failed());
                Outcome::Failed
            }
        };

        *self.state.write().await = SessionState::Ready;
        Ok(outcome)
    }

    /// Re-read the store and replace the in-memory document with it.
    ///
    /// On failure the current document is kept.
    pub async fn reload(&self) -> Result<Outcome, EditorError> {
        let _guard = self.mutation.lock().await;
        self.require_ready().await?;

        match self.store.get_all().await {
            Ok(blocks) => {
                log::info!("Reloaded document with {} blocks", blocks.len());
                *self.blocks.write().await = blocks;
                Ok(Outcome::Committed)
            }
            Err(e) => {
                log::error!("Error reloading blocks: {e}");
                self.notifier.notify(Notification::load_failed());
                Ok(Outcome::Failed)
            }
        }
    }

    // ---------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------

    /// Append a new block of `kind` and persist the whole sequence.
    ///
    /// Returns the new block's id once it is committed.
    pub async fn add_block(&self, kind: BlockKind) -> Result<Option<BlockId>, EditorError> {
        let _guard = self.mutation.lock().await;
        self.require_ready().await?;

        let block = Block::new(kind);
        let id = block.id();
        let mut next = self.blocks.read().await.clone();
        next.push(block);

        log::debug!("Adding {kind} block {id}");
        let outcome = self
            .apply(next, Persist::ReplaceAll, Notification::saved(), Notification::save_failed())
            .await;
        Ok((outcome == Outcome::Committed).then_some(id))
    }

    /// [`add_block`](Self::add_block) for a toolbar tag such as `"text"`.
    pub async fn add_block_of_type(&self, tag: &str) -> Result<Option<BlockId>, EditorError> {
        let kind: BlockKind = tag.parse()?;
        self.add_block(kind).await
    }

    /// Replace the block with `updated.id()` and upsert it.
    ///
    /// Unknown ids are no-ops. Identical content is still upserted, so a
    /// re-save pushes memory back into a diverged store. The variant of a
    /// block never changes; a mismatch is reported and returned as an error.
    pub async fn update_block(&self, updated: Block) -> Result<Outcome, EditorError> {
        let _guard = self.mutation.lock().await;
        self.require_ready().await?;

        let mut next = self.blocks.read().await.clone();
        let Some(slot) = next.iter_mut().find(|b| b.id() == updated.id()) else {
            log::warn!("Ignoring update for unknown block {}", updated.id());
            return Ok(Outcome::Unchanged);
        };
        if slot.kind() != updated.kind() {
            let err = EditorError::KindMismatch {
                id: updated.id(),
                existing: slot.kind(),
                requested: updated.kind(),
            };
            log::error!("Rejected block update: {err}");
            self.notifier.notify(Notification::save_failed());
            return Err(err);
        }
        *slot = updated.clone();

        Ok(self
            .apply(next, Persist::Upsert(updated), Notification::saved(), Notification::save_failed())
            .await)
    }

    /// Swap the block at `index` with its neighbour in `direction`.
    ///
    /// Moves past either end are no-ops and persist nothing.
    pub async fn move_block(&self, index: usize, direction: MoveDirection) -> Result<Outcome, EditorError> {
        let _guard = self.mutation.lock().await;
        self.require_ready().await?;

        let mut next = self.blocks.read().await.clone();
        let Some(target) = direction.target(index, next.len()) else {
            return Ok(Outcome::Unchanged);
        };
        next.swap(index, target);

        Ok(self
            .apply(next, Persist::ReplaceAll, Notification::saved(), Notification::save_failed())
            .await)
    }

    /// Remove the block at `index` and delete its record.
    pub async fn delete_block(&self, index: usize) -> Result<Outcome, EditorError> {
        let _guard = self.mutation.lock().await;
        self.require_ready().await?;

        let mut next = self.blocks.read().await.clone();
        if index >= next.len() {
            return Err(EditorError::IndexOutOfBounds {
                index,
                len: next.len(),
            });
        }
        let removed = next.remove(index);

        Ok(self
            .apply(
                next,
                Persist::Delete(removed.id()),
                Notification::deleted(),
                Notification::delete_failed(),
            )
            .await)
    }

    // ---------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------

    async fn require_ready(&self) -> Result<(), EditorError> {
        match self.state().await {
            SessionState::Ready => Ok(()),
            state => Err(EditorError::NotReady(state)),
        }
    }

    /// Make `next` the document according to the commit policy.
    async fn apply(
        &self,
        next: Vec<Block>,
        persist: Persist,
        success: Notification,
        failure: Notification,
    ) -> Outcome {
        let result = match self.config.commit_policy {
            CommitPolicy::PersistFirst => {
                let result = self.persist(&persist, &next).await;
                if result.is_ok() {
                    *self.blocks.write().await = next;
                }
                result
            }
            CommitPolicy::Optimistic => {
                let previous = std::mem::replace(&mut *self.blocks.write().await, next.clone());
                let result = self.persist(&persist, &next).await;
                if result.is_err() {
                    *self.blocks.write().await = previous;
                }
                result
            }
        };

        match result {
            Ok(()) => {
                if self.config.notify_success {
                    self.notifier.notify(success);
                }
                Outcome::Committed
            }
            Err(e) => {
                log::error!("Error persisting document change: {e}");
                self.notifier.notify(failure);
                Outcome::Failed
            }
        }
    }

    async fn persist(&self, persist: &Persist, next: &[Block]) -> Result<(), StoreError> {
        match persist {
            Persist::ReplaceAll => self.store.replace_all(next).await,
            Persist::Upsert(block) => self.store.upsert(block).await,
            Persist::Delete(id) => self.store.delete(*id).await,
        }
    }
}
