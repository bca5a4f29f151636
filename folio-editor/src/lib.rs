//! # folio-editor — Document controller
//!
//! Owns the in-memory block sequence of one editing session and routes
//! every mutation through an injected [`BlockStore`](folio_store::BlockStore).
//! Outcomes are reported to an injected [`Notifier`]; storage failures never
//! reach the rendering layer as errors.
//!
//! ```text
//!  renderer ──add/update/move/delete──▸ DocumentController ──▸ BlockStore
//!     ▲                                        │
//!     └──────── blocks() / is_loading() ───────┤
//!                                              ▼
//!                                          Notifier (toasts)
//! ```
//!
//! ## Modules
//!
//! - [`controller`] — session state machine, mutations, commit policy
//! - [`notify`] — notification values and sinks
//! - [`error`] — contract-violation errors

pub mod controller;
pub mod error;
pub mod notify;

pub use controller::{CommitPolicy, DocumentController, EditorConfig, MoveDirection, Outcome, SessionState};
pub use error::EditorError;
pub use notify::{ChannelNotifier, LogNotifier, Notification, Notifier, Severity};
