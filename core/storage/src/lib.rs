//! CareLedger storage contracts.
//!
//! This module defines the storage-facing side of the sync engine:
//! - The [`SynceableRepository`] contract bridging domain records and sync
//!   bookkeeping, with an in-memory reference implementation
//! - The [`PullTokenStore`] contract persisting per-entity pull cursors
//!
//! The real durable store is an external collaborator consumed through
//! these traits; nothing here assumes a particular database engine.

pub mod memory;
pub mod repository;
pub mod token;

pub use memory::MemoryRepository;
pub use repository::{SyncPayload, SyncableRecord, SynceableRepository};
pub use token::{FileTokenStore, MemoryTokenStore, PullTokenStore};
