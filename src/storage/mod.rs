//! Storage Module
//!
//! This module provides the core storage functionality for clipvault.
//! It includes a thread-safe, sharded id→payload store with sliding
//! expiration, a short id generator, and a background expiry sweeper.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     ClipboardStore                          │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐           │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │...16    │           │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │ │ shards  │           │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                            │
//!              ┌─────────────┴─────────────┐
//!              │     ExpirySweeper         │
//!              │  (Background Tokio Task)  │
//!              └───────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Sharded Storage**: 16 independent shards reduce lock contention
//! - **Sliding Expiration**: every successful read rearms a clip's
//!   inactivity window to its full length
//! - **Lazy Eviction**: lapsed clips are removed on access
//! - **Active Eviction**: the background sweeper removes lapsed clips
//!   that are never touched again
//!
//! ## Example
//!
//! ```
//! use clipvault::storage::ClipboardStore;
//! use bytes::Bytes;
//! use std::time::Duration;
//!
//! let store = ClipboardStore::with_window(Duration::from_secs(60));
//!
//! let id = store.put(Bytes::from("payload"));
//! assert_eq!(store.get(&id), Some(Bytes::from("payload")));
//! assert!(store.delete(&id));
//! ```

pub mod engine;
pub mod expiry;
pub mod id;

// Re-export commonly used types
pub use engine::{ClipboardStore, StoreStats, StoredEntry, DEFAULT_WINDOW};
pub use expiry::{start_expiry_sweeper, ExpirySweeper, SweeperConfig};
