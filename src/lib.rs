//! # clipvault - An Ephemeral Shared Clipboard over HTTP
//!
//! clipvault lets any client copy an opaque blob of bytes to a shared,
//! in-memory clipboard and hands back a short id; anyone holding the id can
//! paste (read) or delete the blob until it expires from inactivity.
//!
//! ## Features
//!
//! - **Three write shapes**: inline value, multipart text field, or a
//!   streamed multipart file - all normalized into one ingestion pipeline
//! - **Gzip at rest**: payloads are compressed at the maximum level before
//!   they ever touch the store
//! - **Sliding expiration**: every read rearms a clip's inactivity window
//!   (default 15 minutes); idle clips are evicted automatically
//! - **Async I/O**: built on Tokio and axum for concurrent request handling
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                            clipvault                                │
//! │                                                                     │
//! │  ┌────────────┐   ┌─────────────┐   ┌────────────┐                  │
//! │  │ HTTP layer │──>│  Ingestion  │──>│   Codec    │                  │
//! │  │  (axum)    │   │  Resolver   │   │  (gzip)    │                  │
//! │  └────────────┘   └─────────────┘   └─────┬──────┘                  │
//! │                                           │                         │
//! │                                           ▼                         │
//! │                   ┌──────────────────────────────────────────────┐  │
//! │                   │              ClipboardStore                  │  │
//! │                   │  ┌────────┐ ┌────────┐ ┌────────┐ ┌───────┐  │  │
//! │                   │  │Shard 0 │ │Shard 1 │ │Shard 2 │ │...16  │  │  │
//! │                   │  │RwLock  │ │RwLock  │ │RwLock  │ │shards │  │  │
//! │                   │  └────────┘ └────────┘ └────────┘ └───────┘  │  │
//! │                   └──────────────────────────────────────────────┘  │
//! │                                           ▲                         │
//! │                                           │                         │
//! │                   ┌───────────────────────┴─────────────────────┐   │
//! │                   │           ExpirySweeper                     │   │
//! │                   │      (Background Tokio Task)                │   │
//! │                   └─────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use clipvault::http::{build_router, AppState};
//! use clipvault::storage::{start_expiry_sweeper, ClipboardStore};
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(ClipboardStore::new());
//!     let _sweeper = start_expiry_sweeper(Arc::clone(&store));
//!
//!     let router = build_router(AppState { store });
//!     let listener = TcpListener::bind("127.0.0.1:5050").await.unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```
//!
//! ## HTTP Surface
//!
//! - `POST /copy` - body or query carries the payload; responds `{"id": "..."}`
//! - `GET /paste?id=...` - responds with the decompressed bytes, `404` on miss
//! - `POST /delete?id=...` - responds `200` on hit, `404` on miss
//!
//! ## Module Overview
//!
//! - [`storage`]: sharded id→payload store with sliding expiration and the
//!   background expiry sweeper
//! - [`codec`]: streaming gzip compression for stored payloads
//! - [`ingest`]: normalization of the three write-request shapes
//! - [`http`]: axum router, handlers, and middleware
//!
//! ## Design Highlights
//!
//! ### One Entry, One Lock
//!
//! A clip's payload and its inactivity deadline live in a single entry under
//! a single shard lock, so a read racing eviction always observes either the
//! live clip (and rearms it) or nothing at all - never a torn pair.
//!
//! ### Lazy + Active Eviction
//!
//! Idle clips are dropped in two ways:
//! 1. **Lazy**: an access that finds a lapsed entry removes it
//! 2. **Active**: a background task periodically sweeps all shards
//!
//! This reclaims memory even for clips that are never touched again.
//!
//! ### Everything In Memory
//!
//! There is no on-disk format and no cap on payload size or total memory;
//! a restart discards all clips. That is the service's contract, not an
//! accident.

pub mod codec;
pub mod http;
pub mod ingest;
pub mod storage;

// Re-export commonly used types for convenience
pub use codec::{compress, decompress, CodecError, Compressor, Decompressor};
pub use http::{build_router, AppState};
pub use ingest::{IngestError, ResolvedPayload};
pub use storage::{start_expiry_sweeper, ClipboardStore, ExpirySweeper, SweeperConfig};

/// The default port clipvault listens on
pub const DEFAULT_PORT: u16 = 5050;

/// The default host clipvault binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of clipvault
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
