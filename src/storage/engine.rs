//! Thread-Safe Clipboard Store with Sliding Expiration
//!
//! This module implements the core store for clipvault.
//! It provides a thread-safe, concurrent map from generated ids to
//! compressed payloads, where every entry carries an inactivity deadline
//! that is rearmed on each successful read.
//!
//! ## Design Decisions
//!
//! 1. **Sharded Locks**: Instead of one big lock, we use multiple shards to reduce contention.
//! 2. **Single Entry per Id**: Payload and deadline live in one entry under one lock,
//!    so the two can never disagree.
//! 3. **Lazy + Active Eviction**: Lapsed entries are removed on access (lazy) plus
//!    by a background sweeper (active).
//! 4. **Immutable Payloads**: A payload is never updated in place. New content means
//!    a new `put` and a new id.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     ClipboardStore                          │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐           │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │ Shard N │           │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │ │ RwLock  │           │
//! │  │ HashMap │ │ HashMap │ │ HashMap │ │ HashMap │           │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ids are distributed across shards using a hash function, so operations
//! on unrelated ids proceed fully concurrently. A `get` racing eviction on
//! the same id resolves under the shard lock: either the read rearms the
//! deadline first and the entry survives, or eviction won and the read
//! observes absence.

use crate::storage::id;
use bytes::Bytes;
use std::collections::hash_map::Entry as MapEntry;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Number of shards for the store.
/// More shards = less lock contention, but more memory overhead.
/// 16 is plenty for a clipboard-sized workload.
const NUM_SHARDS: usize = 16;

/// Default inactivity window: a clip not read for this long is evicted.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// One stored clip: a compressed payload plus its inactivity deadline.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    /// The compressed payload, immutable once written
    pub payload: Bytes,
    /// When this entry lapses unless it is read again
    pub expires_at: Instant,
    /// When this entry was created
    pub created_at: Instant,
}

impl StoredEntry {
    /// Creates a new entry whose deadline is a full window from now.
    pub fn new(payload: Bytes, window: Duration) -> Self {
        let now = Instant::now();
        Self {
            payload,
            expires_at: now + window,
            created_at: now,
        }
    }

    /// Checks if this entry's inactivity window has lapsed.
    #[inline]
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Rearms the deadline to a full window from now.
    ///
    /// Sliding expiration: the countdown resets, it is not extended additively.
    #[inline]
    pub fn touch(&mut self, window: Duration) {
        self.expires_at = Instant::now() + window;
    }
}

/// A single shard containing a portion of the stored clips.
#[derive(Debug)]
struct Shard {
    entries: RwLock<HashMap<String, StoredEntry>>,
}

impl Shard {
    fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

/// Counters describing store activity since startup.
#[derive(Debug, Clone, Copy)]
pub struct StoreStats {
    /// Currently live entries (approximate)
    pub entries: u64,
    /// Total put operations
    pub put_ops: u64,
    /// Total get operations
    pub get_ops: u64,
    /// Total delete operations
    pub del_ops: u64,
    /// Entries removed because their window lapsed
    pub evicted: u64,
}

/// The ephemeral clipboard store.
///
/// Maps generated ids to compressed payloads. Every successful read rearms
/// the entry's inactivity deadline to a full window; entries whose window
/// lapses with no intervening read are evicted.
///
/// # Thread Safety
///
/// This struct is designed to be wrapped in an `Arc` and shared across
/// all request handler tasks plus the background sweeper. All operations
/// are thread-safe.
///
/// # Example
///
/// ```
/// use clipvault::storage::ClipboardStore;
/// use bytes::Bytes;
///
/// let store = ClipboardStore::new();
///
/// let id = store.put(Bytes::from("compressed bytes"));
/// assert_eq!(store.get(&id), Some(Bytes::from("compressed bytes")));
///
/// assert!(store.delete(&id));
/// assert_eq!(store.get(&id), None);
/// ```
pub struct ClipboardStore {
    /// Sharded storage for reduced lock contention
    shards: Vec<Shard>,

    /// Inactivity window applied to every entry in this store
    window: Duration,

    /// Statistics: currently live entries (approximate)
    entry_count: AtomicU64,

    /// Statistics: total put operations
    put_count: AtomicU64,

    /// Statistics: total get operations
    get_count: AtomicU64,

    /// Statistics: total delete operations
    del_count: AtomicU64,

    /// Statistics: entries evicted after their window lapsed
    evicted_count: AtomicU64,
}

impl std::fmt::Debug for ClipboardStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipboardStore")
            .field("shards", &self.shards.len())
            .field("window", &self.window)
            .field("entries", &self.entry_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for ClipboardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardStore {
    /// Creates a new store with the default 15-minute inactivity window.
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW)
    }

    /// Creates a new store with a custom inactivity window.
    ///
    /// The window applies to every entry in this store instance; it is not
    /// configurable per request.
    pub fn with_window(window: Duration) -> Self {
        let shards = (0..NUM_SHARDS).map(|_| Shard::new()).collect();

        Self {
            shards,
            window,
            entry_count: AtomicU64::new(0),
            put_count: AtomicU64::new(0),
            get_count: AtomicU64::new(0),
            del_count: AtomicU64::new(0),
            evicted_count: AtomicU64::new(0),
        }
    }

    /// Returns the inactivity window applied to entries in this store.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Determines which shard an id belongs to.
    #[inline]
    fn shard_index(&self, id: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        (hasher.finish() as usize) % NUM_SHARDS
    }

    /// Gets the shard for a given id.
    #[inline]
    fn get_shard(&self, id: &str) -> &Shard {
        &self.shards[self.shard_index(id)]
    }

    /// Stores a payload under a freshly generated id and arms its window.
    ///
    /// If the generated id collides with a currently live one, a new id is
    /// drawn; the returned id is therefore unique among live entries even
    /// under concurrent puts. An id freed by eviction or delete may be
    /// handed out again later; that starts a fresh lifecycle.
    ///
    /// # Returns
    ///
    /// The id under which the payload can be read back.
    pub fn put(&self, payload: Bytes) -> String {
        self.put_count.fetch_add(1, Ordering::Relaxed);

        loop {
            let candidate = id::generate();
            let shard = self.get_shard(&candidate);
            let mut entries = shard.entries.write().unwrap();

            match entries.entry(candidate.clone()) {
                MapEntry::Occupied(_) => continue,
                MapEntry::Vacant(slot) => {
                    slot.insert(StoredEntry::new(payload.clone(), self.window));
                    self.entry_count.fetch_add(1, Ordering::Relaxed);
                    return candidate;
                }
            }
        }
    }

    /// Reads the payload stored under an id.
    ///
    /// A hit rearms the entry's deadline to a full window before the payload
    /// is returned, all under the shard lock. A lapsed entry found here is
    /// removed on the spot ("lazy eviction").
    ///
    /// # Returns
    ///
    /// The stored payload, or `None` if the id is absent or has lapsed.
    pub fn get(&self, id: &str) -> Option<Bytes> {
        self.get_count.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(id);
        let mut entries = shard.entries.write().unwrap();

        match entries.get_mut(id) {
            Some(entry) if !entry.is_expired() => {
                entry.touch(self.window);
                Some(entry.payload.clone())
            }
            Some(_) => {
                entries.remove(id);
                self.entry_count.fetch_sub(1, Ordering::Relaxed);
                self.evicted_count.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => None,
        }
    }

    /// Removes an entry and disarms its window.
    ///
    /// # Returns
    ///
    /// Returns `true` if a live entry was removed, `false` if the id was
    /// absent (never existed, already deleted, or already evicted).
    pub fn delete(&self, id: &str) -> bool {
        self.del_count.fetch_add(1, Ordering::Relaxed);

        let shard = self.get_shard(id);
        let mut entries = shard.entries.write().unwrap();

        match entries.remove(id) {
            Some(entry) if !entry.is_expired() => {
                self.entry_count.fetch_sub(1, Ordering::Relaxed);
                true
            }
            Some(_) => {
                // Lapsed before the delete arrived: counts as an eviction,
                // and the caller is told the id was already gone.
                self.entry_count.fetch_sub(1, Ordering::Relaxed);
                self.evicted_count.fetch_add(1, Ordering::Relaxed);
                false
            }
            None => false,
        }
    }

    /// Checks if an id is live (present and not lapsed).
    ///
    /// Does not rearm the window.
    pub fn exists(&self, id: &str) -> bool {
        let shard = self.get_shard(id);
        let entries = shard.entries.read().unwrap();

        entries.get(id).map(|e| !e.is_expired()).unwrap_or(false)
    }

    /// Returns the approximate number of live entries.
    ///
    /// This is an approximation because it uses relaxed atomic ordering and
    /// includes lapsed entries the sweeper has not visited yet.
    pub fn len(&self) -> u64 {
        self.entry_count.load(Ordering::Relaxed)
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns store statistics.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            entries: self.entry_count.load(Ordering::Relaxed),
            put_ops: self.put_count.load(Ordering::Relaxed),
            get_ops: self.get_count.load(Ordering::Relaxed),
            del_ops: self.del_count.load(Ordering::Relaxed),
            evicted: self.evicted_count.load(Ordering::Relaxed),
        }
    }

    /// Removes every entry whose inactivity window has lapsed.
    ///
    /// This is called by the background expiry sweeper. Each shard is swept
    /// under its own lock, so operations on other shards are never blocked.
    ///
    /// # Returns
    ///
    /// Returns the number of entries that were evicted.
    pub fn cleanup_expired(&self) -> u64 {
        let mut evicted = 0u64;

        for shard in &self.shards {
            let mut entries = shard.entries.write().unwrap();
            let before = entries.len();

            entries.retain(|_, entry| !entry.is_expired());

            evicted += (before - entries.len()) as u64;
        }

        if evicted > 0 {
            self.entry_count.fetch_sub(evicted, Ordering::Relaxed);
            self.evicted_count.fetch_add(evicted, Ordering::Relaxed);
        }

        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_put_get_roundtrip() {
        let store = ClipboardStore::new();

        let id = store.put(Bytes::from("hello"));
        assert_eq!(store.get(&id), Some(Bytes::from("hello")));

        // Reads do not consume the entry
        assert_eq!(store.get(&id), Some(Bytes::from("hello")));
    }

    #[test]
    fn test_empty_payload_roundtrip() {
        let store = ClipboardStore::new();

        let id = store.put(Bytes::new());
        assert_eq!(store.get(&id), Some(Bytes::new()));
    }

    #[test]
    fn test_get_unknown_id() {
        let store = ClipboardStore::new();
        assert_eq!(store.get("nope"), None);
    }

    #[test]
    fn test_delete_terminality() {
        let store = ClipboardStore::new();

        let id = store.put(Bytes::from("gone soon"));
        assert!(store.delete(&id));

        // Both get and delete report absence from here on
        assert_eq!(store.get(&id), None);
        assert!(!store.delete(&id));
    }

    #[test]
    fn test_delete_unknown_id() {
        let store = ClipboardStore::new();
        assert!(!store.delete("never-existed"));
    }

    #[test]
    fn test_every_put_gets_a_fresh_id() {
        let store = ClipboardStore::new();

        let a = store.put(Bytes::from("same"));
        let b = store.put(Bytes::from("same"));
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_window_lapse_evicts() {
        let store = ClipboardStore::with_window(Duration::from_millis(40));

        let id = store.put(Bytes::from("abc"));
        assert_eq!(store.get(&id), Some(Bytes::from("abc")));

        thread::sleep(Duration::from_millis(60));
        assert_eq!(store.get(&id), None);

        // Lazy eviction removed the entry entirely
        assert!(!store.exists(&id));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_sliding_window_rearms_on_read() {
        let store = ClipboardStore::with_window(Duration::from_millis(100));

        let id = store.put(Bytes::from("keep me"));

        // Keep reading before the window lapses; each read restarts the
        // countdown, so the entry outlives several whole windows.
        for _ in 0..4 {
            thread::sleep(Duration::from_millis(60));
            assert_eq!(store.get(&id), Some(Bytes::from("keep me")));
        }

        // Now go quiet past the window: the entry must be gone.
        thread::sleep(Duration::from_millis(150));
        assert_eq!(store.get(&id), None);
    }

    #[test]
    fn test_delete_after_lapse_reports_absent() {
        let store = ClipboardStore::with_window(Duration::from_millis(30));

        let id = store.put(Bytes::from("x"));
        thread::sleep(Duration::from_millis(50));

        assert!(!store.delete(&id));
    }

    #[test]
    fn test_cleanup_expired() {
        let store = ClipboardStore::with_window(Duration::from_millis(30));

        let mut ids = Vec::new();
        for i in 0..10 {
            ids.push(store.put(Bytes::from(format!("clip {}", i))));
        }
        assert_eq!(store.len(), 10);

        thread::sleep(Duration::from_millis(50));
        assert_eq!(store.cleanup_expired(), 10);
        assert_eq!(store.len(), 0);

        for id in &ids {
            assert_eq!(store.get(id), None);
        }
    }

    #[test]
    fn test_cleanup_spares_live_entries() {
        let store = ClipboardStore::with_window(Duration::from_millis(80));

        let stale = store.put(Bytes::from("stale"));
        thread::sleep(Duration::from_millis(50));
        let fresh = store.put(Bytes::from("fresh"));
        thread::sleep(Duration::from_millis(40));

        // `stale` has been idle for ~90ms, `fresh` only ~40ms
        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.get(&stale), None);
        assert_eq!(store.get(&fresh), Some(Bytes::from("fresh")));
    }

    #[test]
    fn test_stats() {
        let store = ClipboardStore::new();

        let id = store.put(Bytes::from("a"));
        store.get(&id);
        store.get("missing");
        store.delete(&id);

        let stats = store.stats();
        assert_eq!(stats.put_ops, 1);
        assert_eq!(stats.get_ops, 2);
        assert_eq!(stats.del_ops, 1);
        assert_eq!(stats.entries, 0);
    }

    #[test]
    fn test_concurrent_puts_yield_distinct_ids() {
        let store = Arc::new(ClipboardStore::new());
        let mut handles = vec![];

        for t in 0..8 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                let mut ids = Vec::with_capacity(100);
                for i in 0..100 {
                    ids.push(store.put(Bytes::from(format!("clip {}-{}", t, i))));
                }
                ids
            }));
        }

        let mut all: Vec<String> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let total = all.len();
        all.sort();
        all.dedup();

        assert_eq!(all.len(), total);
        assert_eq!(store.len(), total as u64);
    }

    #[test]
    fn test_concurrent_readers_and_sweeper() {
        let store = Arc::new(ClipboardStore::with_window(Duration::from_millis(25)));

        let mut ids = Vec::new();
        for i in 0..200 {
            ids.push(store.put(Bytes::from(format!("clip {}", i))));
        }

        let sweeper_store = Arc::clone(&store);
        let sweeper = thread::spawn(move || {
            for _ in 0..20 {
                sweeper_store.cleanup_expired();
                thread::sleep(Duration::from_millis(5));
            }
        });

        // Readers race the sweeper; every read must be all-or-nothing.
        let reader_store = Arc::clone(&store);
        let reader_ids = ids.clone();
        let reader = thread::spawn(move || {
            for _ in 0..10 {
                for id in &reader_ids {
                    if let Some(payload) = reader_store.get(id) {
                        assert!(payload.starts_with(b"clip "));
                    }
                }
                thread::sleep(Duration::from_millis(5));
            }
        });

        sweeper.join().unwrap();
        reader.join().unwrap();
    }
}
