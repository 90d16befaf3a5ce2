use crate::model::{Post, Snapshot, User};
use arc_swap::ArcSwap;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

/// Publish point for the scraped snapshot
///
/// Readers get an owned `Arc<Snapshot>`, so they keep a consistent view even if
/// a publish swaps in new data while they hold it. Only the orchestrator calls
/// [`SnapshotStore::publish`].
pub struct SnapshotStore {
    inner: ArcSwap<Snapshot>,
    generation_tx: watch::Sender<u64>,
}

impl SnapshotStore {
    /// Creates a store holding an empty, unpublished snapshot
    pub fn new() -> Self {
        let (generation_tx, _) = watch::channel(0);
        Self {
            inner: ArcSwap::new(Arc::new(Snapshot::default())),
            generation_tx,
        }
    }

    /// Returns the current snapshot
    pub fn load(&self) -> Arc<Snapshot> {
        self.inner.load_full()
    }

    /// Receives the generation number after every publish
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.generation_tx.subscribe()
    }

    /// Replaces the snapshot in one swap and notifies subscribers
    ///
    /// Returns the generation number of the new snapshot.
    pub fn publish(&self, posts: Vec<Post>, users: HashMap<String, User>) -> u64 {
        let generation = self.inner.load().generation + 1;
        let snapshot = Snapshot {
            posts,
            users,
            generation,
            published_at: Some(Utc::now()),
        };

        self.inner.store(Arc::new(snapshot));
        self.generation_tx.send_replace(generation);
        generation
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
