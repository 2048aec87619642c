//! In-memory metadata store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::debug;

use crate::backend::{BackendResult, MetadataStore, Watch, WatchEvent};

/// Ordered map with per-key watchers.
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    entries: RwLock<BTreeMap<String, String>>,
    watchers: DashMap<String, Vec<mpsc::UnboundedSender<WatchEvent>>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn notify(&self, key: &str, event: WatchEvent) {
        if let Some(mut senders) = self.watchers.get_mut(key) {
            senders.retain(|tx| tx.send(event.clone()).is_ok());
        }
        self.watchers.remove_if(key, |_, senders| senders.is_empty());
    }

    /// Drop senders whose receiver is gone, and keys left with none.
    fn prune_watchers(&self) {
        self.watchers.retain(|_, senders| {
            senders.retain(|tx| !tx.is_closed());
            !senders.is_empty()
        });
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn put(&self, key: &str, value: String) -> BackendResult<()> {
        self.entries.write().insert(key.to_owned(), value.clone());
        debug!(key, "metadata put");
        self.notify(
            key,
            WatchEvent::Put {
                key: key.to_owned(),
                value,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> BackendResult<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> BackendResult<()> {
        let removed = self.entries.write().remove(key).is_some();
        if removed {
            debug!(key, "metadata delete");
            self.notify(key, WatchEvent::Delete { key: key.to_owned() });
        }
        Ok(())
    }

    async fn get_prefix(&self, prefix: &str) -> BackendResult<BTreeMap<String, String>> {
        let entries = self.entries.read();
        Ok(entries
            .range(prefix.to_owned()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    async fn watch(&self, key: &str) -> BackendResult<Watch> {
        self.prune_watchers();
        let (tx, rx) = mpsc::unbounded_channel();
        self.watchers.entry(key.to_owned()).or_default().push(tx);
        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryMetadataStore::new();
        store.put("/segments/a", "{}".into()).await.unwrap();
        assert_eq!(store.get("/segments/a").await.unwrap().as_deref(), Some("{}"));

        store.delete("/segments/a").await.unwrap();
        assert_eq!(store.get("/segments/a").await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_prefix_scan_is_bounded() {
        let store = MemoryMetadataStore::new();
        store.put("/storage/nodes/a", "1".into()).await.unwrap();
        store.put("/storage/nodes/b", "2".into()).await.unwrap();
        store.put("/storage/nodesx", "3".into()).await.unwrap();
        store.put("/segments/a", "4".into()).await.unwrap();

        let nodes = store.get_prefix("/storage/nodes/").await.unwrap();
        assert_eq!(
            nodes.keys().collect::<Vec<_>>(),
            vec!["/storage/nodes/a", "/storage/nodes/b"]
        );
    }

    #[tokio::test]
    async fn test_watch_sees_put_and_delete() {
        let store = MemoryMetadataStore::new();
        let mut watch = store.watch("/segments/a").await.unwrap();

        store.put("/segments/other", "x".into()).await.unwrap();
        store.put("/segments/a", "v1".into()).await.unwrap();
        store.delete("/segments/a").await.unwrap();

        assert_eq!(
            watch.recv().await,
            Some(WatchEvent::Put {
                key: "/segments/a".into(),
                value: "v1".into()
            })
        );
        assert_eq!(
            watch.recv().await,
            Some(WatchEvent::Delete {
                key: "/segments/a".into()
            })
        );
    }

    #[tokio::test]
    async fn test_dropped_watch_is_pruned_on_event() {
        let store = MemoryMetadataStore::new();
        drop(store.watch("k").await.unwrap());
        store.put("k", "v".into()).await.unwrap();
        assert!(!store.watchers.contains_key("k"));
    }

    #[tokio::test]
    async fn test_dropped_watch_is_pruned_without_events() {
        let store = MemoryMetadataStore::new();
        drop(store.watch("quiet").await.unwrap());
        let mut live = store.watch("busy").await.unwrap();

        assert!(!store.watchers.contains_key("quiet"));
        assert_eq!(store.watchers.len(), 1);

        store.delete("missing").await.unwrap();
        store.put("busy", "v".into()).await.unwrap();
        assert!(live.recv().await.is_some());
        assert!(store.watchers.contains_key("busy"));
    }
}
