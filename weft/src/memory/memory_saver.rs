//! In-memory checkpointer (MemorySaver). Not persistent; for dev and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::memory::checkpoint::{Checkpoint, CheckpointListItem, CheckpointMetadata};
use crate::memory::checkpointer::{window_list, CheckpointError, Checkpointer};
use crate::memory::config::RunnableConfig;

/// In-memory checkpointer. Key: `thread_id:checkpoint_ns`; each key holds its checkpoints
/// newest last.
pub struct MemorySaver<S> {
    by_thread: Arc<RwLock<HashMap<String, Vec<Checkpoint<S>>>>>,
}

impl<S> MemorySaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            by_thread: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn thread_key(config: &RunnableConfig) -> Result<String, CheckpointError> {
        let thread_id = config
            .thread_id
            .as_deref()
            .ok_or(CheckpointError::ThreadIdRequired)?;
        Ok(format!("{}:{}", thread_id, config.checkpoint_ns))
    }
}

impl<S> Default for MemorySaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S> Checkpointer<S> for MemorySaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<String, CheckpointError> {
        let key = Self::thread_key(config)?;
        let mut guard = self.by_thread.write().await;
        guard.entry(key).or_default().push(checkpoint.clone());
        Ok(checkpoint.id.clone())
    }

    async fn get_tuple(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<(Checkpoint<S>, CheckpointMetadata)>, CheckpointError> {
        let key = Self::thread_key(config)?;
        let guard = self.by_thread.read().await;
        let Some(list) = guard.get(&key) else {
            return Ok(None);
        };
        let found = match &config.checkpoint_id {
            Some(cid) => list.iter().find(|cp| &cp.id == cid),
            None => list.last(),
        };
        Ok(found.map(|cp| (cp.clone(), cp.metadata.clone())))
    }

    async fn list(
        &self,
        config: &RunnableConfig,
        limit: Option<usize>,
        before: Option<&str>,
        after: Option<&str>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError> {
        let key = Self::thread_key(config)?;
        let guard = self.by_thread.read().await;
        let items = guard
            .get(&key)
            .map(|list| {
                list.iter()
                    .map(|cp| CheckpointListItem {
                        checkpoint_id: cp.id.clone(),
                        metadata: cp.metadata.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(window_list(items, limit, before, after))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::CheckpointSource;

    /// **Scenario**: put without thread_id fails with ThreadIdRequired.
    #[tokio::test]
    async fn put_requires_thread_id() {
        let saver = MemorySaver::<i32>::new();
        let cp = Checkpoint::from_state(1, CheckpointSource::Input, -1);
        let err = saver.put(&RunnableConfig::default(), &cp).await.unwrap_err();
        assert!(matches!(err, CheckpointError::ThreadIdRequired));
    }

    /// **Scenario**: get_tuple returns the newest checkpoint, or the one named by checkpoint_id.
    #[tokio::test]
    async fn get_tuple_latest_and_by_id() {
        let saver = MemorySaver::<i32>::new();
        let config = RunnableConfig::for_thread("t");
        let first = Checkpoint::from_state(1, CheckpointSource::Input, -1);
        let second = Checkpoint::from_state(2, CheckpointSource::Loop, 1);
        saver.put(&config, &first).await.unwrap();
        saver.put(&config, &second).await.unwrap();

        let (latest, meta) = saver.get_tuple(&config).await.unwrap().unwrap();
        assert_eq!(latest.channel_values, 2);
        assert_eq!(meta.step, 1);

        let by_id = RunnableConfig {
            checkpoint_id: Some(first.id.clone()),
            ..config.clone()
        };
        let (old, _) = saver.get_tuple(&by_id).await.unwrap().unwrap();
        assert_eq!(old.channel_values, 1);

        let items = saver.list(&config, None, None, None).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].checkpoint_id, first.id);
    }

    /// **Scenario**: threads and namespaces are isolated.
    #[tokio::test]
    async fn threads_are_isolated() {
        let saver = MemorySaver::<i32>::new();
        saver
            .put(
                &RunnableConfig::for_thread("a"),
                &Checkpoint::from_state(1, CheckpointSource::Loop, 1),
            )
            .await
            .unwrap();
        assert!(saver
            .get_tuple(&RunnableConfig::for_thread("b"))
            .await
            .unwrap()
            .is_none());
        let other_ns = RunnableConfig {
            checkpoint_ns: "sub".into(),
            ..RunnableConfig::for_thread("a")
        };
        assert!(saver.get_tuple(&other_ns).await.unwrap().is_none());
    }
}
