//! Invoke config: thread_id, checkpoint_id, checkpoint_ns, user_id, recursion_limit.

/// Step budget used when `RunnableConfig::recursion_limit` is not set.
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

/// Config for a single invoke. Identifies the thread and optional checkpoint.
///
/// When the graph was compiled with a checkpointer, `thread_id` selects the conversation
/// to load and save.
#[derive(Debug, Clone, Default)]
pub struct RunnableConfig {
    /// Conversation id. Required by every `Checkpointer` call.
    pub thread_id: Option<String>,
    /// Load this checkpoint instead of the latest.
    pub checkpoint_id: Option<String>,
    /// Namespace for checkpoints. Empty by default.
    pub checkpoint_ns: String,
    pub user_id: Option<String>,
    /// Maximum number of node steps per invoke.
    pub recursion_limit: Option<usize>,
}

impl RunnableConfig {
    /// Config for `thread_id` with every other field defaulted.
    pub fn for_thread(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
            ..Default::default()
        }
    }

    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = Some(limit);
        self
    }

    pub fn effective_recursion_limit(&self) -> usize {
        self.recursion_limit.unwrap_or(DEFAULT_RECURSION_LIMIT)
    }
}
