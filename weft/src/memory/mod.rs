//! Conversation persistence for compiled graphs.
//!
//! A [`Checkpointer`] stores [`Checkpoint`]s keyed by `(thread_id, checkpoint_ns, checkpoint_id)`.
//! [`MemorySaver`] keeps them in process; [`SqliteSaver`] writes them to a SQLite file
//! through a [`Serializer`] so a thread survives restarts.

mod checkpoint;
mod checkpointer;
mod config;
mod memory_saver;
mod serializer;
mod sqlite_saver;

pub use checkpoint::{
    Checkpoint, CheckpointListItem, CheckpointMetadata, CheckpointSource, CHECKPOINT_VERSION,
};
pub use checkpointer::{CheckpointError, Checkpointer};
pub use config::{RunnableConfig, DEFAULT_RECURSION_LIMIT};
pub use memory_saver::MemorySaver;
pub use serializer::{JsonSerializer, Serializer};
pub use sqlite_saver::SqliteSaver;
