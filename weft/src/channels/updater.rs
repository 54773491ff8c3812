//! State updater for custom state merge semantics.
//!
//! By default, state is fully replaced by the node's return value. A reducer such as
//! "append new messages" is expressed as a `StateUpdater` implementation, so nodes can
//! return only the part of the state they produced.
//!
//! # Example
//!
//! ```rust,ignore
//! use weft::channels::StateUpdater;
//!
//! #[derive(Clone, Debug)]
//! struct Transcript {
//!     lines: Vec<String>,
//! }
//!
//! #[derive(Debug)]
//! struct AppendLines;
//!
//! impl StateUpdater<Transcript> for AppendLines {
//!     fn apply_update(&self, current: &mut Transcript, update: &Transcript) {
//!         current.lines.extend(update.lines.iter().cloned());
//!     }
//! }
//! ```

use std::fmt::Debug;
use std::sync::Arc;

/// Merges a node's output into the current state.
pub trait StateUpdater<S>: Send + Sync + Debug
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Apply `update` (the node output, or the invoke input when resuming a thread)
    /// to `current`.
    fn apply_update(&self, current: &mut S, update: &S);
}

/// Default state updater: the node's return value replaces the previous state.
#[derive(Debug, Clone, Default)]
pub struct ReplaceUpdater;

impl<S> StateUpdater<S> for ReplaceUpdater
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn apply_update(&self, current: &mut S, update: &S) {
        *current = update.clone();
    }
}

/// Shared, type-erased state updater as stored by `StateGraph`.
pub type BoxedStateUpdater<S> = Arc<dyn StateUpdater<S>>;
