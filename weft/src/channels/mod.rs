//! State merge strategies for graph execution.
//!
//! After each node runs, the compiled graph merges the node output into the current
//! state through a [`StateUpdater`]. [`ReplaceUpdater`] is the default; conversation
//! graphs use `MessagesUpdater`, which appends.

mod updater;

pub use updater::{BoxedStateUpdater, ReplaceUpdater, StateUpdater};
