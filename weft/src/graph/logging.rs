//! Structured logging for graph execution events.

use std::fmt::Debug;

use crate::error::AgentError;
use crate::graph::Next;

pub(super) fn log_graph_start(thread_id: Option<&str>, first_node: &str) {
    tracing::info!(thread_id = thread_id.unwrap_or("-"), first_node, "Starting graph execution");
}

pub(super) fn log_graph_complete(thread_id: Option<&str>, steps: usize) {
    tracing::info!(thread_id = thread_id.unwrap_or("-"), steps, "Graph execution complete");
}

pub(super) fn log_graph_error(error: &AgentError) {
    tracing::error!(%error, "Graph execution error");
}

pub(super) fn log_node_start<S: Debug>(node_id: &str, step: usize, state: &S) {
    tracing::debug!(node_id, step, state = ?state, "Starting node execution");
}

pub(super) fn log_node_complete(node_id: &str, next: &Next) {
    tracing::debug!(node_id, ?next, "Node execution complete");
}

pub(super) fn log_routing(from: &str, to: &str) {
    tracing::debug!(from, to, "conditional routing");
}

pub(super) fn log_resume(thread_id: &str, checkpoint_id: &str, step: i64) {
    tracing::debug!(thread_id, checkpoint_id, step, "Resuming thread from checkpoint");
}
