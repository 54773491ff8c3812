//! Compiled state graph: immutable, supports `invoke`.
//!
//! With a checkpointer and `config.thread_id`, `invoke` resumes the thread from its latest
//! checkpoint (merging the input through the state updater), saves the merged input as an
//! `Input` checkpoint and saves a `Loop` checkpoint after every node step.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::channels::BoxedStateUpdater;
use crate::error::AgentError;
use crate::memory::{Checkpoint, CheckpointSource, Checkpointer, RunnableConfig};

use super::logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
    log_resume, log_routing,
};
use super::state_graph::END;
use super::{Next, NextEntry, Node};

/// Compiled graph, created by `StateGraph::compile()` or `compile_with_checkpointer()`.
#[derive(Clone)]
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    /// Target of the START edge.
    pub(super) first_node_id: String,
    /// Node id -> how to pick the next node.
    pub(super) next_map: HashMap<String, NextEntry<S>>,
    pub(super) checkpointer: Option<Arc<dyn Checkpointer<S>>>,
    pub(super) state_updater: BoxedStateUpdater<S>,
}

impl<S> CompiledStateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Runs the graph from the START target until a node routes to END.
    ///
    /// Fails with `AgentError::RecursionLimit` when more than
    /// `config.recursion_limit` (default 25) node steps would run.
    pub async fn invoke(&self, input: S, config: Option<RunnableConfig>) -> Result<S, AgentError> {
        let config = config.unwrap_or_default();
        let thread_id = config.thread_id.as_deref();
        log_graph_start(thread_id, &self.first_node_id);
        match self.run(input, &config).await {
            Ok((state, steps)) => {
                log_graph_complete(thread_id, steps);
                Ok(state)
            }
            Err(e) => {
                log_graph_error(&e);
                Err(e)
            }
        }
    }

    /// Checkpointer to use for this run: only when one is attached and the config names a thread.
    fn active_checkpointer(&self, config: &RunnableConfig) -> Option<&Arc<dyn Checkpointer<S>>> {
        config.thread_id.as_ref().and(self.checkpointer.as_ref())
    }

    async fn initial_state(&self, input: S, config: &RunnableConfig) -> Result<S, AgentError> {
        let Some(cp) = self.active_checkpointer(config) else {
            return Ok(input);
        };
        match cp.get_tuple(config).await? {
            Some((checkpoint, metadata)) => {
                log_resume(
                    config.thread_id.as_deref().unwrap_or_default(),
                    &checkpoint.id,
                    metadata.step,
                );
                let mut state = checkpoint.channel_values;
                self.state_updater.apply_update(&mut state, &input);
                Ok(state)
            }
            None => Ok(input),
        }
    }

    async fn save(
        &self,
        config: &RunnableConfig,
        state: &S,
        source: CheckpointSource,
        step: i64,
    ) -> Result<(), AgentError> {
        if let Some(cp) = self.active_checkpointer(config) {
            // A resumed run must append to the thread, not overwrite the loaded checkpoint.
            let write_config = RunnableConfig {
                checkpoint_id: None,
                ..config.clone()
            };
            let checkpoint = Checkpoint::from_state(state.clone(), source, step);
            cp.put(&write_config, &checkpoint).await?;
        }
        Ok(())
    }

    fn resolve_next(&self, current_id: &str, state: &S, next: Next) -> Result<String, AgentError> {
        match self.next_map.get(current_id) {
            Some(NextEntry::Conditional(router)) => {
                let target = router.resolve_next(state)?;
                log_routing(current_id, &target);
                Ok(target)
            }
            entry => Ok(match next {
                Next::End => END.to_string(),
                Next::Node(id) => id,
                Next::Continue => match entry {
                    Some(NextEntry::Unconditional(id)) => id.clone(),
                    _ => END.to_string(),
                },
            }),
        }
    }

    async fn run(&self, input: S, config: &RunnableConfig) -> Result<(S, usize), AgentError> {
        let limit = config.effective_recursion_limit();
        let mut state = self.initial_state(input, config).await?;
        self.save(config, &state, CheckpointSource::Input, -1).await?;

        let mut current_id = self.first_node_id.clone();
        let mut steps = 0usize;
        while current_id != END {
            if steps >= limit {
                return Err(AgentError::RecursionLimit(limit));
            }
            steps += 1;

            let node = self
                .nodes
                .get(&current_id)
                .cloned()
                .ok_or_else(|| AgentError::ExecutionFailed(format!("unknown node: {}", current_id)))?;
            log_node_start(&current_id, steps, &state);
            let (update, next) = node.run(state.clone()).await?;
            log_node_complete(&current_id, &next);

            self.state_updater.apply_update(&mut state, &update);
            self.save(config, &state, CheckpointSource::Loop, steps as i64)
                .await?;

            current_id = self.resolve_next(&current_id, &state, next)?;
        }
        Ok((state, steps))
    }
}
