//! State graph: nodes, explicit edges and conditional edges, compiled into a runnable loop.
//!
//! Build a [`StateGraph`], wire it with `add_edge` / `add_conditional_edges` using
//! [`START`] and [`END`], then `compile` (or `compile_with_checkpointer`) into a
//! [`CompiledStateGraph`] and call `invoke`.

mod compile_error;
mod compiled;
mod conditional;
mod logging;
mod next;
mod node;
mod state_graph;

pub use compile_error::CompilationError;
pub use compiled::CompiledStateGraph;
pub use conditional::{ConditionalRouter, ConditionalRouterFn, NextEntry};
pub use next::Next;
pub use node::Node;
pub use state_graph::{StateGraph, END, START};
