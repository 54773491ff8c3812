//! One module per group of subcommands.

mod agent;
mod chat;
mod index;
mod load;
mod parse;

pub use agent::{agent, sample_employees, AgentOptions};
pub use chat::{batch, chat, probe, DEFAULT_PROBE_INPUT};
pub use index::{embed, rag, EmbedOutput};
pub use load::{load, loader_for, LoadKind};
pub use parse::{parse, ParseKind, Recipe, EXTRACT_TEMPLATE};
