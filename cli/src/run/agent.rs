//! `agent`: the HR assistant. Employee records are indexed in memory and exposed through
//! the `employee_lookup` tool; conversations are checkpointed per thread.

use std::path::PathBuf;
use std::sync::Arc;

use weft::agent::HR_SYSTEM_PROMPT;
use weft::{
    build_tool_agent, Checkpointer, Document, Embedder, InMemoryVectorStore, JsonSerializer,
    LlmClient, MemorySaver, MessagesState, SqliteSaver, ToolAgent, ToolRegistry,
    VectorLookupTool,
};

use super::load::loader_for;
use crate::RunError;

#[derive(Debug, Clone)]
pub struct AgentOptions {
    /// CSV/JSON/text file with employee records; built-in sample when `None`.
    pub employees: Option<String>,
    pub thread_id: String,
    /// SQLite checkpoint file; in-memory when `None`.
    pub checkpoint_db: Option<PathBuf>,
}

const EMPLOYEES: [(&str, &str); 4] = [
    ("E001", "Omar Haddad, Senior Backend Engineer in Engineering, based in Cairo. Skills: Rust, PostgreSQL, Kubernetes. Manager: Lina Saleh. Hired 2019."),
    ("E002", "Lina Saleh, Engineering Manager in Engineering, based in Amman. Skills: team leadership, system design. Reports to the CTO. Hired 2016."),
    ("E003", "Sami Nasser, Accountant in Finance, based in Beirut. Skills: budgeting, payroll, IFRS. Manager: Huda Karim. Hired 2021."),
    ("E004", "Huda Karim, Head of Finance, based in Dubai. Skills: financial planning, audit. Reports to the CFO. Hired 2015."),
];

/// Small employee directory used when no file is given.
pub fn sample_employees() -> Vec<Document> {
    EMPLOYEES
        .iter()
        .map(|(id, text)| Document::new(*text).with_metadata("employee_id", *id))
        .collect()
}

async fn employee_documents(source: Option<&str>) -> Result<Vec<Document>, RunError> {
    match source {
        Some(source) => Ok(loader_for(source)?.load().await?),
        None => Ok(sample_employees()),
    }
}

fn checkpointer(
    path: Option<&PathBuf>,
) -> Result<Arc<dyn Checkpointer<MessagesState>>, RunError> {
    let saver: Arc<dyn Checkpointer<MessagesState>> = match path {
        Some(path) => Arc::new(SqliteSaver::<MessagesState>::new(path, Arc::new(JsonSerializer))?),
        None => Arc::new(MemorySaver::<MessagesState>::new()),
    };
    Ok(saver)
}

/// Runs one user turn on `opts.thread_id` and returns the agent's final answer.
pub async fn agent(
    llm: Arc<dyn LlmClient>,
    embedder: Arc<dyn Embedder>,
    query: &str,
    opts: &AgentOptions,
) -> Result<String, RunError> {
    let docs = employee_documents(opts.employees.as_deref()).await?;
    let store = Arc::new(InMemoryVectorStore::from_documents(docs, embedder).await?);
    let registry = ToolRegistry::new().with_tool(Box::new(VectorLookupTool::employee_lookup(store)));

    let graph = build_tool_agent(
        llm,
        Arc::new(registry),
        HR_SYSTEM_PROMPT,
        Some(checkpointer(opts.checkpoint_db.as_ref())?),
    )?;
    Ok(ToolAgent::new(graph).invoke(query, &opts.thread_id).await?)
}
