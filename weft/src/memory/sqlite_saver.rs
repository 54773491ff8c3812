//! SQLite-backed checkpointer (SqliteSaver). Persistent across process restarts.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::params;

use crate::memory::checkpoint::{
    Checkpoint, CheckpointListItem, CheckpointMetadata, CheckpointSource, CHECKPOINT_VERSION,
};
use crate::memory::checkpointer::{window_list, CheckpointError, Checkpointer};
use crate::memory::config::RunnableConfig;
use crate::memory::serializer::Serializer;

fn storage(e: impl std::fmt::Display) -> CheckpointError {
    CheckpointError::Storage(e.to_string())
}

fn created_at_to_millis(t: &Option<DateTime<Utc>>) -> Option<i64> {
    t.as_ref().map(|t| t.timestamp_millis())
}

fn millis_to_created_at(v: Option<i64>) -> Option<DateTime<Utc>> {
    v.and_then(DateTime::<Utc>::from_timestamp_millis)
}

/// SQLite-backed checkpointer. Key: (thread_id, checkpoint_ns, checkpoint_id).
///
/// Each call opens its own connection inside `spawn_blocking`. Rows carry an
/// autoincrement `seq`, and "latest" means highest `seq` rather than newest timestamp,
/// so two checkpoints written within the same millisecond still order correctly.
pub struct SqliteSaver<S> {
    db_path: PathBuf,
    serializer: Arc<dyn Serializer<S>>,
}

impl<S> SqliteSaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Opens (or creates) the database file and ensures the table exists.
    pub fn new(
        path: impl AsRef<Path>,
        serializer: Arc<dyn Serializer<S>>,
    ) -> Result<Self, CheckpointError> {
        let db_path = path.as_ref().to_path_buf();
        let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS checkpoints (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                thread_id TEXT NOT NULL,
                checkpoint_ns TEXT NOT NULL,
                checkpoint_id TEXT NOT NULL,
                ts TEXT NOT NULL,
                payload BLOB NOT NULL,
                metadata_source TEXT NOT NULL,
                metadata_step INTEGER NOT NULL,
                metadata_created_at INTEGER,
                UNIQUE (thread_id, checkpoint_ns, checkpoint_id)
            );
            CREATE INDEX IF NOT EXISTS idx_checkpoints_thread
                ON checkpoints (thread_id, checkpoint_ns, seq);
            "#,
        )
        .map_err(storage)?;
        tracing::debug!(path = %db_path.display(), "sqlite checkpointer opened");
        Ok(Self {
            db_path,
            serializer,
        })
    }

    fn thread_id_required(config: &RunnableConfig) -> Result<String, CheckpointError> {
        config
            .thread_id
            .clone()
            .ok_or(CheckpointError::ThreadIdRequired)
    }
}

#[async_trait]
impl<S> Checkpointer<S> for SqliteSaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<String, CheckpointError> {
        let thread_id = Self::thread_id_required(config)?;
        let checkpoint_ns = config.checkpoint_ns.clone();
        let payload = self.serializer.serialize(&checkpoint.channel_values)?;
        let metadata_source = checkpoint.metadata.source.as_str();
        let metadata_step = checkpoint.metadata.step;
        let metadata_created_at = created_at_to_millis(&checkpoint.metadata.created_at);
        let id = checkpoint.id.clone();
        let ts = checkpoint.ts.clone();

        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
            conn.execute(
                r#"
                INSERT OR REPLACE INTO checkpoints
                (thread_id, checkpoint_ns, checkpoint_id, ts, payload,
                 metadata_source, metadata_step, metadata_created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    thread_id,
                    checkpoint_ns,
                    id,
                    ts,
                    payload,
                    metadata_source,
                    metadata_step,
                    metadata_created_at,
                ],
            )
            .map_err(storage)?;
            Ok::<String, CheckpointError>(id)
        })
        .await
        .map_err(storage)?
    }

    async fn get_tuple(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<(Checkpoint<S>, CheckpointMetadata)>, CheckpointError> {
        let thread_id = Self::thread_id_required(config)?;
        let checkpoint_ns = config.checkpoint_ns.clone();
        let want_id = config.checkpoint_id.clone();
        let db_path = self.db_path.clone();

        type RowData = (String, String, Vec<u8>, String, i64, Option<i64>);
        let row: Option<RowData> =
            tokio::task::spawn_blocking(move || -> Result<Option<RowData>, CheckpointError> {
                let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
                let sql = if want_id.is_some() {
                    "SELECT checkpoint_id, ts, payload, metadata_source, metadata_step, metadata_created_at
                     FROM checkpoints WHERE thread_id = ?1 AND checkpoint_ns = ?2 AND checkpoint_id = ?3"
                } else {
                    "SELECT checkpoint_id, ts, payload, metadata_source, metadata_step, metadata_created_at
                     FROM checkpoints WHERE thread_id = ?1 AND checkpoint_ns = ?2
                     ORDER BY seq DESC LIMIT 1"
                };
                let mut stmt = conn.prepare(sql).map_err(storage)?;
                let mut rows = match want_id {
                    Some(ref cid) => stmt.query(params![thread_id, checkpoint_ns, cid]),
                    None => stmt.query(params![thread_id, checkpoint_ns]),
                }
                .map_err(storage)?;
                let Some(row) = rows.next().map_err(storage)? else {
                    return Ok(None);
                };
                Ok(Some((
                    row.get(0).map_err(storage)?,
                    row.get(1).map_err(storage)?,
                    row.get(2).map_err(storage)?,
                    row.get(3).map_err(storage)?,
                    row.get(4).map_err(storage)?,
                    row.get(5).map_err(storage)?,
                )))
            })
            .await
            .map_err(storage)??;

        let Some((checkpoint_id, ts, payload, metadata_source, metadata_step, metadata_created_at)) =
            row
        else {
            return Ok(None);
        };

        let channel_values = self.serializer.deserialize(&payload)?;
        let metadata = CheckpointMetadata {
            source: CheckpointSource::parse(&metadata_source),
            step: metadata_step,
            created_at: millis_to_created_at(metadata_created_at),
        };
        let checkpoint = Checkpoint {
            v: CHECKPOINT_VERSION,
            id: checkpoint_id,
            ts,
            channel_values,
            metadata: metadata.clone(),
        };
        Ok(Some((checkpoint, metadata)))
    }

    async fn list(
        &self,
        config: &RunnableConfig,
        limit: Option<usize>,
        before: Option<&str>,
        after: Option<&str>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError> {
        let thread_id = Self::thread_id_required(config)?;
        let checkpoint_ns = config.checkpoint_ns.clone();
        let db_path = self.db_path.clone();

        let items = tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
            let mut stmt = conn
                .prepare(
                    "SELECT checkpoint_id, metadata_source, metadata_step, metadata_created_at
                     FROM checkpoints WHERE thread_id = ?1 AND checkpoint_ns = ?2
                     ORDER BY seq ASC",
                )
                .map_err(storage)?;
            let rows = stmt
                .query_map(params![thread_id, checkpoint_ns], |row| {
                    Ok(CheckpointListItem {
                        checkpoint_id: row.get(0)?,
                        metadata: CheckpointMetadata {
                            source: CheckpointSource::parse(&row.get::<_, String>(1)?),
                            step: row.get(2)?,
                            created_at: millis_to_created_at(row.get(3)?),
                        },
                    })
                })
                .map_err(storage)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(storage)
        })
        .await
        .map_err(storage)??;

        Ok(window_list(items, limit, before, after))
    }
}
