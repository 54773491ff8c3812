//! Load configuration from XDG `config.toml` and project `.env`, then apply to the process
//! environment with priority: **existing env > .env > XDG**.
//!
//! Also resolves which OpenAI-compatible provider to talk to ([`ProviderSettings`]).

mod dotenv;
mod provider;
mod xdg_toml;

pub use provider::{
    Provider, ProviderError, ProviderSettings, EMBEDDING_MODEL_ENV, MODEL_ENV, PROVIDER_ENV,
};
pub use xdg_toml::config_path;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// SQLite file for conversation checkpoints; unset means an in-memory saver.
pub const CHECKPOINT_DB_ENV: &str = "WEFT_CHECKPOINT_DB";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
}

/// Fills in unset environment variables from project `.env` and the XDG `[env]` table.
///
/// A variable already present in the process environment is never touched. Between the two
/// files, `.env` (in `override_dir`, or the current directory) beats
/// `$XDG_CONFIG_HOME/<app_name>/config.toml`.
///
/// Returns the keys that were set, sorted.
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<Vec<String>, LoadError> {
    let mut merged: BTreeMap<String, String> = xdg_toml::load_env_map(app_name)?.into_iter().collect();
    merged.extend(dotenv::load_env_map(override_dir).map_err(LoadError::DotenvRead)?);

    let mut applied = Vec::new();
    for (key, value) in merged {
        if std::env::var_os(&key).is_some() {
            continue;
        }
        std::env::set_var(&key, value);
        applied.push(key);
    }
    Ok(applied)
}

/// Path from `WEFT_CHECKPOINT_DB`, if set and non-empty.
pub fn checkpoint_db_path() -> Option<PathBuf> {
    std::env::var_os(CHECKPOINT_DB_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
