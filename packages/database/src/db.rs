//! Database connection utilities.

use std::path::PathBuf;

use crate::{DbError, DuckDbStore};

/// Environment variable naming the store file.
pub const DB_PATH_ENV: &str = "DISASTER_RISK_DB";

/// Resolves the store path from `DISASTER_RISK_DB`, falling back to
/// [`crate::paths::store_db_path`].
#[must_use]
pub fn db_path_from_env() -> PathBuf {
    std::env::var_os(DB_PATH_ENV).map_or_else(crate::paths::store_db_path, PathBuf::from)
}

/// Opens the store named by `DISASTER_RISK_DB` (or the default path).
///
/// # Errors
///
/// Returns [`DbError`] if the file cannot be opened or the schema cannot be
/// created.
pub fn connect_from_env() -> Result<DuckDbStore, DbError> {
    let path = db_path_from_env();
    log::debug!("Opening disaster store at {}", path.display());
    DuckDbStore::open(&path)
}
