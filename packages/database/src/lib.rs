#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! `DuckDB`-backed disaster data store.
//!
//! Geometries are stored as `GeoJSON` TEXT (no spatial extension) and
//! parsed into `geo` types on read; point-in-polygon queries run in Rust
//! through [`disaster_risk_spatial::PointIndex`]. [`store::DuckDbStore`]
//! implements [`disaster_risk_database_models::DisasterStore`].

pub mod db;
pub mod paths;
pub mod schema;
pub mod store;

use disaster_risk_database_models::StoreError;

pub use store::DuckDbStore;

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// `DuckDB` error.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

impl From<DbError> for StoreError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Conversion { message } => Self::Conversion { message },
            other => Self::Query {
                message: other.to_string(),
            },
        }
    }
}
