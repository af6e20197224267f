//! Observation Storage Layer
//!
//! Read-only access to the weather observation store (SQLite) through an
//! explicit repository handle.

mod dates;
mod records;
mod repository;
mod schema;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use dates::{format_iso_date, parse_iso_date, DateWindow, ISO_DATE_FORMAT, TRAILING_WINDOW_DAYS};
pub use records::{
    Observation, PrecipitationReading, StationActivity, TemperatureReading, TemperatureStats,
};
pub use repository::{ClimateRepository, METRIC_STORE_QUERIES};
pub use schema::{verify_schema, TableSchema, MEASUREMENT, STATION, TABLES};

use serde::Deserialize;
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Failed to connect to store at {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("No data available: {0}")]
    DataUnavailable(&'static str),
    #[error("Invalid ISO-8601 date: {value:?}")]
    DateParse { value: String },
    #[error("Schema mismatch: table `{0}` not found")]
    MissingTable(&'static str),
    #[error("Schema mismatch: table `{table}` has no column `{column}`")]
    SchemaMismatch {
        table: &'static str,
        column: &'static str,
    },
}

/// Connection settings for the observation store
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite connection URL
    pub url: String,
    /// Upper bound on pooled connections
    pub max_connections: u32,
    /// Open the database file read-only
    pub read_only: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://Resources/hawaii.sqlite".to_string(),
            max_connections: 4,
            read_only: true,
        }
    }
}
