//! Static Schema Declaration
//!
//! The store is owned elsewhere; these are the columns this crate reads.
//! [`verify_schema`] checks them against the live database once at startup.

use crate::StorageError;
use sqlx::SqlitePool;
use tracing::{debug, info};

/// A table and the columns queried from it
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

/// Daily observations: station id, ISO date, precipitation, temperature
pub const MEASUREMENT: TableSchema = TableSchema {
    name: "measurement",
    columns: &["station", "date", "prcp", "tobs"],
};

/// Station metadata
pub const STATION: TableSchema = TableSchema {
    name: "station",
    columns: &["station"],
};

pub const TABLES: &[TableSchema] = &[MEASUREMENT, STATION];

/// Fail fast if a declared table or column is missing from the live store.
/// Extra live columns are ignored.
pub async fn verify_schema(pool: &SqlitePool) -> Result<(), StorageError> {
    for table in TABLES {
        let live: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info(?1)")
            .bind(table.name)
            .fetch_all(pool)
            .await?;

        if live.is_empty() {
            return Err(StorageError::MissingTable(table.name));
        }

        debug!(table = table.name, columns = ?live, "Live columns");

        for &column in table.columns {
            if !live.iter().any(|c| c.eq_ignore_ascii_case(column)) {
                return Err(StorageError::SchemaMismatch {
                    table: table.name,
                    column,
                });
            }
        }
    }

    info!(tables = TABLES.len(), "Store schema verified");
    Ok(())
}
