//! In-memory store fixtures for tests

use crate::dates::format_iso_date;
use crate::records::Observation;
use crate::{ClimateRepository, StorageError};
use chrono::{Days, NaiveDate};
use sqlx::sqlite::SqlitePoolOptions;

pub const CREATE_MEASUREMENT: &str = "CREATE TABLE measurement (\
     id INTEGER PRIMARY KEY, station TEXT, date TEXT, prcp FLOAT, tobs FLOAT)";

pub const CREATE_STATION: &str = "CREATE TABLE station (\
     id INTEGER PRIMARY KEY, station TEXT, name TEXT, \
     latitude FLOAT, longitude FLOAT, elevation FLOAT)";

/// Empty store with both tables created.
///
/// Single connection that never expires, so the in-memory database lives as
/// long as the pool.
pub async fn memory_repository() -> Result<ClimateRepository, StorageError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    sqlx::query(CREATE_MEASUREMENT).execute(&pool).await?;
    sqlx::query(CREATE_STATION).execute(&pool).await?;

    Ok(ClimateRepository::from_pool(pool))
}

/// Store holding `observations`, with a station row for each station seen
pub async fn seeded_repository(
    observations: &[Observation],
) -> Result<ClimateRepository, StorageError> {
    let repo = memory_repository().await?;
    insert_observations(&repo, observations).await?;
    Ok(repo)
}

pub async fn insert_observations(
    repo: &ClimateRepository,
    observations: &[Observation],
) -> Result<(), StorageError> {
    for observation in observations {
        sqlx::query("INSERT INTO measurement (station, date, prcp, tobs) VALUES (?1, ?2, ?3, ?4)")
            .bind(&observation.station)
            .bind(format_iso_date(observation.date))
            .bind(observation.precipitation)
            .bind(observation.temperature)
            .execute(repo.pool())
            .await?;
    }

    sqlx::query(
        "INSERT INTO station (station) SELECT DISTINCT station FROM measurement \
         WHERE station NOT IN (SELECT station FROM station WHERE station IS NOT NULL)",
    )
    .execute(repo.pool())
    .await?;

    Ok(())
}

/// Consecutive daily observations at `station` starting on `first`
pub fn daily_series(
    station: &str,
    first: NaiveDate,
    temperatures: impl IntoIterator<Item = i64>,
) -> Vec<Observation> {
    temperatures
        .into_iter()
        .enumerate()
        .map(|(day, temperature)| {
            Observation::new(station, first + Days::new(day as u64), Some(0.0), temperature)
        })
        .collect()
}
