//! Repository Implementation
//!
//! Every public operation checks out its own pooled connection and hands it
//! back when the guard drops, on success and on error alike.

use crate::dates::{format_iso_date, parse_iso_date, DateWindow};
use crate::records::{PrecipitationReading, StationActivity, TemperatureReading, TemperatureStats};
use crate::{schema, StorageConfig, StorageError};
use chrono::NaiveDate;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

const LATEST_DATE: &str = "SELECT MAX(date) FROM measurement";

const LATEST_STATION_DATE: &str = "SELECT MAX(date) FROM measurement WHERE station = ?1";

const PRECIPITATION_SINCE: &str =
    "SELECT date, prcp AS precipitation FROM measurement WHERE date >= ?1";

const DISTINCT_STATIONS: &str = "SELECT DISTINCT station FROM measurement ORDER BY station";

// Ties on count go to the lexicographically smallest station id
const MOST_ACTIVE_STATION: &str = "SELECT station, COUNT(*) AS observations \
     FROM measurement GROUP BY station \
     ORDER BY observations DESC, station ASC LIMIT 1";

const STATION_TEMPERATURES_BETWEEN: &str = "SELECT date, CAST(tobs AS INTEGER) AS temperature \
     FROM measurement WHERE station = ?1 AND date >= ?2 AND date <= ?3";

const TEMPERATURE_STATS_SINCE: &str = "SELECT CAST(MIN(tobs) AS INTEGER) AS min_temp, \
     CAST(MAX(tobs) AS INTEGER) AS max_temp, AVG(tobs) AS avg_temp \
     FROM measurement WHERE date >= ?1";

const TEMPERATURE_STATS_BETWEEN: &str = "SELECT CAST(MIN(tobs) AS INTEGER) AS min_temp, \
     CAST(MAX(tobs) AS INTEGER) AS max_temp, AVG(tobs) AS avg_temp \
     FROM measurement WHERE date >= ?1 AND date <= ?2";

/// Counter of store queries, labelled by operation
pub const METRIC_STORE_QUERIES: &str = "climate_store_queries_total";

/// Handle to the observation store.
///
/// Built once at startup and cloned into request handlers; clones share the
/// underlying pool.
#[derive(Debug, Clone)]
pub struct ClimateRepository {
    pool: SqlitePool,
}

impl ClimateRepository {
    /// Open a connection pool to the store described by `config`
    pub async fn connect(config: &StorageConfig) -> Result<Self, StorageError> {
        let connection_error = |source: sqlx::Error| StorageError::Connection {
            url: config.url.clone(),
            source,
        };

        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(connection_error)?
            .read_only(config.read_only);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(connection_error)?;

        info!(
            url = %config.url,
            read_only = config.read_only,
            max_connections = config.max_connections,
            "Connected to observation store"
        );

        Ok(Self { pool })
    }

    /// Wrap an existing pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check the live tables against the declared schema
    pub async fn verify_schema(&self) -> Result<(), StorageError> {
        schema::verify_schema(&self.pool).await
    }

    /// Round-trip a trivial statement to confirm the store answers
    pub async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Observation store closed");
    }

    /// Most recent observation date across all stations
    pub async fn latest_date(&self) -> Result<NaiveDate, StorageError> {
        let mut conn = self.acquire().await?;
        latest_date(&mut conn, None).await
    }

    /// Precipitation for the year of data ending at the latest observation
    pub async fn recent_precipitation(&self) -> Result<Vec<PrecipitationReading>, StorageError> {
        let mut conn = self.acquire().await?;

        let window = DateWindow::trailing_year(latest_date(&mut conn, None).await?);
        let readings = sqlx::query_as::<_, PrecipitationReading>(PRECIPITATION_SINCE)
            .bind(window.start_key())
            .fetch_all(&mut *conn)
            .await?;

        debug!(
            start = %window.start,
            end = %window.end,
            rows = readings.len(),
            "Loaded recent precipitation"
        );
        record_query("recent_precipitation");

        Ok(readings)
    }

    /// Distinct station ids that have at least one observation
    pub async fn list_stations(&self) -> Result<Vec<String>, StorageError> {
        let mut conn = self.acquire().await?;

        let stations: Vec<String> = sqlx::query_scalar(DISTINCT_STATIONS)
            .fetch_all(&mut *conn)
            .await?;

        debug!(count = stations.len(), "Listed stations");
        record_query("list_stations");

        Ok(stations)
    }

    /// Station with the most observations
    pub async fn most_active_station(&self) -> Result<StationActivity, StorageError> {
        let mut conn = self.acquire().await?;
        let activity = most_active_station(&mut conn).await?;
        record_query("most_active_station");
        Ok(activity)
    }

    /// Temperatures from the most active station over its last year of data
    pub async fn most_active_station_temperatures(
        &self,
    ) -> Result<Vec<TemperatureReading>, StorageError> {
        let mut conn = self.acquire().await?;

        let activity = most_active_station(&mut conn).await?;
        let anchor = latest_date(&mut conn, Some(&activity.station)).await?;
        let window = DateWindow::trailing_year(anchor);

        let readings = sqlx::query_as::<_, TemperatureReading>(STATION_TEMPERATURES_BETWEEN)
            .bind(&activity.station)
            .bind(window.start_key())
            .bind(window.end_key())
            .fetch_all(&mut *conn)
            .await?;

        debug!(
            station = %activity.station,
            observations = activity.observations,
            start = %window.start,
            end = %window.end,
            rows = readings.len(),
            "Loaded most active station temperatures"
        );
        record_query("most_active_station_temperatures");

        Ok(readings)
    }

    /// Temperature aggregates from `start` onwards, or over `start..=end`.
    ///
    /// Both dates must be `YYYY-MM-DD`. A filter that matches nothing yields
    /// all-`None` stats rather than an error.
    pub async fn temperature_stats(
        &self,
        start: &str,
        end: Option<&str>,
    ) -> Result<TemperatureStats, StorageError> {
        let start = parse_iso_date(start)?;
        let end = end.map(parse_iso_date).transpose()?;

        let query = match end {
            None => sqlx::query_as::<_, TemperatureStats>(TEMPERATURE_STATS_SINCE)
                .bind(format_iso_date(start)),
            Some(end) => sqlx::query_as::<_, TemperatureStats>(TEMPERATURE_STATS_BETWEEN)
                .bind(format_iso_date(start))
                .bind(format_iso_date(end)),
        };

        let mut conn = self.acquire().await?;
        let stats = query.fetch_one(&mut *conn).await?;

        debug!(%start, end = ?end, empty = stats.is_empty(), "Computed temperature stats");
        record_query("temperature_stats");

        Ok(stats)
    }

    async fn acquire(&self) -> Result<PoolConnection<Sqlite>, StorageError> {
        Ok(self.pool.acquire().await?)
    }
}

async fn latest_date(
    conn: &mut SqliteConnection,
    station: Option<&str>,
) -> Result<NaiveDate, StorageError> {
    let latest: Option<String> = match station {
        None => sqlx::query_scalar(LATEST_DATE).fetch_one(&mut *conn).await?,
        Some(station) => {
            sqlx::query_scalar(LATEST_STATION_DATE)
                .bind(station)
                .fetch_one(&mut *conn)
                .await?
        }
    };

    let latest = latest.ok_or(StorageError::DataUnavailable("no observations recorded"))?;
    parse_iso_date(&latest)
}

async fn most_active_station(conn: &mut SqliteConnection) -> Result<StationActivity, StorageError> {
    sqlx::query_as::<_, StationActivity>(MOST_ACTIVE_STATION)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(StorageError::DataUnavailable("no observations recorded"))
}

fn record_query(operation: &'static str) {
    metrics::counter!(METRIC_STORE_QUERIES, "operation" => operation).increment(1);
}
