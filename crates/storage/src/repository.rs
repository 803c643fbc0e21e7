//! Station Repository
//!
//! Write path: one base row in `stations`, then (only if that row was
//! actually inserted) one row per bike and one coordinate row, all inside a
//! single transaction. Read path: base rows for a floor/kiosk predicate,
//! then one bikes fetch and one coordinates fetch per base row.

use crate::schema::{
    select_all_stations, select_specific_station, INSERT_BIKE, INSERT_COORDINATES,
    INSERT_STATION, SCHEMA, SELECT_BIKES, SELECT_COORDINATES,
};
use crate::timestamp::normalize_timestamp;
use crate::StorageError;
use models::{BikeRecord, StationSnapshot};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqliteConnection};
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default bound on each top-level operation
const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 5;

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// sqlx connection URL (e.g. "sqlite://bikeshare.db")
    pub url: String,
    /// Pool size
    pub max_connections: u32,
    /// Bound on each insert/query call (seconds)
    pub operation_timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://bikeshare.db".to_string(),
            max_connections: 5,
            operation_timeout_secs: DEFAULT_OPERATION_TIMEOUT_SECS,
        }
    }
}

/// What a call to [`StationRepository::insert_station`] wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    /// Whether the base row was new
    pub station_inserted: bool,
    /// Bike rows written
    pub bikes: usize,
    /// Coordinate rows written
    pub coordinates: usize,
}

/// Persistence engine over a SQLite pool
#[derive(Debug, Clone)]
pub struct StationRepository {
    pool: SqlitePool,
    operation_timeout: Duration,
}

impl StationRepository {
    /// Connect, creating the database file and tables if needed
    pub async fn connect(config: &StorageConfig) -> Result<Self, StorageError> {
        info!("Opening station database at {}", config.url);

        let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.operation_timeout_secs))
            .connect_with(options)
            .await?;

        let repository = Self {
            pool,
            operation_timeout: Duration::from_secs(config.operation_timeout_secs),
        };
        repository.init_schema().await?;
        Ok(repository)
    }

    /// Private in-memory database (for tests and dry runs)
    pub async fn in_memory() -> Result<Self, StorageError> {
        // Every connection to :memory: is a separate database, so the pool
        // holds exactly one connection for its whole lifetime.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let repository = Self {
            pool,
            operation_timeout: Duration::from_secs(DEFAULT_OPERATION_TIMEOUT_SECS),
        };
        repository.init_schema().await?;
        Ok(repository)
    }

    /// Create tables and indexes if they do not exist
    pub async fn init_schema(&self) -> Result<(), StorageError> {
        let mut conn = self.pool.acquire().await?;
        for statement in SCHEMA {
            sqlx::query(statement).execute(&mut *conn).await?;
        }
        debug!("Station schema ready");
        Ok(())
    }

    /// Set the bound applied to each top-level operation
    pub fn set_operation_timeout(&mut self, timeout: Duration) {
        self.operation_timeout = timeout;
    }

    /// Connection pool reference
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check the database answers
    pub async fn ping(&self) -> Result<(), StorageError> {
        let ping = sqlx::query("SELECT 1").execute(&self.pool);
        self.bounded("ping", async { ping.await.map(|_| ()).map_err(StorageError::from) })
            .await
    }

    /// Close the pool gracefully
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Store one station snapshot taken at `at`.
    ///
    /// Bikes and coordinates are written only when the base row is new. Any
    /// failure rolls back the whole snapshot.
    pub async fn insert_station(
        &self,
        at: &str,
        station: &StationSnapshot,
    ) -> Result<InsertOutcome, StorageError> {
        let at = normalize_timestamp(at);
        self.bounded("insert_station", self.write_snapshot(&at, station)).await
    }

    /// All snapshots taken at or after `floor`, oldest first
    pub async fn query_all(&self, floor: &str) -> Result<Vec<StationSnapshot>, StorageError> {
        let floor = normalize_timestamp(floor);
        self.bounded("query_all", self.load_since(&floor)).await
    }

    /// Latest snapshot of `kiosk_id` at or after `floor`.
    ///
    /// Rows are scanned oldest first and the last one wins. With no match the
    /// result is an empty snapshot rather than an error.
    pub async fn query_specific(
        &self,
        kiosk_id: i64,
        floor: &str,
    ) -> Result<StationSnapshot, StorageError> {
        let floor = normalize_timestamp(floor);
        self.bounded("query_specific", self.load_kiosk_since(kiosk_id, &floor)).await
    }

    async fn write_snapshot(
        &self,
        at: &str,
        station: &StationSnapshot,
    ) -> Result<InsertOutcome, StorageError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(INSERT_STATION)
            .bind(at)
            .bind(&station.name)
            .bind(station.kiosk_id)
            .bind(station.total_docks)
            .bind(station.is_event_based)
            .bind(station.is_virtual)
            .bind(station.trikes_available)
            .bind(station.docks_available)
            .bind(station.bikes_available)
            .bind(station.classic_bikes_available)
            .bind(station.smart_bikes_available)
            .bind(station.electric_bikes_available)
            .bind(station.reward_bikes_available)
            .bind(station.reward_docks_available)
            .bind(station.kiosk_type)
            .bind(station.latitude)
            .bind(station.longitude)
            .bind(&station.kiosk_status)
            .bind(&station.kiosk_public_status)
            .bind(&station.kiosk_connection_status)
            .bind(&station.address_street)
            .bind(&station.address_city)
            .bind(&station.address_state)
            .bind(&station.address_zip_code)
            .bind(&station.close_time)
            .bind(&station.event_end)
            .bind(&station.event_start)
            .bind(&station.notes)
            .bind(&station.open_time)
            .bind(&station.public_text)
            .bind(&station.time_zone)
            .execute(&mut *tx)
            .await?;

        let mut outcome = InsertOutcome::default();
        if result.rows_affected() == 0 {
            debug!("Kiosk {} already stored at {}, skipping", station.kiosk_id, at);
            tx.commit().await?;
            return Ok(outcome);
        }
        outcome.station_inserted = true;

        if !station.bikes.is_empty() {
            outcome.bikes = insert_bikes(&mut tx, station.kiosk_id, at, &station.bikes).await?;
        }

        if !station.coordinates.is_empty() {
            match station.coordinate_pair() {
                Some((longitude, latitude)) => {
                    insert_coordinates(&mut tx, station.kiosk_id, longitude, latitude).await?;
                    outcome.coordinates = 1;
                }
                None => warn!(
                    "Kiosk {} has an incomplete coordinate pair, not stored",
                    station.kiosk_id
                ),
            }
        }

        tx.commit().await?;
        debug!(
            "Stored kiosk {} at {} ({} bikes, {} coordinates)",
            station.kiosk_id, at, outcome.bikes, outcome.coordinates
        );
        Ok(outcome)
    }

    async fn load_since(&self, floor: &str) -> Result<Vec<StationSnapshot>, StorageError> {
        let mut conn = self.pool.acquire().await?;

        let sql = select_all_stations();
        let rows = sqlx::query(&sql).bind(floor).fetch_all(&mut *conn).await?;
        let mut stations = rows
            .iter()
            .map(station_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        for station in &mut stations {
            station.bikes = fetch_bikes(&mut conn, station.kiosk_id).await?;
            station.coordinates = fetch_coordinates(&mut conn, station.kiosk_id).await?;
        }

        debug!("Loaded {} station rows since {}", stations.len(), floor);
        Ok(stations)
    }

    async fn load_kiosk_since(
        &self,
        kiosk_id: i64,
        floor: &str,
    ) -> Result<StationSnapshot, StorageError> {
        let mut conn = self.pool.acquire().await?;

        let sql = select_specific_station();
        let rows = sqlx::query(&sql)
            .bind(kiosk_id)
            .bind(floor)
            .fetch_all(&mut *conn)
            .await?;

        let Some(row) = rows.last() else {
            debug!("No rows for kiosk {} since {}", kiosk_id, floor);
            return Ok(StationSnapshot::default());
        };

        let mut station = station_from_row(row)?;
        station.bikes = fetch_bikes(&mut conn, station.kiosk_id).await?;
        station.coordinates = fetch_coordinates(&mut conn, station.kiosk_id).await?;
        Ok(station)
    }

    /// Run `operation` under the repository's fixed timeout
    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, StorageError>
    where
        F: Future<Output = Result<T, StorageError>>,
    {
        match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!("{} exceeded {:?}", operation, self.operation_timeout);
                Err(StorageError::Timeout {
                    operation,
                    after_ms: self.operation_timeout.as_millis() as u64,
                })
            }
        }
    }
}

async fn insert_bikes(
    conn: &mut SqliteConnection,
    kiosk_id: i64,
    at: &str,
    bikes: &[BikeRecord],
) -> Result<usize, StorageError> {
    for bike in bikes {
        sqlx::query(INSERT_BIKE)
            .bind(at)
            .bind(kiosk_id)
            .bind(bike.dock_number)
            .bind(bike.is_electric)
            .bind(bike.is_available)
            .bind(bike.battery)
            .execute(&mut *conn)
            .await?;
    }
    Ok(bikes.len())
}

async fn insert_coordinates(
    conn: &mut SqliteConnection,
    kiosk_id: i64,
    longitude: f64,
    latitude: f64,
) -> Result<(), StorageError> {
    sqlx::query(INSERT_COORDINATES)
        .bind(kiosk_id)
        .bind(longitude)
        .bind(latitude)
        .execute(conn)
        .await?;
    Ok(())
}

async fn fetch_bikes(
    conn: &mut SqliteConnection,
    kiosk_id: i64,
) -> Result<Vec<BikeRecord>, StorageError> {
    let rows = sqlx::query(SELECT_BIKES)
        .bind(kiosk_id)
        .fetch_all(conn)
        .await?;

    let bikes = rows
        .iter()
        .map(|row| {
            Ok(BikeRecord {
                id: row.try_get("id")?,
                kiosk_id: row.try_get("kiosk_id")?,
                dock_number: row.try_get("dock_number")?,
                is_electric: row.try_get("is_electric")?,
                is_available: row.try_get("is_available")?,
                battery: row.try_get("battery")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;
    Ok(bikes)
}

/// Coordinate rows flattened as longitude, latitude, longitude, ...
async fn fetch_coordinates(
    conn: &mut SqliteConnection,
    kiosk_id: i64,
) -> Result<Vec<f64>, StorageError> {
    let rows = sqlx::query(SELECT_COORDINATES)
        .bind(kiosk_id)
        .fetch_all(conn)
        .await?;

    let mut coordinates = Vec::with_capacity(rows.len() * 2);
    for row in &rows {
        coordinates.push(row.try_get::<f64, _>("longitude")?);
        coordinates.push(row.try_get::<f64, _>("latitude")?);
    }
    Ok(coordinates)
}

fn station_from_row(row: &SqliteRow) -> Result<StationSnapshot, sqlx::Error> {
    Ok(StationSnapshot {
        at: row.try_get("at")?,
        name: row.try_get("name")?,
        kiosk_id: row.try_get("kiosk_id")?,
        total_docks: row.try_get("total_docks")?,
        is_event_based: row.try_get("is_event_based")?,
        is_virtual: row.try_get("is_virtual")?,
        trikes_available: row.try_get("trikes_available")?,
        docks_available: row.try_get("docks_available")?,
        bikes_available: row.try_get("bikes_available")?,
        classic_bikes_available: row.try_get("classic_bikes_available")?,
        smart_bikes_available: row.try_get("smart_bikes_available")?,
        electric_bikes_available: row.try_get("electric_bikes_available")?,
        reward_bikes_available: row.try_get("reward_bikes_available")?,
        reward_docks_available: row.try_get("reward_docks_available")?,
        kiosk_type: row.try_get("kiosk_type")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        kiosk_status: row.try_get("kiosk_status")?,
        kiosk_public_status: row.try_get("kiosk_public_status")?,
        kiosk_connection_status: row.try_get("kiosk_connection_status")?,
        address_street: row.try_get("address_street")?,
        address_city: row.try_get("address_city")?,
        address_state: row.try_get("address_state")?,
        address_zip_code: row.try_get("address_zipcode")?,
        close_time: row.try_get("close_time")?,
        event_end: row.try_get("event_end")?,
        event_start: row.try_get("event_start")?,
        notes: row.try_get("notes")?,
        open_time: row.try_get("open_time")?,
        public_text: row.try_get("public_text")?,
        time_zone: row.try_get("timezone")?,
        coordinates: Vec::new(),
        bikes: Vec::new(),
    })
}
