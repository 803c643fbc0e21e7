//! Table definitions and SQL statements

/// Bootstrap statements, run in order on connect
pub(crate) const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS stations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        at TEXT NOT NULL,
        name TEXT NOT NULL DEFAULT '',
        kiosk_id INTEGER NOT NULL,
        total_docks INTEGER NOT NULL DEFAULT 0,
        is_event_based BOOLEAN NOT NULL DEFAULT 0,
        is_virtual BOOLEAN NOT NULL DEFAULT 0,
        trikes_available INTEGER NOT NULL DEFAULT 0,
        docks_available INTEGER NOT NULL DEFAULT 0,
        bikes_available INTEGER NOT NULL DEFAULT 0,
        classic_bikes_available INTEGER NOT NULL DEFAULT 0,
        smart_bikes_available INTEGER NOT NULL DEFAULT 0,
        electric_bikes_available INTEGER NOT NULL DEFAULT 0,
        reward_bikes_available INTEGER NOT NULL DEFAULT 0,
        reward_docks_available INTEGER NOT NULL DEFAULT 0,
        kiosk_type INTEGER NOT NULL DEFAULT 0,
        latitude REAL NOT NULL DEFAULT 0,
        longitude REAL NOT NULL DEFAULT 0,
        kiosk_status TEXT NOT NULL DEFAULT '',
        kiosk_public_status TEXT NOT NULL DEFAULT '',
        kiosk_connection_status TEXT NOT NULL DEFAULT '',
        address_street TEXT NOT NULL DEFAULT '',
        address_city TEXT NOT NULL DEFAULT '',
        address_state TEXT NOT NULL DEFAULT '',
        address_zipcode TEXT NOT NULL DEFAULT '',
        close_time TEXT NOT NULL DEFAULT '',
        event_end TEXT NOT NULL DEFAULT '',
        event_start TEXT NOT NULL DEFAULT '',
        notes TEXT NOT NULL DEFAULT '',
        open_time TEXT NOT NULL DEFAULT '',
        public_text TEXT NOT NULL DEFAULT '',
        timezone TEXT NOT NULL DEFAULT '',
        UNIQUE (kiosk_id, at)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_stations_at ON stations (at)",
    r#"
    CREATE TABLE IF NOT EXISTS bikes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        at TEXT NOT NULL,
        kiosk_id INTEGER NOT NULL,
        dock_number INTEGER NOT NULL,
        is_electric BOOLEAN NOT NULL,
        is_available BOOLEAN NOT NULL,
        battery INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_bikes_kiosk_id ON bikes (kiosk_id)",
    r#"
    CREATE TABLE IF NOT EXISTS coordinates (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        kiosk_id INTEGER NOT NULL,
        longitude REAL NOT NULL,
        latitude REAL NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_coordinates_kiosk_id ON coordinates (kiosk_id)",
];

/// A repeated (kiosk_id, at) pair is skipped and reports zero rows.
pub(crate) const INSERT_STATION: &str = r#"
    INSERT INTO stations
    (
        at, name, kiosk_id, total_docks, is_event_based,
        is_virtual, trikes_available, docks_available,
        bikes_available, classic_bikes_available, smart_bikes_available,
        electric_bikes_available, reward_bikes_available, reward_docks_available,
        kiosk_type, latitude, longitude, kiosk_status,
        kiosk_public_status, kiosk_connection_status, address_street,
        address_city, address_state, address_zipcode, close_time,
        event_end, event_start, notes, open_time, public_text, timezone
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT (kiosk_id, at) DO NOTHING
"#;

pub(crate) const INSERT_BIKE: &str = r#"
    INSERT INTO bikes (at, kiosk_id, dock_number, is_electric, is_available, battery)
    VALUES (?, ?, ?, ?, ?, ?)
"#;

pub(crate) const INSERT_COORDINATES: &str =
    "INSERT INTO coordinates (kiosk_id, longitude, latitude) VALUES (?, ?, ?)";

const STATION_COLUMNS: &str = r#"
    at, name, kiosk_id, total_docks, is_event_based,
    is_virtual, trikes_available, docks_available,
    bikes_available, classic_bikes_available, smart_bikes_available,
    electric_bikes_available, reward_bikes_available, reward_docks_available,
    kiosk_type, latitude, longitude, kiosk_status,
    kiosk_public_status, kiosk_connection_status, address_street,
    address_city, address_state, address_zipcode, close_time,
    event_end, event_start, notes, open_time, public_text, timezone
"#;

pub(crate) fn select_all_stations() -> String {
    format!("SELECT {STATION_COLUMNS} FROM stations WHERE at >= ? ORDER BY at ASC, id ASC")
}

pub(crate) fn select_specific_station() -> String {
    format!(
        "SELECT {STATION_COLUMNS} FROM stations WHERE kiosk_id = ? AND at >= ? ORDER BY at ASC, id ASC"
    )
}

pub(crate) const SELECT_BIKES: &str = r#"
    SELECT id, kiosk_id, dock_number, is_electric, is_available, battery
    FROM bikes WHERE kiosk_id = ? ORDER BY id ASC
"#;

pub(crate) const SELECT_COORDINATES: &str =
    "SELECT longitude, latitude FROM coordinates WHERE kiosk_id = ? ORDER BY id ASC";
