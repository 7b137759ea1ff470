//! `SQLite` schema for the traffic stop store.

/// The stop table. Flags are stored as 0/1 integers, times as
/// `YYYY-MM-DD HH:MM:SS` text.
pub const CREATE_TRAFFIC_STOPS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS traffic_stops (
    stop_date TEXT,
    stop_time TEXT,
    country_name TEXT,
    driver_gender TEXT,
    driver_age INTEGER,
    driver_race TEXT,
    is_arrested INTEGER,
    search_conducted INTEGER,
    search_type TEXT,
    stop_duration TEXT,
    drugs_related_stop INTEGER,
    violation TEXT,
    stop_outcome TEXT,
    vehicle_number TEXT
)
";

/// Key-value table holding the schema version.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Index backing per-vehicle grouping.
pub const CREATE_VEHICLE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_traffic_stops_vehicle ON traffic_stops(vehicle_number)
";

/// Index backing per-country grouping.
pub const CREATE_COUNTRY_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_traffic_stops_country ON traffic_stops(country_name)
";

/// Statements that make up the base schema.
pub const SCHEMA_STATEMENTS: &[&str] = &[CREATE_TRAFFIC_STOPS_TABLE, CREATE_METADATA_TABLE];
