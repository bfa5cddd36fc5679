/// Master-data ids are stored as PostgreSQL BIGINT.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Seconds since the Unix epoch. `0` means "absent".
pub type EpochSecs = i64;
