/// Row id of a person card (`persons.id`, a PostgreSQL BIGSERIAL).
pub type DbId = i64;

/// Row creation and update times, stored as TIMESTAMPTZ and read back in UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
