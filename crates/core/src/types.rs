/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Opaque correlation key generated once at submission and echoed by the
/// external worker on every callback.
pub type TaskId = String;
