//! Repository layer: entity-scoped, owner-filtered database operations.
//!
//! Every journal query is filtered by the owner columns. A signed-in caller
//! matches on `user_id` with a NULL `guest_id`; a guest matches on its
//! `guest_id` with a NULL `user_id`. Binding both through
//! `user_id IS ?a AND guest_id IS ?b` covers either case with one statement.

mod account;
mod health_log;
mod hypothesis;
mod lab_work;
mod medical_test;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use super::DatabaseError;

pub use account::*;
pub use health_log::*;
pub use hypothesis::*;
pub use lab_work::*;
pub use medical_test::*;

/// Fixed-width RFC 3339 so that text ordering in SQLite is chronological.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad timestamp {raw}: {e}")))
}

pub(crate) fn parse_uuid(raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}
