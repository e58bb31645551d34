use std::str::FromStr;

use chrono::Utc;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::Mood;
use crate::models::{HealthLog, LogFilter, Owner};

const SELECT_COLUMNS: &str =
    "SELECT id, date, symptoms, medications, severity, mood, sleep, notes FROM health_logs";

pub fn insert_health_log(
    conn: &Connection,
    owner: Owner,
    log: &HealthLog,
) -> Result<(), DatabaseError> {
    let now = format_timestamp(&Utc::now());
    conn.execute(
        "INSERT INTO health_logs (id, user_id, guest_id, date, symptoms, medications,
         severity, mood, sleep, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
        params![
            log.id.to_string(),
            owner.user_id(),
            owner.guest_id(),
            format_timestamp(&log.date),
            serde_json::to_string(&log.symptoms)?,
            serde_json::to_string(&log.medications)?,
            log.severity as i32,
            log.mood.as_str(),
            log.sleep,
            log.notes,
            now,
        ],
    )?;
    Ok(())
}

/// Replaces every field of an existing log. NotFound when the owner does not own it.
pub fn update_health_log(
    conn: &Connection,
    owner: Owner,
    log: &HealthLog,
) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE health_logs SET date = ?1, symptoms = ?2, medications = ?3, severity = ?4,
         mood = ?5, sleep = ?6, notes = ?7, updated_at = ?8
         WHERE id = ?9 AND user_id IS ?10 AND guest_id IS ?11",
        params![
            format_timestamp(&log.date),
            serde_json::to_string(&log.symptoms)?,
            serde_json::to_string(&log.medications)?,
            log.severity as i32,
            log.mood.as_str(),
            log.sleep,
            log.notes,
            format_timestamp(&Utc::now()),
            log.id.to_string(),
            owner.user_id(),
            owner.guest_id(),
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::not_found("HealthLog", log.id));
    }
    Ok(())
}

pub fn delete_health_log(conn: &Connection, owner: Owner, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM health_logs WHERE id = ?1 AND user_id IS ?2 AND guest_id IS ?3",
        params![id.to_string(), owner.user_id(), owner.guest_id()],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::not_found("HealthLog", id));
    }
    Ok(())
}

pub fn get_health_log(
    conn: &Connection,
    owner: Owner,
    id: &Uuid,
) -> Result<Option<HealthLog>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_COLUMNS} WHERE id = ?1 AND user_id IS ?2 AND guest_id IS ?3"
    ))?;
    let mut rows = stmt.query_map(
        params![id.to_string(), owner.user_id(), owner.guest_id()],
        read_row,
    )?;
    match rows.next() {
        Some(row) => Ok(Some(row?.into_model()?)),
        None => Ok(None),
    }
}

/// Logs for the owner, newest first, with severity/mood narrowed in SQL and
/// the free-text search applied over the decoded lists.
pub fn list_health_logs(
    conn: &Connection,
    owner: Owner,
    filter: &LogFilter,
) -> Result<Vec<HealthLog>, DatabaseError> {
    let mut sql = format!("{SELECT_COLUMNS} WHERE user_id IS ?1 AND guest_id IS ?2");
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> =
        vec![Box::new(owner.user_id()), Box::new(owner.guest_id())];

    if let Some(min) = filter.severity_min {
        params_vec.push(Box::new(min as i32));
        sql.push_str(&format!(" AND severity >= ?{}", params_vec.len()));
    }
    if let Some(max) = filter.severity_max {
        params_vec.push(Box::new(max as i32));
        sql.push_str(&format!(" AND severity <= ?{}", params_vec.len()));
    }
    if let Some(mood) = filter.mood {
        params_vec.push(Box::new(mood.as_str()));
        sql.push_str(&format!(" AND mood = ?{}", params_vec.len()));
    }
    sql.push_str(" ORDER BY date DESC");

    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), read_row)?;

    let needle = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut logs = Vec::new();
    for row in rows {
        let log = row?.into_model()?;
        if let Some(ref needle) = needle {
            if !log_matches(&log, needle) {
                continue;
            }
        }
        logs.push(log);
    }
    Ok(logs)
}

pub fn count_health_logs(conn: &Connection, owner: Owner) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM health_logs WHERE user_id IS ?1 AND guest_id IS ?2",
        params![owner.user_id(), owner.guest_id()],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}

fn log_matches(log: &HealthLog, needle: &str) -> bool {
    log.symptoms.iter().any(|s| s.to_lowercase().contains(needle))
        || log.medications.iter().any(|m| m.to_lowercase().contains(needle))
        || log.notes.to_lowercase().contains(needle)
}

struct HealthLogRow {
    id: String,
    date: String,
    symptoms: String,
    medications: String,
    severity: i32,
    mood: String,
    sleep: f64,
    notes: String,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<HealthLogRow> {
    Ok(HealthLogRow {
        id: row.get(0)?,
        date: row.get(1)?,
        symptoms: row.get(2)?,
        medications: row.get(3)?,
        severity: row.get(4)?,
        mood: row.get(5)?,
        sleep: row.get(6)?,
        notes: row.get(7)?,
    })
}

impl HealthLogRow {
    fn into_model(self) -> Result<HealthLog, DatabaseError> {
        Ok(HealthLog {
            id: parse_uuid(&self.id)?,
            date: parse_timestamp(&self.date)?,
            symptoms: serde_json::from_str(&self.symptoms)?,
            medications: serde_json::from_str(&self.medications)?,
            severity: u8::try_from(self.severity).map_err(|_| {
                DatabaseError::ConstraintViolation(format!("severity {}", self.severity))
            })?,
            mood: Mood::from_str(&self.mood)?,
            sleep: self.sleep,
            notes: self.notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use chrono::{DateTime, TimeZone};

    const GUEST: Owner = Owner::Guest(Uuid::from_u128(0x6e57));

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, day, 9, 0, 0).unwrap()
    }

    fn make_log(day: u32, symptoms: &[&str], severity: u8, mood: Mood) -> HealthLog {
        HealthLog {
            id: Uuid::new_v4(),
            date: at(day),
            symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
            medications: vec!["Ibuprofen".into()],
            severity,
            mood,
            sleep: 6.5,
            notes: String::new(),
        }
    }

    #[test]
    fn insert_and_get_round_trip() {
        let conn = test_db();
        let mut log = make_log(3, &["Headache", "Nausea, mild"], 6, Mood::Poor);
        log.notes = "Worse after coffee".into();
        insert_health_log(&conn, GUEST, &log).unwrap();

        let loaded = get_health_log(&conn, GUEST, &log.id).unwrap().unwrap();
        assert_eq!(loaded, log);
    }

    #[test]
    fn owner_scoping_isolates_rows() {
        let conn = test_db();
        let user = Owner::User(Uuid::new_v4());
        let guest_log = make_log(1, &["Fatigue"], 3, Mood::Neutral);
        let user_log = make_log(2, &["Cough"], 4, Mood::Good);
        insert_health_log(&conn, GUEST, &guest_log).unwrap();
        insert_health_log(&conn, user, &user_log).unwrap();

        let guest_rows = list_health_logs(&conn, GUEST, &LogFilter::default()).unwrap();
        assert_eq!(guest_rows.len(), 1);
        assert_eq!(guest_rows[0].id, guest_log.id);

        let user_rows = list_health_logs(&conn, user, &LogFilter::default()).unwrap();
        assert_eq!(user_rows.len(), 1);
        assert_eq!(user_rows[0].id, user_log.id);

        assert!(get_health_log(&conn, GUEST, &user_log.id).unwrap().is_none());
    }

    #[test]
    fn guest_keys_do_not_share_rows() {
        let conn = test_db();
        let other = Owner::Guest(Uuid::new_v4());
        let mine = make_log(1, &["Fatigue"], 3, Mood::Neutral);
        insert_health_log(&conn, GUEST, &mine).unwrap();

        assert!(list_health_logs(&conn, other, &LogFilter::default()).unwrap().is_empty());
        assert!(get_health_log(&conn, other, &mine.id).unwrap().is_none());
        assert!(update_health_log(&conn, other, &mine).is_err());
        assert!(delete_health_log(&conn, other, &mine.id).is_err());
        assert_eq!(count_health_logs(&conn, GUEST).unwrap(), 1);
    }

    #[test]
    fn list_is_newest_first() {
        let conn = test_db();
        for day in [5, 1, 9] {
            insert_health_log(&conn, GUEST, &make_log(day, &["Headache"], 3, Mood::Good))
                .unwrap();
        }
        let logs = list_health_logs(&conn, GUEST, &LogFilter::default()).unwrap();
        let days: Vec<DateTime<Utc>> = logs.iter().map(|l| l.date).collect();
        assert_eq!(days, vec![at(9), at(5), at(1)]);
    }

    #[test]
    fn filter_by_severity_range_and_mood() {
        let conn = test_db();
        insert_health_log(&conn, GUEST, &make_log(1, &["A"], 2, Mood::Good)).unwrap();
        insert_health_log(&conn, GUEST, &make_log(2, &["B"], 5, Mood::Poor)).unwrap();
        insert_health_log(&conn, GUEST, &make_log(3, &["C"], 9, Mood::Poor)).unwrap();

        let filter = LogFilter {
            severity_min: Some(4),
            severity_max: Some(6),
            ..Default::default()
        };
        let logs = list_health_logs(&conn, GUEST, &filter).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].symptoms, vec!["B".to_string()]);

        let filter = LogFilter {
            mood: Some(Mood::Poor),
            ..Default::default()
        };
        assert_eq!(list_health_logs(&conn, GUEST, &filter).unwrap().len(), 2);
    }

    #[test]
    fn search_is_case_insensitive_over_lists_and_notes() {
        let conn = test_db();
        let mut with_note = make_log(1, &["Fatigue"], 3, Mood::Good);
        with_note.notes = "Skipped LUNCH".into();
        insert_health_log(&conn, GUEST, &with_note).unwrap();
        insert_health_log(&conn, GUEST, &make_log(2, &["Migraine"], 7, Mood::Poor))
            .unwrap();

        let by_symptom = LogFilter {
            search: Some("migr".into()),
            ..Default::default()
        };
        assert_eq!(list_health_logs(&conn, GUEST, &by_symptom).unwrap().len(), 1);

        let by_note = LogFilter {
            search: Some("lunch".into()),
            ..Default::default()
        };
        let found = list_health_logs(&conn, GUEST, &by_note).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, with_note.id);

        let by_med = LogFilter {
            search: Some("ibuprofen".into()),
            ..Default::default()
        };
        assert_eq!(list_health_logs(&conn, GUEST, &by_med).unwrap().len(), 2);
    }

    #[test]
    fn update_replaces_fields() {
        let conn = test_db();
        let mut log = make_log(1, &["Headache"], 3, Mood::Good);
        insert_health_log(&conn, GUEST, &log).unwrap();

        log.symptoms = vec!["Dizziness".into()];
        log.severity = 8;
        log.sleep = 4.0;
        update_health_log(&conn, GUEST, &log).unwrap();

        let loaded = get_health_log(&conn, GUEST, &log.id).unwrap().unwrap();
        assert_eq!(loaded.symptoms, vec!["Dizziness".to_string()]);
        assert_eq!(loaded.severity, 8);
        assert_eq!(loaded.sleep, 4.0);
    }

    #[test]
    fn update_of_foreign_row_is_not_found() {
        let conn = test_db();
        let log = make_log(1, &["Headache"], 3, Mood::Good);
        insert_health_log(&conn, Owner::User(Uuid::new_v4()), &log).unwrap();
        let err = update_health_log(&conn, GUEST, &log).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn delete_removes_row_and_reports_missing() {
        let conn = test_db();
        let log = make_log(1, &["Headache"], 3, Mood::Good);
        insert_health_log(&conn, GUEST, &log).unwrap();
        delete_health_log(&conn, GUEST, &log.id).unwrap();
        assert_eq!(count_health_logs(&conn, GUEST).unwrap(), 0);

        let err = delete_health_log(&conn, GUEST, &log.id).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn severity_check_constraint_rejects_out_of_range() {
        let conn = test_db();
        let log = make_log(1, &["Headache"], 11, Mood::Good);
        assert!(insert_health_log(&conn, GUEST, &log).is_err());
    }
}
