use std::str::FromStr;

use chrono::Utc;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::{LabCategory, LabTestStatus};
use crate::models::{LabTest, LabWork, LabWorkFilter, Owner};

const SELECT_COLUMNS: &str = "SELECT id, date, category, lab_name, ordering_physician,
    overall_notes, report_url FROM lab_work";

/// Insert a panel and its tests atomically. Test order is preserved.
pub fn insert_lab_work(
    conn: &Connection,
    owner: Owner,
    lab: &LabWork,
) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO lab_work (id, user_id, guest_id, date, category, lab_name,
         ordering_physician, overall_notes, report_url, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            lab.id.to_string(),
            owner.user_id(),
            owner.guest_id(),
            format_timestamp(&lab.date),
            lab.category.as_str(),
            lab.lab_name,
            lab.ordering_physician,
            lab.overall_notes,
            lab.report_url,
            format_timestamp(&Utc::now()),
        ],
    )?;

    for (position, test) in lab.tests.iter().enumerate() {
        tx.execute(
            "INSERT INTO lab_tests (id, lab_work_id, position, name, value, unit,
             reference_range, status, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                test.id.to_string(),
                lab.id.to_string(),
                position as i64,
                test.name,
                test.value,
                test.unit,
                test.reference_range,
                test.status.map(|s| s.as_str()),
                test.notes,
            ],
        )?;
    }
    tx.commit()?;
    Ok(())
}

pub fn get_lab_work(
    conn: &Connection,
    owner: Owner,
    id: &Uuid,
) -> Result<Option<LabWork>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "{SELECT_COLUMNS} WHERE id = ?1 AND user_id IS ?2 AND guest_id IS ?3"
    ))?;
    let row = stmt
        .query_map(params![id.to_string(), owner.user_id(), owner.guest_id()], read_row)?
        .next()
        .transpose()?;

    match row {
        Some(row) => {
            let tests = load_tests(conn, &row.id)?;
            Ok(Some(row.into_model(tests)?))
        }
        None => Ok(None),
    }
}

/// Panels newest first. Category narrows in SQL; status and search need the
/// child tests, so they are applied after loading.
pub fn list_lab_work(
    conn: &Connection,
    owner: Owner,
    filter: &LabWorkFilter,
) -> Result<Vec<LabWork>, DatabaseError> {
    let mut sql = format!("{SELECT_COLUMNS} WHERE user_id IS ?1 AND guest_id IS ?2");
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> =
        vec![Box::new(owner.user_id()), Box::new(owner.guest_id())];

    if let Some(category) = filter.category {
        params_vec.push(Box::new(category.as_str()));
        sql.push_str(&format!(" AND category = ?{}", params_vec.len()));
    }
    sql.push_str(" ORDER BY date DESC");

    let param_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();

    let rows = {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(param_refs.as_slice(), read_row)?;
        rows.collect::<Result<Vec<_>, _>>()?
    };

    let needle = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut labs = Vec::with_capacity(rows.len());
    for row in rows {
        let tests = load_tests(conn, &row.id)?;
        let lab = row.into_model(tests)?;

        if let Some(status) = filter.status {
            if !lab.tests.iter().any(|t| t.status == Some(status)) {
                continue;
            }
        }
        if let Some(ref needle) = needle {
            if !lab_matches(&lab, needle) {
                continue;
            }
        }
        labs.push(lab);
    }
    Ok(labs)
}

/// Child tests go with the panel via ON DELETE CASCADE.
pub fn delete_lab_work(conn: &Connection, owner: Owner, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM lab_work WHERE id = ?1 AND user_id IS ?2 AND guest_id IS ?3",
        params![id.to_string(), owner.user_id(), owner.guest_id()],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::not_found("LabWork", id));
    }
    Ok(())
}

fn lab_matches(lab: &LabWork, needle: &str) -> bool {
    let contains = |s: &str| s.to_lowercase().contains(needle);
    contains(&lab.lab_name)
        || lab.ordering_physician.as_deref().is_some_and(contains)
        || lab.overall_notes.as_deref().is_some_and(contains)
        || lab.tests.iter().any(|t| {
            contains(&t.name) || contains(&t.value) || t.notes.as_deref().is_some_and(contains)
        })
}

fn load_tests(conn: &Connection, lab_work_id: &str) -> Result<Vec<LabTest>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, value, unit, reference_range, status, notes
         FROM lab_tests WHERE lab_work_id = ?1 ORDER BY position",
    )?;
    let rows = stmt.query_map(params![lab_work_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, Option<String>>(5)?,
            row.get::<_, Option<String>>(6)?,
        ))
    })?;

    let mut tests = Vec::new();
    for row in rows {
        let (id, name, value, unit, reference_range, status, notes) = row?;
        tests.push(LabTest {
            id: parse_uuid(&id)?,
            name,
            value,
            unit,
            reference_range,
            status: status.as_deref().map(LabTestStatus::from_str).transpose()?,
            notes,
        });
    }
    Ok(tests)
}

struct LabWorkRow {
    id: String,
    date: String,
    category: String,
    lab_name: String,
    ordering_physician: Option<String>,
    overall_notes: Option<String>,
    report_url: Option<String>,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<LabWorkRow> {
    Ok(LabWorkRow {
        id: row.get(0)?,
        date: row.get(1)?,
        category: row.get(2)?,
        lab_name: row.get(3)?,
        ordering_physician: row.get(4)?,
        overall_notes: row.get(5)?,
        report_url: row.get(6)?,
    })
}

impl LabWorkRow {
    fn into_model(self, tests: Vec<LabTest>) -> Result<LabWork, DatabaseError> {
        Ok(LabWork {
            id: parse_uuid(&self.id)?,
            date: parse_timestamp(&self.date)?,
            category: LabCategory::from_str(&self.category)?,
            lab_name: self.lab_name,
            ordering_physician: self.ordering_physician,
            tests,
            overall_notes: self.overall_notes,
            report_url: self.report_url,
        })
    }
}
