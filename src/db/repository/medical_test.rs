use std::str::FromStr;

use chrono::Utc;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::MedicalTestCategory;
use crate::models::{MedicalTest, MedicalTestFilter, Owner};

const SELECT_COLUMNS: &str = "SELECT id, date, category, test_name, facility, ordering_physician,
    results, impression, recommendations, follow_up, report_url FROM medical_tests";

pub fn insert_medical_test(
    conn: &Connection,
    owner: Owner,
    test: &MedicalTest,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medical_tests (id, user_id, guest_id, date, category, test_name,
         facility, ordering_physician, results, impression, recommendations, follow_up,
         report_url, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            test.id.to_string(),
            owner.user_id(),
            owner.guest_id(),
            format_timestamp(&test.date),
            test.category.as_str(),
            test.test_name,
            test.facility,
            test.ordering_physician,
            test.results,
            test.impression,
            test.recommendations,
            test.follow_up,
            test.report_url,
            format_timestamp(&Utc::now()),
        ],
    )?;
    Ok(())
}

pub fn get_medical_test(
    conn: &Connection,
    owner: Owner,
    id: &Uuid,
) -> Result<Option<MedicalTest>, DatabaseError> {
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

pub fn list_medical_tests(
    conn: &Connection,
    owner: Owner,
    filter: &MedicalTestFilter,
) -> Result<Vec<MedicalTest>, DatabaseError> {
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

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs.as_slice(), read_row)?;

    let needle = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut tests = Vec::new();
    for row in rows {
        let test = row?.into_model()?;
        if let Some(ref needle) = needle {
            if !test_matches(&test, needle) {
                continue;
            }
        }
        tests.push(test);
    }
    Ok(tests)
}

pub fn delete_medical_test(
    conn: &Connection,
    owner: Owner,
    id: &Uuid,
) -> Result<(), DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM medical_tests WHERE id = ?1 AND user_id IS ?2 AND guest_id IS ?3",
        params![id.to_string(), owner.user_id(), owner.guest_id()],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::not_found("MedicalTest", id));
    }
    Ok(())
}

fn test_matches(test: &MedicalTest, needle: &str) -> bool {
    let contains = |s: &str| s.to_lowercase().contains(needle);
    contains(&test.test_name)
        || contains(&test.results)
        || test.impression.as_deref().is_some_and(contains)
        || test.facility.as_deref().is_some_and(contains)
}

struct MedicalTestRow {
    id: String,
    date: String,
    category: String,
    test_name: String,
    facility: Option<String>,
    ordering_physician: Option<String>,
    results: String,
    impression: Option<String>,
    recommendations: Option<String>,
    follow_up: Option<String>,
    report_url: Option<String>,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<MedicalTestRow> {
    Ok(MedicalTestRow {
        id: row.get(0)?,
        date: row.get(1)?,
        category: row.get(2)?,
        test_name: row.get(3)?,
        facility: row.get(4)?,
        ordering_physician: row.get(5)?,
        results: row.get(6)?,
        impression: row.get(7)?,
        recommendations: row.get(8)?,
        follow_up: row.get(9)?,
        report_url: row.get(10)?,
    })
}

impl MedicalTestRow {
    fn into_model(self) -> Result<MedicalTest, DatabaseError> {
        Ok(MedicalTest {
            id: parse_uuid(&self.id)?,
            date: parse_timestamp(&self.date)?,
            category: MedicalTestCategory::from_str(&self.category)?,
            test_name: self.test_name,
            facility: self.facility,
            ordering_physician: self.ordering_physician,
            results: self.results,
            impression: self.impression,
            recommendations: self.recommendations,
            follow_up: self.follow_up,
            report_url: self.report_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use chrono::TimeZone;

    const GUEST: Owner = Owner::Guest(Uuid::from_u128(0x6e57));

    fn make_test(day: u32, category: MedicalTestCategory, name: &str) -> MedicalTest {
        MedicalTest {
            id: Uuid::new_v4(),
            date: Utc.with_ymd_and_hms(2025, 5, day, 14, 0, 0).unwrap(),
            category,
            test_name: name.into(),
            facility: Some("General Hospital".into()),
            ordering_physician: None,
            results: "No acute findings".into(),
            impression: Some("Mild sinus thickening".into()),
            recommendations: None,
            follow_up: Some("6 months".into()),
            report_url: None,
        }
    }

    #[test]
    fn insert_and_get_round_trip() {
        let conn = open_memory_database().unwrap();
        let test = make_test(4, MedicalTestCategory::Ct, "CT sinus");
        insert_medical_test(&conn, GUEST, &test).unwrap();
        let loaded = get_medical_test(&conn, GUEST, &test.id).unwrap().unwrap();
        assert_eq!(loaded, test);
    }

    #[test]
    fn list_filters_category_and_search() {
        let conn = open_memory_database().unwrap();
        let ct = make_test(1, MedicalTestCategory::Ct, "CT sinus");
        let mut ecg = make_test(2, MedicalTestCategory::Ecg, "Resting ECG");
        ecg.impression = Some("Sinus rhythm".into());
        ecg.facility = Some("Heart Center".into());
        insert_medical_test(&conn, GUEST, &ct).unwrap();
        insert_medical_test(&conn, GUEST, &ecg).unwrap();

        let all = list_medical_tests(&conn, GUEST, &MedicalTestFilter::default()).unwrap();
        assert_eq!(all[0].id, ecg.id);

        let filter = MedicalTestFilter {
            category: Some(MedicalTestCategory::Ct),
            ..Default::default()
        };
        let found = list_medical_tests(&conn, GUEST, &filter).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, ct.id);

        let filter = MedicalTestFilter {
            search: Some("HEART".into()),
            ..Default::default()
        };
        let found = list_medical_tests(&conn, GUEST, &filter).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, ecg.id);
    }

    #[test]
    fn delete_missing_is_not_found() {
        let conn = open_memory_database().unwrap();
        let err = delete_medical_test(&conn, GUEST, &Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }
}
