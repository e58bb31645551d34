use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::{Hypothesis, Owner};

pub fn insert_hypothesis(
    conn: &Connection,
    owner: Owner,
    hypothesis: &Hypothesis,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO hypotheses (id, user_id, guest_id, hypothesis, confidence,
         data_points_count, hypothesis_type, evidence, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            hypothesis.id.to_string(),
            owner.user_id(),
            owner.guest_id(),
            hypothesis.hypothesis,
            hypothesis.confidence,
            hypothesis.data_points_count,
            hypothesis.hypothesis_type,
            hypothesis.evidence,
            format_timestamp(&hypothesis.created_at),
        ],
    )?;
    Ok(())
}

/// Newest first.
pub fn list_hypotheses(conn: &Connection, owner: Owner) -> Result<Vec<Hypothesis>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, hypothesis, confidence, data_points_count, hypothesis_type, evidence,
         created_at FROM hypotheses WHERE user_id IS ?1 AND guest_id IS ?2
         ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map(params![owner.user_id(), owner.guest_id()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, f64>(2)?,
            row.get::<_, u32>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, Option<String>>(5)?,
            row.get::<_, String>(6)?,
        ))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (id, hypothesis, confidence, data_points_count, hypothesis_type, evidence, created) =
            row?;
        out.push(Hypothesis {
            id: parse_uuid(&id)?,
            hypothesis,
            confidence,
            data_points_count,
            hypothesis_type,
            evidence,
            created_at: parse_timestamp(&created)?,
        });
    }
    Ok(out)
}

pub fn delete_hypothesis(conn: &Connection, owner: Owner, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM hypotheses WHERE id = ?1 AND user_id IS ?2 AND guest_id IS ?3",
        params![id.to_string(), owner.user_id(), owner.guest_id()],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::not_found("Hypothesis", id));
    }
    Ok(())
}
