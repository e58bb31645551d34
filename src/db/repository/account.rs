use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use serde::Serialize;
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::User;

/// Stored credential material for one account.
pub struct UserCredentials {
    pub user: User,
    pub password_hash: Vec<u8>,
    pub password_salt: Vec<u8>,
}

/// Rows moved from the guest owner to an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimedCounts {
    pub health_logs: usize,
    pub lab_work: usize,
    pub medical_tests: usize,
    pub hypotheses: usize,
}

/// Duplicate emails (case-insensitive) surface as `ConstraintViolation`.
pub fn insert_user(
    conn: &Connection,
    user: &User,
    password_hash: &[u8],
    password_salt: &[u8],
) -> Result<(), DatabaseError> {
    let result = conn.execute(
        "INSERT INTO users (id, email, display_name, password_hash, password_salt, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user.id.to_string(),
            user.email,
            user.display_name,
            password_hash,
            password_salt,
            format_timestamp(&user.created_at),
        ],
    );
    match result {
        Ok(_) => Ok(()),
        Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
            Err(DatabaseError::ConstraintViolation(format!(
                "email already registered: {}",
                user.email
            )))
        }
        Err(e) => Err(e.into()),
    }
}

pub fn find_credentials_by_email(
    conn: &Connection,
    email: &str,
) -> Result<Option<UserCredentials>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, email, display_name, created_at, password_hash, password_salt
             FROM users WHERE email = ?1",
            params![email],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Vec<u8>>(4)?,
                    row.get::<_, Vec<u8>>(5)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((id, email, display_name, created_at, password_hash, password_salt)) => {
            Ok(Some(UserCredentials {
                user: User {
                    id: parse_uuid(&id)?,
                    email,
                    display_name,
                    created_at: parse_timestamp(&created_at)?,
                },
                password_hash,
                password_salt,
            }))
        }
        None => Ok(None),
    }
}

pub fn get_user(conn: &Connection, id: &Uuid) -> Result<Option<User>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT email, display_name, created_at FROM users WHERE id = ?1",
            params![id.to_string()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((email, display_name, created_at)) => Ok(Some(User {
            id: *id,
            email,
            display_name,
            created_at: parse_timestamp(&created_at)?,
        })),
        None => Ok(None),
    }
}

pub fn insert_session(
    conn: &Connection,
    token_hash: &[u8],
    user_id: &Uuid,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO sessions (token_hash, user_id, created_at) VALUES (?1, ?2, ?3)",
        params![token_hash, user_id.to_string(), format_timestamp(&Utc::now())],
    )?;
    Ok(())
}

/// Returns the stored hash alongside the owner so callers can compare in constant time.
pub fn find_session(
    conn: &Connection,
    token_hash: &[u8],
) -> Result<Option<(Vec<u8>, Uuid)>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT token_hash, user_id FROM sessions WHERE token_hash = ?1",
            params![token_hash],
            |row| Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()?;

    match row {
        Some((hash, user_id)) => Ok(Some((hash, parse_uuid(&user_id)?))),
        None => Ok(None),
    }
}

pub fn delete_session(conn: &Connection, token_hash: &[u8]) -> Result<(), DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM sessions WHERE token_hash = ?1",
        params![token_hash],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::not_found("Session", "<token>"));
    }
    Ok(())
}

/// Reassign the rows held under `guest_id` to `user_id`. Skipped (all zero)
/// when the user already owns health logs, so an existing journal never
/// absorbs a device's scratch data. Other guests' rows are untouched.
pub fn claim_guest_rows(
    conn: &Connection,
    user_id: &Uuid,
    guest_id: &Uuid,
) -> Result<ClaimedCounts, DatabaseError> {
    let uid = user_id.to_string();
    let gid = guest_id.to_string();
    let existing: i64 = conn.query_row(
        "SELECT COUNT(*) FROM health_logs WHERE user_id = ?1",
        params![uid],
        |row| row.get(0),
    )?;
    if existing > 0 {
        return Ok(ClaimedCounts::default());
    }

    let tx = conn.unchecked_transaction()?;
    let claim = |table: &str| {
        tx.execute(
            &format!(
                "UPDATE {table} SET user_id = ?1, guest_id = NULL
                 WHERE user_id IS NULL AND guest_id = ?2"
            ),
            params![uid, gid],
        )
    };
    let counts = ClaimedCounts {
        health_logs: claim("health_logs")?,
        lab_work: claim("lab_work")?,
        medical_tests: claim("medical_tests")?,
        hypotheses: claim("hypotheses")?,
    };
    tx.commit()?;
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{count_health_logs, insert_health_log};
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::Mood;
    use crate::models::{HealthLog, Owner};

    const GUEST_KEY: Uuid = Uuid::from_u128(0x6e57);
    const GUEST: Owner = Owner::Guest(GUEST_KEY);

    fn make_user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.into(),
            display_name: Some("Ama".into()),
            created_at: Utc::now(),
        }
    }

    fn make_log() -> HealthLog {
        HealthLog {
            id: Uuid::new_v4(),
            date: Utc::now(),
            symptoms: vec!["Headache".into()],
            medications: vec![],
            severity: 4,
            mood: Mood::Neutral,
            sleep: 7.0,
            notes: String::new(),
        }
    }

    #[test]
    fn insert_and_find_credentials() {
        let conn = open_memory_database().unwrap();
        let user = make_user("ama@example.com");
        insert_user(&conn, &user, &[1, 2, 3], &[9; 32]).unwrap();

        let creds = find_credentials_by_email(&conn, "ama@example.com").unwrap().unwrap();
        assert_eq!(creds.user.id, user.id);
        assert_eq!(creds.password_hash, vec![1, 2, 3]);
        assert_eq!(creds.password_salt.len(), 32);

        assert!(find_credentials_by_email(&conn, "nobody@example.com").unwrap().is_none());
        assert_eq!(get_user(&conn, &user.id).unwrap().unwrap().email, "ama@example.com");
    }

    #[test]
    fn duplicate_email_is_constraint_violation() {
        let conn = open_memory_database().unwrap();
        insert_user(&conn, &make_user("ama@example.com"), &[1], &[2]).unwrap();
        let err = insert_user(&conn, &make_user("AMA@example.com"), &[1], &[2]).unwrap_err();
        assert!(matches!(err, DatabaseError::ConstraintViolation(_)));
    }

    #[test]
    fn session_lifecycle() {
        let conn = open_memory_database().unwrap();
        let user = make_user("ama@example.com");
        insert_user(&conn, &user, &[1], &[2]).unwrap();

        insert_session(&conn, &[7; 32], &user.id).unwrap();
        let (hash, owner) = find_session(&conn, &[7; 32]).unwrap().unwrap();
        assert_eq!(hash, vec![7; 32]);
        assert_eq!(owner, user.id);

        delete_session(&conn, &[7; 32]).unwrap();
        assert!(find_session(&conn, &[7; 32]).unwrap().is_none());
        assert!(delete_session(&conn, &[7; 32]).is_err());
    }

    #[test]
    fn claim_moves_guest_rows_once() {
        let conn = open_memory_database().unwrap();
        let user = make_user("ama@example.com");
        insert_user(&conn, &user, &[1], &[2]).unwrap();
        insert_health_log(&conn, GUEST, &make_log()).unwrap();
        insert_health_log(&conn, GUEST, &make_log()).unwrap();

        let counts = claim_guest_rows(&conn, &user.id, &GUEST_KEY).unwrap();
        assert_eq!(counts.health_logs, 2);
        assert_eq!(count_health_logs(&conn, GUEST).unwrap(), 0);
        assert_eq!(count_health_logs(&conn, Owner::User(user.id)).unwrap(), 2);
    }

    #[test]
    fn claim_skipped_when_user_already_has_logs() {
        let conn = open_memory_database().unwrap();
        let user = make_user("ama@example.com");
        insert_user(&conn, &user, &[1], &[2]).unwrap();
        insert_health_log(&conn, Owner::User(user.id), &make_log()).unwrap();
        insert_health_log(&conn, GUEST, &make_log()).unwrap();

        let counts = claim_guest_rows(&conn, &user.id, &GUEST_KEY).unwrap();
        assert_eq!(counts, ClaimedCounts::default());
        assert_eq!(count_health_logs(&conn, GUEST).unwrap(), 1);
    }

    #[test]
    fn claim_leaves_other_guests_rows() {
        let conn = open_memory_database().unwrap();
        let user = make_user("ama@example.com");
        insert_user(&conn, &user, &[1], &[2]).unwrap();
        let other = Owner::Guest(Uuid::new_v4());
        insert_health_log(&conn, GUEST, &make_log()).unwrap();
        insert_health_log(&conn, other, &make_log()).unwrap();
        insert_health_log(&conn, other, &make_log()).unwrap();

        let counts = claim_guest_rows(&conn, &user.id, &GUEST_KEY).unwrap();
        assert_eq!(counts.health_logs, 1);
        assert_eq!(count_health_logs(&conn, other).unwrap(), 2);
        assert_eq!(count_health_logs(&conn, Owner::User(user.id)).unwrap(), 1);
    }
}
