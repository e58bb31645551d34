//! Email/password accounts with opaque bearer-token sessions.
//!
//! Passwords are stretched with PBKDF2-HMAC-SHA256 under a per-user random
//! salt. Session tokens are 32 random bytes handed to the client once; only
//! their SHA-256 hash is stored.

use chrono::Utc;
use pbkdf2::pbkdf2_hmac;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{self, ClaimedCounts, DatabaseError, UserCredentials};
use crate::models::User;
use crate::validation::{clean_optional, ValidationError};

#[cfg(not(test))]
pub const PBKDF2_ITERATIONS: u32 = 600_000;
#[cfg(test)]
pub const PBKDF2_ITERATIONS: u32 = 1_000;
pub const HASH_LENGTH: usize = 32;
pub const SALT_LENGTH: usize = 32;
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Salt hashed against when no account matches, so a miss costs the same
/// PBKDF2 work as a wrong password.
static DUMMY_SALT: [u8; SALT_LENGTH] = [0x5a; SALT_LENGTH];

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid or expired session")]
    InvalidSession,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Returned once at sign-in. The token is not recoverable afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGrant {
    pub token: String,
    pub user: User,
}

// ═══════════════════════════════════════════
// Credential primitives
// ═══════════════════════════════════════════

pub fn hash_password(password: &str, salt: &[u8]) -> [u8; HASH_LENGTH] {
    let mut out = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut out);
    out
}

pub fn generate_salt() -> [u8; SALT_LENGTH] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

/// Hash a bearer token string using SHA-256.
pub fn hash_token(token: &str) -> [u8; 32] {
    use sha2::Digest;
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Check `password` against stored credentials. The hash runs even when
/// `creds` is `None`.
pub fn verify_password(password: &str, creds: Option<&UserCredentials>) -> bool {
    let salt = creds.map_or(&DUMMY_SALT[..], |c| c.password_salt.as_slice());
    let candidate = hash_password(password, salt);
    match creds {
        Some(c) => candidate.as_slice().ct_eq(c.password_hash.as_slice()).unwrap_u8() == 1,
        None => false,
    }
}

fn normalize_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ValidationError::Required("email"));
    }
    if !email.contains('@') {
        return Err(ValidationError::Invalid {
            field: "email",
            reason: "must contain @".into(),
        });
    }
    Ok(email)
}

// ═══════════════════════════════════════════
// Operations
// ═══════════════════════════════════════════

pub fn register(conn: &Connection, request: RegisterRequest) -> Result<User, AccountError> {
    let email = normalize_email(&request.email)?;
    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::Invalid {
            field: "password",
            reason: format!("must be at least {MIN_PASSWORD_LENGTH} characters"),
        }
        .into());
    }

    let user = User {
        id: Uuid::new_v4(),
        email,
        display_name: clean_optional(request.display_name.as_deref()),
        created_at: Utc::now(),
    };
    let salt = generate_salt();
    let hash = hash_password(&request.password, &salt);

    match db::insert_user(conn, &user, &hash, &salt) {
        Ok(()) => {}
        Err(DatabaseError::ConstraintViolation(_)) => return Err(AccountError::EmailTaken),
        Err(e) => return Err(e.into()),
    }
    tracing::info!(user_id = %user.id, "Account registered");
    Ok(user)
}

pub fn sign_in(conn: &Connection, request: SignInRequest) -> Result<SessionGrant, AccountError> {
    let email = normalize_email(&request.email).map_err(|_| AccountError::InvalidCredentials)?;
    let found = db::find_credentials_by_email(conn, &email)?;

    let verified = verify_password(&request.password, found.as_ref());
    let creds = match found {
        Some(creds) if verified => creds,
        Some(creds) => {
            tracing::warn!(user_id = %creds.user.id, "Sign-in rejected: wrong password");
            return Err(AccountError::InvalidCredentials);
        }
        None => return Err(AccountError::InvalidCredentials),
    };

    let token = generate_token();
    db::insert_session(conn, &hash_token(&token), &creds.user.id)?;
    tracing::info!(user_id = %creds.user.id, "Session opened");
    Ok(SessionGrant {
        token,
        user: creds.user,
    })
}

pub fn sign_out(conn: &Connection, token: &str) -> Result<(), AccountError> {
    match db::delete_session(conn, &hash_token(token)) {
        Ok(()) => Ok(()),
        Err(DatabaseError::NotFound { .. }) => Err(AccountError::InvalidSession),
        Err(e) => Err(e.into()),
    }
}

/// Map a bearer token to its account.
pub fn resolve(conn: &Connection, token: &str) -> Result<Uuid, AccountError> {
    let token_hash = hash_token(token);
    let (stored_hash, user_id) =
        db::find_session(conn, &token_hash)?.ok_or(AccountError::InvalidSession)?;
    if stored_hash.as_slice().ct_eq(token_hash.as_slice()).unwrap_u8() == 0 {
        return Err(AccountError::InvalidSession);
    }
    Ok(user_id)
}

/// Move the rows held under `guest_id` into the account unless it already
/// has a journal.
pub fn claim_guest_data(
    conn: &Connection,
    user_id: Uuid,
    guest_id: Uuid,
) -> Result<ClaimedCounts, AccountError> {
    let counts = db::claim_guest_rows(conn, &user_id, &guest_id)?;
    tracing::info!(
        user_id = %user_id,
        guest_id = %guest_id,
        health_logs = counts.health_logs,
        lab_work = counts.lab_work,
        medical_tests = counts.medical_tests,
        hypotheses = counts.hypotheses,
        "Guest data claimed"
    );
    Ok(counts)
}
