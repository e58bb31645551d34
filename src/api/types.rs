//! Shared types for the API layer.

use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::Json;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::core_state::CoreState;
use crate::models::Owner;

// ═══════════════════════════════════════════════════════════
// API context
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }

    pub fn open_db(&self) -> Result<rusqlite::Connection, ApiError> {
        Ok(self.core.open_db()?)
    }
}

// ═══════════════════════════════════════════════════════════
// Caller identity, injected by the auth middleware
// ═══════════════════════════════════════════════════════════

/// Header carrying the client-held guest key.
pub const GUEST_ID_HEADER: &str = "x-guest-id";

/// Who is calling. Guests carry no token; a signed-in caller may still send
/// the guest key it used before signing in, for the data claim.
#[derive(Debug, Clone)]
pub struct CallerContext {
    pub owner: Owner,
    pub token: Option<String>,
    pub guest_id: Option<Uuid>,
}

impl CallerContext {
    pub fn guest(guest_id: Uuid) -> Self {
        Self {
            owner: Owner::Guest(guest_id),
            token: None,
            guest_id: Some(guest_id),
        }
    }

    /// Account id and raw token, or 401 for guests.
    pub fn require_user(&self) -> Result<(Uuid, &str), ApiError> {
        match (&self.owner, self.token.as_deref()) {
            (Owner::User(id), Some(token)) => Ok((*id, token)),
            _ => Err(ApiError::Unauthorized),
        }
    }

    /// Guest key sent alongside the bearer token, or 400.
    pub fn require_guest_id(&self) -> Result<Uuid, ApiError> {
        self.guest_id
            .ok_or_else(|| ApiError::BadRequest("X-Guest-Id header is required".into()))
    }
}

/// Guest key from `X-Guest-Id`. `Ok(None)` when absent; a value that is not a
/// UUID is rejected.
pub fn guest_id(headers: &HeaderMap) -> Result<Option<Uuid>, ApiError> {
    let Some(value) = headers.get(GUEST_ID_HEADER) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .map(Some)
        .ok_or_else(|| ApiError::BadRequest("Invalid X-Guest-Id header".into()))
}

/// Bearer token from the `Authorization` header.
///
/// `Ok(None)` when the header is absent; a present but malformed header is an error.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(value) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };
    let token = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(ApiError::Unauthorized)?;
    Ok(Some(token.to_string()))
}

/// Parse a path id.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid ID format".into()))
}

// ═══════════════════════════════════════════════════════════
// Extractors that reject with the API error envelope
// ═══════════════════════════════════════════════════════════

/// JSON body. Malformed or mistyped bodies become a 400 `BAD_REQUEST`.
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Query string. Unparseable parameters become a 400 `BAD_REQUEST`.
pub struct ApiQuery<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}
