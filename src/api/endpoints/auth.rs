//! Account endpoints.
//!
//! - `POST /api/auth/register`
//! - `POST /api/auth/signin`
//! - `POST /api/auth/signout` (token required)
//! - `POST /api/auth/claim-guest-data` (token and `X-Guest-Id` required)

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::accounts::{self, RegisterRequest, SessionGrant, SignInRequest};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, CallerContext};
use crate::db::ClaimedCounts;
use crate::models::User;

/// Password stretching is CPU-bound, so both credential endpoints run on
/// the blocking pool.
pub async fn register(
    State(ctx): State<ApiContext>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let core = ctx.core.clone();
    let user = tokio::task::spawn_blocking(move || -> Result<User, ApiError> {
        let conn = core.open_db()?;
        Ok(accounts::register(&conn, request)?)
    })
    .await??;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn signin(
    State(ctx): State<ApiContext>,
    ApiJson(request): ApiJson<SignInRequest>,
) -> Result<Json<SessionGrant>, ApiError> {
    let core = ctx.core.clone();
    let grant = tokio::task::spawn_blocking(move || -> Result<SessionGrant, ApiError> {
        let conn = core.open_db()?;
        Ok(accounts::sign_in(&conn, request)?)
    })
    .await??;
    Ok(Json(grant))
}

pub async fn signout(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
) -> Result<StatusCode, ApiError> {
    let (_, token) = caller.require_user()?;
    let conn = ctx.open_db()?;
    accounts::sign_out(&conn, token)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn claim_guest_data(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
) -> Result<Json<ClaimedCounts>, ApiError> {
    let (user_id, _) = caller.require_user()?;
    let guest_id = caller.require_guest_id()?;
    let conn = ctx.open_db()?;
    Ok(Json(accounts::claim_guest_data(&conn, user_id, guest_id)?))
}
