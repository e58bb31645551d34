//! Health log endpoints.
//!
//! - `GET /api/logs` / `POST /api/logs`
//! - `GET /api/logs/stats`
//! - `GET|PUT|DELETE /api/logs/:id`

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{parse_id, ApiContext, ApiJson, ApiQuery, CallerContext};
use crate::journal::{self, HealthLogInput, LogStats};
use crate::models::{HealthLog, LogFilter};

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiQuery(filter): ApiQuery<LogFilter>,
) -> Result<Json<Vec<HealthLog>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(journal::list_logs(&conn, caller.owner, &filter)?))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiJson(input): ApiJson<HealthLogInput>,
) -> Result<(StatusCode, Json<HealthLog>), ApiError> {
    let conn = ctx.open_db()?;
    let log = journal::record_log(&conn, caller.owner, input)?;
    Ok((StatusCode::CREATED, Json(log)))
}

pub async fn stats(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
) -> Result<Json<LogStats>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(journal::log_stats(&conn, caller.owner)?))
}

pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<Json<HealthLog>, ApiError> {
    let id = parse_id(&id)?;
    let conn = ctx.open_db()?;
    Ok(Json(journal::get_log(&conn, caller.owner, id)?))
}

pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<HealthLogInput>,
) -> Result<Json<HealthLog>, ApiError> {
    let id = parse_id(&id)?;
    let conn = ctx.open_db()?;
    Ok(Json(journal::update_log(&conn, caller.owner, id, input)?))
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    let conn = ctx.open_db()?;
    journal::delete_log(&conn, caller.owner, id)?;
    Ok(StatusCode::NO_CONTENT)
}
