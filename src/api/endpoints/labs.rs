//! Lab work endpoints: `/api/labs` and `/api/labs/:id`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{parse_id, ApiContext, ApiJson, ApiQuery, CallerContext};
use crate::labs::{self, LabWorkInput};
use crate::models::{LabWork, LabWorkFilter};

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiQuery(filter): ApiQuery<LabWorkFilter>,
) -> Result<Json<Vec<LabWork>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(labs::list_lab_work(&conn, caller.owner, &filter)?))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiJson(input): ApiJson<LabWorkInput>,
) -> Result<(StatusCode, Json<LabWork>), ApiError> {
    let conn = ctx.open_db()?;
    let lab = labs::record_lab_work(&conn, caller.owner, input)?;
    Ok((StatusCode::CREATED, Json(lab)))
}

pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<Json<LabWork>, ApiError> {
    let id = parse_id(&id)?;
    let conn = ctx.open_db()?;
    Ok(Json(labs::get_lab_work(&conn, caller.owner, id)?))
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    let conn = ctx.open_db()?;
    labs::delete_lab_work(&conn, caller.owner, id)?;
    Ok(StatusCode::NO_CONTENT)
}
