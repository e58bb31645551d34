//! Medical test endpoints: `/api/medical-tests` and `/api/medical-tests/:id`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{parse_id, ApiContext, ApiJson, ApiQuery, CallerContext};
use crate::labs::{self, MedicalTestInput};
use crate::models::{MedicalTest, MedicalTestFilter};

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiQuery(filter): ApiQuery<MedicalTestFilter>,
) -> Result<Json<Vec<MedicalTest>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(labs::list_medical_tests(&conn, caller.owner, &filter)?))
}

pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiJson(input): ApiJson<MedicalTestInput>,
) -> Result<(StatusCode, Json<MedicalTest>), ApiError> {
    let conn = ctx.open_db()?;
    let test = labs::record_medical_test(&conn, caller.owner, input)?;
    Ok((StatusCode::CREATED, Json(test)))
}

pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<Json<MedicalTest>, ApiError> {
    let id = parse_id(&id)?;
    let conn = ctx.open_db()?;
    Ok(Json(labs::get_medical_test(&conn, caller.owner, id)?))
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    let conn = ctx.open_db()?;
    labs::delete_medical_test(&conn, caller.owner, id)?;
    Ok(StatusCode::NO_CONTENT)
}
