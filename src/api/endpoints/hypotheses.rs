//! Saved hypothesis endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{parse_id, ApiContext, ApiJson, CallerContext};
use crate::hypotheses::{self, HypothesisInput};
use crate::models::Hypothesis;

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
) -> Result<Json<Vec<Hypothesis>>, ApiError> {
    let conn = ctx.open_db()?;
    Ok(Json(hypotheses::list_hypotheses(&conn, caller.owner)?))
}

pub async fn save(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiJson(input): ApiJson<HypothesisInput>,
) -> Result<(StatusCode, Json<Hypothesis>), ApiError> {
    let conn = ctx.open_db()?;
    let saved = hypotheses::save_hypothesis(&conn, caller.owner, input)?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    let conn = ctx.open_db()?;
    hypotheses::delete_hypothesis(&conn, caller.owner, id)?;
    Ok(StatusCode::NO_CONTENT)
}
