//! `POST /api/community/search`: forum posts describing similar symptoms.

use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, CallerContext};
use crate::community::{CommunitySearchResult, SearchMode};
use crate::journal;
use crate::models::{HealthLog, LogFilter};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityBody {
    #[serde(default)]
    pub mode: SearchMode,
    /// Falls back to the caller's stored logs when omitted.
    pub logs: Option<Vec<HealthLog>>,
}

pub async fn search(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiJson(body): ApiJson<CommunityBody>,
) -> Result<Json<CommunitySearchResult>, ApiError> {
    let logs = match body.logs {
        Some(logs) => logs,
        None => {
            let conn = ctx.open_db()?;
            journal::list_logs(&conn, caller.owner, &LogFilter::default())?
        }
    };

    let core = ctx.core.clone();
    let mode = body.mode;
    let result = tokio::task::spawn_blocking(move || core.search_community(&logs, mode)).await?;
    Ok(Json(result))
}
