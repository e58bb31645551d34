//! `POST /api/analysis`: pattern analysis over the caller's records.
//!
//! Each record collection omitted from the body is loaded from the caller's
//! stored records.

use axum::extract::State;
use axum::{Extension, Json};
use rusqlite::Connection;
use serde::Deserialize;

use crate::analysis::{AnalysisRequest, AnalysisType};
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, ApiJson, CallerContext};
use crate::models::{
    HealthLog, HypothesisAnalysis, LabWork, LabWorkFilter, LogFilter, MedicalTest,
    MedicalTestFilter, Owner,
};
use crate::{journal, labs};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisBody {
    pub logs: Option<Vec<HealthLog>>,
    pub lab_work: Option<Vec<LabWork>>,
    pub medical_tests: Option<Vec<MedicalTest>>,
    #[serde(default)]
    pub analysis_type: AnalysisType,
    #[serde(default)]
    pub focus_on_causes: bool,
}

impl AnalysisBody {
    fn into_request(self, conn: &Connection, owner: Owner) -> Result<AnalysisRequest, ApiError> {
        let logs = match self.logs {
            Some(logs) => logs,
            None => journal::list_logs(conn, owner, &LogFilter::default())?,
        };
        let lab_work = match self.lab_work {
            Some(labs) => labs,
            None => labs::list_lab_work(conn, owner, &LabWorkFilter::default())?,
        };
        let medical_tests = match self.medical_tests {
            Some(tests) => tests,
            None => labs::list_medical_tests(conn, owner, &MedicalTestFilter::default())?,
        };
        Ok(AnalysisRequest {
            logs,
            lab_work,
            medical_tests,
            analysis_type: self.analysis_type,
            focus_on_causes: self.focus_on_causes,
        })
    }
}

pub async fn generate(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    ApiJson(body): ApiJson<AnalysisBody>,
) -> Result<Json<HypothesisAnalysis>, ApiError> {
    let request = {
        let conn = ctx.open_db()?;
        body.into_request(&conn, caller.owner)?
    };

    let core = ctx.core.clone();
    let analysis = tokio::task::spawn_blocking(move || {
        core.hypothesis_generator().generate(&request)
    })
    .await?;
    Ok(Json(analysis))
}
