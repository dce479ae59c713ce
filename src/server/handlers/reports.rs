use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use serde::Serialize;

use crate::reporting::{self, DashboardStats, ScanReport};
use crate::server::error::AppError;
use crate::server::state::AppState;

pub async fn dashboard_stats(State(state): State<AppState>) -> Result<Json<DashboardStats>, AppError> {
    Ok(Json(reporting::dashboard_stats(state.storage()).await?))
}

pub async fn export_report(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<ScanReport>, AppError> {
    let Path(scan_id) = path?;
    Ok(Json(reporting::export_report(state.storage(), scan_id).await?))
}

#[derive(Debug, Serialize)]
pub struct TechniqueSummary {
    pub technique: String,
    pub payloads: usize,
}

pub async fn list_payloads(State(state): State<AppState>) -> Json<Vec<TechniqueSummary>> {
    let catalog = state.orchestrator.catalog();
    Json(
        catalog
            .techniques()
            .map(|technique| TechniqueSummary {
                technique: technique.to_string(),
                payloads: catalog.get(technique).len(),
            })
            .collect(),
    )
}
