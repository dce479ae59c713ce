use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde::Serialize;

use crate::models::{NewScanConfiguration, ScanResult, Vulnerability};
use crate::server::error::AppError;
use crate::server::state::AppState;

/// A scan result with its findings embedded
#[derive(Debug, Serialize)]
pub struct ScanResultWithVulnerabilities {
    #[serde(flatten)]
    pub result: ScanResult,
    pub vulnerabilities: Vec<Vulnerability>,
}

pub async fn start_scan(
    State(state): State<AppState>,
    payload: Result<Json<NewScanConfiguration>, JsonRejection>,
) -> Result<Json<ScanResult>, AppError> {
    let Json(config) = payload?;
    let target_id = config.target_id;
    let result = state.orchestrator.start_scan(target_id, config).await?;
    Ok(Json(result))
}

pub async fn stop_scan(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<ScanResult>, AppError> {
    let Path(target_id) = path?;
    Ok(Json(state.orchestrator.stop_scan(target_id).await?))
}

pub async fn list_results(State(state): State<AppState>) -> Result<Json<Vec<ScanResult>>, AppError> {
    Ok(Json(state.storage().list_scan_results().await?))
}

/// Latest scan for a target
pub async fn get_results(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<ScanResultWithVulnerabilities>, AppError> {
    let Path(target_id) = path?;
    let storage = state.storage();
    let result = storage
        .get_scan_result_by_target_id(target_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no scan result for target {}", target_id)))?;
    let vulnerabilities = storage.list_vulnerabilities_by_scan(result.id).await?;
    Ok(Json(ScanResultWithVulnerabilities {
        result,
        vulnerabilities,
    }))
}

pub async fn list_vulnerabilities(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<Vec<Vulnerability>>, AppError> {
    let Path(scan_id) = path?;
    Ok(Json(state.storage().list_vulnerabilities_by_scan(scan_id).await?))
}
