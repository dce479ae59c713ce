use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use tracing::info;

use crate::models::{NewTarget, Target};
use crate::server::error::AppError;
use crate::server::state::AppState;

pub async fn create_target(
    State(state): State<AppState>,
    payload: Result<Json<NewTarget>, JsonRejection>,
) -> Result<Json<Target>, AppError> {
    let Json(mut new_target) = payload?;
    new_target.url = new_target.url.trim().to_string();
    new_target.validate()?;

    let target = state.storage().create_target(new_target).await?;
    info!(target_id = target.id, url = %target.url, "target registered");
    Ok(Json(target))
}

pub async fn list_targets(State(state): State<AppState>) -> Result<Json<Vec<Target>>, AppError> {
    Ok(Json(state.storage().list_targets().await?))
}

pub async fn get_target(
    State(state): State<AppState>,
    path: Result<Path<u64>, PathRejection>,
) -> Result<Json<Target>, AppError> {
    let Path(id) = path?;
    state
        .storage()
        .get_target(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("target {} not found", id)))
}
