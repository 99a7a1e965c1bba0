// handlers/resource/show.rs - GET B/:id handler

use axum::extract::{Path, State};

use super::ResourceState;
use crate::actions::ActionResult;
use crate::database::models::Resource;
use crate::error::ApiError;

pub async fn resource_show<R: Resource>(
    State(state): State<ResourceState<R>>,
    Path(id): Path<String>,
) -> Result<ActionResult<R>, ApiError> {
    let record = state
        .table
        .find_by_key(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No record '{}' in {}", id, R::TABLE)))?;

    Ok(ActionResult::success(Some(record)))
}
