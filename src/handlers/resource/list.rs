// handlers/resource/list.rs - GET B handler

use axum::extract::State;

use super::ResourceState;
use crate::actions::ActionResult;
use crate::database::models::Resource;
use crate::error::ApiError;

pub async fn resource_list<R: Resource>(
    State(state): State<ResourceState<R>>,
) -> Result<ActionResult<Vec<R>>, ApiError> {
    let table = state.table.clone();
    let rows: Vec<R> = state
        .reads
        .get_or_load(R::CACHE_TAG, "list", || async move { table.find_all().await })
        .await?;

    Ok(ActionResult::success(Some(rows)))
}
