// handlers/resource/delete.rs - DELETE B/:id and DELETE B (bulk) handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;

use super::ResourceState;
use crate::actions::{delete_multiple, delete_single, ActionResult};
use crate::database::models::Resource;
use crate::middleware::Session;

#[derive(Debug, Deserialize)]
pub struct DeleteManyRequest {
    pub ids: Vec<String>,
}

pub async fn resource_delete<R: Resource>(
    State(state): State<ResourceState<R>>,
    Path(id): Path<String>,
    session: Option<Extension<Session>>,
) -> ActionResult<R> {
    let result = delete_single(
        &*state.table,
        &id,
        R::CACHE_TAG,
        &*state.invalidator,
        state.hooks.single.as_deref(),
    )
    .await;

    if result.is_success() {
        tracing::info!(
            actor = session.as_ref().map(|s| s.actor()).unwrap_or("anonymous"),
            resource = R::TABLE,
            id = %id,
            found = result.data.is_some(),
            "Deleted record"
        );
    }
    result
}

pub async fn resource_delete_many<R: Resource>(
    State(state): State<ResourceState<R>>,
    session: Option<Extension<Session>>,
    Json(request): Json<DeleteManyRequest>,
) -> ActionResult<Vec<R>> {
    let result = delete_multiple(
        &*state.table,
        &request.ids,
        R::CACHE_TAG,
        &*state.invalidator,
        state.hooks.bulk.as_deref(),
    )
    .await;

    if let Some(removed) = &result.data {
        tracing::info!(
            actor = session.as_ref().map(|s| s.actor()).unwrap_or("anonymous"),
            resource = R::TABLE,
            requested = request.ids.len(),
            removed = removed.len(),
            "Deleted records"
        );
    }
    result
}
