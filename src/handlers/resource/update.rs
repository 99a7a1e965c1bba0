// handlers/resource/update.rs - PATCH B/:id handler

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use super::ResourceState;
use crate::actions::{update_single, ActionResult};
use crate::database::models::Resource;
use crate::middleware::Session;

pub async fn resource_update<R: Resource>(
    State(state): State<ResourceState<R>>,
    Path(id): Path<String>,
    session: Option<Extension<Session>>,
    Json(patch): Json<R::Patch>,
) -> ActionResult<R> {
    let result = update_single(&*state.table, &id, &patch, R::CACHE_TAG, &*state.invalidator).await;

    if result.data.is_some() {
        tracing::info!(
            actor = session.as_ref().map(|s| s.actor()).unwrap_or("anonymous"),
            resource = R::TABLE,
            id = %id,
            "Updated record"
        );
    }
    result
}
