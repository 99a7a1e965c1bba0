// handlers/resource/create.rs - POST B handler

use axum::{extract::State, Extension, Json};

use super::ResourceState;
use crate::actions::{create_single, ActionResult};
use crate::database::models::Resource;
use crate::middleware::Session;

pub async fn resource_create<R: Resource>(
    State(state): State<ResourceState<R>>,
    session: Option<Extension<Session>>,
    Json(draft): Json<R::Draft>,
) -> ActionResult<R> {
    let result = create_single(&*state.table, &draft, R::CACHE_TAG, &*state.invalidator).await;

    if let Some(record) = &result.data {
        tracing::info!(
            actor = session.as_ref().map(|s| s.actor()).unwrap_or("anonymous"),
            resource = R::TABLE,
            id = record.id(),
            "Created record"
        );
    }
    result
}
