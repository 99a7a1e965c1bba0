use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::Resource;

/// Storage capability for one keyed resource table.
///
/// Deletes return the rows that were actually removed; an empty result means
/// nothing matched and is not an error.
#[async_trait]
pub trait ResourceTable<R: Resource>: Send + Sync {
    async fn find_all(&self) -> Result<Vec<R>, DatabaseError>;

    async fn find_by_key(&self, id: &str) -> Result<Option<R>, DatabaseError>;

    async fn insert(&self, draft: &R::Draft) -> Result<R, DatabaseError>;

    /// Apply the fields present in `patch`; `None` when no row has `id`
    async fn update(&self, id: &str, patch: &R::Patch) -> Result<Option<R>, DatabaseError>;

    async fn delete_by_key(&self, id: &str) -> Result<Vec<R>, DatabaseError>;

    async fn delete_by_key_set(&self, ids: &[String]) -> Result<Vec<R>, DatabaseError>;
}

/// JSON object for a new row: the draft's fields plus a fresh id and timestamps
pub(crate) fn stamp_new<R: Resource>(draft: &R::Draft) -> Result<Map<String, Value>, DatabaseError> {
    let mut fields = into_object(serde_json::to_value(draft)?)?;
    let now = Value::String(Utc::now().to_rfc3339());

    fields.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
    fields.insert("created_at".to_string(), now.clone());
    fields.insert("updated_at".to_string(), now);
    Ok(fields)
}

/// JSON object of the columns a patch changes, with `updated_at` bumped
pub(crate) fn stamp_patch<R: Resource>(patch: &R::Patch) -> Result<Map<String, Value>, DatabaseError> {
    let mut fields = into_object(serde_json::to_value(patch)?)?;

    // id and created_at are owned by storage
    fields.remove("id");
    fields.remove("created_at");
    fields.insert("updated_at".to_string(), Value::String(Utc::now().to_rfc3339()));
    Ok(fields)
}

fn into_object(value: Value) -> Result<Map<String, Value>, DatabaseError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(DatabaseError::QueryError(format!(
            "expected a JSON object payload, got {}",
            other
        ))),
    }
}
