use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use validator::Validate;

use super::result::{ActionError, ActionResult};
use super::{require_non_empty, settle};
use crate::cache::CacheInvalidator;
use crate::database::models::Resource;
use crate::database::table::ResourceTable;
use crate::types::Operation;

/// Validate `draft`, insert it and invalidate `revalidate_tag`.
pub async fn create_single<R, T>(
    table: &T,
    draft: &R::Draft,
    revalidate_tag: &str,
    invalidator: &dyn CacheInvalidator,
) -> ActionResult<R>
where
    R: Resource,
    T: ResourceTable<R> + ?Sized,
{
    let outcome = AssertUnwindSafe(async {
        draft.validate()?;
        require_non_empty("revalidate_tag", revalidate_tag)?;

        let created = table.insert(draft).await?;
        invalidator.invalidate(revalidate_tag).await;

        Ok::<_, ActionError>(Some(created))
    })
    .catch_unwind()
    .await;

    settle(Operation::Create, R::TABLE, outcome)
}

/// Validate `patch` and apply it to the record with `id`.
///
/// Like delete, an unknown id yields `data: None` without an error and the
/// tag is still invalidated.
pub async fn update_single<R, T>(
    table: &T,
    id: &str,
    patch: &R::Patch,
    revalidate_tag: &str,
    invalidator: &dyn CacheInvalidator,
) -> ActionResult<R>
where
    R: Resource,
    T: ResourceTable<R> + ?Sized,
{
    let outcome = AssertUnwindSafe(async {
        require_non_empty("id", id)?;
        patch.validate()?;
        require_non_empty("revalidate_tag", revalidate_tag)?;

        let updated = table.update(id, patch).await?;
        invalidator.invalidate(revalidate_tag).await;

        Ok::<_, ActionError>(updated)
    })
    .catch_unwind()
    .await;

    settle(Operation::Update, R::TABLE, outcome)
}
