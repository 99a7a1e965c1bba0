use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;

use super::result::{ActionError, ActionResult};
use super::{require_non_empty, settle};
use crate::cache::CacheInvalidator;
use crate::database::models::Resource;
use crate::database::table::ResourceTable;
use crate::types::Operation;

/// Side effect run before a delete, e.g. removing uploaded files.
///
/// The hook and the delete are separate operations with no shared
/// transaction, so hooks must be idempotent: a delete that fails after its
/// hook succeeded is retried by running the whole action again, and deleting
/// an already-missing record succeeds. Rows in the same database as the
/// record are removed by the table's delete instead (see
/// `Repository::with_dependents`), which is atomic.
#[async_trait]
pub trait PreDeleteHook<K: ?Sized + Sync>: Send + Sync {
    async fn run(&self, keys: &K) -> anyhow::Result<()>;
}

#[async_trait]
impl<K, F> PreDeleteHook<K> for F
where
    K: ?Sized + Sync,
    F: Fn(&K) -> anyhow::Result<()> + Send + Sync,
{
    async fn run(&self, keys: &K) -> anyhow::Result<()> {
        self(keys)
    }
}

/// Delete the record with `id` and invalidate `revalidate_tag`.
///
/// A missing record is not an error: `data` is `None` and the tag is still
/// invalidated. Any failure (hook, storage, panic) becomes `error`.
pub async fn delete_single<R, T>(
    table: &T,
    id: &str,
    revalidate_tag: &str,
    invalidator: &dyn CacheInvalidator,
    pre_delete: Option<&dyn PreDeleteHook<str>>,
) -> ActionResult<R>
where
    R: Resource,
    T: ResourceTable<R> + ?Sized,
{
    let outcome = AssertUnwindSafe(async {
        require_non_empty("id", id)?;
        require_non_empty("revalidate_tag", revalidate_tag)?;

        if let Some(hook) = pre_delete {
            hook.run(id).await.map_err(ActionError::from)?;
        }

        let deleted = table.delete_by_key(id).await?;
        invalidator.invalidate(revalidate_tag).await;

        Ok::<_, ActionError>(deleted.into_iter().next())
    })
    .catch_unwind()
    .await;

    settle(Operation::Delete, R::TABLE, outcome)
}

/// Delete every record whose id is in `ids` and invalidate `revalidate_tag`.
///
/// Duplicate ids are tolerated; the returned rows are whatever storage
/// removed, in no particular order.
pub async fn delete_multiple<R, T>(
    table: &T,
    ids: &[String],
    revalidate_tag: &str,
    invalidator: &dyn CacheInvalidator,
    pre_delete: Option<&dyn PreDeleteHook<[String]>>,
) -> ActionResult<Vec<R>>
where
    R: Resource,
    T: ResourceTable<R> + ?Sized,
{
    let outcome = AssertUnwindSafe(async {
        if ids.is_empty() {
            return Err(ActionError::known("Select at least one record to delete"));
        }
        for id in ids {
            require_non_empty("ids", id)?;
        }
        require_non_empty("revalidate_tag", revalidate_tag)?;

        if let Some(hook) = pre_delete {
            hook.run(ids).await.map_err(ActionError::from)?;
        }

        let deleted = table.delete_by_key_set(ids).await?;
        invalidator.invalidate(revalidate_tag).await;

        Ok::<_, ActionError>(Some(deleted))
    })
    .catch_unwind()
    .await;

    settle(Operation::DeleteMany, R::TABLE, outcome)
}
