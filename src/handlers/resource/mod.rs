// handlers/resource/mod.rs - Generic CRUD endpoints for one resource table
//
// Every resource gets the same six routes under its base path B:
//   GET    B          list (served through the read cache)
//   POST   B          create
//   DELETE B          bulk delete, body { "ids": [...] }
//   GET    B/:id      show
//   PATCH  B/:id      update
//   DELETE B/:id      delete

use axum::{routing::get, Router};
use std::sync::Arc;

use crate::actions::PreDeleteHook;
use crate::cache::{CacheInvalidator, TagCache};
use crate::database::models::Resource;
use crate::database::table::ResourceTable;

pub mod create;
pub mod delete;
pub mod list;
pub mod show;
pub mod update;

pub use create::resource_create;
pub use delete::{resource_delete, resource_delete_many, DeleteManyRequest};
pub use list::resource_list;
pub use show::resource_show;
pub use update::resource_update;

/// Hooks run before single and bulk deletes of one resource.
///
/// Dependent rows in the same database belong in the table's own delete
/// (`Repository::with_dependents`); hooks are for side effects elsewhere.
#[derive(Clone, Default)]
pub struct DeleteHooks {
    pub single: Option<Arc<dyn PreDeleteHook<str>>>,
    pub bulk: Option<Arc<dyn PreDeleteHook<[String]>>>,
}

/// Everything the handlers of one resource need
pub struct ResourceState<R: Resource> {
    pub table: Arc<dyn ResourceTable<R>>,
    pub reads: Arc<TagCache>,
    pub invalidator: Arc<dyn CacheInvalidator>,
    pub hooks: DeleteHooks,
}

// derive(Clone) would demand R: Clone through the trait object
impl<R: Resource> Clone for ResourceState<R> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            reads: self.reads.clone(),
            invalidator: self.invalidator.clone(),
            hooks: self.hooks.clone(),
        }
    }
}

impl<R: Resource> ResourceState<R> {
    /// State whose writes invalidate the same cache the list reads go through
    pub fn new(table: Arc<dyn ResourceTable<R>>, reads: Arc<TagCache>, hooks: DeleteHooks) -> Self {
        let invalidator: Arc<dyn CacheInvalidator> = reads.clone();
        Self {
            table,
            reads,
            invalidator,
            hooks,
        }
    }

    pub fn with_invalidator(mut self, invalidator: Arc<dyn CacheInvalidator>) -> Self {
        self.invalidator = invalidator;
        self
    }
}

/// Routes for one resource mounted at `base`
pub fn resource_routes<R: Resource>(base: &str, state: ResourceState<R>) -> Router {
    Router::new()
        .route(
            base,
            get(resource_list::<R>)
                .post(resource_create::<R>)
                .delete(resource_delete_many::<R>),
        )
        .route(
            &format!("{}/:id", base),
            get(resource_show::<R>)
                .patch(resource_update::<R>)
                .delete(resource_delete::<R>),
        )
        .with_state(state)
}
