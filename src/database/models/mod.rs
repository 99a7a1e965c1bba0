pub mod order;
pub mod product;
pub mod setting;
pub mod user;

pub use order::{Order, OrderDraft, OrderPatch};
pub use product::{Product, ProductDraft, ProductPatch};
pub use setting::{Setting, SettingDraft, SettingPatch};
pub use user::{User, UserDraft, UserPatch};

use serde::{de::DeserializeOwned, Serialize};
use sqlx::{postgres::PgRow, FromRow};
use validator::Validate;

/// A persisted entity addressed by a unique string `id`.
///
/// Every resource is stored in its own table, invalidated under its own cache
/// tag, and created/updated from a validated payload. Storage adapters stamp
/// `id`, `created_at` and `updated_at`, so drafts never carry them.
pub trait Resource:
    for<'r> FromRow<'r, PgRow> + Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static
{
    const TABLE: &'static str;
    const CACHE_TAG: &'static str;

    /// Columns whose values must not repeat across rows
    const UNIQUE: &'static [&'static str] = &[];

    /// Payload accepted when creating a record
    type Draft: Validate + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Partial update; absent fields are left untouched
    type Patch: Validate + Serialize + DeserializeOwned + Send + Sync + 'static;

    fn id(&self) -> &str;
}
