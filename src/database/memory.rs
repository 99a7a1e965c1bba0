use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::Resource;
use crate::database::table::{stamp_new, stamp_patch, ResourceTable};

/// In-process resource table used by `serve --in-memory` and the test suites.
///
/// Rows keep insertion order; `find_all` returns newest first like the
/// Postgres adapter. Columns listed in [`Resource::UNIQUE`] are checked on
/// insert and update the way the schema's `UNIQUE` constraints are.
pub struct MemoryTable<R> {
    rows: RwLock<Vec<R>>,
}

impl<R: Resource> MemoryTable<R> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

/// Reject `candidate` when it repeats a unique column of another row
fn check_unique<R: Resource>(rows: &[R], candidate: &R) -> Result<(), DatabaseError> {
    if R::UNIQUE.is_empty() {
        return Ok(());
    }

    let wanted = serde_json::to_value(candidate)?;
    for row in rows.iter().filter(|row| row.id() != candidate.id()) {
        let existing = serde_json::to_value(row)?;
        for column in R::UNIQUE {
            let value = &wanted[*column];
            if !value.is_null() && existing[*column] == *value {
                return Err(DatabaseError::Conflict(format!(
                    "{}.{} {} already exists",
                    R::TABLE,
                    column,
                    value
                )));
            }
        }
    }
    Ok(())
}

impl<R: Resource> Default for MemoryTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Resource> ResourceTable<R> for MemoryTable<R> {
    async fn find_all(&self) -> Result<Vec<R>, DatabaseError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().rev().cloned().collect())
    }

    async fn find_by_key(&self, id: &str) -> Result<Option<R>, DatabaseError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|row| row.id() == id).cloned())
    }

    async fn insert(&self, draft: &R::Draft) -> Result<R, DatabaseError> {
        let fields = stamp_new::<R>(draft)?;
        let record: R = serde_json::from_value(Value::Object(fields))?;

        let mut rows = self.rows.write().await;
        check_unique(&rows, &record)?;
        rows.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, patch: &R::Patch) -> Result<Option<R>, DatabaseError> {
        let changes = stamp_patch::<R>(patch)?;
        let mut rows = self.rows.write().await;

        let Some(index) = rows.iter().position(|row| row.id() == id) else {
            return Ok(None);
        };

        let mut merged = match serde_json::to_value(&rows[index])? {
            Value::Object(map) => map,
            other => {
                return Err(DatabaseError::QueryError(format!(
                    "{} row is not a JSON object: {}",
                    R::TABLE,
                    other
                )))
            }
        };
        merged.extend(changes);

        let updated: R = serde_json::from_value(Value::Object(merged))?;
        check_unique(&rows, &updated)?;
        rows[index] = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_by_key(&self, id: &str) -> Result<Vec<R>, DatabaseError> {
        let mut rows = self.rows.write().await;
        let (removed, kept): (Vec<R>, Vec<R>) = rows.drain(..).partition(|row| row.id() == id);
        *rows = kept;
        Ok(removed)
    }

    async fn delete_by_key_set(&self, ids: &[String]) -> Result<Vec<R>, DatabaseError> {
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut rows = self.rows.write().await;
        let (removed, kept): (Vec<R>, Vec<R>) =
            rows.drain(..).partition(|row| wanted.contains(row.id()));
        *rows = kept;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Setting, SettingDraft, SettingPatch, User, UserDraft, UserPatch};

    fn draft(key: &str) -> SettingDraft {
        SettingDraft {
            key: key.to_string(),
            value: "on".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_ids_and_lists_newest_first() {
        let table = MemoryTable::<Setting>::new();
        let first = table.insert(&draft("currency")).await.unwrap();
        let second = table.insert(&draft("banner")).await.unwrap();

        assert_ne!(first.id, second.id);
        let keys: Vec<String> = table.find_all().await.unwrap().into_iter().map(|s| s.key).collect();
        assert_eq!(keys, vec!["banner", "currency"]);
    }

    #[tokio::test]
    async fn update_merges_present_fields() {
        let table = MemoryTable::<Setting>::new();
        let created = table.insert(&draft("currency")).await.unwrap();

        let patch = SettingPatch {
            value: Some("EUR".into()),
        };
        let updated = table.update(&created.id, &patch).await.unwrap().unwrap();
        assert_eq!(updated.key, "currency");
        assert_eq!(updated.value, "EUR");
        assert_eq!(updated.created_at, created.created_at);

        assert!(table.update("missing", &patch).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_setting_key_is_rejected() {
        let table = MemoryTable::<Setting>::new();
        table.insert(&draft("currency")).await.unwrap();

        let err = table.insert(&draft("currency")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
        assert_eq!(err.to_string(), "Duplicate value: settings.key \"currency\" already exists");
        assert_eq!(table.len().await, 1);
    }

    #[tokio::test]
    async fn user_email_stays_unique_across_updates() {
        let table = MemoryTable::<User>::new();
        let user = |email: &str| UserDraft {
            email: email.to_string(),
            name: None,
            role: "user".to_string(),
        };
        let first = table.insert(&user("a@example.com")).await.unwrap();
        let second = table.insert(&user("b@example.com")).await.unwrap();

        let taken = UserPatch {
            email: Some(first.email.clone()),
            ..UserPatch::default()
        };
        assert!(matches!(
            table.update(&second.id, &taken).await,
            Err(DatabaseError::Conflict(_))
        ));

        // Rewriting a row's own value is not a conflict
        let same = UserPatch {
            email: Some(first.email.clone()),
            ..UserPatch::default()
        };
        assert!(table.update(&first.id, &same).await.unwrap().is_some());
        assert_eq!(table.find_by_key(&second.id).await.unwrap().unwrap().email, "b@example.com");
    }

    #[tokio::test]
    async fn set_delete_tolerates_duplicates_and_unknown_ids() {
        let table = MemoryTable::<Setting>::new();
        let a = table.insert(&draft("a")).await.unwrap();
        let _b = table.insert(&draft("b")).await.unwrap();

        let removed = table
            .delete_by_key_set(&[a.id.clone(), a.id.clone(), "nope".into()])
            .await
            .unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(table.len().await, 1);
    }
}
