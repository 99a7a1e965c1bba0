use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;

use crate::database::cascade::DependentRows;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::Resource;
use crate::database::table::{stamp_new, stamp_patch, ResourceTable};

/// Postgres-backed resource table.
///
/// Inserts and updates go through `jsonb_populate_record` over the table's own
/// row type, so the same statements serve every resource without per-model SQL.
/// Deletes run in one transaction together with any dependent-row deletes.
pub struct Repository<R> {
    table: String,
    pool: PgPool,
    dependents: DependentRows,
    _phantom: std::marker::PhantomData<fn() -> R>,
}

impl<R: Resource> Repository<R> {
    pub fn new(pool: PgPool) -> Result<Self, DatabaseError> {
        let table = DatabaseManager::quote_identifier(R::TABLE)?;
        Ok(Self {
            table,
            pool,
            dependents: DependentRows::new(),
            _phantom: std::marker::PhantomData,
        })
    }

    /// Delete these child rows together with their parents
    pub fn with_dependents(mut self, dependents: DependentRows) -> Self {
        self.dependents = dependents;
        self
    }

    fn select_all_sql(&self) -> String {
        format!("SELECT * FROM {} ORDER BY \"created_at\" DESC", self.table)
    }

    fn select_one_sql(&self) -> String {
        format!("SELECT * FROM {} WHERE \"id\" = $1", self.table)
    }

    fn insert_sql(&self) -> String {
        format!(
            "INSERT INTO {table} SELECT * FROM jsonb_populate_record(NULL::{table}, $1) RETURNING *",
            table = self.table
        )
    }

    fn update_sql(&self, fields: &Map<String, Value>) -> Result<String, DatabaseError> {
        let assignments = fields
            .keys()
            .map(|column| {
                let column = DatabaseManager::quote_identifier(column)?;
                Ok(format!("{column} = p.{column}"))
            })
            .collect::<Result<Vec<String>, DatabaseError>>()?;

        Ok(format!(
            "UPDATE {table} SET {assignments} FROM jsonb_populate_record(NULL::{table}, $2) AS p \
             WHERE {table}.\"id\" = $1 RETURNING {table}.*",
            table = self.table,
            assignments = assignments.join(", ")
        ))
    }

    fn delete_one_sql(&self) -> String {
        format!("DELETE FROM {} WHERE \"id\" = $1 RETURNING *", self.table)
    }

    fn delete_set_sql(&self) -> String {
        format!("DELETE FROM {} WHERE \"id\" = ANY($1) RETURNING *", self.table)
    }

    /// Statements of a single delete in execution order; the parent comes last
    fn delete_one_plan(&self) -> (Vec<String>, String) {
        (self.dependents.delete_one_sql(), self.delete_one_sql())
    }

    fn delete_set_plan(&self) -> (Vec<String>, String) {
        (self.dependents.delete_set_sql(), self.delete_set_sql())
    }
}

#[async_trait]
impl<R: Resource> ResourceTable<R> for Repository<R> {
    async fn find_all(&self) -> Result<Vec<R>, DatabaseError> {
        let sql = self.select_all_sql();
        let rows = sqlx::query_as::<_, R>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn find_by_key(&self, id: &str) -> Result<Option<R>, DatabaseError> {
        let sql = self.select_one_sql();
        let row = sqlx::query_as::<_, R>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert(&self, draft: &R::Draft) -> Result<R, DatabaseError> {
        let fields = stamp_new::<R>(draft)?;
        let sql = self.insert_sql();
        let row = sqlx::query_as::<_, R>(&sql)
            .bind(Value::Object(fields))
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(&self, id: &str, patch: &R::Patch) -> Result<Option<R>, DatabaseError> {
        let fields = stamp_patch::<R>(patch)?;
        let sql = self.update_sql(&fields)?;
        let row = sqlx::query_as::<_, R>(&sql)
            .bind(id)
            .bind(Value::Object(fields))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_by_key(&self, id: &str) -> Result<Vec<R>, DatabaseError> {
        let (children, parent) = self.delete_one_plan();
        let mut tx = self.pool.begin().await?;

        for sql in &children {
            let done = sqlx::query(sql).bind(id).execute(&mut *tx).await?;
            tracing::debug!(sql = %sql, removed = done.rows_affected(), "Removed dependent rows");
        }
        let rows = sqlx::query_as::<_, R>(&parent)
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;

        // Dropping the transaction on any error above rolls everything back
        tx.commit().await?;
        Ok(rows)
    }

    async fn delete_by_key_set(&self, ids: &[String]) -> Result<Vec<R>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let (children, parent) = self.delete_set_plan();
        let mut tx = self.pool.begin().await?;

        for sql in &children {
            let done = sqlx::query(sql).bind(ids.to_vec()).execute(&mut *tx).await?;
            tracing::debug!(sql = %sql, removed = done.rows_affected(), "Removed dependent rows");
        }
        let rows = sqlx::query_as::<_, R>(&parent)
            .bind(ids.to_vec())
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(rows)
    }
}
