use crate::database::manager::{DatabaseError, DatabaseManager};

/// Child-table rows that reference a parent by id and must go with it.
///
/// `Repository::with_dependents` runs these deletes in the same transaction
/// as the parent delete, so either both apply or neither does.
#[derive(Debug, Clone, Default)]
pub struct DependentRows {
    targets: Vec<(String, String)>,
}

impl DependentRows {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also delete rows of `table` whose `column` holds the parent id
    pub fn cascade(mut self, table: &str, column: &str) -> Result<Self, DatabaseError> {
        let table = DatabaseManager::quote_identifier(table)?;
        let column = DatabaseManager::quote_identifier(column)?;
        self.targets.push((table, column));
        Ok(self)
    }

    /// One statement per child table, bound to a single parent id
    pub fn delete_one_sql(&self) -> Vec<String> {
        self.targets
            .iter()
            .map(|(table, column)| format!("DELETE FROM {} WHERE {} = $1", table, column))
            .collect()
    }

    /// One statement per child table, bound to an array of parent ids
    pub fn delete_set_sql(&self) -> Vec<String> {
        self.targets
            .iter()
            .map(|(table, column)| format!("DELETE FROM {} WHERE {} = ANY($1)", table, column))
            .collect()
    }
}
