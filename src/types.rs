/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Mutations performed by the resource action layer
/// Used for structured logging of action outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Create,
    Update,
    Delete,
    DeleteMany,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::DeleteMany => "delete_many",
        }
    }
}
