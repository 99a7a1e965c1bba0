use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::Resource;

const ORDER_STATUSES: [&str; 4] = ["pending", "paid", "fulfilled", "refunded"];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub status: String,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderDraft {
    #[validate(length(min = 1, message = "Order must belong to a user"))]
    pub user_id: String,
    #[serde(default = "default_status")]
    #[validate(custom(function = "validate_status"))]
    pub status: String,
    #[validate(range(min = 0, message = "Total must not be negative"))]
    pub total_cents: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct OrderPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "Total must not be negative"))]
    pub total_cents: Option<i64>,
}

fn default_status() -> String {
    "pending".to_string()
}

fn validate_status(status: &str) -> Result<(), validator::ValidationError> {
    if ORDER_STATUSES.contains(&status) {
        return Ok(());
    }
    let mut error = validator::ValidationError::new("status");
    error.message = Some(format!("Status must be one of: {}", ORDER_STATUSES.join(", ")).into());
    Err(error)
}

impl Resource for Order {
    const TABLE: &'static str = "orders";
    const CACHE_TAG: &'static str = "orders";

    type Draft = OrderDraft;
    type Patch = OrderPatch;

    fn id(&self) -> &str {
        &self.id
    }
}
