use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::Resource;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserDraft {
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[serde(default = "default_role")]
    #[validate(custom(function = "validate_role"))]
    pub role: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_role"))]
    pub role: Option<String>,
}

fn default_role() -> String {
    "user".to_string()
}

fn validate_role(role: &str) -> Result<(), validator::ValidationError> {
    match role {
        "admin" | "user" => Ok(()),
        _ => {
            let mut error = validator::ValidationError::new("role");
            error.message = Some("Role must be either admin or user".into());
            Err(error)
        }
    }
}

impl Resource for User {
    const TABLE: &'static str = "users";
    const CACHE_TAG: &'static str = "users";
    const UNIQUE: &'static [&'static str] = &["email"];

    type Draft = UserDraft;
    type Patch = UserPatch;

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_roles() {
        let draft = UserDraft {
            email: "buyer@example.com".into(),
            name: None,
            role: "owner".into(),
        };
        assert!(draft.validate().is_err());

        let patch = UserPatch {
            role: Some("admin".into()),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
    }
}
