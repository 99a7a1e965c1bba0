use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::Resource;

/// Store-wide key/value setting (currency, support email, banner text...)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Setting {
    pub id: String,
    pub key: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SettingDraft {
    #[validate(length(min = 1, max = 100, message = "Key must be between 1 and 100 characters"))]
    pub key: String,
    #[validate(length(max = 10000, message = "Value must be at most 10000 characters"))]
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct SettingPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 10000, message = "Value must be at most 10000 characters"))]
    pub value: Option<String>,
}

impl Resource for Setting {
    const TABLE: &'static str = "settings";
    const CACHE_TAG: &'static str = "settings";
    const UNIQUE: &'static [&'static str] = &["key"];

    type Draft = SettingDraft;
    type Patch = SettingPatch;

    fn id(&self) -> &str {
        &self.id
    }
}
