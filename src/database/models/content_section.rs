use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::default_true;
use crate::database::Record;
use crate::filter::types::SqlParam;
use crate::validation::{slugify, FromPayload, PayloadReader, ValidationErrors};

/// Editable block of site copy, addressed by `key` (e.g. `about`, `delivery`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ContentSection {
    pub id: i32,
    pub key: String,
    pub title: Option<String>,
    pub body: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContentInput {
    pub key: String,
    pub title: Option<String>,
    pub body: String,
    pub is_active: bool,
}

impl FromPayload for ContentInput {
    fn from_payload(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut reader = PayloadReader::new(payload)?;
        let raw_key = reader.required_str("key");
        let key = slugify(&raw_key);
        if key.is_empty() && !raw_key.is_empty() {
            reader.error("key", "Must contain letters or digits");
        }
        let input = ContentInput {
            key,
            title: reader.optional_str("title"),
            body: reader.required_str("body"),
            is_active: reader.bool_or("is_active", true),
        };
        reader.finish(input)
    }
}

impl Record for ContentSection {
    type Input = ContentInput;

    const TABLE: &'static str = "content_sections";
    const LABEL: &'static str = "Content section";
    const COLUMNS: &'static [&'static str] = &["key", "title", "body", "is_active"];
    const ORDER_BY: &'static str = "\"key\" ASC";
    const SOFT_DELETE: bool = false;
    const UNIQUE_COLUMN: Option<&'static str> = Some("key");

    fn id(&self) -> i32 {
        self.id
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn deactivate(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.updated_at = now;
    }

    fn params(input: &ContentInput) -> Vec<SqlParam> {
        vec![
            SqlParam::Text(Some(input.key.clone())),
            SqlParam::Text(input.title.clone()),
            SqlParam::Text(Some(input.body.clone())),
            SqlParam::Bool(input.is_active),
        ]
    }

    fn create(id: i32, input: ContentInput, now: DateTime<Utc>) -> Self {
        ContentSection {
            id,
            key: input.key,
            title: input.title,
            body: input.body,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: ContentInput, now: DateTime<Utc>) {
        self.key = input.key;
        self.title = input.title;
        self.body = input.body;
        self.is_active = input.is_active;
        self.updated_at = now;
    }

    fn unique_value(&self) -> Option<&str> {
        Some(&self.key)
    }

    fn input_unique_value(input: &ContentInput) -> Option<&str> {
        Some(&input.key)
    }

    fn listing_order(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}
