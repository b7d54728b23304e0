use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::default_true;
use crate::database::Record;
use crate::filter::types::SqlParam;
use crate::validation::{FromPayload, PayloadReader, ValidationErrors};

/// A photo of a finished installation shown in the gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ExampleWork {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub category_id: Option<i32>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExampleWorkInput {
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub category_id: Option<i32>,
    pub sort_order: i32,
    pub is_active: bool,
}

impl FromPayload for ExampleWorkInput {
    fn from_payload(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut reader = PayloadReader::new(payload)?;
        let input = ExampleWorkInput {
            title: reader.required_str("title"),
            description: reader.optional_str("description"),
            image_url: reader.required_str("image_url"),
            category_id: reader.optional_i32("category_id"),
            sort_order: reader.i32_or("sort_order", 0),
            is_active: reader.bool_or("is_active", true),
        };
        reader.finish(input)
    }
}

impl Record for ExampleWork {
    type Input = ExampleWorkInput;

    const TABLE: &'static str = "example_works";
    const LABEL: &'static str = "Example work";
    const COLUMNS: &'static [&'static str] = &["title", "description", "image_url", "category_id", "sort_order", "is_active"];
    const ORDER_BY: &'static str = "\"sort_order\" ASC, \"id\" ASC";
    const SOFT_DELETE: bool = false;

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

    fn params(input: &ExampleWorkInput) -> Vec<SqlParam> {
        vec![
            SqlParam::Text(Some(input.title.clone())),
            SqlParam::Text(input.description.clone()),
            SqlParam::Text(Some(input.image_url.clone())),
            SqlParam::Int(input.category_id),
            SqlParam::Int(Some(input.sort_order)),
            SqlParam::Bool(input.is_active),
        ]
    }

    fn create(id: i32, input: ExampleWorkInput, now: DateTime<Utc>) -> Self {
        ExampleWork {
            id,
            title: input.title,
            description: input.description,
            image_url: input.image_url,
            category_id: input.category_id,
            sort_order: input.sort_order,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: ExampleWorkInput, now: DateTime<Utc>) {
        let created_at = self.created_at;
        *self = Self::create(self.id, input, now);
        self.created_at = created_at;
    }

    fn listing_order(&self, other: &Self) -> Ordering {
        self.sort_order.cmp(&other.sort_order).then_with(|| self.id.cmp(&other.id))
    }
}
