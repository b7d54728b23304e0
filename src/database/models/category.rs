use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::default_true;
use crate::database::Record;
use crate::filter::types::SqlParam;
use crate::validation::{slugify, FromPayload, PayloadReader, ValidationErrors};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
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
pub struct CategoryInput {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

impl FromPayload for CategoryInput {
    fn from_payload(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut reader = PayloadReader::new(payload)?;
        let name = reader.required_str("name");
        let slug = reader.optional_str("slug").map(|s| slugify(&s)).unwrap_or_else(|| slugify(&name));
        if slug.is_empty() && !name.is_empty() {
            reader.error("slug", "Could not derive a slug from the name");
        }
        let input = CategoryInput {
            description: reader.optional_str("description"),
            image_url: reader.optional_str("image_url"),
            sort_order: reader.i32_or("sort_order", 0),
            is_active: reader.bool_or("is_active", true),
            name,
            slug,
        };
        reader.finish(input)
    }
}

impl Record for Category {
    type Input = CategoryInput;

    const TABLE: &'static str = "categories";
    const LABEL: &'static str = "Category";
    const COLUMNS: &'static [&'static str] = &["name", "slug", "description", "image_url", "sort_order", "is_active"];
    const ORDER_BY: &'static str = "\"sort_order\" ASC, \"name\" ASC, \"id\" ASC";
    const SOFT_DELETE: bool = true;
    const UNIQUE_COLUMN: Option<&'static str> = Some("slug");

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

    fn params(input: &CategoryInput) -> Vec<SqlParam> {
        vec![
            SqlParam::Text(Some(input.name.clone())),
            SqlParam::Text(Some(input.slug.clone())),
            SqlParam::Text(input.description.clone()),
            SqlParam::Text(input.image_url.clone()),
            SqlParam::Int(Some(input.sort_order)),
            SqlParam::Bool(input.is_active),
        ]
    }

    fn create(id: i32, input: CategoryInput, now: DateTime<Utc>) -> Self {
        Category {
            id,
            name: input.name,
            slug: input.slug,
            description: input.description,
            image_url: input.image_url,
            sort_order: input.sort_order,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: CategoryInput, now: DateTime<Utc>) {
        let created_at = self.created_at;
        *self = Self::create(self.id, input, now);
        self.created_at = created_at;
    }

    fn unique_value(&self) -> Option<&str> {
        Some(&self.slug)
    }

    fn input_unique_value(input: &CategoryInput) -> Option<&str> {
        Some(&input.slug)
    }

    fn listing_order(&self, other: &Self) -> Ordering {
        self.sort_order
            .cmp(&other.sort_order)
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.id.cmp(&other.id))
    }
}
