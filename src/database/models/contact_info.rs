use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::default_true;
use crate::database::Record;
use crate::filter::types::SqlParam;
use crate::validation::{FromPayload, PayloadReader, ValidationErrors};

pub const CONTACT_KINDS: &[&str] = &["phone", "email", "address", "messenger", "hours"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ContactInfo {
    pub id: i32,
    pub kind: String,
    pub label: Option<String>,
    pub value: String,
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
pub struct ContactInput {
    pub kind: String,
    pub label: Option<String>,
    pub value: String,
    pub sort_order: i32,
    pub is_active: bool,
}

impl FromPayload for ContactInput {
    fn from_payload(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut reader = PayloadReader::new(payload)?;
        let kind = reader.required_str("kind").to_lowercase();
        if !kind.is_empty() && !CONTACT_KINDS.contains(&kind.as_str()) {
            reader.error("kind", &format!("Must be one of: {}", CONTACT_KINDS.join(", ")));
        }
        let input = ContactInput {
            kind,
            label: reader.optional_str("label"),
            value: reader.required_str("value"),
            sort_order: reader.i32_or("sort_order", 0),
            is_active: reader.bool_or("is_active", true),
        };
        reader.finish(input)
    }
}

impl Record for ContactInfo {
    type Input = ContactInput;

    const TABLE: &'static str = "contact_info";
    const LABEL: &'static str = "Contact entry";
    const COLUMNS: &'static [&'static str] = &["kind", "label", "value", "sort_order", "is_active"];
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

    fn params(input: &ContactInput) -> Vec<SqlParam> {
        vec![
            SqlParam::Text(Some(input.kind.clone())),
            SqlParam::Text(input.label.clone()),
            SqlParam::Text(Some(input.value.clone())),
            SqlParam::Int(Some(input.sort_order)),
            SqlParam::Bool(input.is_active),
        ]
    }

    fn create(id: i32, input: ContactInput, now: DateTime<Utc>) -> Self {
        ContactInfo {
            id,
            kind: input.kind,
            label: input.label,
            value: input.value,
            sort_order: input.sort_order,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, input: ContactInput, now: DateTime<Utc>) {
        let created_at = self.created_at;
        *self = Self::create(self.id, input, now);
        self.created_at = created_at;
    }

    fn listing_order(&self, other: &Self) -> Ordering {
        self.sort_order.cmp(&other.sort_order).then_with(|| self.id.cmp(&other.id))
    }
}
