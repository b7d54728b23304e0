use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use super::default_true;
use crate::database::Record;
use crate::filter::types::SqlParam;
use crate::pricing::{format_price, PriceKind};
use crate::validation::{slugify, FromPayload, PayloadReader, ValidationErrors};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    #[serde(default)]
    pub price_from: bool,
    /// Comma-separated, free-form.
    pub materials: Option<String>,
    pub dimensions: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Option<i32>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn price_kind(&self) -> PriceKind {
        PriceKind::of(self.price, self.price_from)
    }
}

/// Public representation with a display-ready price.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub price_kind: PriceKind,
    pub price_label: String,
}

impl ProductView {
    pub fn new(product: Product, currency: &str) -> Self {
        let price_kind = product.price_kind();
        let price_label = format_price(price_kind, product.price, currency);
        Self {
            product,
            price_kind,
            price_label,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub name: String,
    pub slug: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub price_from: bool,
    pub materials: Option<String>,
    pub dimensions: Option<String>,
    pub image_url: Option<String>,
    pub category_id: Option<i32>,
    pub is_featured: bool,
    pub is_active: bool,
}

impl FromPayload for ProductInput {
    fn from_payload(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut reader = PayloadReader::new(payload)?;
        let name = reader.required_str("name");
        let slug = reader.optional_str("slug").map(|s| slugify(&s)).unwrap_or_else(|| slugify(&name));
        let input = ProductInput {
            short_description: reader.optional_str("short_description"),
            description: reader.optional_str("description"),
            price: reader.optional_amount("price"),
            price_from: reader.bool_or("price_from", false),
            materials: reader.optional_str("materials"),
            dimensions: reader.optional_str("dimensions"),
            image_url: reader.optional_str("image_url"),
            category_id: reader.optional_i32("category_id"),
            is_featured: reader.bool_or("is_featured", false),
            is_active: reader.bool_or("is_active", true),
            name,
            slug,
        };
        if input.slug.is_empty() && !input.name.is_empty() {
            reader.error("slug", "Could not derive a slug from the name");
        }
        reader.finish(input)
    }
}

impl Record for Product {
    type Input = ProductInput;

    const TABLE: &'static str = "products";
    const LABEL: &'static str = "Product";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "slug",
        "short_description",
        "description",
        "price",
        "price_from",
        "materials",
        "dimensions",
        "image_url",
        "category_id",
        "is_featured",
        "is_active",
    ];
    const ORDER_BY: &'static str = "\"created_at\" DESC, \"id\" ASC";
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

    fn params(input: &ProductInput) -> Vec<SqlParam> {
        vec![
            SqlParam::Text(Some(input.name.clone())),
            SqlParam::Text(Some(input.slug.clone())),
            SqlParam::Text(input.short_description.clone()),
            SqlParam::Text(input.description.clone()),
            SqlParam::Decimal(input.price),
            SqlParam::Bool(input.price_from),
            SqlParam::Text(input.materials.clone()),
            SqlParam::Text(input.dimensions.clone()),
            SqlParam::Text(input.image_url.clone()),
            SqlParam::Int(input.category_id),
            SqlParam::Bool(input.is_featured),
            SqlParam::Bool(input.is_active),
        ]
    }

    fn create(id: i32, input: ProductInput, now: DateTime<Utc>) -> Self {
        let mut product = Product {
            id,
            name: String::new(),
            slug: String::new(),
            short_description: None,
            description: None,
            price: None,
            price_from: false,
            materials: None,
            dimensions: None,
            image_url: None,
            category_id: None,
            is_featured: false,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        product.apply(input, now);
        product
    }

    fn apply(&mut self, input: ProductInput, now: DateTime<Utc>) {
        self.name = input.name;
        self.slug = input.slug;
        self.short_description = input.short_description;
        self.description = input.description;
        self.price = input.price;
        self.price_from = input.price_from;
        self.materials = input.materials;
        self.dimensions = input.dimensions;
        self.image_url = input.image_url;
        self.category_id = input.category_id;
        self.is_featured = input.is_featured;
        self.is_active = input.is_active;
        self.updated_at = now;
    }

    fn unique_value(&self) -> Option<&str> {
        Some(&self.slug)
    }

    fn input_unique_value(input: &ProductInput) -> Option<&str> {
        Some(&input.slug)
    }

    fn listing_order(&self, other: &Self) -> std::cmp::Ordering {
        other.created_at.cmp(&self.created_at).then_with(|| self.id.cmp(&other.id))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    /// Active product with a price of 1000 and no category.
    pub(crate) fn product(id: i32, name: &str) -> Product {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_else(Utc::now)
            + chrono::Duration::days(i64::from(id));
        Product {
            id,
            name: name.to_string(),
            slug: slugify(name),
            short_description: None,
            description: None,
            price: Some(Decimal::new(1000, 0)),
            price_from: false,
            materials: None,
            dimensions: None,
            image_url: None,
            category_id: None,
            is_featured: false,
            is_active: true,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn payload_with_defaults() {
        let input = ProductInput::from_payload(&json!({ "name": "Black Stele", "price": "15000" })).unwrap();
        assert_eq!(input.slug, "black-stele");
        assert_eq!(input.price, Some(Decimal::new(15000, 0)));
        assert!(input.is_active);
        assert!(!input.is_featured);
        assert_eq!(input.category_id, None);
    }

    #[test]
    fn payload_errors_are_itemized() {
        let err = ProductInput::from_payload(&json!({ "price": "lots", "category_id": "x" })).unwrap_err();
        assert_eq!(err.fields(), vec!["name", "price", "category_id"]);
    }

    #[test]
    fn view_carries_price_label() {
        let mut p = product(1, "Stele");
        p.price_from = true;
        let view = ProductView::new(p, "₽");
        assert_eq!(view.price_kind, PriceKind::From);
        assert_eq!(view.price_label, "from 1 000 ₽");

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["name"], "Stele");
        assert_eq!(json["price_label"], "from 1 000 ₽");
    }

    #[test]
    fn fixture_rows_default_missing_fields() {
        let p: Product = serde_json::from_value(json!({
            "id": 4, "name": "Vase", "slug": "vase", "short_description": null,
            "description": null, "price": 250, "materials": "granite",
            "dimensions": null, "image_url": null, "category_id": 1
        }))
        .unwrap();
        assert!(p.is_active);
        assert!(!p.price_from);
        assert_eq!(p.price, Some(Decimal::new(250, 0)));
    }
}
