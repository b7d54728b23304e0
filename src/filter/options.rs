use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::Serialize;

use super::SortOption;
use crate::database::{Category, Product};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub materials: Vec<String>,
    pub categories: Vec<CategoryOption>,
    pub price_range: Option<PriceRange>,
    pub sort_options: Vec<SortChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryOption {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortChoice {
    pub value: &'static str,
    pub label: &'static str,
}

impl FilterOptions {
    /// Inactive products and categories never contribute options.
    pub fn aggregate(products: &[Product], categories: &[Category]) -> Self {
        let active: Vec<&Product> = products.iter().filter(|p| p.is_active).collect();

        Self {
            materials: collect_materials(active.iter().filter_map(|p| p.materials.as_deref())),
            categories: categories
                .iter()
                .filter(|c| c.is_active)
                .map(|c| CategoryOption {
                    id: c.id,
                    name: c.name.clone(),
                    slug: c.slug.clone(),
                })
                .collect(),
            price_range: price_range(active.iter().filter_map(|p| p.price)),
            sort_options: SortOption::ALL
                .iter()
                .map(|option| SortChoice {
                    value: option.as_str(),
                    label: option.label(),
                })
                .collect(),
        }
    }
}

/// Split comma-separated material lists, normalize capitalization,
/// dedupe and sort.
pub fn collect_materials<'a>(fields: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    fields
        .into_iter()
        .flat_map(|field| field.split(','))
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(capitalize)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn price_range(prices: impl Iterator<Item = Decimal>) -> Option<PriceRange> {
    prices.fold(None, |range, price| match range {
        None => Some(PriceRange { min: price, max: price }),
        Some(PriceRange { min, max }) => Some(PriceRange {
            min: min.min(price),
            max: max.max(price),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::category::tests::category;
    use crate::database::models::product::tests::product;

    #[test]
    fn materials_are_normalized_and_deduplicated() {
        assert_eq!(collect_materials(["granite, Marble", "GRANITE"]), vec!["Granite", "Marble"]);
    }

    #[test]
    fn materials_skip_empty_segments() {
        assert_eq!(
            collect_materials(["gabbro,, ", " basalt ,granite", ""]),
            vec!["Basalt", "Gabbro", "Granite"]
        );
        assert_eq!(collect_materials(["мрамор, Гранит"]), vec!["Гранит", "Мрамор"]);
    }

    #[test]
    fn aggregate_uses_active_records_only() {
        let mut a = product(1, "A");
        a.materials = Some("granite, Marble".into());
        a.price = Some(Decimal::new(1200, 0));
        let mut b = product(2, "B");
        b.materials = Some("GRANITE".into());
        b.price = Some(Decimal::new(300, 0));
        let mut hidden = product(3, "C");
        hidden.is_active = false;
        hidden.materials = Some("Bronze".into());
        hidden.price = Some(Decimal::new(5, 0));
        let mut unpriced = product(4, "D");
        unpriced.price = None;

        let mut closed = category(2, "Closed");
        closed.is_active = false;
        let categories = vec![category(1, "Monuments"), closed];

        let options = FilterOptions::aggregate(&[a, b, hidden, unpriced], &categories);
        assert_eq!(options.materials, vec!["Granite", "Marble"]);
        assert_eq!(options.categories.len(), 1);
        assert_eq!(options.categories[0].name, "Monuments");
        assert_eq!(
            options.price_range,
            Some(PriceRange { min: Decimal::new(300, 0), max: Decimal::new(1200, 0) })
        );
        assert_eq!(options.sort_options.len(), 5);
        assert_eq!(options.sort_options[0].value, "newest");
    }

    #[test]
    fn no_prices_means_no_range() {
        let mut p = product(1, "A");
        p.price = None;
        assert_eq!(FilterOptions::aggregate(&[p], &[]).price_range, None);
    }
}
