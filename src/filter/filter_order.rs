use super::types::{FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| match i.sort {
                // Unpriced products go last in either direction.
                SortDirection::Desc => format!("\"{}\" {} NULLS LAST", i.column, i.sort.to_sql()),
                SortDirection::Asc => format!("\"{}\" {}", i.column, i.sort.to_sql()),
            })
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}
