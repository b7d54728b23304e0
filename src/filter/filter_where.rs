use super::types::{FilterOp, FilterWhereInfo, SqlParam};

/// Renders a list of conditions into a parameterized WHERE body.
///
/// Conditions are AND-ed. Placeholders are numbered from
/// `starting_param_index + 1` so the clause can be appended to a statement
/// that already binds values.
pub struct FilterWhere {
    param_values: Vec<SqlParam>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(conditions: &[FilterWhereInfo], starting_param_index: usize) -> (String, Vec<SqlParam>) {
        let mut filter_where = Self::new(starting_param_index);
        let sql_conditions: Vec<String> = conditions
            .iter()
            .map(|condition| filter_where.build_sql_condition(condition))
            .collect();

        let where_clause = if sql_conditions.is_empty() {
            "1=1".to_string()
        } else {
            sql_conditions.join(" AND ")
        };
        (where_clause, filter_where.param_values)
    }

    fn build_sql_condition(&mut self, condition: &FilterWhereInfo) -> String {
        let placeholder = self.param(condition.data.clone());
        let operator = match condition.operator {
            FilterOp::Eq => "=",
            FilterOp::Gte => ">=",
            FilterOp::Lte => "<=",
            FilterOp::ILike => "ILIKE",
        };

        let parts: Vec<String> = condition
            .columns
            .iter()
            .map(|column| format!("\"{}\" {} {}", column, operator, placeholder))
            .collect();

        if parts.len() == 1 {
            parts.into_iter().next().unwrap_or_default()
        } else {
            format!("({})", parts.join(" OR "))
        }
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

/// Wrap text in `%` for a substring ILIKE, escaping LIKE metacharacters.
pub fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_conditions_match_everything() {
        let (sql, params) = FilterWhere::generate(&[], 0);
        assert_eq!(sql, "1=1");
        assert!(params.is_empty());
    }

    #[test]
    fn numbers_placeholders_from_offset() {
        let conditions = vec![
            FilterWhereInfo { columns: vec!["category_id"], operator: FilterOp::Eq, data: SqlParam::Int(Some(3)) },
            FilterWhereInfo { columns: vec!["is_active"], operator: FilterOp::Eq, data: SqlParam::Bool(true) },
        ];
        let (sql, params) = FilterWhere::generate(&conditions, 2);
        assert_eq!(sql, "\"category_id\" = $3 AND \"is_active\" = $4");
        assert_eq!(params, vec![SqlParam::Int(Some(3)), SqlParam::Bool(true)]);
    }

    #[test]
    fn multi_column_condition_shares_one_placeholder() {
        let conditions = vec![FilterWhereInfo {
            columns: vec!["name", "short_description"],
            operator: FilterOp::ILike,
            data: SqlParam::Text(Some("%stele%".into())),
        }];
        let (sql, params) = FilterWhere::generate(&conditions, 0);
        assert_eq!(sql, "(\"name\" ILIKE $1 OR \"short_description\" ILIKE $1)");
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(contains_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
        assert_eq!(contains_pattern("granite"), "%granite%");
    }
}
