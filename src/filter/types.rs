use rust_decimal::Decimal;

/// Comparison applied by a single WHERE condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
    /// Case-insensitive substring match; the bound value is a LIKE pattern.
    ILike,
}

/// A typed value bound to a numbered placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(Option<i32>),
    Text(Option<String>),
    Decimal(Option<Decimal>),
    Bool(bool),
}

#[derive(Debug, Clone)]
pub struct FilterWhereInfo {
    /// One column, or several OR-ed together against the same value.
    pub columns: Vec<&'static str>,
    pub operator: FilterOp,
    pub data: SqlParam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOrderInfo {
    pub column: &'static str,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}
