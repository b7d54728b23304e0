use std::marker::PhantomData;

use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{FromRow, Postgres};

use crate::database::{Record, Scope};
use crate::filter::filter_where::FilterWhere;
use crate::filter::types::{FilterOp, FilterWhereInfo, SqlParam, SqlResult};

/// Builds the parameterized statements behind [`crate::database::Repository`]
/// for one record type.
pub struct QueryBuilder<R> {
    _phantom: PhantomData<R>,
}

impl<R: Record> QueryBuilder<R> {
    pub fn select_all(scope: Scope) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&scope_conditions(scope), 0);
        SqlResult {
            query: format!(
                "SELECT * FROM \"{}\" WHERE {} ORDER BY {}",
                R::TABLE,
                where_clause,
                R::ORDER_BY
            ),
            params,
        }
    }

    pub fn select_one(id: i32, scope: Scope) -> SqlResult {
        let mut conditions = vec![id_condition(id)];
        conditions.extend(scope_conditions(scope));
        let (where_clause, params) = FilterWhere::generate(&conditions, 0);
        SqlResult {
            query: format!("SELECT * FROM \"{}\" WHERE {} LIMIT 1", R::TABLE, where_clause),
            params,
        }
    }

    pub fn insert(input: &R::Input) -> SqlResult {
        let columns: Vec<String> = R::COLUMNS.iter().map(|c| format!("\"{}\"", c)).collect();
        let placeholders: Vec<String> = (1..=R::COLUMNS.len()).map(|i| format!("${}", i)).collect();
        SqlResult {
            query: format!(
                "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING *",
                R::TABLE,
                columns.join(", "),
                placeholders.join(", ")
            ),
            params: R::params(input),
        }
    }

    pub fn update(id: i32, input: &R::Input) -> SqlResult {
        let assignments: Vec<String> = R::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, c)| format!("\"{}\" = ${}", c, i + 1))
            .collect();
        let mut params = R::params(input);
        let (where_clause, id_params) = FilterWhere::generate(&[id_condition(id)], params.len());
        params.extend(id_params);
        SqlResult {
            query: format!(
                "UPDATE \"{}\" SET {}, \"updated_at\" = now() WHERE {} RETURNING *",
                R::TABLE,
                assignments.join(", "),
                where_clause
            ),
            params,
        }
    }

    /// Soft-deleting tables only flip `is_active`.
    pub fn delete(id: i32) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&[id_condition(id)], 0);
        let query = if R::SOFT_DELETE {
            format!(
                "UPDATE \"{}\" SET \"is_active\" = false, \"updated_at\" = now() WHERE {}",
                R::TABLE,
                where_clause
            )
        } else {
            format!("DELETE FROM \"{}\" WHERE {}", R::TABLE, where_clause)
        };
        SqlResult { query, params }
    }
}

fn id_condition(id: i32) -> FilterWhereInfo {
    FilterWhereInfo {
        columns: vec!["id"],
        operator: FilterOp::Eq,
        data: SqlParam::Int(Some(id)),
    }
}

fn scope_conditions(scope: Scope) -> Vec<FilterWhereInfo> {
    match scope {
        Scope::Admin => vec![],
        Scope::Public => vec![FilterWhereInfo {
            columns: vec!["is_active"],
            operator: FilterOp::Eq,
            data: SqlParam::Bool(true),
        }],
    }
}

pub fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, Postgres, PgArguments>,
    v: &SqlParam,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match v {
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::Text(s) => q.bind(s.clone()),
        SqlParam::Decimal(d) => q.bind(*d),
        SqlParam::Bool(b) => q.bind(*b),
    }
}

pub fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    v: &SqlParam,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::Text(s) => q.bind(s.clone()),
        SqlParam::Decimal(d) => q.bind(*d),
        SqlParam::Bool(b) => q.bind(*b),
    }
}
