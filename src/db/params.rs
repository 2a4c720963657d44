//! Parameter binding utilities for customer statements.

use crate::models::FieldValue;
use sqlx::MySql;
use sqlx::mysql::MySqlArguments;

/// Bind a field value to a MySQL query.
pub(crate) fn bind_field<'q>(
    query: sqlx::query::Query<'q, MySql, MySqlArguments>,
    value: &'q FieldValue,
) -> sqlx::query::Query<'q, MySql, MySqlArguments> {
    match value {
        FieldValue::Null => query.bind(None::<String>),
        FieldValue::Bool(v) => query.bind(*v),
        FieldValue::Int(v) => query.bind(*v),
        FieldValue::Float(v) => query.bind(*v),
        FieldValue::String(v) => query.bind(v.as_str()),
        FieldValue::DateTime(v) => query.bind(*v),
    }
}

/// Bind every value in order.
pub(crate) fn bind_all<'q, I>(
    mut query: sqlx::query::Query<'q, MySql, MySqlArguments>,
    values: I,
) -> sqlx::query::Query<'q, MySql, MySqlArguments>
where
    I: IntoIterator<Item = &'q FieldValue>,
{
    for value in values {
        query = bind_field(query, value);
    }
    query
}
