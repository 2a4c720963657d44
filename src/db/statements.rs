//! SQL text for customer operations.
//!
//! Identifiers come only from a validated table name and [`CustomerColumn`];
//! every value is a `?` placeholder.

use crate::models::{CustomerColumn, CustomerFields};

fn quote(ident: &str) -> String {
    format!("`{}`", ident)
}

/// `INSERT INTO t (a, b) VALUES (?, ?)` for the columns of `fields`.
pub fn insert(table: &str, fields: &CustomerFields) -> String {
    let columns: Vec<String> = fields.columns().map(|c| quote(c.as_str())).collect();
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote(table),
        columns.join(", "),
        placeholders
    )
}

/// `SELECT * FROM t WHERE key = ?`
pub fn select_by(table: &str, key: CustomerColumn) -> String {
    format!(
        "SELECT * FROM {} WHERE {} = ? LIMIT 1",
        quote(table),
        quote(key.as_str())
    )
}

/// `UPDATE t SET a = ?, b = ? WHERE customer_id = ?`
pub fn update(table: &str, fields: &CustomerFields) -> String {
    let assignments: Vec<String> = fields
        .columns()
        .map(|c| format!("{} = ?", quote(c.as_str())))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE {} = ?",
        quote(table),
        assignments.join(", "),
        quote(CustomerColumn::CustomerId.as_str())
    )
}

/// `DELETE FROM t WHERE customer_id = ?`
pub fn delete(table: &str) -> String {
    format!(
        "DELETE FROM {} WHERE {} = ?",
        quote(table),
        quote(CustomerColumn::CustomerId.as_str())
    )
}

pub const SERVER_VERSION: &str = "SELECT VERSION()";
