//! Database queries for listing and summarising a user's expenses.

use rusqlite::{Connection, params_from_iter, types::Value};
use serde::Serialize;
use time::Date;

use crate::{Error, user::UserID};

use super::core::{Category, EXPENSE_COLUMNS, Expense, ExpenseType, map_expense_row};

/// An inclusive date range where either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    /// The earliest date to include.
    pub start: Option<Date>,
    /// The latest date to include.
    pub end: Option<Date>,
}

/// The filters for listing expenses. `None` fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    /// Only income or only expenses.
    pub kind: Option<ExpenseType>,
    /// Only records in this category.
    pub category: Option<Category>,
    /// Only records dated within this range.
    pub date_range: DateRange,
}

/// The `WHERE` clause and its parameters for a user's records matching `filter`.
fn build_where_clause(user_id: UserID, filter: &ExpenseFilter) -> (String, Vec<Value>) {
    let mut conditions = vec!["user_id = ?".to_owned()];
    let mut parameters = vec![Value::Integer(user_id.as_i64())];

    if let Some(kind) = filter.kind {
        conditions.push("type = ?".to_owned());
        parameters.push(Value::Text(kind.as_str().to_owned()));
    }

    if let Some(category) = filter.category {
        conditions.push("category = ?".to_owned());
        parameters.push(Value::Text(category.as_str().to_owned()));
    }

    if let Some(start) = filter.date_range.start {
        conditions.push("date >= ?".to_owned());
        parameters.push(Value::Text(start.to_string()));
    }

    if let Some(end) = filter.date_range.end {
        conditions.push("date <= ?".to_owned());
        parameters.push(Value::Text(end.to_string()));
    }

    (format!("WHERE {}", conditions.join(" AND ")), parameters)
}

/// Get one page of a user's expenses, newest first.
///
/// Records on the same date are ordered by newest creation time, then by
/// highest ID so the order is stable.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn list_expenses_for_user(
    user_id: UserID,
    filter: &ExpenseFilter,
    page: u64,
    page_size: u64,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    let (where_clause, mut parameters) = build_where_clause(user_id, filter);
    let offset = page.saturating_sub(1).saturating_mul(page_size);
    parameters.push(Value::Integer(i64::try_from(page_size).unwrap_or(i64::MAX)));
    parameters.push(Value::Integer(i64::try_from(offset).unwrap_or(i64::MAX)));

    let query = format!(
        "SELECT {EXPENSE_COLUMNS} FROM expense {where_clause} \
        ORDER BY date DESC, created_at DESC, id DESC \
        LIMIT ? OFFSET ?"
    );

    connection
        .prepare(&query)?
        .query_map(params_from_iter(parameters), map_expense_row)?
        .map(|expense_result| expense_result.map_err(Error::from))
        .collect()
}

/// Count a user's expenses that match `filter`.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn count_expenses_for_user(
    user_id: UserID,
    filter: &ExpenseFilter,
    connection: &Connection,
) -> Result<u64, Error> {
    let (where_clause, parameters) = build_where_clause(user_id, filter);

    let count: i64 = connection.query_row(
        &format!("SELECT COUNT(id) FROM expense {where_clause}"),
        params_from_iter(parameters),
        |row| row.get(0),
    )?;

    Ok(u64::try_from(count).unwrap_or_default())
}

/// Total income and expenses, and the difference between them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TypeTotals {
    /// The sum of all income.
    pub income: f64,
    /// The sum of all expenses.
    pub expense: f64,
    /// `income - expense`.
    pub balance: f64,
}

/// The sum and number of records in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// The category being summed.
    pub category: Category,
    /// The sum of the amounts.
    pub total: f64,
    /// How many records were summed.
    pub count: u64,
}

/// Round `amount` to the nearest cent.
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Sum a user's income and expenses within `date_range`.
///
/// Totals are rounded to cents. A user with no records gets zero for everything.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn sum_by_type(
    user_id: UserID,
    date_range: DateRange,
    connection: &Connection,
) -> Result<TypeTotals, Error> {
    let filter = ExpenseFilter {
        date_range,
        ..Default::default()
    };
    let (where_clause, parameters) = build_where_clause(user_id, &filter);

    let mut totals = TypeTotals::default();

    let rows = connection
        .prepare(&format!(
            "SELECT type, SUM(amount) FROM expense {where_clause} GROUP BY type"
        ))?
        .query_map(params_from_iter(parameters), |row| {
            Ok((row.get::<_, ExpenseType>(0)?, row.get::<_, f64>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    for (kind, total) in rows {
        match kind {
            ExpenseType::Income => totals.income = round_to_cents(total),
            ExpenseType::Expense => totals.expense = round_to_cents(total),
        }
    }

    totals.balance = round_to_cents(totals.income - totals.expense);

    Ok(totals)
}

/// Sum a user's records within `date_range` per category, largest total first.
///
/// Categories with equal totals are ordered by name.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn sum_by_category(
    user_id: UserID,
    date_range: DateRange,
    connection: &Connection,
) -> Result<Vec<CategoryTotal>, Error> {
    let filter = ExpenseFilter {
        date_range,
        ..Default::default()
    };
    let (where_clause, parameters) = build_where_clause(user_id, &filter);

    connection
        .prepare(&format!(
            "SELECT category, SUM(amount) AS total, COUNT(id) FROM expense {where_clause} \
            GROUP BY category \
            ORDER BY total DESC, category ASC"
        ))?
        .query_map(params_from_iter(parameters), |row| {
            let count: i64 = row.get(2)?;

            Ok(CategoryTotal {
                category: row.get(0)?,
                total: round_to_cents(row.get(1)?),
                count: u64::try_from(count).unwrap_or_default(),
            })
        })?
        .map(|total_result| total_result.map_err(Error::from))
        .collect()
}

/// Delete every expense owned by `user_id` and return how many were deleted.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn delete_all_expenses_for_user(user_id: UserID, connection: &Connection) -> Result<u64, Error> {
    let rows_affected =
        connection.execute("DELETE FROM expense WHERE user_id = ?1", (user_id.as_i64(),))?;

    Ok(rows_affected as u64)
}
