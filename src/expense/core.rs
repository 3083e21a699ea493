//! Defines the core data models and database queries for expenses.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, db::timestamp_now, user::UserID};

// ============================================================================
// MODELS
// ============================================================================

/// The database ID of an expense.
pub type ExpenseId = i64;

/// The error for a string that does not name a known [ExpenseType] or [Category].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0:?} is not a recognised value")]
pub struct UnknownVariant(pub String);

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseType {
    /// Money earned.
    Income,
    /// Money spent.
    Expense,
}

impl ExpenseType {
    /// The label used in JSON, query strings and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseType::Income => "income",
            ExpenseType::Expense => "expense",
        }
    }
}

impl Display for ExpenseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(ExpenseType::Income),
            "expense" => Ok(ExpenseType::Expense),
            other => Err(UnknownVariant(other.to_owned())),
        }
    }
}

/// The fixed set of categories a record can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Groceries, restaurants and takeaway.
    #[serde(rename = "Food & Dining")]
    FoodAndDining,
    /// Fuel, fares and vehicle costs.
    #[serde(rename = "Transportation")]
    Transportation,
    /// General purchases.
    #[serde(rename = "Shopping")]
    Shopping,
    /// Going out, games and subscriptions.
    #[serde(rename = "Entertainment")]
    Entertainment,
    /// Rent, power, water and other regular bills.
    #[serde(rename = "Bills & Utilities")]
    BillsAndUtilities,
    /// Doctors, pharmacy and insurance.
    #[serde(rename = "Healthcare")]
    Healthcare,
    /// Courses, books and fees.
    #[serde(rename = "Education")]
    Education,
    /// Flights, accommodation and holidays.
    #[serde(rename = "Travel")]
    Travel,
    /// Wages from employment.
    #[serde(rename = "Salary")]
    Salary,
    /// Anything that fits no other category.
    #[serde(rename = "Other")]
    Other,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 10] = [
        Category::FoodAndDining,
        Category::Transportation,
        Category::Shopping,
        Category::Entertainment,
        Category::BillsAndUtilities,
        Category::Healthcare,
        Category::Education,
        Category::Travel,
        Category::Salary,
        Category::Other,
    ];

    /// The label used in JSON, query strings and the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::FoodAndDining => "Food & Dining",
            Category::Transportation => "Transportation",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::BillsAndUtilities => "Bills & Utilities",
            Category::Healthcare => "Healthcare",
            Category::Education => "Education",
            Category::Travel => "Travel",
            Category::Salary => "Salary",
            Category::Other => "Other",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_owned()))
    }
}

macro_rules! impl_sql_for_label {
    ($label_type:ty) => {
        impl ToSql for $label_type {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $label_type {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|error| FromSqlError::Other(Box::new(error)))
            }
        }
    };
}

impl_sql_for_label!(ExpenseType);
impl_sql_for_label!(Category);

/// A single income or expense entry owned by one user.
///
/// To create a new `Expense`, use [Expense::build].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// A short name for the record, e.g. "Coffee".
    pub title: String,
    /// How much money moved. Always positive, the direction is given by `kind`.
    pub amount: f64,
    /// Whether this is income or an expense.
    #[serde(rename = "type")]
    pub kind: ExpenseType,
    /// The category the record is filed under.
    pub category: Category,
    /// When the money moved.
    pub date: Date,
    /// Optional free text notes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The user that owns the record.
    pub user_id: UserID,
    /// When the record was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the record was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Expense {
    /// Create a new expense.
    ///
    /// Shortcut for [ExpenseBuilder] for discoverability.
    pub fn build(
        title: &str,
        amount: f64,
        kind: ExpenseType,
        category: Category,
        date: Date,
    ) -> ExpenseBuilder {
        ExpenseBuilder {
            title: title.to_owned(),
            amount,
            kind,
            category,
            date,
            description: None,
        }
    }
}

/// The validated fields of an expense that has not been saved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseBuilder {
    /// A short name for the record.
    pub title: String,
    /// How much money moved.
    pub amount: f64,
    /// Whether this is income or an expense.
    pub kind: ExpenseType,
    /// The category the record is filed under.
    pub category: Category,
    /// When the money moved.
    pub date: Date,
    /// Optional free text notes.
    pub description: Option<String>,
}

impl ExpenseBuilder {
    /// Set the description for the expense.
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}

/// A partial change to an expense. Fields set to `None` are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseUpdate {
    /// The new title.
    pub title: Option<String>,
    /// The new amount.
    pub amount: Option<f64>,
    /// The new type.
    pub kind: Option<ExpenseType>,
    /// The new category.
    pub category: Option<Category>,
    /// The new date.
    pub date: Option<Date>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
}

impl ExpenseUpdate {
    /// Whether the update would change nothing.
    pub fn is_empty(&self) -> bool {
        self == &ExpenseUpdate::default()
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

pub(crate) const EXPENSE_COLUMNS: &str =
    "id, title, amount, type, category, date, description, user_id, created_at, updated_at";

/// Turn a missing row into [Error::ExpenseNotFound].
fn expense_not_found(error: rusqlite::Error) -> Error {
    match Error::from(error) {
        Error::NotFound => Error::ExpenseNotFound,
        error => error,
    }
}

/// Create a new expense owned by `user_id`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn create_expense(
    user_id: UserID,
    builder: ExpenseBuilder,
    connection: &Connection,
) -> Result<Expense, Error> {
    let now = timestamp_now();

    connection
        .prepare(&format!(
            "INSERT INTO expense (title, amount, type, category, date, description, user_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
             RETURNING {EXPENSE_COLUMNS}"
        ))?
        .query_row(
            (
                builder.title,
                builder.amount,
                builder.kind,
                builder.category,
                builder.date,
                builder.description,
                user_id.as_i64(),
                now,
            ),
            map_expense_row,
        )
        .map_err(Error::from)
}

/// Retrieve an expense by its `id`, regardless of who owns it.
///
/// # Errors
/// This function will return a:
/// - [Error::ExpenseNotFound] if `id` does not refer to a saved expense,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_expense(id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    connection
        .prepare(&format!("SELECT {EXPENSE_COLUMNS} FROM expense WHERE id = :id"))?
        .query_row(&[(":id", &id)], map_expense_row)
        .map_err(expense_not_found)
}

/// Apply `update` to the expense with `id` and return the new version.
///
/// # Errors
/// This function will return a:
/// - [Error::ExpenseNotFound] if `id` does not refer to a saved expense,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_expense(
    id: ExpenseId,
    update: ExpenseUpdate,
    connection: &Connection,
) -> Result<Expense, Error> {
    let clear_or_set_description = update.description.is_some();

    connection
        .prepare(&format!(
            "UPDATE expense SET
                title = COALESCE(?1, title),
                amount = COALESCE(?2, amount),
                type = COALESCE(?3, type),
                category = COALESCE(?4, category),
                date = COALESCE(?5, date),
                description = CASE WHEN ?6 THEN ?7 ELSE description END,
                updated_at = ?8
             WHERE id = ?9
             RETURNING {EXPENSE_COLUMNS}"
        ))?
        .query_row(
            (
                update.title,
                update.amount,
                update.kind,
                update.category,
                update.date,
                clear_or_set_description,
                update.description.flatten(),
                timestamp_now(),
                id,
            ),
            map_expense_row,
        )
        .map_err(expense_not_found)
}

/// Delete the expense with `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::ExpenseNotFound] if `id` does not refer to a saved expense,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_expense(id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM expense WHERE id = ?1", (id,))?;

    if rows_affected == 0 {
        return Err(Error::ExpenseNotFound);
    }

    Ok(())
}

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                amount REAL NOT NULL CHECK (amount > 0),
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                category TEXT NOT NULL,
                date TEXT NOT NULL,
                description TEXT,
                user_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
                )",
        (),
    )?;

    // Every listing and aggregate is scoped by user and usually by date.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_user_date ON expense(user_id, date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to an Expense.
pub fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        title: row.get(1)?,
        amount: row.get(2)?,
        kind: row.get(3)?,
        category: row.get(4)?,
        date: row.get(5)?,
        description: row.get(6)?,
        user_id: UserID::new(row.get(7)?),
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod label_tests {
    use super::{Category, ExpenseType};

    #[test]
    fn category_labels_round_trip() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
            assert_eq!(
                serde_json::to_value(category).unwrap(),
                serde_json::json!(category.as_str())
            );
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!("Groceries".parse::<Category>().is_err());
        assert!("food & dining".parse::<Category>().is_err());
    }

    #[test]
    fn expense_type_parses_lowercase_only() {
        assert_eq!("income".parse(), Ok(ExpenseType::Income));
        assert!("Income".parse::<ExpenseType>().is_err());
    }
}
