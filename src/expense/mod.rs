//! Income and expense records: storage, validation and the HTTP endpoints.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{AppState, pagination::PaginationConfig};

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod form;
mod get_endpoint;
mod list_endpoint;
mod ownership;
mod query;
mod stats_endpoint;

pub use core::{Category, Expense, ExpenseType, create_expense, create_expense_table};
pub use create_endpoint::create_expense_endpoint;
pub use delete_endpoint::{delete_all_expenses_endpoint, delete_expense_endpoint};
pub use edit_endpoint::update_expense_endpoint;
pub use get_endpoint::get_expense_endpoint;
pub use list_endpoint::list_expenses_endpoint;
pub use stats_endpoint::get_expense_stats_endpoint;

#[cfg(test)]
pub use core::ExpenseUpdate;
#[cfg(test)]
pub use query::{DateRange, ExpenseFilter, count_expenses_for_user};

/// The state needed by the expense endpoints.
#[derive(Debug, Clone)]
pub struct ExpenseState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The page size defaults and limits for listing expenses.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config,
        }
    }
}
