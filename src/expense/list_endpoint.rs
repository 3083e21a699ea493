//! Lists the caller's expenses one page at a time.

use axum::{Extension, extract::State};
use serde::Serialize;

use crate::{
    Error,
    db::lock_connection,
    json::{ApiResponse, QueryParams},
    pagination::PageInfo,
    user::User,
};

use super::{
    ExpenseState,
    core::Expense,
    form::ListQuery,
    query::{count_expenses_for_user, list_expenses_for_user},
};

#[derive(Debug, Serialize)]
pub struct ExpensePage {
    expenses: Vec<Expense>,
    pagination: PageInfo,
}

/// Handle `GET /api/expenses`.
///
/// Supports `page`, `limit`, `type`, `category`, `startDate` and `endDate` in the query string.
pub async fn list_expenses_endpoint(
    State(state): State<ExpenseState>,
    Extension(user): Extension<User>,
    QueryParams(query): QueryParams<ListQuery>,
) -> Result<ApiResponse<ExpensePage>, Error> {
    let params = query.into_params(&state.pagination_config)?;

    let connection = lock_connection(&state.db_connection)?;
    let expenses = list_expenses_for_user(
        user.id,
        &params.filter,
        params.page,
        params.limit,
        &connection,
    )?;
    let total_items = count_expenses_for_user(user.id, &params.filter, &connection)?;

    Ok(ApiResponse::ok(ExpensePage {
        expenses,
        pagination: PageInfo::new(params.page, params.limit, total_items),
    }))
}
