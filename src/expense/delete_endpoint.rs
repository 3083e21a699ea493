//! Endpoints for deleting one or all of the caller's expenses.

use axum::{
    Extension,
    extract::{Path, State},
};
use serde::Serialize;

use crate::{Error, db::lock_connection, json::ApiResponse, user::User};

use super::{
    ExpenseState,
    core::delete_expense,
    ownership::{check_ownership, parse_expense_id},
    query::delete_all_expenses_for_user,
};

/// Handle `DELETE /api/expenses/{id}`. The record must belong to the caller.
pub async fn delete_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(user): Extension<User>,
    Path(raw_id): Path<String>,
) -> Result<ApiResponse<()>, Error> {
    let expense_id = parse_expense_id(&raw_id)?;

    let connection = lock_connection(&state.db_connection)?;
    check_ownership(expense_id, user.id, &connection)?;
    delete_expense(expense_id, &connection)?;

    Ok(ApiResponse::ok(()).with_message("Expense deleted successfully"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedCount {
    deleted_count: u64,
}

/// Handle `DELETE /api/expenses`, removing every record the caller owns.
pub async fn delete_all_expenses_endpoint(
    State(state): State<ExpenseState>,
    Extension(user): Extension<User>,
) -> Result<ApiResponse<DeletedCount>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let deleted_count = delete_all_expenses_for_user(user.id, &connection)?;

    tracing::info!("Deleted {deleted_count} expenses for user {}", user.id);

    Ok(
        ApiResponse::ok(DeletedCount { deleted_count })
            .with_message(format!("{deleted_count} expenses deleted successfully")),
    )
}
