//! Summarises the caller's income and spending.

use axum::{Extension, extract::State};
use serde::Serialize;

use crate::{
    Error,
    db::lock_connection,
    json::{ApiResponse, QueryParams},
    user::User,
};

use super::{
    ExpenseState,
    form::StatsQuery,
    query::{CategoryTotal, TypeTotals, sum_by_category, sum_by_type},
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseStats {
    summary: TypeTotals,
    category_breakdown: Vec<CategoryTotal>,
}

/// Handle `GET /api/expenses/stats`, optionally limited by `startDate` and `endDate`.
pub async fn get_expense_stats_endpoint(
    State(state): State<ExpenseState>,
    Extension(user): Extension<User>,
    QueryParams(query): QueryParams<StatsQuery>,
) -> Result<ApiResponse<ExpenseStats>, Error> {
    let date_range = query.into_date_range()?;

    let connection = lock_connection(&state.db_connection)?;
    let summary = sum_by_type(user.id, date_range, &connection)?;
    let category_breakdown = sum_by_category(user.id, date_range, &connection)?;

    Ok(ApiResponse::ok(ExpenseStats {
        summary,
        category_breakdown,
    }))
}
