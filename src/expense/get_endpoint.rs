//! Fetches a single expense owned by the caller.

use axum::{
    Extension,
    extract::{Path, State},
};

use crate::{Error, db::lock_connection, json::ApiResponse, user::User};

use super::{
    ExpenseState,
    create_endpoint::ExpenseData,
    ownership::{check_ownership, parse_expense_id},
};

/// Handle `GET /api/expenses/{id}`. Only the owner may fetch the record.
pub async fn get_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(user): Extension<User>,
    Path(raw_id): Path<String>,
) -> Result<ApiResponse<ExpenseData>, Error> {
    let expense_id = parse_expense_id(&raw_id)?;

    let connection = lock_connection(&state.db_connection)?;
    let expense = check_ownership(expense_id, user.id, &connection)?;

    Ok(ApiResponse::ok(ExpenseData { expense }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::test_utils::{create_test_expense, get_test_server, register_test_user};

    #[tokio::test]
    async fn fetch_returns_what_was_created() {
        let (server, _) = get_test_server();
        let token = register_test_user(&server, "alice@example.com").await;
        let created = create_test_expense(&server, &token, json!({
            "title": "Books",
            "amount": 59.99,
            "type": "expense",
            "category": "Education",
            "date": "2024-09-01",
            "description": "Semester reading list",
        }))
        .await;

        let response = server
            .get(&format!("/api/expenses/{}", created["id"]))
            .add_header("Authorization", format!("Bearer {token}"))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["expense"], created);
    }

    #[tokio::test]
    async fn other_users_get_forbidden() {
        let (server, _) = get_test_server();
        let alice = register_test_user(&server, "alice@example.com").await;
        let bob = register_test_user(&server, "bob@example.com").await;
        let created = create_test_expense(&server, &alice, json!({
            "title": "Books",
            "amount": 59.99,
            "type": "expense",
            "category": "Education",
            "date": "2024-09-01",
        }))
        .await;

        let response = server
            .get(&format!("/api/expenses/{}", created["id"]))
            .add_header("Authorization", format!("Bearer {bob}"))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
        let body: Value = response.json();
        assert_eq!(
            body["message"],
            "Access denied. You can only access your own expenses."
        );
    }

    #[tokio::test]
    async fn missing_expense_is_not_found() {
        let (server, _) = get_test_server();
        let token = register_test_user(&server, "alice@example.com").await;

        let response = server
            .get("/api/expenses/9999")
            .add_header("Authorization", format!("Bearer {token}"))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["message"], "Expense not found");
    }

    #[tokio::test]
    async fn non_numeric_id_is_bad_request() {
        let (server, _) = get_test_server();
        let token = register_test_user(&server, "alice@example.com").await;

        let response = server
            .get("/api/expenses/abc")
            .add_header("Authorization", format!("Bearer {token}"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["errors"][0]["field"], "id");
    }
}
