//! Applies partial updates to an expense owned by the caller.

use axum::{
    Extension,
    extract::{Path, State},
};

use crate::{
    Error,
    db::lock_connection,
    json::{ApiResponse, JsonBody},
    user::User,
};

use super::{
    ExpenseState,
    core::update_expense,
    create_endpoint::ExpenseData,
    form::ExpenseForm,
    ownership::{check_ownership, parse_expense_id},
};

/// Handle `PUT /api/expenses/{id}`.
///
/// Only the fields present in the body are changed. The record must belong to the caller.
pub async fn update_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(user): Extension<User>,
    Path(raw_id): Path<String>,
    JsonBody(form): JsonBody<ExpenseForm>,
) -> Result<ApiResponse<ExpenseData>, Error> {
    let expense_id = parse_expense_id(&raw_id)?;
    let update = form.into_update()?;

    let connection = lock_connection(&state.db_connection)?;
    check_ownership(expense_id, user.id, &connection)?;
    let expense = update_expense(expense_id, update, &connection)?;

    Ok(ApiResponse::ok(ExpenseData { expense }).with_message("Expense updated successfully"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::test_utils::{create_test_expense, get_test_server, register_test_user};

    fn rent() -> Value {
        json!({
            "title": "Rent",
            "amount": 1200,
            "type": "expense",
            "category": "Bills & Utilities",
            "date": "2024-03-01",
            "description": "March",
        })
    }

    #[tokio::test]
    async fn updates_only_sent_fields() {
        let (server, _) = get_test_server();
        let token = register_test_user(&server, "alice@example.com").await;
        let created = create_test_expense(&server, &token, rent()).await;

        let response = server
            .put(&format!("/api/expenses/{}", created["id"]))
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&json!({ "amount": 1250.5, "description": "" }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        let updated = &body["data"]["expense"];
        assert_eq!(body["message"], "Expense updated successfully");
        assert_eq!(updated["amount"], 1250.5);
        assert_eq!(updated["title"], "Rent");
        assert_eq!(updated["createdAt"], created["createdAt"]);
        assert!(updated.get("description").is_none());
    }

    #[tokio::test]
    async fn other_users_cannot_update() {
        let (server, _) = get_test_server();
        let alice = register_test_user(&server, "alice@example.com").await;
        let bob = register_test_user(&server, "bob@example.com").await;
        let created = create_test_expense(&server, &alice, rent()).await;

        server
            .put(&format!("/api/expenses/{}", created["id"]))
            .add_header("Authorization", format!("Bearer {bob}"))
            .json(&json!({ "amount": 1 }))
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let response = server
            .get(&format!("/api/expenses/{}", created["id"]))
            .add_header("Authorization", format!("Bearer {alice}"))
            .await;
        let body: Value = response.json();
        assert_eq!(body["data"]["expense"], created);
    }

    #[tokio::test]
    async fn invalid_update_is_rejected() {
        let (server, _) = get_test_server();
        let token = register_test_user(&server, "alice@example.com").await;
        let created = create_test_expense(&server, &token, rent()).await;

        let response = server
            .put(&format!("/api/expenses/{}", created["id"]))
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&json!({ "type": "refund" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["errors"][0]["field"], "type");
    }

    #[tokio::test]
    async fn empty_update_is_rejected() {
        let (server, _) = get_test_server();
        let token = register_test_user(&server, "alice@example.com").await;
        let created = create_test_expense(&server, &token, rent()).await;

        server
            .put(&format!("/api/expenses/{}", created["id"]))
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&json!({}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
