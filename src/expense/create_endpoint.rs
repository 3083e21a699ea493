//! Records a new income or expense for the caller.

use axum::{Extension, extract::State};
use serde::Serialize;

use crate::{
    Error,
    db::lock_connection,
    json::{ApiResponse, JsonBody},
    user::User,
};

use super::{
    ExpenseState,
    core::{Expense, create_expense},
    form::ExpenseForm,
};

/// The `data` payload for endpoints that return a single expense.
#[derive(Debug, Serialize)]
pub struct ExpenseData {
    pub(crate) expense: Expense,
}

/// Handle `POST /api/expenses`. The new record is owned by the caller.
pub async fn create_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(user): Extension<User>,
    JsonBody(form): JsonBody<ExpenseForm>,
) -> Result<ApiResponse<ExpenseData>, Error> {
    let builder = form.into_builder()?;

    let connection = lock_connection(&state.db_connection)?;
    let expense = create_expense(user.id, builder, &connection)?;

    tracing::debug!("User {} created expense {}", user.id, expense.id);

    Ok(ApiResponse::created(ExpenseData { expense }).with_message("Expense created successfully"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::{
        email::Email,
        expense::{ExpenseFilter, count_expenses_for_user},
        test_utils::{get_test_server, register_test_user},
        user::get_user_by_email,
    };

    fn coffee() -> Value {
        json!({
            "title": "Coffee",
            "amount": 4.50,
            "type": "expense",
            "category": "Food & Dining",
            "date": "2024-03-01",
        })
    }

    #[tokio::test]
    async fn creates_expense_owned_by_caller() {
        let (server, state) = get_test_server();
        let token = register_test_user(&server, "alice@example.com").await;

        let response = server
            .post("/api/expenses")
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&coffee())
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        let alice = get_user_by_email(
            &Email::new("alice@example.com").unwrap(),
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Expense created successfully");
        let expense = &body["data"]["expense"];
        assert_eq!(expense["title"], "Coffee");
        assert_eq!(expense["amount"], 4.5);
        assert_eq!(expense["type"], "expense");
        assert_eq!(expense["category"], "Food & Dining");
        assert_eq!(expense["date"], "2024-03-01");
        assert_eq!(expense["userId"], alice.id.as_i64());
        assert!(expense.get("description").is_none());
    }

    #[tokio::test]
    async fn invalid_category_is_not_persisted() {
        let (server, state) = get_test_server();
        let token = register_test_user(&server, "alice@example.com").await;
        let mut payload = coffee();
        payload["category"] = json!("Groceries");

        let response = server
            .post("/api/expenses")
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&payload)
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["status"], "error");
        assert_eq!(body["errors"][0]["field"], "category");

        let connection = state.db_connection.lock().unwrap();
        let alice =
            get_user_by_email(&Email::new("alice@example.com").unwrap(), &connection).unwrap();
        assert_eq!(
            count_expenses_for_user(alice.id, &ExpenseFilter::default(), &connection).unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn malformed_body_is_rejected() {
        let (server, _) = get_test_server();
        let token = register_test_user(&server, "alice@example.com").await;

        let response = server
            .post("/api/expenses")
            .add_header("Authorization", format!("Bearer {token}"))
            .content_type("application/json")
            .bytes("{\"title\": ".into())
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["errors"][0]["field"], "body");
    }
}
