#![allow(missing_docs)]

use axum::http::StatusCode;
use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::{Value, json};

use crate::{
    AppState, build_router,
    auth::{PasswordHash, ValidatedPassword},
    config::Environment,
    email::Email,
    pagination::PaginationConfig,
    user::{NewUser, User, create_user},
};

/// Satisfies the password policy.
pub(crate) const TEST_PASSWORD: &str = "Secret123";

const TEST_JWT_SECRET: &str = "42";

/// bcrypt's lowest cost, keeps the tests fast.
const TEST_PASSWORD_COST: u32 = 4;

pub(crate) fn get_test_app_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open database in memory.");

    AppState::new(
        connection,
        TEST_JWT_SECRET,
        Environment::Development,
        PaginationConfig::default(),
    )
    .expect("Could not create app state.")
    .with_password_cost(TEST_PASSWORD_COST)
}

pub(crate) fn get_test_server() -> (TestServer, AppState) {
    let state = get_test_app_state();
    let app = build_router(state.clone(), None);
    let server = TestServer::new(app);

    (server, state)
}

/// Register a user through the API and return their token.
pub(crate) async fn register_test_user(server: &TestServer, email: &str) -> String {
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "name": "Test User",
            "email": email,
            "password": TEST_PASSWORD,
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();

    body["data"]["token"]
        .as_str()
        .expect("Register response did not contain a token.")
        .to_owned()
}

/// Create an expense through the API and return the created record as JSON.
pub(crate) async fn create_test_expense(server: &TestServer, token: &str, payload: Value) -> Value {
    let response = server
        .post("/api/expenses")
        .add_header("Authorization", format!("Bearer {token}"))
        .json(&payload)
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();

    body["data"]["expense"].clone()
}

/// Insert a user straight into the database, skipping the API.
pub(crate) fn insert_test_user(connection: &Connection, email: &str) -> User {
    let password_hash = PasswordHash::new(
        &ValidatedPassword::new_unchecked(TEST_PASSWORD),
        TEST_PASSWORD_COST,
    )
    .expect("Could not hash test password.");

    create_user(
        NewUser {
            name: "Test User".to_owned(),
            email: Email::new(email).expect("Invalid test email."),
            password_hash,
        },
        connection,
    )
    .expect("Could not create test user.")
}
