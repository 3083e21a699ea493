//! Endpoints for the logged in user's own account.

use axum::{Extension, extract::State};
use serde::Serialize;

use crate::{
    Error,
    db::lock_connection,
    json::{ApiResponse, JsonBody},
    user::{User, update_user_password, update_user_profile},
};

use super::{
    form::{ChangePasswordForm, PasswordChange, ProfileForm, ProfileUpdate},
    middleware::AuthState,
    password::{hash_password, verify_password},
};

#[derive(Debug, Serialize)]
pub struct UserData {
    user: User,
}

/// Handle `GET /api/auth/me`.
pub async fn get_me_endpoint(Extension(user): Extension<User>) -> ApiResponse<UserData> {
    ApiResponse::ok(UserData { user })
}

/// Handle `PUT /api/auth/profile`, changing the name and/or email.
pub async fn update_profile_endpoint(
    State(state): State<AuthState>,
    Extension(user): Extension<User>,
    JsonBody(form): JsonBody<ProfileForm>,
) -> Result<ApiResponse<UserData>, Error> {
    let ProfileUpdate { name, email } = form.into_update()?;

    let connection = lock_connection(&state.db_connection)?;
    let user = update_user_profile(user.id, name.as_deref(), email.as_ref(), &connection)?;

    Ok(ApiResponse::ok(UserData { user }).with_message("Profile updated successfully"))
}

/// Handle `PUT /api/auth/change-password`.
///
/// The caller must prove they know the current password. Existing tokens stay valid.
pub async fn change_password_endpoint(
    State(state): State<AuthState>,
    Extension(user): Extension<User>,
    JsonBody(form): JsonBody<ChangePasswordForm>,
) -> Result<ApiResponse<()>, Error> {
    let PasswordChange {
        current_password,
        new_password,
    } = form.into_password_change()?;

    if !verify_password(user.password_hash, current_password).await? {
        return Err(Error::IncorrectPassword);
    }

    let password_hash = hash_password(new_password, state.password_cost).await?;

    let connection = lock_connection(&state.db_connection)?;
    update_user_password(user.id, &password_hash, &connection)?;

    tracing::info!("User {} changed their password", user.id);

    Ok(ApiResponse::ok(()).with_message("Password changed successfully"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    use crate::test_utils::{TEST_PASSWORD, get_test_server, register_test_user};

    #[tokio::test]
    async fn me_returns_caller() {
        let (server, _) = get_test_server();
        let token = register_test_user(&server, "alice@example.com").await;

        let response = server
            .get("/api/auth/me")
            .add_header("Authorization", format!("Bearer {token}"))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["user"]["email"], "alice@example.com");
        assert!(body["data"]["user"].get("password").is_none());
    }

    #[tokio::test]
    async fn me_needs_token() {
        let (server, _) = get_test_server();

        server
            .get("/api/auth/me")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn update_name_keeps_email() {
        let (server, _) = get_test_server();
        let token = register_test_user(&server, "alice@example.com").await;

        let response = server
            .put("/api/auth/profile")
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&json!({ "name": "Alice Smith" }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "Profile updated successfully");
        assert_eq!(body["data"]["user"]["name"], "Alice Smith");
        assert_eq!(body["data"]["user"]["email"], "alice@example.com");
    }

    #[tokio::test]
    async fn update_to_taken_email_is_rejected() {
        let (server, _) = get_test_server();
        let token = register_test_user(&server, "alice@example.com").await;
        register_test_user(&server, "bob@example.com").await;

        let response = server
            .put("/api/auth/profile")
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&json!({ "email": "bob@example.com" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["errors"][0]["field"], "email");
    }

    #[tokio::test]
    async fn change_password_then_log_in_with_new_one() {
        let (server, _) = get_test_server();
        let token = register_test_user(&server, "alice@example.com").await;

        let response = server
            .put("/api/auth/change-password")
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&json!({ "currentPassword": TEST_PASSWORD, "newPassword": "Changed456" }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "Password changed successfully");

        server
            .post("/api/auth/login")
            .json(&json!({ "email": "alice@example.com", "password": TEST_PASSWORD }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .post("/api/auth/login")
            .json(&json!({ "email": "alice@example.com", "password": "Changed456" }))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn wrong_current_password_is_rejected() {
        let (server, _) = get_test_server();
        let token = register_test_user(&server, "alice@example.com").await;

        let response = server
            .put("/api/auth/change-password")
            .add_header("Authorization", format!("Bearer {token}"))
            .json(&json!({ "currentPassword": "Wrong123", "newPassword": "Changed456" }))
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["message"], "Current password is incorrect");
    }
}
