//! Creating a new account.

use axum::extract::State;
use serde::Serialize;

use crate::{
    Error,
    db::lock_connection,
    json::{ApiResponse, JsonBody},
    user::{NewUser, User, create_user},
};

use super::{
    form::{RegisterForm, Registration},
    middleware::AuthState,
    password::hash_password,
};

/// The `data` payload for register and log in: the user and a fresh session token.
#[derive(Debug, Serialize)]
pub struct AuthData {
    pub(crate) user: User,
    pub(crate) token: String,
}

/// Handle `POST /api/auth/register`.
///
/// The new user is logged in straight away, so the response carries a token.
pub async fn register_endpoint(
    State(state): State<AuthState>,
    JsonBody(form): JsonBody<RegisterForm>,
) -> Result<ApiResponse<AuthData>, Error> {
    let Registration {
        name,
        email,
        password,
    } = form.into_registration()?;

    let password_hash = hash_password(password, state.password_cost).await?;

    let user = {
        let connection = lock_connection(&state.db_connection)?;
        create_user(
            NewUser {
                name,
                email,
                password_hash,
            },
            &connection,
        )?
    };

    let token = state.token_manager.issue(user.id)?;

    tracing::info!("Registered user {}", user.id);

    Ok(ApiResponse::created(AuthData { user, token }).with_message("User registered successfully"))
}
