//! Exchanging an email and password for a session token.

use axum::extract::State;

use crate::{
    Error,
    db::lock_connection,
    json::{ApiResponse, JsonBody},
    user::get_user_by_email,
};

use super::{
    form::{Credentials, LogInForm},
    middleware::AuthState,
    password::verify_password,
    register::AuthData,
};

/// Handle `POST /api/auth/login`.
///
/// An unknown email and a wrong password get the same response so the
/// endpoint does not reveal which emails are registered.
pub async fn log_in_endpoint(
    State(state): State<AuthState>,
    JsonBody(form): JsonBody<LogInForm>,
) -> Result<ApiResponse<AuthData>, Error> {
    let Credentials { email, password } = form.into_credentials()?;

    let user = {
        let connection = lock_connection(&state.db_connection)?;
        match get_user_by_email(&email, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return Err(Error::InvalidCredentials),
            Err(error) => return Err(error),
        }
    };

    if !verify_password(user.password_hash.clone(), password).await? {
        tracing::debug!("Wrong password for user {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    let token = state.token_manager.issue(user.id)?;

    Ok(ApiResponse::ok(AuthData { user, token }).with_message("Login successful"))
}
