//! Authentication middleware that resolves the bearer token to a user.

use std::sync::{Arc, Mutex};

use axum::{
    RequestPartsExt,
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    db::lock_connection,
    user::{User, UserID, get_user_by_id},
};

use super::token::TokenManager;

/// The state needed for the auth middleware and the account endpoints.
#[derive(Debug, Clone)]
pub struct AuthState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Issues and checks session tokens.
    pub token_manager: TokenManager,
    /// The bcrypt cost for hashing new passwords.
    pub password_cost: u32,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            token_manager: state.token_manager.clone(),
            password_cost: state.password_cost,
        }
    }
}

/// Middleware function that checks for a valid bearer token.
///
/// The token's user is placed into the request and the request executed
/// normally if the token is valid and the user still exists, otherwise a 401
/// response is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user): Extension<User>` to receive the user.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    match authenticate(&state, request).await {
        Ok(request) => next.run(request).await,
        Err(error) => error.into_response(),
    }
}

async fn authenticate(state: &AuthState, request: Request) -> Result<Request, Error> {
    let (mut parts, body) = request.into_parts();

    let TypedHeader(Authorization(bearer)) = parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|_| Error::MissingToken)?;

    let user_id = state.token_manager.verify(bearer.token())?;
    let user = find_user(state, user_id)?;

    parts.extensions.insert(user);

    Ok(Request::from_parts(parts, body))
}

fn find_user(state: &AuthState, user_id: UserID) -> Result<User, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_user_by_id(user_id, &connection).map_err(|error| match error {
        Error::NotFound => {
            tracing::warn!("Got a valid token for user {user_id} who no longer exists");
            Error::UserNotFound
        }
        error => error,
    })
}
