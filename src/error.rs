//! Defines the app level error type and its conversion into the JSON error envelope.

use axum::{
    extract::{
        Request, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header::CONTENT_LENGTH},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{config::Environment, json::ErrorBody, validation::FieldError};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// One or more fields in the request failed validation.
    ///
    /// Every violated field is listed so the client can fix them all at once.
    #[error("validation failed: {0:?}")]
    Validation(Vec<FieldError>),

    /// The request body could not be parsed as JSON of the expected shape.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// The email is already registered to another user.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// The email/password combination used to log in is wrong.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The current password given when changing passwords did not match.
    #[error("current password is incorrect")]
    IncorrectPassword,

    /// The request did not carry a bearer token.
    #[error("no bearer token in the request")]
    MissingToken,

    /// The bearer token was valid once, but its expiry has passed.
    #[error("the bearer token has expired")]
    ExpiredToken,

    /// The bearer token could not be decoded or its signature is wrong.
    #[error("the bearer token is invalid")]
    InvalidToken,

    /// The bearer token is valid but the user it refers to no longer exists.
    #[error("the user for the bearer token does not exist")]
    UserNotFound,

    /// The authenticated user does not own the requested expense.
    #[error("the expense belongs to another user")]
    Forbidden,

    /// The requested expense does not exist.
    #[error("the expense could not be found")]
    ExpenseNotFound,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// No route matches the request path.
    #[error("no route for {0}")]
    RouteNotFound(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A session token could not be signed.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// An error occurred while serializing a response as JSON.
    #[error("could not serialize as JSON: {0}")]
    JsonSerialization(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The database did not answer the health check.
    #[error("the database is unavailable: {0}")]
    DatabaseUnavailable(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                Some(ref desc),
            ) if desc.ends_with("user.email") => Error::DuplicateEmail,
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidBody(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::Validation(vec![FieldError::new("query", rejection.body_text())])
    }
}

const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong. Please try again later.";

/// The internal error text for a 500 response.
///
/// It rides along in the response extensions so [attach_error_detail] can
/// decide whether the client gets to see it.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail {
    message: String,
    detail: String,
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::InvalidBody(_) | Error::DuplicateEmail => {
                StatusCode::BAD_REQUEST
            }
            Error::InvalidCredentials
            | Error::IncorrectPassword
            | Error::MissingToken
            | Error::ExpiredToken
            | Error::InvalidToken
            | Error::UserNotFound => StatusCode::UNAUTHORIZED,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::ExpenseNotFound | Error::NotFound | Error::RouteNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Error::DatabaseUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::HashingError(_)
            | Error::TokenCreation(_)
            | Error::JsonSerialization(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to the client.
    fn client_message(&self) -> String {
        match self {
            Error::Validation(_) => "Validation failed".to_owned(),
            Error::InvalidBody(_) => "Request body must be valid JSON".to_owned(),
            Error::DuplicateEmail => "A user with this email already exists".to_owned(),
            Error::InvalidCredentials => "Invalid email or password".to_owned(),
            Error::IncorrectPassword => "Current password is incorrect".to_owned(),
            Error::MissingToken => "Access denied. No token provided.".to_owned(),
            Error::ExpiredToken => "Token has expired. Please log in again.".to_owned(),
            Error::InvalidToken => "Invalid token.".to_owned(),
            Error::UserNotFound => "User not found. Token is no longer valid.".to_owned(),
            Error::Forbidden => "Access denied. You can only access your own expenses.".to_owned(),
            Error::ExpenseNotFound => "Expense not found".to_owned(),
            Error::NotFound => "Resource not found".to_owned(),
            Error::RouteNotFound(path) => format!("Route {path} not found"),
            Error::DatabaseUnavailable(_) => "Database unavailable".to_owned(),
            _ => INTERNAL_ERROR_MESSAGE.to_owned(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.client_message();

        let body = match self {
            Error::Validation(errors) => ErrorBody::new(message).with_errors(errors),
            Error::DuplicateEmail => ErrorBody::new(message).with_errors(vec![FieldError::new(
                "email",
                "Email is already registered",
            )]),
            Error::InvalidBody(reason) => ErrorBody::new(message).with_errors(vec![FieldError::new(
                "body", reason,
            )]),
            error if status.is_server_error() => {
                tracing::error!("An unexpected error occurred: {}", error);

                let detail = InternalErrorDetail {
                    message: message.clone(),
                    detail: error.to_string(),
                };
                let mut response = (status, ErrorBody::new(message)).into_response();
                response.extensions_mut().insert(detail);
                return response;
            }
            _ => ErrorBody::new(message),
        };

        (status, body).into_response()
    }
}

/// Middleware that adds the internal error text to 5xx responses outside of
/// production, so developers can see what went wrong without reading the logs.
pub async fn attach_error_detail(
    State(environment): State<Environment>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    if environment.is_production() {
        return response;
    }

    let InternalErrorDetail { message, detail } =
        match response.extensions().get::<InternalErrorDetail>() {
            Some(detail) => detail.clone(),
            None => return response,
        };

    let (mut parts, _) = response.into_parts();
    parts.headers.remove(CONTENT_LENGTH);
    let body = ErrorBody::new(message).with_detail(detail);

    (parts.status, parts.headers, body).into_response()
}
