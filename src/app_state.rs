//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{
    Error, auth::PasswordHash, auth::TokenManager, config::Environment, db::initialize,
    pagination::PaginationConfig,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// Issues and checks session tokens.
    pub token_manager: TokenManager,

    /// Whether the server runs in development or production.
    pub environment: Environment,

    /// The config that controls how to page lists of expenses.
    pub pagination_config: PaginationConfig,

    /// The bcrypt cost for hashing new passwords.
    pub password_cost: u32,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the
    /// domain models. Tokens are signed with `jwt_secret` and live as long as
    /// `environment` allows.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        jwt_secret: &str,
        environment: Environment,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            token_manager: TokenManager::new(jwt_secret, environment.token_lifetime()),
            environment,
            pagination_config,
            password_cost: PasswordHash::DEFAULT_COST,
        })
    }

    /// Use `cost` for hashing passwords instead of the default.
    ///
    /// Lower costs make tests fast, but should never be used in production.
    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }
}

impl FromRef<AppState> for Environment {
    fn from_ref(state: &AppState) -> Self {
        state.environment
    }
}
