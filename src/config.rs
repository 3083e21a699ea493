//! Command line and environment configuration for the server.

use std::fmt::Display;

use clap::{Parser, ValueEnum};
use serde::Serialize;
use time::Duration;

/// The mode the server runs in.
///
/// Production shortens session tokens and hides internal error text from clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development and testing.
    #[default]
    Development,
    /// A deployed server.
    Production,
}

impl Environment {
    /// Whether this is the production environment.
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }

    /// How long a session token stays valid after it is issued.
    pub fn token_lifetime(self) -> Duration {
        match self {
            Environment::Production => Duration::days(7),
            Environment::Development => Duration::days(30),
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// The REST API server for the expense tracker.
///
/// Every option can also be set through the environment variable named in
/// its help text, including from a `.env` file.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// File path to the application SQLite database.
    #[arg(long, env = "DATABASE_PATH", default_value = "expense_tracker.db")]
    pub db_path: String,

    /// The port to serve the application from.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// The secret used to sign session tokens.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// The environment the server runs in.
    #[arg(long, env = "APP_ENV", value_enum, default_value_t = Environment::Development)]
    pub environment: Environment,

    /// The origin of the web client allowed to make cross-origin requests.
    ///
    /// Any origin is allowed when this is not set.
    #[arg(long, env = "CLIENT_URL")]
    pub client_url: Option<String>,
}
