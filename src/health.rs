//! The liveness probe.

use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use rusqlite::Connection;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{AppState, Error, config::Environment, json::ApiResponse};

#[derive(Debug, Clone)]
pub struct HealthState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub environment: Environment,
}

impl FromRef<AppState> for HealthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            environment: state.environment,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Health {
    status: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
    environment: Environment,
    database: &'static str,
}

/// Handle `GET /api/health`.
///
/// Responds with 503 if the database does not answer a trivial query.
pub async fn get_health(State(state): State<HealthState>) -> Result<ApiResponse<Health>, Error> {
    ping_database(&state.db_connection)?;

    Ok(ApiResponse::ok(Health {
        status: "ok",
        timestamp: OffsetDateTime::now_utc(),
        environment: state.environment,
        database: "connected",
    }))
}

fn ping_database(db_connection: &Mutex<Connection>) -> Result<(), Error> {
    let connection = db_connection
        .lock()
        .map_err(|error| Error::DatabaseUnavailable(error.to_string()))?;

    connection
        .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
        .map(|_| ())
        .map_err(|error| Error::DatabaseUnavailable(error.to_string()))
}
