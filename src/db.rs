//! Database setup shared by the server and the admin tools.

use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, Transaction, TransactionBehavior};
use time::{Duration, OffsetDateTime};

use crate::{Error, expense::create_expense_table, user::create_user_table};

/// Create the tables for the domain models if they do not exist yet.
///
/// Foreign keys are switched on for `connection` so deleting a user also
/// deletes their expenses.
///
/// # Errors
/// Returns an error if a table could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_expense_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Lock the shared database connection.
///
/// # Errors
/// Returns [Error::DatabaseLockError] if another thread panicked while holding the lock.
pub fn lock_connection(connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, Error> {
    connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}

/// The current UTC time truncated to whole milliseconds.
///
/// Stored timestamps use this precision so values read back from the database
/// compare equal to the ones that were written.
pub fn timestamp_now() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    let sub_millisecond = i64::from(now.nanosecond() % 1_000_000);

    now - Duration::nanoseconds(sub_millisecond)
}
