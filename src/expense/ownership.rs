//! Record level access control.
//!
//! Handlers that act on a single expense first parse the ID from the path,
//! then call [check_ownership] before touching the record.

use rusqlite::Connection;

use crate::{Error, user::UserID, validation::FieldError};

use super::core::{Expense, ExpenseId, get_expense};

/// Parse the expense ID from a path segment.
///
/// # Errors
///
/// Returns a validation error on the `id` field if `raw_id` is not a positive integer.
pub fn parse_expense_id(raw_id: &str) -> Result<ExpenseId, Error> {
    raw_id
        .parse::<ExpenseId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| {
            Error::Validation(vec![FieldError::new("id", "Invalid expense ID")])
        })
}

/// Load the expense with `expense_id` and check that `user_id` owns it.
///
/// # Errors
///
/// Returns [Error::ExpenseNotFound] if there is no such expense and
/// [Error::Forbidden] if it belongs to someone else.
pub fn check_ownership(
    expense_id: ExpenseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Expense, Error> {
    let expense = get_expense(expense_id, connection)?;

    if expense.user_id != user_id {
        tracing::warn!(
            "User {user_id} tried to access expense {expense_id} owned by user {}",
            expense.user_id
        );
        return Err(Error::Forbidden);
    }

    Ok(expense)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        db::initialize,
        expense::{Category, Expense, ExpenseType, create_expense},
        test_utils::insert_test_user,
        validation::FieldError,
    };

    use super::{check_ownership, parse_expense_id};

    #[test]
    fn parse_accepts_positive_integers() {
        assert_eq!(parse_expense_id("42"), Ok(42));
    }

    #[test]
    fn parse_rejects_everything_else() {
        for raw_id in ["0", "-1", "abc", "1.5", ""] {
            assert_eq!(
                parse_expense_id(raw_id),
                Err(Error::Validation(vec![FieldError::new("id", "Invalid expense ID")])),
                "accepted {raw_id:?}"
            );
        }
    }

    #[test]
    fn owner_gets_expense_others_are_forbidden() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let alice = insert_test_user(&conn, "alice@example.com");
        let bob = insert_test_user(&conn, "bob@example.com");
        let expense = create_expense(
            alice.id,
            Expense::build(
                "Coffee",
                4.5,
                ExpenseType::Expense,
                Category::FoodAndDining,
                date!(2024 - 03 - 01),
            ),
            &conn,
        )
        .unwrap();

        assert_eq!(check_ownership(expense.id, alice.id, &conn), Ok(expense.clone()));
        assert_eq!(check_ownership(expense.id, bob.id, &conn), Err(Error::Forbidden));
        assert_eq!(
            check_ownership(expense.id + 1, alice.id, &conn),
            Err(Error::ExpenseNotFound)
        );
    }
}
