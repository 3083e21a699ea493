//! The API endpoint URIs.

/// The route for creating a new account.
pub const REGISTER: &str = "/api/auth/register";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/auth/login";
/// The route for getting the logged in user.
pub const ME: &str = "/api/auth/me";
/// The route for changing the logged in user's name or email.
pub const PROFILE: &str = "/api/auth/profile";
/// The route for changing the logged in user's password.
pub const CHANGE_PASSWORD: &str = "/api/auth/change-password";
/// The route to access the logged in user's expenses.
pub const EXPENSES: &str = "/api/expenses";
/// The route for totals over the logged in user's expenses.
pub const EXPENSE_STATS: &str = "/api/expenses/stats";
/// The route to access a single expense.
pub const EXPENSE: &str = "/api/expenses/{id}";
/// The liveness probe.
pub const HEALTH: &str = "/api/health";
