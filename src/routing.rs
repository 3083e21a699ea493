//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::{
    AppState,
    auth::{
        auth_guard, change_password_endpoint, get_me_endpoint, log_in_endpoint,
        register_endpoint, update_profile_endpoint,
    },
    endpoints,
    error::attach_error_detail,
    expense::{
        create_expense_endpoint, delete_all_expenses_endpoint, delete_expense_endpoint,
        get_expense_endpoint, get_expense_stats_endpoint, list_expenses_endpoint,
        update_expense_endpoint,
    },
    health::get_health,
    logging::logging_middleware,
    not_found::get_404_not_found,
    security::{cors_layer, security_headers},
};

/// Return a router with all the app's routes.
///
/// Cross-origin requests are limited to `client_url` when it is set.
pub fn build_router(state: AppState, client_url: Option<&str>) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::REGISTER, post(register_endpoint))
        .route(endpoints::LOG_IN, post(log_in_endpoint))
        .route(endpoints::HEALTH, get(get_health));

    let protected_routes = Router::new()
        .route(endpoints::ME, get(get_me_endpoint))
        .route(endpoints::PROFILE, put(update_profile_endpoint))
        .route(endpoints::CHANGE_PASSWORD, put(change_password_endpoint))
        .route(
            endpoints::EXPENSES,
            get(list_expenses_endpoint)
                .post(create_expense_endpoint)
                .delete(delete_all_expenses_endpoint),
        )
        .route(endpoints::EXPENSE_STATS, get(get_expense_stats_endpoint))
        .route(
            endpoints::EXPENSE,
            get(get_expense_endpoint)
                .put(update_expense_endpoint)
                .delete(delete_expense_endpoint),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .method_not_allowed_fallback(get_404_not_found)
        .layer(middleware::from_fn_with_state(
            state.environment,
            attach_error_detail,
        ))
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer(client_url))
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::test_utils::{get_test_server, register_test_user};

    #[tokio::test]
    async fn expense_routes_need_a_token() {
        let (server, _) = get_test_server();

        for response in [
            server.get("/api/expenses").await,
            server.get("/api/expenses/stats").await,
            server.get("/api/expenses/1").await,
            server.delete("/api/expenses").await,
            server.post("/api/expenses").json(&json!({})).await,
        ] {
            response.assert_status(StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn stats_route_is_not_taken_for_an_id() {
        let (server, _) = get_test_server();
        let token = register_test_user(&server, "alice@example.com").await;

        server
            .get("/api/expenses/stats")
            .add_header("Authorization", format!("Bearer {token}"))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn unsupported_methods_get_error_envelope() {
        let (server, _) = get_test_server();
        let token = register_test_user(&server, "alice@example.com").await;

        for (response, path) in [
            (
                server
                    .method(Method::PATCH, "/api/expenses")
                    .add_header("Authorization", format!("Bearer {token}"))
                    .await,
                "/api/expenses",
            ),
            (server.put("/api/health").await, "/api/health"),
            (server.get("/api/auth/register").await, "/api/auth/register"),
        ] {
            response.assert_status(StatusCode::NOT_FOUND);
            response.assert_json(&json!({
                "status": "error",
                "message": format!("Route {path} not found"),
            }));
        }
    }

    #[tokio::test]
    async fn responses_carry_security_headers() {
        let (server, _) = get_test_server();

        let response = server.get("/api/health").await;

        assert_eq!(response.header("x-frame-options"), "DENY");
    }
}
