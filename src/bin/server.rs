use std::net::SocketAddr;

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use expense_tracker_rs::{AppState, Config, PaginationConfig, build_router, graceful_shutdown};

#[tokio::main]
async fn main() {
    // A missing .env file is fine, the settings may come from the real environment.
    let _ = dotenvy::dotenv();

    setup_logging();

    let config = Config::parse();

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let connection = Connection::open(&config.db_path)
        .unwrap_or_else(|error| panic!("Could not open database at {}: {error}", config.db_path));

    let state = AppState::new(
        connection,
        &config.jwt_secret,
        config.environment,
        PaginationConfig::default(),
    )
    .expect("Could not initialize the database.");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(state, config.client_url.as_deref()));

    tracing::info!(
        "HTTP server listening on {addr} in {} mode",
        config.environment
    );
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Server stopped with an error.");
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
