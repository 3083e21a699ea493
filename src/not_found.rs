//! The JSON 404 fallback for unknown routes and unsupported methods.

use axum::http::Uri;

use crate::Error;

/// The fallback for requests that match no route.
pub async fn get_404_not_found(uri: Uri) -> Error {
    Error::RouteNotFound(uri.path().to_owned())
}
