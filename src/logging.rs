//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes, to_bytes},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::Error;

/// Bodies longer than this many characters are cut short in the `debug` log.
pub const LOG_BODY_LENGTH_LIMIT: usize = 256;

/// The largest request body the server reads.
const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

/// JSON fields whose values never reach the logs.
const REDACTED_FIELDS: [&str; 4] = ["password", "currentPassword", "newPassword", "token"];

const REDACTED: &str = "********";

/// Log the request and response for each request.
///
/// Heads and bodies are logged at the `debug` level, with secrets redacted.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `trace` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body = match to_bytes(body, MAX_BODY_SIZE).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!("Could not read request body: {error}");
            return Error::InvalidBody(format!("Could not read request body: {error}"))
                .into_response();
        }
    };
    log_body("Received request", &format!("{parts:?}"), &body);

    let request = Request::from_parts(parts, Body::from(body));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    log_body("Sending response", &format!("{parts:?}"), &body);

    Response::from_parts(parts, Body::from(body))
}

fn log_body(prefix: &str, head: &str, body: &Bytes) {
    let text = redact(body);

    match truncate(&text, LOG_BODY_LENGTH_LIMIT) {
        Some(truncated) => {
            tracing::debug!("{prefix}: {head}\nbody: {truncated}...");
            tracing::trace!("Full body: {text}");
        }
        None => tracing::debug!("{prefix}: {head}\nbody: {text}"),
    }
}

/// The body as text with the values of [REDACTED_FIELDS] hidden.
///
/// Bodies that are not JSON are returned as is.
fn redact(body: &[u8]) -> String {
    match serde_json::from_slice::<Value>(body) {
        Ok(mut json) => {
            redact_value(&mut json);
            json.to_string()
        }
        Err(_) => String::from_utf8_lossy(body).into_owned(),
    }
}

fn redact_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, value) in map.iter_mut() {
                if REDACTED_FIELDS.contains(&key.as_str()) {
                    *value = Value::String(REDACTED.to_owned());
                } else {
                    redact_value(value);
                }
            }
        }
        Value::Array(values) => values.iter_mut().for_each(redact_value),
        _ => {}
    }
}

/// The first `limit` characters of `text`, or `None` if it is not longer than that.
fn truncate(text: &str, limit: usize) -> Option<&str> {
    text.char_indices()
        .nth(limit)
        .map(|(byte_index, _)| &text[..byte_index])
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::{redact, truncate};

    #[test]
    fn redacts_secrets_at_any_depth() {
        let body = json!({
            "email": "alice@example.com",
            "password": "Secret123",
            "data": { "token": "abc.def.ghi", "user": { "name": "Alice" } },
            "changes": [{ "currentPassword": "Old123", "newPassword": "New456" }],
        });

        let redacted: Value = serde_json::from_str(&redact(body.to_string().as_bytes())).unwrap();

        assert_eq!(
            redacted,
            json!({
                "email": "alice@example.com",
                "password": "********",
                "data": { "token": "********", "user": { "name": "Alice" } },
                "changes": [{ "currentPassword": "********", "newPassword": "********" }],
            })
        );
    }

    #[test]
    fn non_json_body_is_kept() {
        assert_eq!(redact(b"{ not json"), "{ not json");
    }

    #[test]
    fn truncates_on_character_boundaries() {
        assert_eq!(truncate("héllo wörld", 5), Some("héllo"));
        assert_eq!(truncate("short", 5), None);
        assert_eq!(truncate("", 0), None);
    }
}
