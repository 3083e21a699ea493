//! The JSON envelope shared by every endpoint, and the extractors that report
//! malformed input through it.
//!
//! Successful responses look like `{"status": "success", "message": ..., "data": ...}`
//! and failures like `{"status": "error", "message": ..., "errors": [...]}`.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{Error, validation::FieldError};

/// Extracts a JSON request body, turning malformed input into an [Error] so
/// the client still gets the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

/// Extracts the query string, turning malformed input into an [Error].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct QueryParams<T>(pub T);

/// The value of the `status` field in the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The request succeeded.
    Success,
    /// The request failed.
    Error,
}

/// A successful response wrapped in the envelope.
#[derive(Debug)]
pub struct ApiResponse<T> {
    status_code: StatusCode,
    message: Option<String>,
    data: T,
}

#[derive(Serialize)]
struct SuccessBody<'a, T> {
    status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    data: &'a T,
}

impl<T: Serialize> ApiResponse<T> {
    /// A 200 OK response.
    pub fn ok(data: T) -> Self {
        Self {
            status_code: StatusCode::OK,
            message: None,
            data,
        }
    }

    /// A 201 Created response.
    pub fn created(data: T) -> Self {
        Self {
            status_code: StatusCode::CREATED,
            message: None,
            data,
        }
    }

    /// Add a human readable message to the response.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = SuccessBody {
            status: Status::Success,
            message: self.message.as_deref(),
            data: &self.data,
        };

        // Serialize up front so a failure still produces the error envelope.
        match serde_json::to_value(&body) {
            Ok(value) => (self.status_code, Json(value)).into_response(),
            Err(error) => Error::JsonSerialization(error.to_string()).into_response(),
        }
    }
}

/// The body of a failed response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    status: Status,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl ErrorBody {
    /// An error body with just a message.
    pub fn new(message: String) -> Self {
        Self {
            status: Status::Error,
            message,
            errors: None,
            detail: None,
        }
    }

    /// Attach the field level errors from validation.
    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Attach internal error text, only done outside of production.
    pub fn with_detail(mut self, detail: String) -> Self {
        self.detail = Some(detail);
        self
    }
}

impl IntoResponse for ErrorBody {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde::Deserialize;
    use serde_json::{Value, json};

    use super::{ApiResponse, JsonBody};

    #[derive(Deserialize)]
    struct Echo {
        word: String,
    }

    async fn echo(JsonBody(echo): JsonBody<Echo>) -> ApiResponse<String> {
        ApiResponse::created(echo.word).with_message("Echoed")
    }

    fn get_test_server() -> TestServer {
        let app = Router::new().route("/echo", post(echo));

        TestServer::new(app)
    }

    #[tokio::test]
    async fn wraps_data_in_success_envelope() {
        let server = get_test_server();

        let response = server.post("/echo").json(&json!({ "word": "hello" })).await;

        response.assert_status(StatusCode::CREATED);
        response.assert_json(&json!({
            "status": "success",
            "message": "Echoed",
            "data": "hello",
        }));
    }

    #[test]
    fn omits_message_when_not_set() {
        let body = serde_json::to_value(super::SuccessBody {
            status: super::Status::Success,
            message: None,
            data: &42,
        })
        .unwrap();

        assert_eq!(body, json!({ "status": "success", "data": 42 }));
    }

    #[tokio::test]
    async fn malformed_json_gets_error_envelope() {
        let server = get_test_server();

        let response = server
            .post("/echo")
            .content_type("application/json")
            .bytes("{ not json".into())
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Request body must be valid JSON");
        assert_eq!(body["errors"][0]["field"], "body");
    }
}
