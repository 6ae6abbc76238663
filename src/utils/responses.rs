//! HTTP response handling
//!
//! One place for the JSON envelope the pages and the extension read:
//! errors are `{success: false, error, code}`, successes carry whatever the
//! handler serializes. Session cookie changes ride along on either.

use actix_web::{cookie::Cookie, http::header, http::StatusCode, HttpResponse};
use serde::Serialize;
use serde_json::{json, Value};

/// Pre-serialized body for the most frequent rejection
static NOT_AUTHENTICATED: std::sync::LazyLock<String> = std::sync::LazyLock::new(|| {
    json!({
        "success": false,
        "error": "Not authenticated",
        "code": "unauthorized",
    })
    .to_string()
});

/// Unified response builder
pub struct ResponseBuilder;

impl ResponseBuilder {
    /// Error response with an arbitrary status
    #[must_use]
    pub fn error(status: StatusCode) -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(status)
    }

    /// `BadRequest` (400)
    #[must_use]
    pub fn bad_request() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(StatusCode::BAD_REQUEST)
    }

    /// `Unauthorized` (401)
    #[must_use]
    pub fn unauthorized() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(StatusCode::UNAUTHORIZED)
    }

    /// `BadGateway` (502)
    #[must_use]
    pub fn bad_gateway() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(StatusCode::BAD_GATEWAY)
    }

    /// `ServiceUnavailable` (503)
    #[must_use]
    pub fn service_unavailable() -> ErrorResponseBuilder {
        ErrorResponseBuilder::new(StatusCode::SERVICE_UNAVAILABLE)
    }

    /// OK (200) JSON response
    #[must_use]
    pub fn ok() -> JsonResponseBuilder {
        JsonResponseBuilder::new(StatusCode::OK)
    }

    /// Redirect (302 Found)
    #[must_use]
    pub fn redirect(location: &str) -> RedirectBuilder {
        RedirectBuilder::new(location)
    }

    /// Cached 401 for requests without a session
    #[must_use]
    pub fn not_authenticated() -> HttpResponse {
        HttpResponse::Unauthorized()
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .body(NOT_AUTHENTICATED.as_str())
    }

    /// Common validation error: missing field, named in `field`
    #[must_use]
    pub fn missing_field(field_name: &str) -> HttpResponse {
        Self::bad_request()
            .with_error_code("missing_field")
            .with_message(&format!("{field_name} is required"))
            .with_additional_fields(json!({"field": field_name}))
            .build()
    }
}

/// Builder for error responses with fluent interface
pub struct ErrorResponseBuilder {
    status: StatusCode,
    error_code: Option<String>,
    message: Option<String>,
    additional_fields: Option<Value>,
    cookies: Vec<Cookie<'static>>,
}

impl ErrorResponseBuilder {
    fn new(status: StatusCode) -> Self {
        Self {
            status,
            error_code: None,
            message: None,
            additional_fields: None,
            cookies: Vec::new(),
        }
    }

    /// Set a machine-readable error code (e.g. "`validation_error`")
    #[must_use]
    pub fn with_error_code(mut self, code: &str) -> Self {
        self.error_code = Some(code.to_string());
        self
    }

    /// Set the human-readable message shown to the user
    #[must_use]
    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    /// Merge extra JSON fields into the body
    #[must_use]
    pub fn with_additional_fields(mut self, fields: Value) -> Self {
        self.additional_fields = Some(fields);
        self
    }

    /// Attach cookie changes (e.g. a cleared session)
    #[must_use]
    pub fn with_cookies(mut self, cookies: Vec<Cookie<'static>>) -> Self {
        self.cookies = cookies;
        self
    }

    /// Build the final `HttpResponse`
    #[must_use]
    pub fn build(self) -> HttpResponse {
        let mut body = json!({
            "success": false,
            "error": self.message.unwrap_or_else(|| default_message(self.status)),
            "code": self.error_code.unwrap_or_else(|| default_error_code(self.status)),
        });
        if let Some(Value::Object(map)) = self.additional_fields {
            for (key, value) in map {
                body[key] = value;
            }
        }

        let mut response = HttpResponse::build(self.status);
        for cookie in self.cookies {
            response.cookie(cookie);
        }
        response.json(body)
    }
}

fn default_error_code(status: StatusCode) -> String {
    match status {
        StatusCode::BAD_REQUEST => "invalid_request",
        StatusCode::UNAUTHORIZED => "unauthorized",
        StatusCode::NOT_FOUND => "not_found",
        StatusCode::BAD_GATEWAY => "bad_gateway",
        StatusCode::SERVICE_UNAVAILABLE => "service_unavailable",
        s if s.is_server_error() => "server_error",
        _ => "request_failed",
    }
    .to_string()
}

fn default_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}

/// Builder for JSON responses
pub struct JsonResponseBuilder {
    status: StatusCode,
    cookies: Vec<Cookie<'static>>,
}

impl JsonResponseBuilder {
    fn new(status: StatusCode) -> Self {
        Self {
            status,
            cookies: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_cookies(mut self, cookies: Vec<Cookie<'static>>) -> Self {
        self.cookies = cookies;
        self
    }

    /// Serialize `body` as the response
    pub fn json<T: Serialize>(self, body: &T) -> HttpResponse {
        let mut response = HttpResponse::build(self.status);
        for cookie in self.cookies {
            response.cookie(cookie);
        }
        response.json(body)
    }
}

/// Builder for redirect responses
pub struct RedirectBuilder {
    location: String,
    cookies: Vec<Cookie<'static>>,
}

impl RedirectBuilder {
    fn new(location: &str) -> Self {
        Self {
            location: location.to_string(),
            cookies: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_cookies(mut self, cookies: Vec<Cookie<'static>>) -> Self {
        self.cookies = cookies;
        self
    }

    #[must_use]
    pub fn build(self) -> HttpResponse {
        let mut response = HttpResponse::Found();
        for cookie in self.cookies {
            response.cookie(cookie);
        }
        response
            .insert_header((header::LOCATION, self.location))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(response: HttpResponse) -> Value {
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_web::test]
    async fn test_error_envelope() {
        let response = ResponseBuilder::service_unavailable()
            .with_message("Could not connect to the server. Please try again later.")
            .build();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "service_unavailable");
        assert_eq!(
            body["error"],
            "Could not connect to the server. Please try again later."
        );
    }

    #[actix_web::test]
    async fn test_passthrough_status_and_additional_fields() {
        let response = ResponseBuilder::error(StatusCode::CONFLICT)
            .with_message("Email already registered")
            .with_additional_fields(json!({"field": "email"}))
            .build();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body_json(response).await;
        assert_eq!(body["code"], "request_failed");
        assert_eq!(body["field"], "email");
    }

    #[actix_web::test]
    async fn test_missing_field_names_the_field() {
        let response = ResponseBuilder::missing_field("Summary ID");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Summary ID is required");
        assert_eq!(body["code"], "missing_field");
        assert_eq!(body["field"], "Summary ID");
    }

    #[actix_web::test]
    async fn test_not_authenticated_body() {
        let response = ResponseBuilder::not_authenticated();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "Not authenticated");
    }

    #[test]
    fn test_redirect_carries_cookies() {
        let response = ResponseBuilder::redirect("/auth/login")
            .with_cookies(vec![Cookie::new("authToken", "")])
            .build();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/auth/login"
        );
        assert_eq!(response.cookies().count(), 1);
    }
}
