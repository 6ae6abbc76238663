use actix_web::{HttpResponse, Result};

use crate::models::HealthResponse;

/// Health check endpoint
///
/// # Errors
///
/// This function currently never returns an error, but uses `Result` for consistency
/// with other handlers and future extensibility.
pub async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        message: format!("knugget-web {} is running", crate::VERSION),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App};

    #[actix_web::test]
    async fn test_health() {
        let app = test::init_service(App::new().route("/ping", web::get().to(health))).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri("/ping").to_request()).await;
        assert!(resp.status().is_success());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
    }
}
