use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse};
use reqwest::Client;
use std::time::Duration;

use crate::settings::KnuggetSettings;
use crate::utils::headers::{forward_request_headers, forward_response_headers};
use crate::utils::responses::ResponseBuilder;

/// HTTP client for the rendering layer
static CLIENT: std::sync::LazyLock<Client> = std::sync::LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap_or_default()
});

/// Forward a page request to the rendering layer
///
/// Access control has already run in the route gate; this only relays the
/// request and the rendered response, cookies included.
pub async fn proxy_upstream(
    req: HttpRequest,
    body: web::Bytes,
    settings: web::Data<KnuggetSettings>,
) -> HttpResponse {
    let upstream_url = build_upstream_url(&settings.frontend.renderer_url, &req);

    let Ok(method) = reqwest::Method::from_bytes(req.method().as_str().as_bytes()) else {
        return ResponseBuilder::bad_request()
            .with_message("Unsupported HTTP method")
            .build();
    };

    let mut request_builder = forward_request_headers(&req, CLIENT.request(method, &upstream_url));
    if !body.is_empty() {
        request_builder = request_builder.body(body.to_vec());
    }

    let upstream_response = match request_builder.send().await {
        Ok(response) => response,
        Err(e) => {
            log::error!("Rendering layer unreachable at {upstream_url}: {e}");
            return ResponseBuilder::bad_gateway()
                .with_message("Failed to connect to the rendering layer")
                .build();
        }
    };

    let status = StatusCode::from_u16(upstream_response.status().as_u16())
        .unwrap_or(StatusCode::BAD_GATEWAY);
    let mut response_builder = HttpResponse::build(status);
    forward_response_headers(&upstream_response, &mut response_builder);

    match upstream_response.bytes().await {
        Ok(bytes) => response_builder.body(bytes),
        Err(e) => {
            log::error!("Failed to read rendering layer response: {e}");
            ResponseBuilder::bad_gateway()
                .with_message("Failed to read the rendering layer response")
                .build()
        }
    }
}

/// `{renderer_url}{path}?{query}`
fn build_upstream_url(renderer_url: &str, req: &HttpRequest) -> String {
    let base = renderer_url.trim_end_matches('/');
    match req.uri().query() {
        Some(query) if !query.is_empty() => format!("{base}{}?{query}", req.path()),
        _ => format!("{base}{}", req.path()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestFixtures, TestRequests};
    use actix_web::{test as actix_test, App};

    #[test]
    fn test_build_upstream_url() {
        let req = TestRequests::browser("/auth/login?source=extension&extensionId=abc").to_http_request();
        assert_eq!(
            build_upstream_url("http://localhost:3001/", &req),
            "http://localhost:3001/auth/login?source=extension&extensionId=abc"
        );

        let req = TestRequests::browser("/dashboard").to_http_request();
        assert_eq!(
            build_upstream_url("http://localhost:3001", &req),
            "http://localhost:3001/dashboard"
        );
    }

    #[actix_web::test]
    async fn test_unreachable_renderer_is_bad_gateway() {
        let mut settings = TestFixtures::settings("http://127.0.0.1:9/api");
        settings.frontend.renderer_url = "http://127.0.0.1:9".to_string();

        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(settings))
                .default_service(web::to(proxy_upstream)),
        )
        .await;

        let resp = actix_test::call_service(&app, TestRequests::browser("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}
