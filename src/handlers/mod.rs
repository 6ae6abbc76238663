// HTTP request handlers
pub mod auth;
pub mod health;
pub mod helpers;
pub mod proxy_upstream;
pub mod summary;

use actix_web::{error::InternalError, http::StatusCode, web, HttpResponse};

use crate::utils::responses::ResponseBuilder;

pub use auth::{me, refresh, sign_in, sign_out, sign_up};
pub use health::health;
pub use proxy_upstream::proxy_upstream;
pub use summary::{delete_summary, get_summary, get_transcript, list_summaries};

/// Register every route; anything unmatched goes to the rendering layer
pub fn configure_services(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(
            web::scope("/api")
                .route("/auth/signin", web::post().to(sign_in))
                .route("/auth/signup", web::post().to(sign_up))
                .service(
                    web::resource("/auth/signout")
                        .route(web::post().to(sign_out))
                        .route(web::get().to(sign_out)),
                )
                .route("/auth/me", web::get().to(me))
                .route("/auth/refresh", web::post().to(refresh))
                .route("/summary", web::get().to(list_summaries))
                .service(
                    web::resource("/summary/{id}")
                        .route(web::get().to(get_summary))
                        .route(web::delete().to(delete_summary)),
                )
                .route("/summary/{id}/transcript", web::get().to(get_transcript))
                .default_service(web::to(api_not_found)),
        )
        .route("/ping", web::get().to(health))
        .default_service(web::to(proxy_upstream));
}

async fn api_not_found() -> HttpResponse {
    ResponseBuilder::error(StatusCode::NOT_FOUND)
        .with_message("API route not found")
        .build()
}

/// Malformed JSON bodies get the same error envelope as every other failure
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = ResponseBuilder::bad_request()
            .with_error_code("invalid_json")
            .with_message(&format!("Invalid request body: {err}"))
            .build();
        InternalError::from_response(err, response).into()
    })
}
