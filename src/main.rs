#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use actix_cors::Cors;
use actix_web::{
    middleware::{from_fn, Compress, Logger},
    web, App, HttpServer,
};
use knugget_web::{
    build_credential_flow, configure_services, middleware::route_gate, BackendClient,
    KnuggetSettings,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Loads .env and Settings.toml, applies env overrides, initializes the logger
    let settings = KnuggetSettings::load()
        .map_err(|e| std::io::Error::other(format!("Failed to load settings: {e}")))?;

    let backend = BackendClient::new(&settings.backend)
        .map_err(|e| std::io::Error::other(format!("Failed to create backend client: {e}")))?;
    let flow = build_credential_flow(&settings, backend.clone())
        .map_err(|e| std::io::Error::other(format!("Failed to create credential flow: {e}")))?;

    start_server(settings, backend, flow).await
}

/// Start the HTTP server
///
/// # Errors
///
/// Returns an error if:
/// - Server binding fails
/// - Server fails to start
async fn start_server(
    settings: KnuggetSettings,
    backend: BackendClient,
    flow: knugget_web::CredentialFlow,
) -> std::io::Result<()> {
    let bind_address = settings.get_bind_address();
    print_startup_info(&bind_address, &settings);

    let cors_origins = settings.get_cors_origins();
    let settings = web::Data::new(settings);
    let backend = web::Data::new(backend);
    let flow = web::Data::new(flow);

    HttpServer::new(move || {
        let cors_origins = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                cors_origins
                    .iter()
                    .any(|allowed| allowed == origin.to_str().unwrap_or(""))
            })
            .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
            .allowed_headers(vec!["Authorization", "Content-Type", "Accept"])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(settings.clone())
            .app_data(backend.clone())
            .app_data(flow.clone())
            .wrap(from_fn(route_gate))
            .wrap(cors)
            .wrap(Compress::default())
            .wrap(Logger::default())
            .configure(configure_services)
    })
    .bind(&bind_address)?
    .run()
    .await
}

fn print_startup_info(bind_address: &str, settings: &KnuggetSettings) {
    println!("Starting knugget-web on http://{bind_address}");
    println!();
    println!("Auth endpoints:");
    println!("  POST /api/auth/signin   - Sign in (?source=extension&extensionId=... for handoff)");
    println!("  POST /api/auth/signup   - Create account (same handoff parameters)");
    println!("  GET|POST /api/auth/signout - Clear session cookies");
    println!("  GET  /api/auth/me       - Current user profile");
    println!("  POST /api/auth/refresh  - Exchange refresh token");
    println!();
    println!("Summary endpoints (pass-through to {}):", settings.backend.server_url);
    println!("  GET  /api/summary               - List summaries (page, limit, search)");
    println!("  GET|DELETE /api/summary/{{id}}    - Fetch or delete one summary");
    println!("  GET  /api/summary/{{id}}/transcript - Fetch transcript");
    println!();
    println!("System endpoints:");
    println!("  GET  /ping            - Health check");
    println!(
        "  ALL  {{any other path}} - Rendered by {}",
        settings.frontend.renderer_url
    );
}
