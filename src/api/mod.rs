pub mod auth;
pub mod health;
pub mod pages;
pub mod students;
pub mod swagger;

use actix_files::Files;
use actix_web::{web, ResponseError};
use std::path::PathBuf;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{middleware::AuthMiddleware, utils::error::AppError};

/// Client errors are warnings, server errors are errors.
pub(crate) fn log_failure(route: &str, e: &AppError) {
    if e.status_code().is_server_error() {
        log::error!("❌ {} failed: {}", route, e);
    } else {
        log::warn!("⚠️  {} rejected: {}", route, e);
    }
}

/// Malformed or mistyped JSON bodies become a 400 `{"error": ...}`.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::validation(format!("Invalid request body: {}", err)).into())
}

/// Registers every route. `Files` is mounted at `/` last so it only sees
/// paths no handler claimed.
pub fn routes(public_dir: PathBuf) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(json_config())
            .route("/", web::get().to(pages::index))
            .route("/raiden", web::get().to(pages::raiden))
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/api")
                    .route("/raiden", web::get().to(pages::raiden_api))
                    .route("/query", web::get().to(pages::query_greeting))
                    .route("/body", web::get().to(pages::body_greeting))
                    .route("/url/{data}", web::get().to(pages::echo_path))
                    // Students CRUD
                    .route("/students", web::post().to(students::create_student))
                    .route("/students", web::get().to(students::list_students))
                    .route("/students/{id}", web::put().to(students::update_student))
                    .route("/students/{id}", web::delete().to(students::delete_student))
                    .route("/seed", web::post().to(students::seed))
                    .route("/cleanup", web::delete().to(students::cleanup))
                    // Auth
                    .service(
                        web::scope("/auth")
                            .route("/register", web::post().to(auth::register))
                            .route("/login", web::post().to(auth::login))
                            .service(
                                web::resource("/me")
                                    .wrap(AuthMiddleware)
                                    .route(web::get().to(auth::me)),
                            ),
                    ),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", swagger::ApiDoc::openapi()),
            )
            .service(Files::new("/", public_dir));
    }
}
