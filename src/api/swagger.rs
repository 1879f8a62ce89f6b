use utoipa::OpenApi;
use utoipa::openapi::security::{SecurityScheme, HttpAuthScheme, HttpBuilder};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "School Service API",
        version = "1.0.0",
        description = "CRUD endpoints for student records plus user registration and login.\n\n**Authentication:** `/api/auth/me` requires a JWT Bearer token obtained from `/api/auth/login`."
    ),
    paths(
        // Students
        crate::api::students::create_student,
        crate::api::students::list_students,
        crate::api::students::update_student,
        crate::api::students::delete_student,
        crate::api::students::seed,
        crate::api::students::cleanup,

        // Auth
        crate::api::auth::register,
        crate::api::auth::login,
        crate::api::auth::me,

        // Pages
        crate::api::pages::raiden_api,
        crate::api::pages::query_greeting,
        crate::api::pages::body_greeting,

        // Health
        crate::api::health::health_check,
    ),
    components(
        schemas(
            crate::models::CreateStudentRequest,
            crate::models::UpdateStudentRequest,
            crate::models::StudentResponse,
            crate::models::CreateStudentResponse,
            crate::models::UpdateStudentResponse,
            crate::models::DeleteStudentResponse,
            crate::models::SeedResponse,
            crate::models::CleanupResponse,
            crate::models::RegisterRequest,
            crate::models::RegisterResponse,
            crate::models::LoginRequest,
            crate::models::LoginResponse,
            crate::models::UserSummary,
            crate::models::UserProfile,
            crate::models::MeResponse,
            crate::api::pages::RaidenResponse,
            crate::api::pages::MessageResponse,
            crate::api::pages::GreetingBody,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Students", description = "Create, list, update and delete student records; seed or clear the sample data."),
        (name = "Auth", description = "Username/password registration and login issuing one-hour bearer tokens."),
        (name = "Pages", description = "Greeting endpoints used by the course front end."),
        (name = "Health", description = "Liveness check."),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from POST /api/auth/login"))
                        .build()
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/students"));
        assert!(doc.paths.paths.contains_key("/api/students/{id}"));
        assert!(doc.paths.paths.contains_key("/api/auth/me"));
    }
}
