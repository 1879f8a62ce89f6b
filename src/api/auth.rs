use actix_web::{web, HttpResponse, ResponseError};

use crate::{
    api::log_failure,
    middleware::auth::Claims,
    models::{LoginRequest, LoginResponse, MeResponse, RegisterRequest, RegisterResponse},
    services::auth_service,
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful", body = RegisterResponse),
        (status = 400, description = "Missing fields, short password, or username taken")
    )
)]
pub async fn register(
    state: web::Data<AppState>,
    request: web::Json<RegisterRequest>,
) -> HttpResponse {
    let username = request.username.clone().unwrap_or_default();
    log::info!("📝 POST /api/auth/register - username: {}", username);

    match auth_service::register(state.users.as_ref(), &state.auth, request.into_inner()).await {
        Ok(response) => HttpResponse::Created().json(response),
        Err(e) => {
            log_failure("POST /api/auth/register", &e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid username or password")
    )
)]
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> HttpResponse {
    let username = request.username.clone().unwrap_or_default();
    log::info!("🔐 POST /api/auth/login - username: {}", username);

    match auth_service::login(state.users.as_ref(), &state.auth, request.into_inner()).await {
        Ok(response) => {
            log::info!("✅ Login successful: {}", username);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log_failure("POST /api/auth/login", &e);
            e.error_response()
        }
    }
}

/// Runs behind `AuthMiddleware`, which has already verified the token.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Profile of the token owner", body = MeResponse),
        (status = 401, description = "Access token required"),
        (status = 403, description = "Invalid or expired token"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn me(state: web::Data<AppState>, claims: web::ReqData<Claims>) -> HttpResponse {
    log::info!("👤 GET /api/auth/me - user: {}", claims.username);

    match auth_service::get_current_user(state.users.as_ref(), &claims).await {
        Ok(user) => HttpResponse::Ok().json(MeResponse { user }),
        Err(e) => {
            log_failure("GET /api/auth/me", &e);
            e.error_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::{init_app, test_state_with_auth};
    use crate::config::AuthConfig;
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};

    fn auth_config(token_ttl_secs: i64) -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_secs,
            bcrypt_cost: 4,
        }
    }

    fn credentials(username: &str, password: &str) -> Value {
        json!({ "username": username, "password": password })
    }

    #[actix_web::test]
    async fn test_register_twice() {
        let (state, _dir) = test_state_with_auth(&auth_config(3600));
        let app = init_app(state).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(credentials("raiden", "hunter22"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["userId"].is_string());
        assert!(body.get("password").is_none());

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(credentials("raiden", "hunter22"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Username already exists");
    }

    #[actix_web::test]
    async fn test_register_short_password() {
        let (state, _dir) = test_state_with_auth(&auth_config(3600));
        let app = init_app(state).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(credentials("raiden", "abc"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_login_errors_are_byte_identical() {
        let (state, _dir) = test_state_with_auth(&auth_config(3600));
        let app = init_app(state).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(credentials("raiden", "hunter22"))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(credentials("raiden", "wrong-password"))
            .to_request();
        let wrong_password = test::call_service(&app, req).await;
        assert_eq!(wrong_password.status(), StatusCode::BAD_REQUEST);
        let wrong_password = test::read_body(wrong_password).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(credentials("nobody", "hunter22"))
            .to_request();
        let unknown_user = test::call_service(&app, req).await;
        assert_eq!(unknown_user.status(), StatusCode::BAD_REQUEST);
        let unknown_user = test::read_body(unknown_user).await;

        assert_eq!(wrong_password, unknown_user);
    }

    #[actix_web::test]
    async fn test_login_then_me() {
        let (state, _dir) = test_state_with_auth(&auth_config(3600));
        let app = init_app(state).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(credentials("raiden", "hunter22"))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(credentials("raiden", "hunter22"))
            .to_request();
        let login: Value = test::call_and_read_body_json(&app, req).await;
        let token = login["token"].as_str().unwrap();
        assert_eq!(login["user"]["username"], "raiden");

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["user"]["username"], "raiden");
        assert_eq!(body["user"]["_id"], login["user"]["id"]);
        assert!(body["user"].get("password").is_none());
    }

    #[actix_web::test]
    async fn test_me_without_token_is_unauthorized() {
        let (state, _dir) = test_state_with_auth(&auth_config(3600));
        let app = init_app(state).await;

        let req = test::TestRequest::get().uri("/api/auth/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Access token required");
    }

    #[actix_web::test]
    async fn test_me_with_bad_token_is_forbidden() {
        let (state, _dir) = test_state_with_auth(&auth_config(3600));
        let app = init_app(state).await;

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", "Bearer not.a.token"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_expired_token_is_rejected() {
        // Tokens from this state expire before they are issued
        let (state, _dir) = test_state_with_auth(&auth_config(-10));
        let app = init_app(state).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(credentials("raiden", "hunter22"))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(credentials("raiden", "hunter22"))
            .to_request();
        let login: Value = test::call_and_read_body_json(&app, req).await;
        let token = login["token"].as_str().unwrap();

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid or expired token");
    }
}
