use actix_files::NamedFile;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{state::AppState, utils::error::AppError};

pub const RAIDEN_PAGE: &str = "raiden.html";

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RaidenResponse {
    pub my_var: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GreetingQuery {
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct GreetingBody {
    pub name: Option<String>,
}

fn greeting(name: Option<&str>) -> MessageResponse {
    MessageResponse {
        message: format!("hi {}. How are you?", name.unwrap_or("there")),
    }
}

pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body("Hello from the school service. <a href='/raiden'>raiden</a>")
}

pub async fn raiden(state: web::Data<AppState>) -> Result<NamedFile, AppError> {
    let path = state.public_dir.join(RAIDEN_PAGE);
    NamedFile::open_async(&path).await.map_err(|e| {
        log::warn!("❌ Cannot open {}: {}", path.display(), e);
        AppError::not_found("Page not found")
    })
}

#[utoipa::path(
    get,
    path = "/api/raiden",
    tag = "Pages",
    responses((status = 200, description = "Static greeting", body = RaidenResponse))
)]
pub async fn raiden_api() -> HttpResponse {
    HttpResponse::Ok().json(RaidenResponse {
        my_var: "Hello from server!".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/api/query",
    tag = "Pages",
    params(GreetingQuery),
    responses((status = 200, description = "Greeting for the query name", body = MessageResponse))
)]
pub async fn query_greeting(query: web::Query<GreetingQuery>) -> HttpResponse {
    HttpResponse::Ok().json(greeting(query.name.as_deref()))
}

#[utoipa::path(
    get,
    path = "/api/body",
    tag = "Pages",
    request_body = GreetingBody,
    responses(
        (status = 200, description = "Greeting for the body name", body = MessageResponse),
        (status = 400, description = "Malformed JSON body")
    )
)]
pub async fn body_greeting(payload: web::Bytes) -> Result<HttpResponse, AppError> {
    // No payload reads as `{}`
    let body = if payload.iter().all(u8::is_ascii_whitespace) {
        GreetingBody::default()
    } else {
        serde_json::from_slice::<GreetingBody>(&payload)
            .map_err(|e| AppError::validation(format!("Invalid request body: {}", e)))?
    };

    log::info!("client request with body name: {:?}", body.name);
    Ok(HttpResponse::Ok().json(greeting(body.name.as_deref())))
}

pub async fn echo_path(data: web::Path<String>) -> HttpResponse {
    log::info!("client request: {}", data);
    HttpResponse::Ok().json(MessageResponse {
        message: format!("received {}", data),
    })
}
