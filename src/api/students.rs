use actix_web::{web, HttpResponse, ResponseError};

use crate::{
    api::log_failure,
    models::{
        CleanupResponse, CreateStudentRequest, CreateStudentResponse, DeleteStudentResponse,
        SeedResponse, StudentResponse, UpdateStudentRequest, UpdateStudentResponse,
    },
    services::student_service,
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/api/students",
    tag = "Students",
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student created", body = CreateStudentResponse),
        (status = 400, description = "Name, age, or grade missing")
    )
)]
pub async fn create_student(
    state: web::Data<AppState>,
    request: web::Json<CreateStudentRequest>,
) -> HttpResponse {
    log::info!("📝 POST /api/students");

    match student_service::create_student(state.students.as_ref(), request.into_inner()).await {
        Ok(response) => HttpResponse::Created().json(response),
        Err(e) => {
            log_failure("POST /api/students", &e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/students",
    tag = "Students",
    responses(
        (status = 200, description = "Every stored student", body = [StudentResponse]),
        (status = 500, description = "Store failure")
    )
)]
pub async fn list_students(state: web::Data<AppState>) -> HttpResponse {
    log::info!("📋 GET /api/students");

    match student_service::list_students(state.students.as_ref()).await {
        Ok(students) => {
            log::info!("✅ Listed {} students", students.len());
            HttpResponse::Ok().json(students)
        }
        Err(e) => {
            log_failure("GET /api/students", &e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    put,
    path = "/api/students/{id}",
    tag = "Students",
    params(("id" = String, Path, description = "Student ObjectId (24 hex chars)")),
    request_body = UpdateStudentRequest,
    responses(
        (status = 200, description = "Student updated", body = UpdateStudentResponse),
        (status = 400, description = "Invalid student ID"),
        (status = 404, description = "Student not found")
    )
)]
pub async fn update_student(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<UpdateStudentRequest>,
) -> HttpResponse {
    log::info!("🔧 PUT /api/students/{}", id);

    match student_service::update_student(state.students.as_ref(), &id, request.into_inner()).await
    {
        Ok(response) => {
            log::info!("✅ Student {} updated ({} modified)", id, response.modified_count);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log_failure("PUT /api/students/{id}", &e);
            e.error_response()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    tag = "Students",
    params(("id" = String, Path, description = "Student ObjectId (24 hex chars)")),
    responses(
        (status = 200, description = "Student deleted", body = DeleteStudentResponse),
        (status = 400, description = "Invalid student ID"),
        (status = 404, description = "Student not found")
    )
)]
pub async fn delete_student(state: web::Data<AppState>, id: web::Path<String>) -> HttpResponse {
    log::info!("🗑️  DELETE /api/students/{}", id);

    match student_service::delete_student(state.students.as_ref(), &id).await {
        Ok(response) => {
            log::info!("✅ Student {} deleted", id);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log_failure("DELETE /api/students/{id}", &e);
            e.error_response()
        }
    }
}

/// POST /api/seed - replaces all students with the sample set
#[utoipa::path(
    post,
    path = "/api/seed",
    tag = "Students",
    responses(
        (status = 200, description = "Sample students inserted", body = SeedResponse),
        (status = 500, description = "Store failure")
    )
)]
pub async fn seed(state: web::Data<AppState>) -> HttpResponse {
    log::info!("🌱 POST /api/seed");

    match student_service::seed(state.students.as_ref()).await {
        Ok(response) => {
            log::info!("✅ Seeded {} students", response.inserted_count);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log_failure("POST /api/seed", &e);
            e.error_response()
        }
    }
}

/// DELETE /api/cleanup - removes every student
#[utoipa::path(
    delete,
    path = "/api/cleanup",
    tag = "Students",
    responses(
        (status = 200, description = "All students removed", body = CleanupResponse),
        (status = 500, description = "Store failure")
    )
)]
pub async fn cleanup(state: web::Data<AppState>) -> HttpResponse {
    log::info!("🧹 DELETE /api/cleanup");

    match student_service::cleanup(state.students.as_ref()).await {
        Ok(response) => {
            log::info!("✅ Removed {} students", response.deleted_count);
            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            log_failure("DELETE /api/cleanup", &e);
            e.error_response()
        }
    }
}
