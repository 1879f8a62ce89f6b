pub mod auth_service;
pub mod student_service;
