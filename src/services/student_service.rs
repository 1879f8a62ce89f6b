// ==================== STUDENT RECORDS ====================
// One store call per operation. Validation happens here, before storage
// is touched, so handlers only translate results into HTTP.

use crate::{
    models::{
        AgeInput, CleanupResponse, CreateStudentRequest, CreateStudentResponse,
        DeleteStudentResponse, SeedResponse, Student, StudentPatch, StudentResponse,
        UpdateStudentRequest, UpdateStudentResponse,
    },
    store::StudentStore,
    utils::error::AppError,
};
use mongodb::bson::oid::ObjectId;

/// The fixed teaching data set written by `seed`.
pub fn sample_students() -> Vec<Student> {
    vec![
        Student::new("Alice Johnson", 20, "A"),
        Student::new("Bob Smith", 19, "B+"),
        Student::new("Charlie Brown", 21, "A-"),
        Student::new("Diana Prince", 18, "A+"),
        Student::new("Edward Norton", 22, "B"),
        Student::new("Fiona Apple", 19, "A"),
        Student::new("George Wilson", 20, "C+"),
        Student::new("Hannah Montana", 18, "B-"),
    ]
}

pub fn parse_student_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::validation("Invalid student ID"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn coerce_age(age: AgeInput) -> Result<i32, AppError> {
    age.to_age()
        .ok_or_else(|| AppError::validation("Age must be an integer"))
}

fn validate_new_student(request: CreateStudentRequest) -> Result<Student, AppError> {
    let name = non_blank(request.name);
    let age = request.age.filter(|a| !a.is_blank());
    let grade = non_blank(request.grade);

    match (name, age, grade) {
        (Some(name), Some(age), Some(grade)) => Ok(Student::new(name, coerce_age(age)?, grade)),
        _ => Err(AppError::validation("Name, age, and grade are required")),
    }
}

fn validate_patch(request: UpdateStudentRequest) -> Result<StudentPatch, AppError> {
    let age = match request.age.filter(|a| !a.is_blank()) {
        Some(age) => Some(coerce_age(age)?),
        None => None,
    };

    Ok(StudentPatch {
        name: non_blank(request.name),
        age,
        grade: non_blank(request.grade),
    })
}

/// POST /api/students
pub async fn create_student(
    store: &dyn StudentStore,
    request: CreateStudentRequest,
) -> Result<CreateStudentResponse, AppError> {
    let student = validate_new_student(request)?;

    let created = store
        .insert(student)
        .await
        .map_err(|e| AppError::internal("create student", e))?;

    let student = StudentResponse::from(created);
    log::info!("✅ Student created: {} ({})", student.name, student.id);

    Ok(CreateStudentResponse {
        message: "Student created successfully".to_string(),
        student_id: student.id.clone(),
        student,
    })
}

/// GET /api/students
pub async fn list_students(store: &dyn StudentStore) -> Result<Vec<StudentResponse>, AppError> {
    let students = store
        .list()
        .await
        .map_err(|e| AppError::internal("fetch students", e))?;

    Ok(students.into_iter().map(StudentResponse::from).collect())
}

/// PUT /api/students/{id}
pub async fn update_student(
    store: &dyn StudentStore,
    id: &str,
    request: UpdateStudentRequest,
) -> Result<UpdateStudentResponse, AppError> {
    let object_id = parse_student_id(id)?;
    let patch = validate_patch(request)?;

    let outcome = store
        .update(object_id, &patch)
        .await
        .map_err(|e| AppError::internal("update student", e))?;

    if outcome.matched == 0 {
        return Err(AppError::not_found("Student not found"));
    }

    Ok(UpdateStudentResponse {
        message: "Student updated successfully".to_string(),
        modified_count: outcome.modified,
    })
}

/// DELETE /api/students/{id}
pub async fn delete_student(
    store: &dyn StudentStore,
    id: &str,
) -> Result<DeleteStudentResponse, AppError> {
    let object_id = parse_student_id(id)?;

    let deleted = store
        .delete(object_id)
        .await
        .map_err(|e| AppError::internal("delete student", e))?;

    if deleted == 0 {
        return Err(AppError::not_found("Student not found"));
    }

    Ok(DeleteStudentResponse {
        message: "Student deleted successfully".to_string(),
        deleted_count: deleted,
    })
}

/// Replaces the whole collection with `sample_students()`.
pub async fn seed(store: &dyn StudentStore) -> Result<SeedResponse, AppError> {
    store
        .delete_all()
        .await
        .map_err(|e| AppError::internal("seed database", e))?;

    let inserted = store
        .insert_many(sample_students())
        .await
        .map_err(|e| AppError::internal("seed database", e))?;

    Ok(SeedResponse {
        message: format!(
            "Database seeded successfully! Added {} sample students.",
            inserted
        ),
        inserted_count: inserted,
    })
}

pub async fn cleanup(store: &dyn StudentStore) -> Result<CleanupResponse, AppError> {
    let deleted = store
        .delete_all()
        .await
        .map_err(|e| AppError::internal("cleanup database", e))?;

    Ok(CleanupResponse {
        message: format!(
            "Database cleaned successfully! Removed {} students.",
            deleted
        ),
        deleted_count: deleted,
    })
}
