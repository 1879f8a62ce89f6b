use mongodb::bson::{doc, oid::ObjectId, Document};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Student document as stored in the `students` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(deserialize_with = "deserialize_stored_age")]
    pub age: i32,
    pub grade: String,
}

/// Documents written by other tools may hold `age` as Int64 or Double.
fn deserialize_stored_age<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = AgeInput::deserialize(deserializer)?;
    raw.to_age()
        .ok_or_else(|| D::Error::custom(format!("age is not an integer: {:?}", raw)))
}

impl Student {
    pub fn new(name: impl Into<String>, age: i32, grade: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            age,
            grade: grade.into(),
        }
    }
}

/// Fields to `$set` on an existing student. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub grade: Option<String>,
}

impl StudentPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none() && self.grade.is_none()
    }

    pub fn to_set_document(&self) -> Document {
        let mut set = Document::new();
        if let Some(name) = &self.name {
            set.insert("name", name.as_str());
        }
        if let Some(age) = self.age {
            set.insert("age", age);
        }
        if let Some(grade) = &self.grade {
            set.insert("grade", grade.as_str());
        }
        doc! { "$set": set }
    }

    pub fn apply_to(&self, student: &mut Student) {
        if let Some(name) = &self.name {
            student.name = name.clone();
        }
        if let Some(age) = self.age {
            student.age = age;
        }
        if let Some(grade) = &self.grade {
            student.grade = grade.clone();
        }
    }
}

/// Result of an update-by-id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

/// Age as clients send it: a JSON number or a numeral string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AgeInput {
    Int(i64),
    Float(f64),
    Text(String),
}

impl AgeInput {
    /// `0`, `0.0` and `""` count as absent.
    pub fn is_blank(&self) -> bool {
        match self {
            AgeInput::Int(n) => *n == 0,
            AgeInput::Float(f) => *f == 0.0,
            AgeInput::Text(s) => s.is_empty(),
        }
    }

    /// Leading-integer coercion: `"21 years"` is 21, `20.9` is 20.
    pub fn to_age(&self) -> Option<i32> {
        match self {
            AgeInput::Int(n) => i32::try_from(*n).ok(),
            AgeInput::Float(f) => {
                let truncated = f.trunc();
                if truncated.is_finite()
                    && truncated >= i32::MIN as f64
                    && truncated <= i32::MAX as f64
                {
                    Some(truncated as i32)
                } else {
                    None
                }
            }
            AgeInput::Text(s) => parse_leading_int(s),
        }
    }
}

fn parse_leading_int(s: &str) -> Option<i32> {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1i64, &s[1..]),
        Some(b'+') => (1i64, &s[1..]),
        _ => (1i64, s),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let value: i64 = digits[..end].parse().ok()?;
    i32::try_from(sign * value).ok()
}

// ==================== REQUEST/RESPONSE MODELS ====================

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateStudentRequest {
    pub name: Option<String>,
    #[schema(value_type = Option<i32>)]
    pub age: Option<AgeInput>,
    pub grade: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    #[schema(value_type = Option<i32>)]
    pub age: Option<AgeInput>,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StudentResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub age: i32,
    pub grade: String,
}

impl From<Student> for StudentResponse {
    fn from(student: Student) -> Self {
        Self {
            id: student.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: student.name,
            age: student.age,
            grade: student.grade,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentResponse {
    pub message: String,
    pub student_id: String,
    pub student: StudentResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentResponse {
    pub message: String,
    pub modified_count: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteStudentResponse {
    pub message: String,
    pub deleted_count: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeedResponse {
    pub message: String,
    pub inserted_count: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub message: String,
    pub deleted_count: u64,
}
