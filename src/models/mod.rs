pub mod student;
pub mod user;

pub use student::*;
pub use user::*;
