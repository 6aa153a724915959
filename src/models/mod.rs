//! Database models.

pub mod lesson;
pub mod student;
pub mod teacher;

pub use lesson::Lesson;
pub use student::LessonStudent;
pub use teacher::LessonTeacher;
