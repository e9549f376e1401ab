//! Course and lesson catalog.
//!
//! The durable store is the system of record; there is no in-process cache.
//! Lesson documents come from a schemaless store and are validated at this
//! boundary: malformed documents are rejected with the offending reason
//! instead of being trusted implicitly.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{CatalogError, CatalogResult};
pub use manager::CatalogManager;
pub use models::{
    ContentItem, Course, CourseId, CourseSummary, Flashcard, Lesson, NewCourse, Quiz, QuizQuestion,
};
