//! Catalog data models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Course ID type
pub type CourseId = Uuid;

/// Course model with its ordered curriculum
///
/// Lesson order is significant: it is the curriculum sequence and also the
/// free-preview boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub instructor: String,
    pub subject: String,
    /// Cover image URL
    pub image: String,
    /// Price in minor currency units
    pub price: i64,
    /// Pre-discount price, when the course is on sale
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<i64>,
    pub lessons: Vec<Lesson>,
}

/// Course listing entry without the lesson bodies
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub id: CourseId,
    pub title: String,
    pub instructor: String,
    pub subject: String,
    pub image: String,
    pub price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<i64>,
    pub lesson_count: usize,
}

/// Payload for creating a course (id is assigned by the manager)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub title: String,
    pub instructor: String,
    pub subject: String,
    pub image: String,
    pub price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<i64>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

/// Lesson model
///
/// `is_locked` is the instructor's release flag. It is orthogonal to
/// subscription gating and checked separately by the access gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub title: String,
    /// Display label, e.g. "12:30"
    pub duration: String,
    pub is_locked: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contents: Vec<ContentItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz: Option<Quiz>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flashcards: Vec<Flashcard>,
}

/// A single piece of lesson content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    Video { title: String, url: String },
    Pdf { title: String, url: String },
    Audio { title: String, url: String },
    Image { title: String, url: String },
    Document { title: String, url: String },
}

impl ContentItem {
    pub fn title(&self) -> &str {
        match self {
            ContentItem::Video { title, .. }
            | ContentItem::Pdf { title, .. }
            | ContentItem::Audio { title, .. }
            | ContentItem::Image { title, .. }
            | ContentItem::Document { title, .. } => title,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            ContentItem::Video { url, .. }
            | ContentItem::Pdf { url, .. }
            | ContentItem::Audio { url, .. }
            | ContentItem::Image { url, .. }
            | ContentItem::Document { url, .. } => url,
        }
    }
}

/// Lesson quiz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub title: String,
    pub questions: Vec<QuizQuestion>,
}

/// One multiple-choice question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

/// Flashcard (front/back pair)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}
