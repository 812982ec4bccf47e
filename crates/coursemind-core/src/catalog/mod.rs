//! Course catalog — the retrieval collaborator behind the course tools.
//!
//! The tools only need two lookups: content search with optional course and
//! lesson filters, and course resolution by a (possibly partial) title.
//! Anything that can answer those, a vector store included, can sit behind
//! [`CourseCatalog`].

mod memory;

use serde::{Deserialize, Serialize};

pub use memory::MemoryCatalog;

/// Errors from catalog lookups and loading.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No course found matching '{0}'")]
    CourseNotFound(String),
}

/// A course and its lessons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

/// One lesson of a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub number: u32,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Lesson body text.
    #[serde(default)]
    pub content: String,
}

/// A content search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub text: String,
    /// Restrict to the course this (partial) title resolves to.
    pub course_name: Option<String>,
    /// Restrict to one lesson number.
    pub lesson_number: Option<u32>,
    /// Maximum number of hits.
    pub limit: usize,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, limit: usize) -> Self {
        Self {
            text: text.into(),
            course_name: None,
            lesson_number: None,
            limit,
        }
    }

    pub fn in_course(mut self, course_name: impl Into<String>) -> Self {
        self.course_name = Some(course_name.into());
        self
    }

    pub fn in_lesson(mut self, lesson_number: u32) -> Self {
        self.lesson_number = Some(lesson_number);
        self
    }
}

/// One piece of content matching a search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub course_title: String,
    pub lesson_number: Option<u32>,
    pub lesson_link: Option<String>,
    pub content: String,
    /// Higher is more relevant. Only comparable within one search.
    pub score: f32,
}

/// Read-only lookups over indexed course material.
///
/// Calls are synchronous; implementations must be shareable across
/// concurrent queries.
pub trait CourseCatalog: Send + Sync {
    /// Content search, best hits first, at most `query.limit` hits.
    ///
    /// Fails with [`CatalogError::CourseNotFound`] when a course filter does
    /// not resolve.
    fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, CatalogError>;

    /// Resolve a (possibly partial) course title.
    fn resolve_course(&self, name: &str) -> Result<Option<Course>, CatalogError>;

    /// Titles of every course in the catalog.
    fn course_titles(&self) -> Vec<String>;
}
