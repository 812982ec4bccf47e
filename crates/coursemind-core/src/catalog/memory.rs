//! In-memory course catalog backed by a JSON file.
//!
//! Scores lessons by how often the query's terms occur in the lesson title
//! and body. Good enough for small catalogs, local runs and tests.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::{CatalogError, Course, CourseCatalog, SearchHit, SearchQuery};

/// On-disk catalog layout: `{"courses": [...]}`.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    courses: Vec<Course>,
}

/// A catalog held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    courses: Vec<Course>,
}

impl MemoryCatalog {
    pub fn new(courses: Vec<Course>) -> Self {
        Self { courses }
    }

    /// Parse a catalog from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Ok(Self::new(file.courses))
    }

    /// Load a catalog file using async I/O.
    pub async fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = tokio::fs::read_to_string(path).await?;
        let catalog = Self::from_json(&content)?;
        debug!(
            path = %path.display(),
            courses = catalog.courses.len(),
            "Loaded course catalog"
        );
        Ok(catalog)
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// Exact case-insensitive title match first, then the first title that
    /// contains `name`.
    fn resolve_index(&self, name: &str) -> Option<usize> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.courses
            .iter()
            .position(|c| c.title.to_lowercase() == needle)
            .or_else(|| {
                self.courses
                    .iter()
                    .position(|c| c.title.to_lowercase().contains(&needle))
            })
    }
}

/// Lowercase alphanumeric words.
fn terms(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

impl CourseCatalog for MemoryCatalog {
    fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>, CatalogError> {
        let query_terms = terms(&query.text);
        if query_terms.is_empty() || query.limit == 0 {
            return Ok(Vec::new());
        }

        let course_filter = match &query.course_name {
            Some(name) => Some(
                self.resolve_index(name)
                    .ok_or_else(|| CatalogError::CourseNotFound(name.clone()))?,
            ),
            None => None,
        };

        let mut hits: Vec<SearchHit> = Vec::new();
        for (index, course) in self.courses.iter().enumerate() {
            if course_filter.is_some_and(|wanted| wanted != index) {
                continue;
            }
            for lesson in &course.lessons {
                if query.lesson_number.is_some_and(|n| n != lesson.number) {
                    continue;
                }
                let words = terms(&format!("{} {}", lesson.title, lesson.content));
                let score = query_terms
                    .iter()
                    .map(|term| words.iter().filter(|w| *w == term).count())
                    .sum::<usize>();
                if score == 0 {
                    continue;
                }
                hits.push(SearchHit {
                    course_title: course.title.clone(),
                    lesson_number: Some(lesson.number),
                    lesson_link: lesson.link.clone(),
                    content: lesson.content.clone(),
                    score: score as f32,
                });
            }
        }

        // Stable: equal scores keep catalog order.
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(query.limit);
        Ok(hits)
    }

    fn resolve_course(&self, name: &str) -> Result<Option<Course>, CatalogError> {
        Ok(self.resolve_index(name).map(|i| self.courses[i].clone()))
    }

    fn course_titles(&self) -> Vec<String> {
        self.courses.iter().map(|c| c.title.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Lesson;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn lesson(number: u32, title: &str, content: &str) -> Lesson {
        Lesson {
            number,
            title: title.to_string(),
            link: Some(format!("https://example.com/lesson/{number}")),
            content: content.to_string(),
        }
    }

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new(vec![
            Course {
                title: "Introduction to Machine Learning".to_string(),
                link: None,
                instructor: Some("Dr. Ada".to_string()),
                lessons: vec![
                    lesson(0, "Welcome", "What machine learning is and is not."),
                    lesson(1, "Regression", "Linear regression fits a line. Regression again."),
                    lesson(2, "Neural Networks", "Neural networks stack layers."),
                ],
            },
            Course {
                title: "Deep Learning Fundamentals".to_string(),
                link: None,
                instructor: None,
                lessons: vec![lesson(1, "Backprop", "Neural networks learn via backprop.")],
            },
        ])
    }

    #[test]
    fn test_search_ranks_by_term_occurrences() {
        let hits = catalog()
            .search(&SearchQuery::new("regression", 5))
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].course_title, "Introduction to Machine Learning");
        assert_eq!(hits[0].lesson_number, Some(1));
        assert_eq!(hits[0].score, 3.0);
    }

    #[test]
    fn test_search_returns_best_hits_first() {
        let hits = catalog()
            .search(&SearchQuery::new("neural", 5))
            .unwrap();
        let titles: Vec<_> = hits.iter().map(|h| h.course_title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Introduction to Machine Learning", "Deep Learning Fundamentals"]
        );
    }

    #[test]
    fn test_search_respects_limit() {
        let hits = catalog().search(&SearchQuery::new("neural", 1)).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_search_filters_by_course_and_lesson() {
        let hits = catalog()
            .search(&SearchQuery::new("neural", 5).in_course("deep learning"))
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].course_title, "Deep Learning Fundamentals");

        let hits = catalog()
            .search(&SearchQuery::new("neural", 5).in_lesson(2))
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].lesson_number, Some(2));
    }

    #[test]
    fn test_search_unknown_course_is_error() {
        let err = catalog()
            .search(&SearchQuery::new("neural", 5).in_course("Cooking"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::CourseNotFound(ref name) if name == "Cooking"));
        assert_eq!(err.to_string(), "No course found matching 'Cooking'");
    }

    #[test]
    fn test_search_without_terms_is_empty() {
        assert!(catalog().search(&SearchQuery::new("  ?! ", 5)).unwrap().is_empty());
    }

    #[test]
    fn test_resolve_course_prefers_exact_match() {
        let catalog = MemoryCatalog::new(vec![
            Course {
                title: "Prompting Advanced".to_string(),
                link: None,
                instructor: None,
                lessons: vec![],
            },
            Course {
                title: "Prompting".to_string(),
                link: None,
                instructor: None,
                lessons: vec![],
            },
        ]);
        let course = catalog.resolve_course("prompting").unwrap().unwrap();
        assert_eq!(course.title, "Prompting");

        let course = catalog.resolve_course("ADVANCED").unwrap().unwrap();
        assert_eq!(course.title, "Prompting Advanced");

        assert!(catalog.resolve_course("").unwrap().is_none());
        assert!(catalog.resolve_course("rust").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");
        tokio::fs::write(
            &path,
            br#"{"courses": [{"title": "MCP Basics", "lessons": [
                {"number": 1, "title": "Servers", "content": "An MCP server exposes tools."}
            ]}]}"#,
        )
        .await
        .unwrap();

        let catalog = MemoryCatalog::load(&path).await.unwrap();
        assert_eq!(catalog.course_titles(), vec!["MCP Basics".to_string()]);
        assert_eq!(catalog.courses()[0].lessons[0].link, None);
    }

    #[tokio::test]
    async fn test_load_rejects_bad_json() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();

        assert!(matches!(
            MemoryCatalog::load(&path).await,
            Err(CatalogError::Parse(_))
        ));
    }
}
