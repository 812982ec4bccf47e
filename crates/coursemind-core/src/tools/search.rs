//! `search_course_content` — content search over the catalog.

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tracing::debug;

use crate::BoxFuture;
use crate::catalog::{CatalogError, CourseCatalog, SearchHit, SearchQuery};
use crate::llm::ToolDefinition;

use super::{Source, Tool, ToolError, optional_str, optional_u32, required_str};

const NAME: &str = "search_course_content";

/// Searches lesson content, optionally within one course or lesson.
pub struct CourseSearchTool {
    catalog: Arc<dyn CourseCatalog>,
    max_results: usize,
    sources: Mutex<Vec<Source>>,
}

impl CourseSearchTool {
    pub fn new(catalog: Arc<dyn CourseCatalog>, max_results: usize) -> Self {
        Self {
            catalog,
            max_results,
            sources: Mutex::new(Vec::new()),
        }
    }

    fn run(&self, arguments: &Value) -> Result<String, ToolError> {
        let text = required_str(NAME, arguments, "query")?;
        let course_name = optional_str(NAME, arguments, "course_name")?;
        let lesson_number = optional_u32(NAME, arguments, "lesson_number")?;

        let mut query = SearchQuery::new(text, self.max_results);
        if let Some(name) = course_name {
            query = query.in_course(name);
        }
        if let Some(number) = lesson_number {
            query = query.in_lesson(number);
        }

        let hits = match self.catalog.search(&query) {
            Ok(hits) => hits,
            // The model gets to see this and can retry without the filter.
            Err(err @ CatalogError::CourseNotFound(_)) => return Ok(err.to_string()),
            Err(err) => return Err(err.into()),
        };
        debug!(query = %text, hits = hits.len(), "Course content search");

        if hits.is_empty() {
            let mut filters = String::new();
            if let Some(name) = course_name {
                filters.push_str(&format!(" in course '{name}'"));
            }
            if let Some(number) = lesson_number {
                filters.push_str(&format!(" in lesson {number}"));
            }
            return Ok(format!("No relevant content found{filters}."));
        }

        self.record(&hits);
        Ok(format_hits(&hits))
    }

    fn record(&self, hits: &[SearchHit]) {
        if let Ok(mut sources) = self.sources.lock() {
            for hit in hits {
                let source = Source {
                    title: label(hit),
                    link: hit.lesson_link.clone(),
                };
                if !sources.contains(&source) {
                    sources.push(source);
                }
            }
        }
    }
}

/// `"{course} - Lesson {n}"`, or just the course when the hit has no lesson.
fn label(hit: &SearchHit) -> String {
    match hit.lesson_number {
        Some(number) => format!("{} - Lesson {number}", hit.course_title),
        None => hit.course_title.clone(),
    }
}

fn format_hits(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| format!("[{}]\n{}", label(hit), hit.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

impl Tool for CourseSearchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: NAME.to_string(),
            description: "Search course materials with smart course name matching and lesson \
                          filtering"
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to search for in the course content"
                    },
                    "course_name": {
                        "type": "string",
                        "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                    },
                    "lesson_number": {
                        "type": "integer",
                        "description": "Specific lesson number to search within (e.g. 1, 2, 3)"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    fn execute<'a>(&'a self, arguments: &'a Value) -> BoxFuture<'a, Result<String, ToolError>> {
        Box::pin(async move { self.run(arguments) })
    }

    fn sources(&self) -> Vec<Source> {
        self.sources
            .lock()
            .map(|sources| sources.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Course, Lesson, MemoryCatalog};
    use pretty_assertions::assert_eq;

    fn tool() -> CourseSearchTool {
        let catalog = MemoryCatalog::new(vec![Course {
            title: "MCP: Build Rich-Context AI Apps".to_string(),
            link: Some("https://example.com/mcp".to_string()),
            instructor: None,
            lessons: vec![
                Lesson {
                    number: 1,
                    title: "Why MCP".to_string(),
                    link: Some("https://example.com/mcp/1".to_string()),
                    content: "MCP standardises how applications provide context.".to_string(),
                },
                Lesson {
                    number: 2,
                    title: "Servers".to_string(),
                    link: None,
                    content: "An MCP server exposes tools and resources.".to_string(),
                },
            ],
        }]);
        CourseSearchTool::new(Arc::new(catalog), 5)
    }

    #[tokio::test]
    async fn test_formats_hits_with_headers() {
        let tool = tool();
        let out = tool.execute(&json!({"query": "server"})).await.unwrap();
        assert_eq!(
            out,
            "[MCP: Build Rich-Context AI Apps - Lesson 2]\nAn MCP server exposes tools and resources."
        );
    }

    #[tokio::test]
    async fn test_multiple_hits_joined_by_blank_line() {
        let tool = tool();
        let out = tool.execute(&json!({"query": "mcp"})).await.unwrap();
        let blocks: Vec<_> = out.split("\n\n").collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].starts_with("[MCP: Build Rich-Context AI Apps - Lesson"));
    }

    #[tokio::test]
    async fn test_records_sources() {
        let tool = tool();
        tool.execute(&json!({"query": "context", "lesson_number": 1}))
            .await
            .unwrap();
        assert_eq!(
            tool.sources(),
            vec![Source {
                title: "MCP: Build Rich-Context AI Apps - Lesson 1".to_string(),
                link: Some("https://example.com/mcp/1".to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn test_no_results_mentions_filters() {
        let tool = tool();
        let out = tool
            .execute(&json!({"query": "kubernetes", "course_name": "MCP", "lesson_number": 2}))
            .await
            .unwrap();
        assert_eq!(
            out,
            "No relevant content found in course 'MCP' in lesson 2."
        );
        assert!(tool.sources().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_course_is_reported_as_text() {
        let tool = tool();
        let out = tool
            .execute(&json!({"query": "tools", "course_name": "Gardening"}))
            .await
            .unwrap();
        assert_eq!(out, "No course found matching 'Gardening'");
    }

    #[tokio::test]
    async fn test_missing_query_is_invalid() {
        let tool = tool();
        let err = tool.execute(&json!({"course_name": "MCP"})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[test]
    fn test_definition_schema() {
        let def = tool().definition();
        assert_eq!(def.name, "search_course_content");
        assert_eq!(def.parameters["required"], json!(["query"]));
    }
}
