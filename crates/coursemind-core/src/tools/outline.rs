//! `get_course_outline` — course title, link, instructor and lesson list.

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tracing::debug;

use crate::BoxFuture;
use crate::catalog::{Course, CourseCatalog};
use crate::llm::ToolDefinition;

use super::{Source, Tool, ToolError, required_str};

const NAME: &str = "get_course_outline";

pub struct CourseOutlineTool {
    catalog: Arc<dyn CourseCatalog>,
    sources: Mutex<Vec<Source>>,
}

impl CourseOutlineTool {
    pub fn new(catalog: Arc<dyn CourseCatalog>) -> Self {
        Self {
            catalog,
            sources: Mutex::new(Vec::new()),
        }
    }

    fn run(&self, arguments: &Value) -> Result<String, ToolError> {
        let title = required_str(NAME, arguments, "course_title")?;
        let Some(course) = self.catalog.resolve_course(title)? else {
            return Ok(format!("No course found matching '{title}'"));
        };
        debug!(requested = %title, resolved = %course.title, "Course outline lookup");

        if let Ok(mut sources) = self.sources.lock() {
            let source = Source {
                title: course.title.clone(),
                link: course.link.clone(),
            };
            if !sources.contains(&source) {
                sources.push(source);
            }
        }
        Ok(format_outline(&course))
    }
}

fn format_outline(course: &Course) -> String {
    let mut lines = vec![format!("Course: {}", course.title)];
    if let Some(link) = &course.link {
        lines.push(format!("Link: {link}"));
    }
    if let Some(instructor) = &course.instructor {
        lines.push(format!("Instructor: {instructor}"));
    }
    lines.push(String::new());
    lines.push(format!("Lessons ({} total):", course.lessons.len()));
    for lesson in &course.lessons {
        lines.push(format!("Lesson {}: {}", lesson.number, lesson.title));
    }
    lines.join("\n")
}

impl Tool for CourseOutlineTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: NAME.to_string(),
            description: "Get the complete outline of a course: title, link, instructor and \
                          every lesson's number and title"
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "course_title": {
                        "type": "string",
                        "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                    }
                },
                "required": ["course_title"]
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
    use crate::catalog::{Lesson, MemoryCatalog};
    use pretty_assertions::assert_eq;

    fn course(link: Option<&str>, instructor: Option<&str>) -> Course {
        Course {
            title: "Prompt Compression and Query Optimization".to_string(),
            link: link.map(str::to_string),
            instructor: instructor.map(str::to_string),
            lessons: vec![
                Lesson {
                    number: 0,
                    title: "Introduction".to_string(),
                    link: None,
                    content: String::new(),
                },
                Lesson {
                    number: 1,
                    title: "Vector Search".to_string(),
                    link: None,
                    content: String::new(),
                },
            ],
        }
    }

    fn tool(course: Course) -> CourseOutlineTool {
        CourseOutlineTool::new(Arc::new(MemoryCatalog::new(vec![course])))
    }

    #[tokio::test]
    async fn test_full_outline() {
        let tool = tool(course(Some("https://example.com/pc"), Some("Richmond Alake")));
        let out = tool
            .execute(&json!({"course_title": "prompt compression"}))
            .await
            .unwrap();
        assert_eq!(
            out,
            "Course: Prompt Compression and Query Optimization\n\
             Link: https://example.com/pc\n\
             Instructor: Richmond Alake\n\
             \n\
             Lessons (2 total):\n\
             Lesson 0: Introduction\n\
             Lesson 1: Vector Search"
        );
        assert_eq!(
            tool.sources(),
            vec![Source {
                title: "Prompt Compression and Query Optimization".to_string(),
                link: Some("https://example.com/pc".to_string()),
            }]
        );
    }

    #[tokio::test]
    async fn test_outline_omits_missing_fields() {
        let tool = tool(course(None, None));
        let out = tool
            .execute(&json!({"course_title": "Query Optimization"}))
            .await
            .unwrap();
        assert!(out.starts_with("Course: Prompt Compression and Query Optimization\n\nLessons"));
    }

    #[tokio::test]
    async fn test_unknown_course() {
        let tool = tool(course(None, None));
        let out = tool
            .execute(&json!({"course_title": "Rust"}))
            .await
            .unwrap();
        assert_eq!(out, "No course found matching 'Rust'");
        assert!(tool.sources().is_empty());
    }

    #[tokio::test]
    async fn test_requires_course_title() {
        let tool = tool(course(None, None));
        let err = tool.execute(&json!({"title": "x"})).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid arguments for get_course_outline: missing required argument `course_title`"
        );
    }
}
