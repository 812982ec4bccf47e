//! The caller-facing query operation.
//!
//! [`CourseAssistant`] wires the catalog, the course tools, the generator
//! and session history together: one question in, an answer plus the
//! sources it cites out.

use std::sync::Arc;

use coursemind_config::AppConfig;
use serde::Serialize;
use tracing::info;

use crate::catalog::CourseCatalog;
use crate::generator::{GenerateError, Generator};
use crate::llm::LlmProvider;
use crate::session::SessionManager;
use crate::tools::{CourseOutlineTool, CourseSearchTool, Source, ToolDispatcher, ToolRegistry};

/// The answer to one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryAnswer {
    pub answer: String,
    /// Sources cited by the tools while answering.
    pub sources: Vec<Source>,
    /// The session the exchange was recorded in.
    pub session_id: String,
}

/// Catalog overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseStats {
    pub total_courses: usize,
    pub course_titles: Vec<String>,
}

pub struct CourseAssistant {
    generator: Generator,
    catalog: Arc<dyn CourseCatalog>,
    sessions: SessionManager,
    max_results: usize,
    tools_enabled: bool,
}

impl CourseAssistant {
    pub fn new(
        generator: Generator,
        catalog: Arc<dyn CourseCatalog>,
        sessions: SessionManager,
        max_results: usize,
    ) -> Self {
        Self {
            generator,
            catalog,
            sessions,
            max_results,
            tools_enabled: true,
        }
    }

    /// Build an assistant from the application config.
    pub fn from_config(
        provider: Arc<dyn LlmProvider>,
        catalog: Arc<dyn CourseCatalog>,
        config: &AppConfig,
    ) -> Self {
        Self::new(
            Generator::from_config(provider, &config.llm),
            catalog,
            SessionManager::new(config.session.max_history),
            config.search.max_results,
        )
    }

    /// Enable or disable the course tools. Without them the model answers
    /// from its own knowledge in a single call.
    pub fn with_tools(mut self, enabled: bool) -> Self {
        self.tools_enabled = enabled;
        self
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Answer `question`, recording the exchange in `session_id` or in a new
    /// session when none is given.
    pub async fn query(
        &self,
        question: &str,
        session_id: Option<&str>,
    ) -> Result<QueryAnswer, GenerateError> {
        let session_id = match session_id {
            Some(id) => id.to_string(),
            None => self.sessions.create_session(),
        };
        let history = self.sessions.history(&session_id);
        let prompt = format!("Answer this question about course materials: {question}");

        // Fresh per query, so recorded sources belong to this answer only.
        let registry = self.registry();
        let definitions = registry.definitions();
        let (tools, dispatcher) = if self.tools_enabled {
            (
                Some(definitions.as_slice()),
                Some(&registry as &dyn ToolDispatcher),
            )
        } else {
            (None, None)
        };

        let answer = self
            .generator
            .generate(&prompt, history.as_deref(), tools, dispatcher)
            .await?;
        let sources = registry.sources();

        self.sessions.add_exchange(&session_id, question, &answer);
        info!(
            session = %session_id,
            sources = sources.len(),
            "Answered course question"
        );

        Ok(QueryAnswer {
            answer,
            sources,
            session_id,
        })
    }

    pub fn course_stats(&self) -> CourseStats {
        let course_titles = self.catalog.course_titles();
        CourseStats {
            total_courses: course_titles.len(),
            course_titles,
        }
    }

    fn registry(&self) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(CourseSearchTool::new(
            Arc::clone(&self.catalog),
            self.max_results,
        )));
        registry.register(Box::new(CourseOutlineTool::new(Arc::clone(&self.catalog))));
        registry
    }
}
