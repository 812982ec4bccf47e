#![deny(unsafe_code)]

//! CourseMind core — grounded answers over indexed course material.
//!
//! The centre of this crate is the [`Generator`](generator::Generator), which
//! drives a bounded, multi-round conversation between a hosted model and a
//! [`ToolDispatcher`](tools::ToolDispatcher). Around it sit the model client,
//! the course tools and their catalog, per-user sessions, and the
//! [`CourseAssistant`](assistant::CourseAssistant) that wires them together.

use std::future::Future;
use std::pin::Pin;

/// A type-erased, `Send`-safe, boxed future — the standard return type for async
/// trait methods that require dynamic dispatch (`dyn Trait`).
///
/// Native `async fn` in traits produces opaque return types that are **not**
/// object-safe. Traits consumed via `Box<dyn Trait>` or `&dyn Trait` must
/// return a concrete `Pin<Box<dyn Future>>` instead.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Caller-facing query operation: catalog, tools, generation, sessions.
pub mod assistant;
/// Course catalog contract and the in-memory implementation.
pub mod catalog;
/// Bounded multi-round tool-augmented generation.
pub mod generator;
/// Model provider integration.
pub mod llm;
/// System instructions given to the model.
pub mod prompt;
/// Per-session conversation history.
pub mod session;
/// Tool trait, registry/dispatcher, and the course tools.
pub mod tools;

pub use assistant::{CourseAssistant, CourseStats, QueryAnswer};
pub use catalog::{CourseCatalog, MemoryCatalog};
pub use generator::{GenerateError, Generator, MAX_TOOL_ROUNDS};
pub use llm::{LlmError, LlmProvider};
pub use session::SessionManager;
pub use tools::{ToolDispatcher, ToolError, ToolRegistry};
