#![deny(unsafe_code)]

//! Shared test utilities for the CourseMind workspace.
//!
//! Provides a scripted model provider, a recording tool dispatcher, catalog
//! fixtures, config builders and tracing helpers so that individual crate
//! tests stay concise and consistent.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! coursemind-test-utils = { workspace = true }
//! ```

pub mod catalog;
pub mod config;
pub mod llm;
pub mod tracing_setup;
