//! Product viability scoring and strategic report generation
//!
//! - [`scoring`]: deterministic 0-100 viability scores (standard and advanced models)
//! - [`report`]: prompt construction, model invocation and structured-report recovery
//! - [`service`]: caller-facing operations with regeneration semantics
//! - [`api`]: HTTP surface

pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod metrics;
pub mod product;
pub mod report;
pub mod scoring;
pub mod service;
pub mod store;

pub use config::Config;
pub use error::{AnalyzerError, Result};
pub use llm::{LlmClient, LlmError, TextGenerator};
pub use product::ProductRecord;
pub use report::{GenerateOptions, ReportGenerator, ReportVariant, StructuredReport};
pub use scoring::{ScoreBreakdown, ScoringModel, ScoringStrategy};
pub use service::ProductAnalyzer;
pub use store::{InMemoryStore, ProductStore};
