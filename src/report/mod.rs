//! Structured report generation
//!
//! Flow: score the record, build the prompt, call the model once, then
//! recover a schema-valid report from the answer ([`repair`]) or synthesize
//! one from the record ([`fallback`]).

pub mod fallback;
pub mod generator;
pub mod prompt;
pub mod repair;
pub mod schema;

pub use generator::{extract_report, ReportGenerator};
pub use prompt::build_prompt;
pub use repair::{recover, RecoveryExhausted, RecoveryStage, ReportSchema};
pub use schema::{
    GenerateOptions, ProfessionalReport, ReportContent, ReportMetadata, ReportVariant,
    StandardReport, StructuredReport,
};
