//! Product records: the shared input of scoring and report generation

pub mod models;

pub use models::ProductRecord;
