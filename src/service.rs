//! Caller-facing operations: scoring, product intake and report (re)generation

use crate::error::{AnalyzerError, Result};
use crate::metrics::METRICS;
use crate::product::ProductRecord;
use crate::report::{GenerateOptions, ReportGenerator, ReportVariant, StructuredReport};
use crate::scoring::{ScoreBreakdown, ScoringStrategy};
use crate::store::ProductStore;
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Product analyzer service
pub struct ProductAnalyzer {
    store: Arc<dyn ProductStore>,
    reports: ReportGenerator,
}

impl ProductAnalyzer {
    pub fn new(store: Arc<dyn ProductStore>, reports: ReportGenerator) -> Self {
        Self { store, reports }
    }

    /// Viability score of a record; never fails
    pub fn score(&self, record: &ProductRecord, strategy: ScoringStrategy) -> u8 {
        strategy.score(record)
    }

    pub fn breakdown(&self, record: &ProductRecord, strategy: ScoringStrategy) -> ScoreBreakdown {
        strategy.breakdown(record)
    }

    /// Validate and store a product record
    pub async fn create_product(&self, record: ProductRecord) -> Result<ProductRecord> {
        let record = record.validate()?;
        self.store.save(record).await
    }

    pub async fn get_product(&self, id: Uuid) -> Result<ProductRecord> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AnalyzerError::NotFound(format!("product {}", id)))
    }

    /// Most recent report of a product, if any
    pub async fn latest_report(&self, product_id: Uuid) -> Result<Option<StructuredReport>> {
        self.get_product(product_id).await?;
        self.store.latest_report(product_id).await
    }

    /// Generate a report for a stored product
    ///
    /// Without `regenerate`, an existing report of the requested variant is
    /// returned as-is and the model is not called. Otherwise a new report is
    /// generated; only once it exists is it saved, the product's `finalScore`
    /// overwritten and the previous reports deleted. A failed generation
    /// leaves the store untouched.
    pub async fn generate_report(
        &self,
        product_id: Uuid,
        options: GenerateOptions,
    ) -> Result<StructuredReport> {
        let mut record = self.get_product(product_id).await?;

        let variant = ReportVariant::from_professional(options.professional);
        if !options.regenerate {
            if let Some(existing) = self.store.latest_report(product_id).await? {
                if existing.variant() == variant {
                    debug!(product_id = %product_id, "Returning existing report");
                    return Ok(existing);
                }
                debug!(
                    product_id = %product_id,
                    existing = existing.variant().as_str(),
                    requested = variant.as_str(),
                    "Existing report has another variant, generating"
                );
            }
        }

        let report = match self.reports.generate(&record, variant).await {
            Ok(report) => report,
            Err(e) => {
                METRICS
                    .generation_failures
                    .with_label_values(&[e.code()])
                    .inc();
                error!(product_id = %product_id, "Report generation failed: {}", e);
                return Err(e);
            }
        };

        self.store.save_report(report.clone()).await?;
        record.final_score = Some(report.metadata.final_score);
        self.store.save(record).await?;
        let removed = self.store.delete_reports_except(product_id, report.id).await?;

        info!(
            product_id = %product_id,
            report_id = %report.id,
            replaced = removed,
            final_score = report.metadata.final_score,
            "Report stored"
        );
        Ok(report)
    }

    /// Discard the existing report and generate a new one
    pub async fn regenerate(
        &self,
        product_id: Uuid,
        professional: bool,
    ) -> Result<StructuredReport> {
        self.generate_report(
            product_id,
            GenerateOptions {
                professional,
                regenerate: true,
            },
        )
        .await
    }
}
