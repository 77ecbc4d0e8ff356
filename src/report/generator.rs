//! Report generation: score, prompt, model call, recovery

use super::fallback::{synthesize_professional, synthesize_standard};
use super::prompt::build_prompt;
use super::repair::{recover, RecoveryStage};
use super::schema::*;
use crate::config::{LlmConfig, ReportConfig};
use crate::error::{AnalyzerError, Result};
use crate::llm::TextGenerator;
use crate::metrics::METRICS;
use crate::product::ProductRecord;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Produces structured reports for product records
///
/// Model calls are bounded by a semaphore and a timeout. Content problems
/// never fail a generation: unrecoverable answers are replaced by a
/// synthesized report.
pub struct ReportGenerator {
    generator: Arc<dyn TextGenerator>,
    semaphore: Arc<Semaphore>,
    timeout: Duration,
    report_version: String,
}

impl ReportGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>, llm: &LlmConfig, report: &ReportConfig) -> Self {
        Self {
            generator,
            semaphore: Arc::new(Semaphore::new(llm.max_concurrent_requests.max(1))),
            timeout: llm.timeout(),
            report_version: report.report_version.clone(),
        }
    }

    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }

    /// Generate a report for a record
    ///
    /// Fails only with `Configuration` (no credential) or `Upstream`
    /// (transport, status, timeout).
    pub async fn generate(
        &self,
        record: &ProductRecord,
        variant: ReportVariant,
    ) -> Result<StructuredReport> {
        let start = Instant::now();
        let strategy = variant.scoring_strategy();
        let score = strategy.score(record);
        let prompt = build_prompt(record, score, variant);
        debug!(
            variant = variant.as_str(),
            score,
            prompt_chars = prompt.len(),
            "Built report prompt"
        );

        let raw = self.call_model(&prompt).await?;
        let (body, stage) = extract_report(&raw, record, score, variant);

        METRICS
            .reports_generated
            .with_label_values(&[variant.as_str(), stage.as_str()])
            .inc();

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            product = record.display_name(),
            variant = variant.as_str(),
            stage = stage.as_str(),
            score,
            processing_time_ms,
            "Report generated"
        );

        Ok(StructuredReport {
            id: Uuid::new_v4(),
            product_id: record.id,
            body,
            metadata: ReportMetadata {
                ai_model: self.generator.model_name().to_string(),
                generation_prompt: prompt,
                processing_time_ms,
                report_version: self.report_version.clone(),
                final_score: score,
                scoring_model: strategy,
                recovery_stage: stage,
                generated_at: Utc::now(),
            },
        })
    }

    async fn call_model(&self, prompt: &str) -> Result<String> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| AnalyzerError::Upstream(format!("Generation limiter closed: {}", e)))?;

        match tokio::time::timeout(self.timeout, self.generator.generate(prompt)).await {
            Ok(result) => result.map_err(AnalyzerError::from),
            Err(_) => Err(AnalyzerError::Upstream(format!(
                "Generation timed out after {}s",
                self.timeout.as_secs()
            ))),
        }
    }
}

/// Turn a raw model answer into report sections
///
/// Never fails: when no recovery stage yields the schema, the sections are
/// synthesized from the record.
pub fn extract_report(
    raw: &str,
    record: &ProductRecord,
    score: u8,
    variant: ReportVariant,
) -> (ReportContent, RecoveryStage) {
    let recovered = match variant {
        ReportVariant::Standard => {
            recover::<StandardReport>(raw).map(|(r, stage)| (ReportContent::Standard(r), stage))
        }
        ReportVariant::Professional => recover::<ProfessionalReport>(raw)
            .map(|(r, stage)| (ReportContent::Professional(Box::new(r)), stage)),
    };

    match recovered {
        Ok(result) => result,
        Err(e) => {
            warn!(
                product = record.display_name(),
                variant = variant.as_str(),
                "Synthesizing fallback report: {}",
                e
            );
            let body = match variant {
                ReportVariant::Standard => {
                    ReportContent::Standard(synthesize_standard(record, score))
                }
                ReportVariant::Professional => {
                    ReportContent::Professional(Box::new(synthesize_professional(record, score)))
                }
            };
            (body, RecoveryStage::Fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use crate::scoring::ScoringStrategy;
    use async_trait::async_trait;

    struct Scripted(&'static str);

    #[async_trait]
    impl TextGenerator for Scripted {
        async fn generate(&self, _prompt: &str) -> std::result::Result<String, LlmError> {
            Ok(self.0.to_string())
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    struct Failing;

    #[async_trait]
    impl TextGenerator for Failing {
        async fn generate(&self, _prompt: &str) -> std::result::Result<String, LlmError> {
            Err(LlmError::Upstream("HTTP 429: quota".to_string()))
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    struct Slow;

    #[async_trait]
    impl TextGenerator for Slow {
        async fn generate(&self, _prompt: &str) -> std::result::Result<String, LlmError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("{}".to_string())
        }

        fn model_name(&self) -> &str {
            "slow"
        }
    }

    fn generator(text: Arc<dyn TextGenerator>, timeout_secs: u64) -> ReportGenerator {
        let llm = LlmConfig {
            timeout_secs,
            ..LlmConfig::default()
        };
        ReportGenerator::new(text, &llm, &ReportConfig::default())
    }

    fn record() -> ProductRecord {
        ProductRecord {
            id: Some(Uuid::new_v4()),
            product_name: Some("Mini Blender".to_string()),
            category: Some("Kitchen".to_string()),
            unit_price: 10.0,
            shipping_cost: 2.0,
            branding_cost: 1.0,
            desired_selling_price: 40.0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_parsed_answer() {
        let reports = generator(
            Arc::new(Scripted(r#"{"customerPersona": "Busy students"}"#)),
            45,
        );
        let record = record();
        let report = reports.generate(&record, ReportVariant::Standard).await.unwrap();

        assert_eq!(report.metadata.recovery_stage, RecoveryStage::Direct);
        assert_eq!(report.body.core().customer_persona, "Busy students");
        assert_eq!(report.product_id, record.id);
        assert_eq!(report.metadata.ai_model, "scripted");
        assert_eq!(report.metadata.report_version, "1.0");
        assert_eq!(
            report.metadata.final_score,
            ScoringStrategy::Standard.score(&record)
        );
        assert!(report.metadata.generation_prompt.contains("Mini Blender"));
    }

    #[tokio::test]
    async fn test_garbage_answer_falls_back() {
        let reports = generator(Arc::new(Scripted("not json at all")), 45);
        let report = reports
            .generate(&record(), ReportVariant::Professional)
            .await
            .unwrap();

        assert!(report.is_fallback());
        assert_eq!(report.variant(), ReportVariant::Professional);
        assert_eq!(report.metadata.scoring_model, ScoringStrategy::Advanced);
        assert!(!report.metadata.generation_prompt.is_empty());
        assert!(!report.body.core().customer_persona.is_empty());
    }

    #[tokio::test]
    async fn test_upstream_failure_is_surfaced() {
        let reports = generator(Arc::new(Failing), 45);
        let err = reports
            .generate(&record(), ReportVariant::Standard)
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_upstream() {
        let reports = generator(Arc::new(Slow), 1);
        let err = reports
            .generate(&record(), ReportVariant::Standard)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_extract_report_matches_direct_parse() {
        let raw = r#"{"customerPersona": "Gym goers", "swotAnalysis": {"strengths": ["light"]}}"#;
        let (body, stage) = extract_report(raw, &record(), 50, ReportVariant::Standard);
        let direct: StandardReport = serde_json::from_str(raw).unwrap();
        assert_eq!(stage, RecoveryStage::Direct);
        assert_eq!(body, ReportContent::Standard(direct));
    }
}
