//! Report generation and regeneration through the service layer

use async_trait::async_trait;
use product_analyzer::config::{LlmConfig, ReportConfig};
use product_analyzer::report::RecoveryStage;
use product_analyzer::{
    AnalyzerError, GenerateOptions, InMemoryStore, LlmClient, LlmError, ProductAnalyzer,
    ProductRecord, ProductStore, ReportGenerator, ReportVariant, ScoringStrategy,
    StructuredReport, TextGenerator,
};
use uuid::Uuid;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

/// Answers with a fixed text and counts calls
struct Scripted {
    answer: Result<String, String>,
    calls: AtomicUsize,
}

impl Scripted {
    fn ok(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Ok(answer.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: Err(reason.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for Scripted {
    async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone().map_err(LlmError::Upstream)
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}

/// In-memory store whose product writes can be switched off
#[derive(Default)]
struct ReadOnlyAfterIntake {
    inner: InMemoryStore,
    reject_saves: AtomicBool,
}

#[async_trait]
impl ProductStore for ReadOnlyAfterIntake {
    async fn get(&self, id: Uuid) -> product_analyzer::Result<Option<ProductRecord>> {
        self.inner.get(id).await
    }

    async fn save(&self, record: ProductRecord) -> product_analyzer::Result<ProductRecord> {
        if self.reject_saves.load(Ordering::SeqCst) {
            return Err(AnalyzerError::Persistence("products table is read-only".to_string()));
        }
        self.inner.save(record).await
    }

    async fn save_report(&self, report: StructuredReport) -> product_analyzer::Result<()> {
        self.inner.save_report(report).await
    }

    async fn delete_reports_except(
        &self,
        product_id: Uuid,
        keep: Uuid,
    ) -> product_analyzer::Result<usize> {
        self.inner.delete_reports_except(product_id, keep).await
    }

    async fn reports_for(
        &self,
        product_id: Uuid,
    ) -> product_analyzer::Result<Vec<StructuredReport>> {
        self.inner.reports_for(product_id).await
    }
}

fn analyzer_with(text: Arc<dyn TextGenerator>) -> (ProductAnalyzer, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let reports = ReportGenerator::new(text, &LlmConfig::default(), &ReportConfig::default());
    (ProductAnalyzer::new(store.clone(), reports), store)
}

fn product() -> ProductRecord {
    ProductRecord {
        product_name: Some("Foldable Laptop Stand".to_string()),
        category: Some("Tech accessories".to_string()),
        unit_price: 6.0,
        shipping_cost: 3.0,
        branding_cost: 1.0,
        desired_selling_price: 35.0,
        monthly_search_volume: Some(20_000),
        competitor_count: Some(8),
        ..Default::default()
    }
}

const REGENERATE: GenerateOptions = GenerateOptions {
    professional: false,
    regenerate: true,
};

#[tokio::test]
async fn test_generate_persists_report_and_score() {
    let text = Scripted::ok(r#"{"customerPersona": "Remote workers"}"#);
    let (analyzer, store) = analyzer_with(text.clone());
    let id = analyzer.create_product(product()).await.unwrap().id.unwrap();

    let report = analyzer
        .generate_report(id, GenerateOptions::default())
        .await
        .unwrap();

    assert_eq!(report.product_id, Some(id));
    assert_eq!(report.metadata.recovery_stage, RecoveryStage::Direct);
    assert_eq!(report.metadata.ai_model, "scripted-model");
    assert_eq!(report.metadata.scoring_model, ScoringStrategy::Standard);
    assert!(report.metadata.generation_prompt.contains("Foldable Laptop Stand"));

    let stored = store.get(id).await.unwrap().unwrap();
    let expected = ScoringStrategy::Standard.score(&product());
    assert_eq!(stored.final_score, Some(expected));
    assert_eq!(report.metadata.final_score, expected);
    assert_eq!(store.reports_for(id).await.unwrap(), vec![report]);
    assert_eq!(text.calls(), 1);
}

#[tokio::test]
async fn test_existing_report_returned_without_model_call() {
    let text = Scripted::ok(r#"{"customerPersona": "Remote workers"}"#);
    let (analyzer, _) = analyzer_with(text.clone());
    let id = analyzer.create_product(product()).await.unwrap().id.unwrap();

    let first = analyzer
        .generate_report(id, GenerateOptions::default())
        .await
        .unwrap();
    let second = analyzer
        .generate_report(id, GenerateOptions::default())
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(text.calls(), 1);
}

#[tokio::test]
async fn test_existing_report_of_other_variant_is_replaced() {
    let text = Scripted::ok(r#"{"customerPersona": "Remote workers"}"#);
    let (analyzer, store) = analyzer_with(text.clone());
    let id = analyzer.create_product(product()).await.unwrap().id.unwrap();

    let standard = analyzer
        .generate_report(id, GenerateOptions::default())
        .await
        .unwrap();
    let professional_request = GenerateOptions {
        professional: true,
        regenerate: false,
    };
    let professional = analyzer
        .generate_report(id, professional_request)
        .await
        .unwrap();
    let again = analyzer
        .generate_report(id, professional_request)
        .await
        .unwrap();

    assert_eq!(standard.variant(), ReportVariant::Standard);
    assert_eq!(professional.variant(), ReportVariant::Professional);
    assert_eq!(again, professional);
    assert_eq!(store.reports_for(id).await.unwrap(), vec![professional]);
    assert_eq!(text.calls(), 2);
}

#[tokio::test]
async fn test_failed_write_keeps_previous_report() {
    let store = Arc::new(ReadOnlyAfterIntake::default());
    let analyzer = ProductAnalyzer::new(
        store.clone(),
        ReportGenerator::new(
            Scripted::ok(r#"{"customerPersona": "Students"}"#),
            &LlmConfig::default(),
            &ReportConfig::default(),
        ),
    );
    let id = analyzer.create_product(product()).await.unwrap().id.unwrap();
    let original = analyzer.generate_report(id, REGENERATE).await.unwrap();

    store.reject_saves.store(true, Ordering::SeqCst);
    let err = assert_err!(analyzer.generate_report(id, REGENERATE).await);

    assert!(matches!(err, AnalyzerError::Persistence(_)));
    let reports = store.reports_for(id).await.unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0], original);
}

#[tokio::test]
async fn test_regeneration_keeps_exactly_one_report() {
    let text = Scripted::ok("not json at all");
    let (analyzer, store) = analyzer_with(text.clone());
    let id = analyzer.create_product(product()).await.unwrap().id.unwrap();

    let first = assert_ok!(analyzer.generate_report(id, REGENERATE).await);
    let second = assert_ok!(analyzer.generate_report(id, REGENERATE).await);
    let third = assert_ok!(analyzer.regenerate(id, false).await);

    let reports = store.reports_for(id).await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].id, third.id);
    assert_ne!(first.id, second.id);
    assert!(third.is_fallback());
    assert_eq!(text.calls(), 3);
}

#[tokio::test]
async fn test_regeneration_overwrites_stale_score() {
    let text = Scripted::ok(r#"{"executiveSummary": "Launch with a small test batch"}"#);
    let (analyzer, store) = analyzer_with(text);
    let stale = ProductRecord {
        final_score: Some(99),
        ..product()
    };
    let id = analyzer.create_product(stale).await.unwrap().id.unwrap();

    let report = analyzer.regenerate(id, true).await.unwrap();

    let stored = store.get(id).await.unwrap().unwrap();
    let expected = ScoringStrategy::Advanced.score(&product());
    assert_eq!(report.variant(), ReportVariant::Professional);
    assert_eq!(report.metadata.scoring_model, ScoringStrategy::Advanced);
    assert_eq!(report.metadata.recovery_stage, RecoveryStage::Direct);
    assert_eq!(stored.final_score, Some(expected));
    assert_ne!(stored.final_score, Some(99));
}

#[tokio::test]
async fn test_empty_object_answer_is_replaced_by_fallback() {
    let (analyzer, _) = analyzer_with(Scripted::ok("{}"));
    let id = analyzer.create_product(product()).await.unwrap().id.unwrap();

    let report = analyzer.generate_report(id, REGENERATE).await.unwrap();

    assert!(report.is_fallback());
    assert!(!report.body.core().customer_persona.is_empty());
    assert!(!report.body.core().swot_analysis.strengths.is_empty());
}

#[tokio::test]
async fn test_upstream_failure_persists_nothing() {
    let good = Scripted::ok(r#"{"customerPersona": "Students"}"#);
    let store = Arc::new(InMemoryStore::new());
    let healthy = ProductAnalyzer::new(
        store.clone(),
        ReportGenerator::new(good, &LlmConfig::default(), &ReportConfig::default()),
    );
    let id = healthy.create_product(product()).await.unwrap().id.unwrap();
    let original = healthy.generate_report(id, REGENERATE).await.unwrap();
    let score_before = store.get(id).await.unwrap().unwrap().final_score;

    let broken = ProductAnalyzer::new(
        store.clone(),
        ReportGenerator::new(
            Scripted::failing("HTTP 503: overloaded"),
            &LlmConfig::default(),
            &ReportConfig::default(),
        ),
    );
    let err = assert_err!(broken.generate_report(id, REGENERATE).await);

    assert!(matches!(err, AnalyzerError::Upstream(_)));
    assert!(err.is_generation_failure());
    assert_eq!(store.reports_for(id).await.unwrap(), vec![original]);
    assert_eq!(store.get(id).await.unwrap().unwrap().final_score, score_before);
}

#[tokio::test]
async fn test_missing_api_key_is_configuration_error() {
    let config = LlmConfig {
        api_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
        api_key: None,
        ..LlmConfig::default()
    };
    let client = LlmClient::new(config.clone()).unwrap();
    let store = Arc::new(InMemoryStore::new());
    let analyzer = ProductAnalyzer::new(
        store.clone(),
        ReportGenerator::new(Arc::new(client), &config, &ReportConfig::default()),
    );
    let id = analyzer.create_product(product()).await.unwrap().id.unwrap();

    let err = analyzer
        .generate_report(id, GenerateOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AnalyzerError::Configuration(_)));
    assert!(store.reports_for(id).await.unwrap().is_empty());
    assert_eq!(store.get(id).await.unwrap().unwrap().final_score, None);
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let (analyzer, _) = analyzer_with(Scripted::ok("{}"));
    let err = analyzer
        .generate_report(Uuid::new_v4(), REGENERATE)
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyzerError::NotFound(_)));
}

#[tokio::test]
async fn test_invalid_product_rejected() {
    let (analyzer, store) = analyzer_with(Scripted::ok("{}"));
    let record = ProductRecord {
        unit_price: -1.0,
        ..product()
    };
    let err = assert_err!(analyzer.create_product(record).await);
    assert!(matches!(err, AnalyzerError::Validation(_)));
    assert_eq!(store.product_count(), 0);
}
