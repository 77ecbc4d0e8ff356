//! Report schemas
//!
//! Wire names are camelCase and every field defaults, so a model answer that
//! is well-formed JSON but omits sections still yields a usable report.
//! Text and list fields also accept `null`, numbers, booleans and nested
//! values, which models routinely emit where a string is expected.

use super::repair::{RecoveryStage, ReportSchema};
use crate::scoring::ScoringStrategy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Which schema a report follows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportVariant {
    #[default]
    Standard,
    Professional,
}

impl ReportVariant {
    pub fn from_professional(professional: bool) -> Self {
        if professional {
            Self::Professional
        } else {
            Self::Standard
        }
    }

    /// Standard reports use the standard model, professional reports the advanced one
    pub fn scoring_strategy(self) -> ScoringStrategy {
        match self {
            Self::Standard => ScoringStrategy::Standard,
            Self::Professional => ScoringStrategy::Advanced,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Professional => "professional",
        }
    }
}

/// Caller options for a generation request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateOptions {
    pub professional: bool,
    /// Replace an existing report instead of returning it
    pub regenerate: bool,
}

// ---------------------------------------------------------------------------
// Standard schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StandardReport {
    #[serde(deserialize_with = "lenient_text")]
    pub customer_persona: String,
    #[serde(deserialize_with = "lenient_section")]
    pub swot_analysis: SwotAnalysis,
    #[serde(deserialize_with = "lenient_section")]
    pub competitive_analysis: CompetitiveAnalysis,
    #[serde(deserialize_with = "lenient_section")]
    pub marketing_strategy: MarketingStrategy,
    #[serde(deserialize_with = "lenient_section")]
    pub operational_recommendations: OperationalRecommendations,
    #[serde(deserialize_with = "lenient_section")]
    pub financial_projection: FinancialProjection,
    #[serde(rename = "actionPlan90Days")]
    #[serde(deserialize_with = "lenient_section")]
    pub action_plan_90_days: ActionPlan90Days,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SwotAnalysis {
    #[serde(deserialize_with = "lenient_list")]
    pub strengths: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub weaknesses: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub opportunities: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub threats: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompetitiveAnalysis {
    #[serde(deserialize_with = "lenient_text")]
    pub positioning: String,
    #[serde(deserialize_with = "lenient_list")]
    pub advantages: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub vulnerabilities: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub differentiation: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub price_strategy: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketingStrategy {
    #[serde(deserialize_with = "lenient_list")]
    pub channels: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub angles: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub content_strategy: String,
    #[serde(deserialize_with = "lenient_text")]
    pub budget: String,
    #[serde(deserialize_with = "lenient_text")]
    pub launch_plan: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperationalRecommendations {
    #[serde(deserialize_with = "lenient_quantity")]
    pub test_quantity: u32,
    #[serde(deserialize_with = "lenient_text")]
    pub inventory_strategy: String,
    #[serde(deserialize_with = "lenient_list")]
    pub kpis: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub vigilance_points: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinancialProjection {
    #[serde(deserialize_with = "lenient_text")]
    pub optimistic: String,
    #[serde(deserialize_with = "lenient_text")]
    pub realistic: String,
    #[serde(deserialize_with = "lenient_text")]
    pub pessimistic: String,
    #[serde(deserialize_with = "lenient_text")]
    pub initial_investment: String,
    #[serde(deserialize_with = "lenient_text")]
    pub roi: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionPlan90Days {
    #[serde(rename = "weeks1to4")]
    #[serde(deserialize_with = "lenient_text")]
    pub weeks_1_to_4: String,
    #[serde(rename = "weeks5to8")]
    #[serde(deserialize_with = "lenient_text")]
    pub weeks_5_to_8: String,
    #[serde(rename = "weeks9to12")]
    #[serde(deserialize_with = "lenient_text")]
    pub weeks_9_to_12: String,
}

// ---------------------------------------------------------------------------
// Professional schema: the standard sections plus thirteen more
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfessionalReport {
    #[serde(deserialize_with = "lenient_text")]
    pub executive_summary: String,
    #[serde(deserialize_with = "lenient_text")]
    pub risk_assessment: String,
    #[serde(flatten)]
    pub core: StandardReport,
    #[serde(deserialize_with = "lenient_section")]
    pub market_analysis: MarketAnalysis,
    #[serde(deserialize_with = "lenient_section")]
    pub demand_validation: DemandValidation,
    #[serde(deserialize_with = "lenient_section")]
    pub product_testing: ProductTesting,
    #[serde(deserialize_with = "lenient_section")]
    pub sourcing_strategy: SourcingStrategy,
    #[serde(deserialize_with = "lenient_section")]
    pub tiktok_strategy: TiktokStrategy,
    #[serde(deserialize_with = "lenient_section")]
    pub meta_ads_strategy: MetaAdsStrategy,
    #[serde(deserialize_with = "lenient_section")]
    pub operational_plan: OperationalPlan,
    #[serde(deserialize_with = "lenient_section")]
    pub financial_projections: FinancialProjections,
    #[serde(deserialize_with = "lenient_section")]
    pub implementation_roadmap: ImplementationRoadmap,
    #[serde(deserialize_with = "lenient_section")]
    pub kpi_dashboard: KpiDashboard,
    #[serde(deserialize_with = "lenient_section")]
    pub contingency_plans: ContingencyPlans,
}

fn filled(text: &str) -> bool {
    !text.trim().is_empty()
}

impl ReportSchema for StandardReport {
    fn has_content(&self) -> bool {
        let swot = &self.swot_analysis;
        filled(&self.customer_persona)
            || !swot.strengths.is_empty()
            || !swot.weaknesses.is_empty()
            || !swot.opportunities.is_empty()
            || !swot.threats.is_empty()
            || filled(&self.competitive_analysis.positioning)
            || filled(&self.financial_projection.realistic)
    }
}

impl ReportSchema for ProfessionalReport {
    fn has_content(&self) -> bool {
        self.core.has_content()
            || filled(&self.executive_summary)
            || filled(&self.risk_assessment)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketAnalysis {
    #[serde(deserialize_with = "lenient_text")]
    pub market_size: String,
    #[serde(deserialize_with = "lenient_list")]
    pub trends: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub target_segments: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub growth_potential: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DemandValidation {
    #[serde(deserialize_with = "lenient_text")]
    pub search_demand: String,
    #[serde(deserialize_with = "lenient_text")]
    pub trend_analysis: String,
    #[serde(deserialize_with = "lenient_text")]
    pub seasonality: String,
    #[serde(deserialize_with = "lenient_list")]
    pub validation_methods: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductTesting {
    #[serde(deserialize_with = "lenient_text")]
    pub test_budget: String,
    #[serde(deserialize_with = "lenient_text")]
    pub test_duration: String,
    #[serde(deserialize_with = "lenient_list")]
    pub success_criteria: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub testing_phases: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourcingStrategy {
    #[serde(deserialize_with = "lenient_list")]
    pub supplier_criteria: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub negotiation_tips: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub quality_control: String,
    #[serde(deserialize_with = "lenient_text")]
    pub backup_plan: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TiktokStrategy {
    #[serde(deserialize_with = "lenient_list")]
    pub content_ideas: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub hashtags: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub influencer_strategy: String,
    #[serde(deserialize_with = "lenient_text")]
    pub posting_schedule: String,
    #[serde(deserialize_with = "lenient_text")]
    pub budget: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetaAdsStrategy {
    #[serde(deserialize_with = "lenient_list")]
    pub audiences: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub ad_formats: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub creative_angles: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub budget: String,
    #[serde(deserialize_with = "lenient_text")]
    pub scaling_plan: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperationalPlan {
    #[serde(deserialize_with = "lenient_text")]
    pub inventory_management: String,
    #[serde(deserialize_with = "lenient_text")]
    pub fulfillment: String,
    #[serde(deserialize_with = "lenient_text")]
    pub customer_service: String,
    #[serde(deserialize_with = "lenient_list")]
    pub scaling_steps: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinancialProjections {
    #[serde(deserialize_with = "lenient_text")]
    pub optimistic: String,
    #[serde(deserialize_with = "lenient_text")]
    pub realistic: String,
    #[serde(deserialize_with = "lenient_text")]
    pub pessimistic: String,
    #[serde(deserialize_with = "lenient_text")]
    pub break_even: String,
    #[serde(deserialize_with = "lenient_text")]
    pub roi: String,
    #[serde(deserialize_with = "lenient_text")]
    pub cash_flow_notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImplementationRoadmap {
    #[serde(deserialize_with = "lenient_text")]
    pub phase1: String,
    #[serde(deserialize_with = "lenient_text")]
    pub phase2: String,
    #[serde(deserialize_with = "lenient_text")]
    pub phase3: String,
    #[serde(deserialize_with = "lenient_list")]
    pub milestones: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KpiDashboard {
    #[serde(deserialize_with = "lenient_list")]
    pub primary_kpis: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub secondary_kpis: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub targets: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub review_cadence: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContingencyPlans {
    #[serde(deserialize_with = "lenient_text")]
    pub low_sales: String,
    #[serde(deserialize_with = "lenient_text")]
    pub supply_disruption: String,
    #[serde(deserialize_with = "lenient_text")]
    pub competitor_response: String,
    #[serde(deserialize_with = "lenient_text")]
    pub platform_policy: String,
}

// ---------------------------------------------------------------------------
// Generated report
// ---------------------------------------------------------------------------

/// Report sections tagged with their schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", content = "sections", rename_all = "lowercase")]
pub enum ReportContent {
    Standard(StandardReport),
    Professional(Box<ProfessionalReport>),
}

impl ReportContent {
    pub fn variant(&self) -> ReportVariant {
        match self {
            Self::Standard(_) => ReportVariant::Standard,
            Self::Professional(_) => ReportVariant::Professional,
        }
    }

    /// Sections shared by both schemas
    pub fn core(&self) -> &StandardReport {
        match self {
            Self::Standard(report) => report,
            Self::Professional(report) => &report.core,
        }
    }
}

/// Audit information attached to every report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    pub ai_model: String,
    /// Full prompt sent to the model
    pub generation_prompt: String,
    pub processing_time_ms: u64,
    pub report_version: String,
    pub final_score: u8,
    pub scoring_model: ScoringStrategy,
    pub recovery_stage: RecoveryStage,
    pub generated_at: DateTime<Utc>,
}

/// A complete generated report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredReport {
    pub id: Uuid,
    #[serde(default)]
    pub product_id: Option<Uuid>,
    pub body: ReportContent,
    pub metadata: ReportMetadata,
}

impl StructuredReport {
    pub fn variant(&self) -> ReportVariant {
        self.body.variant()
    }

    /// True when the sections were synthesized instead of parsed from the model
    pub fn is_fallback(&self) -> bool {
        self.metadata.recovery_stage == RecoveryStage::Fallback
    }
}

/// Accepts `12`, `12.7`, `"12"` or `"about 12 units"`; anything else is 0
fn lenient_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let quantity = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .unwrap_or(0),
        Value::String(s) => s
            .split(|c: char| !c.is_ascii_digit())
            .find(|part| !part.is_empty())
            .and_then(|digits| digits.parse().ok())
            .unwrap_or(0),
        _ => 0,
    };
    Ok(quantity.min(u32::MAX as u64) as u32)
}

/// Text from any JSON value: `null` is empty, scalars are printed, arrays
/// are joined with `; ` and objects become `key: value` pairs
fn flatten_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(flatten_text)
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join("; "),
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| format!("{}: {}", key, flatten_text(value)))
            .collect::<Vec<_>>()
            .join("; "),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(flatten_text(&Value::deserialize(deserializer)?))
}

/// A nested section; anything but an object leaves it at its default
fn lenient_section<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned + Default,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => {
            serde_json::from_value(value).map_err(serde::de::Error::custom)
        }
        _ => Ok(T::default()),
    }
}

/// A list from any JSON value; a lone scalar becomes a one-element list
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items.iter().map(flatten_text).collect(),
        other => vec![flatten_text(&other)],
    };
    Ok(items.into_iter().filter(|item| !item.is_empty()).collect())
}
