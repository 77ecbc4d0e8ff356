//! Deterministic product viability scoring
//!
//! Two models co-exist and are selected explicitly by the caller:
//! - [`StandardModel`]: seven criteria, used for standard reports
//! - [`AdvancedModel`]: six weighted buckets, used for professional reports
//!
//! They produce different numbers for the same record and are never merged.
//! Both accumulate `(score, max_score)` pairs; a missing input contributes
//! nothing to the score while its maximum still counts.

pub mod advanced;
pub mod standard;

pub use advanced::AdvancedModel;
pub use standard::StandardModel;

use crate::metrics::METRICS;
use crate::product::ProductRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A scoring formula
pub trait ScoringModel: Send + Sync {
    /// Short identifier used in logs, metrics and report metadata
    fn name(&self) -> &'static str;

    /// Per-criterion contributions for a record
    fn breakdown(&self, record: &ProductRecord) -> ScoreBreakdown;

    /// Final 0-100 score
    fn score(&self, record: &ProductRecord) -> u8 {
        self.breakdown(record).final_score()
    }
}

/// One criterion's contribution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreComponent {
    pub criterion: &'static str,
    pub score: f64,
    pub max_score: f64,
}

impl ScoreComponent {
    /// Build a component, keeping the score within `[0, max_score]`
    pub fn new(criterion: &'static str, score: f64, max_score: f64) -> Self {
        let score = if score.is_finite() {
            score.clamp(0.0, max_score)
        } else {
            0.0
        };
        Self {
            criterion,
            score,
            max_score,
        }
    }
}

/// Accumulated contributions of a scoring run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub components: Vec<ScoreComponent>,
}

impl ScoreBreakdown {
    pub fn push(&mut self, criterion: &'static str, score: f64, max_score: f64) {
        self.components.push(ScoreComponent::new(criterion, score, max_score));
    }

    pub fn raw_score(&self) -> f64 {
        self.components.iter().map(|c| c.score).sum()
    }

    pub fn max_score(&self) -> f64 {
        self.components.iter().map(|c| c.max_score).sum()
    }

    /// `round(raw / max * 100)`, 0 when nothing can be scored
    pub fn final_score(&self) -> u8 {
        let max = self.max_score();
        if max <= 0.0 {
            return 0;
        }
        let normalized = (self.raw_score() / max * 100.0).round();
        normalized.clamp(0.0, 100.0) as u8
    }

    /// Contribution of a single criterion, if it was evaluated
    pub fn component(&self, criterion: &str) -> Option<&ScoreComponent> {
        self.components.iter().find(|c| c.criterion == criterion)
    }
}

/// Caller-selectable scoring model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringStrategy {
    #[default]
    Standard,
    Advanced,
}

impl ScoringStrategy {
    pub fn model(self) -> &'static dyn ScoringModel {
        match self {
            Self::Standard => &StandardModel,
            Self::Advanced => &AdvancedModel,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.model().name()
    }

    /// Score a record and record the run in metrics
    pub fn score(self, record: &ProductRecord) -> u8 {
        self.breakdown(record).final_score()
    }

    pub fn breakdown(self, record: &ProductRecord) -> ScoreBreakdown {
        let model = self.model();
        let breakdown = model.breakdown(record);
        METRICS.product_scores.with_label_values(&[model.name()]).inc();
        debug!(
            model = model.name(),
            raw = breakdown.raw_score(),
            max = breakdown.max_score(),
            score = breakdown.final_score(),
            "Computed viability score"
        );
        breakdown
    }
}

/// Score many independent records
pub fn score_batch(records: &[ProductRecord], strategy: ScoringStrategy) -> Vec<u8> {
    records.iter().map(|record| strategy.score(record)).collect()
}

/// Tier lookup: first `(threshold, points)` whose threshold is met by `value`
pub(crate) fn tier(value: f64, tiers: &[(f64, f64)], otherwise: f64) -> f64 {
    tiers
        .iter()
        .find(|(threshold, _)| value >= *threshold)
        .map(|(_, points)| *points)
        .unwrap_or(otherwise)
}

/// Tier lookup for upper bounds: first `(limit, points)` with `value <= limit`
pub(crate) fn tier_at_most(value: f64, tiers: &[(f64, f64)], otherwise: f64) -> f64 {
    tiers
        .iter()
        .find(|(limit, _)| value <= *limit)
        .map(|(_, points)| *points)
        .unwrap_or(otherwise)
}

/// Fraction of a 1-5 style rating scaled onto `points`
pub(crate) fn scaled(rating: Option<f64>, scale: f64, points: f64) -> f64 {
    rating.map(|r| r / scale * points).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_score_rounds_half_up() {
        let mut breakdown = ScoreBreakdown::default();
        breakdown.push("a", 1.0, 8.0);
        // 12.5 rounds to 13
        assert_eq!(breakdown.final_score(), 13);
    }

    #[test]
    fn test_component_clamped() {
        let component = ScoreComponent::new("trend", 22.0, 15.0);
        assert_eq!(component.score, 15.0);
        let component = ScoreComponent::new("trend", f64::NAN, 15.0);
        assert_eq!(component.score, 0.0);
    }

    #[test]
    fn test_empty_breakdown_scores_zero() {
        assert_eq!(ScoreBreakdown::default().final_score(), 0);
    }

    #[test]
    fn test_tier_helpers() {
        let tiers = [(70.0, 20.0), (50.0, 15.0)];
        assert_eq!(tier(71.0, &tiers, 0.0), 20.0);
        assert_eq!(tier(50.0, &tiers, 0.0), 15.0);
        assert_eq!(tier(10.0, &tiers, 0.0), 0.0);
        assert_eq!(tier_at_most(5.0, &[(5.0, 15.0), (10.0, 12.0)], 5.0), 15.0);
        assert_eq!(tier_at_most(11.0, &[(5.0, 15.0), (10.0, 12.0)], 5.0), 5.0);
    }

    #[test]
    fn test_strategy_serde() {
        let strategy: ScoringStrategy = serde_json::from_str("\"advanced\"").unwrap();
        assert_eq!(strategy, ScoringStrategy::Advanced);
        assert_eq!(ScoringStrategy::default().as_str(), "standard");
    }

    #[test]
    fn test_score_batch() {
        let records = vec![ProductRecord::default(), ProductRecord::default()];
        assert_eq!(score_batch(&records, ScoringStrategy::Standard), vec![0, 0]);
    }
}
