//! Standard seven-criterion model
//!
//! The tiers add up to 105 raw points; the final score is normalized to 0-100.

use super::{scaled, tier, tier_at_most, ScoreBreakdown, ScoringModel};
use crate::product::ProductRecord;

pub const MARGIN_MAX: f64 = 20.0;
pub const TREND_MAX: f64 = 15.0;
pub const SEARCH_VOLUME_MAX: f64 = 10.0;
pub const RATING_MAX: f64 = 5.0;
pub const FLAG_POINTS: f64 = 5.0;
pub const COMPETITION_MAX: f64 = 15.0;
pub const SOCIAL_PROOF_MAX: f64 = 10.0;
pub const GROWTH_MAX: f64 = 5.0;

const MARGIN_TIERS: [(f64, f64); 3] = [(70.0, 20.0), (50.0, 15.0), (30.0, 10.0)];
const SEARCH_VOLUME_TIERS: [(f64, f64); 3] = [(10_000.0, 10.0), (5_000.0, 8.0), (1_000.0, 6.0)];
const COMPETITOR_TIERS: [(f64, f64); 3] = [(5.0, 15.0), (10.0, 12.0), (20.0, 8.0)];
const GROWTH_TIERS: [(f64, f64); 2] = [(10.0, 5.0), (5.0, 3.0)];

/// Standard viability model
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardModel;

impl StandardModel {
    fn margin_points(margin: f64) -> f64 {
        if margin > 0.0 {
            tier(margin, &MARGIN_TIERS, 5.0)
        } else {
            0.0
        }
    }
}

impl ScoringModel for StandardModel {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn breakdown(&self, record: &ProductRecord) -> ScoreBreakdown {
        let mut breakdown = ScoreBreakdown::default();

        breakdown.push(
            "margin",
            Self::margin_points(record.gross_margin_percentage()),
            MARGIN_MAX,
        );

        breakdown.push(
            "trend",
            scaled(record.google_trends_12_month_average, 100.0, TREND_MAX),
            TREND_MAX,
        );

        let search_points = record
            .monthly_search_volume
            .map(|volume| tier(volume as f64, &SEARCH_VOLUME_TIERS, 3.0))
            .unwrap_or(0.0);
        breakdown.push("search_volume", search_points, SEARCH_VOLUME_MAX);

        for (criterion, rating) in [
            ("wow_factor", record.wow_factor),
            ("simplicity", record.simplicity_rating()),
            ("ease_of_use", record.ease_of_use),
            ("before_after_potential", record.before_after_potential),
        ] {
            breakdown.push(
                criterion,
                scaled(rating.map(f64::from), 5.0, RATING_MAX),
                RATING_MAX,
            );
        }

        let flag = |value: Option<bool>| if value == Some(true) { FLAG_POINTS } else { 0.0 };
        breakdown.push("solves_problem", flag(record.solves_problem), FLAG_POINTS);
        breakdown.push("innovative", flag(record.is_innovative), FLAG_POINTS);

        let competition_points = record
            .competitor_count
            .map(|count| tier_at_most(count as f64, &COMPETITOR_TIERS, 5.0))
            .unwrap_or(0.0);
        breakdown.push("competition", competition_points, COMPETITION_MAX);

        breakdown.push(
            "social_proof",
            scaled(record.average_rating, 5.0, SOCIAL_PROOF_MAX),
            SOCIAL_PROOF_MAX,
        );

        let growth_points = record
            .market_growth_rate
            .filter(|rate| rate.is_finite())
            .map(|rate| tier(rate, &GROWTH_TIERS, 1.0))
            .unwrap_or(0.0);
        breakdown.push("market_growth", growth_points, GROWTH_MAX);

        breakdown
    }
}
