//! Advanced six-bucket model used for professional reports
//!
//! | bucket            | points |
//! |-------------------|--------|
//! | financial         | 25     |
//! | market            | 20     |
//! | product           | 20     |
//! | competition       | 15     |
//! | social proof      | 10     |
//! | logistics & risk  | 10     |

use super::{scaled, tier, tier_at_most, ScoreBreakdown, ScoringModel};
use crate::product::ProductRecord;

pub const FINANCIAL_MAX: f64 = 25.0;
pub const MARKET_MAX: f64 = 20.0;
pub const PRODUCT_MAX: f64 = 20.0;
pub const COMPETITION_MAX: f64 = 15.0;
pub const SOCIAL_PROOF_MAX: f64 = 10.0;
pub const LOGISTICS_MAX: f64 = 10.0;

// Financial
const MARGIN_TIERS: [(f64, f64); 3] = [(60.0, 15.0), (40.0, 11.0), (25.0, 7.0)];
const MARGIN_FLOOR: f64 = 3.0;
const PRICE_POSITION_MAX: f64 = 5.0;
const INVESTMENT_TIERS: [(f64, f64); 2] = [(1_000.0, 5.0), (5_000.0, 3.0)];

// Market
const TREND_POINTS: f64 = 8.0;
const SEARCH_VOLUME_TIERS: [(f64, f64); 3] = [(50_000.0, 7.0), (10_000.0, 5.0), (1_000.0, 3.0)];
const GROWTH_TIERS: [(f64, f64); 2] = [(15.0, 5.0), (5.0, 3.0)];

// Product
const RATING_POINTS: f64 = 3.5;
const FLAG_POINTS: f64 = 3.0;

// Competition
const COMPETITION_LEVEL_POINTS: f64 = 8.0;
const COMPETITOR_TIERS: [(f64, f64); 3] = [(3.0, 7.0), (10.0, 5.0), (25.0, 3.0)];

// Social proof
const PROOF_STRENGTH_POINTS: f64 = 4.0;
const RATING_STARS_POINTS: f64 = 4.0;
const REVIEW_COUNT_TIERS: [(f64, f64); 2] = [(1_000.0, 2.0), (100.0, 1.0)];

// Logistics & risk
const LEGAL_POINTS: f64 = 4.0;
const ROBUST_POINTS: f64 = 2.0;
const DELIVERY_TIERS: [(f64, f64); 2] = [(7.0, 2.0), (15.0, 1.0)];
const EVERGREEN_POINTS: f64 = 2.0;

/// Advanced viability model
#[derive(Debug, Clone, Copy, Default)]
pub struct AdvancedModel;

impl AdvancedModel {
    pub(crate) fn financial(record: &ProductRecord) -> f64 {
        let margin = record.gross_margin_percentage();
        let margin_points = if margin > 0.0 {
            tier(margin, &MARGIN_TIERS, MARGIN_FLOOR)
        } else {
            0.0
        };

        let price_points = match record.average_competitor_price() {
            Some(average) if record.desired_selling_price > 0.0 => {
                let price = record.desired_selling_price;
                if price <= average {
                    PRICE_POSITION_MAX
                } else if price <= average * 1.2 {
                    3.0
                } else {
                    1.0
                }
            }
            _ => 0.0,
        };

        let investment_points = record
            .initial_investment
            .filter(|v| v.is_finite())
            .map(|v| tier_at_most(v, &INVESTMENT_TIERS, 1.0))
            .unwrap_or(0.0);

        margin_points + price_points + investment_points
    }

    pub(crate) fn market(record: &ProductRecord) -> f64 {
        let trend = scaled(record.google_trends_12_month_average, 100.0, TREND_POINTS)
            .clamp(0.0, TREND_POINTS);

        let volume = match record.monthly_search_volume {
            Some(v) if v > 0 => tier(v as f64, &SEARCH_VOLUME_TIERS, 1.0),
            _ => 0.0,
        };

        let growth = match record.market_growth_rate {
            Some(rate) if rate.is_finite() && rate > 0.0 => tier(rate, &GROWTH_TIERS, 1.0),
            _ => 0.0,
        };

        trend + volume + growth
    }

    pub(crate) fn product(record: &ProductRecord) -> f64 {
        let ratings: f64 = [
            record.wow_factor,
            record.simplicity_rating(),
            record.ease_of_use,
            record.before_after_potential,
        ]
        .into_iter()
        .map(|r| scaled(r.map(|v| f64::from(v.min(5))), 5.0, RATING_POINTS))
        .sum();

        let flags = [record.solves_problem, record.is_innovative]
            .into_iter()
            .filter(|flag| *flag == Some(true))
            .count() as f64
            * FLAG_POINTS;

        ratings + flags
    }

    pub(crate) fn competition(record: &ProductRecord) -> f64 {
        let level = inverse_level(record.competition_level, COMPETITION_LEVEL_POINTS);
        let count = record
            .competitor_count
            .map(|c| tier_at_most(c as f64, &COMPETITOR_TIERS, 1.0))
            .unwrap_or(0.0);
        level + count
    }

    pub(crate) fn social_proof(record: &ProductRecord) -> f64 {
        let strength = scaled(
            record.social_proof_strength.map(|v| f64::from(v.min(5))),
            5.0,
            PROOF_STRENGTH_POINTS,
        );
        let stars = scaled(
            record.average_rating.map(|v| v.clamp(0.0, 5.0)),
            5.0,
            RATING_STARS_POINTS,
        );
        let reviews = record
            .average_review_count
            .map(|n| tier(n as f64, &REVIEW_COUNT_TIERS, 0.0))
            .unwrap_or(0.0);
        strength + stars + reviews
    }

    pub(crate) fn logistics(record: &ProductRecord) -> f64 {
        let legal = inverse_level(record.legal_barriers_level, LEGAL_POINTS);
        let robust = if record.is_fragile == Some(false) {
            ROBUST_POINTS
        } else {
            0.0
        };
        let delivery = record
            .delivery_time
            .map(|days| tier_at_most(days as f64, &DELIVERY_TIERS, 0.0))
            .unwrap_or(0.0);
        let evergreen = if record.is_seasonal_product == Some(false) {
            EVERGREEN_POINTS
        } else {
            0.0
        };
        legal + robust + delivery + evergreen
    }
}

/// 1-5 level where 1 is best: level 1 earns all `points`, level 5 none
fn inverse_level(level: Option<u8>, points: f64) -> f64 {
    level
        .map(|l| {
            let l = f64::from(l.clamp(1, 5));
            (5.0 - l) / 4.0 * points
        })
        .unwrap_or(0.0)
}

impl ScoringModel for AdvancedModel {
    fn name(&self) -> &'static str {
        "advanced"
    }

    fn breakdown(&self, record: &ProductRecord) -> ScoreBreakdown {
        let mut breakdown = ScoreBreakdown::default();
        breakdown.push("financial", Self::financial(record), FINANCIAL_MAX);
        breakdown.push("market", Self::market(record), MARKET_MAX);
        breakdown.push("product", Self::product(record), PRODUCT_MAX);
        breakdown.push("competition", Self::competition(record), COMPETITION_MAX);
        breakdown.push("social_proof", Self::social_proof(record), SOCIAL_PROOF_MAX);
        breakdown.push("logistics_risk", Self::logistics(record), LOGISTICS_MAX);
        breakdown
    }
}
