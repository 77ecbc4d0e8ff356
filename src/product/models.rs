//! Product record submitted for scoring and report generation

use crate::error::{AnalyzerError, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product attributes collected by the intake wizard
///
/// Everything except the price fields is optional. Missing values are
/// tolerated by scoring and shown as `N/A` in prompts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    // Identity
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,

    // Pricing
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub shipping_cost: f64,
    #[serde(default)]
    pub branding_cost: f64,
    #[serde(default)]
    pub desired_selling_price: f64,
    #[serde(default)]
    pub competitor_prices: Vec<f64>,

    // Market signals
    /// 0-100
    #[serde(default, rename = "googleTrends12MonthAverage")]
    pub google_trends_12_month_average: Option<f64>,
    #[serde(default)]
    pub monthly_search_volume: Option<u64>,
    #[serde(default)]
    pub is_seasonal_product: Option<bool>,
    /// Percent per year
    #[serde(default)]
    pub market_growth_rate: Option<f64>,

    // Qualitative ratings, 1-5
    #[serde(default)]
    pub wow_factor: Option<u8>,
    #[serde(default)]
    pub simplicity: Option<u8>,
    #[serde(default)]
    pub explanation_simplicity: Option<u8>,
    #[serde(default)]
    pub ease_of_use: Option<u8>,
    #[serde(default)]
    pub before_after_potential: Option<u8>,

    // Qualitative flags
    #[serde(default)]
    pub solves_problem: Option<bool>,
    #[serde(default)]
    pub is_innovative: Option<bool>,

    // Competition
    #[serde(default)]
    pub competitor_count: Option<u32>,
    /// 1 (open market) to 5 (saturated)
    #[serde(default)]
    pub competition_level: Option<u8>,

    // Social proof
    #[serde(default)]
    pub social_proof_strength: Option<u8>,
    /// 0-5 stars
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub average_review_count: Option<u64>,

    // Logistics
    #[serde(default)]
    pub minimum_stock: Option<u32>,
    /// Days
    #[serde(default)]
    pub delivery_time: Option<u32>,
    #[serde(default)]
    pub is_fragile: Option<bool>,
    #[serde(default)]
    pub storage_cost_per_unit: Option<f64>,

    // Strategy
    #[serde(default)]
    pub initial_investment: Option<f64>,
    #[serde(default)]
    pub marketing_budget: Option<f64>,
    /// 1 (none) to 5 (heavily regulated)
    #[serde(default)]
    pub legal_barriers_level: Option<u8>,
    #[serde(default)]
    pub strategic_notes: Option<String>,

    /// Score of the most recent report generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_score: Option<u8>,
}

impl ProductRecord {
    /// Sum of purchase, shipping and branding cost per unit
    pub fn total_unit_cost(&self) -> f64 {
        self.unit_price + self.shipping_cost + self.branding_cost
    }

    /// Gross margin as a percentage of the selling price, never negative
    ///
    /// Derived on every call; there is no stored margin.
    pub fn gross_margin_percentage(&self) -> f64 {
        let selling_price = self.desired_selling_price;
        if selling_price.is_nan() || selling_price <= 0.0 {
            return 0.0;
        }
        let margin = (selling_price - self.total_unit_cost()) / selling_price * 100.0;
        if margin.is_finite() {
            margin.max(0.0)
        } else {
            0.0
        }
    }

    /// `explanationSimplicity` wins over the older `simplicity` field
    pub fn simplicity_rating(&self) -> Option<u8> {
        self.explanation_simplicity.or(self.simplicity)
    }

    /// Mean of the positive competitor prices
    pub fn average_competitor_price(&self) -> Option<f64> {
        let prices: Vec<f64> = self
            .competitor_prices
            .iter()
            .copied()
            .filter(|p| p.is_finite() && *p > 0.0)
            .collect();
        if prices.is_empty() {
            None
        } else {
            Some(prices.iter().sum::<f64>() / prices.len() as f64)
        }
    }

    pub fn display_name(&self) -> &str {
        self.product_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("Unnamed product")
    }

    /// Boundary validation for records arriving from outside the crate
    ///
    /// Rejects negative or non-finite prices, clamps ratings into their
    /// documented ranges and drops non-finite optional numbers.
    pub fn validate(mut self) -> Result<Self> {
        for (field, value) in [
            ("unitPrice", self.unit_price),
            ("shippingCost", self.shipping_cost),
            ("brandingCost", self.branding_cost),
            ("desiredSellingPrice", self.desired_selling_price),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalyzerError::Validation(format!(
                    "{} must be a non-negative number, got {}",
                    field, value
                )));
            }
        }

        self.competitor_prices.retain(|p| p.is_finite() && *p >= 0.0);

        for rating in [
            &mut self.wow_factor,
            &mut self.simplicity,
            &mut self.explanation_simplicity,
            &mut self.ease_of_use,
            &mut self.before_after_potential,
            &mut self.competition_level,
            &mut self.social_proof_strength,
            &mut self.legal_barriers_level,
        ] {
            *rating = rating.map(|r| r.clamp(1, 5));
        }

        self.google_trends_12_month_average =
            finite(self.google_trends_12_month_average).map(|v| v.clamp(0.0, 100.0));
        self.average_rating = finite(self.average_rating).map(|v| v.clamp(0.0, 5.0));
        self.market_growth_rate = finite(self.market_growth_rate);
        self.storage_cost_per_unit = finite(self.storage_cost_per_unit).map(|v| v.max(0.0));
        self.initial_investment = finite(self.initial_investment).map(|v| v.max(0.0));
        self.marketing_budget = finite(self.marketing_budget).map(|v| v.max(0.0));
        self.final_score = self.final_score.map(|s| s.min(100));

        Ok(self)
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
