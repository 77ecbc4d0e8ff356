//! Prompt construction for report generation
//!
//! The brief interpolates every product field (absent values render as
//! `N/A`), then closes with the JSON schema the model must answer with.

use super::schema::ReportVariant;
use crate::product::ProductRecord;
use std::fmt::Display;

const NOT_AVAILABLE: &str = "N/A";

const STANDARD_SCHEMA: &str = r#"{
  "customerPersona": "Detailed description of the ideal customer (age, lifestyle, pain points, buying triggers)",
  "swotAnalysis": {
    "strengths": ["..."],
    "weaknesses": ["..."],
    "opportunities": ["..."],
    "threats": ["..."]
  },
  "competitiveAnalysis": {
    "positioning": "...",
    "advantages": ["..."],
    "vulnerabilities": ["..."],
    "differentiation": ["..."],
    "priceStrategy": "..."
  },
  "marketingStrategy": {
    "channels": ["..."],
    "angles": ["..."],
    "contentStrategy": "...",
    "budget": "...",
    "launchPlan": "..."
  },
  "operationalRecommendations": {
    "testQuantity": 50,
    "inventoryStrategy": "...",
    "kpis": ["..."],
    "vigilancePoints": ["..."]
  },
  "financialProjection": {
    "optimistic": "...",
    "realistic": "...",
    "pessimistic": "...",
    "initialInvestment": "...",
    "roi": "..."
  },
  "actionPlan90Days": {
    "weeks1to4": "...",
    "weeks5to8": "...",
    "weeks9to12": "..."
  }
}"#;

const PROFESSIONAL_SCHEMA: &str = r#"{
  "executiveSummary": "...",
  "riskAssessment": "...",
  "customerPersona": "...",
  "swotAnalysis": { "strengths": ["..."], "weaknesses": ["..."], "opportunities": ["..."], "threats": ["..."] },
  "competitiveAnalysis": { "positioning": "...", "advantages": ["..."], "vulnerabilities": ["..."], "differentiation": ["..."], "priceStrategy": "..." },
  "marketingStrategy": { "channels": ["..."], "angles": ["..."], "contentStrategy": "...", "budget": "...", "launchPlan": "..." },
  "operationalRecommendations": { "testQuantity": 50, "inventoryStrategy": "...", "kpis": ["..."], "vigilancePoints": ["..."] },
  "financialProjection": { "optimistic": "...", "realistic": "...", "pessimistic": "...", "initialInvestment": "...", "roi": "..." },
  "actionPlan90Days": { "weeks1to4": "...", "weeks5to8": "...", "weeks9to12": "..." },
  "marketAnalysis": { "marketSize": "...", "trends": ["..."], "targetSegments": ["..."], "growthPotential": "..." },
  "demandValidation": { "searchDemand": "...", "trendAnalysis": "...", "seasonality": "...", "validationMethods": ["..."] },
  "productTesting": { "testBudget": "...", "testDuration": "...", "successCriteria": ["..."], "testingPhases": ["..."] },
  "sourcingStrategy": { "supplierCriteria": ["..."], "negotiationTips": ["..."], "qualityControl": "...", "backupPlan": "..." },
  "tiktokStrategy": { "contentIdeas": ["..."], "hashtags": ["..."], "influencerStrategy": "...", "postingSchedule": "...", "budget": "..." },
  "metaAdsStrategy": { "audiences": ["..."], "adFormats": ["..."], "creativeAngles": ["..."], "budget": "...", "scalingPlan": "..." },
  "operationalPlan": { "inventoryManagement": "...", "fulfillment": "...", "customerService": "...", "scalingSteps": ["..."] },
  "financialProjections": { "optimistic": "...", "realistic": "...", "pessimistic": "...", "breakEven": "...", "roi": "...", "cashFlowNotes": "..." },
  "implementationRoadmap": { "phase1": "...", "phase2": "...", "phase3": "...", "milestones": ["..."] },
  "kpiDashboard": { "primaryKpis": ["..."], "secondaryKpis": ["..."], "targets": ["..."], "reviewCadence": "..." },
  "contingencyPlans": { "lowSales": "...", "supplyDisruption": "...", "competitorResponse": "...", "platformPolicy": "..." }
}"#;

/// Build the prompt for a report variant
pub fn build_prompt(record: &ProductRecord, score: u8, variant: ReportVariant) -> String {
    match variant {
        ReportVariant::Standard => build_standard_prompt(record, score),
        ReportVariant::Professional => build_professional_prompt(record, score),
    }
}

pub fn build_standard_prompt(record: &ProductRecord, score: u8) -> String {
    let mut prompt = String::with_capacity(4096);
    prompt.push_str(
        "You are an expert e-commerce consultant. Analyze the following product \
         and produce a strategic launch report.\n\n",
    );
    prompt.push_str(&product_brief(record, score));
    prompt.push_str(
        "\nINSTRUCTIONS:\n\
         - Base every recommendation on the data above; mention figures where relevant.\n\
         - Give at least 3 items in every list.\n\
         - Financial projections must state monthly revenue and profit figures.\n\n",
    );
    push_output_format(&mut prompt, STANDARD_SCHEMA);
    prompt
}

pub fn build_professional_prompt(record: &ProductRecord, score: u8) -> String {
    let mut prompt = String::with_capacity(8192);
    prompt.push_str(
        "You are a senior e-commerce strategist preparing a professional due-diligence \
         report for an investor. Analyze the following product in depth.\n\n",
    );
    prompt.push_str(&product_brief(record, score));
    prompt.push_str(
        "\nINSTRUCTIONS:\n\
         - executiveSummary: 150 words minimum, ending with a clear go / no-go recommendation.\n\
         - customerPersona: 200 words minimum (demographics, psychographics, objections, buying triggers).\n\
         - riskAssessment: 150 words minimum covering market, operational, legal and financial risks.\n\
         - Give at least 4 items in every list and at least 5 hashtags in tiktokStrategy.\n\
         - financialProjections must give monthly figures for months 1, 3, 6 and 12 and a break-even point.\n\
         - implementationRoadmap phases must be dated in weeks and include measurable milestones.\n\n",
    );
    push_output_format(&mut prompt, PROFESSIONAL_SCHEMA);
    prompt
}

fn push_output_format(prompt: &mut String, schema: &str) {
    prompt.push_str("OUTPUT FORMAT:\n");
    prompt.push_str(
        "Answer with ONE valid JSON object that follows exactly this structure. \
         Do not add any text, explanation or markdown before or after the JSON. \
         Use double quotes for all keys and strings and no trailing commas.\n",
    );
    prompt.push_str(schema);
    prompt.push('\n');
}

/// Labeled sections describing the product
pub fn product_brief(record: &ProductRecord, score: u8) -> String {
    let sections: [(&str, Vec<(&str, String)>); 8] = [
        (
            "PRODUCT CONTEXT",
            vec![
                ("Name", record.display_name().to_string()),
                ("Category", text(&record.category).to_string()),
                ("Description", text(&record.description).to_string()),
                ("Viability score", format!("{}/100", score)),
            ],
        ),
        (
            "FINANCIAL DATA",
            vec![
                ("Unit price", money(record.unit_price)),
                ("Shipping cost", money(record.shipping_cost)),
                ("Branding cost", money(record.branding_cost)),
                ("Total unit cost", money(record.total_unit_cost())),
                ("Desired selling price", money(record.desired_selling_price)),
                ("Gross margin", format!("{:.1}%", record.gross_margin_percentage())),
                ("Competitor prices", price_list(&record.competitor_prices)),
                (
                    "Average competitor price",
                    opt_with(record.average_competitor_price(), money),
                ),
            ],
        ),
        (
            "MARKET DATA",
            vec![
                (
                    "Google Trends 12-month average",
                    opt_with(record.google_trends_12_month_average, |v| format!("{:.0}/100", v)),
                ),
                ("Monthly search volume", opt(record.monthly_search_volume)),
                ("Seasonal product", yes_no(record.is_seasonal_product).to_string()),
                (
                    "Market growth rate",
                    opt_with(record.market_growth_rate, |v| format!("{:.1}%", v)),
                ),
            ],
        ),
        (
            "COMPETITIVE DATA",
            vec![
                ("Number of competitors", opt(record.competitor_count)),
                ("Competition level", rating(record.competition_level)),
            ],
        ),
        (
            "QUALITATIVE CRITERIA",
            vec![
                ("Wow factor", rating(record.wow_factor)),
                ("Simplicity to explain", rating(record.simplicity_rating())),
                ("Ease of use", rating(record.ease_of_use)),
                ("Before/after potential", rating(record.before_after_potential)),
                ("Solves a problem", yes_no(record.solves_problem).to_string()),
                ("Innovative", yes_no(record.is_innovative).to_string()),
            ],
        ),
        (
            "LOGISTICS",
            vec![
                ("Minimum stock", opt(record.minimum_stock)),
                (
                    "Delivery time",
                    opt_with(record.delivery_time, |d| format!("{} days", d)),
                ),
                ("Fragile", yes_no(record.is_fragile).to_string()),
                ("Storage cost per unit", opt_with(record.storage_cost_per_unit, money)),
            ],
        ),
        (
            "SOCIAL PROOF",
            vec![
                ("Social proof strength", rating(record.social_proof_strength)),
                (
                    "Average rating",
                    opt_with(record.average_rating, |v| format!("{:.1}/5", v)),
                ),
                ("Average review count", opt(record.average_review_count)),
            ],
        ),
        (
            "STRATEGIC DATA",
            vec![
                ("Initial investment", opt_with(record.initial_investment, money)),
                ("Marketing budget", opt_with(record.marketing_budget, money)),
                ("Legal barriers level", rating(record.legal_barriers_level)),
                ("Strategic notes", text(&record.strategic_notes).to_string()),
            ],
        ),
    ];

    sections
        .iter()
        .map(|(title, lines)| {
            let body: String = lines
                .iter()
                .map(|(label, value)| format!("- {}: {}\n", label, value))
                .collect();
            format!("{}:\n{}", title, body)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn text(value: &Option<String>) -> &str {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(NOT_AVAILABLE)
}

fn opt<T: Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn opt_with<T, F>(value: Option<T>, render: F) -> String
where
    F: FnOnce(T) -> String,
{
    value.map(render).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn rating(value: Option<u8>) -> String {
    opt_with(value, |v| format!("{}/5", v))
}

fn yes_no(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "Yes",
        Some(false) => "No",
        None => NOT_AVAILABLE,
    }
}

pub(crate) fn money(value: f64) -> String {
    format!("{:.2}", value)
}

fn price_list(prices: &[f64]) -> String {
    if prices.is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    prices.iter().map(|p| money(*p)).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProductRecord {
        ProductRecord {
            product_name: Some("LED Face Mask".to_string()),
            category: Some("Beauty".to_string()),
            unit_price: 10.0,
            shipping_cost: 2.0,
            branding_cost: 1.0,
            desired_selling_price: 40.0,
            competitor_prices: vec![39.0, 59.0],
            monthly_search_volume: Some(12_000),
            wow_factor: Some(5),
            is_fragile: Some(false),
            ..Default::default()
        }
    }

    #[test]
    fn test_brief_interpolates_fields() {
        let brief = product_brief(&sample(), 72);
        assert!(brief.contains("- Name: LED Face Mask"));
        assert!(brief.contains("- Category: Beauty"));
        assert!(brief.contains("- Viability score: 72/100"));
        assert!(brief.contains("- Gross margin: 67.5%"));
        assert!(brief.contains("- Competitor prices: 39.00, 59.00"));
        assert!(brief.contains("- Monthly search volume: 12000"));
        assert!(brief.contains("- Wow factor: 5/5"));
        assert!(brief.contains("- Fragile: No"));
    }

    #[test]
    fn test_brief_marks_missing_fields() {
        let brief = product_brief(&ProductRecord::default(), 0);
        assert!(brief.contains("- Name: Unnamed product"));
        assert!(brief.contains("- Description: N/A"));
        assert!(brief.contains("- Monthly search volume: N/A"));
        assert!(brief.contains("- Seasonal product: N/A"));
        assert!(brief.contains("- Strategic notes: N/A"));
    }

    #[test]
    fn test_brief_sections_in_order() {
        let brief = product_brief(&sample(), 50);
        let sections = [
            "PRODUCT CONTEXT:",
            "FINANCIAL DATA:",
            "MARKET DATA:",
            "COMPETITIVE DATA:",
            "QUALITATIVE CRITERIA:",
            "LOGISTICS:",
            "SOCIAL PROOF:",
            "STRATEGIC DATA:",
        ];
        let positions: Vec<usize> = sections.iter().map(|s| brief.find(s).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_brief_layout() {
        let brief = product_brief(&sample(), 50);
        assert!(brief.starts_with("PRODUCT CONTEXT:\n- Name: LED Face Mask\n"));
        assert!(brief.contains("/100\n\nFINANCIAL DATA:\n- Unit price: 10.00\n"));
        assert!(brief.ends_with("- Strategic notes: N/A\n"));
    }

    #[test]
    fn test_standard_prompt_demands_json_only() {
        let prompt = build_prompt(&sample(), 61, ReportVariant::Standard);
        assert!(prompt.contains("\"actionPlan90Days\""));
        assert!(prompt.contains("Do not add any text"));
        assert!(!prompt.contains("\"executiveSummary\""));
    }

    #[test]
    fn test_professional_prompt_schema_and_minimums() {
        let prompt = build_prompt(&sample(), 61, ReportVariant::Professional);
        assert!(prompt.contains("\"executiveSummary\""));
        assert!(prompt.contains("\"contingencyPlans\""));
        assert!(prompt.contains("200 words minimum"));
    }

    #[test]
    fn test_embedded_schemas_are_valid_json() {
        serde_json::from_str::<serde_json::Value>(STANDARD_SCHEMA).unwrap();
        serde_json::from_str::<serde_json::Value>(PROFESSIONAL_SCHEMA).unwrap();
    }
}
