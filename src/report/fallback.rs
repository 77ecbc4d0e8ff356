//! Deterministic report synthesis
//!
//! Used when the model answer cannot be recovered. Everything is derived from
//! the product record and its score, so the same inputs always produce the
//! same sections.

use super::prompt::money;
use super::schema::*;
use crate::product::ProductRecord;

/// Monthly conversion rates applied to search volume
const OPTIMISTIC_CONVERSION: f64 = 0.02;
const REALISTIC_CONVERSION: f64 = 0.01;
const PESSIMISTIC_CONVERSION: f64 = 0.005;

/// Broad product family, inferred from the category text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Beauty,
    Fitness,
    Tech,
    Home,
    Pet,
    Fashion,
    Baby,
    General,
}

impl Segment {
    fn from_category(category: Option<&str>) -> Self {
        let category = category.unwrap_or_default().to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| category.contains(w));

        if has(&["beauty", "cosmetic", "skin", "hair", "makeup"]) {
            Self::Beauty
        } else if has(&["fitness", "sport", "gym", "yoga", "outdoor"]) {
            Self::Fitness
        } else if has(&["tech", "electronic", "gadget", "phone", "computer"]) {
            Self::Tech
        } else if has(&["home", "kitchen", "house", "decor", "garden"]) {
            Self::Home
        } else if has(&["pet", "dog", "cat", "animal"]) {
            Self::Pet
        } else if has(&["fashion", "cloth", "apparel", "jewel", "accessor"]) {
            Self::Fashion
        } else if has(&["baby", "kid", "child", "toddler"]) {
            Self::Baby
        } else {
            Self::General
        }
    }

    fn persona(self) -> &'static str {
        match self {
            Self::Beauty => "Women and men aged 22 to 45 who follow skincare and beauty creators, \
                care about visible results and are willing to pay a premium for products that \
                fit into a daily self-care routine.",
            Self::Fitness => "Active adults aged 20 to 40 training at home or at the gym, motivated \
                by progress and performance, who buy equipment that saves time and is easy to \
                carry.",
            Self::Tech => "Early adopters aged 18 to 40, comfortable buying online, who look for \
                smart gadgets that solve a daily annoyance and are eager to share new finds \
                with friends.",
            Self::Home => "Homeowners and renters aged 25 to 55 looking for practical products that \
                make the kitchen or home tidier, faster to manage and nicer to live in.",
            Self::Pet => "Pet owners aged 25 to 50 who treat their animals as family members and \
                spend readily on comfort, health and entertainment for them.",
            Self::Fashion => "Style-conscious shoppers aged 18 to 35 who discover products on \
                social media and buy on impulse when an item looks distinctive.",
            Self::Baby => "New and expecting parents aged 25 to 40 who prioritise safety and \
                convenience and rely heavily on reviews and recommendations.",
            Self::General => "Online shoppers aged 25 to 45 looking for a practical solution to an \
                everyday problem, sensitive to value for money and to social proof.",
        }
    }

    fn channels(self) -> Vec<String> {
        let channels: &[&str] = match self {
            Self::Beauty | Self::Fashion => &["TikTok", "Instagram Reels", "Influencer seeding"],
            Self::Fitness => &["TikTok", "YouTube Shorts", "Fitness micro-influencers"],
            Self::Tech => &["TikTok", "YouTube reviews", "Meta Ads"],
            Self::Home | Self::Baby => &["Meta Ads", "Pinterest", "TikTok"],
            Self::Pet => &["TikTok", "Instagram", "Pet community groups"],
            Self::General => &["Meta Ads", "TikTok", "Google Shopping"],
        };
        strings(channels)
    }
}

/// Derived figures shared by both report variants
struct Figures {
    price: f64,
    unit_cost: f64,
    margin: f64,
    volume: f64,
    test_quantity: u32,
}

impl Figures {
    fn from_record(record: &ProductRecord, score: u8) -> Self {
        Self {
            price: finite(record.desired_selling_price),
            unit_cost: finite(record.total_unit_cost()),
            margin: record.gross_margin_percentage(),
            volume: record.monthly_search_volume.unwrap_or(0) as f64,
            test_quantity: test_quantity(record, score),
        }
    }

    fn revenue(&self, conversion: f64) -> f64 {
        self.price * self.volume * conversion
    }

    fn profit(&self, conversion: f64) -> f64 {
        self.revenue(conversion) * self.margin / 100.0
    }

    fn projection(&self, conversion: f64) -> String {
        let units = (self.volume * conversion).round() as u64;
        format!(
            "{} units per month, {} monthly revenue, {} monthly gross profit",
            units,
            money(self.revenue(conversion)),
            money(self.profit(conversion))
        )
    }

    fn test_budget(&self) -> f64 {
        self.unit_cost * self.test_quantity as f64
    }
}

/// Build a complete standard report from the record alone
pub fn synthesize_standard(record: &ProductRecord, score: u8) -> StandardReport {
    let segment = Segment::from_category(record.category.as_deref());
    let figures = Figures::from_record(record, score);
    let name = record.display_name();

    StandardReport {
        customer_persona: format!("{} Ideal buyer profile for {}.", segment.persona(), name),
        swot_analysis: swot(record, &figures),
        competitive_analysis: CompetitiveAnalysis {
            positioning: positioning(record, &figures),
            advantages: advantages(record),
            vulnerabilities: vulnerabilities(record),
            differentiation: strings(&[
                "Branded packaging and unboxing experience",
                "Clear demonstration content showing the product in use",
                "Responsive customer service and easy returns",
            ]),
            price_strategy: price_strategy(record, &figures),
        },
        marketing_strategy: MarketingStrategy {
            channels: segment.channels(),
            angles: marketing_angles(record),
            content_strategy: format!(
                "Short vertical videos demonstrating {} within the first three seconds, \
                 followed by customer reactions and before/after comparisons.",
                name
            ),
            budget: match record.marketing_budget {
                Some(budget) if budget > 0.0 => format!("{} per month", money(budget)),
                _ => "Start with 20 to 30 per day per channel and scale winners".to_string(),
            },
            launch_plan: "Validate creatives organically, then run paid tests on the best \
                          performing angles before scaling spend."
                .to_string(),
        },
        operational_recommendations: OperationalRecommendations {
            test_quantity: figures.test_quantity,
            inventory_strategy: inventory_strategy(record),
            kpis: strings(&[
                "Conversion rate",
                "Cost per acquisition",
                "Return on ad spend",
                "Refund rate",
            ]),
            vigilance_points: vigilance_points(record),
        },
        financial_projection: FinancialProjection {
            optimistic: figures.projection(OPTIMISTIC_CONVERSION),
            realistic: figures.projection(REALISTIC_CONVERSION),
            pessimistic: figures.projection(PESSIMISTIC_CONVERSION),
            initial_investment: match record.initial_investment {
                Some(amount) if amount > 0.0 => money(amount),
                _ => format!("{} for the first test batch", money(figures.test_budget())),
            },
            roi: roi(record, &figures),
        },
        action_plan_90_days: ActionPlan90Days {
            weeks_1_to_4: format!(
                "Order {} test units, produce 10 creatives and launch organic content.",
                figures.test_quantity
            ),
            weeks_5_to_8: "Run paid tests on the two best angles, collect reviews and \
                           tune pricing."
                .to_string(),
            weeks_9_to_12: format!("{} {}", verdict(score), "Reorder stock based on sell-through."),
        },
    }
}

/// Build a complete professional report from the record alone
pub fn synthesize_professional(record: &ProductRecord, score: u8) -> ProfessionalReport {
    let core = synthesize_standard(record, score);
    let figures = Figures::from_record(record, score);
    let name = record.display_name().to_string();
    let seasonal = record.is_seasonal_product == Some(true);

    let yearly_realistic = figures.profit(REALISTIC_CONVERSION) * 12.0;
    let break_even = match record.initial_investment {
        Some(amount) if amount > 0.0 && figures.profit(REALISTIC_CONVERSION) > 0.0 => {
            let months = (amount / figures.profit(REALISTIC_CONVERSION)).ceil() as u64;
            format!("About {} months at the realistic scenario", months)
        }
        _ => "Not computable from the available data".to_string(),
    };

    ProfessionalReport {
        executive_summary: format!(
            "{} scores {}/100 with a gross margin of {:.1}%. {}",
            name,
            score,
            figures.margin,
            verdict(score)
        ),
        risk_assessment: risk_assessment(record),
        market_analysis: MarketAnalysis {
            market_size: match record.monthly_search_volume {
                Some(volume) => format!("{} monthly searches", volume),
                None => "Search volume not provided".to_string(),
            },
            trends: trends(record),
            target_segments: vec![core.customer_persona.clone()],
            growth_potential: match record.market_growth_rate {
                Some(rate) => format!("{:.1}% market growth", rate),
                None => "Growth rate not provided".to_string(),
            },
        },
        demand_validation: DemandValidation {
            search_demand: match record.monthly_search_volume {
                Some(volume) => format!("{} monthly searches", volume),
                None => "Validate search demand with keyword tools".to_string(),
            },
            trend_analysis: match record.google_trends_12_month_average {
                Some(avg) => format!("Google Trends 12-month average of {:.0}/100", avg),
                None => "Check the 12-month Google Trends curve before ordering".to_string(),
            },
            seasonality: if seasonal {
                "Seasonal product: time stock and campaigns to the peak months".to_string()
            } else {
                "No strong seasonality reported".to_string()
            },
            validation_methods: strings(&[
                "Organic video tests",
                "Small paid campaigns",
                "Pre-order landing page",
            ]),
        },
        product_testing: ProductTesting {
            test_budget: money(figures.test_budget()),
            test_duration: "4 weeks".to_string(),
            success_criteria: strings(&[
                "Conversion rate above 2%",
                "Cost per acquisition below gross profit per unit",
                "Refund rate below 5%",
            ]),
            testing_phases: strings(&[
                "Creative testing",
                "Audience testing",
                "Offer and price testing",
            ]),
        },
        sourcing_strategy: SourcingStrategy {
            supplier_criteria: strings(&[
                "Verified sample quality",
                "Consistent lead times",
                "Responsive communication",
            ]),
            negotiation_tips: strings(&[
                "Order samples from at least three suppliers",
                "Negotiate tiered pricing for reorders",
                "Agree on packaging and branding options upfront",
            ]),
            quality_control: if record.is_fragile == Some(true) {
                "Inspect every batch and test packaging with drop tests".to_string()
            } else {
                "Inspect a sample of every batch before shipping".to_string()
            },
            backup_plan: "Keep a second qualified supplier ready for reorders".to_string(),
        },
        tiktok_strategy: TiktokStrategy {
            content_ideas: marketing_angles(record),
            hashtags: hashtags(record),
            influencer_strategy: "Send free units to 10 to 20 micro-influencers in the niche"
                .to_string(),
            posting_schedule: "One to three videos per day during the test phase".to_string(),
            budget: core.marketing_strategy.budget.clone(),
        },
        meta_ads_strategy: MetaAdsStrategy {
            audiences: strings(&["Broad targeting", "Interest stacks", "Lookalikes of buyers"]),
            ad_formats: strings(&["Short video", "Carousel", "User-generated content"]),
            creative_angles: marketing_angles(record),
            budget: core.marketing_strategy.budget.clone(),
            scaling_plan: "Increase budget by 20% every three days on ad sets above target ROAS"
                .to_string(),
        },
        operational_plan: OperationalPlan {
            inventory_management: core.operational_recommendations.inventory_strategy.clone(),
            fulfillment: match record.delivery_time {
                Some(days) => format!("Current delivery time of {} days", days),
                None => "Define delivery times with the supplier".to_string(),
            },
            customer_service: "Answer within 24 hours and offer a simple return policy"
                .to_string(),
            scaling_steps: strings(&[
                "Move stock to a local warehouse",
                "Negotiate volume pricing",
                "Add complementary products",
            ]),
        },
        financial_projections: FinancialProjections {
            optimistic: figures.projection(OPTIMISTIC_CONVERSION),
            realistic: figures.projection(REALISTIC_CONVERSION),
            pessimistic: figures.projection(PESSIMISTIC_CONVERSION),
            break_even,
            roi: roi(record, &figures),
            cash_flow_notes: format!(
                "Realistic yearly gross profit of {}",
                money(yearly_realistic)
            ),
        },
        implementation_roadmap: ImplementationRoadmap {
            phase1: core.action_plan_90_days.weeks_1_to_4.clone(),
            phase2: core.action_plan_90_days.weeks_5_to_8.clone(),
            phase3: core.action_plan_90_days.weeks_9_to_12.clone(),
            milestones: strings(&[
                "First sale",
                "Positive return on ad spend",
                "First reorder",
            ]),
        },
        kpi_dashboard: KpiDashboard {
            primary_kpis: core.operational_recommendations.kpis.clone(),
            secondary_kpis: strings(&["Average order value", "Repeat purchase rate"]),
            targets: vec![
                format!("Gross margin above {:.0}%", figures.margin.min(50.0)),
                "Refund rate below 5%".to_string(),
            ],
            review_cadence: "Weekly".to_string(),
        },
        contingency_plans: ContingencyPlans {
            low_sales: "Test new angles and audiences before cutting price".to_string(),
            supply_disruption: "Switch to the backup supplier and pause ads".to_string(),
            competitor_response: "Compete on branding and service rather than price".to_string(),
            platform_policy: "Spread spend across at least two ad platforms".to_string(),
        },
        core,
    }
}

fn swot(record: &ProductRecord, figures: &Figures) -> SwotAnalysis {
    let mut strengths = Vec::new();
    if figures.margin >= 50.0 {
        strengths.push(format!("Healthy gross margin of {:.1}%", figures.margin));
    }
    if record.wow_factor.unwrap_or(0) >= 4 {
        strengths.push("Strong wow factor for video content".to_string());
    }
    if record.solves_problem == Some(true) {
        strengths.push("Solves a clear customer problem".to_string());
    }
    if record.is_innovative == Some(true) {
        strengths.push("Innovative product with novelty appeal".to_string());
    }
    if strengths.is_empty() {
        strengths.push("Simple offer that can be tested quickly".to_string());
    }

    let mut weaknesses = Vec::new();
    if figures.margin < 30.0 {
        weaknesses.push(format!("Thin gross margin of {:.1}%", figures.margin));
    }
    if record.is_fragile == Some(true) {
        weaknesses.push("Fragile product increases breakage and returns".to_string());
    }
    if record.delivery_time.unwrap_or(0) > 15 {
        weaknesses.push("Long delivery times".to_string());
    }
    if weaknesses.is_empty() {
        weaknesses.push("No established brand yet".to_string());
    }

    let mut opportunities = Vec::new();
    if record.market_growth_rate.unwrap_or(0.0) > 0.0 {
        opportunities.push("Growing market".to_string());
    }
    if record.monthly_search_volume.unwrap_or(0) >= 10_000 {
        opportunities.push("High existing search demand".to_string());
    }
    opportunities.push("Short-form video platforms reward demonstrable products".to_string());

    let mut threats = Vec::new();
    if record.competitor_count.unwrap_or(0) > 20 || record.competition_level.unwrap_or(0) >= 4 {
        threats.push("Crowded competitive landscape".to_string());
    }
    if record.is_seasonal_product == Some(true) {
        threats.push("Seasonal demand drops outside peak months".to_string());
    }
    if record.legal_barriers_level.unwrap_or(0) >= 3 {
        threats.push("Regulatory or legal constraints".to_string());
    }
    threats.push("Rising advertising costs".to_string());

    SwotAnalysis {
        strengths,
        weaknesses,
        opportunities,
        threats,
    }
}

fn positioning(record: &ProductRecord, figures: &Figures) -> String {
    match record.average_competitor_price() {
        Some(avg) if figures.price > avg * 1.1 => {
            "Premium positioning above the competitor average".to_string()
        }
        Some(avg) if figures.price < avg * 0.9 => {
            "Value positioning below the competitor average".to_string()
        }
        Some(_) => "Mid-market positioning in line with competitors".to_string(),
        None => "Positioning to be defined after competitor research".to_string(),
    }
}

fn price_strategy(record: &ProductRecord, figures: &Figures) -> String {
    match record.average_competitor_price() {
        Some(avg) => format!(
            "Sell at {} against a competitor average of {}",
            money(figures.price),
            money(avg)
        ),
        None => format!("Sell at {}", money(figures.price)),
    }
}

fn advantages(record: &ProductRecord) -> Vec<String> {
    let mut advantages = Vec::new();
    if record.simplicity_rating().unwrap_or(0) >= 4 {
        advantages.push("Easy to understand in a few seconds".to_string());
    }
    if record.ease_of_use.unwrap_or(0) >= 4 {
        advantages.push("Easy to use".to_string());
    }
    if record.before_after_potential.unwrap_or(0) >= 4 {
        advantages.push("Visible before/after results".to_string());
    }
    if advantages.is_empty() {
        advantages.push("Room to differentiate through branding".to_string());
    }
    advantages
}

fn vulnerabilities(record: &ProductRecord) -> Vec<String> {
    let mut vulnerabilities = Vec::new();
    if record.social_proof_strength.unwrap_or(0) <= 2 {
        vulnerabilities.push("Little social proof".to_string());
    }
    if record.competitor_count.unwrap_or(0) > 10 {
        vulnerabilities.push("Many direct competitors".to_string());
    }
    if vulnerabilities.is_empty() {
        vulnerabilities.push("Easy for competitors to copy".to_string());
    }
    vulnerabilities
}

fn marketing_angles(record: &ProductRecord) -> Vec<String> {
    let mut angles = Vec::new();
    if record.solves_problem == Some(true) {
        angles.push("Problem and solution demonstration".to_string());
    }
    if record.before_after_potential.unwrap_or(0) >= 3 {
        angles.push("Before/after comparison".to_string());
    }
    if record.wow_factor.unwrap_or(0) >= 3 {
        angles.push("Unboxing and first reaction".to_string());
    }
    angles.push("Customer testimonial".to_string());
    angles
}

fn inventory_strategy(record: &ProductRecord) -> String {
    if record.is_seasonal_product == Some(true) {
        "Build stock ahead of the season and avoid reorders after the peak".to_string()
    } else {
        "Start with a small batch and reorder once sell-through is proven".to_string()
    }
}

fn vigilance_points(record: &ProductRecord) -> Vec<String> {
    let mut points = vec!["Advertising cost per sale".to_string()];
    if record.is_fragile == Some(true) {
        points.push("Breakage in transit".to_string());
    }
    if record.delivery_time.unwrap_or(0) > 10 {
        points.push("Delivery delays".to_string());
    }
    if record.legal_barriers_level.unwrap_or(0) >= 3 {
        points.push("Compliance and labeling requirements".to_string());
    }
    points.push("Product quality across batches".to_string());
    points
}

fn risk_assessment(record: &ProductRecord) -> String {
    let mut risks = Vec::new();
    if record.competition_level.unwrap_or(0) >= 4 {
        risks.push("high competition");
    }
    if record.is_fragile == Some(true) {
        risks.push("fragile goods");
    }
    if record.is_seasonal_product == Some(true) {
        risks.push("seasonal demand");
    }
    if record.legal_barriers_level.unwrap_or(0) >= 3 {
        risks.push("legal barriers");
    }
    if risks.is_empty() {
        "No major risk factor reported; main risk is advertising cost".to_string()
    } else {
        format!("Main risk factors: {}", risks.join(", "))
    }
}

fn trends(record: &ProductRecord) -> Vec<String> {
    let mut trends = Vec::new();
    if let Some(avg) = record.google_trends_12_month_average {
        trends.push(format!("Google Trends average of {:.0}/100", avg));
    }
    if let Some(rate) = record.market_growth_rate {
        trends.push(format!("{:.1}% market growth", rate));
    }
    trends.push("Growth of social commerce".to_string());
    trends
}

fn hashtags(record: &ProductRecord) -> Vec<String> {
    let mut tags = vec!["#tiktokmademebuyit".to_string(), "#musthave".to_string()];
    if let Some(category) = record.category.as_deref() {
        let tag: String = category
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        if !tag.is_empty() {
            tags.push(format!("#{}", tag));
        }
    }
    tags.push("#viralproducts".to_string());
    tags.push("#shopping".to_string());
    tags
}

fn test_quantity(record: &ProductRecord, score: u8) -> u32 {
    match record.minimum_stock {
        Some(stock) if stock > 0 => stock,
        _ if score >= 75 => 100,
        _ if score >= 50 => 50,
        _ => 25,
    }
}

fn roi(record: &ProductRecord, figures: &Figures) -> String {
    match record.initial_investment {
        Some(amount) if amount > 0.0 => {
            let yearly = figures.profit(REALISTIC_CONVERSION) * 12.0;
            let roi = (yearly - amount) / amount * 100.0;
            format!("{:.0}% over 12 months at the realistic scenario", roi)
        }
        _ => "Not computable without an initial investment".to_string(),
    }
}

fn verdict(score: u8) -> &'static str {
    if score >= 75 {
        "Strong candidate: launch and scale progressively."
    } else if score >= 50 {
        "Promising candidate: validate with a limited test before committing."
    } else {
        "Weak candidate: rework the offer or look for a better product."
    }
}

fn finite(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
