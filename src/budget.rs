use serde::{Deserialize, Serialize};

use crate::{format_float, format_percent, Currency};

const BILLING_DAYS: f64 = 30.0;
const CONVERSION_DROP_POINTS: f64 = 1.0;
const CONVERSION_FLOOR_PCT: f64 = 0.1;
const CPM_RISE_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrafficObjective {
    #[default]
    Web,
    Whatsapp,
}

impl TrafficObjective {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "web" | "landing" | "site" => Some(TrafficObjective::Web),
            "whatsapp" | "messages" | "chat" => Some(TrafficObjective::Whatsapp),
            _ => None,
        }
    }

    pub fn click_label(self) -> &'static str {
        match self {
            TrafficObjective::Web => "Clicks (visits)",
            TrafficObjective::Whatsapp => "Leads (chats)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetInputs {
    pub monthly_revenue_goal: f64,
    pub unit_price: f64,
    pub conversion_rate_pct: f64,
    pub cost_per_click: f64,
    pub ctr_pct: f64,
    pub currency: Currency,
    pub traffic_objective: TrafficObjective,
}

impl Default for BudgetInputs {
    fn default() -> Self {
        Self {
            monthly_revenue_goal: 10_000.0,
            unit_price: 100.0,
            conversion_rate_pct: 2.0,
            cost_per_click: 0.40,
            ctr_pct: 1.5,
            currency: Currency::Usd,
            traffic_objective: TrafficObjective::Web,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetResult {
    pub sales_needed: u64,
    pub clicks_needed: u64,
    pub impressions_needed: u64,
    pub total_budget: f64,
    pub daily_budget: f64,
    pub cpm_ceiling: f64,
    pub roas: f64,
    pub break_even_sales: u64,
    pub min_ctr_pct: f64,
    pub budget_if_conversion_drops: f64,
    pub cpm_if_rises: f64,
    pub budget_if_cpm_rises: f64,
}

/// Reverse-engineers the ad spend needed to hit a monthly revenue goal.
///
/// Returns `None` when any of revenue, price, conversion rate, CPC or CTR is
/// zero (or negative, or not a number): there is nothing to compute yet.
pub fn compute_budget(inputs: &BudgetInputs) -> Option<BudgetResult> {
    let revenue = inputs.monthly_revenue_goal;
    let price = inputs.unit_price;
    let cpc = inputs.cost_per_click;
    let conversion_rate = inputs.conversion_rate_pct / 100.0;
    let ctr = inputs.ctr_pct / 100.0;

    if ![revenue, price, conversion_rate, cpc, ctr]
        .iter()
        .all(|value| value.is_finite() && *value > 0.0)
    {
        return None;
    }

    let sales_needed = (revenue / price).ceil();
    let clicks_needed = (sales_needed / conversion_rate).ceil();
    let impressions_needed = (clicks_needed / ctr).ceil();
    let total_budget = clicks_needed * cpc;
    let cpm = (total_budget / impressions_needed) * 1000.0;
    let roas = revenue / total_budget;

    let break_even_sales = (total_budget / price).ceil();
    let min_ctr_pct = (cpc / (price * conversion_rate)) * 100.0;

    let dropped_rate =
        (inputs.conversion_rate_pct - CONVERSION_DROP_POINTS).max(CONVERSION_FLOOR_PCT) / 100.0;
    let clicks_with_drop = (sales_needed / dropped_rate).ceil();
    let budget_if_conversion_drops = clicks_with_drop * cpc;

    let cpm_if_rises = cpm * CPM_RISE_FACTOR;
    let budget_if_cpm_rises = (impressions_needed / 1000.0) * cpm_if_rises;

    Some(BudgetResult {
        sales_needed: sales_needed as u64,
        clicks_needed: clicks_needed as u64,
        impressions_needed: impressions_needed as u64,
        total_budget,
        daily_budget: total_budget / BILLING_DAYS,
        cpm_ceiling: cpm,
        roas,
        break_even_sales: break_even_sales as u64,
        min_ctr_pct,
        budget_if_conversion_drops,
        cpm_if_rises,
        budget_if_cpm_rises,
    })
}

/// Display-ready view of a [`BudgetResult`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetReport {
    pub currency: Currency,
    pub traffic_objective: TrafficObjective,
    pub click_label: String,
    pub revenue_goal: String,
    pub total_budget: String,
    pub daily_budget: String,
    pub cpm_ceiling: String,
    pub roas: String,
    pub min_ctr: String,
    pub budget_if_conversion_drops: String,
    pub cpm_if_rises: String,
    pub budget_if_cpm_rises: String,
}

impl BudgetReport {
    pub fn new(inputs: &BudgetInputs, result: &BudgetResult) -> Self {
        let currency = inputs.currency;
        Self {
            currency,
            traffic_objective: inputs.traffic_objective,
            click_label: inputs.traffic_objective.click_label().to_string(),
            revenue_goal: currency.format(inputs.monthly_revenue_goal),
            total_budget: currency.format(result.total_budget),
            daily_budget: currency.format(result.daily_budget),
            cpm_ceiling: currency.format(result.cpm_ceiling),
            roas: format!("{}x", format_float(result.roas, 2)),
            min_ctr: format_percent(result.min_ctr_pct),
            budget_if_conversion_drops: currency.format(result.budget_if_conversion_drops),
            cpm_if_rises: currency.format(result.cpm_if_rises),
            budget_if_cpm_rises: currency.format(result.budget_if_cpm_rises),
        }
    }
}
