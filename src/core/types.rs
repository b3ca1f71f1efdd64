use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct Inputs {
    pub annual_income_gbp: f64,
    pub savings_usd: f64,
    pub october_spending_usd: f64,
    pub exchange_rate: f64,
    pub future_monthly_spending_usd: f64,
    pub additional_monthly_income_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
    pub month: String,
    pub cumulative_balance_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub monthly_income_usd: f64,
    pub total_available_usd: f64,
    pub october_shortfall_usd: f64,
    pub remaining_after_october_usd: f64,
    pub total_monthly_income_usd: f64,
    pub monthly_surplus_usd: f64,
    pub months_to_recover: Option<u32>,
    pub max_sustainable_monthly_spending_usd: f64,
    pub timeline: Vec<TimelinePoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAmount {
    pub label: &'static str,
    pub amount_usd: f64,
}
