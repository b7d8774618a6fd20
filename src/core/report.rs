use serde::Serialize;

use super::tax::TaxRegime;
use super::types::{
    ConfigError, IncomeStream, RecastMethod, ScenarioConfig, SimulationResult, SimulationRow,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub horizon_months: u32,
    pub recast_method: RecastMethod,
    pub recast_count: usize,
    pub total_recast: f64,
    pub cumulative_savings: f64,
    pub full_term_savings: f64,
    pub payoff_month_with_recast: Option<u32>,
    pub payoff_month_without_recast: Option<u32>,
    pub final_savings_with_recast: f64,
    pub final_savings_without_recast: f64,
    pub savings_balance_difference: f64,
    pub total_interest_with_recast: f64,
    pub total_interest_without_recast: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecastEvent {
    pub month: u32,
    pub amount: f64,
    pub new_scheduled_payment: f64,
    pub new_total_payment: f64,
    pub savings_after: f64,
    pub cumulative_recast: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRatioRow {
    pub month: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_pre_tax: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_post_tax: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_pre_tax: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_post_tax: Option<f64>,
}

pub fn summarize(
    config: &ScenarioConfig,
    result: &SimulationResult,
    horizon: u32,
) -> Result<ScenarioSummary, ConfigError> {
    let view = result.trimmed(horizon)?;
    let with = view.with_recast.as_slice();
    let without = view.without_recast.as_slice();

    let last_cumulative = |rows: &[SimulationRow]| rows.last().map_or(0.0, |r| r.cumulative_paid);
    let last_savings = |rows: &[SimulationRow]| rows.last().map_or(0.0, |r| r.savings_balance);
    let payoff_month = |rows: &[SimulationRow]| rows.iter().find(|r| r.is_paid_off).map(|r| r.month);
    let total_interest = |rows: &[SimulationRow]| rows.iter().map(|r| r.interest).sum::<f64>();

    let final_savings_with_recast = last_savings(with);
    let final_savings_without_recast = last_savings(without);

    Ok(ScenarioSummary {
        horizon_months: horizon,
        recast_method: config.recast.method(),
        recast_count: with.iter().filter(|r| r.recast_amount > 0.0).count(),
        total_recast: with.iter().map(|r| r.recast_amount).sum(),
        cumulative_savings: last_cumulative(without) - last_cumulative(with),
        full_term_savings: last_cumulative(result.without_recast.as_slice())
            - last_cumulative(result.with_recast.as_slice()),
        payoff_month_with_recast: payoff_month(with),
        payoff_month_without_recast: payoff_month(without),
        final_savings_with_recast,
        final_savings_without_recast,
        savings_balance_difference: final_savings_without_recast - final_savings_with_recast,
        total_interest_with_recast: total_interest(result.with_recast.as_slice()),
        total_interest_without_recast: total_interest(result.without_recast.as_slice()),
    })
}

// Baseline minus recast cumulative cost.
pub fn cumulative_savings(result: &SimulationResult) -> Vec<f64> {
    result
        .without_recast
        .iter()
        .zip(result.with_recast.iter())
        .map(|(without, with)| without.cumulative_paid - with.cumulative_paid)
        .collect()
}

pub fn recast_events(config: &ScenarioConfig, rows: &[SimulationRow]) -> Vec<RecastEvent> {
    rows.iter()
        .filter(|row| row.recast_amount > 0.0)
        .map(|row| RecastEvent {
            month: row.month,
            amount: row.recast_amount,
            new_scheduled_payment: row.scheduled_payment,
            new_total_payment: row.scheduled_payment
                + row.property_tax
                + config.monthly_insurance,
            savings_after: row.savings_balance,
            cumulative_recast: row.cumulative_recast,
        })
        .collect()
}

#[derive(Clone, Copy)]
struct MonthlyIncome {
    gross: f64,
    net: f64,
}

impl MonthlyIncome {
    fn from_stream(stream: &IncomeStream, config: &ScenarioConfig, regime: &TaxRegime) -> Option<Self> {
        if stream.gross_annual <= 0.0 {
            return None;
        }
        Some(Self {
            gross: stream.monthly_gross(),
            net: stream.monthly_net(config.filing_status, regime),
        })
    }
}

fn ratio(payment: f64, income: f64) -> f64 {
    if income > 0.0 { payment / income } else { 0.0 }
}

pub fn payment_ratios(
    rows: &[SimulationRow],
    config: &ScenarioConfig,
    regime: &TaxRegime,
) -> Vec<PaymentRatioRow> {
    let primary = MonthlyIncome::from_stream(&config.primary_income, config, regime);
    let secondary = MonthlyIncome::from_stream(&config.secondary_income, config, regime);
    if primary.is_none() && secondary.is_none() {
        return Vec::new();
    }

    rows.iter()
        .map(|row| {
            let pre = |income: Option<MonthlyIncome>| {
                income.map(|i| ratio(row.total_payment, i.gross))
            };
            let post = |income: Option<MonthlyIncome>| {
                income.map(|i| ratio(row.total_payment, i.net))
            };
            PaymentRatioRow {
                month: row.month,
                primary_pre_tax: pre(primary),
                primary_post_tax: post(primary),
                secondary_pre_tax: pre(secondary),
                secondary_post_tax: post(secondary),
            }
        })
        .collect()
}
