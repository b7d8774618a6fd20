use serde::Serialize;

use super::tax::{TaxRegime, marginal_rate};
use super::types::FilingStatus;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductionBreakdown {
    pub deductible_interest: f64,
    pub deductible_salt: f64,
    pub itemized_total: f64,
    pub standard_deduction: f64,
    pub combined_marginal_rate: f64,
    pub annual_benefit: f64,
}

pub fn deduction_breakdown(
    yearly_interest: f64,
    monthly_property_tax: f64,
    income: f64,
    loan_principal: f64,
    status: FilingStatus,
    regime: &TaxRegime,
) -> DeductionBreakdown {
    let schedule = regime.schedule(status);

    let cap_ratio = if loan_principal > 0.0 {
        (regime.mortgage_interest_cap / loan_principal).min(1.0)
    } else {
        1.0
    };
    let deductible_interest = yearly_interest.max(0.0) * cap_ratio;
    let deductible_salt = (monthly_property_tax.max(0.0) * 12.0).min(regime.salt_cap);
    let itemized_total = deductible_interest + deductible_salt;

    let combined_marginal_rate = if income > 0.0 {
        marginal_rate(income, schedule.federal) + marginal_rate(income, schedule.state)
    } else {
        0.0
    };

    let annual_benefit = if itemized_total <= schedule.standard_deduction {
        0.0
    } else {
        (itemized_total - schedule.standard_deduction) * combined_marginal_rate
    };

    DeductionBreakdown {
        deductible_interest,
        deductible_salt,
        itemized_total,
        standard_deduction: schedule.standard_deduction,
        combined_marginal_rate,
        annual_benefit,
    }
}

pub fn annual_tax_benefit(
    yearly_interest: f64,
    monthly_property_tax: f64,
    income: f64,
    loan_principal: f64,
    status: FilingStatus,
    regime: &TaxRegime,
) -> f64 {
    deduction_breakdown(
        yearly_interest,
        monthly_property_tax,
        income,
        loan_principal,
        status,
        regime,
    )
    .annual_benefit
}

pub fn monthly_tax_benefit(
    yearly_interest: f64,
    monthly_property_tax: f64,
    income: f64,
    loan_principal: f64,
    status: FilingStatus,
    regime: &TaxRegime,
) -> f64 {
    annual_tax_benefit(
        yearly_interest,
        monthly_property_tax,
        income,
        loan_principal,
        status,
        regime,
    ) / 12.0
}
