mod deduction;
mod engine;
mod report;
mod tax;
mod types;

pub use deduction::{
    DeductionBreakdown, annual_tax_benefit, deduction_breakdown, monthly_tax_benefit,
};
pub use engine::{appreciated_property_tax, payment, simulate, simulate_with_regime};
pub use report::{
    PaymentRatioRow, RecastEvent, ScenarioSummary, cumulative_savings, payment_ratios,
    recast_events, summarize,
};
pub use tax::{
    FilingSchedule, TaxBracket, TaxBreakdown, TaxRegime, bracket_tax, effective_tax_rate,
    federal_tax, fica_tax, marginal_rate, state_tax, tax_breakdown,
};
pub use types::{
    ConfigError, FilingStatus, IncomeSource, IncomeStream, MonthlyTaxBenefit, RecastMethod,
    RecastStrategy, ScenarioConfig, SimulationResult, SimulationRow,
};
