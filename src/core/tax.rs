use serde::Serialize;

use super::types::{FilingStatus, IncomeStream};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxBracket {
    pub upper_bound: f64,
    pub rate: f64,
}

const fn band(upper_bound: f64, rate: f64) -> TaxBracket {
    TaxBracket { upper_bound, rate }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilingSchedule {
    pub federal: &'static [TaxBracket],
    pub state: &'static [TaxBracket],
    pub standard_deduction: f64,
    pub medicare_additional_threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxRegime {
    pub year: u16,
    pub married: FilingSchedule,
    pub single: FilingSchedule,
    pub ss_wage_base: f64,
    pub ss_rate: f64,
    pub medicare_rate: f64,
    pub additional_medicare_rate: f64,
    pub mortgage_interest_cap: f64,
    pub salt_cap: f64,
}

impl TaxRegime {
    pub fn for_year(year: u16) -> Option<&'static TaxRegime> {
        REGIMES.iter().find(|regime| regime.year == year)
    }

    pub fn latest() -> &'static TaxRegime {
        &REGIMES[REGIMES.len() - 1]
    }

    pub fn schedule(&self, status: FilingStatus) -> &FilingSchedule {
        match status {
            FilingStatus::Married => &self.married,
            FilingStatus::Single => &self.single,
        }
    }
}

const FEDERAL_2025_MARRIED: [TaxBracket; 7] = [
    band(23_850.0, 0.10),
    band(96_950.0, 0.12),
    band(206_700.0, 0.22),
    band(394_600.0, 0.24),
    band(501_050.0, 0.32),
    band(751_600.0, 0.35),
    band(f64::INFINITY, 0.37),
];

const FEDERAL_2025_SINGLE: [TaxBracket; 7] = [
    band(11_925.0, 0.10),
    band(48_475.0, 0.12),
    band(103_350.0, 0.22),
    band(197_300.0, 0.24),
    band(250_525.0, 0.32),
    band(626_350.0, 0.35),
    band(f64::INFINITY, 0.37),
];

const CALIFORNIA_2025_MARRIED: [TaxBracket; 9] = [
    band(20_198.0, 0.01),
    band(47_884.0, 0.02),
    band(75_576.0, 0.04),
    band(104_910.0, 0.06),
    band(132_590.0, 0.08),
    band(677_278.0, 0.093),
    band(812_728.0, 0.103),
    band(1_354_550.0, 0.113),
    band(f64::INFINITY, 0.123),
];

const CALIFORNIA_2025_SINGLE: [TaxBracket; 9] = [
    band(10_099.0, 0.01),
    band(23_942.0, 0.02),
    band(37_788.0, 0.04),
    band(52_455.0, 0.06),
    band(66_295.0, 0.08),
    band(338_639.0, 0.093),
    band(406_364.0, 0.103),
    band(677_275.0, 0.113),
    band(f64::INFINITY, 0.123),
];

const TAX_YEAR_2025: TaxRegime = TaxRegime {
    year: 2025,
    married: FilingSchedule {
        federal: &FEDERAL_2025_MARRIED,
        state: &CALIFORNIA_2025_MARRIED,
        standard_deduction: 30_000.0,
        medicare_additional_threshold: 250_000.0,
    },
    single: FilingSchedule {
        federal: &FEDERAL_2025_SINGLE,
        state: &CALIFORNIA_2025_SINGLE,
        standard_deduction: 15_000.0,
        medicare_additional_threshold: 200_000.0,
    },
    ss_wage_base: 167_700.0,
    ss_rate: 0.062,
    medicare_rate: 0.0145,
    additional_medicare_rate: 0.009,
    mortgage_interest_cap: 750_000.0,
    salt_cap: 10_000.0,
};

// Ordered by year; `latest` relies on it.
static REGIMES: [TaxRegime; 1] = [TAX_YEAR_2025];

pub fn bracket_tax(income: f64, brackets: &[TaxBracket]) -> f64 {
    let income = income.max(0.0);
    let mut lower = 0.0;
    let mut tax = 0.0;
    for bracket in brackets {
        if income <= lower {
            break;
        }
        tax += (income.min(bracket.upper_bound) - lower) * bracket.rate;
        lower = bracket.upper_bound;
    }
    tax
}

// Income exactly on a boundary takes the lower band's rate.
pub fn marginal_rate(income: f64, brackets: &[TaxBracket]) -> f64 {
    let income = income.max(0.0);
    brackets
        .iter()
        .find(|bracket| income <= bracket.upper_bound)
        .or(brackets.last())
        .map_or(0.0, |bracket| bracket.rate)
}

pub fn federal_tax(income: f64, status: FilingStatus, regime: &TaxRegime) -> f64 {
    bracket_tax(income, regime.schedule(status).federal)
}

pub fn state_tax(income: f64, status: FilingStatus, regime: &TaxRegime) -> f64 {
    bracket_tax(income, regime.schedule(status).state)
}

pub fn fica_tax(income: f64, status: FilingStatus, regime: &TaxRegime) -> f64 {
    let income = income.max(0.0);
    let threshold = regime.schedule(status).medicare_additional_threshold;

    let social_security = income.min(regime.ss_wage_base) * regime.ss_rate;
    let medicare = income * regime.medicare_rate
        + (income - threshold).max(0.0) * regime.additional_medicare_rate;
    social_security + medicare
}

pub fn effective_tax_rate(income: f64, status: FilingStatus, regime: &TaxRegime) -> f64 {
    if income <= 0.0 {
        return 0.0;
    }
    let total = federal_tax(income, status, regime)
        + state_tax(income, status, regime)
        + fica_tax(income, status, regime);
    total / income * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakdown {
    pub tax_year: u16,
    pub filing_status: FilingStatus,
    pub income: f64,
    pub federal_tax: f64,
    pub state_tax: f64,
    pub fica_tax: f64,
    pub total_tax: f64,
    pub effective_rate_pct: f64,
    pub marginal_federal_rate_pct: f64,
    pub marginal_state_rate_pct: f64,
}

pub fn tax_breakdown(income: f64, status: FilingStatus, regime: &TaxRegime) -> TaxBreakdown {
    let schedule = regime.schedule(status);
    let federal = federal_tax(income, status, regime);
    let state = state_tax(income, status, regime);
    let fica = fica_tax(income, status, regime);
    TaxBreakdown {
        tax_year: regime.year,
        filing_status: status,
        income,
        federal_tax: federal,
        state_tax: state,
        fica_tax: fica,
        total_tax: federal + state + fica,
        effective_rate_pct: effective_tax_rate(income, status, regime),
        marginal_federal_rate_pct: marginal_rate(income, schedule.federal) * 100.0,
        marginal_state_rate_pct: marginal_rate(income, schedule.state) * 100.0,
    }
}

impl IncomeStream {
    pub fn tax_rate_pct(&self, status: FilingStatus, regime: &TaxRegime) -> f64 {
        self.manual_tax_rate_pct
            .unwrap_or_else(|| effective_tax_rate(self.gross_annual, status, regime))
    }

    pub fn monthly_gross(&self) -> f64 {
        self.gross_annual.max(0.0) / 12.0
    }

    pub fn monthly_net(&self, status: FilingStatus, regime: &TaxRegime) -> f64 {
        let rate = self.tax_rate_pct(status, regime) / 100.0;
        (self.monthly_gross() * (1.0 - rate)).max(0.0)
    }
}
