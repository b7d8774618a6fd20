use serde::Serialize;
use thiserror::Error;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilingStatus {
    Married,
    Single,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecastMethod {
    SavingsBased,
    FixedLump,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RecastStrategy {
    SavingsBased { monthly_surplus: f64, cash_buffer: f64 },
    FixedLump { amount: f64 },
}

impl RecastStrategy {
    pub fn method(self) -> RecastMethod {
        match self {
            RecastStrategy::SavingsBased { .. } => RecastMethod::SavingsBased,
            RecastStrategy::FixedLump { .. } => RecastMethod::FixedLump,
        }
    }

    pub fn monthly_surplus(self) -> f64 {
        match self {
            RecastStrategy::SavingsBased {
                monthly_surplus, ..
            } => monthly_surplus,
            RecastStrategy::FixedLump { .. } => 0.0,
        }
    }

    pub fn cash_buffer(self) -> f64 {
        match self {
            RecastStrategy::SavingsBased { cash_buffer, .. } => cash_buffer,
            RecastStrategy::FixedLump { .. } => 0.0,
        }
    }

    pub fn lump_amount(self) -> f64 {
        match self {
            RecastStrategy::SavingsBased { .. } => 0.0,
            RecastStrategy::FixedLump { amount } => amount,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IncomeSource {
    Primary,
    Secondary,
    Combined,
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct IncomeStream {
    pub gross_annual: f64,
    // Percent; None derives it from the brackets.
    pub manual_tax_rate_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioConfig {
    pub loan_principal: f64,
    pub term_months: u32,
    pub monthly_rate: f64,
    pub monthly_property_tax_base: f64,
    pub tax_appreciation_pct: f64,
    pub monthly_insurance: f64,
    pub initial_cash: f64,
    pub recast: RecastStrategy,
    pub recast_interval_months: u32,
    pub filing_status: FilingStatus,
    pub primary_income: IncomeStream,
    pub secondary_income: IncomeStream,
    pub tax_year: u16,
    pub tax_benefit: Option<IncomeSource>,
}

impl ScenarioConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.loan_principal.is_finite() || self.loan_principal < 0.0 {
            return Err(ConfigError::NegativePrincipal(self.loan_principal));
        }
        if self.term_months == 0 {
            return Err(ConfigError::ZeroTerm);
        }
        if !self.monthly_rate.is_finite() || self.monthly_rate < 0.0 {
            return Err(ConfigError::InvalidRate(self.monthly_rate));
        }
        if self.recast_interval_months == 0 {
            return Err(ConfigError::InvalidRecastInterval);
        }
        if !self.tax_appreciation_pct.is_finite() || self.tax_appreciation_pct <= -100.0 {
            return Err(ConfigError::InvalidAppreciation(self.tax_appreciation_pct));
        }

        let mut amounts = vec![
            ("monthly_property_tax_base", self.monthly_property_tax_base),
            ("monthly_insurance", self.monthly_insurance),
            ("initial_cash", self.initial_cash),
            ("primary_income", self.primary_income.gross_annual),
            ("secondary_income", self.secondary_income.gross_annual),
        ];
        match self.recast {
            RecastStrategy::SavingsBased {
                monthly_surplus,
                cash_buffer,
            } => {
                amounts.push(("monthly_surplus", monthly_surplus));
                amounts.push(("cash_buffer", cash_buffer));
            }
            RecastStrategy::FixedLump { amount } => amounts.push(("lump_amount", amount)),
        }
        for (field, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::NegativeAmount { field, value });
            }
        }

        for (field, stream) in [
            ("primary_income", self.primary_income),
            ("secondary_income", self.secondary_income),
        ] {
            if let Some(rate) = stream.manual_tax_rate_pct {
                if !(0.0..=100.0).contains(&rate) {
                    return Err(ConfigError::InvalidTaxRate { field, value: rate });
                }
            }
        }

        Ok(())
    }

    pub fn income(&self, source: IncomeSource) -> f64 {
        match source {
            IncomeSource::Primary => self.primary_income.gross_annual,
            IncomeSource::Secondary => self.secondary_income.gross_annual,
            IncomeSource::Combined => {
                self.primary_income.gross_annual + self.secondary_income.gross_annual
            }
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("loan_principal must be a finite amount >= 0, got {0}")]
    NegativePrincipal(f64),
    #[error("term_months must be > 0")]
    ZeroTerm,
    #[error("monthly_rate must be a finite rate >= 0, got {0}")]
    InvalidRate(f64),
    #[error("recast_interval_months must be >= 1")]
    InvalidRecastInterval,
    #[error("tax_appreciation_pct must be > -100, got {0}")]
    InvalidAppreciation(f64),
    #[error("{field} must be a finite amount >= 0, got {value}")]
    NegativeAmount { field: &'static str, value: f64 },
    #[error("{field} manual tax rate must be between 0 and 100, got {value}")]
    InvalidTaxRate { field: &'static str, value: f64 },
    #[error("tax_year {0} has no tax regime")]
    UnsupportedTaxYear(u16),
    #[error("display horizon must be between 1 and {term_months} months, got {horizon}")]
    HorizonOutOfRange { horizon: u32, term_months: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTaxBenefit {
    pub monthly_tax_benefit: f64,
    pub effective_payment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRow {
    pub month: u32,
    pub principal_and_interest: f64,
    pub scheduled_payment: f64,
    pub interest: f64,
    pub property_tax: f64,
    pub total_payment: f64,
    pub cumulative_paid: f64,
    pub balance: f64,
    pub recast_amount: f64,
    pub cumulative_recast: f64,
    pub is_paid_off: bool,
    pub savings_balance: f64,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub tax_benefit: Option<MonthlyTaxBenefit>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub with_recast: Vec<SimulationRow>,
    pub without_recast: Vec<SimulationRow>,
}

impl SimulationResult {
    pub fn term_months(&self) -> u32 {
        self.with_recast.len() as u32
    }

    pub fn trimmed(&self, horizon: u32) -> Result<SimulationResult, ConfigError> {
        let term_months = self.term_months();
        if horizon == 0 || horizon > term_months {
            return Err(ConfigError::HorizonOutOfRange {
                horizon,
                term_months,
            });
        }
        let n = horizon as usize;
        Ok(SimulationResult {
            with_recast: self.with_recast[..n].to_vec(),
            without_recast: self.without_recast[..n].to_vec(),
        })
    }
}
