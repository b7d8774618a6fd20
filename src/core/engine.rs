use log::debug;

use super::deduction::monthly_tax_benefit;
use super::tax::TaxRegime;
use super::types::{
    ConfigError, MonthlyTaxBenefit, RecastStrategy, ScenarioConfig, SimulationResult,
    SimulationRow,
};

// Balances at or below half a cent count as repaid.
const PAID_OFF_TOLERANCE: f64 = 0.005;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Trajectory {
    WithRecast,
    WithoutRecast,
}

#[derive(Debug)]
struct LoanState {
    balance: f64,
    scheduled_payment: f64,
    savings: f64,
    cumulative_payments: f64,
    cumulative_recast: f64,
}

impl LoanState {
    fn new(config: &ScenarioConfig) -> Self {
        Self {
            balance: config.loan_principal,
            scheduled_payment: payment(
                config.loan_principal,
                config.term_months,
                config.monthly_rate,
            ),
            savings: config.initial_cash,
            cumulative_payments: 0.0,
            cumulative_recast: 0.0,
        }
    }

    // (interest, principal repaid)
    fn pay_scheduled(&mut self, monthly_rate: f64) -> (f64, f64) {
        if self.balance <= 0.0 {
            return (0.0, 0.0);
        }
        let interest = self.balance * monthly_rate;
        let mut principal = (self.scheduled_payment - interest).min(self.balance);
        // A sub-cent remainder is swept into this payment.
        if self.balance - principal <= PAID_OFF_TOLERANCE {
            principal = self.balance;
        }
        self.balance -= principal;
        if self.balance <= 0.0 {
            self.scheduled_payment = 0.0;
        }
        (interest, principal)
    }

    fn apply_recast(&mut self, config: &ScenarioConfig, month: u32) -> f64 {
        if self.balance <= 0.0 {
            return 0.0;
        }
        self.savings += config.recast.monthly_surplus();
        if month % config.recast_interval_months != 0 {
            return 0.0;
        }

        let (amount, available) = match config.recast {
            RecastStrategy::SavingsBased { cash_buffer, .. } => {
                let extra = (self.savings - cash_buffer).max(0.0);
                (extra.min(self.balance), extra)
            }
            RecastStrategy::FixedLump { amount } => {
                if amount > 0.0 && self.savings >= amount {
                    (amount.min(self.balance), self.savings)
                } else {
                    (0.0, 0.0)
                }
            }
        };
        if amount <= 0.0 {
            return 0.0;
        }
        // Clear a sub-cent remainder only when the cash covers it; otherwise
        // the next scheduled payment sweeps it.
        let amount = if self.balance - amount <= PAID_OFF_TOLERANCE && available >= self.balance {
            self.balance
        } else {
            amount
        };

        self.balance -= amount;
        self.savings -= amount;
        // Same maturity date: the level payment is re-derived over what is
        // left of the original term.
        self.scheduled_payment = payment(
            self.balance,
            config.term_months - month,
            config.monthly_rate,
        );
        debug!(
            "recast {amount:.2} at month {month}; balance {:.2}, new P&I {:.2}",
            self.balance, self.scheduled_payment
        );
        amount
    }
}

pub fn payment(balance: f64, months_left: u32, monthly_rate: f64) -> f64 {
    if balance <= 0.0 {
        return 0.0;
    }
    if months_left == 0 {
        return balance;
    }
    let months = months_left as f64;
    if monthly_rate.abs() < 1e-12 {
        return balance / months;
    }
    balance * monthly_rate / (1.0 - (1.0 + monthly_rate).powf(-months))
}

pub fn appreciated_property_tax(config: &ScenarioConfig, month: u32) -> f64 {
    config.monthly_property_tax_base
        * (1.0 + config.tax_appreciation_pct / 100.0).powf(month as f64 / 12.0)
}

pub fn simulate(config: &ScenarioConfig) -> Result<SimulationResult, ConfigError> {
    let regime = TaxRegime::for_year(config.tax_year)
        .ok_or(ConfigError::UnsupportedTaxYear(config.tax_year))?;
    simulate_with_regime(config, regime)
}

pub fn simulate_with_regime(
    config: &ScenarioConfig,
    regime: &TaxRegime,
) -> Result<SimulationResult, ConfigError> {
    config.validate()?;
    Ok(SimulationResult {
        with_recast: run_trajectory(config, regime, Trajectory::WithRecast),
        without_recast: run_trajectory(config, regime, Trajectory::WithoutRecast),
    })
}

fn run_trajectory(
    config: &ScenarioConfig,
    regime: &TaxRegime,
    trajectory: Trajectory,
) -> Vec<SimulationRow> {
    let mut state = LoanState::new(config);
    let mut rows = Vec::with_capacity(config.term_months as usize);

    for month in 1..=config.term_months {
        let property_tax = appreciated_property_tax(config, month);

        let opened_with_balance = state.balance > 0.0;
        let (interest, principal) = state.pay_scheduled(config.monthly_rate);
        let principal_and_interest = if opened_with_balance {
            interest + principal
        } else {
            0.0
        };
        let total_payment = principal_and_interest + property_tax + config.monthly_insurance;

        let tax_benefit = match (trajectory, config.tax_benefit) {
            (Trajectory::WithRecast, Some(source)) => {
                let benefit = monthly_tax_benefit(
                    interest * 12.0,
                    property_tax,
                    config.income(source),
                    config.loan_principal,
                    config.filing_status,
                    regime,
                );
                Some(MonthlyTaxBenefit {
                    monthly_tax_benefit: benefit,
                    effective_payment: total_payment - benefit,
                })
            }
            _ => None,
        };

        let recast_amount = match trajectory {
            Trajectory::WithRecast => state.apply_recast(config, month),
            Trajectory::WithoutRecast => {
                state.savings += config.recast.monthly_surplus();
                0.0
            }
        };

        state.cumulative_payments += total_payment;
        state.cumulative_recast += recast_amount;

        rows.push(SimulationRow {
            month,
            principal_and_interest,
            scheduled_payment: state.scheduled_payment,
            interest,
            property_tax,
            total_payment,
            cumulative_paid: state.cumulative_payments + state.cumulative_recast,
            balance: state.balance,
            recast_amount,
            cumulative_recast: state.cumulative_recast,
            is_paid_off: state.balance <= 0.0,
            savings_balance: state.savings,
            tax_benefit,
        });
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{FilingStatus, IncomeSource, IncomeStream};
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn sample_config() -> ScenarioConfig {
        ScenarioConfig {
            loan_principal: 1_260_000.0,
            term_months: 360,
            monthly_rate: 0.066 / 12.0,
            monthly_property_tax_base: 1_500.0,
            tax_appreciation_pct: 0.0,
            monthly_insurance: 300.0,
            initial_cash: 200_000.0,
            recast: RecastStrategy::SavingsBased {
                monthly_surplus: 8_000.0,
                cash_buffer: 150_000.0,
            },
            recast_interval_months: 12,
            filing_status: FilingStatus::Married,
            primary_income: IncomeStream {
                gross_annual: 690_000.0,
                manual_tax_rate_pct: None,
            },
            secondary_income: IncomeStream {
                gross_annual: 260_000.0,
                manual_tax_rate_pct: None,
            },
            tax_year: 2025,
            tax_benefit: None,
        }
    }

    fn fixed_lump_config() -> ScenarioConfig {
        let mut config = sample_config();
        config.recast = RecastStrategy::FixedLump { amount: 90_000.0 };
        config
    }

    fn run(config: &ScenarioConfig) -> SimulationResult {
        simulate(config).expect("valid config")
    }

    #[test]
    fn payment_matches_annuity_formula() {
        let r: f64 = 0.0055;
        let expected = 1_260_000.0 * r / (1.0 - (1.0 + r).powf(-360.0));
        assert_approx(payment(1_260_000.0, 360, r), expected);
        assert!(expected > 8_040.0 && expected < 8_055.0);
    }

    #[test]
    fn payment_handles_degenerate_inputs() {
        assert_approx(payment(120_000.0, 360, 0.0), 120_000.0 / 360.0);
        assert_approx(payment(5_000.0, 0, 0.005), 5_000.0);
        assert_eq!(payment(0.0, 120, 0.005), 0.0);
        assert_eq!(payment(-10.0, 120, 0.005), 0.0);
    }

    #[test]
    fn first_month_of_baseline_is_level_payment_plus_escrow() {
        let result = run(&sample_config());
        let first = &result.without_recast[0];
        let pi = payment(1_260_000.0, 360, 0.0055);

        assert_eq!(first.month, 1);
        assert_approx(first.principal_and_interest, pi);
        assert_approx(first.total_payment, pi + 1_500.0 + 300.0);
        assert_approx(first.interest, 1_260_000.0 * 0.0055);
        assert_approx(first.balance, 1_260_000.0 - (pi - 6_930.0));
        assert!(!first.is_paid_off);
    }

    #[test]
    fn fixed_lump_recasts_on_interval_and_lowers_payment() {
        let config = fixed_lump_config();
        let result = run(&config);
        let rows = &result.with_recast;

        for row in &rows[..11] {
            assert_eq!(row.recast_amount, 0.0);
        }
        let before = &rows[10];
        let recast_month = &rows[11];
        assert_eq!(recast_month.month, 12);
        assert_approx(recast_month.recast_amount, 90_000.0f64.min(before.balance));
        assert!(recast_month.scheduled_payment < before.scheduled_payment);
        assert_approx(
            recast_month.scheduled_payment,
            payment(recast_month.balance, 360 - 12, config.monthly_rate),
        );
        // The new level payment is what gets paid from month 13.
        assert_approx(
            rows[12].principal_and_interest,
            recast_month.scheduled_payment,
        );
        // 200_000 initial cash, no surplus: two lumps then the gate closes.
        assert_approx(recast_month.savings_balance, 110_000.0);
        assert_approx(rows[23].recast_amount, 90_000.0);
        assert_approx(rows[23].savings_balance, 20_000.0);
        assert_eq!(rows[35].recast_amount, 0.0);
        assert_approx(rows[359].cumulative_recast, 180_000.0);
    }

    #[test]
    fn fixed_lump_ignores_savings_parameters() {
        let result = run(&fixed_lump_config());
        // No surplus accrues under a fixed lump policy.
        assert_approx(result.without_recast[100].savings_balance, 200_000.0);
    }

    #[test]
    fn savings_based_recast_keeps_the_cash_buffer() {
        let config = sample_config();
        let result = run(&config);
        let month_12 = &result.with_recast[11];

        // 200_000 + 12 * 8_000 - 150_000 buffer
        assert_approx(month_12.recast_amount, 146_000.0);
        assert_approx(month_12.savings_balance, 150_000.0);
        assert_approx(result.without_recast[11].savings_balance, 296_000.0);
    }

    #[test]
    fn savings_based_skips_recast_while_below_buffer() {
        let mut config = sample_config();
        config.initial_cash = 0.0;
        config.recast = RecastStrategy::SavingsBased {
            monthly_surplus: 1_000.0,
            cash_buffer: 50_000.0,
        };
        let result = run(&config);
        assert!(result.with_recast[..48].iter().all(|r| r.recast_amount == 0.0));
        assert_approx(result.with_recast[59].recast_amount, 10_000.0);
    }

    #[test]
    fn recast_never_exceeds_balance_and_rows_continue_after_payoff() {
        let mut config = sample_config();
        config.loan_principal = 100_000.0;
        config.initial_cash = 500_000.0;
        config.recast = RecastStrategy::SavingsBased {
            monthly_surplus: 0.0,
            cash_buffer: 0.0,
        };
        config.recast_interval_months = 3;
        let result = run(&config);
        let rows = &result.with_recast;

        assert_eq!(rows.len(), 360);
        assert_eq!(result.without_recast.len(), 360);

        let payoff = &rows[2];
        assert!(payoff.is_paid_off);
        assert_eq!(payoff.balance, 0.0);
        // The recast clears whatever the month-3 payment left outstanding.
        let principal_repaid = payoff.principal_and_interest - payoff.interest;
        assert_approx(payoff.recast_amount, rows[1].balance - principal_repaid);
        assert!(payoff.recast_amount <= rows[1].balance);
        assert_approx(payoff.savings_balance, 500_000.0 - payoff.recast_amount);
        assert_eq!(payoff.scheduled_payment, 0.0);

        for row in &rows[3..] {
            assert_eq!(row.balance, 0.0);
            assert_eq!(row.principal_and_interest, 0.0);
            assert_eq!(row.recast_amount, 0.0);
            assert_approx(row.total_payment, 1_500.0 + 300.0);
            assert!(row.is_paid_off);
        }
    }

    #[test]
    fn zero_rate_amortizes_linearly_without_nan() {
        let mut config = sample_config();
        config.monthly_rate = 0.0;
        config.loan_principal = 360_000.0;
        let result = run(&config);
        let baseline = &result.without_recast;

        assert_approx(baseline[0].principal_and_interest, 1_000.0);
        assert_approx(baseline[0].balance, 359_000.0);
        assert_eq!(baseline[359].balance, 0.0);
        for row in result.with_recast.iter().chain(baseline.iter()) {
            assert!(row.balance.is_finite());
            assert!(row.total_payment.is_finite());
            assert_eq!(row.interest, 0.0);
        }
    }

    #[test]
    fn property_tax_compounds_on_monthly_index() {
        let mut config = sample_config();
        config.tax_appreciation_pct = 2.0;
        let result = run(&config);

        assert_approx(result.without_recast[11].property_tax, 1_500.0 * 1.02);
        assert_approx(result.without_recast[23].property_tax, 1_500.0 * 1.02 * 1.02);
        assert_approx(
            result.without_recast[0].property_tax,
            1_500.0 * 1.02f64.powf(1.0 / 12.0),
        );
    }

    #[test]
    fn baseline_total_matches_closed_form() {
        let mut config = sample_config();
        config.tax_appreciation_pct = 3.0;
        let result = run(&config);

        let n = config.term_months;
        let level = payment(config.loan_principal, n, config.monthly_rate);
        let tax_sum: f64 = (1..=n)
            .map(|m| appreciated_property_tax(&config, m))
            .sum();
        let expected = n as f64 * level + tax_sum + n as f64 * config.monthly_insurance;
        let actual: f64 = result.without_recast.iter().map(|r| r.total_payment).sum();

        assert_approx_tol(actual, expected, 1e-3);
        assert_approx_tol(result.without_recast[359].cumulative_paid, expected, 1e-3);
        assert_eq!(result.without_recast[359].balance, 0.0);
        assert!(result.without_recast[358].balance > 0.0);
    }

    #[test]
    fn baseline_keeps_original_level_payment() {
        let result = run(&sample_config());
        let level = result.without_recast[0].scheduled_payment;
        for row in &result.without_recast[..359] {
            assert_approx(row.scheduled_payment, level);
            assert_eq!(row.recast_amount, 0.0);
        }
    }

    #[test]
    fn cumulative_paid_includes_recast_principal() {
        let result = run(&fixed_lump_config());
        let rows = &result.with_recast;
        let payments: f64 = rows[..12].iter().map(|r| r.total_payment).sum();
        assert_approx_tol(rows[11].cumulative_paid, payments + 90_000.0, 1e-6);
        assert_approx(rows[11].cumulative_recast, 90_000.0);
    }

    #[test]
    fn tax_benefit_rows_only_on_recast_trajectory_when_enabled() {
        let mut config = sample_config();
        assert!(run(&config).with_recast[0].tax_benefit.is_none());

        config.tax_benefit = Some(IncomeSource::Combined);
        let result = run(&config);
        assert!(result.without_recast.iter().all(|r| r.tax_benefit.is_none()));

        let first = &result.with_recast[0];
        let benefit = first.tax_benefit.expect("benefit populated");
        let regime = TaxRegime::for_year(2025).expect("regime");
        let expected = monthly_tax_benefit(
            first.interest * 12.0,
            first.property_tax,
            950_000.0,
            config.loan_principal,
            FilingStatus::Married,
            regime,
        );
        assert!(expected > 0.0);
        assert_approx(benefit.monthly_tax_benefit, expected);
        assert_approx(benefit.effective_payment, first.total_payment - expected);
    }

    #[test]
    fn tax_benefit_with_zero_income_source_is_zero() {
        let mut config = sample_config();
        config.secondary_income.gross_annual = 0.0;
        config.tax_benefit = Some(IncomeSource::Secondary);
        let result = run(&config);
        for row in &result.with_recast {
            let benefit = row.tax_benefit.expect("benefit populated");
            assert_eq!(benefit.monthly_tax_benefit, 0.0);
            assert_approx(benefit.effective_payment, row.total_payment);
        }
    }

    #[test]
    fn invalid_configs_are_rejected_with_field_names() {
        let mut config = sample_config();
        config.loan_principal = -1.0;
        let err = simulate(&config).expect_err("negative principal");
        assert!(err.to_string().contains("loan_principal"));

        let mut config = sample_config();
        config.term_months = 0;
        assert_eq!(simulate(&config), Err(ConfigError::ZeroTerm));

        let mut config = sample_config();
        config.monthly_rate = f64::NAN;
        assert!(simulate(&config).expect_err("nan rate").to_string().contains("monthly_rate"));

        let mut config = sample_config();
        config.recast_interval_months = 0;
        assert_eq!(simulate(&config), Err(ConfigError::InvalidRecastInterval));

        let mut config = sample_config();
        config.recast = RecastStrategy::FixedLump { amount: -5.0 };
        assert!(simulate(&config).expect_err("negative lump").to_string().contains("lump_amount"));

        let mut config = sample_config();
        config.tax_year = 1990;
        assert_eq!(simulate(&config), Err(ConfigError::UnsupportedTaxYear(1990)));
    }

    #[test]
    fn zero_principal_is_paid_off_from_the_start() {
        let mut config = sample_config();
        config.loan_principal = 0.0;
        let result = run(&config);
        for row in result.with_recast.iter().chain(result.without_recast.iter()) {
            assert!(row.is_paid_off);
            assert_eq!(row.principal_and_interest, 0.0);
            assert_eq!(row.recast_amount, 0.0);
        }
        // Recast savings stop accruing once there is nothing left to pay down.
        assert_approx(result.with_recast[359].savings_balance, 200_000.0);
        assert_approx(
            result.without_recast[359].savings_balance,
            200_000.0 + 360.0 * 8_000.0,
        );
    }

    #[test]
    fn trimmed_cuts_both_trajectories() {
        let result = run(&sample_config());
        let trimmed = result.trimmed(96).expect("within term");
        assert_eq!(trimmed.with_recast.len(), 96);
        assert_eq!(trimmed.without_recast.len(), 96);
        assert_eq!(trimmed.with_recast[95], result.with_recast[95]);

        assert!(result.trimmed(0).is_err());
        assert_eq!(
            result.trimmed(361),
            Err(ConfigError::HorizonOutOfRange {
                horizon: 361,
                term_months: 360
            })
        );
    }

    #[test]
    fn reruns_are_bit_identical() {
        let mut config = fixed_lump_config();
        config.tax_appreciation_pct = 2.0;
        config.tax_benefit = Some(IncomeSource::Primary);
        assert_eq!(run(&config), run(&config));
    }

    fn assert_balance_moves_by_applied_amounts(rows: &[SimulationRow], opening: f64) {
        let mut prev_balance = opening;
        for row in rows {
            let principal = row.principal_and_interest - row.interest;
            assert_approx(prev_balance - row.balance, principal + row.recast_amount);
            prev_balance = row.balance;
        }
    }

    fn linear_loan_with_recast(initial_cash: f64, recast: RecastStrategy) -> ScenarioConfig {
        let mut config = sample_config();
        config.loan_principal = 360_000.0;
        config.monthly_rate = 0.0;
        config.recast_interval_months = 3;
        config.initial_cash = initial_cash;
        config.recast = recast;
        config
    }

    #[test]
    fn sub_cent_recast_remainder_waits_for_next_payment_when_cash_is_short() {
        let config = linear_loan_with_recast(
            357_000.0 - 0.003,
            RecastStrategy::SavingsBased {
                monthly_surplus: 0.0,
                cash_buffer: 0.0,
            },
        );
        let rows = run(&config).with_recast;

        let recast_month = &rows[2];
        assert_approx(recast_month.recast_amount, 356_999.997);
        assert!(recast_month.balance > 0.0 && recast_month.balance <= 0.005);
        assert!(!recast_month.is_paid_off);
        assert_approx(recast_month.savings_balance, 0.0);

        let next = &rows[3];
        assert_eq!(next.balance, 0.0);
        assert!(next.is_paid_off);
        assert_eq!(next.principal_and_interest, recast_month.balance);

        assert_balance_moves_by_applied_amounts(&rows, config.loan_principal);
    }

    #[test]
    fn sub_cent_recast_remainder_is_cleared_when_cash_covers_it() {
        let config = linear_loan_with_recast(
            400_000.0,
            RecastStrategy::FixedLump {
                amount: 357_000.0 - 0.003,
            },
        );
        let rows = run(&config).with_recast;

        let recast_month = &rows[2];
        assert_eq!(recast_month.recast_amount, 357_000.0);
        assert_eq!(recast_month.balance, 0.0);
        assert!(recast_month.is_paid_off);
        assert_approx(recast_month.savings_balance, 43_000.0);
        assert_approx(recast_month.cumulative_recast, 357_000.0);

        assert_balance_moves_by_applied_amounts(&rows, config.loan_principal);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_trajectories_respect_balance_and_cumulative_invariants(
            principal in 0u32..3_000_000,
            term_years in 5u32..41,
            rate_bp in 0u32..1500,
            tax in 0u32..5_000,
            appreciation_tenths in 0u32..100,
            insurance in 0u32..2_000,
            interval in 1u32..61,
            initial_cash in 0u32..2_000_000,
            surplus in 0u32..50_000,
            buffer in 0u32..1_000_000,
            lump in 0u32..1_000_000,
            savings_based in proptest::bool::ANY,
            with_benefit in proptest::bool::ANY
        ) {
            let mut config = sample_config();
            config.loan_principal = principal as f64;
            config.term_months = term_years * 12;
            config.monthly_rate = rate_bp as f64 / 10_000.0 / 12.0;
            config.monthly_property_tax_base = tax as f64;
            config.tax_appreciation_pct = appreciation_tenths as f64 / 10.0;
            config.monthly_insurance = insurance as f64;
            config.recast_interval_months = interval;
            config.initial_cash = initial_cash as f64;
            config.recast = if savings_based {
                RecastStrategy::SavingsBased {
                    monthly_surplus: surplus as f64,
                    cash_buffer: buffer as f64,
                }
            } else {
                RecastStrategy::FixedLump { amount: lump as f64 }
            };
            config.tax_benefit = with_benefit.then_some(IncomeSource::Combined);

            let result = run(&config);
            prop_assert_eq!(result.with_recast.len(), config.term_months as usize);
            prop_assert_eq!(result.without_recast.len(), config.term_months as usize);

            for rows in [&result.with_recast, &result.without_recast] {
                let mut prev_balance = config.loan_principal;
                let mut prev_cumulative = 0.0;
                let mut total_payments = 0.0;
                let mut total_recast = 0.0;
                let mut paid_off = false;
                for row in rows.iter() {
                    prop_assert!(row.balance >= 0.0);
                    prop_assert!(row.balance <= prev_balance + EPS);
                    let principal = row.principal_and_interest - row.interest;
                    prop_assert!(
                        (prev_balance - row.balance - principal - row.recast_amount).abs() <= EPS
                    );
                    total_payments += row.total_payment;
                    total_recast += row.recast_amount;
                    prop_assert!((row.cumulative_paid - (total_payments + total_recast)).abs() <= EPS);
                    if paid_off {
                        prop_assert_eq!(row.balance, 0.0);
                        prop_assert_eq!(row.principal_and_interest, 0.0);
                    }
                    paid_off |= row.is_paid_off;
                    prop_assert_eq!(row.is_paid_off, row.balance <= 0.0);
                    prop_assert!(row.recast_amount <= prev_balance + EPS);
                    prop_assert!(row.cumulative_paid + EPS >= prev_cumulative);
                    prop_assert!(row.total_payment + EPS >= row.property_tax + config.monthly_insurance);
                    prop_assert!(row.savings_balance >= -EPS);
                    prev_balance = row.balance;
                    prev_cumulative = row.cumulative_paid;
                }
            }

            for row in &result.with_recast {
                if row.recast_amount > 0.0 {
                    prop_assert_eq!(row.month % interval, 0);
                    prop_assert!(row.savings_balance + EPS >= config.recast.cash_buffer());
                }
            }

            let mut prev_savings = config.initial_cash;
            for row in &result.without_recast {
                prop_assert!(row.savings_balance + EPS >= prev_savings);
                prev_savings = row.savings_balance;
            }
        }
    }
}
