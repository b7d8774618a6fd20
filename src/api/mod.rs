use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::core::{
    FilingStatus, IncomeSource, IncomeStream, PaymentRatioRow, RecastEvent, RecastStrategy,
    ScenarioConfig, ScenarioSummary, SimulationRow, TaxBreakdown, TaxRegime, cumulative_savings,
    payment_ratios, recast_events, simulate, summarize, tax_breakdown,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliRecastMethod {
    SavingsBased,
    FixedLump,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliFilingStatus {
    Married,
    Single,
}

impl From<CliFilingStatus> for FilingStatus {
    fn from(value: CliFilingStatus) -> Self {
        match value {
            CliFilingStatus::Married => FilingStatus::Married,
            CliFilingStatus::Single => FilingStatus::Single,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliPropertyTaxInput {
    AnnualPercent,
    MonthlyAmount,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliIncomeSource {
    Primary,
    Secondary,
    Combined,
}

impl From<CliIncomeSource> for IncomeSource {
    fn from(value: CliIncomeSource) -> Self {
        match value {
            CliIncomeSource::Primary => IncomeSource::Primary,
            CliIncomeSource::Secondary => IncomeSource::Secondary,
            CliIncomeSource::Combined => IncomeSource::Combined,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiRecastMethod {
    #[serde(alias = "savingsBased", alias = "savings_based", alias = "savings")]
    SavingsBased,
    #[serde(alias = "fixedLump", alias = "fixed_lump", alias = "lump")]
    FixedLump,
}

impl From<ApiRecastMethod> for CliRecastMethod {
    fn from(value: ApiRecastMethod) -> Self {
        match value {
            ApiRecastMethod::SavingsBased => CliRecastMethod::SavingsBased,
            ApiRecastMethod::FixedLump => CliRecastMethod::FixedLump,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiFilingStatus {
    #[serde(alias = "mfj", alias = "married-filing-jointly")]
    Married,
    Single,
}

impl From<ApiFilingStatus> for CliFilingStatus {
    fn from(value: ApiFilingStatus) -> Self {
        match value {
            ApiFilingStatus::Married => CliFilingStatus::Married,
            ApiFilingStatus::Single => CliFilingStatus::Single,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiPropertyTaxInput {
    #[serde(alias = "annualPercent", alias = "annual_percent", alias = "percent")]
    AnnualPercent,
    #[serde(alias = "monthlyAmount", alias = "monthly_amount", alias = "monthly")]
    MonthlyAmount,
}

impl From<ApiPropertyTaxInput> for CliPropertyTaxInput {
    fn from(value: ApiPropertyTaxInput) -> Self {
        match value {
            ApiPropertyTaxInput::AnnualPercent => CliPropertyTaxInput::AnnualPercent,
            ApiPropertyTaxInput::MonthlyAmount => CliPropertyTaxInput::MonthlyAmount,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiIncomeSource {
    Primary,
    Secondary,
    #[serde(alias = "both", alias = "household")]
    Combined,
}

impl From<ApiIncomeSource> for CliIncomeSource {
    fn from(value: ApiIncomeSource) -> Self {
        match value {
            ApiIncomeSource::Primary => CliIncomeSource::Primary,
            ApiIncomeSource::Secondary => CliIncomeSource::Secondary,
            ApiIncomeSource::Combined => CliIncomeSource::Combined,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    purchase_price: Option<f64>,
    down_payment: Option<f64>,
    interest_rate: Option<f64>,
    term_years: Option<u32>,

    property_tax_input: Option<ApiPropertyTaxInput>,
    property_tax_monthly: Option<f64>,
    property_tax_pct: Option<f64>,
    tax_appreciation: Option<f64>,
    insurance: Option<f64>,

    recast_method: Option<ApiRecastMethod>,
    recast_interval: Option<u32>,
    initial_cash: Option<f64>,
    monthly_savings: Option<f64>,
    cash_buffer: Option<f64>,
    lump_amount: Option<f64>,

    filing_status: Option<ApiFilingStatus>,
    primary_income: Option<f64>,
    primary_tax_rate: Option<f64>,
    secondary_income: Option<f64>,
    secondary_tax_rate: Option<f64>,
    tax_year: Option<u16>,
    tax_benefit_income: Option<ApiIncomeSource>,

    horizon_months: Option<u32>,
}

#[derive(Parser, Debug)]
#[command(
    name = "recast",
    about = "Mortgage amortization simulator comparing periodic recasts against a no-recast baseline"
)]
struct Cli {
    #[arg(long, default_value_t = 1_800_000.0, help = "Purchase price")]
    purchase_price: f64,
    #[arg(long, default_value_t = 540_000.0, help = "Down payment")]
    down_payment: f64,
    #[arg(long, default_value_t = 6.6, help = "Annual interest rate in percent")]
    interest_rate: f64,
    #[arg(long, default_value_t = 30)]
    term_years: u32,
    #[arg(
        long,
        value_enum,
        default_value_t = CliPropertyTaxInput::AnnualPercent,
        help = "Property tax given as an annual percent of price or a monthly amount"
    )]
    property_tax_input: CliPropertyTaxInput,
    #[arg(
        long,
        default_value_t = 1_500.0,
        help = "Monthly property tax, used when --property-tax-input=monthly-amount"
    )]
    property_tax_monthly: f64,
    #[arg(
        long,
        default_value_t = 1.17,
        help = "Annual property tax in percent of purchase price, used when --property-tax-input=annual-percent"
    )]
    property_tax_pct: f64,
    #[arg(
        long,
        default_value_t = 2.0,
        help = "Annual property tax appreciation in percent"
    )]
    tax_appreciation: f64,
    #[arg(long, default_value_t = 300.0, help = "Monthly insurance")]
    insurance: f64,
    #[arg(long, value_enum, default_value_t = CliRecastMethod::SavingsBased)]
    recast_method: CliRecastMethod,
    #[arg(long, default_value_t = 12, help = "Months between recasts")]
    recast_interval: u32,
    #[arg(long, default_value_t = 200_000.0, help = "Cash on hand at closing")]
    initial_cash: f64,
    #[arg(
        long,
        default_value_t = 8_000.0,
        help = "Monthly savings added to cash, savings-based method only"
    )]
    monthly_savings: f64,
    #[arg(
        long,
        default_value_t = 150_000.0,
        help = "Cash kept back when recasting, savings-based method only"
    )]
    cash_buffer: f64,
    #[arg(
        long,
        default_value_t = 90_000.0,
        help = "Recast amount, fixed-lump method only"
    )]
    lump_amount: f64,
    #[arg(long, value_enum, default_value_t = CliFilingStatus::Married)]
    filing_status: CliFilingStatus,
    #[arg(long, default_value_t = 690_000.0, help = "Primary gross annual income")]
    primary_income: f64,
    #[arg(
        long,
        help = "Primary tax rate in percent; derived from tax brackets when omitted"
    )]
    primary_tax_rate: Option<f64>,
    #[arg(long, default_value_t = 260_000.0, help = "Secondary gross annual income")]
    secondary_income: f64,
    #[arg(
        long,
        help = "Secondary tax rate in percent; derived from tax brackets when omitted"
    )]
    secondary_tax_rate: Option<f64>,
    #[arg(long, default_value_t = 2025, help = "Tax year whose brackets apply")]
    tax_year: u16,
    #[arg(
        long,
        value_enum,
        help = "Model the itemized-deduction benefit against this income"
    )]
    tax_benefit_income: Option<CliIncomeSource>,
    #[arg(long, default_value_t = 96, help = "Months of output to report")]
    horizon_months: u32,
}

#[derive(Debug)]
struct ApiRequest {
    config: ScenarioConfig,
    horizon_months: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    tax_year: u16,
    filing_status: FilingStatus,
    loan_principal: f64,
    monthly_property_tax: f64,
    horizon_months: u32,
    primary_tax_rate_pct: f64,
    secondary_tax_rate_pct: f64,
    summary: ScenarioSummary,
    recast_events: Vec<RecastEvent>,
    with_recast: Vec<SimulationRow>,
    without_recast: Vec<SimulationRow>,
    cumulative_savings: Vec<f64>,
    payment_ratios: Vec<PaymentRatioRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TaxRatesQuery {
    income: Option<f64>,
    filing_status: Option<ApiFilingStatus>,
    tax_year: Option<u16>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn check_range(name: &str, value: f64, min: f64, max: f64) -> Result<(), String> {
    if !value.is_finite() || value < min || value > max {
        return Err(format!("{name} must be between {min} and {max}"));
    }
    Ok(())
}

fn build_config(cli: &Cli) -> Result<ScenarioConfig, String> {
    check_range("--purchase-price", cli.purchase_price, 100_000.0, 10_000_000.0)?;
    check_range("--down-payment", cli.down_payment, 0.0, cli.purchase_price)?;
    check_range("--interest-rate", cli.interest_rate, 0.1, 15.0)?;

    if !(5..=40).contains(&cli.term_years) {
        return Err("--term-years must be between 5 and 40".to_string());
    }

    if !(3..=60).contains(&cli.recast_interval) {
        return Err("--recast-interval must be between 3 and 60".to_string());
    }

    for (name, value, max) in [
        ("--property-tax-monthly", cli.property_tax_monthly, 10_000.0),
        ("--property-tax-pct", cli.property_tax_pct, 5.0),
        ("--tax-appreciation", cli.tax_appreciation, 10.0),
        ("--insurance", cli.insurance, 5_000.0),
        ("--initial-cash", cli.initial_cash, 2_000_000.0),
        ("--monthly-savings", cli.monthly_savings, 50_000.0),
        ("--cash-buffer", cli.cash_buffer, 1_000_000.0),
        ("--lump-amount", cli.lump_amount, 1_000_000.0),
        ("--primary-income", cli.primary_income, 10_000_000.0),
        ("--secondary-income", cli.secondary_income, 10_000_000.0),
    ] {
        check_range(name, value, 0.0, max)?;
    }

    for (name, rate) in [
        ("--primary-tax-rate", cli.primary_tax_rate),
        ("--secondary-tax-rate", cli.secondary_tax_rate),
    ] {
        if let Some(rate) = rate {
            check_range(name, rate, 0.0, 60.0)?;
        }
    }

    if TaxRegime::for_year(cli.tax_year).is_none() {
        return Err(format!("--tax-year {} is not supported", cli.tax_year));
    }

    let monthly_property_tax = match cli.property_tax_input {
        CliPropertyTaxInput::MonthlyAmount => cli.property_tax_monthly,
        // Whole dollars, as a county bill would quote it.
        CliPropertyTaxInput::AnnualPercent => {
            (cli.purchase_price * cli.property_tax_pct / 100.0 / 12.0).floor()
        }
    };

    let recast = match cli.recast_method {
        CliRecastMethod::SavingsBased => RecastStrategy::SavingsBased {
            monthly_surplus: cli.monthly_savings,
            cash_buffer: cli.cash_buffer,
        },
        CliRecastMethod::FixedLump => RecastStrategy::FixedLump {
            amount: cli.lump_amount,
        },
    };

    let config = ScenarioConfig {
        loan_principal: cli.purchase_price - cli.down_payment,
        term_months: cli.term_years * 12,
        monthly_rate: cli.interest_rate / 100.0 / 12.0,
        monthly_property_tax_base: monthly_property_tax,
        tax_appreciation_pct: cli.tax_appreciation,
        monthly_insurance: cli.insurance,
        initial_cash: cli.initial_cash,
        recast,
        recast_interval_months: cli.recast_interval,
        filing_status: cli.filing_status.into(),
        primary_income: IncomeStream {
            gross_annual: cli.primary_income,
            manual_tax_rate_pct: cli.primary_tax_rate,
        },
        secondary_income: IncomeStream {
            gross_annual: cli.secondary_income,
            manual_tax_rate_pct: cli.secondary_tax_rate,
        },
        tax_year: cli.tax_year,
        tax_benefit: cli.tax_benefit_income.map(Into::into),
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn build_request(cli: &Cli) -> Result<ApiRequest, String> {
    let config = build_config(cli)?;
    if cli.horizon_months < 12 || cli.horizon_months > config.term_months {
        return Err(format!(
            "--horizon-months must be between 12 and {}",
            config.term_months
        ));
    }
    Ok(ApiRequest {
        config,
        horizon_months: cli.horizon_months,
    })
}

fn run_simulation(request: &ApiRequest) -> Result<SimulateResponse, String> {
    let config = &request.config;
    let horizon = request.horizon_months;
    let regime = TaxRegime::for_year(config.tax_year)
        .ok_or_else(|| format!("--tax-year {} is not supported", config.tax_year))?;

    let result = simulate(config).map_err(|e| e.to_string())?;
    let summary = summarize(config, &result, horizon).map_err(|e| e.to_string())?;
    let view = result.trimmed(horizon).map_err(|e| e.to_string())?;

    Ok(SimulateResponse {
        tax_year: regime.year,
        filing_status: config.filing_status,
        loan_principal: config.loan_principal,
        monthly_property_tax: config.monthly_property_tax_base,
        horizon_months: horizon,
        primary_tax_rate_pct: config
            .primary_income
            .tax_rate_pct(config.filing_status, regime),
        secondary_tax_rate_pct: config
            .secondary_income
            .tax_rate_pct(config.filing_status, regime),
        summary,
        recast_events: recast_events(config, &view.with_recast),
        cumulative_savings: cumulative_savings(&view),
        payment_ratios: payment_ratios(&view.with_recast, config, regime),
        with_recast: view.with_recast,
        without_recast: view.without_recast,
    })
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Args(#[from] clap::Error),
    #[error("{0}")]
    Invalid(String),
}

pub fn run_cli<I, T>(args: I) -> Result<String, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(args)?;
    let request = build_request(&cli).map_err(CliError::Invalid)?;
    let response = run_simulation(&request).map_err(CliError::Invalid)?;
    serde_json::to_string_pretty(&response)
        .map_err(|e| CliError::Invalid(format!("Failed to render JSON: {e}")))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route("/api/tax-rates", get(tax_rates_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!("Recast HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/api/simulate");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => {
            warn!("Rejected simulate request: {msg}");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };
    debug!(
        "Simulating {:?} over {} months, horizon {}",
        request.config.recast.method(),
        request.config.term_months,
        request.horizon_months
    );

    match run_simulation(&request) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => {
            warn!("Simulation failed: {msg}");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

async fn tax_rates_handler(Query(query): Query<TaxRatesQuery>) -> Response {
    match tax_rates_from_query(query) {
        Ok(breakdown) => json_response(StatusCode::OK, breakdown),
        Err(msg) => {
            warn!("Rejected tax-rates request: {msg}");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

fn tax_rates_from_query(query: TaxRatesQuery) -> Result<TaxBreakdown, String> {
    let income = query.income.unwrap_or(0.0);
    check_range("income", income, 0.0, 10_000_000.0)?;
    let status: FilingStatus = CliFilingStatus::from(
        query.filing_status.unwrap_or(ApiFilingStatus::Married),
    )
    .into();
    let regime = match query.tax_year {
        Some(year) => TaxRegime::for_year(year)
            .ok_or_else(|| format!("taxYear {year} is not supported"))?,
        None => TaxRegime::latest(),
    };
    Ok(tax_breakdown(income, status, regime))
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.purchase_price {
        cli.purchase_price = v;
    }
    if let Some(v) = payload.down_payment {
        cli.down_payment = v;
    }
    if let Some(v) = payload.interest_rate {
        cli.interest_rate = v;
    }
    if let Some(v) = payload.term_years {
        cli.term_years = v;
    }

    if let Some(v) = payload.property_tax_input {
        cli.property_tax_input = v.into();
    }
    if let Some(v) = payload.property_tax_monthly {
        cli.property_tax_monthly = v;
    }
    if let Some(v) = payload.property_tax_pct {
        cli.property_tax_pct = v;
    }
    if let Some(v) = payload.tax_appreciation {
        cli.tax_appreciation = v;
    }
    if let Some(v) = payload.insurance {
        cli.insurance = v;
    }

    if let Some(v) = payload.recast_method {
        cli.recast_method = v.into();
    }
    if let Some(v) = payload.recast_interval {
        cli.recast_interval = v;
    }
    if let Some(v) = payload.initial_cash {
        cli.initial_cash = v;
    }
    if let Some(v) = payload.monthly_savings {
        cli.monthly_savings = v;
    }
    if let Some(v) = payload.cash_buffer {
        cli.cash_buffer = v;
    }
    if let Some(v) = payload.lump_amount {
        cli.lump_amount = v;
    }

    if let Some(v) = payload.filing_status {
        cli.filing_status = v.into();
    }
    if let Some(v) = payload.primary_income {
        cli.primary_income = v;
    }
    if let Some(v) = payload.primary_tax_rate {
        cli.primary_tax_rate = Some(v);
    }
    if let Some(v) = payload.secondary_income {
        cli.secondary_income = v;
    }
    if let Some(v) = payload.secondary_tax_rate {
        cli.secondary_tax_rate = Some(v);
    }
    if let Some(v) = payload.tax_year {
        cli.tax_year = v;
    }
    if let Some(v) = payload.tax_benefit_income {
        cli.tax_benefit_income = Some(v.into());
    }

    if let Some(v) = payload.horizon_months {
        cli.horizon_months = v;
    }

    build_request(&cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        purchase_price: 1_800_000.0,
        down_payment: 540_000.0,
        interest_rate: 6.6,
        term_years: 30,
        property_tax_input: CliPropertyTaxInput::AnnualPercent,
        property_tax_monthly: 1_500.0,
        property_tax_pct: 1.17,
        tax_appreciation: 2.0,
        insurance: 300.0,
        recast_method: CliRecastMethod::SavingsBased,
        recast_interval: 12,
        initial_cash: 200_000.0,
        monthly_savings: 8_000.0,
        cash_buffer: 150_000.0,
        lump_amount: 90_000.0,
        filing_status: CliFilingStatus::Married,
        primary_income: 690_000.0,
        primary_tax_rate: None,
        secondary_income: 260_000.0,
        secondary_tax_rate: None,
        tax_year: 2025,
        tax_benefit_income: None,
        horizon_months: 96,
    }
}
