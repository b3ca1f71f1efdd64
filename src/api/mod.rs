use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    CategoryAmount, Inputs, Projection, TimelinePoint, format_usd, income_spending_comparison,
    monthly_budget_breakdown, project,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    #[serde(alias = "annual_income_gbp")]
    annual_income_gbp: Option<f64>,
    #[serde(alias = "savings_usd")]
    savings_usd: Option<f64>,
    #[serde(alias = "october_spending_usd")]
    october_spending_usd: Option<f64>,
    #[serde(alias = "exchange_rate")]
    exchange_rate: Option<f64>,
    #[serde(alias = "future_monthly_spending_usd", alias = "futureMonthlySpending")]
    future_monthly_spending_usd: Option<f64>,
    #[serde(alias = "additional_monthly_income_usd", alias = "additionalIncome")]
    additional_monthly_income_usd: Option<f64>,
}

#[derive(Parser, Debug)]
#[command(
    name = "budget",
    about = "October shortfall and recovery estimator (GBP income, USD spending)",
    after_help = "Run `budget serve [port]` to start the web UI (default port 8080)."
)]
struct Cli {
    #[arg(long, default_value_t = 28_000.0, help = "Annual income in GBP")]
    annual_income_gbp: f64,
    #[arg(long, default_value_t = 10_000.0, help = "Current savings in USD")]
    savings_usd: f64,
    #[arg(long, default_value_t = 45_000.0, help = "Planned October spending in USD")]
    october_spending_usd: f64,
    #[arg(long, default_value_t = 1.34, help = "GBP to USD exchange rate")]
    exchange_rate: f64,
    #[arg(
        long,
        default_value_t = 3_000.0,
        help = "Planned monthly spending from November onward in USD"
    )]
    future_monthly_spending_usd: f64,
    #[arg(long, default_value_t = 0.0, help = "Additional monthly income in USD")]
    additional_monthly_income_usd: f64,
    #[arg(long, help = "Print the full projection as JSON instead of a text report")]
    json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    monthly_income_usd: f64,
    total_available_usd: f64,
    october_shortfall_usd: f64,
    remaining_after_october_usd: f64,
    total_monthly_income_usd: f64,
    monthly_surplus_usd: f64,
    months_to_recover: Option<u32>,
    max_sustainable_monthly_spending_usd: f64,
    timeline: Vec<TimelinePoint>,
    income_spending_comparison: Vec<CategoryAmount>,
    monthly_budget_breakdown: Vec<CategoryAmount>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(cli: &Cli) -> Result<Inputs, String> {
    for (name, value) in [
        ("--annual-income-gbp", cli.annual_income_gbp),
        ("--savings-usd", cli.savings_usd),
        ("--october-spending-usd", cli.october_spending_usd),
        ("--exchange-rate", cli.exchange_rate),
        (
            "--future-monthly-spending-usd",
            cli.future_monthly_spending_usd,
        ),
        (
            "--additional-monthly-income-usd",
            cli.additional_monthly_income_usd,
        ),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }

    Ok(Inputs {
        annual_income_gbp: cli.annual_income_gbp,
        savings_usd: cli.savings_usd,
        october_spending_usd: cli.october_spending_usd,
        exchange_rate: cli.exchange_rate,
        future_monthly_spending_usd: cli.future_monthly_spending_usd,
        additional_monthly_income_usd: cli.additional_monthly_income_usd,
    })
}

pub fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();
    let inputs = build_inputs(&cli)?;
    let projection = project(&inputs);

    if cli.json {
        let response = build_project_response(&inputs, projection);
        let json = serde_json::to_string_pretty(&response)
            .map_err(|e| format!("Failed to serialize projection: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    print_report(&inputs, &projection);
    Ok(())
}

fn print_report(inputs: &Inputs, projection: &Projection) {
    println!(
        "Monthly Income (USD): {} (+ {} additional)",
        format_usd(projection.monthly_income_usd),
        format_usd(inputs.additional_monthly_income_usd)
    );

    if projection.october_shortfall_usd > 0.0 {
        println!(
            "October Shortfall: {} - you need to find this amount from other sources.",
            format_usd(projection.october_shortfall_usd)
        );
    } else {
        println!(
            "Remaining After October: {} - you have this much left after October expenses.",
            format_usd(projection.remaining_after_october_usd)
        );
    }

    if projection.monthly_surplus_usd > 0.0 {
        println!(
            "Monthly Surplus: {}",
            format_usd(projection.monthly_surplus_usd)
        );
    } else {
        println!(
            "Monthly Deficit: {}",
            format_usd(projection.monthly_surplus_usd)
        );
    }

    match projection.months_to_recover {
        Some(months) => {
            println!("Time to recover from October shortfall: {months} months");
        }
        None => {
            println!(
                "Unable to recover the shortfall with current income/spending. Increase income or reduce spending."
            );
        }
    }

    println!(
        "Maximum sustainable monthly spending: {}",
        format_usd(projection.max_sustainable_monthly_spending_usd)
    );
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("Budget HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

fn project_handler_impl(payload: ProjectPayload) -> Response {
    let inputs = match inputs_from_payload(payload) {
        Ok(inputs) => inputs,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let projection = project(&inputs);
    json_response(StatusCode::OK, build_project_response(&inputs, projection))
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
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
fn inputs_from_json(json: &str) -> Result<Inputs, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    inputs_from_payload(payload)
}

fn inputs_from_payload(payload: ProjectPayload) -> Result<Inputs, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.annual_income_gbp {
        cli.annual_income_gbp = v;
    }
    if let Some(v) = payload.savings_usd {
        cli.savings_usd = v;
    }
    if let Some(v) = payload.october_spending_usd {
        cli.october_spending_usd = v;
    }
    if let Some(v) = payload.exchange_rate {
        cli.exchange_rate = v;
    }
    if let Some(v) = payload.future_monthly_spending_usd {
        cli.future_monthly_spending_usd = v;
    }
    if let Some(v) = payload.additional_monthly_income_usd {
        cli.additional_monthly_income_usd = v;
    }

    build_inputs(&cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        annual_income_gbp: 28_000.0,
        savings_usd: 10_000.0,
        october_spending_usd: 45_000.0,
        exchange_rate: 1.34,
        future_monthly_spending_usd: 3_000.0,
        additional_monthly_income_usd: 0.0,
        json: false,
    }
}

fn build_project_response(inputs: &Inputs, projection: Projection) -> ProjectResponse {
    let comparison = income_spending_comparison(inputs, &projection);
    let breakdown = monthly_budget_breakdown(inputs, &projection);

    ProjectResponse {
        monthly_income_usd: projection.monthly_income_usd,
        total_available_usd: projection.total_available_usd,
        october_shortfall_usd: projection.october_shortfall_usd,
        remaining_after_october_usd: projection.remaining_after_october_usd,
        total_monthly_income_usd: projection.total_monthly_income_usd,
        monthly_surplus_usd: projection.monthly_surplus_usd,
        months_to_recover: projection.months_to_recover,
        max_sustainable_monthly_spending_usd: projection.max_sustainable_monthly_spending_usd,
        timeline: projection.timeline,
        income_spending_comparison: comparison,
        monthly_budget_breakdown: breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_cli() -> Cli {
        default_cli_for_api()
    }

    #[test]
    fn build_inputs_accepts_defaults() {
        let inputs = build_inputs(&sample_cli()).expect("valid inputs");
        assert_approx(inputs.annual_income_gbp, 28_000.0);
        assert_approx(inputs.savings_usd, 10_000.0);
        assert_approx(inputs.october_spending_usd, 45_000.0);
        assert_approx(inputs.exchange_rate, 1.34);
        assert_approx(inputs.future_monthly_spending_usd, 3_000.0);
        assert_approx(inputs.additional_monthly_income_usd, 0.0);
    }

    #[test]
    fn build_inputs_rejects_negative_savings() {
        let mut cli = sample_cli();
        cli.savings_usd = -1.0;

        let err = build_inputs(&cli).expect_err("must reject negative savings");
        assert!(err.contains("--savings-usd"));
    }

    #[test]
    fn build_inputs_rejects_negative_exchange_rate() {
        let mut cli = sample_cli();
        cli.exchange_rate = -0.5;

        let err = build_inputs(&cli).expect_err("must reject negative rate");
        assert!(err.contains("--exchange-rate"));
    }

    #[test]
    fn build_inputs_rejects_non_finite_values() {
        let mut cli = sample_cli();
        cli.october_spending_usd = f64::NAN;

        let err = build_inputs(&cli).expect_err("must reject NaN");
        assert!(err.contains("--october-spending-usd"));

        let mut cli = sample_cli();
        cli.annual_income_gbp = f64::INFINITY;

        let err = build_inputs(&cli).expect_err("must reject infinity");
        assert!(err.contains("--annual-income-gbp"));
    }

    #[test]
    fn inputs_from_json_parses_web_keys() {
        let json = r#"{
          "annualIncomeGbp": 30000,
          "savingsUsd": 12000,
          "octoberSpendingUsd": 40000,
          "exchangeRate": 1.25,
          "futureMonthlySpendingUsd": 2500,
          "additionalMonthlyIncomeUsd": 400
        }"#;
        let inputs = inputs_from_json(json).expect("json should parse");

        assert_approx(inputs.annual_income_gbp, 30_000.0);
        assert_approx(inputs.savings_usd, 12_000.0);
        assert_approx(inputs.october_spending_usd, 40_000.0);
        assert_approx(inputs.exchange_rate, 1.25);
        assert_approx(inputs.future_monthly_spending_usd, 2_500.0);
        assert_approx(inputs.additional_monthly_income_usd, 400.0);
    }

    #[test]
    fn inputs_from_json_accepts_snake_case_aliases() {
        let json = r#"{
          "annual_income_gbp": 26000,
          "future_monthly_spending_usd": 2750
        }"#;
        let inputs = inputs_from_json(json).expect("json should parse");

        assert_approx(inputs.annual_income_gbp, 26_000.0);
        assert_approx(inputs.future_monthly_spending_usd, 2_750.0);
        assert_approx(inputs.savings_usd, 10_000.0);
    }

    #[test]
    fn inputs_from_json_applies_defaults_for_missing_fields() {
        let inputs = inputs_from_json("{}").expect("empty payload is valid");

        assert_approx(inputs.annual_income_gbp, 28_000.0);
        assert_approx(inputs.exchange_rate, 1.34);
        assert_approx(inputs.october_spending_usd, 45_000.0);
    }

    #[test]
    fn inputs_from_json_rejects_negative_override() {
        let err =
            inputs_from_json(r#"{"savingsUsd": -100}"#).expect_err("must reject negative");
        assert!(err.contains("--savings-usd"));
    }

    #[test]
    fn project_response_serialization_contains_expected_fields() {
        let inputs = build_inputs(&sample_cli()).expect("valid inputs");
        let response = build_project_response(&inputs, project(&inputs));

        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"monthlyIncomeUsd\""));
        assert!(json.contains("\"totalAvailableUsd\""));
        assert!(json.contains("\"octoberShortfallUsd\""));
        assert!(json.contains("\"remainingAfterOctoberUsd\""));
        assert!(json.contains("\"monthlySurplusUsd\""));
        assert!(json.contains("\"monthsToRecover\":252"));
        assert!(json.contains("\"maxSustainableMonthlySpendingUsd\""));
        assert!(json.contains("\"timeline\""));
        assert!(json.contains("\"cumulativeBalanceUsd\""));
        assert!(json.contains("\"month\":\"Oct\""));
        assert!(json.contains("\"incomeSpendingComparison\""));
        assert!(json.contains("\"monthlyBudgetBreakdown\""));
        assert!(json.contains("\"amountUsd\""));
    }

    #[test]
    fn unrecoverable_projection_serializes_null_months() {
        let mut cli = sample_cli();
        cli.future_monthly_spending_usd = 10_000.0;

        let inputs = build_inputs(&cli).expect("valid inputs");
        let response = build_project_response(&inputs, project(&inputs));

        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"monthsToRecover\":null"));
    }

    #[test]
    fn response_breakdown_omits_zero_additional_income() {
        let inputs = build_inputs(&sample_cli()).expect("valid inputs");
        let response = build_project_response(&inputs, project(&inputs));

        assert_eq!(response.monthly_budget_breakdown.len(), 2);
        assert!(
            response
                .monthly_budget_breakdown
                .iter()
                .all(|entry| entry.label != "Additional Income")
        );
        assert_eq!(response.income_spending_comparison.len(), 3);
    }
}
