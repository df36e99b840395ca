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

use crate::core::{ProjectionInput, ProjectionResult, ResultRow, project};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    principal: Option<f64>,
    #[serde(alias = "monthly")]
    monthly_contribution: Option<f64>,
    #[serde(alias = "months")]
    horizon_months: Option<u32>,
    inflation: Option<f64>,
    cdi: Option<f64>,
    #[serde(alias = "cdb_nom", alias = "cdbNom")]
    cdb_nominal: Option<f64>,
    #[serde(alias = "cdb_pct_cdi", alias = "cdbPctCdi")]
    cdb_pct_of_cdi: Option<f64>,
    lci: Option<f64>,
    selic: Option<f64>,
    poupanca: Option<f64>,
    #[serde(alias = "ipca_real")]
    ipca_real: Option<f64>,
    ipca: Option<f64>,
}

#[derive(Parser, Debug)]
#[command(
    name = "renda-fixa",
    about = "Fixed-income comparison simulator (CDB, LCI/LCA, Tesouro Selic, Poupança, Tesouro IPCA+)"
)]
struct Cli {
    #[arg(long, default_value_t = 10_000.0, help = "Initial deposit")]
    principal: f64,
    #[arg(
        long,
        default_value_t = 200.0,
        help = "Contribution added at the end of each month"
    )]
    monthly: f64,
    #[arg(long, default_value_t = 36, help = "Projection horizon in months")]
    months: u32,
    #[arg(
        long,
        default_value_t = 4.0,
        help = "Expected annual inflation in percent"
    )]
    inflation: f64,
    #[arg(long, default_value_t = 13.15, help = "Annual CDI rate in percent")]
    cdi: f64,
    #[arg(
        long,
        default_value_t = 14.0,
        help = "Nominal annual CDB rate in percent"
    )]
    cdb_nom: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "CDB rate as percent of CDI; overrides the nominal rate when > 0"
    )]
    cdb_pct_cdi: f64,
    #[arg(long, default_value_t = 9.0, help = "Annual LCI/LCA rate in percent")]
    lci: f64,
    #[arg(long, default_value_t = 13.75, help = "Annual Selic rate in percent")]
    selic: f64,
    #[arg(
        long,
        default_value_t = 6.17,
        help = "Annual poupança yield in percent"
    )]
    poupanca: f64,
    #[arg(
        long,
        default_value_t = 3.0,
        help = "Tesouro IPCA+ real yield in percent"
    )]
    ipca_real: f64,
    #[arg(long, default_value_t = 4.0, help = "Expected annual IPCA in percent")]
    ipca: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    rows: Vec<ResultRow>,
    max_net_return: f64,
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

// The boundary coerces instead of rejecting: non-finite numbers become 0
// and the horizon is clamped to at least one month. The engine assumes
// well-formed input and is never handed anything else.
fn build_inputs(cli: Cli) -> ProjectionInput {
    ProjectionInput {
        principal: sanitize(cli.principal),
        monthly_contribution: sanitize(cli.monthly),
        horizon_months: cli.months.max(1),
        annual_inflation_pct: sanitize(cli.inflation),
        cdi_pct: sanitize(cli.cdi),
        cdb_nominal_pct: sanitize(cli.cdb_nom),
        cdb_pct_of_cdi: sanitize(cli.cdb_pct_cdi),
        lci_pct: sanitize(cli.lci),
        selic_pct: sanitize(cli.selic),
        poupanca_pct: sanitize(cli.poupanca),
        ipca_real_pct: sanitize(cli.ipca_real),
        ipca_pct: sanitize(cli.ipca),
    }
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("Renda fixa HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/");

    axum::serve(listener, app).await
}

pub fn run_cli() {
    let cli = Cli::parse();
    let input = build_inputs(cli);
    let result = project(&input);
    print_comparison_table(&input, &result);
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

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let input = inputs_from_payload(payload);
    let result = project(&input);
    json_response(
        StatusCode::OK,
        SimulateResponse {
            rows: result.rows,
            max_net_return: result.max_net_return,
        },
    )
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

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
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
fn inputs_from_json(json: &str) -> Result<ProjectionInput, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    Ok(inputs_from_payload(payload))
}

fn inputs_from_payload(payload: SimulatePayload) -> ProjectionInput {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.principal {
        cli.principal = v;
    }
    if let Some(v) = payload.monthly_contribution {
        cli.monthly = v;
    }
    if let Some(v) = payload.horizon_months {
        cli.months = v;
    }
    if let Some(v) = payload.inflation {
        cli.inflation = v;
    }
    if let Some(v) = payload.cdi {
        cli.cdi = v;
    }
    if let Some(v) = payload.cdb_nominal {
        cli.cdb_nom = v;
    }
    if let Some(v) = payload.cdb_pct_of_cdi {
        cli.cdb_pct_cdi = v;
    }
    if let Some(v) = payload.lci {
        cli.lci = v;
    }
    if let Some(v) = payload.selic {
        cli.selic = v;
    }
    if let Some(v) = payload.poupanca {
        cli.poupanca = v;
    }
    if let Some(v) = payload.ipca_real {
        cli.ipca_real = v;
    }
    if let Some(v) = payload.ipca {
        cli.ipca = v;
    }

    build_inputs(cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        principal: 10_000.0,
        monthly: 200.0,
        months: 36,
        inflation: 4.0,
        cdi: 13.15,
        cdb_nom: 14.0,
        cdb_pct_cdi: 0.0,
        lci: 9.0,
        selic: 13.75,
        poupanca: 6.17,
        ipca_real: 3.0,
        ipca: 4.0,
    }
}

fn print_comparison_table(input: &ProjectionInput, result: &ProjectionResult) {
    println!(
        "Projeção: {} inicial + {} por mês durante {} meses",
        format_brl(input.principal),
        format_brl(input.monthly_contribution),
        input.horizon_months
    );
    println!();
    println!(
        "{:<32} {:>10} {:>16} {:>16} {:>14} {:>10} {:>7} {:>12} {:>16} {:>16}",
        "Investimento",
        "Taxa a.a.",
        "Valor futuro",
        "Aportado",
        "Rend. bruto",
        "IOF",
        "IR %",
        "IR",
        "Rend. líquido",
        "Ajust. inflação",
    );
    for row in &result.rows {
        let name = match &row.note {
            Some(note) => format!("{} ({note})", row.label),
            None => row.label.to_string(),
        };
        println!(
            "{:<32} {:>10.2} {:>16} {:>16} {:>14} {:>10} {:>7.2} {:>12} {:>16} {:>16}",
            name,
            row.annual_rate_pct,
            format_brl(row.future_value),
            format_brl(row.total_contributed),
            format_brl(row.gross_return),
            format_brl(row.iof_amount),
            row.ir_pct,
            format_brl(row.ir_amount),
            format_brl(row.net_return),
            format_brl(row.real_net_return),
        );
    }
    println!();
    println!(
        "Melhor rendimento líquido: {}",
        format_brl(result.max_net_return)
    );
}

// pt-BR currency rendering: dot-grouped thousands, comma decimals.
fn format_brl(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u128;
    let reais = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(reais.len() + reais.len() / 3);
    for (i, ch) in reais.chars().enumerate() {
        if i > 0 && (reais.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}R$ {grouped},{frac:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::InstrumentKind;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn default_cli_matches_simulator_defaults() {
        let inputs = build_inputs(default_cli_for_api());

        assert_approx(inputs.principal, 10_000.0);
        assert_approx(inputs.monthly_contribution, 200.0);
        assert_eq!(inputs.horizon_months, 36);
        assert_approx(inputs.annual_inflation_pct, 4.0);
        assert_approx(inputs.cdi_pct, 13.15);
        assert_approx(inputs.cdb_nominal_pct, 14.0);
        assert_approx(inputs.cdb_pct_of_cdi, 0.0);
        assert_approx(inputs.lci_pct, 9.0);
        assert_approx(inputs.selic_pct, 13.75);
        assert_approx(inputs.poupanca_pct, 6.17);
        assert_approx(inputs.ipca_real_pct, 3.0);
        assert_approx(inputs.ipca_pct, 4.0);
    }

    #[test]
    fn build_inputs_coerces_non_finite_numbers_to_zero() {
        let mut cli = default_cli_for_api();
        cli.principal = f64::NAN;
        cli.inflation = f64::INFINITY;
        cli.poupanca = f64::NEG_INFINITY;

        let inputs = build_inputs(cli);
        assert_approx(inputs.principal, 0.0);
        assert_approx(inputs.annual_inflation_pct, 0.0);
        assert_approx(inputs.poupanca_pct, 0.0);
    }

    #[test]
    fn build_inputs_clamps_horizon_to_one_month() {
        let mut cli = default_cli_for_api();
        cli.months = 0;

        let inputs = build_inputs(cli);
        assert_eq!(inputs.horizon_months, 1);
    }

    #[test]
    fn inputs_from_json_parses_web_keys() {
        let json = r#"{
          "principal": 20000,
          "monthlyContribution": 500,
          "horizonMonths": 48,
          "inflation": 3.5,
          "cdi": 12.0,
          "cdbNominal": 13.0,
          "cdbPctOfCdi": 105,
          "lci": 10.0,
          "selic": 12.5,
          "poupanca": 6.0,
          "ipcaReal": 5.5,
          "ipca": 3.5
        }"#;
        let inputs = inputs_from_json(json).expect("json should parse");

        assert_approx(inputs.principal, 20_000.0);
        assert_approx(inputs.monthly_contribution, 500.0);
        assert_eq!(inputs.horizon_months, 48);
        assert_approx(inputs.annual_inflation_pct, 3.5);
        assert_approx(inputs.cdi_pct, 12.0);
        assert_approx(inputs.cdb_nominal_pct, 13.0);
        assert_approx(inputs.cdb_pct_of_cdi, 105.0);
        assert_approx(inputs.lci_pct, 10.0);
        assert_approx(inputs.selic_pct, 12.5);
        assert_approx(inputs.poupanca_pct, 6.0);
        assert_approx(inputs.ipca_real_pct, 5.5);
        assert_approx(inputs.ipca_pct, 3.5);
    }

    #[test]
    fn inputs_from_json_accepts_form_field_aliases() {
        let json = r#"{
          "monthly": 350,
          "months": 60,
          "cdb_nom": 15.0,
          "cdb_pct_cdi": 110,
          "ipca_real": 6.0
        }"#;
        let inputs = inputs_from_json(json).expect("json should parse");

        assert_approx(inputs.monthly_contribution, 350.0);
        assert_eq!(inputs.horizon_months, 60);
        assert_approx(inputs.cdb_nominal_pct, 15.0);
        assert_approx(inputs.cdb_pct_of_cdi, 110.0);
        assert_approx(inputs.ipca_real_pct, 6.0);
    }

    #[test]
    fn inputs_from_json_falls_back_to_defaults() {
        let inputs = inputs_from_json("{}").expect("empty payload is valid");
        assert_approx(inputs.principal, 10_000.0);
        assert_eq!(inputs.horizon_months, 36);
        assert_approx(inputs.cdi_pct, 13.15);
    }

    #[test]
    fn inputs_from_json_clamps_zero_horizon() {
        let inputs = inputs_from_json(r#"{"months": 0}"#).expect("json should parse");
        assert_eq!(inputs.horizon_months, 1);
    }

    #[test]
    fn simulate_response_serialization_contains_expected_fields() {
        let result = project(&build_inputs(default_cli_for_api()));
        let response = SimulateResponse {
            rows: result.rows,
            max_net_return: result.max_net_return,
        };

        let json = serde_json::to_string(&response).expect("response should serialize");
        assert!(json.contains("\"rows\""));
        assert!(json.contains("\"maxNetReturn\""));
        assert!(json.contains("\"annualRatePct\""));
        assert!(json.contains("\"futureValue\""));
        assert!(json.contains("\"totalContributed\""));
        assert!(json.contains("\"grossReturn\""));
        assert!(json.contains("\"iofAmount\""));
        assert!(json.contains("\"irPct\""));
        assert!(json.contains("\"irAmount\""));
        assert!(json.contains("\"netReturn\""));
        assert!(json.contains("\"realNetReturn\""));
        assert!(json.contains("\"cdb-nominal\""));
        assert!(json.contains("\"tesouro-ipca\""));
        assert!(json.contains("Poupança"));
    }

    #[test]
    fn simulate_response_rows_keep_engine_order() {
        let result = project(&build_inputs(default_cli_for_api()));
        let kinds: Vec<_> = result.rows.iter().map(|r| r.instrument).collect();
        assert_eq!(kinds, InstrumentKind::ALL.to_vec());
    }

    #[test]
    fn format_brl_groups_thousands_and_uses_comma_decimals() {
        assert_eq!(format_brl(0.0), "R$ 0,00");
        assert_eq!(format_brl(9.5), "R$ 9,50");
        assert_eq!(format_brl(1_234.56), "R$ 1.234,56");
        assert_eq!(format_brl(1_000_000.0), "R$ 1.000.000,00");
        assert_eq!(format_brl(-0.5), "-R$ 0,50");
        assert_eq!(format_brl(-12_345.678), "-R$ 12.345,68");
    }
}
