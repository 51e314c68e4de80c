use std::env;
use std::net::SocketAddr;

use contracts::ScenarioParameters;
use scenario_api::baseline::{BaselineSource, FixtureBaselineSource, JsonBaselineSource};
use scenario_api::config::ServiceConfig;
use scenario_api::{serve, AppState, ScenarioService, BASELINE_YEAR};
use scenario_core::report::render_report;
use scenario_core::stress;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,scenario_api=debug,scenario_core=info";
const DEFAULT_TARGET_YEAR: i32 = 2035;
const DEFAULT_NDVI: f64 = 0.55;

fn print_usage() {
    println!("scenario-cli <command>");
    println!("commands:");
    println!("  serve [addr]");
    println!("    default addr: 127.0.0.1:8000");
    println!("  simulate <region> <rainfall_delta> <temperature_delta> [urban_growth] [year]");
    println!("    runs one scenario and prints the report");
    println!("  fingerprint <region> <rainfall_delta> <temperature_delta> [urban_growth] [year]");
    println!("  stress <rainfall_delta> <temperature_delta> [ndvi]");
    println!("  cache-stats");
    println!("    prints configured cache limits and archived results");
    println!("environment:");
    println!("  SCENARIO_CACHE_MAX_SIZE, SCENARIO_CACHE_TTL_HOURS, SCENARIO_FINGERPRINT_LENGTH,");
    println!("  SCENARIO_SQLITE_PATH, SCENARIO_BASELINE_DIR, RUST_LOG");
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(false)
        .init();
}

fn parse_f64(value: Option<&String>, label: &str) -> Result<f64, String> {
    let raw = value.ok_or_else(|| format!("missing {label}"))?;
    raw.parse::<f64>()
        .map_err(|_| format!("invalid {label}: {raw}"))
}

fn parse_optional_f64(value: Option<&String>, label: &str, default: f64) -> Result<f64, String> {
    value
        .map(|raw| {
            raw.parse::<f64>()
                .map_err(|_| format!("invalid {label}: {raw}"))
        })
        .transpose()
        .map(|parsed| parsed.unwrap_or(default))
}

fn parse_socket_addr(value: Option<&String>) -> Result<SocketAddr, String> {
    let raw = value.map(String::as_str).unwrap_or("127.0.0.1:8000");
    raw.parse::<SocketAddr>()
        .map_err(|_| format!("invalid addr: {raw}"))
}

/// `<region> <rainfall_delta> <temperature_delta> [urban_growth] [year]` starting at `args[2]`.
fn parse_scenario(args: &[String]) -> Result<ScenarioParameters, String> {
    let region = args
        .get(2)
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| "missing region".to_string())?;
    let rainfall_delta = parse_f64(args.get(3), "rainfall_delta")?;
    let temperature_delta = parse_f64(args.get(4), "temperature_delta")?;
    let urban_growth = parse_optional_f64(args.get(5), "urban_growth", 0.0)?;
    let year = args
        .get(6)
        .map(|raw| {
            raw.parse::<i32>()
                .map_err(|_| format!("invalid year: {raw}"))
        })
        .transpose()?
        .unwrap_or(DEFAULT_TARGET_YEAR);

    Ok(ScenarioParameters::new(
        region,
        year,
        rainfall_delta,
        temperature_delta,
        urban_growth,
    ))
}

fn baseline_source(config: &ServiceConfig) -> Box<dyn BaselineSource> {
    match config.baseline_dir.as_deref() {
        Some(dir) => Box::new(JsonBaselineSource::new(dir)),
        None => Box::new(FixtureBaselineSource::default()),
    }
}

fn build_service(config: &ServiceConfig) -> Result<ScenarioService, String> {
    ScenarioService::from_config(config)
        .map_err(|err| format!("failed to attach sqlite store: {err}"))
}

fn run_simulate(args: &[String]) -> Result<(), String> {
    let config = ServiceConfig::from_env();
    let scenario = parse_scenario(args)?;
    config
        .bounds
        .validate(&scenario)
        .map_err(|err| err.message)?;

    let service = build_service(&config)?;
    let source = baseline_source(&config);
    let outcome = service
        .compute_or_fetch_with(&scenario, BASELINE_YEAR, source.as_ref())
        .map_err(|err| err.to_string())?;

    print!("{}", render_report(&outcome.result));
    println!("scenario_id={}", outcome.result.scenario_id);

    if let Some(error) = service.last_persistence_error() {
        return Err(format!("persistence error after simulation: {error}"));
    }
    Ok(())
}

fn run_fingerprint(args: &[String]) -> Result<(), String> {
    let config = ServiceConfig::from_env();
    let scenario = parse_scenario(args)?;
    let service = ScenarioService::from_config(&ServiceConfig {
        sqlite_path: None,
        ..config
    })
    .map_err(|err| err.to_string())?;

    println!(
        "{}",
        service.fingerprint(&scenario.region, BASELINE_YEAR, &scenario)
    );
    Ok(())
}

fn run_stress(args: &[String]) -> Result<(), String> {
    let rainfall_delta = parse_f64(args.get(2), "rainfall_delta")?;
    let temperature_delta = parse_f64(args.get(3), "temperature_delta")?;
    let ndvi = parse_optional_f64(args.get(4), "ndvi", DEFAULT_NDVI)?;

    let result = stress::evaluate(rainfall_delta, temperature_delta, ndvi)
        .map_err(|err| err.to_string())?;

    println!(
        "rainfall={:.4} temperature={:.4} combined={:.4} vegetation={:.4} level={}",
        result.rainfall_stress,
        result.temperature_stress,
        result.combined_stress,
        result.vegetation_stress_index,
        result.crop_stress_level
    );
    for line in stress::explain(&result) {
        println!("  {line}");
    }
    Ok(())
}

fn run_cache_stats() -> Result<(), String> {
    let config = ServiceConfig::from_env();
    let service = build_service(&config)?;
    let stats = service.cache_stats().map_err(|err| err.to_string())?;
    let rendered = serde_json::to_string_pretty(&stats).map_err(|err| err.to_string())?;
    println!("{rendered}");

    if service.has_archive() {
        let archived = service
            .archived_results(20)
            .map_err(|err| err.to_string())?;
        println!("archived results: {}", archived.len());
        for entry in archived {
            println!(
                "  {} {} {}->{} {} {}",
                entry.scenario_id,
                entry.region,
                entry.baseline_year,
                entry.target_year,
                entry.stress_level,
                entry.created_at
            );
        }
    }
    Ok(())
}

async fn run_serve(args: &[String]) -> Result<(), String> {
    let addr = parse_socket_addr(args.get(2))?;
    let config = ServiceConfig::from_env();
    let service = build_service(&config)?;

    let state = match config.baseline_dir.as_deref() {
        Some(dir) => AppState::new(service, JsonBaselineSource::new(dir), config.bounds),
        None => AppState::new(service, FixtureBaselineSource::default(), config.bounds),
    };

    info!(
        cache_max_size = config.cache_max_size,
        cache_ttl_secs = config.cache_ttl.as_secs(),
        archive = config.sqlite_path.as_deref().unwrap_or("none"),
        "starting scenario api"
    );
    println!("serving api on http://{addr}");
    serve(addr, state)
        .await
        .map_err(|err| format!("server error: {err}"))
}

#[tokio::main]
async fn main() {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);

    let outcome = match command {
        Some("serve") => run_serve(&args).await,
        Some("simulate") => run_simulate(&args),
        Some("fingerprint") => run_fingerprint(&args),
        Some("stress") => run_stress(&args),
        Some("cache-stats") => run_cache_stats(),
        _ => {
            print_usage();
            Ok(())
        }
    };

    if let Err(err) = outcome {
        eprintln!("error: {err}");
        print_usage();
        std::process::exit(2);
    }
}
