//! stock-analyzer: run the technical engine and recommendation scorer over a
//! price history stored as JSON.
//!
//! Usage:
//!   stock-analyzer --input prices.json --symbol TCS
//!   stock-analyzer --input prices.json --symbol TCS --horizon all --sentiment 62
//!   stock-analyzer --input prices.json --symbol TCS --fundamentals ratios.json --horizon yearly
//!   stock-analyzer --input prices.json --technical-only
//!
//! Engine parameters are read from `TA_*` environment variables (a `.env` file is honoured).

use analysis_core::{EngineConfig, PriceSeries};
use anyhow::{bail, Context, Result};
use recommendation_engine::{
    EntryPolicy, FundamentalMetrics, RecommendationInputs, Recommender, RecommendationScorer,
    TimeHorizon,
};
use serde::de::DeserializeOwned;
use std::path::Path;
use technical_analysis::TechnicalAnalysisEngine;

const DEFAULT_SYMBOL: &str = "UNKNOWN";

#[derive(Debug)]
enum HorizonArg {
    One(TimeHorizon),
    All,
}

#[derive(Debug)]
struct CliArgs {
    input: String,
    symbol: String,
    horizon: HorizonArg,
    fundamentals: Option<String>,
    sentiment: Option<f64>,
    entry_policy: EntryPolicy,
    technical_only: bool,
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let input = match flag_value(args, "--input") {
        Some(path) => path.to_string(),
        None => bail!("--input <file.json> is required"),
    };

    let horizon = match flag_value(args, "--horizon").unwrap_or("daily") {
        "all" => HorizonArg::All,
        other => HorizonArg::One(other.parse::<TimeHorizon>()?),
    };

    let sentiment = flag_value(args, "--sentiment")
        .map(|v| v.parse::<f64>().with_context(|| format!("invalid --sentiment value '{}'", v)))
        .transpose()?;

    let entry_policy = if args.iter().any(|a| a == "--pullback-entry") {
        EntryPolicy::SupportPullback
    } else {
        EntryPolicy::Market
    };

    Ok(CliArgs {
        input,
        symbol: flag_value(args, "--symbol").unwrap_or(DEFAULT_SYMBOL).to_string(),
        horizon,
        fundamentals: flag_value(args, "--fundamentals").map(str::to_string),
        sentiment,
        entry_policy,
        technical_only: args.iter().any(|a| a == "--technical-only"),
    })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  stock-analyzer --input FILE [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --symbol SYM          Symbol label for the output (default: {})", DEFAULT_SYMBOL);
    eprintln!("  --horizon H           daily | weekly | monthly | yearly | all (default: daily)");
    eprintln!("  --fundamentals FILE   JSON object with pe_ratio, roe, debt_to_equity, ...");
    eprintln!("  --sentiment N         Sentiment score 0-100");
    eprintln!("  --pullback-entry      Enter at nearby support instead of market");
    eprintln!("  --technical-only      Print the technical analysis without scoring");
}

fn read_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let raw = std::fs::read_to_string(Path::new(path))
        .with_context(|| format!("failed to read {}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path))
}

fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // stdout carries the JSON result, logs go to stderr
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            print_usage();
            return Err(e);
        }
    };

    let config = EngineConfig::from_env().context("invalid engine configuration")?;
    let series: PriceSeries = read_json(&cli.input)?;
    tracing::info!("Loaded {} price points for {} from {}", series.len(), cli.symbol, cli.input);

    let engine = TechnicalAnalysisEngine::with_config(config).context("invalid engine configuration")?;

    let output = if cli.technical_only {
        serde_json::to_value(engine.analyze(&series))?
    } else {
        let fundamentals = cli
            .fundamentals
            .as_deref()
            .map(read_json::<FundamentalMetrics>)
            .transpose()?;
        let inputs = RecommendationInputs {
            fundamentals,
            sentiment: cli.sentiment,
            entry_policy: cli.entry_policy,
        };
        let recommender = Recommender::with_parts(engine, RecommendationScorer::default());

        match cli.horizon {
            HorizonArg::All => {
                serde_json::to_value(recommender.recommend_all_horizons(&cli.symbol, &series, &inputs)?)?
            }
            HorizonArg::One(horizon) => {
                serde_json::to_value(recommender.recommend(&cli.symbol, &series, horizon, &inputs)?)?
            }
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
