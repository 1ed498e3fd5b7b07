//! claimer-cli: quote, calibrate and simulate VRGDA-priced prize claims.
//!
//! Works offline against a ledger snapshot; the in-memory vault stands in
//! for the real payout contract.

mod load;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use claimer_core::U256;
use claimer_core::traits::AuctionPricing;
use claimer_core::u256_decimal;
use claimer_engine::Claimer;
use claimer_vrgda::VrgdaEngine;
use serde_json::json;
use tracing::info;

/// Largest `--count` accepted by `quote`; pricing walks every claim.
const MAX_QUOTE_COUNT: u64 = 100_000;

/// VRGDA prize claimer.
#[derive(Parser)]
#[command(name = "claimer-cli")]
#[command(version, about = "Quote and simulate VRGDA-priced prize claims")]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log output format ("text" or "json")
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Quote the fee for a batch against a ledger snapshot.
    Quote(QuoteArgs),
    /// Derive the decay constant for a fixed fee curve.
    Calibrate(CalibrateArgs),
    /// Run a claim request against a snapshot's in-memory vault.
    Simulate(SimulateArgs),
}

#[derive(Args)]
struct SourceArgs {
    /// Claimer config file (default: <data dir>/claimer/claimer.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ledger snapshot file.
    #[arg(short, long)]
    snapshot: PathBuf,
}

#[derive(Args)]
struct QuoteArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Tier to claim.
    #[arg(long)]
    tier: u8,

    /// Number of claims in the batch.
    #[arg(long)]
    count: u64,

    /// Claims already made this draw (default: the ledger's count).
    #[arg(long)]
    claimed: Option<u64>,
}

#[derive(Args)]
struct CalibrateArgs {
    /// Fee at the start of the ramp, in wei.
    #[arg(long)]
    min_fee: String,

    /// Fee at the end of the ramp, in wei.
    #[arg(long)]
    max_fee: String,

    /// Ramp duration in seconds.
    #[arg(long)]
    time: u64,
}

#[derive(Args)]
struct SimulateArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Claim request file.
    #[arg(short, long)]
    request: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, &cli.log_format);

    match cli.command {
        Commands::Quote(args) => quote(args),
        Commands::Calibrate(args) => calibrate(args),
        Commands::Simulate(args) => simulate(args),
    }
}

fn quote(args: QuoteArgs) -> Result<()> {
    check_count(args.count)?;
    let config = load::load_config(args.source.config.as_deref())?;
    let snapshot = load::load_snapshot(&args.source.snapshot)?;
    let now = snapshot.now;
    let (ledger, _vault) = snapshot.into_world();
    let claimer = Claimer::with_clock(ledger, Arc::new(VrgdaEngine::new()), config, move || now)
        .context("failed to build claimer")?;

    let claimed = match args.claimed {
        Some(claimed) => claimed,
        None => claimer.ledger().claim_count()?,
    };
    let total = claimer.compute_total_fees_with_claimed(args.tier, args.count, claimed)?;
    let fee_per_claim = if args.count == 0 {
        U256::ZERO
    } else {
        total / U256::from(args.count)
    };
    let max_fee = claimer.compute_max_fee(args.tier)?;
    let curve = claimer.curve_params()?;

    print_json(&json!({
        "tier": args.tier,
        "count": args.count,
        "claimed": claimed,
        "elapsed": claimer.elapsed()?,
        "time_to_reach_max_fee": claimer.config().time_to_reach_max_fee,
        "target_fee": curve.target_fee.to_string(),
        "decay_constant": curve.decay_constant.to_string(),
        "fee_per_claim": fee_per_claim.to_string(),
        "total_fees": total.to_string(),
        "max_fee": max_fee.to_string(),
        "fee_per_claim_display": u256_decimal::format_units(fee_per_claim, 18),
    }))
}

fn calibrate(args: CalibrateArgs) -> Result<()> {
    let min_fee = u256_decimal::parse(&args.min_fee)
        .map_err(anyhow::Error::msg)
        .context("invalid --min-fee")?;
    let max_fee = u256_decimal::parse(&args.max_fee)
        .map_err(anyhow::Error::msg)
        .context("invalid --max-fee")?;
    if min_fee >= max_fee {
        bail!("--min-fee must be below --max-fee");
    }

    let engine = VrgdaEngine::new();
    let scale = engine.maximum_price_delta_scale(min_fee, max_fee, args.time)?;
    let decay_constant = engine.decay_constant(scale)?;
    info!(%scale, %decay_constant, "calibrated");

    print_json(&json!({
        "min_fee": min_fee.to_string(),
        "max_fee": max_fee.to_string(),
        "time": args.time,
        "price_delta_scale": scale.to_string(),
        "price_delta_scale_display": u256_decimal::format_units(scale, 18),
        "decay_constant": decay_constant.to_string(),
    }))
}

fn simulate(args: SimulateArgs) -> Result<()> {
    let config = load::load_config(args.source.config.as_deref())?;
    let snapshot = load::load_snapshot(&args.source.snapshot)?;
    let request = load::load_request(&args.request)?;
    let now = snapshot.now;
    let (ledger, vault) = snapshot.into_world();
    let claimer = Claimer::with_clock(
        ledger.clone(),
        Arc::new(VrgdaEngine::new()),
        config,
        move || now,
    )
    .context("failed to build claimer")?;

    let result = claimer.claim_batch(vault.as_ref(), &request)?;
    info!(
        claimed = result.claim_count,
        total_fees = %result.total_fees,
        "simulation finished"
    );

    print_json(&json!({
        "claim_count": result.claim_count,
        "fee_per_claim": result.fee_per_claim.to_string(),
        "total_fees": result.total_fees.to_string(),
        "already_claimed": result.already_claimed.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "failures": result.failures.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "ledger_claim_count": ledger.state().claim_count,
        "fee_recipient_balance": vault.fee_balance(&request.fee_recipient).to_string(),
        "vault_calls": vault.call_count(),
    }))
}

fn check_count(count: u64) -> Result<()> {
    if count > MAX_QUOTE_COUNT {
        bail!("--count {count} exceeds the limit of {MAX_QUOTE_COUNT} claims");
    }
    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Initialize the tracing subscriber with the given level and format.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
