//! Accrue CLI: replay token scenarios and quote accrued balances.

mod config;
mod scenario;

use std::path::PathBuf;

use accrue_accrual::HolderRecord;
use accrue_types::{format_amount, parse_amount, Clock, SystemClock, Timestamp};
use accrue_utils::{format_duration, init_logging, LogFormat};
use anyhow::Context;
use clap::Parser;

use crate::config::CliConfig;
use crate::scenario::{Report, Scenario};

#[derive(Parser)]
#[command(name = "accrue", about = "Interest-bearing balance ledger tools")]
struct Cli {
    /// Path to a TOML configuration file. CLI flags and env vars override it.
    #[arg(long, env = "ACCRUE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "ACCRUE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "ACCRUE_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Replay a TOML scenario against a fresh token.
    Simulate {
        /// Scenario file.
        #[arg(long)]
        scenario: PathBuf,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Compute the balance a principal grows to at a locked-in rate.
    Quote {
        /// Principal in raw units.
        #[arg(long, value_parser = parse_amount)]
        principal: u128,

        /// Per-second rate scaled by 10^18.
        #[arg(long, value_parser = parse_amount)]
        rate: u128,

        /// Seconds since the last sync.
        #[arg(long, required_unless_present = "since")]
        elapsed: Option<u64>,

        /// Last sync as Unix seconds; elapsed time is measured to now.
        #[arg(long, conflicts_with = "elapsed")]
        since: Option<u64>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => CliConfig::from_toml_file(path)?,
        None => CliConfig::default(),
    };
    let log_level = cli.log_level.unwrap_or_else(|| config.log_level.clone());
    init_logging(cli.log_format.unwrap_or(config.log_format), &log_level);
    if let Some(path) = &cli.config {
        tracing::debug!("loaded config from {}", path.display());
    }

    match cli.command {
        Command::Simulate {
            scenario: path,
            json,
        } => {
            let parsed = Scenario::from_toml_file(&path)?;
            let report = scenario::run(&parsed, config.params.clone(), config.owner)?;
            tracing::info!(
                steps = report.steps.len(),
                failures = report.failures(),
                "scenario finished"
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Command::Quote {
            principal,
            rate,
            elapsed,
            since,
        } => {
            let elapsed = match (elapsed, since) {
                (Some(elapsed), _) => elapsed,
                (None, Some(since)) => Timestamp::new(since).elapsed_since(SystemClock.now()),
                (None, None) => anyhow::bail!("either --elapsed or --since is required"),
            };
            let quote = quote(principal, rate, elapsed)?;
            let decimals = config.params.decimals;
            println!("principal: {}", format_amount(quote.principal, decimals));
            println!("elapsed:   {}", format_duration(quote.elapsed));
            println!(
                "balance:   {} ({})",
                format_amount(quote.balance, decimals),
                quote.balance
            );
            println!("interest:  {}", format_amount(quote.interest(), decimals));
        }
    }

    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
struct Quote {
    principal: u128,
    elapsed: u64,
    balance: u128,
}

impl Quote {
    fn interest(&self) -> u128 {
        self.balance - self.principal
    }
}

/// Balance `principal` grows to after `elapsed` seconds at `rate`.
fn quote(principal: u128, rate: u128, elapsed: u64) -> anyhow::Result<Quote> {
    let balance = HolderRecord::new(rate, Timestamp::EPOCH)
        .accrued_balance_checked(principal, Timestamp::new(elapsed))
        .context("accrued balance overflows")?;
    Ok(Quote {
        principal,
        elapsed,
        balance,
    })
}

fn print_report(report: &Report) {
    println!("{} ({})", report.name, report.symbol);
    for step in &report.steps {
        let status = if step.ok { "ok" } else { "FAILED" };
        println!(
            "[{:>3}] t={:<10} {:<18} {:<6} {}",
            step.index, step.at, step.op, status, step.detail
        );
    }
    println!();
    println!(
        "t={}  protocol rate {}  total supply {} {}",
        report.final_time,
        report.protocol_rate,
        render(&report.total_supply, report.decimals),
        report.symbol
    );
    for holder in &report.holders {
        println!(
            "  {}  balance {}  principal {}  rate {}  synced t={}",
            holder.address,
            render(&holder.balance, report.decimals),
            render(&holder.principal, report.decimals),
            holder.locked_rate,
            holder.last_synced
        );
    }
    if report.failures() > 0 {
        println!("{} step(s) failed", report.failures());
    }
}

fn render(raw: &str, decimals: u8) -> String {
    match raw.parse::<u128>() {
        Ok(value) => format_amount(value, decimals),
        Err(_) => raw.to_string(),
    }
}
