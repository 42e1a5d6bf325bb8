mod commands;
mod input;
mod output;
mod telemetry;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing::debug;

use commands::analysis::{AnalyzeArgs, ScenarioArgs, ScoreArgs};
use commands::cash_flow::{IrrArgs, MirrArgs, NpvArgs};
use commands::mortgage::{AmortizationArgs, MortgageArgs, OwnershipArgs, PaymentArgs};
use commands::ratios::{BreakEvenArgs, DepreciationArgs, OnePercentArgs, RentalCompsArgs};

/// Mortgage and rental property investment analysis
#[derive(Parser)]
#[command(
    name = "pia",
    version,
    about = "Mortgage and rental property investment analysis",
    long_about = "A CLI for analysing residential property purchases with decimal \
                  precision. Covers mortgage amortization, cost of ownership, NPV/IRR/MIRR, \
                  rental ratios, sensitivity analysis and a composite investment score. \
                  All rates are decimals (0.05 = 5%)."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log filter used when RUST_LOG is unset (e.g. "debug")
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Monthly payment for a fixed-rate loan
    Payment(PaymentArgs),
    /// Payment-by-payment amortization schedule
    Amortization(AmortizationArgs),
    /// Mortgage calculator: payment, totals, payoff and extra payments
    Mortgage(MortgageArgs),
    /// Year-by-year total cost of ownership
    Ownership(OwnershipArgs),
    /// Net present value of an investment
    Npv(NpvArgs),
    /// Internal rate of return (Newton-Raphson)
    Irr(IrrArgs),
    /// Modified internal rate of return
    Mirr(MirrArgs),
    /// One-percent rule check
    OnePercent(OnePercentArgs),
    /// Break-even occupancy
    BreakEven(BreakEvenArgs),
    /// Depreciation tax benefit
    Depreciation(DepreciationArgs),
    /// Compare rent against comparable rentals
    RentalComps(RentalCompsArgs),
    /// Cash-flow sensitivity to price, rate, rent, vacancy and appreciation
    Sensitivity(ScenarioArgs),
    /// Weighted investment score from precomputed metrics
    Score(ScoreArgs),
    /// Full investment analysis of a rental property
    Analyze(AnalyzeArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if let Err(e) = telemetry::init(&cli.log_level) {
        eprintln!("{}: {}", "error".red().bold(), e);
        process::exit(1);
    }

    let command = matches.subcommand_name().unwrap_or_default();
    debug!(command, output = ?cli.output, "dispatching");

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payment(args) => commands::mortgage::run_payment(args),
        Commands::Amortization(args) => commands::mortgage::run_amortization(args),
        Commands::Mortgage(args) => commands::mortgage::run_mortgage(args),
        Commands::Ownership(args) => commands::mortgage::run_ownership(args),
        Commands::Npv(args) => commands::cash_flow::run_npv(args),
        Commands::Irr(args) => commands::cash_flow::run_irr(args),
        Commands::Mirr(args) => commands::cash_flow::run_mirr(args),
        Commands::OnePercent(args) => commands::ratios::run_one_percent(args),
        Commands::BreakEven(args) => commands::ratios::run_break_even(args),
        Commands::Depreciation(args) => commands::ratios::run_depreciation(args),
        Commands::RentalComps(args) => commands::ratios::run_rental_comps(args),
        Commands::Sensitivity(args) => commands::analysis::run_sensitivity(args),
        Commands::Score(args) => commands::analysis::run_score(args),
        Commands::Analyze(args) => commands::analysis::run_analyze(args),
        Commands::Version => {
            println!("pia {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            debug!(command, "computation finished");
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            debug!(command, error = %e, "computation failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
