use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use property_invest_core::time_value::{self, IrrOptions};
use property_invest_core::Rate;

/// Arguments for NPV
#[derive(Args)]
pub struct NpvArgs {
    /// Cash invested at t=0, as a positive amount
    #[arg(long)]
    pub initial: Decimal,

    /// End-of-period cash flows (comma-separated, e.g. "2000,2000,92000")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    pub cash_flows: Vec<Decimal>,

    /// Discount rate as a decimal
    #[arg(long)]
    pub rate: Decimal,
}

pub fn run_npv(args: NpvArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let npv = time_value::npv(args.initial, &args.cash_flows, Rate::new(args.rate))?;
    Ok(json!({
        "npv": npv,
        "discount_rate": Rate::new(args.rate),
        "periods": args.cash_flows.len(),
    }))
}

/// Arguments for IRR
#[derive(Args)]
pub struct IrrArgs {
    /// Cash invested at t=0, as a positive amount
    #[arg(long)]
    pub initial: Decimal,

    /// End-of-period cash flows (comma-separated)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    pub cash_flows: Vec<Decimal>,

    /// Starting rate for the solver
    #[arg(long, default_value = "0.10")]
    pub guess: Decimal,

    /// Convergence threshold on |NPV|
    #[arg(long, default_value = "0.0001")]
    pub tolerance: Decimal,

    /// Iteration cap
    #[arg(long, default_value_t = 100)]
    pub max_iterations: u32,
}

pub fn run_irr(args: IrrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let options = IrrOptions {
        guess: Rate::new(args.guess),
        tolerance: args.tolerance,
        max_iterations: args.max_iterations,
    };
    let irr = time_value::irr(args.initial, &args.cash_flows, &options)?;
    let payback = time_value::payback_period(args.initial, &args.cash_flows);
    Ok(json!({
        "irr": irr,
        "converged": irr.is_some(),
        "payback_period": payback,
    }))
}

/// Arguments for MIRR
#[derive(Args)]
pub struct MirrArgs {
    /// Cash invested at t=0, as a positive amount
    #[arg(long)]
    pub initial: Decimal,

    /// End-of-period cash flows (comma-separated)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    pub cash_flows: Vec<Decimal>,

    /// Rate applied to negative flows
    #[arg(long)]
    pub finance_rate: Decimal,

    /// Rate applied to positive flows
    #[arg(long)]
    pub reinvest_rate: Decimal,
}

pub fn run_mirr(args: MirrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mirr = time_value::mirr(
        args.initial,
        &args.cash_flows,
        Rate::new(args.finance_rate),
        Rate::new(args.reinvest_rate),
    )?;
    Ok(json!({
        "mirr": mirr,
        "finance_rate": Rate::new(args.finance_rate),
        "reinvest_rate": Rate::new(args.reinvest_rate),
    }))
}
