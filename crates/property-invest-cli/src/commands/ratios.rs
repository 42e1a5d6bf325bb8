use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use property_invest_core::ratios::depreciation::{self, DepreciationInput};
use property_invest_core::ratios::income;
use property_invest_core::ratios::rental_comps::{self, RentalComparable};
use property_invest_core::Rate;

use crate::input;

/// Arguments for the one-percent rule
#[derive(Args)]
pub struct OnePercentArgs {
    /// Monthly rent
    #[arg(long)]
    pub rent: Decimal,

    /// Purchase price
    #[arg(long)]
    pub price: Decimal,
}

pub fn run_one_percent(args: OnePercentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let rule = income::one_percent_rule(args.rent, args.price)?;
    Ok(serde_json::to_value(rule)?)
}

/// Arguments for break-even occupancy
#[derive(Args)]
pub struct BreakEvenArgs {
    /// Total monthly costs, including debt service
    #[arg(long)]
    pub costs: Decimal,

    /// Monthly rental income at full occupancy
    #[arg(long)]
    pub income: Decimal,
}

pub fn run_break_even(args: BreakEvenArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let analysis = income::break_even(args.costs, args.income)?;
    Ok(serde_json::to_value(analysis)?)
}

/// Arguments for the depreciation tax benefit
#[derive(Args)]
pub struct DepreciationArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Purchase price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Land share of the price as a decimal
    #[arg(long, default_value = "0.20")]
    pub land_share: Decimal,

    /// Depreciation period in years
    #[arg(long, default_value = "27.5")]
    pub period: Decimal,

    /// Marginal tax bracket as a decimal
    #[arg(long, default_value = "0.24")]
    pub tax_bracket: Decimal,
}

pub fn run_depreciation(args: DepreciationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let dep_input: DepreciationInput = match input::read_structured(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => DepreciationInput {
            purchase_price: args.price.ok_or("--price is required (or provide --input)")?,
            land_value_percent: Rate::new(args.land_share),
            depreciation_period: args.period,
            tax_bracket: Rate::new(args.tax_bracket),
        },
    };
    let benefit = depreciation::depreciation_tax_benefit(&dep_input)?;
    Ok(serde_json::to_value(benefit)?)
}

/// Arguments for rental comparables
#[derive(Args)]
pub struct RentalCompsArgs {
    /// Path to JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Deserialize)]
struct RentalCompsInput {
    monthly_rent: Decimal,
    comparables: Vec<RentalComparable>,
    area: Decimal,
}

pub fn run_rental_comps(args: RentalCompsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let comps_input: RentalCompsInput = input::read_structured(args.input.as_deref())?
        .ok_or("--input <file> or stdin required for rental comps")?;
    let result = rental_comps::rental_comps(
        comps_input.monthly_rent,
        &comps_input.comparables,
        comps_input.area,
    )?;
    Ok(serde_json::to_value(result)?)
}
