use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use property_invest_core::mortgage::amortization::{
    self, amortization_schedule, amortization_with_extra_payment, LoanTerms,
};
use property_invest_core::mortgage::calculator::{self, MortgageInput, PaymentFrequency};
use property_invest_core::mortgage::ownership::{self, OwnershipInput};
use property_invest_core::Rate;

use crate::input;

/// Arguments for a single payment calculation
#[derive(Args)]
pub struct PaymentArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate as a decimal (0.05 = 5%)
    #[arg(long)]
    pub rate: Decimal,

    /// Loan term in years
    #[arg(long)]
    pub years: u32,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let payment = amortization::monthly_payment(args.principal, Rate::new(args.rate), args.years)?;
    Ok(json!({
        "principal": args.principal,
        "annual_rate": Rate::new(args.rate),
        "term_years": args.years,
        "monthly_payment": payment,
    }))
}

/// Arguments for an amortization schedule
#[derive(Args)]
pub struct AmortizationArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate as a decimal
    #[arg(long)]
    pub rate: Decimal,

    /// Loan term in years
    #[arg(long)]
    pub years: u32,

    /// Extra amount added to every monthly payment
    #[arg(long)]
    pub extra: Option<Decimal>,

    /// Roll the schedule up into loan years
    #[arg(long)]
    pub yearly: bool,
}

pub fn run_amortization(args: AmortizationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = LoanTerms::new(args.principal, Rate::new(args.rate), args.years);

    let schedule = match args.extra {
        Some(extra) if extra > Decimal::ZERO => {
            let outcome = amortization_with_extra_payment(&terms, extra)?;
            if !args.yearly {
                return Ok(serde_json::to_value(outcome)?);
            }
            outcome.schedule
        }
        _ => amortization_schedule(&terms)?,
    };

    if args.yearly {
        Ok(serde_json::to_value(schedule.yearly_summary())?)
    } else {
        Ok(serde_json::to_value(schedule)?)
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum FrequencyArg {
    Monthly,
    Biweekly,
    Weekly,
}

impl From<FrequencyArg> for PaymentFrequency {
    fn from(f: FrequencyArg) -> Self {
        match f {
            FrequencyArg::Monthly => PaymentFrequency::Monthly,
            FrequencyArg::Biweekly => PaymentFrequency::Biweekly,
            FrequencyArg::Weekly => PaymentFrequency::Weekly,
        }
    }
}

/// Arguments for the mortgage calculator
#[derive(Args)]
pub struct MortgageArgs {
    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Property price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Down payment as a decimal share of the price
    #[arg(long, default_value = "0.20")]
    pub down: Decimal,

    /// Annual interest rate as a decimal
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long, default_value_t = 25)]
    pub years: u32,

    /// Payment frequency
    #[arg(long, default_value = "monthly")]
    pub frequency: FrequencyArg,

    /// Extra amount added to every monthly payment
    #[arg(long, default_value = "0")]
    pub extra: Decimal,

    /// First payment date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

pub fn run_mortgage(args: MortgageArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mortgage_input: MortgageInput = match input::read_structured(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => {
            let price = args.price.ok_or("--price is required (or provide --input)")?;
            let rate = args.rate.ok_or("--rate is required (or provide --input)")?;
            MortgageInput {
                property_price: price,
                down_payment_percent: Rate::new(args.down),
                annual_interest_rate: Rate::new(rate),
                term_years: args.years,
                payment_frequency: args.frequency.into(),
                extra_monthly_payment: args.extra,
                start_date: args.start_date,
            }
        }
    };

    let result = calculator::analyze_mortgage(&mortgage_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for the cost of ownership projection
#[derive(Args)]
pub struct OwnershipArgs {
    /// Path to JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_ownership(args: OwnershipArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let ownership_input: OwnershipInput = input::read_structured(args.input.as_deref())?
        .ok_or("--input <file> or stdin required for cost of ownership")?;
    let result = ownership::total_cost_of_ownership(&ownership_input)?;
    Ok(serde_json::to_value(result)?)
}
