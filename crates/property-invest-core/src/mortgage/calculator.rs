use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PropertyInvestError;
use crate::mortgage::amortization::{
    amortization_schedule, amortization_with_extra_payment, AmortizationSchedule,
    AmortizationYear, ExtraPaymentOutcome, LoanTerms,
};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::PropertyInvestResult;

/// How often the borrower pays. Non-monthly payments are the monthly payment
/// spread evenly over the year; interest is still compounded monthly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    #[default]
    Monthly,
    Biweekly,
    Weekly,
}

impl PaymentFrequency {
    pub fn payments_per_year(&self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::Biweekly => 26,
            PaymentFrequency::Weekly => 52,
        }
    }
}

/// Input for the mortgage calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageInput {
    pub property_price: Money,
    /// Share of the price paid upfront (e.g. 0.20 = 20%)
    pub down_payment_percent: Rate,
    pub annual_interest_rate: Rate,
    pub term_years: u32,
    #[serde(default)]
    pub payment_frequency: PaymentFrequency,
    /// Added to every monthly payment (default 0)
    #[serde(default)]
    pub extra_monthly_payment: Money,
    /// First payment date, used to project the payoff date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// Mortgage calculator output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageOutput {
    pub loan_amount: Money,
    pub down_payment: Money,
    pub loan_to_value: Rate,
    pub monthly_payment: Money,
    /// Payment at the chosen frequency (monthly * 12 / payments per year)
    pub periodic_payment: Money,
    pub payments_per_year: u32,
    /// Interest over the full scheduled term, without extra payments
    pub total_interest: Money,
    /// Loan amount plus `total_interest`
    pub total_cost: Money,
    pub interest_to_loan_ratio: Decimal,
    /// Scheduled term, or the shortened term when extra payments are made
    pub years_to_payoff: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
    /// Year-by-year view of the schedule actually followed
    pub yearly_breakdown: Vec<AmortizationYear>,
    pub schedule: AmortizationSchedule,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_payment: Option<ExtraPaymentOutcome>,
}

/// Price a mortgage: payment, schedule, totals and the effect of any extra
/// monthly payment.
pub fn analyze_mortgage(
    input: &MortgageInput,
) -> PropertyInvestResult<ComputationOutput<MortgageOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.property_price <= Decimal::ZERO {
        return Err(PropertyInvestError::invalid(
            "property_price",
            "Property price must be positive",
        ));
    }
    let down = input.down_payment_percent.as_decimal();
    if down < Decimal::ZERO || down > Decimal::ONE {
        return Err(PropertyInvestError::invalid(
            "down_payment_percent",
            "Down payment must be between 0 and 1",
        ));
    }

    let down_payment = input.property_price * down;
    let loan_amount = input.property_price - down_payment;
    let terms = LoanTerms::new(loan_amount, input.annual_interest_rate, input.term_years);
    let schedule = amortization_schedule(&terms)?;
    let monthly_payment = schedule.monthly_payment;

    let payments_per_year = input.payment_frequency.payments_per_year();
    let periodic_payment = monthly_payment * dec!(12) / Decimal::from(payments_per_year);

    let total_interest = schedule.total_interest;
    let total_cost = loan_amount + total_interest;
    let interest_to_loan_ratio = if loan_amount.is_zero() {
        Decimal::ZERO
    } else {
        total_interest / loan_amount
    };

    let extra_payment = if input.extra_monthly_payment > Decimal::ZERO {
        Some(amortization_with_extra_payment(
            &terms,
            input.extra_monthly_payment,
        )?)
    } else if input.extra_monthly_payment < Decimal::ZERO {
        return Err(PropertyInvestError::invalid(
            "extra_monthly_payment",
            "Extra monthly payment cannot be negative",
        ));
    } else {
        None
    };

    let (payoff_months, yearly_breakdown) = match &extra_payment {
        Some(outcome) => (outcome.payoff_months, outcome.schedule.yearly_summary()),
        None => (terms.total_payments(), schedule.yearly_summary()),
    };
    let years_to_payoff = Decimal::from(payoff_months) / dec!(12);

    let payoff_date = input
        .start_date
        .map(|date| {
            date.checked_add_months(Months::new(payoff_months))
                .ok_or_else(|| {
                    PropertyInvestError::invalid("start_date", "Payoff date is out of range")
                })
        })
        .transpose()?;

    // --- Warnings ---
    if Decimal::ONE - down > dec!(0.80) {
        warnings.push(format!(
            "LTV of {:.1}% exceeds 80%; expect mortgage insurance",
            (Decimal::ONE - down) * dec!(100)
        ));
    }
    if total_interest > loan_amount && !loan_amount.is_zero() {
        warnings.push("Total interest exceeds the amount borrowed".into());
    }

    let output = MortgageOutput {
        loan_amount,
        down_payment,
        loan_to_value: Rate::new(Decimal::ONE - down),
        monthly_payment,
        periodic_payment,
        payments_per_year,
        total_interest,
        total_cost,
        interest_to_loan_ratio,
        years_to_payoff,
        payoff_date,
        yearly_breakdown,
        schedule,
        extra_payment,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-Rate Mortgage Amortization (monthly compounding)",
        input,
        warnings,
        elapsed,
        output,
    ))
}
