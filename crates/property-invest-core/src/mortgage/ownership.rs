use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PropertyInvestError;
use crate::mortgage::amortization::{monthly_payment, step_month};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::PropertyInvestResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input parameters for an ownership cost projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnershipInput {
    pub purchase_price: Money,
    /// Share of the price paid upfront (e.g. 0.20 = 20%)
    pub down_payment_percent: Rate,
    pub annual_interest_rate: Rate,
    pub term_years: u32,
    /// Annual property tax as a share of current value
    pub property_tax_rate: Rate,
    /// Annual insurance as a share of current value
    pub insurance_rate: Rate,
    pub monthly_hoa: Money,
    /// Annual maintenance as a share of current value
    pub maintenance_rate: Rate,
    /// Annual change in property value
    pub appreciation_rate: Rate,
    pub holding_years: u32,
}

/// One year of ownership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnershipYearSnapshot {
    pub year: u32,
    /// Value at the end of the year, after appreciation
    pub property_value: Money,
    /// Property value minus remaining loan balance
    pub equity: Money,
    /// Mortgage cash paid during the year
    pub mortgage_payment: Money,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub property_tax: Money,
    pub insurance: Money,
    pub hoa_fees: Money,
    pub maintenance: Money,
    pub total_costs: Money,
    pub remaining_loan_balance: Money,
}

/// Complete ownership projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnershipOutput {
    /// Down payment
    pub initial_investment: Money,
    pub loan_amount: Money,
    pub monthly_payment: Money,
    pub yearly_data: Vec<OwnershipYearSnapshot>,
    pub final_property_value: Money,
    pub total_equity_built: Money,
    /// Principal repaid over the holding period
    pub loan_paid: Money,
    pub total_interest_paid: Money,
    /// Sum of every year's total costs
    pub total_cost_of_ownership: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project property value, equity and every recurring cost year by year.
///
/// The mortgage payment is fixed at purchase; tax, insurance and maintenance
/// follow the appreciated value.
pub fn total_cost_of_ownership(
    input: &OwnershipInput,
) -> PropertyInvestResult<ComputationOutput<OwnershipOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let output = project_ownership(input, &mut warnings)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Total Cost of Ownership (fixed-rate mortgage, value-linked costs)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Projection without the output envelope, shared with the property analysis.
pub(crate) fn project_ownership(
    input: &OwnershipInput,
    warnings: &mut Vec<String>,
) -> PropertyInvestResult<OwnershipOutput> {
    validate_input(input)?;

    let down_payment = input.purchase_price * input.down_payment_percent.as_decimal();
    let loan_amount = input.purchase_price - down_payment;
    let payment = monthly_payment(loan_amount, input.annual_interest_rate, input.term_years)?;
    let monthly_rate = input.annual_interest_rate.monthly();
    let scheduled_months = input.term_years * 12;

    let growth = Decimal::ONE + input.appreciation_rate.as_decimal();
    let hoa_fees = input.monthly_hoa * dec!(12);

    let mut property_value = input.purchase_price;
    let mut balance = loan_amount;
    let mut months_paid: u32 = 0;
    let mut payoff_year: Option<u32> = None;
    let mut yearly_data = Vec::with_capacity(input.holding_years as usize);

    // Sequential: each year starts from the previous year's balance
    for year in 1..=input.holding_years {
        property_value = property_value.checked_mul(growth).ok_or_else(|| {
            PropertyInvestError::invalid(
                "appreciation_rate",
                format!("Property value in year {year} exceeds the representable range"),
            )
        })?;

        let mut interest_paid = Decimal::ZERO;
        let mut principal_paid = Decimal::ZERO;
        let mut mortgage_payment = Decimal::ZERO;

        for _ in 0..12 {
            if balance <= Decimal::ZERO || months_paid >= scheduled_months {
                break;
            }
            let step = step_month(balance, monthly_rate, payment, true);
            interest_paid += step.interest;
            principal_paid += step.principal;
            mortgage_payment += step.paid;
            balance = step.balance;
            months_paid += 1;
        }

        if payoff_year.is_none() && (balance.is_zero() || months_paid >= scheduled_months) {
            payoff_year = Some(year);
        }

        let property_tax = property_value * input.property_tax_rate.as_decimal();
        let insurance = property_value * input.insurance_rate.as_decimal();
        let maintenance = property_value * input.maintenance_rate.as_decimal();
        let total_costs = mortgage_payment + property_tax + insurance + hoa_fees + maintenance;

        yearly_data.push(OwnershipYearSnapshot {
            year,
            property_value,
            equity: property_value - balance,
            mortgage_payment,
            principal_paid,
            interest_paid,
            property_tax,
            insurance,
            hoa_fees,
            maintenance,
            total_costs,
            remaining_loan_balance: balance,
        });
    }

    // --- Warnings ---
    if let Some(year) = payoff_year {
        if year < input.holding_years && !loan_amount.is_zero() {
            warnings.push(format!(
                "Loan is repaid in year {year}; no mortgage payments after that"
            ));
        }
    }
    if let Some(underwater) = yearly_data.iter().find(|y| y.equity < Decimal::ZERO) {
        warnings.push(format!(
            "Negative equity in year {}: property value below loan balance",
            underwater.year
        ));
    }

    let total_interest_paid = yearly_data.iter().map(|y| y.interest_paid).sum();
    let total_cost_of_ownership = yearly_data.iter().map(|y| y.total_costs).sum();

    Ok(OwnershipOutput {
        initial_investment: down_payment,
        loan_amount,
        monthly_payment: payment,
        final_property_value: property_value,
        total_equity_built: property_value - balance,
        loan_paid: loan_amount - balance,
        total_interest_paid,
        total_cost_of_ownership,
        yearly_data,
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(input: &OwnershipInput) -> PropertyInvestResult<()> {
    if input.purchase_price <= Decimal::ZERO {
        return Err(PropertyInvestError::invalid(
            "purchase_price",
            "Purchase price must be positive",
        ));
    }

    let down = input.down_payment_percent.as_decimal();
    if down < Decimal::ZERO || down > Decimal::ONE {
        return Err(PropertyInvestError::invalid(
            "down_payment_percent",
            "Down payment must be between 0 and 1",
        ));
    }

    if input.holding_years < 1 {
        return Err(PropertyInvestError::invalid(
            "holding_years",
            "Holding period must be at least 1 year",
        ));
    }

    for (field, rate) in [
        ("property_tax_rate", input.property_tax_rate),
        ("insurance_rate", input.insurance_rate),
        ("maintenance_rate", input.maintenance_rate),
    ] {
        if rate.is_negative() {
            return Err(PropertyInvestError::invalid(field, "Rate cannot be negative"));
        }
    }

    if input.monthly_hoa < Decimal::ZERO {
        return Err(PropertyInvestError::invalid(
            "monthly_hoa",
            "HOA fees cannot be negative",
        ));
    }

    if input.appreciation_rate.as_decimal() <= dec!(-1) {
        return Err(PropertyInvestError::invalid(
            "appreciation_rate",
            "Appreciation must be greater than -100%",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_input() -> OwnershipInput {
        OwnershipInput {
            purchase_price: dec!(80000),
            down_payment_percent: Rate::new(dec!(0.20)),
            annual_interest_rate: Rate::new(dec!(0.05)),
            term_years: 25,
            property_tax_rate: Rate::new(dec!(0.005)),
            insurance_rate: Rate::new(dec!(0.003)),
            monthly_hoa: dec!(50),
            maintenance_rate: Rate::new(dec!(0.01)),
            appreciation_rate: Rate::new(dec!(0.03)),
            holding_years: 10,
        }
    }

    #[test]
    fn test_first_year_snapshot() {
        let out = total_cost_of_ownership(&sample_input()).unwrap().result;
        let y1 = &out.yearly_data[0];

        assert_eq!(out.initial_investment, dec!(16000));
        assert_eq!(out.loan_amount, dec!(64000));
        assert_eq!(y1.year, 1);
        // Costs follow the appreciated value: 80000 * 1.03 = 82400
        assert_eq!(y1.property_value, dec!(82400));
        assert_eq!(y1.property_tax, dec!(412));
        assert_eq!(y1.insurance, dec!(247.2));
        assert_eq!(y1.maintenance, dec!(824));
        assert_eq!(y1.hoa_fees, dec!(600));
        assert!((y1.mortgage_payment - out.monthly_payment * dec!(12)).abs() < dec!(0.0001));
        assert!((y1.principal_paid + y1.interest_paid - y1.mortgage_payment).abs() < dec!(0.0001));
        assert_eq!(y1.equity, y1.property_value - y1.remaining_loan_balance);
    }

    #[test]
    fn test_projection_length_and_totals() {
        let out = total_cost_of_ownership(&sample_input()).unwrap().result;
        assert_eq!(out.yearly_data.len(), 10);
        let last = out.yearly_data.last().unwrap();
        assert_eq!(out.final_property_value, last.property_value);
        assert_eq!(out.total_equity_built, last.equity);
        assert_eq!(out.loan_paid, out.loan_amount - last.remaining_loan_balance);
        let summed: Money = out.yearly_data.iter().map(|y| y.total_costs).sum();
        assert_eq!(out.total_cost_of_ownership, summed);
    }

    #[test]
    fn test_balance_declines_each_year() {
        let out = total_cost_of_ownership(&sample_input()).unwrap().result;
        for pair in out.yearly_data.windows(2) {
            assert!(pair[1].remaining_loan_balance < pair[0].remaining_loan_balance);
        }
    }

    #[test]
    fn test_holding_beyond_term_stops_payments() {
        let mut input = sample_input();
        input.term_years = 5;
        input.holding_years = 8;
        let result = total_cost_of_ownership(&input).unwrap();
        let out = &result.result;

        assert_eq!(out.yearly_data[5].mortgage_payment, Decimal::ZERO);
        assert_eq!(out.yearly_data[7].principal_paid, Decimal::ZERO);
        assert!(out.yearly_data[7].remaining_loan_balance < dec!(0.000001));
        assert!((out.loan_paid - dec!(64000)).abs() < dec!(0.000001));
        assert!(result.warnings.iter().any(|w| w.contains("repaid in year 5")));
    }

    #[test]
    fn test_all_cash_purchase() {
        let mut input = sample_input();
        input.down_payment_percent = Rate::ONE;
        let out = total_cost_of_ownership(&input).unwrap().result;
        assert_eq!(out.monthly_payment, Decimal::ZERO);
        assert_eq!(out.yearly_data[0].equity, out.yearly_data[0].property_value);
    }

    #[test]
    fn test_zero_holding_period_rejected() {
        let mut input = sample_input();
        input.holding_years = 0;
        assert!(total_cost_of_ownership(&input).is_err());
    }

    #[test]
    fn test_unbounded_appreciation_is_an_error() {
        let mut input = sample_input();
        input.appreciation_rate = Rate::new(dec!(1.0));
        input.holding_years = 100;
        let err = total_cost_of_ownership(&input).unwrap_err();
        assert!(matches!(
            err,
            PropertyInvestError::InvalidInput { ref field, .. } if field == "appreciation_rate"
        ));
    }
}
