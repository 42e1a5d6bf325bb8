use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PropertyInvestError;
use crate::types::{Money, Multiple, Rate};
use crate::PropertyInvestResult;

/// Rent-to-price ratio a property must reach to pass the one-percent rule.
const ONE_PERCENT: Decimal = dec!(0.01);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One-percent rule check: monthly rent against 1% of the purchase price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OnePercentRule {
    /// 1% of the purchase price, in currency
    pub threshold: Money,
    /// Monthly rent / purchase price
    pub actual_ratio: Decimal,
    pub is_passing: bool,
}

/// Occupancy needed to cover costs, and the shortfall at lower occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakEvenAnalysis {
    /// Costs / income, capped at 100%
    pub break_even_occupancy: Rate,
    pub cash_needed_at_90: Money,
    pub cash_needed_at_80: Money,
    pub cash_needed_at_70: Money,
}

/// Return on investment over a holding period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiResult {
    pub total_roi: Rate,
    /// Compound annual equivalent; `None` when the whole investment is lost
    pub annualized_roi: Option<Rate>,
    pub future_value: Money,
    pub total_appreciation: Money,
    pub total_cash_flow: Money,
    pub total_return: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Capitalisation rate: NOI / property value.
pub fn cap_rate(noi: Money, property_value: Money) -> PropertyInvestResult<Rate> {
    if property_value <= Decimal::ZERO {
        return Err(PropertyInvestError::invalid(
            "property_value",
            "Property value must be positive",
        ));
    }
    Ok(Rate::new(noi / property_value))
}

/// Cash-on-cash return: annual pre-tax cash flow / cash invested.
pub fn cash_on_cash(
    annual_cash_flow: Money,
    initial_cash_investment: Money,
) -> PropertyInvestResult<Rate> {
    if initial_cash_investment <= Decimal::ZERO {
        return Err(PropertyInvestError::invalid(
            "initial_cash_investment",
            "Cash investment must be positive",
        ));
    }
    Ok(Rate::new(annual_cash_flow / initial_cash_investment))
}

/// Debt service coverage ratio: NOI / annual debt service.
pub fn dscr(annual_noi: Money, annual_debt_service: Money) -> PropertyInvestResult<Multiple> {
    if annual_debt_service <= Decimal::ZERO {
        return Err(PropertyInvestError::DivisionByZero {
            context: "DSCR (NOI / debt service)".into(),
        });
    }
    Ok(annual_noi / annual_debt_service)
}

/// Gross rent multiplier: price / annual gross rent.
pub fn grm(price: Money, annual_gross_rent: Money) -> PropertyInvestResult<Multiple> {
    if annual_gross_rent <= Decimal::ZERO {
        return Err(PropertyInvestError::invalid(
            "annual_gross_rent",
            "Annual gross rent must be positive",
        ));
    }
    Ok(price / annual_gross_rent)
}

/// Passes when monthly rent is at least 1% of the price (inclusive).
pub fn one_percent_rule(
    monthly_rent: Money,
    purchase_price: Money,
) -> PropertyInvestResult<OnePercentRule> {
    if purchase_price <= Decimal::ZERO {
        return Err(PropertyInvestError::invalid(
            "purchase_price",
            "Purchase price must be positive",
        ));
    }
    let threshold = purchase_price * ONE_PERCENT;
    Ok(OnePercentRule {
        threshold,
        actual_ratio: monthly_rent / purchase_price,
        is_passing: monthly_rent >= threshold,
    })
}

pub fn break_even(
    monthly_costs: Money,
    monthly_rental_income: Money,
) -> PropertyInvestResult<BreakEvenAnalysis> {
    if monthly_rental_income <= Decimal::ZERO {
        return Err(PropertyInvestError::invalid(
            "monthly_rental_income",
            "Monthly rental income must be positive",
        ));
    }

    let shortfall_at = |occupancy: Decimal| {
        (monthly_costs - monthly_rental_income * occupancy).max(Decimal::ZERO)
    };

    Ok(BreakEvenAnalysis {
        break_even_occupancy: Rate::new((monthly_costs / monthly_rental_income).min(Decimal::ONE)),
        cash_needed_at_90: shortfall_at(dec!(0.9)),
        cash_needed_at_80: shortfall_at(dec!(0.8)),
        cash_needed_at_70: shortfall_at(dec!(0.7)),
    })
}

/// ROI from appreciation plus a flat annual cash flow, measured against
/// `invested_capital`.
pub fn return_on_investment(
    invested_capital: Money,
    purchase_price: Money,
    annual_cash_flow: Money,
    appreciation_rate: Rate,
    years: u32,
) -> PropertyInvestResult<RoiResult> {
    if invested_capital <= Decimal::ZERO {
        return Err(PropertyInvestError::invalid(
            "invested_capital",
            "Invested capital must be positive",
        ));
    }
    if years == 0 {
        return Err(PropertyInvestError::invalid(
            "years",
            "Holding period must be at least 1 year",
        ));
    }

    let out_of_range = || {
        PropertyInvestError::invalid(
            "appreciation_rate",
            format!("Return over {years} years exceeds the representable range"),
        )
    };

    let future_value = (Decimal::ONE + appreciation_rate.as_decimal())
        .checked_powu(u64::from(years))
        .and_then(|growth| purchase_price.checked_mul(growth))
        .ok_or_else(out_of_range)?;
    let total_appreciation = future_value - purchase_price;
    let total_cash_flow = annual_cash_flow
        .checked_mul(Decimal::from(years))
        .ok_or_else(out_of_range)?;
    let total_return = total_appreciation
        .checked_add(total_cash_flow)
        .ok_or_else(out_of_range)?;
    let total_roi = total_return
        .checked_div(invested_capital)
        .ok_or_else(out_of_range)?;

    let annualized_roi = Decimal::ONE
        .checked_add(total_roi)
        .filter(|base| *base > Decimal::ZERO)
        .and_then(|base| base.checked_powd(Decimal::ONE / Decimal::from(years)))
        .map(|g| Rate::new(g - Decimal::ONE));

    Ok(RoiResult {
        total_roi: Rate::new(total_roi),
        annualized_roi,
        future_value,
        total_appreciation,
        total_cash_flow,
        total_return,
    })
}

/// Cash-flow ROI: cash flow plus equity build-up, appreciation and tax
/// benefits, over the initial investment.
pub fn cash_flow_roi(
    annual_cash_flow: Money,
    principal_reduction: Money,
    annual_appreciation: Money,
    tax_benefits: Money,
    initial_investment: Money,
) -> PropertyInvestResult<Rate> {
    if initial_investment <= Decimal::ZERO {
        return Err(PropertyInvestError::invalid(
            "initial_investment",
            "Initial investment must be positive",
        ));
    }
    let total = annual_cash_flow + principal_reduction + annual_appreciation + tax_benefits;
    Ok(Rate::new(total / initial_investment))
}
