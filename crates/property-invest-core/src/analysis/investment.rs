use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::analysis::scoring::{score, InvestmentScore, ScoreInput};
use crate::analysis::{monthly_cash_flow, MonthlyCashFlow, PropertyScenario};
use crate::error::PropertyInvestError;
use crate::mortgage::ownership::{project_ownership, OwnershipOutput};
use crate::ratios::depreciation::{depreciation_tax_benefit, DepreciationBenefit, DepreciationInput};
use crate::ratios::income::{
    break_even, cap_rate, cash_flow_roi, cash_on_cash, dscr, grm, one_percent_rule,
    return_on_investment, BreakEvenAnalysis, OnePercentRule, RoiResult,
};
use crate::time_value::{irr, mirr, npv, payback_period, IrrOptions};
use crate::types::{with_metadata, ComputationOutput, Money, Multiple, Rate};
use crate::PropertyInvestResult;

const DSCR_COVENANT: Decimal = dec!(1.2);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Year-one annual income and operating expenses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncomeBreakdown {
    pub gross_annual_rent: Money,
    pub vacancy_loss: Money,
    pub effective_annual_income: Money,
    pub management_fees: Money,
    /// Management, tax, insurance, maintenance and HOA
    pub operating_expenses: Money,
    pub net_operating_income: Money,
    pub annual_debt_service: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentMetrics {
    /// NOI / purchase price
    pub cap_rate: Rate,
    pub cash_on_cash: Rate,
    pub npv: Money,
    pub irr: Option<Rate>,
    /// Loan rate as finance rate, discount rate as reinvestment rate
    pub mirr: Option<Rate>,
    /// ROI on the down payment
    pub roi: RoiResult,
    /// Year-one cash flow, principal, appreciation and tax benefit over the
    /// down payment
    pub cash_flow_roi: Rate,
    /// Years until cumulative cash flow recovers the down payment
    pub payback_period: Option<u32>,
    /// `None` when there is no debt
    pub dscr: Option<Multiple>,
    pub grm: Multiple,
    pub one_percent_rule: OnePercentRule,
    pub break_even: BreakEvenAnalysis,
}

/// Full investment analysis of one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyAnalysis {
    pub down_payment: Money,
    pub loan_amount: Money,
    pub monthly_mortgage_payment: Money,
    pub income: IncomeBreakdown,
    pub annual_cash_flow: Money,
    pub monthly_cash_flow: Money,
    /// Cash flow per holding year; the last year includes net sale proceeds
    pub annual_cash_flows: Vec<Money>,
    pub net_sale_proceeds: Money,
    pub ownership: OwnershipOutput,
    pub metrics: InvestmentMetrics,
    pub depreciation: DepreciationBenefit,
    pub score: InvestmentScore,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Analyse a rental purchase end to end: income, NOI, yearly cash flows
/// through sale, return metrics and the composite score.
pub fn analyze_property(
    scenario: &PropertyScenario,
) -> PropertyInvestResult<ComputationOutput<PropertyAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    scenario.validate()?;
    let down_payment = scenario.down_payment();
    if down_payment <= Decimal::ZERO {
        return Err(PropertyInvestError::invalid(
            "down_payment_percent",
            "Return metrics need a positive down payment",
        ));
    }
    if scenario.monthly_rent <= Decimal::ZERO {
        return Err(PropertyInvestError::invalid(
            "monthly_rent",
            "Monthly rent must be positive",
        ));
    }

    // --- Year-one income and expenses ---
    let monthly = monthly_cash_flow(scenario)?;
    let twelve = dec!(12);

    let gross_annual_rent = monthly.gross_rent * twelve;
    let vacancy_loss = monthly.vacancy_loss * twelve;
    let effective_annual_income = monthly.effective_rent * twelve;
    let management_fees = monthly.management_fee * twelve;
    let operating_expenses = management_fees
        + (monthly.property_tax + monthly.insurance + monthly.maintenance + monthly.hoa) * twelve;
    let net_operating_income = effective_annual_income - operating_expenses;
    let annual_debt_service = monthly.mortgage_payment * twelve;
    let annual_cash_flow = net_operating_income - annual_debt_service;

    let income = IncomeBreakdown {
        gross_annual_rent,
        vacancy_loss,
        effective_annual_income,
        management_fees,
        operating_expenses,
        net_operating_income,
        annual_debt_service,
    };

    // --- Holding-period cash flows ---
    let ownership = project_ownership(&scenario.ownership_input(), &mut warnings)?;
    let rental_margin = effective_annual_income - management_fees;
    let mut annual_cash_flows: Vec<Money> = ownership
        .yearly_data
        .iter()
        .map(|year| rental_margin - year.total_costs)
        .collect();

    let final_balance = ownership
        .yearly_data
        .last()
        .map_or(ownership.loan_amount, |y| y.remaining_loan_balance);
    let net_sale_proceeds = ownership.final_property_value - final_balance;
    if let Some(last) = annual_cash_flows.last_mut() {
        *last += net_sale_proceeds;
    }

    // --- Metrics ---
    let price = scenario.purchase_price;
    let has_debt = annual_debt_service > Decimal::ZERO;

    let irr_value = irr(down_payment, &annual_cash_flows, &IrrOptions::default())?;
    let year_one = ownership.yearly_data.first();
    let depreciation = depreciation_tax_benefit(&DepreciationInput::for_price(price))?;

    let metrics = InvestmentMetrics {
        cap_rate: cap_rate(net_operating_income, price)?,
        cash_on_cash: cash_on_cash(annual_cash_flow, down_payment)?,
        npv: npv(down_payment, &annual_cash_flows, scenario.discount_rate)?,
        irr: irr_value,
        mirr: mirr(
            down_payment,
            &annual_cash_flows,
            scenario.annual_interest_rate,
            scenario.discount_rate,
        )?,
        roi: return_on_investment(
            down_payment,
            price,
            annual_cash_flow,
            scenario.appreciation_rate,
            scenario.holding_years,
        )?,
        cash_flow_roi: cash_flow_roi(
            annual_cash_flow,
            year_one.map_or(Decimal::ZERO, |y| y.principal_paid),
            year_one.map_or(Decimal::ZERO, |y| y.property_value - price),
            depreciation.annual_tax_benefit,
            down_payment,
        )?,
        payback_period: payback_period(down_payment, &annual_cash_flows),
        dscr: if has_debt {
            Some(dscr(net_operating_income, annual_debt_service)?)
        } else {
            None
        },
        grm: grm(price, gross_annual_rent)?,
        one_percent_rule: one_percent_rule(scenario.monthly_rent, price)?,
        break_even: break_even(monthly_costs(&monthly), monthly.gross_rent)?,
    };

    let investment_score = score(&ScoreInput {
        cash_on_cash: metrics.cash_on_cash,
        cap_rate: metrics.cap_rate,
        irr: metrics.irr,
        dscr: metrics.dscr,
        one_percent_rule: metrics.one_percent_rule,
        appreciation_rate: scenario.appreciation_rate,
    });

    // --- Warnings ---
    if annual_cash_flow < Decimal::ZERO {
        warnings.push(format!(
            "Negative cash flow of {:.2} per month in year one",
            monthly.net_cash_flow
        ));
    }
    if let Some(d) = metrics.dscr {
        if d < DSCR_COVENANT {
            warnings.push(format!(
                "DSCR of {d:.2}x is below the 1.20x most lenders require"
            ));
        }
    }
    if !metrics.one_percent_rule.is_passing {
        warnings.push(format!(
            "Rent is {:.2}% of price, below the 1% rule",
            metrics.one_percent_rule.actual_ratio * dec!(100)
        ));
    }
    if metrics.irr.is_none() {
        warnings.push("IRR did not converge; IRR component scored 0".into());
    }

    let output = PropertyAnalysis {
        down_payment,
        loan_amount: scenario.loan_amount(),
        monthly_mortgage_payment: monthly.mortgage_payment,
        income,
        annual_cash_flow,
        monthly_cash_flow: monthly.net_cash_flow,
        annual_cash_flows,
        net_sale_proceeds,
        ownership,
        metrics,
        depreciation,
        score: investment_score,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Rental Property Investment Analysis (levered, hold-and-sell)",
        scenario,
        warnings,
        elapsed,
        output,
    ))
}

/// Every monthly outgoing, including debt service.
fn monthly_costs(cf: &MonthlyCashFlow) -> Money {
    cf.management_fee
        + cf.mortgage_payment
        + cf.property_tax
        + cf.insurance
        + cf.maintenance
        + cf.hoa
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cash_flowing() -> PropertyScenario {
        PropertyScenario {
            monthly_rent: dec!(1000),
            ..PropertyScenario::default()
        }
    }

    #[test]
    fn test_noi_excludes_debt_service() {
        let out = analyze_property(&cash_flowing()).unwrap().result;
        let inc = &out.income;
        assert_eq!(inc.gross_annual_rent, dec!(12000));
        assert_eq!(inc.vacancy_loss, dec!(600));
        assert_eq!(inc.effective_annual_income, dec!(11400));
        assert_eq!(inc.management_fees, dec!(1140));
        assert_eq!(
            inc.net_operating_income,
            inc.effective_annual_income - inc.operating_expenses
        );
        assert_eq!(out.annual_cash_flow, inc.net_operating_income - inc.annual_debt_service);
    }

    #[test]
    fn test_year_one_flow_matches_annual_cash_flow() {
        let out = analyze_property(&cash_flowing()).unwrap().result;
        assert_eq!(out.annual_cash_flows.len(), 10);
        assert!((out.annual_cash_flows[0] - out.annual_cash_flow).abs() < dec!(0.0001));
        assert!((out.monthly_cash_flow * dec!(12) - out.annual_cash_flow).abs() < dec!(0.0001));
    }

    #[test]
    fn test_sale_proceeds_net_of_loan() {
        let out = analyze_property(&cash_flowing()).unwrap().result;
        let last = out.ownership.yearly_data.last().unwrap();
        assert_eq!(
            out.net_sale_proceeds,
            last.property_value - last.remaining_loan_balance
        );
        let operating = out.annual_cash_flows[9] - out.net_sale_proceeds;
        assert!(operating < out.net_sale_proceeds);
    }

    #[test]
    fn test_metrics_populated() {
        let result = analyze_property(&cash_flowing()).unwrap();
        let m = &result.result.metrics;
        assert!(m.irr.unwrap().as_decimal() > Decimal::ZERO);
        assert!(m.mirr.is_some());
        assert!(m.dscr.unwrap() > Decimal::ONE);
        assert!(m.one_percent_rule.is_passing);
        assert_eq!(m.grm, dec!(80000) / dec!(12000));
        assert!(m.payback_period.is_some());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_long_hold_at_high_discount_rate() {
        let scenario = PropertyScenario {
            discount_rate: Rate::new(dec!(0.5)),
            holding_years: 200,
            ..cash_flowing()
        };
        let out = analyze_property(&scenario).unwrap().result;
        assert_eq!(out.annual_cash_flows.len(), 200);
        // 1.5^199 compounding leaves the Decimal range
        assert!(out.metrics.mirr.is_none());
    }

    #[test]
    fn test_default_scenario_warns() {
        let result = analyze_property(&PropertyScenario::default()).unwrap();
        assert!(result.result.annual_cash_flow < Decimal::ZERO);
        assert!(result.warnings.iter().any(|w| w.contains("Negative cash flow")));
        assert!(result.warnings.iter().any(|w| w.contains("1% rule")));
        assert!(result.warnings.iter().any(|w| w.contains("DSCR")));
    }

    #[test]
    fn test_all_cash_purchase_has_no_dscr() {
        let scenario = PropertyScenario {
            down_payment_percent: Rate::ONE,
            ..cash_flowing()
        };
        let out = analyze_property(&scenario).unwrap().result;
        assert!(out.metrics.dscr.is_none());
        assert_eq!(out.score.component_scores.dscr, dec!(100));
    }

    #[test]
    fn test_zero_down_rejected() {
        let scenario = PropertyScenario {
            down_payment_percent: Rate::ZERO,
            ..PropertyScenario::default()
        };
        assert!(analyze_property(&scenario).is_err());
    }
}
