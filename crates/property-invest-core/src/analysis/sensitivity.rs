use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::analysis::{monthly_cash_flow, PropertyScenario};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::PropertyInvestResult;

const PERCENT_GRID: [Decimal; 5] = [dec!(-10), dec!(-5), dec!(0), dec!(5), dec!(10)];
const INTEREST_GRID: [Decimal; 5] = [dec!(-1), dec!(-0.5), dec!(0), dec!(0.5), dec!(1)];
const VACANCY_GRID: [Decimal; 5] = [dec!(-3), dec!(-2), dec!(0), dec!(2), dec!(3)];
const APPRECIATION_GRID: [Decimal; 5] = [dec!(-2), dec!(-1), dec!(0), dec!(1), dec!(2)];
/// Lowest appreciation a perturbed scenario may carry; at -100% the
/// property is worth nothing.
const APPRECIATION_FLOOR: Decimal = dec!(-0.99);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityParameter {
    PurchasePrice,
    InterestRate,
    RentalIncome,
    VacancyRate,
    AppreciationRate,
}

impl SensitivityParameter {
    /// Every axis, in reporting order.
    pub const ALL: [SensitivityParameter; 5] = [
        SensitivityParameter::PurchasePrice,
        SensitivityParameter::InterestRate,
        SensitivityParameter::RentalIncome,
        SensitivityParameter::VacancyRate,
        SensitivityParameter::AppreciationRate,
    ];

    pub fn unit(&self) -> VariationUnit {
        match self {
            SensitivityParameter::PurchasePrice | SensitivityParameter::RentalIncome => {
                VariationUnit::Percent
            }
            _ => VariationUnit::PercentagePoints,
        }
    }

    fn grid(&self) -> &'static [Decimal; 5] {
        match self {
            SensitivityParameter::PurchasePrice | SensitivityParameter::RentalIncome => {
                &PERCENT_GRID
            }
            SensitivityParameter::InterestRate => &INTEREST_GRID,
            SensitivityParameter::VacancyRate => &VACANCY_GRID,
            SensitivityParameter::AppreciationRate => &APPRECIATION_GRID,
        }
    }
}

/// How a variation is applied to the base value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariationUnit {
    /// Relative change: value * (1 + v/100)
    Percent,
    /// Absolute change: rate + v/100
    PercentagePoints,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub variation: Decimal,
    /// Parameter value actually used, after clamping
    pub parameter_value: Decimal,
    pub monthly_cash_flow: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityAxis {
    pub parameter: SensitivityParameter,
    pub unit: VariationUnit,
    pub points: Vec<SensitivityPoint>,
    /// Best minus worst monthly cash flow on this axis
    pub swing: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityResult {
    pub base_monthly_cash_flow: Money,
    pub axes: Vec<SensitivityAxis>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// One-way sensitivity of year-one monthly cash flow to price, interest
/// rate, rent, vacancy and appreciation.
///
/// Each point is an independent scenario: the mortgage payment and cash
/// flow are recomputed from scratch with one parameter moved.
pub fn sensitivity_analysis(
    scenario: &PropertyScenario,
) -> PropertyInvestResult<ComputationOutput<SensitivityResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let base_monthly_cash_flow = monthly_cash_flow(scenario)?.net_cash_flow;

    let mut axes = Vec::with_capacity(SensitivityParameter::ALL.len());
    for parameter in SensitivityParameter::ALL {
        let mut points = Vec::with_capacity(5);
        for &variation in parameter.grid() {
            let (perturbed, parameter_value) =
                perturb(scenario, parameter, variation, &mut warnings);
            points.push(SensitivityPoint {
                variation,
                parameter_value,
                monthly_cash_flow: monthly_cash_flow(&perturbed)?.net_cash_flow,
            });
        }
        axes.push(SensitivityAxis {
            parameter,
            unit: parameter.unit(),
            swing: swing(&points),
            points,
        });
    }

    let output = SensitivityResult {
        base_monthly_cash_flow,
        axes,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "One-Way Sensitivity of Monthly Cash Flow",
        scenario,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Scenario with one parameter moved, plus the value used for it.
fn perturb(
    base: &PropertyScenario,
    parameter: SensitivityParameter,
    variation: Decimal,
    warnings: &mut Vec<String>,
) -> (PropertyScenario, Decimal) {
    let mut s = base.clone();
    let factor = Decimal::ONE + variation / dec!(100);

    let value = match parameter {
        SensitivityParameter::PurchasePrice => {
            s.purchase_price = base.purchase_price * factor;
            s.purchase_price
        }
        SensitivityParameter::RentalIncome => {
            s.monthly_rent = base.monthly_rent * factor;
            s.monthly_rent
        }
        SensitivityParameter::InterestRate => {
            let shifted = base.annual_interest_rate.shift_points(variation);
            s.annual_interest_rate = clamp_rate(shifted, "interest rate", warnings);
            s.annual_interest_rate.as_decimal()
        }
        SensitivityParameter::VacancyRate => {
            let shifted = base.vacancy_rate.shift_points(variation);
            s.vacancy_rate = clamp_rate(shifted, "vacancy rate", warnings);
            s.vacancy_rate.as_decimal()
        }
        SensitivityParameter::AppreciationRate => {
            let shifted = base.appreciation_rate.shift_points(variation);
            s.appreciation_rate = if shifted.as_decimal() < APPRECIATION_FLOOR {
                let floored = Rate::new(APPRECIATION_FLOOR);
                warnings.push(format!(
                    "Perturbed appreciation rate {shifted} clamped to {floored}"
                ));
                floored
            } else {
                shifted
            };
            s.appreciation_rate.as_decimal()
        }
    };

    (s, value)
}

/// Clamp a perturbed rate into [0, 1].
fn clamp_rate(rate: Rate, name: &str, warnings: &mut Vec<String>) -> Rate {
    let clamped = Rate::new(rate.as_decimal().clamp(Decimal::ZERO, Decimal::ONE));
    if clamped != rate {
        warnings.push(format!("Perturbed {name} {rate} clamped to {clamped}"));
    }
    clamped
}

fn swing(points: &[SensitivityPoint]) -> Money {
    let flows = points.iter().map(|p| p.monthly_cash_flow);
    match (flows.clone().max(), flows.min()) {
        (Some(hi), Some(lo)) => hi - lo,
        _ => Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axes_in_fixed_order() {
        let out = sensitivity_analysis(&PropertyScenario::default()).unwrap().result;
        let order: Vec<_> = out.axes.iter().map(|a| a.parameter).collect();
        assert_eq!(order, SensitivityParameter::ALL.to_vec());
        assert!(out.axes.iter().all(|a| a.points.len() == 5));
    }

    #[test]
    fn test_zero_variation_matches_base() {
        let out = sensitivity_analysis(&PropertyScenario::default()).unwrap().result;
        for axis in &out.axes {
            assert_eq!(axis.points[2].variation, Decimal::ZERO);
            let diff = axis.points[2].monthly_cash_flow - out.base_monthly_cash_flow;
            assert!(diff.abs() < dec!(0.0000001));
        }
    }

    #[test]
    fn test_directions() {
        let out = sensitivity_analysis(&PropertyScenario::default()).unwrap().result;
        let cash_flows = |i: usize| -> Vec<Money> {
            out.axes[i].points.iter().map(|p| p.monthly_cash_flow).collect()
        };
        // Higher price or rate costs money; higher rent earns it
        let price = cash_flows(0);
        assert!(price[0] > price[4]);
        let rate = cash_flows(1);
        assert!(rate[0] > rate[4]);
        let rent = cash_flows(2);
        assert!(rent[4] > rent[0]);
        let vacancy = cash_flows(3);
        assert!(vacancy[0] > vacancy[4]);
        // Value-linked costs rise with appreciation
        let appreciation = cash_flows(4);
        assert!(appreciation[0] > appreciation[4]);
    }

    #[test]
    fn test_swing_is_max_minus_min() {
        let out = sensitivity_analysis(&PropertyScenario::default()).unwrap().result;
        let rent = &out.axes[2];
        assert_eq!(
            rent.swing,
            rent.points[4].monthly_cash_flow - rent.points[0].monthly_cash_flow
        );
        assert!(rent.swing > Decimal::ZERO);
    }

    #[test]
    fn test_rates_clamped_at_zero() {
        let scenario = PropertyScenario {
            annual_interest_rate: Rate::new(dec!(0.005)),
            vacancy_rate: Rate::new(dec!(0.01)),
            ..PropertyScenario::default()
        };
        let result = sensitivity_analysis(&scenario).unwrap();
        let rate_axis = &result.result.axes[1];
        assert_eq!(rate_axis.points[0].parameter_value, Decimal::ZERO);
        let vacancy_axis = &result.result.axes[3];
        assert_eq!(vacancy_axis.points[0].parameter_value, Decimal::ZERO);
        assert!(result.warnings.iter().any(|w| w.contains("interest rate")));
        assert!(result.warnings.iter().any(|w| w.contains("vacancy rate")));
    }

    #[test]
    fn test_appreciation_floored_above_total_loss() {
        let scenario = PropertyScenario {
            appreciation_rate: Rate::new(dec!(-0.985)),
            ..PropertyScenario::default()
        };
        let result = sensitivity_analysis(&scenario).unwrap();
        let axis = &result.result.axes[4];
        assert_eq!(axis.points[0].parameter_value, dec!(-0.99));
        assert_eq!(axis.points[1].parameter_value, dec!(-0.99));
        assert!(axis.points.iter().all(|p| p.parameter_value > dec!(-1)));
        assert!(result.warnings.iter().any(|w| w.contains("appreciation rate")));
    }
}
