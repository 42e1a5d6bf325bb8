use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PropertyInvestError;
use crate::types::{Money, Rate};
use crate::PropertyInvestResult;

const DEFAULT_IRR_GUESS: Decimal = dec!(0.10);
const DEFAULT_IRR_TOLERANCE: Decimal = dec!(0.0001);
const DEFAULT_MAX_IRR_ITERATIONS: u32 = 100;

/// Solver settings for [`irr`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct IrrOptions {
    /// Starting rate for Newton-Raphson (default 10%)
    pub guess: Rate,
    /// Converged once |NPV| falls below this amount (default 0.0001)
    pub tolerance: Decimal,
    /// Iteration cap before giving up (default 100)
    pub max_iterations: u32,
}

impl Default for IrrOptions {
    fn default() -> Self {
        IrrOptions {
            guess: Rate::new(DEFAULT_IRR_GUESS),
            tolerance: DEFAULT_IRR_TOLERANCE,
            max_iterations: DEFAULT_MAX_IRR_ITERATIONS,
        }
    }
}

/// Net Present Value of an investment followed by end-of-period cash flows.
///
/// `initial_investment` is a positive outflow at t=0; `cash_flows[i]` lands at
/// the end of period i+1.
pub fn npv(
    initial_investment: Money,
    cash_flows: &[Money],
    discount_rate: Rate,
) -> PropertyInvestResult<Money> {
    let rate = discount_rate.as_decimal();
    if rate <= dec!(-1) {
        return Err(PropertyInvestError::invalid(
            "discount_rate",
            "Discount rate must be greater than -100%",
        ));
    }

    let one_plus_r = Decimal::ONE + rate;
    let mut result = -initial_investment;
    let mut discount = Decimal::ONE;

    for (i, cf) in cash_flows.iter().enumerate() {
        discount = match discount.checked_mul(one_plus_r) {
            Some(d) => d,
            // Remaining terms are below Decimal precision
            None => break,
        };
        let pv = cf
            .checked_div(discount)
            .ok_or_else(|| PropertyInvestError::DivisionByZero {
                context: format!("NPV discount factor at period {}", i + 1),
            })?;
        result += pv;
    }

    Ok(result)
}

/// Internal Rate of Return using Newton-Raphson.
///
/// Returns `Ok(None)` when the solver cannot produce a rate: the derivative
/// hits exactly zero, the rate falls below -100%, the arithmetic overflows,
/// or the iteration cap is reached. `None` is not a zero return.
pub fn irr(
    initial_investment: Money,
    cash_flows: &[Money],
    options: &IrrOptions,
) -> PropertyInvestResult<Option<Rate>> {
    if cash_flows.is_empty() {
        return Err(PropertyInvestError::InsufficientData(
            "IRR requires at least 1 periodic cash flow".into(),
        ));
    }
    if options.tolerance <= Decimal::ZERO {
        return Err(PropertyInvestError::invalid(
            "tolerance",
            "IRR tolerance must be positive",
        ));
    }

    let mut rate = options.guess.as_decimal();

    for iteration in 0..options.max_iterations {
        let Some((npv_val, dnpv)) = npv_and_derivative(initial_investment, cash_flows, rate)
        else {
            debug!(iteration, %rate, "IRR: arithmetic overflow, giving up");
            return Ok(None);
        };

        if npv_val.abs() < options.tolerance {
            debug!(iteration, %rate, "IRR converged");
            return Ok(Some(Rate::new(rate)));
        }

        if dnpv.is_zero() {
            debug!(iteration, %rate, "IRR: zero derivative");
            return Ok(None);
        }

        let Some(next) = npv_val.checked_div(dnpv).and_then(|step| rate.checked_sub(step))
        else {
            debug!(iteration, %rate, "IRR: step overflow");
            return Ok(None);
        };
        rate = next;

        if rate < dec!(-1) {
            debug!(iteration, %rate, "IRR: rate below -100%");
            return Ok(None);
        }
    }

    debug!(max_iterations = options.max_iterations, %rate, "IRR did not converge");
    Ok(None)
}

/// NPV(r) and d(NPV)/dr, or `None` on overflow or a non-positive 1+r.
fn npv_and_derivative(
    initial_investment: Money,
    cash_flows: &[Money],
    rate: Decimal,
) -> Option<(Decimal, Decimal)> {
    let one_plus_r = Decimal::ONE.checked_add(rate)?;
    if one_plus_r <= Decimal::ZERO {
        return None;
    }

    let mut npv = -initial_investment;
    let mut dnpv = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (i, cf) in cash_flows.iter().enumerate() {
        let t = Decimal::from(i as u64 + 1);
        discount = discount.checked_mul(one_plus_r)?;
        let pv = cf.checked_div(discount)?;
        npv = npv.checked_add(pv)?;
        // d/dr of CF_t / (1+r)^t = -t * CF_t / (1+r)^(t+1)
        let d = t.checked_mul(pv)?.checked_div(one_plus_r)?;
        dnpv = dnpv.checked_sub(d)?;
    }

    Some((npv, dnpv))
}

/// Modified Internal Rate of Return.
///
/// Positive flows are compounded to the final period at `reinvest_rate`;
/// negative flows are discounted to t=0 at `finance_rate` and added to the
/// initial investment. Returns `Ok(None)` if either side is empty or the
/// compounded inflows leave the `Decimal` range.
pub fn mirr(
    initial_investment: Money,
    cash_flows: &[Money],
    finance_rate: Rate,
    reinvest_rate: Rate,
) -> PropertyInvestResult<Option<Rate>> {
    if cash_flows.is_empty() {
        return Err(PropertyInvestError::InsufficientData(
            "MIRR requires at least 1 periodic cash flow".into(),
        ));
    }
    if finance_rate.as_decimal() <= dec!(-1) || reinvest_rate.as_decimal() <= dec!(-1) {
        return Err(PropertyInvestError::invalid(
            "finance_rate/reinvest_rate",
            "Rates must be greater than -100%",
        ));
    }

    let n = cash_flows.len();
    let one_plus_fin = Decimal::ONE + finance_rate.as_decimal();
    let one_plus_re = Decimal::ONE + reinvest_rate.as_decimal();

    let mut positive_fv = Decimal::ZERO;
    let mut negative_pv = Decimal::ZERO;

    for (i, cf) in cash_flows.iter().enumerate() {
        if *cf > Decimal::ZERO {
            let compounded = one_plus_re
                .checked_powu((n - i - 1) as u64)
                .and_then(|growth| cf.checked_mul(growth))
                .and_then(|fv| positive_fv.checked_add(fv));
            match compounded {
                Some(total) => positive_fv = total,
                None => {
                    debug!(period = i + 1, "MIRR: reinvestment growth overflowed");
                    return Ok(None);
                }
            }
        } else if *cf < Decimal::ZERO {
            // Outflows discounted past the Decimal range are below its precision
            let Some(pv) = one_plus_fin
                .checked_powu((i + 1) as u64)
                .and_then(|discount| cf.checked_div(discount))
            else {
                continue;
            };
            match negative_pv.checked_add(pv) {
                Some(total) => negative_pv = total,
                None => {
                    debug!(period = i + 1, "MIRR: discounted outflows overflowed");
                    return Ok(None);
                }
            }
        }
    }

    let total_outflow = negative_pv.abs() + initial_investment;
    if positive_fv <= Decimal::ZERO || total_outflow <= Decimal::ZERO {
        return Ok(None);
    }

    let exponent = Decimal::ONE / Decimal::from(n as u64);
    let growth = positive_fv
        .checked_div(total_outflow)
        .and_then(|multiple| multiple.checked_powd(exponent));
    Ok(growth.map(|g| Rate::new(g - Decimal::ONE)))
}

/// Number of whole periods until the cumulative cash position turns
/// non-negative, or `None` if it never does.
pub fn payback_period(initial_investment: Money, cash_flows: &[Money]) -> Option<u32> {
    let mut cumulative = -initial_investment;
    for (i, cf) in cash_flows.iter().enumerate() {
        cumulative += *cf;
        if cumulative >= Decimal::ZERO {
            return Some(i as u32 + 1);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_npv_basic() {
        let cfs = vec![dec!(300), dec!(400), dec!(500)];
        let result = npv(dec!(1000), &cfs, Rate::new(dec!(0.10))).unwrap();
        // -1000 + 300/1.1 + 400/1.21 + 500/1.331 ≈ -21.04
        assert!((result - dec!(-21.04)).abs() < dec!(0.01));
    }

    #[test]
    fn test_npv_zero_rate() {
        let cfs = vec![dec!(50), dec!(50), dec!(50)];
        let result = npv(dec!(100), &cfs, Rate::ZERO).unwrap();
        assert_eq!(result, dec!(50));
    }

    #[test]
    fn test_npv_rejects_total_loss_rate() {
        assert!(npv(dec!(100), &[dec!(50)], Rate::new(dec!(-1))).is_err());
    }

    #[test]
    fn test_irr_basic() {
        let cfs = vec![dec!(400), dec!(400), dec!(400)];
        let result = irr(dec!(1000), &cfs, &IrrOptions::default())
            .unwrap()
            .unwrap();
        // IRR ≈ 9.7%
        assert!((result.as_decimal() - dec!(0.097)).abs() < dec!(0.001));
    }

    #[test]
    fn test_irr_no_sign_change_is_none() {
        // Outflows only: NPV stays below -100 at every rate
        let cfs = vec![dec!(-10), dec!(-10)];
        let result = irr(dec!(100), &cfs, &IrrOptions::default()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_irr_zero_derivative_is_none() {
        let cfs = vec![Decimal::ZERO, Decimal::ZERO];
        let result = irr(dec!(100), &cfs, &IrrOptions::default()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_irr_iteration_cap() {
        let options = IrrOptions {
            max_iterations: 1,
            ..IrrOptions::default()
        };
        let cfs = vec![dec!(2000), dec!(2000), dec!(2000), dec!(2000), dec!(92000)];
        assert!(irr(dec!(16000), &cfs, &options).unwrap().is_none());
    }

    #[test]
    fn test_irr_empty_flows_error() {
        assert!(irr(dec!(100), &[], &IrrOptions::default()).is_err());
    }

    #[test]
    fn test_mirr_basic() {
        let cfs = vec![dec!(300), dec!(400), dec!(500)];
        let result = mirr(dec!(1000), &cfs, Rate::new(dec!(0.08)), Rate::new(dec!(0.10)))
            .unwrap()
            .unwrap();
        // FV = 300*1.21 + 400*1.1 + 500 = 1303; (1303/1000)^(1/3) - 1 ≈ 9.22%
        assert!((result.as_decimal() - dec!(0.0922)).abs() < dec!(0.0005));
    }

    #[test]
    fn test_mirr_discounts_interim_outflows() {
        let cfs = vec![dec!(-108), dec!(1166.4)];
        let result = mirr(dec!(900), &cfs, Rate::new(dec!(0.08)), Rate::ZERO)
            .unwrap()
            .unwrap();
        // PV outflows = 900 + 108/1.08 = 1000; (1166.4/1000)^(1/2) - 1 = 8%
        assert!((result.as_decimal() - dec!(0.08)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_mirr_without_inflows_is_none() {
        let cfs = vec![dec!(-10), dec!(-10)];
        let result = mirr(dec!(100), &cfs, Rate::new(dec!(0.05)), Rate::new(dec!(0.05))).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_mirr_reinvestment_overflow_is_none() {
        // 2^99 is beyond the Decimal range
        let cfs = vec![dec!(100); 100];
        let result = mirr(dec!(1000), &cfs, Rate::new(dec!(0.05)), Rate::new(dec!(1.0))).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_mirr_ignores_outflow_discounted_out_of_range() {
        let mut cfs = vec![dec!(100); 99];
        cfs.push(dec!(-100));
        let result = mirr(dec!(1000), &cfs, Rate::new(dec!(1.0)), Rate::ZERO)
            .unwrap()
            .unwrap();
        // 2^100 discount leaves PV outflows = 1000; (9900/1000)^(1/100) - 1
        assert!((result.as_decimal() - dec!(0.0232)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_payback_period() {
        let cfs = vec![dec!(300), dec!(300), dec!(400), dec!(500)];
        assert_eq!(payback_period(dec!(1000), &cfs), Some(3));
        assert_eq!(payback_period(dec!(5000), &cfs), None);
    }
}
