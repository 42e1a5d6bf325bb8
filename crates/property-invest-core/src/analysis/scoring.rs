use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

use crate::ratios::income::OnePercentRule;
use crate::types::{with_metadata, ComputationOutput, Multiple, Rate};
use crate::PropertyInvestResult;

const WEIGHT_CASH_ON_CASH: Decimal = dec!(0.25);
const WEIGHT_CAP_RATE: Decimal = dec!(0.20);
const WEIGHT_IRR: Decimal = dec!(0.15);
const WEIGHT_DSCR: Decimal = dec!(0.15);
const WEIGHT_ONE_PERCENT: Decimal = dec!(0.10);
const WEIGHT_APPRECIATION: Decimal = dec!(0.15);

const MAX_COMPONENT: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Metrics the score is built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreInput {
    pub cash_on_cash: Rate,
    pub cap_rate: Rate,
    /// `None` when the IRR solver produced no rate
    #[serde(default)]
    pub irr: Option<Rate>,
    /// `None` for a property bought without debt
    #[serde(default)]
    pub dscr: Option<Multiple>,
    pub one_percent_rule: OnePercentRule,
    pub appreciation_rate: Rate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvestmentRating {
    Excellent,
    #[serde(rename = "Very Good")]
    VeryGood,
    Good,
    Fair,
    Poor,
}

impl InvestmentRating {
    /// Thresholds are inclusive: exactly 80 is Excellent.
    pub fn from_score(score: Decimal) -> Self {
        if score >= dec!(80) {
            InvestmentRating::Excellent
        } else if score >= dec!(70) {
            InvestmentRating::VeryGood
        } else if score >= dec!(60) {
            InvestmentRating::Good
        } else if score >= dec!(50) {
            InvestmentRating::Fair
        } else {
            InvestmentRating::Poor
        }
    }
}

impl fmt::Display for InvestmentRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InvestmentRating::Excellent => "Excellent",
            InvestmentRating::VeryGood => "Very Good",
            InvestmentRating::Good => "Good",
            InvestmentRating::Fair => "Fair",
            InvestmentRating::Poor => "Poor",
        };
        f.write_str(label)
    }
}

/// Each component on a 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub cash_on_cash: Decimal,
    pub cap_rate: Decimal,
    pub irr: Decimal,
    pub dscr: Decimal,
    pub one_percent_rule: Decimal,
    pub appreciation: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentScore {
    pub overall_score: Decimal,
    pub rating: InvestmentRating,
    pub component_scores: ComponentScores,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Weighted 0-100 investment score and its rating.
pub fn investment_score(
    input: &ScoreInput,
) -> PropertyInvestResult<ComputationOutput<InvestmentScore>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.irr.is_none() {
        warnings.push("No IRR available; IRR component scored 0".into());
    }

    let output = score(input);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Weighted Investment Score (6 components)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

pub(crate) fn score(input: &ScoreInput) -> InvestmentScore {
    let rule = &input.one_percent_rule;

    let components = ComponentScores {
        cash_on_cash: component(input.cash_on_cash.as_decimal() * dec!(1000)),
        cap_rate: component(input.cap_rate.as_decimal() * dec!(1000)),
        irr: input
            .irr
            .map_or(Decimal::ZERO, |r| component(r.as_decimal() * dec!(700))),
        dscr: input
            .dscr
            .map_or(MAX_COMPONENT, |d| component((d - Decimal::ONE) * dec!(100))),
        one_percent_rule: if rule.is_passing {
            MAX_COMPONENT
        } else {
            component(rule.actual_ratio / dec!(0.01) * dec!(100))
        },
        appreciation: component(input.appreciation_rate.as_decimal() * dec!(2000)),
    };

    let overall_score = components.cash_on_cash * WEIGHT_CASH_ON_CASH
        + components.cap_rate * WEIGHT_CAP_RATE
        + components.irr * WEIGHT_IRR
        + components.dscr * WEIGHT_DSCR
        + components.one_percent_rule * WEIGHT_ONE_PERCENT
        + components.appreciation * WEIGHT_APPRECIATION;

    InvestmentScore {
        overall_score,
        rating: InvestmentRating::from_score(overall_score),
        component_scores: components,
    }
}

fn component(raw: Decimal) -> Decimal {
    raw.clamp(Decimal::ZERO, MAX_COMPONENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(ratio: Decimal) -> OnePercentRule {
        OnePercentRule {
            threshold: dec!(1000),
            actual_ratio: ratio,
            is_passing: ratio >= dec!(0.01),
        }
    }

    fn boundary_input() -> ScoreInput {
        ScoreInput {
            cash_on_cash: Rate::new(dec!(0.1)),
            cap_rate: Rate::new(dec!(0.1)),
            irr: Some(Rate::new(dec!(0.2))),
            dscr: Some(dec!(2)),
            one_percent_rule: rule(dec!(0.005)),
            appreciation_rate: Rate::ZERO,
        }
    }

    #[test]
    fn test_score_of_eighty_is_excellent() {
        let s = investment_score(&boundary_input()).unwrap().result;
        assert_eq!(s.component_scores.one_percent_rule, dec!(50));
        assert_eq!(s.overall_score, dec!(80));
        assert_eq!(s.rating, InvestmentRating::Excellent);
    }

    #[test]
    fn test_components_clamped() {
        let input = ScoreInput {
            dscr: Some(dec!(0.5)),
            appreciation_rate: Rate::new(dec!(-0.02)),
            ..boundary_input()
        };
        let c = investment_score(&input).unwrap().result.component_scores;
        assert_eq!(c.irr, dec!(100));
        assert_eq!(c.dscr, Decimal::ZERO);
        assert_eq!(c.appreciation, Decimal::ZERO);
    }

    #[test]
    fn test_missing_irr_and_no_debt() {
        let input = ScoreInput {
            irr: None,
            dscr: None,
            ..boundary_input()
        };
        let result = investment_score(&input).unwrap();
        assert_eq!(result.result.component_scores.irr, Decimal::ZERO);
        assert_eq!(result.result.component_scores.dscr, dec!(100));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_rating_thresholds() {
        assert_eq!(InvestmentRating::from_score(dec!(79.99)), InvestmentRating::VeryGood);
        assert_eq!(InvestmentRating::from_score(dec!(70)), InvestmentRating::VeryGood);
        assert_eq!(InvestmentRating::from_score(dec!(60)), InvestmentRating::Good);
        assert_eq!(InvestmentRating::from_score(dec!(50)), InvestmentRating::Fair);
        assert_eq!(InvestmentRating::from_score(dec!(49.9)), InvestmentRating::Poor);
    }

    #[test]
    fn test_rating_serialises_with_space() {
        let json = serde_json::to_string(&InvestmentRating::VeryGood).unwrap();
        assert_eq!(json, "\"Very Good\"");
        assert_eq!(InvestmentRating::VeryGood.to_string(), "Very Good");
    }
}
