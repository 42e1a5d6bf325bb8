use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// All monetary values, in currency units.
pub type Money = Decimal;

/// Multiples (e.g. 1.35x DSCR, 16.7x GRM)
pub type Multiple = Decimal;

/// A rate expressed as a decimal (0.05 = 5%).
///
/// Every rate parameter in the public API takes a `Rate`, so a whole-number
/// percentage coming from a form field has to go through
/// [`Rate::from_percent`] before it can reach a formula.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);
    pub const ONE: Rate = Rate(Decimal::ONE);

    /// Create from a decimal (e.g. 0.05 for 5%)
    pub const fn new(value: Decimal) -> Self {
        Rate(value)
    }

    /// Create from a whole-number percentage (e.g. 5 for 5%)
    pub fn from_percent(percent: Decimal) -> Self {
        Rate(percent / dec!(100))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn as_percent(&self) -> Decimal {
        self.0 * dec!(100)
    }

    /// Monthly rate from an annual rate (simple division, monthly compounding)
    pub fn monthly(&self) -> Decimal {
        self.0 / dec!(12)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Shift by a number of percentage points (e.g. +0.5 points)
    pub fn shift_points(&self, points: Decimal) -> Self {
        Rate(self.0 + points / dec!(100))
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percent().normalize())
    }
}

impl From<Decimal> for Rate {
    fn from(value: Decimal) -> Self {
        Rate::new(value)
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    for warning in &warnings {
        tracing::warn!(methodology, "{warning}");
    }
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_from_percent() {
        let r = Rate::from_percent(dec!(5));
        assert_eq!(r.as_decimal(), dec!(0.05));
        assert_eq!(r.as_percent(), dec!(5.00));
    }

    #[test]
    fn test_rate_shift_points() {
        let r = Rate::new(dec!(0.05)).shift_points(dec!(-0.5));
        assert_eq!(r.as_decimal(), dec!(0.045));
    }

    #[test]
    fn test_rate_serialises_as_decimal() {
        let json = serde_json::to_string(&Rate::new(dec!(0.035))).unwrap();
        assert_eq!(json, "\"0.035\"");
        let back: Rate = serde_json::from_str("\"0.035\"").unwrap();
        assert_eq!(back, Rate::new(dec!(0.035)));
    }

    #[test]
    fn test_rate_display() {
        assert_eq!(Rate::new(dec!(0.05)).to_string(), "5%");
    }
}
