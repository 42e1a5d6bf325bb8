pub mod investment;
pub mod scoring;
pub mod sensitivity;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PropertyInvestError;
use crate::mortgage::amortization::monthly_payment;
use crate::mortgage::ownership::OwnershipInput;
use crate::types::{Money, Rate};
use crate::PropertyInvestResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single rental property purchase, fully specified.
///
/// Fields missing from JSON input fall back to [`PropertyScenario::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyScenario {
    pub purchase_price: Money,
    /// Share of the price paid upfront (e.g. 0.20 = 20%)
    pub down_payment_percent: Rate,
    pub annual_interest_rate: Rate,
    pub term_years: u32,
    /// Annual property tax as a share of value
    pub property_tax_rate: Rate,
    /// Annual insurance as a share of value
    pub insurance_rate: Rate,
    pub monthly_hoa: Money,
    /// Annual maintenance as a share of value
    pub maintenance_rate: Rate,
    pub appreciation_rate: Rate,
    pub holding_years: u32,
    /// Gross monthly rent at full occupancy
    pub monthly_rent: Money,
    pub vacancy_rate: Rate,
    /// Management fee as a share of collected rent
    pub management_rate: Rate,
    /// Rate used for NPV and as the MIRR reinvestment rate
    pub discount_rate: Rate,
}

impl Default for PropertyScenario {
    fn default() -> Self {
        PropertyScenario {
            purchase_price: dec!(80000),
            down_payment_percent: Rate::new(dec!(0.20)),
            annual_interest_rate: Rate::new(dec!(0.05)),
            term_years: 25,
            property_tax_rate: Rate::new(dec!(0.005)),
            insurance_rate: Rate::new(dec!(0.003)),
            monthly_hoa: Decimal::ZERO,
            maintenance_rate: Rate::new(dec!(0.01)),
            appreciation_rate: Rate::new(dec!(0.03)),
            holding_years: 10,
            monthly_rent: dec!(400),
            vacancy_rate: Rate::new(dec!(0.05)),
            management_rate: Rate::new(dec!(0.10)),
            discount_rate: Rate::new(dec!(0.07)),
        }
    }
}

/// Named market outlook that overrides appreciation, vacancy and maintenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioPreset {
    Pessimistic,
    Neutral,
    Optimistic,
}

impl ScenarioPreset {
    /// (appreciation, vacancy, maintenance)
    fn rates(&self) -> (Rate, Rate, Rate) {
        match self {
            ScenarioPreset::Pessimistic => (
                Rate::new(dec!(0.01)),
                Rate::new(dec!(0.10)),
                Rate::new(dec!(0.015)),
            ),
            ScenarioPreset::Neutral => (
                Rate::new(dec!(0.03)),
                Rate::new(dec!(0.05)),
                Rate::new(dec!(0.01)),
            ),
            ScenarioPreset::Optimistic => (
                Rate::new(dec!(0.05)),
                Rate::new(dec!(0.02)),
                Rate::new(dec!(0.008)),
            ),
        }
    }
}

impl PropertyScenario {
    /// Copy of this scenario with the preset's market assumptions.
    pub fn with_preset(&self, preset: ScenarioPreset) -> Self {
        let (appreciation_rate, vacancy_rate, maintenance_rate) = preset.rates();
        PropertyScenario {
            appreciation_rate,
            vacancy_rate,
            maintenance_rate,
            ..self.clone()
        }
    }

    pub fn down_payment(&self) -> Money {
        self.purchase_price * self.down_payment_percent.as_decimal()
    }

    pub fn loan_amount(&self) -> Money {
        self.purchase_price - self.down_payment()
    }

    /// Value after the first year of appreciation; value-linked costs are
    /// assessed on it.
    pub fn year_one_value(&self) -> Money {
        self.purchase_price * (Decimal::ONE + self.appreciation_rate.as_decimal())
    }

    pub fn ownership_input(&self) -> OwnershipInput {
        OwnershipInput {
            purchase_price: self.purchase_price,
            down_payment_percent: self.down_payment_percent,
            annual_interest_rate: self.annual_interest_rate,
            term_years: self.term_years,
            property_tax_rate: self.property_tax_rate,
            insurance_rate: self.insurance_rate,
            monthly_hoa: self.monthly_hoa,
            maintenance_rate: self.maintenance_rate,
            appreciation_rate: self.appreciation_rate,
            holding_years: self.holding_years,
        }
    }

    pub(crate) fn validate(&self) -> PropertyInvestResult<()> {
        if self.purchase_price <= Decimal::ZERO {
            return Err(PropertyInvestError::invalid(
                "purchase_price",
                "Purchase price must be positive",
            ));
        }
        if self.monthly_rent < Decimal::ZERO {
            return Err(PropertyInvestError::invalid(
                "monthly_rent",
                "Monthly rent cannot be negative",
            ));
        }
        for (field, rate) in [
            ("down_payment_percent", self.down_payment_percent),
            ("vacancy_rate", self.vacancy_rate),
            ("management_rate", self.management_rate),
        ] {
            let r = rate.as_decimal();
            if r < Decimal::ZERO || r > Decimal::ONE {
                return Err(PropertyInvestError::invalid(field, "Must be between 0 and 1"));
            }
        }
        if self.monthly_hoa < Decimal::ZERO {
            return Err(PropertyInvestError::invalid(
                "monthly_hoa",
                "HOA fees cannot be negative",
            ));
        }
        if self.appreciation_rate.as_decimal() <= dec!(-1) {
            return Err(PropertyInvestError::invalid(
                "appreciation_rate",
                "Appreciation must be greater than -100%",
            ));
        }
        Ok(())
    }
}

/// Monthly cash flow in year one, line by line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCashFlow {
    pub gross_rent: Money,
    pub vacancy_loss: Money,
    pub effective_rent: Money,
    pub management_fee: Money,
    pub mortgage_payment: Money,
    pub property_tax: Money,
    pub insurance: Money,
    pub maintenance: Money,
    pub hoa: Money,
    pub net_cash_flow: Money,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Year-one monthly cash flow after vacancy, management, mortgage and
/// ownership costs.
pub fn monthly_cash_flow(scenario: &PropertyScenario) -> PropertyInvestResult<MonthlyCashFlow> {
    scenario.validate()?;

    let mortgage_payment = monthly_payment(
        scenario.loan_amount(),
        scenario.annual_interest_rate,
        scenario.term_years,
    )?;

    let gross_rent = scenario.monthly_rent;
    let vacancy_loss = gross_rent * scenario.vacancy_rate.as_decimal();
    let effective_rent = gross_rent - vacancy_loss;
    let management_fee = effective_rent * scenario.management_rate.as_decimal();

    let value = scenario.year_one_value();
    let property_tax = value * scenario.property_tax_rate.as_decimal() / dec!(12);
    let insurance = value * scenario.insurance_rate.as_decimal() / dec!(12);
    let maintenance = value * scenario.maintenance_rate.as_decimal() / dec!(12);
    let hoa = scenario.monthly_hoa;

    let net_cash_flow = effective_rent
        - management_fee
        - mortgage_payment
        - property_tax
        - insurance
        - maintenance
        - hoa;

    Ok(MonthlyCashFlow {
        gross_rent,
        vacancy_loss,
        effective_rent,
        management_fee,
        mortgage_payment,
        property_tax,
        insurance,
        maintenance,
        hoa,
        net_cash_flow,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenario() {
        let s = PropertyScenario::default();
        assert_eq!(s.down_payment(), dec!(16000));
        assert_eq!(s.loan_amount(), dec!(64000));
        assert_eq!(s.year_one_value(), dec!(82400));
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let s: PropertyScenario =
            serde_json::from_str(r#"{"purchase_price": "120000", "monthly_rent": "1100"}"#)
                .unwrap();
        assert_eq!(s.purchase_price, dec!(120000));
        assert_eq!(s.monthly_rent, dec!(1100));
        assert_eq!(s.term_years, 25);
        assert_eq!(s.discount_rate, Rate::new(dec!(0.07)));
    }

    #[test]
    fn test_presets_override_market_rates() {
        let base = PropertyScenario::default();
        let pessimistic = base.with_preset(ScenarioPreset::Pessimistic);
        assert_eq!(pessimistic.appreciation_rate, Rate::new(dec!(0.01)));
        assert_eq!(pessimistic.vacancy_rate, Rate::new(dec!(0.10)));
        assert_eq!(pessimistic.maintenance_rate, Rate::new(dec!(0.015)));
        assert_eq!(pessimistic.purchase_price, base.purchase_price);

        assert_eq!(base.with_preset(ScenarioPreset::Neutral), base);
    }

    #[test]
    fn test_monthly_cash_flow_lines() {
        let cf = monthly_cash_flow(&PropertyScenario::default()).unwrap();
        assert_eq!(cf.vacancy_loss, dec!(20));
        assert_eq!(cf.effective_rent, dec!(380));
        assert_eq!(cf.management_fee, dec!(38));
        // 82400 * 0.005 / 12
        assert!((cf.property_tax - dec!(34.3333)).abs() < dec!(0.0001));
        let expected = cf.effective_rent
            - cf.management_fee
            - cf.mortgage_payment
            - cf.property_tax
            - cf.insurance
            - cf.maintenance
            - cf.hoa;
        assert_eq!(cf.net_cash_flow, expected);
        assert!(cf.net_cash_flow < Decimal::ZERO);
    }

    #[test]
    fn test_invalid_vacancy_rejected() {
        let s = PropertyScenario {
            vacancy_rate: Rate::new(dec!(1.5)),
            ..PropertyScenario::default()
        };
        assert!(monthly_cash_flow(&s).is_err());
    }
    #[test]
    fn test_total_value_loss_rejected() {
        let s = PropertyScenario {
            appreciation_rate: Rate::new(dec!(-1)),
            ..PropertyScenario::default()
        };
        let err = monthly_cash_flow(&s).unwrap_err();
        assert!(matches!(
            err,
            PropertyInvestError::InvalidInput { ref field, .. } if field == "appreciation_rate"
        ));
    }
}
