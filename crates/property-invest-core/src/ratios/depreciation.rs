use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PropertyInvestError;
use crate::types::{Money, Rate};
use crate::PropertyInvestResult;

/// Straight-line depreciation of the building portion of a purchase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepreciationInput {
    pub purchase_price: Money,
    /// Share of the price attributed to land, which does not depreciate
    #[serde(default = "default_land_share")]
    pub land_value_percent: Rate,
    /// Recovery period in years (27.5 for US residential)
    #[serde(default = "default_period")]
    pub depreciation_period: Decimal,
    #[serde(default = "default_tax_bracket")]
    pub tax_bracket: Rate,
}

fn default_land_share() -> Rate {
    Rate::new(dec!(0.20))
}

fn default_period() -> Decimal {
    dec!(27.5)
}

fn default_tax_bracket() -> Rate {
    Rate::new(dec!(0.24))
}

impl DepreciationInput {
    /// Input with the default land share, period and tax bracket.
    pub fn for_price(purchase_price: Money) -> Self {
        DepreciationInput {
            purchase_price,
            land_value_percent: default_land_share(),
            depreciation_period: default_period(),
            tax_bracket: default_tax_bracket(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepreciationBenefit {
    pub land_value: Money,
    pub building_value: Money,
    pub annual_depreciation: Money,
    pub annual_tax_benefit: Money,
}

pub fn depreciation_tax_benefit(
    input: &DepreciationInput,
) -> PropertyInvestResult<DepreciationBenefit> {
    if input.depreciation_period <= Decimal::ZERO {
        return Err(PropertyInvestError::invalid(
            "depreciation_period",
            "Depreciation period must be positive",
        ));
    }
    let land_share = input.land_value_percent.as_decimal();
    if land_share < Decimal::ZERO || land_share > Decimal::ONE {
        return Err(PropertyInvestError::invalid(
            "land_value_percent",
            "Land share must be between 0 and 1",
        ));
    }

    let land_value = input.purchase_price * land_share;
    let building_value = input.purchase_price - land_value;
    let annual_depreciation = building_value / input.depreciation_period;

    Ok(DepreciationBenefit {
        land_value,
        building_value,
        annual_depreciation,
        annual_tax_benefit: annual_depreciation * input.tax_bracket.as_decimal(),
    })
}
