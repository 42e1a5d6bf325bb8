use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PropertyInvestError;
use crate::types::{Money, Rate};
use crate::PropertyInvestResult;

/// A nearby rental used as a market reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalComparable {
    pub rent: Money,
    /// Floor area, in the same unit as the subject property
    pub area: Decimal,
}

/// Subject rent against the rent implied by comparables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalCompsResult {
    /// Mean of rent / area across comparables
    pub avg_rent_per_unit: Money,
    pub expected_rent: Money,
    /// Subject rent minus expected rent
    pub difference: Money,
    pub percent_difference: Rate,
    pub is_undervalued: bool,
    pub is_overvalued: bool,
}

pub fn rental_comps(
    monthly_rent: Money,
    comparables: &[RentalComparable],
    area: Decimal,
) -> PropertyInvestResult<RentalCompsResult> {
    if comparables.is_empty() {
        return Err(PropertyInvestError::InsufficientData(
            "Rental comps require at least 1 comparable".into(),
        ));
    }
    if area <= Decimal::ZERO {
        return Err(PropertyInvestError::invalid("area", "Area must be positive"));
    }

    let mut total_rent_per_unit = Decimal::ZERO;
    for (i, comp) in comparables.iter().enumerate() {
        if comp.area <= Decimal::ZERO {
            return Err(PropertyInvestError::invalid(
                &format!("comparables[{i}].area"),
                "Comparable area must be positive",
            ));
        }
        total_rent_per_unit += comp.rent / comp.area;
    }

    let avg_rent_per_unit = total_rent_per_unit / Decimal::from(comparables.len() as u64);
    let expected_rent = avg_rent_per_unit * area;
    let difference = monthly_rent - expected_rent;
    let percent_difference = if expected_rent.is_zero() {
        Rate::ZERO
    } else {
        Rate::new(difference / expected_rent)
    };

    Ok(RentalCompsResult {
        avg_rent_per_unit,
        expected_rent,
        difference,
        percent_difference,
        is_undervalued: monthly_rent < expected_rent,
        is_overvalued: monthly_rent > expected_rent,
    })
}
