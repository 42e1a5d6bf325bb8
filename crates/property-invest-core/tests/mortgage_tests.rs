use property_invest_core::mortgage::amortization::{
    amortization_schedule, amortization_with_extra_payment, monthly_payment, LoanTerms,
};
use property_invest_core::mortgage::calculator::{analyze_mortgage, MortgageInput, PaymentFrequency};
use property_invest_core::mortgage::ownership::{total_cost_of_ownership, OwnershipInput};
use property_invest_core::Rate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn standard_loan() -> LoanTerms {
    // 80 000 purchase with 20% down
    LoanTerms::new(dec!(64000), Rate::new(dec!(0.05)), 25)
}

// ===========================================================================
// Amortization
// ===========================================================================

#[test]
fn test_standard_25_year_loan() {
    let schedule = amortization_schedule(&standard_loan()).unwrap();
    // Exact annuity: 64000 * r(1+r)^300 / ((1+r)^300 - 1) with r = 0.05/12
    assert!(
        (schedule.monthly_payment - dec!(374.14)).abs() < dec!(0.01),
        "Expected payment ~374.14, got {}",
        schedule.monthly_payment
    );

    let first = &schedule.payments[0];
    assert!((first.interest_payment - dec!(266.67)).abs() < dec!(0.01));
    assert!((first.principal_payment - dec!(107.47)).abs() < dec!(0.01));
}

#[test]
fn test_schedule_completeness() {
    for (principal, rate, years) in [
        (dec!(64000), dec!(0.05), 25u32),
        (dec!(250000), dec!(0.0675), 30),
        (dec!(15000), dec!(0.12), 5),
        (dec!(90000), Decimal::ZERO, 15),
    ] {
        let terms = LoanTerms::new(principal, Rate::new(rate), years);
        let schedule = amortization_schedule(&terms).unwrap();
        assert_eq!(schedule.len(), (years * 12) as usize);

        for pair in schedule.payments.windows(2) {
            assert!(pair[1].remaining_balance <= pair[0].remaining_balance);
        }
        let tolerance = principal * dec!(0.000001);
        assert!(
            schedule.final_balance() <= tolerance,
            "Residual {} for {principal} at {rate} over {years}y",
            schedule.final_balance()
        );
    }
}

#[test]
fn test_zero_rate_payment_is_straight_line() {
    for (principal, years) in [(dec!(120000), 10u32), (dec!(36000), 3), (dec!(1), 1)] {
        let payment = monthly_payment(principal, Rate::ZERO, years).unwrap();
        assert_eq!(payment, principal / Decimal::from(years * 12));
    }
}

#[test]
fn test_extra_payments_never_hurt() {
    let terms = standard_loan();
    let baseline = amortization_schedule(&terms).unwrap();
    let mut previous_months = baseline.len() as u32;
    let mut previous_interest = baseline.total_interest;

    for extra in [dec!(10), dec!(50), dec!(100), dec!(500), dec!(5000)] {
        let outcome = amortization_with_extra_payment(&terms, extra).unwrap();
        assert!(outcome.payoff_months <= previous_months);
        assert!(outcome.schedule.total_interest <= previous_interest);
        assert!(outcome.interest_savings >= Decimal::ZERO);
        previous_months = outcome.payoff_months;
        previous_interest = outcome.schedule.total_interest;
    }
}

// ===========================================================================
// Calculator and ownership
// ===========================================================================

#[test]
fn test_mortgage_calculator_matches_schedule() {
    let input = MortgageInput {
        property_price: dec!(80000),
        down_payment_percent: Rate::new(dec!(0.20)),
        annual_interest_rate: Rate::new(dec!(0.05)),
        term_years: 25,
        payment_frequency: PaymentFrequency::Weekly,
        extra_monthly_payment: Decimal::ZERO,
        start_date: None,
    };
    let result = analyze_mortgage(&input).unwrap();
    let schedule = amortization_schedule(&standard_loan()).unwrap();

    assert_eq!(result.result.monthly_payment, schedule.monthly_payment);
    assert_eq!(result.result.total_interest, schedule.total_interest);
    assert_eq!(result.result.payments_per_year, 52);
    assert_eq!(result.methodology, "Fixed-Rate Mortgage Amortization (monthly compounding)");
    assert!(!result.metadata.version.is_empty());
}

#[test]
fn test_ownership_projection_uses_schedule_payment() {
    let input = OwnershipInput {
        purchase_price: dec!(80000),
        down_payment_percent: Rate::new(dec!(0.20)),
        annual_interest_rate: Rate::new(dec!(0.05)),
        term_years: 25,
        property_tax_rate: Rate::new(dec!(0.005)),
        insurance_rate: Rate::new(dec!(0.003)),
        monthly_hoa: Decimal::ZERO,
        maintenance_rate: Rate::new(dec!(0.01)),
        appreciation_rate: Rate::new(dec!(0.03)),
        holding_years: 5,
    };
    let out = total_cost_of_ownership(&input).unwrap().result;
    let schedule = amortization_schedule(&standard_loan()).unwrap();

    assert_eq!(out.monthly_payment, schedule.monthly_payment);
    // Balance after 5 years matches the 60th scheduled payment
    let after_60 = schedule.payments[59].remaining_balance;
    let projected = out.yearly_data[4].remaining_loan_balance;
    assert!((projected - after_60).abs() < dec!(0.000001));
    let interest_60: Decimal = schedule.payments[..60].iter().map(|p| p.interest_payment).sum();
    assert!((out.total_interest_paid - interest_60).abs() < dec!(0.000001));
}
