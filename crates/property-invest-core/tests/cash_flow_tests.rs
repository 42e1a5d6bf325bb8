use property_invest_core::time_value::{irr, mirr, npv, payback_period, IrrOptions};
use property_invest_core::Rate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// NPV / IRR consistency
// ===========================================================================

#[test]
fn test_five_year_hold_with_exit() {
    // 16 000 down, 2 000 a year, sale proceeds of 90 000 in year 5
    let flows = [dec!(2000), dec!(2000), dec!(2000), dec!(2000), dec!(92000)];
    let rate = irr(dec!(16000), &flows, &IrrOptions::default())
        .unwrap()
        .expect("IRR should converge");

    assert!(rate.as_decimal() > Decimal::ZERO);
    // Exact root is about 48.5%
    assert!(
        (rate.as_decimal() - dec!(0.485)).abs() < dec!(0.001),
        "Expected IRR ~48.5%, got {rate}"
    );

    let residual = npv(dec!(16000), &flows, rate).unwrap();
    assert!(residual.abs() < dec!(0.001), "NPV at IRR was {residual}");
}

#[test]
fn test_npv_at_irr_is_zero_across_series() {
    let cases: Vec<(Decimal, Vec<Decimal>)> = vec![
        (dec!(1000), vec![dec!(400), dec!(400), dec!(400)]),
        (dec!(50000), vec![dec!(-2000), dec!(5000), dec!(8000), dec!(70000)]),
        (dec!(100), vec![dec!(110)]),
        (dec!(25000), vec![dec!(1500); 10]),
    ];

    for (initial, flows) in cases {
        if let Some(rate) = irr(initial, &flows, &IrrOptions::default()).unwrap() {
            let residual = npv(initial, &flows, rate).unwrap();
            assert!(
                residual.abs() < dec!(0.001),
                "NPV {residual} at IRR {rate} for {flows:?}"
            );
        }
    }
}

#[test]
fn test_single_period_irr() {
    let rate = irr(dec!(100), &[dec!(110)], &IrrOptions::default())
        .unwrap()
        .unwrap();
    assert!((rate.as_decimal() - dec!(0.10)).abs() < dec!(0.0001));
}

#[test]
fn test_custom_solver_options_deserialise_with_defaults() {
    let options: IrrOptions = serde_json::from_str(r#"{"max_iterations": 5}"#).unwrap();
    assert_eq!(options.max_iterations, 5);
    assert_eq!(options.guess, Rate::new(dec!(0.10)));
    assert_eq!(options.tolerance, dec!(0.0001));
}

// ===========================================================================
// MIRR and payback
// ===========================================================================

#[test]
fn test_mirr_below_irr_when_reinvesting_at_lower_rate() {
    let flows = [dec!(2000), dec!(2000), dec!(2000), dec!(2000), dec!(92000)];
    let irr_rate = irr(dec!(16000), &flows, &IrrOptions::default())
        .unwrap()
        .unwrap();
    let mirr_rate = mirr(dec!(16000), &flows, Rate::new(dec!(0.05)), Rate::new(dec!(0.07)))
        .unwrap()
        .unwrap();
    assert!(mirr_rate < irr_rate);
    assert!(mirr_rate.as_decimal() > Decimal::ZERO);
}

#[test]
fn test_payback_in_exit_year() {
    let flows = [dec!(2000), dec!(2000), dec!(2000), dec!(2000), dec!(92000)];
    assert_eq!(payback_period(dec!(16000), &flows), Some(5));
    assert_eq!(payback_period(dec!(7000), &flows), Some(4));
}
