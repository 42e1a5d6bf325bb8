pub mod amortization;
pub mod calculator;

#[cfg(feature = "ownership")]
pub mod ownership;
