use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PropertyInvestError;
use crate::types::{Money, Rate};
use crate::PropertyInvestResult;

/// Principal values within this distance below zero are treated as zero.
pub const PRINCIPAL_EPSILON: Decimal = dec!(0.000001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A fixed-rate, fully amortising loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount borrowed
    pub principal: Money,
    /// Annual interest rate (e.g. 0.05 = 5%)
    pub annual_rate: Rate,
    /// Loan term in whole years
    pub term_years: u32,
}

impl LoanTerms {
    pub fn new(principal: Money, annual_rate: Rate, term_years: u32) -> Self {
        LoanTerms {
            principal,
            annual_rate,
            term_years,
        }
    }

    /// Number of monthly payments over the full term
    pub fn total_payments(&self) -> u32 {
        self.term_years * 12
    }

    /// Validate the terms, returning the principal with rounding noise removed.
    pub fn validate(&self) -> PropertyInvestResult<Money> {
        if self.term_years == 0 {
            return Err(PropertyInvestError::invalid(
                "term_years",
                "Loan term must be at least 1 year",
            ));
        }
        if self.annual_rate.is_negative() {
            return Err(PropertyInvestError::invalid(
                "annual_rate",
                "Interest rate cannot be negative",
            ));
        }
        if self.principal < -PRINCIPAL_EPSILON {
            return Err(PropertyInvestError::invalid(
                "principal",
                "Principal cannot be negative",
            ));
        }
        Ok(self.principal.max(Decimal::ZERO))
    }
}

/// One monthly payment in an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub payment_number: u32,
    /// Total cash paid this month (scheduled payment plus any extra)
    pub payment_amount: Money,
    pub principal_payment: Money,
    pub interest_payment: Money,
    /// Portion of the payment above the scheduled amount
    pub extra_payment: Money,
    /// Balance after this payment, never negative
    pub remaining_balance: Money,
}

/// Payment-by-payment amortization schedule with totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    /// Scheduled (fixed) monthly payment
    pub monthly_payment: Money,
    pub payments: Vec<PaymentRecord>,
    pub total_interest: Money,
    pub total_principal: Money,
    pub total_paid: Money,
}

/// Schedule activity rolled up to a loan year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationYear {
    pub year: u32,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub extra_paid: Money,
    pub ending_balance: Money,
    pub cumulative_principal: Money,
    pub cumulative_interest: Money,
}

impl AmortizationSchedule {
    fn from_payments(monthly_payment: Money, payments: Vec<PaymentRecord>) -> Self {
        let total_interest = payments.iter().map(|p| p.interest_payment).sum();
        let total_principal = payments.iter().map(|p| p.principal_payment).sum();
        let total_paid = payments.iter().map(|p| p.payment_amount).sum();
        AmortizationSchedule {
            monthly_payment,
            payments,
            total_interest,
            total_principal,
            total_paid,
        }
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }

    /// Balance after the last recorded payment
    pub fn final_balance(&self) -> Money {
        self.payments
            .last()
            .map(|p| p.remaining_balance)
            .unwrap_or(Decimal::ZERO)
    }

    /// Roll the monthly records up into loan years (the last year may be partial).
    pub fn yearly_summary(&self) -> Vec<AmortizationYear> {
        let mut years = Vec::with_capacity(self.payments.len().div_ceil(12));
        let mut cumulative_principal = Decimal::ZERO;
        let mut cumulative_interest = Decimal::ZERO;

        for (idx, chunk) in self.payments.chunks(12).enumerate() {
            let principal_paid: Money = chunk.iter().map(|p| p.principal_payment).sum();
            let interest_paid: Money = chunk.iter().map(|p| p.interest_payment).sum();
            let extra_paid: Money = chunk.iter().map(|p| p.extra_payment).sum();
            cumulative_principal += principal_paid;
            cumulative_interest += interest_paid;

            years.push(AmortizationYear {
                year: idx as u32 + 1,
                principal_paid,
                interest_paid,
                extra_paid,
                ending_balance: chunk
                    .last()
                    .map(|p| p.remaining_balance)
                    .unwrap_or(Decimal::ZERO),
                cumulative_principal,
                cumulative_interest,
            });
        }

        years
    }
}

/// Result of paying a fixed extra amount on top of every scheduled payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraPaymentOutcome {
    pub extra_monthly: Money,
    pub schedule: AmortizationSchedule,
    /// Months until the balance reaches zero
    pub payoff_months: u32,
    /// `payoff_months / 12`
    pub payoff_years: Decimal,
    /// Scheduled term minus `payoff_months`
    pub months_saved: u32,
    pub total_extra_paid: Money,
    /// Interest paid under the plain schedule
    pub baseline_interest: Money,
    /// Baseline interest minus interest paid with extra payments
    pub interest_savings: Money,
}

/// One month of amortization applied to a balance.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MonthStep {
    pub interest: Money,
    pub principal: Money,
    pub paid: Money,
    pub balance: Money,
}

/// Apply one monthly payment. With `cap_at_balance` the principal portion
/// never exceeds the outstanding balance, so the final payment is the exact
/// payoff; otherwise any overshoot is floored away.
pub(crate) fn step_month(
    balance: Money,
    monthly_rate: Decimal,
    payment: Money,
    cap_at_balance: bool,
) -> MonthStep {
    let interest = balance * monthly_rate;
    let mut principal = payment - interest;
    if cap_at_balance && principal > balance {
        principal = balance;
    }
    let remaining = (balance - principal).max(Decimal::ZERO);
    MonthStep {
        interest,
        principal,
        paid: interest + principal,
        balance: remaining,
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Standard fixed-rate mortgage payment: P * r(1+r)^n / ((1+r)^n - 1)
///
/// `r` is the annual rate over 12 and `n` the number of monthly payments. A
/// zero rate degrades to straight-line repayment `P / n`.
pub fn monthly_payment(
    principal: Money,
    annual_rate: Rate,
    term_years: u32,
) -> PropertyInvestResult<Money> {
    let terms = LoanTerms::new(principal, annual_rate, term_years);
    let principal = terms.validate()?;
    payment_for(principal, annual_rate.monthly(), terms.total_payments())
}

fn payment_for(
    principal: Money,
    monthly_rate: Decimal,
    total_months: u32,
) -> PropertyInvestResult<Money> {
    if monthly_rate.is_zero() {
        return Ok(principal / Decimal::from(total_months));
    }

    // (1 + r)^n via iterative multiplication
    let one_plus_r = Decimal::ONE + monthly_rate;
    let mut compound = Decimal::ONE;
    for _ in 0..total_months {
        compound = compound.checked_mul(one_plus_r).ok_or_else(|| {
            PropertyInvestError::invalid(
                "annual_rate",
                "Interest rate too large: compounding overflows",
            )
        })?;
    }

    let denominator = compound - Decimal::ONE;
    if denominator.is_zero() {
        return Err(PropertyInvestError::DivisionByZero {
            context: "mortgage payment denominator".into(),
        });
    }

    Ok(principal * monthly_rate * compound / denominator)
}

/// Full payment-by-payment schedule over the loan term.
pub fn amortization_schedule(terms: &LoanTerms) -> PropertyInvestResult<AmortizationSchedule> {
    let principal = terms.validate()?;
    let monthly_rate = terms.annual_rate.monthly();
    let total_months = terms.total_payments();
    let payment = payment_for(principal, monthly_rate, total_months)?;

    let mut balance = principal;
    let mut payments = Vec::with_capacity(total_months as usize);

    for number in 1..=total_months {
        let step = step_month(balance, monthly_rate, payment, false);
        balance = step.balance;
        payments.push(PaymentRecord {
            payment_number: number,
            payment_amount: payment,
            principal_payment: step.principal,
            interest_payment: step.interest,
            extra_payment: Decimal::ZERO,
            remaining_balance: balance,
        });
    }

    Ok(AmortizationSchedule::from_payments(payment, payments))
}

/// Schedule with a fixed extra amount added to every monthly payment.
///
/// Stops as soon as the balance is repaid, or after the scheduled number of
/// payments if rounding leaves a residual balance.
pub fn amortization_with_extra_payment(
    terms: &LoanTerms,
    extra_monthly: Money,
) -> PropertyInvestResult<ExtraPaymentOutcome> {
    if extra_monthly < Decimal::ZERO {
        return Err(PropertyInvestError::invalid(
            "extra_monthly",
            "Extra monthly payment cannot be negative",
        ));
    }

    let baseline = amortization_schedule(terms)?;
    let principal = terms.validate()?;
    let monthly_rate = terms.annual_rate.monthly();
    let total_months = terms.total_payments();
    let scheduled = baseline.monthly_payment;
    let total_payment = scheduled + extra_monthly;

    let mut balance = principal;
    let mut payments = Vec::new();
    let mut total_extra_paid = Decimal::ZERO;

    while balance > Decimal::ZERO && (payments.len() as u32) < total_months {
        let step = step_month(balance, monthly_rate, total_payment, true);
        let extra_applied = (step.paid - scheduled).max(Decimal::ZERO).min(extra_monthly);
        total_extra_paid += extra_applied;
        balance = step.balance;

        payments.push(PaymentRecord {
            payment_number: payments.len() as u32 + 1,
            payment_amount: step.paid,
            principal_payment: step.principal,
            interest_payment: step.interest,
            extra_payment: extra_applied,
            remaining_balance: balance,
        });
    }

    let schedule = AmortizationSchedule::from_payments(scheduled, payments);
    let payoff_months = schedule.len() as u32;
    let interest_savings = baseline.total_interest - schedule.total_interest;

    Ok(ExtraPaymentOutcome {
        extra_monthly,
        payoff_months,
        payoff_years: Decimal::from(payoff_months) / dec!(12),
        months_saved: total_months - payoff_months,
        total_extra_paid,
        baseline_interest: baseline.total_interest,
        interest_savings,
        schedule,
    })
}
