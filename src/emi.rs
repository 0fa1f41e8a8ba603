// 💸 EMI Calculator - Equated Monthly Installment
//
// EMI = P × r × (1 + r)^n / ((1 + r)^n − 1)
//   P = principal, r = annual rate / 100 / 12, n = term in years × 12
//
// A zero rate has no interest component: EMI = P / n.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CalcError;
use crate::input::{ensure_non_negative, ensure_positive, round2};

/// Longest loan term accepted, in years
pub const MAX_TERM_YEARS: f64 = 50.0;

// ============================================================================
// LOAN TERMS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount borrowed
    pub principal: f64,

    /// Annual interest rate in percent (12.0 means 12%)
    pub annual_rate_percent: f64,

    /// Loan term in years (fractions allowed, 1.5 = 18 months)
    pub term_years: f64,
}

impl LoanTerms {
    pub fn new(principal: f64, annual_rate_percent: f64, term_years: f64) -> Self {
        LoanTerms {
            principal,
            annual_rate_percent,
            term_years,
        }
    }

    /// Check every field, returning (principal, monthly rate, months)
    fn validated(&self) -> Result<(f64, f64, f64), CalcError> {
        let principal = ensure_positive("principal", self.principal)?;
        let rate = ensure_non_negative("annual_rate_percent", self.annual_rate_percent)?;
        let years = ensure_term_years("term_years", self.term_years)?;

        Ok((principal, rate / 100.0 / 12.0, years * 12.0))
    }
}

/// Positive and at most `MAX_TERM_YEARS`
pub(crate) fn ensure_term_years(field: &'static str, years: f64) -> Result<f64, CalcError> {
    let years = ensure_positive(field, years)?;
    if years > MAX_TERM_YEARS {
        return Err(CalcError::invalid(
            field,
            format!("must be at most {} years", MAX_TERM_YEARS),
        ));
    }
    Ok(years)
}

/// Reject results that overflowed the f64 range
pub(crate) fn ensure_representable(field: &'static str, value: f64) -> Result<f64, CalcError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::invalid(field, "result is too large to represent"))
    }
}

// ============================================================================
// CORE FORMULA
// ============================================================================

/// Unrounded amortized payment. Callers validate first.
pub(crate) fn amortized_payment(principal: f64, monthly_rate: f64, months: f64) -> f64 {
    let factor = (1.0 + monthly_rate).powf(months);

    // Rates too small to move 1.0 behave like a zero rate
    if monthly_rate == 0.0 || factor - 1.0 == 0.0 {
        return principal / months;
    }

    principal * monthly_rate * factor / (factor - 1.0)
}

/// Monthly installment rounded to 2 fractional digits
pub fn calculate_emi(terms: &LoanTerms) -> Result<f64, CalcError> {
    let (principal, monthly_rate, months) = terms.validated()?;
    let emi = ensure_representable(
        "annual_rate_percent",
        amortized_payment(principal, monthly_rate, months),
    )?;
    let emi = round2(emi);

    debug!(principal, monthly_rate, months, emi, "emi calculated");
    Ok(emi)
}

// ============================================================================
// SUMMARY + SCHEDULE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmiSummary {
    pub emi: f64,
    pub months: f64,
    /// EMI × months
    pub total_payment: f64,
    /// total_payment − principal
    pub total_interest: f64,
}

pub fn summarize(terms: &LoanTerms) -> Result<EmiSummary, CalcError> {
    let (principal, monthly_rate, months) = terms.validated()?;
    let emi = ensure_representable(
        "annual_rate_percent",
        amortized_payment(principal, monthly_rate, months),
    )?;
    let total_payment = ensure_representable("principal", emi * months)?;

    Ok(EmiSummary {
        emi: round2(emi),
        months,
        total_payment: round2(total_payment),
        total_interest: round2(total_payment - principal),
    })
}

/// One row of an amortization table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Installment {
    /// 1-based month number
    pub month: u32,
    pub opening_balance: f64,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub closing_balance: f64,
}

/// Month-by-month breakdown. A fractional final month settles the remaining balance.
pub fn amortization_schedule(terms: &LoanTerms) -> Result<Vec<Installment>, CalcError> {
    let (principal, monthly_rate, months) = terms.validated()?;
    let emi = ensure_representable(
        "annual_rate_percent",
        amortized_payment(principal, monthly_rate, months),
    )?;
    // Bounded by MAX_TERM_YEARS × 12
    let count = months.ceil() as u32;

    let mut rows = Vec::with_capacity(count as usize);
    let mut balance = principal;

    for month in 1..=count {
        let interest = balance * monthly_rate;
        let mut payment = emi;
        if month == count || interest + balance < payment {
            payment = balance + interest;
        }
        let principal_part = payment - interest;
        let closing = (balance - principal_part).max(0.0);

        rows.push(Installment {
            month,
            opening_balance: round2(balance),
            payment: round2(payment),
            interest: round2(interest),
            principal: round2(principal_part),
            closing_balance: round2(closing),
        });

        balance = closing;
    }

    Ok(rows)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_emi() {
        // 1 lakh at 12% for 1 year
        let emi = calculate_emi(&LoanTerms::new(100_000.0, 12.0, 1.0)).unwrap();
        assert_eq!(emi, 8884.88);
    }

    #[test]
    fn test_zero_rate_does_not_divide_by_zero() {
        let emi = calculate_emi(&LoanTerms::new(1_000_000.0, 0.0, 5.0)).unwrap();
        assert!(emi.is_finite());
        assert_eq!(emi, 16666.67);
    }

    #[test]
    fn test_invalid_terms_rejected() {
        assert!(calculate_emi(&LoanTerms::new(-1.0, 12.0, 1.0)).is_err());
        assert!(calculate_emi(&LoanTerms::new(1000.0, -1.0, 1.0)).is_err());
        assert!(calculate_emi(&LoanTerms::new(1000.0, 12.0, 0.0)).is_err());
        assert!(calculate_emi(&LoanTerms::new(f64::NAN, 12.0, 1.0)).is_err());

        let err = calculate_emi(&LoanTerms::new(1000.0, 12.0, -2.0)).unwrap_err();
        assert_eq!(err.field(), "term_years");
    }

    #[test]
    fn test_tiny_rate_falls_back_to_flat_split() {
        // 1.0 + r rounds to 1.0 at this rate
        let emi = calculate_emi(&LoanTerms::new(100_000.0, 1e-14, 1.0)).unwrap();
        assert_eq!(emi, 8333.33);

        let summary = summarize(&LoanTerms::new(100_000.0, 1e-14, 1.0)).unwrap();
        assert!(summary.total_payment.is_finite());
    }

    #[test]
    fn test_term_is_capped() {
        let err = calculate_emi(&LoanTerms::new(100_000.0, 12.0, 1e6)).unwrap_err();
        assert_eq!(err.field(), "term_years");

        let emi = calculate_emi(&LoanTerms::new(100_000.0, 12.0, MAX_TERM_YEARS)).unwrap();
        assert!(emi.is_finite() && emi > 1000.0);
    }

    #[test]
    fn test_huge_schedule_rejected_before_allocating() {
        let err = amortization_schedule(&LoanTerms::new(1000.0, 12.0, 1e9)).unwrap_err();
        assert_eq!(err.field(), "term_years");

        let rows = amortization_schedule(&LoanTerms::new(1000.0, 12.0, MAX_TERM_YEARS)).unwrap();
        assert_eq!(rows.len(), 600);
    }

    #[test]
    fn test_overflowing_inputs_are_invalid_not_infinite() {
        // Finite inputs whose EMI leaves the f64 range
        let err = calculate_emi(&LoanTerms::new(1e300, 1e300, 1.0)).unwrap_err();
        assert_eq!(err.field(), "annual_rate_percent");

        let err = summarize(&LoanTerms::new(f64::MAX, 0.0, 0.01)).unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { .. }));

        for terms in [
            LoanTerms::new(1e-300, 1e-300, 1e-9),
            LoanTerms::new(1e15, 99.0, 49.9),
            LoanTerms::new(1.0, 1e-12, 30.0),
        ] {
            let emi = calculate_emi(&terms).unwrap();
            assert!(emi.is_finite(), "{:?} gave {}", terms, emi);
        }
    }

    #[test]
    fn test_monotonic_in_principal_and_rate() {
        let mut last = 0.0;
        for principal in [10_000.0, 50_000.0, 100_000.0, 500_000.0] {
            let emi = calculate_emi(&LoanTerms::new(principal, 10.0, 3.0)).unwrap();
            assert!(emi > last);
            last = emi;
        }

        let mut last = 0.0;
        for rate in [0.0, 1.0, 5.0, 12.0, 24.0] {
            let emi = calculate_emi(&LoanTerms::new(100_000.0, rate, 3.0)).unwrap();
            assert!(emi > last);
            last = emi;
        }
    }

    #[test]
    fn test_decreasing_in_term() {
        let mut last = f64::MAX;
        for years in [0.5, 1.0, 2.0, 5.0, 10.0, 20.0] {
            let emi = calculate_emi(&LoanTerms::new(100_000.0, 9.0, years)).unwrap();
            assert!(emi < last);
            last = emi;
        }
    }

    #[test]
    fn test_summary_totals() {
        let summary = summarize(&LoanTerms::new(100_000.0, 12.0, 1.0)).unwrap();
        assert_eq!(summary.months, 12.0);
        assert!((summary.total_payment - 106_618.55).abs() < 0.05);
        assert!((summary.total_interest - 6_618.55).abs() < 0.05);

        let flat = summarize(&LoanTerms::new(12_000.0, 0.0, 1.0)).unwrap();
        assert_eq!(flat.total_interest, 0.0);
    }

    #[test]
    fn test_schedule_pays_off_loan() {
        let rows = amortization_schedule(&LoanTerms::new(100_000.0, 12.0, 1.0)).unwrap();
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[0].interest, 1000.0);
        assert_eq!(rows[0].opening_balance, 100_000.0);
        assert_eq!(rows.last().unwrap().closing_balance, 0.0);

        let principal_paid: f64 = rows.iter().map(|r| r.principal).sum();
        assert!((principal_paid - 100_000.0).abs() < 0.1);
    }

    #[test]
    fn test_schedule_fractional_term() {
        // 1.25 years = 15 months
        let rows = amortization_schedule(&LoanTerms::new(30_000.0, 0.0, 1.25)).unwrap();
        assert_eq!(rows.len(), 15);
        assert_eq!(rows[0].payment, 2000.0);
        assert_eq!(rows.last().unwrap().closing_balance, 0.0);
    }
}
