// ✅ Loan Eligibility - ordered gates + maximum affordable loan
//
// Gates run in order and the first failing one rejects the application.
// Approved applications get the largest loan whose EMI (12% p.a.) fits in
// half of the disposable monthly income.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::emi::{amortized_payment, ensure_representable, ensure_term_years};
use crate::error::CalcError;
use crate::input::{ensure_non_negative, ensure_positive};

/// Minimum monthly income to be considered
pub const MIN_MONTHLY_INCOME: f64 = 30_000.0;

/// Minimum credit score to be considered
pub const MIN_CREDIT_SCORE: u16 = 650;

/// Highest accepted existing-debt / income ratio
pub const MAX_DEBT_TO_INCOME: f64 = 0.4;

/// Share of disposable income that may go to the new EMI
pub const DISPOSABLE_INCOME_SHARE: f64 = 0.5;

/// Fixed annual rate offered on approval
pub const ANNUAL_RATE_PERCENT: f64 = 12.0;

pub const CREDIT_SCORE_RANGE: std::ops::RangeInclusive<u16> = 300..=850;

// ============================================================================
// INPUT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EligibilityInput {
    pub monthly_income: f64,

    /// 300 - 850
    pub credit_score: u16,

    /// Monthly repayments already owed elsewhere (zero allowed)
    pub existing_monthly_debt: f64,

    pub requested_term_years: f64,
}

impl EligibilityInput {
    fn validate(&self) -> Result<(), CalcError> {
        ensure_positive("monthly_income", self.monthly_income)?;
        ensure_non_negative("existing_monthly_debt", self.existing_monthly_debt)?;
        ensure_term_years("requested_term_years", self.requested_term_years)?;

        if !CREDIT_SCORE_RANGE.contains(&self.credit_score) {
            return Err(CalcError::invalid(
                "credit_score",
                format!(
                    "{} is outside {}-{}",
                    self.credit_score,
                    CREDIT_SCORE_RANGE.start(),
                    CREDIT_SCORE_RANGE.end()
                ),
            ));
        }

        Ok(())
    }

    pub fn debt_to_income(&self) -> f64 {
        self.existing_monthly_debt / self.monthly_income
    }
}

// ============================================================================
// OUTCOME
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalChance {
    VeryHigh,
    High,
    Good,
    Low,
}

impl ApprovalChance {
    pub fn from_credit_score(score: u16) -> Self {
        match score {
            800.. => ApprovalChance::VeryHigh,
            750..=799 => ApprovalChance::High,
            700..=749 => ApprovalChance::Good,
            _ => ApprovalChance::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalChance::VeryHigh => "Very High",
            ApprovalChance::High => "High",
            ApprovalChance::Good => "Good",
            ApprovalChance::Low => "Low",
        }
    }
}

impl fmt::Display for ApprovalChance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectionReason {
    IncomeTooLow,
    CreditScoreTooLow,
    DebtToIncomeTooHigh,
}

impl RejectionReason {
    pub fn message(&self) -> &'static str {
        match self {
            RejectionReason::IncomeTooLow => "Income too low.",
            RejectionReason::CreditScoreTooLow => "Credit score too low.",
            RejectionReason::DebtToIncomeTooHigh => "Debt-to-income too high.",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Offer computed for an application that passed every gate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanOffer {
    /// Rounded to whole currency units
    pub max_loan_amount: f64,
    /// Rounded to whole currency units
    pub max_monthly_emi: f64,
    pub interest_rate_percent: f64,
    pub tenure_years: f64,
    pub approval_chance: ApprovalChance,
    pub total_payment: f64,
    pub total_interest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EligibilityOutcome {
    Rejected { reason: RejectionReason },
    Approved(LoanOffer),
}

impl EligibilityOutcome {
    pub fn is_approved(&self) -> bool {
        matches!(self, EligibilityOutcome::Approved(_))
    }
}

// ============================================================================
// EVALUATION
// ============================================================================

type Gate = fn(&EligibilityInput) -> bool;

/// Checked in order; a gate returning true rejects
const GATES: [(Gate, RejectionReason); 3] = [
    (
        |i: &EligibilityInput| i.monthly_income < MIN_MONTHLY_INCOME,
        RejectionReason::IncomeTooLow,
    ),
    (
        |i: &EligibilityInput| i.credit_score < MIN_CREDIT_SCORE,
        RejectionReason::CreditScoreTooLow,
    ),
    (
        |i: &EligibilityInput| i.debt_to_income() > MAX_DEBT_TO_INCOME,
        RejectionReason::DebtToIncomeTooHigh,
    ),
];

pub fn evaluate_eligibility(input: &EligibilityInput) -> Result<EligibilityOutcome, CalcError> {
    input.validate()?;

    if let Some((_, reason)) = GATES.iter().find(|(gate, _)| gate(input)) {
        debug!(%reason, "eligibility rejected");
        return Ok(EligibilityOutcome::Rejected { reason: *reason });
    }

    let max_emi = (input.monthly_income - input.existing_monthly_debt) * DISPOSABLE_INCOME_SHARE;
    let monthly_rate = ANNUAL_RATE_PERCENT / 100.0 / 12.0;
    let months = input.requested_term_years * 12.0;

    // Present value of `months` payments of `max_emi`
    let factor = (1.0 + monthly_rate).powf(months);
    let max_loan = ensure_representable(
        "monthly_income",
        max_emi * (factor - 1.0) / (monthly_rate * factor),
    )?;

    let monthly_emi = amortized_payment(max_loan, monthly_rate, months);
    let total_payment = ensure_representable("monthly_income", monthly_emi * months)?;

    let offer = LoanOffer {
        max_loan_amount: max_loan.round(),
        max_monthly_emi: monthly_emi.round(),
        interest_rate_percent: ANNUAL_RATE_PERCENT,
        tenure_years: input.requested_term_years,
        approval_chance: ApprovalChance::from_credit_score(input.credit_score),
        total_payment: total_payment.round(),
        total_interest: (total_payment - max_loan).round(),
    };

    debug!(
        max_loan = offer.max_loan_amount,
        chance = %offer.approval_chance,
        "eligibility approved"
    );
    Ok(EligibilityOutcome::Approved(offer))
}

// ============================================================================
// TESTS
// ============================================================================
