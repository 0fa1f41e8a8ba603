// ⚠️ Error taxonomy
// Calculator input errors and bank locator failures.
//
// An eligibility rejection is NOT here: it is a normal outcome
// (see `EligibilityOutcome::Rejected`).

use thiserror::Error;

/// Errors raised by the pure calculators.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// Non-numeric, out-of-range or missing field
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
}

impl CalcError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { field, .. } => field,
        }
    }
}

/// Errors raised by the bank locator proxy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocatorError {
    /// Rejected before any network call was issued
    #[error("{0}")]
    InvalidInput(String),

    /// Network failure, non-2xx status or unreadable payload
    #[error("Failed to fetch data from place search: {0}")]
    Upstream(String),

    /// Upstream answered but had nothing to offer
    #[error("No results found")]
    NotFound,
}

impl From<reqwest::Error> for LocatorError {
    fn from(err: reqwest::Error) -> Self {
        LocatorError::Upstream(err.to_string())
    }
}
