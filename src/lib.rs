// FinStart - Core Library
// Microfinance calculators and the bank locator, shared by the CLI and API server

pub mod error;
pub mod input;
pub mod emi;
pub mod eligibility;
pub mod budget;
pub mod growth;
pub mod locator;
pub mod config;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use error::{CalcError, LocatorError};
pub use input::{parse_amount, parse_years, round2};
pub use emi::{
    LoanTerms, EmiSummary, Installment,
    calculate_emi, summarize, amortization_schedule,
};
pub use eligibility::{
    EligibilityInput, EligibilityOutcome, LoanOffer, ApprovalChance, RejectionReason,
    evaluate_eligibility,
};
pub use budget::{BudgetInput, BudgetResult, plan_budget};
pub use growth::{GrowthInput, GrowthProjection, GrowthResult, project_growth};
pub use locator::{
    BankLocator, BankQuery, BankRecord, GeoPoint, LookupState, PlaceSearch, Rating,
    SearchPayload, SerpApiClient,
};
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
