// 📈 Business Growth Projector
// value(year i) = initial × (1 + rate/100)^i for i = 0..=years
//
// Every projected value is rounded to 2 fractional digits.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CalcError;
use crate::input::{ensure_finite, ensure_non_negative, round2};

/// Longest horizon we project
pub const MAX_YEARS: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthInput {
    pub initial_investment: f64,

    /// Percent per year, may be negative (shrinking business) but above -100
    pub annual_growth_rate_percent: f64,

    pub years: u32,
}

impl GrowthInput {
    pub fn new(initial_investment: f64, annual_growth_rate_percent: f64, years: u32) -> Self {
        GrowthInput {
            initial_investment,
            annual_growth_rate_percent,
            years,
        }
    }

    /// Lazy, restartable projection. Clone it to replay from year 0.
    pub fn projection(&self) -> Result<GrowthProjection, CalcError> {
        let initial = ensure_non_negative("initial_investment", self.initial_investment)?;
        let rate = ensure_finite("annual_growth_rate_percent", self.annual_growth_rate_percent)?;

        if rate <= -100.0 {
            return Err(CalcError::invalid(
                "annual_growth_rate_percent",
                "must be greater than -100",
            ));
        }
        if self.years > MAX_YEARS {
            return Err(CalcError::invalid(
                "years",
                format!("must be at most {}", MAX_YEARS),
            ));
        }

        let factor = 1.0 + rate / 100.0;

        // The last year holds the largest value when growing
        let compounded = factor.powi(self.years as i32);
        if !compounded.is_finite() {
            return Err(CalcError::invalid(
                "annual_growth_rate_percent",
                "compounds beyond the representable range",
            ));
        }
        if !(initial * compounded).is_finite() {
            return Err(CalcError::invalid(
                "initial_investment",
                "projected value is too large to represent",
            ));
        }

        Ok(GrowthProjection {
            initial,
            factor,
            years: self.years,
            next_year: 0,
        })
    }
}

// ============================================================================
// LAZY PROJECTION
// ============================================================================

#[derive(Debug, Clone)]
pub struct GrowthProjection {
    initial: f64,
    factor: f64,
    years: u32,
    next_year: u32,
}

impl GrowthProjection {
    pub fn value_at(&self, year: u32) -> f64 {
        round2(self.initial * self.factor.powi(year as i32))
    }
}

impl Iterator for GrowthProjection {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.next_year > self.years {
            return None;
        }
        let value = self.value_at(self.next_year);
        self.next_year += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.years + 1).saturating_sub(self.next_year) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for GrowthProjection {}

// ============================================================================
// RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthResult {
    /// Year 0 through the final year, length = years + 1
    pub yearly_projected_values: Vec<f64>,
}

impl GrowthResult {
    pub fn initial_value(&self) -> f64 {
        self.yearly_projected_values.first().copied().unwrap_or(0.0)
    }

    pub fn final_value(&self) -> f64 {
        self.yearly_projected_values.last().copied().unwrap_or(0.0)
    }

    pub fn is_decrease(&self) -> bool {
        self.final_value() < self.initial_value()
    }

    pub fn summary(&self) -> String {
        if self.is_decrease() {
            format!(
                "Your projected growth value will be {:.2}, which is a decrease.",
                self.final_value()
            )
        } else {
            format!("Your projected growth value will be {:.2}.", self.final_value())
        }
    }
}

pub fn project_growth(input: &GrowthInput) -> Result<GrowthResult, CalcError> {
    let values: Vec<f64> = input.projection()?.collect();
    debug!(years = input.years, final_value = ?values.last(), "growth projected");

    Ok(GrowthResult {
        yearly_projected_values: values,
    })
}
