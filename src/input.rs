// 🔢 Raw input parsing
// Turns user-typed text (CLI args, query strings) into checked numbers.

use crate::error::CalcError;

/// Parse a decimal field. Rejects empty, non-numeric, NaN and infinite text.
pub fn parse_amount(field: &'static str, raw: &str) -> Result<f64, CalcError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CalcError::invalid(field, "value is required"));
    }

    let value: f64 = trimmed
        .parse()
        .map_err(|_| CalcError::invalid(field, format!("'{}' is not a number", trimmed)))?;

    ensure_finite(field, value)
}

/// Parse a whole number of years. Fractional and negative values are rejected.
pub fn parse_years(field: &'static str, raw: &str) -> Result<u32, CalcError> {
    let value = parse_amount(field, raw)?;

    if value < 0.0 {
        return Err(CalcError::invalid(field, "must not be negative"));
    }
    if value.fract() != 0.0 {
        return Err(CalcError::invalid(field, "must be a whole number of years"));
    }
    if value > u32::MAX as f64 {
        return Err(CalcError::invalid(field, "is too large"));
    }

    Ok(value as u32)
}

pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<f64, CalcError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::invalid(field, "must be a finite number"))
    }
}

pub(crate) fn ensure_positive(field: &'static str, value: f64) -> Result<f64, CalcError> {
    let value = ensure_finite(field, value)?;
    if value <= 0.0 {
        return Err(CalcError::invalid(field, "must be positive"));
    }
    Ok(value)
}

pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<f64, CalcError> {
    let value = ensure_finite(field, value)?;
    if value < 0.0 {
        return Err(CalcError::invalid(field, "must not be negative"));
    }
    Ok(value)
}

/// Round half away from zero to 2 fractional digits
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        // Near f64::MAX there are no cents left to round
        return value;
    }
    scaled.round() / 100.0
}
