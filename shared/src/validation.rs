//! Validation utilities for roast and blend input

use rust_decimal::Decimal;

/// Longest bean or blend name accepted
pub const MAX_NAME_LENGTH: usize = 200;

// ============================================================================
// Blend Validations
// ============================================================================

/// Validate blend percentages sum to exactly 100.
///
/// Percentages are decimals, so `33.3 + 33.3 + 33.4` is exactly 100 and no
/// tolerance is applied.
pub fn validate_blend_percentages(percentages: &[Decimal]) -> Result<(), &'static str> {
    if percentages.is_empty() {
        return Err("A blend needs at least one bean");
    }
    for p in percentages {
        if *p < Decimal::ZERO || *p > Decimal::ONE_HUNDRED {
            return Err("Blend percentages must be between 0 and 100");
        }
    }
    let total: Decimal = percentages.iter().sum();
    if total != Decimal::ONE_HUNDRED {
        return Err("Blend percentages must sum to 100%");
    }
    Ok(())
}

/// Validate a batch weight for blend allocation
pub fn validate_batch_weight(weight_grams: Decimal) -> Result<(), &'static str> {
    if weight_grams <= Decimal::ZERO {
        return Err("Batch weight must be positive");
    }
    Ok(())
}

// ============================================================================
// Roast Validations
// ============================================================================

/// A roast is only saved once its Final checkpoint time is logged
pub fn validate_final_time(final_time_seconds: Option<u32>) -> Result<(), &'static str> {
    match final_time_seconds {
        Some(t) if t > 0 => Ok(()),
        _ => Err("Final time is required"),
    }
}

/// Weights are optional but cannot be negative
pub fn validate_weight(weight_grams: Option<Decimal>) -> Result<(), &'static str> {
    match weight_grams {
        Some(w) if w < Decimal::ZERO => Err("Weight cannot be negative"),
        _ => Ok(()),
    }
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate a bean name from the bean manager or a blend component
pub fn validate_bean_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Bean name is required");
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err("Bean name is too long");
    }
    Ok(())
}
