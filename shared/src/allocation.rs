//! Blend batch allocation
//!
//! Each component's gram amount is rounded on its own. The rounded amounts
//! may not add up to the requested batch; the difference is reported so the
//! roaster can see it, and is not redistributed.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::BlendComponent;

/// Gram amount for one component of a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentAllocation {
    pub bean_name: String,
    pub percentage: Decimal,
    /// Whole grams
    pub amount_grams: Decimal,
}

/// A blend split into per-bean amounts for one batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendAllocation {
    pub components: Vec<ComponentAllocation>,
    pub requested_grams: Decimal,
    pub allocated_grams: Decimal,
}

impl BlendAllocation {
    /// Allocated minus requested; non-zero when rounding drifted
    pub fn difference(&self) -> Decimal {
        self.allocated_grams - self.requested_grams
    }

    pub fn is_exact(&self) -> bool {
        self.difference().is_zero()
    }
}

const BATCH_TOO_LARGE: &str = "Batch weight is too large";

/// Split `total_grams` across components by percentage
pub fn allocate(
    components: &[BlendComponent],
    total_grams: Decimal,
) -> Result<BlendAllocation, &'static str> {
    if total_grams <= Decimal::ZERO {
        return Err("Batch weight must be positive");
    }

    let allocations = components
        .iter()
        .map(|component| {
            Some(ComponentAllocation {
                bean_name: component.bean_name.clone(),
                percentage: component.percentage,
                amount_grams: component_amount(total_grams, component.percentage)?,
            })
        })
        .collect::<Option<Vec<_>>>()
        .ok_or(BATCH_TOO_LARGE)?;

    let allocated_grams = allocations
        .iter()
        .try_fold(Decimal::ZERO, |sum, a| sum.checked_add(a.amount_grams))
        .ok_or(BATCH_TOO_LARGE)?;

    Ok(BlendAllocation {
        components: allocations,
        requested_grams: total_grams,
        allocated_grams,
    })
}

fn component_amount(total_grams: Decimal, percentage: Decimal) -> Option<Decimal> {
    let mut amount = total_grams
        .checked_mul(percentage)?
        .checked_div(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    amount.rescale(0);
    Some(amount)
}
