//! Roast metric derivations
//!
//! Two end-of-roast conventions are tracked side by side:
//! - CS: Cooling Start, a fixed three minutes after the Final checkpoint
//! - CTP: Cooling Turning Point, a separately logged checkpoint
//!
//! Nothing here fails. A metric whose inputs are missing or out of order is
//! simply `None` and shows up as `-`.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::RoastCheckpoints;
use crate::time::EMPTY_DISPLAY;

/// Cooling starts three minutes after the Final checkpoint
pub const COOLING_START_OFFSET_SECONDS: u32 = 180;

/// Timing and weight metrics stored with a roast
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoastMetrics {
    pub loss_percent: Option<Decimal>,
    pub total_time_cs: Option<u32>,
    pub total_time_ctp: Option<u32>,
    pub dev_time_cs: Option<u32>,
    pub dev_time_ctp: Option<u32>,
    pub dtr_cs: Option<Decimal>,
    pub dtr_ctp: Option<Decimal>,
}

impl RoastMetrics {
    /// Derive every metric from raw checkpoint times and weights
    pub fn derive(
        checkpoints: &RoastCheckpoints,
        green_weight: Option<Decimal>,
        roasted_weight: Option<Decimal>,
    ) -> Self {
        let first_crack = checkpoints.first_crack_start.time_seconds;
        let total_time_cs = checkpoints.effective_cooling_start();
        let total_time_ctp = checkpoints.cooling_turning_point.time_seconds;

        let dev_time_cs = derive_development_time(total_time_cs, first_crack);
        let dev_time_ctp = derive_development_time(total_time_ctp, first_crack);

        Self {
            loss_percent: derive_weight_loss(green_weight, roasted_weight),
            total_time_cs,
            total_time_ctp,
            dev_time_cs,
            dev_time_ctp,
            dtr_cs: dev_time_cs.and_then(|dev| derive_dtr(dev, total_time_cs?)),
            dtr_ctp: dev_time_ctp.and_then(|dev| derive_dtr(dev, total_time_ctp?)),
        }
    }
}

/// Final checkpoint time plus the cooling offset
pub fn derive_cooling_start(final_time_seconds: Option<u32>) -> Option<u32> {
    final_time_seconds
        .filter(|t| *t > 0)
        .map(|t| t + COOLING_START_OFFSET_SECONDS)
}

/// Time from first crack start to the end of roast.
///
/// Only defined when both times are positive and first crack comes first.
pub fn derive_development_time(
    end_seconds: Option<u32>,
    first_crack_start_seconds: Option<u32>,
) -> Option<u32> {
    match (end_seconds, first_crack_start_seconds) {
        (Some(end), Some(fcs)) if end > 0 && fcs > 0 && fcs < end => Some(end - fcs),
        _ => None,
    }
}

/// Development time ratio as a percentage with one decimal
pub fn derive_dtr(development_seconds: u32, end_seconds: u32) -> Option<Decimal> {
    if end_seconds == 0 {
        return None;
    }
    let ratio = Decimal::from(development_seconds) / Decimal::from(end_seconds);
    Some(round_half_up(ratio * Decimal::ONE_HUNDRED, 1))
}

/// Weight loss percentage with two decimals.
///
/// Both weights must be positive. Weights whose ratio does not fit a
/// `Decimal` give no value.
pub fn derive_weight_loss(
    green_weight: Option<Decimal>,
    roasted_weight: Option<Decimal>,
) -> Option<Decimal> {
    let green = green_weight.filter(|w| *w > Decimal::ZERO)?;
    let roasted = roasted_weight.filter(|w| *w > Decimal::ZERO)?;
    let loss = green
        .checked_sub(roasted)?
        .checked_div(green)?
        .checked_mul(Decimal::ONE_HUNDRED)?;
    Some(round_half_up(loss, 2))
}

/// Temperatures for the Final, Final-1 and Final-2 checkpoints from the
/// basic final temperature
pub fn derive_final_temperatures(final_temp: Decimal) -> (Decimal, Decimal, Decimal) {
    (
        round_half_up(final_temp, 1),
        round_half_up(final_temp - Decimal::ONE, 1),
        round_half_up(final_temp - Decimal::from(2), 1),
    )
}

/// Round half away from zero and pin the scale so `15` renders as `15.00`
pub fn round_half_up(value: Decimal, decimal_places: u32) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(decimal_places);
    rounded
}

/// Render a percentage metric, `-` when absent
pub fn format_percent(value: Option<Decimal>) -> String {
    match value {
        Some(v) => format!("{}%", v),
        None => EMPTY_DISPLAY.to_string(),
    }
}
