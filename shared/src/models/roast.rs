//! Roast session models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::metrics::{derive_cooling_start, derive_final_temperatures, RoastMetrics};
use crate::types::RecordId;

/// Named moments logged during a roast, in roast order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointKind {
    TurningPoint,
    DryEnd,
    FinalMinus2,
    FinalMinus1,
    Final,
    FirstCrackStart,
    FirstCrackEnd,
    CoolingStart,
    CoolingTurningPoint,
}

impl CheckpointKind {
    pub const ALL: [CheckpointKind; 9] = [
        CheckpointKind::TurningPoint,
        CheckpointKind::DryEnd,
        CheckpointKind::FinalMinus2,
        CheckpointKind::FinalMinus1,
        CheckpointKind::Final,
        CheckpointKind::FirstCrackStart,
        CheckpointKind::FirstCrackEnd,
        CheckpointKind::CoolingStart,
        CheckpointKind::CoolingTurningPoint,
    ];

    /// Short label used on the roast sheet
    pub fn label(&self) -> &'static str {
        match self {
            CheckpointKind::TurningPoint => "TP",
            CheckpointKind::DryEnd => "Dry End",
            CheckpointKind::FinalMinus2 => "Final-2",
            CheckpointKind::FinalMinus1 => "Final-1",
            CheckpointKind::Final => "Final",
            CheckpointKind::FirstCrackStart => "1Cs",
            CheckpointKind::FirstCrackEnd => "1Ce",
            CheckpointKind::CoolingStart => "Cooling Start",
            CheckpointKind::CoolingTurningPoint => "Cooling TP",
        }
    }

    pub fn time_column(&self) -> String {
        format!("{} Time", self.label())
    }

    /// The Final checkpoint's temperature column is "Final Temp Point" so it
    /// does not collide with the basic Final Temp column.
    pub fn temp_column(&self) -> String {
        match self {
            CheckpointKind::Final => "Final Temp Point (°C)".to_string(),
            other => format!("{} Temp (°C)", other.label()),
        }
    }
}

impl std::fmt::Display for CheckpointKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Elapsed time and temperature logged at one checkpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Seconds since charge
    pub time_seconds: Option<u32>,
    pub temp_celsius: Option<Decimal>,
}

impl Checkpoint {
    pub fn new(time_seconds: Option<u32>, temp_celsius: Option<Decimal>) -> Self {
        Self {
            time_seconds,
            temp_celsius,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.time_seconds.is_none() && self.temp_celsius.is_none()
    }
}

/// All checkpoints of one roast
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoastCheckpoints {
    #[serde(default)]
    pub turning_point: Checkpoint,
    #[serde(default)]
    pub dry_end: Checkpoint,
    #[serde(default)]
    pub final_minus_2: Checkpoint,
    #[serde(default)]
    pub final_minus_1: Checkpoint,
    #[serde(default)]
    pub final_point: Checkpoint,
    #[serde(default)]
    pub first_crack_start: Checkpoint,
    #[serde(default)]
    pub first_crack_end: Checkpoint,
    #[serde(default)]
    pub cooling_start: Checkpoint,
    #[serde(default)]
    pub cooling_turning_point: Checkpoint,
}

impl RoastCheckpoints {
    pub fn get(&self, kind: CheckpointKind) -> &Checkpoint {
        match kind {
            CheckpointKind::TurningPoint => &self.turning_point,
            CheckpointKind::DryEnd => &self.dry_end,
            CheckpointKind::FinalMinus2 => &self.final_minus_2,
            CheckpointKind::FinalMinus1 => &self.final_minus_1,
            CheckpointKind::Final => &self.final_point,
            CheckpointKind::FirstCrackStart => &self.first_crack_start,
            CheckpointKind::FirstCrackEnd => &self.first_crack_end,
            CheckpointKind::CoolingStart => &self.cooling_start,
            CheckpointKind::CoolingTurningPoint => &self.cooling_turning_point,
        }
    }

    pub fn get_mut(&mut self, kind: CheckpointKind) -> &mut Checkpoint {
        match kind {
            CheckpointKind::TurningPoint => &mut self.turning_point,
            CheckpointKind::DryEnd => &mut self.dry_end,
            CheckpointKind::FinalMinus2 => &mut self.final_minus_2,
            CheckpointKind::FinalMinus1 => &mut self.final_minus_1,
            CheckpointKind::Final => &mut self.final_point,
            CheckpointKind::FirstCrackStart => &mut self.first_crack_start,
            CheckpointKind::FirstCrackEnd => &mut self.first_crack_end,
            CheckpointKind::CoolingStart => &mut self.cooling_start,
            CheckpointKind::CoolingTurningPoint => &mut self.cooling_turning_point,
        }
    }

    pub fn time_of(&self, kind: CheckpointKind) -> Option<u32> {
        self.get(kind).time_seconds
    }

    /// Logged cooling start, or Final + 3 minutes when it was left empty
    pub fn effective_cooling_start(&self) -> Option<u32> {
        self.cooling_start
            .time_seconds
            .or_else(|| derive_cooling_start(self.final_point.time_seconds))
    }

    /// Iterate checkpoints in roast order
    pub fn iter(&self) -> impl Iterator<Item = (CheckpointKind, &Checkpoint)> + '_ {
        CheckpointKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}

/// A saved roast session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roast {
    pub id: RecordId,
    pub roast_date: NaiveDate,
    /// Set on creation and refreshed on every edit
    pub saved_at: DateTime<Utc>,
    pub bean_name: String,
    pub env_temp_celsius: Option<Decimal>,
    pub charge_temp_celsius: Option<Decimal>,
    pub final_temp_celsius: Option<Decimal>,
    pub green_weight_grams: Option<Decimal>,
    pub roasted_weight_grams: Option<Decimal>,
    #[serde(default)]
    pub checkpoints: RoastCheckpoints,
    /// Derived at save time and stored as computed
    #[serde(default)]
    pub metrics: RoastMetrics,
    pub roast_plan: Option<String>,
    pub roast_notes: Option<String>,
}

impl Roast {
    /// Build a roast from form input, filling auto-derived fields and metrics
    pub fn from_input(
        id: RecordId,
        saved_at: DateTime<Utc>,
        input: RoastInput,
    ) -> Result<Self, &'static str> {
        let roast_date = input.roast_date.ok_or("Roast date is required")?;
        let bean_name = input.bean_name.trim().to_string();
        if bean_name.is_empty() {
            return Err("Bean name is required");
        }

        let mut checkpoints = input.checkpoints;
        if let Some(final_temp) = input.final_temp_celsius {
            let (point, minus_1, minus_2) = derive_final_temperatures(final_temp);
            checkpoints.final_point.temp_celsius.get_or_insert(point);
            checkpoints.final_minus_1.temp_celsius.get_or_insert(minus_1);
            checkpoints.final_minus_2.temp_celsius.get_or_insert(minus_2);
        }
        if checkpoints.cooling_start.time_seconds.is_none() {
            checkpoints.cooling_start.time_seconds = checkpoints.effective_cooling_start();
        }

        let metrics = RoastMetrics::derive(
            &checkpoints,
            input.green_weight_grams,
            input.roasted_weight_grams,
        );

        Ok(Self {
            id,
            roast_date,
            saved_at,
            bean_name,
            env_temp_celsius: input.env_temp_celsius,
            charge_temp_celsius: input.charge_temp_celsius,
            final_temp_celsius: input.final_temp_celsius,
            green_weight_grams: input.green_weight_grams,
            roasted_weight_grams: input.roasted_weight_grams,
            checkpoints,
            metrics,
            roast_plan: non_blank(input.roast_plan),
            roast_notes: non_blank(input.roast_notes),
        })
    }

    /// The form values that would reproduce this roast
    pub fn to_input(&self) -> RoastInput {
        RoastInput {
            roast_date: Some(self.roast_date),
            bean_name: self.bean_name.clone(),
            env_temp_celsius: self.env_temp_celsius,
            charge_temp_celsius: self.charge_temp_celsius,
            final_temp_celsius: self.final_temp_celsius,
            green_weight_grams: self.green_weight_grams,
            roasted_weight_grams: self.roasted_weight_grams,
            checkpoints: self.checkpoints.clone(),
            roast_plan: self.roast_plan.clone(),
            roast_notes: self.roast_notes.clone(),
        }
    }
}

/// Values submitted from the roast form or an imported row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct RoastInput {
    #[validate(required(message = "Roast date is required"))]
    pub roast_date: Option<NaiveDate>,
    #[validate(length(min = 1, max = 200, message = "Bean name is required"))]
    pub bean_name: String,
    pub env_temp_celsius: Option<Decimal>,
    pub charge_temp_celsius: Option<Decimal>,
    pub final_temp_celsius: Option<Decimal>,
    pub green_weight_grams: Option<Decimal>,
    pub roasted_weight_grams: Option<Decimal>,
    #[serde(default)]
    pub checkpoints: RoastCheckpoints,
    pub roast_plan: Option<String>,
    pub roast_notes: Option<String>,
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample_input() -> RoastInput {
        let mut input = RoastInput {
            roast_date: NaiveDate::from_ymd_opt(2024, 3, 14),
            bean_name: "  Kenya AA ".to_string(),
            final_temp_celsius: Some(dec("205.5")),
            green_weight_grams: Some(dec("250")),
            roasted_weight_grams: Some(dec("212.5")),
            ..Default::default()
        };
        input.checkpoints.final_point.time_seconds = Some(600);
        input.checkpoints.first_crack_start.time_seconds = Some(540);
        input.checkpoints.cooling_turning_point.time_seconds = Some(660);
        input
    }

    #[test]
    fn test_checkpoint_columns() {
        assert_eq!(CheckpointKind::DryEnd.time_column(), "Dry End Time");
        assert_eq!(CheckpointKind::CoolingTurningPoint.temp_column(), "Cooling TP Temp (°C)");
        assert_eq!(CheckpointKind::Final.temp_column(), "Final Temp Point (°C)");
    }

    #[test]
    fn test_checkpoints_iterate_in_roast_order() {
        let checkpoints = RoastCheckpoints::default();
        let kinds: Vec<_> = checkpoints.iter().map(|(kind, _)| kind).collect();
        assert_eq!(kinds, CheckpointKind::ALL.to_vec());
        assert!(checkpoints.iter().all(|(_, c)| c.is_empty()));
    }

    #[test]
    fn test_from_input_derives_fields() {
        let roast = Roast::from_input(1, Utc::now(), sample_input()).unwrap();

        assert_eq!(roast.bean_name, "Kenya AA");
        assert_eq!(roast.checkpoints.cooling_start.time_seconds, Some(780));
        assert_eq!(roast.checkpoints.final_point.temp_celsius, Some(dec("205.5")));
        assert_eq!(roast.checkpoints.final_minus_1.temp_celsius, Some(dec("204.5")));
        assert_eq!(roast.checkpoints.final_minus_2.temp_celsius, Some(dec("203.5")));
        assert_eq!(roast.metrics.loss_percent, Some(dec("15.00")));
        assert_eq!(roast.metrics.dev_time_ctp, Some(120));
        assert_eq!(roast.metrics.dtr_ctp, Some(dec("18.2")));
    }

    #[test]
    fn test_from_input_keeps_logged_values() {
        let mut input = sample_input();
        input.checkpoints.cooling_start.time_seconds = Some(700);
        input.checkpoints.final_minus_1.temp_celsius = Some(dec("200"));

        let roast = Roast::from_input(1, Utc::now(), input).unwrap();

        assert_eq!(roast.checkpoints.cooling_start.time_seconds, Some(700));
        assert_eq!(roast.checkpoints.final_minus_1.temp_celsius, Some(dec("200")));
        assert_eq!(roast.metrics.total_time_cs, Some(700));
    }

    #[test]
    fn test_from_input_requires_date_and_bean() {
        let mut input = sample_input();
        input.roast_date = None;
        assert!(Roast::from_input(1, Utc::now(), input).is_err());

        let mut input = sample_input();
        input.bean_name = "   ".to_string();
        assert!(Roast::from_input(1, Utc::now(), input).is_err());
    }

    #[test]
    fn test_to_input_round_trips_raw_fields() {
        let roast = Roast::from_input(7, Utc::now(), sample_input()).unwrap();
        let rebuilt = Roast::from_input(7, roast.saved_at, roast.to_input()).unwrap();
        assert_eq!(rebuilt, roast);
    }

    #[test]
    fn test_blank_notes_are_dropped() {
        let mut input = sample_input();
        input.roast_plan = Some("  ".to_string());
        input.roast_notes = Some("Bright, floral".to_string());

        let roast = Roast::from_input(1, Utc::now(), input).unwrap();

        assert_eq!(roast.roast_plan, None);
        assert_eq!(roast.roast_notes.as_deref(), Some("Bright, floral"));
    }
}
