//! Roast history sheet

use std::io::Read;

use chrono::Local;
use shared::{format_time, parse_recorded_time, CheckpointKind, Roast, RoastInput};

use super::{cell, write_csv, ParsedSheet, SheetReader, SheetRow};
use crate::error::AppResult;

const ROAST_DATE: &str = "Roast Date";
const SAVED_DATE: &str = "Saved Date";
const SAVED_TIME: &str = "Saved Time";
const BEAN_NAME: &str = "Bean Name";
const ENV_TEMP: &str = "Env Temp (°C)";
const CHARGE_TEMP: &str = "Charge Temp (°C)";
const FINAL_TEMP: &str = "Final Temp (°C)";
const GREEN_WEIGHT: &str = "Green Weight (g)";
const ROASTED_WEIGHT: &str = "Roasted Weight (g)";
const LOSS: &str = "Loss (%)";
const TOTAL_TIME_CS: &str = "Total Time (CS)";
const TOTAL_TIME_CTP: &str = "Total Time (CTP)";
const DEV_TIME_CS: &str = "Dev Time (CS)";
const DEV_TIME_CTP: &str = "Dev Time (CTP)";
const DTR_CS: &str = "DTR CS (%)";
const DTR_CTP: &str = "DTR CTP (%)";
const ROAST_PLAN: &str = "Roast Plan";
const ROAST_NOTES: &str = "Roast Notes";

/// Columns a roast sheet must have to be imported
pub const REQUIRED_COLUMNS: [&str; 4] = [ROAST_DATE, BEAN_NAME, GREEN_WEIGHT, ROASTED_WEIGHT];

/// Header row of the roast sheet, in export order
pub fn roast_columns() -> Vec<String> {
    let mut columns: Vec<String> = [
        ROAST_DATE,
        SAVED_DATE,
        SAVED_TIME,
        BEAN_NAME,
        ENV_TEMP,
        CHARGE_TEMP,
        FINAL_TEMP,
        GREEN_WEIGHT,
        ROASTED_WEIGHT,
        LOSS,
    ]
    .iter()
    .map(|c| c.to_string())
    .collect();

    for kind in CheckpointKind::ALL {
        columns.push(kind.time_column());
        columns.push(kind.temp_column());
    }

    columns.extend(
        [
            TOTAL_TIME_CS,
            TOTAL_TIME_CTP,
            DEV_TIME_CS,
            DEV_TIME_CTP,
            DTR_CS,
            DTR_CTP,
            ROAST_PLAN,
            ROAST_NOTES,
        ]
        .iter()
        .map(|c| c.to_string()),
    );
    columns
}

/// Render roasts as a roast sheet, one row per roast in the given order
pub fn export_roasts(roasts: &[Roast]) -> AppResult<String> {
    let rows: Vec<Vec<String>> = roasts.iter().map(roast_row).collect();
    write_csv(&roast_columns(), &rows)
}

fn roast_row(roast: &Roast) -> Vec<String> {
    let saved_at = roast.saved_at.with_timezone(&Local);
    let metrics = &roast.metrics;

    let mut row = vec![
        roast.roast_date.format("%Y-%m-%d").to_string(),
        saved_at.format("%-m/%-d/%Y").to_string(),
        saved_at.format("%-I:%M:%S %p").to_string(),
        roast.bean_name.clone(),
        cell(roast.env_temp_celsius),
        cell(roast.charge_temp_celsius),
        cell(roast.final_temp_celsius),
        cell(roast.green_weight_grams),
        cell(roast.roasted_weight_grams),
        cell(metrics.loss_percent),
    ];

    for (_, checkpoint) in roast.checkpoints.iter() {
        row.push(time_cell(checkpoint.time_seconds));
        row.push(cell(checkpoint.temp_celsius));
    }

    row.extend([
        time_cell(metrics.total_time_cs),
        time_cell(metrics.total_time_ctp),
        time_cell(metrics.dev_time_cs),
        time_cell(metrics.dev_time_ctp),
        cell(metrics.dtr_cs),
        cell(metrics.dtr_ctp),
        roast.roast_plan.clone().unwrap_or_default(),
        roast.roast_notes.clone().unwrap_or_default(),
    ]);
    row
}

fn time_cell(seconds: Option<u32>) -> String {
    cell(seconds.map(format_time))
}

/// Read a roast sheet into form inputs.
///
/// Derived columns are ignored; they are recomputed when the roasts are
/// saved. Rows without a bean name or a readable roast date are skipped.
pub fn import_roasts<R: Read>(reader: R) -> AppResult<ParsedSheet<RoastInput>> {
    let sheet = SheetReader::from_reader(reader)?;
    sheet.require(&REQUIRED_COLUMNS)?;

    let mut rows = Vec::new();
    let mut skipped = 0;

    for (line, row) in sheet.rows().enumerate() {
        match roast_input(&row) {
            Some(input) => rows.push(input),
            None => {
                tracing::warn!("Skipping roast row {}: missing bean name or roast date", line + 2);
                skipped += 1;
            }
        }
    }

    Ok(ParsedSheet { rows, skipped })
}

fn roast_input(row: &SheetRow<'_>) -> Option<RoastInput> {
    let bean_name = row.owned_text(BEAN_NAME)?;
    let roast_date = row.date(ROAST_DATE)?;

    let mut input = RoastInput {
        roast_date: Some(roast_date),
        bean_name,
        env_temp_celsius: row.decimal(ENV_TEMP),
        charge_temp_celsius: row.decimal(CHARGE_TEMP),
        final_temp_celsius: row.decimal(FINAL_TEMP),
        green_weight_grams: row.decimal(GREEN_WEIGHT),
        roasted_weight_grams: row.decimal(ROASTED_WEIGHT),
        roast_plan: row.owned_text(ROAST_PLAN),
        roast_notes: row.owned_text(ROAST_NOTES),
        ..Default::default()
    };

    for kind in CheckpointKind::ALL {
        let checkpoint = input.checkpoints.get_mut(kind);
        checkpoint.time_seconds = row
            .text(&kind.time_column())
            .and_then(parse_recorded_time);
        checkpoint.temp_celsius = row.decimal(&kind.temp_column());
    }

    Some(input)
}
