//! Spreadsheet exchange
//!
//! Each collection is exported to and imported from its own CSV sheet. Column
//! headers are matched by name, so columns may come in any order and unknown
//! columns are ignored.

pub mod beans;
pub mod blends;
pub mod roasts;

use std::collections::HashMap;
use std::io::Read;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use csv::StringRecord;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{AppError, AppResult};

pub use beans::{export_beans, import_beans};
pub use blends::{export_blends, import_blends};
pub use roasts::{export_roasts, import_roasts};

/// Day 0 of the Unix epoch as an Excel serial date
const EXCEL_UNIX_EPOCH: f64 = 25569.0;
const SECONDS_PER_DAY: f64 = 86400.0;

/// The three sheets the tracker reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SheetKind {
    Roasts,
    Beans,
    Blends,
}

impl SheetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SheetKind::Roasts => "roasts",
            SheetKind::Beans => "beans",
            SheetKind::Blends => "blends",
        }
    }

    /// `coffee_<sheet>_<YYYY-MM-DD>.csv`
    pub fn default_file_name(&self, date: NaiveDate) -> String {
        format!("coffee_{}_{}.csv", self.as_str(), date.format("%Y-%m-%d"))
    }
}

/// Rows read from a sheet, plus how many rows were unusable
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSheet<T> {
    pub rows: Vec<T>,
    pub skipped: usize,
}

/// Outcome of an import, reported back to the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Render a header row and data rows as CSV text
pub fn write_csv(headers: &[String], rows: &[Vec<String>]) -> AppResult<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(headers)?;
    for row in rows {
        wtr.write_record(row)?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
}

/// A CSV sheet with its header row indexed by column name
pub struct SheetReader {
    columns: HashMap<String, usize>,
    records: Vec<StringRecord>,
}

impl SheetReader {
    pub fn from_reader<R: Read>(reader: R) -> AppResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let columns = rdr
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim_start_matches('\u{feff}').trim().to_string(), i))
            .collect();

        let records = rdr.records().collect::<Result<Vec<_>, _>>()?;
        Ok(Self { columns, records })
    }

    /// Reject the sheet when any of `required` is missing from the header
    pub fn require(&self, required: &[&str]) -> AppResult<()> {
        let missing: Vec<String> = required
            .iter()
            .filter(|column| !self.has_column(column))
            .map(|column| column.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::MissingColumns(missing))
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Data rows, skipping rows with no content at all
    pub fn rows(&self) -> impl Iterator<Item = SheetRow<'_>> {
        self.records
            .iter()
            .filter(|record| record.iter().any(|cell| !cell.is_empty()))
            .map(move |record| SheetRow {
                columns: &self.columns,
                record,
            })
    }
}

/// One data row of a [`SheetReader`]
pub struct SheetRow<'a> {
    columns: &'a HashMap<String, usize>,
    record: &'a StringRecord,
}

impl<'a> SheetRow<'a> {
    /// Non-empty cell text under `column`
    pub fn text(&self, column: &str) -> Option<&'a str> {
        let index = *self.columns.get(column)?;
        self.record.get(index).filter(|cell| !cell.is_empty())
    }

    pub fn owned_text(&self, column: &str) -> Option<String> {
        self.text(column).map(str::to_string)
    }

    pub fn decimal(&self, column: &str) -> Option<Decimal> {
        self.text(column).and_then(parse_decimal)
    }

    pub fn date(&self, column: &str) -> Option<NaiveDate> {
        self.text(column).and_then(parse_sheet_date)
    }
}

/// Numeric cell, accepting plain and scientific notation
pub fn parse_decimal(cell: &str) -> Option<Decimal> {
    let cell = cell.trim();
    Decimal::from_str(cell)
        .or_else(|_| Decimal::from_scientific(cell))
        .ok()
}

/// Date cell as written by a spreadsheet program.
///
/// Accepts Excel serial numbers, ISO dates, RFC 3339 timestamps and US
/// `M/D/YYYY` dates.
pub fn parse_sheet_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();

    if let Ok(serial) = cell.parse::<f64>() {
        return excel_serial_to_date(serial);
    }

    NaiveDate::parse_from_str(cell, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(cell).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(cell, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| NaiveDate::parse_from_str(cell, "%m/%d/%Y").ok())
}

fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial <= 0.0 {
        return None;
    }
    let seconds = ((serial - EXCEL_UNIX_EPOCH) * SECONDS_PER_DAY).floor();
    DateTime::from_timestamp(seconds as i64, 0).map(|dt| dt.date_naive())
}

/// Empty cell for a missing value
fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
