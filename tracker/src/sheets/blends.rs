//! Blend recipe sheet
//!
//! Components are laid out as `Bean N Name` / `Bean N %` column pairs, as
//! many pairs as the largest blend needs.

use std::io::Read;

use rust_decimal::Decimal;
use shared::{Blend, BlendComponent, BlendInput};

use super::{cell, write_csv, ParsedSheet, SheetReader, SheetRow};
use crate::error::AppResult;

const BLEND_NAME: &str = "Blend Name";
const DESCRIPTION: &str = "Description";
const TOTAL_BEANS: &str = "Total Beans";

fn bean_name_column(n: usize) -> String {
    format!("Bean {} Name", n)
}

fn bean_percent_column(n: usize) -> String {
    format!("Bean {} %", n)
}

pub fn export_blends(blends: &[Blend]) -> AppResult<String> {
    let max_components = blends.iter().map(|b| b.components.len()).max().unwrap_or(0);

    let mut headers = vec![
        BLEND_NAME.to_string(),
        DESCRIPTION.to_string(),
        TOTAL_BEANS.to_string(),
    ];
    for n in 1..=max_components {
        headers.push(bean_name_column(n));
        headers.push(bean_percent_column(n));
    }

    let rows: Vec<Vec<String>> = blends
        .iter()
        .map(|blend| {
            let mut row = vec![
                blend.name.clone(),
                blend.description.clone().unwrap_or_default(),
                blend.components.len().to_string(),
            ];
            for n in 0..max_components {
                let component = blend.components.get(n);
                row.push(cell(component.map(|c| c.bean_name.clone())));
                row.push(cell(component.map(|c| c.percentage)));
            }
            row
        })
        .collect();

    write_csv(&headers, &rows)
}

/// Blend inputs from a blend sheet.
///
/// Rows without a blend name are skipped here. Percentages are checked when
/// the blends are saved.
pub fn import_blends<R: Read>(reader: R) -> AppResult<ParsedSheet<BlendInput>> {
    let sheet = SheetReader::from_reader(reader)?;
    sheet.require(&[BLEND_NAME])?;

    let mut rows = Vec::new();
    let mut skipped = 0;
    for row in sheet.rows() {
        let Some(name) = row.owned_text(BLEND_NAME) else {
            skipped += 1;
            continue;
        };
        rows.push(BlendInput {
            name,
            description: row.owned_text(DESCRIPTION),
            components: components(&sheet, &row),
        });
    }

    Ok(ParsedSheet { rows, skipped })
}

fn components(sheet: &SheetReader, row: &SheetRow<'_>) -> Vec<BlendComponent> {
    let mut components = Vec::new();
    let mut n = 1;
    while sheet.has_column(&bean_name_column(n)) {
        if let Some(bean_name) = row.owned_text(&bean_name_column(n)) {
            // unreadable percentage counts as zero and fails the sum check
            let percentage = row
                .decimal(&bean_percent_column(n))
                .unwrap_or(Decimal::ZERO);
            components.push(BlendComponent::new(bean_name, percentage));
        }
        n += 1;
    }
    components
}
