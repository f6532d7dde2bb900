//! Bean list sheet

use std::io::Read;

use shared::BeanList;

use super::{write_csv, ParsedSheet, SheetReader};
use crate::error::AppResult;

const NUMBER: &str = "#";
const BEAN_NAME: &str = "Bean Name";

pub fn export_beans(beans: &BeanList) -> AppResult<String> {
    let rows: Vec<Vec<String>> = beans
        .iter()
        .enumerate()
        .map(|(i, name)| vec![(i + 1).to_string(), name.to_string()])
        .collect();
    write_csv(&[NUMBER.to_string(), BEAN_NAME.to_string()], &rows)
}

/// Bean names from a bean sheet; rows with an empty name are skipped
pub fn import_beans<R: Read>(reader: R) -> AppResult<ParsedSheet<String>> {
    let sheet = SheetReader::from_reader(reader)?;
    sheet.require(&[BEAN_NAME])?;

    let mut rows = Vec::new();
    let mut skipped = 0;
    for row in sheet.rows() {
        match row.owned_text(BEAN_NAME) {
            Some(name) => rows.push(name),
            None => skipped += 1,
        }
    }

    Ok(ParsedSheet { rows, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_numbers_rows() {
        let beans = BeanList::from_names(["Rwanda", "Java"]);
        let csv = export_beans(&beans).unwrap();
        assert_eq!(csv, "#,Bean Name\n1,Java\n2,Rwanda\n");
    }

    #[test]
    fn test_import_requires_bean_name_column() {
        assert!(import_beans("#,Name\n1,Java\n".as_bytes()).is_err());

        let parsed = import_beans("#,Bean Name\n1,Java\n2,\n3, Kenya AA \n".as_bytes()).unwrap();
        assert_eq!(parsed.rows, vec!["Java", "Kenya AA"]);
        assert_eq!(parsed.skipped, 1);
    }
}
