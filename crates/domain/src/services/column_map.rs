//! Shaping report records into spreadsheet rows.

use crate::models::{ColumnMapping, ReportFields};

/// Minimum row width. Keeps sheets visually consistent (A through Z) even
/// when the mapping only touches a few columns.
pub const MIN_ROW_WIDTH: usize = 26;

/// Field names rendered as money: parsed as a float and written with exactly
/// two decimal places.
const MONETARY_FIELDS: &[&str] = &[
    "spend",
    "budget",
    "daily_budget",
    "lifetime_budget",
    "spend_cap",
    "amount_spent",
    "cpc",
    "cpm",
];

/// Builds one spreadsheet row from a record and a column mapping.
///
/// When `date` is given it lands in column A, overriding any field the
/// mapping assigned there. The returned row is untrimmed; callers trim data
/// rows with [`trim_trailing_empty`] before writing.
pub fn map_to_row<R: ReportFields>(
    record: &R,
    mapping: &ColumnMapping,
    date: Option<&str>,
) -> Vec<String> {
    let width = mapping
        .max_index()
        .map(|max| max + 1)
        .unwrap_or(0)
        .max(MIN_ROW_WIDTH);
    let mut row = vec![String::new(); width];

    for (field, index) in mapping.targets() {
        row[index] = format_field(field, record.field(field));
    }

    if let Some(date) = date {
        // The date column takes priority over anything mapped to A.
        row[0] = date.to_string();
    }

    row
}

/// Header row for the interactive export path: field names in their mapped
/// columns, with a "Date" label in column A when the date column is enabled.
/// Never trimmed, so the header stays visually complete.
pub fn header_row(mapping: &ColumnMapping, include_date: bool) -> Vec<String> {
    let width = mapping
        .max_index()
        .map(|max| max + 1)
        .unwrap_or(0)
        .max(MIN_ROW_WIDTH);
    let mut row = vec![String::new(); width];

    for (field, index) in mapping.targets() {
        row[index] = field.to_string();
    }

    if include_date {
        row[0] = "date".to_string();
    }

    row
}

/// Drops trailing all-empty cells, shrinking the write payload.
pub fn trim_trailing_empty(mut row: Vec<String>) -> Vec<String> {
    while row.last().is_some_and(|cell| cell.is_empty()) {
        row.pop();
    }
    row
}

fn format_field(field: &str, value: Option<String>) -> String {
    let Some(value) = value else {
        return String::new();
    };

    if MONETARY_FIELDS.contains(&field) {
        if let Ok(amount) = value.parse::<f64>() {
            return format!("{amount:.2}");
        }
    }

    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InsightRow;
    use std::collections::HashMap;

    fn mapping(pairs: &[(&str, &str)]) -> ColumnMapping {
        ColumnMapping(
            pairs
                .iter()
                .map(|(field, col)| (field.to_string(), col.to_string()))
                .collect(),
        )
    }

    fn insight_with_spend(spend: &str) -> InsightRow {
        let mut row = InsightRow::empty("1");
        row.spend = Some(spend.to_string());
        row
    }

    #[test]
    fn test_spend_lands_in_mapped_column_with_two_decimals() {
        let row = map_to_row(&insight_with_spend("12.345"), &mapping(&[("spend", "K")]), None);
        assert!(row.len() >= 11);
        assert_eq!(row[10], "12.35");
    }

    #[test]
    fn test_monetary_rounding_edge_cases() {
        assert_eq!(format_field("spend", Some("5".to_string())), "5.00");
        assert_eq!(format_field("spend", Some("0.005".to_string())), "0.01");
        // Unparsable money passes through untouched.
        assert_eq!(format_field("spend", Some("n/a".to_string())), "n/a");
        // Non-monetary fields are never reformatted.
        assert_eq!(format_field("clicks", Some("12.345".to_string())), "12.345");
    }

    #[test]
    fn test_missing_field_renders_empty() {
        let row = map_to_row(
            &InsightRow::empty("1"),
            &mapping(&[("impressions", "C")]),
            None,
        );
        assert_eq!(row[2], "");
    }

    #[test]
    fn test_minimum_width_is_26() {
        let row = map_to_row(&insight_with_spend("1"), &mapping(&[("spend", "B")]), None);
        assert_eq!(row.len(), MIN_ROW_WIDTH);
    }

    #[test]
    fn test_wide_mapping_extends_past_26() {
        let row = map_to_row(&insight_with_spend("1"), &mapping(&[("spend", "AB")]), None);
        assert_eq!(row.len(), 28);
        assert_eq!(row[27], "1.00");
    }

    #[test]
    fn test_date_overrides_column_a() {
        let mut record = InsightRow::empty("1");
        record.impressions = Some("900".to_string());
        let row = map_to_row(
            &record,
            &mapping(&[("impressions", "A")]),
            Some("14/03/2024"),
        );
        assert_eq!(row[0], "14/03/2024");
    }

    #[test]
    fn test_trim_trailing_empty() {
        let row = vec![
            "A".to_string(),
            "B".to_string(),
            String::new(),
            String::new(),
            String::new(),
        ];
        assert_eq!(trim_trailing_empty(row), vec!["A".to_string(), "B".to_string()]);

        let gap = vec!["A".to_string(), String::new(), "C".to_string()];
        // Interior empties survive.
        assert_eq!(trim_trailing_empty(gap).len(), 3);

        assert!(trim_trailing_empty(vec![String::new(); 4]).is_empty());
    }

    #[test]
    fn test_header_row_stays_full_width() {
        let header = header_row(&mapping(&[("spend", "K"), ("name", "B")]), true);
        assert_eq!(header.len(), MIN_ROW_WIDTH);
        assert_eq!(header[0], "date");
        assert_eq!(header[1], "name");
        assert_eq!(header[10], "spend");
    }
}
