//! Spreadsheet Table Parser
//!
//! Multi-format parser turning the two positional spreadsheet exports
//! (delivery reporting and document registration) into typed rows.
//!
//! The column contract is positional: the exports carry no reliable headers,
//! so cells are addressed by fixed offsets (see [`columns`]). A row that
//! fails the required-field contract is skipped and reported in
//! [`ParsedTable::skipped`]; only an unreadable workbook/stream is an error.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::path::Path;
use uuid::Uuid;
use validator::Validate;

use pretenza_models::{RegistrationRow, ReportingRow};

use crate::validation::format_validation_errors;

/// Fixed column offsets of the source exports.
pub mod columns {
    pub mod reporting {
        pub const ORDER_ID: usize = 6;
        pub const CONTRACTOR: usize = 9;
        pub const ITEM_NUMBER: usize = 10;
        pub const ITEM_NAME: usize = 11;
        pub const UNIT: usize = 12;
        pub const QUANTITY: usize = 13;
        pub const AMOUNT: usize = 16;
        pub const PLANNED_DATE: usize = 17;
        pub const ACTUAL_DATE: usize = 29;
    }

    pub mod registration {
        pub const ENTITY_NAME: usize = 2;
        pub const ORDER_ID: usize = 5;
        pub const REG_NUMBER: usize = 7;
        pub const REG_DATE: usize = 15;
    }
}

/// Worksheet the reporting export keeps its data on, when present.
const REPORTING_SHEET: &str = "Внутригрупповая отчетность";

/// Supported table file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Excel, // XLSX/XLS
}

impl TableFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" => Some(Self::Excel),
            _ => None,
        }
    }

    /// Detect format from content type header
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            "text/csv" | "application/csv" => Some(Self::Csv),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
                Some(Self::Excel)
            }
            "application/vnd.ms-excel" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// A parsed table with the rows that passed the contract and a note for
/// every physical row that did not.
#[derive(Debug, Clone)]
pub struct ParsedTable<T> {
    pub id: Uuid,
    pub filename: String,
    pub format: TableFormat,
    pub rows: Vec<T>,
    pub total_rows: usize,
    pub skipped: Vec<String>,
}

/// Parse the delivery-reporting export from bytes.
pub fn parse_reporting(
    filename: &str,
    data: &[u8],
    format: Option<TableFormat>,
) -> Result<ParsedTable<ReportingRow>> {
    parse_table(filename, data, format, Some(REPORTING_SHEET), reporting_row)
}

/// Parse the document-registration export from bytes.
pub fn parse_registration(
    filename: &str,
    data: &[u8],
    format: Option<TableFormat>,
) -> Result<ParsedTable<RegistrationRow>> {
    parse_table(filename, data, format, None, registration_row)
}

fn parse_table<T>(
    filename: &str,
    data: &[u8],
    format: Option<TableFormat>,
    preferred_sheet: Option<&str>,
    map_row: fn(&[Cell]) -> Result<T, String>,
) -> Result<ParsedTable<T>> {
    let format = format
        .or_else(|| TableFormat::from_extension(Path::new(filename)))
        .context("Could not determine table file format")?;

    let raw_rows = match format {
        TableFormat::Csv => read_csv(data)?,
        TableFormat::Excel => read_excel(data, preferred_sheet)?,
    };

    let mut rows = Vec::new();
    let mut skipped = Vec::new();
    let mut total_rows = 0;

    // Row 1 is the header line in both formats.
    for (idx, cells) in raw_rows.into_iter().enumerate().skip(1) {
        if cells.iter().all(|c| matches!(c, Cell::Empty)) {
            continue;
        }
        total_rows += 1;
        match map_row(&cells) {
            Ok(row) => rows.push(row),
            Err(reason) => skipped.push(format!("Row {}: {}", idx + 1, reason)),
        }
    }

    Ok(ParsedTable {
        id: Uuid::new_v4(),
        filename: filename.to_string(),
        format,
        rows,
        total_rows,
        skipped,
    })
}

fn reporting_row(cells: &[Cell]) -> Result<ReportingRow, String> {
    use columns::reporting::*;

    let order_id = text(cells, ORDER_ID).ok_or("missing order identifier")?;
    let contractor = text(cells, CONTRACTOR).ok_or("missing contractor name")?;
    let planned_date =
        date(cells, PLANNED_DATE).ok_or("missing or unparseable planned date")?;

    let row = ReportingRow {
        order_id,
        contractor,
        planned_date,
        actual_date: date(cells, ACTUAL_DATE),
        amount: number(cells, AMOUNT).unwrap_or(0.0),
        item_number: text(cells, ITEM_NUMBER).unwrap_or_default(),
        item_name: text(cells, ITEM_NAME).unwrap_or_default(),
        unit: text(cells, UNIT).unwrap_or_default(),
        quantity: text(cells, QUANTITY).unwrap_or_default(),
    };

    row.validate()
        .map_err(|e| format_validation_errors(&e))?;
    Ok(row)
}

fn registration_row(cells: &[Cell]) -> Result<RegistrationRow, String> {
    use columns::registration::*;

    let order_id = text(cells, ORDER_ID).ok_or("missing order identifier")?;

    let row = RegistrationRow {
        order_id,
        entity_name: text(cells, ENTITY_NAME).unwrap_or_default(),
        reg_number: text(cells, REG_NUMBER).unwrap_or_default(),
        reg_date: date(cells, REG_DATE),
    };

    row.validate()
        .map_err(|e| format_validation_errors(&e))?;
    Ok(row)
}

/// One spreadsheet cell, already narrowed to what the contract cares about.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

fn text(cells: &[Cell], idx: usize) -> Option<String> {
    match cells.get(idx)? {
        Cell::Text(s) => Some(s.clone()),
        // Order ids and registration numbers come through as numbers when the
        // export cell is numeric.
        Cell::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => {
            Some(format!("{}", *v as i64))
        }
        Cell::Number(v) => Some(v.to_string()),
        Cell::Date(d) => Some(d.format("%d.%m.%Y").to_string()),
        Cell::Empty => None,
    }
}

fn number(cells: &[Cell], idx: usize) -> Option<f64> {
    match cells.get(idx)? {
        Cell::Number(v) => Some(*v),
        Cell::Text(s) => parse_decimal(s),
        _ => None,
    }
}

fn date(cells: &[Cell], idx: usize) -> Option<NaiveDate> {
    match cells.get(idx)? {
        Cell::Date(d) => Some(*d),
        Cell::Number(v) => excel_serial_date(*v),
        Cell::Text(s) => parse_date(s),
        Cell::Empty => None,
    }
}

/// Decimal with either point or comma separator, spaces allowed as grouping.
fn parse_decimal(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned.parse().ok()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%d.%m.%Y", "%Y-%m-%d", "%d/%m/%Y"];
    const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%d.%m.%Y %H:%M:%S"];

    let raw = raw.trim();
    for format in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(raw, format) {
            return Some(parsed);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.date());
        }
    }
    None
}

/// Excel serial datetime (days since 1899-12-30, time as the fraction).
fn excel_serial_date(serial: f64) -> Option<NaiveDate> {
    if !(0.0..2_958_466.0).contains(&serial) {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::days(serial.trunc() as i64))
}

fn read_csv(data: &[u8]) -> Result<Vec<Vec<Cell>>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(data);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("Failed to read CSV record")?;
        let cells = record
            .iter()
            .map(|value| {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(trimmed.to_string())
                }
            })
            .collect();
        rows.push(cells);
    }
    Ok(rows)
}

fn read_excel(data: &[u8], preferred_sheet: Option<&str>) -> Result<Vec<Vec<Cell>>> {
    use calamine::{open_workbook_from_rs, DataType, Reader, Xlsx};

    let cursor = std::io::Cursor::new(data);
    let mut workbook: Xlsx<_> =
        open_workbook_from_rs(cursor).context("Failed to open Excel workbook")?;

    let sheet_names = workbook.sheet_names().to_vec();
    let sheet_name = preferred_sheet
        .filter(|name| sheet_names.iter().any(|s| s == name))
        .map(|name| name.to_string())
        .or_else(|| sheet_names.first().cloned())
        .context("No sheets found in workbook")?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .context("Failed to read worksheet")??;

    let rows = range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell: &DataType| match cell {
                    DataType::String(s) => {
                        let trimmed = s.trim();
                        if trimmed.is_empty() {
                            Cell::Empty
                        } else {
                            Cell::Text(trimmed.to_string())
                        }
                    }
                    DataType::Int(v) => Cell::Number(*v as f64),
                    DataType::Float(v) => Cell::Number(*v),
                    DataType::DateTime(v) => match excel_serial_date(*v) {
                        Some(d) => Cell::Date(d),
                        None => Cell::Number(*v),
                    },
                    DataType::Bool(v) => Cell::Text(v.to_string()),
                    _ => Cell::Empty,
                })
                .collect()
        })
        .collect();

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Quotes a CSV field if it contains characters that would otherwise
    // change how the line is split into columns.
    fn csv_quote(value: &str) -> String {
        if value.contains(',') || value.contains('"') || value.contains('\n') {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }

    // Builds one physical CSV line with values planted at fixed offsets.
    fn csv_line(values: &[(usize, &str)]) -> String {
        let width = 30;
        let mut cells = vec![String::new(); width];
        for (idx, value) in values {
            cells[*idx] = csv_quote(value);
        }
        cells.join(",")
    }

    fn reporting_csv(lines: &[String]) -> String {
        let header = csv_line(&[]);
        std::iter::once(header)
            .chain(lines.iter().cloned())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(
            TableFormat::from_extension(Path::new("reporting.xlsx")),
            Some(TableFormat::Excel)
        );
        assert_eq!(
            TableFormat::from_extension(Path::new("registry.csv")),
            Some(TableFormat::Csv)
        );
        assert_eq!(TableFormat::from_extension(Path::new("notes.txt")), None);
        assert_eq!(
            TableFormat::from_content_type("text/csv"),
            Some(TableFormat::Csv)
        );
        assert_eq!(
            TableFormat::from_content_type(
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            ),
            Some(TableFormat::Excel)
        );
    }

    #[test]
    fn test_parse_reporting_valid_row() {
        use columns::reporting::*;
        let line = csv_line(&[
            (ORDER_ID, "ORD-5"),
            (CONTRACTOR, "ООО \"Ромашка\""),
            (ITEM_NUMBER, "П-1"),
            (ITEM_NAME, "Клапан"),
            (UNIT, "шт"),
            (QUANTITY, "4"),
            (AMOUNT, "1500,50"),
            (PLANNED_DATE, "01.03.2025"),
            (ACTUAL_DATE, "10.03.2025"),
        ]);
        let data = reporting_csv(&[line]);

        let parsed = parse_reporting("reporting.csv", data.as_bytes(), None).unwrap();
        assert_eq!(parsed.total_rows, 1);
        assert_eq!(parsed.rows.len(), 1);
        assert!(parsed.skipped.is_empty());

        let row = &parsed.rows[0];
        assert_eq!(row.order_id, "ORD-5");
        assert_eq!(row.contractor, "ООО \"Ромашка\"");
        assert!((row.amount - 1500.50).abs() < 1e-9);
        assert_eq!(
            row.planned_date,
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );
        assert_eq!(row.actual_date, NaiveDate::from_ymd_opt(2025, 3, 10));
        assert_eq!(row.item_name, "Клапан");
    }

    #[test]
    fn test_missing_planned_date_skips_row() {
        use columns::reporting::*;
        let line = csv_line(&[
            (ORDER_ID, "ORD-5"),
            (CONTRACTOR, "ООО \"Ромашка\""),
            (AMOUNT, "100"),
        ]);
        let data = reporting_csv(&[line]);

        let parsed = parse_reporting("reporting.csv", data.as_bytes(), None).unwrap();
        assert!(parsed.rows.is_empty());
        assert_eq!(parsed.skipped.len(), 1);
        assert!(parsed.skipped[0].contains("planned date"));
    }

    #[test]
    fn test_missing_order_id_skips_row_without_failing_table() {
        use columns::reporting::*;
        let bad = csv_line(&[(CONTRACTOR, "АО \"Вектор\""), (PLANNED_DATE, "01.03.2025")]);
        let good = csv_line(&[
            (ORDER_ID, "ORD-6"),
            (CONTRACTOR, "АО \"Вектор\""),
            (AMOUNT, "10"),
            (PLANNED_DATE, "01.03.2025"),
        ]);
        let data = reporting_csv(&[bad, good]);

        let parsed = parse_reporting("reporting.csv", data.as_bytes(), None).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.skipped.len(), 1);
        assert_eq!(parsed.total_rows, 2);
    }

    #[test]
    fn test_parse_registration() {
        use columns::registration::*;
        let header = csv_line(&[]);
        let line = csv_line(&[
            (ORDER_ID, "ORD-5"),
            (ENTITY_NAME, "Завод Прогресс"),
            (REG_NUMBER, "Д-2025/14"),
            (REG_DATE, "2025-01-20"),
        ]);
        let data = format!("{}\n{}", header, line);

        let parsed = parse_registration("registry.csv", data.as_bytes(), None).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        let row = &parsed.rows[0];
        assert_eq!(row.order_id, "ORD-5");
        assert_eq!(row.entity_name, "Завод Прогресс");
        assert_eq!(row.reg_date, NaiveDate::from_ymd_opt(2025, 1, 20));
    }

    #[test]
    fn test_excel_serial_date() {
        // 2025-03-01 is serial 45717 from the 1899-12-30 base.
        assert_eq!(
            excel_serial_date(45717.0),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
        assert_eq!(
            excel_serial_date(45717.75),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
        assert_eq!(excel_serial_date(-5.0), None);
    }

    #[test]
    fn test_parse_decimal_variants() {
        assert_eq!(parse_decimal("1500.50"), Some(1500.50));
        assert_eq!(parse_decimal("1500,50"), Some(1500.50));
        assert_eq!(parse_decimal("1 500,50"), Some(1500.50));
        assert_eq!(parse_decimal("n/a"), None);
    }

    #[test]
    fn test_parse_date_variants() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 1);
        assert_eq!(parse_date("01.03.2025"), expected);
        assert_eq!(parse_date("2025-03-01"), expected);
        assert_eq!(parse_date("2025-03-01 00:00:00"), expected);
        assert_eq!(parse_date("позже"), None);
    }
}
