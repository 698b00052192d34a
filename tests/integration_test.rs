//! Integration Tests for bs2ad
//!
//! End-to-end conversions over workbooks generated in memory with rust_xlsxwriter.
//! Converted XLSX output is read back with calamine.

use calamine::{open_workbook_auto_from_rs, Data, DataType, Range, Reader};
use chrono::NaiveDate;
use rust_xlsxwriter::*;
use std::io::Cursor;

use bs2ad::{
    Bs2AdError, ColumnSelection, ConversionOutcome, ConverterBuilder, OutputFormat, SheetSelector,
    UploadWorkspace,
};

// Helper module for generating test fixtures
mod fixtures {
    use super::*;

    /// Name / Miti (BS text) / Amount ledger
    pub fn generate_ledger() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Ledger")?;

        worksheet.write_string(0, 0, "Name")?;
        worksheet.write_string(0, 1, "Miti")?;
        worksheet.write_string(0, 2, "Amount")?;

        worksheet.write_string(1, 0, "Ram")?;
        worksheet.write_string(1, 1, "2079/01/15")?;
        worksheet.write_number(1, 2, 1500.0)?;

        worksheet.write_string(2, 0, "Sita")?;
        worksheet.write_string(2, 1, "01-01-2080")?;
        worksheet.write_number(2, 2, 250.5)?;

        // Empty date cell
        worksheet.write_string(3, 0, "Hari")?;
        worksheet.write_number(3, 2, 10.0)?;

        // Invalid BS date
        worksheet.write_string(4, 0, "Gita")?;
        worksheet.write_string(4, 1, "13/45/2079")?;
        worksheet.write_number(4, 2, 99.0)?;

        Ok(workbook.save_to_buffer()?)
    }

    /// No column looks like a BS date
    pub fn generate_without_dates() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        worksheet.write_string(0, 0, "Product")?;
        worksheet.write_string(0, 1, "Code")?;
        worksheet.write_string(1, 0, "Tea")?;
        worksheet.write_string(1, 1, "1/2/3")?;
        worksheet.write_string(2, 0, "Rice")?;
        worksheet.write_number(2, 1, 2079.0)?;

        Ok(workbook.save_to_buffer()?)
    }

    /// A column of native (already Gregorian) datetime cells
    pub fn generate_native_dates() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");

        worksheet.write_string(0, 0, "Name")?;
        worksheet.write_string(0, 1, "Date")?;

        let date = NaiveDate::from_ymd_opt(2022, 4, 28)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        worksheet.write_string(1, 0, "Ram")?;
        worksheet.write_datetime_with_format(1, 1, &date, &date_format)?;

        Ok(workbook.save_to_buffer()?)
    }

    /// Two sheets, the BS column only on the second
    pub fn generate_multi_sheets() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();

        let summary = workbook.add_worksheet();
        summary.set_name("Summary")?;
        summary.write_string(0, 0, "Total")?;
        summary.write_number(1, 0, 42.0)?;

        let entries = workbook.add_worksheet();
        entries.set_name("Entries")?;
        entries.write_string(0, 0, "Joined")?;
        entries.write_string(1, 0, "2081/01/01")?;

        Ok(workbook.save_to_buffer()?)
    }
}

fn read_back(bytes: Vec<u8>) -> (Vec<String>, Range<Data>) {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).unwrap();
    let names = workbook.sheet_names();
    let range = workbook.worksheet_range(&names[0]).unwrap();
    (names, range)
}

fn text_at(range: &Range<Data>, row: u32, col: u32) -> Option<String> {
    match range.get_value((row, col)) {
        Some(Data::String(s)) => Some(s.clone()),
        _ => None,
    }
}

#[test]
fn test_auto_detect_and_convert() {
    let input = fixtures::generate_ledger().unwrap();
    let converter = ConverterBuilder::new().build().unwrap();

    let mut output = Vec::new();
    let outcome = converter
        .convert(Cursor::new(input), &mut output, ColumnSelection::Auto)
        .unwrap();

    let report = outcome.report().expect("expected a conversion").clone();
    assert_eq!(report.sheet, "Ledger");
    assert!(report.detected);
    assert_eq!(report.column.source_column, "Miti");
    assert_eq!(report.column.output_column, "English_Date");
    assert_eq!(report.column.rows, 4);
    assert_eq!(report.column.converted, 2);
    assert_eq!(report.column.missing, 1);
    assert_eq!(report.column.invalid, 1);

    let (sheets, range) = read_back(output);
    assert_eq!(sheets, vec!["Ledger"]);

    // New column sits right after the source column
    assert_eq!(text_at(&range, 0, 0).as_deref(), Some("Name"));
    assert_eq!(text_at(&range, 0, 1).as_deref(), Some("Miti"));
    assert_eq!(text_at(&range, 0, 2).as_deref(), Some("English_Date"));
    assert_eq!(text_at(&range, 0, 3).as_deref(), Some("Amount"));

    assert_eq!(text_at(&range, 1, 2).as_deref(), Some("28/04/2022"));
    assert_eq!(text_at(&range, 2, 2).as_deref(), Some("14/04/2023"));
    assert_eq!(text_at(&range, 3, 2), None);
    assert_eq!(text_at(&range, 4, 2), None);

    // Other columns are untouched
    assert_eq!(text_at(&range, 4, 1).as_deref(), Some("13/45/2079"));
    assert_eq!(range.get_value((2, 3)).and_then(|d| d.as_f64()), Some(250.5));
}

#[test]
fn test_no_date_column_writes_nothing() {
    let input = fixtures::generate_without_dates().unwrap();
    let converter = ConverterBuilder::new().build().unwrap();

    let mut output = Vec::new();
    let outcome = converter
        .convert(Cursor::new(input), &mut output, ColumnSelection::Auto)
        .unwrap();

    assert_eq!(
        outcome,
        ConversionOutcome::NeedsColumnSelection {
            columns: vec!["Product".to_string(), "Code".to_string()]
        }
    );
    assert!(output.is_empty());
}

#[test]
fn test_named_column_skips_detection() {
    let input = fixtures::generate_without_dates().unwrap();
    let converter = ConverterBuilder::new().build().unwrap();

    let mut output = Vec::new();
    let outcome = converter
        .convert(
            Cursor::new(input),
            &mut output,
            ColumnSelection::Named("Code".to_string()),
        )
        .unwrap();

    let report = outcome.report().unwrap();
    assert!(!report.detected);
    assert_eq!(report.column.converted, 0);
    assert_eq!(report.column.rows, 2);

    let (_, range) = read_back(output);
    assert_eq!(text_at(&range, 0, 2).as_deref(), Some("English_Date"));
}

#[test]
fn test_named_column_not_found() {
    let input = fixtures::generate_ledger().unwrap();
    let converter = ConverterBuilder::new().build().unwrap();

    let mut output = Vec::new();
    let result = converter.convert(
        Cursor::new(input),
        &mut output,
        ColumnSelection::Named("Nope".to_string()),
    );

    assert!(matches!(result, Err(Bs2AdError::ColumnNotFound(ref c)) if c == "Nope"));
    assert!(output.is_empty());
}

#[test]
fn test_native_datetime_column() {
    let input = fixtures::generate_native_dates().unwrap();
    let converter = ConverterBuilder::new().build().unwrap();

    // Native datetimes are never detected
    let table = converter.load_table(Cursor::new(input.clone())).unwrap();
    assert_eq!(converter.detect_date_column(&table), None);

    let mut output = Vec::new();
    let outcome = converter
        .convert(
            Cursor::new(input),
            &mut output,
            ColumnSelection::Named("Date".to_string()),
        )
        .unwrap();
    assert_eq!(outcome.report().unwrap().column.converted, 1);

    let (_, range) = read_back(output);
    assert_eq!(text_at(&range, 1, 2).as_deref(), Some("28/04/2022"));

    // The source cell stays a date
    let expected = NaiveDate::from_ymd_opt(2022, 4, 28)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(
        range.get_value((1, 1)).and_then(|d| d.as_datetime()),
        Some(expected)
    );
}

#[test]
fn test_csv_output() {
    let input = fixtures::generate_ledger().unwrap();
    let converter = ConverterBuilder::new()
        .with_output_format(OutputFormat::Csv)
        .with_output_column("AD")
        .build()
        .unwrap();

    let mut output = Vec::new();
    converter
        .convert(Cursor::new(input), &mut output, ColumnSelection::Auto)
        .unwrap();

    let csv = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Name,Miti,AD,Amount");
    assert_eq!(lines[1], "Ram,2079/01/15,28/04/2022,1500");
    assert_eq!(lines[2], "Sita,01-01-2080,14/04/2023,250.5");
    assert_eq!(lines[3], "Hari,,,10");
    assert_eq!(lines[4], "Gita,13/45/2079,,99");
}

#[test]
fn test_sheet_selection() {
    let input = fixtures::generate_multi_sheets().unwrap();

    let by_name = ConverterBuilder::new()
        .with_sheet_selector(SheetSelector::Name("Entries".to_string()))
        .build()
        .unwrap();
    let table = by_name.load_table(Cursor::new(input.clone())).unwrap();
    assert_eq!(table.sheet_name(), "Entries");
    assert_eq!(by_name.detect_date_column(&table).as_deref(), Some("Joined"));

    let by_index = ConverterBuilder::new()
        .with_sheet_selector(SheetSelector::Index(1))
        .build()
        .unwrap();
    let mut output = Vec::new();
    let outcome = by_index
        .convert(Cursor::new(input.clone()), &mut output, ColumnSelection::Auto)
        .unwrap();
    assert_eq!(outcome.report().unwrap().sheet, "Entries");

    let (sheets, range) = read_back(output);
    assert_eq!(sheets, vec!["Entries"]);
    assert_eq!(text_at(&range, 1, 1).as_deref(), Some("13/04/2024"));

    // Default selector uses the first sheet, which has no dates
    let default = ConverterBuilder::new().build().unwrap();
    let outcome = default
        .convert(Cursor::new(input), &mut Vec::new(), ColumnSelection::Auto)
        .unwrap();
    assert!(matches!(
        outcome,
        ConversionOutcome::NeedsColumnSelection { .. }
    ));
}

#[test]
fn test_missing_sheet_is_config_error() {
    let input = fixtures::generate_ledger().unwrap();

    let converter = ConverterBuilder::new()
        .with_sheet_selector(SheetSelector::Name("Missing".to_string()))
        .build()
        .unwrap();
    let result = converter.load_table(Cursor::new(input.clone()));
    assert!(matches!(result, Err(Bs2AdError::Config(_))));

    let converter = ConverterBuilder::new()
        .with_sheet_selector(SheetSelector::Index(5))
        .build()
        .unwrap();
    let result = converter.load_table(Cursor::new(input));
    assert!(matches!(result, Err(Bs2AdError::Config(ref msg)) if msg.contains("out of range")));
}

#[test]
fn test_step_by_step_api() {
    let input = fixtures::generate_ledger().unwrap();
    let converter = ConverterBuilder::new().build().unwrap();

    let mut table = converter.load_table(Cursor::new(input)).unwrap();
    assert_eq!(table.column_names(), vec!["Name", "Miti", "Amount"]);
    assert_eq!(table.row_count(), 4);

    let column = converter.detect_date_column(&table).unwrap();
    let report = converter.convert_column(&mut table, &column).unwrap();
    assert_eq!(report.converted, 2);
    assert_eq!(
        table.column_names(),
        vec!["Name", "Miti", "English_Date", "Amount"]
    );

    let mut output = Vec::new();
    converter.save_table(&table, &mut output).unwrap();
    let (_, range) = read_back(output);
    assert_eq!(text_at(&range, 1, 2).as_deref(), Some("28/04/2022"));
}

#[test]
fn test_workspace_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    let workspace = UploadWorkspace::open(tmp.path().join("uploads")).unwrap();
    let converter = ConverterBuilder::new().build().unwrap();

    let stored = workspace
        .save_upload("march ledger.xlsx", &fixtures::generate_ledger().unwrap())
        .unwrap();
    assert_eq!(stored, "march_ledger.xlsx");

    let outcome = workspace
        .convert(&converter, &stored, ColumnSelection::Auto)
        .unwrap();
    let output_path = outcome
        .report()
        .and_then(|r| r.output_path.clone())
        .unwrap();

    assert_eq!(
        output_path,
        tmp.path().join("uploads").join("converted_march_ledger.xlsx")
    );
    let (_, range) = read_back(std::fs::read(&output_path).unwrap());
    assert_eq!(text_at(&range, 1, 2).as_deref(), Some("28/04/2022"));
}

#[test]
fn test_workspace_needs_selection_creates_no_file() {
    let tmp = tempfile::tempdir().unwrap();
    let workspace = UploadWorkspace::open(tmp.path()).unwrap();
    let converter = ConverterBuilder::new().build().unwrap();

    let stored = workspace
        .save_upload("codes.xlsx", &fixtures::generate_without_dates().unwrap())
        .unwrap();
    let outcome = workspace
        .convert(&converter, &stored, ColumnSelection::Auto)
        .unwrap();

    assert!(matches!(
        outcome,
        ConversionOutcome::NeedsColumnSelection { ref columns } if columns.len() == 2
    ));
    assert!(!tmp.path().join("converted_codes.xlsx").exists());

    // Retry with an explicit column
    let outcome = workspace
        .convert(&converter, &stored, ColumnSelection::Named("Code".to_string()))
        .unwrap();
    assert!(outcome.report().is_some());
    assert!(tmp.path().join("converted_codes.xlsx").exists());
}

#[test]
fn test_workspace_csv_output_name() {
    let tmp = tempfile::tempdir().unwrap();
    let workspace = UploadWorkspace::open(tmp.path()).unwrap();
    let converter = ConverterBuilder::new()
        .with_output_format(OutputFormat::Csv)
        .build()
        .unwrap();

    let stored = workspace
        .save_upload("ledger.xlsx", &fixtures::generate_ledger().unwrap())
        .unwrap();
    workspace
        .convert(&converter, &stored, ColumnSelection::Auto)
        .unwrap();

    let csv = std::fs::read_to_string(tmp.path().join("converted_ledger.csv")).unwrap();
    assert!(csv.starts_with("Name,Miti,English_Date,Amount\n"));
}

#[test]
fn test_report_as_json() {
    let input = fixtures::generate_ledger().unwrap();
    let converter = ConverterBuilder::new().build().unwrap();

    let outcome = converter
        .convert(Cursor::new(input), &mut Vec::new(), ColumnSelection::Auto)
        .unwrap();
    let json = serde_json::to_value(outcome.report().unwrap()).unwrap();

    assert_eq!(json["sheet"], "Ledger");
    assert_eq!(json["detected"], true);
    assert_eq!(json["source_column"], "Miti");
    assert_eq!(json["rows"], 4);
    assert_eq!(json["converted"], 2);
}
