//! bs2ad - Bikram Sambat to Gregorian date conversion for spreadsheets
//!
//! This crate reads a spreadsheet (XLSX or XLS), finds the column holding
//! Bikram Sambat (BS) dates, converts every cell to a Gregorian `DD/MM/YYYY`
//! string, and writes the result back with a new column inserted right after
//! the source column.
//!
//! Cells that cannot be converted never fail the workbook: they come back as
//! [`Absent`] and are written as empty cells.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::fs::File;
//! use bs2ad::{ColumnSelection, ConversionOutcome, ConverterBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a converter with default settings
//!     let converter = ConverterBuilder::new().build()?;
//!
//!     let input = File::open("ledger.xlsx")?;
//!     let output = File::create("converted_ledger.xlsx")?;
//!
//!     // Detect the date column and convert it
//!     match converter.convert(input, output, ColumnSelection::Auto)? {
//!         ConversionOutcome::Converted(report) => {
//!             println!("{} -> {}", report.column.source_column, report.column.output_column);
//!         }
//!         ConversionOutcome::NeedsColumnSelection { columns } => {
//!             println!("No date column found, pick one of: {:?}", columns);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Working with Tables
//!
//! ```rust
//! use bs2ad::{convert_column, detect_date_column, CellValue, Table};
//!
//! let mut table = Table::new("Sheet1");
//! table.push_column("Name", vec![CellValue::from("Ram"), CellValue::from("Sita")]).unwrap();
//! table.push_column("Miti", vec![CellValue::from("2079/01/15"), CellValue::from("15/01/2079")]).unwrap();
//!
//! let column = detect_date_column(&table).unwrap();
//! convert_column(&mut table, &column).unwrap();
//!
//! assert_eq!(table.column_names(), vec!["Name", "Miti", "English_Date"]);
//! assert_eq!(table.cell(0, 2), Some(&CellValue::from("28/04/2022")));
//! assert_eq!(table.cell(1, 2), Some(&CellValue::from("28/04/2022")));
//! ```
//!
//! # Uploads
//!
//! ```rust,no_run
//! use bs2ad::{ColumnSelection, ConverterBuilder, UploadWorkspace};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = ConverterBuilder::new().build()?;
//!     let workspace = UploadWorkspace::open("uploads")?;
//!
//!     let bytes = std::fs::read("ledger.xlsx")?;
//!     let stored = workspace.save_upload("ledger.xlsx", &bytes)?;
//!
//!     // Writes uploads/converted_ledger.xlsx
//!     let outcome = workspace.convert(&converter, &stored, ColumnSelection::Auto)?;
//!     println!("{:?}", outcome.report().and_then(|r| r.output_path.as_ref()));
//!     Ok(())
//! }
//! ```

mod api;
mod builder;
pub mod calendar;
mod config;
mod converter;
mod detector;
mod error;
mod output;
mod parser;
pub mod security;
mod table;
mod types;
mod workspace;

// 公開API
pub use api::{
    ColumnReport, ColumnSelection, ConversionOutcome, ConversionReport, OutputFormat,
    SheetSelector,
};
pub use builder::{Converter, ConverterBuilder};
pub use config::FileConfig;
pub use converter::{convert_column, DateConverter, DEFAULT_YEAR_FIRST_THRESHOLD};
pub use detector::{detect_date_column, ColumnDetector, DEFAULT_DETECTION_THRESHOLD};
pub use error::Bs2AdError;
pub use security::SecurityConfig;
pub use table::{unique_headers, Column, Table, DEFAULT_OUTPUT_COLUMN};
pub use types::{Absent, AbsentReason, CellValue, ParsedTriple, YearMonthDay};
pub use workspace::UploadWorkspace;
