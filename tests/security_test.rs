//! Security Tests
//!
//! Upload name sanitising, extension allow-listing and input size limits.

use rust_xlsxwriter::*;
use std::io::Cursor;

use bs2ad::security::{converted_filename, secure_filename, validate_upload_name};
use bs2ad::{
    Bs2AdError, ColumnSelection, ConverterBuilder, OutputFormat, SecurityConfig, UploadWorkspace,
};

fn small_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "Miti").unwrap();
    worksheet.write_string(1, 0, "2079/01/15").unwrap();
    workbook.save_to_buffer().unwrap()
}

/// Path traversal in the upload name stays inside the workspace
#[test]
fn test_path_traversal_is_neutralised() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("uploads");
    let workspace = UploadWorkspace::open(&root).unwrap();

    let stored = workspace
        .save_upload("../../outside.xlsx", &small_workbook())
        .unwrap();

    assert_eq!(stored, "outside.xlsx");
    assert!(root.join("outside.xlsx").exists());
    assert!(!tmp.path().join("outside.xlsx").exists());
}

#[test]
fn test_windows_separators_are_neutralised() {
    assert_eq!(
        secure_filename("..\\..\\windows\\system32\\evil.xlsx"),
        "windows_system32_evil.xlsx"
    );
}

#[test]
fn test_extension_allow_list() {
    for name in ["a.xlsx", "a.xls", "A.XLSX", "report.final.Xls"] {
        assert!(validate_upload_name(name).is_ok(), "{} should be allowed", name);
    }
    for name in ["a.csv", "a.xlsm", "a.xlsx.exe", "xlsx", ".xlsx", ""] {
        assert!(
            matches!(validate_upload_name(name), Err(Bs2AdError::UnsupportedFile(_))),
            "{} should be rejected",
            name
        );
    }
}

#[test]
fn test_rejected_upload_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let workspace = UploadWorkspace::open(tmp.path()).unwrap();

    assert!(workspace.save_upload("payload.sh", b"#!/bin/sh").is_err());
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[test]
fn test_input_size_limit_on_convert() {
    let input = small_workbook();
    let converter = ConverterBuilder::new()
        .with_max_input_size(input.len() as u64 - 1)
        .build()
        .unwrap();

    let result = converter.convert(Cursor::new(input), &mut Vec::new(), ColumnSelection::Auto);
    match result {
        Err(Bs2AdError::SecurityViolation(msg)) => {
            assert!(msg.contains("exceeds maximum"));
        }
        e => panic!("Unexpected result: {:?}", e),
    }
}

#[test]
fn test_input_size_limit_on_upload() {
    let tmp = tempfile::tempdir().unwrap();
    let workspace = UploadWorkspace::open(tmp.path())
        .unwrap()
        .with_security(SecurityConfig {
            max_input_file_size: 16,
        });

    let result = workspace.save_upload("big.xlsx", &small_workbook());
    assert!(matches!(result, Err(Bs2AdError::SecurityViolation(_))));
    assert!(!tmp.path().join("big.xlsx").exists());
}

#[test]
fn test_convert_only_reads_stored_names() {
    let tmp = tempfile::tempdir().unwrap();
    let outside = tmp.path().join("secret.xlsx");
    std::fs::write(&outside, small_workbook()).unwrap();

    let workspace = UploadWorkspace::open(tmp.path().join("uploads")).unwrap();
    let converter = ConverterBuilder::new().build().unwrap();

    let result = workspace.convert(&converter, "../secret.xlsx", ColumnSelection::Auto);
    assert!(matches!(result, Err(Bs2AdError::UnsupportedFile(_))));
}

#[test]
fn test_garbage_upload_fails_to_parse() {
    let tmp = tempfile::tempdir().unwrap();
    let workspace = UploadWorkspace::open(tmp.path()).unwrap();
    let converter = ConverterBuilder::new().build().unwrap();

    let stored = workspace.save_upload("fake.xlsx", b"not really a workbook").unwrap();
    let result = workspace.convert(&converter, &stored, ColumnSelection::Auto);

    assert!(result.is_err());
    assert!(!tmp.path().join("converted_fake.xlsx").exists());
}

#[test]
fn test_output_names() {
    assert_eq!(
        converted_filename("ledger.xlsx", OutputFormat::Xlsx),
        "converted_ledger.xlsx"
    );
    assert_eq!(
        converted_filename("ledger.xls", OutputFormat::Xlsx),
        "converted_ledger.xlsx"
    );
    assert_eq!(
        converted_filename("ledger.xls", OutputFormat::Csv),
        "converted_ledger.csv"
    );
}
