//! Loading workbooks from disk through `open_workbook`.

use std::fs;
use std::io::Write;

use blastradius_sheets::{Error, Row, Workbook, open_workbook};
use rstest::rstest;
use tempfile::{NamedTempFile, TempDir};

// =============================================================================
// Helpers
// =============================================================================

const ESTATE_YAML: &str = "\
sections:
  AirlineEdgeRelateAirlineDCSV:
    - [Datacenter, Server]
    - [DC1, Server1]
    - [DC1, Server2]
  AirlineEdgeRelateAirlineSVAP:
    - [Server, Owner, Application]
    - [Server1, ops, App1]
  AirlineEdgeRelateBFAPv2:
    - [Business Function, Application]
    - [Booking, App1]
";

fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

// =============================================================================
// YAML
// =============================================================================

#[rstest]
#[case::yaml("estate.yaml")]
#[case::yml("estate.yml")]
#[case::upper_case_extension("ESTATE.YAML")]
fn yaml_extensions_are_recognized(#[case] file_name: &str) {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, file_name, ESTATE_YAML);

    let workbook = open_workbook(&path).unwrap();

    assert_eq!(
        workbook.section_names(),
        vec![
            "AirlineEdgeRelateAirlineDCSV",
            "AirlineEdgeRelateAirlineSVAP",
            "AirlineEdgeRelateBFAPv2",
        ]
    );
}

#[test]
fn yaml_rows_keep_source_order_and_numbers() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "estate.yaml", ESTATE_YAML);

    let workbook = open_workbook(&path).unwrap();
    let rows: Vec<Row> = workbook
        .section("AirlineEdgeRelateAirlineDCSV")
        .unwrap()
        .collect();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].field(1), Some("Datacenter"));
    assert_eq!(rows[2].number(), 3);
    assert_eq!(rows[2].field(2), Some("Server2"));
}

#[test]
fn yaml_quoted_version_like_names_stay_distinct() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "estate.yaml",
        "sections:\n  AirlineEdgeRelateBFAPv2:\n    - [Business Function, Application]\n    - [Booking, '1.10']\n    - [Booking, '1.1']\n",
    );

    let workbook = open_workbook(&path).unwrap();
    let names: Vec<String> = workbook
        .section("AirlineEdgeRelateBFAPv2")
        .unwrap()
        .skip(1)
        .filter_map(|row| row.field(2).map(str::to_string))
        .collect();

    assert_eq!(names, vec!["1.10", "1.1"]);
}

#[test]
fn yaml_unquoted_number_is_rejected_with_its_position() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "estate.yaml",
        "sections:\n  AirlineEdgeRelateBFAPv2:\n    - [Business Function, Application]\n    - [Booking, 1.10]\n",
    );

    let err = open_workbook(&path).unwrap_err();

    assert!(matches!(
        err,
        Error::NonTextCell {
            row: 2,
            column: 2,
            ..
        }
    ));
    assert!(err.to_string().contains("AirlineEdgeRelateBFAPv2"));
}

#[test]
fn yaml_third_column_is_addressable() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "estate.yaml", ESTATE_YAML);

    let workbook = open_workbook(&path).unwrap();
    let row = workbook
        .section("AirlineEdgeRelateAirlineSVAP")
        .unwrap()
        .nth(1)
        .unwrap();

    assert_eq!(row.field(1), Some("Server1"));
    assert_eq!(row.field(3), Some("App1"));
}

#[test]
fn invalid_yaml_is_reported() {
    let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
    writeln!(file, "sections: [unterminated").unwrap();

    let result = open_workbook(file.path());

    assert!(matches!(result, Err(Error::Yaml(_))));
}

#[test]
fn missing_yaml_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();

    let result = open_workbook(dir.path().join("absent.yaml"));

    assert!(matches!(result, Err(Error::Io(_))));
}

// =============================================================================
// Format dispatch
// =============================================================================

#[rstest]
#[case::csv("estate.csv", ".csv")]
#[case::json("estate.json", ".json")]
fn unknown_extensions_are_unsupported(#[case] file_name: &str, #[case] reported: &str) {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, file_name, "");

    match open_workbook(&path) {
        Err(Error::UnsupportedFormat(format)) => assert_eq!(format, reported),
        other => panic!("expected UnsupportedFormat, got {other:?}"),
    }
}

#[test]
fn file_without_extension_reports_its_path() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "estate", "");

    match open_workbook(&path) {
        Err(Error::UnsupportedFormat(format)) => assert!(format.ends_with("estate")),
        other => panic!("expected UnsupportedFormat, got {other:?}"),
    }
}

#[cfg(feature = "xlsx")]
#[test]
fn corrupt_spreadsheet_is_a_spreadsheet_error() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "estate.xlsx", "this is not a zip archive");

    let result = open_workbook(&path);

    assert!(matches!(result, Err(Error::Spreadsheet(_))));
}
