//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use blastradius_sheets::MemoryWorkbook;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Section names in merge order
pub const DCSV: &str = "AirlineEdgeRelateAirlineDCSV";
pub const SVAP: &str = "AirlineEdgeRelateAirlineSVAP";
pub const BFAP: &str = "AirlineEdgeRelateBFAPv2";

/// A three-layer estate with one entity per kind.
pub const CHAIN_YAML: &str = "\
sections:
  AirlineEdgeRelateAirlineDCSV:
    - [Datacenter, Server]
    - [DC1, Server1]
  AirlineEdgeRelateAirlineSVAP:
    - [Server, Owner, Application]
    - [Server1, ops, App1]
  AirlineEdgeRelateBFAPv2:
    - [Business Function, Application]
    - [BF1, App1]
";

/// Workbook with the given data rows under a header row in each section.
pub fn workbook(dcsv: &[(&str, &str)], svap: &[(&str, &str)], bfap: &[(&str, &str)]) -> MemoryWorkbook {
    fn rows(header: &[&str], pairs: &[(&str, &str)], spread: bool) -> Vec<Vec<String>> {
        let mut rows: Vec<Vec<String>> = vec![header.iter().map(|h| (*h).to_string()).collect()];
        for &(a, b) in pairs {
            if spread {
                rows.push(vec![a.to_string(), String::new(), b.to_string()]);
            } else {
                rows.push(vec![a.to_string(), b.to_string()]);
            }
        }
        rows
    }

    MemoryWorkbook::new()
        .with_section(DCSV, rows(&["Datacenter", "Server"], dcsv, false))
        .with_section(SVAP, rows(&["Server", "Owner", "Application"], svap, true))
        .with_section(BFAP, rows(&["Business Function", "Application"], bfap, false))
}

/// Path of the compiled `blastradius` binary
pub fn blastradius_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_blastradius"))
}

/// Run the binary in `dir` with colors off
pub fn run_blastradius_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(blastradius_binary())
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute blastradius binary")
}

/// Run the binary and assert it succeeded; returns stdout
pub fn run_ok(dir: &Path, args: &[&str]) -> String {
    let output = run_blastradius_in_dir(dir, args);
    assert!(
        output.status.success(),
        "blastradius {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Run the binary with `--json` and parse stdout
pub fn run_json(dir: &Path, args: &[&str]) -> serde_json::Value {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let stdout = run_ok(dir, &full);
    serde_json::from_str(&stdout).expect("stdout is not JSON")
}
