//! Security Tests
//!
//! 入力ファイルサイズの上限と、壊れた入力へのフォールバックを確認します。

use std::fs;

use exsim_dashboards::{Dashboard, DashboardError, GeneratorBuilder};
use rust_xlsxwriter::Workbook;

#[test]
fn test_oversized_report_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let reports = dir.path().join("Reports");
    fs::create_dir_all(&reports).expect("reports dir");

    let mut workbook = Workbook::new();
    let ws = workbook.add_worksheet();
    ws.write_string(0, 0, "Final Cash").expect("write");
    ws.write_number(0, 1, 1_000.0).expect("write");
    workbook
        .save(reports.join("initial_cash_flow.xlsx"))
        .expect("save");

    let generator = GeneratorBuilder::new()
        .with_reports_dir(&reports)
        .with_output_dir(dir.path().join("dashboards"))
        .with_max_input_file_size(256)
        .build()
        .expect("valid config");

    let report = generator.generate(Dashboard::Finance).expect("generate");
    assert!(report
        .inputs_defaulted
        .contains(&"initial_cash_flow.xlsx".to_string()));
    assert!(!report.inputs_found.contains(&"initial_cash_flow.xlsx".to_string()));
}

#[test]
fn test_corrupt_report_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let reports = dir.path().join("Reports");
    fs::create_dir_all(&reports).expect("reports dir");
    fs::write(reports.join("raw_materials.xlsx"), b"PK\x03\x04 truncated").expect("write");

    let generator = GeneratorBuilder::new()
        .with_reports_dir(&reports)
        .with_output_dir(dir.path().join("dashboards"))
        .build()
        .expect("valid config");

    let report = generator.generate(Dashboard::Purchasing).expect("generate");
    assert!(report.inputs_defaulted.contains(&"raw_materials.xlsx".to_string()));
}

#[test]
fn test_zero_size_limit_is_rejected() {
    match GeneratorBuilder::new().with_max_input_file_size(0).build() {
        Err(DashboardError::Config(msg)) => assert!(msg.contains("greater than 0")),
        Err(e) => panic!("Expected Config error, got {:?}", e),
        Ok(_) => panic!("Expected Config error, got Ok"),
    }
}
