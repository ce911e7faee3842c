//! Validation Tests
//!
//! 生成したブックが検証を通ること、壊したブックで問題が報告されることを確認します。

use std::path::Path;

use exsim_dashboards::{
    validate_workbook, Dashboard, DashboardError, DashboardSelector, GeneratorBuilder,
};
use rust_xlsxwriter::{Formula, Workbook, XlsxError};

/// LIQUIDITY_MONITORだけを持ち、繰り越しが壊れたCFOブック
fn write_broken_finance(path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let ws = workbook.add_worksheet();
    ws.set_name("LIQUIDITY_MONITOR")?;

    ws.write_string(14, 0, "Opening Cash")?;
    ws.write_string(28, 0, "Net Cash Flow")?;
    ws.write_string(29, 0, "ENDING CASH BALANCE")?;
    ws.write_formula(14, 1, Formula::new("=$B$9"))?;
    for col in 1..=8u16 {
        let letter = (b'A' + col as u8) as char;
        let previous = (b'A' + col as u8 - 1) as char;
        ws.write_number(28, col, 0.0)?;
        if col > 1 {
            // FN3の期首は前のFNではなく自分の列の期末を参照している
            let source = if col == 3 { letter } else { previous };
            ws.write_formula(14, col, Formula::new(format!("={}30", source)))?;
        }
        // 期末に純増減が入っていない
        ws.write_formula(29, col, Formula::new(format!("={}15", letter)))?;
    }
    ws.write_formula(31, 1, Formula::new("=MISSING_TAB!A1"))?;
    ws.write_formula(32, 1, Formula::new("=LIQUIDITY_MONITOR!Z500"))?;

    workbook.save(path)?;
    Ok(())
}

#[test]
fn test_generated_dashboards_pass_validation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let generator = GeneratorBuilder::new()
        .with_reports_dir(dir.path().join("Reports"))
        .with_data_dir(dir.path().join("data"))
        .with_output_dir(dir.path().join("dashboards"))
        .build()
        .expect("valid config");

    for (dashboard, result) in generator.generate_all(&DashboardSelector::All) {
        let report = result.unwrap_or_else(|e| panic!("{} failed: {}", dashboard, e));
        let path = report.output_path.expect("path");

        let validation = validate_workbook(&path, dashboard).expect("readable workbook");
        assert!(
            validation.is_valid(),
            "{} has issues: {:#?}",
            dashboard,
            validation.issues
        );
        assert_eq!(validation.package.sheets, dashboard.tabs());
    }
}

#[test]
fn test_marketing_package_contents() {
    let dir = tempfile::tempdir().expect("tempdir");
    let generator = GeneratorBuilder::new()
        .with_reports_dir(dir.path().join("Reports"))
        .with_output_dir(dir.path().join("dashboards"))
        .build()
        .expect("valid config");

    let report = generator.generate(Dashboard::Marketing).expect("generate");
    let validation =
        validate_workbook(report.output_path.expect("path"), Dashboard::Marketing).expect("read");
    assert_eq!(validation.package.charts, 2);
    assert!(validation.package.conditional_formats >= 3);
    assert!(validation.package.data_validations >= 1);
}

#[test]
fn test_broken_finance_workbook_reports_issues() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("Finance_Dashboard_Final.xlsx");
    write_broken_finance(&path).expect("write fixture");

    let report = validate_workbook(&path, Dashboard::Finance).expect("readable workbook");
    assert!(!report.is_valid());

    let has = |sheet: &str, cell: &str, needle: &str| {
        report
            .issues
            .iter()
            .any(|i| i.sheet == sheet && i.cell == cell && i.message.contains(needle))
    };
    assert!(has("PROFIT_CONTROL", "-", "missing"));
    assert!(has("UPLOAD_READY_FINANCE", "-", "missing"));
    assert!(has("LIQUIDITY_MONITOR", "D15", "does not carry C30 forward"));
    assert!(!has("LIQUIDITY_MONITOR", "C15", "does not carry"));
    assert!(has("LIQUIDITY_MONITOR", "B30", "does not include B29"));
    assert!(has("LIQUIDITY_MONITOR", "B32", "unknown sheet 'MISSING_TAB'"));
    assert!(has("LIQUIDITY_MONITOR", "B33", "outside the used range"));
    assert!(has("workbook", "-", "charts"));

    match report.into_result() {
        Err(DashboardError::Validation { sheet, .. }) => assert!(!sheet.is_empty()),
        other => panic!("Expected Validation error, got {:?}", other.map(|r| r.issues)),
    }
}

#[test]
fn test_validate_rejects_non_workbook() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("CPO_Dashboard.xlsx");
    std::fs::write(&path, b"not a workbook").expect("write");
    assert!(validate_workbook(&path, Dashboard::People).is_err());
}
