//! Validation Module
//!
//! 生成済みダッシュボードブックをcalamineで読み戻し、タブ構成・シート間参照・
//! FN間の繰り越し数式を検証するモジュール。

mod package;
mod refs;

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::api::Dashboard;
use crate::dashboards::{finance, logistics, people, purchasing};
use crate::error::DashboardError;
use crate::parser::{ReportGrid, ReportReader};
use crate::security::SecurityConfig;
use crate::types::{fn_col, CellCoord, CellRange, FORTNIGHTS};

pub use package::PackageSummary;
use refs::extract_references;

/// 検証で見つかった問題
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub sheet: String,
    /// A1形式のセル座標（ブック全体の問題は`-`）
    pub cell: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(sheet: &str, cell: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sheet: sheet.to_string(),
            cell: cell.into(),
            message: message.into(),
        }
    }

    fn at(sheet: &str, coord: CellCoord, message: impl Into<String>) -> Self {
        Self::new(sheet, coord.to_a1_notation(), message)
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}: {}", self.sheet, self.cell, self.message)
    }
}

impl From<ValidationIssue> for DashboardError {
    fn from(issue: ValidationIssue) -> Self {
        DashboardError::Validation {
            sheet: issue.sheet,
            cell: issue.cell,
            message: issue.message,
        }
    }
}

/// 1つのブックの検証結果
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub dashboard: Dashboard,
    pub path: PathBuf,
    pub package: PackageSummary,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// 問題が1つもないか
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// 最初の問題を`DashboardError::Validation`として返す
    pub fn into_result(self) -> Result<Self, DashboardError> {
        match self.issues.first() {
            Some(issue) => Err(issue.clone().into()),
            None => Ok(self),
        }
    }
}

/// ファイル名からダッシュボードの種類を判定
///
/// # 使用例
///
/// ```rust
/// use exsim_dashboards::{detect_dashboard, Dashboard};
/// use std::path::Path;
///
/// let path = Path::new("dashboards/CPO_Dashboard.xlsx");
/// assert_eq!(detect_dashboard(path), Some(Dashboard::People));
/// ```
pub fn detect_dashboard(path: &Path) -> Option<Dashboard> {
    let name = path.file_name()?.to_str()?;
    Dashboard::EXECUTION_ORDER
        .into_iter()
        .find(|d| d.output_file().eq_ignore_ascii_case(name))
}

/// 読み戻した1シート
struct SheetData {
    grid: ReportGrid,
    formulas: Vec<(CellCoord, String)>,
    used: Option<CellRange>,
}

impl SheetData {
    fn new(grid: ReportGrid, formulas: Vec<(CellCoord, String)>) -> Self {
        let mut last: Option<CellCoord> = None;
        let mut extend = |coord: CellCoord| {
            let end = last.get_or_insert(coord);
            end.row = end.row.max(coord.row);
            end.col = end.col.max(coord.col);
        };
        for row in grid.rows() {
            if row.len() > 0 {
                extend(CellCoord::new(row.index as u32, row.len() as u32 - 1));
            }
        }
        for (coord, _) in &formulas {
            extend(*coord);
        }
        let used = last.map(|end| CellRange::new(CellCoord::new(0, 0), end));
        Self {
            grid,
            formulas,
            used,
        }
    }

    fn formula(&self, coord: CellCoord) -> Option<&str> {
        self.formulas
            .iter()
            .find(|(c, _)| *c == coord)
            .map(|(_, f)| f.as_str())
    }

    /// `cell`の数式が同一シートの`target`を参照しているか
    fn references(&self, cell: CellCoord, target: CellCoord) -> bool {
        self.formula(cell)
            .map(|f| extract_references(f).iter().any(|r| r.is_local(target)))
            .unwrap_or(false)
    }

    /// A列のラベルが一致する最初の行（0始まり）
    fn label_row(&self, label: &str) -> Option<u32> {
        self.grid.find_row(|l| l == label).map(|row| row.index as u32)
    }

    /// すべての見出しを含む最初の行と、各見出しの列（0始まり）
    fn header_columns(&self, headers: &[&str]) -> Option<(u32, Vec<u32>)> {
        self.grid.rows().find_map(|row| {
            let cols: Option<Vec<u32>> = headers
                .iter()
                .map(|h| (0..row.len()).find(|c| row.text(*c) == *h).map(|c| c as u32))
                .collect();
            cols.map(|cols| (row.index as u32, cols))
        })
    }

    fn contains(&self, coord: CellCoord) -> bool {
        self.used.map(|used| used.contains(coord)).unwrap_or(false)
    }
}

struct LoadedBook {
    sheets: Vec<(String, SheetData)>,
}

impl LoadedBook {
    fn load(reader: &mut ReportReader) -> Result<Self, DashboardError> {
        let mut sheets = Vec::new();
        for name in reader.sheet_names() {
            let grid = reader.read_grid(Some(name.as_str()))?;
            let formulas = reader.read_formulas(&name)?;
            debug!("{}: {} formulas", name, formulas.len());
            sheets.push((name, SheetData::new(grid, formulas)));
        }
        Ok(Self { sheets })
    }

    fn sheet(&self, name: &str) -> Option<&SheetData> {
        self.sheets.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }
}

/// 生成済みブックを検証
///
/// # 引数
///
/// * `path` - 検証するブック
/// * `dashboard` - ブックの種類（期待するタブと繰り越しチェックを決める）
///
/// # 戻り値
///
/// * `Ok(ValidationReport)` - 読み込めた場合（問題の有無は`issues`で確認）
/// * `Err(DashboardError)` - ブックを開けない場合
///
/// # 使用例
///
/// ```rust,no_run
/// use exsim_dashboards::{validate_workbook, Dashboard};
///
/// # fn main() -> Result<(), exsim_dashboards::DashboardError> {
/// let report = validate_workbook("dashboards/Finance_Dashboard_Final.xlsx", Dashboard::Finance)?;
/// for issue in &report.issues {
///     println!("{}", issue);
/// }
/// # Ok(())
/// # }
/// ```
pub fn validate_workbook(
    path: impl AsRef<Path>,
    dashboard: Dashboard,
) -> Result<ValidationReport, DashboardError> {
    let path = path.as_ref();
    let security = SecurityConfig::default();

    let mut reader = ReportReader::open(path, &security)?;
    let package = package::inspect(File::open(path)?, &security)?;
    let book = LoadedBook::load(&mut reader)?;

    let mut issues = Vec::new();
    check_tabs(dashboard, &package, &book, &mut issues);
    check_cross_sheet_references(&book, &mut issues);
    match dashboard {
        Dashboard::Finance => check_cash_cascade(&book, &mut issues),
        Dashboard::Logistics => {
            check_arrivals(&book, &mut issues);
            check_projected_inventory(&book, &mut issues);
        }
        Dashboard::Purchasing => check_gross_requirements(&book, &mut issues),
        Dashboard::People => check_strike_risk(&book, &mut issues),
        _ => {}
    }

    info!("validated {} ({} issues)", path.display(), issues.len());
    Ok(ValidationReport {
        dashboard,
        path: path.to_path_buf(),
        package,
        issues,
    })
}

/// 最低限含まれるべきグラフの数
fn expected_charts(dashboard: Dashboard) -> usize {
    match dashboard {
        Dashboard::Marketing | Dashboard::Finance | Dashboard::People => 2,
        Dashboard::Logistics => 5,
        _ => 0,
    }
}

fn check_tabs(
    dashboard: Dashboard,
    package: &PackageSummary,
    book: &LoadedBook,
    issues: &mut Vec<ValidationIssue>,
) {
    let tabs = dashboard.tabs();
    let mut missing = false;
    for tab in tabs {
        if book.sheet(tab).is_none() {
            missing = true;
            issues.push(ValidationIssue::new(tab, "-", "expected tab is missing"));
        }
    }
    if !missing && package.sheets.iter().map(String::as_str).ne(tabs.iter().copied()) {
        issues.push(ValidationIssue::new(
            "workbook",
            "-",
            format!("tab order is {:?}, expected {:?}", package.sheets, tabs),
        ));
    }

    let expected = expected_charts(dashboard);
    if package.charts < expected {
        issues.push(ValidationIssue::new(
            "workbook",
            "-",
            format!("found {} charts, expected at least {}", package.charts, expected),
        ));
    }
}

fn check_cross_sheet_references(book: &LoadedBook, issues: &mut Vec<ValidationIssue>) {
    for (name, sheet) in &book.sheets {
        for (coord, formula) in &sheet.formulas {
            for reference in extract_references(formula) {
                let Some(target) = reference.sheet.as_deref() else {
                    continue;
                };
                let a1 = reference.coord.to_a1_notation();
                match book.sheet(target) {
                    None => issues.push(ValidationIssue::at(
                        name,
                        *coord,
                        format!("references unknown sheet '{}'", target),
                    )),
                    Some(data) if !data.contains(reference.coord) => {
                        issues.push(ValidationIssue::at(
                            name,
                            *coord,
                            format!("references {}!{} outside the used range", target, a1),
                        ))
                    }
                    Some(_) => {}
                }
            }
        }
    }
}

/// FN列の0始まり列番号
fn fortnight_col(fortnight: u16) -> u32 {
    u32::from(fn_col(fortnight)) - 1
}

fn check_cash_cascade(book: &LoadedBook, issues: &mut Vec<ValidationIssue>) {
    let sheet = finance::LIQUIDITY_MONITOR;
    let Some(data) = book.sheet(sheet) else { return };
    let rows = (
        data.label_row("opening cash"),
        data.label_row("net cash flow"),
        data.label_row("ending cash balance"),
    );
    let (Some(opening), Some(net), Some(ending)) = rows else {
        issues.push(ValidationIssue::new(sheet, "A", "cash balance rows not found"));
        return;
    };

    for fortnight in 1..=FORTNIGHTS {
        let col = fortnight_col(fortnight);
        let open_cell = CellCoord::new(opening, col);
        if fortnight > 1 {
            let previous = CellCoord::new(ending, col - 1);
            if !data.references(open_cell, previous) {
                issues.push(ValidationIssue::at(
                    sheet,
                    open_cell,
                    format!(
                        "opening cash FN{} does not carry {} forward",
                        fortnight,
                        previous.to_a1_notation()
                    ),
                ));
            }
        }

        let end_cell = CellCoord::new(ending, col);
        for part in [open_cell, CellCoord::new(net, col)] {
            if !data.references(end_cell, part) {
                issues.push(ValidationIssue::at(
                    sheet,
                    end_cell,
                    format!(
                        "ending cash FN{} does not include {}",
                        fortnight,
                        part.to_a1_notation()
                    ),
                ));
            }
        }
    }
}

fn check_arrivals(book: &LoadedBook, issues: &mut Vec<ValidationIssue>) {
    let sheet = logistics::SHIPMENT_BUILDER;
    let Some(data) = book.sheet(sheet) else { return };
    let Some((header, cols)) = data.header_columns(&["Ship FN", "Lead Time", "Arrive FN"]) else {
        issues.push(ValidationIssue::new(sheet, "-", "shipment log header not found"));
        return;
    };
    let (ship, lead, arrive) = (cols[0], cols[1], cols[2]);

    let mut checked = 0;
    for (coord, _) in data.formulas.iter().filter(|(c, _)| c.col == arrive && c.row > header) {
        checked += 1;
        let r = coord.row;
        if !data.references(*coord, CellCoord::new(r, ship))
            || !data.references(*coord, CellCoord::new(r, lead))
        {
            issues.push(ValidationIssue::at(
                sheet,
                *coord,
                "arrival is not ship fortnight plus lead time",
            ));
        }
    }
    if checked == 0 {
        issues.push(ValidationIssue::new(sheet, "-", "no arrival formulas found"));
    }
}

fn check_projected_inventory(book: &LoadedBook, issues: &mut Vec<ValidationIssue>) {
    let sheet = logistics::INVENTORY_TETRIS;
    let Some(data) = book.sheet(sheet) else { return };
    let Some((_, cols)) = data.header_columns(&["Projected Inv"]) else {
        issues.push(ValidationIssue::new(sheet, "-", "projected inventory column not found"));
        return;
    };
    let col = cols[0];

    for row in data.grid.rows() {
        let fortnight = row
            .label()
            .strip_prefix("fn")
            .and_then(|n| n.parse::<u16>().ok());
        if !matches!(fortnight, Some(n) if n >= 2) {
            continue;
        }
        let r = row.index as u32;
        let cell = CellCoord::new(r, col);
        let previous = CellCoord::new(r - 1, col);
        if !data.references(cell, previous) {
            issues.push(ValidationIssue::at(
                sheet,
                cell,
                format!(
                    "projected inventory does not carry {} forward",
                    previous.to_a1_notation()
                ),
            ));
        }
    }
}

fn check_gross_requirements(book: &LoadedBook, issues: &mut Vec<ValidationIssue>) {
    let sheet = purchasing::MRP_ENGINE;
    let Some(data) = book.sheet(sheet) else { return };
    let Some(target) = data.label_row("target production") else {
        issues.push(ValidationIssue::new(sheet, "A", "target production row not found"));
        return;
    };

    let gross_rows: Vec<u32> = data
        .grid
        .rows()
        .filter(|row| row.label() == "gross requirement")
        .map(|row| row.index as u32)
        .collect();
    if gross_rows.is_empty() {
        issues.push(ValidationIssue::new(sheet, "A", "gross requirement rows not found"));
    }

    for r in gross_rows {
        for fortnight in 1..=FORTNIGHTS {
            let col = fortnight_col(fortnight);
            let cell = CellCoord::new(r, col);
            if !data.references(cell, CellCoord::new(target, col)) {
                issues.push(ValidationIssue::at(
                    sheet,
                    cell,
                    format!("gross requirement FN{} is not linked to target production", fortnight),
                ));
            }
        }
    }
}

fn check_strike_risk(book: &LoadedBook, issues: &mut Vec<ValidationIssue>) {
    let sheet = people::COMPENSATION_STRATEGY;
    let Some(data) = book.sheet(sheet) else { return };
    let headers = ["Inflation Floor", "Proposed New Salary", "Strike Risk"];
    let Some((header, cols)) = data.header_columns(&headers) else {
        issues.push(ValidationIssue::new(sheet, "-", "salary table header not found"));
        return;
    };
    let (floor, proposed, strike) = (cols[0], cols[1], cols[2]);

    let mut checked = 0;
    for (coord, _) in data.formulas.iter().filter(|(c, _)| c.col == strike && c.row > header) {
        checked += 1;
        let r = coord.row;
        if !data.references(*coord, CellCoord::new(r, proposed))
            || !data.references(*coord, CellCoord::new(r, floor))
        {
            issues.push(ValidationIssue::at(
                sheet,
                *coord,
                "strike risk does not compare proposed salary with the floor",
            ));
        }
    }
    if checked == 0 {
        issues.push(ValidationIssue::new(sheet, "-", "no strike risk formulas found"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;

    fn sheet(rows: Vec<Vec<CellValue>>, formulas: &[(&str, &str)]) -> SheetData {
        let formulas = formulas
            .iter()
            .map(|(a1, f)| (CellCoord::from_a1_notation(a1).expect("A1"), f.to_string()))
            .collect();
        SheetData::new(ReportGrid::new(rows), formulas)
    }

    fn text(s: &str) -> CellValue {
        CellValue::String(s.to_string())
    }

    #[test]
    fn test_used_range_covers_values_and_formulas() {
        let data = sheet(vec![vec![text("a"), text("b")]], &[("D5", "A1+B1")]);
        assert!(data.contains(CellCoord::from_a1_notation("D5").expect("A1")));
        assert!(data.contains(CellCoord::from_a1_notation("B1").expect("A1")));
        assert!(!data.contains(CellCoord::from_a1_notation("E1").expect("A1")));
    }

    #[test]
    fn test_references_only_local_targets() {
        let data = sheet(vec![], &[("C15", "B30"), ("C30", "OTHER!C15")]);
        let c15 = CellCoord::from_a1_notation("C15").expect("A1");
        let b30 = CellCoord::from_a1_notation("B30").expect("A1");
        let c30 = CellCoord::from_a1_notation("C30").expect("A1");
        assert!(data.references(c15, b30));
        assert!(!data.references(c30, c15));
    }

    #[test]
    fn test_header_columns() {
        let data = sheet(
            vec![
                vec![text("title")],
                vec![text("Values"), text("Ship FN"), text("Lead Time"), text("Arrive FN")],
            ],
            &[],
        );
        assert_eq!(
            data.header_columns(&["Ship FN", "Arrive FN"]),
            Some((1, vec![1, 3]))
        );
        assert_eq!(data.header_columns(&["Missing"]), None);
    }

    #[test]
    fn test_issue_display_and_error() {
        let issue = ValidationIssue::new("LIQUIDITY_MONITOR", "C15", "broken");
        assert_eq!(issue.to_string(), "LIQUIDITY_MONITOR!C15: broken");
        match DashboardError::from(issue) {
            DashboardError::Validation { sheet, cell, .. } => {
                assert_eq!(sheet, "LIQUIDITY_MONITOR");
                assert_eq!(cell, "C15");
            }
            other => panic!("Expected Validation, got {:?}", other),
        }
    }

    #[test]
    fn test_detect_dashboard() {
        assert_eq!(
            detect_dashboard(Path::new("out/Finance_Dashboard_Final.xlsx")),
            Some(Dashboard::Finance)
        );
        assert_eq!(detect_dashboard(Path::new("out/other.xlsx")), None);
    }
}
