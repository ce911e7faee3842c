//! Report Workbook Module
//!
//! calamineを使用して前期レポートブックを読み込み、ラベル走査用のグリッドに変換します。

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use std::io::{Cursor, Read};
use std::path::Path;

use crate::error::DashboardError;
use crate::parser::scan::ReportGrid;
use crate::security::SecurityConfig;
use crate::types::{CellCoord, CellValue};

/// レポートブックリーダー
///
/// calamineのラッパーとして、シート選択とグリッド変換を提供します。
/// XLSX以外（XLS/ODS）の形式もcalamineが対応する範囲で読み込めます。
pub(crate) struct ReportReader {
    sheets: Sheets<Cursor<Vec<u8>>>,
}

impl ReportReader {
    /// ファイルパスからレポートブックを開く
    ///
    /// # 引数
    ///
    /// * `path` - レポートブックのパス
    /// * `security` - 入力ファイルサイズの上限を含むセキュリティ設定
    ///
    /// # 戻り値
    ///
    /// * `Ok(ReportReader)` - 読み込みに成功した場合
    /// * `Err(DashboardError)` - I/Oエラー、サイズ超過、解析エラーの場合
    pub fn open(path: &Path, security: &SecurityConfig) -> Result<Self, DashboardError> {
        let size = std::fs::metadata(path)?.len();
        security.check_input_size(&path.display().to_string(), size)?;

        let file = std::fs::File::open(path)?;
        Self::from_reader(file, security)
    }

    /// 任意のリーダーからレポートブックを開く
    ///
    /// 読み込んだバイト数にも入力ファイルサイズの上限を適用します。
    pub fn from_reader<R: Read>(
        mut reader: R,
        security: &SecurityConfig,
    ) -> Result<Self, DashboardError> {
        let mut buffer = Vec::new();
        let bytes_read = reader.read_to_end(&mut buffer)?;
        security.check_input_size("<reader>", bytes_read as u64)?;

        let sheets = open_workbook_auto_from_rs(Cursor::new(buffer)).map_err(DashboardError::Parse)?;
        Ok(Self { sheets })
    }

    /// すべてのシート名を取得
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.sheet_names()
    }

    /// シートをグリッドとして読み込む
    ///
    /// # 引数
    ///
    /// * `sheet` - シート名。`None`の場合は先頭シート
    ///
    /// # 戻り値
    ///
    /// * `Ok(ReportGrid)` - 読み込みに成功した場合
    /// * `Err(DashboardError::Config)` - シートが存在しない場合
    /// * `Err(DashboardError::Parse)` - シートの解析に失敗した場合
    pub fn read_grid(&mut self, sheet: Option<&str>) -> Result<ReportGrid, DashboardError> {
        let names = self.sheet_names();
        let name = match sheet {
            Some(wanted) => names
                .iter()
                .find(|n| n.as_str() == wanted)
                .cloned()
                .ok_or_else(|| DashboardError::Config(format!("Sheet '{}' not found", wanted)))?,
            None => names
                .first()
                .cloned()
                .ok_or_else(|| DashboardError::Config("Workbook has no sheets".to_string()))?,
        };

        let range = self.sheets.worksheet_range(&name)?;
        Ok(range_to_grid(&range))
    }

    /// シート上の数式を絶対座標（0始まり）で取得
    ///
    /// calamineは数式を先頭の`=`なしで返します。数式のないセルは含みません。
    pub fn read_formulas(&mut self, sheet: &str) -> Result<Vec<(CellCoord, String)>, DashboardError> {
        let range = self.sheets.worksheet_formula(sheet)?;
        let (start_row, start_col) = match range.start() {
            Some(start) => start,
            None => return Ok(Vec::new()),
        };

        Ok(range
            .cells()
            .filter(|(_, _, f)| !f.is_empty())
            .map(|(r, c, f)| {
                let coord = CellCoord::new(start_row + r as u32, start_col + c as u32);
                (coord, f.clone())
            })
            .collect())
    }
}

/// calamineのRangeを絶対座標のグリッドに変換
///
/// 先頭の空行・空列も保持し、列インデックスがシート上の位置と一致するようにします。
fn range_to_grid(range: &Range<Data>) -> ReportGrid {
    let (start_row, start_col) = match range.start() {
        Some(start) => start,
        None => return ReportGrid::default(),
    };

    let mut rows: Vec<Vec<CellValue>> = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; start_col as usize];
        cells.extend(row.iter().map(convert_data));
        rows.push(cells);
    }

    ReportGrid::new(rows)
}

fn convert_data(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Error(format!("{:?}", e)),
        Data::Empty => CellValue::Empty,
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{Formula, Workbook};

    fn report_bytes() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let ws = workbook.add_worksheet();
        ws.set_name("Balance").expect("name");
        ws.write_string(2, 0, "Final Cash").expect("write");
        ws.write_number(2, 3, 120_500.0).expect("write");
        ws.write_string(3, 0, "Tax Payments").expect("write");
        ws.write_string(3, 1, "(4,500)").expect("write");
        let other = workbook.add_worksheet();
        other.set_name("Notes").expect("name");
        other.write_formula(1, 1, Formula::new("=Balance!D3*2")).expect("write");
        workbook.save_to_buffer().expect("save")
    }

    #[test]
    fn test_read_grid_keeps_absolute_columns() {
        let mut reader =
            ReportReader::from_reader(Cursor::new(report_bytes()), &SecurityConfig::default())
                .expect("open");
        assert_eq!(reader.sheet_names(), vec!["Balance", "Notes"]);

        let grid = reader.read_grid(None).expect("grid");
        let row = grid.find_row(|l| l == "final cash").expect("row");
        assert_eq!(row.index, 2);
        assert_eq!(row.number(3), 120_500.0);

        let tax = grid.find_row(|l| l.contains("tax")).expect("row");
        assert_eq!(tax.number(1), -4_500.0);
    }

    #[test]
    fn test_read_named_sheet_and_missing_sheet() {
        let mut reader =
            ReportReader::from_reader(Cursor::new(report_bytes()), &SecurityConfig::default())
                .expect("open");
        assert!(reader.read_grid(Some("Notes")).is_ok());
        match reader.read_grid(Some("Missing")) {
            Err(DashboardError::Config(msg)) => assert!(msg.contains("Missing")),
            other => panic!("Expected Config error, got {:?}", other.map(|g| g.len())),
        }
    }

    #[test]
    fn test_read_formulas() {
        let mut reader =
            ReportReader::from_reader(Cursor::new(report_bytes()), &SecurityConfig::default())
                .expect("open");
        let formulas = reader.read_formulas("Notes").expect("formulas");
        assert_eq!(formulas.len(), 1);
        assert_eq!(formulas[0].0, CellCoord::new(1, 1));
        assert_eq!(formulas[0].1, "Balance!D3*2");
    }

    #[test]
    fn test_input_size_limit() {
        let security = SecurityConfig::with_input_limit(16);
        match ReportReader::from_reader(Cursor::new(report_bytes()), &security) {
            Err(DashboardError::SecurityViolation(_)) => {}
            Err(e) => panic!("Expected SecurityViolation, got {:?}", e),
            Ok(_) => panic!("Expected SecurityViolation, got Ok"),
        }
    }
}
