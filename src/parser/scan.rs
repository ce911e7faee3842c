//! Report Scan Module
//!
//! ExSimのレポートブックは固定セル位置ではなく、A列のラベルで行を特定する。
//! このモジュールはラベル走査と数値解釈の共通処理を提供します。

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::types::CellValue;

/// 書式付き数値文字列を解釈する
///
/// `$`、`,`、`%`、空白を取り除いてから解析します。`(1,234)`形式は負数として扱います。
/// 解釈できない値はすべて`0.0`になります。
///
/// # 使用例
///
/// ```rust,ignore
/// assert_eq!(parse_numeric_str("$1,234"), 1234.0);
/// assert_eq!(parse_numeric_str("(500)"), -500.0);
/// ```
pub(crate) fn parse_numeric_str(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%') && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return 0.0;
    }

    let (negative, body) = match cleaned.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, cleaned.as_str()),
    };

    match body.parse::<f64>() {
        Ok(v) if v.is_finite() => {
            if negative {
                -v
            } else {
                v
            }
        }
        _ => 0.0,
    }
}

/// セル値を数値として解釈する
pub(crate) fn parse_numeric(value: &CellValue) -> f64 {
    match value {
        CellValue::Number(n) => *n,
        CellValue::String(s) => parse_numeric_str(s),
        CellValue::Bool(_) | CellValue::Error(_) | CellValue::Empty => 0.0,
    }
}

/// 文字列中の最初の整数（例: "Capacity: 4,800 units" -> 4800）
///
/// 桁区切りのカンマは数字の一部として扱います。
pub(crate) fn first_integer(text: &str) -> Option<i64> {
    static DIGITS: OnceLock<Option<Regex>> = OnceLock::new();
    let re = DIGITS.get_or_init(|| Regex::new(r"\d[\d,]*").ok()).as_ref()?;
    re.find(text)
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
}

/// レポートブックの1シート分のセルグリッド
///
/// 列インデックスはシート上の絶対位置（A列 = 0）です。
#[derive(Debug, Clone, Default)]
pub(crate) struct ReportGrid {
    rows: Vec<Vec<CellValue>>,
}

impl ReportGrid {
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// 行数
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 全行を走査するイテレータ
    pub fn rows(&self) -> impl Iterator<Item = ReportRow<'_>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(index, cells)| ReportRow { index, cells })
    }

    /// A列のラベルが条件を満たす最初の行
    pub fn find_row<F>(&self, predicate: F) -> Option<ReportRow<'_>>
    where
        F: Fn(&str) -> bool,
    {
        self.rows().find(|row| predicate(&row.label()))
    }
}

/// レポートの1行
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReportRow<'a> {
    /// 0始まりの行番号
    pub index: usize,
    cells: &'a [CellValue],
}

impl<'a> ReportRow<'a> {
    /// セル数
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// A列のテキスト（小文字化・trim済み）
    pub fn label(&self) -> String {
        self.text(0).to_lowercase()
    }

    /// A列のラベルがすべての語を含むか
    pub fn label_has_all(&self, words: &[&str]) -> bool {
        let label = self.label();
        words.iter().all(|w| label.contains(w))
    }

    /// 指定列のテキスト（trim済み）
    pub fn text(&self, col: usize) -> String {
        self.cells.get(col).map(CellValue::as_text).unwrap_or_default()
    }

    /// 指定列の数値（範囲外・解釈不能は0）
    pub fn number(&self, col: usize) -> f64 {
        self.cells.get(col).map(parse_numeric).unwrap_or(0.0)
    }

    /// 範囲内の数値を列順に取得（範囲外の列は0）
    pub fn numbers(&self, cols: Range<usize>) -> Vec<f64> {
        cols.map(|c| self.number(c)).collect()
    }

    /// 範囲内で最初に0より大きい値
    pub fn first_positive(&self, cols: Range<usize>) -> Option<f64> {
        cols.map(|c| self.number(c)).find(|v| *v > 0.0)
    }

    /// 範囲内で最初に0以外の値
    pub fn first_nonzero(&self, cols: Range<usize>) -> Option<f64> {
        cols.map(|c| self.number(c)).find(|v| *v != 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_of(values: Vec<CellValue>) -> ReportGrid {
        ReportGrid::new(vec![values])
    }

    #[test]
    fn test_parse_numeric_str_formats() {
        assert_eq!(parse_numeric_str("$1,234"), 1234.0);
        assert_eq!(parse_numeric_str(" 45 % "), 45.0);
        assert_eq!(parse_numeric_str("(2,500.50)"), -2500.5);
        assert_eq!(parse_numeric_str("-12"), -12.0);
        assert_eq!(parse_numeric_str(""), 0.0);
        assert_eq!(parse_numeric_str("n/a"), 0.0);
        assert_eq!(parse_numeric_str("inf"), 0.0);
    }

    #[test]
    fn test_parse_numeric_cell_values() {
        assert_eq!(parse_numeric(&CellValue::Number(3.5)), 3.5);
        assert_eq!(parse_numeric(&CellValue::String("$90".to_string())), 90.0);
        assert_eq!(parse_numeric(&CellValue::Bool(true)), 0.0);
        assert_eq!(parse_numeric(&CellValue::Error("#REF!".to_string())), 0.0);
    }

    #[test]
    fn test_first_integer() {
        assert_eq!(first_integer("Capacity: 4800 units"), Some(4800));
        assert_eq!(first_integer("Capacity: 4,800"), Some(4800));
        assert_eq!(first_integer("Salespeople salaries (12 people)"), Some(12));
        assert_eq!(first_integer("no digits"), None);
    }

    #[test]
    fn test_row_scanning_helpers() {
        let grid = row_of(vec![
            CellValue::String("  Final Cash ".to_string()),
            CellValue::Empty,
            CellValue::Number(0.0),
            CellValue::String("(1,000)".to_string()),
            CellValue::Number(250.0),
        ]);
        let row = grid.rows().next().expect("row");

        assert_eq!(row.label(), "final cash");
        assert!(row.label_has_all(&["final", "cash"]));
        assert_eq!(row.first_nonzero(1..9), Some(-1000.0));
        assert_eq!(row.first_positive(1..9), Some(250.0));
        assert_eq!(row.numbers(3..6), vec![-1000.0, 250.0, 0.0]);
    }

    #[test]
    fn test_find_row() {
        let grid = ReportGrid::new(vec![
            vec![CellValue::String("Net Sales".to_string()), CellValue::Number(10.0)],
            vec![CellValue::String("Total Assets".to_string()), CellValue::Number(99.0)],
        ]);
        let row = grid.find_row(|l| l.contains("assets")).expect("row");
        assert_eq!(row.index, 1);
        assert_eq!(row.number(1), 99.0);
        assert!(grid.find_row(|l| l.contains("equity")).is_none());
    }
}
