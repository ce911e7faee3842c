//! Sheet Writer
//!
//! rust_xlsxwriterのWorksheetに対する薄いラッパー。
//! ダッシュボードのレイアウトはExcel表記で設計されているため、
//! このラッパーの行・列はすべて1始まり（A1 = (1, 1)）です。

use rust_xlsxwriter::{
    Chart, ConditionalFormatDataBar, ConditionalFormatFormula, ConditionalFormatIconSet,
    ConditionalFormatIconType, ConditionalFormatType, DataValidation, Format, Worksheet,
};

use crate::error::DashboardError;
use crate::layout::styles;

/// セルに書き込む値
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CellInput {
    Number(f64),
    Text(String),
    /// `=`で始まる数式
    Formula(String),
    Blank,
}

impl From<f64> for CellInput {
    fn from(v: f64) -> Self {
        CellInput::Number(v)
    }
}

impl From<i64> for CellInput {
    fn from(v: i64) -> Self {
        CellInput::Number(v as f64)
    }
}

impl From<i32> for CellInput {
    fn from(v: i32) -> Self {
        CellInput::Number(f64::from(v))
    }
}

impl From<u32> for CellInput {
    fn from(v: u32) -> Self {
        CellInput::Number(f64::from(v))
    }
}

impl From<&str> for CellInput {
    fn from(v: &str) -> Self {
        CellInput::from(v.to_string())
    }
}

impl From<String> for CellInput {
    fn from(v: String) -> Self {
        if v.starts_with('=') {
            CellInput::Formula(v)
        } else {
            CellInput::Text(v)
        }
    }
}

impl From<&String> for CellInput {
    fn from(v: &String) -> Self {
        CellInput::from(v.clone())
    }
}

/// 条件付き書式ルール
#[derive(Clone)]
pub(crate) enum Highlight {
    /// 範囲の左上セル基準の相対数式（例: `=B30<0`）
    Formula { rule: String, format: Format },
    /// データバー（最小値・最大値は数値指定）
    DataBar { min: i32, max: i32, color: u32 },
    /// アイコンセット（既定のパーセンタイル閾値）
    IconSet(ConditionalFormatIconType),
}

impl Highlight {
    /// 数式ルールを作成
    pub fn formula(rule: impl Into<String>, format: Format) -> Self {
        Highlight::Formula {
            rule: rule.into(),
            format,
        }
    }

    /// 塗りつぶしだけの数式ルールを作成
    pub fn fill(rule: impl Into<String>, color: u32) -> Self {
        Self::formula(rule, styles::highlight(color))
    }
}

/// ワークシートへの書き込みヘルパー
pub(crate) struct SheetWriter<'a> {
    ws: &'a mut Worksheet,
    name: String,
}

impl<'a> SheetWriter<'a> {
    /// ワークシートに名前を付けて書き込みを開始する
    ///
    /// # 引数
    ///
    /// * `ws` - 書き込み先のワークシート
    /// * `name` - シート名（他シートからの参照に使われる）
    pub fn new(ws: &'a mut Worksheet, name: &str) -> Result<Self, DashboardError> {
        ws.set_name(name)?;
        Ok(Self {
            ws,
            name: name.to_string(),
        })
    }

    /// 書式付きでセルに書き込む
    pub fn put(
        &mut self,
        row: u32,
        col: u16,
        value: impl Into<CellInput>,
        format: &Format,
    ) -> Result<(), DashboardError> {
        let (r, c) = zero_based(row, col);
        match value.into() {
            CellInput::Number(n) => {
                self.ws.write_number_with_format(r, c, n, format)?;
            }
            CellInput::Text(s) => {
                self.ws.write_string_with_format(r, c, s, format)?;
            }
            CellInput::Formula(f) => {
                self.ws.write_formula_with_format(r, c, f.as_str(), format)?;
            }
            CellInput::Blank => {
                self.ws.write_blank(r, c, format)?;
            }
        }
        Ok(())
    }

    /// 枠線付きでセルに書き込む
    pub fn cell(&mut self, row: u32, col: u16, value: impl Into<CellInput>) -> Result<(), DashboardError> {
        self.put(row, col, value, &styles::cell())
    }

    /// 書式なしでセルに書き込む
    pub fn plain(&mut self, row: u32, col: u16, value: impl Into<CellInput>) -> Result<(), DashboardError> {
        let (r, c) = zero_based(row, col);
        match value.into() {
            CellInput::Number(n) => {
                self.ws.write_number(r, c, n)?;
            }
            CellInput::Text(s) => {
                self.ws.write_string(r, c, s)?;
            }
            CellInput::Formula(f) => {
                self.ws.write_formula(r, c, f.as_str())?;
            }
            CellInput::Blank => {}
        }
        Ok(())
    }

    /// シートタイトル
    pub fn title(&mut self, row: u32, text: &str) -> Result<(), DashboardError> {
        self.put(row, 1, text, &styles::title())
    }

    /// セクション見出し
    pub fn section(&mut self, row: u32, col: u16, text: &str) -> Result<(), DashboardError> {
        self.put(row, col, text, &styles::section())
    }

    /// 注記
    pub fn note(&mut self, row: u32, col: u16, text: &str) -> Result<(), DashboardError> {
        self.put(row, col, text, &styles::note())
    }

    /// 表ヘッダー行を書き込む
    pub fn headers(
        &mut self,
        row: u32,
        first_col: u16,
        labels: &[&str],
        format: &Format,
    ) -> Result<(), DashboardError> {
        for (offset, label) in labels.iter().enumerate() {
            self.put(row, first_col + offset as u16, *label, format)?;
        }
        Ok(())
    }

    /// セル結合して書き込む
    pub fn merge(
        &mut self,
        first_row: u32,
        first_col: u16,
        last_row: u32,
        last_col: u16,
        text: &str,
        format: &Format,
    ) -> Result<(), DashboardError> {
        let (r1, c1) = zero_based(first_row, first_col);
        let (r2, c2) = zero_based(last_row, last_col);
        self.ws.merge_range(r1, c1, r2, c2, text, format)?;
        Ok(())
    }

    /// 列幅を設定
    pub fn width(&mut self, col: u16, width: f64) -> Result<(), DashboardError> {
        self.ws.set_column_width(col.saturating_sub(1), width)?;
        Ok(())
    }

    /// 連続する列に同じ幅を設定
    pub fn widths(&mut self, first_col: u16, last_col: u16, width: f64) -> Result<(), DashboardError> {
        for col in first_col..=last_col {
            self.width(col, width)?;
        }
        Ok(())
    }

    /// 行の高さを設定
    pub fn height(&mut self, row: u32, height: f64) -> Result<(), DashboardError> {
        self.ws.set_row_height(row.saturating_sub(1), height)?;
        Ok(())
    }

    /// 条件付き書式を追加
    pub fn highlight(
        &mut self,
        first_row: u32,
        first_col: u16,
        last_row: u32,
        last_col: u16,
        rule: &Highlight,
    ) -> Result<(), DashboardError> {
        let (r1, c1) = zero_based(first_row, first_col);
        let (r2, c2) = zero_based(last_row, last_col);
        match rule {
            Highlight::Formula { rule, format } => {
                let cf = ConditionalFormatFormula::new()
                    .set_rule(rule.as_str())
                    .set_format(format.clone());
                self.ws.add_conditional_format(r1, c1, r2, c2, &cf)?;
            }
            Highlight::DataBar { min, max, color } => {
                let cf = ConditionalFormatDataBar::new()
                    .set_minimum(ConditionalFormatType::Number, *min)
                    .set_maximum(ConditionalFormatType::Number, *max)
                    .set_fill_color(*color);
                self.ws.add_conditional_format(r1, c1, r2, c2, &cf)?;
            }
            Highlight::IconSet(icon_type) => {
                let cf = ConditionalFormatIconSet::new().set_icon_type(icon_type.clone());
                self.ws.add_conditional_format(r1, c1, r2, c2, &cf)?;
            }
        }
        Ok(())
    }

    /// 入力規則（リスト）を追加
    pub fn list_validation(
        &mut self,
        first_row: u32,
        first_col: u16,
        last_row: u32,
        last_col: u16,
        items: &[&str],
    ) -> Result<(), DashboardError> {
        let (r1, c1) = zero_based(first_row, first_col);
        let (r2, c2) = zero_based(last_row, last_col);
        let validation = DataValidation::new().allow_list_strings(items)?;
        self.ws.add_data_validation(r1, c1, r2, c2, &validation)?;
        Ok(())
    }

    /// グラフを配置（左上セルを指定）
    pub fn chart(&mut self, row: u32, col: u16, chart: &Chart) -> Result<(), DashboardError> {
        let (r, c) = zero_based(row, col);
        self.ws.insert_chart(r, c, chart)?;
        Ok(())
    }

    /// グラフ系列用の範囲（シート名, 0始まり座標）
    ///
    /// 1始まりの座標を受け取り、rust_xlsxwriterのチャート範囲タプルに変換します。
    pub fn range(
        &self,
        first_row: u32,
        first_col: u16,
        last_row: u32,
        last_col: u16,
    ) -> (&str, u32, u16, u32, u16) {
        let (r1, c1) = zero_based(first_row, first_col);
        let (r2, c2) = zero_based(last_row, last_col);
        (self.name.as_str(), r1, c1, r2, c2)
    }
}

fn zero_based(row: u32, col: u16) -> (u32, u16) {
    (row.saturating_sub(1), col.saturating_sub(1))
}
