//! Dashboard Styles
//!
//! 全ダッシュボード共通の配色と書式。セルの役割（入力・計算・出力・参照）を
//! 塗りつぶし色で区別します。

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder};

/// 金額書式
pub(crate) const MONEY: &str = "$#,##0";
/// 小数付き金額書式
pub(crate) const MONEY_CENTS: &str = "$#,##0.00";
/// パーセント書式
pub(crate) const PERCENT: &str = "0.0%";
/// 件数書式
pub(crate) const COUNT: &str = "#,##0";

pub(crate) const HEADER_BLUE: u32 = 0x2F5496;
pub(crate) const ESG_BLUE: u32 = 0x1F4E79;
pub(crate) const WHITE: u32 = 0xFFFFFF;
pub(crate) const INPUT_FILL: u32 = 0xFFF2CC;
pub(crate) const CALC_FILL: u32 = 0xE2EFDA;
pub(crate) const OUTPUT_FILL: u32 = 0xC6EFCE;
pub(crate) const REF_FILL: u32 = 0xD9D9D9;
pub(crate) const RED_FILL: u32 = 0xFFC7CE;
pub(crate) const GREEN_FILL: u32 = 0xC6EFCE;
pub(crate) const PURPLE_FILL: u32 = 0xE4DFEC;
pub(crate) const ORANGE_FILL: u32 = 0xFFEB9C;
pub(crate) const YELLOW_FILL: u32 = 0xFFEB84;
pub(crate) const DARK_RED: u32 = 0x9C0006;
pub(crate) const ALERT_RED: u32 = 0xC00000;
pub(crate) const BEST_GREEN: u32 = 0x00B050;
pub(crate) const NOTE_GREY: u32 = 0x666666;

/// シートタイトル（太字14pt）
pub(crate) fn title() -> Format {
    title_in(HEADER_BLUE)
}

pub(crate) fn title_in(color: u32) -> Format {
    Format::new().set_bold().set_font_size(14).set_font_color(color)
}

/// セクション見出し（太字12pt）
pub(crate) fn section() -> Format {
    section_in(HEADER_BLUE)
}

pub(crate) fn section_in(color: u32) -> Format {
    Format::new().set_bold().set_font_size(12).set_font_color(color)
}

/// 表ヘッダー（白抜き太字）
pub(crate) fn header() -> Format {
    header_in(HEADER_BLUE)
}

pub(crate) fn header_in(color: u32) -> Format {
    Format::new()
        .set_bold()
        .set_font_color(WHITE)
        .set_background_color(color)
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center)
        .set_text_wrap()
}

/// 注記（斜体グレー）
pub(crate) fn note() -> Format {
    Format::new().set_italic().set_font_color(NOTE_GREY)
}

/// 枠線のみの通常セル
pub(crate) fn cell() -> Format {
    Format::new().set_border(FormatBorder::Thin)
}

/// 太字の通常セル
pub(crate) fn bold() -> Format {
    cell().set_bold()
}

pub(crate) fn filled(color: u32) -> Format {
    cell().set_background_color(color)
}

/// ユーザー入力セル（黄）
pub(crate) fn input() -> Format {
    filled(INPUT_FILL)
}

/// 計算セル（薄緑）
pub(crate) fn calc() -> Format {
    filled(CALC_FILL)
}

/// 出力セル（緑・太字）
pub(crate) fn output() -> Format {
    filled(OUTPUT_FILL).set_bold()
}

/// 前期実績の参照セル（灰）
pub(crate) fn reference() -> Format {
    filled(REF_FILL)
}

/// ゾーン名セル（ゾーン色・白抜き太字）
pub(crate) fn zone_label(color: u32) -> Format {
    cell()
        .set_background_color(color)
        .set_font_color(WHITE)
        .set_bold()
}

/// 条件付き書式用の塗りつぶし
pub(crate) fn highlight(color: u32) -> Format {
    Format::new().set_background_color(color)
}

/// 条件付き書式用の太字フォント色
pub(crate) fn alert_font(color: u32) -> Format {
    Format::new().set_bold().set_font_color(color)
}
