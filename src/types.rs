//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use serde::{Deserialize, Serialize};

/// 1ラウンドあたりの期間（Fortnight）数
pub(crate) const FORTNIGHTS: u16 = 8;

/// 入力レポートから読み取ったセルの値
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CellValue {
    /// 数値（f64）
    Number(f64),

    /// 文字列
    String(String),

    /// 論理値
    Bool(bool),

    /// エラー値（例: #DIV/0!）
    Error(String),

    /// 空セル
    Empty,
}

impl CellValue {
    /// 値が空かどうかを判定
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 値を文字列として取得（前後の空白は除去）
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            CellValue::Number(n) => n.to_string(),
            CellValue::String(s) => s.trim().to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Error(e) => e.clone(),
            CellValue::Empty => String::new(),
        }
    }
}

/// セル座標（0始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// A1形式の文字列に変換（例: (0, 0) -> "A1"）
    #[allow(clippy::wrong_self_convention)]
    pub fn to_a1_notation(&self) -> String {
        let col_str = Self::col_index_to_letter(self.col);
        format!("{}{}", col_str, self.row + 1)
    }

    /// A1形式の文字列を解析（`$`は無視、例: "$B$30" -> (29, 1)）
    pub fn from_a1_notation(a1: &str) -> Option<Self> {
        let cleaned: String = a1.chars().filter(|c| *c != '$').collect();
        let split = cleaned.find(|c: char| c.is_ascii_digit())?;
        let (letters, digits) = cleaned.split_at(split);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_uppercase()) {
            return None;
        }
        let row: u32 = digits.parse().ok()?;
        if row == 0 {
            return None;
        }
        let mut col: u32 = 0;
        for ch in letters.chars() {
            col = col.checked_mul(26)?.checked_add((ch as u8 - b'A') as u32 + 1)?;
        }
        Some(Self::new(row - 1, col - 1))
    }

    /// 列インデックスを文字列に変換（0 -> "A", 25 -> "Z", 26 -> "AA"）
    pub fn col_index_to_letter(mut col: u32) -> String {
        let mut result = String::new();
        loop {
            let remainder = col % 26;
            result.insert(0, (b'A' + remainder as u8) as char);
            if col < 26 {
                break;
            }
            col = col / 26 - 1;
        }
        result
    }
}

/// 1始まりの列番号を列文字に変換（1 -> "A", 9 -> "I"）
///
/// ダッシュボードのレイアウトはExcel表記（1始まり）で記述するため、
/// 数式文字列の組み立てにはこちらを使用します。
pub(crate) fn col_letter(col: u16) -> String {
    CellCoord::col_index_to_letter(u32::from(col.saturating_sub(1)))
}

/// FN列（FN1 = B列）の列番号（1始まり）
pub(crate) fn fn_col(fortnight: u16) -> u16 {
    fortnight + 1
}

/// セル範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CellRange {
    pub start: CellCoord,
    pub end: CellCoord,
}

impl CellRange {
    /// 新しい範囲を生成
    pub fn new(start: CellCoord, end: CellCoord) -> Self {
        Self { start, end }
    }

    /// 指定された座標が範囲内にあるかを判定
    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.row >= self.start.row
            && coord.row <= self.end.row
            && coord.col >= self.start.col
            && coord.col <= self.end.col
    }
}

/// ExSimの地域（ゾーン）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    Center,
    West,
    North,
    East,
    South,
}

impl Zone {
    /// 既定の並び順
    pub const ALL: [Zone; 5] = [Zone::Center, Zone::West, Zone::North, Zone::East, Zone::South];

    /// 表示名
    pub fn name(&self) -> &'static str {
        match self {
            Zone::Center => "Center",
            Zone::West => "West",
            Zone::North => "North",
            Zone::East => "East",
            Zone::South => "South",
        }
    }

    /// `ALL`内の位置
    pub fn index(&self) -> usize {
        match self {
            Zone::Center => 0,
            Zone::West => 1,
            Zone::North => 2,
            Zone::East => 3,
            Zone::South => 4,
        }
    }

    /// ゾーン別の塗りつぶし色（RGB）
    pub fn color(&self) -> u32 {
        match self {
            Zone::Center => 0x4472C4,
            Zone::West => 0xED7D31,
            Zone::North => 0x70AD47,
            Zone::East => 0xFFC000,
            Zone::South => 0x9E480E,
        }
    }

    /// 名前からゾーンを判定（大文字小文字を区別しない完全一致）
    pub fn from_name(name: &str) -> Option<Zone> {
        let name = name.trim();
        Zone::ALL
            .into_iter()
            .find(|z| z.name().eq_ignore_ascii_case(name))
    }
}

/// 市場セグメント
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    High,
    Low,
}

impl Segment {
    pub const ALL: [Segment; 2] = [Segment::High, Segment::Low];

    pub fn name(&self) -> &'static str {
        match self {
            Segment::High => "High",
            Segment::Low => "Low",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Segment::High => 0,
            Segment::Low => 1,
        }
    }

    pub fn from_name(name: &str) -> Option<Segment> {
        match name.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Segment::High),
            "low" => Some(Segment::Low),
            _ => None,
        }
    }
}

/// ゾーンごとの値を保持する固定長マップ
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ZoneMap<T>(pub [T; 5]);

impl<T: Copy> ZoneMap<T> {
    /// すべてのゾーンに同じ値を設定
    pub fn filled(value: T) -> Self {
        Self([value; 5])
    }

    pub fn get(&self, zone: Zone) -> T {
        self.0[zone.index()]
    }

    pub fn set(&mut self, zone: Zone, value: T) {
        self.0[zone.index()] = value;
    }
}
