//! 数式中のセル参照の抽出

use std::sync::OnceLock;

use regex::Regex;

use crate::types::CellCoord;

/// 数式中の1つのセル参照
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CellRef {
    /// 参照先のシート名（同一シート参照は`None`）
    pub sheet: Option<String>,
    /// 0始まりの座標
    pub coord: CellCoord,
}

impl CellRef {
    /// 同一シート上の指定座標を指しているか
    pub fn is_local(&self, coord: CellCoord) -> bool {
        self.sheet.is_none() && self.coord == coord
    }
}

fn reference_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?:'?([A-Za-z_][A-Za-z0-9_ ]*)'?!)?\$?([A-Z]{1,3})\$?(\d+)").ok())
        .as_ref()
}

/// 文字列リテラルの中身を空白に置き換える
///
/// `""`（エスケープされた引用符）は開閉が2回続くものとして扱われます。
fn blank_string_literals(formula: &str) -> String {
    let mut in_literal = false;
    formula
        .chars()
        .map(|ch| {
            if ch == '"' {
                in_literal = !in_literal;
                ch
            } else if in_literal {
                ' '
            } else {
                ch
            }
        })
        .collect()
}

/// 数式からセル参照を抽出
///
/// 範囲参照（`ROUTE_CONFIG!$A$6:$C$8`）の終点は始点のシート名を引き継ぎます。
///
/// # 使用例
///
/// ```rust,ignore
/// let refs = extract_references("=C30+'DEBT_MANAGER'!B5");
/// assert_eq!(refs[0].sheet, None);
/// assert_eq!(refs[1].sheet.as_deref(), Some("DEBT_MANAGER"));
/// ```
pub(crate) fn extract_references(formula: &str) -> Vec<CellRef> {
    let Some(pattern) = reference_pattern() else {
        return Vec::new();
    };
    let text = blank_string_literals(formula);

    let mut refs: Vec<CellRef> = Vec::new();
    let mut previous_end = None;
    for caps in pattern.captures_iter(&text) {
        let Some(whole) = caps.get(0) else { continue };
        let (Some(col), Some(row)) = (caps.get(2), caps.get(3)) else {
            continue;
        };
        let Some(coord) = CellCoord::from_a1_notation(&format!("{}{}", col.as_str(), row.as_str()))
        else {
            continue;
        };

        let mut sheet = caps.get(1).map(|m| m.as_str().trim().to_string());
        let range_end = whole.start() > 0
            && text[..whole.start()].ends_with(':')
            && previous_end == Some(whole.start() - 1);
        if sheet.is_none() && range_end {
            sheet = refs.last().and_then(|r| r.sheet.clone());
        }

        previous_end = Some(whole.end());
        refs.push(CellRef { sheet, coord });
    }
    refs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(a1: &str) -> CellCoord {
        CellCoord::from_a1_notation(a1).expect("valid A1")
    }

    #[test]
    fn test_local_and_absolute_references() {
        let refs = extract_references("C15+C29-$B$9");
        assert_eq!(refs.len(), 3);
        assert!(refs[0].is_local(coord("C15")));
        assert!(refs[1].is_local(coord("C29")));
        assert!(refs[2].is_local(coord("B9")));
    }

    #[test]
    fn test_cross_sheet_reference() {
        let refs = extract_references("SHIPMENT_BUILDER!B6");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].sheet.as_deref(), Some("SHIPMENT_BUILDER"));
        assert_eq!(refs[0].coord, coord("B6"));
    }

    #[test]
    fn test_quoted_sheet_name() {
        let refs = extract_references("'Route Config'!$D$13*2");
        assert_eq!(refs[0].sheet.as_deref(), Some("Route Config"));
        assert_eq!(refs[0].coord, coord("D13"));
    }

    #[test]
    fn test_range_end_inherits_sheet() {
        let refs = extract_references("VLOOKUP(D6,ROUTE_CONFIG!$A$6:$C$8,3,FALSE)");
        assert_eq!(refs.len(), 3);
        assert!(refs[0].is_local(coord("D6")));
        assert_eq!(refs[2].sheet.as_deref(), Some("ROUTE_CONFIG"));
        assert_eq!(refs[2].coord, coord("C8"));
    }

    #[test]
    fn test_string_literals_are_skipped() {
        let refs = extract_references("IF(D11<C11,\"STRIKE RISK! FN2\",\"OK\")");
        assert_eq!(refs.len(), 2);
        assert!(refs.iter().all(|r| r.sheet.is_none()));
    }
}
