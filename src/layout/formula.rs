//! Formula Builders
//!
//! ダッシュボードに埋め込む数式文字列の組み立て。行・列は1始まり。

use crate::types::{col_letter, fn_col, FORTNIGHTS};

/// 相対参照（例: `B30`）
pub(crate) fn at(col: u16, row: u32) -> String {
    format!("{}{}", col_letter(col), row)
}

/// 絶対参照（例: `$B$9`）
pub(crate) fn abs(col: u16, row: u32) -> String {
    format!("${}${}", col_letter(col), row)
}

/// 範囲参照（例: `B30:I30`）
pub(crate) fn span(first_col: u16, first_row: u32, last_col: u16, last_row: u32) -> String {
    format!("{}:{}", at(first_col, first_row), at(last_col, last_row))
}

/// 他シート参照の数式（例: `=LIQUIDITY_MONITOR!B23`）
pub(crate) fn link(sheet: &str, col: u16, row: u32) -> String {
    format!("={}!{}", sheet, at(col, row))
}

/// 列方向の合計（例: `=SUM(B10:B14)`）
pub(crate) fn sum_col(col: u16, first_row: u32, last_row: u32) -> String {
    format!("=SUM({})", span(col, first_row, col, last_row))
}

/// 行方向の合計（例: `=SUM(B6:I6)`）
pub(crate) fn sum_row(row: u32, first_col: u16, last_col: u16) -> String {
    format!("=SUM({})", span(first_col, row, last_col, row))
}

/// 期間カスケードの開始値
///
/// FN1は`seed`を参照し、FN n (n > 1) は前の列の`carry_row`を参照します。
/// 期首現金（前期の期末残高を引き継ぐ）や予測在庫の繰り越しに使用します。
///
/// # 使用例
///
/// ```rust,ignore
/// assert_eq!(carry_forward(1, "$B$9", 30), "=$B$9");
/// assert_eq!(carry_forward(3, "$B$9", 30), "=C30");
/// ```
pub(crate) fn carry_forward(fortnight: u16, seed: &str, carry_row: u32) -> String {
    if fortnight <= 1 {
        format!("={}", seed)
    } else {
        format!("={}", at(fn_col(fortnight - 1), carry_row))
    }
}

/// リードタイム分ずらした入荷数式
///
/// FN kの入荷は、各発注行のFN (k - lead) 列の合計です。
/// リードタイムはセル参照で受け取るため、Excel上で変更すると入荷も追従します。
/// 発注が期間外（k - lead < 1）になる行は0です。
///
/// # 引数
///
/// * `orders` - (発注行, リードタイムのセル参照) の一覧
/// * `fortnight` - 入荷を計算するFN（1..=8）
///
/// # 使用例
///
/// ```rust,ignore
/// let orders = [(27, "SUPPLIER_CONFIG!$C$6".to_string())];
/// assert_eq!(
///     lead_shifted_arrivals(&orders, 3),
///     "=IF(3>SUPPLIER_CONFIG!$C$6,INDEX($B$27:$I$27,3-SUPPLIER_CONFIG!$C$6),0)"
/// );
/// ```
pub(crate) fn lead_shifted_arrivals(orders: &[(u32, String)], fortnight: u16) -> String {
    if orders.is_empty() {
        return "=0".to_string();
    }

    let first = col_letter(fn_col(1));
    let last = col_letter(fn_col(FORTNIGHTS));
    let terms: Vec<String> = orders
        .iter()
        .map(|(row, lead)| {
            format!(
                "IF({k}>{lead},INDEX(${first}${row}:${last}${row},{k}-{lead}),0)",
                k = fortnight,
                lead = lead,
                first = first,
                last = last,
                row = row
            )
        })
        .collect();
    format!("={}", terms.join("+"))
}

/// ロットサイズ遵守チェック
///
/// 同じ列の各発注数量がロットサイズの倍数でなければ `"CHECK BATCH"` を表示します。
/// ロットサイズが0の発注行は対象外です。
pub(crate) fn batch_compliance(orders: &[(u32, u32)], col: u16) -> String {
    let checks: Vec<String> = orders
        .iter()
        .filter(|(_, batch)| *batch > 0)
        .map(|(row, batch)| format!("MOD({},{})<>0", at(col, *row), batch))
        .collect();

    if checks.is_empty() {
        "=\"OK\"".to_string()
    } else {
        format!("=IF(OR({}),\"CHECK BATCH\",\"OK\")", checks.join(","))
    }
}

/// FN1..FN8のヘッダーラベル
pub(crate) fn fortnight_labels(prefix: &str) -> Vec<String> {
    (1..=FORTNIGHTS).map(|n| format!("{}{}", prefix, n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_references() {
        assert_eq!(at(2, 30), "B30");
        assert_eq!(abs(2, 9), "$B$9");
        assert_eq!(span(2, 30, 9, 30), "B30:I30");
        assert_eq!(link("DEBT_MANAGER", 4, 6), "=DEBT_MANAGER!D6");
        assert_eq!(sum_col(2, 10, 14), "=SUM(B10:B14)");
        assert_eq!(sum_row(6, 2, 9), "=SUM(B6:I6)");
    }

    #[test]
    fn test_carry_forward() {
        assert_eq!(carry_forward(1, "$B$9", 30), "=$B$9");
        assert_eq!(carry_forward(2, "$B$9", 30), "=B30");
        assert_eq!(carry_forward(8, "$B$9", 30), "=H30");
    }

    #[test]
    fn test_lead_shifted_arrivals() {
        let orders = [
            (27, "SUPPLIER_CONFIG!$C$6".to_string()),
            (28, "SUPPLIER_CONFIG!$C$7".to_string()),
        ];
        assert_eq!(
            lead_shifted_arrivals(&orders, 3),
            "=IF(3>SUPPLIER_CONFIG!$C$6,INDEX($B$27:$I$27,3-SUPPLIER_CONFIG!$C$6),0)\
             +IF(3>SUPPLIER_CONFIG!$C$7,INDEX($B$28:$I$28,3-SUPPLIER_CONFIG!$C$7),0)"
        );
        assert_eq!(lead_shifted_arrivals(&[], 2), "=0");
    }

    #[test]
    fn test_batch_compliance() {
        assert_eq!(
            batch_compliance(&[(40, 30), (41, 0), (42, 12)], 3),
            "=IF(OR(MOD(C40,30)<>0,MOD(C42,12)<>0),\"CHECK BATCH\",\"OK\")"
        );
        assert_eq!(batch_compliance(&[(40, 0)], 3), "=\"OK\"");
    }

    #[test]
    fn test_fortnight_labels() {
        let labels = fortnight_labels("FN");
        assert_eq!(labels.len(), 8);
        assert_eq!(labels[0], "FN1");
        assert_eq!(labels[7], "FN8");
    }
}
