//! Compute Module
//!
//! ダッシュボードの判定閾値と、その閾値で評価する純粋関数。
//! シートに埋め込む数式と同じ閾値を使い、共有出力の算出とテストに利用します。

/// 「余剰現金」と判定する期末残高
pub const EXCESS_CASH: f64 = 200_000.0;
/// 負債比率の警戒ライン
pub const DEBT_RATIO_LIMIT: f64 = 0.6;
/// 発注コスト比率の上限（これを超えると発注過多）
pub const ORDERING_RATIO_HIGH: f64 = 0.7;
/// 発注コスト比率の下限（これを下回ると在庫過多）
pub const ORDERING_RATIO_LOW: f64 = 0.3;
/// 予測純利益率が過去実績をこれ以上上回ると警告
pub const MARGIN_JUMP_TOLERANCE: f64 = 0.05;

/// 期末現金残高の判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CashStatus {
    Insolvent,
    ExcessCash,
    Ok,
}

impl CashStatus {
    pub fn classify(balance: f64) -> Self {
        if balance < 0.0 {
            CashStatus::Insolvent
        } else if balance > EXCESS_CASH {
            CashStatus::ExcessCash
        } else {
            CashStatus::Ok
        }
    }

    /// シート上の表示文字列
    pub fn label(&self) -> &'static str {
        match self {
            CashStatus::Insolvent => "INSOLVENT!",
            CashStatus::ExcessCash => "Excess Cash",
            CashStatus::Ok => "OK",
        }
    }
}

/// 負債比率（総資産が0以下なら0）
pub fn debt_ratio(liabilities: f64, assets: f64) -> f64 {
    if assets > 0.0 {
        liabilities / assets
    } else {
        0.0
    }
}

/// 負債比率が警戒ラインを超えるか
pub fn debt_is_critical(ratio: f64) -> bool {
    ratio > DEBT_RATIO_LIMIT
}

/// 発注コスト・保管コストのバランス判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingBalance {
    /// 発注回数が多すぎる（ロットを大きくする）
    OrderingTooOften,
    /// 在庫を持ちすぎている（ロットを小さくする）
    HoldingTooMuch,
    Balanced,
}

impl OrderingBalance {
    /// 発注コスト比率（発注 / (発注 + 保管)）から判定
    pub fn classify(ratio: f64) -> Self {
        if ratio > ORDERING_RATIO_HIGH {
            OrderingBalance::OrderingTooOften
        } else if ratio < ORDERING_RATIO_LOW {
            OrderingBalance::HoldingTooMuch
        } else {
            OrderingBalance::Balanced
        }
    }
}

/// 発注コスト比率（合計が0以下なら0）
pub fn ordering_ratio(ordering_cost: f64, holding_cost: f64) -> f64 {
    let total = ordering_cost + holding_cost;
    if total > 0.0 {
        ordering_cost / total
    } else {
        0.0
    }
}

/// 提案給与がインフレ下限を下回るとストライキのリスク
pub fn strike_risk(previous_salary: f64, proposed_salary: f64, inflation: f64) -> bool {
    proposed_salary < previous_salary * (1.0 + inflation)
}

/// インフレ率 + 1%の提案給与（小数切り捨て）
pub fn proposed_salary(previous_salary: f64, inflation: f64) -> f64 {
    (previous_salary * (1.0 + inflation + 0.01)).trunc()
}

/// 投資回収年数（年間節税額が0以下なら`None`）
pub fn payback_years(investment: f64, annual_savings: f64) -> Option<f64> {
    if annual_savings > 0.0 {
        Some(investment / annual_savings)
    } else {
        None
    }
}

/// CO2 1トンあたりのコスト（削減量が0以下なら0）
pub fn cost_per_ton(cost: f64, tons_reduced: f64) -> f64 {
    if tons_reduced > 0.0 {
        cost / tons_reduced
    } else {
        0.0
    }
}

/// 数量をリードタイム分だけ後ろの期間へずらす
///
/// FN kの値はFN (k + lead) に移り、期間外に出た分は切り捨てます。
///
/// # 使用例
///
/// ```rust
/// use exsim_dashboards::compute::shift_by_lead;
///
/// assert_eq!(shift_by_lead(&[5.0, 0.0, 3.0], 1), vec![0.0, 5.0, 0.0]);
/// ```
pub fn shift_by_lead(values: &[f64], lead: usize) -> Vec<f64> {
    let mut shifted = vec![0.0; values.len()];
    for (i, v) in values.iter().enumerate() {
        if let Some(slot) = shifted.get_mut(i + lead) {
            *slot += v;
        }
    }
    shifted
}

/// 期首値と各期の純増減から、各期末の残高を計算する
pub fn running_balance(opening: f64, net_changes: &[f64]) -> Vec<f64> {
    net_changes
        .iter()
        .scan(opening, |balance, change| {
            *balance += change;
            Some(*balance)
        })
        .collect()
}

/// 粗利益率・純利益率（売上が0以下なら0）
pub fn margins(net_sales: f64, gross_income: f64, net_profit: f64) -> (f64, f64) {
    if net_sales > 0.0 {
        (gross_income / net_sales, net_profit / net_sales)
    } else {
        (0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cash_status_thresholds() {
        assert_eq!(CashStatus::classify(-0.01), CashStatus::Insolvent);
        assert_eq!(CashStatus::classify(0.0), CashStatus::Ok);
        assert_eq!(CashStatus::classify(200_000.0), CashStatus::Ok);
        assert_eq!(CashStatus::classify(200_000.5), CashStatus::ExcessCash);
        assert_eq!(CashStatus::Insolvent.label(), "INSOLVENT!");
    }

    #[test]
    fn test_debt_ratio() {
        assert_eq!(debt_ratio(60.0, 100.0), 0.6);
        assert_eq!(debt_ratio(10.0, 0.0), 0.0);
        assert!(!debt_is_critical(0.6));
        assert!(debt_is_critical(0.61));
    }

    #[test]
    fn test_ordering_balance() {
        assert_eq!(ordering_ratio(0.0, 0.0), 0.0);
        assert_eq!(
            OrderingBalance::classify(ordering_ratio(80.0, 20.0)),
            OrderingBalance::OrderingTooOften
        );
        assert_eq!(
            OrderingBalance::classify(ordering_ratio(20.0, 80.0)),
            OrderingBalance::HoldingTooMuch
        );
        assert_eq!(OrderingBalance::classify(0.5), OrderingBalance::Balanced);
        assert_eq!(OrderingBalance::classify(0.7), OrderingBalance::Balanced);
    }

    #[test]
    fn test_strike_risk() {
        assert!(strike_risk(100.0, 104.0, 0.05));
        assert!(!strike_risk(100.0, 105.0, 0.05));
        assert_eq!(proposed_salary(100.0, 0.05), 106.0);
        assert!(!strike_risk(100.0, proposed_salary(100.0, 0.05), 0.05));
    }

    #[test]
    fn test_payback_and_cost_per_ton() {
        assert_eq!(payback_years(15_000.0, 7.5), Some(2000.0));
        assert_eq!(payback_years(15_000.0, 0.0), None);
        assert_eq!(cost_per_ton(25.0, 1.0), 25.0);
        assert_eq!(cost_per_ton(25.0, 0.0), 0.0);
    }

    #[test]
    fn test_running_balance() {
        assert_eq!(running_balance(100.0, &[10.0, -30.0, 5.0]), vec![110.0, 80.0, 85.0]);
        assert!(running_balance(1.0, &[]).is_empty());
    }

    #[test]
    fn test_margins() {
        assert_eq!(margins(200.0, 80.0, 20.0), (0.4, 0.1));
        assert_eq!(margins(0.0, 80.0, 20.0), (0.0, 0.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_shift_by_lead_preserves_in_horizon_total(
                values in proptest::collection::vec(0.0f64..1000.0, 8),
                lead in 0usize..10,
            ) {
                let shifted = shift_by_lead(&values, lead);
                prop_assert_eq!(shifted.len(), values.len());

                let kept: f64 = values.iter().take(values.len().saturating_sub(lead)).sum();
                let total: f64 = shifted.iter().sum();
                prop_assert!((kept - total).abs() < 1e-6);

                for (i, v) in shifted.iter().enumerate().take(lead.min(values.len())) {
                    prop_assert_eq!(*v, 0.0, "slot {} before lead must be empty", i);
                }
            }
        }
    }
}
