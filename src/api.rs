//! Public API Types
//!
//! 公開APIで使用する列挙型と生成結果の型を定義するモジュール。

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dashboards::{esg, finance, logistics, marketing, people, production, purchasing};
use crate::error::DashboardError;

/// ダッシュボードの種類
///
/// ExSimの各部門（CMO・生産・購買・CLO・CPO・ESG・CFO）に対応する7つの生成器です。
/// 共有出力ファイルとCLIでは`shared_name()`の短い名前で識別します。
///
/// # 使用例
///
/// ```rust
/// use exsim_dashboards::Dashboard;
///
/// let cfo: Dashboard = "CFO".parse().unwrap();
/// assert_eq!(cfo, Dashboard::Finance);
/// assert_eq!(cfo.output_file(), "Finance_Dashboard_Final.xlsx");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Dashboard {
    /// CMO: 市場配分・イノベーション・4P決定
    Marketing,
    /// 生産: ゾーン別の生産計画と設備
    Production,
    /// 購買: サプライヤー選択とMRP
    Purchasing,
    /// CLO: 倉庫・在庫推移・出荷
    Logistics,
    /// CPO: 人員計画と給与
    People,
    /// ESG: CO2削減施策
    Esg,
    /// CFO: 資金繰り・損益・負債
    Finance,
}

impl Dashboard {
    /// 実行順（上流の共有出力が先に書き出される順序）
    pub const EXECUTION_ORDER: [Dashboard; 7] = [
        Dashboard::Marketing,
        Dashboard::Production,
        Dashboard::Purchasing,
        Dashboard::Logistics,
        Dashboard::People,
        Dashboard::Esg,
        Dashboard::Finance,
    ];

    /// 共有出力ファイルとCLIで使う短い名前
    pub fn shared_name(&self) -> &'static str {
        match self {
            Dashboard::Marketing => "CMO",
            Dashboard::Production => "Production",
            Dashboard::Purchasing => "Purchasing",
            Dashboard::Logistics => "CLO",
            Dashboard::People => "CPO",
            Dashboard::Esg => "ESG",
            Dashboard::Finance => "CFO",
        }
    }

    /// 出力ファイル名
    pub fn output_file(&self) -> &'static str {
        match self {
            Dashboard::Marketing => "CMO_Dashboard_Complete.xlsx",
            Dashboard::Production => "Production_Dashboard_Zones.xlsx",
            Dashboard::Purchasing => "Purchasing_Dashboard.xlsx",
            Dashboard::Logistics => "Logistics_Dashboard.xlsx",
            Dashboard::People => "CPO_Dashboard.xlsx",
            Dashboard::Esg => "ESG_Dashboard.xlsx",
            Dashboard::Finance => "Finance_Dashboard_Final.xlsx",
        }
    }

    /// 出力ブックのタブ名（書き出し順）
    pub fn tabs(&self) -> &'static [&'static str] {
        match self {
            Dashboard::Marketing => marketing::TABS,
            Dashboard::Production => production::TABS,
            Dashboard::Purchasing => purchasing::TABS,
            Dashboard::Logistics => logistics::TABS,
            Dashboard::People => people::TABS,
            Dashboard::Esg => esg::TABS,
            Dashboard::Finance => finance::TABS,
        }
    }

    /// 共有出力として公開するキー
    pub fn output_keys(&self) -> &'static [&'static str] {
        match self {
            Dashboard::Marketing => &["demand_forecast", "marketing_spend", "pricing", "innovation_costs"],
            Dashboard::Production => &[
                "production_plan",
                "capacity_utilization",
                "overtime_hours",
                "unit_costs",
            ],
            Dashboard::Purchasing => &["material_orders", "supplier_spend", "lead_time_schedule"],
            Dashboard::Logistics => &["shipping_schedule", "logistics_costs", "inventory_by_zone"],
            Dashboard::People => &["workforce_headcount", "payroll_forecast", "hiring_costs"],
            Dashboard::Esg => &["co2_emissions", "abatement_investment", "tax_liability"],
            Dashboard::Finance => &["cash_flow_projection", "debt_levels", "liquidity_status"],
        }
    }

    /// 共有出力を参照する上流のダッシュボード
    pub fn dependencies(&self) -> &'static [Dashboard] {
        match self {
            Dashboard::Marketing => &[],
            Dashboard::Production => &[Dashboard::Marketing],
            Dashboard::Purchasing => &[Dashboard::Production],
            Dashboard::Logistics => &[Dashboard::Production, Dashboard::Marketing],
            Dashboard::People => &[Dashboard::Production],
            Dashboard::Esg => &[Dashboard::Production],
            Dashboard::Finance => &[
                Dashboard::Marketing,
                Dashboard::Production,
                Dashboard::Purchasing,
                Dashboard::Logistics,
                Dashboard::People,
                Dashboard::Esg,
            ],
        }
    }
}

impl fmt::Display for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.shared_name())
    }
}

impl FromStr for Dashboard {
    type Err = DashboardError;

    /// 短い名前（`CMO`・`CFO`など）または部門名（`marketing`・`finance`など）を受け付けます。
    /// 大文字小文字は区別しません。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        let dashboard = match key.as_str() {
            "cmo" | "marketing" => Dashboard::Marketing,
            "production" => Dashboard::Production,
            "purchasing" | "procurement" => Dashboard::Purchasing,
            "clo" | "logistics" => Dashboard::Logistics,
            "cpo" | "people" => Dashboard::People,
            "esg" => Dashboard::Esg,
            "cfo" | "finance" => Dashboard::Finance,
            _ => return Err(DashboardError::UnknownDashboard(s.to_string())),
        };
        Ok(dashboard)
    }
}

/// 生成対象の選択方式
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum DashboardSelector {
    /// すべてのダッシュボード（デフォルト）
    #[default]
    All,

    /// 単一のダッシュボード
    One(Dashboard),

    /// 複数のダッシュボード
    ///
    /// 指定順にかかわらず実行順（`Dashboard::EXECUTION_ORDER`）で生成されます。
    Many(Vec<Dashboard>),
}

impl DashboardSelector {
    /// 選択されたダッシュボードを実行順で返す
    pub fn resolve(&self) -> Vec<Dashboard> {
        Dashboard::EXECUTION_ORDER
            .into_iter()
            .filter(|d| match self {
                DashboardSelector::All => true,
                DashboardSelector::One(one) => one == d,
                DashboardSelector::Many(many) => many.contains(d),
            })
            .collect()
    }
}

/// 1つのダッシュボード生成の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub dashboard: Dashboard,
    /// 書き出したファイル（バッファ生成の場合は`None`）
    pub output_path: Option<PathBuf>,
    pub tabs: Vec<String>,
    /// 読み込めた入力ファイル
    pub inputs_found: Vec<String>,
    /// 欠損・読み込み失敗で既定値を使った入力ファイル
    pub inputs_defaulted: Vec<String>,
}
