//! Dashboards Module
//!
//! 7つのダッシュボード生成器。各生成器は同じ3段階で動作します。
//!
//! 1. **Load**: レポートブックを型付きの入力値に読み込む（欠損時は既定値）
//! 2. **Compute**: 埋め込む値と数式文字列を組み立てる
//! 3. **Emit**: 複数タブのワークブックに書き出す

pub(crate) mod esg;
pub(crate) mod finance;
pub(crate) mod logistics;
pub(crate) mod marketing;
pub(crate) mod people;
pub(crate) mod production;
pub(crate) mod purchasing;

use rust_xlsxwriter::Workbook;
use serde_json::{Map, Value};

use crate::api::Dashboard;
use crate::case::CaseParameters;
use crate::error::DashboardError;
use crate::parser::InputContext;

/// ダッシュボード1つ分の入力・描画・共有出力
pub(crate) trait DashboardPlan: Sized {
    /// 入力ファイルを読み込む
    ///
    /// 欠損・読み込み失敗はコンテキストに記録され、既定値が使われます。
    fn load(ctx: &mut InputContext<'_>, case: Option<&CaseParameters>) -> Self;

    /// ワークブックにすべてのタブを書き出す
    fn render(&self, workbook: &mut Workbook) -> Result<(), DashboardError>;

    /// 下流のダッシュボードへ公開する主要数値
    fn shared_outputs(&self) -> Map<String, Value>;
}

/// 生成済みのワークブックと共有出力
pub(crate) struct Built {
    pub workbook: Workbook,
    pub outputs: Map<String, Value>,
}

fn build_with<P: DashboardPlan>(
    ctx: &mut InputContext<'_>,
    case: Option<&CaseParameters>,
) -> Result<Built, DashboardError> {
    let plan = P::load(ctx, case);
    let mut workbook = Workbook::new();
    plan.render(&mut workbook)?;
    Ok(Built {
        workbook,
        outputs: plan.shared_outputs(),
    })
}

/// 指定ダッシュボードを読み込みから描画まで実行する
pub(crate) fn build(
    dashboard: Dashboard,
    ctx: &mut InputContext<'_>,
    case: Option<&CaseParameters>,
) -> Result<Built, DashboardError> {
    match dashboard {
        Dashboard::Marketing => build_with::<marketing::MarketingInputs>(ctx, case),
        Dashboard::Production => build_with::<production::ProductionInputs>(ctx, case),
        Dashboard::Purchasing => build_with::<purchasing::PurchasingInputs>(ctx, case),
        Dashboard::Logistics => build_with::<logistics::LogisticsInputs>(ctx, case),
        Dashboard::People => build_with::<people::PeopleInputs>(ctx, case),
        Dashboard::Esg => build_with::<esg::EsgInputs>(ctx, case),
        Dashboard::Finance => build_with::<finance::FinanceInputs>(ctx, case),
    }
}
