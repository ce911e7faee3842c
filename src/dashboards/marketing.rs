//! CMO Dashboard
//!
//! セグメント別の市場配分ドライバ、イノベーション選択、ゾーン別の4P決定と
//! 収益見込みを1つのワークブックにまとめます。
//!
//! # 入力ファイル
//!
//! - `market-report.xlsx`: セクション見出しで状態遷移しながら読む市場レポート
//! - `Marketing Innovation Decisions.xlsx`（"Innovation"シート）: 改善項目の一覧
//! - `Marketing Decisions.xlsx`（"Marketing"シート）: 前回のTV・ラジオ・需要の決定
//! - `sales_admin_expenses.xlsx`: ゾーン別の販売数量
//! - `finished_goods_inventory.xlsx`: 期末在庫（欠品判定）

use rust_xlsxwriter::{
    Chart, ChartFormat, ChartMarker, ChartMarkerType, ChartSolidFill, ChartType,
    ConditionalFormatIconType, Format, FormatAlign, Workbook,
};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::case::CaseParameters;
use crate::dashboards::DashboardPlan;
use crate::error::DashboardError;
use crate::layout::formula;
use crate::layout::styles::{
    self, COUNT, DARK_RED, MONEY, ORANGE_FILL, OUTPUT_FILL, PERCENT, RED_FILL,
    REF_FILL,
};
use crate::layout::{Highlight, SheetWriter};
use crate::parser::{InputContext, ReportGrid, ReportRow};
use crate::types::{Segment, Zone, ZoneMap};

pub(crate) const SEGMENT_PULSE: &str = "SEGMENT_PULSE";
pub(crate) const INNOVATION_LAB: &str = "INNOVATION_LAB";
pub(crate) const STRATEGY_COCKPIT: &str = "STRATEGY_COCKPIT";
pub(crate) const UPLOAD_READY_MARKETING: &str = "UPLOAD_READY_MARKETING";
pub(crate) const UPLOAD_READY_INNOVATION: &str = "UPLOAD_READY_INNOVATION";

pub(crate) const TABS: &[&str] = &[
    SEGMENT_PULSE,
    INNOVATION_LAB,
    STRATEGY_COCKPIT,
    UPLOAD_READY_MARKETING,
    UPLOAD_READY_INNOVATION,
];

const MY_COMPANY: &str = "Company 3";

const DEFAULT_PRICE: f64 = 100.0;
const DEFAULT_AWARENESS: f64 = 50.0;
const DEFAULT_ATTRACTIVENESS: f64 = 50.0;
const DEFAULT_SHARE: f64 = 25.0;
const DEFAULT_UNITS: f64 = 1000.0;
const DEFAULT_FINAL_INVENTORY: f64 = 500.0;
pub(crate) const COGS: f64 = 40.0;
pub(crate) const SALESPERSON_SALARY: f64 = 5000.0;
const FEATURE_COST: f64 = 10_000.0;
const STOCKOUT_UPLIFT: f64 = 1.1;

/// 高価格帯セグメントで配分を失う認知度の下限
const CRITICAL_AWARENESS: f64 = 30.0;
/// 低価格帯セグメントで数量を失う価格差（割合）
const PRICE_GAP_RISK: f64 = 0.05;

const DEFAULT_FEATURES: [&str; 14] = [
    "STAINLESS MATERIAL",
    "RECYCLABLE MATERIALS",
    "ENERGY EFFICIENCY",
    "LIGHTER AND MORE COMPACT",
    "IMPACT RESISTANCE",
    "NOISE REDUCTION",
    "IMPROVED BATTERY CAPACITY",
    "SELF-CLEANING",
    "SPEED SETTINGS",
    "DIGITAL CONTROLS",
    "VOICE ASSISTANCE INTEGRATION",
    "AUTOMATION AND PROGRAMMABILITY",
    "MULTIFUNCTIONAL ACCESSORIES",
    "MAPPING TECHNOLOGY",
];

/// SEGMENT_PULSEの各セグメント表のデータ先頭行
fn segment_first_row(segment: Segment) -> u32 {
    5 + 9 * segment.index() as u32
}

const FEATURE_FIRST_ROW: u32 = 5;
pub(crate) const COCKPIT_FIRST_ROW: u32 = 12;
pub(crate) const COCKPIT_TOTAL_ROW: u32 = COCKPIT_FIRST_ROW + 5;

/// ゾーン単位の市場指標
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ZoneMarket {
    pub share: f64,
    pub awareness: f64,
    pub rival_awareness: f64,
    pub attractiveness: f64,
    pub price: f64,
    pub rival_price: f64,
}

impl Default for ZoneMarket {
    fn default() -> Self {
        Self {
            share: DEFAULT_SHARE,
            awareness: DEFAULT_AWARENESS,
            rival_awareness: DEFAULT_AWARENESS,
            attractiveness: DEFAULT_ATTRACTIVENESS,
            price: DEFAULT_PRICE,
            rival_price: DEFAULT_PRICE,
        }
    }
}

impl ZoneMarket {
    /// 競合平均に対する自社価格の差（割合）
    pub fn price_gap(&self) -> f64 {
        price_gap(self.price, self.rival_price)
    }

    pub fn awareness_gap(&self) -> f64 {
        self.awareness - self.rival_awareness
    }
}

/// 競合平均価格に対する価格差（割合）。競合価格が0以下なら0
pub(crate) fn price_gap(mine: f64, rivals: f64) -> f64 {
    if rivals > 0.0 {
        (mine - rivals) / rivals
    } else {
        0.0
    }
}

/// 市場レポートの読み取り結果
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MarketReport {
    pub zones: ZoneMap<ZoneMarket>,
    /// セグメント別の自社シェア（`Segment::index`順）
    pub segment_share: [ZoneMap<f64>; 2],
}

impl Default for MarketReport {
    fn default() -> Self {
        Self {
            zones: ZoneMap::default(),
            segment_share: [ZoneMap::filled(DEFAULT_SHARE); 2],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    SegmentShare,
    RegionShare,
    Awareness,
    Attractiveness,
    Price,
}

impl Section {
    fn detect(label: &str) -> Option<Section> {
        if label.contains("market share") && label.contains("segment") {
            Some(Section::SegmentShare)
        } else if label.contains("market share") && label.contains("region") {
            Some(Section::RegionShare)
        } else if label.contains("awareness") {
            Some(Section::Awareness)
        } else if label.contains("attractiveness") {
            Some(Section::Attractiveness)
        } else if label.contains("price") && !label.contains("zone") {
            Some(Section::Price)
        } else {
            None
        }
    }
}

/// 先頭の正の値を自社、残りの正の値の平均を競合とみなす
fn mine_and_rivals(row: &ReportRow<'_>) -> Option<(f64, Option<f64>)> {
    let values: Vec<f64> = row.numbers(1..6).into_iter().filter(|v| *v > 0.0).collect();
    let (mine, rest) = values.split_first()?;
    let rivals = if rest.is_empty() {
        None
    } else {
        Some(rest.iter().sum::<f64>() / rest.len() as f64)
    };
    Some((*mine, rivals))
}

/// `market-report.xlsx`をセクション単位で読む
///
/// ゾーン行はA列の完全一致で判定し、B列に`High`/`Low`があればセグメント行とみなします。
/// A列が空でB列にセグメントだけがある継続行は直前のゾーンに属します。
pub(crate) fn parse_market_report(grid: &ReportGrid) -> MarketReport {
    let mut report = MarketReport::default();
    let mut section = None;
    let mut zone = None;

    for row in grid.rows() {
        let label = row.label();
        if let Some(s) = Section::detect(&label) {
            section = Some(s);
        }
        let segment = Segment::from_name(&row.text(1));

        if let Some(z) = Zone::from_name(&row.text(0)) {
            zone = Some(z);
            let market = &mut report.zones.0[z.index()];
            match section {
                Some(Section::RegionShare) => {
                    if let Some(v) = row.first_positive(1..6) {
                        market.share = v;
                    }
                }
                Some(Section::Awareness) if segment.is_none() => {
                    if let Some((mine, rivals)) = mine_and_rivals(&row) {
                        market.awareness = mine;
                        if let Some(r) = rivals {
                            market.rival_awareness = r;
                        }
                    }
                }
                Some(Section::Attractiveness) if segment.is_none() => {
                    if let Some(v) = row.first_positive(1..6) {
                        market.attractiveness = v;
                    }
                }
                Some(Section::Price) => {
                    if let Some((mine, rivals)) = mine_and_rivals(&row) {
                        market.price = mine;
                        if let Some(r) = rivals {
                            market.rival_price = r;
                        }
                    }
                }
                _ => {}
            }
        }

        if let (Some(Section::SegmentShare), Some(z), Some(seg)) = (section, zone, segment) {
            if let Some(v) = row.first_positive(2..6) {
                report.segment_share[seg.index()].set(z, v);
            }
        }
    }
    report
}

/// "Innovation"シートのB列から改善項目名を集める（見出し行は除外）
pub(crate) fn parse_innovation_features(grid: &ReportGrid) -> Vec<String> {
    grid.rows()
        .map(|row| row.text(1))
        .filter(|name| {
            let upper = name.to_uppercase();
            !name.is_empty() && upper != "IMPROVEMENT" && upper != "NAN"
        })
        .collect()
}

fn default_features() -> Vec<String> {
    DEFAULT_FEATURES.iter().map(|f| f.to_string()).collect()
}

/// 前回のマーケティング決定
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MarketingPlan {
    pub tv_budget: f64,
    /// 0 = 認知度重視、100 = 属性重視
    pub brand_focus: f64,
    pub radio: ZoneMap<f64>,
    pub demand: ZoneMap<f64>,
    pub prices: ZoneMap<f64>,
    pub payment: ZoneMap<char>,
    pub salespeople: ZoneMap<f64>,
}

impl Default for MarketingPlan {
    fn default() -> Self {
        Self {
            tv_budget: 35.0,
            brand_focus: 50.0,
            radio: ZoneMap::filled(100.0),
            demand: ZoneMap::filled(0.0),
            prices: ZoneMap::filled(68.0),
            payment: ZoneMap::filled('B'),
            salespeople: ZoneMap::filled(10.0),
        }
    }
}

/// "Marketing"シートのキャンペーン行（ブランドA）と需要欄（H・I列）を読む
pub(crate) fn parse_marketing_decisions(grid: &ReportGrid) -> MarketingPlan {
    let mut plan = MarketingPlan::default();
    for row in grid.rows() {
        if row.text(0).eq_ignore_ascii_case("a") {
            match row.text(2).to_lowercase().as_str() {
                "tv" => {
                    plan.tv_budget = row.number(3);
                    plan.brand_focus = row.number(4);
                }
                "radio" => {
                    if let Some(zone) = Zone::from_name(&row.text(1)) {
                        plan.radio.set(zone, row.number(3));
                    }
                }
                _ => {}
            }
        }
        if let Some(zone) = Zone::from_name(&row.text(7)) {
            plan.demand.set(zone, row.number(8));
        }
    }
    plan
}

/// `sales_admin_expenses.xlsx`のゾーン別販売数量
///
/// ゾーン名の行に続く"units"行の、列1..11で最初の正の値を使います。
pub(crate) fn parse_sales_units(grid: &ReportGrid) -> ZoneMap<f64> {
    let mut units = ZoneMap::filled(DEFAULT_UNITS);
    let mut zone = None;
    for row in grid.rows() {
        if let Some(z) = Zone::from_name(&row.text(0)) {
            zone = Some(z);
        }
        if let Some(z) = zone {
            if row.label().contains("units") {
                if let Some(v) = row.first_positive(1..12) {
                    units.set(z, v);
                }
            }
        }
    }
    units
}

/// `finished_goods_inventory.xlsx`の期末在庫（FN8 = 列8）
pub(crate) fn parse_final_inventory(grid: &ReportGrid) -> Option<f64> {
    grid.find_row(|label| label.contains("final") && label.contains("inventory"))
        .map(|row| row.number(8))
}

/// SEGMENT_PULSEの配分フラグ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AllocationFlag {
    Ok,
    /// 高価格帯で認知度不足
    BoostTv,
    /// 低価格帯で価格が競合より高すぎる
    LosingVolume,
}

impl AllocationFlag {
    /// セグメントごとの判定
    ///
    /// # 引数
    ///
    /// * `awareness` - 自社の認知度
    /// * `price_gap` - 競合平均に対する価格差（割合）
    pub fn classify(segment: Segment, awareness: f64, price_gap: f64) -> Self {
        match segment {
            Segment::High if awareness < CRITICAL_AWARENESS => AllocationFlag::BoostTv,
            Segment::Low if price_gap > PRICE_GAP_RISK => AllocationFlag::LosingVolume,
            _ => AllocationFlag::Ok,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AllocationFlag::Ok => "OK",
            AllocationFlag::BoostTv => "CRITICAL: Boost TV for Allocation",
            AllocationFlag::LosingVolume => "RISK: Losing Volume to Price",
        }
    }

    fn fill(&self) -> u32 {
        match self {
            AllocationFlag::Ok => OUTPUT_FILL,
            AllocationFlag::BoostTv => RED_FILL,
            AllocationFlag::LosingVolume => ORANGE_FILL,
        }
    }
}

/// CMOダッシュボードの入力値
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MarketingInputs {
    pub market: MarketReport,
    pub features: Vec<String>,
    pub plan: MarketingPlan,
    pub last_sales: ZoneMap<f64>,
    pub final_inventory: f64,
}

impl Default for MarketingInputs {
    fn default() -> Self {
        Self {
            market: MarketReport::default(),
            features: default_features(),
            plan: MarketingPlan::default(),
            last_sales: ZoneMap::filled(DEFAULT_UNITS),
            final_inventory: DEFAULT_FINAL_INVENTORY,
        }
    }
}

impl MarketingInputs {
    /// 期末在庫が0以下なら欠品（実需は販売実績より大きい）
    pub fn is_stockout(&self) -> bool {
        self.final_inventory <= 0.0
    }

    /// 目標需要。欠品時は販売実績の1.1倍（切り捨て）
    pub fn target_demand(&self, zone: Zone) -> f64 {
        let last = self.last_sales.get(zone);
        if self.is_stockout() {
            (last * STOCKOUT_UPLIFT).trunc()
        } else {
            last
        }
    }

    /// ゾーン平均（自社価格, 競合価格, 自社魅力度, 自社認知度）
    fn zone_averages(&self) -> (f64, f64, f64, f64) {
        let n = Zone::ALL.len() as f64;
        let zones = &self.market.zones.0;
        let avg = |f: fn(&ZoneMarket) -> f64| zones.iter().map(f).sum::<f64>() / n;
        (
            avg(|m| m.price),
            avg(|m| m.rival_price),
            avg(|m| m.attractiveness),
            avg(|m| m.awareness),
        )
    }

    /// 価格競争力（100 − 平均価格差%の絶対値）
    fn price_competitiveness(&self) -> f64 {
        let n = Zone::ALL.len() as f64;
        let mean_gap = self
            .market
            .zones
            .0
            .iter()
            .map(|m| (m.price - m.rival_price) / m.rival_price.max(1.0) * 100.0)
            .sum::<f64>()
            / n;
        100.0 - mean_gap.abs()
    }

    /// 全ゾーン合計のマーケティング費用（TV・ラジオ・営業人件費）
    pub fn marketing_spend(&self) -> f64 {
        let radio: f64 = self.plan.radio.0.iter().sum();
        let salespeople: f64 = self.plan.salespeople.0.iter().sum();
        self.plan.tv_budget + radio + salespeople * SALESPERSON_SALARY
    }
}

impl DashboardPlan for MarketingInputs {
    fn load(ctx: &mut InputContext<'_>, _case: Option<&CaseParameters>) -> Self {
        let mut inputs = MarketingInputs::default();

        if let Some(grid) = ctx.grid("market-report.xlsx", None) {
            inputs.market = parse_market_report(&grid);
        }
        if let Some(grid) = ctx.grid("Marketing Innovation Decisions.xlsx", Some("Innovation")) {
            let features = parse_innovation_features(&grid);
            if !features.is_empty() {
                inputs.features = features;
            }
        }
        if let Some(grid) = ctx.grid("Marketing Decisions.xlsx", Some("Marketing")) {
            inputs.plan = parse_marketing_decisions(&grid);
        }
        if let Some(grid) = ctx.grid("sales_admin_expenses.xlsx", None) {
            inputs.last_sales = parse_sales_units(&grid);
        }
        if let Some(grid) = ctx.grid("finished_goods_inventory.xlsx", None) {
            if let Some(v) = parse_final_inventory(&grid) {
                inputs.final_inventory = v;
            }
        }

        debug!(
            "{} innovation features, TV {:.0}, focus {:.0}, stockout {}",
            inputs.features.len(),
            inputs.plan.tv_budget,
            inputs.plan.brand_focus,
            inputs.is_stockout()
        );
        for zone in Zone::ALL {
            debug!(
                "{}: last sales {:.0}, previous demand {:.0}",
                zone.name(),
                inputs.last_sales.get(zone),
                inputs.plan.demand.get(zone)
            );
        }

        inputs
    }

    fn render(&self, workbook: &mut Workbook) -> Result<(), DashboardError> {
        segment_pulse(workbook, self)?;
        let innovation_total = innovation_lab(workbook, &self.features)?;
        strategy_cockpit(workbook, self, innovation_total)?;
        upload_marketing(workbook)?;
        upload_innovation(workbook, &self.features)?;
        Ok(())
    }

    fn shared_outputs(&self) -> Map<String, Value> {
        let demand: Map<String, Value> = Zone::ALL
            .iter()
            .map(|z| (z.name().to_string(), json!(self.target_demand(*z))))
            .collect();
        let pricing: Map<String, Value> = Zone::ALL
            .iter()
            .map(|z| (z.name().to_string(), json!(self.plan.prices.get(*z))))
            .collect();

        let mut out = Map::new();
        out.insert("demand_forecast".into(), Value::Object(demand));
        out.insert("marketing_spend".into(), json!(self.marketing_spend()));
        out.insert("pricing".into(), Value::Object(pricing));
        // 改善項目の採否は既定ですべて0
        out.insert("innovation_costs".into(), json!(0.0));
        out
    }
}

fn segment_pulse(wb: &mut Workbook, inputs: &MarketingInputs) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), SEGMENT_PULSE)?;
    ws.title(1, "SEGMENT PULSE - Market Allocation Drivers")?;
    ws.note(2, 1, &format!("{} vs. competitor averages by zone", MY_COMPANY))?;

    for segment in Segment::ALL {
        let first = segment_first_row(segment);
        let last = first + 4;
        ws.section(first - 2, 1, &format!("{} SEGMENT ANALYSIS", segment.name().to_uppercase()))?;
        ws.headers(
            first - 1,
            1,
            &[
                "Zone",
                "My Market Share",
                "Awareness Gap",
                "Price Gap",
                "Attractiveness",
                "Allocation Flag",
            ],
            &styles::header(),
        )?;

        for zone in Zone::ALL {
            let r = first + zone.index() as u32;
            let market = inputs.market.zones.get(zone);
            let share = inputs.market.segment_share[segment.index()].get(zone);
            let gap = market.awareness_gap();
            let flag = AllocationFlag::classify(segment, market.awareness, market.price_gap());

            ws.cell(r, 1, zone.name())?;
            let share_format = if share <= 1.0 { PERCENT } else { "0.0" };
            ws.put(r, 2, share, &styles::cell().set_num_format(share_format))?;
            let gap_format = if gap < 0.0 {
                styles::filled(RED_FILL)
            } else {
                styles::cell()
            };
            ws.put(r, 3, gap, &gap_format)?;
            ws.put(r, 4, market.price_gap(), &styles::cell().set_num_format(PERCENT))?;
            ws.cell(r, 5, market.attractiveness)?;
            ws.put(r, 6, flag.label(), &styles::filled(flag.fill()).set_bold())?;
        }

        ws.highlight(
            first,
            2,
            last,
            2,
            &Highlight::DataBar {
                min: 0,
                max: 50,
                color: 0x63C384,
            },
        )?;
        ws.highlight(
            first,
            3,
            last,
            3,
            &Highlight::IconSet(ConditionalFormatIconType::ThreeTrafficLights),
        )?;
        ws.highlight(
            first,
            4,
            last,
            4,
            &Highlight::formula(
                format!("=D{}>0.1", first),
                Format::new().set_bold().set_font_color(DARK_RED),
            ),
        )?;
    }

    for (col, width) in [(1, 12.0), (2, 16.0), (3, 14.0), (4, 12.0), (5, 14.0), (6, 32.0)] {
        ws.width(col, width)?;
    }

    let (my_price, rival_price, my_attract, awareness) = inputs.zone_averages();

    ws.section(1, 8, "COMPETITIVE POSITIONING")?;
    ws.headers(3, 8, &["Entity", "Price", "Attractiveness"], &styles::header())?;
    for (r, entity, price, attract) in [
        (4, "My Product", my_price, my_attract),
        (5, "Competitors", rival_price, DEFAULT_ATTRACTIVENESS),
    ] {
        ws.cell(r, 8, entity)?;
        ws.put(r, 9, price, &styles::cell().set_num_format(MONEY))?;
        ws.cell(r, 10, attract)?;
    }

    let mut positioning = Chart::new(ChartType::Scatter);
    for (r, name, marker, color) in [
        (4, "My Product", ChartMarkerType::Circle, 0x4472C4),
        (5, "Competitors", ChartMarkerType::Diamond, 0xED7D31),
    ] {
        positioning
            .add_series()
            .set_name(name)
            .set_categories(ws.range(r, 9, r, 9))
            .set_values(ws.range(r, 10, r, 10))
            .set_marker(
                ChartMarker::new().set_type(marker).set_size(12).set_format(
                    ChartFormat::new().set_solid_fill(ChartSolidFill::new().set_color(color)),
                ),
            );
    }
    positioning.title().set_name("Competitive Positioning Matrix");
    positioning.x_axis().set_name("Price ($)");
    positioning.y_axis().set_name("Attractiveness Score");
    ws.chart(7, 8, &positioning)?;

    // 現状のレポートはゾーン単位のため、両セグメントに同じ平均を表示する
    let competitiveness = inputs.price_competitiveness();
    ws.section(24, 8, "HIGH vs LOW SEGMENT GAP")?;
    ws.headers(26, 8, &["Metric", "High Segment", "Low Segment"], &styles::header())?;
    for (r, metric, value) in [
        (27, "Awareness", awareness),
        (28, "Price Competitiveness", competitiveness),
        (29, "Attractiveness", my_attract),
    ] {
        ws.cell(r, 8, metric)?;
        ws.cell(r, 9, value)?;
        ws.cell(r, 10, value)?;
    }

    let mut gap = Chart::new(ChartType::Column);
    for (col, name) in [(9, "High Segment"), (10, "Low Segment")] {
        gap.add_series()
            .set_name(name)
            .set_categories(ws.range(27, 8, 29, 8))
            .set_values(ws.range(27, col, 29, col));
    }
    gap.title().set_name("High vs Low Segment Comparison");
    ws.chart(31, 8, &gap)?;

    ws.width(8, 18.0)?;
    ws.widths(9, 10, 14.0)?;
    Ok(())
}

/// INNOVATION_LABを書き出し、合計セルの行番号を返す
fn innovation_lab(wb: &mut Workbook, features: &[String]) -> Result<u32, DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), INNOVATION_LAB)?;

    ws.title(1, "INNOVATION LAB - Feature Selection")?;
    ws.note(
        2,
        1,
        "Note: Innovations increase Attractiveness. Required for High Segment Allocation.",
    )?;
    ws.headers(4, 1, &["Feature Name", "Decision (1=Yes)", "Est. Cost ($)"], &styles::header())?;

    for (i, feature) in features.iter().enumerate() {
        let r = FEATURE_FIRST_ROW + i as u32;
        ws.cell(r, 1, feature)?;
        ws.put(r, 2, 0, &styles::input().set_align(FormatAlign::Center))?;
        ws.put(r, 3, FEATURE_COST, &styles::input().set_num_format(MONEY))?;
    }

    let last = FEATURE_FIRST_ROW + features.len().max(1) as u32 - 1;
    let total = last + 2;
    ws.put(total, 1, "TOTAL INNOVATION COST", &styles::bold())?;
    ws.put(
        total,
        3,
        format!(
            "=SUMPRODUCT(B{f}:B{l},C{f}:C{l})",
            f = FEATURE_FIRST_ROW,
            l = last
        ),
        &styles::calc().set_bold().set_num_format(MONEY),
    )?;

    ws.width(1, 35.0)?;
    ws.width(2, 18.0)?;
    ws.width(3, 15.0)?;
    Ok(total)
}

fn strategy_cockpit(
    wb: &mut Workbook,
    inputs: &MarketingInputs,
    innovation_total: u32,
) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), STRATEGY_COCKPIT)?;
    let money = |f: Format| f.set_num_format(MONEY);

    ws.note(
        1,
        1,
        "HOW TO USE: Adjust Yellow cells. Check Profit Projection. Go to UPLOAD_READY tabs to copy decisions.",
    )?;

    ws.section(3, 1, "SECTION A: GLOBAL ALLOCATIONS")?;
    ws.cell(5, 1, "TV Budget ($)")?;
    ws.put(5, 2, inputs.plan.tv_budget, &money(styles::input()))?;
    ws.note(5, 3, "Primary Driver: High Segment Awareness")?;
    ws.cell(6, 1, "Brand Focus (0-100)")?;
    ws.put(6, 2, inputs.plan.brand_focus, &styles::input())?;
    ws.note(6, 3, "0=Awareness focus, 100=Attributes focus")?;

    ws.section(9, 1, "SECTION B: ZONAL ALLOCATIONS")?;
    ws.headers(
        11,
        1,
        &[
            "Zone",
            "Last Sales",
            "Stockout?",
            "Target Demand",
            "Radio Budget",
            "Salespeople",
            "Price",
            "Payment",
            "Est. Revenue",
            "Mkt Cost",
            "Contribution",
        ],
        &styles::header(),
    )?;

    let stockout = inputs.is_stockout();
    let innovation = format!("{}!C{}", INNOVATION_LAB, innovation_total);
    for zone in Zone::ALL {
        let r = COCKPIT_FIRST_ROW + zone.index() as u32;

        ws.cell(r, 1, zone.name())?;
        ws.put(
            r,
            2,
            inputs.last_sales.get(zone),
            &styles::reference().set_num_format(COUNT),
        )?;
        if stockout {
            ws.put(
                r,
                3,
                "TRUE DEMAND HIGHER",
                &styles::filled(RED_FILL).set_bold().set_font_color(DARK_RED),
            )?;
        } else {
            ws.put(r, 3, "OK", &styles::filled(REF_FILL))?;
        }

        ws.put(
            r,
            4,
            inputs.target_demand(zone),
            &styles::input().set_num_format(COUNT),
        )?;
        ws.put(r, 5, inputs.plan.radio.get(zone), &money(styles::input()))?;
        ws.put(r, 6, inputs.plan.salespeople.get(zone), &styles::input())?;
        ws.put(r, 7, inputs.plan.prices.get(zone), &money(styles::input()))?;
        ws.put(
            r,
            8,
            inputs.plan.payment.get(zone).to_string(),
            &styles::input().set_align(FormatAlign::Center),
        )?;

        ws.put(r, 9, format!("=D{r}*G{r}", r = r), &money(styles::calc()))?;
        ws.put(
            r,
            10,
            format!(
                "=($B$5/5)+E{r}+(F{r}*{salary})+({innovation}/5)",
                r = r,
                salary = SALESPERSON_SALARY,
                innovation = innovation
            ),
            &money(styles::calc()),
        )?;
        ws.put(
            r,
            11,
            format!("=I{r}-J{r}-(D{r}*{cogs})", r = r, cogs = COGS),
            &money(styles::output()),
        )?;
    }
    let last = COCKPIT_TOTAL_ROW - 1;
    ws.list_validation(COCKPIT_FIRST_ROW, 8, last, 8, &["A", "B", "C", "D"])?;

    ws.put(COCKPIT_TOTAL_ROW, 1, "TOTAL", &styles::bold())?;
    ws.put(
        COCKPIT_TOTAL_ROW,
        4,
        formula::sum_col(4, COCKPIT_FIRST_ROW, last),
        &styles::input().set_num_format(COUNT),
    )?;
    for col in [9, 10] {
        ws.put(
            COCKPIT_TOTAL_ROW,
            col,
            formula::sum_col(col, COCKPIT_FIRST_ROW, last),
            &money(styles::calc()),
        )?;
    }
    ws.put(
        COCKPIT_TOTAL_ROW,
        11,
        formula::sum_col(11, COCKPIT_FIRST_ROW, last),
        &money(styles::output()),
    )?;

    ws.width(1, 12.0)?;
    ws.widths(2, 11, 14.0)?;
    Ok(())
}

fn upload_marketing(wb: &mut Workbook) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), UPLOAD_READY_MARKETING)?;
    let cockpit = |col: u16, row: u32| formula::link(STRATEGY_COCKPIT, col, row);

    ws.title(1, "MARKETING DECISIONS - ExSim Upload Format")?;
    ws.note(2, 1, "Copy these values to ExSim Marketing upload")?;

    ws.section(4, 1, "Marketing Campaigns")?;
    ws.headers(5, 1, &["Brand", "Zone", "Channel", "Amount", "Brand Focus"], &styles::header())?;
    ws.cell(6, 1, "A")?;
    ws.cell(6, 2, "All")?;
    ws.cell(6, 3, "TV")?;
    ws.cell(6, 4, cockpit(2, 5))?;
    ws.cell(6, 5, cockpit(2, 6))?;
    for zone in Zone::ALL {
        let r = 7 + zone.index() as u32;
        ws.cell(r, 1, "A")?;
        ws.cell(r, 2, zone.name())?;
        ws.cell(r, 3, "Radio")?;
        ws.cell(r, 4, cockpit(5, COCKPIT_FIRST_ROW + zone.index() as u32))?;
        ws.cell(r, 5, cockpit(2, 6))?;
    }

    ws.section(4, 7, "Demand")?;
    ws.headers(5, 7, &["Zone", "Demand"], &styles::header())?;
    ws.section(4, 10, "Pricing Strategy")?;
    ws.headers(5, 10, &["Zone", "Brand", "Price"], &styles::header())?;
    ws.section(4, 14, "Channels")?;
    ws.headers(5, 14, &["Zone", "Payment", "Salespeople"], &styles::header())?;

    for zone in Zone::ALL {
        let r = 6 + zone.index() as u32;
        let source = COCKPIT_FIRST_ROW + zone.index() as u32;

        ws.cell(r, 7, zone.name())?;
        ws.cell(r, 8, cockpit(4, source))?;

        ws.cell(r, 10, zone.name())?;
        ws.cell(r, 11, "A")?;
        ws.cell(r, 12, cockpit(7, source))?;

        ws.cell(r, 14, zone.name())?;
        ws.cell(r, 15, cockpit(8, source))?;
        ws.cell(r, 16, cockpit(6, source))?;
    }

    ws.widths(1, 16, 12.0)?;
    Ok(())
}

fn upload_innovation(wb: &mut Workbook, features: &[String]) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), UPLOAD_READY_INNOVATION)?;

    ws.title(1, "INNOVATION DECISIONS - ExSim Upload Format")?;
    ws.note(2, 1, "Copy these values to ExSim Innovation upload")?;
    ws.headers(4, 1, &["Brand", "Improvement", "Value"], &styles::header())?;

    for (i, feature) in features.iter().enumerate() {
        let r = FEATURE_FIRST_ROW + i as u32;
        ws.cell(r, 1, "A")?;
        ws.cell(r, 2, feature)?;
        ws.cell(r, 3, formula::link(INNOVATION_LAB, 2, r))?;
    }

    ws.width(1, 10.0)?;
    ws.width(2, 35.0)?;
    ws.width(3, 10.0)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;

    fn text(s: &str) -> CellValue {
        CellValue::String(s.to_string())
    }

    fn num(v: f64) -> CellValue {
        CellValue::Number(v)
    }

    fn blank() -> CellValue {
        CellValue::Empty
    }

    #[test]
    fn test_parse_market_report_sections() {
        let grid = ReportGrid::new(vec![
            vec![text("Market Share by Segment")],
            vec![text("Center"), text("High"), blank(), num(18.0)],
            vec![blank(), text("Low"), num(31.5)],
            vec![text("Market Share by Region")],
            vec![text("West"), num(22.0)],
            vec![text("Brand Awareness")],
            vec![text("North"), num(28.0), num(40.0), num(60.0)],
            vec![text("Attractiveness")],
            vec![text("East"), num(64.0)],
            vec![text("Average Price")],
            vec![text("South"), text("$95"), num(100.0), num(110.0)],
        ]);
        let report = parse_market_report(&grid);

        assert_eq!(report.segment_share[Segment::High.index()].get(Zone::Center), 18.0);
        assert_eq!(report.segment_share[Segment::Low.index()].get(Zone::Center), 31.5);
        assert_eq!(report.segment_share[Segment::Low.index()].get(Zone::West), 25.0);
        assert_eq!(report.zones.get(Zone::West).share, 22.0);

        let north = report.zones.get(Zone::North);
        assert_eq!(north.awareness, 28.0);
        assert_eq!(north.rival_awareness, 50.0);
        assert_eq!(report.zones.get(Zone::East).attractiveness, 64.0);

        let south = report.zones.get(Zone::South);
        assert_eq!(south.price, 95.0);
        assert_eq!(south.rival_price, 105.0);
        assert_eq!(report.zones.get(Zone::Center), ZoneMarket::default());
    }

    #[test]
    fn test_price_gap() {
        assert!((price_gap(110.0, 100.0) - 0.1).abs() < 1e-9);
        assert_eq!(price_gap(90.0, 0.0), 0.0);
    }

    #[test]
    fn test_allocation_flags() {
        assert_eq!(
            AllocationFlag::classify(Segment::High, 25.0, 0.0),
            AllocationFlag::BoostTv
        );
        assert_eq!(AllocationFlag::classify(Segment::High, 30.0, 0.5), AllocationFlag::Ok);
        assert_eq!(
            AllocationFlag::classify(Segment::Low, 10.0, 0.06),
            AllocationFlag::LosingVolume
        );
        assert_eq!(AllocationFlag::classify(Segment::Low, 10.0, 0.05), AllocationFlag::Ok);
        assert_eq!(AllocationFlag::BoostTv.label(), "CRITICAL: Boost TV for Allocation");
    }

    #[test]
    fn test_parse_innovation_features_skips_header() {
        let grid = ReportGrid::new(vec![
            vec![text("Brand"), text("Improvement"), text("Value")],
            vec![text("A"), text("STAINLESS MATERIAL"), num(0.0)],
            vec![text("A"), text(" NOISE REDUCTION "), num(0.0)],
            vec![text("A"), blank()],
        ]);
        assert_eq!(
            parse_innovation_features(&grid),
            vec!["STAINLESS MATERIAL".to_string(), "NOISE REDUCTION".to_string()]
        );
        assert_eq!(MarketingInputs::default().features.len(), 14);
    }

    #[test]
    fn test_parse_marketing_decisions() {
        let grid = ReportGrid::new(vec![
            vec![text("Brand"), text("Zone"), text("Channel"), text("Amount")],
            vec![text("A"), text("All"), text("TV"), num(42.0), num(70.0)],
            vec![text("A"), text("North"), text("Radio"), num(150.0)],
            vec![
                blank(),
                blank(),
                blank(),
                blank(),
                blank(),
                blank(),
                blank(),
                text("East"),
                num(1200.0),
            ],
        ]);
        let plan = parse_marketing_decisions(&grid);
        assert_eq!(plan.tv_budget, 42.0);
        assert_eq!(plan.brand_focus, 70.0);
        assert_eq!(plan.radio.get(Zone::North), 150.0);
        assert_eq!(plan.radio.get(Zone::Center), 100.0);
        assert_eq!(plan.demand.get(Zone::East), 1200.0);
        assert_eq!(plan.prices.get(Zone::West), 68.0);
        assert_eq!(plan.payment.get(Zone::South), 'B');
    }

    #[test]
    fn test_parse_sales_units() {
        let grid = ReportGrid::new(vec![
            vec![text("Center")],
            vec![text("Units sold"), blank(), num(1500.0)],
            vec![text("West")],
            vec![text("Revenue"), num(9.0)],
        ]);
        let units = parse_sales_units(&grid);
        assert_eq!(units.get(Zone::Center), 1500.0);
        assert_eq!(units.get(Zone::West), 1000.0);
    }

    #[test]
    fn test_stockout_lifts_target_demand() {
        let grid = ReportGrid::new(vec![vec![
            text("Final Inventory"),
            num(300.0),
            num(200.0),
            num(100.0),
            num(50.0),
            num(20.0),
            num(10.0),
            num(5.0),
            num(0.0),
        ]]);
        let mut inputs = MarketingInputs::default();
        inputs.final_inventory = parse_final_inventory(&grid).unwrap_or(DEFAULT_FINAL_INVENTORY);
        inputs.last_sales.set(Zone::North, 1234.0);

        assert!(inputs.is_stockout());
        assert_eq!(inputs.target_demand(Zone::North), 1357.0);
        assert_eq!(inputs.target_demand(Zone::Center), 1100.0);
        assert!(!MarketingInputs::default().is_stockout());
    }

    #[test]
    fn test_shared_outputs() {
        let out = MarketingInputs::default().shared_outputs();
        assert_eq!(out["demand_forecast"]["Center"], json!(1000.0));
        assert_eq!(out["pricing"]["South"], json!(68.0));
        assert_eq!(out["marketing_spend"], json!(35.0 + 500.0 + 50.0 * 5000.0));
        assert_eq!(out["innovation_costs"], json!(0.0));
    }
}
