//! Purchasing Dashboard
//!
//! サプライヤー設定、発注費・保管費の効率分析、MRP（資材所要量計画）、
//! 調達支出のプレビューとアップロード用タブを生成します。
//!
//! MRPの入荷予定は各サプライヤーの発注行をリードタイム分ずらして合計し、
//! ロットサイズの倍数でない発注はBatch Compliance行で検出します。

use rust_xlsxwriter::{Format, FormatAlign, Workbook};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::case::CaseParameters;
use crate::compute::{self, OrderingBalance, ORDERING_RATIO_HIGH, ORDERING_RATIO_LOW};
use crate::dashboards::DashboardPlan;
use crate::error::DashboardError;
use crate::layout::formula::{self, abs, at};
use crate::layout::styles::{self, DARK_RED, HEADER_BLUE, MONEY, MONEY_CENTS, PERCENT, RED_FILL};
use crate::layout::{Highlight, SheetWriter};
use crate::parser::{InputContext, ReportGrid};
use crate::types::{col_letter, fn_col, Zone, FORTNIGHTS};

pub(crate) const SUPPLIER_CONFIG: &str = "SUPPLIER_CONFIG";
pub(crate) const COST_ANALYSIS: &str = "COST_ANALYSIS";
pub(crate) const MRP_ENGINE: &str = "MRP_ENGINE";
pub(crate) const CASH_FLOW_PREVIEW: &str = "CASH_FLOW_PREVIEW";
pub(crate) const UPLOAD_READY_PROCUREMENT: &str = "UPLOAD_READY_PROCUREMENT";

pub(crate) const TABS: &[&str] = &[
    SUPPLIER_CONFIG,
    COST_ANALYSIS,
    MRP_ENGINE,
    CASH_FLOW_PREVIEW,
    UPLOAD_READY_PROCUREMENT,
];

pub(crate) const PARTS: [&str; 2] = ["Part A", "Part B"];
pub(crate) const PIECES: [&str; 6] = ["Piece 1", "Piece 2", "Piece 3", "Piece 4", "Piece 5", "Piece 6"];
pub(crate) const SUPPLIERS: [&str; 3] = ["Supplier A", "Supplier B", "Supplier C"];

/// MRP_ENGINEの生産目標行
pub(crate) const TARGET_ROW: u32 = 6;
const SUPPLIER_FIRST_ROW: u32 = 6;
const PIECE_FIRST_ROW: u32 = SUPPLIER_FIRST_ROW + 6 + 4;
const DEFAULT_BUDGET: f64 = 100_000.0;
const PIECES_COL: u16 = 18;

/// サプライヤー1社分の条件
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Supplier {
    pub name: &'static str,
    pub lead_time: u16,
    pub cost: f64,
    pub payment_terms: u16,
    pub batch_size: u32,
}

/// 部品ごとのサプライヤー一覧と期首在庫
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PartPlan {
    pub name: &'static str,
    pub suppliers: [Supplier; 3],
    pub opening_inventory: f64,
}

/// ピースの条件と期首在庫
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PieceConfig {
    pub name: &'static str,
    pub cost: f64,
    pub batch_size: u32,
    pub opening_inventory: f64,
}

/// 前期の発注費・保管費・消費額
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct ProcurementCosts {
    pub ordering: f64,
    pub holding: f64,
    pub consumption: f64,
}

impl ProcurementCosts {
    pub fn ordering_ratio(&self) -> f64 {
        compute::ordering_ratio(self.ordering, self.holding)
    }
}

/// 購買ダッシュボードの入力値
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PurchasingInputs {
    pub parts: [PartPlan; 2],
    pub pieces: [PieceConfig; 6],
    pub costs: ProcurementCosts,
}

impl Default for PurchasingInputs {
    fn default() -> Self {
        Self {
            parts: PARTS.map(|name| PartPlan {
                name,
                suppliers: SUPPLIERS.map(|supplier| Supplier {
                    name: supplier,
                    lead_time: 0,
                    cost: 0.0,
                    payment_terms: 0,
                    batch_size: 0,
                }),
                opening_inventory: 0.0,
            }),
            pieces: PIECES.map(|name| PieceConfig {
                name,
                cost: 0.0,
                batch_size: 0,
                opening_inventory: 0.0,
            }),
            costs: ProcurementCosts::default(),
        }
    }
}

/// 在庫レポートの品目（部品またはピース）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Item {
    Part(usize),
    Piece(usize),
}

/// `raw_materials.xlsx`から品目ごとの期末在庫（列8）を取得
///
/// # 戻り値
///
/// (部品の在庫, ピースの在庫)
pub(crate) fn parse_raw_materials(grid: &ReportGrid) -> ([f64; 2], [f64; 6]) {
    let mut parts = [0.0; 2];
    let mut pieces = [0.0; 6];
    let mut current = None;

    for row in grid.rows() {
        let label = row.label();
        if let Some(i) = PARTS.iter().position(|p| label.contains(&p.to_lowercase())) {
            current = Some(Item::Part(i));
        }
        if let Some(i) = PIECES.iter().position(|p| label.contains(&p.to_lowercase())) {
            current = Some(Item::Piece(i));
        }

        if label.contains("final") && label.contains("inventory") {
            match current {
                Some(Item::Part(i)) => parts[i] = row.number(8),
                Some(Item::Piece(i)) => pieces[i] = row.number(8),
                None => {}
            }
        }
    }

    (parts, pieces)
}

/// `production.xlsx`から発注費・保管費・消費額を取得（列1..9で最初の正の値）
pub(crate) fn parse_production_costs(grid: &ReportGrid) -> ProcurementCosts {
    let mut costs = ProcurementCosts::default();

    for row in grid.rows() {
        let label = row.label();
        let value = || row.first_positive(1..10);

        if label.contains("ordering") && label.contains("cost") {
            if let Some(v) = value() {
                costs.ordering = v;
            }
        }
        if label.contains("holding") && label.contains("cost") {
            if let Some(v) = value() {
                costs.holding = v;
            }
        }
        if label.contains("consumed") || label.contains("consumption") {
            if let Some(v) = value() {
                costs.consumption = v;
            }
        }
    }

    costs
}

impl PurchasingInputs {
    fn apply_case(&mut self, case: &CaseParameters) {
        for part in self.parts.iter_mut() {
            let Some(terms) = case.part(part.name) else {
                continue;
            };
            for (i, supplier) in part.suppliers.iter_mut().enumerate() {
                supplier.cost = terms.prices[i];
                supplier.payment_terms = terms.payment_fortnights[i];
                supplier.batch_size = terms.batch_size;
            }
        }
        for (piece, terms) in self.pieces.iter_mut().zip(case.pieces.iter()) {
            piece.cost = terms.price;
            piece.batch_size = terms.batch_size;
        }
    }
}

/// MRP_ENGINEの行位置
///
/// セクションBは部品ごとに6行（見出し・総所要量・入荷予定・予測在庫・不足・空行）、
/// セクションCは部品ごとに6行（見出し・発注3行・ロット確認・空行）です。
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct MrpRows {
    pub label: u32,
    pub gross: u32,
    pub arrivals: u32,
    pub projected: u32,
    pub deficit: u32,
    pub orders_label: u32,
    pub orders: [u32; 3],
    pub compliance: u32,
}

const NET_REQUIREMENTS_ROW: u32 = 9;
const SOURCING_ROW: u32 = NET_REQUIREMENTS_ROW + 2 + 6 * PARTS.len() as u32;

impl MrpRows {
    pub fn of(part: usize) -> Self {
        let label = NET_REQUIREMENTS_ROW + 2 + 6 * part as u32;
        let orders_label = SOURCING_ROW + 3 + 6 * part as u32;
        Self {
            label,
            gross: label + 1,
            arrivals: label + 2,
            projected: label + 3,
            deficit: label + 4,
            orders_label,
            orders: [orders_label + 1, orders_label + 2, orders_label + 3],
            compliance: orders_label + 4,
        }
    }
}

impl DashboardPlan for PurchasingInputs {
    fn load(ctx: &mut InputContext<'_>, case: Option<&CaseParameters>) -> Self {
        let mut inputs = PurchasingInputs::default();

        if let Some(grid) = ctx.grid("raw_materials.xlsx", None) {
            let (parts, pieces) = parse_raw_materials(&grid);
            for (plan, stock) in inputs.parts.iter_mut().zip(parts) {
                plan.opening_inventory = stock;
            }
            for (piece, stock) in inputs.pieces.iter_mut().zip(pieces) {
                piece.opening_inventory = stock;
            }
            debug!("opening stock part A {:.0}, part B {:.0}", parts[0], parts[1]);
        }
        if let Some(grid) = ctx.grid("production.xlsx", None) {
            inputs.costs = parse_production_costs(&grid);
            debug!(
                "ordering {:.0}, holding {:.0}, {:?}",
                inputs.costs.ordering,
                inputs.costs.holding,
                OrderingBalance::classify(inputs.costs.ordering_ratio())
            );
        }
        if ctx.grid("Procurement Decisions.xlsx", Some("Procurement")).is_some() {
            debug!("procurement template found");
        }

        if let Some(case) = case {
            inputs.apply_case(case);
        }

        inputs
    }

    fn render(&self, workbook: &mut Workbook) -> Result<(), DashboardError> {
        supplier_config(workbook, self)?;
        cost_analysis(workbook, self)?;
        mrp_engine(workbook, self)?;
        cash_flow_preview(workbook, self)?;
        upload_ready(workbook)?;
        Ok(())
    }

    fn shared_outputs(&self) -> Map<String, Value> {
        let orders: Map<String, Value> = self
            .parts
            .iter()
            .map(|p| {
                let batch = p.suppliers.iter().map(|s| s.batch_size).max().unwrap_or(0);
                (
                    p.name.to_string(),
                    json!({ "opening_inventory": p.opening_inventory, "batch_size": batch }),
                )
            })
            .collect();
        let schedule: Map<String, Value> = self
            .parts
            .iter()
            .map(|p| {
                let leads: Map<String, Value> = p
                    .suppliers
                    .iter()
                    .map(|s| (s.name.to_string(), json!(s.lead_time)))
                    .collect();
                (p.name.to_string(), Value::Object(leads))
            })
            .collect();
        let spend = self.costs.consumption + self.costs.ordering + self.costs.holding;

        let mut out = Map::new();
        out.insert("material_orders".into(), Value::Object(orders));
        out.insert("supplier_spend".into(), json!(spend));
        out.insert("lead_time_schedule".into(), Value::Object(schedule));
        out
    }
}

fn supplier_config(wb: &mut Workbook, inputs: &PurchasingInputs) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), SUPPLIER_CONFIG)?;

    ws.title(1, "SUPPLIER CONFIGURATION")?;
    ws.note(2, 1, "Enter your case study supplier data here. Pre-filled with defaults.")?;

    ws.section(4, 1, "TABLE 1: PARTS SUPPLIERS")?;
    ws.headers(
        5,
        1,
        &["Part", "Supplier", "Lead Time (FN)", "Cost/Unit", "Payment Terms (FN)", "Batch Size"],
        &styles::header(),
    )?;
    let mut r = SUPPLIER_FIRST_ROW;
    for part in &inputs.parts {
        for s in &part.suppliers {
            ws.cell(r, 1, part.name)?;
            ws.put(r, 2, s.name, &styles::input())?;
            ws.put(r, 3, u32::from(s.lead_time), &styles::input())?;
            ws.put(r, 4, s.cost, &styles::input().set_num_format(MONEY_CENTS))?;
            ws.put(r, 5, u32::from(s.payment_terms), &styles::input())?;
            ws.put(r, 6, s.batch_size, &styles::input())?;
            r += 1;
        }
    }

    ws.section(PIECE_FIRST_ROW - 2, 1, "TABLE 2: PIECES CONFIGURATION")?;
    ws.headers(
        PIECE_FIRST_ROW - 1,
        1,
        &["Piece Name", "Cost/Unit", "Batch Size"],
        &styles::header(),
    )?;
    for (i, piece) in inputs.pieces.iter().enumerate() {
        let r = PIECE_FIRST_ROW + i as u32;
        ws.cell(r, 1, piece.name)?;
        ws.put(r, 2, piece.cost, &styles::input().set_num_format(MONEY_CENTS))?;
        ws.put(r, 3, piece.batch_size, &styles::input())?;
    }

    for (col, width) in [(1, 15.0), (2, 15.0), (3, 16.0), (4, 12.0), (5, 18.0), (6, 12.0)] {
        ws.width(col, width)?;
    }
    Ok(())
}

/// SUPPLIER_CONFIG上の単価セル
fn supplier_cost_cell(part: usize, supplier: usize) -> String {
    supplier_config_cell(4, part, supplier)
}

/// 入荷のずらし幅はSUPPLIER_CONFIGのリードタイム入力を参照する
fn supplier_lead_cell(part: usize, supplier: usize) -> String {
    supplier_config_cell(3, part, supplier)
}

fn supplier_config_cell(col: u16, part: usize, supplier: usize) -> String {
    format!(
        "{}!{}",
        SUPPLIER_CONFIG,
        abs(col, SUPPLIER_FIRST_ROW + (part * 3 + supplier) as u32)
    )
}

fn cost_analysis(wb: &mut Workbook, inputs: &PurchasingInputs) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), COST_ANALYSIS)?;
    let money = styles::cell().set_num_format(MONEY);

    ws.title(1, "COST ANALYSIS - Batch Size Efficiency")?;
    ws.section(3, 1, "PREVIOUS PERIOD COSTS")?;

    ws.cell(5, 1, "Ordering Cost (Total)")?;
    ws.put(5, 2, inputs.costs.ordering, &money)?;
    ws.cell(6, 1, "Holding Cost (Total)")?;
    ws.put(6, 2, inputs.costs.holding, &money)?;
    ws.cell(7, 1, "Total Cost")?;
    ws.put(7, 2, "=B5+B6", &styles::calc().set_num_format(MONEY))?;

    ws.section(9, 1, "EFFICIENCY ANALYSIS")?;
    ws.cell(11, 1, "Ordering Cost Ratio")?;
    ws.put(11, 2, "=IF(B7>0,B5/B7,0)", &styles::calc().set_num_format(PERCENT))?;

    ws.cell(13, 1, "Efficiency Flag")?;
    ws.put(
        13,
        2,
        format!(
            "=IF(B11>{high},\"CRITICAL: Ordering too often. INCREASE BATCH SIZE.\",IF(B11<{low},\"CRITICAL: Holding too much. DECREASE BATCH SIZE/JIT.\",\"OK: Balanced\"))",
            high = ORDERING_RATIO_HIGH,
            low = ORDERING_RATIO_LOW
        ),
        &styles::bold(),
    )?;

    ws.section(16, 1, "STRATEGIC ADVICE")?;
    let advice = "Based on your Ordering Cost Ratio:\n\
        • > 70%: You're placing too many small orders. Consolidate orders into larger batches.\n\
        • < 30%: You're holding too much inventory. Consider Just-In-Time ordering or smaller batches.\n\
        • 30-70%: Good balance between ordering frequency and inventory holding.";
    ws.merge(
        17,
        1,
        20,
        4,
        advice,
        &styles::highlight(styles::CALC_FILL)
            .set_text_wrap()
            .set_align(FormatAlign::Top),
    )?;
    ws.height(17, 80.0)?;

    ws.width(1, 25.0)?;
    ws.width(2, 50.0)?;
    Ok(())
}

fn fortnight_header(ws: &mut SheetWriter<'_>, row: u32, first: &str) -> Result<(), DashboardError> {
    ws.put(row, 1, first, &styles::header())?;
    for (i, label) in formula::fortnight_labels("FN").iter().enumerate() {
        ws.put(row, 2 + i as u16, label, &styles::header())?;
    }
    Ok(())
}

fn mrp_engine(wb: &mut Workbook, inputs: &PurchasingInputs) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), MRP_ENGINE)?;

    ws.title(1, "MRP ENGINE - Material Requirements Planning")?;
    ws.section(3, 1, "SECTION A: PRODUCTION DEMAND (Input from Production Manager)")?;
    fortnight_header(&mut ws, TARGET_ROW - 1, "Metric")?;
    ws.cell(TARGET_ROW, 1, "Target Production")?;
    for fortnight in 1..=FORTNIGHTS {
        ws.put(TARGET_ROW, fn_col(fortnight), 0.0, &styles::input())?;
    }

    ws.section(NET_REQUIREMENTS_ROW, 1, "SECTION B: NET REQUIREMENTS CALCULATION")?;
    let part_label = Format::new().set_bold().set_font_color(HEADER_BLUE);
    let last_col = fn_col(FORTNIGHTS);

    for (p, part) in inputs.parts.iter().enumerate() {
        let rows = MrpRows::of(p);
        let orders: Vec<(u32, String)> = rows
            .orders
            .iter()
            .enumerate()
            .map(|(s, row)| (*row, supplier_lead_cell(p, s)))
            .collect();
        let opening = format!("{}", part.opening_inventory);

        ws.put(rows.label, 1, part.name.to_uppercase().as_str(), &part_label)?;
        ws.cell(rows.gross, 1, "Gross Requirement")?;
        ws.cell(rows.arrivals, 1, "Scheduled Arrivals")?;
        ws.cell(rows.projected, 1, "Projected Inventory")?;
        ws.cell(rows.deficit, 1, "Net Deficit (if negative)")?;

        for fortnight in 1..=FORTNIGHTS {
            let col = fn_col(fortnight);
            ws.put(
                rows.gross,
                col,
                format!("={}${}", col_letter(col), TARGET_ROW),
                &styles::reference(),
            )?;
            ws.put(
                rows.arrivals,
                col,
                formula::lead_shifted_arrivals(&orders, fortnight),
                &styles::calc(),
            )?;
            ws.put(
                rows.projected,
                col,
                format!(
                    "{}+{}-{}",
                    formula::carry_forward(fortnight, &opening, rows.projected),
                    at(col, rows.arrivals),
                    at(col, rows.gross)
                ),
                &styles::calc(),
            )?;
            let projected = at(col, rows.projected);
            ws.put(
                rows.deficit,
                col,
                format!("=IF({p}<0,-{p},0)", p = projected),
                &styles::filled(styles::OUTPUT_FILL),
            )?;
        }

        ws.highlight(
            rows.projected,
            2,
            rows.projected,
            last_col,
            &Highlight::formula(
                format!("={}<0", at(2, rows.projected)),
                styles::highlight(RED_FILL).set_bold().set_font_color(DARK_RED),
            ),
        )?;
    }

    ws.section(SOURCING_ROW, 1, "SECTION C: SOURCING STRATEGY (Order Inputs)")?;
    ws.note(
        SOURCING_ROW + 1,
        1,
        "NOTE: Orders arrive AFTER Lead Time. Enter in the FN you want to ORDER, not when it arrives.",
    )?;

    for (p, part) in inputs.parts.iter().enumerate() {
        let rows = MrpRows::of(p);
        ws.put(
            rows.orders_label,
            1,
            format!("ORDERS FOR {}", part.name.to_uppercase()),
            &Format::new().set_bold(),
        )?;

        let mut batches = Vec::with_capacity(3);
        for (row, s) in rows.orders.iter().zip(part.suppliers.iter()) {
            ws.cell(
                *row,
                1,
                format!("Order {} (Batch:{})", s.name, s.batch_size),
            )?;
            for fortnight in 1..=FORTNIGHTS {
                ws.put(*row, fn_col(fortnight), 0.0, &styles::input())?;
            }
            batches.push((*row, s.batch_size));
        }

        ws.cell(rows.compliance, 1, "Batch Compliance Check")?;
        for fortnight in 1..=FORTNIGHTS {
            let col = fn_col(fortnight);
            ws.put(
                rows.compliance,
                col,
                formula::batch_compliance(&batches, col),
                &styles::calc(),
            )?;
        }
        ws.highlight(
            rows.compliance,
            2,
            rows.compliance,
            last_col,
            &Highlight::fill(format!("={}=\"CHECK BATCH\"", at(2, rows.compliance)), RED_FILL),
        )?;
    }

    ws.width(1, 35.0)?;
    ws.widths(2, last_col, 10.0)?;
    Ok(())
}

fn cash_flow_preview(wb: &mut Workbook, inputs: &PurchasingInputs) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), CASH_FLOW_PREVIEW)?;
    let money = |f: Format| f.set_num_format(MONEY);
    let total_col = fn_col(FORTNIGHTS) + 1;

    ws.title(1, "CASH FLOW PREVIEW - Procurement Spending")?;
    ws.section(3, 1, "ESTIMATED OUTFLOW BY FORTNIGHT")?;
    fortnight_header(&mut ws, 5, "Category")?;
    ws.put(5, total_col, "Total", &styles::header())?;

    let mut r = 6;
    for (p, part) in inputs.parts.iter().enumerate() {
        let rows = MrpRows::of(p);
        ws.cell(r, 1, format!("{} Orders", part.name))?;
        for fortnight in 1..=FORTNIGHTS {
            let col = fn_col(fortnight);
            let terms: Vec<String> = rows
                .orders
                .iter()
                .enumerate()
                .map(|(s, row)| format!("{}!{}*{}", MRP_ENGINE, at(col, *row), supplier_cost_cell(p, s)))
                .collect();
            ws.put(r, col, format!("={}", terms.join("+")), &money(styles::calc()))?;
        }
        ws.put(r, total_col, formula::sum_row(r, 2, total_col - 1), &money(styles::calc()))?;
        r += 1;
    }

    ws.cell(r, 1, "Pieces Orders")?;
    for fortnight in 1..=FORTNIGHTS {
        ws.put(r, fn_col(fortnight), 0.0, &money(styles::input()))?;
    }
    ws.put(r, total_col, formula::sum_row(r, 2, total_col - 1), &money(styles::calc()))?;
    r += 1;

    let total_row = r;
    ws.put(total_row, 1, "TOTAL SPEND", &Format::new().set_bold())?;
    for col in 2..=total_col {
        ws.put(total_row, col, formula::sum_col(col, 6, total_row - 1), &money(styles::output()))?;
    }

    let cumulative = total_row + 1;
    ws.put(cumulative, 1, "CUMULATIVE SPEND", &Format::new().set_bold())?;
    for fortnight in 1..=FORTNIGHTS {
        let col = fn_col(fortnight);
        let seed = at(2, total_row);
        ws.put(
            cumulative,
            col,
            if fortnight == 1 {
                format!("={}", seed)
            } else {
                format!("{}+{}", formula::carry_forward(fortnight, &seed, cumulative), at(col, total_row))
            },
            &money(styles::reference()),
        )?;
    }

    let budget = cumulative + 3;
    ws.section(budget, 1, "BUDGET TRACKING")?;
    ws.cell(budget + 1, 1, "Total Budget")?;
    ws.put(budget + 1, 2, DEFAULT_BUDGET, &money(styles::input()))?;
    ws.cell(budget + 2, 1, "Total Projected Spend")?;
    ws.put(budget + 2, 2, format!("={}", at(total_col, total_row)), &money(styles::calc()))?;
    ws.cell(budget + 3, 1, "Remaining Budget")?;
    ws.put(
        budget + 3,
        2,
        format!("=B{}-B{}", budget + 1, budget + 2),
        &money(styles::output()),
    )?;
    ws.highlight(
        budget + 3,
        2,
        budget + 3,
        2,
        &Highlight::fill(format!("=B{}<0", budget + 3), RED_FILL),
    )?;

    ws.width(1, 20.0)?;
    ws.widths(2, total_col, 12.0)?;
    Ok(())
}

fn upload_ready(wb: &mut Workbook) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), UPLOAD_READY_PROCUREMENT)?;

    ws.title(1, "PROCUREMENT DECISIONS - ExSim Upload Format (Side-by-Side)")?;
    ws.note(2, 1, "This matches the exact ExSim Procurement upload layout")?;

    ws.section(4, 1, "Parts")?;
    let mut headers = vec!["Zone".to_string(), "Supplier".to_string(), "Component".to_string()];
    headers.extend((1..=FORTNIGHTS).map(|n| n.to_string()));
    let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
    ws.headers(5, 1, &headers, &styles::header())?;

    let mut r = 6;
    for zone in Zone::ALL {
        for (s, supplier) in SUPPLIERS.iter().enumerate() {
            for (p, part) in PARTS.iter().enumerate() {
                ws.cell(r, 1, zone.name())?;
                ws.cell(r, 2, *supplier)?;
                ws.cell(r, 3, *part)?;
                for fortnight in 1..=FORTNIGHTS {
                    let col = 3 + fortnight;
                    if zone == Zone::Center {
                        let order_row = MrpRows::of(p).orders[s];
                        ws.put(
                            r,
                            col,
                            formula::link(MRP_ENGINE, fn_col(fortnight), order_row),
                            &styles::input(),
                        )?;
                    } else {
                        ws.put(r, col, 0.0, &styles::input())?;
                    }
                }
                r += 1;
            }
        }
    }

    ws.section(4, PIECES_COL, "Pieces")?;
    ws.headers(
        5,
        PIECES_COL,
        &["Zone", "Supplier", "Component", "Order"],
        &styles::header(),
    )?;
    let mut r = 6;
    for zone in Zone::ALL {
        for piece in PIECES {
            ws.cell(r, PIECES_COL, zone.name())?;
            ws.cell(r, PIECES_COL + 1, "Pieces")?;
            ws.cell(r, PIECES_COL + 2, piece)?;
            ws.put(r, PIECES_COL + 3, 0.0, &styles::input())?;
            r += 1;
        }
    }

    ws.width(1, 10.0)?;
    ws.widths(2, 3, 12.0)?;
    ws.widths(4, 3 + FORTNIGHTS, 8.0)?;
    ws.widths(PIECES_COL, PIECES_COL + 2, 10.0)?;
    ws.width(PIECES_COL + 3, 8.0)?;
    Ok(())
}
