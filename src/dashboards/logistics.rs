//! Logistics Dashboard (CLO)
//!
//! 輸送手段・倉庫設定、ゾーン別在庫バランス（Inventory Tetris）、
//! 出荷計画とアップロード用タブを生成します。

use rust_xlsxwriter::{Chart, ChartFormat, ChartLine, ChartType, Color, FormatAlign, Workbook};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::case::CaseParameters;
use crate::dashboards::DashboardPlan;
use crate::error::DashboardError;
use crate::layout::formula::at;
use crate::layout::styles::{self, MONEY};
use crate::layout::{CellInput, Highlight, SheetWriter};
use crate::parser::{first_integer, InputContext, ReportGrid};
use crate::types::{Zone, ZoneMap, FORTNIGHTS};

pub(crate) const ROUTE_CONFIG: &str = "ROUTE_CONFIG";
pub(crate) const INVENTORY_TETRIS: &str = "INVENTORY_TETRIS";
pub(crate) const SHIPMENT_BUILDER: &str = "SHIPMENT_BUILDER";
pub(crate) const UPLOAD_READY_LOGISTICS: &str = "UPLOAD_READY_LOGISTICS";

pub(crate) const TABS: &[&str] = &[
    ROUTE_CONFIG,
    INVENTORY_TETRIS,
    SHIPMENT_BUILDER,
    UPLOAD_READY_LOGISTICS,
];

pub(crate) const TRANSPORT_MODES: [&str; 3] = ["Train", "Truck", "Plane"];
const MATERIAL: &str = "Electroclean";

/// 出荷ログの行数
pub(crate) const SHIPMENT_SLOTS: u32 = 20;
pub(crate) const SHIPMENT_FIRST_ROW: u32 = 6;

const MODE_FIRST_ROW: u32 = 6;
const WAREHOUSE_FIRST_ROW: u32 = 13;
const TETRIS_FIRST_ROW: u32 = 4;

/// 輸送手段の設定
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TransportMode {
    pub name: &'static str,
    pub lead_time: u16,
    pub unit_cost: f64,
}

/// ゾーン別倉庫の状態
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct Warehouse {
    pub capacity: i64,
    pub inventory: f64,
}

/// CLOダッシュボードの入力値
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LogisticsInputs {
    pub warehouses: ZoneMap<Warehouse>,
    pub total_shipping_cost: f64,
    pub modes: [TransportMode; 3],
    pub module_cost: f64,
    pub module_capacity: f64,
}

impl Default for LogisticsInputs {
    fn default() -> Self {
        Self {
            warehouses: ZoneMap::default(),
            total_shipping_cost: 0.0,
            modes: TRANSPORT_MODES.map(|name| TransportMode {
                name,
                lead_time: 0,
                unit_cost: 0.0,
            }),
            module_cost: 0.0,
            module_capacity: 0.0,
        }
    }
}

/// `finished_goods_inventory.xlsx`をゾーン順に読み取る
///
/// `capacity:`行で現在ゾーンの容量を設定し、`final inventory`行で
/// FN8（列8）の在庫を設定して次のゾーンへ進みます。
pub(crate) fn parse_finished_goods(grid: &ReportGrid) -> ZoneMap<Warehouse> {
    let mut warehouses = ZoneMap::<Warehouse>::default();
    let mut zones = Zone::ALL.into_iter().peekable();

    for row in grid.rows() {
        let Some(&zone) = zones.peek() else {
            break;
        };
        let label = row.label();
        let mut warehouse = warehouses.get(zone);

        if label.contains("capacity:") {
            if let Some(capacity) = first_integer(&label) {
                warehouse.capacity = capacity;
            }
        }
        if label.contains("final inventory") {
            warehouse.inventory = row.number(8);
            zones.next();
        }
        warehouses.set(zone, warehouse);
    }

    warehouses
}

/// `shipping_costs.xlsx`から前期の輸送費を取得
pub(crate) fn parse_shipping_costs(grid: &ReportGrid) -> f64 {
    grid.find_row(|l| l.contains("shipping") && l.contains("cost"))
        .and_then(|row| row.first_positive(1..10))
        .unwrap_or(0.0)
}

fn tetris_block_start(zone: Zone) -> u32 {
    // バナー・パラメータ・空行・ヘッダー・8FN・空行2
    TETRIS_FIRST_ROW + zone.index() as u32 * (4 + u32::from(FORTNIGHTS) + 2)
}

/// Inventory Tetrisのゾーンブロック内の行位置
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TetrisBlock {
    pub banner: u32,
    pub params: u32,
    pub header: u32,
    pub first: u32,
    pub last: u32,
}

impl TetrisBlock {
    pub fn of(zone: Zone) -> Self {
        let banner = tetris_block_start(zone);
        let header = banner + 3;
        Self {
            banner,
            params: banner + 1,
            header,
            first: header + 1,
            last: header + u32::from(FORTNIGHTS),
        }
    }
}

impl LogisticsInputs {
    fn apply_case(&mut self, case: &CaseParameters) {
        for mode in self.modes.iter_mut() {
            if let Some(terms) = case.transport_mode(mode.name) {
                mode.lead_time = terms.lead_time;
                mode.unit_cost = terms.unit_cost;
            }
        }
        self.module_cost = case.warehouse_module_cost;
        self.module_capacity = case.warehouse_module_capacity;
    }
}

impl DashboardPlan for LogisticsInputs {
    fn load(ctx: &mut InputContext<'_>, case: Option<&CaseParameters>) -> Self {
        let mut inputs = LogisticsInputs::default();

        if let Some(grid) = ctx.grid("finished_goods_inventory.xlsx", None) {
            inputs.warehouses = parse_finished_goods(&grid);
            for zone in Zone::ALL {
                let w = inputs.warehouses.get(zone);
                debug!("{}: capacity {}, inventory {:.0}", zone.name(), w.capacity, w.inventory);
            }
        }
        if let Some(grid) = ctx.grid("shipping_costs.xlsx", None) {
            inputs.total_shipping_cost = parse_shipping_costs(&grid);
            debug!("previous shipping cost {:.0}", inputs.total_shipping_cost);
        }
        ctx.check("Logistics Decisions.xlsx");

        if let Some(case) = case {
            inputs.apply_case(case);
        }

        inputs
    }

    fn render(&self, workbook: &mut Workbook) -> Result<(), DashboardError> {
        route_config(workbook, self)?;
        inventory_tetris(workbook, self)?;
        shipment_builder(workbook)?;
        upload_ready(workbook)?;
        Ok(())
    }

    fn shared_outputs(&self) -> Map<String, Value> {
        let schedule: Map<String, Value> = self
            .modes
            .iter()
            .map(|m| {
                (
                    m.name.to_string(),
                    json!({ "lead_time": m.lead_time, "unit_cost": m.unit_cost }),
                )
            })
            .collect();
        let inventory: Map<String, Value> = Zone::ALL
            .iter()
            .map(|z| (z.name().to_string(), json!(self.warehouses.get(*z).inventory)))
            .collect();

        let mut out = Map::new();
        out.insert("shipping_schedule".into(), Value::Object(schedule));
        out.insert(
            "logistics_costs".into(),
            json!({
                "previous_shipping_cost": self.total_shipping_cost,
                "warehouse_module_cost": self.module_cost,
            }),
        );
        out.insert("inventory_by_zone".into(), Value::Object(inventory));
        out
    }
}

fn route_config(wb: &mut Workbook, inputs: &LogisticsInputs) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), ROUTE_CONFIG)?;

    ws.title(1, "ROUTE CONFIGURATION - Transport Physics")?;
    ws.note(2, 1, "Define transport modes and warehouse costs. Yellow cells are editable.")?;

    ws.section(4, 1, "TABLE 1: TRANSPORT MODES")?;
    ws.headers(
        5,
        1,
        &["Mode", "Lead Time (Fortnights)", "Cost Per Unit ($)"],
        &styles::header(),
    )?;
    for (i, mode) in inputs.modes.iter().enumerate() {
        let row = MODE_FIRST_ROW + i as u32;
        ws.cell(row, 1, mode.name)?;
        ws.put(row, 2, u32::from(mode.lead_time), &styles::input())?;
        ws.put(row, 3, mode.unit_cost, &styles::input().set_num_format(MONEY))?;
    }

    ws.section(11, 1, "TABLE 2: WAREHOUSE CONFIGURATION")?;
    ws.headers(
        12,
        1,
        &["Zone", "Current Capacity", "Cost Per Module", "Capacity Per Module"],
        &styles::header(),
    )?;
    for zone in Zone::ALL {
        let row = WAREHOUSE_FIRST_ROW + zone.index() as u32;
        ws.put(row, 1, zone.name(), &styles::zone_label(zone.color()))?;
        ws.put(row, 2, inputs.warehouses.get(zone).capacity, &styles::reference())?;
        ws.put(row, 3, inputs.module_cost, &styles::input().set_num_format(MONEY))?;
        ws.put(row, 4, inputs.module_capacity, &styles::input())?;
    }

    ws.width(1, 12.0)?;
    ws.width(2, 22.0)?;
    ws.width(3, 18.0)?;
    ws.width(4, 22.0)?;
    Ok(())
}

fn inventory_tetris(wb: &mut Workbook, inputs: &LogisticsInputs) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), INVENTORY_TETRIS)?;

    ws.title(1, "INVENTORY TETRIS - Zone-by-Zone Balance")?;
    ws.note(
        2,
        1,
        "Balance inventory using shipments. Watch for STOCKOUT (red) and OVERFLOW (purple) flags.",
    )?;

    for zone in Zone::ALL {
        let block = TetrisBlock::of(zone);
        let warehouse = inputs.warehouses.get(zone);
        let zone_header = styles::zone_label(zone.color()).set_align(FormatAlign::Center);

        ws.merge(
            block.banner,
            1,
            block.banner,
            8,
            &format!(
                "═══ {} ZONE (Capacity: {}) ═══",
                zone.name().to_uppercase(),
                thousands(warehouse.capacity)
            ),
            &zone_header,
        )?;

        let p = block.params;
        ws.cell(p, 1, "Opening Inventory")?;
        ws.put(p, 2, warehouse.inventory, &styles::reference())?;
        ws.cell(p, 4, "Capacity")?;
        ws.put(p, 5, warehouse.capacity, &styles::reference())?;
        ws.cell(p, 7, "Rent Modules?")?;
        ws.put(p, 8, 0, &styles::input())?;

        ws.headers(
            block.header,
            1,
            &[
                "Fortnight",
                "Production",
                "Sales",
                "Outgoing",
                "Incoming",
                "Projected Inv",
                "Capacity",
                "Flag",
            ],
            &zone_header,
        )?;

        let config_row = WAREHOUSE_FIRST_ROW + zone.index() as u32;
        for fortnight in 1..=FORTNIGHTS {
            let r = block.first + u32::from(fortnight - 1);
            ws.cell(r, 1, format!("FN{}", fortnight))?;
            for col in 2..=5 {
                ws.put(r, col, 0, &styles::input())?;
            }
            let previous = if fortnight == 1 {
                format!("$B${}", p)
            } else {
                at(6, r - 1)
            };
            ws.cell(r, 6, format!("={}+B{r}+E{r}-D{r}-C{r}", previous, r = r))?;
            ws.put(
                r,
                7,
                format!("=$E${p}+($H${p}*{}!$D${})", ROUTE_CONFIG, config_row, p = p),
                &styles::reference(),
            )?;
            ws.cell(
                r,
                8,
                format!(
                    "=IF(F{r}<0,\"STOCKOUT: SHIP HERE!\",IF(F{r}>G{r},\"OVERFLOW: RENT!\",\"OK\"))",
                    r = r
                ),
            )?;
        }

        let (first, last) = (block.first, block.last);
        ws.highlight(first, 6, last, 6, &Highlight::fill(format!("=F{}<0", first), styles::RED_FILL))?;
        ws.highlight(
            first,
            6,
            last,
            6,
            &Highlight::fill(format!("=F{f}>G{f}", f = first), styles::PURPLE_FILL),
        )?;
        ws.highlight(
            first,
            6,
            last,
            6,
            &Highlight::fill(format!("=AND(F{f}>=0,F{f}<=G{f})", f = first), styles::GREEN_FILL),
        )?;

        let mut chart = Chart::new(ChartType::Column);
        if zone == Zone::Center {
            chart
                .add_series()
                .set_name("Ending Inv")
                .set_values(ws.range(first, 6, last, 6))
                .set_categories(ws.range(first, 1, last, 1));
            let mut capacity = Chart::new(ChartType::Line);
            capacity
                .add_series()
                .set_name("Capacity Limit")
                .set_values(ws.range(first, 7, last, 7))
                .set_format(ChartFormat::new().set_line(ChartLine::new().set_color(Color::RGB(0xFF0000))));
            chart.combine(&capacity);
            chart.title().set_name("Warehouse Tetris (Inv vs Capacity)");
            chart.x_axis().set_name("Fortnight");
        } else {
            ws.plain(block.header, 10, "Total Supply")?;
            ws.plain(block.header, 11, "Total Demand")?;
            for r in first..=last {
                ws.plain(r, 10, format!("=B{r}+E{r}", r = r))?;
                ws.plain(r, 11, format!("=C{r}+D{r}", r = r))?;
            }
            chart
                .add_series()
                .set_name("Total Supply")
                .set_values(ws.range(first, 10, last, 10))
                .set_categories(ws.range(first, 1, last, 1));
            chart
                .add_series()
                .set_name("Total Demand")
                .set_values(ws.range(first, 11, last, 11))
                .set_categories(ws.range(first, 1, last, 1));
            let title = format!("{} Supply vs Demand", zone.name());
            chart.title().set_name(title.as_str());
        }
        chart.y_axis().set_name("Units");
        ws.chart(block.banner, 10, &chart)?;
    }

    ws.width(1, 12.0)?;
    ws.widths(2, 8, 14.0)?;
    Ok(())
}

fn shipment_builder(wb: &mut Workbook) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), SHIPMENT_BUILDER)?;
    let lookup = format!("{}!$A${}:$C${}", ROUTE_CONFIG, MODE_FIRST_ROW, MODE_FIRST_ROW + 2);

    ws.title(1, "SHIPMENT BUILDER - Plan Your Transfers")?;
    ws.note(
        2,
        1,
        "Add shipments here. Update Outgoing/Incoming in INVENTORY_TETRIS (shifted by Lead Time).",
    )?;
    ws.section(4, 1, "SHIPMENT LOG")?;
    ws.headers(
        5,
        1,
        &[
            "Values",
            "From Zone",
            "To Zone",
            "Transport Mode",
            "Units",
            "Cost/Unit",
            "Total Cost",
            "Ship FN",
            "Lead Time",
            "Arrive FN",
        ],
        &styles::header(),
    )?;

    let last = SHIPMENT_FIRST_ROW + SHIPMENT_SLOTS - 1;
    for (i, r) in (SHIPMENT_FIRST_ROW..=last).enumerate() {
        ws.cell(r, 1, format!("Shipment {}", i + 1))?;
        for col in [2, 3, 4, 5, 8] {
            ws.put(r, col, CellInput::Blank, &styles::input())?;
        }
        let money = styles::calc().set_num_format(MONEY);
        ws.put(
            r,
            6,
            format!("=IF(ISBLANK(D{r}),0,VLOOKUP(D{r},{},3,FALSE))", lookup, r = r),
            &money,
        )?;
        ws.put(r, 7, format!("=IF(ISBLANK(D{r}),0,E{r}*F{r})", r = r), &money)?;
        ws.put(
            r,
            9,
            format!("=IF(ISBLANK(D{r}),0,VLOOKUP(D{r},{},2,FALSE))", lookup, r = r),
            &styles::calc(),
        )?;
        ws.put(r, 10, format!("=IF(ISBLANK(D{r}),0,H{r}+I{r})", r = r), &styles::output())?;
    }

    let zones: Vec<&str> = Zone::ALL.iter().map(Zone::name).collect();
    ws.list_validation(SHIPMENT_FIRST_ROW, 2, last, 3, &zones)?;
    ws.list_validation(SHIPMENT_FIRST_ROW, 4, last, 4, &TRANSPORT_MODES)?;

    ws.width(1, 12.0)?;
    ws.widths(2, 10, 12.0)?;
    Ok(())
}

fn upload_ready(wb: &mut Workbook) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), UPLOAD_READY_LOGISTICS)?;
    let linked = styles::calc();

    ws.title(1, "LOGISTICS DECISIONS - ExSim Upload Format")?;
    ws.note(2, 1, "Values linked from SHIPMENT_BUILDER")?;
    ws.section(4, 1, "Planned Shipments")?;

    let mut headers = vec!["From".to_string(), "To".to_string(), "Material".to_string(), "Amount".to_string()];
    headers.extend((1..=FORTNIGHTS).map(|n| format!("F{}", n)));
    let header_refs: Vec<&str> = headers.iter().map(String::as_str).collect();
    ws.headers(5, 1, &header_refs, &styles::header())?;

    for r in SHIPMENT_FIRST_ROW..SHIPMENT_FIRST_ROW + SHIPMENT_SLOTS {
        ws.put(r, 1, format!("={}!B{}", SHIPMENT_BUILDER, r), &linked)?;
        ws.put(r, 2, format!("={}!C{}", SHIPMENT_BUILDER, r), &linked)?;
        ws.cell(r, 3, MATERIAL)?;
        ws.put(r, 4, format!("={}!E{}", SHIPMENT_BUILDER, r), &linked)?;
        for fortnight in 1..=FORTNIGHTS {
            ws.put(
                r,
                4 + fortnight,
                format!(
                    "=IF({s}!$H${r}={n},{s}!$E${r},0)",
                    s = SHIPMENT_BUILDER,
                    r = r,
                    n = fortnight
                ),
                &linked,
            )?;
        }
    }

    ws.widths(1, 4 + FORTNIGHTS, 12.0)?;
    Ok(())
}

/// 3桁区切りの整数表記（例: `4,800`）
fn thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CellValue;

    fn text(s: &str) -> CellValue {
        CellValue::String(s.to_string())
    }

    fn inventory_row(value: f64) -> Vec<CellValue> {
        let mut row = vec![text("Final Inventory")];
        row.extend((1..=8).map(|i| CellValue::Number(if i == 8 { value } else { 0.0 })));
        row
    }

    #[test]
    fn test_parse_finished_goods_walks_zones() {
        let grid = ReportGrid::new(vec![
            vec![text("Capacity: 4,800 units")],
            inventory_row(500.0),
            vec![text("Capacity: 1200")],
            inventory_row(75.0),
        ]);
        let warehouses = parse_finished_goods(&grid);
        assert_eq!(warehouses.get(Zone::Center), Warehouse { capacity: 4800, inventory: 500.0 });
        assert_eq!(warehouses.get(Zone::West), Warehouse { capacity: 1200, inventory: 75.0 });
        assert_eq!(warehouses.get(Zone::South), Warehouse::default());
    }

    #[test]
    fn test_parse_shipping_costs() {
        let grid = ReportGrid::new(vec![vec![
            text("Total shipping cost"),
            CellValue::Number(0.0),
            CellValue::String("$12,500".to_string()),
        ]]);
        assert_eq!(parse_shipping_costs(&grid), 12_500.0);
        assert_eq!(parse_shipping_costs(&ReportGrid::new(Vec::new())), 0.0);
    }

    #[test]
    fn test_tetris_block_rows() {
        let center = TetrisBlock::of(Zone::Center);
        assert_eq!((center.banner, center.params, center.header), (4, 5, 7));
        assert_eq!((center.first, center.last), (8, 15));
        let west = TetrisBlock::of(Zone::West);
        assert_eq!(west.banner, 18);
        assert_eq!(west.first, 22);
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(4800), "4,800");
        assert_eq!(thousands(1_234_567), "1,234,567");
        assert_eq!(thousands(-950), "-950");
    }

    #[test]
    fn test_default_modes_and_shared_outputs() {
        let inputs = LogisticsInputs::default();
        assert!(inputs.modes.iter().all(|m| m.lead_time == 0));
        let out = inputs.shared_outputs();
        assert_eq!(out["shipping_schedule"]["Plane"]["lead_time"], json!(0));
        assert_eq!(out["inventory_by_zone"]["Center"], json!(0.0));
    }

    #[test]
    fn test_case_parameters_fill_modes() {
        let mut inputs = LogisticsInputs::default();
        inputs.apply_case(&CaseParameters::mezquite());

        let modes: Vec<(&str, u16, f64)> = inputs
            .modes
            .iter()
            .map(|m| (m.name, m.lead_time, m.unit_cost))
            .collect();
        assert_eq!(
            modes,
            vec![("Train", 3, 13.20), ("Truck", 2, 18.00), ("Plane", 1, 19.20)]
        );
        assert_eq!(inputs.module_cost, 800.0);
        assert_eq!(inputs.module_capacity, 100.0);

        let out = inputs.shared_outputs();
        assert_eq!(out["shipping_schedule"]["Truck"]["lead_time"], json!(2));
    }
}
