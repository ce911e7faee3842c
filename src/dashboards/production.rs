//! Production Dashboard
//!
//! ゾーンごとに独立した生産計算ブロック、機械・モジュールの配分、
//! アップロード用タブを生成します。ゾーン間で資源は共有されません。

use rust_xlsxwriter::{Format, FormatAlign, Workbook};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::case::CaseParameters;
use crate::dashboards::DashboardPlan;
use crate::error::DashboardError;
use crate::layout::formula::{self, abs, link};
use crate::layout::styles::{self, WHITE};
use crate::layout::SheetWriter;
use crate::parser::{first_integer, InputContext, ReportGrid};
use crate::types::{Zone, ZoneMap, FORTNIGHTS};

pub(crate) const ZONE_CALCULATORS: &str = "ZONE_CALCULATORS";
pub(crate) const RESOURCE_MGR: &str = "RESOURCE_MGR";
pub(crate) const UPLOAD_READY_PRODUCTION: &str = "UPLOAD_READY_PRODUCTION";

pub(crate) const TABS: &[&str] = &[ZONE_CALCULATORS, RESOURCE_MGR, UPLOAD_READY_PRODUCTION];

/// 機械1台あたりの公称生産量（FNあたり）
pub(crate) const NOMINAL_RATE: f64 = 200.0;
/// 機械が稼働するゾーンの既定生産目標（FNあたり）
const DEFAULT_TARGET: f64 = 500.0;
/// 単位あたり変動費
const VARIABLE_COST: f64 = 40.0;

pub(crate) const SECTIONS: [&str; 3] = ["Section 1", "Section 2", "Section 3"];
pub(crate) const MACHINE_TYPES: [&str; 5] = ["M1", "M2", "M3-alpha", "M3-beta", "M4"];

const BLOCK_FIRST_ROW: u32 = 4;
const ASSIGN_FIRST_ROW: u32 = 6;
const ASSIGN_LAST_ROW: u32 = ASSIGN_FIRST_ROW + 15 - 1;

/// ゾーン別の原材料在庫
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct Materials {
    pub part_a: f64,
    pub part_b: f64,
}

/// ゾーン別の完成品倉庫
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct FinishedGoods {
    pub capacity: i64,
    pub inventory: f64,
}

/// ゾーン別の機械とモジュール
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct Machinery {
    pub machines: i64,
    pub modules: i64,
    pub modules_used: i64,
}

/// 生産ダッシュボードの入力値
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ProductionInputs {
    pub materials: ZoneMap<Materials>,
    pub finished_goods: ZoneMap<FinishedGoods>,
    pub workers: ZoneMap<f64>,
    pub machinery: ZoneMap<Machinery>,
}

impl Default for ProductionInputs {
    fn default() -> Self {
        Self {
            materials: default_materials(),
            finished_goods: default_finished_goods(),
            workers: default_workers(),
            machinery: default_machinery(),
        }
    }
}

fn default_materials() -> ZoneMap<Materials> {
    let mut map = ZoneMap::<Materials>::default();
    map.set(Zone::Center, Materials { part_a: 4000.0, part_b: 1000.0 });
    map
}

fn default_finished_goods() -> ZoneMap<FinishedGoods> {
    let mut map = ZoneMap::<FinishedGoods>::default();
    map.set(Zone::Center, FinishedGoods { capacity: 4800, inventory: 500.0 });
    map
}

fn default_workers() -> ZoneMap<f64> {
    let mut map = ZoneMap::filled(0.0);
    map.set(Zone::Center, 219.0);
    map.set(Zone::West, 71.0);
    map
}

fn default_machinery() -> ZoneMap<Machinery> {
    let mut map = ZoneMap::<Machinery>::default();
    map.set(Zone::Center, Machinery { machines: 57, modules: 72, modules_used: 69 });
    map
}

/// ラベルにゾーン名と区切り語のいずれかを含む場合、そのゾーン
fn zone_header(label: &str, markers: &[&str]) -> Option<Zone> {
    if !markers.iter().any(|m| label.contains(m)) {
        return None;
    }
    Zone::ALL
        .into_iter()
        .find(|z| label.contains(&z.name().to_lowercase()))
}

/// `raw_materials.xlsx`からゾーン・部品別の期末在庫（列8）を取得
pub(crate) fn parse_raw_materials(grid: &ReportGrid) -> ZoneMap<Materials> {
    let mut materials = ZoneMap::<Materials>::default();
    let mut zone = None;
    let mut part_b = None;

    for row in grid.rows() {
        let label = row.label();
        if let Some(z) = zone_header(&label, &["section"]) {
            zone = Some(z);
        }
        if label.contains("part a") {
            part_b = Some(false);
        } else if label.contains("part b") {
            part_b = Some(true);
        }

        if label.contains("final") && label.contains("inventory") {
            if let (Some(z), Some(is_b)) = (zone, part_b) {
                let mut m = materials.get(z);
                if is_b {
                    m.part_b = row.number(8);
                } else {
                    m.part_a = row.number(8);
                }
                materials.set(z, m);
            }
        }
    }

    materials
}

/// `finished_goods_inventory.xlsx`からゾーン別の容量と期末在庫を取得
pub(crate) fn parse_finished_goods(grid: &ReportGrid) -> ZoneMap<FinishedGoods> {
    let mut goods = ZoneMap::<FinishedGoods>::default();
    let mut zone = None;

    for row in grid.rows() {
        let label = row.label();
        if let Some(z) = zone_header(&label, &["section", "warehouse"]) {
            zone = Some(z);
        }
        let Some(z) = zone else {
            continue;
        };

        let mut fg = goods.get(z);
        if label.contains("capacity") {
            if let Some(capacity) = first_integer(&label) {
                fg.capacity = capacity;
            }
        }
        if label.contains("final") && label.contains("inventory") {
            fg.inventory = row.number(8);
        }
        goods.set(z, fg);
    }

    goods
}

/// `workers_balance_overtime.xlsx`からゾーン別の人員を取得
pub(crate) fn parse_workers(grid: &ReportGrid) -> ZoneMap<f64> {
    let mut workers = ZoneMap::filled(0.0);
    for row in grid.rows().filter(|r| r.label().contains("workers assigned")) {
        for zone in Zone::ALL {
            workers.set(zone, row.number(zone.index() + 1));
        }
    }
    workers
}

/// `machine_spaces.xlsx`から機械台数とモジュール数を取得
///
/// 機種行（`M1`など、完全一致）ごとに列1..=10で最後の正の値を合算します。
/// ゾーン別の内訳はレポートにないため、すべてCenterに割り当てます。
pub(crate) fn parse_machine_spaces(grid: &ReportGrid) -> ZoneMap<Machinery> {
    let mut machines = 0;
    let mut modules = 72.0;
    let mut modules_used = 0.0;

    for row in grid.rows() {
        let name = row.text(0);
        if MACHINE_TYPES.contains(&name.as_str()) {
            if let Some(count) = (1..11).rev().map(|c| row.number(c)).find(|v| *v > 0.0) {
                machines += count as i64;
            }
        }

        let label = row.label();
        if label.contains("available") {
            modules = row.number(1);
        }
        if label.contains("occupied") {
            modules_used = row.number(1);
        }
    }

    let mut map = ZoneMap::<Machinery>::default();
    map.set(
        Zone::Center,
        Machinery {
            machines,
            modules: modules as i64,
            modules_used: modules_used as i64,
        },
    );
    map
}

/// ZONE_CALCULATORS内のゾーンブロックの行位置
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ZoneBlock {
    pub banner: u32,
    /// パラメータ4行の先頭（機械台数）
    pub params: u32,
    pub header: u32,
    pub first: u32,
    pub last: u32,
    pub total: u32,
}

impl ZoneBlock {
    pub fn of(zone: Zone) -> Self {
        // バナー・パラメータ4行・空行・ヘッダー・8FN・合計・空行2
        let banner = BLOCK_FIRST_ROW + zone.index() as u32 * (8 + u32::from(FORTNIGHTS) + 2);
        let header = banner + 6;
        let last = header + u32::from(FORTNIGHTS);
        Self {
            banner,
            params: banner + 1,
            header,
            first: header + 1,
            last,
            total: last + 1,
        }
    }

    fn machines_ref(&self) -> String {
        abs(2, self.params)
    }

    fn material_ref(&self) -> String {
        abs(2, self.params + 1)
    }

    fn rate_ref(&self) -> String {
        abs(2, self.params + 3)
    }
}

impl ProductionInputs {
    /// FNあたりの計画生産量（目標・設備能力・材料の最小値）
    pub fn planned_output(&self, zone: Zone) -> f64 {
        let machines = self.machinery.get(zone).machines as f64;
        if machines <= 0.0 {
            return 0.0;
        }
        let capacity = machines * NOMINAL_RATE;
        DEFAULT_TARGET.min(capacity).min(self.materials.get(zone).part_a)
    }

    /// 設備稼働率（計画生産量 / 設備能力）
    pub fn utilization(&self, zone: Zone) -> f64 {
        let capacity = self.machinery.get(zone).machines as f64 * NOMINAL_RATE;
        if capacity > 0.0 {
            self.planned_output(zone) / capacity
        } else {
            0.0
        }
    }
}

impl DashboardPlan for ProductionInputs {
    fn load(ctx: &mut InputContext<'_>, _case: Option<&CaseParameters>) -> Self {
        let mut inputs = ProductionInputs::default();

        if let Some(grid) = ctx.grid("raw_materials.xlsx", None) {
            inputs.materials = parse_raw_materials(&grid);
        }
        if let Some(grid) = ctx.grid("finished_goods_inventory.xlsx", None) {
            inputs.finished_goods = parse_finished_goods(&grid);
        }
        if let Some(grid) = ctx.grid("workers_balance_overtime.xlsx", None) {
            inputs.workers = parse_workers(&grid);
        }
        if let Some(grid) = ctx.grid("machine_spaces.xlsx", None) {
            inputs.machinery = parse_machine_spaces(&grid);
        }
        ctx.check("Production Decisions.xlsx");

        for zone in Zone::ALL {
            let m = inputs.machinery.get(zone);
            debug!(
                "{}: {} machines, {} modules, part A {:.0}, workers {:.0}",
                zone.name(),
                m.machines,
                m.modules,
                inputs.materials.get(zone).part_a,
                inputs.workers.get(zone)
            );
        }

        inputs
    }

    fn render(&self, workbook: &mut Workbook) -> Result<(), DashboardError> {
        zone_calculators(workbook, self)?;
        resource_manager(workbook, self)?;
        upload_ready(workbook)?;
        Ok(())
    }

    fn shared_outputs(&self) -> Map<String, Value> {
        let fortnights = f64::from(FORTNIGHTS);
        let mut plan = Map::new();
        let mut utilization = Map::new();
        let mut active = Vec::new();

        for zone in Zone::ALL {
            let planned = self.planned_output(zone);
            plan.insert(zone.name().into(), json!({ "Target": planned * fortnights }));
            if self.machinery.get(zone).machines > 0 {
                let u = self.utilization(zone);
                utilization.insert(zone.name().into(), json!(u));
                active.push(u);
            }
        }
        let mean = if active.is_empty() {
            0.0
        } else {
            active.iter().sum::<f64>() / active.len() as f64
        };
        utilization.insert("mean".into(), json!(mean));

        let unit_costs: Map<String, Value> = Zone::ALL
            .iter()
            .filter(|z| self.machinery.get(**z).machines > 0)
            .map(|z| (z.name().to_string(), json!(VARIABLE_COST)))
            .collect();

        let mut out = Map::new();
        out.insert("production_plan".into(), Value::Object(plan));
        out.insert("capacity_utilization".into(), Value::Object(utilization));
        out.insert("overtime_hours".into(), json!(0));
        out.insert("unit_costs".into(), Value::Object(unit_costs));
        out
    }
}

fn zone_banner(zone: Zone) -> Format {
    Format::new()
        .set_bold()
        .set_font_size(12)
        .set_font_color(WHITE)
        .set_background_color(zone.color())
        .set_align(FormatAlign::Center)
}

fn zone_cell(zone: Zone) -> Format {
    styles::filled(zone.color()).set_font_color(WHITE)
}

fn zone_calculators(wb: &mut Workbook, inputs: &ProductionInputs) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), ZONE_CALCULATORS)?;

    ws.title(1, "ZONE-SPECIFIC PRODUCTION CALCULATORS")?;
    ws.note(
        2,
        1,
        "Each zone has its own resources. Resources in Center do NOT count towards West capacity.",
    )?;

    for zone in Zone::ALL {
        let block = ZoneBlock::of(zone);
        let machines = inputs.machinery.get(zone).machines;

        ws.merge(
            block.banner,
            1,
            block.banner,
            8,
            &format!("═══ {} ZONE ═══", zone.name().to_uppercase()),
            &zone_banner(zone),
        )?;

        let params: [(&str, f64); 4] = [
            ("Machines in Zone", machines as f64),
            ("Material Stock (Part A)", inputs.materials.get(zone).part_a),
            ("Workers in Zone", inputs.workers.get(zone)),
            ("Nominal Rate/Machine", NOMINAL_RATE),
        ];
        for (i, (label, value)) in params.into_iter().enumerate() {
            let r = block.params + i as u32;
            ws.cell(r, 1, label)?;
            ws.put(r, 2, value, &styles::reference())?;
        }

        ws.headers(
            block.header,
            1,
            &[
                "Fortnight",
                "Target",
                "Overtime",
                "Local Capacity",
                "Material Cap",
                "REAL OUTPUT",
                "Shipment?",
            ],
            &styles::header_in(zone.color()),
        )?;

        let target = if machines > 0 { DEFAULT_TARGET } else { 0.0 };
        for fortnight in 1..=FORTNIGHTS {
            let r = block.first + u32::from(fortnight) - 1;
            ws.cell(r, 1, format!("FN{}", fortnight))?;
            ws.put(r, 2, target, &styles::input())?;
            ws.put(r, 3, "N", &styles::input().set_align(FormatAlign::Center))?;
            ws.put(
                r,
                4,
                format!("={}*{}", block.machines_ref(), block.rate_ref()),
                &styles::calc(),
            )?;
            ws.put(r, 5, format!("={}", block.material_ref()), &styles::calc())?;
            ws.put(r, 6, format!("=MIN(B{r},D{r},E{r})", r = r), &styles::output())?;
            ws.cell(r, 7, format!("=IF(B{r}>E{r},\"SHIPMENT NEEDED!\",\"OK\")", r = r))?;
        }

        ws.put(block.total, 1, "TOTAL", &Format::new().set_bold())?;
        ws.put(
            block.total,
            2,
            formula::sum_col(2, block.first, block.last),
            &styles::input(),
        )?;
        ws.put(
            block.total,
            6,
            formula::sum_col(6, block.first, block.last),
            &styles::output(),
        )?;
    }

    ws.width(1, 22.0)?;
    ws.widths(2, 7, 14.0)?;
    Ok(())
}

/// RESOURCE_MGRの各セクションの先頭データ行
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ResourceLayout {
    pub expansion_first: u32,
    pub modules_first: u32,
}

impl ResourceLayout {
    pub fn new() -> Self {
        // 各セクションの前に空行2・タイトル・空行1・ヘッダー
        let expansion_title = ASSIGN_LAST_ROW + 4;
        let expansion_first = expansion_title + 3;
        let modules_title = expansion_first + 5 + 3;
        Self {
            expansion_first,
            modules_first: modules_title + 3,
        }
    }
}

fn resource_manager(wb: &mut Workbook, inputs: &ProductionInputs) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), RESOURCE_MGR)?;
    let layout = ResourceLayout::new();

    ws.title(1, "RESOURCE MANAGER - Zone-by-Zone Asset Allocation")?;
    ws.section(3, 1, "SECTION A: MACHINE ASSIGNMENTS BY ZONE")?;
    ws.headers(
        5,
        1,
        &["Zone", "Section", "Machines Assigned", "Workers Needed", "Status"],
        &styles::header(),
    )?;

    let mut r = ASSIGN_FIRST_ROW;
    for zone in Zone::ALL {
        for (k, section) in SECTIONS.iter().enumerate() {
            let machines = match (zone, k) {
                (Zone::Center, 0) | (Zone::Center, 1) => 20.0,
                (Zone::Center, _) => 17.0,
                _ => 0.0,
            };
            ws.put(r, 1, zone.name(), &zone_cell(zone))?;
            ws.cell(r, 2, *section)?;
            ws.put(r, 3, machines, &styles::input())?;
            ws.put(r, 4, format!("=C{}*5", r), &styles::calc())?;
            ws.put(r, 5, "OK", &styles::filled(styles::OUTPUT_FILL))?;
            r += 1;
        }
    }

    let first = layout.expansion_first;
    ws.section(first - 3, 1, "SECTION B: EXPANSION RECOMMENDATIONS BY ZONE")?;
    ws.headers(
        first - 1,
        1,
        &["Zone", "Target Capacity", "Current Machines", "Capacity Gap", "Recommendation"],
        &styles::header(),
    )?;
    for zone in Zone::ALL {
        let r = first + zone.index() as u32;
        ws.put(r, 1, zone.name(), &zone_cell(zone))?;
        ws.put(r, 2, link(ZONE_CALCULATORS, 2, ZoneBlock::of(zone).total), &styles::reference())?;
        ws.cell(r, 3, inputs.machinery.get(zone).machines)?;
        ws.put(r, 4, format!("=B{r}-(C{r}*{rate})", r = r, rate = NOMINAL_RATE), &styles::calc())?;
        ws.put(
            r,
            5,
            format!(
                "=IF(D{r}>0,\"Buy \"&ROUNDUP(D{r}/{rate},0)&\" machines\",\"OK\")",
                r = r,
                rate = NOMINAL_RATE
            ),
            &styles::filled(styles::OUTPUT_FILL),
        )?;
    }

    let first = layout.modules_first;
    ws.section(first - 3, 1, "SECTION C: REAL ESTATE (MODULES) BY ZONE")?;
    ws.headers(
        first - 1,
        1,
        &["Zone", "Machines", "Module Slots", "Free Slots", "Recommendation"],
        &styles::header(),
    )?;
    for zone in Zone::ALL {
        let r = first + zone.index() as u32;
        let m = inputs.machinery.get(zone);
        ws.put(r, 1, zone.name(), &zone_cell(zone))?;
        ws.cell(r, 2, m.machines)?;
        ws.cell(r, 3, m.modules)?;
        ws.put(r, 4, format!("=C{r}-B{r}", r = r), &styles::calc())?;
        ws.put(
            r,
            5,
            format!("=IF(D{r}<5,\"Buy module in {zone}\",\"OK\")", r = r, zone = zone.name()),
            &styles::filled(styles::OUTPUT_FILL),
        )?;
    }

    for (col, width) in [(1, 12.0), (2, 16.0), (3, 18.0), (4, 14.0), (5, 28.0)] {
        ws.width(col, width)?;
    }
    Ok(())
}

fn upload_ready(wb: &mut Workbook) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), UPLOAD_READY_PRODUCTION)?;

    ws.title(1, "PRODUCTION DECISIONS - ExSim Upload (Zone-Mapped)")?;
    ws.note(2, 1, "Values linked from Zone Calculators")?;

    ws.section(4, 1, "Production Targets")?;
    ws.headers(5, 1, &["Zone", "Product", "Target", "Overtime"], &styles::header())?;
    let mut r = 6;
    for zone in Zone::ALL {
        let block = ZoneBlock::of(zone);
        ws.put(r, 1, zone.name(), &zone_cell(zone))?;
        ws.cell(r, 2, "A")?;
        ws.put(r, 3, link(ZONE_CALCULATORS, 6, block.total), &styles::calc())?;
        ws.put(r, 4, link(ZONE_CALCULATORS, 3, block.first), &styles::calc())?;
        r += 1;
    }

    r += 2;
    ws.section(r, 1, "Machine Purchases")?;
    ws.headers(r + 1, 1, &["Zone", "Machine Type", "Quantity"], &styles::header())?;
    r += 2;
    for zone in Zone::ALL {
        for machine in &MACHINE_TYPES[..2] {
            ws.put(r, 1, zone.name(), &zone_cell(zone))?;
            ws.cell(r, 2, *machine)?;
            ws.put(r, 3, 0.0, &styles::input())?;
            r += 1;
        }
    }

    r += 2;
    ws.section(r, 1, "Section Assignments")?;
    ws.headers(r + 1, 1, &["Zone", "Section", "Machines", "Workers"], &styles::header())?;
    r += 2;
    let mut assign = ASSIGN_FIRST_ROW;
    for zone in Zone::ALL {
        for section in SECTIONS {
            ws.put(r, 1, zone.name(), &zone_cell(zone))?;
            ws.cell(r, 2, section)?;
            ws.put(r, 3, link(RESOURCE_MGR, 3, assign), &styles::calc())?;
            ws.put(r, 4, link(RESOURCE_MGR, 4, assign), &styles::calc())?;
            assign += 1;
            r += 1;
        }
    }

    ws.widths(1, 4, 15.0)?;
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

    fn final_inventory(v: f64) -> Vec<CellValue> {
        let mut row = vec![text("Final Inventory")];
        row.extend((1..=8).map(|_| num(v)));
        row
    }

    #[test]
    fn test_zone_block_geometry() {
        let center = ZoneBlock::of(Zone::Center);
        assert_eq!(center.banner, 4);
        assert_eq!(center.params, 5);
        assert_eq!(center.header, 10);
        assert_eq!(center.first, 11);
        assert_eq!(center.last, 18);
        assert_eq!(center.total, 19);
        assert_eq!(ZoneBlock::of(Zone::West).banner, 22);
        assert_eq!(center.machines_ref(), "$B$5");
        assert_eq!(center.rate_ref(), "$B$8");
    }

    #[test]
    fn test_resource_layout() {
        let layout = ResourceLayout::new();
        assert_eq!(ASSIGN_LAST_ROW, 20);
        assert_eq!(layout.expansion_first, 27);
        assert_eq!(layout.modules_first, 38);
    }

    #[test]
    fn test_parse_raw_materials_by_zone_and_part() {
        let grid = ReportGrid::new(vec![
            vec![text("Center - Section 1")],
            vec![text("Part A")],
            final_inventory(3200.0),
            vec![text("Part B")],
            final_inventory(800.0),
            vec![text("West - Section 1")],
            vec![text("Part A")],
            final_inventory(150.0),
        ]);
        let materials = parse_raw_materials(&grid);
        assert_eq!(materials.get(Zone::Center), Materials { part_a: 3200.0, part_b: 800.0 });
        assert_eq!(materials.get(Zone::West).part_a, 150.0);
        assert_eq!(materials.get(Zone::South), Materials::default());
    }

    #[test]
    fn test_parse_finished_goods() {
        let grid = ReportGrid::new(vec![
            vec![text("Center Warehouse")],
            vec![text("Capacity: 4,800 units")],
            final_inventory(420.0),
        ]);
        let goods = parse_finished_goods(&grid);
        assert_eq!(goods.get(Zone::Center), FinishedGoods { capacity: 4800, inventory: 420.0 });
    }

    #[test]
    fn test_parse_machine_spaces_assigns_center() {
        let grid = ReportGrid::new(vec![
            vec![text("M1"), num(10.0), num(12.0), num(0.0)],
            vec![text("M2"), num(30.0)],
            vec![text("M1 total"), num(99.0)],
            vec![text("Modules available"), num(80.0)],
            vec![text("Modules occupied"), num(70.0)],
        ]);
        let machinery = parse_machine_spaces(&grid);
        assert_eq!(
            machinery.get(Zone::Center),
            Machinery { machines: 42, modules: 80, modules_used: 70 }
        );
        assert_eq!(machinery.get(Zone::West), Machinery::default());
    }

    #[test]
    fn test_defaults_when_missing() {
        let inputs = ProductionInputs::default();
        assert_eq!(inputs.machinery.get(Zone::Center).machines, 57);
        assert_eq!(inputs.workers.get(Zone::West), 71.0);
        assert_eq!(inputs.materials.get(Zone::Center).part_a, 4000.0);
        assert_eq!(inputs.finished_goods.get(Zone::Center).capacity, 4800);
    }

    #[test]
    fn test_planned_output_and_shared_outputs() {
        let inputs = ProductionInputs::default();
        assert_eq!(inputs.planned_output(Zone::Center), 500.0);
        assert_eq!(inputs.planned_output(Zone::West), 0.0);

        let out = inputs.shared_outputs();
        assert_eq!(out["production_plan"]["Center"]["Target"], json!(4000.0));
        assert_eq!(out["capacity_utilization"]["mean"], json!(500.0 / (57.0 * 200.0)));
        assert_eq!(out["unit_costs"]["Center"], json!(40.0));
    }
}
