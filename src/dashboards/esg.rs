//! ESG Dashboard
//!
//! CO2削減施策（太陽光・植林・グリーン電力・排出権）の投資対効果を
//! CO2税の支払いと比較するダッシュボードを生成します。

use rust_xlsxwriter::{Format, Workbook};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::case::CaseParameters;
use crate::compute;
use crate::dashboards::DashboardPlan;
use crate::error::DashboardError;
use crate::layout::styles::{self, ALERT_RED, BEST_GREEN, COUNT, ESG_BLUE, MONEY, MONEY_CENTS};
use crate::layout::{Highlight, SheetWriter};
use crate::parser::{InputContext, ReportGrid};

pub(crate) const IMPACT_CONFIG: &str = "IMPACT_CONFIG";
pub(crate) const STRATEGY_SELECTOR: &str = "STRATEGY_SELECTOR";
pub(crate) const UPLOAD_READY_ESG: &str = "UPLOAD_READY_ESG";

pub(crate) const TABS: &[&str] = &[IMPACT_CONFIG, STRATEGY_SELECTOR, UPLOAD_READY_ESG];

const DEFAULT_TAX_RATE: f64 = 30.0;
const DEFAULT_EMISSIONS: f64 = 150.0;
const DEFAULT_ENERGY: f64 = 500_000.0;
const DEFAULT_PRODUCTION: f64 = 50_000.0;

const CONFIG_FIRST_ROW: u32 = 8;
pub(crate) const SIM_FIRST_ROW: u32 = 13;
const SIM_LAST_ROW: u32 = SIM_FIRST_ROW + 3;
const VERDICT_ROW: u32 = 20;

/// 施策の単位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InitiativeUnit {
    /// 個数（パネル・本数・クレジット）
    Count,
    /// エネルギー消費量に対する割合
    ShareOfConsumption,
}

/// CO2削減施策の仕様
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Initiative {
    pub name: &'static str,
    pub unit_cost: f64,
    /// 1単位あたりの年間削減量（トン）
    pub co2_per_unit: f64,
    pub unit_label: &'static str,
    pub unit: InitiativeUnit,
    /// 設備投資（CapEx）かどうか。falseなら運用費（OpEx）
    pub capex: bool,
    pub color: u32,
    pub default_quantity: f64,
}

pub(crate) const INITIATIVES: [Initiative; 4] = [
    Initiative {
        name: "Solar PV Panels",
        unit_cost: 15_000.0,
        co2_per_unit: 0.5,
        unit_label: "panels",
        unit: InitiativeUnit::Count,
        capex: true,
        color: 0xFFC000,
        default_quantity: 10.0,
    },
    Initiative {
        name: "Trees Planted",
        unit_cost: 50.0,
        co2_per_unit: 0.02,
        unit_label: "trees",
        unit: InitiativeUnit::Count,
        capex: true,
        color: 0x70AD47,
        default_quantity: 10.0,
    },
    Initiative {
        name: "Green Electricity",
        unit_cost: 0.03,
        co2_per_unit: 0.0005,
        unit_label: "% of consumption",
        unit: InitiativeUnit::ShareOfConsumption,
        capex: false,
        color: 0x5B9BD5,
        default_quantity: 0.5,
    },
    Initiative {
        name: "CO2 Credits",
        unit_cost: 25.0,
        co2_per_unit: 1.0,
        unit_label: "credits",
        unit: InitiativeUnit::Count,
        capex: false,
        color: 0x7030A0,
        default_quantity: 10.0,
    },
];

/// 施策1件のシミュレーション結果（STRATEGY_SELECTORの1行と同じ計算）
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Simulation {
    pub cost: f64,
    pub reduced: f64,
    pub tax_savings: f64,
    pub net_benefit: f64,
    pub payback: Option<f64>,
    pub cost_per_ton: f64,
}

impl Initiative {
    /// 数量・エネルギー消費量・税率から効果を試算する
    pub fn simulate(&self, quantity: f64, energy: f64, tax_rate: f64) -> Simulation {
        let scale = match self.unit {
            InitiativeUnit::Count => quantity,
            InitiativeUnit::ShareOfConsumption => energy * quantity,
        };
        let cost = scale * self.unit_cost;
        let reduced = scale * self.co2_per_unit;
        let tax_savings = reduced * tax_rate;
        let (net_benefit, payback) = if self.capex {
            (tax_savings, compute::payback_years(cost, tax_savings))
        } else {
            (tax_savings - cost, None)
        };
        Simulation {
            cost,
            reduced,
            tax_savings,
            net_benefit,
            payback,
            cost_per_ton: compute::cost_per_ton(cost, reduced),
        }
    }
}

/// ESGダッシュボードの入力値
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EsgInputs {
    pub emissions: f64,
    pub tax_paid: f64,
    pub energy: f64,
    pub total_production: f64,
    pub tax_rate: f64,
}

impl Default for EsgInputs {
    fn default() -> Self {
        Self {
            emissions: DEFAULT_EMISSIONS,
            tax_paid: DEFAULT_EMISSIONS * DEFAULT_TAX_RATE,
            energy: DEFAULT_ENERGY,
            total_production: DEFAULT_PRODUCTION,
            tax_rate: DEFAULT_TAX_RATE,
        }
    }
}

/// `esg_report.xlsx`の排出量・CO2税・エネルギー消費量（列1）を反映
pub(crate) fn parse_esg_report(grid: &ReportGrid, inputs: &mut EsgInputs) {
    for row in grid.rows() {
        let label = row.label();
        if label.contains("emission") && label.contains("total") {
            inputs.emissions = row.number(1);
        }
        if label.contains("tax") && (label.contains("paid") || label.contains("bill")) {
            inputs.tax_paid = row.number(1);
        }
        if label.contains("energy") && label.contains("consumption") {
            inputs.energy = row.number(1);
        }
    }
}

/// `production.xlsx`の総生産量
pub(crate) fn parse_total_production(grid: &ReportGrid) -> Option<f64> {
    grid.rows()
        .filter(|row| row.label_has_all(&["production", "total"]))
        .map(|row| row.number(1))
        .last()
}

impl EsgInputs {
    /// 既定数量での施策ごとの試算
    pub fn default_plan(&self) -> Vec<Simulation> {
        INITIATIVES
            .iter()
            .map(|i| i.simulate(i.default_quantity, self.energy, self.tax_rate))
            .collect()
    }
}

impl DashboardPlan for EsgInputs {
    fn load(ctx: &mut InputContext<'_>, _case: Option<&CaseParameters>) -> Self {
        let mut inputs = EsgInputs::default();

        if let Some(grid) = ctx.grid("esg_report.xlsx", None) {
            parse_esg_report(&grid, &mut inputs);
        }
        if let Some(grid) = ctx.grid("production.xlsx", None) {
            if let Some(total) = parse_total_production(&grid) {
                inputs.total_production = total;
            }
        }
        debug!(
            "emissions {:.1} t, tax paid {:.0}, energy {:.0} kWh, production {:.0}",
            inputs.emissions, inputs.tax_paid, inputs.energy, inputs.total_production
        );

        inputs
    }

    fn render(&self, workbook: &mut Workbook) -> Result<(), DashboardError> {
        impact_config(workbook, self)?;
        strategy_selector(workbook, self)?;
        upload_ready(workbook)?;
        Ok(())
    }

    fn shared_outputs(&self) -> Map<String, Value> {
        let plan = self.default_plan();
        let investment: f64 = INITIATIVES
            .iter()
            .zip(plan.iter())
            .filter(|(i, _)| i.capex)
            .map(|(_, s)| s.cost)
            .sum();
        let per_unit = if self.total_production > 0.0 {
            self.emissions / self.total_production
        } else {
            0.0
        };

        let mut out = Map::new();
        out.insert(
            "co2_emissions".into(),
            json!({ "total": self.emissions, "per_unit": per_unit }),
        );
        out.insert("abatement_investment".into(), json!(investment));
        out.insert("tax_liability".into(), json!(self.tax_paid));
        out
    }
}

fn title() -> Format {
    styles::title_in(ESG_BLUE)
}

fn section() -> Format {
    styles::section_in(ESG_BLUE)
}

fn header() -> Format {
    styles::header_in(ESG_BLUE)
}

fn initiative_label(initiative: &Initiative) -> Format {
    styles::zone_label(initiative.color)
}

fn impact_config(wb: &mut Workbook, inputs: &EsgInputs) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), IMPACT_CONFIG)?;

    ws.put(1, 1, "IMPACT CONFIGURATION - Initiative Specifications", &title())?;
    ws.note(2, 1, "Define the unit costs and CO2 reduction rates from Case Guide.")?;

    ws.put(4, 1, "CO2 TAX RATE ($/Ton)", &section())?;
    ws.put(4, 2, inputs.tax_rate, &styles::input().set_num_format(MONEY))?;
    ws.put(
        4,
        3,
        "<-- Get from Case Guide!",
        &Format::new().set_bold().set_italic().set_font_color(ALERT_RED),
    )?;

    ws.put(6, 1, "INITIATIVE SPECIFICATIONS", &section())?;
    ws.headers(
        7,
        1,
        &["Initiative", "Unit Cost ($)", "CO2 Reduction (Tons/Unit)", "Unit Type"],
        &header(),
    )?;
    for (i, initiative) in INITIATIVES.iter().enumerate() {
        let r = CONFIG_FIRST_ROW + i as u32;
        ws.put(r, 1, initiative.name, &initiative_label(initiative))?;
        ws.put(r, 2, initiative.unit_cost, &styles::input().set_num_format(MONEY_CENTS))?;
        ws.put(r, 3, initiative.co2_per_unit, &styles::input().set_num_format("0.0000"))?;
        ws.put(r, 4, initiative.unit_label, &styles::reference())?;
    }

    ws.put(14, 1, "NOTES:", &Format::new().set_bold())?;
    let notes = [
        "- Solar: CAPEX investment, long-term savings",
        "- Trees: Low cost, slow reduction, good for PR",
        "- Green Electricity: Operating cost, immediate impact",
        "- CO2 Credits: Quick fix, no long-term benefit",
    ];
    for (i, note) in notes.iter().enumerate() {
        ws.plain(15 + i as u32, 1, *note)?;
    }

    for (col, width) in [(1, 20.0), (2, 15.0), (3, 25.0), (4, 18.0)] {
        ws.width(col, width)?;
    }
    Ok(())
}

fn strategy_selector(wb: &mut Workbook, inputs: &EsgInputs) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), STRATEGY_SELECTOR)?;
    let tax = format!("{}!$B$4", IMPACT_CONFIG);
    let money = |f: Format| f.set_num_format(MONEY);

    ws.put(1, 1, "STRATEGY SELECTOR - CO2 Abatement Calculator", &title())?;
    ws.note(2, 1, "Compare ROI of green initiatives vs. paying CO2 taxes.")?;

    ws.put(4, 1, "SECTION A: CURRENT BASELINE", &section())?;
    ws.plain(6, 1, "Current CO2 Emissions (Tons/Year)")?;
    ws.put(6, 2, inputs.emissions, &styles::reference())?;
    ws.plain(7, 1, "Current CO2 Tax Bill ($)")?;
    ws.put(7, 2, format!("=B6*{}", tax), &money(styles::calc()))?;
    ws.plain(8, 1, "Energy Consumption (kWh/Year)")?;
    ws.put(8, 2, inputs.energy, &styles::reference().set_num_format(COUNT))?;

    ws.put(10, 1, "SECTION B: INVESTMENT SIMULATOR", &section())?;
    ws.note(11, 1, "Enter quantities in yellow cells to see impact.")?;
    ws.headers(
        12,
        1,
        &[
            "Initiative",
            "Quantity",
            "Investment/Cost",
            "CO2 Reduced (Tons)",
            "Tax Savings ($)",
            "Net Annual Benefit",
            "Payback (Years)",
            "Cost per Ton",
        ],
        &header(),
    )?;

    for (i, initiative) in INITIATIVES.iter().enumerate() {
        let r = SIM_FIRST_ROW + i as u32;
        let config = CONFIG_FIRST_ROW + i as u32;
        let scale = match initiative.unit {
            InitiativeUnit::Count => format!("B{}", r),
            InitiativeUnit::ShareOfConsumption => format!("$B$8*B{}", r),
        };

        ws.put(r, 1, initiative.name, &initiative_label(initiative))?;
        let quantity_format = match initiative.unit {
            InitiativeUnit::Count => styles::input(),
            InitiativeUnit::ShareOfConsumption => styles::input().set_num_format("0%"),
        };
        ws.put(r, 2, initiative.default_quantity, &quantity_format)?;
        ws.put(
            r,
            3,
            format!("={}*{}!B{}", scale, IMPACT_CONFIG, config),
            &money(styles::calc()),
        )?;
        ws.put(
            r,
            4,
            format!("={}*{}!C{}", scale, IMPACT_CONFIG, config),
            &styles::calc().set_num_format("#,##0.0"),
        )?;
        ws.put(r, 5, format!("=D{}*{}", r, tax), &money(styles::calc()))?;
        if initiative.capex {
            ws.put(r, 6, format!("=E{}", r), &money(styles::calc()))?;
            ws.put(
                r,
                7,
                format!("=IF(E{r}>0,C{r}/E{r},\"N/A\")", r = r),
                &styles::calc().set_num_format("0.0"),
            )?;
        } else {
            ws.put(r, 6, format!("=E{r}-C{r}", r = r), &money(styles::calc()))?;
            ws.put(r, 7, "N/A (OpEx)", &styles::calc())?;
        }
        ws.put(
            r,
            8,
            format!("=IF(D{r}>0,C{r}/D{r},0)", r = r),
            &money(styles::filled(styles::OUTPUT_FILL)),
        )?;
    }
    ws.highlight(
        SIM_FIRST_ROW,
        8,
        SIM_LAST_ROW,
        8,
        &Highlight::fill(
            format!(
                "=H{f}=MIN($H${f}:$H${l})",
                f = SIM_FIRST_ROW,
                l = SIM_LAST_ROW
            ),
            BEST_GREEN,
        ),
    )?;

    ws.put(18, 1, "SECTION C: THE VERDICT", &section())?;
    let (f, l) = (SIM_FIRST_ROW, SIM_LAST_ROW);
    let capex: Vec<String> = INITIATIVES
        .iter()
        .enumerate()
        .filter(|(_, i)| i.capex)
        .map(|(k, _)| format!("C{}", f + k as u32))
        .collect();
    let opex: Vec<String> = INITIATIVES
        .iter()
        .enumerate()
        .filter(|(_, i)| !i.capex)
        .map(|(k, _)| format!("C{}", f + k as u32))
        .collect();
    let verdict: [(&str, String, Option<&str>); 6] = [
        ("Total CO2 Reduced", format!("=SUM(D{}:D{})", f, l), Some("#,##0.0")),
        ("Total Investment Required", format!("={}", capex.join("+")), Some(MONEY)),
        ("Total Annual Operating Cost", format!("={}", opex.join("+")), Some(MONEY)),
        ("Annual Tax Savings", format!("=SUM(E{}:E{})", f, l), Some(MONEY)),
        ("Remaining Emissions", format!("=MAX(0,B6-B{})", VERDICT_ROW), None),
        ("Remaining Tax Bill", format!("=B{}*{}", VERDICT_ROW + 4, tax), Some(MONEY)),
    ];
    for (k, (label, value, num_format)) in verdict.into_iter().enumerate() {
        let r = VERDICT_ROW + k as u32;
        let fmt = match num_format {
            Some(nf) => styles::output().set_num_format(nf),
            None => styles::output(),
        };
        ws.plain(r, 1, label)?;
        ws.put(r, 2, value, &fmt)?;
    }
    ws.plain(VERDICT_ROW, 3, "tons/year")?;

    ws.put(
        27,
        1,
        "CHEAPEST $/TON OPTION:",
        &Format::new().set_bold().set_font_color(0x006400),
    )?;
    ws.put(
        27,
        2,
        format!("=INDEX(A{f}:A{l},MATCH(MIN(H{f}:H{l}),H{f}:H{l},0))", f = f, l = l),
        &styles::zone_label(BEST_GREEN),
    )?;

    ws.put(29, 1, "DECISION MATRIX:", &section())?;
    let guidance = [
        ("If Solar Payback < 3 years: INVEST IN SOLAR", 0xFFC000),
        ("If Cash is Limited: BUY CREDITS (quick fix)", 0x7030A0),
        ("For PR/Long-term: PLANT TREES", 0x70AD47),
    ];
    for (k, (text, color)) in guidance.into_iter().enumerate() {
        ws.put(30 + k as u32, 1, text, &styles::alert_font(color))?;
    }

    for (col, width) in [
        (1, 25.0),
        (2, 12.0),
        (3, 18.0),
        (4, 18.0),
        (5, 15.0),
        (6, 18.0),
        (7, 15.0),
        (8, 15.0),
    ] {
        ws.width(col, width)?;
    }
    Ok(())
}

fn upload_ready(wb: &mut Workbook) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), UPLOAD_READY_ESG)?;

    ws.put(1, 1, "ESG DECISIONS - ExSim Upload Format", &title())?;
    ws.note(2, 1, "Copy these values to ExSim ESG upload.")?;

    ws.put(4, 1, "ESG Investments", &section())?;
    ws.headers(5, 1, &["Initiative", "Quantity/Value"], &header())?;
    for (i, initiative) in INITIATIVES.iter().enumerate() {
        let r = 6 + i as u32;
        let fmt = match initiative.unit {
            InitiativeUnit::Count => styles::calc(),
            InitiativeUnit::ShareOfConsumption => styles::calc().set_num_format("0%"),
        };
        ws.put(r, 1, initiative.name, &initiative_label(initiative))?;
        ws.put(r, 2, format!("={}!B{}", STRATEGY_SELECTOR, SIM_FIRST_ROW + i as u32), &fmt)?;
    }

    ws.put(12, 1, "Summary", &section())?;
    let summary = [
        ("Total CO2 Reduced (Tons)", VERDICT_ROW, None),
        ("Total Investment", VERDICT_ROW + 1, Some(MONEY)),
        ("Annual OpEx", VERDICT_ROW + 2, Some(MONEY)),
    ];
    for (k, (label, source, num_format)) in summary.into_iter().enumerate() {
        let r = 13 + k as u32;
        let fmt = match num_format {
            Some(nf) => styles::calc().set_num_format(nf),
            None => styles::calc(),
        };
        ws.plain(r, 1, label)?;
        ws.put(r, 2, format!("={}!B{}", STRATEGY_SELECTOR, source), &fmt)?;
    }

    ws.width(1, 25.0)?;
    ws.width(2, 15.0)?;
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

    #[test]
    fn test_parse_esg_report() {
        let grid = ReportGrid::new(vec![
            vec![text("Total CO2 Emissions"), num(212.5)],
            vec![text("CO2 Tax Paid"), text("$6,375")],
            vec![text("Energy Consumption (kWh)"), num(420_000.0)],
        ]);
        let mut inputs = EsgInputs::default();
        parse_esg_report(&grid, &mut inputs);
        assert_eq!(inputs.emissions, 212.5);
        assert_eq!(inputs.tax_paid, 6375.0);
        assert_eq!(inputs.energy, 420_000.0);
    }

    #[test]
    fn test_defaults() {
        let inputs = EsgInputs::default();
        assert_eq!(inputs.emissions, 150.0);
        assert_eq!(inputs.tax_paid, 4500.0);
        assert_eq!(inputs.energy, 500_000.0);
        assert_eq!(inputs.total_production, 50_000.0);
    }

    #[test]
    fn test_parse_total_production() {
        let grid = ReportGrid::new(vec![
            vec![text("Units"), num(1.0)],
            vec![text("Total Production"), num(48_000.0)],
        ]);
        assert_eq!(parse_total_production(&grid), Some(48_000.0));
        assert_eq!(parse_total_production(&ReportGrid::default()), None);
    }

    #[test]
    fn test_solar_payback() {
        let solar = INITIATIVES[0].simulate(10.0, DEFAULT_ENERGY, 30.0);
        assert_eq!(solar.cost, 150_000.0);
        assert_eq!(solar.reduced, 5.0);
        assert_eq!(solar.tax_savings, 150.0);
        assert_eq!(solar.payback, Some(1000.0));
        assert_eq!(solar.cost_per_ton, 30_000.0);
    }

    #[test]
    fn test_green_electricity_scales_with_consumption() {
        let green = INITIATIVES[2].simulate(0.5, 500_000.0, 30.0);
        assert!((green.cost - 7500.0).abs() < 1e-6);
        assert!((green.reduced - 125.0).abs() < 1e-6);
        assert_eq!(green.payback, None);
        assert!((green.net_benefit - (125.0 * 30.0 - 7500.0)).abs() < 1e-6);
    }

    #[test]
    fn test_credits_are_cheapest_per_ton() {
        let plan = EsgInputs::default().default_plan();
        let cheapest = plan
            .iter()
            .zip(INITIATIVES.iter())
            .min_by(|a, b| a.0.cost_per_ton.total_cmp(&b.0.cost_per_ton))
            .map(|(_, i)| i.name);
        assert_eq!(cheapest, Some("CO2 Credits"));
    }

    #[test]
    fn test_shared_outputs() {
        let out = EsgInputs::default().shared_outputs();
        assert_eq!(out["abatement_investment"], json!(150_500.0));
        assert_eq!(out["tax_liability"], json!(4500.0));
        assert_eq!(out["co2_emissions"]["per_unit"], json!(150.0 / 50_000.0));
    }
}
