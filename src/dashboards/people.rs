//! People Dashboard (CPO)
//!
//! ゾーン別の人員計画、給与・福利厚生の決定、人件費の集計と
//! アップロード用タブを生成します。

use rust_xlsxwriter::{
    Chart, ChartDataLabel, ChartFormat, ChartLine, ChartType, Color, ConditionalFormatIconType,
    Format, Workbook,
};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::case::CaseParameters;
use crate::compute;
use crate::dashboards::DashboardPlan;
use crate::error::DashboardError;
use crate::layout::formula::{self, at};
use crate::layout::styles::{self, ALERT_RED, MONEY, PERCENT, RED_FILL};
use crate::layout::{Highlight, SheetWriter};
use crate::parser::{first_integer, InputContext, ReportGrid};
use crate::types::{Zone, ZoneMap};

pub(crate) const WORKFORCE_PLANNING: &str = "WORKFORCE_PLANNING";
pub(crate) const COMPENSATION_STRATEGY: &str = "COMPENSATION_STRATEGY";
pub(crate) const LABOR_COST_ANALYSIS: &str = "LABOR_COST_ANALYSIS";
pub(crate) const UPLOAD_READY_PEOPLE: &str = "UPLOAD_READY_PEOPLE";

pub(crate) const TABS: &[&str] = &[
    WORKFORCE_PLANNING,
    COMPENSATION_STRATEGY,
    LABOR_COST_ANALYSIS,
    UPLOAD_READY_PEOPLE,
];

const ZONE_FIRST_ROW: u32 = 10;
const ZONE_TOTAL_ROW: u32 = ZONE_FIRST_ROW + 5;
pub(crate) const SALARY_FIRST_ROW: u32 = 11;
const SALARY_LAST_ROW: u32 = SALARY_FIRST_ROW + 4;
const BENEFIT_FIRST_ROW: u32 = 23;
const COST_TOTAL_ROW: u32 = 17;

/// 福利厚生の決定項目
#[derive(Debug, Clone, Copy)]
struct Benefit {
    name: &'static str,
    percent: bool,
    note: &'static str,
}

const BENEFITS: [Benefit; 7] = [
    Benefit { name: "Training Budget (% of Payroll)", percent: true, note: "Low = More defects" },
    Benefit { name: "Health Insurance (% of Payroll)", percent: true, note: "Reduces absenteeism" },
    Benefit { name: "Profit Sharing (% of Net Profit)", percent: true, note: "Paid on net profit" },
    Benefit { name: "Personal Days (per Worker)", percent: false, note: "Labor requirement" },
    Benefit { name: "Union Representatives", percent: false, note: "Labor requirement" },
    Benefit { name: "Reduction in Working Hours (%)", percent: true, note: "Reduces capacity" },
    Benefit { name: "Off-Days for Workers", percent: false, note: "Extra days off" },
];

/// CPOダッシュボードの入力値
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct PeopleInputs {
    pub workers: ZoneMap<f64>,
    pub absenteeism: ZoneMap<f64>,
    pub salespeople_count: i64,
    pub salespeople_salaries: f64,
    pub total_labor: f64,
    pub hiring_fee: f64,
    pub severance: f64,
    pub base_salary: f64,
    pub inflation: f64,
}

/// `workers_balance_overtime.xlsx`からゾーン別の人員と欠勤を取得
pub(crate) fn parse_workers_balance(grid: &ReportGrid) -> (ZoneMap<f64>, ZoneMap<f64>) {
    let mut workers = ZoneMap::filled(0.0);
    let mut absenteeism = ZoneMap::filled(0.0);

    for row in grid.rows() {
        let label = row.label();
        for zone in Zone::ALL {
            let col = zone.index() + 1;
            if label.contains("workers assigned") {
                workers.set(zone, row.number(col).trunc());
            }
            if label.contains("absenteeism") {
                absenteeism.set(zone, row.number(col));
            }
        }
    }

    (workers, absenteeism)
}

/// `sales_admin.xlsx`から営業人数と給与総額を取得
pub(crate) fn parse_salespeople(grid: &ReportGrid) -> (i64, f64) {
    let mut count = 0;
    let mut salaries = 0.0;

    for row in grid.rows() {
        if !row.label().contains("salespeople salaries") {
            continue;
        }
        if let Some(n) = first_integer(&row.text(1)) {
            count = n;
        }
        let expense = row.number(2);
        if expense > 0.0 {
            salaries = expense;
        }
    }

    (count, salaries)
}

/// `production.xlsx`の直接・間接労務費の合計
pub(crate) fn parse_labor_costs(grid: &ReportGrid) -> f64 {
    grid.rows()
        .filter(|row| row.label().contains("direct and indirect"))
        .map(|row| row.number(1))
        .sum()
}

impl PeopleInputs {
    fn total_workers(&self) -> f64 {
        self.workers.0.iter().sum()
    }

    /// 提案給与（インフレ率 + 1%、小数切り捨て）
    pub fn proposed_salary(&self) -> f64 {
        compute::proposed_salary(self.base_salary, self.inflation)
    }
}

impl DashboardPlan for PeopleInputs {
    fn load(ctx: &mut InputContext<'_>, case: Option<&CaseParameters>) -> Self {
        let mut inputs = PeopleInputs::default();

        if let Some(grid) = ctx.grid("workers_balance_overtime.xlsx", None) {
            let (workers, absenteeism) = parse_workers_balance(&grid);
            inputs.workers = workers;
            inputs.absenteeism = absenteeism;
            debug!("workers per zone {:?}", inputs.workers.0);
        }
        if let Some(grid) = ctx.grid("sales_admin.xlsx", None) {
            let (count, salaries) = parse_salespeople(&grid);
            inputs.salespeople_count = count;
            inputs.salespeople_salaries = salaries;
            debug!("{} salespeople, salaries {:.0}", count, salaries);
        }
        if let Some(grid) = ctx.grid("production.xlsx", None) {
            inputs.total_labor = parse_labor_costs(&grid);
            debug!("previous labor cost {:.0}", inputs.total_labor);
        }

        if let Some(case) = case {
            inputs.hiring_fee = case.workforce.hiring_cost;
            inputs.severance = case.workforce.layoff_cost;
            inputs.base_salary = case.workforce.salary_per_fortnight;
        }

        inputs
    }

    fn render(&self, workbook: &mut Workbook) -> Result<(), DashboardError> {
        workforce_planning(workbook, self)?;
        compensation_strategy(workbook, self)?;
        labor_cost_analysis(workbook, self)?;
        upload_ready(workbook)?;
        Ok(())
    }

    fn shared_outputs(&self) -> Map<String, Value> {
        let headcount: Map<String, Value> = Zone::ALL
            .iter()
            .map(|z| (z.name().to_string(), json!(self.workers.get(*z))))
            .collect();
        let payroll = self.total_workers() * self.proposed_salary() * 8.0 + self.salespeople_salaries;

        let mut out = Map::new();
        out.insert("workforce_headcount".into(), Value::Object(headcount));
        out.insert("payroll_forecast".into(), json!(payroll));
        out.insert(
            "hiring_costs".into(),
            json!({ "hiring_fee": self.hiring_fee, "severance": self.severance }),
        );
        out
    }
}

fn workforce_planning(wb: &mut Workbook, inputs: &PeopleInputs) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), WORKFORCE_PLANNING)?;
    let money = |f: Format| f.set_num_format(MONEY);

    ws.title(1, "WORKFORCE PLANNING - Headcount Management")?;
    ws.note(2, 1, "Yellow cells = User inputs. Green = Outputs for Finance.")?;

    ws.section(4, 1, "COST PARAMETERS")?;
    ws.cell(5, 1, "Est. Hiring Fee (per worker)")?;
    ws.put(5, 2, inputs.hiring_fee, &money(styles::input()))?;
    ws.cell(6, 1, "Est. Severance (per worker)")?;
    ws.put(6, 2, inputs.severance, &money(styles::input()))?;

    ws.section(8, 1, "HEADCOUNT ANALYSIS BY ZONE")?;
    ws.headers(
        9,
        1,
        &[
            "Zone",
            "Current Staff",
            "Required Workers",
            "Est. Turnover %",
            "Projected Loss",
            "Net Staff",
            "Hiring Needed",
            "Firing Needed",
            "Hiring Cost",
            "Firing Cost",
            "Net Change Cost",
        ],
        &styles::header(),
    )?;

    for zone in Zone::ALL {
        let r = ZONE_FIRST_ROW + zone.index() as u32;
        let workers = inputs.workers.get(zone);
        ws.put(r, 1, zone.name(), &styles::zone_label(zone.color()))?;
        ws.put(r, 2, workers, &styles::reference())?;
        ws.put(r, 3, workers, &styles::input())?;
        ws.put(r, 4, 0.0, &styles::input().set_num_format(PERCENT))?;
        ws.put(r, 5, format!("=B{r}*D{r}", r = r), &styles::calc())?;
        ws.put(r, 6, format!("=B{r}-E{r}", r = r), &styles::calc())?;
        ws.put(r, 7, format!("=MAX(0,C{r}-F{r})", r = r), &styles::calc())?;
        ws.put(r, 8, format!("=MAX(0,F{r}-C{r})", r = r), &styles::calc())?;
        ws.put(r, 9, format!("=G{r}*$B$5", r = r), &money(styles::calc()))?;
        ws.put(r, 10, format!("=H{r}*$B$6", r = r), &money(styles::calc()))?;
        ws.put(r, 11, format!("=I{r}+J{r}", r = r), &money(styles::output()))?;
    }
    ws.highlight(
        ZONE_FIRST_ROW,
        6,
        ZONE_TOTAL_ROW - 1,
        6,
        &Highlight::IconSet(ConditionalFormatIconType::ThreeArrows),
    )?;

    ws.put(ZONE_TOTAL_ROW, 1, "TOTAL", &styles::output())?;
    for col in 2..=11u16 {
        let fmt = if col >= 9 { money(styles::output()) } else { styles::output() };
        ws.put(ZONE_TOTAL_ROW, col, formula::sum_col(col, ZONE_FIRST_ROW, ZONE_TOTAL_ROW - 1), &fmt)?;
    }

    ws.width(1, 12.0)?;
    ws.widths(2, 11, 15.0)?;
    Ok(())
}

fn compensation_strategy(wb: &mut Workbook, inputs: &PeopleInputs) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), COMPENSATION_STRATEGY)?;
    let money = |f: Format| f.set_num_format(MONEY);
    let critical = Format::new().set_bold().set_italic().set_font_color(ALERT_RED);

    ws.title(1, "COMPENSATION STRATEGY - Salaries & Benefits")?;
    ws.put(2, 1, "CRITICAL: Set Inflation Rate from Case Guide to avoid STRIKES!", &critical)?;

    ws.section(4, 1, "SECTION A: GLOBAL PARAMETERS")?;
    ws.cell(6, 1, "Inflation Rate %")?;
    ws.put(6, 2, inputs.inflation, &styles::input().set_num_format(PERCENT))?;
    ws.put(6, 3, "<-- CRITICAL: Get from Case Guide!", &critical)?;
    ws.cell(7, 1, "Target Purchasing Power Increase %")?;
    ws.put(7, 2, 0.0, &styles::input().set_num_format(PERCENT))?;

    ws.section(9, 1, "SECTION B: SALARY DECISIONS (Per Zone)")?;
    ws.headers(
        10,
        1,
        &[
            "Zone",
            "Previous Salary",
            "Inflation Floor",
            "Proposed New Salary",
            "Strike Risk",
            "Real PPP Change",
        ],
        &styles::header(),
    )?;

    let proposed = inputs.proposed_salary();
    for zone in Zone::ALL {
        let r = SALARY_FIRST_ROW + zone.index() as u32;
        ws.put(r, 1, zone.name(), &styles::zone_label(zone.color()))?;
        ws.put(r, 2, inputs.base_salary, &money(styles::reference()))?;
        ws.put(r, 3, format!("=B{r}*(1+$B$6)", r = r), &money(styles::calc()))?;
        ws.put(r, 4, proposed, &money(styles::input()))?;
        ws.cell(r, 5, format!("=IF(D{r}<C{r},\"STRIKE RISK!\",\"OK\")", r = r))?;
        ws.put(
            r,
            6,
            format!("=IF(B{r}>0,(D{r}/B{r})-1-$B$6,0)", r = r),
            &styles::calc().set_num_format(PERCENT),
        )?;
    }

    let (first, last) = (SALARY_FIRST_ROW, SALARY_LAST_ROW);
    ws.highlight(
        first,
        4,
        last,
        4,
        &Highlight::formula(
            format!("=D{f}<C{f}", f = first),
            styles::highlight(RED_FILL).set_bold().set_font_color(ALERT_RED),
        ),
    )?;
    ws.highlight(
        first,
        5,
        last,
        5,
        &Highlight::fill(format!("=E{}=\"STRIKE RISK!\"", first), RED_FILL),
    )?;

    let mut chart = Chart::new(ChartType::Line);
    chart
        .add_series()
        .set_name("Proposed Salary")
        .set_values(ws.range(first, 4, last, 4))
        .set_categories(ws.range(first, 1, last, 1))
        .set_format(ChartFormat::new().set_line(ChartLine::new().set_color(Color::RGB(0x4472C4))));
    chart
        .add_series()
        .set_name("Inflation Floor")
        .set_values(ws.range(first, 3, last, 3))
        .set_categories(ws.range(first, 1, last, 1))
        .set_format(
            ChartFormat::new().set_line(ChartLine::new().set_color(Color::RGB(ALERT_RED)).set_width(2.25)),
        );
    chart.title().set_name("The Strike Zone: Salary vs Inflation");
    chart.y_axis().set_name("Salary ($)");
    ws.chart(10, 8, &chart)?;

    let alert = last + 2;
    ws.put(alert, 1, "MOTIVATION ALERT:", &styles::alert_font(ALERT_RED))?;
    ws.put(
        alert + 1,
        1,
        "Low Training Budget increases Defective Products!",
        &Format::new().set_italic().set_font_color(ALERT_RED),
    )?;
    ws.note(alert + 2, 1, "High Absenteeism may indicate low morale - consider benefits.")?;

    ws.section(BENEFIT_FIRST_ROW - 2, 1, "SECTION C: BENEFITS DECISIONS")?;
    ws.headers(
        BENEFIT_FIRST_ROW - 1,
        1,
        &["Benefit Type", "Decision Value", "Notes"],
        &styles::header(),
    )?;
    for (i, benefit) in BENEFITS.iter().enumerate() {
        let r = BENEFIT_FIRST_ROW + i as u32;
        ws.cell(r, 1, benefit.name)?;
        let fmt = if benefit.percent {
            styles::input().set_num_format(PERCENT)
        } else {
            styles::input()
        };
        ws.put(r, 2, 0.0, &fmt)?;
        ws.put(r, 3, benefit.note, &styles::cell().set_italic())?;
    }

    for (col, width) in [(1, 35.0), (2, 18.0), (3, 28.0), (4, 20.0), (5, 15.0), (6, 18.0)] {
        ws.width(col, width)?;
    }
    Ok(())
}

fn labor_cost_analysis(wb: &mut Workbook, inputs: &PeopleInputs) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), LABOR_COST_ANALYSIS)?;
    let money = |f: Format| f.set_num_format(MONEY);

    ws.title(1, "LABOR COST ANALYSIS - Total People Expense for Finance")?;
    ws.note(2, 1, "Output for CFO to include in cash flow projections.")?;

    ws.cell(4, 1, "INPUT: Estimated Net Profit (for Profit Sharing)")?;
    ws.put(4, 2, 0.0, &money(styles::input()))?;
    ws.cell(5, 1, "Previous Period Labor Cost")?;
    ws.put(5, 2, inputs.total_labor, &money(styles::reference()))?;

    ws.section(7, 1, "COST BREAKDOWN")?;
    ws.headers(8, 1, &["Cost Category", "Calculation", "Amount"], &styles::header())?;

    let comp = COMPENSATION_STRATEGY;
    let categories: [(&str, String); 6] = [
        ("Total Planned Headcount", format!("={}!{}", WORKFORCE_PLANNING, at(3, ZONE_TOTAL_ROW))),
        (
            "Base Salaries",
            format!(
                "=B9*AVERAGE({}!{}:{})*8",
                comp,
                at(4, SALARY_FIRST_ROW),
                at(4, SALARY_LAST_ROW)
            ),
        ),
        ("Overtime & Bonuses", "=0".to_string()),
        (
            "Training & Benefits",
            format!(
                "={c}!B{t}*C10+{c}!B{h}*C10",
                c = comp,
                t = BENEFIT_FIRST_ROW,
                h = BENEFIT_FIRST_ROW + 1
            ),
        ),
        ("Profit Sharing", format!("=$B$4*{}!B{}", comp, BENEFIT_FIRST_ROW + 2)),
        ("Hiring & Firing", format!("={}!{}", WORKFORCE_PLANNING, at(11, ZONE_TOTAL_ROW))),
    ];
    for (i, (label, calc)) in categories.into_iter().enumerate() {
        let r = 9 + i as u32;
        let fmt = if r == 9 { styles::calc() } else { money(styles::calc()) };
        ws.cell(r, 1, label)?;
        ws.put(r, 2, calc, &fmt)?;
        ws.put(r, 3, format!("=B{}", r), &fmt)?;
    }
    ws.cell(15, 1, "Salesforce Payroll")?;
    ws.put(15, 2, inputs.salespeople_salaries, &money(styles::reference()))?;
    ws.put(15, 3, "=B15", &money(styles::calc()))?;

    ws.put(COST_TOTAL_ROW, 1, "TOTAL PEOPLE EXPENSE", &styles::bold())?;
    ws.put(COST_TOTAL_ROW, 3, formula::sum_col(3, 10, 15), &money(styles::output()))?;
    ws.cell(COST_TOTAL_ROW + 2, 1, "Variance vs Previous Period")?;
    ws.put(COST_TOTAL_ROW + 2, 3, format!("=C{}-B5", COST_TOTAL_ROW), &money(styles::calc()))?;

    let mut chart = Chart::new(ChartType::Pie);
    chart
        .add_series()
        .set_values(ws.range(10, 3, 15, 3))
        .set_categories(ws.range(10, 1, 15, 1))
        .set_data_label(ChartDataLabel::new().show_percentage());
    chart.title().set_name("Labor Cost Distribution");
    ws.chart(7, 5, &chart)?;

    ws.width(1, 35.0)?;
    ws.width(2, 20.0)?;
    ws.width(3, 18.0)?;
    Ok(())
}

fn upload_ready(wb: &mut Workbook) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), UPLOAD_READY_PEOPLE)?;
    let linked = styles::calc();

    ws.title(1, "PEOPLE DECISIONS - ExSim Upload Format")?;
    ws.note(2, 1, "Copy these values to ExSim People upload.")?;

    ws.section(4, 1, "Salaries")?;
    ws.headers(5, 1, &["Zone", "Salary"], &styles::header())?;
    for zone in Zone::ALL {
        let r = 6 + zone.index() as u32;
        ws.put(r, 1, zone.name(), &styles::zone_label(zone.color()))?;
        ws.put(
            r,
            2,
            formula::link(COMPENSATION_STRATEGY, 4, SALARY_FIRST_ROW + zone.index() as u32),
            &linked.clone().set_num_format(MONEY),
        )?;
    }

    ws.section(4, 4, "Benefits & Policies")?;
    ws.headers(5, 4, &["Benefit", "Value"], &styles::header())?;
    for (i, benefit) in BENEFITS.iter().enumerate() {
        let r = 6 + i as u32;
        ws.cell(r, 4, benefit.name)?;
        ws.put(r, 5, formula::link(COMPENSATION_STRATEGY, 2, BENEFIT_FIRST_ROW + i as u32), &linked)?;
    }

    ws.widths(1, 2, 15.0)?;
    ws.width(4, 35.0)?;
    ws.width(5, 12.0)?;
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
    fn test_parse_workers_balance() {
        let grid = ReportGrid::new(vec![
            vec![text("Workers assigned"), num(219.6), num(71.0), num(0.0)],
            vec![text("Absenteeism"), num(0.05), num(0.02)],
        ]);
        let (workers, absenteeism) = parse_workers_balance(&grid);
        assert_eq!(workers.get(Zone::Center), 219.0);
        assert_eq!(workers.get(Zone::West), 71.0);
        assert_eq!(workers.get(Zone::South), 0.0);
        assert_eq!(absenteeism.get(Zone::Center), 0.05);
    }

    #[test]
    fn test_parse_salespeople() {
        let grid = ReportGrid::new(vec![vec![
            text("Salespeople salaries"),
            text("12 people"),
            text("$90,000"),
        ]]);
        assert_eq!(parse_salespeople(&grid), (12, 90_000.0));
    }

    #[test]
    fn test_parse_labor_costs_sums_rows() {
        let grid = ReportGrid::new(vec![
            vec![text("Direct and indirect labor - Section 1"), num(1000.0)],
            vec![text("Materials"), num(5000.0)],
            vec![text("Direct and indirect labor - Section 2"), num(250.0)],
        ]);
        assert_eq!(parse_labor_costs(&grid), 1250.0);
    }

    #[test]
    fn test_proposed_salary_clears_floor() {
        let inputs = PeopleInputs {
            base_salary: 750.0,
            inflation: 0.03,
            ..Default::default()
        };
        assert_eq!(inputs.proposed_salary(), 780.0);
        assert!(!compute::strike_risk(750.0, inputs.proposed_salary(), 0.03));
    }

    #[test]
    fn test_shared_outputs_payroll() {
        let mut inputs = PeopleInputs {
            base_salary: 100.0,
            salespeople_salaries: 500.0,
            ..Default::default()
        };
        inputs.workers.set(Zone::Center, 10.0);
        let out = inputs.shared_outputs();
        assert_eq!(out["payroll_forecast"], json!(10.0 * 101.0 * 8.0 + 500.0));
        assert_eq!(out["workforce_headcount"]["Center"], json!(10.0));
    }
}
