//! Finance Dashboard (CFO)
//!
//! 現金繰り・損益予測・財務健全性・借入管理の4タブと、
//! ExSimへのアップロード用タブを生成します。

use rust_xlsxwriter::{Chart, ChartFormat, ChartLine, ChartType, Color, Format, Workbook};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::case::CaseParameters;
use crate::compute::{self, CashStatus, DEBT_RATIO_LIMIT, EXCESS_CASH, MARGIN_JUMP_TOLERANCE};
use crate::dashboards::DashboardPlan;
use crate::error::DashboardError;
use crate::layout::formula::{self, at};
use crate::layout::styles::{self, ALERT_RED, BEST_GREEN, MONEY, PERCENT, YELLOW_FILL};
use crate::layout::{Highlight, SheetWriter};
use crate::parser::{InputContext, ReportGrid};
use crate::types::{fn_col, FORTNIGHTS};

pub(crate) const LIQUIDITY_MONITOR: &str = "LIQUIDITY_MONITOR";
pub(crate) const PROFIT_CONTROL: &str = "PROFIT_CONTROL";
pub(crate) const BALANCE_SHEET_HEALTH: &str = "BALANCE_SHEET_HEALTH";
pub(crate) const DEBT_MANAGER: &str = "DEBT_MANAGER";
pub(crate) const UPLOAD_READY_FINANCE: &str = "UPLOAD_READY_FINANCE";

pub(crate) const TABS: &[&str] = &[
    LIQUIDITY_MONITOR,
    PROFIT_CONTROL,
    BALANCE_SHEET_HEALTH,
    DEBT_MANAGER,
    UPLOAD_READY_FINANCE,
];

/// 売上入金の初期見込み（FNごと）
const SALES_RECEIPTS_ESTIMATE: f64 = 100_000.0;

// LIQUIDITY_MONITORの行
const STARTING_CASH_ROW: u32 = 9;
const HEADER_ROW: u32 = 14;
const OPENING_ROW: u32 = 15;
const CREDIT_ROW: u32 = 23;
const INVESTMENT_ROW: u32 = 24;
const DIVIDEND_ROW: u32 = 26;
const NET_FLOW_ROW: u32 = 29;
const ENDING_ROW: u32 = 30;

/// CFOダッシュボードの入力値
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct FinanceInputs {
    pub final_cash: f64,
    pub tax_payments: f64,
    pub statements: Statements,
    pub total_sa_expenses: f64,
    pub receivables: [f64; 8],
    pub payables: [f64; 8],
    pub credit_line_rate: Option<f64>,
    pub mortgage_rate: Option<f64>,
}

/// 前期の損益計算書・貸借対照表
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct Statements {
    pub net_sales: f64,
    pub cogs: f64,
    pub gross_income: f64,
    pub net_profit: f64,
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub equity: f64,
    pub retained_earnings: f64,
    pub depreciation: f64,
    pub gross_margin_pct: f64,
    pub net_margin_pct: f64,
}

/// `initial_cash_flow.xlsx`から前期末現金と納税額を取得
pub(crate) fn parse_initial_cash_flow(grid: &ReportGrid) -> (f64, f64) {
    let mut final_cash = 0.0;
    let mut tax_payments = 0.0;

    for row in grid.rows() {
        let label = row.label();
        if label.contains("final cash") {
            if let Some(v) = row.first_nonzero(1..10) {
                final_cash = v;
            }
        }
        if label.contains("tax") && label.contains("payment") {
            if let Some(v) = row.first_nonzero(1..10) {
                tax_payments = v.abs();
            }
        }
    }

    (final_cash, tax_payments)
}

/// `results_and_balance_statements.xlsx`をB列から読み取る
pub(crate) fn parse_statements(grid: &ReportGrid) -> Statements {
    let mut s = Statements::default();

    for row in grid.rows() {
        let label = row.label();
        let value = row.number(1);

        if (label.contains("net sales") || label.contains("revenue")) && value > 0.0 {
            s.net_sales = value;
        }
        if (label.contains("cost of goods sold") || label.contains("cogs")) && value != 0.0 {
            s.cogs = value.abs();
        }
        if label.contains("gross")
            && ["income", "profit", "margin"].iter().any(|w| label.contains(w))
            && value != 0.0
        {
            s.gross_income = value;
        }
        if (label.contains("net profit") || label.contains("net income"))
            && !label.contains("before")
            && value != 0.0
        {
            s.net_profit = value;
        }
        if label.contains("total assets") && value > 0.0 {
            s.total_assets = value;
        }
        if label.contains("total liabilities") && value != 0.0 {
            s.total_liabilities = value.abs();
        }
        if (label == "equity" || label.contains("total equity")) && value != 0.0 {
            s.equity = value;
        }
        if label.contains("retained earnings") {
            s.retained_earnings = value;
        }
        if label.contains("depreciation") && value != 0.0 {
            s.depreciation = value.abs();
        }
    }

    let (gross, net) = compute::margins(s.net_sales, s.gross_income, s.net_profit);
    s.gross_margin_pct = gross;
    s.net_margin_pct = net;
    s
}

/// `sales_admin_expenses.xlsx`から販管費合計を取得
pub(crate) fn parse_sa_expenses(grid: &ReportGrid) -> f64 {
    let mut total = 0.0;
    for row in grid.rows() {
        let label = row.label();
        let is_total = label.contains("total")
            && ["sales", "admin", "s&a"].iter().any(|w| label.contains(w));
        if is_total {
            if let Some(v) = row.first_positive(1..12) {
                total = v;
            }
        }
    }
    total
}

/// `accounts_receivable_payable.xlsx`からFNごとの入金・支払を取得
pub(crate) fn parse_receivables_payables(grid: &ReportGrid) -> ([f64; 8], [f64; 8]) {
    let mut receivables = [0.0; 8];
    let mut payables = [0.0; 8];

    for row in grid.rows() {
        if row.label_has_all(&["receipts", "customer"]) {
            for (i, slot) in receivables.iter_mut().enumerate() {
                *slot = row.number(i + 1);
            }
        }
        if row.label_has_all(&["payment", "supplier"]) {
            for (i, slot) in payables.iter_mut().enumerate() {
                *slot = row.number(i + 1).abs();
            }
        }
    }

    (receivables, payables)
}

impl FinanceInputs {
    /// FN1の期首現金
    pub fn starting_cash(&self) -> f64 {
        self.final_cash - self.tax_payments
    }

    /// FNごとの固定費（販管費の1/8、小数切り捨て）
    pub fn fixed_overhead(&self) -> f64 {
        (self.total_sa_expenses / f64::from(FORTNIGHTS)).trunc()
    }

    /// 既定の入力値で計算した各FNの期末現金
    pub fn projected_balances(&self) -> Vec<f64> {
        let overhead = self.fixed_overhead();
        let net: Vec<f64> = (0..usize::from(FORTNIGHTS))
            .map(|i| SALES_RECEIPTS_ESTIMATE + self.receivables[i] - overhead - self.payables[i])
            .collect();
        compute::running_balance(self.starting_cash(), &net)
    }
}

impl DashboardPlan for FinanceInputs {
    fn load(ctx: &mut InputContext<'_>, case: Option<&CaseParameters>) -> Self {
        let mut inputs = FinanceInputs::default();

        if let Some(grid) = ctx.grid("initial_cash_flow.xlsx", None) {
            let (final_cash, tax) = parse_initial_cash_flow(&grid);
            inputs.final_cash = final_cash;
            inputs.tax_payments = tax;
            debug!("final cash {:.0}, tax payments {:.0}", final_cash, tax);
        }
        if let Some(grid) = ctx.grid("results_and_balance_statements.xlsx", None) {
            inputs.statements = parse_statements(&grid);
            debug!(
                "net sales {:.0}, total assets {:.0}",
                inputs.statements.net_sales, inputs.statements.total_assets
            );
        }
        if let Some(grid) = ctx.grid("sales_admin_expenses.xlsx", None) {
            inputs.total_sa_expenses = parse_sa_expenses(&grid);
            debug!("total S&A {:.0}", inputs.total_sa_expenses);
        }
        if let Some(grid) = ctx.grid("accounts_receivable_payable.xlsx", None) {
            let (receivables, payables) = parse_receivables_payables(&grid);
            inputs.receivables = receivables;
            inputs.payables = payables;
        }
        ctx.check("Finance Decisions.xlsx");

        if let Some(case) = case {
            inputs.credit_line_rate = Some(case.finance.credit_line_rate);
            inputs.mortgage_rate = Some(case.finance.mortgage_rate);
        }

        inputs
    }

    fn render(&self, workbook: &mut Workbook) -> Result<(), DashboardError> {
        liquidity_monitor(workbook, self)?;
        profit_control(workbook, self)?;
        balance_sheet_health(workbook, self)?;
        debt_manager(workbook, self)?;
        upload_ready(workbook)?;
        Ok(())
    }

    fn shared_outputs(&self) -> Map<String, Value> {
        let balances = self.projected_balances();
        let status = if balances.iter().any(|b| *b < 0.0) {
            CashStatus::Insolvent
        } else {
            CashStatus::classify(balances.last().copied().unwrap_or(0.0))
        };
        let s = &self.statements;

        let mut out = Map::new();
        out.insert("cash_flow_projection".into(), json!(balances));
        out.insert(
            "debt_levels".into(),
            json!({
                "total_assets": s.total_assets,
                "total_liabilities": s.total_liabilities,
                "debt_ratio": compute::debt_ratio(s.total_liabilities, s.total_assets),
            }),
        );
        out.insert("liquidity_status".into(), json!(status.label()));
        out
    }
}

fn fortnight_header(ws: &mut SheetWriter<'_>, row: u32, first: &str) -> Result<(), DashboardError> {
    let header = styles::header();
    ws.put(row, 1, first, &header)?;
    for fortnight in 1..=FORTNIGHTS {
        ws.put(row, fn_col(fortnight), format!("FN{}", fortnight), &header)?;
    }
    Ok(())
}

fn liquidity_monitor(wb: &mut Workbook, inputs: &FinanceInputs) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), LIQUIDITY_MONITOR)?;
    let money = |f: Format| f.set_num_format(MONEY);

    ws.title(1, "LIQUIDITY MONITOR - Cash Flow Engine")?;

    ws.section(3, 1, "SECTION A: INITIALIZATION (Initial Cash Flow Bridge)")?;
    let bridge: [(&str, f64, Format); 4] = [
        ("Cash at End of Last Period", inputs.final_cash, styles::reference()),
        ("Less: Tax Payments", inputs.tax_payments, styles::input()),
        ("Less: Dividend Payments", 0.0, styles::input()),
        ("Less: Asset Purchases", 0.0, styles::input()),
    ];
    for (i, (label, value, fmt)) in bridge.into_iter().enumerate() {
        let row = 5 + i as u32;
        ws.cell(row, 1, label)?;
        ws.put(row, 2, value, &money(fmt))?;
    }
    ws.put(STARTING_CASH_ROW, 1, "STARTING CASH FOR FN1", &styles::bold())?;
    ws.put(STARTING_CASH_ROW, 2, "=B5-B6-B7-B8", &money(styles::output()))?;

    ws.section(12, 1, "SECTION B: OPERATIONAL CASH FLOW")?;
    fortnight_header(&mut ws, HEADER_ROW, "Item")?;

    let seed = formula::abs(2, STARTING_CASH_ROW);
    let overhead = inputs.fixed_overhead();
    ws.cell(OPENING_ROW, 1, "Opening Cash")?;
    ws.cell(16, 1, "Sales Receipts (Est.)")?;
    ws.cell(17, 1, "Procurement Spend (Est.)")?;
    ws.cell(18, 1, "Fixed Overhead (S&A)")?;
    ws.cell(19, 1, "Receivables (Hard)")?;
    ws.cell(20, 1, "Payables (Hard)")?;
    for fortnight in 1..=FORTNIGHTS {
        let col = fn_col(fortnight);
        let i = usize::from(fortnight - 1);
        ws.put(
            OPENING_ROW,
            col,
            formula::carry_forward(fortnight, &seed, ENDING_ROW),
            &money(styles::reference()),
        )?;
        ws.put(16, col, SALES_RECEIPTS_ESTIMATE, &money(styles::input()))?;
        ws.put(17, col, 0.0, &money(styles::input()))?;
        ws.put(18, col, overhead, &money(styles::input()))?;
        ws.put(19, col, inputs.receivables[i], &money(styles::reference()))?;
        ws.put(20, col, inputs.payables[i], &money(styles::reference()))?;
    }

    ws.section(22, 1, "SECTION C: FINANCING DECISIONS")?;
    let financing = [
        (CREDIT_ROW, "Change in Credit Line (+/-)"),
        (INVESTMENT_ROW, "Change in Investments (+/-)"),
        (25, "New Mortgage Inflow"),
        (DIVIDEND_ROW, "Dividends Paid"),
    ];
    for (row, label) in financing {
        ws.cell(row, 1, label)?;
        for fortnight in 1..=FORTNIGHTS {
            ws.put(row, fn_col(fortnight), 0.0, &money(styles::input()))?;
        }
    }

    ws.section(28, 1, "SECTION D: CASH BALANCE")?;
    ws.cell(NET_FLOW_ROW, 1, "Net Cash Flow")?;
    ws.put(ENDING_ROW, 1, "ENDING CASH BALANCE", &styles::bold())?;
    ws.cell(31, 1, "Solvency Check")?;
    for fortnight in 1..=FORTNIGHTS {
        let col = fn_col(fortnight);
        let x = |row: u32| at(col, row);
        ws.put(
            NET_FLOW_ROW,
            col,
            format!(
                "={}+{}+{}+{}-{}-{}-{}-{}-{}",
                x(16),
                x(19),
                x(23),
                x(25),
                x(17),
                x(18),
                x(20),
                x(24),
                x(26)
            ),
            &money(styles::calc()),
        )?;
        ws.put(
            ENDING_ROW,
            col,
            format!("={}+{}", x(OPENING_ROW), x(NET_FLOW_ROW)),
            &money(styles::output()),
        )?;
        ws.cell(
            31,
            col,
            format!(
                "=IF({e}<0,\"INSOLVENT!\",IF({e}>{excess},\"Excess Cash\",\"OK\"))",
                e = x(ENDING_ROW),
                excess = EXCESS_CASH
            ),
        )?;
    }

    let last = fn_col(FORTNIGHTS);
    ws.highlight(ENDING_ROW, 2, ENDING_ROW, last, &Highlight::fill("=B30<0", styles::RED_FILL))?;
    ws.highlight(
        ENDING_ROW,
        2,
        ENDING_ROW,
        last,
        &Highlight::fill(format!("=B30>{}", EXCESS_CASH), styles::GREEN_FILL),
    )?;

    let mut chart = Chart::new(ChartType::Line);
    chart
        .add_series()
        .set_name("Ending Cash")
        .set_values(ws.range(ENDING_ROW, 2, ENDING_ROW, last))
        .set_categories(ws.range(HEADER_ROW, 2, HEADER_ROW, last));
    chart.title().set_name("Liquidity Forecast (Cash Balance)");
    ws.chart(2, 11, &chart)?;

    ws.width(1, 28.0)?;
    ws.widths(2, last, 14.0)?;
    Ok(())
}

fn profit_control(wb: &mut Workbook, inputs: &FinanceInputs) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), PROFIT_CONTROL)?;
    let s = &inputs.statements;
    let money = |f: Format| f.set_num_format(MONEY);
    let percent = |f: Format| f.set_num_format(PERCENT);

    ws.title(1, "PROFIT CONTROL - Income Statement Forecast vs Actuals")?;
    ws.section(3, 1, "HISTORICAL MARGINS (From results_and_balance_statements)")?;
    ws.cell(5, 1, "Historical Gross Margin %")?;
    ws.put(5, 2, s.gross_margin_pct, &percent(styles::reference()))?;
    ws.cell(6, 1, "Historical Net Margin %")?;
    ws.put(6, 2, s.net_margin_pct, &percent(styles::reference()))?;

    ws.section(9, 1, "INCOME STATEMENT COMPARISON")?;
    ws.headers(
        10,
        1,
        &["Line Item", "Last Round Actuals", "This Round Projected", "Variance %"],
        &styles::header(),
    )?;

    let lines: [(u32, &str, f64, String); 7] = [
        (11, "Net Sales / Revenue", s.net_sales, String::new()),
        (12, "Cost of Goods Sold", s.cogs, "=C11*(1-$B$5)".to_string()),
        (13, "Gross Margin", s.gross_income, "=C11-C12".to_string()),
        (14, "S&A Expenses", inputs.total_sa_expenses, String::new()),
        (15, "Depreciation", s.depreciation, String::new()),
        (16, "Interest Expense", 0.0, String::new()),
        (17, "EST. NET INCOME", s.net_profit, "=C13-C14-C15-C16".to_string()),
    ];
    for (row, label, actual, projected) in lines {
        let is_total = row == 17;
        ws.put(row, 1, label, &if is_total { styles::bold() } else { styles::cell() })?;
        ws.put(row, 2, actual, &money(styles::reference()))?;
        if projected.is_empty() {
            ws.put(row, 3, actual, &money(styles::input()))?;
        } else if is_total {
            ws.put(row, 3, projected, &money(styles::output()))?;
        } else {
            ws.put(row, 3, projected, &money(styles::calc()))?;
        }
        if row != 16 {
            ws.put(
                row,
                4,
                format!("=IF(B{r}>0,(C{r}-B{r})/B{r},0)", r = row),
                &percent(styles::calc()),
            )?;
        }
    }

    ws.section(19, 1, "ACCURACY CHECK")?;
    ws.cell(20, 1, "Projected Net Margin")?;
    ws.put(20, 2, "=IF(C11>0,C17/C11,0)", &percent(styles::calc()))?;
    ws.cell(21, 1, "Profit Realism Flag")?;
    ws.put(
        21,
        2,
        format!(
            "=IF(B20>$B$6+{},\"WARNING: Unrealistic profit jump!\",\"Projection OK\")",
            MARGIN_JUMP_TOLERANCE
        ),
        &styles::output(),
    )?;

    ws.highlight(17, 3, 17, 3, &Highlight::formula("=C17<0", styles::alert_font(ALERT_RED)))?;
    ws.highlight(17, 3, 17, 3, &Highlight::formula("=C17>0", styles::alert_font(BEST_GREEN)))?;
    ws.highlight(12, 4, 17, 4, &Highlight::fill("=ABS(D12)>0.1", YELLOW_FILL))?;

    ws.width(1, 28.0)?;
    ws.width(2, 20.0)?;
    ws.width(3, 22.0)?;
    ws.width(4, 14.0)?;
    Ok(())
}

fn balance_sheet_health(wb: &mut Workbook, inputs: &FinanceInputs) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), BALANCE_SHEET_HEALTH)?;
    let s = &inputs.statements;
    let money = |f: Format| f.set_num_format(MONEY);
    let percent = |f: Format| f.set_num_format(PERCENT);

    ws.title(1, "BALANCE SHEET HEALTH - Solvency & Debt Control")?;
    ws.section(3, 1, "CURRENT POSITION (From results_and_balance_statements)")?;
    let position = [
        ("Total Assets", s.total_assets),
        ("Total Liabilities", s.total_liabilities),
        ("Total Equity", s.equity),
        ("Retained Earnings", s.retained_earnings),
    ];
    for (i, (label, value)) in position.into_iter().enumerate() {
        let row = 5 + i as u32;
        ws.cell(row, 1, label)?;
        ws.put(row, 2, value, &money(styles::reference()))?;
    }

    ws.section(11, 1, "DEBT ANALYSIS")?;
    ws.cell(13, 1, "Current Debt Ratio")?;
    ws.put(13, 2, "=IF(B5>0,B6/B5,0)", &percent(styles::calc()))?;
    ws.cell(15, 1, "Projected New Credit Lines")?;
    ws.put(15, 2, 0.0, &money(styles::input()))?;
    ws.cell(16, 1, "Projected New Mortgages")?;
    ws.put(16, 2, 0.0, &money(styles::input()))?;
    ws.cell(17, 1, "Total New Debt")?;
    ws.put(17, 2, "=B15+B16", &money(styles::calc()))?;
    ws.put(19, 1, "Est. Post-Decision Debt Ratio", &styles::bold())?;
    ws.put(19, 2, "=IF(B5>0,(B6+B17)/B5,0)", &percent(styles::output()))?;

    ws.section(21, 1, "WARNING FLAGS")?;
    ws.cell(22, 1, "Debt Level Check")?;
    ws.put(
        22,
        2,
        format!(
            "=IF(B19>{},\"CRITICAL: Debt too high. Credit Rating Risk.\",\"Health OK\")",
            DEBT_RATIO_LIMIT
        ),
        &styles::output(),
    )?;
    ws.cell(23, 1, "Equity Check")?;
    ws.put(
        23,
        2,
        "=IF(B8<0,\"CRITICAL: Equity Erosion. Retained earnings negative.\",\"Equity OK\")",
        &styles::output(),
    )?;

    // ゲージ用の補助表
    ws.headers(12, 8, &["Metric", "Ratio", "Limit"], &styles::header())?;
    ws.cell(13, 8, "Current")?;
    ws.put(13, 9, "=B13", &percent(styles::cell()))?;
    ws.put(13, 10, DEBT_RATIO_LIMIT, &percent(styles::cell()))?;
    ws.cell(14, 8, "Post-Decision")?;
    ws.put(14, 9, "=B19", &percent(styles::cell()))?;
    ws.put(14, 10, DEBT_RATIO_LIMIT, &percent(styles::cell()))?;

    let mut chart = Chart::new(ChartType::Column);
    chart
        .add_series()
        .set_name("Debt Ratio")
        .set_values(ws.range(13, 9, 14, 9))
        .set_categories(ws.range(13, 8, 14, 8));
    chart.title().set_name("Solvency Gauge (Debt Ratio)");

    let mut limit = Chart::new(ChartType::Line);
    limit
        .add_series()
        .set_name("Limit")
        .set_values(ws.range(13, 10, 14, 10))
        .set_format(ChartFormat::new().set_line(ChartLine::new().set_color(Color::RGB(0xFF0000))));
    chart.combine(&limit);
    ws.chart(12, 4, &chart)?;

    ws.width(1, 30.0)?;
    ws.width(2, 50.0)?;
    Ok(())
}

fn debt_manager(wb: &mut Workbook, inputs: &FinanceInputs) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), DEBT_MANAGER)?;
    let money = |f: Format| f.set_num_format(MONEY);

    ws.title(1, "DEBT MANAGER - Mortgage Calculator")?;
    ws.section(3, 1, "MORTGAGE BLOCK")?;
    ws.headers(
        5,
        1,
        &[
            "Loan #",
            "Amount",
            "Interest Rate",
            "Payment Period 1",
            "Payment Period 2",
            "Total Payments",
        ],
        &styles::header(),
    )?;

    let rate = inputs.mortgage_rate.unwrap_or(0.0);
    for loan in 1..=3u32 {
        let row = 5 + loan;
        ws.cell(row, 1, format!("Loan {}", loan))?;
        ws.put(row, 2, 0.0, &money(styles::input()))?;
        ws.put(row, 3, rate, &styles::input().set_num_format(PERCENT))?;
        ws.put(row, 4, 0.0, &money(styles::input()))?;
        ws.put(row, 5, 0.0, &money(styles::input()))?;
        ws.put(row, 6, format!("=D{r}+E{r}", r = row), &money(styles::calc()))?;
    }

    ws.put(10, 1, "TOTAL", &styles::bold())?;
    ws.put(10, 2, formula::sum_col(2, 6, 8), &money(styles::output()))?;
    ws.put(10, 6, formula::sum_col(6, 6, 8), &money(styles::output()))?;

    if let Some(credit) = inputs.credit_line_rate {
        ws.note(12, 1, &format!("Credit line interest: {:.0}% per period", credit * 100.0))?;
    }

    ws.widths(1, 6, 18.0)?;
    Ok(())
}

fn upload_ready(wb: &mut Workbook) -> Result<(), DashboardError> {
    let mut ws = SheetWriter::new(wb.add_worksheet(), UPLOAD_READY_FINANCE)?;
    let money = styles::calc().set_num_format(MONEY);

    ws.title(1, "FINANCE DECISIONS - ExSim Upload Format")?;
    ws.note(2, 1, "Copy these values to ExSim Finance upload")?;

    let linked = [(4, "Credit Lines", CREDIT_ROW), (9, "Investments", INVESTMENT_ROW)];
    for (start, label, source_row) in linked {
        ws.section(start, 1, label)?;
        fortnight_header(&mut ws, start + 1, "Item")?;
        ws.cell(start + 2, 1, "Amount")?;
        for fortnight in 1..=FORTNIGHTS {
            let col = fn_col(fortnight);
            ws.put(start + 2, col, formula::link(LIQUIDITY_MONITOR, col, source_row), &money)?;
        }
    }

    ws.section(14, 1, "Mortgages")?;
    ws.headers(15, 1, &["Loan", "Amount", "Payment 1", "Payment 2"], &styles::header())?;
    for loan in 1..=3u32 {
        let row = 15 + loan;
        let source = 5 + loan;
        ws.cell(row, 1, format!("Loan {}", loan))?;
        ws.put(row, 2, formula::link(DEBT_MANAGER, 2, source), &money)?;
        ws.put(row, 3, formula::link(DEBT_MANAGER, 4, source), &money)?;
        ws.put(row, 4, formula::link(DEBT_MANAGER, 5, source), &money)?;
    }

    // 配当はFN見出しなしで次の行に並べる
    ws.section(21, 1, "Dividends")?;
    for fortnight in 1..=FORTNIGHTS {
        let col = fn_col(fortnight);
        ws.put(22, col, formula::link(LIQUIDITY_MONITOR, col, DIVIDEND_ROW), &money)?;
    }

    ws.widths(1, fn_col(FORTNIGHTS), 14.0)?;
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
    fn test_parse_initial_cash_flow() {
        let grid = ReportGrid::new(vec![
            vec![text("Final Cash"), CellValue::Empty, num(0.0), num(250_000.0)],
            vec![text("Tax Payments"), num(-12_000.0)],
        ]);
        assert_eq!(parse_initial_cash_flow(&grid), (250_000.0, 12_000.0));
    }

    #[test]
    fn test_parse_statements_rules() {
        let grid = ReportGrid::new(vec![
            vec![text("Net Sales"), num(1_000_000.0)],
            vec![text("Cost of Goods Sold"), text("(600,000)")],
            vec![text("Gross Income"), num(400_000.0)],
            vec![text("Net profit before taxes"), num(150_000.0)],
            vec![text("Net Profit"), num(100_000.0)],
            vec![text("Total Assets"), num(2_000_000.0)],
            vec![text("Total Liabilities"), num(-900_000.0)],
            vec![text("Equity"), num(1_100_000.0)],
            vec![text("Retained Earnings"), num(-5_000.0)],
            vec![text("Depreciation"), num(-30_000.0)],
        ]);
        let s = parse_statements(&grid);
        assert_eq!(s.net_sales, 1_000_000.0);
        assert_eq!(s.cogs, 600_000.0);
        assert_eq!(s.net_profit, 100_000.0);
        assert_eq!(s.total_liabilities, 900_000.0);
        assert_eq!(s.equity, 1_100_000.0);
        assert_eq!(s.retained_earnings, -5_000.0);
        assert_eq!(s.depreciation, 30_000.0);
        assert_eq!(s.gross_margin_pct, 0.4);
        assert_eq!(s.net_margin_pct, 0.1);
    }

    #[test]
    fn test_margins_stay_zero_without_sales() {
        let grid = ReportGrid::new(vec![vec![text("Gross Margin"), num(50.0)]]);
        let s = parse_statements(&grid);
        assert_eq!(s.gross_income, 50.0);
        assert_eq!(s.gross_margin_pct, 0.0);
    }

    #[test]
    fn test_parse_sa_and_receivables() {
        let grid = ReportGrid::new(vec![
            vec![text("Total Sales & Admin"), num(0.0), num(80_000.0)],
            vec![
                text("Receipts from customers"),
                num(1.0),
                num(2.0),
                num(3.0),
                num(4.0),
                num(5.0),
                num(6.0),
                num(7.0),
                num(8.0),
            ],
            vec![text("Payment to suppliers"), num(-10.0), num(-20.0)],
        ]);
        assert_eq!(parse_sa_expenses(&grid), 80_000.0);
        let (receivables, payables) = parse_receivables_payables(&grid);
        assert_eq!(receivables, [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        assert_eq!(payables, [10.0, 20.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_projected_balances_and_status() {
        let inputs = FinanceInputs {
            final_cash: 50_000.0,
            tax_payments: 10_000.0,
            total_sa_expenses: 800_001.0,
            ..Default::default()
        };
        assert_eq!(inputs.fixed_overhead(), 100_000.0);
        let balances = inputs.projected_balances();
        assert_eq!(balances.len(), 8);
        assert!(balances.iter().all(|b| *b == 40_000.0));

        let out = inputs.shared_outputs();
        assert_eq!(out["liquidity_status"], json!("OK"));
        assert_eq!(out["debt_levels"]["debt_ratio"], json!(0.0));
    }
}
