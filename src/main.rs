//! exsim-dashboards CLI
//!
//! レポートディレクトリからダッシュボードを生成・検証するコマンドラインツール。

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use exsim_dashboards::logger;
use exsim_dashboards::{
    detect_dashboard, validate_workbook, Dashboard, DashboardSelector, Generator,
    GeneratorBuilder, GeneratorConfig,
};

#[derive(Debug, Parser)]
#[command(name = "exsim-dashboards", version, about = "Generate ExSim decision dashboards")]
struct Cli {
    /// 前期レポートのディレクトリ
    #[arg(long, global = true)]
    reports_dir: Option<PathBuf>,

    /// 補助データ（初期在庫など）のディレクトリ
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// ダッシュボードの出力先
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// TOML設定ファイル（フラグが優先）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// ExSimケースの定数を既定値に使う
    #[arg(long, global = true)]
    case_parameters: bool,

    /// 共有出力ファイルを読み書きしない
    #[arg(long, global = true)]
    no_shared_outputs: bool,

    /// 並列生成を無効にする
    #[arg(long, global = true)]
    sequential: bool,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// ダッシュボードを生成（名前を省略するとすべて）
    Generate {
        /// CMO, Production, Purchasing, CLO, CPO, ESG, CFO
        dashboards: Vec<String>,
    },
    /// 生成済みブックを検証（省略時は出力先のすべて）
    Validate { files: Vec<PathBuf> },
    /// 共有出力の状態を表示
    Status,
    /// 共有出力を消去
    Clear,
    /// ダッシュボードの一覧
    List,
}

impl Cli {
    fn generator(&self) -> Result<Generator> {
        let config = match &self.config {
            Some(path) => GeneratorConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => GeneratorConfig::default(),
        };

        let mut builder = GeneratorBuilder::from_config(config);
        if let Some(dir) = &self.reports_dir {
            builder = builder.with_reports_dir(dir);
        }
        if let Some(dir) = &self.data_dir {
            builder = builder.with_data_dir(dir);
        }
        if let Some(dir) = &self.output_dir {
            builder = builder.with_output_dir(dir);
        }
        if self.case_parameters {
            builder = builder.with_case_parameters(true);
        }
        if self.no_shared_outputs {
            builder = builder.with_shared_outputs(false);
        }
        if self.sequential {
            builder = builder.with_parallel(false);
        }
        Ok(builder.build()?)
    }
}

fn selector(names: &[String]) -> Result<DashboardSelector> {
    let dashboards = names
        .iter()
        .map(|name| name.parse::<Dashboard>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok(match dashboards.as_slice() {
        [] => DashboardSelector::All,
        [one] => DashboardSelector::One(*one),
        _ => DashboardSelector::Many(dashboards),
    })
}

/// 失敗したダッシュボードの数を返す
fn generate(generator: &Generator, names: &[String]) -> Result<usize> {
    let mut failed = 0;
    for (dashboard, result) in generator.generate_all(&selector(names)?) {
        match result {
            Ok(report) => {
                let path = report
                    .output_path
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                println!("[OK]   {:<10} -> {}", dashboard.to_string(), path);
                if !report.inputs_defaulted.is_empty() {
                    println!("       defaults used for: {}", report.inputs_defaulted.join(", "));
                }
            }
            Err(e) => {
                failed += 1;
                error!("{} failed: {}", dashboard, e);
                println!("[FAIL] {:<10} {}", dashboard.to_string(), e);
            }
        }
    }
    Ok(failed)
}

/// 問題が見つかったブックの数を返す
fn validate(generator: &Generator, files: &[PathBuf]) -> Result<usize> {
    let targets: Vec<(PathBuf, Dashboard)> = if files.is_empty() {
        Dashboard::EXECUTION_ORDER
            .into_iter()
            .map(|d| (generator.output_path(d), d))
            .filter(|(path, _)| path.exists())
            .collect()
    } else {
        files
            .iter()
            .map(|path| {
                detect_dashboard(path)
                    .map(|d| (path.clone(), d))
                    .with_context(|| format!("{} is not a dashboard output file", path.display()))
            })
            .collect::<Result<_>>()?
    };
    if targets.is_empty() {
        warn!("no dashboards found to validate");
    }

    let mut failed = 0;
    for (path, dashboard) in targets {
        let report = match validate_workbook(&path, dashboard) {
            Ok(report) => report,
            Err(e) => {
                failed += 1;
                println!("[FAIL] {}: {}", path.display(), e);
                continue;
            }
        };
        if report.is_valid() {
            println!(
                "[OK]   {} ({} tabs, {} charts)",
                path.display(),
                report.package.sheets.len(),
                report.package.charts
            );
        } else {
            failed += 1;
            println!("[FAIL] {} ({} issues)", path.display(), report.issues.len());
            for issue in &report.issues {
                println!("       {}", issue);
            }
        }
    }
    Ok(failed)
}

fn run(cli: &Cli) -> Result<usize> {
    let generator = cli.generator()?;
    match &cli.command {
        None => generate(&generator, &[]),
        Some(Command::Generate { dashboards }) => generate(&generator, dashboards),
        Some(Command::Validate { files }) => validate(&generator, files),
        Some(Command::Status) => {
            for (dashboard, line) in generator.shared_outputs().status() {
                println!("{:<12} {}", dashboard.to_string(), line);
            }
            Ok(0)
        }
        Some(Command::Clear) => {
            generator.shared_outputs().clear()?;
            println!("Cleared {}", generator.shared_outputs().path().display());
            Ok(0)
        }
        Some(Command::List) => {
            for dashboard in Dashboard::EXECUTION_ORDER {
                println!("{:<12} {}", dashboard.to_string(), dashboard.output_file());
                println!("             {}", dashboard.tabs().join(", "));
            }
            Ok(0)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);
    info!("starting exsim-dashboards");

    match run(&cli) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failed) => {
            error!("{} dashboard(s) failed", failed);
            ExitCode::from(1)
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
