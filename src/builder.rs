//! Builder Module
//!
//! Fluent Builder APIを提供し、`Generator`インスタンスを段階的に構築する。

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::api::{Dashboard, DashboardSelector, GenerationReport};
use crate::case::CaseParameters;
use crate::dashboards::{self, Built};
use crate::error::DashboardError;
use crate::parser::{DataPaths, InputContext};
use crate::security::SecurityConfig;
use crate::shared::SharedOutputs;

/// 生成処理の設定
///
/// すべての項目に既定値があり、TOMLファイルでは必要な項目だけを指定できます。
///
/// # TOMLの例
///
/// ```toml
/// reports_dir = "Reports"
/// data_dir = "data"
/// output_dir = "dashboards"
/// case_parameters = true
/// parallel = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// 前期レポートの探索先（最優先）
    pub reports_dir: PathBuf,

    /// 決定テンプレートなどの探索先
    pub data_dir: PathBuf,

    /// ダッシュボードの出力先
    pub output_dir: PathBuf,

    /// 共有出力ファイルを読み書きするか
    pub shared_outputs: bool,

    /// ExSimケースの定数（サプライヤー条件・給与など）を既定値に使うか
    pub case_parameters: bool,

    /// 入力ファイルの最大サイズ（バイト）
    pub max_input_file_size: u64,

    /// ダッシュボードを並列に生成するか
    pub parallel: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            reports_dir: PathBuf::from("Reports"),
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("dashboards"),
            shared_outputs: true,
            case_parameters: false,
            max_input_file_size: SecurityConfig::default().max_input_file_size,
            parallel: true,
        }
    }
}

impl GeneratorConfig {
    /// TOMLファイルから設定を読み込む
    ///
    /// # 戻り値
    ///
    /// * `Err(DashboardError::Io)` - ファイルを読めない場合
    /// * `Err(DashboardError::Toml)` - TOMLとして不正な場合
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DashboardError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// TOML文字列から設定を読み込む
    pub fn from_toml(text: &str) -> Result<Self, DashboardError> {
        Ok(toml::from_str(text)?)
    }
}

/// Fluent Builder APIを提供する構造体
///
/// # 使用例
///
/// ```rust,no_run
/// use exsim_dashboards::{Dashboard, GeneratorBuilder};
///
/// # fn main() -> Result<(), exsim_dashboards::DashboardError> {
/// let generator = GeneratorBuilder::new()
///     .with_reports_dir("Reports")
///     .with_output_dir("out")
///     .with_case_parameters(true)
///     .build()?;
/// let report = generator.generate(Dashboard::Finance)?;
/// println!("{:?}", report.output_path);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct GeneratorBuilder {
    config: GeneratorConfig,
}

impl GeneratorBuilder {
    /// デフォルト設定を持つビルダーを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 入力: `Reports/` → `data/`
    /// - 出力: `dashboards/`
    /// - 共有出力: 有効
    /// - ケース定数: 無効
    /// - 入力ファイル上限: 100MB
    /// - 並列生成: 有効
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存の設定（TOMLファイルなど）から開始する
    pub fn from_config(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn with_reports_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.reports_dir = dir.into();
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.data_dir = dir.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// 共有出力ファイルの読み書きを有効/無効にする
    pub fn with_shared_outputs(mut self, enabled: bool) -> Self {
        self.config.shared_outputs = enabled;
        self
    }

    /// ExSimケースの定数を既定値として使うかを指定する
    ///
    /// 無効の場合、ケース由来の値（サプライヤー価格・採用費など）は0のままになり、
    /// ダッシュボード上で入力セルとして埋めることになります。
    pub fn with_case_parameters(mut self, enabled: bool) -> Self {
        self.config.case_parameters = enabled;
        self
    }

    /// 入力ファイルの最大サイズ（バイト）
    pub fn with_max_input_file_size(mut self, bytes: u64) -> Self {
        self.config.max_input_file_size = bytes;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// 設定を検証し、`Generator`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `DashboardError::Config(String)`:
    ///   * 出力先が空
    ///   * 入力ディレクトリと出力先が同じ
    ///   * 入力ファイル上限が0
    pub fn build(self) -> Result<Generator, DashboardError> {
        let config = self.config;

        if config.output_dir.as_os_str().is_empty() {
            return Err(DashboardError::Config(
                "Output directory must not be empty".to_string(),
            ));
        }

        for (label, dir) in [("Reports", &config.reports_dir), ("Data", &config.data_dir)] {
            if *dir == config.output_dir {
                return Err(DashboardError::Config(format!(
                    "{} directory must differ from the output directory: {}",
                    label,
                    dir.display()
                )));
            }
        }

        if config.max_input_file_size == 0 {
            return Err(DashboardError::Config(
                "Maximum input file size must be greater than 0".to_string(),
            ));
        }

        Ok(Generator::new(config))
    }
}

/// ダッシュボード生成のファサード
///
/// 入力の読み込み → 計算 → ブック書き出し → 共有出力の更新を実行します。
#[derive(Debug)]
pub struct Generator {
    config: GeneratorConfig,
    paths: DataPaths,
    case: Option<CaseParameters>,
}

impl Generator {
    pub(crate) fn new(config: GeneratorConfig) -> Self {
        let paths = DataPaths::new(
            config.reports_dir.clone(),
            config.data_dir.clone(),
            SecurityConfig::with_input_limit(config.max_input_file_size),
        );
        let case = config.case_parameters.then(CaseParameters::mezquite);
        Self {
            config,
            paths,
            case,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// 出力ディレクトリの共有出力ファイル
    pub fn shared_outputs(&self) -> SharedOutputs {
        SharedOutputs::in_dir(&self.config.output_dir)
    }

    /// 出力ファイルのパス
    pub fn output_path(&self, dashboard: Dashboard) -> PathBuf {
        self.config.output_dir.join(dashboard.output_file())
    }

    /// ダッシュボードを1つ生成する
    ///
    /// 共有出力が有効な場合、上流の出力がなければ警告し、生成後に自身の出力を書き出します。
    ///
    /// # 戻り値
    ///
    /// * `Ok(GenerationReport)` - 出力パス、タブ、入力ファイルの検出状況
    /// * `Err(DashboardError)` - ブックの書き出しまたは共有出力の更新に失敗した場合
    pub fn generate(&self, dashboard: Dashboard) -> Result<GenerationReport, DashboardError> {
        if self.config.shared_outputs {
            self.shared_outputs().import_dependencies(dashboard)?;
        }
        let (report, outputs) = self.write_dashboard(dashboard)?;
        if self.config.shared_outputs {
            self.shared_outputs().export(dashboard.shared_name(), outputs)?;
        }
        Ok(report)
    }

    /// 選択されたダッシュボードをまとめて生成する
    ///
    /// ダッシュボード同士は独立しているため、`parallel`が有効ならrayonで並列に生成します。
    /// 結果は実行順に並び、1つが失敗しても残りは生成されます。
    /// 共有出力は生成後に実行順で書き出されます。
    pub fn generate_all(
        &self,
        selector: &DashboardSelector,
    ) -> Vec<(Dashboard, Result<GenerationReport, DashboardError>)> {
        let selected = selector.resolve();
        if self.config.shared_outputs {
            self.warn_missing_upstream(&selected);
        }

        let built: Vec<(Dashboard, Result<(GenerationReport, Map<String, Value>), DashboardError>)> =
            if self.config.parallel {
                selected
                    .par_iter()
                    .map(|d| (*d, self.write_dashboard(*d)))
                    .collect()
            } else {
                selected
                    .iter()
                    .map(|d| (*d, self.write_dashboard(*d)))
                    .collect()
            };

        let shared = self.shared_outputs();
        built
            .into_iter()
            .map(|(dashboard, result)| {
                let result = result.and_then(|(report, outputs)| {
                    if self.config.shared_outputs {
                        shared.export(dashboard.shared_name(), outputs)?;
                    }
                    Ok(report)
                });
                if let Err(e) = &result {
                    warn!("{} failed: {}", dashboard, e);
                }
                (dashboard, result)
            })
            .collect()
    }

    /// ダッシュボードをメモリ上で生成し、xlsxのバイト列を返す
    ///
    /// ファイルも共有出力も書き込みません。
    pub fn generate_to_buffer(&self, dashboard: Dashboard) -> Result<Vec<u8>, DashboardError> {
        let (mut built, _, _) = self.build_dashboard(dashboard)?;
        Ok(built.workbook.save_to_buffer()?)
    }

    fn build_dashboard(
        &self,
        dashboard: Dashboard,
    ) -> Result<(Built, Vec<String>, Vec<String>), DashboardError> {
        let mut ctx = InputContext::new(&self.paths);
        let built = dashboards::build(dashboard, &mut ctx, self.case.as_ref())?;
        Ok((built, ctx.found, ctx.defaulted))
    }

    fn write_dashboard(
        &self,
        dashboard: Dashboard,
    ) -> Result<(GenerationReport, Map<String, Value>), DashboardError> {
        info!("generating {} dashboard", dashboard);
        let (mut built, found, defaulted) = self.build_dashboard(dashboard)?;

        fs::create_dir_all(&self.config.output_dir)?;
        let path = self.output_path(dashboard);
        built.workbook.save(&path)?;
        info!(
            "{} -> {} ({} inputs found, {} defaulted)",
            dashboard,
            path.display(),
            found.len(),
            defaulted.len()
        );

        let report = GenerationReport {
            dashboard,
            output_path: Some(path),
            tabs: dashboard.tabs().iter().map(|t| t.to_string()).collect(),
            inputs_found: found,
            inputs_defaulted: defaulted,
        };
        Ok((report, built.outputs))
    }

    /// 今回の実行に含まれない上流ダッシュボードの出力がなければ警告する
    fn warn_missing_upstream(&self, selected: &[Dashboard]) {
        let shared = self.shared_outputs();
        for dashboard in selected {
            for dep in dashboard.dependencies() {
                if !selected.contains(dep) && shared.import(*dep).is_none() {
                    warn!("{}: no shared outputs available from {}", dashboard, dep);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let generator = GeneratorBuilder::new().build().expect("default config is valid");
        let config = generator.config();
        assert_eq!(config.reports_dir, PathBuf::from("Reports"));
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.output_dir, PathBuf::from("dashboards"));
        assert!(config.shared_outputs);
        assert!(!config.case_parameters);
        assert!(config.parallel);
        assert_eq!(config.max_input_file_size, 104_857_600);
    }

    #[test]
    fn test_build_rejects_empty_output_dir() {
        match GeneratorBuilder::new().with_output_dir("").build() {
            Err(DashboardError::Config(msg)) => assert!(msg.contains("Output directory")),
            other => panic!("Expected Config error, got {:?}", other),
        }
    }

    #[test]
    fn test_build_rejects_output_equal_to_input() {
        let result = GeneratorBuilder::new()
            .with_reports_dir("same")
            .with_output_dir("same")
            .build();
        assert!(matches!(result, Err(DashboardError::Config(_))));

        let result = GeneratorBuilder::new()
            .with_data_dir("out")
            .with_output_dir("out")
            .build();
        assert!(matches!(result, Err(DashboardError::Config(_))));
    }

    #[test]
    fn test_build_rejects_zero_size_limit() {
        let result = GeneratorBuilder::new().with_max_input_file_size(0).build();
        assert!(matches!(result, Err(DashboardError::Config(_))));
    }

    #[test]
    fn test_config_from_toml_keeps_defaults() {
        let config = GeneratorConfig::from_toml(
            "output_dir = \"out\"\ncase_parameters = true\nparallel = false\n",
        )
        .expect("valid toml");
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert!(config.case_parameters);
        assert!(!config.parallel);
        assert_eq!(config.reports_dir, PathBuf::from("Reports"));
    }

    #[test]
    fn test_config_from_invalid_toml() {
        let result = GeneratorConfig::from_toml("output_dir = ");
        assert!(matches!(result, Err(DashboardError::Toml(_))));
    }

    #[test]
    fn test_case_parameters_toggle() {
        let on = GeneratorBuilder::new().with_case_parameters(true).build().expect("valid");
        assert!(on.case.is_some());
        let off = GeneratorBuilder::new().build().expect("valid");
        assert!(off.case.is_none());
    }
}
