//! Input Source Module
//!
//! 入力ファイルのパス解決と、ロード結果（検出/既定値）の記録を担当します。
//! 探索順は `reports_dir` → `data_dir` です。

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::parser::scan::ReportGrid;
use crate::parser::workbook::ReportReader;
use crate::security::SecurityConfig;

/// 入力ディレクトリの設定
#[derive(Debug, Clone)]
pub(crate) struct DataPaths {
    reports_dir: PathBuf,
    data_dir: PathBuf,
    security: SecurityConfig,
}

impl DataPaths {
    pub fn new(
        reports_dir: impl Into<PathBuf>,
        data_dir: impl Into<PathBuf>,
        security: SecurityConfig,
    ) -> Self {
        Self {
            reports_dir: reports_dir.into(),
            data_dir: data_dir.into(),
            security,
        }
    }

    /// ファイル名を実在するパスに解決する
    ///
    /// # 戻り値
    ///
    /// * `Some(PathBuf)` - `reports_dir`または`data_dir`に存在する場合
    /// * `None` - どちらにも存在しない場合
    pub fn resolve(&self, file_name: &str) -> Option<PathBuf> {
        [&self.reports_dir, &self.data_dir]
            .into_iter()
            .map(|dir| dir.join(file_name))
            .find(|p| p.is_file())
    }

    pub fn security(&self) -> &SecurityConfig {
        &self.security
    }
}

/// 1回のダッシュボード生成における入力ロードの記録
///
/// ローダーはこのコンテキスト経由でレポートを読み込み、
/// 見つかったファイルと既定値で補ったファイルが自動的に記録されます。
#[derive(Debug)]
pub(crate) struct InputContext<'a> {
    paths: &'a DataPaths,
    pub found: Vec<String>,
    pub defaulted: Vec<String>,
}

impl<'a> InputContext<'a> {
    pub fn new(paths: &'a DataPaths) -> Self {
        Self {
            paths,
            found: Vec::new(),
            defaulted: Vec::new(),
        }
    }

    /// レポートブックのシートを読み込む
    ///
    /// ファイルが存在しない、または読み込みに失敗した場合は警告を記録して`None`を返します。
    /// 呼び出し側は`None`の場合に既定値を使用します。
    ///
    /// # 引数
    ///
    /// * `file_name` - 入力ファイル名（例: `"initial_cash_flow.xlsx"`）
    /// * `sheet` - シート名。`None`の場合は先頭シート
    pub fn grid(&mut self, file_name: &str, sheet: Option<&str>) -> Option<ReportGrid> {
        let Some(path) = self.paths.resolve(file_name) else {
            warn!("{} not found, using defaults", file_name);
            self.defaulted.push(file_name.to_string());
            return None;
        };

        match read_sheet(&path, sheet, self.paths.security()) {
            Ok(grid) => {
                debug!("loaded {} ({} rows)", path.display(), grid.len());
                self.found.push(file_name.to_string());
                Some(grid)
            }
            Err(e) => {
                warn!("could not load {}: {}; using defaults", path.display(), e);
                self.defaulted.push(file_name.to_string());
                None
            }
        }
    }

    /// ファイルの存在だけを確認する（決定テンプレートなど）
    pub fn check(&mut self, file_name: &str) -> bool {
        match self.paths.resolve(file_name) {
            Some(path) => {
                debug!("found template {}", path.display());
                self.found.push(file_name.to_string());
                true
            }
            None => {
                warn!("{} not found", file_name);
                self.defaulted.push(file_name.to_string());
                false
            }
        }
    }
}

fn read_sheet(
    path: &Path,
    sheet: Option<&str>,
    security: &SecurityConfig,
) -> Result<ReportGrid, crate::error::DashboardError> {
    let mut reader = ReportReader::open(path, security)?;
    reader.read_grid(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_resolve_prefers_reports_dir() {
        let reports = tempfile::tempdir().expect("tempdir");
        let data = tempfile::tempdir().expect("tempdir");
        fs::write(reports.path().join("a.xlsx"), b"x").expect("write");
        fs::write(data.path().join("a.xlsx"), b"y").expect("write");
        fs::write(data.path().join("b.xlsx"), b"z").expect("write");

        let paths = DataPaths::new(reports.path(), data.path(), SecurityConfig::default());
        assert_eq!(paths.resolve("a.xlsx"), Some(reports.path().join("a.xlsx")));
        assert_eq!(paths.resolve("b.xlsx"), Some(data.path().join("b.xlsx")));
        assert_eq!(paths.resolve("c.xlsx"), None);
    }

    #[test]
    fn test_missing_and_corrupt_inputs_fall_back() {
        let data = tempfile::tempdir().expect("tempdir");
        fs::write(data.path().join("broken.xlsx"), b"not a workbook").expect("write");
        let paths = DataPaths::new(data.path().join("none"), data.path(), SecurityConfig::default());

        let mut ctx = InputContext::new(&paths);
        assert!(ctx.grid("missing.xlsx", None).is_none());
        assert!(ctx.grid("broken.xlsx", None).is_none());
        assert!(ctx.check("broken.xlsx"));

        assert_eq!(ctx.defaulted, vec!["missing.xlsx", "broken.xlsx"]);
        assert_eq!(ctx.found, vec!["broken.xlsx"]);
    }
}
