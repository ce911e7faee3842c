//! Shared Outputs Module
//!
//! ダッシュボード間で主要数値を受け渡すJSONファイル（`shared_outputs.json`）を管理します。
//! 上流のダッシュボードが書き出し、下流のダッシュボードが`import_dependencies`で読み込みます。
//!
//! # ファイル形式
//!
//! ```json
//! {
//!   "metadata": { "created": "...", "last_updated": "...", "version": "1.0" },
//!   "dashboards": {
//!     "CMO": { "timestamp": "...", "outputs": { "marketing_spend": 250535.0 } }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::api::Dashboard;
use crate::error::DashboardError;

/// 共有出力ファイルの既定名
pub const SHARED_OUTPUTS_FILE: &str = "shared_outputs.json";

const FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Metadata {
    #[serde(default)]
    created: String,
    #[serde(default)]
    last_updated: String,
    #[serde(default = "default_version")]
    version: String,
}

fn default_version() -> String {
    FORMAT_VERSION.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    timestamp: String,
    outputs: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SharedFile {
    metadata: Metadata,
    #[serde(default)]
    dashboards: BTreeMap<String, Entry>,
}

impl SharedFile {
    fn empty() -> Self {
        let now = timestamp();
        Self {
            metadata: Metadata {
                created: now.clone(),
                last_updated: now,
                version: default_version(),
            },
            dashboards: BTreeMap::new(),
        }
    }
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// 共有出力ファイルのマネージャー
///
/// # 使用例
///
/// ```rust,no_run
/// use exsim_dashboards::{Dashboard, SharedOutputs};
/// use serde_json::{json, Map};
///
/// # fn main() -> Result<(), exsim_dashboards::DashboardError> {
/// let shared = SharedOutputs::new("dashboards/shared_outputs.json");
///
/// let mut outputs = Map::new();
/// outputs.insert("marketing_spend".to_string(), json!(50_000));
/// shared.export("CMO", outputs)?;
///
/// let upstream = shared.import_dependencies(Dashboard::Finance)?;
/// println!("{} upstream dashboards available", upstream.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SharedOutputs {
    path: PathBuf,
}

impl SharedOutputs {
    /// ファイルパスを指定してマネージャーを作成（ファイルは初回書き込み時に作成）
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 出力ディレクトリ内の既定ファイル名で作成
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(SHARED_OUTPUTS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// ファイルを読み込む。存在しない・壊れている場合は空として扱う
    fn read(&self) -> SharedFile {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(_) => return SharedFile::empty(),
        };
        match serde_json::from_str(&text) {
            Ok(file) => file,
            Err(e) => {
                warn!("{} is unreadable ({}), starting fresh", self.path.display(), e);
                SharedFile::empty()
            }
        }
    }

    fn write(&self, mut file: SharedFile) -> Result<(), DashboardError> {
        file.metadata.last_updated = timestamp();
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&file)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// ダッシュボードの出力を書き出す
    ///
    /// 同じダッシュボードの既存の出力は置き換えられます。
    ///
    /// # 引数
    ///
    /// * `dashboard` - ダッシュボード名（`CMO`、`Production`など）
    /// * `outputs` - 公開する値。スキーマにないキーは警告を出して保持します
    ///
    /// # 戻り値
    ///
    /// * `Err(DashboardError::UnknownDashboard)` - 未知のダッシュボード名の場合
    pub fn export(&self, dashboard: &str, outputs: Map<String, Value>) -> Result<(), DashboardError> {
        let dashboard: Dashboard = dashboard.parse()?;
        let schema = dashboard.output_keys();
        for key in outputs.keys() {
            if !schema.contains(&key.as_str()) {
                warn!("{}: '{}' is not a known shared output key", dashboard, key);
            }
        }

        let count = outputs.len();
        let mut file = self.read();
        file.dashboards.insert(
            dashboard.shared_name().to_string(),
            Entry {
                timestamp: timestamp(),
                outputs,
            },
        );
        self.write(file)?;
        info!("exported {} shared keys from {}", count, dashboard);
        Ok(())
    }

    /// ダッシュボードの出力を読み込む（未登録なら`None`）
    pub fn import(&self, dashboard: Dashboard) -> Option<Map<String, Value>> {
        self.read()
            .dashboards
            .remove(dashboard.shared_name())
            .map(|entry| entry.outputs)
    }

    /// 上流のダッシュボードの出力をまとめて読み込む
    ///
    /// 出力がない上流ダッシュボードは警告を出してスキップします。
    pub fn import_dependencies(
        &self,
        dashboard: Dashboard,
    ) -> Result<BTreeMap<Dashboard, Map<String, Value>>, DashboardError> {
        let mut file = self.read();
        let mut result = BTreeMap::new();
        for dep in dashboard.dependencies() {
            match file.dashboards.remove(dep.shared_name()) {
                Some(entry) if !entry.outputs.is_empty() => {
                    debug!("{} <- {} ({} keys)", dashboard, dep, entry.outputs.len());
                    result.insert(*dep, entry.outputs);
                }
                _ => warn!("{}: no shared outputs available from {}", dashboard, dep),
            }
        }
        Ok(result)
    }

    /// すべての共有出力を消去する
    pub fn clear(&self) -> Result<(), DashboardError> {
        self.write(SharedFile::empty())?;
        info!("cleared shared outputs at {}", self.path.display());
        Ok(())
    }

    /// ダッシュボードごとの状態（実行順）
    ///
    /// `"[OK] 4 keys @ 2025-01-15T09:30"`または`"[--] No data"`を返します。
    pub fn status(&self) -> Vec<(Dashboard, String)> {
        let file = self.read();
        Dashboard::EXECUTION_ORDER
            .into_iter()
            .map(|d| {
                let line = match file.dashboards.get(d.shared_name()) {
                    Some(entry) => {
                        let at = entry.timestamp.get(..16).unwrap_or(&entry.timestamp);
                        format!("[OK] {} keys @ {}", entry.outputs.len(), at)
                    }
                    None => "[--] No data".to_string(),
                };
                (d, line)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn outputs(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_export_then_import() {
        let dir = tempfile::tempdir().expect("tempdir");
        let shared = SharedOutputs::in_dir(dir.path());

        shared
            .export("CMO", outputs(&[("marketing_spend", json!(50_000))]))
            .expect("export");
        let cmo = shared.import(Dashboard::Marketing).expect("CMO outputs");
        assert_eq!(cmo["marketing_spend"], json!(50_000));
        assert!(shared.import(Dashboard::Finance).is_none());
    }

    #[test]
    fn test_export_rejects_unknown_dashboard() {
        let dir = tempfile::tempdir().expect("tempdir");
        let shared = SharedOutputs::in_dir(dir.path());
        match shared.export("HR", Map::new()) {
            Err(DashboardError::UnknownDashboard(name)) => assert_eq!(name, "HR"),
            other => panic!("Expected UnknownDashboard, got {:?}", other),
        }
        assert!(!shared.path().exists());
    }

    #[test]
    fn test_unknown_keys_are_kept() {
        let dir = tempfile::tempdir().expect("tempdir");
        let shared = SharedOutputs::in_dir(dir.path());
        shared
            .export("CFO", outputs(&[("est_revenue", json!(1.0))]))
            .expect("export");
        let cfo = shared.import(Dashboard::Finance).expect("CFO outputs");
        assert!(cfo.contains_key("est_revenue"));
    }

    #[test]
    fn test_import_dependencies_skips_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let shared = SharedOutputs::in_dir(dir.path());
        shared
            .export("Production", outputs(&[("overtime_hours", json!(0))]))
            .expect("export");

        let deps = shared.import_dependencies(Dashboard::Logistics).expect("deps");
        assert_eq!(deps.len(), 1);
        assert!(deps.contains_key(&Dashboard::Production));
        assert!(!deps.contains_key(&Dashboard::Marketing));
    }

    #[test]
    fn test_status_and_clear() {
        let dir = tempfile::tempdir().expect("tempdir");
        let shared = SharedOutputs::in_dir(dir.path());
        shared
            .export(
                "ESG",
                outputs(&[("tax_liability", json!(4500)), ("co2_emissions", json!({}))]),
            )
            .expect("export");

        let status = shared.status();
        assert_eq!(status.len(), 7);
        let esg = &status[5];
        assert_eq!(esg.0, Dashboard::Esg);
        assert!(esg.1.starts_with("[OK] 2 keys @ "));
        assert_eq!(esg.1.len(), "[OK] 2 keys @ ".len() + 16);
        assert_eq!(status[0].1, "[--] No data");

        shared.clear().expect("clear");
        assert!(shared.status().iter().all(|(_, s)| s == "[--] No data"));
    }

    #[test]
    fn test_corrupt_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let shared = SharedOutputs::in_dir(dir.path());
        fs::write(shared.path(), "{ not json").expect("write");
        assert!(shared.import(Dashboard::Marketing).is_none());

        shared
            .export("CMO", outputs(&[("pricing", json!({}))]))
            .expect("export over corrupt file");
        assert!(shared.import(Dashboard::Marketing).is_some());
    }
}
