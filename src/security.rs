//! Security Module
//!
//! 入力レポートと生成済みブックを開く際の安全対策を実装するモジュール。
//! 巨大ファイル、ZIP bomb、パストラバーサルへの対策を提供します。

use crate::error::DashboardError;

/// セキュリティ設定
///
/// ファイル処理時のセキュリティ制限を定義します。
#[derive(Debug, Clone)]
pub(crate) struct SecurityConfig {
    /// 展開後の最大サイズ（バイト）
    /// デフォルト: 512MB
    pub max_decompressed_size: u64,
    /// ZIPアーカイブ内の最大ファイル数
    /// デフォルト: 2000
    pub max_file_count: usize,
    /// 単一ファイルの最大サイズ（バイト）
    /// デフォルト: 100MB
    pub max_file_size: u64,
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 100MB
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_decompressed_size: 536_870_912, // 512MB
            max_file_count: 2_000,
            max_file_size: 104_857_600,       // 100MB
            max_input_file_size: 104_857_600, // 100MB
        }
    }
}

impl SecurityConfig {
    /// 入力ファイルの上限だけを差し替えた設定を作成
    pub fn with_input_limit(max_input_file_size: u64) -> Self {
        Self {
            max_input_file_size,
            ..Self::default()
        }
    }

    /// 入力ファイルサイズを検証
    ///
    /// # 引数
    ///
    /// * `path_label` - エラーメッセージに含めるファイル名
    /// * `size` - ファイルサイズ（バイト）
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - 上限以内の場合
    /// * `Err(DashboardError::SecurityViolation)` - 上限を超えた場合
    pub fn check_input_size(&self, path_label: &str, size: u64) -> Result<(), DashboardError> {
        if size > self.max_input_file_size {
            return Err(DashboardError::SecurityViolation(format!(
                "Input file '{}' exceeds maximum size: {} bytes (max: {} bytes)",
                path_label, size, self.max_input_file_size
            )));
        }
        Ok(())
    }
}

/// ファイルパスの検証
///
/// パストラバーサル攻撃を防ぐため、ZIPエントリのパスを検証します。
///
/// # 引数
///
/// * `path` - 検証するファイルパス
///
/// # 戻り値
///
/// * `Ok(())` - パスが安全な場合
/// * `Err(String)` - パスが危険な場合（`..`や絶対パスを含む）
pub(crate) fn validate_zip_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("Empty path is not allowed".to_string());
    }

    // 絶対パスを拒否（Windows形式の`C:\`やUnix形式の`/`で始まるパス）
    if path.starts_with('/') || path.starts_with("C:\\") || path.starts_with("c:\\") {
        return Err(format!("Absolute path is not allowed: {}", path));
    }

    if path.contains("..") {
        return Err(format!("Path traversal detected: {}", path));
    }

    if path.contains('\\') {
        return Err(format!("Backslash in path is not allowed: {}", path));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_zip_path_valid() {
        assert!(validate_zip_path("xl/workbook.xml").is_ok());
        assert!(validate_zip_path("xl/worksheets/sheet1.xml").is_ok());
        assert!(validate_zip_path("xl/charts/chart1.xml").is_ok());
    }

    #[test]
    fn test_validate_zip_path_rejects_unsafe_paths() {
        assert!(validate_zip_path("").is_err());
        assert!(validate_zip_path("/etc/passwd").is_err());
        assert!(validate_zip_path("c:\\xl\\workbook.xml").is_err());
        assert!(validate_zip_path("xl/../../etc/passwd").is_err());
        assert!(validate_zip_path("xl\\workbook.xml").is_err());
    }

    #[test]
    fn test_check_input_size() {
        let config = SecurityConfig::with_input_limit(1_024);
        assert!(config.check_input_size("small.xlsx", 1_024).is_ok());

        match config.check_input_size("big.xlsx", 1_025) {
            Err(DashboardError::SecurityViolation(msg)) => {
                assert!(msg.contains("big.xlsx"));
                assert!(msg.contains("1025"));
            }
            other => panic!("Expected SecurityViolation, got {:?}", other),
        }
    }
}
