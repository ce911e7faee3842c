//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// exsim-dashboardsクレート全体で使用するエラー型
///
/// レポートブックの読み込み、ダッシュボードの生成、共有出力ファイルの更新、
/// 生成済みブックの検証中に発生するすべてのエラーを統一的に扱います。
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー（出力ディレクトリ作成失敗など）
/// - `Parse`: 入力レポートの解析中に発生したエラー（calamine由来）
/// - `Xlsx`: ダッシュボードブックの書き出し中に発生したエラー（rust_xlsxwriter由来）
/// - `Config`: 設定の検証に失敗したエラー
/// - `Validation`: 生成済みブックの検証で問題が見つかったエラー
///
/// # 使用例
///
/// ```rust,no_run
/// use exsim_dashboards::DashboardError;
/// use std::fs::File;
///
/// fn open_report(path: &str) -> Result<(), DashboardError> {
///     let _file = File::open(path)?;  // Ioエラーが自動的に変換される
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum DashboardError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 入力レポートの解析中に発生したエラー
    ///
    /// calamineクレートがレポートブックを解析する際に発生したエラーです。
    /// ローダーはこのエラーを警告として記録し、既定値にフォールバックします。
    #[error("Failed to parse Excel file: {0}")]
    Parse(#[from] calamine::Error),

    /// ダッシュボードブックの書き出しエラー
    #[error("Failed to write workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// 共有出力ファイル（JSON）の読み書きエラー
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 設定ファイル（TOML）の解析エラー
    #[error("Failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// UTF-8文字列の変換エラー
    ///
    /// 生成済みブックのXML検査時にUTF-8文字列への変換に失敗した場合に発生します。
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// ZIPアーカイブの解析エラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// 設定の検証に失敗したエラー
    ///
    /// `GeneratorBuilder::build()`時に設定を検証し、無効な設定が検出された
    /// 場合に発生します。
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use exsim_dashboards::{DashboardError, GeneratorBuilder};
    ///
    /// let result = GeneratorBuilder::new()
    ///     .with_output_dir("")  // 空の出力先
    ///     .build();
    ///
    /// match result {
    ///     Err(DashboardError::Config(msg)) => {
    ///         println!("設定エラー: {}", msg);
    ///     }
    ///     _ => {}
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// 未知のダッシュボード名
    #[error("Unknown dashboard: '{0}'")]
    UnknownDashboard(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// 入力ファイルのサイズ上限や、ZIPアーカイブの展開サイズ上限などに
    /// 違反した場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),

    /// 生成済みブックの検証エラー
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use exsim_dashboards::DashboardError;
    ///
    /// let error = DashboardError::Validation {
    ///     sheet: "LIQUIDITY_MONITOR".to_string(),
    ///     cell: "C15".to_string(),
    ///     message: "Opening cash does not reference B30".to_string(),
    /// };
    /// ```
    #[error("Validation failed at sheet '{sheet}', cell {cell}: {message}")]
    Validation {
        /// 問題が見つかったシート名
        sheet: String,
        /// 問題が見つかったセルの座標（A1記法）
        cell: String,
        /// 詳細メッセージ
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: DashboardError = io_err.into();

        match error {
            DashboardError::Io(e) => {
                assert_eq!(e.kind(), io::ErrorKind::NotFound);
                assert_eq!(e.to_string(), "File not found");
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_parse_error_display() {
        let parse_err = calamine::Error::Msg("Corrupted file");
        let error: DashboardError = parse_err.into();

        let error_msg = error.to_string();
        assert!(error_msg.contains("Failed to parse Excel file"));
        assert!(error_msg.contains("Corrupted file"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error: DashboardError = json_err.into();
        assert!(error.to_string().starts_with("JSON error"));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Table>("output_dir = ").unwrap_err();
        let error: DashboardError = toml_err.into();
        assert!(error.to_string().starts_with("Failed to parse config file"));
    }

    #[test]
    fn test_unknown_dashboard_display() {
        let error = DashboardError::UnknownDashboard("HR".to_string());
        assert_eq!(error.to_string(), "Unknown dashboard: 'HR'");
    }

    #[test]
    fn test_validation_error_display() {
        let error = DashboardError::Validation {
            sheet: "SHIPMENT_BUILDER".to_string(),
            cell: "J6".to_string(),
            message: "arrival must add lead time".to_string(),
        };

        let error_msg = error.to_string();
        assert!(error_msg.contains("SHIPMENT_BUILDER"));
        assert!(error_msg.contains("J6"));
        assert!(error_msg.contains("arrival must add lead time"));
    }

    #[test]
    fn test_error_conversion_with_question_mark() {
        fn io_operation() -> Result<(), DashboardError> {
            let _file = std::fs::File::open("nonexistent_report.xlsx")?;
            Ok(())
        }

        match io_operation() {
            Err(DashboardError::Io(_)) => {}
            _ => panic!("Expected Io error from ? operator"),
        }
    }

    #[test]
    fn test_all_error_formats() {
        let io_err: DashboardError = io::Error::other("test io").into();
        assert!(io_err.to_string().starts_with("IO error"));

        let config_err = DashboardError::Config("test config".to_string());
        assert!(config_err.to_string().starts_with("Configuration error"));

        let security_err = DashboardError::SecurityViolation("too large".to_string());
        assert!(security_err.to_string().starts_with("Security violation"));

        let zip_err = DashboardError::Zip("bad header".to_string());
        assert!(zip_err.to_string().starts_with("ZIP archive error"));
    }
}
