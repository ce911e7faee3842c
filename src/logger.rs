//! Logger Module
//!
//! CLI向けの`tracing-subscriber`初期化。

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// CLI用のロガーを初期化
///
/// `RUST_LOG`が設定されていればそれを優先します。未設定の場合、`verbose`なら
/// 本クレートのdebugログも出力します。
pub fn init_cli_logger(verbose: bool) {
    let default = if verbose {
        "exsim_dashboards=debug,info"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}
