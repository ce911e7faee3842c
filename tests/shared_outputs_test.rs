//! Shared Outputs Tests
//!
//! ダッシュボード生成を通した共有出力ファイルの受け渡しを確認します。

use exsim_dashboards::{Dashboard, DashboardSelector, GeneratorBuilder, SHARED_OUTPUTS_FILE};
use serde_json::Value;

#[test]
fn test_upstream_outputs_reach_finance() {
    let dir = tempfile::tempdir().expect("tempdir");
    let generator = GeneratorBuilder::new()
        .with_reports_dir(dir.path().join("Reports"))
        .with_output_dir(dir.path().join("dashboards"))
        .build()
        .expect("valid config");

    generator.generate(Dashboard::Marketing).expect("CMO");
    generator.generate(Dashboard::Production).expect("Production");

    let shared = generator.shared_outputs();
    assert_eq!(shared.path(), dir.path().join("dashboards").join(SHARED_OUTPUTS_FILE));

    let cmo = shared.import(Dashboard::Marketing).expect("CMO outputs");
    for key in Dashboard::Marketing.output_keys() {
        assert!(cmo.contains_key(*key), "CMO is missing {}", key);
    }
    let demand = cmo["demand_forecast"].as_object().expect("zone map");
    assert_eq!(demand.len(), 5);
    assert!(cmo["marketing_spend"].as_f64().unwrap_or(-1.0) >= 0.0);

    let upstream = shared.import_dependencies(Dashboard::Finance).expect("deps");
    let found: Vec<Dashboard> = upstream.keys().copied().collect();
    assert_eq!(found, vec![Dashboard::Marketing, Dashboard::Production]);
}

#[test]
fn test_shared_file_layout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let generator = GeneratorBuilder::new()
        .with_reports_dir(dir.path().join("Reports"))
        .with_output_dir(dir.path().join("dashboards"))
        .build()
        .expect("valid config");

    let selector = DashboardSelector::Many(vec![Dashboard::Esg, Dashboard::People]);
    for (dashboard, result) in generator.generate_all(&selector) {
        result.unwrap_or_else(|e| panic!("{} failed: {}", dashboard, e));
    }

    let text = std::fs::read_to_string(generator.shared_outputs().path()).expect("shared file");
    let json: Value = serde_json::from_str(&text).expect("valid JSON");
    assert_eq!(json["metadata"]["version"], "1.0");
    assert!(json["metadata"]["last_updated"].is_string());

    let dashboards = json["dashboards"].as_object().expect("dashboards");
    let mut names: Vec<&str> = dashboards.keys().map(String::as_str).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["CPO", "ESG"]);
    assert!(json["dashboards"]["ESG"]["outputs"]["tax_liability"].is_number());
}

#[test]
fn test_clear_resets_status() {
    let dir = tempfile::tempdir().expect("tempdir");
    let generator = GeneratorBuilder::new()
        .with_reports_dir(dir.path().join("Reports"))
        .with_output_dir(dir.path().join("dashboards"))
        .build()
        .expect("valid config");

    generator.generate(Dashboard::Logistics).expect("CLO");
    let shared = generator.shared_outputs();
    let status = shared.status();
    assert!(status[3].1.starts_with("[OK] 3 keys"));

    shared.clear().expect("clear");
    assert!(shared.status().iter().all(|(_, line)| line == "[--] No data"));
}
