//! パフォーマンスベンチマーク
//!
//! 入力レポートなし（既定値）で各ダッシュボードをメモリ上に生成する時間を測定します。
//! ファイル書き込みと共有出力の更新は含みません。

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use exsim_dashboards::{Dashboard, Generator, GeneratorBuilder};
use tempfile::TempDir;

fn generator(dir: &TempDir) -> Generator {
    GeneratorBuilder::new()
        .with_reports_dir(dir.path().join("Reports"))
        .with_data_dir(dir.path().join("data"))
        .with_output_dir(dir.path().join("dashboards"))
        .with_shared_outputs(false)
        .build()
        .expect("valid config")
}

/// ダッシュボードごとの生成時間
fn benchmark_each_dashboard(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    let generator = generator(&dir);

    let mut group = c.benchmark_group("generate_to_buffer");
    group.sample_size(20);
    for dashboard in Dashboard::EXECUTION_ORDER {
        group.bench_with_input(
            BenchmarkId::from_parameter(dashboard),
            &dashboard,
            |b, d| {
                b.iter(|| {
                    let bytes = generator.generate_to_buffer(*d).expect("generate");
                    black_box(bytes.len())
                });
            },
        );
    }
    group.finish();
}

/// 7つすべてを続けて生成
fn benchmark_all_dashboards(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("tempdir");
    let generator = generator(&dir);

    let mut group = c.benchmark_group("all_dashboards");
    group.sample_size(10);
    group.bench_function("generate_all_to_buffer", |b| {
        b.iter(|| {
            let total: usize = Dashboard::EXECUTION_ORDER
                .iter()
                .map(|d| generator.generate_to_buffer(*d).expect("generate").len())
                .sum();
            black_box(total)
        });
    });
    group.finish();
}

criterion_group!(benches, benchmark_each_dashboard, benchmark_all_dashboards);
criterion_main!(benches);
