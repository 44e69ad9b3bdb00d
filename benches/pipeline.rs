use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use carscope::{Dashboard, DashboardConfig, Selection, io_utils};
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use tempfile::TempDir;

const MODELS: &[&str] = &["Yaris", "Aygo", "Corolla", "RAV4", "GT86", "C-HR"];
const FUELS: &[&str] = &["Petrol", "Diesel", "Hybrid"];

fn generate_listings(rows: usize) -> (TempDir, PathBuf) {
    let temp_dir = tempfile::tempdir().expect("temp dir");
    let csv_path = temp_dir.path().join("listings.csv");
    let mut file = File::create(&csv_path).expect("create csv");
    writeln!(file, "model,year,price,transmission,mileage,fuelType,engineSize").expect("header");
    for i in 0..rows {
        let model = MODELS[i % MODELS.len()];
        let fuel = FUELS[(i / 7) % FUELS.len()];
        let year = 2010 + (i % 11);
        let thousands = 6 + (i % 30);
        let units = (i * 37) % 1000;
        let transmission = if i % 4 == 0 { "Automatic" } else { "Manual" };
        writeln!(
            file,
            "{model},{year},{thousands}.{units:03},{transmission},{},{fuel},1.{}",
            (i * 113) % 90_000,
            i % 9
        )
        .expect("row");
    }
    (temp_dir, csv_path)
}

fn load_dashboard(path: &std::path::Path) -> Dashboard {
    let config = DashboardConfig::default();
    let options = io_utils::LoadOptions {
        verbatim_columns: config.verbatim_columns(),
        ..io_utils::LoadOptions::default()
    };
    let raw = io_utils::load_table(path, &options).expect("load listings");
    Dashboard::new(&raw, config)
}

fn bench_pipeline(c: &mut Criterion) {
    let (temp_dir, csv_path) = generate_listings(50_000);
    let dashboard = load_dashboard(&csv_path);
    let untouched = Selection::new();
    let narrowed = Selection::new()
        .with_models(["Yaris", "Aygo", "Corolla"])
        .with_fuels(["Petrol", "Hybrid"])
        .with_price_range(Some(10_000.0), Some(25_000.0));

    let mut group = c.benchmark_group("dashboard");

    group.bench_function("load_and_normalize", |b| {
        b.iter_batched(
            || (),
            |_| load_dashboard(&csv_path),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("view_untouched", |b| {
        b.iter(|| dashboard.view(&untouched));
    });

    group.bench_function("view_narrowed", |b| {
        b.iter(|| dashboard.view(&narrowed));
    });

    drop(temp_dir);
    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
