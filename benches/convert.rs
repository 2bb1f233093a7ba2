use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use histfx::graph::{convert, ConvertOptions, Graph};
use histfx::rate::Rate;

/// A year of EUR-base rates for 40 currencies, plus a CAD-base feed that
/// forces multi-hop chains, mimicking the shape of the real dataset.
fn synthetic_graph() -> Graph {
    let start = Utc.with_ymd_and_hms(2022, 1, 3, 0, 0, 0).unwrap();
    let mut rates = Vec::new();

    for day_offset in 0..260 {
        let day = start + Duration::days(day_offset);
        for c in 0..40 {
            rates.push(Rate {
                from: "EUR".to_string(),
                to: format!("C{c:02}"),
                rate: 1.05 + (c as f64) * 0.37 + (day_offset as f64) * 1e-4,
                day,
                info: "bench".to_string(),
            });
        }
        for c in 0..10 {
            rates.push(Rate {
                from: format!("X{c:02}"),
                to: "C00".to_string(),
                rate: 0.5 + (c as f64) * 0.11,
                day,
                info: "bench".to_string(),
            });
        }
    }

    Graph::compile(&rates).unwrap()
}

fn benchmark_convert_rate_only(c: &mut Criterion) {
    let graph = synthetic_graph();
    let day = Utc.with_ymd_and_hms(2022, 7, 1, 0, 0, 0).unwrap();
    let opts = ConvertOptions::new().accept_older_rate(3);

    c.bench_function("convert_rate_only", |b| {
        b.iter(|| {
            convert(
                &graph,
                black_box("X03"),
                black_box("C17"),
                black_box(day),
                &opts,
            )
            .unwrap()
        });
    });
}

fn benchmark_convert_full_trace(c: &mut Criterion) {
    let graph = synthetic_graph();
    let day = Utc.with_ymd_and_hms(2022, 7, 1, 0, 0, 0).unwrap();
    let opts = ConvertOptions::new().accept_older_rate(3).full_trace();

    c.bench_function("convert_full_trace", |b| {
        b.iter(|| {
            convert(
                &graph,
                black_box("X03"),
                black_box("C17"),
                black_box(day),
                &opts,
            )
            .unwrap()
        });
    });
}

fn benchmark_compile(c: &mut Criterion) {
    let day = Utc.with_ymd_and_hms(2022, 1, 3, 0, 0, 0).unwrap();
    let rates: Vec<Rate> = (0..1000)
        .map(|i| Rate {
            from: "EUR".to_string(),
            to: format!("C{:02}", i % 40),
            rate: 1.0 + (i as f64) * 1e-3,
            day: day + Duration::days(i / 40),
            info: "bench".to_string(),
        })
        .collect();

    c.bench_function("compile_1000_rates", |b| {
        b.iter(|| Graph::compile(black_box(&rates)).unwrap());
    });
}

criterion_group!(
    benches,
    benchmark_convert_rate_only,
    benchmark_convert_full_trace,
    benchmark_compile
);
criterion_main!(benches);
