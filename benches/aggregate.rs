use criterion::{Criterion, black_box, criterion_group, criterion_main};
use polars::prelude::*;
use ridership_etl::processor::{aggregate_rides, sample_rows};

fn synthetic_rides(n: usize) -> DataFrame {
    let ride_ids: Vec<String> = (0..n).map(|i| format!("ride-{i}")).collect();
    let started_at: Vec<String> = (0..n)
        .map(|i| {
            format!(
                "2024-06-{:02} {:02}:{:02}:00",
                1 + (i % 30),
                i % 24,
                (i * 7) % 60
            )
        })
        .collect();
    let start: Vec<i64> = (0..n).map(|i| (i % 40) as i64).collect();
    let end: Vec<i64> = (0..n).map(|i| (i * 3 % 40) as i64).collect();
    let membership: Vec<i64> = (0..n).map(|i| (i % 2) as i64).collect();
    let rideable: Vec<i64> = (0..n).map(|i| (i % 3) as i64).collect();
    let duration: Vec<f64> = (0..n).map(|i| 60.0 + (i * 37 % 3600) as f64).collect();

    df!(
        "ride_id" => ride_ids,
        "started_at" => started_at,
        "start_station_id" => start,
        "end_station_id" => end,
        "membership_id" => membership,
        "rideable_id" => rideable,
        "trip_duration" => duration
    )
    .unwrap()
}

fn bench_aggregate(c: &mut Criterion) {
    let rides = synthetic_rides(100_000);

    c.bench_function("aggregate_rides_100k", |b| {
        b.iter(|| aggregate_rides(black_box(rides.clone())).unwrap())
    });
    c.bench_function("sample_rows_100k", |b| {
        b.iter(|| sample_rows(black_box(&rides), 0.1, Some(42)).unwrap())
    });
}

criterion_group!(benches, bench_aggregate);
criterion_main!(benches);
