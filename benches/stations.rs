use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wetterdienst::{DistanceUnit, StationRecord, StationsFrame};

fn synthetic_stations() -> StationsFrame {
    let records: Vec<StationRecord> = (0..2_000)
        .map(|i| StationRecord {
            station_id: format!("{:05}", i),
            from_date: None,
            to_date: None,
            height: Some(100.0),
            latitude: 47.0 + (i / 50) as f64 * 0.2,
            longitude: 6.0 + (i % 50) as f64 * 0.18,
            name: format!("Station {}", i),
            state: None,
        })
        .collect();
    StationsFrame::from_records(&records).unwrap()
}

fn bench_station_filters(c: &mut Criterion) {
    let stations = synthetic_stations();
    c.bench_function("filter_by_rank", |b| {
        b.iter(|| stations.filter_by_rank(black_box(50.0), black_box(8.9), 10))
    });
    c.bench_function("filter_by_distance", |b| {
        b.iter(|| {
            stations.filter_by_distance(
                black_box(50.0),
                black_box(8.9),
                50.0,
                DistanceUnit::Kilometers,
            )
        })
    });
    c.bench_function("filter_by_bbox", |b| {
        b.iter(|| stations.filter_by_bbox(black_box(8.0), 49.0, 10.0, 51.0))
    });
}

criterion_group!(benches, bench_station_filters);
criterion_main!(benches);
