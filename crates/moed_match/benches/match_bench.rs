use chrono::{Duration, TimeZone, Utc};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use moed_events::{CloseApproach, DisasterEvent, EventType};
use moed_match::{ScoringConfig, match_events};

fn match_bench(c: &mut Criterion) {
    let start = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .expect("valid instant");
    let disasters: Vec<DisasterEvent> = (0..2000)
        .map(|i| {
            DisasterEvent::new(
                format!("eq-{i}"),
                EventType::Earthquake,
                start + Duration::hours(i * 4),
                5.0 + f64::from(i as i32 % 40) / 10.0,
            )
            .expect("valid event")
        })
        .collect();
    let approaches: Vec<CloseApproach> = (0..500)
        .map(|i| {
            CloseApproach::new(
                format!("neo-{i}"),
                "synthetic",
                start + Duration::hours(i * 16),
                f64::from(i as i32 % 25) / 500.0,
            )
            .expect("valid approach")
        })
        .collect();
    let config = ScoringConfig::default();

    let mut group = c.benchmark_group("temporal_match");
    group.bench_function("match_2000x500", |b| {
        b.iter(|| {
            match_events(black_box(&disasters), black_box(&approaches), &config)
                .expect("valid config")
        })
    });
    group.finish();
}

criterion_group!(benches, match_bench);
criterion_main!(benches);
