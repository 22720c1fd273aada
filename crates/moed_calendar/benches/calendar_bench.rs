use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use moed_calendar::{ArithmeticCalendar, CalendarEngine, HebrewCalendar};

fn feasts_bench(c: &mut Criterion) {
    let engine = CalendarEngine::arithmetic();

    let mut group = c.benchmark_group("calendar_feasts");
    group.bench_function("feasts_for_year", |b| {
        b.iter(|| {
            engine
                .feasts_for_year(black_box(2025))
                .expect("feasts should compute")
        })
    });
    group.bench_function("feasts_for_range_century", |b| {
        b.iter(|| {
            engine
                .feasts_for_range(black_box(1950), black_box(2050))
                .expect("feasts should compute")
        })
    });
    group.finish();
}

fn conversion_bench(c: &mut Criterion) {
    let date = NaiveDate::from_ymd_opt(2025, 4, 12).expect("valid date");

    let mut group = c.benchmark_group("calendar_conversion");
    group.bench_function("from_gregorian", |b| {
        b.iter(|| {
            ArithmeticCalendar
                .from_gregorian(black_box(date))
                .expect("conversion should succeed")
        })
    });
    group.finish();
}

criterion_group!(benches, feasts_bench, conversion_bench);
criterion_main!(benches);
