// FUTURE:
// - benchmark against real tzdata files, not just synthetic zones
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use zoneinfo::tz::{posix, tzif};
use zoneinfo::{DecodedZone, Fold, TransitionTable, build};

const CET: i32 = 3_600;
const CEST: i32 = 7_200;

/// A zone shaped like Europe/Amsterdam: two transitions a year, 1977-2037
fn synthetic_zone() -> DecodedZone {
    let mut trans_utc = vec![-1_693_706_400];
    let mut trans_idx = vec![1];
    for year in 0..60 {
        let start = 228_877_200 + year * 31_556_952;
        trans_utc.extend([start, start + 214 * 86_400]);
        trans_idx.extend([2, 1]);
    }
    DecodedZone {
        trans_idx,
        trans_utc,
        utcoff: vec![1_172, CET, CEST],
        isdst: vec![false, false, true],
        abbr: vec!["LMT".into(), "CET".into(), "CEST".into()],
        tz_string: Some("CET-1CEST,M3.5.0,M10.5.0/3".into()),
    }
}

fn synthetic_table() -> TransitionTable {
    build(synthetic_zone()).unwrap()
}

pub fn parse_posix_tz(c: &mut Criterion) {
    c.bench_function("Parse POSIX TZ", |b| {
        b.iter(|| posix::parse(black_box(b"PST8PDT,M3.2.0,M11.1.0")).unwrap())
    });
}

pub fn build_table(c: &mut Criterion) {
    let zone = synthetic_zone();
    c.bench_function("build transition table", |b| {
        b.iter(|| build(black_box(zone.clone())).unwrap())
    });
}

pub fn decode_system_tzif(c: &mut Criterion) {
    // Not every machine has tzdata installed
    let Ok(bytes) = std::fs::read("/usr/share/zoneinfo/Europe/Amsterdam") else {
        return;
    };
    c.bench_function("decode TZif", |b| {
        b.iter(|| tzif::decode(black_box(&bytes)).unwrap())
    });
}

pub fn offset_for_instant(c: &mut Criterion) {
    let table = synthetic_table();
    c.bench_function("offset for instant", |b| {
        b.iter(|| table.resolve_utc(black_box(1_719_946_800)))
    });
}

pub fn offset_for_local(c: &mut Criterion) {
    let table = synthetic_table();
    c.bench_function("offset for local", |b| {
        b.iter(|| table.resolve_wall(black_box(1_719_946_800), black_box(Fold::Later)))
    });
}

criterion_group!(
    benches,
    parse_posix_tz,
    build_table,
    decode_system_tzif,
    offset_for_instant,
    offset_for_local,
);
criterion_main!(benches);
