//! Criterion benchmarks for the VRGDA hot path.
//!
//! Covers: exp/ln evaluation, pricing and calibration.

use alloy_primitives::{I256, U256};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use claimer_core::traits::AuctionPricing;
use claimer_vrgda::VrgdaEngine;
use claimer_vrgda::wad::{exp_wad, ln_wad, to_wad};

fn bench_exp(c: &mut Criterion) {
    // 3.5 in wad, well inside the domain.
    let x = I256::from_dec_str("3500000000000000000").unwrap();

    c.bench_function("exp_wad", |b| b.iter(|| exp_wad(black_box(x))));
}

fn bench_ln(c: &mut Criterion) {
    let x = to_wad(1_000);

    c.bench_function("ln_wad", |b| b.iter(|| ln_wad(black_box(x))));
}

fn bench_price(c: &mut Criterion) {
    let engine = VrgdaEngine::new();
    let target = U256::from(100_000_000_000_000u64);
    let rate = engine.per_time_unit(1_000, 3_600).unwrap();
    let decay = engine
        .decay_constant(U256::from(1_100_000_000_000_000_000u64))
        .unwrap();

    c.bench_function("vrgda_price", |b| {
        b.iter(|| {
            engine.price(
                black_box(target),
                black_box(1_800),
                black_box(400),
                black_box(rate),
                black_box(decay),
            )
        })
    });
}

fn bench_calibration(c: &mut Criterion) {
    let engine = VrgdaEngine::new();
    let min = U256::from(100_000_000_000_000u64);
    let max = U256::from(100_000_000_000_000_000u64);

    c.bench_function("maximum_price_delta_scale", |b| {
        b.iter(|| engine.maximum_price_delta_scale(black_box(min), black_box(max), black_box(21_600)))
    });
}

criterion_group!(benches, bench_exp, bench_ln, bench_price, bench_calibration);
criterion_main!(benches);
