use std::hint::black_box;
use std::str::FromStr;

use alloy::primitives::{Address, U256};
use bigdecimal::BigDecimal;
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use sprout::liquidity::{size_position, PositionRequest, TickWidth};
use sprout::math::price::encode_sqrt_price_x96;
use sprout::models::fee::FeeTier;
use sprout::models::pool::PoolState;
use sprout::models::token::TokenDescriptor;
use sprout::path::encode_path;

/// Generate a new random token address
fn generate_random_address() -> Address {
    let mut bytes = [0u8; 20];
    fastrand::fill(&mut bytes);
    Address::from(bytes)
}

fn generate_token(symbol: &str) -> TokenDescriptor {
    TokenDescriptor::new(generate_random_address(), 18, symbol, symbol)
}

/// Random reserve pairs spanning ratios from 1:1 to about 1:10^9
fn generate_reserves(count: usize) -> Vec<(BigDecimal, BigDecimal)> {
    let mut rng = rand::rng();
    (0..count)
        .map(|_| {
            (
                BigDecimal::from(rng.random_range(1u64..1_000_000_000)),
                BigDecimal::from(rng.random_range(1u64..1_000_000_000)),
            )
        })
        .collect()
}

fn bench_encode_price(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_sqrt_price_x96");
    let reserves = generate_reserves(1_000);

    group.throughput(Throughput::Elements(reserves.len() as u64));
    group.bench_function("random_ratios", |b| {
        b.iter(|| {
            for (reserve1, reserve0) in &reserves {
                black_box(encode_sqrt_price_x96(reserve1, reserve0).ok());
            }
        });
    });

    // Display-unit reserves with fractional digits exercise the rescaling path
    let fractional = BigDecimal::from_str("0.000123456789").unwrap();
    let whole = BigDecimal::from_str("30000000").unwrap();
    group.bench_function("fractional_reserve", |b| {
        b.iter(|| black_box(encode_sqrt_price_x96(&fractional, &whole)));
    });

    group.finish();
}

fn bench_size_position(c: &mut Criterion) {
    let mut group = c.benchmark_group("size_position");

    let pool = PoolState {
        address: generate_random_address(),
        tick: -16_096,
        tick_spacing: 10,
        fee: 500,
        sqrt_price_x96: U256::from_str("35431911422859142059220343232").unwrap(),
        liquidity: 0,
    };
    let token_a = generate_token("AAA");
    let token_b = generate_token("BBB");

    for width in [2u32, 20, 200] {
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, width| {
            let request = PositionRequest {
                chain_id: 84_532,
                pool: &pool,
                token0: &token_a,
                token1: &token_b,
                input_token0_amount: "1000000",
                width: TickWidth::new(*width).unwrap(),
            };
            b.iter(|| black_box(size_position(&request)));
        });
    }

    group.finish();
}

fn bench_encode_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_path");

    for hops in [1usize, 2, 4] {
        group.bench_with_input(BenchmarkId::from_parameter(hops), &hops, |b, hops| {
            b.iter_batched(
                || {
                    let tokens: Vec<Address> = (0..=*hops).map(|_| generate_random_address()).collect();
                    let fees: Vec<FeeTier> = (0..*hops)
                        .map(|_| FeeTier::ALL[fastrand::usize(..FeeTier::ALL.len())])
                        .collect();
                    (tokens, fees)
                },
                |(tokens, fees)| black_box(encode_path(&tokens, &fees, true)),
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_encode_price, bench_size_position, bench_encode_path);
criterion_main!(benches);
