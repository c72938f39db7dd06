use block_prime_gap::fastmod::FastModEntry;
use block_prime_gap::tile::{self, WorkerScratch};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_fastmod_apply(c: &mut Criterion) {
    let entry = FastModEntry::build(97);
    c.bench_function("FastModEntry::apply(p=97)", |b| {
        b.iter(|| entry.apply(black_box(123_456_789_u64)));
    });
}

fn bench_fastmod_divide_if_divisible(c: &mut Criterion) {
    let entry = FastModEntry::build(97);
    c.bench_function("FastModEntry::divide_if_divisible(p=97)", |b| {
        b.iter(|| {
            let mut n = black_box(97u64 * 97 * 97 * 5);
            while entry.divide_if_divisible(&mut n) {}
            n
        });
    });
}

fn bench_sieve_tile_k200(c: &mut Criterion) {
    let k = 200u64;
    let tile_len = 65_536usize;
    let primes = block_prime_gap::sieve::primes_upto(k);
    let fastmod: Vec<_> = primes.iter().map(|&p| FastModEntry::build(p)).collect();
    let step_mod: Vec<u64> = fastmod
        .iter()
        .map(|e| e.modulo(tile_len as u64))
        .collect();

    c.bench_function("sieve_tile(k=200, tile_len=65536)", |b| {
        b.iter_batched(
            || {
                let mut off = Vec::new();
                tile::init_offsets(0, &primes, &fastmod, &mut off);
                (off, WorkerScratch::new())
            },
            |(mut off, mut scratch)| {
                tile::sieve_tile(
                    black_box(0),
                    black_box(tile_len + k as usize),
                    &primes,
                    &fastmod,
                    &mut off,
                    &step_mod,
                    &mut scratch,
                );
                scratch
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_fastmod_apply,
    bench_fastmod_divide_if_divisible,
    bench_sieve_tile_k200,
);
criterion_main!(benches);
