use block_prime_gap::sieve;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_primes_upto_1k(c: &mut Criterion) {
    c.bench_function("primes_upto(1_000)", |b| {
        b.iter(|| sieve::primes_upto(black_box(1_000)));
    });
}

fn bench_primes_upto_100k(c: &mut Criterion) {
    c.bench_function("primes_upto(100_000)", |b| {
        b.iter(|| sieve::primes_upto(black_box(100_000)));
    });
}

criterion_group!(benches, bench_primes_upto_1k, bench_primes_upto_100k);
criterion_main!(benches);
