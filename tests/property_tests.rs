//! Property-based tests for block-prime-gap's mathematical primitives.
//!
//! These tests use the `proptest` framework to verify mathematical invariants
//! hold across many randomly generated inputs, rather than checking a
//! handful of known values.
//!
//! # How to run
//!
//! ```bash
//! cargo test --test property_tests
//! PROPTEST_CASES=10000 cargo test --test property_tests
//! ```

use block_prime_gap::fastmod::FastModEntry;
use block_prime_gap::sieve::primes_upto;
use proptest::prelude::*;

// == FastMod Properties =========================================================
// FastMod replaces every hardware division in the inner sieve loop with a
// precomputed multiplicative reciprocal. These properties check it against
// the hardware operators it exists to avoid.
// ================================================================================

proptest! {
    /// `FastModEntry::apply` must match hardware `/` and `%` for any prime and
    /// any dividend in a wide range, including values that overflow a 32-bit word.
    #[test]
    fn prop_fastmod_matches_hardware_division(
        p in 2u64..5000,
        n in 0u64..10_000_000,
    ) {
        // Restrict to primes so the table the real search builds is representative;
        // skip composites rather than special-casing them.
        if !is_prime(p) {
            return Ok(());
        }
        let entry = FastModEntry::build(p);
        let (q, r) = entry.apply(n);
        prop_assert_eq!(q, n / p);
        prop_assert_eq!(r, n % p);
    }

    /// `divide_if_divisible` must leave `n` untouched whenever `p` does not divide it.
    #[test]
    fn prop_divide_if_divisible_is_a_no_op_on_failure(
        p in 2u64..1000,
        n in 1u64..1_000_000,
    ) {
        if !is_prime(p) {
            return Ok(());
        }
        let entry = FastModEntry::build(p);
        if n % p != 0 {
            let mut m = n;
            let divided = entry.divide_if_divisible(&mut m);
            prop_assert!(!divided);
            prop_assert_eq!(m, n);
        }
    }
}

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2u64;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

// == Sieve Properties ============================================================
// primes_upto underlies every other module: a wrong entry here corrupts the
// k-smoothness test for the rest of the search.
// ================================================================================

proptest! {
    /// Every value returned by `primes_upto(limit)` must itself be prime and
    /// must not exceed `limit`.
    #[test]
    fn prop_primes_upto_returns_only_primes_leq_limit(limit in 0u64..5000) {
        let primes = primes_upto(limit);
        for &p in &primes {
            prop_assert!(p <= limit);
            prop_assert!(is_prime(p), "{} returned by primes_upto({}) is not prime", p, limit);
        }
    }

    /// `primes_upto` must return every prime `<= limit`, not just a subset:
    /// cross-check the count against a trial-division reference.
    #[test]
    fn prop_primes_upto_is_exhaustive(limit in 2u64..2000) {
        let primes = primes_upto(limit);
        let reference: Vec<u64> = (2..=limit).filter(|&n| is_prime(n)).collect();
        prop_assert_eq!(primes, reference);
    }
}

// == Smoothness Invariant (via the direct definition) ===========================
// Cross-checks the sieve's "strip every prime <= k, residual 1 means smooth"
// test against the mathematical definition of k-smoothness directly, for
// values well within u64 range.
// ================================================================================

proptest! {
    /// `n` is `k`-smooth (every prime factor `<= k`) iff stripping every
    /// prime `<= k` out of `n` via `FastModEntry` leaves a residual of 1.
    #[test]
    fn prop_residual_one_iff_k_smooth(
        k in 1u64..50,
        n in 1u64..100_000,
    ) {
        let primes = primes_upto(k);
        let mut residual = n;
        for p in &primes {
            let entry = FastModEntry::build(*p);
            while entry.divide_if_divisible(&mut residual) {}
        }
        let expected = is_k_smooth(n, k);
        prop_assert_eq!(residual == 1, expected,
            "n={} k={} residual={} but is_k_smooth={}", n, k, residual, expected);
    }
}

fn is_k_smooth(n: u64, k: u64) -> bool {
    let mut r = n;
    let mut d = 2u64;
    while d <= k {
        while r % d == 0 {
            r /= d;
        }
        d += 1;
    }
    r == 1
}
