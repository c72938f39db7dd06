//! # Sieve — Prime Table Generation
//!
//! Builds the ordered list of primes ≤ k used by every other module in the
//! search: `fastmod` builds one reciprocal per entry, `tile` strips them out
//! of each candidate's residual, `epoch` keeps them immutable for the
//! duration of one k.
//!
//! A plain sieve of Eratosthenes is used rather than a wheel. k is the
//! trial-division bound, not the candidate range — for any feasible K the
//! sieve limit is at most a few thousand, where the wheel's extra
//! bookkeeping buys nothing over the straightforward `O(n log log n)` sieve.

/// Generate all primes in `[2, limit]` in ascending order.
///
/// Returns an empty vector for `limit < 2` (in particular for k=1, where the
/// search degenerates to "every integer ≥ 2 is already non-smooth").
pub fn primes_upto(limit: u64) -> Vec<u64> {
    if limit < 2 {
        return Vec::new();
    }
    let limit = limit as usize;
    let mut is_prime = vec![true; limit + 1];
    is_prime[0] = false;
    is_prime[1] = false;

    let sqrt_limit = (limit as f64).sqrt() as usize + 1;
    for p in 2..=sqrt_limit {
        if is_prime[p] {
            let mut m = p * p;
            while m <= limit {
                is_prime[m] = false;
                m += p;
            }
        }
    }

    is_prime
        .iter()
        .enumerate()
        .filter_map(|(n, &prime)| prime.then_some(n as u64))
        .collect()
}
