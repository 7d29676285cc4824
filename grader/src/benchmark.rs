use std::hint::black_box;
use std::time::{Duration, Instant};

/// Primes generated by the rating benchmark.
pub const PRIME_COUNT: usize = 20_000;

/// Relative single-core speed of this node, reported to the master:
/// `1_000_000 / ms` spent generating the first [`PRIME_COUNT`] primes.
pub fn performance_rating() -> f64 {
    let started = Instant::now();
    black_box(first_primes(black_box(PRIME_COUNT)));
    rating_for(started.elapsed())
}

pub fn rating_for(elapsed: Duration) -> f64 {
    let ms = elapsed.as_millis().max(1);
    1_000_000.0 / ms as f64
}

/// First `count` primes by trial division against the primes found so far.
pub fn first_primes(count: usize) -> Vec<u64> {
    let mut primes: Vec<u64> = Vec::with_capacity(count);
    let mut candidate = 2u64;
    while primes.len() < count {
        let is_prime = primes
            .iter()
            .take_while(|&&p| p * p <= candidate)
            .all(|&p| candidate % p != 0);
        if is_prime {
            primes.push(candidate);
        }
        candidate += 1;
    }
    primes
}
