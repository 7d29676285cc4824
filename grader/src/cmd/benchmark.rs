use std::time::Instant;

use tracing::info;

use crate::benchmark::{self, PRIME_COUNT};

/// Run the rating benchmark once and print the result.
pub fn run_benchmark() {
    let started = Instant::now();
    let rating = benchmark::performance_rating();
    info!(
        primes = PRIME_COUNT,
        elapsed_ms = started.elapsed().as_millis(),
        "benchmark complete"
    );
    println!("{rating:.3}");
}
