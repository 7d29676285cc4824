mod benchmark;
mod start;

pub use benchmark::run_benchmark;
pub use start::{StartArgs, run_start};
