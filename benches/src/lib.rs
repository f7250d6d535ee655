//! Benchmark crate for marble-rs.
//!
//! The actual benchmarks live under `benches/`; run them with
//! `cargo bench --manifest-path benches/Cargo.toml`.
