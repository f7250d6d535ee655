//! Benchmark suite for PRS image decoding
//!
//! This benchmark measures the performance of PRS decompression over
//! synthetic images with different compressibility profiles.
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use marble_types::file::prs;
use std::hint::black_box;

/// Flat-color frame: long back-references dominate the stream
fn solid_image(width: u16, height: u16) -> Vec<u8> {
	let pixels = vec![0x5A; usize::from(width) * usize::from(height) * 3];
	prs::compress(&pixels, width, height, 3, 0).unwrap()
}

/// Smooth gradient: the delta predictor flattens it to near-constant bytes
fn gradient_image(width: u16, height: u16) -> Vec<u8> {
	let mut pixels = Vec::with_capacity(usize::from(width) * usize::from(height) * 3);
	for y in 0..height {
		for x in 0..width {
			pixels.push((x % 256) as u8);
			pixels.push((y % 256) as u8);
			pixels.push(((usize::from(x) + usize::from(y)) % 256) as u8);
		}
	}
	prs::compress(&pixels, width, height, 3, 0x80).unwrap()
}

/// Pseudo-noise: literals and verbatim runs dominate the stream
fn noisy_image(width: u16, height: u16) -> Vec<u8> {
	let total = usize::from(width) * usize::from(height) * 3;
	let mut value = 0x1234_5678u32;
	let mut pixels = Vec::with_capacity(total);
	for _ in 0..total {
		value = value.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
		pixels.push((value >> 24) as u8);
	}
	prs::compress(&pixels, width, height, 3, 0).unwrap()
}

fn bench_decompress(c: &mut Criterion) {
	let mut group = c.benchmark_group("prs_decompress");

	let cases = vec![
		("solid", solid_image(256, 256)),
		("gradient", gradient_image(256, 256)),
		("noise", noisy_image(256, 256)),
	];

	for (name, data) in cases {
		let raw_len = 256 * 256 * 3;
		group.throughput(Throughput::Bytes(raw_len as u64));
		group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
			b.iter(|| {
				let file = prs::decompress(black_box(data)).unwrap();
				black_box(file.pixels().len())
			});
		});
	}

	group.finish();
}

criterion_group!(benches, bench_decompress);
criterion_main!(benches);
