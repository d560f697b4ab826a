//! Benchmark suite for BN/SF sprite encoding and decoding
//!
//! This benchmark measures the pointer-tree walk of the BN decoder, the
//! sprite interning of the SF encoder and the palette merge between them.
//!
//! Run with: cargo bench --manifest-path benches/Cargo.toml
//!
//! For flamegraph profiling:
//! cargo bench --manifest-path benches/Cargo.toml -- --profile-time=5

use bnsprite_benches::{generate_test_sprite, sizes};
use bnsprite_types::file::sprite::SpriteDocument;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

fn sized_sprites() -> Vec<(&'static str, SpriteDocument)> {
	[("small", sizes::SMALL), ("medium", sizes::MEDIUM), ("large", sizes::LARGE)]
		.into_iter()
		.map(|(name, (animations, frames, objects))| (name, generate_test_sprite(animations, frames, objects)))
		.collect()
}

fn sf_ready(sprite: &SpriteDocument) -> SpriteDocument {
	let mut sprite = sprite.clone();
	sprite.convert_bn_to_sf().unwrap();
	sprite
}

/// Benchmark BN decoding
fn bench_bn_decode(c: &mut Criterion) {
	let mut group = c.benchmark_group("bn_decode");

	for (name, sprite) in sized_sprites() {
		let data = sprite.to_bn_bytes().unwrap();
		group.throughput(Throughput::Bytes(data.len() as u64));
		group.bench_with_input(BenchmarkId::new("decode", name), &data, |b, data| {
			b.iter(|| {
				let result = SpriteDocument::from_bn_bytes(black_box(data));
				black_box(result)
			});
		});
	}

	group.finish();
}

/// Benchmark BN encoding, including validation
fn bench_bn_encode(c: &mut Criterion) {
	let mut group = c.benchmark_group("bn_encode");

	for (name, sprite) in sized_sprites() {
		group.throughput(Throughput::Elements(sprite.frame_count() as u64));
		group.bench_with_input(BenchmarkId::new("encode", name), &sprite, |b, sprite| {
			b.iter(|| black_box(sprite).to_bn_bytes());
		});
	}

	group.finish();
}

/// Benchmark SF decoding
fn bench_sf_decode(c: &mut Criterion) {
	let mut group = c.benchmark_group("sf_decode");

	for (name, sprite) in sized_sprites() {
		let data = sf_ready(&sprite).to_sf_bytes().unwrap();
		group.throughput(Throughput::Bytes(data.len() as u64));
		group.bench_with_input(BenchmarkId::new("decode", name), &data, |b, data| {
			b.iter(|| {
				let result = SpriteDocument::from_sf_bytes(black_box(data));
				black_box(result)
			});
		});
	}

	group.finish();
}

/// Benchmark SF encoding, dominated by sprite interning
fn bench_sf_encode(c: &mut Criterion) {
	let mut group = c.benchmark_group("sf_encode");

	for (name, sprite) in sized_sprites() {
		let sprite = sf_ready(&sprite);
		group.throughput(Throughput::Elements(sprite.frame_count() as u64));
		group.bench_with_input(BenchmarkId::new("encode", name), &sprite, |b, sprite| {
			b.iter(|| black_box(sprite).to_sf_bytes());
		});
	}

	group.finish();
}

/// Benchmark the palette group merge run before SF output
fn bench_convert(c: &mut Criterion) {
	let mut group = c.benchmark_group("convert");
	let (animations, frames, objects) = sizes::LARGE;
	let sprite = generate_test_sprite(animations, frames, objects);

	group.bench_function("bn_to_sf", |b| {
		b.iter(|| {
			let mut sprite = black_box(&sprite).clone();
			let result = sprite.convert_bn_to_sf();
			black_box((sprite, result))
		});
	});

	group.finish();
}

/// Benchmark a decode-edit-encode cycle
fn bench_realistic_workload(c: &mut Criterion) {
	let mut group = c.benchmark_group("realistic");
	let (animations, frames, objects) = sizes::MEDIUM;
	let data = generate_test_sprite(animations, frames, objects).to_bn_bytes().unwrap();

	group.bench_function("open_duplicate_save", |b| {
		b.iter(|| {
			let mut sprite = SpriteDocument::from_bn_bytes(black_box(&data)).unwrap();
			sprite.duplicate_animation(0).unwrap();
			sprite.set_animation_loop(0, true).unwrap();
			black_box(sprite.to_bn_bytes())
		});
	});

	group.finish();

	// Print summary statistics
	println!("\n=== Benchmark Summary ===");
	println!("Sprite: {animations} animations x {frames} frames x {objects} objects");
	println!("BN size: {} bytes", data.len());
}

criterion_group!(
	benches,
	bench_bn_decode,
	bench_bn_encode,
	bench_sf_decode,
	bench_sf_encode,
	bench_convert,
	bench_realistic_workload,
);

criterion_main!(benches);
