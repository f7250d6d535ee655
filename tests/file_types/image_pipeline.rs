//! PNG <-> PRS pipeline tests, the way the CLI drives the codec.

use image::{ImageBuffer, Rgb, RgbImage, Rgba, RgbaImage};
use marble_rs::file::prs;

#[test]
fn png_to_prs_to_png_preserves_rgb_pixels() {
	let width = 24u32;
	let height = 12u32;
	let img: RgbImage = ImageBuffer::from_fn(width, height, |x, y| {
		Rgb([(x * 10) as u8, (y * 20) as u8, ((x + y) % 7) as u8 * 30])
	});

	let dir = tempfile::tempdir().unwrap();
	let png_path = dir.path().join("input.png");
	img.save(&png_path).unwrap();

	// Encode the way the CLI does for 24-bit input
	let loaded = image::open(&png_path).unwrap();
	assert!(!loaded.color().has_alpha());
	let pixels = loaded.to_rgb8().into_raw();
	let compressed = prs::compress(&pixels, width as u16, height as u16, 3, 0x00).unwrap();

	let decoded = prs::File::from_bytes(&compressed).unwrap();
	assert_eq!(decoded.header().width(), width as u16);
	assert_eq!(decoded.header().height(), height as u16);
	assert_eq!(decoded.pixels(), pixels);
}

#[test]
fn png_with_alpha_round_trips_through_delta_mode() {
	let width = 16u32;
	let height = 16u32;
	let img: RgbaImage = ImageBuffer::from_fn(width, height, |x, y| {
		Rgba([(x * 16) as u8, (y * 16) as u8, 0x40, if x < 8 { 0xFF } else { 0x20 }])
	});

	let pixels = img.into_raw();
	// 32-bit input selects a 4-byte pixel and the delta flag
	let compressed = prs::compress(&pixels, width as u16, height as u16, 4, 0x80).unwrap();

	let decoded = prs::File::from_bytes(&compressed).unwrap();
	assert!(decoded.has_alpha());
	assert_eq!(decoded.pixels(), pixels);
}

#[test]
fn dummy_alpha_image_exports_three_channels() {
	let width = 8u32;
	let height = 8u32;
	let img: RgbaImage = ImageBuffer::from_fn(width, height, |x, y| {
		Rgba([x as u8 * 30, y as u8 * 30, 0x55, 0x80])
	});

	let pixels = img.into_raw();
	let compressed = prs::compress(&pixels, width as u16, height as u16, 4, 0x80).unwrap();
	let decoded = prs::File::from_bytes(&compressed).unwrap();

	// Constant non-opaque alpha collapses to an RGB export
	assert!(decoded.dummy_alpha());
	assert!(!decoded.has_alpha());

	let rgb: Vec<u8> =
		decoded.pixels().chunks_exact(4).flat_map(|px| px[..3].to_vec()).collect();
	let expected: Vec<u8> =
		pixels.chunks_exact(4).flat_map(|px| px[..3].to_vec()).collect();
	assert_eq!(rgb, expected);
}
