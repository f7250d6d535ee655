//! Marble engine asset toolkit CLI.
//!
//! A command-line tool for working with MBL archives and PRS images.
//!
//! # Features
//!
//! - **extract**: Unpack an MBL archive into a directory plus `index.json`
//! - **pack**: Rebuild a byte-compatible archive from a directory and its
//!   `index.json`
//! - **decode-image**: Convert every `.prs` image in a directory to `.png`
//! - **encode-image**: Convert every `.png` in a directory to `.prs`
//! - **verify-image**: Validate PRS encoder/decoder round-trip accuracy
//!
//! Script-bearing archives prompt for a decryption key from the
//! `gamekeys.json` catalogue, which is seeded on first use and free to edit.
//!
//! # Usage
//!
//! ```bash
//! # Extract an archive (prompts for a key when scripts are present)
//! marble_utils extract mg_data.mbl extracted/
//!
//! # Rebuild it from the extraction directory
//! marble_utils pack extracted/ mg_data.mbl
//!
//! # Image conversion, both directions
//! marble_utils decode-image extracted/ png/
//! marble_utils encode-image png/ prs/
//!
//! # Round-trip check a single image
//! marble_utils verify-image extracted/ev_yuko_01.prs
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use image::{ImageBuffer, RgbImage, RgbaImage};
use inquire::{Select, Text};
use log::{error, info, warn};
use marble_rs::file::io::encode_sjis;
use marble_rs::file::mbl::{self, Manifest};
use marble_rs::file::prs;
use walkdir::WalkDir;

/// Key catalogue file kept next to the working directory
const GAME_KEYS_FILE: &str = "gamekeys.json";

#[derive(Parser)]
#[command(name = "marble_utils")]
#[command(author = "marble-rs project")]
#[command(version)]
#[command(about = "Marble engine asset toolkit - MBL archives and PRS images", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Extract an MBL archive into a directory and write its manifest
	Extract {
		/// Input archive path
		#[arg(value_name = "ARCHIVE")]
		archive: PathBuf,

		/// Output directory for members and index.json
		#[arg(value_name = "OUT_DIR")]
		out_dir: PathBuf,

		/// Show verbose output
		#[arg(short, long)]
		verbose: bool,
	},

	/// Rebuild an archive from a directory and its index.json
	Pack {
		/// Input directory holding members and index.json
		#[arg(value_name = "IN_DIR")]
		in_dir: PathBuf,

		/// Output archive path
		#[arg(value_name = "ARCHIVE")]
		archive: PathBuf,

		/// Show verbose output
		#[arg(short, long)]
		verbose: bool,
	},

	/// Decode every .prs image in a directory to .png
	DecodeImage {
		/// Directory containing .prs files
		#[arg(value_name = "IN_DIR")]
		in_dir: PathBuf,

		/// Output directory for .png files
		#[arg(value_name = "OUT_DIR")]
		out_dir: PathBuf,

		/// Show verbose output
		#[arg(short, long)]
		verbose: bool,
	},

	/// Encode every .png in a directory to the native image format
	EncodeImage {
		/// Directory containing .png files
		#[arg(value_name = "IN_DIR")]
		in_dir: PathBuf,

		/// Output directory for .prs files
		#[arg(value_name = "OUT_DIR")]
		out_dir: PathBuf,

		/// Show verbose output
		#[arg(short, long)]
		verbose: bool,
	},

	/// Verify PRS encoder/decoder round-trip accuracy for one image
	VerifyImage {
		/// Input .prs file path
		#[arg(value_name = "INPUT")]
		input: PathBuf,

		/// Show verbose output
		#[arg(short, long)]
		verbose: bool,
	},
}

fn main() -> Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();
	match cli.command {
		Commands::Extract {
			archive,
			out_dir,
			verbose,
		} => handle_extract(archive, out_dir, verbose),

		Commands::Pack {
			in_dir,
			archive,
			verbose,
		} => handle_pack(in_dir, archive, verbose),

		Commands::DecodeImage {
			in_dir,
			out_dir,
			verbose,
		} => handle_decode_image(in_dir, out_dir, verbose),

		Commands::EncodeImage {
			in_dir,
			out_dir,
			verbose,
		} => handle_encode_image(in_dir, out_dir, verbose),

		Commands::VerifyImage {
			input,
			verbose,
		} => handle_verify_image(input, verbose),
	}
}

/// Known key catalogue seeded on first use. Keys are the text the engine
/// derives its cipher stream from, encoded to Shift-JIS when applied.
fn default_game_keys() -> BTreeMap<String, String> {
	BTreeMap::from([("Jokyoushi Yuuko".to_string(), "女教師ゆうこ1968".to_string())])
}

/// Loads `gamekeys.json`, writing the default catalogue first if it is
/// missing.
fn load_game_keys() -> Result<BTreeMap<String, String>> {
	let path = Path::new(GAME_KEYS_FILE);
	if !path.exists() {
		let seeded = default_game_keys();
		let json = serde_json::to_string_pretty(&seeded)?;
		fs::write(path, json)
			.with_context(|| format!("cannot seed key catalogue at {GAME_KEYS_FILE}"))?;
		info!("seeded key catalogue at {GAME_KEYS_FILE}");
		return Ok(seeded);
	}

	let text = fs::read_to_string(path)
		.with_context(|| format!("cannot read key catalogue {GAME_KEYS_FILE}"))?;
	serde_json::from_str(&text)
		.with_context(|| format!("malformed key catalogue {GAME_KEYS_FILE}"))
}

/// Asks the user which key to decrypt scripts with
fn prompt_key() -> Result<Vec<u8>> {
	const NO_KEY: &str = "(no encryption)";
	const MANUAL: &str = "(enter key manually)";

	let catalogue = load_game_keys()?;

	let mut options = vec![NO_KEY.to_string()];
	options.extend(catalogue.keys().cloned());
	options.push(MANUAL.to_string());

	let choice = Select::new("Select the game key for script members:", options)
		.prompt()
		.context("key selection aborted")?;

	let literal = match choice.as_str() {
		NO_KEY => return Ok(Vec::new()),
		MANUAL => Text::new("Key text:").prompt().context("key entry aborted")?,
		name => catalogue[name].clone(),
	};

	Ok(encode_sjis(&literal))
}

/// Handle extract command
fn handle_extract(archive_path: PathBuf, out_dir: PathBuf, verbose: bool) -> Result<()> {
	let archive = mbl::File::open(&archive_path)
		.with_context(|| format!("cannot open archive {}", archive_path.display()))?;

	info!(
		"{}: {} layout, {} members, name field {} bytes",
		archive_path.display(),
		archive.version(),
		archive.entries().len(),
		archive.filename_length()
	);

	let script_bearing =
		archive.is_script_archive() || archive.entries().iter().any(mbl::Entry::is_script);
	let key = if script_bearing {
		prompt_key()?
	} else {
		Vec::new()
	};

	if verbose {
		print!("{archive}");
	}

	fs::create_dir_all(&out_dir)
		.with_context(|| format!("cannot create {}", out_dir.display()))?;

	let mut extracted = 0usize;
	for entry in archive.entries() {
		info!(
			"  {} @ {:#010X}, {} bytes{}",
			entry.name(),
			entry.offset(),
			entry.size(),
			if archive.is_script(entry) { " [script]" } else { "" }
		);

		let data = match archive.read_member(entry, &key) {
			Ok(data) => data,
			Err(e) => {
				error!("skipping {}: {}", entry.name(), e);
				continue;
			}
		};

		let output_path = out_dir.join(entry.name());
		if let Some(parent) = output_path.parent() {
			if let Err(e) = fs::create_dir_all(parent) {
				error!("skipping {}: {}", entry.name(), e);
				continue;
			}
		}
		if let Err(e) = fs::write(&output_path, &data) {
			error!("skipping {}: {}", entry.name(), e);
			continue;
		}

		extracted += 1;
	}

	let manifest = archive.manifest(&key);
	let manifest_path = out_dir.join(Manifest::FILE_NAME);
	manifest
		.save(&manifest_path)
		.with_context(|| format!("cannot write {}", manifest_path.display()))?;

	println!(
		"✓ Extracted {} -> {} ({}/{} members, manifest {})",
		archive_path.display(),
		out_dir.display(),
		extracted,
		archive.entries().len(),
		manifest_path.display()
	);

	Ok(())
}

/// Handle pack command
fn handle_pack(in_dir: PathBuf, archive_path: PathBuf, verbose: bool) -> Result<()> {
	let manifest_path = in_dir.join(Manifest::FILE_NAME);
	let manifest = Manifest::load(&manifest_path)
		.with_context(|| format!("cannot load manifest {}", manifest_path.display()))?;
	let key = manifest.key_bytes().context("manifest key is not valid hex")?;

	if verbose {
		println!("   layout {}, {} members", manifest.version, manifest.files.len());
	}

	let mut builder = mbl::Builder::new(manifest.version);
	builder.key(key).for_archive_path(&archive_path);

	for name in &manifest.files {
		let member_path = in_dir.join(name);
		let data = fs::read(&member_path).with_context(|| {
			format!("manifest lists '{}' but {} is missing", name, member_path.display())
		})?;

		if verbose {
			println!("   + {} ({} bytes)", name, data.len());
		}
		builder.add_member(name.clone(), data);
	}

	let bytes = builder
		.build()
		.with_context(|| format!("cannot lay out archive {}", archive_path.display()))?;
	fs::write(&archive_path, &bytes)
		.with_context(|| format!("cannot write {}", archive_path.display()))?;

	println!(
		"✓ Packed {} -> {} ({} members, {} bytes)",
		in_dir.display(),
		archive_path.display(),
		manifest.files.len(),
		bytes.len()
	);

	Ok(())
}

/// Top-level files in `dir` carrying the wanted extension
fn files_with_extension(dir: &Path, extension: &str) -> Vec<PathBuf> {
	WalkDir::new(dir)
		.max_depth(1)
		.into_iter()
		.filter_map(|entry| entry.ok())
		.filter(|entry| entry.file_type().is_file())
		.map(|entry| entry.into_path())
		.filter(|path| {
			path.extension()
				.map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
				.unwrap_or(false)
		})
		.collect()
}

/// Writes a decoded image as PNG, honoring the dummy-alpha heuristic
fn save_png(file: prs::File, path: &Path) -> Result<()> {
	let width = u32::from(file.header().width());
	let height = u32::from(file.header().height());

	if file.has_alpha() {
		let img: RgbaImage = ImageBuffer::from_raw(width, height, file.into_pixels())
			.context("pixel buffer does not match image dimensions")?;
		img.save(path)?;
	} else if file.header().depth() == 4 {
		// Constant filler alpha: export three channels
		let rgb: Vec<u8> = file
			.into_pixels()
			.chunks_exact(4)
			.flat_map(|pixel| pixel[..3].to_vec())
			.collect();
		let img: RgbImage = ImageBuffer::from_raw(width, height, rgb)
			.context("pixel buffer does not match image dimensions")?;
		img.save(path)?;
	} else {
		let img: RgbImage = ImageBuffer::from_raw(width, height, file.into_pixels())
			.context("pixel buffer does not match image dimensions")?;
		img.save(path)?;
	}

	Ok(())
}

/// Handle decode-image command
fn handle_decode_image(in_dir: PathBuf, out_dir: PathBuf, verbose: bool) -> Result<()> {
	let inputs = files_with_extension(&in_dir, "prs");
	if inputs.is_empty() {
		warn!("no .prs files under {}", in_dir.display());
	}

	fs::create_dir_all(&out_dir)
		.with_context(|| format!("cannot create {}", out_dir.display()))?;

	let mut converted = 0usize;
	for input in &inputs {
		let output = out_dir.join(input.file_stem().unwrap_or_default()).with_extension("png");

		let result = prs::File::open(input)
			.map_err(anyhow::Error::from)
			.and_then(|file| {
				if verbose {
					println!(
						"   {} {}x{} depth {} flag {:#04X}{}",
						input.display(),
						file.header().width(),
						file.header().height(),
						file.header().depth(),
						file.header().flag(),
						if file.dummy_alpha() { " [dummy alpha]" } else { "" }
					);
				}
				save_png(file, &output)
			});

		match result {
			Ok(()) => {
				info!("decoded {} -> {}", input.display(), output.display());
				converted += 1;
			}
			Err(e) => error!("failed to decode {}: {:#}", input.display(), e),
		}
	}

	println!(
		"✓ Decoded {}/{} images from {} into {}",
		converted,
		inputs.len(),
		in_dir.display(),
		out_dir.display()
	);

	Ok(())
}

/// Loads a PNG and encodes it, 32-bit input selecting the delta flag and a
/// 4-byte pixel, 24-bit input a plain 3-byte pixel
fn encode_png(input: &Path, output: &Path) -> Result<()> {
	let img = image::open(input).with_context(|| format!("cannot open {}", input.display()))?;

	let (width, height) = (img.width(), img.height());
	if width > u16::MAX.into() || height > u16::MAX.into() {
		bail!("image is {}x{}, larger than the format's 16-bit geometry", width, height);
	}

	let compressed = if img.color().has_alpha() {
		let pixels = img.to_rgba8().into_raw();
		prs::compress(&pixels, width as u16, height as u16, 4, 0x80)?
	} else {
		let pixels = img.to_rgb8().into_raw();
		prs::compress(&pixels, width as u16, height as u16, 3, 0x00)?
	};

	fs::write(output, &compressed)
		.with_context(|| format!("cannot write {}", output.display()))?;
	Ok(())
}

/// Handle encode-image command
fn handle_encode_image(in_dir: PathBuf, out_dir: PathBuf, verbose: bool) -> Result<()> {
	let inputs = files_with_extension(&in_dir, "png");
	if inputs.is_empty() {
		warn!("no .png files under {}", in_dir.display());
	}

	fs::create_dir_all(&out_dir)
		.with_context(|| format!("cannot create {}", out_dir.display()))?;

	let mut converted = 0usize;
	for input in &inputs {
		let output = out_dir.join(input.file_stem().unwrap_or_default()).with_extension("prs");

		match encode_png(input, &output) {
			Ok(()) => {
				if verbose {
					println!("   {} -> {}", input.display(), output.display());
				}
				info!("encoded {} -> {}", input.display(), output.display());
				converted += 1;
			}
			Err(e) => error!("failed to encode {}: {:#}", input.display(), e),
		}
	}

	println!(
		"✓ Encoded {}/{} images from {} into {}",
		converted,
		inputs.len(),
		in_dir.display(),
		out_dir.display()
	);

	Ok(())
}

/// Handle verify-image command
fn handle_verify_image(input: PathBuf, verbose: bool) -> Result<()> {
	let original_data =
		fs::read(&input).with_context(|| format!("cannot read {}", input.display()))?;
	let original = prs::File::from_bytes(&original_data)
		.with_context(|| format!("cannot decode {}", input.display()))?;

	if verbose {
		println!("{}", original.header());
	}

	let reencoded_data = prs::compress_file(&original)?;
	let reencoded = prs::File::from_bytes(&reencoded_data)?;

	if original.pixels() != reencoded.pixels() {
		let differing = original
			.pixels()
			.iter()
			.zip(reencoded.pixels())
			.filter(|(a, b)| a != b)
			.count();
		bail!(
			"round-trip mismatch for {}: {} of {} bytes differ",
			input.display(),
			differing,
			original.pixels().len()
		);
	}

	println!(
		"✓ Verification PASSED for {} ({}x{}, {} -> {} compressed bytes)",
		input.display(),
		original.header().width(),
		original.header().height(),
		original_data.len(),
		reencoded_data.len()
	);
	if verbose && original_data.len() != reencoded_data.len() {
		println!(
			"   note: size differences are expected; only the decoded pixels must match"
		);
	}

	Ok(())
}
