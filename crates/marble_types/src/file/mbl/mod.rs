//! MBL archive container support.
//!
//! MBL archives pack the engine's assets behind a flat index that shipped in
//! three revisions. All of them start with a member count; v3 follows it with
//! the width of the name field, while v1 and v2 jump straight into
//! fixed-width records (0x10 and 0x38 bytes of name respectively). The three
//! layouts are not self-describing, so readers validate a whole candidate
//! index before accepting a revision.
//!
//! Script members (the archive stem ends `_data`, or the member name ends
//! `.s`) are stored XOR-encrypted with a per-game key.

mod read;
mod write;

pub mod manifest;


use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::file::{FileType, MarbleError, crypt};

pub use manifest::Manifest;
pub use write::Builder;

mod constants {
	/// Largest believable member count in an archive header
	pub const MAX_SANE_COUNT: u32 = 0xFF_FFFF;

	/// Widest name field a v3 header may declare
	pub const MAX_NAME_LEN: usize = 0xFF;

	/// Fixed name-field widths of the two legacy layouts
	pub const V1_NAME_LEN: usize = 0x10;
	pub const V2_NAME_LEN: usize = 0x38;

	/// Zero bytes between the index and the first payload (v1/v2 only)
	pub const INDEX_PADDING: usize = 4;
}

/// Archive layout revisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Version {
	/// 0x10-byte name field, no name-length word
	V1,
	/// 0x38-byte name field, no name-length word
	V2,
	/// Variable name field, width stored in the header
	V3,
}

impl Version {
	/// Name-field width baked into the layout, `None` for v3
	pub fn fixed_name_length(&self) -> Option<usize> {
		match self {
			Version::V1 => Some(constants::V1_NAME_LEN),
			Version::V2 => Some(constants::V2_NAME_LEN),
			Version::V3 => None,
		}
	}

	/// Bytes before the first index record
	pub fn header_size(&self) -> usize {
		match self {
			Version::V1 | Version::V2 => 4,
			Version::V3 => 8,
		}
	}

	/// Whether the layout pads between the index and the payloads
	pub fn has_index_padding(&self) -> bool {
		!matches!(self, Version::V3)
	}
}

impl std::fmt::Display for Version {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Version::V1 => write!(f, "v1"),
			Version::V2 => write!(f, "v2"),
			Version::V3 => write!(f, "v3"),
		}
	}
}

/// A single member record from the archive index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
	name: String,
	offset: u32,
	size: u32,
}

impl Entry {
	/// Member name in extracted form: lowercase, `base.ext`
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Payload offset from the start of the archive
	pub fn offset(&self) -> u32 {
		self.offset
	}

	/// Payload size in bytes
	pub fn size(&self) -> u32 {
		self.size
	}

	/// Whether this member is a script by its own name
	pub fn is_script(&self) -> bool {
		self.name.to_ascii_lowercase().ends_with(".s")
	}
}

impl std::fmt::Display for Entry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"Entry {{ name: '{}', offset: {}, size: {} }}",
			self.name, self.offset, self.size
		)
	}
}

/// Whether an archive path marks every member as a script
pub fn is_data_archive(path: impl AsRef<Path>) -> bool {
	path.as_ref()
		.file_stem()
		.map(|stem| stem.to_string_lossy().to_ascii_lowercase().ends_with("_data"))
		.unwrap_or(false)
}

/// An opened MBL archive: the full file bytes plus the parsed index
#[derive(Debug, Clone)]
pub struct File {
	version: Version,
	filename_length: usize,
	entries: Vec<Entry>,
	data: Vec<u8>,
	script_archive: bool,
}

impl File {
	/// Opens and parses an archive from the specified path.
	///
	/// The file name decides the script policy: a stem ending `_data` marks
	/// every member as encrypted.
	pub fn open(path: impl AsRef<Path>) -> Result<Self, MarbleError> {
		let script_archive = is_data_archive(&path);
		let data = std::fs::read(path)?;
		Self::from_bytes(data, script_archive)
	}

	/// Parses an archive held in memory
	pub fn from_bytes(data: Vec<u8>, script_archive: bool) -> Result<Self, MarbleError> {
		let index = read::parse(&data)?;

		Ok(Self {
			version: index.version,
			filename_length: index.filename_length,
			entries: index.entries,
			data,
			script_archive,
		})
	}

	/// Returns the detected layout revision
	pub fn version(&self) -> Version {
		self.version
	}

	/// Width of the on-disk name field
	pub fn filename_length(&self) -> usize {
		self.filename_length
	}

	/// Returns a reference to the parsed index entries
	pub fn entries(&self) -> &[Entry] {
		&self.entries
	}

	/// Whether the archive name marks all members as scripts
	pub fn is_script_archive(&self) -> bool {
		self.script_archive
	}

	/// Whether a member is stored encrypted
	pub fn is_script(&self, entry: &Entry) -> bool {
		self.script_archive || entry.is_script()
	}

	/// Reads one member, decrypting scripts with `key`.
	///
	/// Non-script members come back verbatim; so do scripts when the key is
	/// empty.
	pub fn read_member(&self, entry: &Entry, key: &[u8]) -> Result<Vec<u8>, MarbleError> {
		let start = entry.offset as usize;
		let end = start + entry.size as usize;
		let raw = self.data.get(start..end).ok_or_else(|| {
			MarbleError::malformed_archive(
				FileType::Mbl,
				format!("member '{}' reaches past the end of the archive", entry.name),
			)
		})?;

		if self.is_script(entry) {
			Ok(crypt::xor(raw, key))
		} else {
			Ok(raw.to_vec())
		}
	}

	/// Builds the manifest describing this archive for later repacking
	pub fn manifest(&self, key: &[u8]) -> Manifest {
		Manifest::new(
			self.version,
			key,
			self.entries.iter().map(|entry| entry.name.clone()).collect(),
		)
	}
}

impl std::fmt::Display for File {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		writeln!(
			f,
			"MBL {} archive, {} members, name field {} bytes",
			self.version,
			self.entries.len(),
			self.filename_length
		)?;
		for entry in &self.entries {
			writeln!(f, "  {}", entry)?;
		}
		Ok(())
	}
}
