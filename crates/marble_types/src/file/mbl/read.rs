//! MBL index parsing and layout auto-detection.
//!
//! The member count at offset 0 is common to every revision, but the 4 bytes
//! after it are ambiguous: v3 stores the name-field width there, while v1/v2
//! start their first record. Detection runs trial parses (v3 first, then the
//! two fixed widths) and accepts the first candidate whose *entire* index
//! validates: decodable non-empty names, offsets past the index, payloads
//! inside the file.

use super::{Entry, Version, constants};
use crate::file::{FileType, MarbleError, io::read_fixed_string};

/// Outcome of a successful detection
#[derive(Debug)]
pub(super) struct Index {
	pub version: Version,
	pub filename_length: usize,
	pub entries: Vec<Entry>,
}

pub(super) fn parse(data: &[u8]) -> Result<Index, MarbleError> {
	if data.len() < 4 {
		return Err(MarbleError::insufficient_data(FileType::Mbl, 4, data.len()));
	}

	let count = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
	if count == 0 || count > constants::MAX_SANE_COUNT {
		return Err(MarbleError::malformed_archive(
			FileType::Mbl,
			format!("implausible member count {count}"),
		));
	}

	// v3: a believable name-field width sits where v1/v2 keep their first
	// record. Only a fully consistent index confirms the reading.
	if data.len() >= 8 {
		let filename_length =
			u32::from_le_bytes([data[4], data[5], data[6], data[7]]) as usize;
		if (1..=constants::MAX_NAME_LEN).contains(&filename_length) {
			if let Some(entries) = try_parse(data, count, 8, filename_length) {
				return Ok(Index {
					version: Version::V3,
					filename_length,
					entries,
				});
			}
		}
	}

	if let Some(entries) = try_parse(data, count, 4, constants::V1_NAME_LEN) {
		return Ok(Index {
			version: Version::V1,
			filename_length: constants::V1_NAME_LEN,
			entries,
		});
	}

	if let Some(entries) = try_parse(data, count, 4, constants::V2_NAME_LEN) {
		return Ok(Index {
			version: Version::V2,
			filename_length: constants::V2_NAME_LEN,
			entries,
		});
	}

	Err(MarbleError::malformed_archive(
		FileType::Mbl,
		"no layout produced a consistent index".to_string(),
	))
}

/// Attempts one layout. `None` as soon as any entry fails validation.
fn try_parse(
	data: &[u8],
	count: u32,
	index_offset: usize,
	filename_length: usize,
) -> Option<Vec<Entry>> {
	let count = count as usize;
	let record_size = filename_length + 8;
	let index_size = index_offset + count.checked_mul(record_size)?;
	if index_size > data.len() {
		return None;
	}

	let mut entries = Vec::with_capacity(count);
	let mut position = index_offset;

	for _ in 0..count {
		let field = &data[position..position + filename_length];
		let name = parse_name(field)?;

		let offset_at = position + filename_length;
		let offset = u32::from_le_bytes([
			data[offset_at],
			data[offset_at + 1],
			data[offset_at + 2],
			data[offset_at + 3],
		]);
		let size = u32::from_le_bytes([
			data[offset_at + 4],
			data[offset_at + 5],
			data[offset_at + 6],
			data[offset_at + 7],
		]);

		if (offset as usize) < index_size {
			return None;
		}
		if u64::from(offset) + u64::from(size) > data.len() as u64 {
			return None;
		}

		entries.push(Entry {
			name,
			offset,
			size,
		});
		position += record_size;
	}

	Some(entries)
}

/// Rebuilds a member name from its fixed field.
///
/// One null conventionally separates the base name from an extension stored
/// in the rest of the field; both halves are Shift-JIS. `None` when the base
/// is empty or either half fails to decode.
fn parse_name(field: &[u8]) -> Option<String> {
	let base = read_fixed_string(field)?;
	if base.is_empty() {
		return None;
	}

	let split = field.iter().position(|&b| b == 0).unwrap_or(field.len());
	let remainder = if split < field.len() {
		&field[split + 1..]
	} else {
		&[]
	};
	let extension = read_fixed_string(remainder)?;

	let name = if extension.is_empty() {
		base
	} else {
		format!("{base}.{extension}")
	};
	Some(name.to_lowercase())
}
