//! Error types for file format parsing and manipulation.
//!
//! This module provides a unified error handling system using [`MarbleError`]
//! for all file formats supported by marble-rs.

use thiserror::Error;

/// Unified error type for all file format operations
#[derive(Debug, Error)]
pub enum MarbleError {
	/// Not enough data to parse
	#[error("{file_type} error: Insufficient data (expected {expected} bytes, got {actual} bytes)")]
	InsufficientData {
		/// File type that encountered the error
		file_type: FileType,
		/// Expected number of bytes
		expected: usize,
		/// Actual number of bytes
		actual: usize,
	},

	/// Invalid magic number
	#[error(
		"{file_type} error: Invalid magic number (expected {expected:02X?}, got {actual:02X?})"
	)]
	InvalidMagic {
		/// File type that encountered the error
		file_type: FileType,
		/// Expected magic bytes
		expected: Vec<u8>,
		/// Actual magic bytes
		actual: Vec<u8>,
	},

	/// Unsupported pixel depth (PRS files)
	#[error("{file_type} error: Unsupported pixel depth {depth} (must be 3 or 4 bytes per pixel)")]
	UnsupportedDepth {
		/// File type that encountered the error
		file_type: FileType,
		/// Depth value found in the header
		depth: u8,
	},

	/// Back-reference before the start of the output (PRS files)
	#[error("{file_type} error: invalid offset value")]
	InvalidOffset {
		/// File type that encountered the error
		file_type: FileType,
	},

	/// No index layout produced a consistent parse (MBL files)
	#[error("{file_type} error: Malformed archive: {message}")]
	MalformedArchive {
		/// File type that encountered the error
		file_type: FileType,
		/// Error message
		message: String,
	},

	/// Member name does not fit the index record (MBL files)
	#[error("{file_type} error: Member name '{name}' exceeds {max} bytes for this layout")]
	NameTooLong {
		/// File type that encountered the error
		file_type: FileType,
		/// Offending member name
		name: String,
		/// Maximum stored length for the requested layout
		max: usize,
	},

	/// Payload cursor diverged from the precomputed index (MBL files)
	#[error(
		"{file_type} error: Index layout mismatch (expected payload at {expected}, cursor at {actual})"
	)]
	LayoutMismatch {
		/// File type that encountered the error
		file_type: FileType,
		/// Offset recorded in the index
		expected: usize,
		/// Offset the writer actually reached
		actual: usize,
	},

	/// Compression error (PRS files)
	#[error("{file_type} error: Compression failed: {message}")]
	CompressionError {
		/// File type that encountered the error
		file_type: FileType,
		/// Error message
		message: String,
	},

	/// Invalid hex key in a manifest
	#[error(transparent)]
	InvalidKey(#[from] hex::FromHexError),

	/// Manifest serialization error
	#[error(transparent)]
	JsonError(#[from] serde_json::Error),

	/// IO error
	#[error(transparent)]
	IOError(#[from] std::io::Error),
}

impl MarbleError {
	/// Returns the file type associated with this error
	pub fn file_type(&self) -> Option<FileType> {
		match self {
			Self::InsufficientData {
				file_type,
				..
			}
			| Self::InvalidMagic {
				file_type,
				..
			}
			| Self::UnsupportedDepth {
				file_type,
				..
			}
			| Self::InvalidOffset {
				file_type,
			}
			| Self::MalformedArchive {
				file_type,
				..
			}
			| Self::NameTooLong {
				file_type,
				..
			}
			| Self::LayoutMismatch {
				file_type,
				..
			}
			| Self::CompressionError {
				file_type,
				..
			} => Some(*file_type),
			_ => None,
		}
	}

	/// Returns true if this is an I/O error
	pub fn is_io_error(&self) -> bool {
		matches!(self, Self::IOError(_))
	}

	/// Returns true if this is an invalid magic error
	pub fn is_invalid_magic(&self) -> bool {
		matches!(self, Self::InvalidMagic { .. })
	}

	/// Returns true if this error came from a malformed compressed stream
	pub fn is_decompression_error(&self) -> bool {
		matches!(self, Self::UnsupportedDepth { .. } | Self::InvalidOffset { .. })
	}

	/// Create an insufficient data error
	pub fn insufficient_data(file_type: FileType, expected: usize, actual: usize) -> Self {
		Self::InsufficientData {
			file_type,
			expected,
			actual,
		}
	}

	/// Create an invalid magic error
	pub fn invalid_magic(file_type: FileType, expected: &[u8], actual: &[u8]) -> Self {
		Self::InvalidMagic {
			file_type,
			expected: expected.to_vec(),
			actual: actual.to_vec(),
		}
	}

	/// Create a malformed archive error
	pub fn malformed_archive(file_type: FileType, message: impl Into<String>) -> Self {
		Self::MalformedArchive {
			file_type,
			message: message.into(),
		}
	}
}

/// File type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
	/// MBL archive container
	Mbl,
	/// PRS compressed image
	Prs,
}

impl FileType {
	/// Returns the typical file extension for this file type
	pub fn extension(&self) -> &'static str {
		match self {
			FileType::Mbl => "mbl",
			FileType::Prs => "prs",
		}
	}

	/// Returns a human-readable description of this file type
	pub fn description(&self) -> &'static str {
		match self {
			FileType::Mbl => "Archive container",
			FileType::Prs => "Compressed image file",
		}
	}
}

impl std::fmt::Display for FileType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			FileType::Mbl => write!(f, "MBL"),
			FileType::Prs => write!(f, "PRS"),
		}
	}
}
