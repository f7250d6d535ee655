//! This crate provides core data types and file format support for the `marble-rs` project.
//!
//! # File Formats
//!
//! - **MBL**: Archive containers storing the engine's assets behind a
//!   multi-revision index, with XOR-encrypted script members
//! - **PRS**: Compressed images (magic `YB`) combining an LZ-style
//!   byte stream with a per-channel delta predictor
//!
//! # Examples
//!
//! ```rust
//! use marble_types::file::mbl::{Builder, Version};
//!
//! // Build a small v1 archive in memory
//! let mut builder = Builder::new(Version::V1);
//! builder.add_member("readme.txt", b"hello".to_vec());
//! let bytes = builder.build().unwrap();
//! assert_eq!(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]), 1);
//! ```

pub mod file;
pub mod prelude;

// Re-export commonly used file types at crate root for convenience
pub use file::{
	FileType, MarbleError, MblBuilder, MblEntry, MblFile, MblManifest, MblVersion, PrsFile,
	PrsHeader,
};
