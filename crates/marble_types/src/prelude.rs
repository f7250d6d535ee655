//! Prelude module for `marble_types`.
//!
//! This module provides a convenient way to import commonly used types and traits.
//!
//! # Examples
//!
//! ```rust
//! use marble_types::prelude::*;
//!
//! let mut builder = MblBuilder::new(MblVersion::V2);
//! builder.add_member("scenario.s", b"\x02\x00".to_vec());
//! let archive = builder.build().unwrap();
//! assert!(!archive.is_empty());
//! ```

#[doc(inline)]
pub use crate::file::{
	self, FileType, MarbleError, MblBuilder, MblEntry, MblFile, MblManifest, MblVersion, PrsFile,
	PrsHeader,
};
