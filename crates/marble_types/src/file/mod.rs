//! File type support for the `marble-rs` project.

mod error;

pub mod crypt;
pub mod io;
pub mod mbl;
pub mod prs;

// Re-export error types
pub use error::{FileType, MarbleError};

// Re-export main file types
pub use mbl::{
	Builder as MblBuilder, Entry as MblEntry, File as MblFile, Manifest as MblManifest,
	Version as MblVersion,
};
pub use prs::{File as PrsFile, Header as PrsHeader};
