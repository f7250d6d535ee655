//! Extraction manifest (`index.json`) model.
//!
//! The manifest is written beside extracted members and consumed when
//! repacking. It pins everything an archive does not carry by itself: the
//! layout revision, the cipher key, and the member order.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Version;
use crate::file::MarbleError;

/// Manifest persisted as `index.json` in the extraction directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
	/// Layout revision to rebuild with
	#[serde(rename = "Version")]
	pub version: Version,

	/// Uppercase hex of the raw key bytes; an empty key serialises to `""`
	#[serde(rename = "Key")]
	pub key: Option<String>,

	/// Member names in archive order, extracted form
	#[serde(rename = "Files")]
	pub files: Vec<String>,
}

impl Manifest {
	/// Conventional file name inside an extraction directory
	pub const FILE_NAME: &'static str = "index.json";

	/// Creates a manifest from raw key bytes
	pub fn new(version: Version, key: &[u8], files: Vec<String>) -> Self {
		Self {
			version,
			key: Some(hex::encode_upper(key)),
			files,
		}
	}

	/// Loads a manifest from a JSON file
	pub fn load(path: impl AsRef<Path>) -> Result<Self, MarbleError> {
		let text = std::fs::read_to_string(path)?;
		Ok(serde_json::from_str(&text)?)
	}

	/// Saves the manifest as pretty-printed JSON
	pub fn save(&self, path: impl AsRef<Path>) -> Result<(), MarbleError> {
		let json = serde_json::to_string_pretty(self)?;
		std::fs::write(path, json)?;
		Ok(())
	}

	/// Raw key bytes decoded from the hex field. A missing or empty field is
	/// the empty key.
	pub fn key_bytes(&self) -> Result<Vec<u8>, MarbleError> {
		match &self.key {
			Some(text) if !text.is_empty() => Ok(hex::decode(text)?),
			_ => Ok(Vec::new()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_field_names_and_version_tags() {
		let manifest = Manifest::new(Version::V3, &[0x01, 0xAB], vec!["a.prs".to_string()]);
		let json = serde_json::to_string(&manifest).unwrap();

		assert!(json.contains("\"Version\":\"v3\""));
		assert!(json.contains("\"Key\":\"01AB\""));
		assert!(json.contains("\"Files\":[\"a.prs\"]"));
	}

	#[test]
	fn test_empty_key_serialises_to_empty_string() {
		let manifest = Manifest::new(Version::V1, &[], vec![]);
		let json = serde_json::to_string(&manifest).unwrap();
		assert!(json.contains("\"Key\":\"\""));
		assert_eq!(manifest.key_bytes().unwrap(), Vec::<u8>::new());
	}

	#[test]
	fn test_null_key_means_no_key() {
		let manifest: Manifest =
			serde_json::from_str(r#"{"Version":"v2","Key":null,"Files":["x.s"]}"#).unwrap();
		assert_eq!(manifest.version, Version::V2);
		assert_eq!(manifest.key_bytes().unwrap(), Vec::<u8>::new());
	}

	#[test]
	fn test_key_round_trip() {
		let manifest = Manifest::new(Version::V2, &[0xDE, 0xAD, 0xBE, 0xEF], vec![]);
		assert_eq!(manifest.key_bytes().unwrap(), vec![0xDE, 0xAD, 0xBE, 0xEF]);
	}

	#[test]
	fn test_rejects_bad_hex_key() {
		let manifest: Manifest =
			serde_json::from_str(r#"{"Version":"v1","Key":"XYZ","Files":[]}"#).unwrap();
		assert!(matches!(manifest.key_bytes(), Err(MarbleError::InvalidKey(_))));
	}
}
